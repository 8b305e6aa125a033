/// Lexer position inside a SQL string.
#[derive(Clone)]
pub(super) enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    LineComment,
    BlockComment(u32),
    DollarQuoted(String),
}

pub(super) struct Cursor<'a> {
    pub(super) bytes: &'a [u8],
    pub(super) idx: usize,
}

impl<'a> Cursor<'a> {
    pub(super) fn new(sql: &'a str) -> Self {
        Self {
            bytes: sql.as_bytes(),
            idx: 0,
        }
    }

    pub(super) fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.idx + offset).copied()
    }

    fn pair(&self, a: u8, b: u8) -> bool {
        self.peek(0) == Some(a) && self.peek(1) == Some(b)
    }

    pub(super) fn at_line_comment(&self) -> bool {
        self.pair(b'-', b'-')
    }

    pub(super) fn at_block_open(&self) -> bool {
        self.pair(b'/', b'*')
    }

    pub(super) fn at_block_close(&self) -> bool {
        self.pair(b'*', b'/')
    }

    /// `::` is a Postgres cast, never a named placeholder.
    pub(super) fn at_cast(&self) -> bool {
        self.peek(1) == Some(b':') || (self.idx > 0 && self.bytes[self.idx - 1] == b':')
    }

    /// Recognise `$tag$` at the cursor; returns the tag and the index of the closing `$`.
    pub(super) fn dollar_tag(&self) -> Option<(String, usize)> {
        let mut end = self.idx + 1;
        while end < self.bytes.len() && self.bytes[end] != b'$' {
            let b = self.bytes[end];
            if !(b.is_ascii_alphanumeric() || b == b'_') {
                return None;
            }
            end += 1;
        }
        if end >= self.bytes.len() {
            return None;
        }
        let tag = std::str::from_utf8(&self.bytes[self.idx + 1..end]).ok()?;
        // `$1` is a parameter reference, not a quote tag
        if tag.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        Some((tag.to_string(), end))
    }

    pub(super) fn closes_tag(&self, tag: &str) -> bool {
        let start = self.idx + 1;
        let end = start + tag.len();
        end < self.bytes.len()
            && &self.bytes[start..end] == tag.as_bytes()
            && self.bytes[end] == b'$'
    }

    /// Scan a placeholder name (`[A-Za-z_][A-Za-z0-9_]*`) starting at `start`.
    pub(super) fn ident_at(&self, start: usize) -> Option<(usize, &'a str)> {
        let first = *self.bytes.get(start)?;
        if !(first.is_ascii_alphabetic() || first == b'_') {
            return None;
        }
        let mut end = start + 1;
        while end < self.bytes.len()
            && (self.bytes[end].is_ascii_alphanumeric() || self.bytes[end] == b'_')
        {
            end += 1;
        }
        std::str::from_utf8(&self.bytes[start..end])
            .ok()
            .map(|name| (end, name))
    }
}
