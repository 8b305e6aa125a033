use std::borrow::Cow;

mod scanner;

use scanner::{Cursor, State};

use crate::error::SqlFluentError;
use crate::types::{Params, RowValues};

/// SQL rewritten to numbered `$N` placeholders plus the values in `$N` order.
#[derive(Debug, Clone, PartialEq)]
pub struct Translated<'a> {
    pub sql: Cow<'a, str>,
    pub values: Vec<RowValues>,
}

/// Rewrite `?` and `:name` placeholders into Postgres-style `$1..$N`.
///
/// Quoted strings, comments, dollar-quoted blocks and `::` casts are skipped by a small
/// lexer state machine. A repeated `:name` reuses its first number. Returns a borrowed
/// `Cow` when the SQL has no placeholders.
///
/// # Errors
/// Returns `SqlFluentError::ParameterError` when the placeholder style does not match the
/// bound values, a name has no value, or the number of values does not match the SQL.
pub fn translate_placeholders<'a>(
    sql: &'a str,
    params: &Params,
) -> Result<Translated<'a>, SqlFluentError> {
    let mut out: Option<String> = None;
    let mut copied = 0;
    let mut values: Vec<RowValues> = Vec::with_capacity(params.len());
    let mut names: Vec<&str> = Vec::new();
    let mut positional = 0;
    let mut state = State::Normal;
    let mut cur = Cursor::new(sql);

    while cur.idx < cur.bytes.len() {
        let b = cur.bytes[cur.idx];
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                _ if cur.at_line_comment() => {
                    state = State::LineComment;
                    cur.idx += 1;
                }
                _ if cur.at_block_open() => {
                    state = State::BlockComment(1);
                    cur.idx += 1;
                }
                b'$' => {
                    if let Some((tag, end)) = cur.dollar_tag() {
                        state = State::DollarQuoted(tag);
                        cur.idx = end;
                    }
                }
                b'?' => {
                    let Params::Positional(list) = params else {
                        return Err(SqlFluentError::ParameterError(
                            "positional placeholder `?` in a statement bound by name".into(),
                        ));
                    };
                    let value = list.get(positional).ok_or_else(|| {
                        SqlFluentError::ParameterError(format!(
                            "statement has more `?` placeholders than the {} bound values",
                            list.len()
                        ))
                    })?;
                    positional += 1;
                    values.push(value.clone());
                    splice(&mut out, &mut copied, sql, cur.idx, cur.idx + 1, values.len());
                }
                b':' if !cur.at_cast() => {
                    if let Some((end, name)) = cur.ident_at(cur.idx + 1) {
                        if !matches!(params, Params::Named(_)) {
                            return Err(SqlFluentError::ParameterError(format!(
                                "named placeholder `:{name}` in a statement bound by position"
                            )));
                        }
                        let number = match names.iter().position(|seen| *seen == name) {
                            Some(pos) => pos + 1,
                            None => {
                                let value = params.named(name).ok_or_else(|| {
                                    SqlFluentError::ParameterError(format!(
                                        "no value bound for `:{name}`"
                                    ))
                                })?;
                                values.push(value.clone());
                                names.push(name);
                                names.len()
                            }
                        };
                        splice(&mut out, &mut copied, sql, cur.idx, end, number);
                        cur.idx = end - 1;
                    }
                }
                _ => {}
            },
            State::SingleQuoted => {
                if b == b'\'' {
                    if cur.peek(1) == Some(b'\'') {
                        cur.idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if cur.peek(1) == Some(b'"') {
                        cur.idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if cur.at_block_open() {
                    state = State::BlockComment(depth + 1);
                    cur.idx += 1;
                } else if cur.at_block_close() {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    cur.idx += 1;
                }
            }
            State::DollarQuoted(ref tag) => {
                if b == b'$' && cur.closes_tag(tag) {
                    cur.idx += tag.len() + 1;
                    state = State::Normal;
                }
            }
        }
        cur.idx += 1;
    }

    match params {
        Params::Positional(list) if positional != list.len() => {
            return Err(SqlFluentError::ParameterError(format!(
                "{} values bound but the statement has {positional} `?` placeholders",
                list.len()
            )));
        }
        Params::Named(list) if names.len() != list.len() => {
            return Err(SqlFluentError::ParameterError(format!(
                "{} named values bound but the statement references {}",
                list.len(),
                names.len()
            )));
        }
        _ => {}
    }

    let sql = match out {
        Some(mut buf) => {
            buf.push_str(&sql[copied..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(sql),
    };
    Ok(Translated { sql, values })
}

fn splice(
    out: &mut Option<String>,
    copied: &mut usize,
    sql: &str,
    start: usize,
    end: usize,
    number: usize,
) {
    let buf = out.get_or_insert_with(|| String::with_capacity(sql.len() + 8));
    buf.push_str(&sql[*copied..start]);
    buf.push('$');
    buf.push_str(&number.to_string());
    *copied = end;
}
