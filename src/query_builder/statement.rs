//! The pending statement: SQL text plus its bound values.
//!
//! Statements bind either by position or by name. The two styles are separate
//! variants so one statement can never carry both.

use super::condition::{Condition, Operator, parse_condition_key};
use crate::error::SqlFluentError;
use crate::types::{Params, RowValues};

/// How a condition attaches to conditions already in the WHERE clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Connector {
    And,
    Or,
}

impl Connector {
    fn keyword(self) -> &'static str {
        match self {
            Connector::And => "AND ",
            Connector::Or => "OR ",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SqlText {
    sql: String,
    has_where: bool,
    has_order: bool,
}

impl SqlText {
    pub(crate) fn new(sql: String) -> Self {
        Self {
            sql,
            ..Self::default()
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.sql
    }

    /// Append a fragment, separated from the existing text by exactly one space.
    pub(crate) fn push_fragment(&mut self, fragment: &str) {
        if !self.sql.is_empty() && !self.sql.ends_with(' ') {
            self.sql.push(' ');
        }
        self.sql.push_str(fragment.trim_start());
    }

    pub(crate) fn push_order(&mut self, column: &str, direction: &str) {
        if self.has_order {
            let trimmed = self.sql.trim_end().len();
            self.sql.truncate(trimmed);
            self.sql.push_str(&format!(", {column} {direction} "));
        } else {
            self.push_fragment(&format!("ORDER BY {column} {direction} "));
            self.has_order = true;
        }
    }

    fn into_sql(self) -> String {
        self.sql
    }
}

/// Produces placeholders for condition values in the statement's binding style.
trait Binder {
    fn bind(&mut self, value: RowValues) -> String;
}

struct PositionalBinder<'a>(&'a mut Vec<RowValues>);

impl Binder for PositionalBinder<'_> {
    fn bind(&mut self, value: RowValues) -> String {
        self.0.push(value);
        "?".to_string()
    }
}

struct NamedBinder<'a>(&'a mut Vec<(String, RowValues)>);

impl Binder for NamedBinder<'_> {
    fn bind(&mut self, value: RowValues) -> String {
        let mut seq = self.0.len();
        let mut name = format!("where_{seq}");
        while self.0.iter().any(|(existing, _)| *existing == name) {
            seq += 1;
            name = format!("where_{seq}");
        }
        let placeholder = format!(":{name}");
        self.0.push((name, value));
        placeholder
    }
}

/// Append one `where` call to `text`, binding values through `binder`.
///
/// Every key is validated before anything is written, so a rejected condition leaves
/// the statement untouched.
fn apply_condition(
    text: &mut SqlText,
    binder: &mut dyn Binder,
    condition: &Condition,
    connector: Connector,
) -> Result<(), SqlFluentError> {
    let parsed: Vec<(String, Operator, RowValues)> = match condition {
        Condition::Raw(_) => Vec::new(),
        Condition::Pairs(pairs) => pairs
            .iter()
            .map(|(key, value)| {
                parse_condition_key(key).map(|(column, op)| (column, op, value.clone()))
            })
            .collect::<Result<_, _>>()?,
    };

    if text.has_where {
        text.push_fragment(connector.keyword());
    } else {
        text.push_fragment("WHERE ");
        text.has_where = true;
    }

    match condition {
        Condition::Raw(sql) => {
            text.sql.push_str(sql.trim());
            text.sql.push(' ');
        }
        Condition::Pairs(_) => {
            let last = parsed.len().saturating_sub(1);
            for (i, (column, op, value)) in parsed.into_iter().enumerate() {
                let placeholder = binder.bind(value);
                text.sql
                    .push_str(&format!("{column} {} {placeholder} ", op.as_sql()));
                if i != last {
                    text.sql.push_str("AND ");
                }
            }
        }
    }
    Ok(())
}

/// A statement whose values bind to `?` placeholders, left to right.
#[derive(Debug, Clone, Default)]
pub(crate) struct PositionalStatement {
    pub(crate) text: SqlText,
    pub(crate) params: Vec<RowValues>,
}

impl PositionalStatement {
    pub(crate) fn new(sql: String) -> Self {
        Self {
            text: SqlText::new(sql),
            params: Vec::new(),
        }
    }

    pub(crate) fn add_condition(
        &mut self,
        condition: &Condition,
        connector: Connector,
    ) -> Result<(), SqlFluentError> {
        apply_condition(
            &mut self.text,
            &mut PositionalBinder(&mut self.params),
            condition,
            connector,
        )
    }
}

/// A statement whose values bind to `:name` placeholders.
#[derive(Debug, Clone, Default)]
pub(crate) struct NamedStatement {
    pub(crate) text: SqlText,
    pub(crate) params: Vec<(String, RowValues)>,
}

impl NamedStatement {
    pub(crate) fn new(sql: String, params: Vec<(String, RowValues)>) -> Self {
        Self {
            text: SqlText::new(sql),
            params,
        }
    }

    pub(crate) fn add_condition(
        &mut self,
        condition: &Condition,
        connector: Connector,
    ) -> Result<(), SqlFluentError> {
        apply_condition(
            &mut self.text,
            &mut NamedBinder(&mut self.params),
            condition,
            connector,
        )
    }
}

/// The statement being assembled by a builder.
#[derive(Debug, Clone, Default)]
pub(crate) enum Statement {
    /// Nothing started yet.
    #[default]
    Idle,
    Positional(PositionalStatement),
    Named(NamedStatement),
    /// Caller-written SQL with caller-supplied values.
    Raw { sql: String, params: Params },
}

impl Statement {
    pub(crate) fn is_idle(&self) -> bool {
        matches!(self, Statement::Idle)
    }

    pub(crate) fn sql(&self) -> &str {
        match self {
            Statement::Idle => "",
            Statement::Positional(stmt) => stmt.text.as_str(),
            Statement::Named(stmt) => stmt.text.as_str(),
            Statement::Raw { sql, .. } => sql,
        }
    }

    pub(crate) fn params(&self) -> Params {
        match self {
            Statement::Idle => Params::default(),
            Statement::Positional(stmt) => Params::Positional(stmt.params.clone()),
            Statement::Named(stmt) => Params::Named(stmt.params.clone()),
            Statement::Raw { params, .. } => params.clone(),
        }
    }

    pub(crate) fn text_mut(&mut self) -> Option<&mut SqlText> {
        match self {
            Statement::Positional(stmt) => Some(&mut stmt.text),
            Statement::Named(stmt) => Some(&mut stmt.text),
            Statement::Idle | Statement::Raw { .. } => None,
        }
    }

    pub(crate) fn add_condition(
        &mut self,
        condition: &Condition,
        connector: Connector,
    ) -> Result<(), SqlFluentError> {
        match self {
            Statement::Positional(stmt) => stmt.add_condition(condition, connector),
            Statement::Named(stmt) => stmt.add_condition(condition, connector),
            Statement::Idle | Statement::Raw { .. } => Err(SqlFluentError::InvalidCondition(
                "conditions need a select, update or delete statement".into(),
            )),
        }
    }

    pub(crate) fn into_parts(self) -> (String, Params) {
        match self {
            Statement::Idle => (String::new(), Params::default()),
            Statement::Positional(stmt) => (stmt.text.into_sql(), Params::Positional(stmt.params)),
            Statement::Named(stmt) => (stmt.text.into_sql(), Params::Named(stmt.params)),
            Statement::Raw { sql, params } => (sql, params),
        }
    }
}
