use super::QueryBuilder;
use super::condition::Condition;
use super::statement::{Connector, PositionalStatement, Statement};
use crate::error::SqlFluentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
            JoinKind::Full => "FULL",
        }
    }
}

/// Sort direction for `order_by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl<S> QueryBuilder<S> {
    /// Start a `SELECT` of `columns` from the current table; no columns selects `*`.
    ///
    /// Replaces any statement that was pending.
    pub fn select<I>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let columns: Vec<String> = columns
            .into_iter()
            .map(|c| c.as_ref().trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        let columns = if columns.is_empty() {
            "*".to_string()
        } else {
            columns.join(", ")
        };
        self.statement = Statement::Positional(PositionalStatement::new(format!(
            "SELECT {columns} FROM {}",
            self.table
        )));
        self
    }

    /// Begin `SELECT *` if nothing is pending.
    pub(crate) fn ensure_started(&mut self) {
        if self.statement.is_idle() {
            self.select(["*"]);
        }
    }

    /// Add a condition, joined to earlier ones with `AND`.
    ///
    /// Starts `SELECT *` if no statement is pending. Empty conditions are ignored.
    ///
    /// # Errors
    /// Returns `SqlFluentError::InvalidCondition` for a key that is not a column
    /// optionally followed by a comparison operator; the statement is left unchanged.
    pub fn where_(&mut self, condition: impl Into<Condition>) -> Result<&mut Self, SqlFluentError> {
        self.add_condition(condition.into(), Connector::And)
    }

    /// Add a condition joined to earlier ones with `OR`.
    ///
    /// With no WHERE clause yet this behaves like [`QueryBuilder::where_`].
    ///
    /// # Errors
    /// See [`QueryBuilder::where_`].
    pub fn or_where(
        &mut self,
        condition: impl Into<Condition>,
    ) -> Result<&mut Self, SqlFluentError> {
        self.add_condition(condition.into(), Connector::Or)
    }

    fn add_condition(
        &mut self,
        condition: Condition,
        connector: Connector,
    ) -> Result<&mut Self, SqlFluentError> {
        if condition.is_empty() {
            return Ok(self);
        }
        condition.validate()?;
        self.ensure_started();
        self.statement.add_condition(&condition, connector)?;
        Ok(self)
    }

    /// `INNER JOIN target ON on`. Both parts are written verbatim.
    pub fn join(&mut self, target: &str, on: &str) -> &mut Self {
        self.join_with(JoinKind::Inner, target, on)
    }

    pub fn join_with(&mut self, kind: JoinKind, target: &str, on: &str) -> &mut Self {
        self.ensure_started();
        if let Some(text) = self.statement.text_mut() {
            text.push_fragment(&format!("{} JOIN {target} ON {on}", kind.as_sql()));
        }
        self
    }

    /// Append an ordering column. Repeated calls extend the same `ORDER BY`.
    pub fn order_by(&mut self, column: &str, direction: Direction) -> &mut Self {
        self.ensure_started();
        if let Some(text) = self.statement.text_mut() {
            text.push_order(column, direction.as_sql());
        }
        self
    }
}
