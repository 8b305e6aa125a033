use super::condition::{Condition, is_identifier};
use super::statement::{Connector, NamedStatement, PositionalStatement, Statement};
use super::{QueryBuilder, TableCheck};
use crate::error::SqlFluentError;
use crate::fields::Fields;
use crate::results::StatementHandle;
use crate::types::Params;

fn checked_columns(fields: &Fields) -> Result<Vec<&str>, SqlFluentError> {
    fields
        .names()
        .map(|name| {
            if is_identifier(name) {
                Ok(name)
            } else {
                Err(SqlFluentError::ParameterError(format!(
                    "`{name}` is not a valid column name"
                )))
            }
        })
        .collect()
}

impl<S> QueryBuilder<S> {
    fn insert_statement(&self, fields: Fields) -> Result<NamedStatement, SqlFluentError> {
        let columns = checked_columns(&fields)?;
        let sql = if columns.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", self.table)
        } else {
            let placeholders: Vec<String> = columns.iter().map(|c| format!(":{c}")).collect();
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                self.table,
                columns.join(", "),
                placeholders.join(", ")
            )
        };
        Ok(NamedStatement::new(sql, fields.into_vec()))
    }

    /// Insert one row and return the generated identifier.
    ///
    /// Returns `Ok(None)` if the driver rejected the row (see [`QueryBuilder::errors`])
    /// or cannot report an identifier.
    ///
    /// # Errors
    /// Returns `SqlFluentError::MissingTable` without a table,
    /// `SqlFluentError::ParameterError` for a field that is not a plain column name, or
    /// `SqlFluentError::ConnectionClosed` after `close`.
    pub fn insert(&mut self, fields: impl Into<Fields>) -> Result<Option<String>, SqlFluentError> {
        if !self.insert_without_id(fields)? {
            return Ok(None);
        }
        self.last_insert_id()
    }

    /// Insert one row and report whether the driver accepted it.
    ///
    /// # Errors
    /// See [`QueryBuilder::insert`].
    pub fn insert_without_id(&mut self, fields: impl Into<Fields>) -> Result<bool, SqlFluentError> {
        let statement = self.insert_statement(fields.into())?;
        self.statement = Statement::Named(statement);
        Ok(self.execute_query(TableCheck::Required)?.succeeded())
    }

    /// Update the rows matching `condition` and report whether the driver accepted it.
    ///
    /// Field values bind by name; condition values bind to generated `:where_N` names.
    ///
    /// # Errors
    /// Returns `SqlFluentError::ParameterError` when `fields` is empty or holds an
    /// invalid column name, `SqlFluentError::InvalidCondition` for a malformed condition
    /// key, plus the errors of [`QueryBuilder::insert`].
    pub fn update(
        &mut self,
        fields: impl Into<Fields>,
        condition: impl Into<Condition>,
    ) -> Result<bool, SqlFluentError> {
        let fields = fields.into();
        if fields.is_empty() {
            return Err(SqlFluentError::ParameterError(
                "update needs at least one field".into(),
            ));
        }
        let assignments: Vec<String> = checked_columns(&fields)?
            .into_iter()
            .map(|c| format!("{c} = :{c}"))
            .collect();
        let mut statement = NamedStatement::new(
            format!("UPDATE {} SET {}", self.table, assignments.join(", ")),
            fields.into_vec(),
        );
        let condition = condition.into();
        if !condition.is_empty() {
            statement.add_condition(&condition, Connector::And)?;
        }
        self.statement = Statement::Named(statement);
        Ok(self.execute_query(TableCheck::Required)?.succeeded())
    }

    /// Delete the rows matching `condition`; an empty condition deletes every row.
    ///
    /// # Errors
    /// Returns `SqlFluentError::InvalidCondition` for a malformed condition key,
    /// `SqlFluentError::MissingTable` without a table, or
    /// `SqlFluentError::ConnectionClosed` after `close`.
    pub fn delete(&mut self, condition: impl Into<Condition>) -> Result<bool, SqlFluentError> {
        let mut statement = PositionalStatement::new(format!("DELETE FROM {}", self.table));
        let condition = condition.into();
        if !condition.is_empty() {
            statement.add_condition(&condition, Connector::And)?;
        }
        self.statement = Statement::Positional(statement);
        Ok(self.execute_query(TableCheck::Required)?.succeeded())
    }

    /// Run caller-written SQL with positional (`?`) or named (`:name`) values.
    ///
    /// No table is needed for this call. Returns the statement handle on success and
    /// `Ok(None)` if the driver rejected the statement.
    ///
    /// # Errors
    /// Returns `SqlFluentError::ConnectionClosed` after `close`.
    pub fn execute(
        &mut self,
        sql: &str,
        params: impl Into<Params>,
    ) -> Result<Option<&mut StatementHandle>, SqlFluentError> {
        self.statement = Statement::Raw {
            sql: sql.to_string(),
            params: params.into(),
        };
        let handle = self.execute_query(TableCheck::Skip)?;
        Ok(handle.succeeded().then_some(handle))
    }
}
