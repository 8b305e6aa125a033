use super::condition::Condition;
use super::{QueryBuilder, TableCheck};
use crate::error::SqlFluentError;
use crate::results::{FetchMode, FromRecord};
use crate::types::RowValues;

impl<S: FromRecord> QueryBuilder<S> {
    /// Run the pending statement (or `SELECT *`) and return its first row.
    ///
    /// `Ok(None)` means no row matched or the driver rejected the statement; check
    /// [`QueryBuilder::errors`] to tell them apart.
    ///
    /// # Errors
    /// Returns `SqlFluentError::MissingTable` without a table,
    /// `SqlFluentError::ConnectionClosed` after `close`, or the `FromRecord` error if the
    /// row cannot be mapped.
    pub fn first(&mut self) -> Result<Option<S>, SqlFluentError> {
        self.ensure_started();
        let mode = self.fetch_mode;
        self.execute_query(TableCheck::Required)?
            .fetch_one(mode)
            .map(S::from_record)
            .transpose()
    }

    /// Like [`QueryBuilder::first`] but returns one column of the row.
    ///
    /// `Ok(None)` if there is no row or it has no such column.
    ///
    /// # Errors
    /// See [`QueryBuilder::first`].
    pub fn first_column(&mut self, column: &str) -> Result<Option<RowValues>, SqlFluentError> {
        self.ensure_started();
        let row = self
            .execute_query(TableCheck::Required)?
            .fetch_one(FetchMode::Associative);
        Ok(row.and_then(|r| r.get(column).cloned()))
    }

    /// Run the pending statement (or `SELECT *`) and return every row.
    ///
    /// A rejected statement yields an empty vector.
    ///
    /// # Errors
    /// See [`QueryBuilder::first`].
    pub fn all(&mut self) -> Result<Vec<S>, SqlFluentError> {
        self.ensure_started();
        let mode = self.fetch_mode;
        self.execute_query(TableCheck::Required)?
            .fetch_all(mode)
            .into_iter()
            .map(S::from_record)
            .collect()
    }

    /// The first column of every row.
    ///
    /// # Errors
    /// See [`QueryBuilder::first`].
    pub fn all_column(&mut self) -> Result<Vec<RowValues>, SqlFluentError> {
        self.ensure_started();
        Ok(self.execute_query(TableCheck::Required)?.fetch_column())
    }

    /// The row whose `id` equals `id`.
    ///
    /// # Errors
    /// See [`QueryBuilder::first`].
    pub fn find(&mut self, id: impl Into<RowValues>) -> Result<Option<S>, SqlFluentError> {
        let id: RowValues = id.into();
        self.primary_where([("id", id)])
    }

    /// # Errors
    /// See [`QueryBuilder::first`].
    pub fn find_column(
        &mut self,
        id: impl Into<RowValues>,
        column: &str,
    ) -> Result<Option<RowValues>, SqlFluentError> {
        let id: RowValues = id.into();
        self.primary_where_column([("id", id)], column)
    }

    /// `where_(condition)` followed by `first()`.
    ///
    /// # Errors
    /// See [`QueryBuilder::where_`] and [`QueryBuilder::first`].
    pub fn primary_where(
        &mut self,
        condition: impl Into<Condition>,
    ) -> Result<Option<S>, SqlFluentError> {
        self.where_(condition)?.first()
    }

    /// # Errors
    /// See [`QueryBuilder::where_`] and [`QueryBuilder::first`].
    pub fn primary_where_column(
        &mut self,
        condition: impl Into<Condition>,
        column: &str,
    ) -> Result<Option<RowValues>, SqlFluentError> {
        self.where_(condition)?.first_column(column)
    }
}
