mod handle;
mod result_set;
mod row;

pub use handle::StatementHandle;
pub use result_set::ResultSet;
pub use row::{FetchMode, FromRecord, Record};
