pub mod lifecycle;
pub mod provider;
#[cfg(test)]
pub(crate) mod testing;
pub mod value;

pub use lifecycle::release_quietly;
pub use provider::{
    Connection, ConnectionProvider, ExecuteOptions, ExecutionResult, PostgresProvider, RowFormat,
};
pub use value::{Row, SqlValue};
