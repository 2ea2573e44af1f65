mod gateway;
mod identifier;

pub use gateway::QueryGateway;
pub use identifier::{is_valid_identifier, resolve_table_name, TableNamePolicy};
