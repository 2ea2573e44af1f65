mod applier;
mod catalog;
mod dependency;
mod seeder;
mod tables;

pub use applier::{FaultIsolationMode, SchemaApplier, SchemaOperation, StatementOutcome};
pub use catalog::{ColumnDefinition, ForeignKey, SchemaCatalog, TableDefinition};
pub use dependency::DependencyGraph;
pub use seeder::{seed_statements, SeedRecord, SEED_RECORDS};
pub use tables::standard_catalog;
