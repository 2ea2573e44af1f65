//! In-memory stand-in for the Postgres provider.
//!
//! Understands just enough SQL (CREATE/DROP TABLE, INSERT INTO, SELECT * FROM)
//! to track which tables exist, and counts every acquire and release.

use crate::error::{ExecutionError, GatewayError, ReleaseError, Result};
use crate::pool::provider::{
    Connection, ConnectionProvider, ExecuteOptions, ExecutionResult, RowFormat,
};
use crate::pool::value::Row;
use async_trait::async_trait;
use postgres_types::ToSql;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct State {
    tables: BTreeSet<String>,
    rows: HashMap<String, Vec<Row>>,
    executed: Vec<String>,
    failing_fragments: Vec<String>,
    fail_acquire: bool,
    fail_release: bool,
    acquired: usize,
    released: usize,
}

#[derive(Clone, Default)]
pub struct FakeDatabase {
    state: Arc<Mutex<State>>,
}

impl FakeDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn fail_acquire(&self, fail: bool) {
        self.state().fail_acquire = fail;
    }

    pub fn fail_release(&self, fail: bool) {
        self.state().fail_release = fail;
    }

    /// Any statement containing `fragment` fails with a generic error.
    pub fn fail_statements_containing(&self, fragment: &str) {
        self.state().failing_fragments.push(fragment.to_string());
    }

    pub fn create_table(&self, name: &str) {
        self.state().tables.insert(name.to_ascii_lowercase());
    }

    pub fn set_rows(&self, table: &str, rows: Vec<Row>) {
        let mut state = self.state();
        state.tables.insert(table.to_ascii_lowercase());
        state.rows.insert(table.to_ascii_lowercase(), rows);
    }

    pub fn tables(&self) -> Vec<String> {
        self.state().tables.iter().cloned().collect()
    }

    pub fn executed(&self) -> Vec<String> {
        self.state().executed.clone()
    }

    pub fn acquired(&self) -> usize {
        self.state().acquired
    }

    pub fn released(&self) -> usize {
        self.state().released
    }
}

#[async_trait]
impl ConnectionProvider for FakeDatabase {
    async fn acquire(&self) -> Result<Box<dyn Connection>> {
        let mut state = self.state();
        if state.fail_acquire {
            return Err(GatewayError::ConnectionFailed {
                database: "fake".to_string(),
                cause: "connection refused".to_string(),
            });
        }
        state.acquired += 1;

        Ok(Box::new(FakeConnection {
            state: self.state.clone(),
        }))
    }

    fn database(&self) -> &str {
        "fake"
    }
}

struct FakeConnection {
    state: Arc<Mutex<State>>,
}

fn target_after(statement: &str, keyword: &str) -> Option<String> {
    let rest = statement.strip_prefix(keyword)?;
    let name: String = rest
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    Some(name.to_ascii_lowercase())
}

#[async_trait]
impl Connection for FakeConnection {
    async fn execute(
        &mut self,
        statement: &str,
        _params: &[&(dyn ToSql + Sync)],
        options: ExecuteOptions,
    ) -> std::result::Result<ExecutionResult, ExecutionError> {
        let mut state = self.state.lock().unwrap();
        state.executed.push(statement.to_string());

        if state
            .failing_fragments
            .iter()
            .any(|fragment| statement.contains(fragment.as_str()))
        {
            return Err(ExecutionError::new("simulated failure").with_sql_state("XX000"));
        }

        let done = |rows_affected| ExecutionResult {
            rows_affected,
            rows: Vec::new(),
        };

        if let Some(name) = target_after(statement, "CREATE TABLE") {
            if !state.tables.insert(name.clone()) {
                return Err(ExecutionError::new(format!("relation \"{}\" already exists", name))
                    .with_sql_state("42P07"));
            }
            return Ok(done(0));
        }

        if let Some(name) = target_after(statement, "DROP TABLE") {
            if !state.tables.remove(&name) {
                return Err(ExecutionError::new(format!("table \"{}\" does not exist", name))
                    .with_sql_state("42P01"));
            }
            state.rows.remove(&name);
            return Ok(done(0));
        }

        if let Some(name) = target_after(statement, "INSERT INTO") {
            if !state.tables.contains(&name) {
                return Err(ExecutionError::new(format!("relation \"{}\" does not exist", name))
                    .with_sql_state("42P01"));
            }
            return Ok(done(1));
        }

        if let Some(name) = target_after(statement, "SELECT * FROM") {
            if !state.tables.contains(&name) {
                return Err(ExecutionError::new(format!("relation \"{}\" does not exist", name))
                    .with_sql_state("42P01"));
            }
            let rows = state.rows.get(&name).cloned().unwrap_or_default();
            let rows_affected = rows.len() as u64;
            let rows = match options.row_format {
                RowFormat::Named => rows,
                RowFormat::Discard => Vec::new(),
            };
            return Ok(ExecutionResult {
                rows_affected,
                rows,
            });
        }

        Err(ExecutionError::new("syntax error").with_sql_state("42601"))
    }

    async fn release(self: Box<Self>) -> std::result::Result<(), ReleaseError> {
        let mut state = self.state.lock().unwrap();
        state.released += 1;
        if state.fail_release {
            return Err(ReleaseError {
                message: "socket already closed".to_string(),
            });
        }
        Ok(())
    }
}
