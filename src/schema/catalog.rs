//! Declarative table definitions and the DDL rendered from them.

use crate::error::{GatewayError, Result};
use crate::schema::dependency::DependencyGraph;
use serde::Serialize;
use std::collections::HashSet;

/// Represents a column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub sql_type: String,
    pub nullable: bool,
    pub default: Option<String>,
    pub check: Option<String>,
}

impl ColumnDefinition {
    pub fn new(name: &str, sql_type: &str) -> Self {
        Self {
            name: name.to_string(),
            sql_type: sql_type.to_string(),
            nullable: true,
            default: None,
            check: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn default_value(mut self, expr: &str) -> Self {
        self.default = Some(expr.to_string());
        self
    }

    pub fn check(mut self, expr: &str) -> Self {
        self.check = Some(expr.to_string());
        self
    }

    fn render(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type);
        if let Some(default) = &self.default {
            sql.push_str(&format!(" DEFAULT {}", default));
        }
        if !self.nullable {
            sql.push_str(" NOT NULL");
        }
        if let Some(check) = &self.check {
            sql.push_str(&format!(" CHECK ({})", check));
        }
        sql
    }
}

/// Represents a foreign key between tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKey {
    pub columns: Vec<String>,
    pub references_table: String,
    pub references_columns: Vec<String>,
}

impl ForeignKey {
    fn render(&self) -> String {
        format!(
            "FOREIGN KEY ({}) REFERENCES {} ({})",
            self.columns.join(", "),
            self.references_table,
            self.references_columns.join(", ")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    pub fn primary_key(mut self, columns: &[&str]) -> Self {
        self.primary_key = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn foreign_key(mut self, columns: &[&str], table: &str, references: &[&str]) -> Self {
        self.foreign_keys.push(ForeignKey {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            references_table: table.to_string(),
            references_columns: references.iter().map(|c| c.to_string()).collect(),
        });
        self
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Tables this table references, without duplicates.
    pub fn depends_on(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.foreign_keys
            .iter()
            .map(|fk| fk.references_table.as_str())
            .filter(|t| seen.insert(t.to_ascii_lowercase()))
            .collect()
    }

    pub fn create_statement(&self) -> String {
        let mut parts: Vec<String> = self.columns.iter().map(ColumnDefinition::render).collect();

        if !self.primary_key.is_empty() {
            parts.push(format!("PRIMARY KEY ({})", self.primary_key.join(", ")));
        }
        parts.extend(self.foreign_keys.iter().map(ForeignKey::render));

        format!("CREATE TABLE {} (\n    {}\n)", self.name, parts.join(",\n    "))
    }

    pub fn drop_statement(&self, cascade: bool) -> String {
        if cascade {
            format!("DROP TABLE {} CASCADE", self.name)
        } else {
            format!("DROP TABLE {}", self.name)
        }
    }
}

/// Ordered set of tables. Catalog order is creation order.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaCatalog {
    tables: Vec<TableDefinition>,
}

impl SchemaCatalog {
    pub fn new(tables: Vec<TableDefinition>) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &[TableDefinition] {
        &self.tables
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Postgres folds unquoted identifiers, so lookups ignore ASCII case.
    pub fn find_table(&self, name: &str) -> Option<&TableDefinition> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn creation_statements(&self) -> Vec<String> {
        self.tables.iter().map(TableDefinition::create_statement).collect()
    }

    /// Dependents before the tables they reference.
    pub fn drop_statements(&self, cascade: bool) -> Vec<String> {
        self.tables
            .iter()
            .rev()
            .map(|t| t.drop_statement(cascade))
            .collect()
    }

    /// Check that the catalog can be created in its own order.
    pub fn validate(&self) -> Result<()> {
        let invalid = |cause: String| GatewayError::InvalidCatalog { cause };
        let mut defined: HashSet<String> = HashSet::new();

        for table in &self.tables {
            if !defined.insert(table.name.to_ascii_lowercase()) {
                return Err(invalid(format!("table {} is defined twice", table.name)));
            }

            if let Some(col) = table.primary_key.iter().find(|c| !table.has_column(c)) {
                return Err(invalid(format!(
                    "primary key of {} names unknown column {}",
                    table.name, col
                )));
            }

            for fk in &table.foreign_keys {
                if fk.columns.is_empty() || fk.columns.len() != fk.references_columns.len() {
                    return Err(invalid(format!(
                        "foreign key on {} ({}) does not match referenced columns ({})",
                        table.name,
                        fk.columns.join(", "),
                        fk.references_columns.join(", ")
                    )));
                }

                if let Some(col) = fk.columns.iter().find(|c| !table.has_column(c)) {
                    return Err(invalid(format!(
                        "foreign key on {} names unknown column {}",
                        table.name, col
                    )));
                }

                let referenced = self.find_table(&fk.references_table).ok_or_else(|| {
                    invalid(format!(
                        "{} references undefined table {}",
                        table.name, fk.references_table
                    ))
                })?;

                if !defined.contains(&referenced.name.to_ascii_lowercase()) {
                    return Err(invalid(format!(
                        "{} references {} before it is created",
                        table.name, referenced.name
                    )));
                }

                if let Some(col) = fk
                    .references_columns
                    .iter()
                    .find(|c| !referenced.has_column(c))
                {
                    return Err(invalid(format!(
                        "{} references unknown column {}.{}",
                        table.name, referenced.name, col
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn dependency_graph(&self) -> DependencyGraph {
        DependencyGraph::from_catalog(self)
    }
}
