use crate::schema::catalog::SchemaCatalog;
use serde::Serialize;
use std::collections::BTreeMap;

/// Foreign-key graph over a catalog.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyGraph {
    /// Table names in catalog order
    tables: Vec<String>,
    /// table → tables it references
    depends_on: BTreeMap<String, Vec<String>>,
    /// table → tables referencing it
    dependents: BTreeMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn from_catalog(catalog: &SchemaCatalog) -> Self {
        let tables: Vec<String> = catalog.table_names().iter().map(|t| t.to_string()).collect();
        let mut depends_on: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut dependents: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for table in catalog.tables() {
            depends_on.entry(table.name.clone()).or_default();
            dependents.entry(table.name.clone()).or_default();
        }

        for table in catalog.tables() {
            for dep in table.depends_on() {
                // Resolve to the catalog spelling; unknown targets are left as written
                let dep = catalog
                    .find_table(dep)
                    .map(|t| t.name.clone())
                    .unwrap_or_else(|| dep.to_string());

                if dep == table.name {
                    continue;
                }
                depends_on.entry(table.name.clone()).or_default().push(dep.clone());
                dependents.entry(dep).or_default().push(table.name.clone());
            }
        }

        Self {
            tables,
            depends_on,
            dependents,
        }
    }

    pub fn depends_on(&self, table: &str) -> &[String] {
        self.depends_on.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn dependents(&self, table: &str) -> &[String] {
        self.dependents.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Kahn's algorithm, breaking ties by catalog position so an already
    /// valid catalog order comes back unchanged.
    pub fn topological_order(&self) -> Result<Vec<String>, String> {
        let position = |name: &str| self.tables.iter().position(|t| t == name).unwrap_or(usize::MAX);

        let mut in_degree: BTreeMap<&str, usize> = self
            .tables
            .iter()
            .map(|t| (t.as_str(), self.depends_on(t).len()))
            .collect();

        let mut ready: Vec<&str> = in_degree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(name, _)| *name)
            .collect();

        let mut order = Vec::with_capacity(self.tables.len());

        while !ready.is_empty() {
            ready.sort_by_key(|name| std::cmp::Reverse(position(name)));
            let Some(next) = ready.pop() else { break };
            order.push(next.to_string());

            for dependent in self.dependents(next) {
                if let Some(deg) = in_degree.get_mut(dependent.as_str()) {
                    *deg -= 1;
                    if *deg == 0 {
                        ready.push(dependent.as_str());
                    }
                }
            }
        }

        if order.len() != self.tables.len() {
            let stuck: Vec<&str> = self
                .tables
                .iter()
                .map(String::as_str)
                .filter(|t| !order.iter().any(|o| o == t))
                .collect();
            return Err(format!(
                "Circular dependency detected between: {}",
                stuck.join(", ")
            ));
        }

        Ok(order)
    }

    /// Human-readable summary, printed by `ddl-preview`.
    pub fn format(&self) -> String {
        let mut output = String::new();

        output.push_str("DEPENDENCY GRAPH (table → depends on):\n");
        for table in &self.tables {
            let deps = self.depends_on(table);
            if deps.is_empty() {
                output.push_str(&format!("  {} → (no dependencies)\n", table));
            } else {
                output.push_str(&format!("  {} → {}\n", table, deps.join(", ")));
            }
        }
        output.push('\n');

        output.push_str("REVERSE DEPENDENCIES (table ← depended on by):\n");
        for table in &self.tables {
            let deps = self.dependents(table);
            if !deps.is_empty() {
                output.push_str(&format!("  {} ← {}\n", table, deps.join(", ")));
            }
        }

        output
    }
}
