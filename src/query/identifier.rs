//! Gate for table names that end up interpolated into SQL.
//!
//! Postgres has no bind parameter for identifiers, so a name is only ever
//! written into a statement after it has matched the catalog or the strict
//! identifier pattern below. Nothing is escaped or quoted.

use crate::error::{GatewayError, Result};
use crate::schema::SchemaCatalog;
use regex::Regex;
use serde::Serialize;
use std::str::FromStr;
use std::sync::OnceLock;

/// Unquoted identifier, within Postgres' 63 byte limit.
const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]{0,62}$";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableNamePolicy {
    /// Only tables in the schema catalog.
    CatalogOnly,
    /// Catalog tables, plus any other plain identifier.
    #[default]
    CatalogOrIdentifier,
}

impl FromStr for TableNamePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "catalog-only" | "catalog_only" => Ok(Self::CatalogOnly),
            "catalog-or-identifier" | "catalog_or_identifier" => Ok(Self::CatalogOrIdentifier),
            other => Err(format!(
                "Invalid table name policy '{}' (expected 'catalog-only' or 'catalog-or-identifier')",
                other
            )),
        }
    }
}

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(IDENTIFIER_PATTERN).expect("identifier pattern is valid"))
}

pub fn is_valid_identifier(name: &str) -> bool {
    identifier_regex().is_match(name)
}

/// Resolve untrusted input to a name that is safe to interpolate.
/// Catalog tables come back in their catalog spelling.
pub fn resolve_table_name(
    catalog: &SchemaCatalog,
    policy: TableNamePolicy,
    raw: &str,
) -> Result<String> {
    if let Some(table) = catalog.find_table(raw) {
        return Ok(table.name.clone());
    }

    match policy {
        TableNamePolicy::CatalogOrIdentifier if is_valid_identifier(raw) => Ok(raw.to_string()),
        _ => Err(GatewayError::InvalidIdentifier {
            name: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::standard_catalog;

    #[test]
    fn test_valid_identifier() {
        assert!(is_valid_identifier("Account"));
        assert!(is_valid_identifier("registered_car"));
        assert!(is_valid_identifier("_staging2"));
        assert!(is_valid_identifier(&"a".repeat(63)));

        assert!(!is_valid_identifier("")); // Empty
        assert!(!is_valid_identifier("'; DROP TABLE Account; --")); // SQL injection attempt
        assert!(!is_valid_identifier("Account; --"));
        assert!(!is_valid_identifier("public.account")); // Qualified names
        assert!(!is_valid_identifier("1_table")); // Starts with number
        assert!(!is_valid_identifier("\"Account\""));
        assert!(!is_valid_identifier("Account\n"));
        assert!(!is_valid_identifier(&"a".repeat(64)));
    }

    #[test]
    fn test_catalog_names_resolve_to_catalog_spelling() {
        let catalog = standard_catalog();
        for policy in [TableNamePolicy::CatalogOnly, TableNamePolicy::CatalogOrIdentifier] {
            assert_eq!(resolve_table_name(&catalog, policy, "ORDERS").unwrap(), "Orders");
            assert_eq!(
                resolve_table_name(&catalog, policy, "registered_car").unwrap(),
                "Registered_Car"
            );
        }
    }

    #[test]
    fn test_unknown_identifier_depends_on_policy() {
        let catalog = standard_catalog();
        assert_eq!(
            resolve_table_name(&catalog, TableNamePolicy::CatalogOrIdentifier, "Coupons").unwrap(),
            "Coupons"
        );
        assert!(matches!(
            resolve_table_name(&catalog, TableNamePolicy::CatalogOnly, "Coupons"),
            Err(GatewayError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn test_injection_rejected_under_every_policy() {
        let catalog = standard_catalog();
        for policy in [TableNamePolicy::CatalogOnly, TableNamePolicy::CatalogOrIdentifier] {
            let err = resolve_table_name(&catalog, policy, "'; DROP TABLE Account; --").unwrap_err();
            assert!(matches!(err, GatewayError::InvalidIdentifier { .. }));
        }
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("catalog-only".parse::<TableNamePolicy>(), Ok(TableNamePolicy::CatalogOnly));
        assert_eq!(
            "CATALOG_OR_IDENTIFIER".parse::<TableNamePolicy>(),
            Ok(TableNamePolicy::CatalogOrIdentifier)
        );
        assert!("anything".parse::<TableNamePolicy>().is_err());
    }
}
