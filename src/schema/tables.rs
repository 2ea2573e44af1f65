//! The rideshare schema.
//!
//! Accounts are shared by passengers and drivers; drivers register cars and
//! fulfil orders; an order is either a passenger pickup or an item delivery.
//! Order matters: every table comes after the tables it references.

use crate::schema::catalog::{ColumnDefinition as Col, SchemaCatalog, TableDefinition as Table};

const VIN_RANGE: &str = "VINNumber >= 1 AND VINNumber <= 999999999999999999";

pub fn standard_catalog() -> SchemaCatalog {
    SchemaCatalog::new(vec![
        Table::new("Account")
            .column(Col::new("AccountID", "INT"))
            .column(Col::new("AccountName", "VARCHAR(255)").not_null())
            .column(Col::new("FirstName", "VARCHAR(255)").not_null())
            .column(Col::new("LastName", "VARCHAR(255)").not_null())
            .column(Col::new("Email", "VARCHAR(255)").not_null())
            .column(Col::new("Password", "VARCHAR(255)").not_null())
            .column(Col::new("Rating", "INT").check("Rating >= 1 AND Rating <= 5"))
            .primary_key(&["AccountID"]),
        Table::new("Passenger")
            .column(Col::new("PassengerID", "INT"))
            .column(Col::new("AccountID", "INT"))
            .column(Col::new("SubscriptionType", "VARCHAR(255)"))
            .column(
                Col::new("DiscountPercent", "INT")
                    .check("DiscountPercent >= 0 AND DiscountPercent <= 100"),
            )
            .column(Col::new("NumOfReferrals", "VARCHAR(255)"))
            .primary_key(&["PassengerID"])
            .foreign_key(&["AccountID"], "Account", &["AccountID"]),
        Table::new("Driver")
            .column(Col::new("DriverID", "INT"))
            .column(Col::new("AccountID", "INT"))
            .column(Col::new("LicenseNumber", "VARCHAR(255)").not_null())
            .column(Col::new("Experience", "INT"))
            .primary_key(&["DriverID"])
            .foreign_key(&["AccountID"], "Account", &["AccountID"]),
        Table::new("Registered_Car")
            .column(Col::new("CarID", "INT"))
            .column(Col::new("DriverID", "INT"))
            .column(
                Col::new("CarInsurance", "VARCHAR(255)")
                    .check("CarInsurance = 'Yes' OR CarInsurance = 'No'"),
            )
            .primary_key(&["CarID", "DriverID"])
            .foreign_key(&["DriverID"], "Driver", &["DriverID"]),
        Table::new("Car_Model")
            .column(Col::new("VINNumber", "BIGINT").check(VIN_RANGE))
            .column(Col::new("CarModelName", "VARCHAR(255)"))
            .column(Col::new("CarYear", "INT").check("CarYear > 0 AND CarYear <= 2024"))
            .primary_key(&["VINNumber", "CarModelName"]),
        Table::new("Car_Make")
            .column(Col::new("CarID", "INT"))
            .column(Col::new("CarMakeName", "VARCHAR(255)"))
            .column(Col::new("CarModelName", "VARCHAR(255)"))
            .column(Col::new("VINNumber", "BIGINT").check(VIN_RANGE))
            .column(Col::new("CarTier", "VARCHAR(255)"))
            .primary_key(&["CarID"])
            .foreign_key(
                &["VINNumber", "CarModelName"],
                "Car_Model",
                &["VINNumber", "CarModelName"],
            ),
        Table::new("Item")
            .column(Col::new("ItemID", "INT"))
            .column(Col::new("ItemName", "VARCHAR(255)"))
            .column(Col::new("ItemPrice", "DECIMAL(5, 2)"))
            .column(Col::new("ItemStore", "VARCHAR(255)"))
            .column(Col::new("ItemDescription", "VARCHAR(255)"))
            .primary_key(&["ItemID"]),
        Table::new("Orders")
            .column(Col::new("OrderID", "INT"))
            .column(Col::new("OrderDate", "DATE").default_value("CURRENT_DATE"))
            .column(Col::new("OrderCost", "DECIMAL(5, 2)"))
            .column(Col::new("DriverID", "INT"))
            .primary_key(&["OrderID"])
            .foreign_key(&["DriverID"], "Driver", &["DriverID"]),
        Table::new("PickupOrder")
            .column(Col::new("PickupOrderID", "INT"))
            .column(Col::new("OrderID", "INT"))
            .column(Col::new("PassengerID", "INT"))
            .primary_key(&["PickupOrderID"])
            .foreign_key(&["OrderID"], "Orders", &["OrderID"])
            .foreign_key(&["PassengerID"], "Passenger", &["PassengerID"]),
        Table::new("PackageOrder")
            .column(Col::new("PackageOrderID", "INT"))
            .column(Col::new("OrderID", "INT"))
            .column(Col::new("ItemID", "INT"))
            .primary_key(&["PackageOrderID"])
            .foreign_key(&["OrderID"], "Orders", &["OrderID"])
            .foreign_key(&["ItemID"], "Item", &["ItemID"]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPECTED_ORDER: [&str; 10] = [
        "Account",
        "Passenger",
        "Driver",
        "Registered_Car",
        "Car_Model",
        "Car_Make",
        "Item",
        "Orders",
        "PickupOrder",
        "PackageOrder",
    ];

    #[test]
    fn test_catalog_tables() {
        let catalog = standard_catalog();
        assert_eq!(catalog.table_names(), EXPECTED_ORDER);
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_no_statement_references_a_later_table() {
        let catalog = standard_catalog();
        let statements = catalog.creation_statements();
        assert_eq!(statements.len(), 10);

        for (i, table) in catalog.tables().iter().enumerate() {
            for dep in table.depends_on() {
                let created_at = statements
                    .iter()
                    .position(|s| s.starts_with(&format!("CREATE TABLE {} (", dep)))
                    .unwrap_or_else(|| panic!("{} never created", dep));
                assert!(created_at < i, "{} created after {}", dep, table.name);
                assert!(statements[i].contains(&format!("REFERENCES {} (", dep)));
            }
        }
    }

    #[test]
    fn test_catalog_order_is_topological() {
        let catalog = standard_catalog();
        let order = catalog.dependency_graph().topological_order().unwrap();
        assert_eq!(order, EXPECTED_ORDER);
    }

    #[test]
    fn test_named_dependencies() {
        let graph = standard_catalog().dependency_graph();
        assert_eq!(graph.depends_on("PickupOrder"), ["Orders".to_string(), "Passenger".to_string()]);
        assert_eq!(graph.depends_on("Car_Make"), ["Car_Model".to_string()]);
        assert_eq!(
            graph.dependents("Account"),
            ["Passenger".to_string(), "Driver".to_string()]
        );
    }

    #[test]
    fn test_composite_keys_rendered() {
        let statements = standard_catalog().creation_statements();
        assert!(statements[3].contains("PRIMARY KEY (CarID, DriverID)"));
        assert!(statements[5].contains(
            "FOREIGN KEY (VINNumber, CarModelName) REFERENCES Car_Model (VINNumber, CarModelName)"
        ));
        assert!(statements[7].contains("OrderDate DATE DEFAULT CURRENT_DATE"));
    }

    #[test]
    fn test_drop_statements_cascade_every_table() {
        let catalog = standard_catalog();
        let drops = catalog.drop_statements(true);
        assert_eq!(drops.len(), 10);
        assert_eq!(drops[0], "DROP TABLE PackageOrder CASCADE");
        assert_eq!(drops[9], "DROP TABLE Account CASCADE");
    }
}
