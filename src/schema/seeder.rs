//! Sample data for a freshly provisioned schema.
//!
//! Records are listed parent tables first. Every insert ends in
//! `ON CONFLICT DO NOTHING`, so populating twice leaves the data unchanged.

/// Represents a single seed record
#[derive(Debug, Clone)]
pub struct SeedRecord {
    pub table: &'static str,
    pub columns: &'static [&'static str],
    /// SQL literals, in column order
    pub values: &'static [&'static str],
}

impl SeedRecord {
    pub fn insert_statement(&self) -> String {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT DO NOTHING",
            self.table,
            self.columns.join(", "),
            self.values.join(", ")
        )
    }
}

const ACCOUNT: &[&str] = &[
    "AccountID", "AccountName", "FirstName", "LastName", "Email", "Password", "Rating",
];
const PASSENGER: &[&str] = &[
    "PassengerID", "AccountID", "SubscriptionType", "DiscountPercent", "NumOfReferrals",
];
const DRIVER: &[&str] = &["DriverID", "AccountID", "LicenseNumber", "Experience"];
const REGISTERED_CAR: &[&str] = &["CarID", "DriverID", "CarInsurance"];
const CAR_MODEL: &[&str] = &["VINNumber", "CarModelName", "CarYear"];
const CAR_MAKE: &[&str] = &["CarID", "CarMakeName", "CarModelName", "VINNumber", "CarTier"];
const ITEM: &[&str] = &["ItemID", "ItemName", "ItemPrice", "ItemStore", "ItemDescription"];
const ORDERS: &[&str] = &["OrderID", "OrderDate", "OrderCost", "DriverID"];
const PICKUP_ORDER: &[&str] = &["PickupOrderID", "OrderID", "PassengerID"];
const PACKAGE_ORDER: &[&str] = &["PackageOrderID", "OrderID", "ItemID"];

pub const SEED_RECORDS: &[SeedRecord] = &[
    SeedRecord {
        table: "Account",
        columns: ACCOUNT,
        values: &["1", "'asmith'", "'Alice'", "'Smith'", "'alice@example.com'", "'changeme1'", "5"],
    },
    SeedRecord {
        table: "Account",
        columns: ACCOUNT,
        values: &["2", "'bjones'", "'Bob'", "'Jones'", "'bob@example.com'", "'changeme2'", "4"],
    },
    SeedRecord {
        table: "Passenger",
        columns: PASSENGER,
        values: &["1", "1", "'Premium'", "10", "'2'"],
    },
    SeedRecord {
        table: "Driver",
        columns: DRIVER,
        values: &["1", "2", "'D1234567'", "6"],
    },
    SeedRecord {
        table: "Registered_Car",
        columns: REGISTERED_CAR,
        values: &["1", "1", "'Yes'"],
    },
    SeedRecord {
        table: "Car_Model",
        columns: CAR_MODEL,
        values: &["1823633004352", "'Accord'", "2021"],
    },
    SeedRecord {
        table: "Car_Make",
        columns: CAR_MAKE,
        values: &["1", "'Honda'", "'Accord'", "1823633004352", "'Comfort'"],
    },
    SeedRecord {
        table: "Item",
        columns: ITEM,
        values: &["1", "'Groceries'", "24.99", "'Corner Market'", "'Weekly grocery bag'"],
    },
    SeedRecord {
        table: "Orders",
        columns: ORDERS,
        values: &["1", "DATE '2024-03-01'", "18.25", "1"],
    },
    SeedRecord {
        table: "Orders",
        columns: ORDERS,
        values: &["2", "DATE '2024-03-02'", "7.50", "1"],
    },
    SeedRecord {
        table: "PickupOrder",
        columns: PICKUP_ORDER,
        values: &["1", "1", "1"],
    },
    SeedRecord {
        table: "PackageOrder",
        columns: PACKAGE_ORDER,
        values: &["1", "2", "1"],
    },
];

pub fn seed_statements() -> Vec<String> {
    SEED_RECORDS.iter().map(SeedRecord::insert_statement).collect()
}
