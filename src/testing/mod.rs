//! Fixtures shared by unit tests.

use crate::config::AppConfig;
use crate::database::{initialize, Database, Record, SeedAdmin};

/// Fresh in-memory database with the schema applied and the default admin seeded.
pub async fn memory_database() -> Database {
    let config = AppConfig::for_tests();
    let db = Database::connect(&config).await.expect("connect in-memory database");
    initialize(&db, &SeedAdmin::from(&config.security))
        .await
        .expect("initialize schema");
    db
}

pub fn property_record(name: &str, address: Option<&str>, status: Option<&str>) -> Record {
    let mut record = Record::new();
    record.set("name", name);
    if let Some(address) = address {
        record.set("address", address);
    }
    if let Some(status) = status {
        record.set("status", status);
    }
    record
}
