pub mod manager;
pub mod models;
pub mod query_builder;
pub mod record;
pub mod repository;
pub mod schema;

pub use manager::{Database, DatabaseError};
pub use record::{Record, RecordError};
pub use repository::Repository;
pub use schema::{initialize, SchemaError, SchemaReport, SeedAdmin};
