/// Database record definitions and shared enums.
pub mod models;
/// DDL executed at startup.
pub mod schema;
/// CRUD and row-locking primitives over PostgreSQL.
pub mod store;
