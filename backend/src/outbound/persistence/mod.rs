//! PostgreSQL persistence using Diesel with `diesel-async` and `bb8`.
//!
//! Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module; the only public adapter is
//! [`DieselDocumentStore`], which speaks domain types.
//!
//! ```ignore
//! use classdesk::outbound::persistence::{DbPool, DieselDocumentStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/classdesk")).await?;
//! let store = DieselDocumentStore::new(pool);
//! ```

mod diesel_document_store;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_document_store::DieselDocumentStore;
pub use migrations::run_migrations;
pub use pool::{DbPool, PoolConfig, PoolError};
