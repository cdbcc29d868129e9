//! Outbound adapters implementing the driven ports.
//!
//! - **memory**: in-process document and blob stores for tests and local runs
//! - **persistence**: PostgreSQL document store using Diesel
//! - **blob**: filesystem blob store and the shared blob URL scheme
//! - **messaging**: FCM push messenger
//!
//! Adapters translate between domain types and infrastructure
//! representations and carry no business rules.

pub mod blob;
pub mod memory;
pub mod messaging;
pub mod persistence;
