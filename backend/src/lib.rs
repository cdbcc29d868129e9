//! Classroom dashboard backend.
//!
//! - [`domain`]: entities, ports and services
//! - [`inbound`]: HTTP adapter
//! - [`outbound`]: document store, blob store and messaging adapters
//! - [`middleware`]: request tracing
//! - [`settings`]: runtime configuration

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
