//! Focus forum core: account and reply use-cases behind an actix-web API.
//!
//! Layers follow a ports-and-adapters split: [`domain`] holds the rules,
//! [`inbound`] adapts HTTP requests onto the driving ports and [`outbound`]
//! implements storage, avatars and sessions.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::{TRACE_ID_HEADER, TraceId};
pub use middleware::Trace;
