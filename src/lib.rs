//! Serverless build compiler and edge request router.
//!
//! Turns a framework's serverless build output into two deployable function
//! bundles, a routing manifest, a public asset index and a CDN distribution
//! descriptor. The same manifest drives [`router::route`] at request time.

pub mod build;
pub mod cdn;
pub mod config;
pub mod edge;
pub mod error;
pub mod manifest;
pub mod observability;
pub mod redirect;
pub mod router;
pub mod routes;

pub use config::schema::DeployConfig;
pub use error::{Error, Result};
pub use manifest::Manifest;
pub use router::{route, RouteDecision};
