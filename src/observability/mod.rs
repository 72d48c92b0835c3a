//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, histograms via the `metrics` facade)
//!
//! Consumers:
//!     → stdout through the fmt subscriber
//!     → whatever metrics recorder the embedding process installs
//! ```
//!
//! # Design Decisions
//! - Structured fields rather than formatted strings
//! - Metric updates are no-ops until a recorder is installed
//! - The router only logs at debug level so the hot path stays quiet

pub mod logging;
pub mod metrics;
