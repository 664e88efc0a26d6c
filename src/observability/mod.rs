//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (debug: per exchange / per script,
//!       warn: dropped secondary resources, info: page summaries)
//!
//! Consumers:
//!     → logging.rs subscriber (stderr, human or JSON lines)
//! ```
//!
//! # Design Decisions
//! - The library only emits events; installing a subscriber is left to
//!   the binary
//! - Structured fields (`url`, `status`, `features`) over formatted text

pub mod logging;

pub use logging::init_logging;
