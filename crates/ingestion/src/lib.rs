//! # Ingestion
//!
//! Flight log loading.
//!
//! Responsibilities:
//! - Define the `LogLoader` contract
//! - Read JSON-lines flight logs into `SampleStreams`
//! - Reject streams that go back in time (never re-order)
//! - Generate synthetic flights for demos and tests
//!
//! ## Usage Example
//!
//! ```no_run
//! use ingestion::{JsonlLoader, LogLoader};
//!
//! let streams = JsonlLoader::new("flight.jsonl").load().unwrap();
//! println!("{} inertial samples", streams.inertial.len());
//! ```
//!
//! ## Mock Flight
//!
//! ```
//! use ingestion::{LogLoader, MockFlight, MockFlightConfig};
//!
//! let flight = MockFlight::new(MockFlightConfig { duration_s: 2.0, ..Default::default() });
//! let streams = flight.load().unwrap();
//! assert!(!streams.fixes.is_empty());
//! ```

mod error;
mod loader;
mod mock;

// Re-exports
pub use contracts::SampleStreams;
pub use error::{IngestionError, Result};
pub use loader::{write_jsonl, JsonlLoader, LogLoader};
pub use mock::{MockFlight, MockFlightConfig};
