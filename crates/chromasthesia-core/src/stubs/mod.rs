//! Stub implementations of the boundary traits for tests.
//!
//! All stub exports are gated with `#[cfg(any(test, feature = "test-utils"))]`:
//! production code cannot import these unless the `test-utils` feature is
//! explicitly enabled, which should never happen in production builds.
//!
//! Each stub is scriptable (per-input outcomes) and records its calls, so
//! integration tests can assert on the exact sequence of remote interactions
//! without a network.
//!
//! # Usage
//!
//! ```ignore
//! // In Cargo.toml for downstream test crates:
//! // [dev-dependencies]
//! // chromasthesia-core = { workspace = true, features = ["test-utils"] }
//!
//! use chromasthesia_core::stubs::{StubClassifier, StubSearchBackend};
//! ```

#[cfg(any(test, feature = "test-utils"))]
mod backends;

#[cfg(any(test, feature = "test-utils"))]
pub use backends::{StubClassifier, StubImageFetcher, StubPhotoResolver, StubSearchBackend};
