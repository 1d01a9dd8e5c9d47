//! # Predecir
//!
//! HTTP prediction service for registry-versioned classification models.
//!
//! Predecir (Spanish: "to predict") binds one pre-trained binary
//! classifier from a versioned model registry at startup and exposes it
//! through a small JSON surface. The model is trained and versioned
//! elsewhere; this crate only turns a JSON request body into a fixed-width
//! feature row, runs a single-row batch through the bound handle, and
//! returns the scalar label.
//!
//! ## Startup contract
//!
//! The service obtains a usable model handle before accepting traffic or
//! refuses to start: configuration and registry failures are fatal and not
//! retried. Once bound, the handle is immutable for the process lifetime
//! and shared read-only across requests.
//!
//! ## Example
//!
//! ```rust
//! use predecir::registry::ModelUri;
//!
//! let uri = ModelUri::new("rumos_bank_model", "champion");
//! assert_eq!(uri.to_string(), "models:/rumos_bank_model@champion");
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod registry;
pub mod schema;

pub use error::{PredecirError, Result};

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
