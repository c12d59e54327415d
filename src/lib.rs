//! Assessment and attendance engine for the school back-office.
//!
//! Every computation here is a pure function over records the storage layer
//! already fetched; the `ipc` module exposes them to the UI as a
//! line-delimited JSON sidecar.

pub mod attendance;
pub mod calc;
pub mod config;
pub mod error;
pub mod import;
pub mod ipc;
pub mod model;

pub use error::{CalcError, Result};
