//! Shared error type.
//!
//! - [`Error`] / [`Result`] - error handling for every layer

mod error;

pub use error::*;
