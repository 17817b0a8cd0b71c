//! Request middleware.
//!
//! Purpose: Define middleware components for request lifecycle concerns such as
//! tracing and authentication.

pub mod api_key;
pub mod trace;

pub use api_key::{API_KEY_HEADER, ApiKeyGate};
pub use trace::Trace;
