//! sedump common library
//!
//! Shared plumbing for the sedump workspace members:
//!
//! - **Logging**: `tracing` subscriber setup driven by [`logging::LogConfig`]
//! - **Environment**: typed access to environment variables ([`env`])
//! - **Errors**: the [`CommonError`] type returned by the helpers above

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod env;
pub mod error;
pub mod logging;

pub use error::{CommonError, Result};
