//! CDR Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging for the CDR loader workspace.
//!
//! - **Error Handling**: [`CommonError`] and the [`Result`] alias
//! - **Logging**: [`logging::LogConfig`] and [`logging::init_logging`]
//!
//! # Example
//!
//! ```no_run
//! use cdr_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_logging(&LogConfig::from_env()?)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

pub use error::{CommonError, Result};
