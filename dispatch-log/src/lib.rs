//! Logging facade for the dispatch crates.
//!
//! # Setup
//!
//! Logging is backed by [`tracing`]. Library crates in this workspace emit
//! events through the macros re-exported here and never install a subscriber
//! themselves. Binaries and embedding applications either install their own
//! `tracing` subscriber, or enable the `init` feature and invoke [`init`]
//! with a [`LogConfig`]:
//!
//! ```ignore
//! let config = dispatch_log::LogConfig {
//!     level: dispatch_log::LogLevel::Debug,
//!     ..Default::default()
//! };
//!
//! dispatch_log::init(&config);
//! ```
//!
//! # Logging
//!
//! The basic use of this crate is through the five logging macros:
//! [`error!`], [`warn!`], [`info!`], [`debug!`] and [`trace!`] where `error!`
//! represents the highest-priority messages and `trace!` the lowest. The
//! macros accept format strings as well as structured fields; see the
//! [`tracing`] documentation for the full syntax.
//!
//! ## Conventions
//!
//! Log messages should start lowercase and end without punctuation. Prefer
//! short and precise log messages over verbose text. Attach errors as
//! structured fields rather than interpolating them:
//!
//! ```
//! use std::error::Error;
//! use std::io;
//!
//! let error = io::Error::other("oh no!");
//! dispatch_log::debug!(error = &error as &dyn Error, "failed to claim work");
//! ```
//!
//! Choose the log level according to these rules:
//!
//! - [`error!`] for bugs and invalid behavior.
//! - [`warn!`] for undesirable behavior.
//! - [`info!`] for messages relevant to the average user.
//! - [`debug!`] for messages usually relevant to debugging.
//! - [`trace!`] for full auxiliary information.
//!
//! ## Logging Error Types
//!
//! Where a format string is more convenient than structured fields, the
//! [`LogError`] wrapper formats an error together with all its sources:
//!
//! ```
//! use std::io;
//!
//! use dispatch_log::LogError;
//!
//! let error = io::Error::other("oh no!");
//! dispatch_log::error!("operation failed: {}", LogError(&error));
//! ```
//!
//! # Testing
//!
//! For unit testing there is a separate initialization macro [`init_test!`]
//! behind the `test` feature. It should be called at the beginning of the
//! test, enables capture by the Rust test runner, and raises the log level
//! for the calling crate:
//!
//! ```ignore
//! #[test]
//! fn test_something() {
//!     dispatch_log::init_test!();
//! }
//! ```

#![warn(missing_docs)]

#[cfg(feature = "init")]
mod setup;
#[cfg(feature = "init")]
pub use setup::*;

#[cfg(feature = "test")]
mod test;
#[cfg(feature = "test")]
pub use test::*;

mod utils;
pub use utils::*;

// Expose the minimal log facade.
#[doc(inline)]
pub use tracing::{debug, error, info, trace, warn};
