//! Errors tagged with the place they were created
//!
//! ```
//! use ctxlog::LocatedError;
//!
//! let err = LocatedError::new("quota exceeded");
//! assert!(err.to_string().starts_with('{'));
//! assert!(err.to_string().ends_with("} quota exceeded"));
//! ```
//!
//! The prefix is `{dir/file.rs:line}`, the same trimmed form used for the
//! `source` field of log records.

use crate::core::CallSite;
use std::error::Error as StdError;
use std::fmt;
use std::panic::Location;
use thiserror::Error;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Error)]
#[error("{{{site}}} {message}")]
pub struct LocatedError {
    site: String,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl LocatedError {
    #[track_caller]
    pub fn new(message: impl fmt::Display) -> Self {
        Self {
            site: CallSite::from_location(Location::caller()).trimmed(),
            message: message.to_string(),
            source: None,
        }
    }

    /// Tag `err` with the caller's location, keeping it as the source
    #[track_caller]
    pub fn wrap<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            site: CallSite::from_location(Location::caller()).trimmed(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// `{site} message: err`
    #[track_caller]
    pub fn context<E>(message: impl fmt::Display, err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            site: CallSite::from_location(Location::caller()).trimmed(),
            message: format!("{}: {}", message, err),
            source: Some(Box::new(err)),
        }
    }

    /// The trimmed creation site, `dir/file.rs:line`
    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
