//! Error extension utilities
//!
//! Context extension methods turning foreign errors into domain errors.

use std::fmt;

use rulekit_domain::{Error, Result};

/// Extension trait for adding context to errors
///
/// # Example
///
/// ```ignore
/// use rulekit_infrastructure::error_ext::ErrorContext;
///
/// std::fs::write(&path, content)
///     .with_context(|| format!("Failed to write config file: {}", path.display()))?;
///
/// let config: RulekitConfig = figment.extract().config_context("Failed to extract configuration")?;
/// ```
pub trait ErrorContext<T> {
    /// Add lazily built context, converting the error to an I/O-class domain error
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;

    /// Add context for configuration operations
    fn config_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|err| Error::Io {
            message: format!("{}: {err}", f()),
            source: Some(Box::new(err)),
        })
    }

    fn config_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| Error::Configuration {
            message: format!("{context}: {err}"),
            source: Some(Box::new(err)),
        })
    }
}
