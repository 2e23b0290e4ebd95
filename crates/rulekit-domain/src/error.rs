//! Error handling types

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::value_objects::TestMetrics;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for rulekit
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (simple form)
    #[error("I/O error: {source}")]
    IoSimple {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// I/O operation error (with context)
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Resource not found error
    #[error("Not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// A single rule directory that could not be turned into a rule
    #[error("Invalid rule directory {}: {message}", path.display())]
    RuleDirectory {
        /// Offending directory
        path: PathBuf,
        /// What is wrong with it
        message: String,
    },

    /// Rule discovery failed for one or more directories
    #[error("Rule discovery failed: {0}")]
    Discovery(MultiError),

    /// Malformed rule source
    #[error("Parse error in {}: {message}", path.display())]
    Parse {
        /// File that failed to parse
        path: PathBuf,
        /// Description of the problem
        message: String,
    },

    /// A rule declares a target its backend cannot evaluate
    #[error("Rule {rule_id} targets {target}, which the {rule_type} rule type does not support")]
    UnsupportedTarget {
        /// Rule identifier
        rule_id: String,
        /// Target name
        target: String,
        /// Backend name
        rule_type: String,
    },

    /// One or more rules are invalid
    #[error("Validation failed: {0}")]
    Validation(MultiError),

    /// Rendering or archiving rules failed
    #[error("Packaging failed: {message}")]
    Packaging {
        /// Which backend/rule/target failed
        message: String,
        /// Underlying cause
        #[source]
        source: Option<Box<Error>>,
    },

    /// A single test-runner invocation failed
    #[error("Test of {rule_id} ({target}) on {} failed to run: {message}", fixture.display())]
    TestExecution {
        /// Rule identifier
        rule_id: String,
        /// Target name
        target: String,
        /// Fixture that was being evaluated
        fixture: PathBuf,
        /// Description of the failure
        message: String,
    },

    /// An external scanner ran but its report could not be used
    #[error("{tool} scan failed: {message}")]
    Scan {
        /// Tool name
        tool: String,
        /// What went wrong
        message: String,
        /// Captured standard error of the tool
        stderr: String,
    },

    /// The test matrix completed with failures
    #[error("{} of {} tests failed", metrics.failed, metrics.total())]
    TestsFailed {
        /// Complete metrics of the run
        metrics: TestMetrics,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Upload collaborator reported a failure
    #[error("Upload error: {message}")]
    Upload {
        /// Description of the upload error
        message: String,
    },
}

impl Error {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a rule directory error
    pub fn rule_directory<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        Self::RuleDirectory {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error with source
    pub fn io_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a packaging error wrapping its cause
    pub fn packaging<S: Into<String>>(message: S, source: Error) -> Self {
        Self::Packaging {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Whether this error came out of rule discovery
    pub fn is_discovery(&self) -> bool {
        matches!(self, Self::RuleDirectory { .. } | Self::Discovery(_))
    }
}

/// Ordered collection of independent errors with a combined rendering
#[derive(Debug, Default)]
pub struct MultiError {
    errors: Vec<Error>,
}

impl MultiError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: Error) {
        self.errors.push(error);
    }

    /// Append every cause of `other`, keeping order
    pub fn extend(&mut self, other: MultiError) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Error> {
        self.errors.iter()
    }

    pub fn into_errors(self) -> Vec<Error> {
        self.errors
    }

    /// `None` when empty, the aggregate otherwise
    pub fn into_option(self) -> Option<Self> {
        if self.is_empty() { None } else { Some(self) }
    }
}

impl From<Vec<Error>> for MultiError {
    fn from(errors: Vec<Error>) -> Self {
        Self { errors }
    }
}

impl IntoIterator for MultiError {
    type Item = Error;
    type IntoIter = std::vec::IntoIter<Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.len() {
            0 => write!(f, "no errors"),
            1 => write!(f, "{}", self.errors[0]),
            n => {
                write!(f, "{n} errors occurred:")?;
                for error in &self.errors {
                    write!(f, "\n  - {error}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for MultiError {}
