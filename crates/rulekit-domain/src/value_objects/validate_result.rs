//! Aggregate outcome of rule validation

use serde::{Serialize, Serializer};

use crate::error::{Error, MultiError, Result};

/// Counts of valid and invalid rules plus every collected error
///
/// Built incrementally; every rule is checked even after earlier failures.
#[derive(Debug, Default, Serialize)]
pub struct ValidateResult {
    pub valid: usize,
    pub invalid: usize,
    #[serde(serialize_with = "serialize_errors")]
    errors: MultiError,
}

impl ValidateResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_valid(&mut self) {
        self.valid += 1;
    }

    /// Count one invalid rule and keep its error
    pub fn record_invalid(&mut self, error: Error) {
        self.invalid += 1;
        self.errors.push(error);
    }

    /// Keep an error that is not tied to a single rule count
    pub fn append_error(&mut self, error: Error) {
        self.errors.push(error);
    }

    /// Sum counters and concatenate errors of another result
    pub fn merge(&mut self, other: ValidateResult) {
        self.valid += other.valid;
        self.invalid += other.invalid;
        self.errors.extend(other.errors);
    }

    pub fn total(&self) -> usize {
        self.valid + self.invalid
    }

    /// Collected errors, `None` when every rule validated
    pub fn errors(&self) -> Option<&MultiError> {
        if self.errors.is_empty() {
            None
        } else {
            Some(&self.errors)
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Convert into `Err(Validation)` when anything failed
    pub fn into_result(self) -> Result<ValidateSummary> {
        if self.errors.is_empty() {
            Ok(ValidateSummary {
                valid: self.valid,
                invalid: self.invalid,
            })
        } else {
            Err(Error::Validation(self.errors))
        }
    }
}

/// Counters of a fully successful validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidateSummary {
    pub valid: usize,
    pub invalid: usize,
}

fn serialize_errors<S: Serializer>(
    errors: &MultiError,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(ToString::to_string))
}
