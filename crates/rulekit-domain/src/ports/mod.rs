//! Port traits implemented by providers and external collaborators

pub mod rule_type;
pub mod test_runner;
pub mod uploader;

pub use rule_type::RuleType;
pub use test_runner::{RunOptions, ScanRequest, Scanner, TestRunner};
pub use uploader::{PolicyUploader, UploadRequest};
