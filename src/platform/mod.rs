//! Record platform services
//!
//! The relay publishes into a remote record store (GitHub issues) through
//! [`RecordService`], so the state machines can run against a mock.

mod factory;
mod github;

pub use factory::create_record_service;
pub use github::GitHubService;

use crate::error::Result;
use crate::types::Record;
use async_trait::async_trait;

/// Record service trait for issue operations
///
/// Implementations never retry; a failed call is reported once to the caller.
#[async_trait]
pub trait RecordService: Send + Sync {
    /// Create a record with a title, body and non-empty label set
    async fn create_record(&self, title: &str, body: &str, labels: &[String]) -> Result<Record>;

    /// Replace the body and labels of an existing record
    async fn update_record(&self, number: u64, body: &str, labels: &[String]) -> Result<Record>;

    /// Close (soft-delete) a record
    async fn close_record(&self, number: u64) -> Result<()>;

    /// Fetch a single record
    async fn get_record(&self, number: u64) -> Result<Record>;

    /// Most recently created open records, newest first
    async fn list_recent_open_records(&self, limit: u8) -> Result<Vec<Record>>;

    /// Names of all labels defined on the record repository
    async fn list_labels(&self) -> Result<Vec<String>>;

    /// Store a file and return its download URL
    async fn upload_file(&self, name: &str, bytes: &[u8], message: &str) -> Result<String>;
}
