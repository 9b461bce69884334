//! Record service factory
//!
//! Creates the record service from configuration.

use crate::auth::get_github_auth;
use crate::error::Result;
use crate::platform::{GitHubService, RecordService};
use crate::types::RepoConfig;
use std::sync::Arc;

/// Create a record service from configuration
///
/// Handles authentication and client construction.
pub async fn create_record_service(
    config: &RepoConfig,
    user_agent: &str,
) -> Result<Arc<dyn RecordService>> {
    let auth = get_github_auth().await?;
    tracing::debug!(source = ?auth.source, "resolved GitHub token");

    Ok(Arc::new(GitHubService::new(
        &auth.token,
        config.clone(),
        user_agent,
        None,
    )?))
}
