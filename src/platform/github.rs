//! GitHub record service implementation

use crate::error::{Error, Result};
use crate::platform::RecordService;
use crate::types::{Record, RepoConfig};
use async_trait::async_trait;
use octocrab::Octocrab;
use octocrab::models::IssueState;
use octocrab::models::issues::Issue;
use octocrab::params;

/// Directory inside the file repository that receives uploads
const UPLOAD_DIR: &str = "moments";

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: RepoConfig,
}

impl GitHubService {
    /// Create a new GitHub service
    ///
    /// `base_uri` overrides the API root; when `None` it is derived from the
    /// configured host (GitHub Enterprise) or left at api.github.com.
    pub fn new(
        token: &str,
        config: RepoConfig,
        user_agent: &str,
        base_uri: Option<&str>,
    ) -> Result<Self> {
        let mut builder = Octocrab::builder()
            .personal_token(token.to_string())
            .add_header(reqwest::header::USER_AGENT, user_agent.to_string());

        let enterprise = config.host.as_ref().map(|h| format!("https://{h}/api/v3"));
        if let Some(uri) = base_uri.map(ToString::to_string).or(enterprise) {
            builder = builder
                .base_uri(uri.as_str())
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
        }

        let client = builder.build().map_err(|e| Error::GitHubApi(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn issues(&self) -> octocrab::issues::IssueHandler<'_> {
        self.client.issues(&self.config.owner, &self.config.repo)
    }
}

fn to_record(issue: Issue) -> Record {
    Record {
        number: issue.number,
        html_url: issue.html_url.to_string(),
        title: issue.title,
        body: issue.body.unwrap_or_default(),
        labels: issue.labels.into_iter().map(|l| l.name).collect(),
        open: matches!(issue.state, IssueState::Open),
        created_at: issue.created_at,
        updated_at: issue.updated_at,
    }
}

#[async_trait]
impl RecordService for GitHubService {
    async fn create_record(&self, title: &str, body: &str, labels: &[String]) -> Result<Record> {
        let issue = self
            .issues()
            .create(title)
            .body(body)
            .labels(labels.to_vec())
            .send()
            .await?;

        Ok(to_record(issue))
    }

    async fn update_record(&self, number: u64, body: &str, labels: &[String]) -> Result<Record> {
        let issue = self
            .issues()
            .update(number)
            .body(body)
            .labels(labels)
            .send()
            .await?;

        Ok(to_record(issue))
    }

    async fn close_record(&self, number: u64) -> Result<()> {
        self.issues()
            .update(number)
            .state(IssueState::Closed)
            .send()
            .await?;
        Ok(())
    }

    async fn get_record(&self, number: u64) -> Result<Record> {
        match self.issues().get(number).await {
            Ok(issue) => Ok(to_record(issue)),
            Err(octocrab::Error::GitHub { source, .. }) if source.status_code.as_u16() == 404 => {
                Err(Error::RecordNotFound(number))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_recent_open_records(&self, limit: u8) -> Result<Vec<Record>> {
        let page = self
            .issues()
            .list()
            .state(params::State::Open)
            .sort(params::issues::Sort::Created)
            .direction(params::Direction::Descending)
            .per_page(limit)
            .send()
            .await?;

        Ok(page
            .items
            .into_iter()
            .filter(|issue| issue.pull_request.is_none())
            .map(to_record)
            .collect())
    }

    async fn list_labels(&self) -> Result<Vec<String>> {
        let page = self.issues().list_labels_for_repo().per_page(100).send().await?;

        Ok(page.items.into_iter().map(|l| l.name).collect())
    }

    async fn upload_file(&self, name: &str, bytes: &[u8], message: &str) -> Result<String> {
        let path = format!("{UPLOAD_DIR}/{name}");
        let update = self
            .client
            .repos(&self.config.owner, &self.config.file_repo)
            .create_file(path, message, bytes)
            .send()
            .await?;

        update
            .content
            .download_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::GitHubApi(format!("upload of {name} returned no download URL")))
    }
}
