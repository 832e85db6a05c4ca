use contacts_core::sources::google::{ConnectionsPage, PERSON_FIELDS};
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://people.googleapis.com";

#[derive(Debug, Error)]
pub enum GooglePeopleError {
    #[error("Google rejected the access token")]
    Unauthorized,

    #[error("Google People request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Google People returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Fetches the caller's connections from the Google People API.
///
/// The caller supplies an OAuth access token; obtaining and refreshing it
/// happens outside this service.
pub struct GooglePeopleClient {
    http: reqwest::Client,
    base_url: String,
}

impl GooglePeopleClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn list_connections(
        &self,
        access_token: &str,
        page_size: usize,
    ) -> Result<ConnectionsPage, GooglePeopleError> {
        let url = format!("{}/v1/people/me/connections", self.base_url);

        tracing::debug!("Fetching up to {} Google connections", page_size);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("pageSize", page_size.to_string()),
                ("personFields", PERSON_FIELDS.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(GooglePeopleError::Unauthorized);
        }
        if !status.is_success() {
            return Err(GooglePeopleError::Status(status));
        }

        Ok(response.json::<ConnectionsPage>().await?)
    }
}

impl Default for GooglePeopleClient {
    fn default() -> Self {
        Self::new()
    }
}
