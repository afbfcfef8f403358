//! Timeline API client: username lookup and recent posts.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};
use url::Url;

use crate::post::Post;

use super::http_client::{HttpTimeouts, build_api_http_client};
use super::{
    ApiCredentials, DEFAULT_API_BASE_URL, FetchError, MAX_RESULTS_RANGE, PostSource,
};

/// Post fields requested from the timeline endpoint.
const POST_FIELDS: &str = "created_at,text";

#[derive(Debug, Deserialize)]
struct UserLookupResponse {
    data: Option<UserData>,
}

#[derive(Debug, Deserialize)]
struct UserData {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TimelineResponse {
    // Omitted by the API when the account has no posts.
    #[serde(default)]
    data: Vec<Post>,
}

/// Client for the timeline API.
pub struct TimelineClient {
    client: Client,
    base_url: Url,
    credentials: ApiCredentials,
}

impl TimelineClient {
    /// Creates a client against the public API with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when HTTP client construction fails.
    pub fn new(credentials: ApiCredentials) -> Result<Self, FetchError> {
        Self::with_base_url(credentials, DEFAULT_API_BASE_URL, HttpTimeouts::default())
    }

    /// Creates a client against a custom base URL (mock servers, proxies).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidBaseUrl`] when `base_url` is not an
    /// absolute http(s) URL, or [`FetchError::ClientBuild`] when HTTP client
    /// construction fails.
    pub fn with_base_url(
        credentials: ApiCredentials,
        base_url: &str,
        timeouts: HttpTimeouts,
    ) -> Result<Self, FetchError> {
        let base_url = parse_base_url(base_url)?;
        Ok(Self {
            client: build_api_http_client(timeouts)?,
            base_url,
            credentials,
        })
    }

    /// Resolves a username (with or without a leading `@`) to an account id.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on invalid usernames, network failures,
    /// non-success responses, undecodable bodies, or unknown accounts.
    #[instrument(skip(self))]
    pub async fn lookup_user_id(&self, username: &str) -> Result<String, FetchError> {
        let handle = validate_username(username)?;
        let url = self.endpoint(&["2", "users", "by", "username", handle])?;

        let response: UserLookupResponse = self.get_json(url).await?;
        let Some(user) = response.data else {
            return Err(FetchError::UserNotFound {
                username: handle.to_string(),
            });
        };

        debug!(user_id = %user.id, "Resolved username");
        Ok(user.id)
    }

    /// Fetches the most recent posts of an account.
    ///
    /// `max_results` is clamped to the range the API accepts.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on network failures, non-success responses, or
    /// undecodable bodies.
    #[instrument(skip(self))]
    pub async fn fetch_recent_posts(
        &self,
        user_id: &str,
        max_results: u8,
    ) -> Result<Vec<Post>, FetchError> {
        let clamped = max_results.clamp(*MAX_RESULTS_RANGE.start(), *MAX_RESULTS_RANGE.end());
        if clamped != max_results {
            debug!(requested = max_results, clamped, "max_results clamped to API range");
        }

        let mut url = self.endpoint(&["2", "users", user_id, "tweets"])?;
        url.query_pairs_mut()
            .append_pair("max_results", &clamped.to_string())
            .append_pair("tweet.fields", POST_FIELDS);

        let response: TimelineResponse = self.get_json(url).await?;
        info!(posts = response.data.len(), "Fetched recent posts");
        Ok(response.data)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot have path segments".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let url_text = url.to_string();
        let response = self
            .client
            .get(url)
            .bearer_auth(self.credentials.bearer_token())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| FetchError::from_reqwest(&url_text, source))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| FetchError::from_reqwest(&url_text, source))?;

        if !status.is_success() {
            return Err(FetchError::from_status(url_text, status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            url: url_text,
            source,
        })
    }
}

impl std::fmt::Debug for TimelineClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineClient")
            .field("base_url", &self.base_url.as_str())
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PostSource for TimelineClient {
    fn name(&self) -> &'static str {
        "timeline-api"
    }

    async fn recent_posts(&self, username: &str, max_results: u8) -> Result<Vec<Post>, FetchError> {
        let user_id = self.lookup_user_id(username).await?;
        self.fetch_recent_posts(&user_id, max_results).await
    }
}

fn parse_base_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw.trim()).map_err(|error| FetchError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: error.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

/// Strips a leading `@` and checks the handle is a plausible account name.
fn validate_username(raw: &str) -> Result<&str, FetchError> {
    let handle = raw.trim().trim_start_matches('@');
    if handle.is_empty() {
        return Err(FetchError::InvalidUsername {
            username: raw.to_string(),
            reason: "username is empty",
        });
    }
    if !handle
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
    {
        return Err(FetchError::InvalidUsername {
            username: raw.to_string(),
            reason: "only letters, digits and underscores are allowed",
        });
    }
    Ok(handle)
}
