use crate::rate_limiter::{RateLimitConfig, RateLimiter};
use chrono::DateTime;
use persona_core::{CoreError, ProfileInfo, RedditApiError, RedditSettings, TextItem};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const PERMALINK_BASE: &str = "https://reddit.com";
/// Reddit never returns more than this many children per listing page.
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub dist: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    pub permalink: String,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub created_utc: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditCommentData {
    pub id: String,
    #[serde(default)]
    pub body: String,
    pub permalink: String,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub created_utc: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditUserData {
    pub name: String,
    #[serde(default)]
    pub icon_img: Option<String>,
    #[serde(default)]
    pub link_karma: i64,
    #[serde(default)]
    pub comment_karma: i64,
    #[serde(default)]
    pub created_utc: Option<f64>,
    #[serde(default)]
    pub is_suspended: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserListing {
    Submitted,
    Comments,
}

impl UserListing {
    fn path(self) -> &'static str {
        match self {
            UserListing::Submitted => "submitted",
            UserListing::Comments => "comments",
        }
    }
}

/// Client for Reddit's public JSON endpoints.
#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    rate_limiter: Arc<RateLimiter>,
    base_url: String,
}

impl RedditApiClient {
    pub fn new(settings: &RedditSettings) -> Result<Self, CoreError> {
        let rate_config = RateLimitConfig::per_minute(settings.requests_per_minute);
        let rate_limiter = Arc::new(RateLimiter::new(rate_config));

        let http_client = Client::builder()
            .user_agent(&settings.user_agent)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            rate_limiter,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn make_request(
        &self,
        username: &str,
        endpoint: &str,
        query_params: &[(&str, String)],
    ) -> Result<Response, CoreError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let permit = self.rate_limiter.acquire_permit().await?;
        debug!(
            "Acquired rate limit permit for {} after {:?}",
            endpoint, permit.queue_wait_time
        );

        info!("Making Reddit API request: GET {}", endpoint);
        let response = match self.http_client.get(&url).query(query_params).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Network error for GET {}: {}", endpoint, e);
                if e.is_timeout() {
                    return Err(RedditApiError::RequestTimeout.into());
                }
                return Err(CoreError::Network(e));
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!("Request successful: {} {}", status, endpoint);
            return Ok(response);
        }

        error!("Request failed with status: {} for {}", status, endpoint);
        let err = match status {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.trim().parse::<u64>().ok())
                    .unwrap_or(60);
                warn!("Rate limited, retry after {} seconds", retry_after);
                RedditApiError::RateLimitExceeded { retry_after }
            }
            StatusCode::NOT_FOUND => RedditApiError::UserNotFound {
                username: username.to_string(),
            },
            StatusCode::FORBIDDEN => RedditApiError::Forbidden {
                resource: endpoint.to_string(),
            },
            s if s.is_server_error() => RedditApiError::ServerError {
                status_code: s.as_u16(),
            },
            s => RedditApiError::InvalidResponse {
                details: format!("unexpected status {} for {}", s, endpoint),
            },
        };
        Err(err.into())
    }

    async fn parse<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, CoreError> {
        response.json().await.map_err(|e| {
            error!("Failed to parse {}: {}", what, e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse {}", what),
            })
        })
    }

    pub async fn get_user_about(&self, username: &str) -> Result<RedditUserData, CoreError> {
        let endpoint = format!("/user/{}/about.json", username);
        let response = self
            .make_request(username, &endpoint, &[("raw_json", "1".to_string())])
            .await?;

        let about: RedditListingChild<RedditUserData> =
            Self::parse(response, &format!("profile of u/{}", username)).await?;

        if about.data.is_suspended {
            warn!("u/{} is suspended", username);
            return Err(RedditApiError::UserSuspended {
                username: username.to_string(),
            }
            .into());
        }

        debug!("Retrieved user info for: {}", about.data.name);
        Ok(about.data)
    }

    /// Newest-first items of one of a user's listings, following `after` cursors until
    /// `limit` items are collected or the listing ends.
    pub async fn get_user_listing<T: DeserializeOwned>(
        &self,
        username: &str,
        listing: UserListing,
        limit: u32,
    ) -> Result<Vec<T>, CoreError> {
        let endpoint = format!("/user/{}/{}.json", username, listing.path());
        let wanted = limit as usize;
        let mut items: Vec<T> = Vec::with_capacity(wanted.min(MAX_PAGE_SIZE as usize));
        let mut after: Option<String> = None;

        while items.len() < wanted {
            let page_size = (wanted - items.len()).min(MAX_PAGE_SIZE as usize);
            let mut params = vec![
                ("sort", "new".to_string()),
                ("limit", page_size.to_string()),
                ("raw_json", "1".to_string()),
            ];
            if let Some(cursor) = &after {
                params.push(("after", cursor.clone()));
            }

            let response = self.make_request(username, &endpoint, &params).await?;
            let page: RedditListing<T> =
                Self::parse(response, &format!("{} of u/{}", listing.path(), username)).await?;

            let received = page.data.children.len();
            items.extend(page.data.children.into_iter().map(|child| child.data));
            after = page.data.after;

            if received == 0 || after.is_none() {
                break;
            }
        }

        items.truncate(wanted);
        info!(
            "Retrieved {} {} for u/{}",
            items.len(),
            listing.path(),
            username
        );
        Ok(items)
    }
}

pub fn permalink_url(permalink: &str) -> String {
    format!("{}{}", PERMALINK_BASE, permalink)
}

impl From<RedditPostData> for TextItem {
    fn from(post_data: RedditPostData) -> Self {
        TextItem::Post {
            title: post_data.title,
            body: post_data.selftext,
            source_url: permalink_url(&post_data.permalink),
        }
    }
}

impl From<RedditCommentData> for TextItem {
    fn from(comment_data: RedditCommentData) -> Self {
        TextItem::Comment {
            body: comment_data.body,
            source_url: permalink_url(&comment_data.permalink),
        }
    }
}

impl From<RedditUserData> for ProfileInfo {
    fn from(user: RedditUserData) -> Self {
        Self {
            display_name: user.name,
            avatar_url: user.icon_img.filter(|url| !url.is_empty()),
            karma_total: user.link_karma + user.comment_karma,
            account_created: user
                .created_utc
                .and_then(|secs| DateTime::from_timestamp(secs as i64, 0))
                .map(|created| created.date_naive()),
        }
    }
}
