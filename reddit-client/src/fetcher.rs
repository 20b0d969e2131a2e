use crate::api::{RedditApiClient, RedditCommentData, RedditPostData, UserListing};
use persona_core::{CoreError, ErrorExt, Notice, Notifier, ProfileInfo, TextItem, UserContent};
use tracing::info;

/// Result of a best-effort fetch. Failures never propagate; they surface as `Empty`
/// with the cause kept for display.
#[derive(Debug)]
pub enum FetchOutcome {
    Fetched(UserContent),
    Empty { cause: CoreError },
}

impl FetchOutcome {
    /// Content to feed the pipeline; a failed fetch degrades to empty collections and
    /// an empty profile.
    pub fn into_content(self) -> UserContent {
        match self {
            FetchOutcome::Fetched(content) => content,
            FetchOutcome::Empty { .. } => UserContent::default(),
        }
    }
}

pub trait ContentFetcher {
    async fn fetch(&self, username: &str, limit: u32, notifier: &dyn Notifier) -> FetchOutcome;
}

impl RedditApiClient {
    async fn fetch_user_content(&self, username: &str, limit: u32) -> Result<UserContent, CoreError> {
        let profile: ProfileInfo = self.get_user_about(username).await?.into();

        let posts: Vec<RedditPostData> = self
            .get_user_listing(username, UserListing::Submitted, limit)
            .await?;
        let comments: Vec<RedditCommentData> = self
            .get_user_listing(username, UserListing::Comments, limit)
            .await?;

        Ok(UserContent {
            posts: posts.into_iter().map(TextItem::from).collect(),
            comments: comments.into_iter().map(TextItem::from).collect(),
            profile,
        })
    }
}

impl ContentFetcher for RedditApiClient {
    async fn fetch(&self, username: &str, limit: u32, notifier: &dyn Notifier) -> FetchOutcome {
        match self.fetch_user_content(username, limit).await {
            Ok(content) => {
                info!(
                    "Fetched {} posts and {} comments for u/{}",
                    content.posts.len(),
                    content.comments.len(),
                    username
                );
                FetchOutcome::Fetched(content)
            }
            Err(cause) => {
                cause.log_warn();
                notifier.notify(Notice::FetchFailed {
                    username: username.to_string(),
                    message: cause.user_friendly_message(),
                });
                FetchOutcome::Empty { cause }
            }
        }
    }
}
