use persona_core::{CollectingNotifier, CoreError, Notice, RedditApiError, RedditSettings, TextItem};
use reddit_client::{ContentFetcher, FetchOutcome, RedditApiClient};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer) -> RedditSettings {
    RedditSettings {
        user_agent: "reddit-persona-tests/0.1".to_string(),
        base_url: server.uri(),
        requests_per_minute: 6000,
        ..Default::default()
    }
}

fn about(name: &str) -> Value {
    json!({
        "kind": "t2",
        "data": {
            "name": name,
            "icon_img": "https://styles.redditmedia.com/avatar.png",
            "link_karma": 100,
            "comment_karma": 23,
            "created_utc": 1_600_000_000.0
        }
    })
}

fn listing(kind: &str, children: Vec<Value>, after: Option<&str>) -> Value {
    json!({
        "kind": "Listing",
        "data": {
            "after": after,
            "before": null,
            "dist": children.len(),
            "children": children.into_iter().map(|data| json!({"kind": kind, "data": data})).collect::<Vec<_>>()
        }
    })
}

fn post(i: usize) -> Value {
    json!({
        "id": format!("p{i}"),
        "title": format!("Post {i}"),
        "selftext": format!("Body {i}"),
        "permalink": format!("/r/test/comments/p{i}/post_{i}/"),
        "subreddit": "test",
        "created_utc": 1_700_000_000.0
    })
}

fn comment(i: usize) -> Value {
    json!({
        "id": format!("c{i}"),
        "body": format!("Comment {i}"),
        "permalink": format!("/r/test/comments/p0/post_0/c{i}/"),
        "subreddit": "test",
        "created_utc": 1_700_000_000.0
    })
}

async fn mount_about(server: &MockServer, name: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/user/{name}/about.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(about(name)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_returns_posts_comments_and_profile() {
    let server = MockServer::start().await;
    mount_about(&server, "alice").await;

    Mock::given(method("GET"))
        .and(path("/user/alice/submitted.json"))
        .and(query_param("sort", "new"))
        .and(query_param("limit", "30"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(listing("t3", (0..7).map(post).collect(), None)),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user/alice/comments.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(listing("t1", (0..3).map(comment).collect(), None)),
        )
        .mount(&server)
        .await;

    let client = RedditApiClient::new(&settings(&server)).unwrap();
    let notifier = CollectingNotifier::new();
    let outcome = client.fetch("alice", 30, &notifier).await;

    let content = match outcome {
        FetchOutcome::Fetched(content) => content,
        FetchOutcome::Empty { cause } => panic!("unexpected fetch failure: {cause}"),
    };

    assert_eq!(content.posts.len(), 7);
    assert_eq!(content.comments.len(), 3);
    assert_eq!(content.profile.display_name, "alice");
    assert_eq!(content.profile.karma_total, 123);
    assert_eq!(content.profile.cake_day(), "2020-09-13");
    assert_eq!(
        content.posts[0],
        TextItem::Post {
            title: "Post 0".to_string(),
            body: "Body 0".to_string(),
            source_url: "https://reddit.com/r/test/comments/p0/post_0/".to_string(),
        }
    );
    assert_eq!(
        content.source_urls()[7],
        "https://reddit.com/r/test/comments/p0/post_0/c0/"
    );
    assert!(notifier.notices().is_empty());
}

#[tokio::test]
async fn test_fetch_follows_pagination_up_to_limit() {
    let server = MockServer::start().await;
    mount_about(&server, "bob").await;

    Mock::given(method("GET"))
        .and(path("/user/bob/submitted.json"))
        .and(query_param_is_missing("after"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(listing("t3", (0..100).map(post).collect(), Some("t3_page2"))),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user/bob/submitted.json"))
        .and(query_param("after", "t3_page2"))
        .and(query_param("limit", "20"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(listing("t3", (100..120).map(post).collect(), Some("t3_page3"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user/bob/comments.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing("t1", vec![], None)))
        .mount(&server)
        .await;

    let client = RedditApiClient::new(&settings(&server)).unwrap();
    let content = client
        .fetch("bob", 120, &CollectingNotifier::new())
        .await
        .into_content();

    assert_eq!(content.posts.len(), 120);
    assert_eq!(content.posts[119].title(), Some("Post 119"));
    assert!(content.comments.is_empty());
}

#[tokio::test]
async fn test_unknown_user_degrades_to_empty_and_notifies() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/ghost/about.json"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found", "error": 404})))
        .mount(&server)
        .await;

    let client = RedditApiClient::new(&settings(&server)).unwrap();
    let notifier = CollectingNotifier::new();
    let outcome = client.fetch("ghost", 30, &notifier).await;

    match &outcome {
        FetchOutcome::Empty { cause } => assert!(matches!(
            cause,
            CoreError::RedditApi(RedditApiError::UserNotFound { username }) if username == "ghost"
        )),
        FetchOutcome::Fetched(_) => panic!("expected an empty outcome"),
    }

    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert!(matches!(&notices[0], Notice::FetchFailed { username, .. } if username == "ghost"));
    assert!(outcome.into_content().is_empty());
}

#[tokio::test]
async fn test_suspended_user_is_a_fetch_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/banned/about.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "t2",
            "data": {"name": "banned", "is_suspended": true}
        })))
        .mount(&server)
        .await;

    let client = RedditApiClient::new(&settings(&server)).unwrap();
    let outcome = client.fetch("banned", 30, &CollectingNotifier::new()).await;

    assert!(matches!(
        outcome,
        FetchOutcome::Empty {
            cause: CoreError::RedditApi(RedditApiError::UserSuspended { .. })
        }
    ));
}

#[tokio::test]
async fn test_rate_limited_listing_reports_retry_after() {
    let server = MockServer::start().await;
    mount_about(&server, "carol").await;

    Mock::given(method("GET"))
        .and(path("/user/carol/submitted.json"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "42"))
        .mount(&server)
        .await;

    let client = RedditApiClient::new(&settings(&server)).unwrap();
    let outcome = client.fetch("carol", 30, &CollectingNotifier::new()).await;

    assert!(matches!(
        outcome,
        FetchOutcome::Empty {
            cause: CoreError::RedditApi(RedditApiError::RateLimitExceeded { retry_after: 42 })
        }
    ));
}
