use super::types::{stories_from_value, Story, StoryDraft};
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Server returned {status} {reason}")]
    Server { status: u16, reason: String },
    #[error("{0}")]
    Validation(String),
    #[error("Unexpected response shape: {0}")]
    UnexpectedBody(&'static str),
}

impl ApiError {
    /// Returns true if this error is transient and the request should be
    /// retried. Non-2xx responses are never transient: the server saw the
    /// request and rejected it. A decode failure of a 2xx body is a broken
    /// contract, not a flaky connection.
    fn is_retryable(&self) -> bool {
        match self {
            ApiError::Timeout(_) => true,
            ApiError::Network(e) => !e.is_decode(),
            ApiError::Server { .. } | ApiError::Validation(_) | ApiError::UnexpectedBody(_) => {
                false
            }
        }
    }

    /// Short message suitable for the status bar.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Timeout(_) | ApiError::Network(_) => {
                "Connection problem - check your network and try again".to_string()
            }
            ApiError::Server { status, reason } => {
                format!("Server rejected the request ({} {})", status, reason)
            }
            ApiError::Validation(msg) => msg.clone(),
            ApiError::UnexpectedBody(_) => "The server sent an unexpected response".to_string(),
        }
    }
}

// ============================================================================
// Retry Policy
// ============================================================================

/// Parameters for the retry combinator wrapped around every request.
///
/// Defaults: 2 retries after the initial attempt, exponential backoff of
/// `base_delay * 2^attempt` (500 ms, 1000 ms), 10 s deadline per attempt.
/// Tests shrink these so transient-failure paths run in milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
            timeout: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    fn backoff_delay(&self, attempt: u32) -> Duration {
        self.base_delay * (1u32 << attempt.min(16))
    }
}

// ============================================================================
// API Client
// ============================================================================

/// Thin client for the stories REST API.
///
/// Cheap to clone (reqwest clients share their connection pool), so spawned
/// tasks take their own copy.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    policy: RetryPolicy,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// `GET /stories` — the full story list, decoded leniently.
    pub async fn fetch_stories(&self) -> Result<Vec<Story>, ApiError> {
        let value = self.request_json(Method::GET, "stories", None).await?;
        Ok(stories_from_value(&value))
    }

    /// `GET /stories/{id}` — one story.
    pub async fn fetch_story(&self, id: &str) -> Result<Story, ApiError> {
        ensure_story_id(id)?;
        let path = format!("stories/{}", id);
        let value = self.request_json(Method::GET, &path, None).await?;
        Story::from_value(&value).ok_or(ApiError::UnexpectedBody("expected a story object"))
    }

    /// `POST /stories/{id}/like` — increment the like counter.
    ///
    /// Empty body, JSON content type; the response is the authoritative
    /// story record with the new count.
    pub async fn like_story(&self, id: &str) -> Result<Story, ApiError> {
        ensure_story_id(id)?;
        let path = format!("stories/{}/like", id);
        let value = self.request_json(Method::POST, &path, None).await?;
        Story::from_value(&value).ok_or(ApiError::UnexpectedBody("expected a story object"))
    }

    /// `POST /stories` — submit a new story.
    pub async fn create_story(&self, draft: &StoryDraft) -> Result<Story, ApiError> {
        if draft.title.trim().is_empty() {
            return Err(ApiError::Validation(
                "Story title must not be empty".to_string(),
            ));
        }
        let body = serde_json::to_value(draft).map_err(|_| {
            // StoryDraft is plain strings; serialization cannot actually fail
            ApiError::Validation("Story draft could not be serialized".to_string())
        })?;
        let value = self
            .request_json(Method::POST, "stories", Some(&body))
            .await?;
        Story::from_value(&value).ok_or(ApiError::UnexpectedBody("expected a story object"))
    }

    /// Request primitive with timeout and retry.
    ///
    /// One attempt is in flight at a time; transient failures (timeout,
    /// connection-level) sleep `base_delay * 2^attempt` and retry up to
    /// `max_retries` additional times. Everything else surfaces immediately.
    async fn request_json(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}/{}", self.base_url, path);
        let mut attempt: u32 = 0;

        loop {
            let outcome = match tokio::time::timeout(
                self.policy.timeout,
                self.send_once(&method, &url, body),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(ApiError::Timeout(self.policy.timeout)),
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.policy.max_retries => {
                    let delay = self.policy.backoff_delay(attempt);
                    tracing::debug!(
                        error = %e,
                        retry = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        %url,
                        "Retrying request after transient failure"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Issue a single attempt and classify the outcome.
    async fn send_once(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let mut request = self.http.request(method.clone(), url);
        request = match body {
            Some(value) => request.json(value),
            // Bodyless POSTs still declare a JSON content type per the API
            // contract; GETs go out bare.
            None if *method == Method::POST => {
                request.header(reqwest::header::CONTENT_TYPE, "application/json")
            }
            None => request,
        };

        let response = request.send().await.map_err(ApiError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Server {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        response.json::<Value>().await.map_err(ApiError::Network)
    }
}

fn ensure_story_id(id: &str) -> Result<(), ApiError> {
    if id.trim().is_empty() {
        return Err(ApiError::Validation(
            "Story id must not be empty".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Shrunk policy so retry paths complete in milliseconds.
    fn test_policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(10),
            timeout: Duration::from_millis(200),
        }
    }

    fn test_client(base_url: &str) -> ApiClient {
        ApiClient::new(reqwest::Client::new(), base_url).with_policy(test_policy())
    }

    fn story_json(id: &str, likes: u64) -> Value {
        json!({
            "id": id,
            "title": format!("Story {}", id),
            "category": "Education",
            "summary": "Summary",
            "description": "Description",
            "imageUrl": "https://example.com/img.jpg",
            "isFeatured": false,
            "likes": likes,
        })
    }

    #[tokio::test]
    async fn test_fetch_stories_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stories"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([story_json("1", 124), story_json("2", 89)])),
            )
            .mount(&server)
            .await;

        let stories = test_client(&server.uri()).fetch_stories().await.unwrap();
        assert_eq!(stories.len(), 2);
        assert_eq!(stories[0].id, "1");
        assert_eq!(stories[1].likes, 89);
    }

    #[tokio::test]
    async fn test_fetch_stories_drops_malformed_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                story_json("1", 5),
                null,
                {"title": "no id"},
            ])))
            .mount(&server)
            .await;

        let stories = test_client(&server.uri()).fetch_stories().await.unwrap();
        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].id, "1");
    }

    #[tokio::test]
    async fn test_server_error_surfaces_without_retry() {
        let server = MockServer::start().await;
        // expect(1) verifies on drop that no retry was attempted
        Mock::given(method("GET"))
            .and(path("/stories"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .fetch_stories()
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Server { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_not_found_carries_status_and_reason() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stories/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .fetch_story("missing")
            .await
            .unwrap_err();
        match err {
            ApiError::Server { status, reason } => {
                assert_eq!(status, 404);
                assert_eq!(reason, "Not Found");
            }
            other => panic!("expected Server error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_two_timeouts_then_success_returns_ok() {
        let server = MockServer::start().await;

        // First two attempts stall past the 200 ms test deadline; mocks are
        // matched in mount order, so the third attempt falls through to the
        // fast mock.
        Mock::given(method("GET"))
            .and(path("/stories/7"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(2))
                    .set_body_json(story_json("7", 1)),
            )
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/stories/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(story_json("7", 1)))
            .mount(&server)
            .await;

        let story = test_client(&server.uri()).fetch_story("7").await.unwrap();
        assert_eq!(story.id, "7");
    }

    #[tokio::test]
    async fn test_exhausted_retries_surface_timeout() {
        let server = MockServer::start().await;
        // Initial attempt + 2 retries, all stalled
        Mock::given(method("GET"))
            .and(path("/stories"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(2))
                    .set_body_json(json!([])),
            )
            .expect(3)
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .fetch_stories()
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_connection_failure_surfaces_network() {
        // Grab an address nobody is listening on by letting the mock server
        // release its port.
        let server = MockServer::start().await;
        let dead_uri = server.uri();
        drop(server);

        let err = test_client(&dead_uri).fetch_stories().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }

    #[tokio::test]
    async fn test_empty_id_fails_before_any_network_call() {
        // Base URL points nowhere; a network attempt would surface Network,
        // not Validation.
        let client = test_client("http://127.0.0.1:1");

        let err = client.fetch_story("").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = client.like_story("   ").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_empty_title_fails_before_any_network_call() {
        let client = test_client("http://127.0.0.1:1");
        let err = client
            .create_story(&StoryDraft::with_title("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_like_posts_empty_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/stories/3/like"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(story_json("3", 90)))
            .expect(1)
            .mount(&server)
            .await;

        let story = test_client(&server.uri()).like_story("3").await.unwrap();
        assert_eq!(story.likes, 90);
    }

    #[tokio::test]
    async fn test_create_story_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/stories"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(201).set_body_json(story_json("new", 0)))
            .expect(1)
            .mount(&server)
            .await;

        let story = test_client(&server.uri())
            .create_story(&StoryDraft::with_title("Story new"))
            .await
            .unwrap();
        assert_eq!(story.id, "new");
        assert_eq!(story.likes, 0);
    }

    #[tokio::test]
    async fn test_single_story_with_wrong_shape_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stories/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .fetch_story("1")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedBody(_)));
    }

    #[test]
    fn test_backoff_delays_double() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(0), Duration::from_millis(500));
        assert_eq!(policy.backoff_delay(1), Duration::from_millis(1000));
    }

    #[test]
    fn test_user_messages() {
        let err = ApiError::Server {
            status: 503,
            reason: "Service Unavailable".to_string(),
        };
        assert!(err.user_message().contains("503"));

        let err = ApiError::Timeout(Duration::from_secs(10));
        assert!(err.user_message().contains("Connection problem"));
    }
}
