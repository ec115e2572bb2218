//! Integration tests for the story lifecycle: load, filter, like, detail.
//!
//! Each test stands up its own wiremock server and drives the real
//! `ApiClient` together with the `App` state transitions, exercising the
//! optimistic-update protocol end to end the way the event loop does.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use saga::api::{ApiClient, RetryPolicy};
use saga::app::{App, DetailState, LikeOutcome, LoadState};

fn story_json(id: &str, title: &str, likes: u64) -> Value {
    json!({
        "id": id,
        "title": title,
        "category": "Environment",
        "summary": "Summary",
        "description": "Description",
        "imageUrl": format!("https://example.com/{}.jpg", id),
        "isFeatured": false,
        "likes": likes,
    })
}

fn test_client(base_url: &str) -> ApiClient {
    ApiClient::new(reqwest::Client::new(), base_url).with_policy(RetryPolicy {
        max_retries: 2,
        base_delay: Duration::from_millis(10),
        timeout: Duration::from_millis(500),
    })
}

async fn app_with_stories(server: &MockServer) -> App {
    Mock::given(method("GET"))
        .and(path("/stories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            story_json("1", "Empowering Rural Youth through Tech", 124),
            story_json("2", "Sustainable Water Solutions", 89),
            story_json("3", "Digital Lions Marketplace", 210),
        ])))
        .mount(server)
        .await;

    let client = test_client(&server.uri());
    let mut app = App::new(client);
    let result = app.client.fetch_stories().await;
    app.apply_stories_loaded(result);
    assert_eq!(app.load_state, LoadState::Ready);
    app
}

// ============================================================================
// Load & Filter
// ============================================================================

#[tokio::test]
async fn test_load_populates_collection_in_server_order() {
    let server = MockServer::start().await;
    let app = app_with_stories(&server).await;

    let ids: Vec<&str> = app.stories.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(app.filtered.len(), 3);
}

#[tokio::test]
async fn test_load_failure_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stories"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/stories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([story_json("1", "A", 0)])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let mut app = App::new(client);

    let result = app.client.fetch_stories().await;
    app.apply_stories_loaded(result);
    assert!(matches!(app.load_state, LoadState::Failed(_)));

    // The retry affordance re-runs the same fetch
    let result = app.client.fetch_stories().await;
    app.apply_stories_loaded(result);
    assert_eq!(app.load_state, LoadState::Ready);
    assert_eq!(app.stories.len(), 1);
}

#[tokio::test]
async fn test_filter_narrows_view_without_touching_collection() {
    let server = MockServer::start().await;
    let mut app = app_with_stories(&server).await;

    app.set_query("water   solutions".to_string());
    assert_eq!(app.filtered.len(), 1);
    assert_eq!(app.filtered[0].id, "2");
    assert_eq!(app.stories.len(), 3);
}

// ============================================================================
// Optimistic Like
// ============================================================================

#[tokio::test]
async fn test_like_success_ends_with_server_record() {
    let server = MockServer::start().await;
    let mut app = app_with_stories(&server).await;

    // Server reports 92, not our optimistic 90 — concurrent likes elsewhere
    Mock::given(method("POST"))
        .and(path("/stories/2/like"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(story_json("2", "Sustainable Water Solutions", 92)),
        )
        .expect(1)
        .mount(&server)
        .await;

    app.apply_like_outcome(LikeOutcome::Applied {
        story_id: "2".to_string(),
    });
    assert_eq!(app.stories[1].likes, 90);

    match app.client.like_story("2").await {
        Ok(story) => app.apply_like_outcome(LikeOutcome::Confirmed { story }),
        Err(_) => app.apply_like_outcome(LikeOutcome::RolledBack {
            story_id: "2".to_string(),
        }),
    }

    assert_eq!(app.stories[1].likes, 92);
    assert!(!app.like_in_flight("2"));
}

#[tokio::test]
async fn test_like_failure_rolls_back_in_list_and_open_detail() {
    let server = MockServer::start().await;
    let mut app = app_with_stories(&server).await;

    Mock::given(method("POST"))
        .and(path("/stories/2/like"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    // Detail overlay open on the same story
    Mock::given(method("GET"))
        .and(path("/stories/2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(story_json("2", "Sustainable Water Solutions", 89)),
        )
        .mount(&server)
        .await;
    let generation = app.open_detail("2");
    let result = app.client.fetch_story("2").await;
    app.apply_detail_result("2".to_string(), generation, result);

    app.apply_like_outcome(LikeOutcome::Applied {
        story_id: "2".to_string(),
    });
    assert_eq!(app.stories[1].likes, 90);

    match app.client.like_story("2").await {
        Ok(story) => app.apply_like_outcome(LikeOutcome::Confirmed { story }),
        Err(_) => app.apply_like_outcome(LikeOutcome::RolledBack {
            story_id: "2".to_string(),
        }),
    }

    // Exactly 89 again — not 88, not 90 — in both locations
    assert_eq!(app.stories[1].likes, 89);
    match &app.detail {
        DetailState::Loaded { story } => assert_eq!(story.likes, 89),
        other => panic!("detail should stay open, got {:?}", other),
    }
}

#[tokio::test]
async fn test_like_failure_after_overlay_dismissed_corrects_only_list() {
    let server = MockServer::start().await;
    let mut app = app_with_stories(&server).await;

    Mock::given(method("POST"))
        .and(path("/stories/2/like"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    app.apply_like_outcome(LikeOutcome::Applied {
        story_id: "2".to_string(),
    });
    // Overlay dismissed while the confirming call is in flight
    app.close_detail();

    assert!(app.client.like_story("2").await.is_err());
    app.apply_like_outcome(LikeOutcome::RolledBack {
        story_id: "2".to_string(),
    });

    assert_eq!(app.stories[1].likes, 89);
    assert!(!app.detail.is_open());
}

// ============================================================================
// Detail Flow
// ============================================================================

#[tokio::test]
async fn test_detail_failure_leaves_overlay_open() {
    let server = MockServer::start().await;
    let mut app = app_with_stories(&server).await;

    Mock::given(method("GET"))
        .and(path("/stories/2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let generation = app.open_detail("2");
    let result = app.client.fetch_story("2").await;
    app.apply_detail_result("2".to_string(), generation, result);

    assert!(app.detail.is_open());
    assert!(matches!(app.detail, DetailState::Failed { .. }));
}

#[tokio::test]
async fn test_detail_race_last_request_wins() {
    let server = MockServer::start().await;
    let mut app = app_with_stories(&server).await;

    // A is slow, B is fast: A's response arrives after B's
    Mock::given(method("GET"))
        .and(path("/stories/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(200))
                .set_body_json(story_json("1", "Empowering Rural Youth through Tech", 124)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/stories/2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(story_json("2", "Sustainable Water Solutions", 89)),
        )
        .mount(&server)
        .await;

    let gen_a = app.open_detail("1");
    let fetch_a = {
        let client = app.client.clone();
        tokio::spawn(async move { client.fetch_story("1").await })
    };
    let gen_b = app.open_detail("2");
    let fetch_b = {
        let client = app.client.clone();
        tokio::spawn(async move { client.fetch_story("2").await })
    };

    // Apply in arrival order: B first, then the stale A
    let result_b = fetch_b.await.unwrap();
    app.apply_detail_result("2".to_string(), gen_b, result_b);
    let result_a = fetch_a.await.unwrap();
    app.apply_detail_result("1".to_string(), gen_a, result_a);

    match &app.detail {
        DetailState::Loaded { story } => assert_eq!(story.id, "2"),
        other => panic!("expected story 2 displayed, got {:?}", other),
    }
}

// ============================================================================
// Story Creation
// ============================================================================

#[tokio::test]
async fn test_created_story_appends_to_collection() {
    let server = MockServer::start().await;
    let mut app = app_with_stories(&server).await;

    Mock::given(method("POST"))
        .and(path("/stories"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(story_json("4", "Clean Cookstoves", 0)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = app
        .client
        .create_story(&saga::api::StoryDraft::with_title("Clean Cookstoves"))
        .await;
    app.apply_story_created(result);

    assert_eq!(app.stories.len(), 4);
    assert_eq!(app.stories.last().unwrap().id, "4");
    assert_eq!(app.stories.last().unwrap().title, "Clean Cookstoves");
}
