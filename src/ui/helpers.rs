//! Shared helpers for the UI layer: background task spawning and panic
//! containment.
//!
//! Every spawned task follows the same shape: clone the client and the
//! event sender, do one API call, send one `AppEvent` back. Panics inside a
//! task are caught and reported as `AppEvent::TaskPanicked` instead of
//! silently killing the task.

use crate::api::StoryDraft;
use crate::app::{App, AppEvent, ComposeState, LikeOutcome, LoadState};
use futures::FutureExt;
use ratatui::layout::Rect;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

/// Run a future, converting a panic into an error string.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic payload".to_string()
            }
        })
}

/// Send an event, logging (not panicking) if the receiver is gone — that
/// only happens during shutdown.
async fn send_event(tx: &mpsc::Sender<AppEvent>, event: AppEvent) {
    if tx.send(event).await.is_err() {
        tracing::warn!("Event channel closed (receiver dropped)");
    }
}

/// Spawn the bulk story fetch (startup, or retry after a failed load).
pub(super) fn spawn_load_stories(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    app.load_state = LoadState::Loading;
    app.needs_redraw = true;

    let client = app.client.clone();
    let tx = event_tx.clone();

    tokio::spawn(async move {
        let tx_panic = tx.clone();
        match catch_task_panic(async {
            let result = client.fetch_stories().await;
            send_event(&tx, AppEvent::StoriesLoaded { result }).await;
        })
        .await
        {
            Ok(()) => {}
            Err(error) => {
                tracing::error!(task = "load_stories", %error, "Background task panicked");
                send_event(
                    &tx_panic,
                    AppEvent::TaskPanicked {
                        task: "load_stories",
                        error,
                    },
                )
                .await;
            }
        }
    });
}

/// Spawn a detail fetch for this story.
///
/// The overlay opens in a loading state immediately; the task echoes the
/// generation token so superseded responses are dropped on receipt.
pub(super) fn spawn_detail_fetch(app: &mut App, story_id: &str, event_tx: &mpsc::Sender<AppEvent>) {
    let generation = app.open_detail(story_id);
    let story_id = story_id.to_string();
    let client = app.client.clone();
    let tx = event_tx.clone();

    tracing::debug!(story_id = %story_id, generation, "Spawning detail fetch");

    tokio::spawn(async move {
        let tx_panic = tx.clone();
        let id_for_task = story_id.clone();
        match catch_task_panic(async {
            let result = client.fetch_story(&id_for_task).await;
            send_event(
                &tx,
                AppEvent::DetailLoaded {
                    story_id: id_for_task.clone(),
                    generation,
                    result,
                },
            )
            .await;
        })
        .await
        {
            Ok(()) => {}
            Err(error) => {
                tracing::error!(task = "detail_fetch", story_id = %story_id, %error, "Background task panicked");
                send_event(
                    &tx_panic,
                    AppEvent::TaskPanicked {
                        task: "detail_fetch",
                        error,
                    },
                )
                .await;
            }
        }
    });
}

/// Start the optimistic like protocol for this story.
///
/// The +1 is applied synchronously here, before the confirming call is
/// spawned, so it is visible the moment the key is handled. A second like
/// for the same id while one is outstanding is ignored.
pub(super) fn spawn_like(app: &mut App, story_id: &str, event_tx: &mpsc::Sender<AppEvent>) {
    if app.like_in_flight(story_id) {
        tracing::debug!(story_id = %story_id, "Like already in flight, ignoring");
        return;
    }

    app.apply_like_outcome(LikeOutcome::Applied {
        story_id: story_id.to_string(),
    });

    let story_id = story_id.to_string();
    let client = app.client.clone();
    let tx = event_tx.clone();

    tokio::spawn(async move {
        let tx_panic = tx.clone();
        let id_for_task = story_id.clone();
        match catch_task_panic(async {
            match client.like_story(&id_for_task).await {
                Ok(story) => {
                    send_event(
                        &tx,
                        AppEvent::LikeConfirmed {
                            story_id: id_for_task.clone(),
                            story,
                        },
                    )
                    .await;
                }
                Err(error) => {
                    send_event(
                        &tx,
                        AppEvent::LikeFailed {
                            story_id: id_for_task.clone(),
                            error,
                        },
                    )
                    .await;
                }
            }
        })
        .await
        {
            Ok(()) => {}
            Err(error) => {
                tracing::error!(task = "like", story_id = %story_id, %error, "Background task panicked");
                send_event(
                    &tx_panic,
                    AppEvent::TaskPanicked {
                        task: "like",
                        error,
                    },
                )
                .await;
            }
        }
    });
}

/// Submit the compose dialog.
pub(super) fn spawn_create_story(app: &mut App, title: String, event_tx: &mpsc::Sender<AppEvent>) {
    app.compose = Some(ComposeState::Submitting {
        title: title.clone(),
    });
    app.needs_redraw = true;

    let client = app.client.clone();
    let tx = event_tx.clone();

    tokio::spawn(async move {
        let tx_panic = tx.clone();
        match catch_task_panic(async {
            let result = client.create_story(&StoryDraft::with_title(title)).await;
            send_event(&tx, AppEvent::StoryCreated { result }).await;
        })
        .await
        {
            Ok(()) => {}
            Err(error) => {
                tracing::error!(task = "create_story", %error, "Background task panicked");
                send_event(
                    &tx_panic,
                    AppEvent::TaskPanicked {
                        task: "create_story",
                        error,
                    },
                )
                .await;
            }
        }
    });
}

/// Rect centered inside `area`, sized as a percentage of it.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Frames for the loading spinner, advanced by the 250 ms tick.
const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub(super) fn spinner_frame(frame: usize) -> &'static str {
    SPINNER_FRAMES[frame % SPINNER_FRAMES.len()]
}
