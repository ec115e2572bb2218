//! Background task event processing.
//!
//! Every event is applied through the `App` transition methods so the
//! mutation rules (generation checks, like protocol, lenient corrections)
//! live in one place and stay unit-testable without a terminal.

use crate::app::{App, AppEvent, LikeOutcome};

pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::StoriesLoaded { result } => {
            app.apply_stories_loaded(result);
        }
        AppEvent::DetailLoaded {
            story_id,
            generation,
            result,
        } => {
            app.apply_detail_result(story_id, generation, result);
        }
        AppEvent::LikeConfirmed { story_id, story } => {
            tracing::debug!(story_id = %story_id, likes = story.likes, "Like confirmed");
            app.apply_like_outcome(LikeOutcome::Confirmed { story });
        }
        AppEvent::LikeFailed { story_id, error } => {
            tracing::warn!(story_id = %story_id, error = %error, "Like request failed");
            app.apply_like_outcome(LikeOutcome::RolledBack { story_id });
        }
        AppEvent::StoryCreated { result } => {
            app.apply_story_created(result);
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error, "Background task panicked");
            app.set_status(format!("Internal error in {} task", task));
        }
    }
    app.needs_redraw = true;
}
