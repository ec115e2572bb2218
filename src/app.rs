use crate::api::{ApiClient, ApiError, Story};
use crate::filter::filter_stories;
use crate::theme::{ColorPalette, ThemeVariant};
use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::time::Instant;

// ============================================================================
// Load State
// ============================================================================

/// State of the one-time bulk story load.
///
/// The collection is fetched in full exactly once at startup; after that it
/// is only updated element-wise. `Failed` drives the retry affordance in
/// the list view — retrying is the only path that re-runs the bulk fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

// ============================================================================
// Detail Overlay State
// ============================================================================

/// State of the story detail overlay.
///
/// `Loaded` holds a COPY of the story, never an index into the collection:
/// the collection can change underneath the overlay (like confirmations,
/// created stories) and the copy is synced explicitly by id where needed.
#[derive(Debug, Clone)]
pub enum DetailState {
    Closed,
    Loading { story_id: String },
    Loaded { story: Story },
    Failed { story_id: String, error: String },
}

impl DetailState {
    /// Id of the story the overlay is currently about, in any open state.
    pub fn story_id(&self) -> Option<&str> {
        match self {
            DetailState::Closed => None,
            DetailState::Loading { story_id } | DetailState::Failed { story_id, .. } => {
                Some(story_id)
            }
            DetailState::Loaded { story } => Some(&story.id),
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, DetailState::Closed)
    }
}

// ============================================================================
// Compose Dialog State
// ============================================================================

/// State machine for the new-story dialog: Input -> Submitting.
#[derive(Debug, Clone)]
pub enum ComposeState {
    /// User is typing a title.
    Input { title: String },
    /// Submission is in flight; input is locked until the server answers.
    Submitting { title: String },
}

// ============================================================================
// Like Protocol
// ============================================================================

/// Tagged outcome of the optimistic like protocol.
///
/// All three phases flow through [`App::apply_like_outcome`] so every
/// mutation of the collection and the detail copy lives in one place:
///
/// 1. `Applied` — the optimistic +1, applied synchronously before the
///    network call is spawned.
/// 2. `Confirmed` — the server's record replaces ours wholesale; concurrent
///    likes from other clients mean the count may differ from our guess.
/// 3. `RolledBack` — the confirming call failed; the +1 is reversed.
///
/// Corrections only touch locations that hold the id at the time they run,
/// so a dismissed overlay is never resurrected by a late confirmation.
#[derive(Debug, Clone)]
pub enum LikeOutcome {
    Applied { story_id: String },
    Confirmed { story: Story },
    RolledBack { story_id: String },
}

// ============================================================================
// Background Task Events
// ============================================================================

/// Events sent from spawned tasks back to the event loop.
pub enum AppEvent {
    /// Bulk story load finished (startup or retry-after-failure).
    StoriesLoaded {
        result: Result<Vec<Story>, ApiError>,
    },
    /// Detail fetch finished.
    ///
    /// `generation` is the value of `detail_generation` when the fetch was
    /// spawned; results from superseded requests are dropped on receipt.
    DetailLoaded {
        story_id: String,
        generation: u64,
        result: Result<Story, ApiError>,
    },
    /// Like call succeeded; `story` is the authoritative server record.
    LikeConfirmed { story_id: String, story: Story },
    /// Like call failed; the optimistic increment must be reversed.
    LikeFailed { story_id: String, error: ApiError },
    /// Story creation finished.
    StoryCreated { result: Result<Story, ApiError> },
    /// A background task panicked.
    TaskPanicked { task: &'static str, error: String },
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state.
///
/// All mutation happens on the event-loop task; spawned tasks only talk to
/// the API and report back via `AppEvent`. The story collection uses
/// `Arc<Vec<_>>` with `Arc::make_mut` copy-on-write so render code and
/// spawned tasks can hold cheap read-only clones.
pub struct App {
    pub client: ApiClient,

    // Theme
    pub theme_variant: ThemeVariant,
    pub theme: ColorPalette,

    // Data
    /// Full story collection in server-provided order.
    pub stories: Arc<Vec<Story>>,
    /// Derived view: `filter_stories(stories, query)`. Rebuilt whenever the
    /// collection or the query changes; order always mirrors `stories`.
    pub filtered: Arc<Vec<Story>>,

    // Search
    pub query: String,
    pub search_mode: bool,

    // UI state
    pub load_state: LoadState,
    /// Selection index into `filtered`.
    pub selected: usize,
    pub detail: DetailState,
    /// Monotonic token for last-request-wins detail fetches.
    pub detail_generation: u64,
    pub detail_scroll: usize,
    /// Per-story like flags: ids with a confirming call outstanding.
    pub likes_in_flight: HashSet<String>,
    pub compose: Option<ComposeState>,

    // Status bar message with expiry
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    /// Current frame of the loading spinner animation.
    pub spinner_frame: usize,
    /// Dirty flag: skip renders while nothing changed.
    pub needs_redraw: bool,
}

impl App {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            theme_variant: ThemeVariant::Dark,
            theme: ThemeVariant::Dark.palette(),
            stories: Arc::new(Vec::new()),
            filtered: Arc::new(Vec::new()),
            query: String::new(),
            search_mode: false,
            load_state: LoadState::Loading,
            selected: 0,
            detail: DetailState::Closed,
            detail_generation: 0,
            detail_scroll: 0,
            likes_in_flight: HashSet::new(),
            compose: None,
            status_message: None,
            spinner_frame: 0,
            needs_redraw: true,
        }
    }

    // ------------------------------------------------------------------
    // Theme
    // ------------------------------------------------------------------

    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.theme = variant.palette();
        self.needs_redraw = true;
    }

    /// Cycle to the next theme variant, returning its name for the status
    /// bar.
    pub fn cycle_theme(&mut self) -> &'static str {
        let next = self.theme_variant.next();
        self.set_theme(next);
        next.name()
    }

    // ------------------------------------------------------------------
    // Selection & filtering
    // ------------------------------------------------------------------

    /// Rebuild the filtered view from the collection and the query.
    pub fn refresh_filter(&mut self) {
        self.filtered = Arc::new(filter_stories(&self.stories, &self.query));
        self.clamp_selection();
        self.needs_redraw = true;
    }

    /// Replace the query and rebuild the visible list.
    pub fn set_query(&mut self, query: String) {
        self.query = query;
        self.refresh_filter();
    }

    /// Currently selected story in the filtered view (bounds-checked).
    pub fn selected_story(&self) -> Option<&Story> {
        self.filtered.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if !self.filtered.is_empty() {
            self.selected = (self.selected + 1).min(self.filtered.len() - 1);
            self.needs_redraw = true;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.needs_redraw = true;
    }

    /// Clamp the selection after any operation that shrank the visible
    /// list, so the index never points past the end.
    pub fn clamp_selection(&mut self) {
        self.selected = if self.filtered.is_empty() {
            0
        } else {
            self.selected.min(self.filtered.len() - 1)
        };
    }

    // ------------------------------------------------------------------
    // Bulk load
    // ------------------------------------------------------------------

    /// Apply the result of the bulk story fetch — the only full replace of
    /// the collection.
    pub fn apply_stories_loaded(&mut self, result: Result<Vec<Story>, ApiError>) {
        match result {
            Ok(stories) => {
                tracing::info!(count = stories.len(), "Stories loaded");
                self.stories = Arc::new(stories);
                self.load_state = LoadState::Ready;
                self.refresh_filter();
            }
            Err(e) => {
                tracing::error!(error = %e, "Story load failed");
                self.load_state = LoadState::Failed(e.user_message());
            }
        }
        self.needs_redraw = true;
    }

    // ------------------------------------------------------------------
    // Like protocol
    // ------------------------------------------------------------------

    /// Whether a like for this id already has a confirming call in flight.
    pub fn like_in_flight(&self, story_id: &str) -> bool {
        self.likes_in_flight.contains(story_id)
    }

    /// Single transition function for the optimistic like protocol.
    ///
    /// Each phase locates the story by id in whatever currently holds it
    /// (collection, detail copy) — never through references captured when
    /// the like started.
    pub fn apply_like_outcome(&mut self, outcome: LikeOutcome) {
        match outcome {
            LikeOutcome::Applied { story_id } => {
                self.likes_in_flight.insert(story_id.clone());
                self.update_story_in_place(&story_id, |story| {
                    story.likes += 1;
                });
            }
            LikeOutcome::Confirmed { story } => {
                self.likes_in_flight.remove(&story.id);
                let id = story.id.clone();
                self.update_story_in_place(&id, |slot| {
                    *slot = story.clone();
                });
            }
            LikeOutcome::RolledBack { story_id } => {
                tracing::warn!(story_id = %story_id, "Like failed, rolling back");
                self.likes_in_flight.remove(&story_id);
                self.update_story_in_place(&story_id, |story| {
                    story.likes = story.likes.saturating_sub(1);
                });
                self.set_status("Couldn't save your like - reverted");
            }
        }
        self.needs_redraw = true;
    }

    /// Run `mutate` on the story with this id wherever it currently
    /// appears: the main collection and the detail copy. The filtered view
    /// is rebuilt afterwards so it mirrors the collection.
    fn update_story_in_place(&mut self, story_id: &str, mutate: impl Fn(&mut Story)) {
        let stories = Arc::make_mut(&mut self.stories);
        if let Some(story) = stories.iter_mut().find(|s| s.id == story_id) {
            mutate(story);
        }

        if let DetailState::Loaded { story } = &mut self.detail {
            if story.id == story_id {
                mutate(story);
            }
        }

        self.refresh_filter();
    }

    // ------------------------------------------------------------------
    // Detail overlay
    // ------------------------------------------------------------------

    /// Open the overlay in a loading state for this story and return the
    /// generation token the fetch task must echo back.
    pub fn open_detail(&mut self, story_id: &str) -> u64 {
        self.detail_generation = self.detail_generation.wrapping_add(1);
        self.detail = DetailState::Loading {
            story_id: story_id.to_string(),
        };
        self.detail_scroll = 0;
        self.needs_redraw = true;
        self.detail_generation
    }

    /// Dismiss the overlay, destroying the detail copy.
    ///
    /// Bumps the generation so an in-flight fetch result is dropped on
    /// arrival instead of reopening a dismissed overlay.
    pub fn close_detail(&mut self) {
        self.detail_generation = self.detail_generation.wrapping_add(1);
        self.detail = DetailState::Closed;
        self.detail_scroll = 0;
        self.needs_redraw = true;
    }

    /// Apply a finished detail fetch. Results carrying a superseded
    /// generation are dropped: the last request wins, regardless of the
    /// order responses arrive in.
    pub fn apply_detail_result(
        &mut self,
        story_id: String,
        generation: u64,
        result: Result<Story, ApiError>,
    ) {
        if generation != self.detail_generation {
            tracing::debug!(
                expected = self.detail_generation,
                got = generation,
                story_id = %story_id,
                "Ignoring stale detail result (generation mismatch)"
            );
            return;
        }

        match result {
            Ok(story) => {
                self.detail = DetailState::Loaded { story };
            }
            Err(e) => {
                // The overlay stays open with an explicit failed state; it
                // never silently closes.
                tracing::warn!(error = %e, story_id = %story_id, "Story detail load failed");
                self.detail = DetailState::Failed {
                    story_id,
                    error: e.user_message(),
                };
            }
        }
        self.needs_redraw = true;
    }

    // ------------------------------------------------------------------
    // Compose dialog
    // ------------------------------------------------------------------

    pub fn open_compose(&mut self) {
        self.compose = Some(ComposeState::Input {
            title: String::new(),
        });
        self.needs_redraw = true;
    }

    pub fn close_compose(&mut self) {
        self.compose = None;
        self.needs_redraw = true;
    }

    /// Apply the result of a story creation. Success appends the server's
    /// record to the collection (order stays server-provided); failure
    /// reopens the input with the typed title intact.
    pub fn apply_story_created(&mut self, result: Result<Story, ApiError>) {
        match result {
            Ok(story) => {
                tracing::info!(story_id = %story.id, "Story created");
                self.set_status(format!("Created \"{}\"", story.title));
                Arc::make_mut(&mut self.stories).push(story);
                self.compose = None;
                self.refresh_filter();
            }
            Err(e) => {
                tracing::warn!(error = %e, "Story creation failed");
                if let Some(ComposeState::Submitting { title }) = self.compose.take() {
                    self.compose = Some(ComposeState::Input { title });
                }
                self.set_status(e.user_message());
            }
        }
        self.needs_redraw = true;
    }

    // ------------------------------------------------------------------
    // Status bar
    // ------------------------------------------------------------------

    /// Set a status message with the standard expiry.
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Clear the status message if it is older than 3 seconds.
    /// Returns true if a message was actually cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

// ============================================================================
// Tests
// ============================================================================
