//! Session store - one swipe session per signed-in user
//!
//! Async work (catalog searches, model calls) runs with the session
//! unlocked; results are applied afterwards as a single transition.

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::SUGGEST_PAGE_SIZE;
use crate::core::discovery;
use crate::core::seed::random_genre;
use crate::core::session::{LikesSnapshot, LoadTicket, SessionSnapshot, SwipeSession};
use crate::errors::AppError;
use crate::models::{SwipeDirection, Track, View};
use crate::plugins::{CatalogSearch, LanguageModel};

type SharedSession = Arc<Mutex<SwipeSession>>;

/// One page of friend-suggestion search results
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionPage {
    pub items: Vec<Track>,
    pub page: usize,
    pub total_pages: usize,
    pub total_results: usize,
}

impl SuggestionPage {
    /// Slice `results` into 1-based pages
    pub fn paginate(results: Vec<Track>, page: usize, per_page: usize) -> Self {
        let total_results = results.len();
        let total_pages = (total_results + per_page - 1) / per_page;
        let page = page.max(1);

        let items = results
            .into_iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .collect();

        Self {
            items,
            page,
            total_pages,
            total_results,
        }
    }
}

/// Releases a load ticket when the request driving the load is dropped
/// before the batch is installed
struct LoadGuard {
    session: SharedSession,
    ticket: LoadTicket,
    settled: bool,
}

impl Drop for LoadGuard {
    fn drop(&mut self) {
        if !self.settled && self.session.lock().abandon_load(self.ticket) {
            debug!("Abandoned deck load {}", self.ticket);
        }
    }
}

pub struct SessionStore {
    sessions: DashMap<i64, SharedSession>,
    catalog: Arc<dyn CatalogSearch>,
    model: Arc<dyn LanguageModel>,
    advance_delay: Duration,
}

impl SessionStore {
    pub fn new(
        catalog: Arc<dyn CatalogSearch>,
        model: Arc<dyn LanguageModel>,
        advance_delay: Duration,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            catalog,
            model,
            advance_delay,
        }
    }

    /// Get or create the user's session
    pub fn session(&self, user_id: i64) -> SharedSession {
        self.sessions
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(SwipeSession::new())))
            .clone()
    }

    fn with_session<R>(&self, user_id: i64, f: impl FnOnce(&mut SwipeSession) -> R) -> R {
        let session = self.session(user_id);
        let mut guard = session.lock();
        f(&mut guard)
    }

    // deck

    /// Current deck, loading the first batch on first use
    pub async fn snapshot(&self, user_id: i64) -> SessionSnapshot {
        let ticket = self.with_session(user_id, |s| s.begin_initial_load());
        if let Some(ticket) = ticket {
            self.load_deck(user_id, ticket).await;
        }
        self.with_session(user_id, |s| s.snapshot())
    }

    /// Current deck without triggering a load
    pub fn peek(&self, user_id: i64) -> SessionSnapshot {
        self.with_session(user_id, |s| s.snapshot())
    }

    async fn load_deck(&self, user_id: i64, ticket: LoadTicket) {
        let session = self.session(user_id);
        let mut guard = LoadGuard {
            session: Arc::clone(&session),
            ticket,
            settled: false,
        };

        let genre = random_genre();
        let batch = self.catalog.search_by_query(genre).await;
        info!(
            "Loaded {} tracks for '{}' (user {})",
            batch.len(),
            genre,
            user_id
        );

        let installed = session.lock().install_initial(ticket, batch);
        guard.settled = true;
        if !installed {
            debug!("Discarded superseded deck load for user {}", user_id);
        }
    }

    pub fn swipe(
        &self,
        user_id: i64,
        direction: SwipeDirection,
    ) -> Result<SessionSnapshot, AppError> {
        let session = self.session(user_id);
        let outcome = session.lock().swipe(direction)?;

        if self.advance_delay.is_zero() {
            session.lock().commit_advance(outcome.generation);
        } else {
            let delay = self.advance_delay;
            let pending = Arc::clone(&session);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                pending.lock().commit_advance(outcome.generation);
            });
        }

        let snapshot = session.lock().snapshot();
        Ok(snapshot)
    }

    pub fn super_dislike(&self, user_id: i64) -> Result<SessionSnapshot, AppError> {
        self.with_session(user_id, |s| {
            let artist = s.super_dislike()?;
            debug!("User {} disliked artist {}", user_id, artist);
            Ok(s.snapshot())
        })
    }

    pub async fn reset(&self, user_id: i64) -> SessionSnapshot {
        let ticket = self.with_session(user_id, |s| s.begin_reset());
        self.load_deck(user_id, ticket).await;
        self.with_session(user_id, |s| s.snapshot())
    }

    pub fn toggle_play(&self, user_id: i64) -> Result<SessionSnapshot, AppError> {
        self.with_session(user_id, |s| {
            s.toggle_play()?;
            Ok(s.snapshot())
        })
    }

    // likes

    pub fn likes(&self, user_id: i64) -> LikesSnapshot {
        self.with_session(user_id, |s| s.likes_snapshot())
    }

    pub fn delete_liked(&self, user_id: i64, id: &str) -> Result<LikesSnapshot, AppError> {
        self.with_session(user_id, |s| {
            s.delete_liked(id)?;
            Ok(s.likes_snapshot())
        })
    }

    pub async fn analyze_vibe(&self, user_id: i64) -> Result<String, AppError> {
        let liked = self.with_session(user_id, |s| s.liked().to_vec());
        let vibe = discovery::summarize_vibe(self.model.as_ref(), &liked).await?;

        // a reset or delete while waiting makes this vibe stale
        self.with_session(user_id, |s| {
            if s.liked() == liked.as_slice() {
                s.set_vibe(vibe.clone());
            }
        });
        Ok(vibe)
    }

    // discovery

    /// Ask the model for songs and append the playable ones to the deck
    pub async fn discover(&self, user_id: i64, prompt: &str) -> Result<usize, AppError> {
        let excluded = self.with_session(user_id, |s| s.disliked().clone());

        let tracks = discovery::discover(
            self.model.as_ref(),
            self.catalog.as_ref(),
            prompt,
            &excluded,
        )
        .await?;

        let added = self.with_session(user_id, |s| {
            let added = s.append_batch(tracks, false);
            s.set_view(View::Swipe);
            added
        });
        info!("Discovery added {} tracks for user {}", added, user_id);
        Ok(added)
    }

    /// Discovery seeded with the liked list
    pub async fn discover_vibe(&self, user_id: i64) -> Result<usize, AppError> {
        let prompt = self.with_session(user_id, |s| {
            let prompt = discovery::vibe_discovery_prompt(s.liked())?;
            s.set_view(View::Discover);
            Ok::<_, AppError>(prompt)
        })?;

        self.discover(user_id, &prompt).await
    }

    // friend suggestions

    pub fn suggestions(&self, user_id: i64) -> Vec<Track> {
        self.with_session(user_id, |s| s.suggestions().to_vec())
    }

    pub async fn search_suggestions(
        &self,
        user_id: i64,
        query: &str,
        page: usize,
    ) -> Result<SuggestionPage, AppError> {
        if query.trim().is_empty() {
            return Err(AppError::validation("Enter a song or artist to search."));
        }

        let results = self.catalog.search_by_query(query).await;
        let results: Vec<Track> = self.with_session(user_id, |s| {
            results
                .into_iter()
                .filter(|t| !s.is_suggested(&t.id))
                .collect()
        });

        Ok(SuggestionPage::paginate(results, page, SUGGEST_PAGE_SIZE))
    }

    pub fn add_suggestion(&self, user_id: i64, track: Track) -> Result<Vec<Track>, AppError> {
        self.with_session(user_id, |s| {
            s.add_suggestion(track)?;
            Ok(s.suggestions().to_vec())
        })
    }

    pub fn remove_suggestion(&self, user_id: i64, id: &str) -> Result<Vec<Track>, AppError> {
        self.with_session(user_id, |s| {
            s.remove_suggestion(id)?;
            Ok(s.suggestions().to_vec())
        })
    }

    pub fn finish_suggestions(&self, user_id: i64) -> SessionSnapshot {
        self.with_session(user_id, |s| {
            let added = s.finish_suggestions();
            debug!("Imported {} suggestions for user {}", added, user_id);
            s.snapshot()
        })
    }

    // view

    pub fn view(&self, user_id: i64) -> View {
        self.with_session(user_id, |s| s.view())
    }

    pub fn set_view(&self, user_id: i64, view: View) -> View {
        self.with_session(user_id, |s| {
            s.set_view(view);
            s.view()
        })
    }
}
