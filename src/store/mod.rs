//! Application state shared by the orchestrated operations
//!
//! [`AppState`] is an explicit store passed by reference (usually behind an `Arc`) to
//! every operation that reports status or caches entities. It is created once at
//! startup and lives for the whole process; nothing needs tearing down.
//!
//! # Slices
//!
//! - **Action statuses** keyed by [`ActionKey`]: loading flag, append-only progress log,
//!   failure, completion
//! - **Entity caches** keyed by resource URL: dictionaries, sources, collections,
//!   dictionary versions, listing results, add-reference outcomes
//!
//! # Concurrency
//!
//! Every slice is a `DashMap`, and concurrent operations of the same kind reserve
//! distinct indices through [`AppState::next_index`], so two runs never write to the
//! same progress log.
//!
//! # Subscribing
//!
//! Each status change is also broadcast as a [`StoreEvent`]. Consumers that render live
//! progress call [`AppState::subscribe`]; events sent while nobody listens are dropped.

pub mod action;

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use crate::api::{
    ApiCollection, ApiDictionary, ApiDictionaryVersion, ApiSource, ReferenceResult,
};
use crate::core::OclError;

pub use action::{ActionFailure, ActionKey, ActionStatus, ActionType};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Status change broadcast to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    Started(ActionKey),
    Progress(ActionKey, String),
    Failed(ActionKey, ActionFailure),
    Completed(ActionKey),
}

impl StoreEvent {
    #[must_use]
    pub const fn key(&self) -> ActionKey {
        match self {
            Self::Started(key) | Self::Progress(key, _) | Self::Failed(key, _) | Self::Completed(key) => {
                *key
            }
        }
    }
}

/// Which dictionary listing a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listing {
    Personal,
    Organisation,
}

/// Process-wide store of action statuses and cached entities.
pub struct AppState {
    statuses: DashMap<ActionKey, ActionStatus>,
    next_indices: DashMap<ActionType, usize>,
    dictionaries: DashMap<String, ApiDictionary>,
    sources: DashMap<String, ApiSource>,
    collections: DashMap<String, ApiCollection>,
    versions: DashMap<String, Vec<ApiDictionaryVersion>>,
    listings: DashMap<Listing, Vec<ApiDictionary>>,
    added_references: DashMap<String, Vec<ReferenceResult>>,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for AppState {
    fn default() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            statuses: DashMap::new(),
            next_indices: DashMap::new(),
            dictionaries: DashMap::new(),
            sources: DashMap::new(),
            collections: DashMap::new(),
            versions: DashMap::new(),
            listings: DashMap::new(),
            added_references: DashMap::new(),
            events,
        }
    }
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// New store behind an `Arc`, the form operations take it in.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: StoreEvent) {
        // Err only means nobody is listening
        let _ = self.events.send(event);
    }

    /// Reserve the next unused index for `action`.
    ///
    /// Atomic per action type: concurrent callers always get distinct indices.
    pub fn next_index(&self, action: ActionType) -> usize {
        let mut next = self.next_indices.entry(action).or_insert(0);
        let index = *next;
        *next += 1;
        index
    }

    /// Begin an action, replacing any record left by an earlier run under the same key.
    pub fn start(&self, key: ActionKey) {
        debug!(action = %key, "Started");
        self.statuses.insert(
            key,
            ActionStatus {
                loading: true,
                ..ActionStatus::default()
            },
        );
        self.emit(StoreEvent::Started(key));
    }

    /// Append a progress message.
    pub fn progress(&self, key: ActionKey, message: impl Into<String>) {
        let message = message.into();
        debug!(action = %key, %message, "Progress");
        self.statuses.entry(key).or_default().progress.push(message.clone());
        self.emit(StoreEvent::Progress(key, message));
    }

    /// Record why an action failed; completion is still signalled separately.
    pub fn fail(&self, key: ActionKey, error: &OclError) {
        let failure = ActionFailure::from(error);
        debug!(action = %key, error = %failure.message, "Failed");
        self.statuses.entry(key).or_default().failure = Some(failure.clone());
        self.emit(StoreEvent::Failed(key, failure));
    }

    /// Terminal signal: the action is no longer loading.
    pub fn complete(&self, key: ActionKey) {
        debug!(action = %key, "Completed");
        {
            let mut status = self.statuses.entry(key).or_default();
            status.loading = false;
            status.completed = true;
        }
        self.emit(StoreEvent::Completed(key));
    }

    #[must_use]
    pub fn status(&self, key: ActionKey) -> Option<ActionStatus> {
        self.statuses.get(&key).map(|status| status.clone())
    }

    #[must_use]
    pub fn is_loading(&self, key: ActionKey) -> bool {
        self.statuses.get(&key).is_some_and(|status| status.loading)
    }

    #[must_use]
    pub fn progress_log(&self, key: ActionKey) -> Vec<String> {
        self.statuses.get(&key).map(|status| status.progress.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn failure(&self, key: ActionKey) -> Option<ActionFailure> {
        self.statuses.get(&key).and_then(|status| status.failure.clone())
    }

    /// Every run of `action`, ordered by index.
    #[must_use]
    pub fn statuses_for(&self, action: ActionType) -> Vec<(usize, ActionStatus)> {
        let mut runs: Vec<_> = self
            .statuses
            .iter()
            .filter(|entry| entry.key().action == action)
            .map(|entry| (entry.key().index, entry.value().clone()))
            .collect();
        runs.sort_by_key(|(index, _)| *index);
        runs
    }

    pub fn cache_dictionary(&self, dictionary: ApiDictionary) {
        self.dictionaries.insert(dictionary.url.clone(), dictionary);
    }

    #[must_use]
    pub fn dictionary(&self, url: &str) -> Option<ApiDictionary> {
        self.dictionaries.get(url).map(|d| d.clone())
    }

    pub fn cache_source(&self, source: ApiSource) {
        self.sources.insert(source.url.clone(), source);
    }

    #[must_use]
    pub fn source(&self, url: &str) -> Option<ApiSource> {
        self.sources.get(url).map(|s| s.clone())
    }

    pub fn cache_collection(&self, collection: ApiCollection) {
        self.collections.insert(collection.url.clone(), collection);
    }

    #[must_use]
    pub fn collection(&self, url: &str) -> Option<ApiCollection> {
        self.collections.get(url).map(|c| c.clone())
    }

    pub fn set_versions(&self, dictionary_url: &str, versions: Vec<ApiDictionaryVersion>) {
        self.versions.insert(dictionary_url.to_string(), versions);
    }

    #[must_use]
    pub fn versions(&self, dictionary_url: &str) -> Vec<ApiDictionaryVersion> {
        self.versions.get(dictionary_url).map(|v| v.clone()).unwrap_or_default()
    }

    pub fn set_listing(&self, listing: Listing, dictionaries: Vec<ApiDictionary>) {
        self.listings.insert(listing, dictionaries);
    }

    #[must_use]
    pub fn listing(&self, listing: Listing) -> Vec<ApiDictionary> {
        self.listings.get(&listing).map(|l| l.clone()).unwrap_or_default()
    }

    /// Append add-reference outcomes for a collection.
    pub fn record_references(&self, collection_url: &str, results: Vec<ReferenceResult>) {
        self.added_references.entry(collection_url.to_string()).or_default().extend(results);
    }

    /// Forget outcomes for expressions that were removed from a collection.
    pub fn forget_references(&self, collection_url: &str, expressions: &[String]) {
        if let Some(mut results) = self.added_references.get_mut(collection_url) {
            results.retain(|result| !expressions.contains(&result.expression));
        }
    }

    #[must_use]
    pub fn added_references(&self, collection_url: &str) -> Vec<ReferenceResult> {
        self.added_references.get(collection_url).map(|r| r.clone()).unwrap_or_default()
    }
}
