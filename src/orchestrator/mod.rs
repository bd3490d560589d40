//! Multi-step dictionary operations
//!
//! A dictionary on the server is three resources: a private source, a private
//! collection and the dictionary itself (a collection whose `extras` point at the other
//! two). [`DictionaryOrchestrator`] sequences the calls that create, edit, populate and
//! load them, recording status in the shared [`AppState`].
//!
//! # Status protocol
//!
//! Every operation follows the same shape:
//!
//! 1. Reserve an [`ActionKey`] and record the start
//! 2. Append a progress message before each call
//! 3. On the first failing call, record the failure and stop; calls that already
//!    succeeded are left in place
//! 4. Always record completion, then return whether the operation succeeded
//!
//! Failures never escape as `Err`: callers read the recorded [`ActionFailure`]
//! through [`AppState::failure`] or [`AppState::statuses_for`].
//!
//! [`ActionFailure`]: crate::store::ActionFailure

mod dictionary;
mod references;
mod retrieve;

use std::sync::Arc;
use tracing::{info, warn};

use crate::api::ResourceApi;
use crate::core::ApiResult;
use crate::resolver::ResolverOptions;
use crate::store::{ActionKey, ActionType, AppState};

pub use dictionary::LinkedResources;
pub use retrieve::ListingRequest;

/// Runs dictionary operations against a [`ResourceApi`] and records them in an
/// [`AppState`].
#[derive(Clone)]
pub struct DictionaryOrchestrator {
    api: Arc<dyn ResourceApi>,
    state: Arc<AppState>,
    resolver_options: ResolverOptions,
}

impl DictionaryOrchestrator {
    #[must_use]
    pub fn new(
        api: Arc<dyn ResourceApi>,
        state: Arc<AppState>,
        resolver_options: ResolverOptions,
    ) -> Self {
        Self {
            api,
            state,
            resolver_options,
        }
    }

    #[must_use]
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    #[must_use]
    pub const fn resolver_options(&self) -> &ResolverOptions {
        &self.resolver_options
    }

    /// Reserve a fresh index for `action` and record the start.
    fn begin(&self, action: ActionType) -> ActionKey {
        let key = ActionKey::new(action, self.state.next_index(action));
        self.state.start(key);
        key
    }

    /// Record the outcome of `key` and signal completion.
    fn finish<T>(&self, key: ActionKey, result: ApiResult<T>) -> bool {
        let succeeded = match result {
            Ok(_) => {
                info!(action = %key, "Succeeded");
                true
            }
            Err(error) => {
                warn!(action = %key, "Failed: {}", error);
                self.state.fail(key, &error);
                false
            }
        };
        self.state.complete(key);
        succeeded
    }
}
