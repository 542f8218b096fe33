//! Collection controller — owns the local copy of one remote collection.
//!
//! The controller keeps `items` (the last server-acknowledged state),
//! `view` (the filtered subset the presentation renders), and `loading`.
//! Every write goes through the gateway and is followed by a full
//! `refresh()`: the server's canonical post-write state replaces the local
//! copy instead of being guessed at, so server-side defaults never drift.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CoreError, ValidationError};
use crate::gateway::CollectionTransport;

/// Ties an entity to its collection endpoint, draft/patch payloads,
/// search configuration, and required-field policy.
pub trait Resource: Clone + Serialize + DeserializeOwned {
    type Draft: Clone + Default + Serialize;
    type Patch: Serialize;

    /// URL path segment, plural ("patients").
    const COLLECTION: &'static str;
    /// Singular noun for log and error messages ("patient").
    const LABEL: &'static str;

    fn id(&self) -> &str;

    /// Whether any configured searchable field contains `needle`.
    /// `needle` arrives already lower-cased.
    fn matches(&self, needle: &str) -> bool;

    /// Required-field policy, checked before any remote call.
    fn validate(draft: &Self::Draft) -> Result<(), ValidationError>;

    /// Patch carrying every draft field, for edit-form submits.
    fn full_patch(draft: &Self::Draft) -> Self::Patch;
}

/// Outcome of the confirmation step a destructive call requires.
/// The presentation layer obtains it; the controller only acts on `Yes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    Yes,
    No,
}

pub struct CollectionController<R: Resource, T: CollectionTransport<R>> {
    transport: T,
    items: Vec<R>,
    view: Vec<R>,
    filter: String,
    loading: bool,
}

impl<R: Resource, T: CollectionTransport<R>> CollectionController<R, T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            items: Vec::new(),
            view: Vec::new(),
            filter: String::new(),
            loading: false,
        }
    }

    // ── Read state ──────────────────────────────────────────

    /// Server-ordered collection as last acknowledged by the service.
    pub fn items(&self) -> &[R] {
        &self.items
    }

    /// Filtered subset currently presented. Always a subset of `items`.
    pub fn view(&self) -> &[R] {
        &self.view
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    // ── Synchronization ─────────────────────────────────────

    /// Fetch the full collection and replace `items` wholesale.
    ///
    /// `loading` spans exactly the fetch; it clears whether the call
    /// succeeded or not. On failure the previous `items`/`view` stay.
    pub async fn refresh(&mut self) -> Result<(), CoreError> {
        self.loading = true;
        let result = self.transport.list().await;
        self.loading = false;

        match result {
            Ok(items) => {
                self.items = items;
                self.rebuild_view();
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    collection = R::COLLECTION,
                    error = %err,
                    "refresh failed, keeping last known state"
                );
                Err(err.into())
            }
        }
    }

    /// Validate and create, then re-fetch the canonical state.
    pub async fn create(&mut self, draft: &R::Draft) -> Result<(), CoreError> {
        R::validate(draft)?;
        self.transport.create(draft).await.map_err(|err| {
            tracing::warn!(collection = R::COLLECTION, error = %err, "create failed");
            CoreError::from(err)
        })?;
        tracing::info!(collection = R::COLLECTION, "created {}", R::LABEL);
        self.refresh().await
    }

    /// Submit a full edit form against an existing record.
    pub async fn update(&mut self, id: &str, draft: &R::Draft) -> Result<(), CoreError> {
        R::validate(draft)?;
        let patch = R::full_patch(draft);
        self.transport.update(id, &patch).await.map_err(|err| {
            tracing::warn!(collection = R::COLLECTION, id, error = %err, "update failed");
            CoreError::from(err)
        })?;
        self.refresh().await
    }

    /// Apply a partial update (for example a status flip) as-is.
    pub async fn patch(&mut self, id: &str, patch: &R::Patch) -> Result<(), CoreError> {
        self.transport.update(id, patch).await.map_err(|err| {
            tracing::warn!(collection = R::COLLECTION, id, error = %err, "update failed");
            CoreError::from(err)
        })?;
        self.refresh().await
    }

    /// Delete, gated on an affirmative confirmation signal.
    /// Returns whether the destructive call was actually issued.
    pub async fn remove(&mut self, id: &str, confirm: Confirm) -> Result<bool, CoreError> {
        if confirm != Confirm::Yes {
            tracing::debug!(collection = R::COLLECTION, id, "removal not confirmed");
            return Ok(false);
        }
        self.transport.delete(id).await.map_err(|err| {
            tracing::warn!(collection = R::COLLECTION, id, error = %err, "delete failed");
            CoreError::from(err)
        })?;
        self.refresh().await?;
        Ok(true)
    }

    // ── Filtering ───────────────────────────────────────────

    /// Recompute `view` from the current `items` and `query`.
    /// Empty query presents the whole collection.
    pub fn set_filter(&mut self, query: &str) {
        self.filter = query.to_string();
        self.rebuild_view();
    }

    fn rebuild_view(&mut self) {
        if self.filter.is_empty() {
            self.view = self.items.clone();
        } else {
            let needle = self.filter.to_lowercase();
            self.view = self
                .items
                .iter()
                .filter(|item| item.matches(&needle))
                .cloned()
                .collect();
        }
    }
}

/// Refresh two independent collections concurrently (one screen often
/// needs both, e.g. appointments plus the patients they reference).
/// Neither result is swallowed; combined loading is over only when both
/// fetches have settled.
pub async fn refresh_both<R1, T1, R2, T2>(
    first: &mut CollectionController<R1, T1>,
    second: &mut CollectionController<R2, T2>,
) -> (Result<(), CoreError>, Result<(), CoreError>)
where
    R1: Resource,
    T1: CollectionTransport<R1>,
    R2: Resource,
    T2: CollectionTransport<R2>,
{
    tokio::join!(first.refresh(), second.refresh())
}
