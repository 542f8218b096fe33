//! Edit session — the "creating vs. editing" duality behind one form.
//!
//! A session snapshots an entity's fields into an editable draft (or
//! starts from defaults), takes single-field edits, and on submit routes
//! to the collection controller's create or update. The draft is isolated:
//! once editing begins, changes to the underlying collection don't touch
//! it until the next `begin_edit`.

use crate::collection::{CollectionController, Resource};
use crate::error::CoreError;
use crate::gateway::CollectionTransport;

/// Editable form state for one entity type.
///
/// Implementations keep every text field a `String` (empty, never absent,
/// so form controls stay controlled) and expose their free-text fields
/// through `Field`. No validation happens here; the collection controller
/// validates at submit time.
pub trait Draft: Clone + Default {
    type Entity: Resource<Draft = Self>;
    type Field: Copy;

    /// Verbatim copy of the entity's current fields, optional fields
    /// defaulting to the empty string.
    fn from_entity(entity: &Self::Entity) -> Self;

    /// Mutate exactly one field.
    fn set_field(&mut self, field: Self::Field, value: &str);
}

/// Tracks which entity (if any) a form is editing, and its draft.
pub struct EditSession<D: Draft> {
    /// `None` means the form is creating a new entity.
    target: Option<String>,
    draft: D,
    /// Whether the presentation affordance (the form dialog) is showing.
    open: bool,
}

impl<D: Draft> EditSession<D> {
    pub fn new() -> Self {
        Self {
            target: None,
            draft: D::default(),
            open: false,
        }
    }

    // ── Read state ──────────────────────────────────────────

    pub fn draft(&self) -> &D {
        &self.draft
    }

    /// Direct draft access for typed setters (`set_gender`,
    /// `select_patient`) the field enum deliberately doesn't cover.
    pub fn draft_mut(&mut self) -> &mut D {
        &mut self.draft
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn is_editing(&self) -> bool {
        self.target.is_some()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    // ── Lifecycle ───────────────────────────────────────────

    /// Open the form on a fresh draft.
    pub fn begin_create(&mut self) {
        self.target = None;
        self.draft = D::default();
        self.open = true;
    }

    /// Open the form on a snapshot of `entity`'s current fields.
    pub fn begin_edit(&mut self, entity: &D::Entity) {
        self.target = Some(entity.id().to_string());
        self.draft = D::from_entity(entity);
        self.open = true;
    }

    pub fn set_field(&mut self, field: D::Field, value: &str) {
        self.draft.set_field(field, value);
    }

    /// Dismiss the form without submitting; the session resets.
    pub fn cancel(&mut self) {
        self.reset();
    }

    /// Route the draft to create (no target) or update (target held).
    ///
    /// Success resets the session and closes the form. Failure preserves
    /// everything so the user can fix and retry without re-entering data.
    pub async fn submit<T>(
        &mut self,
        collection: &mut CollectionController<D::Entity, T>,
    ) -> Result<(), CoreError>
    where
        T: CollectionTransport<D::Entity>,
    {
        let result = match &self.target {
            None => collection.create(&self.draft).await,
            Some(id) => collection.update(id, &self.draft).await,
        };
        if result.is_ok() {
            self.reset();
        }
        result
    }

    fn reset(&mut self) {
        self.target = None;
        self.draft = D::default();
        self.open = false;
    }
}

impl<D: Draft> Default for EditSession<D> {
    fn default() -> Self {
        Self::new()
    }
}
