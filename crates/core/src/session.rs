//! # Editor Session
//!
//! Glue between the mutators and the history: each user action computes a new
//! document from the present one and commits it as a single undo step.
//!
//! Enrichment results follow the same path. A gateway call runs to completion
//! before anything is committed, so a failure or an empty answer leaves the
//! history untouched, and a late answer is applied on top of whatever the
//! present is at that moment.

use crate::error::Result;
use crate::gateway::{reconcile_parsed, DuplicateGroup, EnrichmentGateway, PartialLibraryItem};
use crate::history::History;
use crate::ids::IdGenerator;
use crate::library::{self, LibraryDraft};
use crate::mutate::{self, Direction, ItemPatch, MetadataField, SectionPatch, SlidePatch};
use crate::persist;
use crate::types::{ProtocolDocument, SectionKind, SlideKind};

/// What an action did to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A new snapshot was committed.
    Applied,
    /// Nothing changed; no snapshot was committed.
    NothingToDo,
}

/// An editing session over one protocol.
#[derive(Debug, Clone)]
pub struct EditorSession {
    history: History<ProtocolDocument>,
    ids: IdGenerator,
}

impl EditorSession {
    /// Start a session on `doc`. `seed` keeps ids distinct across sessions.
    pub fn new(doc: ProtocolDocument, seed: impl Into<String>) -> Self {
        Self {
            history: History::new(doc),
            ids: IdGenerator::new(seed),
        }
    }

    /// Start a session on the starter protocol.
    pub fn starter(seed: impl Into<String>) -> Self {
        Self::new(ProtocolDocument::starter(), seed)
    }

    /// Set a custom undo limit.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history = self.history.with_limit(limit);
        self
    }

    /// The present document.
    pub fn document(&self) -> &ProtocolDocument {
        self.history.present()
    }

    /// The underlying history.
    pub fn history(&self) -> &History<ProtocolDocument> {
        &self.history
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Commit `next` unless it equals the present.
    fn commit(&mut self, next: ProtocolDocument) -> Outcome {
        if next == *self.history.present() {
            return Outcome::NothingToDo;
        }
        self.history.commit(next);
        Outcome::Applied
    }

    pub fn set_metadata(&mut self, field: MetadataField, value: impl Into<String>) -> Outcome {
        let next = mutate::set_metadata(self.document(), field, value);
        self.commit(next)
    }

    /// Append a slide; returns its id.
    pub fn add_slide(&mut self, kind: SlideKind) -> String {
        let (next, id) = mutate::add_slide(self.history.present(), kind, &mut self.ids);
        self.commit(next);
        id
    }

    pub fn remove_slide(&mut self, slide_id: &str) -> Outcome {
        let next = mutate::remove_slide(self.document(), slide_id);
        self.commit(next)
    }

    pub fn move_slide(&mut self, slide_id: &str, direction: Direction) -> Outcome {
        let next = mutate::move_slide(self.document(), slide_id, direction);
        self.commit(next)
    }

    pub fn patch_slide(&mut self, slide_id: &str, patch: &SlidePatch) -> Outcome {
        let next = mutate::patch_slide(self.document(), slide_id, patch);
        self.commit(next)
    }

    /// Append a section; returns its id, or `None` if the slide cannot hold one.
    pub fn add_section(&mut self, slide_id: &str, kind: SectionKind) -> Option<String> {
        let (next, id) = mutate::add_section(self.history.present(), slide_id, kind, &mut self.ids);
        self.commit(next);
        id
    }

    pub fn remove_section(&mut self, slide_id: &str, section_id: &str) -> Outcome {
        let next = mutate::remove_section(self.document(), slide_id, section_id);
        self.commit(next)
    }

    pub fn move_section(
        &mut self,
        slide_id: &str,
        section_id: &str,
        direction: Direction,
    ) -> Outcome {
        let next = mutate::move_section(self.document(), slide_id, section_id, direction);
        self.commit(next)
    }

    pub fn patch_section(
        &mut self,
        slide_id: &str,
        section_id: &str,
        patch: &SectionPatch,
    ) -> Outcome {
        let next = mutate::patch_section(self.document(), slide_id, section_id, patch);
        self.commit(next)
    }

    pub fn add_item(&mut self, slide_id: &str, section_id: &str) -> Outcome {
        let next = mutate::add_item(self.document(), slide_id, section_id);
        self.commit(next)
    }

    /// Append a copy of the library item `library_id` to a section.
    pub fn add_item_from_library(
        &mut self,
        slide_id: &str,
        section_id: &str,
        library_id: &str,
    ) -> Outcome {
        let Some(library_item) = self.document().library_item(library_id) else {
            log::debug!("No library item with id {}", library_id);
            return Outcome::NothingToDo;
        };
        let next =
            mutate::add_item_from_library(self.document(), slide_id, section_id, library_item);
        self.commit(next)
    }

    pub fn remove_item(&mut self, slide_id: &str, section_id: &str, index: usize) -> Outcome {
        let next = mutate::remove_item(self.document(), slide_id, section_id, index);
        self.commit(next)
    }

    pub fn patch_item(
        &mut self,
        slide_id: &str,
        section_id: &str,
        index: usize,
        patch: &ItemPatch,
    ) -> Outcome {
        let next = mutate::patch_item(self.document(), slide_id, section_id, index, patch);
        self.commit(next)
    }

    /// Save a new library item; returns its id.
    pub fn add_library_item(&mut self, draft: LibraryDraft) -> Result<String> {
        let (next, id) = library::insert_item(self.history.present(), draft, &mut self.ids)?;
        self.commit(next);
        Ok(id)
    }

    /// Save a library item from a slide item (name, image and description).
    pub fn save_item_to_library(
        &mut self,
        slide_id: &str,
        section_id: &str,
        index: usize,
    ) -> Result<String> {
        let item = self
            .document()
            .section(slide_id, section_id)
            .and_then(|s| s.items.get(index))
            .cloned()
            .unwrap_or_default();

        let mut draft = LibraryDraft::new(item.text, item.img.unwrap_or_default());
        draft.description = item.description;
        self.add_library_item(draft)
    }

    pub fn update_library_item(&mut self, id: &str, draft: LibraryDraft) -> Result<Outcome> {
        let next = library::update_item(self.document(), id, draft)?;
        Ok(self.commit(next))
    }

    pub fn remove_library_item(&mut self, id: &str) -> Outcome {
        let next = library::remove_item(self.document(), id);
        self.commit(next)
    }

    /// Serialize the present document.
    pub fn export_project(&self) -> Result<String> {
        persist::export_project(self.document())
    }

    /// Replace the present document with an imported project.
    ///
    /// A malformed file leaves the session unchanged.
    pub fn import_project(&mut self, json: &str) -> Result<Outcome> {
        let doc = persist::import_project(json)?;
        Ok(self.commit(doc))
    }

    /// Serialize the exercise library.
    pub fn export_library(&self) -> Result<String> {
        persist::export_library(&self.document().exercise_library)
    }

    /// Replace the library wholesale with an imported one.
    pub fn import_library(&mut self, json: &str) -> Result<Outcome> {
        let items = persist::import_library(json)?;
        let next = library::replace_library(self.document(), items);
        Ok(self.commit(next))
    }

    /// Commit a document produced by free-text parsing.
    pub fn apply_parsed_protocol(&mut self, parsed: ProtocolDocument) -> Outcome {
        let library = self.document().exercise_library.clone();
        let next = reconcile_parsed(parsed, &library, &mut self.ids);
        self.commit(next)
    }

    /// Commit exercises extracted from markup.
    pub fn apply_extracted_items(&mut self, extracted: &[PartialLibraryItem]) -> Outcome {
        let (next, added) =
            library::import_extracted(self.history.present(), extracted, &mut self.ids);
        if added == 0 {
            return Outcome::NothingToDo;
        }
        self.commit(next)
    }

    /// Replace a duplicate group with its suggested merge.
    pub fn merge_duplicates(&mut self, group: &DuplicateGroup) -> Outcome {
        let (next, _) = library::merge_group(self.history.present(), group, &mut self.ids);
        self.commit(next)
    }

    /// Parse free text through the gateway and replace the document with it.
    pub fn import_free_text<G: EnrichmentGateway + ?Sized>(
        &mut self,
        gateway: &G,
        text: &str,
    ) -> Result<Outcome> {
        if text.trim().is_empty() {
            return Ok(Outcome::NothingToDo);
        }
        match gateway.parse_free_text(text, &self.document().exercise_library)? {
            Some(parsed) => Ok(self.apply_parsed_protocol(parsed)),
            None => Ok(Outcome::NothingToDo),
        }
    }

    /// Extract exercises from an HTML snippet through the gateway.
    pub fn import_library_from_markup<G: EnrichmentGateway + ?Sized>(
        &mut self,
        gateway: &G,
        html: &str,
    ) -> Result<Outcome> {
        if html.trim().is_empty() {
            return Ok(Outcome::NothingToDo);
        }
        match gateway.extract_library_items(html)? {
            Some(items) => Ok(self.apply_extracted_items(&items)),
            None => Ok(Outcome::NothingToDo),
        }
    }

    /// Generate a description for an item, using the protocol title as context.
    pub fn describe_item<G: EnrichmentGateway + ?Sized>(
        &mut self,
        gateway: &G,
        slide_id: &str,
        section_id: &str,
        index: usize,
    ) -> Result<Outcome> {
        let Some(name) = self.item_text(slide_id, section_id, index) else {
            return Ok(Outcome::NothingToDo);
        };
        let context = self.document().protocol_title.clone();

        match gateway.generate_description(&name, &context)? {
            Some(description) => {
                let patch = ItemPatch {
                    description: Some(description),
                    ..Default::default()
                };
                Ok(self.patch_item(slide_id, section_id, index, &patch))
            }
            None => Ok(Outcome::NothingToDo),
        }
    }

    /// Generate an image for an item from its name and description.
    pub fn illustrate_item<G: EnrichmentGateway + ?Sized>(
        &mut self,
        gateway: &G,
        slide_id: &str,
        section_id: &str,
        index: usize,
    ) -> Result<Outcome> {
        let Some(name) = self.item_text(slide_id, section_id, index) else {
            return Ok(Outcome::NothingToDo);
        };
        let description = self
            .document()
            .section(slide_id, section_id)
            .and_then(|s| s.items.get(index))
            .and_then(|item| item.description.clone())
            .unwrap_or_default();

        match gateway.generate_image(&name, &description)? {
            Some(img) => {
                let patch = ItemPatch {
                    img: Some(img),
                    ..Default::default()
                };
                Ok(self.patch_item(slide_id, section_id, index, &patch))
            }
            None => Ok(Outcome::NothingToDo),
        }
    }

    /// Ask the gateway for duplicate groups in the library.
    ///
    /// Nothing is committed; pass a chosen group to [`Self::merge_duplicates`].
    pub fn find_duplicates<G: EnrichmentGateway + ?Sized>(
        &self,
        gateway: &G,
    ) -> Result<Vec<DuplicateGroup>> {
        let groups = gateway.find_duplicates(&self.document().exercise_library)?;
        Ok(groups.unwrap_or_default())
    }

    /// Non-empty text of an item.
    fn item_text(&self, slide_id: &str, section_id: &str, index: usize) -> Option<String> {
        self.document()
            .section(slide_id, section_id)?
            .items
            .get(index)
            .map(|item| item.text.clone())
            .filter(|text| !text.trim().is_empty())
    }
}
