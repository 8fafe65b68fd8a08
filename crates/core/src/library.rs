//! Exercise library operations.
//!
//! Library items are keyed by their normalized name: trimmed, NFC-composed and
//! lowercased. User-facing inserts refuse a second item with the same key.
//! Editing an existing item does not re-check the key, and bulk replacement
//! (library import) bypasses the check entirely.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};
use crate::gateway::{DuplicateGroup, PartialLibraryItem};
use crate::ids::IdGenerator;
use crate::types::{LibraryItem, ProtocolDocument};

/// Name given to extracted items that come back without one.
const UNKNOWN_EXERCISE_NAME: &str = "Unknown";

/// Fields of a library item being created or edited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LibraryDraft {
    pub name: String,
    pub img: String,
    pub description: Option<String>,
}

impl LibraryDraft {
    pub fn new(name: impl Into<String>, img: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            img: img.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn ensure_complete(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.img.trim().is_empty() {
            return Err(Error::IncompleteLibraryItem);
        }
        Ok(())
    }
}

/// Normalize a name into the library's uniqueness key.
pub fn normalize_name(name: &str) -> String {
    name.trim().nfc().collect::<String>().to_lowercase()
}

/// Whether an item with the same normalized name exists.
pub fn contains_name(library: &[LibraryItem], name: &str) -> bool {
    let key = normalize_name(name);
    library.iter().any(|item| normalize_name(&item.name) == key)
}

/// Items whose name contains `query`, case-insensitively.
pub fn search<'a>(library: &'a [LibraryItem], query: &str) -> Vec<&'a LibraryItem> {
    let needle = query.to_lowercase();
    library
        .iter()
        .filter(|item| item.name.to_lowercase().contains(&needle))
        .collect()
}

/// Library item matching a free-text exercise name.
///
/// Matches when the normalized names are equal or when the text contains the
/// library name.
pub fn find_match<'a>(library: &'a [LibraryItem], name: &str) -> Option<&'a LibraryItem> {
    let key = normalize_name(name);
    library.iter().find(|item| {
        let item_key = normalize_name(&item.name);
        !item_key.is_empty() && (item_key == key || key.contains(&item_key))
    })
}

/// Add a new item to the library.
///
/// Fails if the name or image is blank, or if the normalized name is taken.
/// Returns the new document and the new item's id.
pub fn insert_item(
    doc: &ProtocolDocument,
    draft: LibraryDraft,
    ids: &mut IdGenerator,
) -> Result<(ProtocolDocument, String)> {
    draft.ensure_complete()?;
    if contains_name(&doc.exercise_library, &draft.name) {
        return Err(Error::DuplicateLibraryItem(draft.name));
    }

    let id = ids.fresh_id("ex", doc);
    let mut next = doc.clone();
    next.exercise_library.push(LibraryItem {
        id: id.clone(),
        name: draft.name,
        img: draft.img,
        description: draft.description,
    });
    Ok((next, id))
}

/// Overwrite an existing item.
///
/// The new name is not checked against the rest of the library, so an edit
/// may introduce a name collision.
pub fn update_item(
    doc: &ProtocolDocument,
    id: &str,
    draft: LibraryDraft,
) -> Result<ProtocolDocument> {
    draft.ensure_complete()?;

    let mut next = doc.clone();
    match next.exercise_library.iter_mut().find(|item| item.id == id) {
        Some(item) => {
            item.name = draft.name;
            item.img = draft.img;
            item.description = draft.description;
        }
        None => log::debug!("No library item with id {}", id),
    }
    Ok(next)
}

/// Remove an item by id.
pub fn remove_item(doc: &ProtocolDocument, id: &str) -> ProtocolDocument {
    let mut next = doc.clone();
    next.exercise_library.retain(|item| item.id != id);
    next
}

/// Replace the whole library, as a library import does.
pub fn replace_library(doc: &ProtocolDocument, library: Vec<LibraryItem>) -> ProtocolDocument {
    let mut next = doc.clone();
    next.exercise_library = library;
    next
}

/// Append items extracted from an HTML snippet.
///
/// Named items already in the library are dropped; missing names
/// become "Unknown" and missing images and descriptions become empty.
/// Returns the new document and the number of items added.
pub fn import_extracted(
    doc: &ProtocolDocument,
    extracted: &[PartialLibraryItem],
    ids: &mut IdGenerator,
) -> (ProtocolDocument, usize) {
    let mut next = doc.clone();
    let mut added = 0;

    for partial in extracted {
        if let Some(name) = partial.name.as_deref() {
            if contains_name(&doc.exercise_library, name) {
                log::debug!("Skipping extracted exercise already in library: {}", name);
                continue;
            }
        }

        let id = ids.fresh_id("ex", &next);
        next.exercise_library.push(LibraryItem {
            id,
            name: partial
                .name
                .clone()
                .unwrap_or_else(|| UNKNOWN_EXERCISE_NAME.to_string()),
            img: partial.img.clone().unwrap_or_default(),
            description: Some(partial.description.clone().unwrap_or_default()),
        });
        added += 1;
    }

    (next, added)
}

/// Replace a group of duplicates with the suggested merged item.
///
/// Returns the new document and the merged item's id.
pub fn merge_group(
    doc: &ProtocolDocument,
    group: &DuplicateGroup,
    ids: &mut IdGenerator,
) -> (ProtocolDocument, String) {
    let id = ids.fresh_id("ex", doc);
    let mut next = doc.clone();
    next.exercise_library
        .retain(|item| !group.ids.contains(&item.id));
    next.exercise_library.push(LibraryItem {
        id: id.clone(),
        name: group.suggested_merge.name.clone(),
        img: group.suggested_merge.img.clone(),
        description: Some(group.suggested_merge.description.clone()),
    });
    (next, id)
}
