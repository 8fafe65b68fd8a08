//! Project and library import/export as JSON.
//!
//! Files are pretty printed with two-space indentation. Imports either
//! produce a complete, valid value or fail with [`Error::InvalidFile`] /
//! [`Error::InvalidDocument`]; callers keep their current document on error.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{LibraryItem, ProtocolDocument, SlideKind};

/// Serialize a whole project.
pub fn export_project(doc: &ProtocolDocument) -> Result<String> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Decode and validate a project file.
///
/// Sections found on transition slides are dropped before validation.
pub fn import_project(json: &str) -> Result<ProtocolDocument> {
    let mut doc: ProtocolDocument = serde_json::from_str(json)
        .map_err(|e| Error::InvalidFile(format!("Not a protocol project: {}", e)))?;
    drop_transition_sections(&mut doc);
    doc.validate()?;
    log::debug!(
        "Imported project '{}' with {} slides",
        doc.protocol_title,
        doc.slides.len()
    );
    Ok(doc)
}

fn drop_transition_sections(doc: &mut ProtocolDocument) {
    for slide in &mut doc.slides {
        if slide.kind == SlideKind::Transition && !slide.sections.is_empty() {
            log::warn!(
                "Dropping {} sections from transition slide '{}'",
                slide.sections.len(),
                slide.id
            );
            Arc::make_mut(slide).sections.clear();
        }
    }
}

/// Serialize the exercise library alone.
pub fn export_library(library: &[LibraryItem]) -> Result<String> {
    Ok(serde_json::to_string_pretty(library)?)
}

/// Decode a library file. The file must hold a JSON array of items.
pub fn import_library(json: &str) -> Result<Vec<LibraryItem>> {
    let library: Vec<LibraryItem> = serde_json::from_str(json)
        .map_err(|e| Error::InvalidFile(format!("Not an exercise library: {}", e)))?;
    log::debug!("Imported library with {} items", library.len());
    Ok(library)
}
