//! Contracts for the external enrichment service.
//!
//! The service parses free text into a protocol, extracts exercises from HTML
//! snippets, writes descriptions, draws images and spots duplicate exercises.
//! Only the request/response shapes live here; transport and prompting belong
//! to the implementor.
//!
//! Every call distinguishes failure (`Err`) from "nothing found" (`Ok(None)`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

use crate::ids::IdGenerator;
use crate::library::find_match;
use crate::types::{LibraryItem, ProtocolDocument, SlideKind};

/// Result type for enrichment calls.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Errors raised by an enrichment service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The request never produced a response.
    #[error("Request failed: {0}")]
    Transport(String),

    /// The response could not be understood.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// An exercise extracted from markup; any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialLibraryItem {
    pub name: Option<String>,
    pub img: Option<String>,
    pub description: Option<String>,
}

/// The item proposed to replace a group of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeSuggestion {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub img: String,
}

/// Library items judged to describe the same exercise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub ids: BTreeSet<String>,
    pub suggested_merge: MergeSuggestion,
}

/// The external enrichment service.
///
/// Results are not expected to be deterministic.
pub trait EnrichmentGateway {
    /// Turn free text into a protocol document.
    ///
    /// `library` lets the service reuse known exercise names. The returned
    /// document still needs [`reconcile_parsed`] before it is committed.
    fn parse_free_text(
        &self,
        text: &str,
        library: &[LibraryItem],
    ) -> GatewayResult<Option<ProtocolDocument>>;

    /// Extract exercises that have an image from an HTML snippet.
    fn extract_library_items(&self, html: &str) -> GatewayResult<Option<Vec<PartialLibraryItem>>>;

    /// Write instructions for an exercise, given the protocol as context.
    fn generate_description(&self, name: &str, context: &str) -> GatewayResult<Option<String>>;

    /// Draw an exercise, returning an image data URL.
    fn generate_image(&self, name: &str, description: &str) -> GatewayResult<Option<String>>;

    /// Group semantic duplicates. Called only for libraries of two or more.
    fn detect_duplicates(
        &self,
        library: &[LibraryItem],
    ) -> GatewayResult<Option<Vec<DuplicateGroup>>>;

    /// Group semantic duplicates; empty for libraries under two items.
    fn find_duplicates(
        &self,
        library: &[LibraryItem],
    ) -> GatewayResult<Option<Vec<DuplicateGroup>>> {
        if library.len() < 2 {
            return Ok(Some(Vec::new()));
        }
        self.detect_duplicates(library)
    }
}

/// Prepare a parsed document for commit.
///
/// Assigns fresh slide and section ids, drops sections from transition
/// slides and maps exercise items onto the library: a matched item takes the
/// library image, keeps its own description and falls back to the library
/// description only when it has none. When the parsed document carries no
/// library, the existing one is kept.
pub fn reconcile_parsed(
    parsed: ProtocolDocument,
    library: &[LibraryItem],
    ids: &mut IdGenerator,
) -> ProtocolDocument {
    let mut doc = parsed;
    if doc.exercise_library.is_empty() {
        doc.exercise_library = library.to_vec();
    }

    let mut slides = Vec::with_capacity(doc.slides.len());
    for slide in &doc.slides {
        let mut slide = slide.as_ref().clone();
        slide.id = ids.fresh_id("slide", &doc);

        if slide.kind == SlideKind::Transition {
            slide.sections.clear();
        }

        for section in &mut slide.sections {
            section.id = ids.fresh_id("sec", &doc);
            for item in &mut section.items {
                let Some(matched) = find_match(library, &item.text) else {
                    continue;
                };
                if !matched.img.is_empty() {
                    item.img = Some(matched.img.clone());
                }
                if item.description_text().is_none() {
                    item.description = matched.description.clone();
                }
            }
        }

        slides.push(Arc::new(slide));
    }

    doc.slides = slides;
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Section, SectionItem, SectionKind, Slide};

    struct EmptyGateway;

    impl EnrichmentGateway for EmptyGateway {
        fn parse_free_text(
            &self,
            _: &str,
            _: &[LibraryItem],
        ) -> GatewayResult<Option<ProtocolDocument>> {
            Ok(None)
        }
        fn extract_library_items(&self, _: &str) -> GatewayResult<Option<Vec<PartialLibraryItem>>> {
            Ok(None)
        }
        fn generate_description(&self, _: &str, _: &str) -> GatewayResult<Option<String>> {
            Ok(None)
        }
        fn generate_image(&self, _: &str, _: &str) -> GatewayResult<Option<String>> {
            Ok(None)
        }
        fn detect_duplicates(
            &self,
            _: &[LibraryItem],
        ) -> GatewayResult<Option<Vec<DuplicateGroup>>> {
            Err(GatewayError::Transport("offline".to_string()))
        }
    }

    fn parsed_document() -> ProtocolDocument {
        let mut cover = Slide::new("x", SlideKind::Transition);
        cover.sections.push(Section::new("s", SectionKind::Info));

        let mut phase = Slide::new("x", SlideKind::Phase);
        phase.sections.push(Section::with_items(
            "s",
            SectionKind::Exercises,
            "Esercizi",
            vec![
                SectionItem {
                    text: "Isometria quadricipite".to_string(),
                    img: None,
                    description: Some("10 ripetizioni, tenere 5 secondi".to_string()),
                },
                SectionItem::new("Flesso-estensione caviglia, 20 volte"),
                SectionItem::new("Cyclette"),
            ],
        ));

        let mut doc = ProtocolDocument::new("", "LCA", "");
        doc.slides = vec![Arc::new(cover), Arc::new(phase)];
        doc
    }

    #[test]
    fn test_find_duplicates_short_circuits_small_libraries() {
        let gateway = EmptyGateway;
        let starter = ProtocolDocument::starter();

        assert_eq!(gateway.find_duplicates(&[]), Ok(Some(Vec::new())));
        assert_eq!(
            gateway.find_duplicates(&starter.exercise_library[..1]),
            Ok(Some(Vec::new()))
        );
        assert!(gateway.find_duplicates(&starter.exercise_library).is_err());
    }

    #[test]
    fn test_reconcile_assigns_unique_ids() {
        let mut ids = IdGenerator::new("r");
        let library = ProtocolDocument::starter().exercise_library;
        let doc = reconcile_parsed(parsed_document(), &library, &mut ids);

        assert!(doc.validate().is_ok());
        assert_ne!(doc.slides[0].id, doc.slides[1].id);
        assert!(doc.slides[0].sections.is_empty());
    }

    #[test]
    fn test_reconcile_maps_items_onto_library() {
        let mut ids = IdGenerator::new("r");
        let library = ProtocolDocument::starter().exercise_library;
        let doc = reconcile_parsed(parsed_document(), &library, &mut ids);
        let items = &doc.slides[1].sections[0].items;

        // Verbatim description wins, library image fills in.
        assert_eq!(items[0].img.as_deref(), Some(library[1].img.as_str()));
        assert_eq!(
            items[0].description.as_deref(),
            Some("10 ripetizioni, tenere 5 secondi")
        );

        // Containment match falls back to the library description.
        assert_eq!(items[1].img.as_deref(), Some(library[0].img.as_str()));
        assert_eq!(items[1].description, library[0].description);

        // Unknown exercise is untouched.
        assert_eq!(items[2], SectionItem::new("Cyclette"));
    }

    #[test]
    fn test_reconcile_keeps_existing_library_when_missing() {
        let mut ids = IdGenerator::new("r");
        let library = ProtocolDocument::starter().exercise_library;
        let doc = reconcile_parsed(parsed_document(), &library, &mut ids);
        assert_eq!(doc.exercise_library, library);
    }
}
