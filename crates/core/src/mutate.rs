//! Document mutators.
//!
//! Every function takes the current document by reference and returns a new
//! one; nothing is changed in place. Slides are shared between the old and the
//! new document except for the one slide a mutator touches.
//!
//! Addressing an unknown slide, section or item index yields an unchanged
//! copy rather than an error.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::ids::IdGenerator;
use crate::types::{
    LibraryItem, ProtocolDocument, Section, SectionItem, SectionKind, Slide, SlideKind,
};

/// A document-level text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetadataField {
    DoctorName,
    ProtocolTitle,
    LogoUrl,
}

impl MetadataField {
    /// Parse the camelCase field name used in exported files.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "doctorName" => Some(Self::DoctorName),
            "protocolTitle" => Some(Self::ProtocolTitle),
            "logoUrl" => Some(Self::LogoUrl),
            _ => None,
        }
    }
}

/// Direction for swapping an element with its neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Fields to overwrite on a slide. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlidePatch {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub background_color: Option<String>,
    pub custom_width: Option<u32>,
    pub custom_height: Option<u32>,
}

impl SlidePatch {
    fn apply_to(&self, slide: &mut Slide) {
        if let Some(title) = &self.title {
            slide.title = Some(title.clone());
        }
        if let Some(image_url) = &self.image_url {
            slide.image_url = Some(image_url.clone());
        }
        if let Some(color) = &self.background_color {
            slide.background_color = Some(color.clone());
        }
        if let Some(width) = self.custom_width {
            slide.custom_width = Some(width);
        }
        if let Some(height) = self.custom_height {
            slide.custom_height = Some(height);
        }
    }
}

/// Fields to overwrite on a section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionPatch {
    pub title: Option<String>,
}

/// Fields to overwrite on an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemPatch {
    pub text: Option<String>,
    pub img: Option<String>,
    pub description: Option<String>,
}

impl ItemPatch {
    fn apply_to(&self, item: &mut SectionItem) {
        if let Some(text) = &self.text {
            item.text = text.clone();
        }
        if let Some(img) = &self.img {
            item.img = Some(img.clone());
        }
        if let Some(description) = &self.description {
            item.description = Some(description.clone());
        }
    }
}

/// Swap `items[index]` with its neighbour. Returns `false` at the boundaries.
fn swap_adjacent<T>(items: &mut [T], index: usize, direction: Direction) -> bool {
    let target = match direction {
        Direction::Up if index > 0 => index - 1,
        Direction::Down if index + 1 < items.len() => index + 1,
        _ => return false,
    };
    items.swap(index, target);
    true
}

/// Copy `doc` and run `f` on the slide with `slide_id`, if present.
fn map_slide(
    doc: &ProtocolDocument,
    slide_id: &str,
    f: impl FnOnce(&mut Slide),
) -> ProtocolDocument {
    let mut next = doc.clone();
    match next.slide_index(slide_id) {
        Some(index) => f(Arc::make_mut(&mut next.slides[index])),
        None => log::debug!("No slide with id {}", slide_id),
    }
    next
}

/// Copy `doc` and run `f` on one section, if present.
fn map_section(
    doc: &ProtocolDocument,
    slide_id: &str,
    section_id: &str,
    f: impl FnOnce(&mut Section),
) -> ProtocolDocument {
    if doc.section(slide_id, section_id).is_none() {
        log::debug!("No section {} in slide {}", section_id, slide_id);
        return doc.clone();
    }
    map_slide(doc, slide_id, |slide| {
        if let Some(section) = slide.sections.iter_mut().find(|s| s.id == section_id) {
            f(section);
        }
    })
}

/// Set one of the document-level text fields.
pub fn set_metadata(
    doc: &ProtocolDocument,
    field: MetadataField,
    value: impl Into<String>,
) -> ProtocolDocument {
    let mut next = doc.clone();
    let value = value.into();
    match field {
        MetadataField::DoctorName => next.doctor_name = value,
        MetadataField::ProtocolTitle => next.protocol_title = value,
        MetadataField::LogoUrl => next.logo_url = value,
    }
    next
}

/// Append a slide with fresh ids and the default content for its kind.
///
/// Returns the new document and the new slide's id.
pub fn add_slide(
    doc: &ProtocolDocument,
    kind: SlideKind,
    ids: &mut IdGenerator,
) -> (ProtocolDocument, String) {
    let slide_id = ids.fresh_id("slide", doc);
    let section_id = ids.fresh_id("sec", doc);

    let mut next = doc.clone();
    next.slides.push(Arc::new(Slide::with_defaults(slide_id.clone(), kind, section_id)));
    (next, slide_id)
}

/// Remove a slide by id.
pub fn remove_slide(doc: &ProtocolDocument, slide_id: &str) -> ProtocolDocument {
    let mut next = doc.clone();
    next.slides.retain(|s| s.id != slide_id);
    next
}

/// Swap a slide with its neighbour. No-op at either end.
pub fn move_slide(
    doc: &ProtocolDocument,
    slide_id: &str,
    direction: Direction,
) -> ProtocolDocument {
    let mut next = doc.clone();
    if let Some(index) = next.slide_index(slide_id) {
        if !swap_adjacent(&mut next.slides, index, direction) {
            log::debug!("Slide {} already at boundary", slide_id);
        }
    }
    next
}

/// Overwrite title, image or appearance fields of a slide.
pub fn patch_slide(doc: &ProtocolDocument, slide_id: &str, patch: &SlidePatch) -> ProtocolDocument {
    map_slide(doc, slide_id, |slide| patch.apply_to(slide))
}

/// Append an empty section of `kind` with its default title.
///
/// Transition slides cannot hold sections; for them, and for unknown slides,
/// the document is returned unchanged with no id.
pub fn add_section(
    doc: &ProtocolDocument,
    slide_id: &str,
    kind: SectionKind,
    ids: &mut IdGenerator,
) -> (ProtocolDocument, Option<String>) {
    match doc.slide(slide_id) {
        Some(slide) if slide.kind != SlideKind::Transition => {}
        Some(_) => {
            log::debug!("Transition slide {} cannot hold sections", slide_id);
            return (doc.clone(), None);
        }
        None => return (doc.clone(), None),
    }

    let section_id = ids.fresh_id("sec", doc);
    let next = map_slide(doc, slide_id, |slide| {
        slide.sections.push(Section::new(section_id.clone(), kind));
    });
    (next, Some(section_id))
}

/// Remove a section from a slide.
pub fn remove_section(
    doc: &ProtocolDocument,
    slide_id: &str,
    section_id: &str,
) -> ProtocolDocument {
    map_slide(doc, slide_id, |slide| {
        slide.sections.retain(|s| s.id != section_id);
    })
}

/// Swap a section with its neighbour within the slide. No-op at either end.
pub fn move_section(
    doc: &ProtocolDocument,
    slide_id: &str,
    section_id: &str,
    direction: Direction,
) -> ProtocolDocument {
    map_slide(doc, slide_id, |slide| {
        if let Some(index) = slide.sections.iter().position(|s| s.id == section_id) {
            swap_adjacent(&mut slide.sections, index, direction);
        }
    })
}

/// Overwrite the title of a section.
pub fn patch_section(
    doc: &ProtocolDocument,
    slide_id: &str,
    section_id: &str,
    patch: &SectionPatch,
) -> ProtocolDocument {
    map_section(doc, slide_id, section_id, |section| {
        if let Some(title) = &patch.title {
            section.title = title.clone();
        }
    })
}

/// Append an empty item to a section.
pub fn add_item(doc: &ProtocolDocument, slide_id: &str, section_id: &str) -> ProtocolDocument {
    map_section(doc, slide_id, section_id, |section| {
        section.items.push(SectionItem::default());
    })
}

/// Append a copy of a library exercise to a section.
///
/// The item copies name, image and description; later edits to the library
/// do not reach it.
pub fn add_item_from_library(
    doc: &ProtocolDocument,
    slide_id: &str,
    section_id: &str,
    library_item: &LibraryItem,
) -> ProtocolDocument {
    map_section(doc, slide_id, section_id, |section| {
        section.items.push(SectionItem::from_library(library_item));
    })
}

/// Remove the item at `index`.
pub fn remove_item(
    doc: &ProtocolDocument,
    slide_id: &str,
    section_id: &str,
    index: usize,
) -> ProtocolDocument {
    map_section(doc, slide_id, section_id, |section| {
        if index < section.items.len() {
            section.items.remove(index);
        } else {
            log::debug!("Item index {} out of range in section {}", index, section.id);
        }
    })
}

/// Overwrite fields of the item at `index`.
pub fn patch_item(
    doc: &ProtocolDocument,
    slide_id: &str,
    section_id: &str,
    index: usize,
    patch: &ItemPatch,
) -> ProtocolDocument {
    map_section(doc, slide_id, section_id, |section| {
        match section.items.get_mut(index) {
            Some(item) => patch.apply_to(item),
            None => log::debug!("Item index {} out of range in section {}", index, section.id),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_phase() -> (ProtocolDocument, IdGenerator) {
        let mut ids = IdGenerator::new("t");
        let doc = ProtocolDocument::new("Dr", "Protocol", "");
        let (doc, _) = add_slide(&doc, SlideKind::Phase, &mut ids);
        (doc, ids)
    }

    #[test]
    fn test_set_metadata_leaves_input_untouched() {
        let doc = ProtocolDocument::starter();
        let next = set_metadata(&doc, MetadataField::ProtocolTitle, "LCA");
        assert_eq!(next.protocol_title, "LCA");
        assert_eq!(doc.protocol_title, "PROTESI TOTALE DI GINOCCHIO");
    }

    #[test]
    fn test_add_slide_assigns_fresh_ids() {
        let mut ids = IdGenerator::new("t");
        let doc = ProtocolDocument::new("Dr", "Protocol", "");
        let (doc, first) = add_slide(&doc, SlideKind::Phase, &mut ids);
        let (doc, second) = add_slide(&doc, SlideKind::Transition, &mut ids);

        assert_ne!(first, second);
        assert_eq!(doc.slides.len(), 2);
        assert_eq!(doc.slides[1].id, second);
        assert_eq!(doc.slides[0].sections.len(), 1);
        assert!(doc.slides[1].sections.is_empty());
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_untouched_slides_are_shared() {
        let doc = ProtocolDocument::starter();
        let next = patch_slide(
            &doc,
            "2",
            &SlidePatch {
                title: Some("Settimana 1".to_string()),
                ..Default::default()
            },
        );
        assert!(Arc::ptr_eq(&doc.slides[0], &next.slides[0]));
        assert!(!Arc::ptr_eq(&doc.slides[1], &next.slides[1]));
        assert_eq!(next.slides[1].title.as_deref(), Some("Settimana 1"));
        assert_eq!(doc.slides[1].title.as_deref(), Some("Pre-intervento"));
    }

    #[test]
    fn test_remove_slide() {
        let doc = ProtocolDocument::starter();
        let next = remove_slide(&doc, "1");
        assert_eq!(next.slides.len(), 1);
        assert_eq!(next.slides[0].id, "2");

        let unchanged = remove_slide(&doc, "missing");
        assert_eq!(unchanged, doc);
    }

    #[test]
    fn test_move_slide_and_boundaries() {
        let doc = ProtocolDocument::starter();
        let moved = move_slide(&doc, "2", Direction::Up);
        assert_eq!(moved.slides[0].id, "2");
        assert_eq!(moved.slides[1].id, "1");

        assert_eq!(move_slide(&doc, "1", Direction::Up), doc);
        assert_eq!(move_slide(&doc, "2", Direction::Down), doc);
    }

    #[test]
    fn test_patch_slide_appearance() {
        let doc = ProtocolDocument::starter();
        let patch = SlidePatch {
            background_color: Some("#fafafa".to_string()),
            custom_width: Some(900),
            custom_height: Some(600),
            ..Default::default()
        };
        let next = patch_slide(&doc, "2", &patch);
        let slide = next.slide("2").unwrap();
        assert_eq!(slide.background_color.as_deref(), Some("#fafafa"));
        assert_eq!(slide.custom_width, Some(900));
        assert_eq!(slide.custom_height, Some(600));
        assert_eq!(slide.title.as_deref(), Some("Pre-intervento"));
    }

    #[test]
    fn test_add_section_uses_default_title() {
        let (doc, mut ids) = doc_with_phase();
        let slide_id = doc.slides[0].id.clone();

        let (doc, section_id) = add_section(&doc, &slide_id, SectionKind::Criteria, &mut ids);
        let section_id = section_id.unwrap();
        let section = doc.section(&slide_id, &section_id).unwrap();
        assert_eq!(section.title, "Criteri di passaggio");
        assert!(section.items.is_empty());
    }

    #[test]
    fn test_add_section_to_transition_is_noop() {
        let mut ids = IdGenerator::new("t");
        let doc = ProtocolDocument::starter();
        let (next, id) = add_section(&doc, "1", SectionKind::Info, &mut ids);
        assert!(id.is_none());
        assert_eq!(next, doc);
    }

    #[test]
    fn test_move_and_remove_section() {
        let doc = ProtocolDocument::starter();
        let moved = move_section(&doc, "2", "sec2", Direction::Up);
        let ids: Vec<_> = moved
            .slide("2")
            .unwrap()
            .sections
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["sec2", "sec1"]);

        assert_eq!(move_section(&doc, "2", "sec1", Direction::Up), doc);

        let removed = remove_section(&doc, "2", "sec1");
        assert_eq!(removed.slide("2").unwrap().sections.len(), 1);
    }

    #[test]
    fn test_patch_section_title() {
        let doc = ProtocolDocument::starter();
        let patch = SectionPatch {
            title: Some("Goal".to_string()),
        };
        let next = patch_section(&doc, "2", "sec1", &patch);
        assert_eq!(next.section("2", "sec1").unwrap().title, "Goal");
    }

    #[test]
    fn test_item_insert_patch_remove() {
        let doc = ProtocolDocument::starter();
        let doc = add_item(&doc, "2", "sec1");
        assert_eq!(doc.section("2", "sec1").unwrap().items.len(), 2);
        assert_eq!(doc.section("2", "sec1").unwrap().items[1].text, "");

        let patch = ItemPatch {
            text: Some("Recuperare ROM".to_string()),
            ..Default::default()
        };
        let doc = patch_item(&doc, "2", "sec1", 1, &patch);
        assert_eq!(doc.section("2", "sec1").unwrap().items[1].text, "Recuperare ROM");

        let doc = remove_item(&doc, "2", "sec1", 0);
        let items = &doc.section("2", "sec1").unwrap().items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text, "Recuperare ROM");

        assert_eq!(remove_item(&doc, "2", "sec1", 9), doc);
        assert_eq!(patch_item(&doc, "2", "sec1", 9, &patch), doc);
    }

    #[test]
    fn test_item_from_library_is_a_copy() {
        let doc = ProtocolDocument::starter();
        let exercise = doc.library_item("ex1").unwrap().clone();
        let next = add_item_from_library(&doc, "2", "sec1", &exercise);

        let item = next.section("2", "sec1").unwrap().items.last().unwrap().clone();
        assert_eq!(item.text, exercise.name);
        assert_eq!(item.img.as_deref(), Some(exercise.img.as_str()));
        assert_eq!(item.description, exercise.description);
    }

    #[test]
    fn test_metadata_field_names() {
        assert_eq!(MetadataField::from_name("logoUrl"), Some(MetadataField::LogoUrl));
        assert_eq!(MetadataField::from_name("slides"), None);
    }
}
