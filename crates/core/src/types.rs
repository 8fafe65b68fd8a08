//! Domain types for representing a rehabilitation protocol.
//!
//! Field names serialize in camelCase and kind tags in SCREAMING_SNAKE_CASE so
//! exported projects stay interchangeable with the browser editor's files.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Title given to freshly inserted transition slides.
pub const TRANSITION_PLACEHOLDER_TITLE: &str = "Transition";

/// Title given to freshly inserted content slides.
pub const NEW_SLIDE_TITLE: &str = "New Section";

/// The full protocol being edited: metadata, slides and the exercise library.
///
/// Slides sit behind `Arc` so that cloning a document for a new history
/// snapshot only copies pointers; a mutator clones the one slide it touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolDocument {
    #[serde(default)]
    pub doctor_name: String,

    pub protocol_title: String,

    #[serde(default)]
    pub logo_url: String,

    /// Slides in presentation order.
    pub slides: Vec<Arc<Slide>>,

    /// Reusable exercises, copied by value into slide items.
    #[serde(default)]
    pub exercise_library: Vec<LibraryItem>,
}

impl ProtocolDocument {
    /// Create an empty document with the given metadata.
    pub fn new(
        doctor_name: impl Into<String>,
        protocol_title: impl Into<String>,
        logo_url: impl Into<String>,
    ) -> Self {
        Self {
            doctor_name: doctor_name.into(),
            protocol_title: protocol_title.into(),
            logo_url: logo_url.into(),
            slides: Vec::new(),
            exercise_library: Vec::new(),
        }
    }

    /// The document a new editing session opens with.
    pub fn starter() -> Self {
        let mut doc = Self::new(
            "Dott. Daniele Tradati",
            "PROTESI TOTALE DI GINOCCHIO",
            "https://i.ibb.co/Z665Fc6b/logo-bianco-1.png",
        );

        doc.exercise_library = vec![
            LibraryItem {
                id: "ex1".to_string(),
                name: "Flesso-estensione caviglia".to_string(),
                img: "https://i.ibb.co/Jjz65fH2/FLEX-EXT-CAVIGLIA-FLESSO-ESTENSIONE-TIBIOTARSICA-CAVIGLIA.png"
                    .to_string(),
                description: Some(
                    "Muovere la caviglia su e giù lentamente per favorire la circolazione."
                        .to_string(),
                ),
            },
            LibraryItem {
                id: "ex2".to_string(),
                name: "Isometria quadricipite".to_string(),
                img: "https://i.ibb.co/hF2wmFmC/Isometria-del-quadricipite.png".to_string(),
                description: Some(
                    "Premere il ginocchio contro il letto contraendo la coscia. Tenere 5 secondi."
                        .to_string(),
                ),
            },
        ];

        let mut cover = Slide::new("1", SlideKind::Transition);
        cover.image_url = Some("https://i.ibb.co/6R8yPYsF/titolo.png".to_string());

        let mut pre_op = Slide::new("2", SlideKind::Phase);
        pre_op.title = Some("Pre-intervento".to_string());
        pre_op.sections = vec![
            Section::with_items(
                "sec1",
                SectionKind::Objectives,
                "Obiettivi",
                vec![SectionItem::new("Preparare il quadricipite alla chirurgia")],
            ),
            Section::with_items(
                "sec2",
                SectionKind::Info,
                "Informazioni utili",
                vec![SectionItem::new("Sarete contattati dalle segretarie...")],
            ),
        ];

        doc.slides = vec![Arc::new(cover), Arc::new(pre_op)];
        doc
    }

    /// Find a slide by id.
    pub fn slide(&self, id: &str) -> Option<&Slide> {
        self.slides.iter().map(Arc::as_ref).find(|s| s.id == id)
    }

    /// Position of a slide in presentation order.
    pub fn slide_index(&self, id: &str) -> Option<usize> {
        self.slides.iter().position(|s| s.id == id)
    }

    /// Find a section within a slide.
    pub fn section(&self, slide_id: &str, section_id: &str) -> Option<&Section> {
        self.slide(slide_id)?
            .sections
            .iter()
            .find(|s| s.id == section_id)
    }

    /// Find a library item by id.
    pub fn library_item(&self, id: &str) -> Option<&LibraryItem> {
        self.exercise_library.iter().find(|item| item.id == id)
    }

    /// Whether any slide, section or library item already uses this id.
    pub fn contains_id(&self, id: &str) -> bool {
        self.slides
            .iter()
            .any(|s| s.id == id || s.sections.iter().any(|sec| sec.id == id))
            || self.exercise_library.iter().any(|item| item.id == id)
    }

    /// Check the structural invariants a document must hold.
    ///
    /// Slide ids are non-empty and unique, section ids are unique across the
    /// document and transition slides carry no sections.
    pub fn validate(&self) -> Result<()> {
        let mut slide_ids = HashSet::new();
        let mut section_ids = HashSet::new();

        for slide in &self.slides {
            if slide.id.trim().is_empty() {
                return Err(Error::InvalidDocument("slide without an id".to_string()));
            }
            if !slide_ids.insert(slide.id.as_str()) {
                return Err(Error::InvalidDocument(format!(
                    "duplicate slide id '{}'",
                    slide.id
                )));
            }
            if slide.kind == SlideKind::Transition && !slide.sections.is_empty() {
                return Err(Error::InvalidDocument(format!(
                    "transition slide '{}' has sections",
                    slide.id
                )));
            }
            for section in &slide.sections {
                if !section_ids.insert(section.id.as_str()) {
                    return Err(Error::InvalidDocument(format!(
                        "duplicate section id '{}'",
                        section.id
                    )));
                }
            }
        }

        Ok(())
    }
}

/// One unit of presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    /// Stable id, assigned at creation and never reused.
    pub id: String,

    #[serde(rename = "type")]
    pub kind: SlideKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Cover image, used by transition slides only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Always empty for transition slides.
    #[serde(default)]
    pub sections: Vec<Section>,

    /// Custom width in px.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_width: Option<u32>,

    /// Custom minimum height in px.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_height: Option<u32>,

    /// Custom background colour (CSS colour, usually hex).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

impl Slide {
    /// Create a bare slide with no title, image or sections.
    pub fn new(id: impl Into<String>, kind: SlideKind) -> Self {
        Self {
            id: id.into(),
            kind,
            title: None,
            image_url: None,
            sections: Vec::new(),
            custom_width: None,
            custom_height: None,
            background_color: None,
        }
    }

    /// Create a slide the way the editor inserts one.
    ///
    /// Transition slides get the placeholder title and an empty image URL.
    /// Content slides get a generic title and a single empty objectives
    /// section identified by `section_id`.
    pub fn with_defaults(
        id: impl Into<String>,
        kind: SlideKind,
        section_id: impl Into<String>,
    ) -> Self {
        let mut slide = Self::new(id, kind);
        match kind {
            SlideKind::Transition => {
                slide.title = Some(TRANSITION_PLACEHOLDER_TITLE.to_string());
                slide.image_url = Some(String::new());
            }
            SlideKind::Phase | SlideKind::Warning | SlideKind::Final => {
                slide.title = Some(NEW_SLIDE_TITLE.to_string());
                slide.sections = vec![Section::new(section_id, SectionKind::Objectives)];
            }
        }
        slide
    }

    /// Title text, treating an empty title as absent.
    pub fn title_text(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }
}

/// The kind of a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlideKind {
    /// Full-bleed cover image.
    Transition,
    /// A treatment phase.
    Phase,
    /// Alarm signs the patient must watch for.
    Warning,
    /// Closing screen.
    Final,
}

impl SlideKind {
    pub const ALL: [SlideKind; 4] = [
        SlideKind::Transition,
        SlideKind::Phase,
        SlideKind::Warning,
        SlideKind::Final,
    ];

    /// Tag used in exported files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transition => "TRANSITION",
            Self::Phase => "PHASE",
            Self::Warning => "WARNING",
            Self::Final => "FINAL",
        }
    }

    /// Parse a tag, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

/// A typed block within a slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: SectionKind,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub items: Vec<SectionItem>,
}

impl Section {
    /// Create an empty section carrying the default title for its kind.
    pub fn new(id: impl Into<String>, kind: SectionKind) -> Self {
        Self::with_items(id, kind, kind.default_title(), Vec::new())
    }

    /// Create a section with a title and items.
    pub fn with_items(
        id: impl Into<String>,
        kind: SectionKind,
        title: impl Into<String>,
        items: Vec<SectionItem>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            items,
        }
    }
}

/// The kind of a section, which decides how its items are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectionKind {
    Objectives,
    Exercises,
    Info,
    Precautions,
    GenericList,
    Warning,
    /// Items hold video URLs.
    Video,
    /// Requirements for moving to the next phase.
    Criteria,
}

impl SectionKind {
    pub const ALL: [SectionKind; 8] = [
        SectionKind::Objectives,
        SectionKind::Exercises,
        SectionKind::Info,
        SectionKind::Precautions,
        SectionKind::GenericList,
        SectionKind::Warning,
        SectionKind::Video,
        SectionKind::Criteria,
    ];

    /// Title given to a section when the editor inserts it.
    pub fn default_title(self) -> &'static str {
        match self {
            Self::Objectives => "Obiettivi",
            Self::Exercises => "Esercizi Consigliati",
            Self::Criteria => "Criteri di passaggio",
            Self::Video => "Video Tutorial",
            Self::Info | Self::Precautions | Self::GenericList | Self::Warning => "Informazioni",
        }
    }

    /// Tag used in exported files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Objectives => "OBJECTIVES",
            Self::Exercises => "EXERCISES",
            Self::Info => "INFO",
            Self::Precautions => "PRECAUTIONS",
            Self::GenericList => "GENERIC_LIST",
            Self::Warning => "WARNING",
            Self::Video => "VIDEO",
            Self::Criteria => "CRITERIA",
        }
    }

    /// Lowercase tag, used as a CSS class.
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Objectives => "objectives",
            Self::Exercises => "exercises",
            Self::Info => "info",
            Self::Precautions => "precautions",
            Self::GenericList => "generic_list",
            Self::Warning => "warning",
            Self::Video => "video",
            Self::Criteria => "criteria",
        }
    }

    /// Parse a tag, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

/// One entry within a section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionItem {
    /// Exercise name, free text, or a video URL depending on the section kind.
    #[serde(default)]
    pub text: String,

    /// Image URL or inline data URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,

    /// Free text; kept verbatim when it comes from enrichment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SectionItem {
    /// Create an item with text only.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            img: None,
            description: None,
        }
    }

    /// Copy a library exercise into a new item.
    pub fn from_library(item: &LibraryItem) -> Self {
        Self {
            text: item.name.clone(),
            img: Some(item.img.clone()),
            description: item.description.clone(),
        }
    }

    /// Image URL, treating an empty string as absent.
    pub fn image(&self) -> Option<&str> {
        self.img.as_deref().filter(|s| !s.is_empty())
    }

    /// Description, treating an empty string as absent.
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref().filter(|s| !s.is_empty())
    }
}

/// A reusable exercise in the library, keyed by its normalized name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryItem {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub img: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Which rendering the markup compiler produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompileMode {
    /// Interactive slideshow.
    Presentation,
    /// Printable layout that opens the print dialog once loaded.
    Print,
}

impl CompileMode {
    /// Parse a mode name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "presentation" | "slideshow" => Some(Self::Presentation),
            "print" => Some(Self::Print),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_is_valid() {
        let doc = ProtocolDocument::starter();
        assert!(doc.validate().is_ok());
        assert_eq!(doc.slides.len(), 2);
        assert_eq!(doc.exercise_library.len(), 2);
        assert_eq!(doc.slides[0].kind, SlideKind::Transition);
    }

    #[test]
    fn test_with_defaults_transition() {
        let slide = Slide::with_defaults("s1", SlideKind::Transition, "unused");
        assert_eq!(slide.title.as_deref(), Some("Transition"));
        assert_eq!(slide.image_url.as_deref(), Some(""));
        assert!(slide.sections.is_empty());
    }

    #[test]
    fn test_with_defaults_content_slide() {
        let slide = Slide::with_defaults("s1", SlideKind::Warning, "sec-1");
        assert_eq!(slide.title.as_deref(), Some("New Section"));
        assert_eq!(slide.sections.len(), 1);
        assert_eq!(slide.sections[0].id, "sec-1");
        assert_eq!(slide.sections[0].kind, SectionKind::Objectives);
        assert_eq!(slide.sections[0].title, "Obiettivi");
        assert!(slide.sections[0].items.is_empty());
    }

    #[test]
    fn test_default_section_titles() {
        assert_eq!(SectionKind::Objectives.default_title(), "Obiettivi");
        assert_eq!(SectionKind::Exercises.default_title(), "Esercizi Consigliati");
        assert_eq!(SectionKind::Criteria.default_title(), "Criteri di passaggio");
        assert_eq!(SectionKind::Video.default_title(), "Video Tutorial");
        assert_eq!(SectionKind::Precautions.default_title(), "Informazioni");
        assert_eq!(SectionKind::GenericList.default_title(), "Informazioni");
    }

    #[test]
    fn test_kind_tags_roundtrip_names() {
        for kind in SectionKind::ALL {
            assert_eq!(SectionKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(SlideKind::from_name("phase"), Some(SlideKind::Phase));
        assert_eq!(SlideKind::from_name("cover"), None);
    }

    #[test]
    fn test_validate_rejects_duplicate_slide_ids() {
        let mut doc = ProtocolDocument::new("Dr", "Title", "");
        doc.slides = vec![
            Arc::new(Slide::new("a", SlideKind::Phase)),
            Arc::new(Slide::new("a", SlideKind::Final)),
        ];
        assert!(matches!(doc.validate(), Err(Error::InvalidDocument(_))));
    }

    #[test]
    fn test_validate_rejects_transition_with_sections() {
        let mut cover = Slide::new("a", SlideKind::Transition);
        cover.sections.push(Section::new("x", SectionKind::Info));
        let mut doc = ProtocolDocument::new("Dr", "Title", "");
        doc.slides = vec![Arc::new(cover)];
        assert!(doc.validate().is_err());
    }

    #[test]
    fn test_contains_id_covers_all_entities() {
        let doc = ProtocolDocument::starter();
        assert!(doc.contains_id("1"));
        assert!(doc.contains_id("sec2"));
        assert!(doc.contains_id("ex1"));
        assert!(!doc.contains_id("nope"));
    }

    #[test]
    fn test_compile_mode_from_name() {
        assert_eq!(CompileMode::from_name("Print"), Some(CompileMode::Print));
        assert_eq!(
            CompileMode::from_name("presentation"),
            Some(CompileMode::Presentation)
        );
        assert_eq!(CompileMode::from_name("pdf"), None);
    }
}
