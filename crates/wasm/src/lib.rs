//! WASM-compatible wrapper for the protocol editor.
//!
//! This crate exposes the editing session and the markup compiler to the
//! browser host. Enrichment calls are made by the host; their results come
//! back through the `apply*` methods and are committed like any other edit.

use mediproto_core::debounce::DEFAULT_DEBOUNCE_MS;
use mediproto_core::{
    CompileMode, Debouncer, Direction, DuplicateGroup, EditorSession, ItemPatch, LibraryDraft,
    MetadataField, Outcome, PartialLibraryItem, ProtocolDocument, SectionKind, SectionPatch,
    SlideKind, SlidePatch,
};
use mediproto_html::CompileOptions;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Undo/redo availability, for toolbar state.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStatus {
    pub can_undo: bool,
    pub can_redo: bool,
    pub undo_levels: usize,
    pub redo_levels: usize,
}

/// An editing session bound to the browser.
#[wasm_bindgen]
pub struct Editor {
    session: EditorSession,
    preview: Debouncer,
}

#[wasm_bindgen]
impl Editor {
    /// Open the starter protocol. `seed` keeps ids distinct across sessions.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: &str) -> Editor {
        Self::from_session(EditorSession::starter(seed))
    }

    /// Open a previously exported project.
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str, seed: &str) -> Result<Editor, JsValue> {
        let doc = mediproto_core::persist::import_project(json).map_err(js_error)?;
        Ok(Self::from_session(EditorSession::new(doc, seed)))
    }

    /// The present document as a JS object.
    pub fn document(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.session.document())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    #[wasm_bindgen(js_name = historyStatus)]
    pub fn history_status(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.status())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    pub fn undo(&mut self) -> bool {
        let moved = self.session.undo();
        self.touch_if(moved)
    }

    pub fn redo(&mut self) -> bool {
        let moved = self.session.redo();
        self.touch_if(moved)
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.session.can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.session.can_redo()
    }

    /// Set `doctorName`, `protocolTitle` or `logoUrl`.
    #[wasm_bindgen(js_name = setMetadata)]
    pub fn set_metadata(&mut self, field: &str, value: &str) -> Result<bool, JsValue> {
        let field = parse_field(field).map_err(js_error)?;
        let outcome = self.session.set_metadata(field, value);
        Ok(self.record(outcome))
    }

    /// Append a slide of the given type; returns its id.
    #[wasm_bindgen(js_name = addSlide)]
    pub fn add_slide(&mut self, kind: &str) -> Result<String, JsValue> {
        let kind = parse_slide_kind(kind).map_err(js_error)?;
        let id = self.session.add_slide(kind);
        self.touch_if(true);
        Ok(id)
    }

    #[wasm_bindgen(js_name = removeSlide)]
    pub fn remove_slide(&mut self, slide_id: &str) -> bool {
        let outcome = self.session.remove_slide(slide_id);
        self.record(outcome)
    }

    #[wasm_bindgen(js_name = moveSlide)]
    pub fn move_slide(&mut self, slide_id: &str, direction: &str) -> Result<bool, JsValue> {
        let direction = parse_direction(direction).map_err(js_error)?;
        let outcome = self.session.move_slide(slide_id, direction);
        Ok(self.record(outcome))
    }

    /// Apply `{title?, imageUrl?, backgroundColor?, customWidth?, customHeight?}`.
    #[wasm_bindgen(js_name = patchSlide)]
    pub fn patch_slide(&mut self, slide_id: &str, patch: JsValue) -> Result<bool, JsValue> {
        let patch: SlidePatch = from_js(patch, "slide patch")?;
        let outcome = self.session.patch_slide(slide_id, &patch);
        Ok(self.record(outcome))
    }

    /// Append a section; returns its id, or `undefined` for transition slides.
    #[wasm_bindgen(js_name = addSection)]
    pub fn add_section(&mut self, slide_id: &str, kind: &str) -> Result<Option<String>, JsValue> {
        let kind = parse_section_kind(kind).map_err(js_error)?;
        let id = self.session.add_section(slide_id, kind);
        self.touch_if(id.is_some());
        Ok(id)
    }

    #[wasm_bindgen(js_name = removeSection)]
    pub fn remove_section(&mut self, slide_id: &str, section_id: &str) -> bool {
        let outcome = self.session.remove_section(slide_id, section_id);
        self.record(outcome)
    }

    #[wasm_bindgen(js_name = moveSection)]
    pub fn move_section(
        &mut self,
        slide_id: &str,
        section_id: &str,
        direction: &str,
    ) -> Result<bool, JsValue> {
        let direction = parse_direction(direction).map_err(js_error)?;
        let outcome = self.session.move_section(slide_id, section_id, direction);
        Ok(self.record(outcome))
    }

    #[wasm_bindgen(js_name = setSectionTitle)]
    pub fn set_section_title(&mut self, slide_id: &str, section_id: &str, title: &str) -> bool {
        let patch = SectionPatch {
            title: Some(title.to_string()),
        };
        let outcome = self.session.patch_section(slide_id, section_id, &patch);
        self.record(outcome)
    }

    #[wasm_bindgen(js_name = addItem)]
    pub fn add_item(&mut self, slide_id: &str, section_id: &str) -> bool {
        let outcome = self.session.add_item(slide_id, section_id);
        self.record(outcome)
    }

    #[wasm_bindgen(js_name = addItemFromLibrary)]
    pub fn add_item_from_library(
        &mut self,
        slide_id: &str,
        section_id: &str,
        library_id: &str,
    ) -> bool {
        let outcome = self.session.add_item_from_library(slide_id, section_id, library_id);
        self.record(outcome)
    }

    #[wasm_bindgen(js_name = removeItem)]
    pub fn remove_item(&mut self, slide_id: &str, section_id: &str, index: usize) -> bool {
        let outcome = self.session.remove_item(slide_id, section_id, index);
        self.record(outcome)
    }

    /// Apply `{text?, img?, description?}` to an item.
    #[wasm_bindgen(js_name = patchItem)]
    pub fn patch_item(
        &mut self,
        slide_id: &str,
        section_id: &str,
        index: usize,
        patch: JsValue,
    ) -> Result<bool, JsValue> {
        let patch: ItemPatch = from_js(patch, "item patch")?;
        let outcome = self.session.patch_item(slide_id, section_id, index, &patch);
        Ok(self.record(outcome))
    }

    /// Save `{name, img, description?}` to the library; returns the new id.
    #[wasm_bindgen(js_name = addLibraryItem)]
    pub fn add_library_item(&mut self, draft: JsValue) -> Result<String, JsValue> {
        let draft: LibraryDraft = from_js(draft, "library item")?;
        let id = self.session.add_library_item(draft).map_err(js_error)?;
        self.touch_if(true);
        Ok(id)
    }

    /// Save an existing slide item to the library; returns the new id.
    #[wasm_bindgen(js_name = saveItemToLibrary)]
    pub fn save_item_to_library(
        &mut self,
        slide_id: &str,
        section_id: &str,
        index: usize,
    ) -> Result<String, JsValue> {
        let id = self.session.save_item_to_library(slide_id, section_id, index).map_err(js_error)?;
        self.touch_if(true);
        Ok(id)
    }

    #[wasm_bindgen(js_name = updateLibraryItem)]
    pub fn update_library_item(&mut self, id: &str, draft: JsValue) -> Result<bool, JsValue> {
        let draft: LibraryDraft = from_js(draft, "library item")?;
        let outcome = self.session.update_library_item(id, draft).map_err(js_error)?;
        Ok(self.record(outcome))
    }

    #[wasm_bindgen(js_name = removeLibraryItem)]
    pub fn remove_library_item(&mut self, id: &str) -> bool {
        let outcome = self.session.remove_library_item(id);
        self.record(outcome)
    }

    #[wasm_bindgen(js_name = exportProject)]
    pub fn export_project(&self) -> Result<String, JsValue> {
        self.session.export_project().map_err(js_error)
    }

    /// Replace the document with an exported project. Throws on a bad file.
    #[wasm_bindgen(js_name = importProject)]
    pub fn import_project(&mut self, json: &str) -> Result<bool, JsValue> {
        let outcome = self.session.import_project(json).map_err(js_error)?;
        Ok(self.record(outcome))
    }

    #[wasm_bindgen(js_name = exportLibrary)]
    pub fn export_library(&self) -> Result<String, JsValue> {
        self.session.export_library().map_err(js_error)
    }

    #[wasm_bindgen(js_name = importLibrary)]
    pub fn import_library(&mut self, json: &str) -> Result<bool, JsValue> {
        let outcome = self.session.import_library(json).map_err(js_error)?;
        Ok(self.record(outcome))
    }

    /// Compile the present document (`"presentation"` or `"print"`).
    pub fn compile(&self, mode: &str, year: i32) -> Result<String, JsValue> {
        let mode = parse_mode(mode).map_err(js_error)?;
        Ok(mediproto_html::compile(
            self.session.document(),
            mode,
            &CompileOptions::new(year),
        ))
    }

    /// Compiled preview if the document settled since the last change.
    ///
    /// Call from a timer; returns `undefined` while edits keep arriving.
    #[wasm_bindgen(js_name = pollPreview)]
    pub fn poll_preview(&mut self, mode: &str, year: i32) -> Result<Option<String>, JsValue> {
        if !self.preview.poll(now_ms()) {
            return Ok(None);
        }
        self.compile(mode, year).map(Some)
    }

    /// Commit a protocol parsed from free text by the host's gateway.
    #[wasm_bindgen(js_name = applyParsedProtocol)]
    pub fn apply_parsed_protocol(&mut self, parsed: JsValue) -> Result<bool, JsValue> {
        let parsed: ProtocolDocument = from_js(parsed, "parsed protocol")?;
        let outcome = self.session.apply_parsed_protocol(parsed);
        Ok(self.record(outcome))
    }

    /// Commit exercises the host's gateway extracted from markup.
    #[wasm_bindgen(js_name = applyExtractedItems)]
    pub fn apply_extracted_items(&mut self, items: JsValue) -> Result<bool, JsValue> {
        let items: Vec<PartialLibraryItem> = from_js(items, "extracted items")?;
        let outcome = self.session.apply_extracted_items(&items);
        Ok(self.record(outcome))
    }

    /// Replace `{ids, suggestedMerge}` with the merged item.
    #[wasm_bindgen(js_name = mergeDuplicates)]
    pub fn merge_duplicates(&mut self, group: JsValue) -> Result<bool, JsValue> {
        let group: DuplicateGroup = from_js(group, "duplicate group")?;
        let outcome = self.session.merge_duplicates(&group);
        Ok(self.record(outcome))
    }

    /// Commit a generated description for an item.
    #[wasm_bindgen(js_name = applyItemDescription)]
    pub fn apply_item_description(
        &mut self,
        slide_id: &str,
        section_id: &str,
        index: usize,
        description: String,
    ) -> bool {
        let patch = ItemPatch {
            description: Some(description),
            ..Default::default()
        };
        let outcome = self.session.patch_item(slide_id, section_id, index, &patch);
        self.record(outcome)
    }

    /// Commit a generated image (data URL) for an item.
    #[wasm_bindgen(js_name = applyItemImage)]
    pub fn apply_item_image(
        &mut self,
        slide_id: &str,
        section_id: &str,
        index: usize,
        img: String,
    ) -> bool {
        let patch = ItemPatch {
            img: Some(img),
            ..Default::default()
        };
        let outcome = self.session.patch_item(slide_id, section_id, index, &patch);
        self.record(outcome)
    }
}

impl Editor {
    fn from_session(session: EditorSession) -> Self {
        let mut preview = Debouncer::new(DEFAULT_DEBOUNCE_MS);
        preview.touch(now_ms());
        Self { session, preview }
    }

    fn status(&self) -> HistoryStatus {
        let history = self.session.history();
        HistoryStatus {
            can_undo: history.can_undo(),
            can_redo: history.can_redo(),
            undo_levels: history.undo_levels(),
            redo_levels: history.redo_levels(),
        }
    }

    fn record(&mut self, outcome: Outcome) -> bool {
        self.touch_if(outcome == Outcome::Applied)
    }

    /// Schedule a preview when the document changed.
    fn touch_if(&mut self, changed: bool) -> bool {
        if changed {
            self.preview.touch(now_ms());
        }
        changed
    }
}

/// Compile a project file without opening an editor.
#[wasm_bindgen]
pub fn compile_project(json: &str, mode: &str, year: i32) -> Result<String, JsValue> {
    compile_project_impl(json, mode, year).map_err(|e| JsValue::from_str(&e))
}

fn compile_project_impl(json: &str, mode: &str, year: i32) -> Result<String, String> {
    let mode = parse_mode(mode)?;
    let doc = mediproto_core::persist::import_project(json).map_err(|e| e.to_string())?;
    Ok(mediproto_html::compile(&doc, mode, &CompileOptions::new(year)))
}

/// Video identifier of a URL, for live validation in the editor.
#[wasm_bindgen]
pub fn extract_video_id(url: &str) -> Option<String> {
    mediproto_core::video::extract_video_id(url).map(str::to_string)
}

fn js_error(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue, what: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", what, e)))
}

fn parse_slide_kind(name: &str) -> Result<SlideKind, String> {
    SlideKind::from_name(name).ok_or_else(|| format!("Unknown slide type: {}", name))
}

fn parse_section_kind(name: &str) -> Result<SectionKind, String> {
    SectionKind::from_name(name).ok_or_else(|| format!("Unknown section type: {}", name))
}

fn parse_field(name: &str) -> Result<MetadataField, String> {
    MetadataField::from_name(name).ok_or_else(|| format!("Unknown field: {}", name))
}

fn parse_mode(name: &str) -> Result<CompileMode, String> {
    CompileMode::from_name(name).ok_or_else(|| format!("Unknown compile mode: {}", name))
}

fn parse_direction(name: &str) -> Result<Direction, String> {
    match name.trim().to_lowercase().as_str() {
        "up" => Ok(Direction::Up),
        "down" => Ok(Direction::Down),
        _ => Err(format!("Unknown direction: {}", name)),
    }
}

#[cfg(target_arch = "wasm32")]
fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
