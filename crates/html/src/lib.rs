//! Markup compiler for protocol documents.
//!
//! Turns a [`ProtocolDocument`] into a standalone HTML page, either as an
//! interactive slideshow or as a printable layout. Compilation is total over
//! valid documents and deterministic: the only value not taken from the
//! document is the year, which the caller supplies through [`CompileOptions`].

pub mod markup;
pub mod presentation;
pub mod print;

use mediproto_core::{CompileMode, ProtocolDocument, Slide, SlideKind};

pub use presentation::compile_presentation;
pub use print::compile_print;

/// Image shown by transition slides that have none.
pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "https://picsum.photos/800/600";

const DEFAULT_NAVIGATION_CSS: &str = "https://cdn.jsdelivr.net/npm/swiper@9/swiper-bundle.min.css";
const DEFAULT_NAVIGATION_JS: &str = "https://cdn.jsdelivr.net/npm/swiper@9/swiper-bundle.min.js";
const DEFAULT_FONT_CSS: &str =
    "https://fonts.googleapis.com/css2?family=Poppins:wght@400;600&display=swap";

/// Options shared by both render targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Year printed in the footer.
    pub year: i32,
    pub placeholder_image: String,
    /// Stylesheet of the slide navigation library.
    pub navigation_css: String,
    /// Script of the slide navigation library.
    pub navigation_js: String,
    pub font_css: String,
}

impl CompileOptions {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_string(),
            navigation_css: DEFAULT_NAVIGATION_CSS.to_string(),
            navigation_js: DEFAULT_NAVIGATION_JS.to_string(),
            font_css: DEFAULT_FONT_CSS.to_string(),
        }
    }

    pub fn with_placeholder_image(mut self, url: impl Into<String>) -> Self {
        self.placeholder_image = url.into();
        self
    }

    /// Load the navigation library from other URLs (a local copy, say).
    pub fn with_navigation_assets(mut self, css: impl Into<String>, js: impl Into<String>) -> Self {
        self.navigation_css = css.into();
        self.navigation_js = js.into();
        self
    }

    pub fn with_font_css(mut self, url: impl Into<String>) -> Self {
        self.font_css = url.into();
        self
    }
}

/// Compile a document in the given mode.
pub fn compile(doc: &ProtocolDocument, mode: CompileMode, options: &CompileOptions) -> String {
    log::debug!(
        "Compiling '{}' ({} slides) as {:?}",
        doc.protocol_title,
        doc.slides.len(),
        mode
    );
    match mode {
        CompileMode::Presentation => compile_presentation(doc, options),
        CompileMode::Print => compile_print(doc, options),
    }
}

/// Heading of a content slide, falling back to a generic one per kind.
pub(crate) fn slide_heading(slide: &Slide) -> &str {
    slide.title_text().unwrap_or(match slide.kind {
        SlideKind::Warning => "Segnali di allarme",
        SlideKind::Transition | SlideKind::Phase | SlideKind::Final => "Titolo",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = CompileOptions::new(2025)
            .with_placeholder_image("local.png")
            .with_navigation_assets("nav.css", "nav.js");
        assert_eq!(options.year, 2025);
        assert_eq!(options.placeholder_image, "local.png");
        assert_eq!(options.navigation_js, "nav.js");
        assert_eq!(options.font_css, DEFAULT_FONT_CSS);
    }

    #[test]
    fn test_compile_dispatches_on_mode() {
        let doc = ProtocolDocument::starter();
        let options = CompileOptions::new(2025);
        let slideshow = compile(&doc, CompileMode::Presentation, &options);
        let printable = compile(&doc, CompileMode::Print, &options);
        assert!(slideshow.contains("swiper-wrapper"));
        assert!(printable.contains("window.print()"));
    }

    #[test]
    fn test_slide_heading_fallbacks() {
        let mut slide = Slide::new("w", SlideKind::Warning);
        assert_eq!(slide_heading(&slide), "Segnali di allarme");
        slide.kind = SlideKind::Final;
        slide.title = Some(String::new());
        assert_eq!(slide_heading(&slide), "Titolo");
        slide.title = Some("Fine".to_string());
        assert_eq!(slide_heading(&slide), "Fine");
    }
}
