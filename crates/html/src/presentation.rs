//! Slideshow target.
//!
//! One swiper slide per document slide, a header and footer around them, and
//! an exercise gallery below the slideshow that follows the active slide.

use mediproto_core::video::{embed_url, extract_video_id};
use mediproto_core::{ProtocolDocument, Section, SectionItem, SectionKind, Slide, SlideKind};

use crate::markup::{self, Markup};
use crate::{slide_heading, CompileOptions};

const DEFAULT_SLIDE_WIDTH: u32 = 700;
const DEFAULT_SLIDE_HEIGHT: u32 = 510;
const DEFAULT_BACKGROUND: &str = "#ffffff";

const TRANSITION_ALT: &str = "Transizione";
const WARNING_ADVICE: &str = "Contattare tempestivamente il medico in caso di questi sintomi.";

const STYLES: &str = r#"
:root {
  --primary-color: #166bbf;
  --accent-color: #2596e5;
  --secondary-color: #406185;
  --success-color: #2e7d32;
  --alert-color: #dc3545;
}
* { box-sizing: border-box; margin: 0; padding: 0; font-family: 'Poppins', sans-serif; }
body { background: #f8f9fa; line-height: 1.6; color: #333; }
img { max-width: 100%; user-select: none; }
.protocol-header { background: linear-gradient(25deg, var(--primary-color), var(--accent-color)); color: white; padding: 1.65rem; text-align: center; position: relative; min-height: 110px; }
.protocol-header h1 { font-size: 1.8rem; margin-bottom: 0.3rem; text-transform: uppercase; }
.protocol-header p { font-size: 1.1rem; opacity: 0.95; }
.header-logo { width: 156px; position: absolute; top: 0.2rem; right: 0.5rem; }
.mySwiper { max-width: 1200px; margin: 2rem auto; padding: 0 1rem; position: relative; }
.swiper-slide { display: flex; justify-content: center; align-items: flex-start; }
.transition-card { width: 100%; margin: 1rem auto; border-radius: 12px; }
.transition-card img { width: 100%; height: 100%; object-fit: cover; }
.phase-card { background: white; border-radius: 12px; box-shadow: 0 4px 15px rgba(0,0,0,0.1); padding: 2rem 2.5rem; margin: 1rem auto; width: 100%; overflow-wrap: break-word; }
.phase-title { color: var(--primary-color); border-bottom: 3px solid var(--accent-color); padding-bottom: 0.5rem; margin-bottom: 1.5rem; font-size: 1.4rem; }
ul { margin: 0.5rem 0 1.25rem 2.25rem; list-style-position: outside; }
li { margin-bottom: 0.6rem; padding-left: 0.5rem; }
.objectives-box, .info-box, .attention-box, .checklist-box, .criteria-box { padding: 1.25rem 1.5rem; margin: 1.5rem 0; border-radius: 6px; }
.box-title { margin-bottom: 0.75rem; font-size: 1.2rem; font-weight: 600; }
.objectives-box { background: #e8f5e9; border-left: 5px solid var(--success-color); }
.objectives-box .box-title { color: var(--success-color); }
.info-box { background: #e2f0fb; border-left: 5px solid var(--accent-color); }
.info-box .box-title { color: var(--secondary-color); }
.precautions-box { background: #fff5f5; border-left-color: var(--alert-color); }
.precautions-box .box-title { color: var(--alert-color); }
.attention-box { background: #f8d7da; border-left: 5px solid var(--alert-color); color: #721c24; }
.attention-box .box-title { color: #d00; }
.attention-advice { font-weight: 600; margin-top: 1.1em; }
.criteria-box { background: #fffcf0; border: 1px dashed #ffd54f; }
.criteria-box .box-title { color: #f57f17; }
.criteria-list { list-style: none; margin: 0; }
.criteria-list li { position: relative; padding-left: 32px; font-weight: 600; color: #5d4037; }
.criteria-list li::before { content: ''; position: absolute; left: 0; top: 4px; width: 18px; height: 18px; border: 2px solid #ffd54f; border-radius: 4px; background: white; }
.checklist-box { background: white; border: 1px solid #eee; }
.checklist-list { list-style-type: square; }
.exercises-title { font-weight: 600; color: var(--primary-color); margin: 2rem 0 0.75rem; font-size: 1.2rem; }
.standard-list { list-style-type: disc; }
.video-section { margin: 1.5rem 0; }
.video-title { color: var(--primary-color); margin-bottom: 0.75rem; }
.video-container { position: relative; padding-bottom: 56.25%; height: 0; overflow: hidden; border-radius: 8px; }
.video-container iframe { position: absolute; top: 0; left: 0; width: 100%; height: 100%; }
.video-caption { font-size: 0.9rem; color: var(--secondary-color); margin-top: 0.5rem; }
.exercise-gallery { max-width: 1200px; margin: 2rem auto; padding: 1rem; background: white; border-radius: 12px; box-shadow: 0 4px 15px rgba(0,0,0,0.1); }
.gallery-item { display: flex; gap: 1rem; align-items: flex-start; margin-bottom: 1rem; }
.gallery-item img { width: 160px; border-radius: 6px; }
footer { text-align: center; padding: 3rem; color: var(--secondary-color); font-size: 0.9rem; }
@media (max-width: 768px) {
  .header-logo { position: relative; top: auto; right: auto; margin: 0 auto 0.5rem; display: block; width: 120px; }
  .protocol-header h1 { font-size: 1.2rem; }
  .phase-card { padding: 1.5rem; }
  .gallery-item { flex-direction: column; }
}
"#;

const SCRIPT: &str = r#"
const swiper = new Swiper('.mySwiper', {
  slidesPerView: 1,
  spaceBetween: 30,
  autoHeight: true,
  navigation: { nextEl: '.swiper-button-next', prevEl: '.swiper-button-prev' },
  speed: 600,
});
function showGallery(index) {
  document.querySelectorAll('.exercise-gallery').forEach(function (gallery) {
    gallery.hidden = gallery.dataset.slide !== String(index);
  });
}
swiper.on('slideChange', function () { showGallery(swiper.activeIndex); });
showGallery(swiper.activeIndex);
"#;

/// Compile the interactive slideshow.
pub fn compile_presentation(doc: &ProtocolDocument, options: &CompileOptions) -> String {
    let mut out = Markup::new();
    out.line("<!DOCTYPE html>");
    out.line("<html lang=\"it\">");

    compile_head(doc, options, &mut out);

    out.line("<body>");
    out.indent();

    compile_header(doc, &mut out);

    out.nest("<div class=\"mySwiper\">", "</div>", |out| {
        out.nest("<div class=\"swiper-wrapper\">", "</div>", |out| {
            for slide in &doc.slides {
                compile_slide(slide, options, out);
            }
        });
        out.line("<div class=\"swiper-button-prev\"></div>");
        out.line("<div class=\"swiper-button-next\"></div>");
    });

    for (index, slide) in doc.slides.iter().enumerate() {
        compile_gallery(index, slide, &mut out);
    }

    out.nest("<footer>", "</footer>", |out| {
        out.line(&format!(
            "<p>&copy; {} <strong>{}</strong>. Tutti i diritti riservati.</p>",
            options.year,
            markup::text(&doc.doctor_name)
        ));
    });

    out.line(&format!(
        "<script src=\"{}\"></script>",
        markup::text(&options.navigation_js)
    ));
    out.nest("<script>", "</script>", |out| out.block(SCRIPT));

    out.dedent();
    out.line("</body>");
    out.line("</html>");
    out.finish()
}

fn compile_head(doc: &ProtocolDocument, options: &CompileOptions, out: &mut Markup) {
    out.nest("<head>", "</head>", |out| {
        out.line("<meta charset=\"UTF-8\" />");
        out.line("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />");
        out.line(&format!(
            "<title>{} | {}</title>",
            markup::text(&doc.protocol_title),
            markup::text(&doc.doctor_name)
        ));
        out.line(&format!(
            "<link href=\"{}\" rel=\"stylesheet\">",
            markup::text(&options.font_css)
        ));
        out.line(&format!(
            "<link rel=\"stylesheet\" href=\"{}\" />",
            markup::text(&options.navigation_css)
        ));
        out.nest("<style>", "</style>", |out| out.block(STYLES));
    });
}

fn compile_header(doc: &ProtocolDocument, out: &mut Markup) {
    out.nest("<header class=\"protocol-header\">", "</header>", |out| {
        if !doc.logo_url.trim().is_empty() {
            out.line(&format!(
                "<img src=\"{}\" alt=\"{}\" class=\"header-logo\">",
                markup::text(&doc.logo_url),
                markup::text(&doc.doctor_name)
            ));
        }
        out.line(&format!("<h1>{}</h1>", markup::text(&doc.protocol_title)));
        out.line(&format!("<p>{}</p>", markup::text(&doc.doctor_name)));
    });
}

/// Inline sizing and background, falling back to the standard card.
fn slide_style(slide: &Slide) -> String {
    let background = slide
        .background_color
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(DEFAULT_BACKGROUND);
    format!(
        "max-width: {}px; min-height: {}px; background-color: {};",
        slide.custom_width.filter(|w| *w > 0).unwrap_or(DEFAULT_SLIDE_WIDTH),
        slide.custom_height.filter(|h| *h > 0).unwrap_or(DEFAULT_SLIDE_HEIGHT),
        markup::text(background)
    )
}

fn compile_slide(slide: &Slide, options: &CompileOptions, out: &mut Markup) {
    let style = slide_style(slide);

    out.nest("<div class=\"swiper-slide\">", "</div>", |out| match slide.kind {
        SlideKind::Transition => {
            let image = slide.image_url.as_deref().filter(|url| !url.trim().is_empty());
            let open = format!(
                "<div class=\"transition-card\" data-img=\"{}\" style=\"{} overflow: hidden;\">",
                markup::text(image.unwrap_or_default()),
                style
            );
            out.nest(&open, "</div>", |out| {
                out.line(&format!(
                    "<img src=\"{}\" alt=\"{}\">",
                    markup::text(image.unwrap_or(options.placeholder_image.as_str())),
                    markup::text(slide.title_text().unwrap_or(TRANSITION_ALT))
                ));
            });
        }
        SlideKind::Phase | SlideKind::Final => {
            let open = format!("<section class=\"phase-card\" style=\"{}\">", style);
            out.nest(&open, "</section>", |out| {
                compile_slide_title(slide, out);
                for section in &slide.sections {
                    compile_section(section, out);
                }
            });
        }
        SlideKind::Warning => {
            let open = format!("<section class=\"phase-card\" style=\"{}\">", style);
            out.nest(&open, "</section>", |out| {
                compile_slide_title(slide, out);
                out.nest("<div class=\"attention-box\">", "</div>", |out| {
                    for section in &slide.sections {
                        compile_list(None, &section.items, out);
                    }
                    out.line(&format!(
                        "<div class=\"attention-advice\">{}</div>",
                        WARNING_ADVICE
                    ));
                });
            });
        }
    });
}

fn compile_slide_title(slide: &Slide, out: &mut Markup) {
    out.line(&format!(
        "<h2 class=\"phase-title\">{}</h2>",
        markup::text(slide_heading(slide))
    ));
}

/// Title shown when a section has none.
fn fallback_title(kind: SectionKind) -> Option<&'static str> {
    match kind {
        SectionKind::Objectives => Some("Obiettivi"),
        SectionKind::Criteria => Some("Criteri di passaggio"),
        SectionKind::Exercises => Some("Esercizi consigliati"),
        SectionKind::Info => Some("Informazioni utili"),
        SectionKind::Precautions => Some("Precauzioni"),
        SectionKind::Warning => Some("Attenzione"),
        SectionKind::Video | SectionKind::GenericList => None,
    }
}

fn section_title(section: &Section) -> Option<&str> {
    Some(section.title.as_str())
        .filter(|t| !t.trim().is_empty())
        .or_else(|| fallback_title(section.kind))
}

fn compile_section(section: &Section, out: &mut Markup) {
    let title = section_title(section);

    match section.kind {
        SectionKind::Objectives => compile_box("objectives-box", title, None, &section.items, out),
        SectionKind::Criteria => compile_box(
            "criteria-box",
            title,
            Some("criteria-list"),
            &section.items,
            out,
        ),
        SectionKind::Info => compile_box("info-box", title, None, &section.items, out),
        SectionKind::Precautions => {
            compile_box("info-box precautions-box", title, None, &section.items, out)
        }
        SectionKind::Warning => compile_box("attention-box", title, None, &section.items, out),
        SectionKind::GenericList => compile_box(
            "checklist-box",
            title,
            Some("checklist-list"),
            &section.items,
            out,
        ),
        SectionKind::Exercises => {
            // Names only; images and descriptions go to the gallery.
            if let Some(title) = title {
                out.line(&format!(
                    "<div class=\"exercises-title\">{}</div>",
                    markup::text(title)
                ));
            }
            compile_list(Some("standard-list"), &section.items, out);
        }
        SectionKind::Video => compile_videos(title, &section.items, out),
    }
}

fn compile_box(
    class: &str,
    title: Option<&str>,
    list_class: Option<&str>,
    items: &[SectionItem],
    out: &mut Markup,
) {
    out.nest(&format!("<div class=\"{}\">", class), "</div>", |out| {
        if let Some(title) = title {
            out.line(&format!("<h3 class=\"box-title\">{}</h3>", markup::text(title)));
        }
        compile_list(list_class, items, out);
    });
}

fn compile_list(class: Option<&str>, items: &[SectionItem], out: &mut Markup) {
    let open = match class {
        Some(class) => format!("<ul class=\"{}\">", class),
        None => "<ul>".to_string(),
    };
    out.nest(&open, "</ul>", |out| {
        for item in items {
            out.line(&format!("<li>{}</li>", markup::text(&item.text)));
        }
    });
}

fn compile_videos(title: Option<&str>, items: &[SectionItem], out: &mut Markup) {
    out.nest("<div class=\"video-section\">", "</div>", |out| {
        if let Some(title) = title {
            out.line(&format!("<h3 class=\"video-title\">{}</h3>", markup::text(title)));
        }

        for item in items {
            let Some(video_id) = extract_video_id(&item.text) else {
                log::debug!("Skipping unrecognized video URL: {}", item.text);
                continue;
            };

            out.nest("<div class=\"video-wrapper\">", "</div>", |out| {
                out.nest("<div class=\"video-container\">", "</div>", |out| {
                    out.line(&format!(
                        "<iframe src=\"{}\" title=\"YouTube video player\" frameborder=\"0\" \
                         allow=\"accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture; web-share\" \
                         referrerpolicy=\"strict-origin-when-cross-origin\" allowfullscreen></iframe>",
                        markup::text(&embed_url(video_id))
                    ));
                });
                if let Some(caption) = item.description_text() {
                    out.line(&format!(
                        "<p class=\"video-caption\">{}</p>",
                        markup::multiline(caption)
                    ));
                }
            });
        }
    });
}

/// Exercises with an image, across all exercise sections of a content slide.
fn gallery_items(slide: &Slide) -> Vec<&SectionItem> {
    match slide.kind {
        SlideKind::Phase | SlideKind::Final => slide
            .sections
            .iter()
            .filter(|s| s.kind == SectionKind::Exercises)
            .flat_map(|s| s.items.iter())
            .filter(|item| item.image().is_some())
            .collect(),
        SlideKind::Transition | SlideKind::Warning => Vec::new(),
    }
}

fn compile_gallery(index: usize, slide: &Slide, out: &mut Markup) {
    let items = gallery_items(slide);
    if items.is_empty() {
        return;
    }

    let open = format!("<div class=\"exercise-gallery\" data-slide=\"{}\" hidden>", index);
    out.nest(&open, "</div>", |out| {
        for item in items {
            out.nest("<div class=\"gallery-item\">", "</div>", |out| {
                out.line(&format!(
                    "<img src=\"{}\" alt=\"{}\">",
                    markup::text(item.image().unwrap_or_default()),
                    markup::text(&item.text)
                ));
                out.nest("<div>", "</div>", |out| {
                    out.line(&format!("<h4>{}</h4>", markup::text(&item.text)));
                    if let Some(description) = item.description_text() {
                        out.line(&format!("<p>{}</p>", markup::multiline(description)));
                    }
                });
            });
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn single_slide(slide: Slide) -> ProtocolDocument {
        let mut doc = ProtocolDocument::new("Dott. Rossi", "LCA", "");
        doc.slides.push(Arc::new(slide));
        doc
    }

    fn compile(doc: &ProtocolDocument) -> String {
        compile_presentation(doc, &CompileOptions::new(2025))
    }

    #[test]
    fn test_objectives_list_in_order() {
        let mut slide = Slide::new("p", SlideKind::Phase);
        slide.sections.push(Section::with_items(
            "s",
            SectionKind::Objectives,
            "Obiettivi",
            vec![SectionItem::new("A"), SectionItem::new("B")],
        ));
        let html = compile(&single_slide(slide));

        assert!(html.contains("<h3 class=\"box-title\">Obiettivi</h3>"));
        assert_eq!(html.matches("<li>").count(), 2);
        let a = html.find("<li>A</li>").unwrap();
        let b = html.find("<li>B</li>").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_compile_is_deterministic() {
        let doc = ProtocolDocument::starter();
        assert_eq!(compile(&doc), compile(&doc));
    }

    #[test]
    fn test_transition_defaults() {
        let html = compile(&single_slide(Slide::new("t", SlideKind::Transition)));
        assert!(html.contains("src=\"https://picsum.photos/800/600\""));
        assert!(html.contains("alt=\"Transizione\""));
        assert!(html.contains("max-width: 700px; min-height: 510px; background-color: #ffffff;"));
    }

    #[test]
    fn test_custom_appearance() {
        let mut slide = Slide::new("p", SlideKind::Final);
        slide.custom_width = Some(900);
        slide.custom_height = Some(400);
        slide.background_color = Some("#eef".to_string());
        let html = compile(&single_slide(slide));
        assert!(html.contains("max-width: 900px; min-height: 400px; background-color: #eef;"));
        assert!(html.contains("<h2 class=\"phase-title\">Titolo</h2>"));
    }

    #[test]
    fn test_zero_size_uses_default_card() {
        let mut slide = Slide::new("p", SlideKind::Phase);
        slide.custom_width = Some(0);
        slide.custom_height = Some(0);
        let html = compile(&single_slide(slide));
        assert!(html.contains("max-width: 700px; min-height: 510px; background-color: #ffffff;"));
        assert!(!html.contains("max-width: 0px"));
    }

    #[test]
    fn test_warning_slide_flattens_sections() {
        let mut slide = Slide::new("w", SlideKind::Warning);
        slide.sections = vec![
            Section::with_items("a", SectionKind::Warning, "Uno", vec![SectionItem::new("Febbre")]),
            Section::with_items("b", SectionKind::Info, "Due", vec![SectionItem::new("Gonfiore")]),
        ];
        let html = compile(&single_slide(slide));

        assert!(html.contains("Segnali di allarme"));
        assert!(html.contains(WARNING_ADVICE));
        assert!(!html.contains("Uno"));
        assert!(html.contains("<li>Febbre</li>"));
        assert!(html.contains("<li>Gonfiore</li>"));
    }

    #[test]
    fn test_unrecognized_video_omitted() {
        let mut slide = Slide::new("p", SlideKind::Phase);
        slide.sections.push(Section::with_items(
            "v",
            SectionKind::Video,
            "",
            vec![
                SectionItem::new("https://example.com/video"),
                SectionItem {
                    text: "https://youtu.be/dQw4w9WgXcQ".to_string(),
                    img: None,
                    description: Some("Riscaldamento".to_string()),
                },
            ],
        ));
        let html = compile(&single_slide(slide));

        assert_eq!(html.matches("<iframe").count(), 1);
        assert!(html.contains("https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ?rel=0"));
        assert!(html.contains("<p class=\"video-caption\">Riscaldamento</p>"));
        assert!(!html.contains("example.com"));
        assert!(!html.contains("<h3 class=\"video-title\">"));
    }

    #[test]
    fn test_section_title_fallbacks() {
        let mut slide = Slide::new("p", SlideKind::Phase);
        slide.sections = vec![
            Section::with_items("a", SectionKind::Precautions, "", vec![]),
            Section::with_items("b", SectionKind::Exercises, " ", vec![]),
        ];
        let html = compile(&single_slide(slide));
        assert!(html.contains(">Precauzioni</h3>"));
        assert!(html.contains("<div class=\"exercises-title\">Esercizi consigliati</div>"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut slide = Slide::new("p", SlideKind::Phase);
        slide.title = Some("<script>alert(1)</script>".to_string());
        let html = compile(&single_slide(slide));
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_gallery_follows_slide_index() {
        let mut doc = ProtocolDocument::starter();
        let slide = Arc::make_mut(&mut doc.slides[1]);
        slide.sections.push(Section::with_items(
            "ex",
            SectionKind::Exercises,
            "Esercizi",
            vec![
                SectionItem::from_library(&doc.exercise_library[0]),
                SectionItem::new("Senza immagine"),
            ],
        ));
        let html = compile(&doc);

        assert!(html.contains("<div class=\"exercise-gallery\" data-slide=\"1\" hidden>"));
        assert_eq!(html.matches("class=\"gallery-item\"").count(), 1);
        assert!(html.contains("<li>Senza immagine</li>"));
    }

    #[test]
    fn test_header_and_footer() {
        let html = compile(&ProtocolDocument::starter());
        assert!(
            html.contains("<title>PROTESI TOTALE DI GINOCCHIO | Dott. Daniele Tradati</title>")
        );
        assert!(html.contains("class=\"header-logo\""));
        assert!(html.contains("&copy; 2025 <strong>Dott. Daniele Tradati</strong>"));
    }
}
