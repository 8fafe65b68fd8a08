//! Printable target.
//!
//! A flat A4 layout: one block per slide, exercises with their pictures and
//! descriptions, criteria as tick boxes. The page opens the print dialog as
//! soon as it loads.

use mediproto_core::types::TRANSITION_PLACEHOLDER_TITLE;
use mediproto_core::{ProtocolDocument, Section, SectionKind, Slide, SlideKind};

use crate::markup::{self, Markup};
use crate::{slide_heading, CompileOptions};

const CHECKBOX_MARKER: &str = "[ ] ";

const STYLES: &str = r#"
@page { size: A4; margin: 1.5cm; }
body { font-family: sans-serif; color: #111; line-height: 1.4; margin: 0 auto; max-width: 210mm; }
.header { display: flex; justify-content: space-between; align-items: center; border-bottom: 2px solid #166bbf; padding-bottom: 15px; margin-bottom: 20px; }
.header-text h1 { margin: 0; font-size: 20px; color: #166bbf; text-transform: uppercase; }
.header-logo { max-height: 50px; }
.print-slide { margin-bottom: 25px; break-inside: avoid; }
.transition-img { width: 100%; }
.slide-title { font-size: 16px; border-bottom: 1px solid #ddd; padding-bottom: 4px; margin-bottom: 10px; color: #333; }
.slide-title.warning { color: #dc3545; }
.section-title { font-size: 12px; margin: 10px 0 5px; text-transform: uppercase; color: #555; }
.criteria-print { background: #fdfdfd; border: 1px solid #eee; padding: 10px; border-radius: 4px; }
.criteria-list-print { list-style: none; padding: 0; font-size: 11px; font-weight: bold; }
.exercise-item { display: flex; gap: 10px; align-items: flex-start; background: #f9f9f9; padding: 8px; border-radius: 4px; border: 1px solid #eee; margin-bottom: 5px; }
.ex-img-container { width: 60px; }
.ex-img-container img { width: 100%; border-radius: 3px; }
.ex-content { font-size: 11px; }
.footer { margin-top: 30px; border-top: 1px solid #eee; text-align: center; font-size: 9px; color: #888; }
"#;

/// Compile the printable page.
pub fn compile_print(doc: &ProtocolDocument, options: &CompileOptions) -> String {
    let mut out = Markup::new();
    out.line("<!DOCTYPE html>");
    out.line("<html lang=\"it\">");

    out.nest("<head>", "</head>", |out| {
        out.line("<meta charset=\"UTF-8\">");
        out.line(&format!("<title>{}</title>", markup::text(&doc.protocol_title)));
        out.nest("<style>", "</style>", |out| out.block(STYLES));
    });

    out.nest("<body onload=\"window.print()\">", "</body>", |out| {
        out.nest("<div class=\"header\">", "</div>", |out| {
            out.nest("<div class=\"header-text\">", "</div>", |out| {
                out.line(&format!("<h1>{}</h1>", markup::text(&doc.protocol_title)));
                out.line(&format!("<p>{}</p>", markup::text(&doc.doctor_name)));
            });
            if !doc.logo_url.trim().is_empty() {
                out.line(&format!(
                    "<img src=\"{}\" class=\"header-logo\" alt=\"Logo\">",
                    markup::text(&doc.logo_url)
                ));
            }
        });

        for slide in &doc.slides {
            compile_slide(slide, out);
        }

        out.line(&format!(
            "<div class=\"footer\">MediProto Builder - {}</div>",
            options.year
        ));
    });

    out.line("</html>");
    out.finish()
}

fn compile_slide(slide: &Slide, out: &mut Markup) {
    match slide.kind {
        SlideKind::Transition => {
            out.nest("<div class=\"print-slide transition-slide\">", "</div>", |out| {
                if let Some(url) = slide.image_url.as_deref().filter(|u| !u.trim().is_empty()) {
                    out.line(&format!(
                        "<img src=\"{}\" class=\"transition-img\" />",
                        markup::text(url)
                    ));
                }
                if let Some(title) = slide
                    .title_text()
                    .filter(|t| *t != TRANSITION_PLACEHOLDER_TITLE)
                {
                    out.line(&format!("<h2>{}</h2>", markup::text(title)));
                }
            });
        }
        SlideKind::Phase | SlideKind::Warning | SlideKind::Final => {
            let title_class = if slide.kind == SlideKind::Warning {
                "slide-title warning"
            } else {
                "slide-title"
            };
            out.nest("<div class=\"print-slide content-slide\">", "</div>", |out| {
                out.line(&format!(
                    "<h3 class=\"{}\">{}</h3>",
                    title_class,
                    markup::text(slide_heading(slide))
                ));
                for section in &slide.sections {
                    compile_section(section, out);
                }
            });
        }
    }
}

fn compile_section(section: &Section, out: &mut Markup) {
    let title = Some(section.title.as_str()).filter(|t| !t.trim().is_empty());
    let container = match section.kind {
        SectionKind::Criteria => "<div class=\"print-section criteria-print\">",
        _ => "<div class=\"print-section\">",
    };

    out.nest(container, "</div>", |out| {
        if let Some(title) = title {
            out.line(&format!(
                "<h4 class=\"section-title {}\">{}</h4>",
                section.kind.class_name(),
                markup::text(title)
            ));
        }

        match section.kind {
            SectionKind::Criteria => {
                out.nest("<ul class=\"criteria-list-print\">", "</ul>", |out| {
                    for item in &section.items {
                        out.line(&format!(
                            "<li>{}{}</li>",
                            CHECKBOX_MARKER,
                            markup::text(&item.text)
                        ));
                    }
                });
            }
            SectionKind::Exercises => {
                out.nest("<div class=\"exercise-list\">", "</div>", |out| {
                    for item in &section.items {
                        out.nest("<div class=\"exercise-item\">", "</div>", |out| {
                            if let Some(img) = item.image() {
                                out.line(&format!(
                                    "<div class=\"ex-img-container\"><img src=\"{}\" alt=\"{}\"></div>",
                                    markup::text(img),
                                    markup::text(&item.text)
                                ));
                            }
                            out.nest("<div class=\"ex-content\">", "</div>", |out| {
                                out.line(&format!("<strong>{}</strong>", markup::text(&item.text)));
                                if let Some(description) = item.description_text() {
                                    out.line(&format!("<p>{}</p>", markup::multiline(description)));
                                }
                            });
                        });
                    }
                });
            }
            SectionKind::Objectives
            | SectionKind::Info
            | SectionKind::Precautions
            | SectionKind::GenericList
            | SectionKind::Warning
            | SectionKind::Video => {
                out.nest("<ul class=\"simple-list\">", "</ul>", |out| {
                    for item in &section.items {
                        out.line(&format!("<li>{}</li>", markup::text(&item.text)));
                    }
                });
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediproto_core::SectionItem;
    use std::sync::Arc;

    fn compile(doc: &ProtocolDocument) -> String {
        compile_print(doc, &CompileOptions::new(2025))
    }

    fn with_slides(slides: Vec<Slide>) -> ProtocolDocument {
        let mut doc = ProtocolDocument::new("Dott. Rossi", "LCA", "");
        doc.slides = slides.into_iter().map(Arc::new).collect();
        doc
    }

    #[test]
    fn test_print_trigger_and_footer() {
        let html = compile(&ProtocolDocument::starter());
        assert!(html.contains("<body onload=\"window.print()\">"));
        assert!(html.contains("MediProto Builder - 2025"));
        assert!(html.contains("class=\"header-logo\""));
    }

    #[test]
    fn test_no_logo_when_empty() {
        let html = compile(&with_slides(vec![]));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_criteria_render_as_checkboxes() {
        let mut slide = Slide::new("p", SlideKind::Phase);
        slide.sections.push(Section::with_items(
            "c",
            SectionKind::Criteria,
            "Criteri",
            vec![SectionItem::new("Flessione 90°"), SectionItem::new("Assenza di dolore")],
        ));
        let html = compile(&with_slides(vec![slide]));

        assert!(html.contains("<h4 class=\"section-title criteria\">Criteri</h4>"));
        assert!(html.contains("<li>[ ] Flessione 90°</li>"));
        assert!(html.contains("<li>[ ] Assenza di dolore</li>"));
    }

    #[test]
    fn test_exercises_show_image_and_description() {
        let mut slide = Slide::new("p", SlideKind::Phase);
        slide.sections.push(Section::with_items(
            "e",
            SectionKind::Exercises,
            "",
            vec![
                SectionItem {
                    text: "Ponte".to_string(),
                    img: Some("ponte.png".to_string()),
                    description: Some("Salire\nScendere".to_string()),
                },
                SectionItem::new("Camminata"),
            ],
        ));
        let html = compile(&with_slides(vec![slide]));

        assert!(html.contains("<img src=\"ponte.png\" alt=\"Ponte\">"));
        assert!(html.contains("<p>Salire<br>Scendere</p>"));
        assert!(html.contains("<strong>Camminata</strong>"));
        assert_eq!(html.matches("ex-img-container\"><img").count(), 1);
        assert!(!html.contains("<h4"));
    }

    #[test]
    fn test_transition_placeholder_title_excluded() {
        let mut placeholder = Slide::new("a", SlideKind::Transition);
        placeholder.title = Some(TRANSITION_PLACEHOLDER_TITLE.to_string());
        placeholder.image_url = Some("cover.png".to_string());
        let mut titled = Slide::new("b", SlideKind::Transition);
        titled.title = Some("Fase 2".to_string());

        let html = compile(&with_slides(vec![placeholder, titled]));
        assert!(html.contains("<img src=\"cover.png\" class=\"transition-img\" />"));
        assert!(!html.contains("<h2>Transition</h2>"));
        assert!(html.contains("<h2>Fase 2</h2>"));
        assert_eq!(html.matches("transition-img\"").count(), 1);
    }

    #[test]
    fn test_warning_title_class_and_plain_lists() {
        let mut slide = Slide::new("w", SlideKind::Warning);
        slide.sections.push(Section::with_items(
            "s",
            SectionKind::Warning,
            "Attenzione",
            vec![SectionItem::new("Febbre")],
        ));
        let html = compile(&with_slides(vec![slide]));

        assert!(html.contains("<h3 class=\"slide-title warning\">Segnali di allarme</h3>"));
        assert!(html.contains("<h4 class=\"section-title warning\">Attenzione</h4>"));
        assert!(html.contains("<li>Febbre</li>"));
    }
}
