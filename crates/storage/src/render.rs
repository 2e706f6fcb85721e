//! Human-viewable HTML rendering of a comic story.
//!
//! The rendering is a pure projection of the [`ComicStory`] fields. It
//! never encodes information absent from the structured artifact, so
//! the two stay consistent under regeneration.

use vignette_core::character::TraitCategory;
use vignette_core::story::ComicStory;

/// Minimal HTML escaping for interpolated story text.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render a story to a standalone HTML page.
pub fn render_html(story: &ComicStory) -> String {
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape(&story.title)));
    html.push_str(
        "<style>\n\
         body { font-family: Arial, sans-serif; max-width: 1200px; margin: 0 auto; padding: 20px; background-color: #f5f5f5; }\n\
         .header { text-align: center; background-color: #2c3e50; color: white; padding: 20px; border-radius: 10px; }\n\
         .character-info, .comic-panel { background-color: white; padding: 20px; border-radius: 10px; margin-top: 20px; }\n\
         .comic-panel { text-align: center; }\n\
         .panel-image img { max-width: 600px; width: 100%; border-radius: 5px; }\n\
         .panel-description { font-style: italic; color: #7f8c8d; }\n\
         .footer { text-align: center; margin-top: 30px; color: #7f8c8d; font-size: 0.9em; }\n\
         </style>\n</head>\n<body>\n",
    );

    html.push_str(&format!(
        "<div class=\"header\"><h1>{}</h1><p>Theme: {}</p></div>\n",
        escape(&story.title),
        escape(&story.theme)
    ));

    html.push_str("<div class=\"character-info\">\n<h2>Main Character</h2>\n");
    if let Some(portrait) = &story.portrait {
        html.push_str(&format!(
            "<p class=\"portrait\"><img src=\"{}\" alt=\"Character portrait\"></p>\n",
            escape(portrait.as_str())
        ));
    }
    html.push_str("<ul>\n");
    for (category, value) in story.main_character.characteristics.iter() {
        html.push_str(&format!(
            "<li><strong>{}:</strong> {}</li>\n",
            escape(category.name()),
            escape(value)
        ));
    }
    html.push_str("</ul>\n</div>\n");

    for panel in &story.panels {
        html.push_str(&format!(
            "<div class=\"comic-panel\">\n<h3>Panel {}: {}</h3>\n",
            panel.ordinal,
            escape(panel.role.name())
        ));
        if let Some(image) = &panel.image_ref {
            html.push_str(&format!(
                "<div class=\"panel-image\"><img src=\"{}\" alt=\"{}\"></div>\n",
                escape(image.as_str()),
                escape(&panel.description)
            ));
        }
        html.push_str(&format!(
            "<p class=\"panel-description\">{}</p>\n</div>\n",
            escape(&panel.description)
        ));
    }

    html.push_str(&format!(
        "<div class=\"footer\"><p>Created: {}</p></div>\n</body>\n</html>\n",
        story.created_at.to_rfc3339()
    ));

    html
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use vignette_core::capability::ImageRef;
    use vignette_core::character::{build_character, Characteristics, PromptStyle};
    use vignette_core::panel::plan_panels;
    use vignette_core::story::assemble;

    fn story(portrait: Option<ImageRef>) -> ComicStory {
        let style = PromptStyle::default();
        let mut c = Characteristics::new();
        c.set(TraitCategory::Appearance, "elf with silver hair")
            .set(TraitCategory::Personality, "wise & curious");
        let character = build_character(c, &style).unwrap();
        let mut panels = plan_panels("adventure", "The <Quest>", &character).unwrap();
        for panel in &mut panels {
            panel.image_ref = Some(ImageRef::new(format!("img_{}.png", panel.ordinal)));
        }
        assemble("The <Quest>", "adventure", character, portrait, panels, &style).unwrap()
    }

    #[test]
    fn rendering_contains_all_panels() {
        let html = render_html(&story(None));
        for ordinal in 1..=5 {
            assert!(html.contains(&format!("img_{ordinal}.png")));
            assert!(html.contains(&format!("Panel {ordinal} of the comic story")));
        }
    }

    #[test]
    fn rendering_escapes_story_text() {
        let html = render_html(&story(None));
        assert!(html.contains("The &lt;Quest&gt;"));
        assert!(html.contains("wise &amp; curious"));
        assert!(!html.contains("The <Quest>"));
    }

    #[test]
    fn rendering_includes_portrait_only_when_present() {
        let with = render_html(&story(Some(ImageRef::new("portrait.png"))));
        assert!(with.contains("portrait.png"));

        let without = render_html(&story(None));
        assert!(!without.contains("Character portrait"));
    }

    #[test]
    fn rendering_is_a_pure_projection() {
        let story = story(None);
        assert_eq!(render_html(&story), render_html(&story));
    }
}
