//! Markdown → HTML for event bodies.
//!
//! Images must render full-width on detail pages, so after conversion every
//! `<img>` gets its `src` resolved against the backend origin and a fixed
//! style attribute injected right after it. The rewrite runs on the HTML so
//! raw `<img>` tags inside the markdown get the same treatment.

use once_cell::sync::Lazy;
use pulldown_cmark::{html, Event, Options, Parser, Tag};
use regex::{Captures, Regex};

pub const IMAGE_STYLE: &str = "width: 100%; height: auto; display: block; margin: 20px 0;";

static IMG_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img([^>]*?)src=["']([^"']+)["']([^>]*?)>"#).expect("valid img regex")
});

static SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)([a-z][a-z0-9+.\-]*://|data:)").expect("valid scheme regex"));

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
}

/// Render `markdown` to HTML. Single newlines become `<br />`.
pub fn render(markdown: &str, base_url: &str) -> String {
    if markdown.is_empty() {
        return String::new();
    }
    let parser = Parser::new_ext(markdown, options()).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    rewrite_images(&out, base_url)
}

fn rewrite_images(html: &str, base_url: &str) -> String {
    IMG_TAG
        .replace_all(html, |caps: &Captures| {
            let src = resolve_asset_url(base_url, &caps[2]);
            format!(
                r#"<img{}src="{}" style="{}"{}>"#,
                &caps[1], src, IMAGE_STYLE, &caps[3]
            )
        })
        .into_owned()
}

/// Resolve a backend asset path against `base_url`.
///
/// Absolute URLs pass through, `/x` becomes `{base}/x`, and any other relative
/// path is joined with exactly one `/`.
pub fn resolve_asset_url(base_url: &str, path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    if SCHEME.is_match(path) {
        return path.to_string();
    }
    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Target of the first markdown image, if any.
pub fn extract_first_image(markdown: &str) -> Option<String> {
    Parser::new_ext(markdown, options()).find_map(|event| match event {
        Event::Start(Tag::Image { dest_url, .. }) => Some(dest_url.into_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://localhost:8000";

    #[test]
    fn empty_input_renders_nothing() {
        assert_eq!(render("", BASE), "");
    }

    #[test]
    fn root_relative_image_is_resolved_and_styled() {
        let html = render("![x](/uploads/a.png)", BASE);
        assert_eq!(
            html,
            "<p><img src=\"http://localhost:8000/uploads/a.png\" \
             style=\"width: 100%; height: auto; display: block; margin: 20px 0;\" alt=\"x\" /></p>\n"
        );
    }

    #[test]
    fn absolute_image_url_passes_through() {
        let html = render("![cover](https://cdn.example.com/c.jpg)", BASE);
        assert!(html.contains(r#"src="https://cdn.example.com/c.jpg""#));
        assert!(html.contains(&format!(r#"style="{IMAGE_STYLE}""#)));
        assert!(!html.contains("localhost"));
    }

    #[test]
    fn bare_relative_path_gets_one_separator() {
        assert_eq!(
            resolve_asset_url("http://localhost:8000/", "uploads/b.png"),
            "http://localhost:8000/uploads/b.png"
        );
        assert_eq!(resolve_asset_url(BASE, ""), "");
        assert_eq!(
            resolve_asset_url(BASE, "data:image/png;base64,AAAA"),
            "data:image/png;base64,AAAA"
        );
    }

    #[test]
    fn raw_html_images_are_rewritten_too() {
        let html = render("<img src='events/k.png'>", BASE);
        assert!(html.contains(r#"src="http://localhost:8000/events/k.png""#));
    }

    #[test]
    fn newlines_break_lines() {
        let html = render("first\nsecond", BASE);
        assert_eq!(html, "<p>first<br />\nsecond</p>\n");
    }

    #[test]
    fn gfm_extensions_are_enabled() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~", BASE);
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn first_image_is_extracted() {
        assert_eq!(
            extract_first_image("intro\n\n![a](/one.png) ![b](/two.png)").as_deref(),
            Some("/one.png")
        );
        assert_eq!(extract_first_image("no pictures"), None);
    }
}
