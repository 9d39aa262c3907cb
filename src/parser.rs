//! HTML-to-text extraction (SPEC_FULL.md §4.1), grounded on the teacher's general
//! "extraction" approach to separating structural signal from prose (the teacher's own
//! `extract.rs` was dropped — see DESIGN.md — but `scraper`'s CSS-selector idiom
//! follows the same selector-then-collect shape) and on `other_examples/manifests/
//! eric-minassian-search-engine-rust/Cargo.toml` for the `scraper` dependency itself.

use scraper::{Html, Selector};

/// Text extracted from one document, split into the two streams the rest of the
/// pipeline weights separately.
#[derive(Debug, Clone, Default)]
pub struct ExtractedText {
    /// All visible text on the page, minus `<script>`/`<style>` contents.
    pub normal: String,
    /// Text from title, then h1-h3, then b/strong elements: one pass per category,
    /// concatenated in that fixed order (not a single interleaved document-order walk).
    pub important: String,
}

fn title_selector() -> &'static Selector {
    use std::sync::OnceLock;
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("title").expect("static selector is valid"))
}

fn heading_selector() -> &'static Selector {
    use std::sync::OnceLock;
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("h1, h2, h3").expect("static selector is valid"))
}

fn bold_selector() -> &'static Selector {
    use std::sync::OnceLock;
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("b, strong").expect("static selector is valid"))
}

fn skip_selector() -> &'static Selector {
    use std::sync::OnceLock;
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("script, style").expect("static selector is valid"))
}

/// Collapses runs of whitespace (including newlines) into single spaces and trims the
/// result, matching the original's `" ".join(text.split())` normalization.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses `html` and extracts the `normal` and `important` text streams.
pub fn extract(html: &str) -> ExtractedText {
    let document = Html::parse_document(html);

    let skip_nodes: std::collections::HashSet<_> = document
        .select(skip_selector())
        .map(|el| el.id())
        .collect();

    let mut normal_parts = Vec::new();
    for node in document.root_element().descendants() {
        if let Some(text_node) = node.value().as_text() {
            let is_inside_skipped = node
                .ancestors()
                .any(|ancestor| skip_nodes.contains(&ancestor.id()));
            if !is_inside_skipped {
                normal_parts.push(text_node.to_string());
            }
        }
    }

    // Three separate category passes, concatenated in a fixed order (title, then
    // headings, then bold/strong), matching the original's per-category collection
    // rather than a single interleaved document-order selection.
    let mut important_parts: Vec<String> = Vec::new();
    important_parts.extend(document.select(title_selector()).map(|el| el.text().collect::<Vec<_>>().join(" ")));
    important_parts.extend(document.select(heading_selector()).map(|el| el.text().collect::<Vec<_>>().join(" ")));
    important_parts.extend(document.select(bold_selector()).map(|el| el.text().collect::<Vec<_>>().join(" ")));

    ExtractedText {
        normal: collapse_whitespace(&normal_parts.join(" ")),
        important: collapse_whitespace(&important_parts.join(" ")),
    }
}
