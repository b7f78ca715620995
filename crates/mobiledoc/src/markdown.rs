//! Markdown rendering of a parsed document.
//!
//! A total, best-effort flattening: unrecognized cards contribute nothing
//! and the renderer never fails, in contrast with the fail-closed decoder.
//! Markups are modeled but not translated into emphasis syntax; marker
//! values come out as plain text.

use crate::doc::{CardPayload, ListTag, Marker, Mobiledoc, Section};

/// Render a document to Markdown, section by section.
///
/// Each non-empty block is followed by one blank line; a document whose
/// final block is a marker section ends with a single trailing newline
/// instead.
pub fn render_markdown(doc: &Mobiledoc) -> String {
    let mut out = String::new();
    let mut last_was_marker_section = false;
    for section in &doc.sections {
        let block = render_section(doc, section);
        if block.is_empty() {
            continue;
        }
        out.push_str(&block);
        out.push_str("\n\n");
        last_was_marker_section = matches!(section, Section::Marker { .. });
    }
    if last_was_marker_section {
        out.pop();
    }
    out
}

fn render_section(doc: &Mobiledoc, section: &Section) -> String {
    match section {
        Section::Marker { tag, markers } => match tag.heading_level() {
            Some(level) => format!("{} {}", "#".repeat(level), marker_text(markers)),
            None => marker_text(markers),
        },
        Section::List { tag, markers } => markers
            .iter()
            .enumerate()
            .map(|(i, marker)| match tag {
                ListTag::Ul => format!("- {}", marker.value),
                ListTag::Ol => format!("{}. {}", i + 1, marker.value),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Section::Image { src } => format!("![]({src})"),
        Section::Card { card_index } => doc
            .cards
            .get(*card_index)
            .map(|card| match &card.payload {
                // Already Markdown; passed through without escaping.
                CardPayload::Markdown(markdown) => markdown.clone(),
                CardPayload::Opaque(_) => String::new(),
            })
            .unwrap_or_default(),
    }
}

fn marker_text(markers: &[Marker]) -> String {
    markers.iter().map(|m| m.value.as_str()).collect()
}
