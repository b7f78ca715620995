//! Mobiledoc document model.
//!
//! A Mobiledoc is a versioned document made of three registries (atoms,
//! cards, markups) plus an ordered list of sections. Markers reference the
//! markup registry by position; card sections reference the card registry by
//! position. Index validity is enforced at decode time (see [`crate::codec`]),
//! so a decoded document never carries dangling references.

use serde_json::Value;

/// Version written by [`Mobiledoc::new`] and targeted by the codec.
pub const MOBILEDOC_VERSION: &str = "0.3.1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mobiledoc {
    pub version: String,
    pub atoms: Vec<Atom>,
    pub cards: Vec<Card>,
    pub markups: Vec<Markup>,
    pub sections: Vec<Section>,
}

impl Mobiledoc {
    /// Programmatic assembly with the current version and no atoms.
    pub fn new(markups: Vec<Markup>, cards: Vec<Card>, sections: Vec<Section>) -> Self {
        Self {
            version: MOBILEDOC_VERSION.to_string(),
            atoms: Vec::new(),
            cards,
            markups,
            sections,
        }
    }
}

/// An inline atom: a named, self-contained inline unit with display text and
/// an arbitrary payload (e.g. a mention or an inline embed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    pub name: String,
    pub text: String,
    pub payload: Value,
}

/// A named embedded content unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub name: String,
    pub payload: CardPayload,
}

impl Card {
    /// The `"markdown"` card: a pass-through Markdown blob.
    pub fn markdown(markdown: impl Into<String>) -> Self {
        Self {
            name: "markdown".to_string(),
            payload: CardPayload::Markdown(markdown.into()),
        }
    }
}

/// Card payloads are decoded eagerly for recognized card names and kept
/// verbatim otherwise, so unrecognized cards still re-encode losslessly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardPayload {
    /// Payload of a `"markdown"` card: the `markdown` field.
    Markdown(String),
    /// Raw payload of an unrecognized card, preserved for re-encoding.
    Opaque(Value),
}

/// An inline markup (e.g. bold, link), referenced by markers via its
/// position in the markup registry. Attributes are flattened key/value
/// pairs, matching the wire form `["a", ["href", "https://…"]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markup {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
}

impl Markup {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attributes(
        tag: impl Into<String>,
        attributes: Vec<(String, String)>,
    ) -> Self {
        Self {
            tag: tag.into(),
            attributes,
        }
    }
}

/// Whether a marker's value is literal text or the name of an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextType {
    Text,
    Atom,
}

impl TextType {
    pub(crate) fn from_wire(tag: u64) -> Option<Self> {
        match tag {
            0 => Some(TextType::Text),
            1 => Some(TextType::Atom),
            _ => None,
        }
    }

    pub(crate) fn to_wire(self) -> u64 {
        match self {
            TextType::Text => 0,
            TextType::Atom => 1,
        }
    }
}

/// The smallest inline unit: a text (or atom) run with markup bracketing.
///
/// `markup_indexes` lists markups opened before the value is emitted, in
/// application order; `closed_markups` is how many currently-open markups
/// close after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub text_type: TextType,
    pub markup_indexes: Vec<usize>,
    pub closed_markups: usize,
    pub value: String,
}

impl Marker {
    /// A plain text marker with no markup.
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            text_type: TextType::Text,
            markup_indexes: Vec::new(),
            closed_markups: 0,
            value: value.into(),
        }
    }
}

/// Block tag of a marker section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionTag {
    P,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Blockquote,
    Aside,
}

impl SectionTag {
    pub fn from_tag_name(name: &str) -> Option<Self> {
        match name {
            "p" => Some(SectionTag::P),
            "h1" => Some(SectionTag::H1),
            "h2" => Some(SectionTag::H2),
            "h3" => Some(SectionTag::H3),
            "h4" => Some(SectionTag::H4),
            "h5" => Some(SectionTag::H5),
            "h6" => Some(SectionTag::H6),
            "blockquote" => Some(SectionTag::Blockquote),
            "aside" => Some(SectionTag::Aside),
            _ => None,
        }
    }

    pub fn tag_name(self) -> &'static str {
        match self {
            SectionTag::P => "p",
            SectionTag::H1 => "h1",
            SectionTag::H2 => "h2",
            SectionTag::H3 => "h3",
            SectionTag::H4 => "h4",
            SectionTag::H5 => "h5",
            SectionTag::H6 => "h6",
            SectionTag::Blockquote => "blockquote",
            SectionTag::Aside => "aside",
        }
    }

    /// Heading level for `h1`..`h6`, `None` for other block tags.
    pub fn heading_level(self) -> Option<usize> {
        match self {
            SectionTag::H1 => Some(1),
            SectionTag::H2 => Some(2),
            SectionTag::H3 => Some(3),
            SectionTag::H4 => Some(4),
            SectionTag::H5 => Some(5),
            SectionTag::H6 => Some(6),
            _ => None,
        }
    }
}

/// List flavor of a list section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListTag {
    Ol,
    Ul,
}

impl ListTag {
    pub fn from_tag_name(name: &str) -> Option<Self> {
        match name {
            "ol" => Some(ListTag::Ol),
            "ul" => Some(ListTag::Ul),
            _ => None,
        }
    }

    pub fn tag_name(self) -> &'static str {
        match self {
            ListTag::Ol => "ol",
            ListTag::Ul => "ul",
        }
    }
}

/// A top-level block of a document. The enum is closed so every consumer
/// (codec, renderer) dispatches exhaustively; equality is variant-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    Marker {
        tag: SectionTag,
        markers: Vec<Marker>,
    },
    List {
        tag: ListTag,
        markers: Vec<Marker>,
    },
    Image {
        src: String,
    },
    Card {
        card_index: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_defaults_version_and_atoms() {
        let doc = Mobiledoc::new(Vec::new(), Vec::new(), Vec::new());
        assert_eq!(doc.version, MOBILEDOC_VERSION);
        assert!(doc.atoms.is_empty());
    }

    #[test]
    fn equality_is_variant_sensitive() {
        let card_doc = Mobiledoc::new(
            Vec::new(),
            vec![Card::markdown("sup")],
            vec![Section::Card { card_index: 0 }],
        );
        let image_doc = Mobiledoc::new(
            Vec::new(),
            vec![Card::markdown("sup")],
            vec![Section::Image {
                src: "image!".to_string(),
            }],
        );
        assert_ne!(card_doc, image_doc);
    }

    #[test]
    fn section_tag_names_round_trip() {
        for tag in [
            SectionTag::P,
            SectionTag::H1,
            SectionTag::H2,
            SectionTag::H3,
            SectionTag::H4,
            SectionTag::H5,
            SectionTag::H6,
            SectionTag::Blockquote,
            SectionTag::Aside,
        ] {
            assert_eq!(SectionTag::from_tag_name(tag.tag_name()), Some(tag));
        }
        assert_eq!(SectionTag::from_tag_name("div"), None);
    }

    #[test]
    fn list_tag_names_round_trip() {
        assert_eq!(ListTag::from_tag_name("ol"), Some(ListTag::Ol));
        assert_eq!(ListTag::from_tag_name("ul"), Some(ListTag::Ul));
        assert_eq!(ListTag::from_tag_name("dl"), None);
    }
}
