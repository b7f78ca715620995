//! Positional-array wire codec for Mobiledoc JSON.
//!
//! The wire format is not self-describing: sections, markers, cards, and
//! atoms are heterogeneous JSON arrays whose element meaning depends on a
//! leading type tag (sections) or on position alone (the rest). Each tag has
//! its own parse routine that validates arity and element types before
//! constructing anything, and the whole decode fails atomically on the first
//! error. Encoding is total and emits the canonical array forms, so
//! `decode_doc(&encode_doc(&d)) == d` for any document built from the public
//! constructors.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::doc::{
    Atom, Card, CardPayload, ListTag, Marker, Markup, Mobiledoc, Section, SectionTag, TextType,
};

const SECTION_MARKER: i64 = 1;
const SECTION_IMAGE: i64 = 2;
const SECTION_LIST: i64 = 3;
const SECTION_CARD: i64 = 10;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("document is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed document: {0}")]
    MalformedDocument(&'static str),
    #[error("unknown section type tag {tag} in section {section}")]
    UnknownSectionType { section: usize, tag: i64 },
    #[error("unknown block tag {tag:?} in section {section}")]
    UnknownTag { section: usize, tag: String },
    #[error("{registry} index {index} out of range (registry has {len}) in {context}")]
    IndexOutOfRange {
        registry: &'static str,
        index: usize,
        len: usize,
        context: String,
    },
    #[error("unsupported mobiledoc version {0:?}")]
    UnsupportedVersion(String),
    #[error("expected {expected} in {context}")]
    TypeMismatch {
        expected: &'static str,
        context: String,
    },
}

fn mismatch(expected: &'static str, context: String) -> DecodeError {
    DecodeError::TypeMismatch { expected, context }
}

impl Mobiledoc {
    /// Decode a document from UTF-8 JSON bytes.
    pub fn from_json(data: &[u8]) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_slice(data)?;
        decode_doc(&value)
    }

    /// Decode a document from a JSON string (e.g. a `mobiledoc` field
    /// extracted from a host envelope).
    pub fn from_json_str(data: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(data)?;
        decode_doc(&value)
    }

    /// Encode to UTF-8 JSON bytes. Total: every document this crate can
    /// construct has a wire form.
    pub fn to_json(&self) -> Vec<u8> {
        encode_doc(self).to_string().into_bytes()
    }
}

// ── Decode ─────────────────────────────────────────────────────────────────

pub fn decode_doc(doc: &Value) -> Result<Mobiledoc, DecodeError> {
    let obj = doc
        .as_object()
        .ok_or(DecodeError::MalformedDocument("top level is not an object"))?;

    let version = obj
        .get("version")
        .ok_or(DecodeError::MalformedDocument("missing `version`"))?
        .as_str()
        .ok_or(DecodeError::MalformedDocument("`version` is not a string"))?;
    check_version(version)?;

    let atoms = required_array(obj, "atoms", "`atoms` is not an array", "missing `atoms`")?
        .iter()
        .enumerate()
        .map(|(i, v)| decode_atom(i, v))
        .collect::<Result<Vec<_>, _>>()?;
    let cards = required_array(obj, "cards", "`cards` is not an array", "missing `cards`")?
        .iter()
        .enumerate()
        .map(|(i, v)| decode_card(i, v))
        .collect::<Result<Vec<_>, _>>()?;
    let markups = required_array(obj, "markups", "`markups` is not an array", "missing `markups`")?
        .iter()
        .enumerate()
        .map(|(i, v)| decode_markup(i, v))
        .collect::<Result<Vec<_>, _>>()?;

    // Sections are decoded last so every index reference is checked against
    // fully-built registries.
    let registries = Registries {
        atoms: &atoms,
        card_count: cards.len(),
        markup_count: markups.len(),
    };
    let sections = required_array(
        obj,
        "sections",
        "`sections` is not an array",
        "missing `sections`",
    )?
    .iter()
    .enumerate()
    .map(|(i, v)| decode_section(i, v, &registries))
    .collect::<Result<Vec<_>, _>>()?;

    Ok(Mobiledoc {
        version: version.to_string(),
        atoms,
        cards,
        markups,
        sections,
    })
}

fn required_array<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    not_array: &'static str,
    missing: &'static str,
) -> Result<&'a Vec<Value>, DecodeError> {
    obj.get(key)
        .ok_or(DecodeError::MalformedDocument(missing))?
        .as_array()
        .ok_or(DecodeError::MalformedDocument(not_array))
}

/// The 0.3 family is supported; 0.2 is a structurally incompatible revision
/// and is rejected. Anything else decodes structurally (forward-compat).
fn check_version(version: &str) -> Result<(), DecodeError> {
    if version == "0.2" || version.starts_with("0.2.") {
        return Err(DecodeError::UnsupportedVersion(version.to_string()));
    }
    Ok(())
}

struct Registries<'a> {
    atoms: &'a [Atom],
    card_count: usize,
    markup_count: usize,
}

fn decode_atom(index: usize, value: &Value) -> Result<Atom, DecodeError> {
    let context = || format!("atom {index}");
    let arr = value
        .as_array()
        .ok_or_else(|| mismatch("an array", context()))?;
    if arr.len() != 3 {
        return Err(mismatch("a 3-element [name, text, payload] array", context()));
    }
    let name = arr[0]
        .as_str()
        .ok_or_else(|| mismatch("a string atom name", context()))?;
    let text = arr[1]
        .as_str()
        .ok_or_else(|| mismatch("a string atom text", context()))?;
    if !arr[2].is_object() {
        return Err(mismatch("an object atom payload", context()));
    }
    Ok(Atom {
        name: name.to_string(),
        text: text.to_string(),
        payload: arr[2].clone(),
    })
}

fn decode_card(index: usize, value: &Value) -> Result<Card, DecodeError> {
    let context = || format!("card {index}");
    let arr = value
        .as_array()
        .ok_or_else(|| mismatch("an array", context()))?;
    if arr.len() != 2 {
        return Err(mismatch("a 2-element [name, payload] array", context()));
    }
    let name = arr[0]
        .as_str()
        .ok_or_else(|| mismatch("a string card name", context()))?;
    let payload = arr[1]
        .as_object()
        .ok_or_else(|| mismatch("an object card payload", context()))?;
    // Recognized card names are decoded eagerly to a typed payload; others
    // stay opaque and re-encode verbatim.
    let payload = match name {
        "markdown" => CardPayload::Markdown(
            payload
                .get("markdown")
                .and_then(Value::as_str)
                .ok_or_else(|| mismatch("a string `markdown` payload field", context()))?
                .to_string(),
        ),
        _ => CardPayload::Opaque(arr[1].clone()),
    };
    Ok(Card {
        name: name.to_string(),
        payload,
    })
}

fn decode_markup(index: usize, value: &Value) -> Result<Markup, DecodeError> {
    let context = || format!("markup {index}");
    // Bare-string shorthand for an attributeless markup.
    if let Some(tag) = value.as_str() {
        return Ok(Markup::new(tag));
    }
    let arr = value
        .as_array()
        .ok_or_else(|| mismatch("a string or [tag, attributes?] array", context()))?;
    if arr.is_empty() || arr.len() > 2 {
        return Err(mismatch("a 1- or 2-element [tag, attributes?] array", context()));
    }
    let tag = arr[0]
        .as_str()
        .ok_or_else(|| mismatch("a string markup tag", context()))?;
    let mut attributes = Vec::new();
    if let Some(attrs) = arr.get(1) {
        let attrs = attrs
            .as_array()
            .ok_or_else(|| mismatch("an attribute array", context()))?;
        if attrs.len() % 2 != 0 {
            return Err(mismatch("an even-length attribute array", context()));
        }
        for pair in attrs.chunks(2) {
            let key = pair[0]
                .as_str()
                .ok_or_else(|| mismatch("a string attribute key", context()))?;
            let val = pair[1]
                .as_str()
                .ok_or_else(|| mismatch("a string attribute value", context()))?;
            attributes.push((key.to_string(), val.to_string()));
        }
    }
    Ok(Markup::with_attributes(tag, attributes))
}

fn decode_section(
    index: usize,
    value: &Value,
    registries: &Registries<'_>,
) -> Result<Section, DecodeError> {
    let context = || format!("section {index}");
    let arr = value
        .as_array()
        .ok_or_else(|| mismatch("an array", context()))?;
    let tag = arr
        .first()
        .ok_or_else(|| mismatch("a non-empty array", context()))?
        .as_i64()
        .ok_or_else(|| mismatch("an integer section type tag", context()))?;
    match tag {
        SECTION_MARKER => {
            if arr.len() != 3 {
                return Err(mismatch("a 3-element marker section", context()));
            }
            let tag_name = arr[1]
                .as_str()
                .ok_or_else(|| mismatch("a string block tag", context()))?;
            let tag = SectionTag::from_tag_name(tag_name).ok_or_else(|| {
                DecodeError::UnknownTag {
                    section: index,
                    tag: tag_name.to_string(),
                }
            })?;
            Ok(Section::Marker {
                tag,
                markers: decode_markers(index, &arr[2], registries)?,
            })
        }
        SECTION_IMAGE => {
            if arr.len() != 2 {
                return Err(mismatch("a 2-element image section", context()));
            }
            let src = arr[1]
                .as_str()
                .ok_or_else(|| mismatch("a string image src", context()))?;
            Ok(Section::Image {
                src: src.to_string(),
            })
        }
        SECTION_LIST => {
            if arr.len() != 3 {
                return Err(mismatch("a 3-element list section", context()));
            }
            let tag_name = arr[1]
                .as_str()
                .ok_or_else(|| mismatch("a string list tag", context()))?;
            let tag = ListTag::from_tag_name(tag_name).ok_or_else(|| DecodeError::UnknownTag {
                section: index,
                tag: tag_name.to_string(),
            })?;
            Ok(Section::List {
                tag,
                markers: decode_markers(index, &arr[2], registries)?,
            })
        }
        SECTION_CARD => {
            if arr.len() != 2 {
                return Err(mismatch("a 2-element card section", context()));
            }
            let card_index = arr[1]
                .as_u64()
                .ok_or_else(|| mismatch("an integer card index", context()))?
                as usize;
            if card_index >= registries.card_count {
                return Err(DecodeError::IndexOutOfRange {
                    registry: "card",
                    index: card_index,
                    len: registries.card_count,
                    context: context(),
                });
            }
            Ok(Section::Card { card_index })
        }
        other => Err(DecodeError::UnknownSectionType {
            section: index,
            tag: other,
        }),
    }
}

fn decode_markers(
    section: usize,
    value: &Value,
    registries: &Registries<'_>,
) -> Result<Vec<Marker>, DecodeError> {
    let markers = value
        .as_array()
        .ok_or_else(|| mismatch("a marker array", format!("section {section}")))?;
    markers
        .iter()
        .enumerate()
        .map(|(i, v)| decode_marker(section, i, v, registries))
        .collect()
}

fn decode_marker(
    section: usize,
    index: usize,
    value: &Value,
    registries: &Registries<'_>,
) -> Result<Marker, DecodeError> {
    let context = || format!("section {section} marker {index}");
    let arr = value
        .as_array()
        .ok_or_else(|| mismatch("an array", context()))?;
    if arr.len() != 4 {
        return Err(mismatch(
            "a 4-element [textType, markupIndexes, closedMarkups, value] array",
            context(),
        ));
    }
    let text_type = arr[0]
        .as_u64()
        .and_then(TextType::from_wire)
        .ok_or_else(|| mismatch("a text type tag of 0 or 1", context()))?;
    let markup_indexes = arr[1]
        .as_array()
        .ok_or_else(|| mismatch("a markup index array", context()))?
        .iter()
        .map(|v| {
            let markup_index = v
                .as_u64()
                .ok_or_else(|| mismatch("an integer markup index", context()))?
                as usize;
            if markup_index >= registries.markup_count {
                return Err(DecodeError::IndexOutOfRange {
                    registry: "markup",
                    index: markup_index,
                    len: registries.markup_count,
                    context: context(),
                });
            }
            Ok(markup_index)
        })
        .collect::<Result<Vec<_>, _>>()?;
    let closed_markups = arr[2]
        .as_u64()
        .ok_or_else(|| mismatch("an integer closed-markup count", context()))?
        as usize;
    let value = match text_type {
        TextType::Text => arr[3]
            .as_str()
            .ok_or_else(|| mismatch("a string marker value", context()))?
            .to_string(),
        // Atom markers carry either the atom's name or its registry index;
        // the index form is resolved to the name here.
        TextType::Atom => {
            if let Some(atom_index) = arr[3].as_u64() {
                let atom_index = atom_index as usize;
                registries
                    .atoms
                    .get(atom_index)
                    .map(|atom| atom.name.clone())
                    .ok_or(DecodeError::IndexOutOfRange {
                        registry: "atom",
                        index: atom_index,
                        len: registries.atoms.len(),
                        context: context(),
                    })?
            } else {
                arr[3]
                    .as_str()
                    .ok_or_else(|| mismatch("an atom name or index", context()))?
                    .to_string()
            }
        }
    };
    Ok(Marker {
        text_type,
        markup_indexes,
        closed_markups,
        value,
    })
}

// ── Encode ─────────────────────────────────────────────────────────────────

pub fn encode_doc(doc: &Mobiledoc) -> Value {
    let mut obj = Map::new();
    obj.insert("version".to_string(), Value::String(doc.version.clone()));
    obj.insert(
        "atoms".to_string(),
        Value::Array(doc.atoms.iter().map(encode_atom).collect()),
    );
    obj.insert(
        "cards".to_string(),
        Value::Array(doc.cards.iter().map(encode_card).collect()),
    );
    obj.insert(
        "markups".to_string(),
        Value::Array(doc.markups.iter().map(encode_markup).collect()),
    );
    obj.insert(
        "sections".to_string(),
        Value::Array(doc.sections.iter().map(encode_section).collect()),
    );
    Value::Object(obj)
}

fn encode_atom(atom: &Atom) -> Value {
    Value::Array(vec![
        Value::String(atom.name.clone()),
        Value::String(atom.text.clone()),
        atom.payload.clone(),
    ])
}

fn encode_card(card: &Card) -> Value {
    let payload = match &card.payload {
        CardPayload::Markdown(markdown) => {
            let mut obj = Map::new();
            obj.insert("markdown".to_string(), Value::String(markdown.clone()));
            Value::Object(obj)
        }
        CardPayload::Opaque(raw) => raw.clone(),
    };
    Value::Array(vec![Value::String(card.name.clone()), payload])
}

fn encode_markup(markup: &Markup) -> Value {
    let mut out = vec![Value::String(markup.tag.clone())];
    if !markup.attributes.is_empty() {
        let mut attrs = Vec::with_capacity(markup.attributes.len() * 2);
        for (key, val) in &markup.attributes {
            attrs.push(Value::String(key.clone()));
            attrs.push(Value::String(val.clone()));
        }
        out.push(Value::Array(attrs));
    }
    Value::Array(out)
}

fn encode_section(section: &Section) -> Value {
    match section {
        Section::Marker { tag, markers } => Value::Array(vec![
            Value::from(SECTION_MARKER),
            Value::from(tag.tag_name()),
            Value::Array(markers.iter().map(encode_marker).collect()),
        ]),
        Section::List { tag, markers } => Value::Array(vec![
            Value::from(SECTION_LIST),
            Value::from(tag.tag_name()),
            Value::Array(markers.iter().map(encode_marker).collect()),
        ]),
        Section::Image { src } => Value::Array(vec![
            Value::from(SECTION_IMAGE),
            Value::String(src.clone()),
        ]),
        Section::Card { card_index } => Value::Array(vec![
            Value::from(SECTION_CARD),
            Value::from(*card_index as u64),
        ]),
    }
}

fn encode_marker(marker: &Marker) -> Value {
    Value::Array(vec![
        Value::from(marker.text_type.to_wire()),
        Value::Array(
            marker
                .markup_indexes
                .iter()
                .map(|i| Value::from(*i as u64))
                .collect(),
        ),
        Value::from(marker.closed_markups as u64),
        Value::String(marker.value.clone()),
    ])
}
