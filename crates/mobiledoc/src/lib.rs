//! mobiledoc — codec and rendering for the Mobiledoc rich-text format.
//!
//! Mobiledoc encodes structured posts as compact, versioned JSON built from
//! positional arrays: sections, markers, cards, and atoms are heterogeneous
//! arrays whose element meaning depends on a leading type tag. This crate
//! provides:
//!
//! - the typed document model ([`doc`]): registries plus a closed section
//!   enum, with variant-sensitive equality;
//! - the bidirectional wire codec ([`codec`]): per-tag positional parsing
//!   that fails closed on the first malformed element, and a total encoder
//!   that is its exact inverse for documents built from the public
//!   constructors;
//! - a Markdown renderer ([`markdown`]): a total, best-effort flattening
//!   where unrecognized content degrades to empty output.
//!
//! All operations are pure, synchronous functions over in-memory values;
//! independent decodes, encodes, and renders need no coordination.

pub mod codec;
pub mod doc;
pub mod markdown;

pub use codec::{decode_doc, encode_doc, DecodeError};
pub use doc::{
    Atom, Card, CardPayload, ListTag, Marker, Markup, Mobiledoc, Section, SectionTag, TextType,
    MOBILEDOC_VERSION,
};
pub use markdown::render_markdown;
