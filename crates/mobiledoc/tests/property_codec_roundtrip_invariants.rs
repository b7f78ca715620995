use mobiledoc::{
    decode_doc, encode_doc, Atom, Card, CardPayload, ListTag, Marker, Markup, Mobiledoc, Section,
    SectionTag, TextType,
};
use serde_json::json;

#[test]
fn roundtrip_holds_for_a_document_exercising_every_variant() {
    let doc = Mobiledoc::new(
        vec![
            Markup::new("b"),
            Markup::with_attributes(
                "a",
                vec![("href".to_string(), "https://example.com/post".to_string())],
            ),
        ],
        vec![
            Card::markdown("this is a *thing*"),
            Card {
                name: "gallery".to_string(),
                payload: CardPayload::Opaque(json!({"images": ["a.png", "b.png"]})),
            },
        ],
        vec![
            Section::Card { card_index: 0 },
            Section::Image {
                src: "https://cdn.example.com/250px-010Caterpie.png".to_string(),
            },
            Section::List {
                tag: ListTag::Ol,
                markers: vec![Marker {
                    text_type: TextType::Text,
                    markup_indexes: vec![0],
                    closed_markups: 1,
                    value: "bold?".to_string(),
                }],
            },
            Section::Marker {
                tag: SectionTag::H1,
                markers: vec![Marker::text("header?")],
            },
            Section::Card { card_index: 1 },
        ],
    );

    let bytes = doc.to_json();
    let decoded = Mobiledoc::from_json(&bytes).expect("encoded document must decode");
    assert_eq!(decoded, doc);
}

#[test]
fn roundtrip_preserves_atoms_and_atom_markers() {
    let mut doc = Mobiledoc::new(
        Vec::new(),
        Vec::new(),
        vec![Section::Marker {
            tag: SectionTag::P,
            markers: vec![
                Marker::text("ping "),
                Marker {
                    text_type: TextType::Atom,
                    markup_indexes: Vec::new(),
                    closed_markups: 0,
                    value: "mention".to_string(),
                },
            ],
        }],
    );
    doc.atoms.push(Atom {
        name: "mention".to_string(),
        text: "@bob".to_string(),
        payload: json!({"id": 42}),
    });

    let decoded = Mobiledoc::from_json(&doc.to_json()).expect("atom document must decode");
    assert_eq!(decoded, doc);
}

#[test]
fn roundtrip_holds_for_seeded_documents() {
    for (i, seed) in seeds().iter().enumerate() {
        let doc = random_doc(*seed);
        let value = encode_doc(&doc);
        let decoded = decode_doc(&value)
            .unwrap_or_else(|e| panic!("seeded doc {i} must decode: {e}"));
        assert_eq!(decoded, doc, "value roundtrip mismatch seed={seed:#x}");

        let bytes = doc.to_json();
        let decoded = Mobiledoc::from_json(&bytes)
            .unwrap_or_else(|e| panic!("seeded doc {i} bytes must decode: {e}"));
        assert_eq!(decoded, doc, "byte roundtrip mismatch seed={seed:#x}");
    }
}

fn seeds() -> [u64; 12] {
    [
        0x5eed_c0de_u64,
        0x0000_0000_0000_0001_u64,
        0x0000_0000_00c0_ffee_u64,
        0x0123_4567_89ab_cdef_u64,
        0x1111_2222_3333_4444_u64,
        0x2222_3333_4444_5555_u64,
        0x4444_5555_6666_7777_u64,
        0x89ab_cdef_0123_4567_u64,
        0xfedc_ba98_7654_3210_u64,
        0x1357_9bdf_2468_ace0_u64,
        0x0f0f_f0f0_55aa_aa55_u64,
        0xa5a5_5a5a_dead_beef_u64,
    ]
}

struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_mul(6364136223846793005).wrapping_add(1),
        }
    }

    fn next(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state >> 11
    }

    fn below(&mut self, bound: usize) -> usize {
        (self.next() % bound as u64) as usize
    }
}

fn random_doc(seed: u64) -> Mobiledoc {
    let mut rng = Lcg::new(seed);
    let words = ["alpha", "beta", "gamma", "delta", "", "snow ❄", "line\nbreak"];
    let tags = [
        SectionTag::P,
        SectionTag::H1,
        SectionTag::H2,
        SectionTag::H6,
        SectionTag::Blockquote,
        SectionTag::Aside,
    ];

    let markups = (0..rng.below(3))
        .map(|i| {
            if i % 2 == 0 {
                Markup::new(["b", "i", "em"][rng.below(3)])
            } else {
                Markup::with_attributes(
                    "a",
                    vec![("href".to_string(), format!("https://example.com/{i}"))],
                )
            }
        })
        .collect::<Vec<_>>();
    let cards = (0..rng.below(3))
        .map(|i| {
            if i % 2 == 0 {
                Card::markdown(words[rng.below(words.len())])
            } else {
                Card {
                    name: format!("custom-{i}"),
                    payload: CardPayload::Opaque(json!({"n": i, "tag": words[rng.below(4)]})),
                }
            }
        })
        .collect::<Vec<_>>();

    let random_markers = |rng: &mut Lcg| {
        (0..1 + rng.below(3))
            .map(|_| {
                let markup_indexes = if markups.is_empty() {
                    Vec::new()
                } else {
                    (0..rng.below(markups.len() + 1))
                        .map(|_| rng.below(markups.len()))
                        .collect()
                };
                Marker {
                    text_type: TextType::Text,
                    closed_markups: rng.below(2),
                    markup_indexes,
                    value: words[rng.below(words.len())].to_string(),
                }
            })
            .collect::<Vec<_>>()
    };

    let sections = (0..rng.below(6))
        .map(|_| match rng.below(if cards.is_empty() { 3 } else { 4 }) {
            0 => Section::Marker {
                tag: tags[rng.below(tags.len())],
                markers: random_markers(&mut rng),
            },
            1 => Section::List {
                tag: if rng.below(2) == 0 { ListTag::Ol } else { ListTag::Ul },
                markers: random_markers(&mut rng),
            },
            2 => Section::Image {
                src: format!("https://img.example.com/{}.png", rng.below(100)),
            },
            _ => Section::Card {
                card_index: rng.below(cards.len()),
            },
        })
        .collect();

    Mobiledoc::new(markups, cards, sections)
}
