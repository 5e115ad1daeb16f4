//! Property-based tests over generated node trees and builder configs.
//!
//! Trees are generated with placeholder names and renamed afterwards so that every
//! sibling list is unique. Each schema also carries an `anchor` field that
//! generated pointers refer to.

use indexmap::IndexMap;
use proptest::prelude::*;
use schema_token::{
    base64url, meta, to_config, to_wire, CodecOptions, ConfigKind, EnumNode, FieldConfig, Node,
    Schema,
};

const ANCHOR: &str = "anchor";

fn options_named(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{}{}", prefix, i)).collect()
}

fn leaf() -> impl Strategy<Value = Node> {
    prop_oneof![
        Just(Node::bool("x")),
        (any::<i32>(), any::<i32>()).prop_map(|(a, b)| Node::Int {
            name: "x".to_string(),
            min: i64::from(a.min(b)),
            max: i64::from(a.max(b)),
        }),
        (
            -100_000i64..100_000,
            0i64..100_000,
            prop::sample::select(vec![0.01, 0.1, 0.25, 0.5, 1.0, 2.5])
        )
            .prop_map(|(low, span, precision)| Node::Fixed {
                name: "x".to_string(),
                min: low as f64 / 100.0,
                max: (low + span) as f64 / 100.0,
                precision,
            }),
        (1usize..5).prop_map(|n| Node::Enum(EnumNode {
            name: "x".to_string(),
            options: options_named("o", n),
        })),
        (0u32..3, 0u32..5, 1usize..4).prop_map(|(min, extra, n)| Node::EnumArray {
            name: "x".to_string(),
            min_length: min,
            max_length: min + extra,
            enumeration: EnumNode {
                name: "x".to_string(),
                options: options_named("o", n),
            },
        }),
        Just(Node::pointer("x", ANCHOR)),
    ]
}

fn tree() -> impl Strategy<Value = Node> {
    // three recursion levels keep every tree within the default depth of 5
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(|n| Node::optional("x", n)),
            (0u32..3, 0u32..5, inner.clone()).prop_map(|(min, extra, item)| Node::Array {
                name: "x".to_string(),
                min_length: min,
                max_length: min + extra,
                item: Box::new(item),
            }),
            prop::collection::vec(inner.clone(), 0..4).prop_map(|fields| Node::Object {
                name: "x".to_string(),
                fields,
            }),
            prop::collection::vec(prop::collection::vec(inner, 0..3), 1..4).prop_map(|lists| {
                let options = options_named("v", lists.len());
                let variants: IndexMap<String, Vec<Node>> =
                    options.iter().cloned().zip(lists).collect();
                Node::Union {
                    name: "x".to_string(),
                    discriminator: EnumNode {
                        name: "x".to_string(),
                        options,
                    },
                    variants,
                }
            }),
        ]
    })
}

fn fresh(next: &mut usize) -> String {
    *next += 1;
    format!("f{}", next)
}

fn rename(node: &mut Node, next: &mut usize) {
    match node {
        Node::Bool { name } | Node::Int { name, .. } | Node::Fixed { name, .. } => {
            *name = fresh(next);
        }
        Node::Pointer { name, .. } => *name = fresh(next),
        Node::Enum(e) => e.name = fresh(next),
        Node::EnumArray {
            name, enumeration, ..
        } => {
            *name = fresh(next);
            enumeration.name = fresh(next);
        }
        Node::Optional { name, inner } => {
            *name = fresh(next);
            rename(inner, next);
        }
        Node::Array { name, item, .. } => {
            *name = fresh(next);
            rename(item, next);
        }
        Node::Object { name, fields } => {
            *name = fresh(next);
            for field in fields {
                rename(field, next);
            }
        }
        Node::Union {
            name,
            discriminator,
            variants,
        } => {
            *name = fresh(next);
            discriminator.name = fresh(next);
            for field in variants.values_mut().flatten() {
                rename(field, next);
            }
        }
    }
}

fn schema_fields() -> impl Strategy<Value = Vec<Node>> {
    prop::collection::vec(tree(), 0..4).prop_map(|mut fields| {
        let mut next = 0;
        for field in &mut fields {
            rename(field, &mut next);
        }
        fields.insert(0, Node::bool(ANCHOR));
        fields
    })
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn leaf_config() -> impl Strategy<Value = ConfigKind> {
    prop_oneof![
        Just(ConfigKind::Bool),
        (
            proptest::option::of(-1000i64..1000),
            proptest::option::of(-1000i64..1000)
        )
            .prop_map(|(min, max)| ConfigKind::Int { min, max }),
        (
            proptest::option::of(-100i64..100),
            proptest::option::of(prop::sample::select(vec![0.1, 0.5, 1.0]))
        )
            .prop_map(|(min, precision)| ConfigKind::Fixed {
                min: min.map(|m| m as f64),
                max: None,
                precision,
            }),
        proptest::option::of(1usize..4).prop_map(|n| ConfigKind::Enum {
            options: n.map(|n| options_named("o", n)),
        }),
        (proptest::option::of(0u32..4), proptest::option::of(1usize..3)).prop_map(
            |(max_length, n)| ConfigKind::EnumArray {
                min_length: None,
                max_length,
                enum_name: None,
                options: n.map(|n| options_named("o", n)),
            }
        ),
        proptest::option::of(Just("target".to_string()))
            .prop_map(|target_name| ConfigKind::Pointer { target_name }),
    ]
}

fn config() -> impl Strategy<Value = FieldConfig> {
    let leaf = leaf_config().prop_map(|kind| FieldConfig::new("c", kind));
    leaf.prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            proptest::option::of(inner.clone()).prop_map(|inner| FieldConfig::new(
                "c",
                ConfigKind::Optional {
                    inner: inner.map(Box::new),
                }
            )),
            proptest::option::of(inner.clone()).prop_map(|item| FieldConfig::new(
                "c",
                ConfigKind::Array {
                    min_length: None,
                    max_length: Some(3),
                    item: item.map(Box::new),
                }
            )),
            prop::collection::vec(inner.clone(), 0..3)
                .prop_map(|fields| FieldConfig::new("c", ConfigKind::Object { fields })),
            prop::collection::vec(inner, 0..2).prop_map(|fields| {
                let mut variants = IndexMap::new();
                variants.insert("a".to_string(), fields);
                FieldConfig::new(
                    "c",
                    ConfigKind::Union {
                        discriminator_name: None,
                        options: Some(vec!["a".to_string(), "b".to_string()]),
                        variants,
                    },
                )
            }),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_packed_round_trip(fields in schema_fields()) {
        let options = CodecOptions::default();
        let token = meta::encode_schema("generated", &fields, &options).unwrap();
        prop_assert!(token.chars().all(base64url::is_alphabet));
        let schema = meta::decode_schema(&token, &options).unwrap();
        prop_assert_eq!(schema, Schema::new("generated", fields));
    }

    #[test]
    fn prop_compressed_round_trip(fields in schema_fields()) {
        let schema = runtime().block_on(async {
            let token = schema_token::encode_compressed("generated", &fields).await.unwrap();
            schema_token::decode_compressed(&token).await.unwrap()
        });
        prop_assert_eq!(schema, Schema::new("generated", fields));
    }

    #[test]
    fn prop_string_table_is_deterministic(fields in schema_fields()) {
        let first = meta::string_table("generated", &fields).unwrap();
        let second = meta::string_table("generated", &fields).unwrap();
        prop_assert_eq!(first.iter().collect::<Vec<_>>(), second.iter().collect::<Vec<_>>());
    }

    #[test]
    fn prop_conversion_is_idempotent(c in config()) {
        let once = to_config(&to_wire(&c));
        let twice = to_config(&to_wire(&once));
        prop_assert_eq!(twice.without_ids(), once.without_ids());
    }

    #[test]
    fn prop_wire_round_trips_through_config(fields in schema_fields()) {
        for field in &fields {
            prop_assert_eq!(&to_wire(&to_config(field)), field);
        }
    }

    #[test]
    fn prop_base64url_round_trip(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let text = base64url::encode(&bytes);
        prop_assert!(!text.contains('='));
        prop_assert_eq!(base64url::decode(&text).unwrap(), bytes);
    }
}
