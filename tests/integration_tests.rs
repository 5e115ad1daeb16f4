use schema_token::{
    base64url, bitpack, decode_compressed, decode_packed, default_object, default_value,
    default_when_present, encode_compressed, encode_packed, meta, value, CodecOptions, EnumNode,
    Error, Node, NodeKind, Schema, SchemaFile, Value,
};

fn union_action() -> Node {
    Node::union(
        "action",
        EnumNode::new("type", ["start", "stop"]).unwrap(),
        vec![
            ("start".to_string(), vec![Node::int("delay", 0, 60).unwrap()]),
            ("stop".to_string(), vec![Node::bool("force")]),
        ],
    )
    .unwrap()
}

fn offset() -> Node {
    Node::object(
        "offset",
        vec![
            Node::int("start", -256, 255).unwrap(),
            Node::int("end", -256, 255).unwrap(),
        ],
    )
    .unwrap()
}

/// One field of every kind, with a pointer back into the tree.
fn everything() -> Vec<Node> {
    vec![
        Node::bool("enabled"),
        Node::int("count", 0, 100).unwrap(),
        Node::fixed("ratio", -1.0, 1.0, 0.05).unwrap(),
        Node::enumeration("status", ["pending", "active", "completed"]).unwrap(),
        Node::optional("age", Node::int("ageValue", 0, 120).unwrap()),
        Node::array("scores", 1, 8, Node::int("score", 0, 10).unwrap()).unwrap(),
        Node::enum_array("tags", 0, 3, EnumNode::new("tag", ["red", "green"]).unwrap()).unwrap(),
        offset(),
        union_action(),
        Node::optional("previous", Node::pointer("again", "offset")),
    ]
}

fn packed_round_trip(name: &str, fields: &[Node]) -> Schema {
    let token = encode_packed(name, fields).unwrap();
    println!("{} packed: {}", name, token);
    decode_packed(&token).unwrap()
}

async fn compressed_round_trip(name: &str, fields: &[Node]) -> Schema {
    let token = encode_compressed(name, fields).await.unwrap();
    println!("{} compressed: {}", name, token);
    decode_compressed(&token).await.unwrap()
}

#[tokio::test]
async fn test_bool_alone() {
    let fields = vec![Node::bool("enabled")];
    for schema in [
        packed_round_trip("s", &fields),
        compressed_round_trip("s", &fields).await,
    ] {
        assert_eq!(schema.fields.len(), 1);
        assert_eq!(schema.fields[0].name(), "enabled");
        assert_eq!(schema.fields[0].kind(), NodeKind::Bool);
    }
}

#[tokio::test]
async fn test_int_bounds() {
    let fields = vec![Node::int("count", 0, 100).unwrap()];
    for schema in [
        packed_round_trip("s", &fields),
        compressed_round_trip("s", &fields).await,
    ] {
        match &schema.fields[0] {
            Node::Int { name, min, max } => {
                assert_eq!(name, "count");
                assert_eq!((*min, *max), (0, 100));
            }
            other => panic!("Expected int, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_enum_options_in_order() {
    let fields = vec![Node::enumeration("status", ["pending", "active", "completed"]).unwrap()];
    for schema in [
        packed_round_trip("s", &fields),
        compressed_round_trip("s", &fields).await,
    ] {
        match &schema.fields[0] {
            Node::Enum(e) => assert_eq!(e.options, vec!["pending", "active", "completed"]),
            other => panic!("Expected enum, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_object_fields() {
    let fields = vec![offset()];
    for schema in [
        packed_round_trip("range", &fields),
        compressed_round_trip("range", &fields).await,
    ] {
        match &schema.fields[0] {
            Node::Object { fields, .. } => {
                let names: Vec<_> = fields.iter().map(Node::name).collect();
                assert_eq!(names, vec!["start", "end"]);
                assert_eq!(fields[0], Node::int("start", -256, 255).unwrap());
                assert_eq!(fields[1], Node::int("end", -256, 255).unwrap());
            }
            other => panic!("Expected object, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_union_variants() {
    let fields = vec![union_action()];
    for schema in [
        packed_round_trip("s", &fields),
        compressed_round_trip("s", &fields).await,
    ] {
        match &schema.fields[0] {
            Node::Union {
                discriminator,
                variants,
                ..
            } => {
                assert_eq!(discriminator.name, "type");
                assert_eq!(variants["start"], vec![Node::int("delay", 0, 60).unwrap()]);
                assert_eq!(variants["stop"], vec![Node::bool("force")]);
            }
            other => panic!("Expected union, got {:?}", other),
        }
    }
}

#[test]
fn test_optional_defaults() {
    let fields = vec![Node::optional("age", Node::int("ageValue", 0, 120).unwrap())];
    assert_eq!(Value::Object(default_object(&fields)), value!({"age": null}));
    assert_eq!(default_when_present(&fields[0]), Value::Int(0));
}

#[tokio::test]
async fn test_every_kind_round_trips() {
    let fields = everything();
    assert_eq!(packed_round_trip("all", &fields), Schema::new("all", fields.clone()));
    assert_eq!(
        compressed_round_trip("all", &fields).await,
        Schema::new("all", fields)
    );
}

#[tokio::test]
async fn test_depth_bound() {
    let mut node = Node::int("leaf", 0, 1).unwrap();
    for i in 0..7 {
        node = Node::array(&format!("level{}", i), 0, 2, node).unwrap();
    }
    let fields = vec![node];

    match encode_packed("deep", &fields).unwrap_err() {
        err @ Error::DepthExceeded { .. } => {
            assert!(err.to_string().contains("maximum depth of 5"));
        }
        other => panic!("Expected depth error, got {:?}", other),
    }
    assert_eq!(compressed_round_trip("deep", &fields).await.fields, fields);
}

#[tokio::test]
async fn test_tokens_use_url_safe_alphabet() {
    let fields = everything();
    let packed = encode_packed("all", &fields).unwrap();
    let compressed = encode_compressed("all", &fields).await.unwrap();
    for token in [packed, compressed] {
        assert!(!token.is_empty());
        assert!(token.chars().all(base64url::is_alphabet), "{}", token);
        assert!(!token.contains('='));
    }
}

#[test]
fn test_string_table_is_deterministic() {
    let fields = everything();
    let first = meta::string_table("all", &fields).unwrap();
    let second = meta::string_table("all", &fields).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.get(0).unwrap(), "all");
    assert_eq!(first.index_of("offset"), second.index_of("offset"));
    assert_eq!(
        encode_packed("all", &fields).unwrap(),
        encode_packed("all", &fields).unwrap()
    );
}

#[test]
fn test_packed_is_smaller_than_compressed_for_small_schemas() {
    let fields = vec![Node::bool("enabled"), Node::int("count", 0, 100).unwrap()];
    let packed = encode_packed("s", &fields).unwrap();
    let json = serde_json::to_vec(&Schema::new("s", fields)).unwrap();
    assert!(packed.len() < base64url::encode(&json).len());
}

#[test]
fn test_corrupt_packed_token() {
    let token = "!!not-a-token";
    match decode_packed(token).unwrap_err() {
        Error::CorruptToken { token: echoed, .. } => assert_eq!(echoed, token),
        other => panic!("Expected corrupt token, got {:?}", other),
    }
}

#[test]
fn test_truncated_packed_token() {
    let token = encode_packed("all", &everything()).unwrap();
    let truncated = &token[..token.len() / 2];
    assert!(matches!(
        decode_packed(truncated),
        Err(Error::CorruptToken { .. })
    ));
}

#[tokio::test]
async fn test_corrupt_compressed_token() {
    assert!(matches!(
        decode_compressed("AAAA").await,
        Err(Error::CorruptToken { .. })
    ));
}

#[test]
fn test_decode_failure_falls_back_to_defaults() {
    let fields = vec![offset(), Node::bool("enabled")];
    let options = CodecOptions::default();
    let data = bitpack::decode(&fields, "@@@", &options)
        .unwrap_or_else(|_| Value::Object(default_object(&fields)));
    assert_eq!(
        data,
        value!({"offset": {"start": (-256), "end": (-256)}, "enabled": false})
    );
}

#[test]
fn test_recursive_schema_packs_data() {
    let list = Node::object(
        "list",
        vec![
            Node::int("head", 0, 9).unwrap(),
            Node::optional("tail", Node::pointer("rest", "list")),
        ],
    )
    .unwrap();
    let fields = vec![list];
    let schema = packed_round_trip("linked", &fields);
    assert_eq!(schema.fields, fields);

    let data = value!({"list": {"head": 1, "tail": {"head": 2, "tail": null}}});
    let options = CodecOptions::default();
    let token = bitpack::encode(&schema.fields, &data, &options).unwrap();
    assert_eq!(bitpack::decode(&schema.fields, &token, &options).unwrap(), data);
}

/// Variants listed in a different order from the discriminator options.
const REORDERED_UNION: &str = r#"{
    "name": "s",
    "fields": [{
        "type": "union",
        "name": "action",
        "discriminator": {"name": "type", "options": ["start", "stop"]},
        "variants": {
            "stop": [{"type": "bool", "name": "force"}],
            "start": [{"type": "int", "name": "delay", "min": 0, "max": 60}]
        }
    }]
}"#;

#[tokio::test]
async fn test_imported_union_keeps_variants_with_their_options() {
    let schema = REORDERED_UNION.parse::<SchemaFile>().unwrap().into_schema();
    let union = &schema.fields[0];

    for decoded in [
        packed_round_trip("s", &schema.fields),
        compressed_round_trip("s", &schema.fields).await,
    ] {
        match &decoded.fields[0] {
            Node::Union { variants, .. } => {
                assert_eq!(variants["start"], vec![Node::int("delay", 0, 60).unwrap()]);
                assert_eq!(variants["stop"], vec![Node::bool("force")]);
            }
            other => panic!("Expected union, got {:?}", other),
        }
        assert_eq!(&decoded.fields[0], union);
    }

    assert_eq!(default_value(union), value!({"type": "start", "delay": 0}));

    let options = CodecOptions::default();
    for data in [
        value!({"action": {"type": "start", "delay": 30}}),
        value!({"action": {"type": "stop", "force": true}}),
    ] {
        let token = bitpack::encode(&schema.fields, &data, &options).unwrap();
        assert_eq!(bitpack::decode(&schema.fields, &token, &options).unwrap(), data);
    }
}
