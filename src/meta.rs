//! Bit-packed schema tokens.
//!
//! A schema is turned into data and packed with [`crate::bitpack`] against a fixed
//! *meta-schema*: a schema whose fields describe schemas. Every nested node in the
//! meta-schema is a union over the node kinds, and each nesting step goes one level
//! down. The levels are unrolled up to [`CodecOptions::max_depth`]; the innermost
//! level only offers leaf kinds. Trees deeper than that cannot be represented and
//! are rejected before anything is written.
//!
//! Names and enum options are replaced by indices into a [`StringTable`] that
//! travels in the same token. The schema name is always entry 0; the remaining
//! entries appear in the order a pre-order walk of the fields first meets them.
//!
//! The top-level payload is:
//!
//! ```text
//! meta:    { version }
//! fields:  [node, ...]
//! strings: [byte, ...]   // StringTable::to_bytes
//! ```
//!
//! ## Examples
//!
//! ```rust
//! use schema_token::{meta, CodecOptions, Node};
//!
//! let fields = vec![Node::enumeration("status", ["pending", "active", "completed"]).unwrap()];
//! let options = CodecOptions::default();
//!
//! let token = meta::encode_schema("tasks", &fields, &options).unwrap();
//! let schema = meta::decode_schema(&token, &options).unwrap();
//! assert_eq!(schema.name, "tasks");
//! assert_eq!(schema.fields, fields);
//! ```

use crate::node::{variants_in_order, EnumNode, Node, NodeKind, Schema};
use once_cell::sync::{Lazy, OnceCell};

use crate::bitpack::{self, Steps};
use crate::strings::StringTable;
use crate::{CodecOptions, Error, Result, Value, ValueMap};

/// Version written into every token; decoding rejects any other value.
pub const VERSION: i64 = 1;

/// Largest supported [`CodecOptions::max_depth`]. Each level multiplies the size
/// of the meta-schema by four.
pub const MAX_DEPTH: usize = 7;

const MAX_FIELDS: u32 = 255;
const MAX_OPTIONS: u32 = 256;
const MAX_LENGTH: i64 = 65_535;
const MAX_TABLE_INDEX: i64 = 4_095;
const MAX_TABLE_BYTES: u32 = 65_535;
const FIXED_LIMIT: f64 = 1e9;
const FIXED_RESOLUTION: f64 = 1e-4;
const MAX_PRECISION: f64 = 1e6;

const KIND: &str = "kind";

fn index(name: &str) -> Node {
    Node::Int {
        name: name.to_string(),
        min: 0,
        max: MAX_TABLE_INDEX,
    }
}

fn index_list(name: &str) -> Node {
    Node::Array {
        name: name.to_string(),
        min_length: 1,
        max_length: MAX_OPTIONS,
        item: Box::new(index("option")),
    }
}

fn length(name: &str) -> Node {
    Node::Int {
        name: name.to_string(),
        min: 0,
        max: MAX_LENGTH,
    }
}

fn int_bound(name: &str) -> Node {
    Node::Int {
        name: name.to_string(),
        min: i64::from(i32::MIN),
        max: i64::from(i32::MAX),
    }
}

fn fixed_bound(name: &str) -> Node {
    Node::Fixed {
        name: name.to_string(),
        min: -FIXED_LIMIT,
        max: FIXED_LIMIT,
        precision: FIXED_RESOLUTION,
    }
}

fn node_list(name: &str, level: usize, max_depth: usize) -> Node {
    Node::Array {
        name: name.to_string(),
        min_length: 0,
        max_length: MAX_FIELDS,
        item: Box::new(node_union("field", level, max_depth)),
    }
}

/// Payload fields of one node kind at `level`. Nested nodes live at `level + 1`.
fn kind_fields(kind: NodeKind, level: usize, max_depth: usize) -> Vec<Node> {
    let below = level + 1;
    let mut fields = vec![index("name")];
    match kind {
        NodeKind::Bool => {}
        NodeKind::Int => {
            fields.push(int_bound("min"));
            fields.push(int_bound("max"));
        }
        NodeKind::Fixed => {
            fields.push(fixed_bound("min"));
            fields.push(fixed_bound("max"));
            fields.push(Node::Fixed {
                name: "precision".to_string(),
                min: FIXED_RESOLUTION,
                max: MAX_PRECISION,
                precision: FIXED_RESOLUTION,
            });
        }
        NodeKind::Enum => fields.push(index_list("options")),
        NodeKind::Optional => fields.push(node_union("inner", below, max_depth)),
        NodeKind::Array => {
            fields.push(length("minLength"));
            fields.push(length("maxLength"));
            fields.push(node_union("item", below, max_depth));
        }
        NodeKind::EnumArray => {
            fields.push(length("minLength"));
            fields.push(length("maxLength"));
            fields.push(index("enumName"));
            fields.push(index_list("options"));
        }
        NodeKind::Object => fields.push(node_list("fields", below, max_depth)),
        NodeKind::Union => {
            fields.push(index("discriminatorName"));
            fields.push(index_list("options"));
            fields.push(Node::Array {
                name: "variants".to_string(),
                min_length: 1,
                max_length: MAX_OPTIONS,
                item: Box::new(node_list("variant", below, max_depth)),
            });
        }
        NodeKind::Pointer => fields.push(index("targetName")),
    }
    fields
}

/// The union describing one node at `level` (1 is top level).
fn node_union(name: &str, level: usize, max_depth: usize) -> Node {
    let kinds: Vec<NodeKind> = NodeKind::ALL
        .into_iter()
        .filter(|kind| level < max_depth || !kind.is_container())
        .collect();
    Node::Union {
        name: name.to_string(),
        discriminator: EnumNode {
            name: KIND.to_string(),
            options: kinds.iter().map(|kind| kind.tag().to_string()).collect(),
        },
        variants: kinds
            .iter()
            .map(|kind| (kind.tag().to_string(), kind_fields(*kind, level, max_depth)))
            .collect(),
    }
}

/// Builds the meta-schema for trees up to `max_depth` levels deep.
#[must_use]
pub fn meta_schema(max_depth: usize) -> Vec<Node> {
    vec![
        Node::Object {
            name: "meta".to_string(),
            fields: vec![Node::Int {
                name: "version".to_string(),
                min: 0,
                max: 255,
            }],
        },
        node_list("fields", 1, max_depth),
        Node::Array {
            name: "strings".to_string(),
            min_length: 0,
            max_length: MAX_TABLE_BYTES,
            item: Box::new(Node::Int {
                name: "byte".to_string(),
                min: 0,
                max: 255,
            }),
        },
    ]
}

static META_SCHEMAS: Lazy<Vec<OnceCell<Vec<Node>>>> =
    Lazy::new(|| (0..=MAX_DEPTH).map(|_| OnceCell::new()).collect());

/// The meta-schema for `max_depth`, built on first use and shared afterwards.
///
/// Fails with [`Error::OutOfBounds`] above [`MAX_DEPTH`].
pub fn shared_meta_schema(max_depth: usize) -> Result<&'static [Node]> {
    let cell = META_SCHEMAS.get(max_depth).ok_or_else(|| {
        Error::out_of_bounds(
            "max_depth",
            format!(
                "{} exceeds the largest supported depth of {}",
                max_depth, MAX_DEPTH
            ),
        )
    })?;
    let schema = cell.get_or_init(|| {
        tracing::debug!(max_depth, "building meta-schema");
        meta_schema(max_depth)
    });
    Ok(schema.as_slice())
}

fn check_fixed(field: &str, value: f64) -> Result<Value> {
    let steps = Steps::new(FIXED_RESOLUTION);
    if steps.value(steps.of(value)) != value {
        return Err(Error::out_of_bounds(
            field,
            format!(
                "{:?} is not a multiple of {} and would not decode to the same value",
                value, FIXED_RESOLUTION
            ),
        ));
    }
    Ok(Value::Fixed(value))
}

/// Converts nodes into meta-schema values, interning strings as it goes.
struct Flattener<'t> {
    table: &'t mut StringTable,
}

impl Flattener<'_> {
    fn index(&mut self, s: &str) -> Result<Value> {
        Ok(Value::Int(self.table.intern(s)? as i64))
    }

    fn options(&mut self, enumeration: &EnumNode) -> Result<Value> {
        let indices = enumeration
            .options
            .iter()
            .map(|option| self.index(option))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::Array(indices))
    }

    fn nodes(&mut self, nodes: &[Node]) -> Result<Value> {
        let values = nodes
            .iter()
            .map(|node| self.node(node))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::Array(values))
    }

    fn node(&mut self, node: &Node) -> Result<Value> {
        let mut out = ValueMap::new();
        out.insert(KIND.to_string(), Value::from(node.kind().tag()));
        out.insert("name".to_string(), self.index(node.name())?);
        match node {
            Node::Bool { .. } => {}
            Node::Int { min, max, .. } => {
                out.insert("min".to_string(), Value::Int(*min));
                out.insert("max".to_string(), Value::Int(*max));
            }
            Node::Fixed {
                name,
                min,
                max,
                precision,
            } => {
                out.insert("min".to_string(), check_fixed(name, *min)?);
                out.insert("max".to_string(), check_fixed(name, *max)?);
                out.insert("precision".to_string(), check_fixed(name, *precision)?);
            }
            Node::Enum(enumeration) => {
                out.insert("options".to_string(), self.options(enumeration)?);
            }
            Node::Optional { inner, .. } => {
                out.insert("inner".to_string(), self.node(inner)?);
            }
            Node::Array {
                min_length,
                max_length,
                item,
                ..
            } => {
                out.insert("minLength".to_string(), Value::from(*min_length));
                out.insert("maxLength".to_string(), Value::from(*max_length));
                out.insert("item".to_string(), self.node(item)?);
            }
            Node::EnumArray {
                min_length,
                max_length,
                enumeration,
                ..
            } => {
                out.insert("minLength".to_string(), Value::from(*min_length));
                out.insert("maxLength".to_string(), Value::from(*max_length));
                out.insert("enumName".to_string(), self.index(&enumeration.name)?);
                out.insert("options".to_string(), self.options(enumeration)?);
            }
            Node::Object { fields, .. } => {
                out.insert("fields".to_string(), self.nodes(fields)?);
            }
            Node::Union {
                discriminator,
                variants,
                ..
            } => {
                out.insert(
                    "discriminatorName".to_string(),
                    self.index(&discriminator.name)?,
                );
                out.insert("options".to_string(), self.options(discriminator)?);
                let lists = variants_in_order(discriminator, variants)
                    .map(|(_, fields)| self.nodes(fields))
                    .collect::<Result<Vec<_>>>()?;
                out.insert("variants".to_string(), Value::Array(lists));
            }
            Node::Pointer { target_name, .. } => {
                out.insert("targetName".to_string(), self.index(target_name)?);
            }
        }
        Ok(Value::Object(out))
    }
}

/// Rebuilds nodes from meta-schema values by looking names up in the table.
struct Rebuilder<'t> {
    table: &'t StringTable,
}

fn missing(key: &str) -> Error {
    Error::corrupt_token("", format!("missing `{}` in node payload", key))
}

fn get<'v>(object: &'v ValueMap, key: &str) -> Result<&'v Value> {
    object.get(key).ok_or_else(|| missing(key))
}

fn int(object: &ValueMap, key: &str) -> Result<i64> {
    get(object, key)?.as_i64().ok_or_else(|| missing(key))
}

fn fixed(object: &ValueMap, key: &str) -> Result<f64> {
    get(object, key)?.as_f64().ok_or_else(|| missing(key))
}

fn length_of(object: &ValueMap, key: &str) -> Result<u32> {
    u32::try_from(int(object, key)?).map_err(|_| missing(key))
}

fn list<'v>(object: &'v ValueMap, key: &str) -> Result<&'v Vec<Value>> {
    get(object, key)?.as_array().ok_or_else(|| missing(key))
}

impl Rebuilder<'_> {
    fn string(&self, value: &Value) -> Result<String> {
        let index = value
            .as_i64()
            .and_then(|i| usize::try_from(i).ok())
            .ok_or_else(|| missing("string index"))?;
        Ok(self.table.get(index)?.to_string())
    }

    fn string_at(&self, object: &ValueMap, key: &str) -> Result<String> {
        self.string(get(object, key)?)
    }

    fn enumeration(&self, name: String, object: &ValueMap) -> Result<EnumNode> {
        let options = list(object, "options")?
            .iter()
            .map(|value| self.string(value))
            .collect::<Result<Vec<_>>>()?;
        Ok(EnumNode { name, options })
    }

    fn nodes(&self, values: &[Value]) -> Result<Vec<Node>> {
        values.iter().map(|value| self.node(value)).collect()
    }

    fn node(&self, value: &Value) -> Result<Node> {
        let object = value.as_object().ok_or_else(|| missing("node"))?;
        let tag = get(object, KIND)?.as_str().ok_or_else(|| missing(KIND))?;
        let kind = NodeKind::from_tag(tag).ok_or_else(|| {
            Error::corrupt_token("", format!("unknown node kind `{}`", tag))
        })?;
        let name = self.string_at(object, "name")?;
        let node = match kind {
            NodeKind::Bool => Node::Bool { name },
            NodeKind::Int => Node::Int {
                name,
                min: int(object, "min")?,
                max: int(object, "max")?,
            },
            NodeKind::Fixed => Node::Fixed {
                name,
                min: fixed(object, "min")?,
                max: fixed(object, "max")?,
                precision: fixed(object, "precision")?,
            },
            NodeKind::Enum => Node::Enum(self.enumeration(name, object)?),
            NodeKind::Optional => Node::Optional {
                name,
                inner: Box::new(self.node(get(object, "inner")?)?),
            },
            NodeKind::Array => Node::Array {
                name,
                min_length: length_of(object, "minLength")?,
                max_length: length_of(object, "maxLength")?,
                item: Box::new(self.node(get(object, "item")?)?),
            },
            NodeKind::EnumArray => {
                let enum_name = self.string_at(object, "enumName")?;
                Node::EnumArray {
                    name,
                    min_length: length_of(object, "minLength")?,
                    max_length: length_of(object, "maxLength")?,
                    enumeration: self.enumeration(enum_name, object)?,
                }
            }
            NodeKind::Object => Node::Object {
                name,
                fields: self.nodes(list(object, "fields")?)?,
            },
            NodeKind::Union => {
                let discriminator_name = self.string_at(object, "discriminatorName")?;
                let discriminator = self.enumeration(discriminator_name, object)?;
                let lists = list(object, "variants")?;
                if lists.len() != discriminator.options.len() {
                    return Err(Error::corrupt_token(
                        "",
                        format!(
                            "union `{}` has {} variants for {} options",
                            name,
                            lists.len(),
                            discriminator.options.len()
                        ),
                    ));
                }
                let mut variants = indexmap::IndexMap::with_capacity(lists.len());
                for (option, fields) in discriminator.options.iter().zip(lists) {
                    let fields = fields.as_array().ok_or_else(|| missing("variant"))?;
                    variants.insert(option.clone(), self.nodes(fields)?);
                }
                Node::Union {
                    name,
                    discriminator,
                    variants,
                }
            }
            NodeKind::Pointer => Node::Pointer {
                name,
                target_name: self.string_at(object, "targetName")?,
            },
        };
        Ok(node)
    }
}

/// Builds the string table an encode of `(name, fields)` would write.
pub fn string_table(name: &str, fields: &[Node]) -> Result<StringTable> {
    payload(name, fields).map(|(_, table)| table)
}

fn payload(name: &str, fields: &[Node]) -> Result<(Value, StringTable)> {
    let mut table = StringTable::new();
    table.intern(name)?;
    let mut flattener = Flattener { table: &mut table };
    let nodes = flattener.nodes(fields)?;

    let mut meta = ValueMap::new();
    meta.insert("version".to_string(), Value::Int(VERSION));
    let strings: Vec<Value> = table
        .to_bytes()
        .into_iter()
        .map(|byte| Value::Int(i64::from(byte)))
        .collect();

    let mut data = ValueMap::new();
    data.insert("meta".to_string(), Value::Object(meta));
    data.insert("fields".to_string(), nodes);
    data.insert("strings".to_string(), Value::Array(strings));
    Ok((Value::Object(data), table))
}

/// Encodes a schema into a bit-packed token.
///
/// Fails with [`Error::Construction`] for invalid nodes, with
/// [`Error::DepthExceeded`] for fields deeper than `options.max_depth` and with
/// [`Error::OutOfBounds`] when `options.max_depth` is above [`MAX_DEPTH`].
pub fn encode_schema(name: &str, fields: &[Node], options: &CodecOptions) -> Result<String> {
    let schema = Schema::new(name, fields.to_vec());
    schema.validate()?;
    let meta = shared_meta_schema(options.max_depth)?;
    for field in fields {
        let depth = field.depth();
        if depth > options.max_depth {
            return Err(Error::depth_exceeded(field.name(), depth, options.max_depth));
        }
    }

    let (data, table) = payload(name, fields)?;
    let token = bitpack::encode(meta, &data, options)?;
    tracing::debug!(
        schema = name,
        fields = fields.len(),
        depth = schema.depth(),
        strings = table.len(),
        token_len = token.len(),
        "encoded packed schema token"
    );
    Ok(token)
}

/// Decodes a token produced by [`encode_schema`] with the same `max_depth`.
pub fn decode_schema(token: &str, options: &CodecOptions) -> Result<Schema> {
    let data = bitpack::decode(shared_meta_schema(options.max_depth)?, token, options)?;
    let schema = rebuild(&data).map_err(|e| e.in_token(token))?;
    schema
        .validate()
        .map_err(|e| Error::corrupt_token(token, e))?;
    schema.resolve_pointers()?;
    tracing::debug!(
        schema = %schema.name,
        fields = schema.fields.len(),
        token_len = token.len(),
        "decoded packed schema token"
    );
    Ok(schema)
}

fn rebuild(data: &Value) -> Result<Schema> {
    let root = data.as_object().ok_or_else(|| missing("root"))?;
    let meta = get(root, "meta")?.as_object().ok_or_else(|| missing("meta"))?;
    let version = int(meta, "version")?;
    if version != VERSION {
        return Err(Error::corrupt_token(
            "",
            format!("unsupported version {} (expected {})", version, VERSION),
        ));
    }

    let bytes = list(root, "strings")?
        .iter()
        .map(|value| {
            value
                .as_i64()
                .and_then(|byte| u8::try_from(byte).ok())
                .ok_or_else(|| missing("string byte"))
        })
        .collect::<Result<Vec<u8>>>()?;
    let table = StringTable::from_bytes(&bytes)?;
    let name = table.get(0)?.to_string();

    let rebuilder = Rebuilder { table: &table };
    let fields = rebuilder.nodes(list(root, "fields")?)?;
    Ok(Schema { name, fields })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> CodecOptions {
        CodecOptions::default()
    }

    fn count_unions(nodes: &[Node]) -> usize {
        let mut count = 0;
        for node in nodes {
            node.walk(&mut |n| {
                if n.kind() == NodeKind::Union {
                    count += 1;
                }
            });
        }
        count
    }

    #[test]
    fn test_meta_schema_is_valid() {
        for depth in 1..=5 {
            let schema = Schema::new("meta", meta_schema(depth));
            assert!(schema.validate().is_ok(), "depth {}", depth);
        }
    }

    #[test]
    fn test_meta_schema_unrolls_each_level() {
        // four container kinds each nest one union one level down
        assert_eq!(count_unions(&meta_schema(1)), 1);
        assert_eq!(count_unions(&meta_schema(2)), 1 + 4);
        assert_eq!(count_unions(&meta_schema(3)), 1 + 4 + 16);
    }

    #[test]
    fn test_innermost_level_only_has_leaves() {
        match &meta_schema(1)[1] {
            Node::Array { item, .. } => match item.as_ref() {
                Node::Union { discriminator, .. } => assert_eq!(
                    discriminator.options,
                    vec!["bool", "int", "fixed", "enum", "enumArray", "pointer"]
                ),
                other => panic!("Expected union, got {:?}", other),
            },
            other => panic!("Expected array, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_name_is_first_string() {
        let fields = vec![Node::object(
            "offset",
            vec![
                Node::int("start", -256, 255).unwrap(),
                Node::int("end", -256, 255).unwrap(),
            ],
        )
        .unwrap()];
        let table = string_table("range", &fields).unwrap();
        assert_eq!(
            table.iter().collect::<Vec<_>>(),
            vec!["range", "offset", "start", "end"]
        );
    }

    #[test]
    fn test_repeated_names_share_an_index() {
        let fields = vec![
            Node::enumeration("status", ["on", "off"]).unwrap(),
            Node::enum_array("history", 0, 8, EnumNode::new("status", ["on", "off"]).unwrap())
                .unwrap(),
        ];
        let table = string_table("device", &fields).unwrap();
        assert_eq!(
            table.iter().collect::<Vec<_>>(),
            vec!["device", "status", "on", "off", "history"]
        );
    }

    #[test]
    fn test_depth_bound() {
        let mut node = Node::bool("leaf");
        for i in 0..5 {
            node = Node::optional(&format!("level{}", i), node);
        }
        assert_eq!(node.depth(), 6);
        let err = encode_schema("deep", &[node.clone()], &options()).unwrap_err();
        assert_eq!(err, Error::depth_exceeded("level4", 6, 5));

        let roomy = CodecOptions::new().with_max_depth(6);
        let token = encode_schema("deep", &[node.clone()], &roomy).unwrap();
        assert_eq!(decode_schema(&token, &roomy).unwrap().fields, vec![node]);
    }

    #[test]
    fn test_fixed_attributes_round_trip() {
        let fields = vec![Node::fixed("price", -12.5, 999.99, 0.01).unwrap()];
        let token = encode_schema("shop", &fields, &options()).unwrap();
        assert_eq!(decode_schema(&token, &options()).unwrap().fields, fields);
    }

    #[test]
    fn test_fixed_attributes_beyond_resolution_are_rejected() {
        let fields = vec![Node::fixed("tiny", 0.0, 1.0, 0.00001).unwrap()];
        let err = encode_schema("s", &fields, &options()).unwrap_err();
        assert!(matches!(err, Error::OutOfBounds { .. }));
    }

    #[test]
    fn test_fixed_attributes_off_the_grid_are_rejected() {
        // 0.1 + 0.2 is 0.30000000000000004 and would decode as 0.3
        let fields = vec![Node::fixed("x", 0.0, 0.1 + 0.2, 0.1).unwrap()];
        match encode_schema("s", &fields, &options()).unwrap_err() {
            Error::OutOfBounds { field, msg } => {
                assert_eq!(field, "x");
                assert!(msg.contains("0.30000000000000004"));
            }
            other => panic!("Expected out of bounds, got {:?}", other),
        }

        let exact = vec![Node::fixed("x", 0.0, 0.3, 0.1).unwrap()];
        let token = encode_schema("s", &exact, &options()).unwrap();
        assert_eq!(decode_schema(&token, &options()).unwrap().fields, exact);
    }

    #[test]
    fn test_max_depth_above_limit_is_rejected() {
        let fields = vec![Node::bool("b")];
        let too_deep = CodecOptions::new().with_max_depth(MAX_DEPTH + 1);
        assert!(matches!(
            encode_schema("s", &fields, &too_deep).unwrap_err(),
            Error::OutOfBounds { .. }
        ));
        assert!(matches!(
            decode_schema("AAAA", &too_deep).unwrap_err(),
            Error::OutOfBounds { .. }
        ));
        assert!(shared_meta_schema(MAX_DEPTH).is_ok());
    }

    #[test]
    fn test_meta_schema_is_built_once_per_depth() {
        let first = shared_meta_schema(4).unwrap();
        let second = shared_meta_schema(4).unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first, meta_schema(4).as_slice());
        assert!(!std::ptr::eq(first, shared_meta_schema(3).unwrap()));
    }

    #[test]
    fn test_invalid_node_in_token_is_corrupt() {
        // min above max is well formed for the meta-schema but not a valid node
        let bad = vec![Node::Int {
            name: "n".to_string(),
            min: 5,
            max: 1,
        }];
        let (data, _) = payload("s", &bad).unwrap();
        let token = bitpack::encode(&meta_schema(5), &data, &options()).unwrap();
        match decode_schema(&token, &options()).unwrap_err() {
            Error::CorruptToken { token: echoed, .. } => assert_eq!(echoed, token),
            other => panic!("Expected corrupt token, got {:?}", other),
        }
    }

    #[test]
    fn test_int_attributes_beyond_i32_are_rejected() {
        let fields = vec![Node::int("huge", 0, i64::from(i32::MAX) + 1).unwrap()];
        assert!(encode_schema("s", &fields, &options()).is_err());
    }

    #[test]
    fn test_dangling_pointer_fails_on_decode() {
        let fields = vec![Node::pointer("p", "nowhere")];
        let token = encode_schema("s", &fields, &options()).unwrap();
        assert_eq!(
            decode_schema(&token, &options()).unwrap_err(),
            Error::unresolved_pointer("p", "nowhere")
        );
    }

    #[test]
    fn test_mismatched_depth_is_rejected() {
        let fields = vec![Node::optional("o", Node::bool("b"))];
        let token = encode_schema("s", &fields, &options()).unwrap();
        let other = CodecOptions::new().with_max_depth(1);
        assert!(decode_schema(&token, &other).is_err());
    }

    #[test]
    fn test_garbage_is_corrupt() {
        match decode_schema("AAAA", &options()).unwrap_err() {
            Error::CorruptToken { token, .. } => assert_eq!(token, "AAAA"),
            other => panic!("Expected corrupt token, got {:?}", other),
        }
    }
}
