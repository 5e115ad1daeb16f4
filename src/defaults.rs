//! Default-value derivation.
//!
//! [`default_value`] computes the canonical initial value for any node. Callers use
//! it to seed a fresh form and as the fallback dataset when a data token fails to
//! decode.
//!
//! | Kind | Default |
//! |---|---|
//! | `Bool` | `false` |
//! | `Int`, `Fixed` | `min` |
//! | `Enum` | first option |
//! | `Optional`, `Pointer` | `null` |
//! | `Array`, `EnumArray` | `[]` |
//! | `Object` | every field's default, by name |
//! | `Union` | `{discriminator: first option}` plus that variant's field defaults |
//!
//! A pointer's default is `null` because deriving it would mean re-entering the
//! target, which may recurse without end.
//!
//! ## Examples
//!
//! ```rust
//! use schema_token::{default_value, value, Node};
//!
//! let age = Node::optional("age", Node::int("ageValue", 0, 120).unwrap());
//! assert_eq!(default_value(&age), value!(null));
//! ```

use crate::node::{variants_in_order, EnumNode, Node};
use crate::{Value, ValueMap};

/// Derives the default value of `node`.
#[must_use]
pub fn default_value(node: &Node) -> Value {
    match node {
        Node::Bool { .. } => Value::Bool(false),
        Node::Int { min, .. } => Value::Int(*min),
        Node::Fixed { min, .. } => Value::Fixed(*min),
        Node::Enum(enumeration) => first_option(enumeration),
        Node::Optional { .. } | Node::Pointer { .. } => Value::Null,
        Node::Array { .. } | Node::EnumArray { .. } => Value::Array(Vec::new()),
        Node::Object { fields, .. } => Value::Object(default_object(fields)),
        Node::Union {
            discriminator,
            variants,
            ..
        } => {
            let mut object = ValueMap::new();
            object.insert(discriminator.name.clone(), first_option(discriminator));
            if let Some((_, fields)) = variants_in_order(discriminator, variants).next() {
                for field in fields {
                    object.insert(field.name().to_string(), default_value(field));
                }
            }
            Value::Object(object)
        }
    }
}

/// The value a field takes when the user switches it on.
///
/// For an `Optional` this is the inner field's default; for every other kind it is
/// the same as [`default_value`].
///
/// ```rust
/// use schema_token::{default_when_present, Node, Value};
///
/// let age = Node::optional("age", Node::int("ageValue", 0, 120).unwrap());
/// assert_eq!(default_when_present(&age), Value::Int(0));
/// ```
#[must_use]
pub fn default_when_present(node: &Node) -> Value {
    match node {
        Node::Optional { inner, .. } => default_value(inner),
        other => default_value(other),
    }
}

/// Defaults for a list of fields, keyed by field name in declaration order.
#[must_use]
pub fn default_object(fields: &[Node]) -> ValueMap {
    fields
        .iter()
        .map(|field| (field.name().to_string(), default_value(field)))
        .collect()
}

fn first_option(enumeration: &EnumNode) -> Value {
    enumeration
        .options
        .first()
        .map_or(Value::Null, |option| Value::String(option.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value;

    #[test]
    fn test_leaf_defaults() {
        assert_eq!(default_value(&Node::bool("b")), Value::Bool(false));
        assert_eq!(default_value(&Node::int("i", -3, 3).unwrap()), Value::Int(-3));
        assert_eq!(
            default_value(&Node::fixed("f", 1.5, 3.0, 0.5).unwrap()),
            Value::Fixed(1.5)
        );
        assert_eq!(
            default_value(&Node::enumeration("e", ["pending", "active"]).unwrap()),
            value!("pending")
        );
        assert_eq!(default_value(&Node::pointer("p", "b")), Value::Null);
    }

    #[test]
    fn test_object_defaults_follow_field_order() {
        let node = Node::object(
            "offset",
            vec![
                Node::int("start", -256, 255).unwrap(),
                Node::int("end", -256, 255).unwrap(),
            ],
        )
        .unwrap();
        assert_eq!(default_value(&node), value!({"start": (-256), "end": (-256)}));
    }

    #[test]
    fn test_union_defaults_to_first_variant() {
        let node = Node::union(
            "action",
            EnumNode::new("type", ["start", "stop"]).unwrap(),
            vec![
                ("start".to_string(), vec![Node::int("delay", 0, 60).unwrap()]),
                ("stop".to_string(), vec![Node::bool("force")]),
            ],
        )
        .unwrap();
        assert_eq!(default_value(&node), value!({"type": "start", "delay": 0}));
    }

    #[test]
    fn test_union_default_follows_option_order() {
        let mut variants = indexmap::IndexMap::new();
        variants.insert("stop".to_string(), vec![Node::bool("force")]);
        variants.insert("start".to_string(), vec![Node::int("delay", 0, 60).unwrap()]);
        let node = Node::Union {
            name: "action".to_string(),
            discriminator: EnumNode::new("type", ["start", "stop"]).unwrap(),
            variants,
        };
        assert_eq!(default_value(&node), value!({"type": "start", "delay": 0}));

        let data = Value::Object(default_object(std::slice::from_ref(&node)));
        let options = crate::CodecOptions::default();
        let token = crate::bitpack::encode(std::slice::from_ref(&node), &data, &options).unwrap();
        assert_eq!(
            crate::bitpack::decode(std::slice::from_ref(&node), &token, &options).unwrap(),
            data
        );
    }

    #[test]
    fn test_defaults_always_pack() {
        let fields = vec![
            Node::bool("enabled"),
            Node::enum_array("tags", 0, 4, EnumNode::new("tag", ["a", "b"]).unwrap()).unwrap(),
            Node::optional("age", Node::int("ageValue", 0, 120).unwrap()),
        ];
        let data = Value::Object(default_object(&fields));
        assert!(crate::bitpack::validate(&fields, &data, &crate::CodecOptions::default()).is_ok());
    }
}
