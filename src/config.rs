//! Builder configs and their conversion to and from wire nodes.
//!
//! A [`FieldConfig`] is what an editing surface manipulates: the same shape as a
//! [`Node`], plus a stable identifier for list operations, with every attribute
//! optional. It never goes on the wire. [`to_wire`] turns it into a `Node`
//! (filling gaps from [`ConfigDefaults`]) and [`to_config`] goes back, assigning
//! fresh identifiers.
//!
//! Both directions build new trees; nothing is shared between a config tree and
//! the node tree derived from it.
//!
//! ## Examples
//!
//! ```rust
//! use schema_token::{to_config, to_wire, ConfigKind, FieldConfig, Node};
//!
//! let config = FieldConfig::new("count", ConfigKind::Int { min: None, max: Some(10) });
//! let node = to_wire(&config);
//! assert_eq!(node, Node::int("count", 0, 10).unwrap());
//!
//! let back = to_config(&node);
//! assert_ne!(back.id, config.id);
//! assert_eq!(back.name, "count");
//! ```

use crate::node::{variants_in_order, EnumNode, Node};
use crate::ConfigDefaults;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An editable field: a node shape with optional attributes and a stable id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: ConfigKind,
}

/// Kind-specific attributes of a [`FieldConfig`]. `None` means "use the default".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ConfigKind {
    Bool,
    Int {
        min: Option<i64>,
        max: Option<i64>,
    },
    Fixed {
        min: Option<f64>,
        max: Option<f64>,
        precision: Option<f64>,
    },
    Enum {
        options: Option<Vec<String>>,
    },
    Optional {
        inner: Option<Box<FieldConfig>>,
    },
    Array {
        #[serde(rename = "minLength")]
        min_length: Option<u32>,
        #[serde(rename = "maxLength")]
        max_length: Option<u32>,
        item: Option<Box<FieldConfig>>,
    },
    EnumArray {
        #[serde(rename = "minLength")]
        min_length: Option<u32>,
        #[serde(rename = "maxLength")]
        max_length: Option<u32>,
        #[serde(rename = "enumName")]
        enum_name: Option<String>,
        options: Option<Vec<String>>,
    },
    Object {
        fields: Vec<FieldConfig>,
    },
    Union {
        #[serde(rename = "discriminatorName")]
        discriminator_name: Option<String>,
        options: Option<Vec<String>>,
        variants: IndexMap<String, Vec<FieldConfig>>,
    },
    Pointer {
        #[serde(rename = "targetName")]
        target_name: Option<String>,
    },
}

fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

impl FieldConfig {
    /// Creates a config with a freshly generated identifier.
    pub fn new(name: &str, kind: ConfigKind) -> Self {
        FieldConfig {
            id: fresh_id(),
            name: name.to_string(),
            kind,
        }
    }

    fn children_mut(&mut self) -> Vec<&mut FieldConfig> {
        match &mut self.kind {
            ConfigKind::Optional { inner: Some(inner) } => vec![inner.as_mut()],
            ConfigKind::Array {
                item: Some(item), ..
            } => vec![item.as_mut()],
            ConfigKind::Object { fields } => fields.iter_mut().collect(),
            ConfigKind::Union { variants, .. } => variants.values_mut().flatten().collect(),
            _ => Vec::new(),
        }
    }

    fn rewrite_ids(&mut self, id: &mut dyn FnMut() -> String) {
        self.id = id();
        for child in self.children_mut() {
            child.rewrite_ids(id);
        }
    }

    /// Deep copy with a fresh identifier on every config in the tree, for
    /// "duplicate field" style operations.
    #[must_use]
    pub fn duplicate(&self) -> FieldConfig {
        let mut copy = self.clone();
        copy.rewrite_ids(&mut fresh_id);
        copy
    }

    /// Deep copy with every identifier cleared, for attribute-wise comparison.
    #[must_use]
    pub fn without_ids(&self) -> FieldConfig {
        let mut copy = self.clone();
        copy.rewrite_ids(&mut String::new);
        copy
    }
}

/// Converts a config to a wire node using the default fallbacks.
#[must_use]
pub fn to_wire(config: &FieldConfig) -> Node {
    to_wire_with(config, &ConfigDefaults::default())
}

/// Converts a config to a wire node, filling unset attributes from `defaults`.
///
/// Total over every config: missing nested configs are synthesized. The result is
/// not validated; an explicit `min > max` comes through as is and is rejected when
/// the node is encoded.
#[must_use]
pub fn to_wire_with(config: &FieldConfig, defaults: &ConfigDefaults) -> Node {
    let name = config.name.clone();
    match &config.kind {
        ConfigKind::Bool => Node::Bool { name },
        ConfigKind::Int { min, max } => Node::Int {
            name,
            min: min.unwrap_or(defaults.int_min),
            max: max.unwrap_or(defaults.int_max),
        },
        ConfigKind::Fixed {
            min,
            max,
            precision,
        } => Node::Fixed {
            name,
            min: min.unwrap_or(defaults.fixed_min),
            max: max.unwrap_or(defaults.fixed_max),
            precision: precision.unwrap_or(defaults.precision),
        },
        ConfigKind::Enum { options } => Node::Enum(EnumNode {
            name,
            options: options
                .clone()
                .unwrap_or_else(|| defaults.enum_options.clone()),
        }),
        ConfigKind::Optional { inner } => Node::Optional {
            name,
            inner: Box::new(match inner {
                Some(inner) => to_wire_with(inner, defaults),
                None => defaults.optional_inner(),
            }),
        },
        ConfigKind::Array {
            min_length,
            max_length,
            item,
        } => Node::Array {
            name,
            min_length: min_length.unwrap_or(defaults.min_length),
            max_length: max_length.unwrap_or(defaults.max_length),
            item: Box::new(match item {
                Some(item) => to_wire_with(item, defaults),
                None => defaults.array_item(),
            }),
        },
        ConfigKind::EnumArray {
            min_length,
            max_length,
            enum_name,
            options,
        } => {
            let mut enumeration =
                defaults.enumeration(enum_name.as_deref().unwrap_or(&defaults.enum_array_name));
            if let Some(options) = options {
                enumeration.options = options.clone();
            }
            Node::EnumArray {
                name,
                min_length: min_length.unwrap_or(defaults.min_length),
                max_length: max_length.unwrap_or(defaults.max_length),
                enumeration,
            }
        }
        ConfigKind::Object { fields } => Node::Object {
            name,
            fields: fields.iter().map(|f| to_wire_with(f, defaults)).collect(),
        },
        ConfigKind::Union {
            discriminator_name,
            options,
            variants,
        } => {
            let mut discriminator = defaults.enumeration(
                discriminator_name
                    .as_deref()
                    .unwrap_or(&defaults.discriminator_name),
            );
            if let Some(options) = options {
                discriminator.options = options.clone();
            }
            let variants: IndexMap<String, Vec<Node>> = discriminator
                .options
                .iter()
                .map(|option| {
                    let fields: Vec<Node> = variants
                        .get(option)
                        .map(|fields| fields.iter().map(|f| to_wire_with(f, defaults)).collect())
                        .unwrap_or_default();
                    (option.clone(), fields)
                })
                .collect();
            Node::Union {
                name,
                discriminator,
                variants,
            }
        }
        ConfigKind::Pointer { target_name } => Node::Pointer {
            name,
            target_name: target_name
                .clone()
                .unwrap_or_else(|| defaults.pointer_target.clone()),
        },
    }
}

/// Converts a wire node to a fully populated config with fresh identifiers.
#[must_use]
pub fn to_config(node: &Node) -> FieldConfig {
    let kind = match node {
        Node::Bool { .. } => ConfigKind::Bool,
        Node::Int { min, max, .. } => ConfigKind::Int {
            min: Some(*min),
            max: Some(*max),
        },
        Node::Fixed {
            min,
            max,
            precision,
            ..
        } => ConfigKind::Fixed {
            min: Some(*min),
            max: Some(*max),
            precision: Some(*precision),
        },
        Node::Enum(enumeration) => ConfigKind::Enum {
            options: Some(enumeration.options.clone()),
        },
        Node::Optional { inner, .. } => ConfigKind::Optional {
            inner: Some(Box::new(to_config(inner))),
        },
        Node::Array {
            min_length,
            max_length,
            item,
            ..
        } => ConfigKind::Array {
            min_length: Some(*min_length),
            max_length: Some(*max_length),
            item: Some(Box::new(to_config(item))),
        },
        Node::EnumArray {
            min_length,
            max_length,
            enumeration,
            ..
        } => ConfigKind::EnumArray {
            min_length: Some(*min_length),
            max_length: Some(*max_length),
            enum_name: Some(enumeration.name.clone()),
            options: Some(enumeration.options.clone()),
        },
        Node::Object { fields, .. } => ConfigKind::Object {
            fields: fields.iter().map(to_config).collect(),
        },
        Node::Union {
            discriminator,
            variants,
            ..
        } => ConfigKind::Union {
            discriminator_name: Some(discriminator.name.clone()),
            options: Some(discriminator.options.clone()),
            variants: variants_in_order(discriminator, variants)
                .map(|(option, fields)| {
                    (
                        option.to_string(),
                        fields.iter().map(to_config).collect::<Vec<_>>(),
                    )
                })
                .collect(),
        },
        Node::Pointer { target_name, .. } => ConfigKind::Pointer {
            target_name: Some(target_name.clone()),
        },
    };
    FieldConfig::new(node.name(), kind)
}
