//! The field grammar.
//!
//! A [`Schema`] is a named, ordered list of [`Node`]s. Nodes nest according to their
//! kind; self-reference is only ever expressed through [`Node::Pointer`], which names
//! another field in the same schema instead of containing it. Structural depth is
//! therefore always finite while the data a schema describes may recurse.
//!
//! Constructors such as [`Node::int`] check attribute invariants and return
//! [`Error::Construction`]. Pointers are deliberately not resolved at construction
//! time (the target may not exist yet while a schema is being edited);
//! [`Schema::resolve_pointers`] performs that check when a schema is decoded or used.
//!
//! ## JSON shape
//!
//! Nodes serialize with a `type` tag and camelCase attributes:
//!
//! ```rust
//! use schema_token::Node;
//!
//! let node = Node::int("count", 0, 100).unwrap();
//! let json = serde_json::to_string(&node).unwrap();
//! assert_eq!(json, r#"{"type":"int","name":"count","min":0,"max":100}"#);
//! ```

use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An enumeration: a name and a non-empty list of distinct options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnumNode {
    pub name: String,
    pub options: Vec<String>,
}

impl EnumNode {
    /// Creates an enumeration, rejecting empty or duplicated option lists.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use schema_token::EnumNode;
    ///
    /// assert!(EnumNode::new("status", ["pending", "active"]).is_ok());
    /// assert!(EnumNode::new("status", Vec::<String>::new()).is_err());
    /// assert!(EnumNode::new("status", ["a", "a"]).is_err());
    /// ```
    pub fn new<I, S>(name: &str, options: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let node = EnumNode {
            name: name.to_string(),
            options: options.into_iter().map(Into::into).collect(),
        };
        node.validate()?;
        Ok(node)
    }

    /// Position of `option` in the option list.
    #[must_use]
    pub fn index_of(&self, option: &str) -> Option<usize> {
        self.options.iter().position(|o| o == option)
    }

    /// Checks that the option list is non-empty and free of duplicates.
    pub fn validate(&self) -> Result<()> {
        if self.options.is_empty() {
            return Err(Error::construction(
                &self.name,
                "enumeration needs at least one option",
            ));
        }
        let mut seen = HashSet::new();
        for option in &self.options {
            if !seen.insert(option.as_str()) {
                return Err(Error::construction(
                    &self.name,
                    &format!("duplicate option `{}`", option),
                ));
            }
        }
        Ok(())
    }
}

/// One element of a data-shape description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Bool {
        name: String,
    },
    Int {
        name: String,
        min: i64,
        max: i64,
    },
    Fixed {
        name: String,
        min: f64,
        max: f64,
        precision: f64,
    },
    Enum(EnumNode),
    Optional {
        name: String,
        inner: Box<Node>,
    },
    Array {
        name: String,
        #[serde(rename = "minLength")]
        min_length: u32,
        #[serde(rename = "maxLength")]
        max_length: u32,
        item: Box<Node>,
    },
    EnumArray {
        name: String,
        #[serde(rename = "minLength")]
        min_length: u32,
        #[serde(rename = "maxLength")]
        max_length: u32,
        #[serde(rename = "enum")]
        enumeration: EnumNode,
    },
    Object {
        name: String,
        fields: Vec<Node>,
    },
    Union {
        name: String,
        discriminator: EnumNode,
        variants: IndexMap<String, Vec<Node>>,
    },
    Pointer {
        name: String,
        #[serde(rename = "targetName")]
        target_name: String,
    },
}

/// The kind of a node, without its attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Bool,
    Int,
    Fixed,
    Enum,
    Optional,
    Array,
    EnumArray,
    Object,
    Union,
    Pointer,
}

impl NodeKind {
    /// Every kind, in wire order.
    pub const ALL: [NodeKind; 10] = [
        NodeKind::Bool,
        NodeKind::Int,
        NodeKind::Fixed,
        NodeKind::Enum,
        NodeKind::Optional,
        NodeKind::Array,
        NodeKind::EnumArray,
        NodeKind::Object,
        NodeKind::Union,
        NodeKind::Pointer,
    ];

    /// The `type` tag used in JSON and as the meta-schema discriminator option.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            NodeKind::Bool => "bool",
            NodeKind::Int => "int",
            NodeKind::Fixed => "fixed",
            NodeKind::Enum => "enum",
            NodeKind::Optional => "optional",
            NodeKind::Array => "array",
            NodeKind::EnumArray => "enumArray",
            NodeKind::Object => "object",
            NodeKind::Union => "union",
            NodeKind::Pointer => "pointer",
        }
    }

    #[must_use]
    pub fn from_tag(tag: &str) -> Option<NodeKind> {
        NodeKind::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Kinds that nest other nodes and so need a level below them.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(
            self,
            NodeKind::Optional | NodeKind::Array | NodeKind::Object | NodeKind::Union
        )
    }
}

impl Node {
    pub fn bool(name: &str) -> Node {
        Node::Bool {
            name: name.to_string(),
        }
    }

    /// Creates an integer field with inclusive bounds.
    pub fn int(name: &str, min: i64, max: i64) -> Result<Node> {
        let node = Node::Int {
            name: name.to_string(),
            min,
            max,
        };
        node.check()?;
        Ok(node)
    }

    /// Creates a fixed-point field: values between `min` and `max` in steps of `precision`.
    pub fn fixed(name: &str, min: f64, max: f64, precision: f64) -> Result<Node> {
        let node = Node::Fixed {
            name: name.to_string(),
            min,
            max,
            precision,
        };
        node.check()?;
        Ok(node)
    }

    pub fn enumeration<I, S>(name: &str, options: I) -> Result<Node>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Node::Enum(EnumNode::new(name, options)?))
    }

    pub fn optional(name: &str, inner: Node) -> Node {
        Node::Optional {
            name: name.to_string(),
            inner: Box::new(inner),
        }
    }

    pub fn array(name: &str, min_length: u32, max_length: u32, item: Node) -> Result<Node> {
        let node = Node::Array {
            name: name.to_string(),
            min_length,
            max_length,
            item: Box::new(item),
        };
        node.check()?;
        Ok(node)
    }

    pub fn enum_array(
        name: &str,
        min_length: u32,
        max_length: u32,
        enumeration: EnumNode,
    ) -> Result<Node> {
        let node = Node::EnumArray {
            name: name.to_string(),
            min_length,
            max_length,
            enumeration,
        };
        node.check()?;
        Ok(node)
    }

    /// Creates an object, rejecting duplicate field names.
    pub fn object(name: &str, fields: Vec<Node>) -> Result<Node> {
        let node = Node::Object {
            name: name.to_string(),
            fields,
        };
        node.check()?;
        Ok(node)
    }

    /// Creates a discriminated union.
    ///
    /// Options of `discriminator` missing from `variants` get an empty field list;
    /// variants are stored in option order. A variant key that is not an option is
    /// rejected.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use schema_token::{EnumNode, Node};
    ///
    /// let union = Node::union(
    ///     "action",
    ///     EnumNode::new("type", ["start", "stop"]).unwrap(),
    ///     vec![("start".to_string(), vec![Node::int("delay", 0, 60).unwrap()])],
    /// )
    /// .unwrap();
    ///
    /// if let Node::Union { variants, .. } = union {
    ///     assert_eq!(variants.len(), 2);
    ///     assert!(variants["stop"].is_empty());
    /// }
    /// ```
    pub fn union<I>(name: &str, discriminator: EnumNode, variants: I) -> Result<Node>
    where
        I: IntoIterator<Item = (String, Vec<Node>)>,
    {
        discriminator.validate()?;
        let mut given: IndexMap<String, Vec<Node>> = variants.into_iter().collect();
        if let Some(stray) = given
            .keys()
            .find(|key| discriminator.index_of(key).is_none())
        {
            return Err(Error::construction(
                name,
                &format!("variant `{}` is not a discriminator option", stray),
            ));
        }
        let variants: IndexMap<String, Vec<Node>> = discriminator
            .options
            .iter()
            .map(|option| {
                let fields = given.shift_remove(option).unwrap_or_default();
                (option.clone(), fields)
            })
            .collect();
        let node = Node::Union {
            name: name.to_string(),
            discriminator,
            variants,
        };
        node.check()?;
        Ok(node)
    }

    pub fn pointer(name: &str, target_name: &str) -> Node {
        Node::Pointer {
            name: name.to_string(),
            target_name: target_name.to_string(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Node::Bool { name }
            | Node::Int { name, .. }
            | Node::Fixed { name, .. }
            | Node::Optional { name, .. }
            | Node::Array { name, .. }
            | Node::EnumArray { name, .. }
            | Node::Object { name, .. }
            | Node::Union { name, .. }
            | Node::Pointer { name, .. } => name,
            Node::Enum(e) => &e.name,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Node::Bool { .. } => NodeKind::Bool,
            Node::Int { .. } => NodeKind::Int,
            Node::Fixed { .. } => NodeKind::Fixed,
            Node::Enum(_) => NodeKind::Enum,
            Node::Optional { .. } => NodeKind::Optional,
            Node::Array { .. } => NodeKind::Array,
            Node::EnumArray { .. } => NodeKind::EnumArray,
            Node::Object { .. } => NodeKind::Object,
            Node::Union { .. } => NodeKind::Union,
            Node::Pointer { .. } => NodeKind::Pointer,
        }
    }

    /// Direct children, in declaration order. Union children are listed variant by
    /// variant.
    #[must_use]
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Optional { inner, .. } => vec![inner.as_ref()],
            Node::Array { item, .. } => vec![item.as_ref()],
            Node::Object { fields, .. } => fields.iter().collect(),
            Node::Union {
                discriminator,
                variants,
                ..
            } => variants_in_order(discriminator, variants)
                .flat_map(|(_, fields)| fields)
                .collect(),
            Node::Bool { .. }
            | Node::Int { .. }
            | Node::Fixed { .. }
            | Node::Enum(_)
            | Node::EnumArray { .. }
            | Node::Pointer { .. } => Vec::new(),
        }
    }

    /// Structural depth. Leaves are 1; a container is one more than its deepest
    /// child and always at least 2, even when it has no children.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use schema_token::Node;
    ///
    /// assert_eq!(Node::bool("a").depth(), 1);
    /// assert_eq!(Node::object("o", vec![]).unwrap().depth(), 2);
    /// assert_eq!(Node::optional("o", Node::optional("p", Node::bool("b"))).depth(), 3);
    /// ```
    #[must_use]
    pub fn depth(&self) -> usize {
        if !self.kind().is_container() {
            return 1;
        }
        1 + self
            .children()
            .into_iter()
            .map(Node::depth)
            .max()
            .unwrap_or(1)
    }

    /// Checks this node's own attributes, without descending.
    fn check(&self) -> Result<()> {
        match self {
            Node::Int { name, min, max } => {
                if min > max {
                    return Err(Error::construction(
                        name,
                        &format!("min {} exceeds max {}", min, max),
                    ));
                }
            }
            Node::Fixed {
                name,
                min,
                max,
                precision,
            } => {
                if !(min.is_finite() && max.is_finite() && precision.is_finite()) {
                    return Err(Error::construction(name, "bounds must be finite"));
                }
                if min > max {
                    return Err(Error::construction(
                        name,
                        &format!("min {} exceeds max {}", min, max),
                    ));
                }
                if *precision <= 0.0 {
                    return Err(Error::construction(name, "precision must be positive"));
                }
            }
            Node::Enum(e) => e.validate()?,
            Node::Array {
                name,
                min_length,
                max_length,
                ..
            } => check_lengths(name, *min_length, *max_length)?,
            Node::EnumArray {
                name,
                min_length,
                max_length,
                enumeration,
            } => {
                check_lengths(name, *min_length, *max_length)?;
                enumeration.validate()?;
            }
            Node::Object { name, fields } => check_unique(name, fields)?,
            Node::Union {
                name,
                discriminator,
                variants,
            } => {
                discriminator.validate()?;
                if variants.len() != discriminator.options.len()
                    || discriminator
                        .options
                        .iter()
                        .any(|option| !variants.contains_key(option))
                {
                    return Err(Error::construction(
                        name,
                        "every discriminator option needs exactly one variant",
                    ));
                }
                for fields in variants.values() {
                    check_unique(name, fields)?;
                }
            }
            Node::Bool { .. } | Node::Optional { .. } | Node::Pointer { .. } => {}
        }
        Ok(())
    }

    /// Checks attribute invariants of this node and everything below it.
    pub fn validate(&self) -> Result<()> {
        self.check()?;
        for child in self.children() {
            child.validate()?;
        }
        Ok(())
    }

    /// Visits this node and its descendants in pre-order.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Node)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

fn check_lengths(name: &str, min_length: u32, max_length: u32) -> Result<()> {
    if min_length > max_length {
        return Err(Error::construction(
            name,
            &format!(
                "minLength {} exceeds maxLength {}",
                min_length, max_length
            ),
        ));
    }
    Ok(())
}

fn check_unique(owner: &str, fields: &[Node]) -> Result<()> {
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.name()) {
            return Err(Error::construction(
                owner,
                &format!("duplicate field name `{}`", field.name()),
            ));
        }
    }
    Ok(())
}

/// A named, ordered list of top-level fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    pub fields: Vec<Node>,
}

impl Schema {
    pub fn new(name: &str, fields: Vec<Node>) -> Self {
        Schema {
            name: name.to_string(),
            fields,
        }
    }

    /// Checks attribute invariants and top-level name uniqueness.
    pub fn validate(&self) -> Result<()> {
        check_unique(&self.name, &self.fields)?;
        for field in &self.fields {
            field.validate()?;
        }
        Ok(())
    }

    /// Checks that every pointer names a field in this schema.
    pub fn resolve_pointers(&self) -> Result<()> {
        let mut failure = None;
        for field in &self.fields {
            field.walk(&mut |node| {
                if let Node::Pointer { name, target_name } = node {
                    if failure.is_none() && resolve_target(&self.fields, target_name).is_none()
                    {
                        failure = Some(Error::unresolved_pointer(name, target_name));
                    }
                }
            });
        }
        failure.map_or(Ok(()), Err)
    }

    /// Deepest top-level field, 0 for an empty schema.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.fields.iter().map(Node::depth).max().unwrap_or(0)
    }
}

/// A union's variants in discriminator option order, whatever order the map holds
/// them in. Options without a variant yield no fields.
pub fn variants_in_order<'a>(
    discriminator: &'a EnumNode,
    variants: &'a IndexMap<String, Vec<Node>>,
) -> impl Iterator<Item = (&'a str, &'a [Node])> + 'a {
    discriminator.options.iter().map(move |option| {
        let fields = variants.get(option).map(Vec::as_slice).unwrap_or_default();
        (option.as_str(), fields)
    })
}

/// Finds the field a pointer refers to: the first non-pointer node named `target`
/// in a pre-order walk of `scope`.
#[must_use]
pub fn resolve_target<'a>(scope: &'a [Node], target: &str) -> Option<&'a Node> {
    let mut found = None;
    for field in scope {
        field.walk(&mut |node| {
            if found.is_none() && node.kind() != NodeKind::Pointer && node.name() == target {
                found = Some(node);
            }
        });
        if found.is_some() {
            break;
        }
    }
    found
}
