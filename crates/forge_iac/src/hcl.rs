//! Declaration tree and HCL serialization.
//!
//! Generation steps build [`Declaration`]s out of ordered [`Body`] values and
//! hand them to the [`HclSerializer`], which turns them into Terraform block
//! syntax:
//!
//! ```text
//! resource "aws_vpc" "main" {
//!   cidr_block           = "10.0.0.0/16"
//!   enable_dns_hostnames = true
//!   tags = { ... }
//! }
//! ```
//!
//! Within one mapping the `=` signs are aligned to the longest attribute key.
//! Nested blocks (`backend "s3" { ... }`) are written without `=` and take no
//! part in alignment.

use std::fmt::Write as _;

use indexmap::IndexMap;

use crate::error::{IacError, IacResult};

/// Default nesting ceiling for [`HclSerializer`].
pub const DEFAULT_MAX_DEPTH: usize = 8;

const INDENT: &str = "  ";

/// Literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

/// Node of a declaration tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Quoted (strings) or bare (numbers, booleans) literal.
    Literal(Scalar),
    /// Expression written verbatim, e.g. `aws_vpc.main.id`.
    Reference(String),
    /// `key = { ... }`
    Map(Body),
    /// `key = [ ... ]`
    List(Vec<Node>),
    /// `key { ... }`, valid only as an attribute of a body, never as a list item.
    Block(Body),
}

impl Node {
    pub fn reference(expression: impl Into<String>) -> Self {
        Node::Reference(expression.into())
    }

    pub fn block(body: Body) -> Self {
        Node::Block(body)
    }

    pub fn list<I, N>(items: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        Node::List(items.into_iter().map(Into::into).collect())
    }

    /// List of references.
    pub fn references<I, S>(expressions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Node::List(expressions.into_iter().map(|e| Node::Reference(e.into())).collect())
    }

    pub fn as_body(&self) -> Option<&Body> {
        match self {
            Node::Map(body) | Node::Block(body) => Some(body),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Literal(Scalar::String(s)) | Node::Reference(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Scalar> for Node {
    fn from(value: Scalar) -> Self {
        Node::Literal(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Literal(Scalar::String(value.to_string()))
    }
}

impl From<&String> for Node {
    fn from(value: &String) -> Self {
        Node::Literal(Scalar::String(value.clone()))
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Literal(Scalar::String(value))
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Literal(Scalar::Integer(value))
    }
}

impl From<u32> for Node {
    fn from(value: u32) -> Self {
        Node::Literal(Scalar::Integer(i64::from(value)))
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::Literal(Scalar::Float(value))
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Literal(Scalar::Bool(value))
    }
}

impl From<Body> for Node {
    fn from(value: Body) -> Self {
        Node::Map(value)
    }
}

impl From<Vec<Node>> for Node {
    fn from(value: Vec<Node>) -> Self {
        Node::List(value)
    }
}

/// Ordered mapping of unique keys to nodes.
///
/// Re-inserting a key replaces its value and keeps its original position.
#[derive(Debug, Clone, Default)]
pub struct Body {
    entries: IndexMap<String, Node>,
}

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Node>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Node>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.get(key)
    }

    /// Follow a dotted path through nested maps and blocks.
    pub fn lookup(&self, path: &str) -> Option<&Node> {
        let mut parts = path.split('.');
        let mut node = self.get(parts.next()?)?;
        for part in parts {
            node = node.as_body()?.get(part)?;
        }
        Some(node)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Order-sensitive equality.
impl PartialEq for Body {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len() && self.entries.iter().eq(other.entries.iter())
    }
}

impl<K: Into<String>, V: Into<Node>> FromIterator<(K, V)> for Body {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut body = Body::new();
        for (k, v) in iter {
            body.insert(k, v);
        }
        body
    }
}

/// Top-level block keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Root `terraform` block holding required providers and the backend.
    Terraform,
    Provider,
    Module,
    Data,
    Resource,
    Locals,
    Output,
}

impl BlockKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            BlockKind::Terraform => "terraform",
            BlockKind::Provider => "provider",
            BlockKind::Module => "module",
            BlockKind::Data => "data",
            BlockKind::Resource => "resource",
            BlockKind::Locals => "locals",
            BlockKind::Output => "output",
        }
    }

    /// Number of quoted labels between the keyword and the body.
    pub fn label_count(&self) -> usize {
        match self {
            BlockKind::Terraform | BlockKind::Locals => 0,
            BlockKind::Provider | BlockKind::Module | BlockKind::Output => 1,
            BlockKind::Data | BlockKind::Resource => 2,
        }
    }
}

/// One top-level block of generated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub kind: BlockKind,
    pub labels: Vec<String>,
    pub body: Body,
}

impl Declaration {
    pub fn new(kind: BlockKind, labels: Vec<String>, body: Body) -> Self {
        Self { kind, labels, body }
    }

    pub fn terraform(body: Body) -> Self {
        Self::new(BlockKind::Terraform, Vec::new(), body)
    }

    pub fn provider(name: impl Into<String>, body: Body) -> Self {
        Self::new(BlockKind::Provider, vec![name.into()], body)
    }

    /// Module block; `source` and `version` come first in the body.
    pub fn module(name: impl Into<String>, source: &str, version: &str, args: Body) -> Self {
        let mut body = Body::new().with("source", source).with("version", version);
        for (key, value) in args.entries {
            body.insert(key, value);
        }
        Self::new(BlockKind::Module, vec![name.into()], body)
    }

    pub fn data(source: impl Into<String>, name: impl Into<String>, body: Body) -> Self {
        Self::new(BlockKind::Data, vec![source.into(), name.into()], body)
    }

    pub fn resource(resource_type: impl Into<String>, name: impl Into<String>, body: Body) -> Self {
        Self::new(BlockKind::Resource, vec![resource_type.into(), name.into()], body)
    }

    pub fn locals(body: Body) -> Self {
        Self::new(BlockKind::Locals, Vec::new(), body)
    }

    pub fn output(name: impl Into<String>, body: Body) -> Self {
        Self::new(BlockKind::Output, vec![name.into()], body)
    }

    /// `keyword "label" ...`, used for logging and lookups.
    pub fn address(&self) -> String {
        let mut address = self.kind.keyword().to_string();
        for label in &self.labels {
            address.push('.');
            address.push_str(label);
        }
        address
    }
}

/// Renders declaration trees as HCL text.
#[derive(Debug, Clone)]
pub struct HclSerializer {
    max_depth: usize,
}

impl Default for HclSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl HclSerializer {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the nesting ceiling. The top-level body is depth 1.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn serialize_declaration(&self, declaration: &Declaration) -> IacResult<String> {
        let labels: Vec<&str> = declaration.labels.iter().map(String::as_str).collect();
        self.serialize(declaration.kind, &labels, &declaration.body)
    }

    /// Render one top-level block.
    pub fn serialize(&self, kind: BlockKind, labels: &[&str], body: &Body) -> IacResult<String> {
        if labels.len() != kind.label_count() {
            return Err(IacError::InvalidInput(format!(
                "{} block takes {} label(s), got {}",
                kind.keyword(),
                kind.label_count(),
                labels.len()
            )));
        }

        let mut out = String::from(kind.keyword());
        for label in labels {
            let _ = write!(out, " {}", quote(label));
        }

        if body.is_empty() {
            out.push_str(" {}\n");
            return Ok(out);
        }

        out.push_str(" {\n");
        self.render_body(&mut out, body, 1, 1)?;
        out.push_str("}\n");
        Ok(out)
    }

    /// Render a single node as it would appear after `key = `.
    pub fn render(&self, node: &Node, indent_level: usize) -> IacResult<String> {
        let mut out = String::new();
        self.render_node(&mut out, node, indent_level, 1)?;
        Ok(out)
    }

    fn render_body(&self, out: &mut String, body: &Body, indent: usize, depth: usize) -> IacResult<()> {
        if depth > self.max_depth {
            return Err(IacError::MaxRecursionExceeded { limit: self.max_depth });
        }

        let width = body
            .iter()
            .filter(|(_, node)| !matches!(node, Node::Block(_)))
            .map(|(key, _)| render_key(key).chars().count())
            .max()
            .unwrap_or(0);
        let pad = INDENT.repeat(indent);

        for (key, node) in body.iter() {
            match node {
                Node::Block(inner) if inner.is_empty() => {
                    let _ = writeln!(out, "{}{} {{}}", pad, key);
                }
                Node::Block(inner) => {
                    let _ = writeln!(out, "{}{} {{", pad, key);
                    self.render_body(out, inner, indent + 1, depth + 1)?;
                    let _ = writeln!(out, "{}}}", pad);
                }
                _ => {
                    let _ = write!(out, "{}{:<width$} = ", pad, render_key(key), width = width);
                    self.render_node(out, node, indent, depth)?;
                    out.push('\n');
                }
            }
        }

        Ok(())
    }

    /// Write `node` inline. `depth` is the depth of the enclosing container.
    fn render_node(&self, out: &mut String, node: &Node, indent: usize, depth: usize) -> IacResult<()> {
        match node {
            Node::Literal(scalar) => out.push_str(&render_scalar(scalar)?),
            Node::Reference(expression) => out.push_str(expression),
            Node::Map(body) | Node::Block(body) if body.is_empty() => {
                if depth + 1 > self.max_depth {
                    return Err(IacError::MaxRecursionExceeded { limit: self.max_depth });
                }
                out.push_str("{}");
            }
            Node::Map(body) | Node::Block(body) => {
                out.push_str("{\n");
                self.render_body(out, body, indent + 1, depth + 1)?;
                out.push_str(&INDENT.repeat(indent));
                out.push('}');
            }
            Node::List(items) => {
                if depth + 1 > self.max_depth {
                    return Err(IacError::MaxRecursionExceeded { limit: self.max_depth });
                }
                if items.is_empty() {
                    out.push_str("[]");
                    return Ok(());
                }
                out.push_str("[\n");
                let item_pad = INDENT.repeat(indent + 1);
                for item in items {
                    if matches!(item, Node::Block(_)) {
                        return Err(IacError::InvalidInput(
                            "nested blocks are only valid as attributes, not as list items".to_string(),
                        ));
                    }
                    out.push_str(&item_pad);
                    self.render_node(out, item, indent + 1, depth + 1)?;
                    out.push_str(",\n");
                }
                out.push_str(&INDENT.repeat(indent));
                out.push(']');
            }
        }
        Ok(())
    }
}

fn render_scalar(scalar: &Scalar) -> IacResult<String> {
    match scalar {
        Scalar::String(value) => Ok(quote(value)),
        Scalar::Integer(value) => Ok(value.to_string()),
        // Whole numbers keep a decimal point so they read back as floats.
        Scalar::Float(value) if value.is_finite() && value.fract() == 0.0 => Ok(format!("{:.1}", value)),
        Scalar::Float(value) if value.is_finite() => Ok(value.to_string()),
        Scalar::Float(value) => Err(IacError::InvalidInput(format!("{} cannot be written as a number", value))),
        Scalar::Bool(value) => Ok(value.to_string()),
    }
}

/// Quote and escape a string literal.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Attribute keys that are not plain identifiers are quoted.
fn render_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

pub fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
