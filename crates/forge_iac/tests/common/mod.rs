//! Shared fixtures and a reader for the emitted block syntax.

#![allow(dead_code)]

use forge_config::{CloudFacts, ClusterConfig, LockTable, NodeGroup, Tag};
use forge_iac::{Body, Node, Scalar};

pub fn facts() -> CloudFacts {
    CloudFacts::new()
        .with_regions(["us-east-1", "eu-west-1"])
        .with_zones(["us-east-1a", "us-east-1b", "us-east-1c"])
        .with_instance_types(["t3.medium", "m5.large"])
        .with_bucket("forge-state")
        .with_lock_table(LockTable::new("forge-locks", "LockID"))
}

pub fn node_group_config() -> ClusterConfig {
    ClusterConfig {
        aws_region: "us-east-1".to_string(),
        cidr_block: "10.0.0.0/16".parse().unwrap(),
        availability_zones: vec!["us-east-1a".to_string(), "us-east-1b".to_string()],
        cluster_name: "demo".to_string(),
        eks_version: "1.27".to_string(),
        fargate: false,
        node_groups: vec![
            NodeGroup::new("general", "t3.medium", 1, 3).with_desired(2),
            NodeGroup::new("batch", "m5.large", 2, 6),
        ],
        cluster_namespaces: vec!["kube-system".to_string()],
        ingress_type: "alb".to_string(),
        resource_owner: "platform-team".to_string(),
        environment: "dev".to_string(),
        additional_tags: Vec::new(),
        bucket_name: "forge-state".to_string(),
        dynamodb_table_name: "forge-locks".to_string(),
        cluster_admin_role: "eks-cluster-admin".to_string(),
        cluster_developer_role: "eks-cluster-developer".to_string(),
    }
}

pub fn fargate_config() -> ClusterConfig {
    ClusterConfig {
        fargate: true,
        node_groups: Vec::new(),
        cluster_namespaces: vec!["kube-system".to_string(), "default".to_string(), "apps".to_string()],
        ..node_group_config()
    }
}

pub fn with_tags(mut config: ClusterConfig, tags: &[(&str, &str)]) -> ClusterConfig {
    config.additional_tags = tags.iter().map(|(k, v)| Tag::new(*k, *v)).collect();
    config
}

/// A parsed top-level block: the header line without the brace, and its body.
#[derive(Debug)]
pub struct ParsedBlock {
    pub header: String,
    pub body: Body,
}

/// Parse text produced by the serializer back into trees.
///
/// Unquoted values become integers, floats or booleans when they parse as
/// such, and references otherwise.
pub fn parse_document(text: &str) -> Vec<ParsedBlock> {
    let mut parser = Parser {
        lines: text.lines().map(str::trim).filter(|l| !l.is_empty()).collect(),
        pos: 0,
    };
    let mut blocks = Vec::new();
    while let Some(line) = parser.next() {
        if let Some(header) = line.strip_suffix(" {}") {
            blocks.push(ParsedBlock {
                header: header.to_string(),
                body: Body::new(),
            });
        } else {
            let header = line.strip_suffix(" {").expect("block header");
            blocks.push(ParsedBlock {
                header: header.to_string(),
                body: parser.body(),
            });
        }
    }
    blocks
}

struct Parser<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn next(&mut self) -> Option<&'a str> {
        let line = self.lines.get(self.pos).copied();
        self.pos += 1;
        line
    }

    fn body(&mut self) -> Body {
        let mut body = Body::new();
        loop {
            let line = self.next().expect("unterminated body");
            if line.starts_with('}') {
                return body;
            }
            if let Some((key, value)) = split_attribute(line) {
                let node = self.value(value);
                body.insert(unquote_key(key), node);
            } else if let Some(key) = line.strip_suffix(" {}") {
                body.insert(key, Node::Block(Body::new()));
            } else {
                let key = line.strip_suffix(" {").expect("nested block");
                let inner = self.body();
                body.insert(key, Node::Block(inner));
            }
        }
    }

    fn list(&mut self) -> Vec<Node> {
        let mut items = Vec::new();
        loop {
            let line = self.next().expect("unterminated list");
            if line.starts_with(']') {
                return items;
            }
            let item = line.strip_suffix(',').unwrap_or(line);
            items.push(self.value(item));
        }
    }

    fn value(&mut self, text: &str) -> Node {
        match text {
            "{" => Node::Map(self.body()),
            "{}" => Node::Map(Body::new()),
            "[" => Node::List(self.list()),
            "[]" => Node::List(Vec::new()),
            _ => scalar(text),
        }
    }
}

fn split_attribute(line: &str) -> Option<(&str, &str)> {
    let idx = if line.starts_with('"') {
        let close = closing_quote(line)?;
        close + line[close..].find(" = ")?
    } else {
        line.find(" = ")?
    };
    Some((line[..idx].trim_end(), line[idx + 3..].trim()))
}

fn closing_quote(text: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in text.char_indices().skip(1) {
        match c {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => return Some(i),
            _ => escaped = false,
        }
    }
    None
}

fn unquote_key(key: &str) -> String {
    if key.starts_with('"') {
        unescape(&key[1..key.len() - 1])
    } else {
        key.to_string()
    }
}

fn scalar(text: &str) -> Node {
    if text.starts_with('"') {
        return Node::Literal(Scalar::String(unescape(&text[1..text.len() - 1])));
    }
    match text {
        "true" => Node::Literal(Scalar::Bool(true)),
        "false" => Node::Literal(Scalar::Bool(false)),
        _ => {
            if let Ok(value) = text.parse::<i64>() {
                Node::Literal(Scalar::Integer(value))
            } else if let Ok(value) = text.parse::<f64>() {
                Node::Literal(Scalar::Float(value))
            } else {
                Node::Reference(text.to_string())
            }
        }
    }
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// The block whose header matches exactly.
pub fn find_block<'a>(blocks: &'a [ParsedBlock], header: &str) -> Option<&'a ParsedBlock> {
    blocks.iter().find(|b| b.header == header)
}
