//! Routes consumed by the document assembler
//!
//! The assembler only needs a handful of facts about each route: its name,
//! HTTP methods, path with typed attributes, optional documentation strings
//! and the program element that implements it.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::holder::HolderRef;

/// One attribute declared in a path template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathAttribute {
    pub name: String,
    pub pattern: Option<String>,
    pub is_optional: bool,
}

/// A routed endpoint
pub trait Route: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn methods(&self) -> &[String];

    /// Path with attribute patterns and optional-group markers removed
    fn plain_path(&self) -> String;

    fn path_attributes(&self) -> Vec<PathAttribute>;

    fn summary(&self) -> Option<&str> {
        None
    }

    fn description(&self) -> Option<&str> {
        None
    }

    fn tags(&self) -> &[String] {
        &[]
    }

    /// Program element implementing the route
    fn holder(&self) -> Option<&HolderRef>;
}

/// A route declared in data, with a templated path.
///
/// Path templates use `{name}` for attributes, `{name<pattern>}` for
/// attributes constrained by a regex and parentheses for optional groups:
/// `/users/{id<\d+>}(/{tab})`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDefinition {
    pub name: String,
    pub path: String,
    #[serde(default = "default_methods")]
    pub methods: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<HolderRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

fn default_methods() -> Vec<String> {
    vec!["GET".to_string()]
}

fn attribute_regex() -> &'static Regex {
    static ATTRIBUTE: OnceLock<Regex> = OnceLock::new();
    ATTRIBUTE.get_or_init(|| {
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)(?:<([^>]+)>)?\}").expect("attribute regex is valid")
    })
}

/// Segment of a parsed path template
enum Segment<'a> {
    Literal(&'a str),
    Attribute(PathAttribute),
}

fn parse_template(path: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut cursor = 0;
    let mut depth = 0usize;

    for caps in attribute_regex().captures_iter(path) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let literal = &path[cursor..whole.start()];
        for c in literal.chars() {
            match c {
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        segments.push(Segment::Literal(literal));
        segments.push(Segment::Attribute(PathAttribute {
            name: caps[1].to_string(),
            pattern: caps.get(2).map(|m| m.as_str().to_string()),
            is_optional: depth > 0,
        }));
        cursor = whole.end();
    }
    segments.push(Segment::Literal(&path[cursor..]));
    segments
}

impl RouteDefinition {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            methods: default_methods(),
            holder: None,
            summary: None,
            description: None,
            tags: Vec::new(),
        }
    }

    pub fn with_methods(mut self, methods: &[&str]) -> Self {
        self.methods = methods.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn with_holder(mut self, holder: HolderRef) -> Self {
        self.holder = Some(holder);
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

impl Route for RouteDefinition {
    fn name(&self) -> &str {
        &self.name
    }

    fn methods(&self) -> &[String] {
        &self.methods
    }

    fn plain_path(&self) -> String {
        let mut plain = String::with_capacity(self.path.len());
        for segment in parse_template(&self.path) {
            match segment {
                Segment::Literal(text) => {
                    plain.extend(text.chars().filter(|c| *c != '(' && *c != ')'));
                }
                Segment::Attribute(attr) => {
                    plain.push('{');
                    plain.push_str(&attr.name);
                    plain.push('}');
                }
            }
        }
        plain
    }

    fn path_attributes(&self) -> Vec<PathAttribute> {
        parse_template(&self.path)
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::Attribute(attr) => Some(attr),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn holder(&self) -> Option<&HolderRef> {
        self.holder.as_ref()
    }
}
