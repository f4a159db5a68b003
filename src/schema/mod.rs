//! Document schema: the ordered tree of sections and source documents.
//!
//! A schema is written as a JSON object whose keys are titles. A value is
//! either a list of file names (a *leaf*) or another object (a *section*).
//! Two reserved keys may appear inside a section object:
//!
//! - `"_toc_": true` turns the section into the TOC placement marker. The
//!   marker must not have other keys.
//! - `"_hidden_": true` keeps the section and everything below it out of the
//!   table of contents and the outline.
//!
//! Declaration order is preserved; it determines page order and TOC order.
//!
//! # Examples
//!
//! ```
//! use pdfbinder::schema::Schema;
//!
//! let schema: Schema = serde_json::from_str(r#"{
//!     "Introduction": { "_hidden_": true, "Cover": ["cover.pdf"] },
//!     "Contents": { "_toc_": true },
//!     "Chapter 1": ["ch1.pdf"]
//! }"#).unwrap();
//!
//! schema.validate().unwrap();
//! assert_eq!(schema.children().len(), 3);
//! ```

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{BinderError, Result};

/// Reserved key marking the TOC placement.
pub const TOC_MARKER_KEY: &str = "_toc_";

/// Reserved key excluding a section from the table of contents.
pub const HIDDEN_KEY: &str = "_hidden_";

/// One node of the schema tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SchemaNode {
    /// Named children, walked in declaration order.
    Section(Section),
    /// Ordered source documents.
    Leaf(Leaf),
    /// Placement of the rendered table of contents.
    TocMarker,
}

/// A section: ordered named children plus the hidden flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    /// Excluded from the table of contents, together with its descendants.
    pub hidden: bool,
    /// Children in declaration order.
    pub children: Vec<SchemaChild>,
}

/// A titled child of a section.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaChild {
    /// Title shown in the table of contents.
    pub title: String,
    /// The child node.
    pub node: SchemaNode,
}

/// A leaf: source document names relative to the input directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Leaf {
    /// File names or glob patterns, in insertion order.
    pub files: Vec<String>,
}

/// The root of a document schema.
///
/// The root behaves like an untitled, visible section: its children are
/// walked at level 1 and it produces no entry of its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    root: Section,
}

impl Schema {
    /// Create a schema from top-level children.
    pub fn new(children: Vec<SchemaChild>) -> Self {
        Self {
            root: Section {
                hidden: false,
                children,
            },
        }
    }

    /// Top-level children in declaration order.
    pub fn children(&self) -> &[SchemaChild] {
        &self.root.children
    }

    /// Check structural rules that the deserializer cannot see locally.
    ///
    /// # Errors
    ///
    /// Returns [`BinderError::InvalidSchema`] if:
    /// - the schema is empty
    /// - a title or file name is empty
    /// - the `_hidden_` flag is set on the root
    /// - more than one TOC marker is present
    pub fn validate(&self) -> Result<()> {
        if self.root.hidden {
            return Err(BinderError::invalid_schema(
                "the top level of the schema cannot be hidden",
            ));
        }

        if self.root.children.is_empty() {
            return Err(BinderError::invalid_schema("schema has no sections"));
        }

        let mut markers = Vec::new();
        validate_section(&self.root, &mut Vec::new(), &mut markers)?;

        if markers.len() > 1 {
            return Err(BinderError::invalid_schema(format!(
                "TOC placement marker appears {} times ({}); only one is allowed",
                markers.len(),
                markers.join(", ")
            )));
        }

        Ok(())
    }

    /// Whether the schema contains a TOC placement marker.
    pub fn has_toc_marker(&self) -> bool {
        fn search(section: &Section) -> bool {
            section.children.iter().any(|child| match &child.node {
                SchemaNode::TocMarker => true,
                SchemaNode::Section(inner) => search(inner),
                SchemaNode::Leaf(_) => false,
            })
        }
        search(&self.root)
    }

    /// Number of file names (or patterns) listed across all leaves.
    pub fn file_count(&self) -> usize {
        fn count(section: &Section) -> usize {
            section
                .children
                .iter()
                .map(|child| match &child.node {
                    SchemaNode::Section(inner) => count(inner),
                    SchemaNode::Leaf(leaf) => leaf.files.len(),
                    SchemaNode::TocMarker => 0,
                })
                .sum()
        }
        count(&self.root)
    }
}

fn validate_section(
    section: &Section,
    path: &mut Vec<String>,
    markers: &mut Vec<String>,
) -> Result<()> {
    for child in &section.children {
        if child.title.trim().is_empty() {
            return Err(BinderError::invalid_schema(format!(
                "empty title under {}",
                describe_path(path)
            )));
        }

        path.push(child.title.clone());
        match &child.node {
            SchemaNode::TocMarker => markers.push(describe_path(path)),
            SchemaNode::Section(inner) => validate_section(inner, path, markers)?,
            SchemaNode::Leaf(leaf) => {
                if leaf.files.iter().any(|file| file.trim().is_empty()) {
                    return Err(BinderError::invalid_schema(format!(
                        "empty file name in {}",
                        describe_path(path)
                    )));
                }
            }
        }
        path.pop();
    }

    Ok(())
}

fn describe_path(path: &[String]) -> String {
    if path.is_empty() {
        "the top level".to_string()
    } else {
        format!("\"{}\"", path.join(" / "))
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match deserializer.deserialize_map(NodeVisitor)? {
            SchemaNode::Section(root) => Ok(Self { root }),
            SchemaNode::TocMarker => Err(de::Error::custom(
                "the top level of the schema cannot be the TOC marker",
            )),
            SchemaNode::Leaf(_) => Err(de::Error::custom(
                "the top level of the schema must be an object",
            )),
        }
    }
}

impl<'de> Deserialize<'de> for SchemaNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = SchemaNode;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a section object or a list of file names")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error> {
        let mut files = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(file) = seq.next_element::<String>()? {
            files.push(file);
        }
        Ok(SchemaNode::Leaf(Leaf { files }))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
        let mut section = Section::default();
        let mut toc_marker = false;
        let mut seen = HashSet::new();

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                TOC_MARKER_KEY => toc_marker = map.next_value::<bool>()?,
                HIDDEN_KEY => section.hidden = map.next_value::<bool>()?,
                directive if is_directive(directive) => {
                    return Err(de::Error::custom(format!(
                        "unknown directive \"{directive}\" (expected \"{TOC_MARKER_KEY}\" or \"{HIDDEN_KEY}\")"
                    )));
                }
                _ => {
                    if !seen.insert(key.clone()) {
                        return Err(de::Error::custom(format!("duplicate title \"{key}\"")));
                    }
                    let node = map.next_value::<SchemaNode>()?;
                    section.children.push(SchemaChild { title: key, node });
                }
            }
        }

        if toc_marker {
            if !section.children.is_empty() || section.hidden {
                return Err(de::Error::custom(format!(
                    "a section marked \"{TOC_MARKER_KEY}\" cannot have other keys"
                )));
            }
            return Ok(SchemaNode::TocMarker);
        }

        Ok(SchemaNode::Section(section))
    }
}

fn is_directive(key: &str) -> bool {
    key.len() > 2 && key.starts_with('_') && key.ends_with('_')
}

impl Serialize for Section {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let extra = usize::from(self.hidden);
        let mut map = serializer.serialize_map(Some(self.children.len() + extra))?;
        if self.hidden {
            map.serialize_entry(HIDDEN_KEY, &true)?;
        }
        for child in &self.children {
            match &child.node {
                SchemaNode::TocMarker => {
                    let marker: [(&str, bool); 1] = [(TOC_MARKER_KEY, true)];
                    map.serialize_entry(&child.title, &MarkerMap(marker))?;
                }
                node => map.serialize_entry(&child.title, node)?,
            }
        }
        map.end()
    }
}

struct MarkerMap([(&'static str, bool); 1]);

impl Serialize for MarkerMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(key, value)| (*key, *value)))
    }
}

impl Serialize for Schema {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}
