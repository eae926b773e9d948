//! Read-only snapshot of the host page document.
//!
//! The node shape mirrors the CDP `DOM.getDocument` result, so a snapshot
//! taken over the DevTools protocol deserializes directly. The classifier
//! only reads these trees; the in-memory apply step and test fakes use the
//! attribute and style setters.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::PageError;

/// Node identifier assigned by the page context.
pub type NodeId = i64;

pub const ELEMENT_NODE: i64 = 1;
pub const TEXT_NODE: i64 = 3;
pub const DOCUMENT_NODE: i64 = 9;

/// DOM node snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomNode {
    pub node_id: NodeId,
    pub node_type: i64,
    pub node_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_value: Option<String>,
    /// Flat `[name, value, name, value, ...]` list, as CDP reports it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DomNode>,
}

impl DomNode {
    /// Create a document root.
    pub fn document(node_id: NodeId) -> Self {
        Self {
            node_id,
            node_type: DOCUMENT_NODE,
            node_name: "#document".to_string(),
            node_value: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create an element node.
    pub fn element(node_id: NodeId, tag: impl Into<String>) -> Self {
        Self {
            node_id,
            node_type: ELEMENT_NODE,
            node_name: tag.into().to_ascii_uppercase(),
            node_value: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a text node.
    pub fn text(node_id: NodeId, value: impl Into<String>) -> Self {
        Self {
            node_id,
            node_type: TEXT_NODE,
            node_name: "#text".to_string(),
            node_value: Some(value.into()),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(&name.into(), &value.into());
        self
    }

    pub fn with_child(mut self, child: DomNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = DomNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Convert a raw JSON node, dropping malformed subtrees.
    ///
    /// Only the node itself must be well formed. A child that fails to
    /// convert is skipped with a warning and its siblings are kept.
    pub fn from_value(value: &Value) -> Result<Self, PageError> {
        let node_id = value
            .get("nodeId")
            .and_then(Value::as_i64)
            .ok_or_else(|| PageError::InvalidResponse("node without nodeId".to_string()))?;
        let node_type = value
            .get("nodeType")
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                PageError::InvalidResponse(format!("node {} without nodeType", node_id))
            })?;
        let node_name = value
            .get("nodeName")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                PageError::InvalidResponse(format!("node {} without nodeName", node_id))
            })?
            .to_string();
        let node_value = value
            .get("nodeValue")
            .and_then(Value::as_str)
            .map(str::to_string);

        let attributes = match value.get("attributes") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .filter(|attrs| attrs.len() % 2 == 0)
                .ok_or_else(|| {
                    PageError::InvalidResponse(format!("node {} has malformed attributes", node_id))
                })?,
            Some(_) => {
                return Err(PageError::InvalidResponse(format!(
                    "node {} has malformed attributes",
                    node_id
                )));
            }
        };

        let mut children = Vec::new();
        if let Some(Value::Array(items)) = value.get("children") {
            for child in items {
                match Self::from_value(child) {
                    Ok(node) => children.push(node),
                    Err(e) => warn!("Skipping malformed child of node {}: {}", node_id, e),
                }
            }
        }

        Ok(Self {
            node_id,
            node_type,
            node_name,
            node_value,
            attributes,
            children,
        })
    }

    pub fn is_element(&self) -> bool {
        self.node_type == ELEMENT_NODE
    }

    /// Case-insensitive tag name check.
    pub fn is_tag(&self, tag: &str) -> bool {
        self.is_element() && self.node_name.eq_ignore_ascii_case(tag)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .chunks_exact(2)
            .find(|pair| pair[0] == name)
            .map(|pair| pair[1].as_str())
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let slot = self
            .attributes
            .chunks_exact_mut(2)
            .find(|pair| pair[0] == name);
        match slot {
            Some(pair) => pair[1] = value.to_string(),
            None => {
                self.attributes.push(name.to_string());
                self.attributes.push(value.to_string());
            }
        }
    }

    /// Remove an attribute. Returns whether it was present.
    pub fn remove_attribute(&mut self, name: &str) -> bool {
        let position = self
            .attributes
            .chunks_exact(2)
            .position(|pair| pair[0] == name);
        match position {
            Some(index) => {
                self.attributes.drain(index * 2..index * 2 + 2);
                true
            }
            None => false,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Concatenated text of all descendant text nodes (`textContent`).
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if self.node_type == TEXT_NODE {
            if let Some(ref value) = self.node_value {
                out.push_str(value);
            }
            return;
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Descendants in document order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    pub fn find(&self, node_id: NodeId) -> Option<&DomNode> {
        if self.node_id == node_id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(node_id))
    }

    pub fn find_mut(&mut self, node_id: NodeId) -> Option<&mut DomNode> {
        if self.node_id == node_id {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_mut(node_id))
    }

    /// Whether the inline style carries `display: none`.
    pub fn is_display_hidden(&self) -> bool {
        self.attribute("style")
            .map(|style| {
                style_declarations(style)
                    .any(|(prop, value)| prop == "display" && value == "none")
            })
            .unwrap_or(false)
    }

    /// Set or clear the inline `display: none`, keeping other declarations.
    ///
    /// Clearing removes any inline `display`, matching `style.display = ''`.
    pub fn set_display_hidden(&mut self, hidden: bool) {
        let mut declarations: Vec<String> = self
            .attribute("style")
            .map(|style| {
                style_declarations(style)
                    .filter(|(prop, _)| *prop != "display")
                    .map(|(prop, value)| format!("{}: {}", prop, value))
                    .collect()
            })
            .unwrap_or_default();

        if hidden {
            declarations.push("display: none".to_string());
        }

        if declarations.is_empty() {
            self.remove_attribute("style");
        } else {
            self.set_attribute("style", &format!("{};", declarations.join("; ")));
        }
    }
}

fn style_declarations(style: &str) -> impl Iterator<Item = (&str, &str)> {
    style.split(';').filter_map(|decl| {
        let (prop, value) = decl.split_once(':')?;
        Some((prop.trim(), value.trim()))
    })
}

/// Pre-order iterator over a node's descendants.
pub struct Descendants<'a> {
    stack: Vec<&'a DomNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a DomNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
#[path = "dom_tests.rs"]
mod tests;
