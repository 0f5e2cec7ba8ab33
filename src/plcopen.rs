//! Read-only model of a PLCopen TC6 XML project export.
//!
//! Vendor exports disagree on the exact TC6 namespace URI, so elements are
//! matched by local name only. Only the pieces the exporters need are kept:
//! POU names, declared variables, ST body text, and the callee blocks of
//! graphical (FBD/CFC/LD) bodies.

use crate::error::{Error, Result};
use roxmltree::{Document, Node};
use std::{fs, path::Path};

/// Interface sections and the access keyword each one declares.
const VAR_SECTIONS: &[(&str, &str)] = &[
    ("localVars", "VAR"),
    ("inputVars", "VAR_INPUT"),
    ("outputVars", "VAR_OUTPUT"),
    ("inOutVars", "VAR_IN_OUT"),
    ("externalVars", "VAR_EXTERNAL"),
    ("globalVars", "VAR_GLOBAL"),
    ("tempVars", "VAR_TEMP"),
];

/// A variable declared in a POU interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// Declared name
    pub name: String,
    /// Declared data type (elementary tag name or derived type name)
    pub data_type: String,
    /// Access keyword of the declaring section (VAR, VAR_INPUT, ...)
    pub access: String,
}

/// A program organization unit from the export.
#[derive(Debug, Clone)]
pub struct Pou {
    /// POU name
    pub name: String,
    /// `pouType` attribute when present (program, functionBlock, function)
    pub pou_type: Option<String>,
    /// Variables declared in the interface
    pub variables: Vec<Variable>,
    /// Concatenated text of each ST body
    pub st_bodies: Vec<String>,
    /// Callee type names of graphical-body blocks
    pub block_callees: Vec<String>,
}

/// The parts of a PLCopen project relevant to the exporters.
#[derive(Debug, Clone, Default)]
pub struct Project {
    /// All POUs, in document order
    pub pous: Vec<Pou>,
}

impl Project {
    /// Parses a PLCopen XML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not well-formed XML.
    pub fn parse_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse_str(&content).map_err(|e| Error::xml(path, e))
    }

    /// Parses PLCopen XML from a string.
    ///
    /// # Errors
    ///
    /// Returns the underlying parse error for malformed XML.
    pub fn parse_str(content: &str) -> std::result::Result<Self, roxmltree::Error> {
        let doc = Document::parse(content)?;

        let pous = doc
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().name() == "pou")
            .filter_map(|n| parse_pou(n))
            .collect();

        Ok(Self { pous })
    }

    /// Names of all POUs, in document order.
    #[must_use]
    pub fn pou_names(&self) -> Vec<&str> {
        self.pous.iter().map(|p| p.name.as_str()).collect()
    }
}

fn parse_pou(node: Node<'_, '_>) -> Option<Pou> {
    let name = node.attribute("name")?.to_string();
    let pou_type = node.attribute("pouType").map(str::to_string);

    let mut variables = Vec::new();
    if let Some(interface) = child_by_name(node, "interface") {
        for (section, access) in VAR_SECTIONS {
            for section_node in interface
                .children()
                .filter(|n| n.is_element() && n.tag_name().name() == *section)
            {
                for var in section_node
                    .children()
                    .filter(|n| n.is_element() && n.tag_name().name() == "variable")
                {
                    if let Some(var_name) = var.attribute("name") {
                        variables.push(Variable {
                            name: var_name.to_string(),
                            data_type: variable_type(var),
                            access: (*access).to_string(),
                        });
                    }
                }
            }
        }
    }

    let mut st_bodies = Vec::new();
    let mut block_callees = Vec::new();
    for descendant in node.descendants().filter(Node::is_element) {
        match descendant.tag_name().name() {
            // ST bodies may wrap their text in XHTML.
            "ST" => st_bodies.push(inner_text(descendant)),
            "FBD" | "CFC" | "LD" => {
                for block in descendant
                    .descendants()
                    .filter(|n| n.is_element() && n.tag_name().name() == "block")
                {
                    if let Some(callee) = block_type_name(block) {
                        block_callees.push(callee);
                    }
                }
            }
            _ => {}
        }
    }

    Some(Pou {
        name,
        pou_type,
        variables,
        st_bodies,
        block_callees,
    })
}

/// TC6 puts the callee in a `typeName` attribute; some exporters emit a
/// `typeName` child element instead. Accept either.
fn block_type_name(block: Node<'_, '_>) -> Option<String> {
    if let Some(attr) = block.attribute("typeName") {
        let attr = attr.trim();
        if !attr.is_empty() {
            return Some(attr.to_string());
        }
    }
    child_by_name(block, "typeName")
        .map(inner_text)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn variable_type(var: Node<'_, '_>) -> String {
    let Some(type_node) = child_by_name(var, "type") else {
        return String::new();
    };
    type_node
        .children()
        .find(|n| n.is_element())
        .map(|n| {
            // `<derived name="MyFb"/>` carries the real name in an attribute.
            if n.tag_name().name() == "derived" {
                n.attribute("name").unwrap_or("").to_string()
            } else {
                n.tag_name().name().to_string()
            }
        })
        .unwrap_or_default()
}

fn child_by_name<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

/// All text content under a node, in document order.
///
/// Only text nodes are read; `Node::text` on an element would re-yield the
/// element's first text child and double every run.
fn inner_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}
