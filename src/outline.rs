//! Outline (bookmark) tree builder.
//!
//! Entries arrive one at a time with a nesting level; a level stack turns
//! the flat sequence into a tree. At preparation time the tree is
//! registered bottom-up with deterministic names, threading
//! `First`/`Last`/`Parent`/`Prev`/`Next` and the signed `Count`
//! convention: a closed branch negates its own count without shrinking
//! its ancestors'.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::object::{Dictionary, Object};
use crate::strings::PdfString;

#[derive(Debug, Clone)]
struct Entry {
    title: String,
    destination: String,
    closed: bool,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf(Entry),
    Branch(Entry, Vec<Node>),
}

impl Node {
    fn entry(&self) -> &Entry {
        match self {
            Node::Leaf(e) => e,
            Node::Branch(e, _) => e,
        }
    }

    /// Number of entries in this subtree, itself included.
    fn size(&self) -> i64 {
        match self {
            Node::Leaf(_) => 1,
            Node::Branch(_, children) => 1 + children.iter().map(Node::size).sum::<i64>(),
        }
    }
}

/// Incremental builder for the document outline.
///
/// Stays unused when no entry is added; the catalog then omits
/// `/Outlines` entirely.
#[derive(Debug, Default)]
pub struct OutlineBuilder {
    // stack[i] holds the completed siblings at nesting depth i
    stack: Vec<Vec<Node>>,
}

impl OutlineBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no entry has been added.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Add an outline entry.
    ///
    /// `destination` names a registered named destination. The level may
    /// deepen by exactly one, stay, or return to any enclosing level;
    /// anything else is malformed input.
    pub fn add_entry(
        &mut self,
        destination: &str,
        level: i32,
        title: &str,
        closed: bool,
    ) -> Result<()> {
        if level < 0 {
            return Err(Error::OutlineStructure(format!(
                "negative outline level {}",
                level
            )));
        }
        let level = level as usize;
        let depth = self.stack.len();
        if depth == 0 {
            if level != 0 {
                return Err(Error::OutlineStructure(format!(
                    "first outline entry must be at level 0, got {}",
                    level
                )));
            }
            self.stack.push(Vec::new());
        } else if level >= depth {
            if level > depth {
                return Err(Error::OutlineStructure(format!(
                    "outline level jumped from {} to {}",
                    depth - 1,
                    level
                )));
            }
            self.stack.push(Vec::new());
        } else {
            while self.stack.len() - 1 > level {
                self.collapse_deepest()?;
            }
        }
        let entry = Entry {
            title: title.to_string(),
            destination: destination.to_string(),
            closed,
        };
        self.stack
            .last_mut()
            .ok_or_else(|| Error::OutlineStructure("empty level stack".to_string()))?
            .push(Node::Leaf(entry));
        Ok(())
    }

    // Attach the deepest sibling list as children of the last entry one
    // level up.
    fn collapse_deepest(&mut self) -> Result<()> {
        let children = self
            .stack
            .pop()
            .ok_or_else(|| Error::OutlineStructure("empty level stack".to_string()))?;
        let parent_list = self
            .stack
            .last_mut()
            .ok_or_else(|| Error::OutlineStructure("no parent level to attach to".to_string()))?;
        let parent = parent_list
            .last_mut()
            .ok_or_else(|| Error::OutlineStructure("sublevel without a parent entry".to_string()))?;
        match parent {
            Node::Leaf(entry) => *parent = Node::Branch(entry.clone(), children),
            Node::Branch(_, existing) => existing.extend(children),
        }
        Ok(())
    }

    /// Register the finished tree and return a reference to its root, or
    /// `None` when no entry was ever added.
    pub fn prepare(&mut self, document: &mut Document) -> Result<Option<Object>> {
        while self.stack.len() > 1 {
            self.collapse_deepest()?;
        }
        let roots = match self.stack.pop() {
            Some(roots) if !roots.is_empty() => roots,
            _ => return Ok(None),
        };
        let (first, last, count) = register_siblings(&roots, "Outline", "Outlines", document)?;
        let mut root = Dictionary::new();
        root.insert("Type", Object::Name("Outlines".to_string()));
        root.insert("First", Object::Reference(first));
        root.insert("Last", Object::Reference(last));
        root.insert("Count", count);
        root.mark_reference_only();
        let reference = document.reference(Object::Dictionary(root), Some("Outlines"))?;
        Ok(Some(reference))
    }
}

// Registers a sibling list bottom-up under deterministic names
// `<prefix>.<i>`, returning (first name, last name, total entry count).
fn register_siblings(
    siblings: &[Node],
    prefix: &str,
    parent: &str,
    document: &mut Document,
) -> Result<(String, String, i64)> {
    let names: Vec<String> = (0..siblings.len())
        .map(|i| format!("{}.{}", prefix, i))
        .collect();
    let mut total = 0i64;
    for (i, node) in siblings.iter().enumerate() {
        let entry = node.entry();
        let destination = document
            .named_destination(&entry.destination)
            .cloned()
            .ok_or_else(|| {
                Error::OutlineStructure(format!(
                    "outline entry '{}' points at undefined destination '{}'",
                    entry.title, entry.destination
                ))
            })?;
        let mut dict = Dictionary::new();
        dict.insert("Title", PdfString::new(entry.title.clone()));
        dict.insert("Parent", Object::Reference(parent.to_string()));
        dict.insert("Dest", destination);
        if i > 0 {
            dict.insert("Prev", Object::Reference(names[i - 1].clone()));
        }
        if i + 1 < siblings.len() {
            dict.insert("Next", Object::Reference(names[i + 1].clone()));
        }
        if let Node::Branch(_, children) = node {
            let (first, last, descendants) =
                register_siblings(children, &names[i], &names[i], document)?;
            dict.insert("First", Object::Reference(first));
            dict.insert("Last", Object::Reference(last));
            let count = if entry.closed {
                -descendants
            } else {
                descendants
            };
            dict.insert("Count", count);
        }
        dict.mark_reference_only();
        document.reference(Object::Dictionary(dict), Some(&names[i]))?;
        total += node.size();
    }
    let first = names
        .first()
        .cloned()
        .ok_or_else(|| Error::OutlineStructure("empty sibling list".to_string()))?;
    let last = names
        .last()
        .cloned()
        .ok_or_else(|| Error::OutlineStructure("empty sibling list".to_string()))?;
    Ok((first, last, total))
}
