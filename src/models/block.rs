use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::CollabError;

/// The fixed set of block kinds a page can contain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Text,
    Image,
    Button,
    Container,
    Form,
    Divider,
    Card,
    List,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Text => write!(f, "text"),
            BlockKind::Image => write!(f, "image"),
            BlockKind::Button => write!(f, "button"),
            BlockKind::Container => write!(f, "container"),
            BlockKind::Form => write!(f, "form"),
            BlockKind::Divider => write!(f, "divider"),
            BlockKind::Card => write!(f, "card"),
            BlockKind::List => write!(f, "list"),
        }
    }
}

/// An atomic content unit of a page.
///
/// Blocks form a tree through loose identifier references: `parent` and
/// `children` hold block ids, not owned structure. Referential integrity and
/// acyclicity are checked by [`validate_blocks`] whenever a client writes a
/// new block set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub content: Map<String, Value>,
    #[serde(default)]
    pub styles: Map<String, Value>,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub order: i32,
}

impl Block {
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            kind,
            content: Map::new(),
            styles: Map::new(),
            children: Vec::new(),
            parent: None,
            order: 0,
        }
    }
}

/// Validate a block set before it is written to a page.
///
/// Rejects duplicate ids, parent references to unknown blocks, child
/// references to unknown blocks, and cycles in the parent chain.
pub fn validate_blocks(blocks: &[Block]) -> Result<(), CollabError> {
    let mut ids: HashSet<&str> = HashSet::with_capacity(blocks.len());
    for block in blocks {
        if !ids.insert(block.id.as_str()) {
            return Err(CollabError::InvalidBlocks(format!(
                "duplicate block id '{}'",
                block.id
            )));
        }
    }

    for block in blocks {
        if let Some(parent) = &block.parent {
            if !ids.contains(parent.as_str()) {
                return Err(CollabError::InvalidBlocks(format!(
                    "block '{}' references unknown parent '{}'",
                    block.id, parent
                )));
            }
        }
        for child in &block.children {
            if !ids.contains(child.as_str()) {
                return Err(CollabError::InvalidBlocks(format!(
                    "block '{}' references unknown child '{}'",
                    block.id, child
                )));
            }
        }
    }

    // Walk the parent chain of every block. A chain longer than the block
    // count can only mean a cycle.
    for block in blocks {
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(block.id.as_str());
        let mut current = block.parent.as_deref();
        while let Some(parent_id) = current {
            if !seen.insert(parent_id) {
                return Err(CollabError::InvalidBlocks(format!(
                    "cycle detected through block '{}'",
                    parent_id
                )));
            }
            current = blocks
                .iter()
                .find(|b| b.id == parent_id)
                .and_then(|b| b.parent.as_deref());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child_of(id: &str, parent: &str) -> Block {
        let mut b = Block::new(id, BlockKind::Text);
        b.parent = Some(parent.to_string());
        b
    }

    #[test]
    fn valid_tree_passes() {
        let mut root = Block::new("root", BlockKind::Container);
        root.children = vec!["a".to_string(), "b".to_string()];
        let mut a = child_of("a", "root");
        a.order = 0;
        let mut b = child_of("b", "root");
        b.order = 1;
        assert!(validate_blocks(&[root, a, b]).is_ok());
    }

    #[test]
    fn duplicate_ids_rejected() {
        let blocks = vec![Block::new("x", BlockKind::Text), Block::new("x", BlockKind::Image)];
        assert!(matches!(
            validate_blocks(&blocks),
            Err(CollabError::InvalidBlocks(_))
        ));
    }

    #[test]
    fn unknown_parent_rejected() {
        let blocks = vec![child_of("a", "ghost")];
        assert!(validate_blocks(&blocks).is_err());
    }

    #[test]
    fn unknown_child_rejected() {
        let mut root = Block::new("root", BlockKind::Container);
        root.children = vec!["missing".to_string()];
        assert!(validate_blocks(&[root]).is_err());
    }

    #[test]
    fn parent_cycle_rejected() {
        // a -> b -> c -> a
        let a = child_of("a", "b");
        let b = child_of("b", "c");
        let c = child_of("c", "a");
        assert!(matches!(
            validate_blocks(&[a, b, c]),
            Err(CollabError::InvalidBlocks(_))
        ));
    }

    #[test]
    fn self_parent_rejected() {
        let blocks = vec![child_of("a", "a")];
        assert!(validate_blocks(&blocks).is_err());
    }

    #[test]
    fn block_kind_serializes_lowercase() {
        let json = serde_json::to_string(&BlockKind::Container).unwrap();
        assert_eq!(json, "\"container\"");
        let kind: BlockKind = serde_json::from_str("\"divider\"").unwrap();
        assert_eq!(kind, BlockKind::Divider);
    }
}
