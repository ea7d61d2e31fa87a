//! In-memory tree data-structure behind the sidebar.
//!
//! The [`Node`] is the fundamental unit – a named file or folder.  Nodes live
//! in an arena (the [`Forest`] struct) and link to each other via indices,
//! which avoids recursive `Box` allocations, is cache-friendly, and makes
//! borrowing trivial.  The arena is append-only: nodes are never removed, so
//! a [`NodeId`] stays valid for the whole session and doubles as the stable
//! key tying a model node to its rendered row.
//!
//! The wire encoding ([`WireNode`]) is the tagged JSON variant the sidebar
//! document uses: `{"type": "file", "name": ...}` or
//! `{"type": "folder", "name": ..., "children": [...], "open": bool}`.

use serde::{Deserialize, Serialize};

// ───────────────────────────────────────── node ──────────────

/// Index into [`Forest::nodes`].
pub type NodeId = usize;

/// What kind of entry a node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Folder,
}

/// A single node in the arena-allocated forest.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    /// Child ids in display order.  Always empty for files.
    pub children: Vec<NodeId>,
    /// Persisted initial-open flag.  Read once when seeding the view's fold
    /// state; toggling a folder in the view never writes it back.
    pub open: bool,
    /// Depth from the root level (0 = root).
    pub depth: usize,
}

impl Node {
    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }
}

// ───────────────────────────────────────── wire encoding ─────

/// One node as it appears in the sidebar JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WireNode {
    File {
        name: String,
    },
    Folder {
        name: String,
        #[serde(default)]
        children: Vec<WireNode>,
        #[serde(default)]
        open: bool,
    },
}

// ───────────────────────────────────────── arena forest ──────

/// Arena-backed ordered forest of sidebar nodes.
///
/// Nodes are stored in a flat `Vec` and reference each other by index.  The
/// forest has no synthetic super-root: `roots` lists the top-level entries
/// in display order.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    pub nodes: Vec<Node>,
    pub roots: Vec<NodeId>,
}

impl Forest {
    /// An empty forest — the failover value when no document loads.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Append a node at the end of the root level and return its id.
    pub fn add_root(&mut self, name: impl Into<String>, kind: NodeKind) -> NodeId {
        let id = self.push_node(name.into(), kind, None, 0);
        self.roots.push(id);
        id
    }

    /// Append a child at the end of `parent`'s children and return its id.
    ///
    /// Duplicate sibling names are allowed — the sidebar never rejects or
    /// disambiguates them.
    pub fn add_child(&mut self, parent: NodeId, name: impl Into<String>, kind: NodeKind) -> NodeId {
        let depth = self.nodes[parent].depth + 1;
        let id = self.push_node(name.into(), kind, Some(parent), depth);
        self.nodes[parent].children.push(id);
        id
    }

    fn push_node(
        &mut self,
        name: String,
        kind: NodeKind,
        parent: Option<NodeId>,
        depth: usize,
    ) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            name,
            kind,
            parent,
            children: Vec::new(),
            open: false,
            depth,
        });
        id
    }

    /// Return a reference to a node.
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Depth-first pre-order search across the whole forest for the first
    /// folder named `name`.  With duplicate folder names, whichever folder is
    /// encountered first in pre-order wins; callers that need a stronger
    /// identity should hold a [`NodeId`] instead.
    pub fn find_folder(&self, name: &str) -> Option<NodeId> {
        fn walk(forest: &Forest, id: NodeId, name: &str) -> Option<NodeId> {
            let node = forest.get(id);
            if node.is_folder() && node.name == name {
                return Some(id);
            }
            node.children
                .iter()
                .find_map(|&child| walk(forest, child, name))
        }
        self.roots.iter().find_map(|&root| walk(self, root, name))
    }

    /// Ids of `id` and all its ancestors, root first.
    pub fn ancestry(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.get(current).parent {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    // ── wire conversion ─────────────────────────────────────────

    /// Build a forest from the wire document.
    pub fn from_wire(wire: &[WireNode]) -> Self {
        let mut forest = Self::new();
        for item in wire {
            forest.graft(item, None);
        }
        forest
    }

    fn graft(&mut self, wire: &WireNode, parent: Option<NodeId>) {
        match wire {
            WireNode::File { name } => {
                self.attach(name.clone(), NodeKind::File, parent, false);
            }
            WireNode::Folder {
                name,
                children,
                open,
            } => {
                let id = self.attach(name.clone(), NodeKind::Folder, parent, *open);
                for child in children {
                    self.graft(child, Some(id));
                }
            }
        }
    }

    fn attach(
        &mut self,
        name: String,
        kind: NodeKind,
        parent: Option<NodeId>,
        open: bool,
    ) -> NodeId {
        let id = match parent {
            Some(p) => self.add_child(p, name, kind),
            None => self.add_root(name, kind),
        };
        self.nodes[id].open = open;
        id
    }

    /// Serialize the whole forest back to the wire document.  Round-trips
    /// losslessly: `from_wire(&f.to_wire())` reproduces `f`.
    pub fn to_wire(&self) -> Vec<WireNode> {
        self.roots.iter().map(|&id| self.node_to_wire(id)).collect()
    }

    fn node_to_wire(&self, id: NodeId) -> WireNode {
        let node = self.get(id);
        match node.kind {
            NodeKind::File => WireNode::File {
                name: node.name.clone(),
            },
            NodeKind::Folder => WireNode::Folder {
                name: node.name.clone(),
                children: node
                    .children
                    .iter()
                    .map(|&child| self.node_to_wire(child))
                    .collect(),
                open: node.open,
            },
        }
    }
}

// ───────────────────────────────────────── tests ─────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_wire() -> Vec<WireNode> {
        serde_json::from_str(
            r#"[
                {"type": "folder", "name": "src", "open": true, "children": [
                    {"type": "file", "name": "main.js"},
                    {"type": "folder", "name": "lib", "children": [
                        {"type": "file", "name": "util.js"}
                    ]}
                ]},
                {"type": "file", "name": "index.html"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn wire_round_trip_is_lossless() {
        let wire = sample_wire();
        let forest = Forest::from_wire(&wire);
        assert_eq!(forest.to_wire(), wire);
    }

    #[test]
    fn missing_children_and_open_default() {
        let wire: Vec<WireNode> =
            serde_json::from_str(r#"[{"type": "folder", "name": "empty"}]"#).unwrap();
        let forest = Forest::from_wire(&wire);
        let root = forest.get(forest.roots[0]);
        assert!(root.is_folder());
        assert!(root.children.is_empty());
        assert!(!root.open);
    }

    #[test]
    fn roots_keep_input_order() {
        let forest = Forest::from_wire(&sample_wire());
        let names: Vec<&str> = forest
            .roots
            .iter()
            .map(|&id| forest.get(id).name.as_str())
            .collect();
        assert_eq!(names, ["src", "index.html"]);
    }

    #[test]
    fn add_child_grows_only_the_target() {
        let mut forest = Forest::new();
        let a = forest.add_root("a", NodeKind::Folder);
        let b = forest.add_root("b", NodeKind::Folder);
        forest.add_child(a, "x.js", NodeKind::File);

        assert_eq!(forest.get(a).children.len(), 1);
        assert_eq!(forest.get(b).children.len(), 0);
        let child = forest.get(forest.get(a).children[0]);
        assert_eq!(child.name, "x.js");
        assert_eq!(child.depth, 1);
        assert_eq!(child.parent, Some(a));
    }

    #[test]
    fn duplicate_sibling_names_are_accepted() {
        let mut forest = Forest::new();
        let a = forest.add_root("a", NodeKind::Folder);
        forest.add_child(a, "same", NodeKind::File);
        forest.add_child(a, "same", NodeKind::File);
        assert_eq!(forest.get(a).children.len(), 2);
    }

    #[test]
    fn find_folder_is_preorder_first_match() {
        let mut forest = Forest::new();
        let a = forest.add_root("a", NodeKind::Folder);
        let dup_nested = forest.add_child(a, "dup", NodeKind::Folder);
        let dup_root = forest.add_root("dup", NodeKind::Folder);

        // The nested duplicate sits earlier in pre-order than the later root.
        assert_eq!(forest.find_folder("dup"), Some(dup_nested));
        assert_ne!(forest.find_folder("dup"), Some(dup_root));
    }

    #[test]
    fn find_folder_skips_files_with_matching_names() {
        let mut forest = Forest::new();
        forest.add_root("readme", NodeKind::File);
        let folder = forest.add_root("readme", NodeKind::Folder);
        assert_eq!(forest.find_folder("readme"), Some(folder));
        assert_eq!(forest.find_folder("missing"), None);
    }

    #[test]
    fn ancestry_runs_root_first() {
        let forest = Forest::from_wire(&sample_wire());
        let src = forest.find_folder("src").unwrap();
        let lib = forest.find_folder("lib").unwrap();
        let util = forest.get(lib).children[0];
        assert_eq!(forest.ancestry(util), vec![src, lib, util]);
    }
}
