//! Arena-backed lossless syntax tree.

use tree_sitter::TreeCursor;

use super::fragment::SyntaxFragment;
use super::text::TextRange;
use crate::error::{RefactorError, Result};

/// Kind of the synthetic leaves that hold the whitespace between tokens.
pub const WHITESPACE: &str = "whitespace";

/// Kind of the synthetic leaves that hold source text the grammar keeps in
/// hidden tokens (e.g. the body of a comment).
pub const TEXT: &str = "text";

/// Handle to a node of a [`SyntaxTree`].
///
/// A handle is an arena index paired with the generation of the slot at the
/// time the handle was issued. Once the node is replaced (or its slot reused)
/// the generations no longer match and every access fails with
/// [`RefactorError::StaleSelection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyntaxNode {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: &'static str,
    field: Option<&'static str>,
    named: bool,
    error: bool,
    /// Token text; `None` for inner nodes.
    text: Option<String>,
    parent: Option<u32>,
    children: Vec<u32>,
}

impl NodeData {
    fn leaf(kind: &'static str, text: &str, parent: Option<u32>) -> Self {
        Self {
            kind,
            field: None,
            named: false,
            error: false,
            text: Some(text.to_string()),
            parent,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    live: bool,
    data: NodeData,
}

/// A concrete syntax tree stored in a generational arena.
///
/// Every byte of the parsed source belongs to exactly one leaf, so
/// [`SyntaxTree::text`] of the root reproduces the source exactly. Links between
/// live nodes are raw indices; handles given out to callers carry generations.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: u32,
}

impl SyntaxTree {
    /// Converts a tree-sitter parse of `source` into an arena tree.
    pub fn from_tree_sitter(tree: &tree_sitter::Tree, source: &str) -> Self {
        let mut this = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: 0,
        };
        let mut cursor = tree.walk();
        this.root = this.build(&mut cursor, source, None, TextRange::new(0, source.len()));
        this
    }

    /// Creates a tree consisting of a single leaf.
    pub fn leaf(kind: &'static str, text: &str) -> Self {
        let mut this = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: 0,
        };
        this.root = this.alloc(NodeData::leaf(kind, text, None));
        this
    }

    fn build(
        &mut self,
        cursor: &mut TreeCursor<'_>,
        source: &str,
        parent: Option<u32>,
        span: TextRange,
    ) -> u32 {
        let node = cursor.node();
        let index = self.alloc(NodeData {
            kind: node.kind(),
            field: cursor.field_name(),
            named: node.is_named(),
            error: node.is_error() || node.is_missing(),
            text: None,
            parent,
            children: Vec::new(),
        });

        if !cursor.goto_first_child() {
            self.slots[index as usize].data.text = Some(slice(source, span).to_string());
            return index;
        }

        let mut children = Vec::new();
        let mut pos = span.start;
        loop {
            let child = cursor.node();
            let start = child.start_byte().max(pos);
            let end = child.end_byte().max(start);
            if start > pos {
                children.push(self.alloc_gap(slice(source, TextRange::new(pos, start)), index));
            }
            children.push(self.build(cursor, source, Some(index), TextRange::new(start, end)));
            pos = end;
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();

        if span.end > pos {
            children.push(self.alloc_gap(slice(source, TextRange::new(pos, span.end)), index));
        }
        self.slots[index as usize].data.children = children;
        index
    }

    fn alloc_gap(&mut self, text: &str, parent: u32) -> u32 {
        let kind = if text.trim().is_empty() { WHITESPACE } else { TEXT };
        self.alloc(NodeData::leaf(kind, text, Some(parent)))
    }

    fn alloc(&mut self, data: NodeData) -> u32 {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.live = true;
                slot.data = data;
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    live: true,
                    data,
                });
                (self.slots.len() - 1) as u32
            }
        }
    }

    /// Frees the slots of a detached subtree, invalidating all handles into it.
    fn retire(&mut self, index: u32) {
        let mut stack = vec![index];
        while let Some(index) = stack.pop() {
            let slot = &mut self.slots[index as usize];
            slot.live = false;
            slot.generation = slot.generation.wrapping_add(1);
            stack.extend(std::mem::take(&mut slot.data.children));
            self.free.push(index);
        }
    }

    fn graft(&mut self, source: &SyntaxTree, from: u32, parent: Option<u32>) -> u32 {
        let data = source.data(from);
        let index = self.alloc(NodeData {
            children: Vec::new(),
            parent,
            ..data.clone()
        });
        let children = data
            .children
            .iter()
            .map(|&child| self.graft(source, child, Some(index)))
            .collect();
        self.slots[index as usize].data.children = children;
        index
    }

    fn data(&self, index: u32) -> &NodeData {
        &self.slots[index as usize].data
    }

    fn handle(&self, index: u32) -> SyntaxNode {
        SyntaxNode {
            index,
            generation: self.slots[index as usize].generation,
        }
    }

    fn index_of(&self, node: SyntaxNode) -> Result<u32> {
        match self.slots.get(node.index as usize) {
            Some(slot) if slot.live && slot.generation == node.generation => Ok(node.index),
            _ => Err(RefactorError::StaleSelection),
        }
    }

    /// The root node (`source_file` for parsed documents).
    pub fn root(&self) -> SyntaxNode {
        self.handle(self.root)
    }

    /// Number of live nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.live).count()
    }

    /// Returns true if `node` still refers to the node it was issued for.
    pub fn is_valid(&self, node: SyntaxNode) -> bool {
        self.index_of(node).is_ok()
    }

    pub fn kind(&self, node: SyntaxNode) -> Result<&'static str> {
        Ok(self.data(self.index_of(node)?).kind)
    }

    /// The grammar field under which `node` hangs off its parent, if any.
    pub fn field(&self, node: SyntaxNode) -> Result<Option<&'static str>> {
        Ok(self.data(self.index_of(node)?).field)
    }

    pub fn is_named(&self, node: SyntaxNode) -> Result<bool> {
        Ok(self.data(self.index_of(node)?).named)
    }

    pub fn is_whitespace(&self, node: SyntaxNode) -> Result<bool> {
        Ok(self.kind(node)? == WHITESPACE)
    }

    pub fn parent(&self, node: SyntaxNode) -> Result<Option<SyntaxNode>> {
        let index = self.index_of(node)?;
        Ok(self.data(index).parent.map(|p| self.handle(p)))
    }

    pub fn children(&self, node: SyntaxNode) -> Result<Vec<SyntaxNode>> {
        let index = self.index_of(node)?;
        Ok(self
            .data(index)
            .children
            .iter()
            .map(|&child| self.handle(child))
            .collect())
    }

    /// First child attached under the given grammar field.
    pub fn child_by_field(&self, node: SyntaxNode, field: &str) -> Result<Option<SyntaxNode>> {
        let index = self.index_of(node)?;
        Ok(self
            .data(index)
            .children
            .iter()
            .find(|&&child| self.data(child).field == Some(field))
            .map(|&child| self.handle(child)))
    }

    /// First child of the given kind.
    pub fn child_of_kind(&self, node: SyntaxNode, kind: &str) -> Result<Option<SyntaxNode>> {
        let index = self.index_of(node)?;
        Ok(self
            .data(index)
            .children
            .iter()
            .find(|&&child| self.data(child).kind == kind)
            .map(|&child| self.handle(child)))
    }

    /// The node itself followed by its parent, grandparent, up to the root.
    pub fn ancestors(&self, node: SyntaxNode) -> Result<Ancestors<'_>> {
        let index = self.index_of(node)?;
        Ok(Ancestors {
            tree: self,
            next: Some(index),
        })
    }

    /// Pre-order traversal of the subtree rooted at `node`, the node itself first.
    pub fn descendants(&self, node: SyntaxNode) -> Result<Descendants<'_>> {
        let index = self.index_of(node)?;
        Ok(Descendants {
            tree: self,
            stack: vec![index],
        })
    }

    /// The closest strict ancestor of `node` satisfying `pred`.
    pub fn nearest_ancestor(
        &self,
        node: SyntaxNode,
        mut pred: impl FnMut(SyntaxNode) -> bool,
    ) -> Result<Option<SyntaxNode>> {
        Ok(self.ancestors(node)?.skip(1).find(|&n| pred(n)))
    }

    /// The deepest node that is an ancestor-or-self of both `a` and `b`.
    pub fn common_ancestor(&self, a: SyntaxNode, b: SyntaxNode) -> Result<Option<SyntaxNode>> {
        let chain: Vec<SyntaxNode> = self.ancestors(a)?.collect();
        Ok(self.ancestors(b)?.find(|n| chain.contains(n)))
    }

    /// Renders the source text of the subtree.
    pub fn text(&self, node: SyntaxNode) -> Result<String> {
        let mut out = String::new();
        for n in self.descendants(node)? {
            if let Some(text) = &self.data(n.index).text {
                out.push_str(text);
            }
        }
        Ok(out)
    }

    fn len_at(&self, index: u32) -> usize {
        let mut len = 0;
        let mut stack = vec![index];
        while let Some(index) = stack.pop() {
            let data = self.data(index);
            if let Some(text) = &data.text {
                len += text.len();
            }
            stack.extend(data.children.iter().copied());
        }
        len
    }

    /// Byte range of `node` in the rendered document.
    pub fn range(&self, node: SyntaxNode) -> Result<TextRange> {
        let mut index = self.index_of(node)?;
        let len = self.len_at(index);
        let mut start = 0;
        while let Some(parent) = self.data(index).parent {
            for &sibling in &self.data(parent).children {
                if sibling == index {
                    break;
                }
                start += self.len_at(sibling);
            }
            index = parent;
        }
        Ok(TextRange::new(start, start + len))
    }

    /// The non-empty leaf whose range contains `offset`.
    pub fn leaf_at(&self, offset: usize) -> Option<SyntaxNode> {
        let mut index = self.root;
        let mut base = 0;
        loop {
            let data = self.data(index);
            if data.children.is_empty() {
                let len = data.text.as_ref().map_or(0, String::len);
                return (offset >= base && offset < base + len).then(|| self.handle(index));
            }
            let mut found = None;
            for &child in &data.children {
                let len = self.len_at(child);
                if offset < base + len {
                    found = Some(child);
                    break;
                }
                base += len;
            }
            index = found?;
        }
    }

    /// Returns true if the subtree contains error or missing nodes.
    pub fn has_errors(&self, node: SyntaxNode) -> Result<bool> {
        Ok(self.descendants(node)?.any(|n| self.data(n.index).error))
    }

    /// Replaces `old` with a copy of `fragment`, returning the handle of the copy.
    ///
    /// The copy takes over the grammar field of `old`. Every handle into the
    /// replaced subtree becomes stale.
    pub fn replace(&mut self, old: SyntaxNode, fragment: &SyntaxFragment) -> Result<SyntaxNode> {
        let old = self.index_of(old)?;
        let from = fragment.tree().index_of(fragment.node())?;
        let Some(parent) = self.data(old).parent else {
            return Err(RefactorError::TransformFailed {
                message: "cannot replace the root node".to_string(),
            });
        };
        let field = self.data(old).field;

        let new = self.graft(fragment.tree(), from, Some(parent));
        self.slots[new as usize].data.field = field;
        for child in self.slots[parent as usize].data.children.iter_mut() {
            if *child == old {
                *child = new;
            }
        }
        self.retire(old);
        Ok(self.handle(new))
    }

    /// Inserts a copy of `fragment` as the sibling immediately before `anchor`.
    pub fn insert_before(
        &mut self,
        anchor: SyntaxNode,
        fragment: &SyntaxFragment,
    ) -> Result<SyntaxNode> {
        let anchor = self.index_of(anchor)?;
        let from = fragment.tree().index_of(fragment.node())?;
        let Some(parent) = self.data(anchor).parent else {
            return Err(RefactorError::TransformFailed {
                message: "cannot insert a sibling of the root node".to_string(),
            });
        };

        let new = self.graft(fragment.tree(), from, Some(parent));
        self.slots[new as usize].data.field = None;
        let children = &mut self.slots[parent as usize].data.children;
        let pos = children
            .iter()
            .position(|&child| child == anchor)
            .unwrap_or(children.len());
        children.insert(pos, new);
        Ok(self.handle(new))
    }
}

fn slice(source: &str, range: TextRange) -> &str {
    source.get(range.start..range.end).unwrap_or("")
}

/// Iterator over a node and its ancestors.
pub struct Ancestors<'a> {
    tree: &'a SyntaxTree,
    next: Option<u32>,
}

impl Iterator for Ancestors<'_> {
    type Item = SyntaxNode;

    fn next(&mut self) -> Option<SyntaxNode> {
        let index = self.next?;
        self.next = self.tree.data(index).parent;
        Some(self.tree.handle(index))
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<u32>,
}

impl Iterator for Descendants<'_> {
    type Item = SyntaxNode;

    fn next(&mut self) -> Option<SyntaxNode> {
        let index = self.stack.pop()?;
        self.stack
            .extend(self.tree.data(index).children.iter().rev().copied());
        Some(self.tree.handle(index))
    }
}
