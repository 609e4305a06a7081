use std::collections::HashMap;

use generational_arena::{Arena, Index};
use termtree::Tree;
use tracing::instrument;

use super::engine::sort_siblings;
use super::entities::{Category, CategoryId};

/// Forest node: a category plus arena links to its children.
#[derive(Debug)]
pub struct ForestNode {
    pub data: Category,
    /// Child indices in sibling order
    pub children: Vec<Index>,
}

/// Arena-backed parent→children grouping of a flat category list.
///
/// Built on demand for display; the store never holds linked nodes. Categories
/// whose parent is not part of the input are treated as roots.
#[derive(Debug, Default)]
pub struct CategoryForest {
    arena: Arena<ForestNode>,
    roots: Vec<Index>,
}

impl CategoryForest {
    #[instrument(level = "debug", skip(categories), fields(count = categories.len()))]
    pub fn build(mut categories: Vec<Category>) -> Self {
        sort_siblings(&mut categories);

        let mut arena = Arena::with_capacity(categories.len());
        let mut index_of: HashMap<CategoryId, Index> = HashMap::new();
        let mut order = Vec::with_capacity(categories.len());
        for category in categories {
            let id = category.id;
            let idx = arena.insert(ForestNode {
                data: category,
                children: Vec::new(),
            });
            index_of.insert(id, idx);
            order.push(idx);
        }

        let mut roots = Vec::new();
        for idx in order {
            let parent_idx = arena[idx]
                .data
                .parent_id
                .and_then(|pid| index_of.get(&pid).copied());
            match parent_idx {
                Some(parent_idx) => arena[parent_idx].children.push(idx),
                None => roots.push(idx),
            }
        }

        Self { arena, roots }
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn get_node(&self, idx: Index) -> Option<&ForestNode> {
        self.arena.get(idx)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order walk over every tree, yielding each node with its level.
    pub fn iter(&self) -> ForestIterator<'_> {
        ForestIterator::new(self)
    }

    /// Number of levels in the deepest tree (0 for an empty forest).
    pub fn depth(&self) -> usize {
        self.iter().map(|(level, _)| level + 1).max().unwrap_or(0)
    }

    /// Names of nodes without children, in walk order.
    pub fn leaf_names(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| node.data.name.clone())
            .collect()
    }

    /// Render each tree with `label` producing the text of one node.
    pub fn to_termtrees<F>(&self, label: F) -> Vec<Tree<String>>
    where
        F: Fn(&Category) -> String,
    {
        fn build<F: Fn(&Category) -> String>(
            forest: &CategoryForest,
            idx: Index,
            label: &F,
        ) -> Tree<String> {
            let node = &forest.arena[idx];
            let leaves: Vec<_> = node
                .children
                .iter()
                .map(|&child| build(forest, child, label))
                .collect();
            Tree::new(label(&node.data)).with_leaves(leaves)
        }

        self.roots
            .iter()
            .map(|&root| build(self, root, &label))
            .collect()
    }
}

pub struct ForestIterator<'a> {
    forest: &'a CategoryForest,
    stack: Vec<(usize, Index)>,
}

impl<'a> ForestIterator<'a> {
    fn new(forest: &'a CategoryForest) -> Self {
        // Reverse so the first root is popped first
        let stack = forest.roots.iter().rev().map(|&idx| (0, idx)).collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for ForestIterator<'a> {
    type Item = (usize, &'a ForestNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (level, idx) = self.stack.pop()?;
        let node = self.forest.get_node(idx)?;
        for &child in node.children.iter().rev() {
            self.stack.push((level + 1, child));
        }
        Some((level, node))
    }
}
