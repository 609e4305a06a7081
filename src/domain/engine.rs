//! Category tree engine: invariant checks and read-side traversals.
//!
//! The engine holds no state besides its depth bound. Every operation works on
//! data handed in by the caller, usually a [`Snapshot`](super::Snapshot) read
//! inside a store transaction, so it is safe to share across threads.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};

use tracing::instrument;

use super::entities::{Category, CategoryId, NewCategory, DESCRIPTION_MAX_LEN, NAME_MAX_LEN};
use super::error::{DomainError, DomainResult};

/// Default bound on ancestor-chain walks.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Id-based access to categories.
pub trait CategoryLookup {
    fn lookup(&self, id: CategoryId) -> Option<&Category>;
}

impl CategoryLookup for [Category] {
    fn lookup(&self, id: CategoryId) -> Option<&Category> {
        self.iter().find(|c| c.id == id)
    }
}

impl CategoryLookup for Vec<Category> {
    fn lookup(&self, id: CategoryId) -> Option<&Category> {
        self.as_slice().lookup(id)
    }
}

impl CategoryLookup for HashMap<CategoryId, Category> {
    fn lookup(&self, id: CategoryId) -> Option<&Category> {
        self.get(&id)
    }
}

/// How to derive a new sort order from the current sibling values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// After the largest sibling value.
    Last,
    /// Strictly between two neighbouring values, lower bound first.
    Between(f64, f64),
}

/// Sibling ordering: ascending sort order, ties broken by id.
pub fn sibling_order(a: &Category, b: &Category) -> Ordering {
    a.sort_order
        .total_cmp(&b.sort_order)
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort categories into sibling order in place.
pub fn sort_siblings(categories: &mut [Category]) {
    categories.sort_by(sibling_order);
}

/// Pure validation and traversal over a category snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeEngine {
    max_depth: usize,
}

impl Default for TreeEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl TreeEngine {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
        }
    }

    /// Field checks shared by create and update.
    pub fn validate_fields(
        &self,
        name: &str,
        description: Option<&str>,
        sort_order: Option<f64>,
    ) -> DomainResult<()> {
        if name.trim().is_empty() {
            return Err(DomainError::invalid("name", "must not be empty"));
        }
        let name_len = name.chars().count();
        if name_len > NAME_MAX_LEN {
            return Err(DomainError::invalid(
                "name",
                format!("{name_len} characters exceeds the limit of {NAME_MAX_LEN}"),
            ));
        }
        if let Some(description) = description {
            let len = description.chars().count();
            if len > DESCRIPTION_MAX_LEN {
                return Err(DomainError::invalid(
                    "description",
                    format!("{len} characters exceeds the limit of {DESCRIPTION_MAX_LEN}"),
                ));
            }
        }
        if let Some(sort_order) = sort_order {
            validate_sort_order(sort_order)?;
        }
        Ok(())
    }

    /// A sort order must be finite and non-negative.
    pub fn validate_sort_order(&self, sort_order: f64) -> DomainResult<()> {
        validate_sort_order(sort_order)
    }

    /// Check a creation request against the category currently holding its
    /// name (if any) and its resolved parent (if any).
    ///
    /// Returns the candidate unchanged.
    pub fn validate_create<'c>(
        &self,
        candidate: &'c NewCategory,
        existing_by_name: Option<&Category>,
        parent: Option<&Category>,
    ) -> DomainResult<&'c NewCategory> {
        self.validate_fields(
            &candidate.name,
            candidate.description.as_deref(),
            candidate.sort_order,
        )?;
        if existing_by_name.is_some() {
            return Err(DomainError::DuplicateName(candidate.name.clone()));
        }
        if let Some(parent_id) = candidate.parent_id {
            match parent {
                Some(p) if p.id == parent_id => {}
                _ => return Err(DomainError::ParentNotFound(parent_id)),
            }
        }
        Ok(candidate)
    }

    /// Check that `category_id` may be attached under `new_parent_id`.
    ///
    /// Walks upward from the proposed parent; meeting `category_id` on the way
    /// means the proposed parent is one of its descendants.
    #[instrument(level = "trace", skip(self, lookup))]
    pub fn validate_reparent<L: CategoryLookup + ?Sized>(
        &self,
        category_id: CategoryId,
        new_parent_id: Option<CategoryId>,
        lookup: &L,
    ) -> DomainResult<()> {
        let Some(new_parent) = new_parent_id else {
            return Ok(());
        };
        if new_parent == category_id {
            return Err(DomainError::SelfParent(category_id));
        }

        let mut current = Some(new_parent);
        let mut steps = 0usize;
        while let Some(id) = current {
            if id == category_id {
                return Err(DomainError::Cycle {
                    category: category_id,
                    new_parent,
                });
            }
            if steps > self.max_depth {
                return Err(DomainError::CycleDetected(new_parent, self.max_depth));
            }
            let node = lookup
                .lookup(id)
                .ok_or(DomainError::ParentNotFound(id))?;
            current = node.parent_id;
            steps += 1;
        }
        Ok(())
    }

    /// Check that a subtree of `subtree_height` levels below its top node
    /// still fits within the depth bound when attached under `parent_id`.
    ///
    /// A new leaf has height 0. Fails with `InvalidField("parent")` instead of
    /// letting the tree grow past the bound that later walks enforce.
    pub fn validate_depth_limit<L: CategoryLookup + ?Sized>(
        &self,
        parent_id: CategoryId,
        subtree_height: usize,
        lookup: &L,
    ) -> DomainResult<()> {
        let parent_depth = self.compute_depth(parent_id, lookup)?;
        let deepest = parent_depth + 1 + subtree_height;
        if deepest > self.max_depth {
            return Err(DomainError::invalid(
                "parent",
                format!(
                    "would place a category at level {deepest}, beyond the depth limit of {}",
                    self.max_depth
                ),
            ));
        }
        Ok(())
    }

    /// Number of levels below `category_id`: 0 for a leaf.
    pub fn subtree_height(&self, category_id: CategoryId, all: &[Category]) -> usize {
        let mut levels = HashMap::from([(category_id, 0usize)]);
        let mut height = 0;
        for node in self.find_descendants(category_id, all) {
            let level = node
                .parent_id
                .and_then(|p| levels.get(&p).copied())
                .unwrap_or(0)
                + 1;
            levels.insert(node.id, level);
            height = height.max(level);
        }
        height
    }

    /// Ancestor chain from the immediate parent up to the root.
    #[instrument(level = "trace", skip(self, lookup))]
    pub fn find_ancestors<'a, L: CategoryLookup + ?Sized>(
        &self,
        category_id: CategoryId,
        lookup: &'a L,
    ) -> DomainResult<Vec<&'a Category>> {
        let start = lookup
            .lookup(category_id)
            .ok_or_else(|| DomainError::not_found(category_id))?;

        let mut chain: Vec<&'a Category> = Vec::new();
        let mut visited = HashSet::from([category_id]);
        let mut next = start.parent_id;
        while let Some(parent_id) = next {
            if chain.len() >= self.max_depth || !visited.insert(parent_id) {
                return Err(DomainError::CycleDetected(category_id, self.max_depth));
            }
            let parent = lookup
                .lookup(parent_id)
                .ok_or(DomainError::ParentNotFound(parent_id))?;
            chain.push(parent);
            next = parent.parent_id;
        }
        Ok(chain)
    }

    /// Depth of a category: 0 for a root, parent depth + 1 otherwise.
    pub fn compute_depth<L: CategoryLookup + ?Sized>(
        &self,
        category_id: CategoryId,
        lookup: &L,
    ) -> DomainResult<usize> {
        self.find_ancestors(category_id, lookup).map(|chain| chain.len())
    }

    /// Breadth-first iterator over every descendant of `category_id`.
    pub fn find_descendants<'a>(
        &self,
        category_id: CategoryId,
        all: &'a [Category],
    ) -> Descendants<'a> {
        Descendants::new(category_id, all)
    }

    /// A category may be deleted only when nothing points at it as parent.
    pub fn can_delete(&self, category_id: CategoryId, all: &[Category]) -> bool {
        !all.iter().any(|c| c.parent_id == Some(category_id))
    }

    /// Sort order for a new position among siblings.
    ///
    /// Appending yields `max + 1.0` (or the default `0.0` with no siblings).
    /// Inserting between `a < b` yields the midpoint; once repeated inserts
    /// leave no representable value in between, the siblings need renumbering.
    pub fn next_sort_order(&self, siblings: &[f64], placement: Placement) -> DomainResult<f64> {
        match placement {
            Placement::Last => Ok(siblings
                .iter()
                .copied()
                .filter(|v| v.is_finite())
                .reduce(f64::max)
                .map(|max| max + 1.0)
                .unwrap_or(super::entities::DEFAULT_SORT_ORDER)),
            Placement::Between(a, b) => {
                validate_sort_order(a)?;
                validate_sort_order(b)?;
                if a >= b {
                    return Err(DomainError::invalid(
                        "sort_order",
                        format!("lower bound {a} must be less than upper bound {b}"),
                    ));
                }
                let mid = a + (b - a) / 2.0;
                if mid <= a || mid >= b {
                    return Err(DomainError::invalid(
                        "sort_order",
                        format!("no representable value between {a} and {b}; renumber siblings"),
                    ));
                }
                Ok(mid)
            }
        }
    }
}

fn validate_sort_order(sort_order: f64) -> DomainResult<()> {
    if !sort_order.is_finite() {
        return Err(DomainError::invalid("sort_order", "must be a finite number"));
    }
    if sort_order < 0.0 {
        return Err(DomainError::invalid(
            "sort_order",
            format!("{sort_order} is negative"),
        ));
    }
    Ok(())
}

/// Lazy breadth-first walk over the descendants of one category.
///
/// Cloning before iteration gives an independent restart. A node is yielded at
/// most once, so the walk terminates even on corrupted, cyclic data.
#[derive(Debug, Clone)]
pub struct Descendants<'a> {
    children: HashMap<CategoryId, Vec<&'a Category>>,
    queue: VecDeque<&'a Category>,
    seen: HashSet<CategoryId>,
}

impl<'a> Descendants<'a> {
    fn new(origin: CategoryId, all: &'a [Category]) -> Self {
        let mut children: HashMap<CategoryId, Vec<&'a Category>> = HashMap::new();
        for category in all {
            if let Some(parent_id) = category.parent_id {
                children.entry(parent_id).or_default().push(category);
            }
        }
        for siblings in children.values_mut() {
            siblings.sort_by(|a, b| sibling_order(a, b));
        }

        let mut walk = Self {
            children,
            queue: VecDeque::new(),
            seen: HashSet::from([origin]),
        };
        walk.enqueue_children(origin);
        walk
    }

    fn enqueue_children(&mut self, parent: CategoryId) {
        if let Some(kids) = self.children.get(&parent) {
            for kid in kids {
                if self.seen.insert(kid.id) {
                    self.queue.push_back(kid);
                }
            }
        }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Category;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.queue.pop_front()?;
        self.enqueue_children(node.id);
        Some(node)
    }
}
