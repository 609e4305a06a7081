//! Category service
//!
//! Runs each use case as read, validate, write inside one store transaction.
//! Validation failures come back as domain errors; store failures are passed
//! through unchanged and never retried here.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    Category, CategoryForest, CategoryId, CategoryUpdate, CategoryView, DomainError, NewCategory,
    Placement, SiblingSlot, Snapshot, TreeEngine,
};
use crate::infrastructure::traits::{CategoryRepository, CategoryTx};

/// Use-case facade over the category tree.
///
/// Assumes the caller is already authorized for the operation.
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
    engine: TreeEngine,
}

impl CategoryService {
    /// Create a new category service.
    pub fn new(repo: Arc<dyn CategoryRepository>, engine: TreeEngine) -> Self {
        Self { repo, engine }
    }

    /// Create a category under an optional parent.
    #[instrument(level = "debug", skip(self, input), fields(name = %input.name))]
    pub fn create(&self, mut input: NewCategory) -> ApplicationResult<Category> {
        input.name = input.name.trim().to_string();

        let mut tx = self.repo.begin()?;
        let existing = tx.find_by_name(&input.name)?;
        let parent = match input.parent_id {
            Some(parent_id) => tx.find_by_id(parent_id)?,
            None => None,
        };
        self.engine
            .validate_create(&input, existing.as_ref(), parent.as_ref())?;
        if let Some(parent) = &parent {
            let snapshot = Snapshot::new(tx.find_all()?);
            self.engine.validate_depth_limit(parent.id, 0, &snapshot)?;
        }

        let category = tx.save(Category::from_new(CategoryId::new(), input, Utc::now()))?;
        tx.commit()?;
        info!(id = %category.id, name = %category.name, "category created");
        Ok(category)
    }

    /// Replace name, description and (optionally) sort order. The parent is untouched.
    #[instrument(level = "debug", skip(self, update))]
    pub fn update(&self, id: CategoryId, mut update: CategoryUpdate) -> ApplicationResult<Category> {
        update.name = update.name.trim().to_string();

        let mut tx = self.repo.begin()?;
        let mut category = require(&*tx, id)?;
        self.engine.validate_fields(
            &update.name,
            update.description.as_deref(),
            update.sort_order,
        )?;
        if update.name != category.name {
            if let Some(other) = tx.find_by_name(&update.name)? {
                if other.id != id {
                    return Err(DomainError::DuplicateName(update.name).into());
                }
            }
        }

        category.apply_update(update, Utc::now());
        let category = tx.save(category)?;
        tx.commit()?;
        info!(id = %id, name = %category.name, "category updated");
        Ok(category)
    }

    /// Attach a category under `new_parent_id`, or make it a root with `None`.
    #[instrument(level = "debug", skip(self))]
    pub fn move_to(
        &self,
        id: CategoryId,
        new_parent_id: Option<CategoryId>,
    ) -> ApplicationResult<Category> {
        let mut tx = self.repo.begin()?;
        let mut category = require(&*tx, id)?;

        let all = tx.find_all()?;
        let height = self.engine.subtree_height(id, &all);
        let snapshot = Snapshot::new(all);
        if let Some(parent_id) = new_parent_id {
            if parent_id != id && snapshot.get(parent_id).is_none() {
                return Err(DomainError::ParentNotFound(parent_id).into());
            }
        }
        self.engine.validate_reparent(id, new_parent_id, &snapshot)?;

        if category.parent_id == new_parent_id {
            debug!("parent unchanged");
            return Ok(category);
        }
        if let Some(parent_id) = new_parent_id {
            self.engine
                .validate_depth_limit(parent_id, height, &snapshot)?;
        }
        category.change_parent(new_parent_id, Utc::now());
        let category = tx.save(category)?;
        tx.commit()?;
        info!(id = %id, parent = ?new_parent_id, "category moved");
        Ok(category)
    }

    /// Set the sort order directly. Ties with siblings are allowed.
    #[instrument(level = "debug", skip(self))]
    pub fn reorder(&self, id: CategoryId, sort_order: f64) -> ApplicationResult<Category> {
        self.engine.validate_sort_order(sort_order)?;

        let mut tx = self.repo.begin()?;
        let mut category = require(&*tx, id)?;
        category.change_sort_order(sort_order, Utc::now());
        let category = tx.save(category)?;
        tx.commit()?;
        Ok(category)
    }

    /// Derive a sort order from the siblings: after all of them, or halfway
    /// between two adjacent ones.
    #[instrument(level = "debug", skip(self))]
    pub fn place(&self, id: CategoryId, slot: SiblingSlot) -> ApplicationResult<Category> {
        let mut tx = self.repo.begin()?;
        let mut category = require(&*tx, id)?;
        let siblings: Vec<Category> = tx
            .find_children(category.parent_id)?
            .into_iter()
            .filter(|c| c.id != id)
            .collect();

        let placement = match slot {
            SiblingSlot::Last => Placement::Last,
            SiblingSlot::Between { before, after } => {
                let sibling_value = |sibling: CategoryId| {
                    siblings
                        .iter()
                        .find(|c| c.id == sibling)
                        .map(|c| c.sort_order)
                        .ok_or_else(|| {
                            DomainError::invalid(
                                "slot",
                                format!("{sibling} is not a sibling of {}", category.name),
                            )
                        })
                };
                Placement::Between(sibling_value(before)?, sibling_value(after)?)
            }
        };
        let values: Vec<f64> = siblings.iter().map(|c| c.sort_order).collect();
        let sort_order = self.engine.next_sort_order(&values, placement)?;

        category.change_sort_order(sort_order, Utc::now());
        let category = tx.save(category)?;
        tx.commit()?;
        debug!(sort_order, "category placed");
        Ok(category)
    }

    /// Rewrite the children of `parent_id` (roots for `None`) to sort orders
    /// 0, 1, 2, ... keeping their current order.
    ///
    /// Maintenance for siblings whose fractional keys ran out of precision.
    #[instrument(level = "debug", skip(self))]
    pub fn renumber_children(&self, parent_id: Option<CategoryId>) -> ApplicationResult<Vec<Category>> {
        let mut tx = self.repo.begin()?;
        if let Some(parent_id) = parent_id {
            require(&*tx, parent_id)?;
        }

        let now = Utc::now();
        let mut renumbered = Vec::new();
        let mut changed = 0usize;
        for (position, mut child) in tx.find_children(parent_id)?.into_iter().enumerate() {
            let sort_order = position as f64;
            if child.sort_order != sort_order {
                child.change_sort_order(sort_order, now);
                child = tx.save(child)?;
                changed += 1;
            }
            renumbered.push(child);
        }
        tx.commit()?;
        info!(changed, total = renumbered.len(), "siblings renumbered");
        Ok(renumbered)
    }

    /// Mark active. Activating an active category changes nothing.
    pub fn activate(&self, id: CategoryId) -> ApplicationResult<Category> {
        self.set_active(id, true)
    }

    /// Mark inactive. Deactivating an inactive category changes nothing.
    pub fn deactivate(&self, id: CategoryId) -> ApplicationResult<Category> {
        self.set_active(id, false)
    }

    #[instrument(level = "debug", skip(self))]
    fn set_active(&self, id: CategoryId, active: bool) -> ApplicationResult<Category> {
        let mut tx = self.repo.begin()?;
        let mut category = require(&*tx, id)?;
        if category.set_active(active, Utc::now()) {
            category = tx.save(category)?;
            tx.commit()?;
        }
        Ok(category)
    }

    /// Delete a leaf category. Returns the removed record.
    #[instrument(level = "debug", skip(self))]
    pub fn delete(&self, id: CategoryId) -> ApplicationResult<Category> {
        let mut tx = self.repo.begin()?;
        let category = require(&*tx, id)?;
        if tx.exists_children(id)? {
            let count = tx.find_children(Some(id))?.len();
            return Err(DomainError::HasChildren { id, count }.into());
        }
        tx.delete_by_id(id)?;
        tx.commit()?;
        info!(id = %id, name = %category.name, "category deleted");
        Ok(category)
    }

    pub fn get(&self, id: CategoryId) -> ApplicationResult<Category> {
        let tx = self.repo.begin()?;
        require(&*tx, id)
    }

    pub fn get_by_name(&self, name: &str) -> ApplicationResult<Category> {
        let name = name.trim();
        let tx = self.repo.begin()?;
        tx.find_by_name(name)?
            .ok_or_else(|| DomainError::NotFound(name.to_string()).into())
    }

    /// Roots only, or every category; flat and in sibling order.
    pub fn get_tree(&self, roots_only: bool) -> ApplicationResult<Vec<Category>> {
        let tx = self.repo.begin()?;
        let categories = if roots_only {
            tx.find_children(None)?
        } else {
            tx.find_all()?
        };
        Ok(categories)
    }

    pub fn list_active(&self) -> ApplicationResult<Vec<Category>> {
        let tx = self.repo.begin()?;
        Ok(tx.find_all()?.into_iter().filter(|c| c.active).collect())
    }

    /// Active top-level categories. Inactive roots are left out even when
    /// they have active children.
    pub fn list_active_roots(&self) -> ApplicationResult<Vec<Category>> {
        let tx = self.repo.begin()?;
        Ok(tx
            .find_children(None)?
            .into_iter()
            .filter(|c| c.active)
            .collect())
    }

    /// Direct children of `parent_id`, or the roots for `None`.
    pub fn list_children(&self, parent_id: Option<CategoryId>) -> ApplicationResult<Vec<Category>> {
        let tx = self.repo.begin()?;
        if let Some(parent_id) = parent_id {
            require(&*tx, parent_id)?;
        }
        Ok(tx.find_children(parent_id)?)
    }

    /// Immediate parent first, root last.
    pub fn ancestors(&self, id: CategoryId) -> ApplicationResult<Vec<Category>> {
        let snapshot = self.snapshot()?;
        let chain = self.engine.find_ancestors(id, &snapshot)?;
        Ok(chain.into_iter().cloned().collect())
    }

    /// Every descendant in breadth-first order.
    pub fn descendants(&self, id: CategoryId) -> ApplicationResult<Vec<Category>> {
        let tx = self.repo.begin()?;
        require(&*tx, id)?;
        let all = tx.find_all()?;
        Ok(self.engine.find_descendants(id, &all).cloned().collect())
    }

    /// A category together with its parent name, child count and level.
    pub fn describe(&self, id: CategoryId) -> ApplicationResult<CategoryView> {
        let snapshot = self.snapshot()?;
        let category = snapshot
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(id))?;
        let level = self.engine.compute_depth(id, &snapshot)?;
        let parent_name = category
            .parent_id
            .and_then(|pid| snapshot.get(pid))
            .map(|p| p.name.clone());
        let all = snapshot.to_sorted_vec();
        Ok(CategoryView {
            parent_name,
            child_count: snapshot.child_count(id),
            level,
            deletable: self.engine.can_delete(id, &all),
            category,
        })
    }

    /// All categories grouped parent→children for display.
    ///
    /// With `active_only`, inactive categories are left out together with
    /// their whole subtree.
    pub fn forest(&self, active_only: bool) -> ApplicationResult<CategoryForest> {
        let tx = self.repo.begin()?;
        let mut categories = tx.find_all()?;
        if active_only {
            let mut hidden: HashSet<CategoryId> = HashSet::new();
            for inactive in categories.iter().filter(|c| !c.active) {
                hidden.insert(inactive.id);
                hidden.extend(
                    self.engine
                        .find_descendants(inactive.id, &categories)
                        .map(|c| c.id),
                );
            }
            categories.retain(|c| !hidden.contains(&c.id));
        }
        Ok(CategoryForest::build(categories))
    }

    fn snapshot(&self) -> ApplicationResult<Snapshot> {
        let tx = self.repo.begin()?;
        Ok(Snapshot::new(tx.find_all()?))
    }
}

fn require(tx: &dyn CategoryTx, id: CategoryId) -> ApplicationResult<Category> {
    tx.find_by_id(id)?
        .ok_or_else(|| ApplicationError::from(DomainError::not_found(id)))
}
