//! Domain entities: core data structures

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of a category name, in characters.
pub const NAME_MAX_LEN: usize = 100;

/// Maximum length of a category description, in characters.
pub const DESCRIPTION_MAX_LEN: usize = 500;

/// Sort order given to categories created without an explicit one.
pub const DEFAULT_SORT_ORDER: f64 = 0.0;

/// Opaque, immutable category identifier.
///
/// Ordered so it can break ties between siblings with equal sort orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(Uuid);

impl CategoryId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CategoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CategoryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A node of the category tree.
///
/// The parent is referenced by id only. Children are never stored on the
/// node; they are derived by looking up categories whose `parent_id` points
/// here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub sort_order: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Category {
    /// Materialize a validated draft under a freshly assigned id.
    pub fn from_new(id: CategoryId, draft: NewCategory, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            active: true,
            sort_order: draft.sort_order.unwrap_or(DEFAULT_SORT_ORDER),
            parent_id: draft.parent_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Set the active flag. Returns whether the value changed.
    pub fn set_active(&mut self, active: bool, now: DateTime<Utc>) -> bool {
        if self.active == active {
            return false;
        }
        self.active = active;
        self.updated_at = now;
        true
    }

    pub fn change_sort_order(&mut self, sort_order: f64, now: DateTime<Utc>) {
        self.sort_order = sort_order;
        self.updated_at = now;
    }

    pub fn change_parent(&mut self, parent_id: Option<CategoryId>, now: DateTime<Utc>) {
        self.parent_id = parent_id;
        self.updated_at = now;
    }

    /// Replace the editable fields (everything except position and activation).
    pub fn apply_update(&mut self, update: CategoryUpdate, now: DateTime<Utc>) {
        self.name = update.name;
        self.description = update.description;
        if let Some(sort_order) = update.sort_order {
            self.sort_order = sort_order;
        }
        self.updated_at = now;
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Input for creating a category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<CategoryId>,
    /// `None` means [`DEFAULT_SORT_ORDER`].
    pub sort_order: Option<f64>,
}

impl NewCategory {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn under(mut self, parent_id: CategoryId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_sort_order(mut self, sort_order: f64) -> Self {
        self.sort_order = Some(sort_order);
        self
    }
}

/// Input for updating the editable fields of a category.
///
/// Name and description are replaced; a `None` sort order keeps the current one.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryUpdate {
    pub name: String,
    pub description: Option<String>,
    pub sort_order: Option<f64>,
}

impl CategoryUpdate {
    /// Start from the current values of `category`.
    pub fn from_current(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            description: category.description.clone(),
            sort_order: None,
        }
    }
}

/// Where to put a category among its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiblingSlot {
    /// After every current sibling.
    Last,
    /// Between two siblings, `before` sorting ahead of `after`.
    Between {
        before: CategoryId,
        after: CategoryId,
    },
}

/// Read model of a single category with its derived tree properties.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryView {
    pub category: Category,
    pub parent_name: Option<String>,
    pub child_count: usize,
    /// Depth in the tree, 0 for a root.
    pub level: usize,
    /// True when no category has this one as parent.
    pub deletable: bool,
}
