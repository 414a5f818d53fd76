//! Category hierarchy resolution.
//!
//! [`CategoryTree`] indexes categories by id and resolves parent, child and
//! root relationships. Edges are built once; every walk up the parent chain
//! is cycle-safe regardless of how deep the hierarchy is.

use std::collections::{HashMap, HashSet};

use crate::error::{EntityKind, HierarchyError, Result, ValidationError, ValidationRule};
use crate::models::{Category, CategoryId};

/// Default nesting limit: a root category and one level of sub-categories.
pub const DEFAULT_MAX_CATEGORY_DEPTH: usize = 2;

/// Categories indexed by id with resolved parent/child edges.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    /// Categories in input order.
    categories: Vec<Category>,
    /// Position of each category in `categories`.
    index: HashMap<CategoryId, usize>,
    /// Direct children of each parent, sorted by id.
    children: HashMap<CategoryId, Vec<usize>>,
}

impl CategoryTree {
    /// Builds and validates a tree from raw categories.
    ///
    /// Checks, in order: unique ids, existing parents, parents of the same
    /// kind, acyclic parent chains and the depth limit. The first violation
    /// is returned.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::LedgerError::Validation`] for duplicate ids,
    /// dangling or mismatched parents and over-deep nesting, and
    /// [`crate::error::LedgerError::Hierarchy`] for cyclic parentage.
    #[tracing::instrument(skip_all, fields(categories = categories.len()))]
    pub fn build(categories: Vec<Category>, max_depth: usize) -> Result<Self> {
        let mut index = HashMap::with_capacity(categories.len());
        for (position, category) in categories.iter().enumerate() {
            if index.insert(category.id.clone(), position).is_some() {
                return Err(category_error(category, ValidationRule::DuplicateId).into());
            }
        }

        for category in &categories {
            let Some(parent_id) = category.parent_id.as_ref() else {
                continue;
            };
            let parent = index
                .get(parent_id)
                .and_then(|&position| categories.get(position))
                .ok_or_else(|| {
                    category_error(
                        category,
                        ValidationRule::UnknownParent(parent_id.to_string()),
                    )
                })?;
            if parent.kind != category.kind {
                return Err(category_error(
                    category,
                    ValidationRule::ParentKindMismatch {
                        parent: parent.id.to_string(),
                        parent_kind: parent.kind.to_string(),
                        expected: category.kind.to_string(),
                    },
                )
                .into());
            }
        }

        let mut tree = Self {
            categories,
            index,
            children: HashMap::new(),
        };

        for category in &tree.categories {
            let depth = tree.depth_of(&category.id)?;
            if depth > max_depth {
                return Err(category_error(
                    category,
                    ValidationRule::DepthExceeded {
                        depth,
                        max: max_depth,
                    },
                )
                .into());
            }
        }

        let mut children: HashMap<CategoryId, Vec<usize>> = HashMap::new();
        for (position, category) in tree.categories.iter().enumerate() {
            if let Some(parent_id) = category.parent_id.as_ref() {
                children.entry(parent_id.clone()).or_default().push(position);
            }
        }
        for positions in children.values_mut() {
            positions.sort_by(|&a, &b| {
                let left = tree.categories.get(a).map(|c| &c.id);
                let right = tree.categories.get(b).map(|c| &c.id);
                left.cmp(&right)
            });
        }
        tree.children = children;

        tracing::debug!(
            categories = tree.categories.len(),
            roots = tree.roots().count(),
            "built category tree"
        );
        Ok(tree)
    }

    /// Looks up a category by id.
    #[inline]
    #[must_use]
    pub fn get(&self, id: &CategoryId) -> Option<&Category> {
        self.index
            .get(id)
            .and_then(|&position| self.categories.get(position))
    }

    /// Returns `true` if the tree contains the given id.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &CategoryId) -> bool {
        self.index.contains_key(id)
    }

    /// Returns the number of categories.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Returns `true` if the tree holds no categories.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Iterates over all categories in input order.
    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, Category> {
        self.categories.iter()
    }

    /// Iterates over root categories in input order.
    #[inline]
    pub fn roots(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|category| category.is_root())
    }

    /// Returns the parent of a category, or `None` for roots and unknown
    /// ids.
    #[inline]
    #[must_use]
    pub fn parent_of(&self, id: &CategoryId) -> Option<&Category> {
        self.get(id)
            .and_then(|category| category.parent_id.as_ref())
            .and_then(|parent_id| self.get(parent_id))
    }

    /// Returns the direct children of a category ordered by id.
    ///
    /// Leaves and unknown ids yield an empty vector.
    #[inline]
    #[must_use]
    pub fn children_of(&self, id: &CategoryId) -> Vec<&Category> {
        self.children.get(id).map_or_else(Vec::new, |positions| {
            positions
                .iter()
                .filter_map(|&position| self.categories.get(position))
                .collect()
        })
    }

    /// Walks parent links up to the root category.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::UnknownCategory`] if `id` (or a parent on
    /// the way) is not in the tree, and [`HierarchyError::Cycle`] if the
    /// walk revisits a category.
    #[inline]
    pub fn root_of(&self, id: &CategoryId) -> core::result::Result<&Category, HierarchyError> {
        self.walk(id).map(|(root, _)| root)
    }

    /// Returns the nesting depth of a category; roots have depth 1.
    ///
    /// # Errors
    ///
    /// Same as [`CategoryTree::root_of`].
    #[inline]
    pub fn depth_of(&self, id: &CategoryId) -> core::result::Result<usize, HierarchyError> {
        self.walk(id).map(|(_, depth)| depth)
    }

    /// Returns `true` if `child` is a direct child of `parent`.
    #[inline]
    #[must_use]
    pub fn is_child_of(&self, child: &CategoryId, parent: &CategoryId) -> bool {
        self.get(child)
            .and_then(|category| category.parent_id.as_ref())
            .is_some_and(|parent_id| parent_id == parent)
    }

    /// Follows parent links from `id`, returning the root and the number of
    /// categories on the path (including both ends).
    fn walk(&self, id: &CategoryId) -> core::result::Result<(&Category, usize), HierarchyError> {
        let mut current = self
            .get(id)
            .ok_or_else(|| HierarchyError::UnknownCategory(id.clone()))?;
        let mut chain = vec![id.clone()];
        let mut seen: HashSet<&CategoryId> = HashSet::from([&current.id]);

        while let Some(parent_id) = current.parent_id.as_ref() {
            chain.push(parent_id.clone());
            if !seen.insert(parent_id) {
                return Err(HierarchyError::Cycle {
                    start: id.clone(),
                    chain,
                });
            }
            current = self
                .get(parent_id)
                .ok_or_else(|| HierarchyError::UnknownCategory(parent_id.clone()))?;
        }
        Ok((current, chain.len()))
    }
}

impl<'tree> IntoIterator for &'tree CategoryTree {
    type Item = &'tree Category;
    type IntoIter = core::slice::Iter<'tree, Category>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Builds a category-scoped validation error.
fn category_error(category: &Category, rule: ValidationRule) -> ValidationError {
    ValidationError::new(EntityKind::Category, category.id.as_inner(), rule)
}
