//! Transaction category model.

use serde::{Deserialize, Serialize};

use super::{CategoryId, EntryKind};

/// An income or expense category with optional hierarchy.
///
/// Categories nest via `parent_id`; a parent must have the same kind.
/// Hierarchy rules are enforced when a snapshot is built, see
/// [`crate::hierarchy::CategoryTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique identifier.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Whether the category groups income or expenses.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Parent category, if this is a sub-category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CategoryId>,
    /// Icon shown next to the category (usually an emoji).
    pub icon: String,
}

impl Category {
    /// Returns `true` if the category has no parent.
    #[inline]
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_root_category() {
        let json = r#"{ "id": "cat-1", "name": "Ăn uống", "type": "expense", "icon": "🍜" }"#;
        let category: Category = serde_json::from_str(json).unwrap();
        assert_eq!(category.id, CategoryId::from("cat-1"));
        assert_eq!(category.kind, EntryKind::Expense);
        assert!(category.is_root());
    }

    #[test]
    fn deserialize_sub_category() {
        let json = r#"{
            "id": "cat-1a",
            "name": "Cafe",
            "type": "chi",
            "parentId": "cat-1",
            "icon": "☕"
        }"#;
        let category: Category = serde_json::from_str(json).unwrap();
        assert_eq!(category.parent_id, Some(CategoryId::from("cat-1")));
        assert!(!category.is_root());
    }

    #[test]
    fn root_category_omits_parent_when_serialized() {
        let category = Category {
            id: CategoryId::from("cat-4"),
            name: "Lương".to_owned(),
            kind: EntryKind::Income,
            parent_id: None,
            icon: "💼".to_owned(),
        };
        let value = serde_json::to_value(&category).unwrap();
        assert!(value.get("parentId").is_none());
        assert_eq!(value["type"], "income");
    }
}
