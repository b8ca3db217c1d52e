use serde::{Deserialize, Serialize};

pub mod events;
pub mod item_type;

pub use item_type::ItemType;

/// Relationship type linking a deployed Solution to its member items.
pub const SOLUTION_TO_ITEM_RELATIONSHIP: &str = "Solution2Item";

/// Type keywords a Solution item must carry to count as deployed.
pub const DEPLOYED_SOLUTION_KEYWORDS: &[&str] = &["Solution", "Deployed"];

/// Snapshot of a related item's metadata, enough to order and report its deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPrecis {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub title: String,
    pub modified: i64,
    pub owner: String,
}

impl ItemPrecis {
    pub fn is_hub_site_application(&self) -> bool {
        ItemType::HubSiteApplication.is(&self.item_type)
    }
}

/// The known footprint of a deployed Solution at a point in time.
///
/// `items` is kept in build order (or reversed build order while deleting),
/// `groups` holds each group id once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionPrecis {
    pub id: String,
    pub title: String,
    pub folder: String,
    pub items: Vec<ItemPrecis>,
    pub groups: Vec<String>,
}

impl SolutionPrecis {
    /// Copy of this precis with the same identity but no items or groups.
    pub fn empty_copy(&self) -> Self {
        Self {
            id: self.id.clone(),
            title: self.title.clone(),
            folder: self.folder.clone(),
            items: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn item_ids(&self) -> Vec<String> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }

    /// Adds a group id unless it is already present.
    pub fn add_group(&mut self, group_id: impl Into<String>) {
        let group_id = group_id.into();
        if !self.groups.contains(&group_id) {
            self.groups.push(group_id);
        }
    }
}

/// Result of a single delete or unprotect call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    #[serde(alias = "itemId", alias = "groupId", alias = "folderId", default)]
    pub id: String,
}

impl StatusResponse {
    pub fn succeeded(id: impl Into<String>) -> Self {
        Self {
            success: true,
            id: id.into(),
        }
    }

    pub fn failed(id: impl Into<String>) -> Self {
        Self {
            success: false,
            id: id.into(),
        }
    }
}
