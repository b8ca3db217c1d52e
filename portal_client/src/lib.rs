// The content portal is reached through an already authenticated session.
// Token issuing and refresh happen outside this crate; implementations of
// `PortalOps` receive a ready `UserSession`.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

pub mod mock;
pub mod ops;
pub mod settings;

pub use ops::PortalOps;
pub use settings::PortalSettings;

/// Error code the portal returns when an item id no longer resolves.
pub const ITEM_NOT_FOUND_CODE: &str = "CONT_0001";

const NOT_FOUND_MESSAGE: &str = "does not exist or is inaccessible";

#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("Portal API error [{}]: {message}", .code.as_deref().unwrap_or("no code"))]
    Api {
        code: Option<String>,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(String),
}

/// Coarse classification of portal failures used by teardown policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalErrorKind {
    NotFound,
    Other,
}

impl PortalError {
    pub fn not_found(id: &str) -> Self {
        PortalError::Api {
            code: Some(ITEM_NOT_FOUND_CODE.to_string()),
            message: format!("Item '{}' {}.", id, NOT_FOUND_MESSAGE),
        }
    }

    pub fn kind(&self) -> PortalErrorKind {
        match self {
            PortalError::Api { code, message }
                if code.as_deref() == Some(ITEM_NOT_FOUND_CODE)
                    || message.contains(NOT_FOUND_MESSAGE) =>
            {
                PortalErrorKind::NotFound
            }
            _ => PortalErrorKind::Other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == PortalErrorKind::NotFound
    }
}

/// Identity of the signed-in user on whose behalf all calls are made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub username: String,
    pub portal_url: String,
}

impl UserSession {
    pub fn new(username: impl Into<String>, portal_url: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            portal_url: portal_url.into(),
        }
    }
}

/// Request options needed by the site teardown path of Hub Site Applications.
///
/// Built per call from the session and settings and dropped right after use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubRequestOptions {
    pub authentication: UserSession,
    pub hub_api_url: String,
    pub is_portal: bool,
}

impl HubRequestOptions {
    pub fn new(session: &UserSession, settings: &PortalSettings) -> Self {
        Self {
            authentication: session.clone(),
            hub_api_url: settings.hub_api_url.clone(),
            is_portal: settings.is_portal,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBase {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub type_keywords: Vec<String>,
    #[serde(default)]
    pub owner_folder: Option<String>,
    #[serde(default)]
    pub modified: i64,
    #[serde(default)]
    pub protected: bool,
}

impl ItemBase {
    pub fn new(id: impl Into<String>, item_type: impl Into<String>, owner: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            title: format!("{} title", id),
            id,
            item_type: item_type.into(),
            owner: owner.into(),
            ..Default::default()
        }
    }

    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.type_keywords = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn in_folder(mut self, folder_id: impl Into<String>) -> Self {
        self.owner_folder = Some(folder_id.into());
        self
    }

    pub fn protected(mut self) -> Self {
        self.protected = true;
        self
    }

    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.type_keywords.iter().any(|k| k == keyword)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub owner: String,
    #[serde(default)]
    pub protected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupContent {
    pub total: u64,
    #[serde(default)]
    pub items: Vec<ItemBase>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedItems {
    pub total: u64,
    #[serde(default)]
    pub related_items: Vec<ItemBase>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum RelationshipDirection {
    Forward,
    Reverse,
}

/// One tranche of a folder listing. `next_start` is -1 after the last tranche.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub total: u64,
    pub start: i64,
    pub num: i64,
    pub next_start: i64,
    #[serde(default)]
    pub results: Vec<ItemBase>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_by_code() {
        let err = PortalError::Api {
            code: Some(ITEM_NOT_FOUND_CODE.to_string()),
            message: "gone".to_string(),
        };
        assert_eq!(err.kind(), PortalErrorKind::NotFound);
    }

    #[test]
    fn test_not_found_by_message() {
        let err = PortalError::Api {
            code: None,
            message: "Item 'abc' does not exist or is inaccessible.".to_string(),
        };
        assert!(err.is_not_found());
    }

    #[test]
    fn test_other_errors() {
        let err = PortalError::Api {
            code: Some("CONT_0011".to_string()),
            message: "Unable to delete item. Delete protection is turned on.".to_string(),
        };
        assert_eq!(err.kind(), PortalErrorKind::Other);
        assert_eq!(
            PortalError::Other("timeout".to_string()).kind(),
            PortalErrorKind::Other
        );
    }

    #[test]
    fn test_relationship_direction_display() {
        assert_eq!(RelationshipDirection::Forward.to_string(), "forward");
        assert_eq!(RelationshipDirection::Reverse.to_string(), "reverse");
    }

    #[test]
    fn test_item_base_from_portal_json() {
        let json = r#"{
            "id": "sol1",
            "type": "Solution",
            "title": "Water Utility",
            "owner": "casey",
            "typeKeywords": ["Solution", "Deployed"],
            "ownerFolder": "fld1",
            "modified": 1700000000000
        }"#;
        let item: ItemBase = serde_json::from_str(json).unwrap();
        assert_eq!(item.item_type, "Solution");
        assert!(item.has_keyword("Deployed"));
        assert_eq!(item.owner_folder.as_deref(), Some("fld1"));
        assert!(!item.protected);
    }
}
