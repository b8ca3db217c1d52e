use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// Portal item types the teardown logic treats specially.
///
/// Portal types are free-form strings; anything not listed here is handled
/// like a plain item.
#[derive(Debug, Clone, PartialEq, Copy, EnumIter, Display, Eq, Hash)]
pub enum ItemType {
    Solution,
    Group,
    #[strum(serialize = "Hub Site Application")]
    HubSiteApplication,
}

impl ItemType {
    /// The special type a portal type string names, if any.
    pub fn from_portal_type(value: &str) -> Option<Self> {
        ItemType::iter().find(|item_type| item_type.to_string() == value)
    }

    pub fn is(self, portal_type: &str) -> bool {
        ItemType::from_portal_type(portal_type) == Some(self)
    }
}
