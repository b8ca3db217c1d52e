use async_trait::async_trait;
use core_types::StatusResponse;
use serde_json::Value;

use crate::{
    Group, GroupContent, HubRequestOptions, ItemBase, PortalError, RelatedItems,
    RelationshipDirection, SearchResult, UserSession,
};

/// Content portal operations needed to discover and tear down a deployed Solution.
///
/// Implementations are already authenticated; every call acts as `session().username`.
/// A trait is used so the teardown logic can run against mock implementations in tests.
#[async_trait]
pub trait PortalOps: Send + Sync {
    fn session(&self) -> &UserSession;

    /// Fetch the base metadata of an item
    async fn get_item_base(&self, item_id: &str) -> Result<ItemBase, PortalError>;

    /// Fetch the data payload of an item as JSON, `None` when the item has no data
    async fn get_item_data_json(&self, item_id: &str) -> Result<Option<Value>, PortalError>;

    async fn get_group(&self, group_id: &str) -> Result<Group, PortalError>;

    /// Fetch at most `num` content items of a group along with the total count
    async fn get_group_content(&self, group_id: &str, num: u32)
    -> Result<GroupContent, PortalError>;

    async fn unprotect_item(&self, item_id: &str) -> Result<StatusResponse, PortalError>;

    async fn unprotect_group(&self, group_id: &str) -> Result<StatusResponse, PortalError>;

    async fn remove_item(&self, item_id: &str) -> Result<StatusResponse, PortalError>;

    async fn remove_group(&self, group_id: &str) -> Result<StatusResponse, PortalError>;

    async fn get_related_items(
        &self,
        item_id: &str,
        relationship_type: &str,
        direction: RelationshipDirection,
    ) -> Result<RelatedItems, PortalError>;

    /// Fetch one tranche of the items in a folder, `start` is 1-based
    async fn search_items(
        &self,
        folder_id: &str,
        start: i64,
        num: i64,
    ) -> Result<SearchResult, PortalError>;

    async fn remove_folder(&self, folder_id: &str) -> Result<StatusResponse, PortalError>;

    /// Build the request options for the Hub site teardown path
    async fn hub_request_options(&self) -> Result<HubRequestOptions, PortalError>;

    /// Remove a Hub Site Application together with its site infrastructure
    async fn remove_hub_site(
        &self,
        item_id: &str,
        hub_request_options: &HubRequestOptions,
    ) -> Result<StatusResponse, PortalError>;
}
