use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use core_types::StatusResponse;
use serde_json::Value;

use crate::{
    Group, GroupContent, HubRequestOptions, ItemBase, PortalError, PortalSettings, RelatedItems,
    RelationshipDirection, SearchResult, UserSession, ops::PortalOps,
};

/// Operations of the mock that can be made to fail and whose calls are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockCall {
    GetItemBase,
    GetItemData,
    GetGroup,
    GetGroupContent,
    UnprotectItem,
    UnprotectGroup,
    RemoveItem,
    RemoveGroup,
    GetRelatedItems,
    SearchItems,
    RemoveFolder,
    HubRequestOptions,
    RemoveHubSite,
}

/// Internal state for MockPortal.
///
/// Groups all mutable state into a single struct for simplified locking.
#[derive(Default)]
struct MockState {
    items: HashMap<String, ItemBase>,
    item_data: HashMap<String, Value>,
    groups: HashMap<String, Group>,
    group_content_counts: HashMap<String, u64>,
    /// (solution id, item id) pairs of the Solution2Item relationship
    relations: Vec<(String, String)>,
    folders: HashSet<String>,

    /// Calls that return an error
    failing: HashSet<(MockCall, String)>,
    /// Calls that answer `{ success: false }`
    rejecting: HashSet<(MockCall, String)>,

    calls: Vec<(MockCall, String)>,
    removed_items: Vec<String>,
    removed_groups: Vec<String>,
    removed_folders: Vec<String>,
}

/// Mock implementation of PortalOps for testing
///
/// This mock allows you to:
/// - Seed items, item data, groups, folders and Solution2Item relations
/// - Test failure scenarios per call and id
/// - Verify which operations were performed and in which order
#[derive(Clone)]
pub struct MockPortal {
    session: UserSession,
    settings: PortalSettings,
    state: Arc<Mutex<MockState>>,
}

impl Default for MockPortal {
    fn default() -> Self {
        Self::new("casey")
    }
}

impl MockPortal {
    /// Create a new mock portal signed in as `username`
    pub fn new(username: impl Into<String>) -> Self {
        let settings = PortalSettings::default();
        Self {
            session: UserSession::new(username, settings.portal_url.clone()),
            settings,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    pub fn add_item(&self, item: ItemBase) {
        let mut state = self.state.lock().unwrap();
        if let Some(folder) = &item.owner_folder {
            state.folders.insert(folder.clone());
        }
        state.items.insert(item.id.clone(), item);
    }

    pub fn add_item_data(&self, item_id: impl Into<String>, data: Value) {
        let mut state = self.state.lock().unwrap();
        state.item_data.insert(item_id.into(), data);
    }

    /// Add a group holding `content_count` items
    pub fn add_group(&self, group: Group, content_count: u64) {
        let mut state = self.state.lock().unwrap();
        state
            .group_content_counts
            .insert(group.id.clone(), content_count);
        state.groups.insert(group.id.clone(), group);
    }

    pub fn add_folder(&self, folder_id: impl Into<String>) {
        let mut state = self.state.lock().unwrap();
        state.folders.insert(folder_id.into());
    }

    /// Relate an item to a Solution
    pub fn relate(&self, solution_id: impl Into<String>, item_id: impl Into<String>) {
        let mut state = self.state.lock().unwrap();
        state.relations.push((solution_id.into(), item_id.into()));
    }

    /// Make `call` return an error for `id`
    pub fn fail(&self, call: MockCall, id: impl Into<String>) {
        let mut state = self.state.lock().unwrap();
        state.failing.insert((call, id.into()));
    }

    /// Make `call` answer `{ success: false }` for `id`
    pub fn reject(&self, call: MockCall, id: impl Into<String>) {
        let mut state = self.state.lock().unwrap();
        state.rejecting.insert((call, id.into()));
    }

    /// Remove a previously registered failure, e.g. to simulate a transient error
    pub fn recover(&self, call: MockCall, id: &str) {
        let mut state = self.state.lock().unwrap();
        let key = (call, id.to_string());
        state.failing.remove(&key);
        state.rejecting.remove(&key);
    }

    pub fn item_exists(&self, item_id: &str) -> bool {
        let state = self.state.lock().unwrap();
        state.items.contains_key(item_id)
    }

    pub fn group_exists(&self, group_id: &str) -> bool {
        let state = self.state.lock().unwrap();
        state.groups.contains_key(group_id)
    }

    pub fn folder_exists(&self, folder_id: &str) -> bool {
        let state = self.state.lock().unwrap();
        state.folders.contains(folder_id)
    }

    /// Ids passed to successful item or Hub site removals, in call order
    pub fn removed_items(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.removed_items.clone()
    }

    pub fn removed_groups(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.removed_groups.clone()
    }

    pub fn removed_folders(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.removed_folders.clone()
    }

    /// Ids `call` was invoked with, in call order
    pub fn calls_to(&self, call: MockCall) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .calls
            .iter()
            .filter(|(c, _)| *c == call)
            .map(|(_, id)| id.clone())
            .collect()
    }

    pub fn call_count(&self, call: MockCall) -> usize {
        self.calls_to(call).len()
    }

    pub fn total_calls(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.calls.len()
    }

    fn record(state: &mut MockState, call: MockCall, id: &str) -> Result<(), PortalError> {
        state.calls.push((call, id.to_string()));
        if state.failing.contains(&(call, id.to_string())) {
            return Err(PortalError::Api {
                code: Some("MOCK_FAILURE".to_string()),
                message: format!("Mock {:?} failure for id: {}", call, id),
            });
        }
        Ok(())
    }

    fn is_rejected(state: &MockState, call: MockCall, id: &str) -> bool {
        state.rejecting.contains(&(call, id.to_string()))
    }

    fn remove_item_from_state(
        state: &mut MockState,
        call: MockCall,
        item_id: &str,
    ) -> Result<StatusResponse, PortalError> {
        Self::record(state, call, item_id)?;
        let protected = match state.items.get(item_id) {
            None => return Err(PortalError::not_found(item_id)),
            Some(item) => item.protected,
        };
        if protected {
            return Err(PortalError::Api {
                code: Some("CONT_0011".to_string()),
                message: "Unable to delete item. Delete protection is turned on.".to_string(),
            });
        }
        if Self::is_rejected(state, call, item_id) {
            return Ok(StatusResponse::failed(item_id));
        }
        state.items.remove(item_id);
        state.item_data.remove(item_id);
        state
            .relations
            .retain(|(solution_id, related_id)| solution_id != item_id && related_id != item_id);
        state.removed_items.push(item_id.to_string());
        Ok(StatusResponse::succeeded(item_id))
    }
}

#[async_trait]
impl PortalOps for MockPortal {
    fn session(&self) -> &UserSession {
        &self.session
    }

    async fn get_item_base(&self, item_id: &str) -> Result<ItemBase, PortalError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, MockCall::GetItemBase, item_id)?;
        state
            .items
            .get(item_id)
            .cloned()
            .ok_or_else(|| PortalError::not_found(item_id))
    }

    async fn get_item_data_json(&self, item_id: &str) -> Result<Option<Value>, PortalError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, MockCall::GetItemData, item_id)?;
        if !state.items.contains_key(item_id) {
            return Err(PortalError::not_found(item_id));
        }
        Ok(state.item_data.get(item_id).cloned())
    }

    async fn get_group(&self, group_id: &str) -> Result<Group, PortalError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, MockCall::GetGroup, group_id)?;
        state
            .groups
            .get(group_id)
            .cloned()
            .ok_or_else(|| PortalError::not_found(group_id))
    }

    async fn get_group_content(
        &self,
        group_id: &str,
        _num: u32,
    ) -> Result<GroupContent, PortalError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, MockCall::GetGroupContent, group_id)?;
        let total = state
            .group_content_counts
            .get(group_id)
            .copied()
            .ok_or_else(|| PortalError::not_found(group_id))?;
        Ok(GroupContent {
            total,
            items: Vec::new(),
        })
    }

    async fn unprotect_item(&self, item_id: &str) -> Result<StatusResponse, PortalError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, MockCall::UnprotectItem, item_id)?;
        if Self::is_rejected(&state, MockCall::UnprotectItem, item_id) {
            return Ok(StatusResponse::failed(item_id));
        }
        match state.items.get_mut(item_id) {
            Some(item) => {
                item.protected = false;
                Ok(StatusResponse::succeeded(item_id))
            }
            None => Err(PortalError::not_found(item_id)),
        }
    }

    async fn unprotect_group(&self, group_id: &str) -> Result<StatusResponse, PortalError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, MockCall::UnprotectGroup, group_id)?;
        if Self::is_rejected(&state, MockCall::UnprotectGroup, group_id) {
            return Ok(StatusResponse::failed(group_id));
        }
        match state.groups.get_mut(group_id) {
            Some(group) => {
                group.protected = false;
                Ok(StatusResponse::succeeded(group_id))
            }
            None => Err(PortalError::not_found(group_id)),
        }
    }

    async fn remove_item(&self, item_id: &str) -> Result<StatusResponse, PortalError> {
        let mut state = self.state.lock().unwrap();
        Self::remove_item_from_state(&mut state, MockCall::RemoveItem, item_id)
    }

    async fn remove_group(&self, group_id: &str) -> Result<StatusResponse, PortalError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, MockCall::RemoveGroup, group_id)?;
        let protected = match state.groups.get(group_id) {
            None => return Err(PortalError::not_found(group_id)),
            Some(group) => group.protected,
        };
        if protected || Self::is_rejected(&state, MockCall::RemoveGroup, group_id) {
            return Ok(StatusResponse::failed(group_id));
        }
        state.groups.remove(group_id);
        state.group_content_counts.remove(group_id);
        state.removed_groups.push(group_id.to_string());
        Ok(StatusResponse::succeeded(group_id))
    }

    async fn get_related_items(
        &self,
        item_id: &str,
        _relationship_type: &str,
        direction: RelationshipDirection,
    ) -> Result<RelatedItems, PortalError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, MockCall::GetRelatedItems, item_id)?;
        let related_items: Vec<ItemBase> = match direction {
            RelationshipDirection::Forward => state
                .relations
                .iter()
                .filter(|(solution_id, _)| solution_id == item_id)
                .filter_map(|(_, related_id)| state.items.get(related_id).cloned())
                .collect(),
            RelationshipDirection::Reverse => state
                .relations
                .iter()
                .filter(|(_, related_id)| related_id == item_id)
                .map(|(solution_id, _)| {
                    state
                        .items
                        .get(solution_id)
                        .cloned()
                        .unwrap_or_else(|| ItemBase::new(solution_id.clone(), "Solution", ""))
                })
                .collect(),
        };
        Ok(RelatedItems {
            total: related_items.len() as u64,
            related_items,
        })
    }

    async fn search_items(
        &self,
        folder_id: &str,
        start: i64,
        num: i64,
    ) -> Result<SearchResult, PortalError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, MockCall::SearchItems, folder_id)?;
        let mut in_folder: Vec<ItemBase> = state
            .items
            .values()
            .filter(|item| item.owner_folder.as_deref() == Some(folder_id))
            .cloned()
            .collect();
        in_folder.sort_by(|a, b| a.id.cmp(&b.id));

        let total = in_folder.len() as i64;
        let skip = (start - 1).max(0);
        let results: Vec<ItemBase> = in_folder
            .into_iter()
            .skip(skip as usize)
            .take(num.max(0) as usize)
            .collect();
        let next_start = if skip + num < total { start + num } else { -1 };
        Ok(SearchResult {
            total: total as u64,
            start,
            num,
            next_start,
            results,
        })
    }

    async fn remove_folder(&self, folder_id: &str) -> Result<StatusResponse, PortalError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, MockCall::RemoveFolder, folder_id)?;
        if !state.folders.contains(folder_id) {
            return Err(PortalError::not_found(folder_id));
        }
        if Self::is_rejected(&state, MockCall::RemoveFolder, folder_id) {
            return Ok(StatusResponse::failed(folder_id));
        }
        state.folders.remove(folder_id);
        state.removed_folders.push(folder_id.to_string());
        Ok(StatusResponse::succeeded(folder_id))
    }

    async fn hub_request_options(&self) -> Result<HubRequestOptions, PortalError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, MockCall::HubRequestOptions, &self.session.username)?;
        Ok(HubRequestOptions::new(&self.session, &self.settings))
    }

    async fn remove_hub_site(
        &self,
        item_id: &str,
        _hub_request_options: &HubRequestOptions,
    ) -> Result<StatusResponse, PortalError> {
        let mut state = self.state.lock().unwrap();
        Self::remove_item_from_state(&mut state, MockCall::RemoveHubSite, item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[async_std::test]
    async fn test_remove_item() {
        let mock = MockPortal::new("casey");
        mock.add_item(ItemBase::new("wm1", "Web Map", "casey"));

        let status = mock.remove_item("wm1").await.unwrap();

        assert!(status.success);
        assert!(!mock.item_exists("wm1"));
        assert_eq!(mock.removed_items(), vec!["wm1".to_string()]);
    }

    #[async_std::test]
    async fn test_remove_missing_item_is_not_found() {
        let mock = MockPortal::new("casey");

        let err = mock.remove_item("gone").await.unwrap_err();

        assert!(err.is_not_found());
    }

    #[async_std::test]
    async fn test_protected_item_needs_unprotect() {
        let mock = MockPortal::new("casey");
        mock.add_item(ItemBase::new("wm1", "Web Map", "casey").protected());

        let err = mock.remove_item("wm1").await.unwrap_err();
        assert!(!err.is_not_found());
        assert!(mock.item_exists("wm1"));

        mock.unprotect_item("wm1").await.unwrap();
        assert!(mock.remove_item("wm1").await.unwrap().success);
    }

    #[async_std::test]
    async fn test_fail_and_recover() {
        let mock = MockPortal::new("casey");
        mock.add_item(ItemBase::new("wm1", "Web Map", "casey"));
        mock.fail(MockCall::RemoveItem, "wm1");

        assert!(mock.remove_item("wm1").await.is_err());
        assert!(mock.item_exists("wm1"));

        mock.recover(MockCall::RemoveItem, "wm1");
        assert!(mock.remove_item("wm1").await.unwrap().success);
        assert_eq!(mock.call_count(MockCall::RemoveItem), 2);
    }

    #[async_std::test]
    async fn test_related_items_follow_removals() {
        let mock = MockPortal::new("casey");
        mock.add_item(ItemBase::new("sol1", "Solution", "casey"));
        mock.add_item(ItemBase::new("wm1", "Web Map", "casey"));
        mock.add_item(ItemBase::new("wm2", "Web Map", "casey"));
        mock.relate("sol1", "wm1");
        mock.relate("sol1", "wm2");

        let related = mock
            .get_related_items("sol1", "Solution2Item", RelationshipDirection::Forward)
            .await
            .unwrap();
        assert_eq!(related.total, 2);

        mock.remove_item("wm1").await.unwrap();

        let related = mock
            .get_related_items("sol1", "Solution2Item", RelationshipDirection::Forward)
            .await
            .unwrap();
        assert_eq!(related.total, 1);
        assert_eq!(related.related_items[0].id, "wm2");

        let solutions = mock
            .get_related_items("wm2", "Solution2Item", RelationshipDirection::Reverse)
            .await
            .unwrap();
        assert_eq!(solutions.related_items[0].id, "sol1");
    }

    #[async_std::test]
    async fn test_search_items_pages() {
        let mock = MockPortal::new("casey");
        for id in ["a", "b", "c"] {
            mock.add_item(ItemBase::new(id, "Web Map", "casey").in_folder("fld1"));
        }

        let first = mock.search_items("fld1", 1, 2).await.unwrap();
        assert_eq!(first.total, 3);
        assert_eq!(first.results.len(), 2);
        assert_eq!(first.next_start, 3);

        let second = mock.search_items("fld1", first.next_start, 2).await.unwrap();
        assert_eq!(second.results.len(), 1);
        assert_eq!(second.results[0].id, "c");
        assert_eq!(second.next_start, -1);
    }
}
