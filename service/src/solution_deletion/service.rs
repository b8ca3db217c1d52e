use std::sync::Arc;

use core_types::SolutionPrecis;
use portal_client::PortalOps;
use serde_json::Value;

use crate::{
    component_summary::summary_from_components,
    deletable_info,
    error::Error,
    pipeline::Pipeline,
    progress::DeleteOptions,
    solution_deletion::{context::ContentsDeletionContext, model::SolutionDeletionResult},
    solution_summary::{self, SolutionTemplate},
};

/// Tears down deployed Solutions through a signed-in portal connection.
pub struct SolutionDeletionService {
    portal: Arc<dyn PortalOps>,
}

impl SolutionDeletionService {
    pub fn new(portal: Arc<dyn PortalOps>) -> Self {
        Self { portal }
    }

    fn validate_solution_id(solution_id: &str) -> Result<(), Error> {
        if solution_id.trim().is_empty() {
            return Err(Error::InvalidInput("Solution id is empty".to_string()));
        }
        Ok(())
    }

    pub async fn get_solution_summary(&self, solution_id: &str) -> Result<SolutionPrecis, Error> {
        Self::validate_solution_id(solution_id)?;
        solution_summary::get_solution_summary(self.portal.as_ref(), solution_id).await
    }

    pub async fn get_deletable_solution_info(
        &self,
        solution_id: &str,
    ) -> Result<SolutionPrecis, Error> {
        Self::validate_solution_id(solution_id)?;
        deletable_info::get_deletable_solution_info(self.portal.as_ref(), solution_id).await
    }

    /// Delete a deployed Solution and everything only it uses.
    ///
    /// When the id does not resolve to a deployed Solution both `deleted` and
    /// `failed` are `None`. Calling this again after a partial failure retries
    /// just the items that failed, since the Solution item is kept until all
    /// of them are gone.
    #[tracing::instrument(skip_all, fields(solution_id = %solution_id))]
    pub async fn delete_solution(
        &self,
        solution_id: &str,
        options: DeleteOptions,
    ) -> SolutionDeletionResult {
        match self.get_deletable_solution_info(solution_id).await {
            Ok(summary) => {
                self.delete_solution_contents(solution_id, summary, options)
                    .await
            }
            Err(e) => {
                tracing::warn!("Unable to resolve Solution {}: {}", solution_id, e);
                SolutionDeletionResult::default()
            }
        }
    }

    /// Delete a Solution from the components its deployment reported, without
    /// discovering them on the portal first.
    #[tracing::instrument(skip_all, fields(solution_id = %solution_id))]
    pub async fn delete_solution_by_components(
        &self,
        solution_id: &str,
        item_ids: &[String],
        templates: &[SolutionTemplate],
        template_dictionary: &Value,
        options: DeleteOptions,
    ) -> SolutionDeletionResult {
        let summary =
            summary_from_components(solution_id, item_ids, templates, template_dictionary);
        self.delete_solution_contents(solution_id, summary, options)
            .await
    }

    /// Remove the items and groups in `summary`, then the Solution item and
    /// its folder. Never fails: an aborted run returns what was achieved.
    #[tracing::instrument(skip_all, fields(solution_id = %solution_id))]
    pub async fn delete_solution_contents(
        &self,
        solution_id: &str,
        summary: SolutionPrecis,
        options: DeleteOptions,
    ) -> SolutionDeletionResult {
        tracing::info!(
            items = summary.items.len(),
            groups = summary.groups.len(),
            "Starting Solution teardown"
        );
        let mut context =
            ContentsDeletionContext::new(solution_id, summary, self.portal.clone(), options);

        let pipeline = Pipeline::<ContentsDeletionContext>::new();
        if let Err(e) = pipeline.execute(&mut context).await {
            tracing::error!("Teardown of Solution {} stopped: {}", solution_id, e);
        }

        let result = context.into_result();
        tracing::info!(
            deleted_items = result.deleted.as_ref().map_or(0, |d| d.items.len()),
            failed_items = result.failed.as_ref().map_or(0, |f| f.items.len()),
            deleted_groups = result.deleted_groups.len(),
            solution_item_deleted = result.solution_item_deleted,
            folder_deleted = result.folder_deleted,
            "Solution teardown summary"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use portal_client::mock::{MockCall, MockPortal};
    use portal_client::{Group, ItemBase};
    use serde_json::json;

    use super::*;
    use crate::progress::test_support::RecordedProgress;

    /// Deployed Solution `sol1` in folder `fld1` with items `a` and `b` and an
    /// empty group `g1`.
    fn deployed_solution() -> MockPortal {
        let mock = MockPortal::new("casey");
        mock.add_item(
            ItemBase::new("sol1", "Solution", "casey")
                .with_keywords(&["Solution", "Deployed"])
                .in_folder("fld1"),
        );
        mock.add_item_data(
            "sol1",
            json!({
                "metadata": {"version": 1},
                "templates": [
                    {"itemId": "a", "type": "Feature Service", "groups": ["g1"]},
                    {"itemId": "b", "type": "Web Map", "dependencies": ["a"]}
                ]
            }),
        );
        for id in ["a", "b"] {
            mock.add_item(ItemBase::new(id, "Web Map", "casey").in_folder("fld1"));
            mock.relate("sol1", id);
        }
        mock.add_group(
            Group {
                id: "g1".to_string(),
                title: "Editors".to_string(),
                owner: "casey".to_string(),
                protected: false,
            },
            0,
        );
        mock
    }

    fn service(mock: &MockPortal) -> SolutionDeletionService {
        SolutionDeletionService::new(Arc::new(mock.clone()))
    }

    fn item_ids(precis: &Option<SolutionPrecis>) -> Vec<String> {
        precis.as_ref().map(|p| p.item_ids()).unwrap_or_default()
    }

    #[async_std::test]
    async fn test_delete_solution_removes_everything() {
        let mock = deployed_solution();

        let result = service(&mock)
            .delete_solution("sol1", DeleteOptions::default())
            .await;

        assert_eq!(item_ids(&result.deleted), vec!["b", "a"]);
        assert!(item_ids(&result.failed).is_empty());
        assert!(result.is_complete());
        assert_eq!(result.deleted_groups, vec!["g1"]);
        assert!(result.solution_item_deleted);
        assert!(result.folder_deleted);
        assert_eq!(mock.removed_items(), vec!["b", "a", "sol1"]);
        assert_eq!(mock.removed_folders(), vec!["fld1"]);
    }

    #[async_std::test]
    async fn test_failed_item_keeps_solution_and_folder() {
        let mock = deployed_solution();
        mock.fail(MockCall::RemoveItem, "b");

        let result = service(&mock)
            .delete_solution("sol1", DeleteOptions::default())
            .await;

        assert_eq!(item_ids(&result.deleted), vec!["a"]);
        assert_eq!(item_ids(&result.failed), vec!["b"]);
        assert!(!result.is_complete());
        assert!(!result.solution_item_deleted);
        assert!(!result.folder_deleted);
        assert!(mock.item_exists("sol1"));
        assert!(mock.folder_exists("fld1"));
        assert!(!mock.calls_to(MockCall::RemoveItem).contains(&"sol1".to_string()));
        assert_eq!(mock.call_count(MockCall::RemoveFolder), 0);
    }

    #[async_std::test]
    async fn test_rerun_after_partial_failure_retries_only_failed_items() {
        let mock = deployed_solution();
        mock.fail(MockCall::RemoveItem, "b");
        let service = service(&mock);
        service
            .delete_solution("sol1", DeleteOptions::default())
            .await;

        mock.recover(MockCall::RemoveItem, "b");
        let result = service
            .delete_solution("sol1", DeleteOptions::default())
            .await;

        assert_eq!(item_ids(&result.deleted), vec!["b"]);
        assert!(item_ids(&result.failed).is_empty());
        assert!(result.solution_item_deleted);
        assert!(result.folder_deleted);
        assert_eq!(mock.calls_to(MockCall::RemoveItem), vec!["b", "a", "b", "sol1"]);
    }

    #[async_std::test]
    async fn test_shared_item_is_left_in_place_and_keeps_folder() {
        let mock = deployed_solution();
        mock.add_item(
            ItemBase::new("sol2", "Solution", "casey").with_keywords(&["Solution", "Deployed"]),
        );
        mock.relate("sol2", "a");

        let result = service(&mock)
            .delete_solution("sol1", DeleteOptions::default())
            .await;

        assert_eq!(item_ids(&result.deleted), vec!["b"]);
        assert!(mock.item_exists("a"));
        assert!(result.solution_item_deleted);
        assert!(!result.folder_deleted);
        assert!(mock.folder_exists("fld1"));
    }

    #[async_std::test]
    async fn test_progress_is_non_decreasing_with_fixed_step() {
        let mock = deployed_solution();
        mock.add_item(ItemBase::new("c", "Web Map", "casey").in_folder("fld1"));
        mock.relate("sol1", "c");
        let recorded = RecordedProgress::default();

        service(&mock)
            .delete_solution("sol1", recorded.options().with_job_id("job-1"))
            .await;

        assert_eq!(recorded.percents(), vec![20, 40, 60, 80, 99]);
        let snapshot = recorded.snapshot();
        assert!(snapshot.iter().all(|r| r.1.as_deref() == Some("job-1")));
        assert_eq!(
            snapshot.last().unwrap(),
            &(99, Some("job-1".to_string()), "sol1".to_string(), "3 Finished".to_string())
        );
    }

    #[async_std::test]
    async fn test_progress_events_reach_channel() {
        let mock = deployed_solution();
        let (tx, rx) = async_std::channel::unbounded();

        service(&mock)
            .delete_solution("sol1", DeleteOptions::new().with_progress_tx(tx))
            .await;

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(events.len(), 4);
    }

    #[async_std::test]
    async fn test_non_deployed_solution_returns_no_summaries() {
        let mock = MockPortal::new("casey");
        mock.add_item(ItemBase::new("wm1", "Web Map", "casey"));

        let result = service(&mock)
            .delete_solution("wm1", DeleteOptions::default())
            .await;

        assert_eq!(result, SolutionDeletionResult::default());
        assert!(result.deleted.is_none());
        assert!(result.failed.is_none());
        assert!(mock.removed_items().is_empty());
    }

    #[async_std::test]
    async fn test_empty_solution_id_is_rejected_without_portal_calls() {
        let mock = MockPortal::new("casey");

        let result = service(&mock)
            .delete_solution("  ", DeleteOptions::default())
            .await;

        assert!(result.deleted.is_none());
        assert_eq!(mock.total_calls(), 0);
    }

    #[async_std::test]
    async fn test_delete_solution_by_components() {
        let mock = deployed_solution();
        let templates: Vec<SolutionTemplate> = serde_json::from_value(json!([
            {"itemId": "t-a", "type": "Feature Service", "item": {"title": "Roads"}},
            {"itemId": "t-b", "type": "Web Map", "item": {"title": "Roads map"}},
            {"itemId": "t-g", "type": "Group", "item": {"title": "Editors"}}
        ]))
        .unwrap();
        let template_dictionary = json!({
            "folderId": "fld1",
            "t-a": {"itemId": "a"},
            "t-b": {"itemId": "b"},
            "t-g": {"itemId": "g1"}
        });
        let item_ids: Vec<String> = ["a", "b", "g1"].iter().map(|s| s.to_string()).collect();

        let result = service(&mock)
            .delete_solution_by_components(
                "sol1",
                &item_ids,
                &templates,
                &template_dictionary,
                DeleteOptions::default(),
            )
            .await;

        assert_eq!(mock.removed_items(), vec!["b", "a", "sol1"]);
        assert_eq!(result.deleted_groups, vec!["g1"]);
        assert!(result.folder_deleted);
        // no discovery calls were made
        assert_eq!(mock.call_count(MockCall::GetItemData), 0);
        assert_eq!(mock.call_count(MockCall::GetRelatedItems), 0);
    }

    #[async_std::test]
    async fn test_solution_item_failure_returns_partial_result() {
        let mock = deployed_solution();
        mock.fail(MockCall::RemoveItem, "sol1");

        let result = service(&mock)
            .delete_solution("sol1", DeleteOptions::default())
            .await;

        assert_eq!(item_ids(&result.deleted), vec!["b", "a"]);
        assert!(item_ids(&result.failed).is_empty());
        assert!(!result.solution_item_deleted);
        assert!(!result.folder_deleted);
    }

    #[async_std::test]
    async fn test_progress_never_goes_back_for_large_solution() {
        let mock = deployed_solution();
        for i in 0..196 {
            let id = format!("item{:03}", i);
            mock.add_item(ItemBase::new(id.clone(), "Web Map", "casey").in_folder("fld1"));
            mock.relate("sol1", id);
        }
        let recorded = RecordedProgress::default();

        service(&mock)
            .delete_solution("sol1", recorded.options())
            .await;

        let percents = recorded.percents();
        assert_eq!(percents.len(), 200);
        assert!(percents.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(percents.last(), Some(&99));
    }

    #[async_std::test]
    async fn test_template_with_null_lists_is_still_deleted() {
        let mock = deployed_solution();
        mock.add_item_data(
            "sol1",
            json!({
                "metadata": {"version": 1},
                "templates": [
                    {"itemId": "a", "type": "Feature Service", "groups": null},
                    {"itemId": "b", "type": "Web Map", "dependencies": null}
                ]
            }),
        );

        let result = service(&mock)
            .delete_solution("sol1", DeleteOptions::default())
            .await;

        assert_eq!(item_ids(&result.deleted), vec!["b", "a"]);
        assert!(result.solution_item_deleted);
    }
}
