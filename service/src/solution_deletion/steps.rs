use core_types::{StatusResponse, events::ItemProgressStatus};

use crate::{
    error::Error,
    folder_cleanup::{SolutionIdSnapshot, delete_solution_folder},
    group_cleanup::delete_empty_groups,
    item_removal::remove_items,
    pipeline::pipeline_step::{PipelineStep, StepAction},
    progress::report_progress,
    solution_deletion::context::ContentsDeletionContext,
};

/// Percent reported once the Solution item itself is gone.
pub const SOLUTION_ITEM_DELETED_PERCENT: f64 = 99.0;

/// Step 1: Remember which ids belong to the Solution before anything is removed
pub struct SnapshotSolutionIdsStep;

#[async_trait::async_trait]
impl PipelineStep<ContentsDeletionContext> for SnapshotSolutionIdsStep {
    fn name(&self) -> &'static str {
        "snapshot_solution_ids"
    }

    async fn execute(&self, context: &mut ContentsDeletionContext) -> StepAction {
        let snapshot = SolutionIdSnapshot::new(&context.solution_id, &context.summary);
        context.hub_site_item_ids = context
            .summary
            .items
            .iter()
            .filter(|item| item.is_hub_site_application())
            .map(|item| item.id.clone())
            .collect();

        tracing::info!(
            "Solution {} has {} ids, {} of them Hub sites",
            context.solution_id,
            snapshot.len(),
            context.hub_site_item_ids.len()
        );
        context.solution_ids = Some(snapshot);
        StepAction::Continue
    }
}

/// Step 2: Remove member items, last created first
pub struct RemoveMemberItemsStep;

#[async_trait::async_trait]
impl PipelineStep<ContentsDeletionContext> for RemoveMemberItemsStep {
    fn name(&self) -> &'static str {
        "remove_member_items"
    }

    async fn execute(&self, context: &mut ContentsDeletionContext) -> StepAction {
        if context.summary.items.is_empty() {
            tracing::info!("Solution {} has no items to remove", context.solution_id);
            let mut deleted = context.summary.empty_copy();
            deleted.groups = context.summary.groups.clone();
            context.deleted_summary = Some(deleted);
            context.failed_summary = Some(context.summary.empty_copy());
            return StepAction::Continue;
        }

        // one tick for the start, one per item and one for the Solution item
        let progress_percent_step = 100.0 / (context.summary.items.len() + 2) as f64;
        report_progress(
            progress_percent_step,
            &context.options,
            None,
            ItemProgressStatus::Started,
        )
        .await;

        let mut deletion_order = context.summary.clone();
        deletion_order.items.reverse();

        let (deleted, failed) = remove_items(
            context.portal.as_ref(),
            &deletion_order,
            &context.hub_site_item_ids,
            progress_percent_step,
            progress_percent_step,
            &context.options,
        )
        .await;

        context.deleted_summary = Some(deleted);
        context.failed_summary = Some(failed);
        StepAction::Continue
    }
}

/// Step 3: Delete the Solution's groups that are owned and now empty
pub struct DeleteEmptyGroupsStep;

#[async_trait::async_trait]
impl PipelineStep<ContentsDeletionContext> for DeleteEmptyGroupsStep {
    fn name(&self) -> &'static str {
        "delete_empty_groups"
    }

    async fn execute(&self, context: &mut ContentsDeletionContext) -> StepAction {
        context.deleted_groups =
            delete_empty_groups(context.portal.as_ref(), &context.summary.groups).await;
        tracing::info!(
            "Deleted {} of {} groups of Solution {}",
            context.deleted_groups.len(),
            context.summary.groups.len(),
            context.solution_id
        );
        StepAction::Continue
    }
}

/// Step 4: Delete the Solution item, but only when no member item failed.
/// Keeping the Solution item lets a later run retry the failed items by Solution id.
pub struct DeleteSolutionItemStep;

#[async_trait::async_trait]
impl PipelineStep<ContentsDeletionContext> for DeleteSolutionItemStep {
    fn name(&self) -> &'static str {
        "delete_solution_item"
    }

    async fn execute(&self, context: &mut ContentsDeletionContext) -> StepAction {
        if context.has_failed_items() {
            tracing::warn!(
                "Some items of Solution {} could not be removed, keeping the Solution item",
                context.solution_id
            );
            context.solution_item_status = Some(StatusResponse::failed(&context.solution_id));
            return StepAction::Skip;
        }

        let portal = context.portal.clone();
        if let Err(e) = portal.unprotect_item(&context.solution_id).await {
            tracing::warn!(
                "Failed to unprotect Solution item {}: {}",
                context.solution_id,
                e
            );
        }

        match portal.remove_item(&context.solution_id).await {
            Ok(status) => {
                if status.success {
                    tracing::info!("Deleted Solution item {}", context.solution_id);
                    report_progress(
                        SOLUTION_ITEM_DELETED_PERCENT,
                        &context.options,
                        Some(&context.solution_id),
                        ItemProgressStatus::Finished,
                    )
                    .await;
                } else {
                    tracing::warn!("Portal declined to remove Solution item {}", status.id);
                }
                context.solution_item_status = Some(status);
                StepAction::Continue
            }
            Err(e) => {
                tracing::error!(
                    "Failed to delete Solution item {}: {}",
                    context.solution_id,
                    e
                );
                context.solution_item_status = Some(StatusResponse::failed(&context.solution_id));
                StepAction::Abort(Error::from(e))
            }
        }
    }
}

/// Step 5: Delete the deployment folder if only the Solution used it
pub struct DeleteSolutionFolderStep;

#[async_trait::async_trait]
impl PipelineStep<ContentsDeletionContext> for DeleteSolutionFolderStep {
    fn name(&self) -> &'static str {
        "delete_solution_folder"
    }

    fn should_execute(&self, context: &ContentsDeletionContext) -> bool {
        context.solution_item_deleted()
    }

    async fn execute(&self, context: &mut ContentsDeletionContext) -> StepAction {
        let solution_ids = context.solution_ids.clone().unwrap_or_default();
        context.folder_deleted = delete_solution_folder(
            context.portal.as_ref(),
            &solution_ids,
            &context.summary.folder,
        )
        .await;
        StepAction::Continue
    }
}
