use core_types::{ItemPrecis, SolutionPrecis, StatusResponse, events::ItemProgressStatus};
use portal_client::{PortalError, PortalErrorKind, PortalOps};

use crate::progress::{DeleteOptions, report_progress};

/// Highest percent reported for a member item. The Solution item itself is
/// reported above it, so rounding on large Solutions never makes progress go back.
pub const ITEM_PROGRESS_CEILING: f64 = 98.0;

/// How a single item removal ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RemovalOutcome {
    Deleted,
    /// The item was already gone.
    Ignored,
    Failed(String),
}

impl RemovalOutcome {
    pub fn progress_status(&self) -> ItemProgressStatus {
        match self {
            RemovalOutcome::Deleted => ItemProgressStatus::Finished,
            RemovalOutcome::Ignored => ItemProgressStatus::Ignored,
            RemovalOutcome::Failed(_) => ItemProgressStatus::Failed,
        }
    }
}

/// Policy table for removal results.
///
/// | result                   | outcome |
/// |--------------------------|---------|
/// | `Ok { success: true }`   | Deleted |
/// | `Ok { success: false }`  | Failed  |
/// | `Err` of kind `NotFound` | Ignored |
/// | any other `Err`          | Failed  |
pub fn classify_removal(result: &Result<StatusResponse, PortalError>) -> RemovalOutcome {
    match result {
        Ok(status) if status.success => RemovalOutcome::Deleted,
        Ok(status) => RemovalOutcome::Failed(format!("Portal declined to remove {}", status.id)),
        Err(e) => match e.kind() {
            PortalErrorKind::NotFound => RemovalOutcome::Ignored,
            PortalErrorKind::Other => RemovalOutcome::Failed(e.to_string()),
        },
    }
}

/// Unprotect and remove one item.
///
/// Unprotecting is best effort: only a not-found answer stops the removal.
pub async fn remove_single_item(
    portal: &dyn PortalOps,
    item: &ItemPrecis,
    is_hub_site: bool,
) -> RemovalOutcome {
    match portal.unprotect_item(&item.id).await {
        Ok(status) if status.success => {}
        Ok(_) => tracing::warn!(
            "Could not unprotect item {}, attempting removal anyway",
            item.id
        ),
        Err(e) if e.is_not_found() => {
            tracing::info!("Item {} no longer exists, ignoring", item.id);
            return RemovalOutcome::Ignored;
        }
        Err(e) => tracing::warn!(
            "Failed to unprotect item {}: {}, attempting removal anyway",
            item.id,
            e
        ),
    }

    let result = if is_hub_site {
        match portal.hub_request_options().await {
            Ok(hub_request_options) => {
                portal
                    .remove_hub_site(&item.id, &hub_request_options)
                    .await
            }
            Err(e) => {
                return RemovalOutcome::Failed(format!(
                    "Failed to build Hub request options for {}: {}",
                    item.id, e
                ));
            }
        }
    } else {
        portal.remove_item(&item.id).await
    };

    classify_removal(&result)
}

/// Remove the items of `summary` one after another, in the order given.
///
/// Progress is reported after every item, advancing `percent_done` by
/// `progress_percent_step` and capped at `ITEM_PROGRESS_CEILING`. Returns the
/// deleted and the failed items as two precis sharing the identity of
/// `summary`; groups travel with the deleted one. Items that were already gone
/// appear in neither.
pub async fn remove_items(
    portal: &dyn PortalOps,
    summary: &SolutionPrecis,
    hub_site_item_ids: &[String],
    percent_done: f64,
    progress_percent_step: f64,
    options: &DeleteOptions,
) -> (SolutionPrecis, SolutionPrecis) {
    let mut deleted = summary.empty_copy();
    deleted.groups = summary.groups.clone();
    let mut failed = summary.empty_copy();
    let mut percent_done = percent_done;

    for item in &summary.items {
        let is_hub_site = hub_site_item_ids.contains(&item.id);
        tracing::info!("Removing item {} ({})", item.id, item.item_type);

        let outcome = remove_single_item(portal, item, is_hub_site).await;
        percent_done += progress_percent_step;

        match &outcome {
            RemovalOutcome::Deleted => deleted.items.push(item.clone()),
            RemovalOutcome::Ignored => {}
            RemovalOutcome::Failed(reason) => {
                tracing::error!("Failed to remove item {}: {}", item.id, reason);
                failed.items.push(item.clone());
            }
        }

        report_progress(
            percent_done.min(ITEM_PROGRESS_CEILING),
            options,
            Some(&item.id),
            outcome.progress_status(),
        )
        .await;
    }

    tracing::info!(
        "Removed {} items of Solution {}, {} failed",
        deleted.items.len(),
        summary.id,
        failed.items.len()
    );

    (deleted, failed)
}
