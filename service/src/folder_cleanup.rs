use std::collections::HashSet;

use core_types::SolutionPrecis;
use portal_client::PortalOps;

use crate::error::Error;

/// Number of items fetched per folder listing tranche.
pub const FOLDER_SEARCH_TRANCHE_SIZE: i64 = 100;

/// Ids of a Solution and all its member items, taken before any removal starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolutionIdSnapshot {
    ids: HashSet<String>,
}

impl SolutionIdSnapshot {
    pub fn new(solution_id: &str, summary: &SolutionPrecis) -> Self {
        let ids = summary
            .items
            .iter()
            .map(|item| item.id.clone())
            .chain(std::iter::once(solution_id.to_string()))
            .collect();
        Self { ids }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Walk the folder tranche by tranche; `false` as soon as an item outside the snapshot shows up.
async fn folder_holds_only(
    portal: &dyn PortalOps,
    folder_id: &str,
    solution_ids: &SolutionIdSnapshot,
) -> Result<bool, Error> {
    let mut start = 1;
    loop {
        let tranche = portal
            .search_items(folder_id, start, FOLDER_SEARCH_TRANCHE_SIZE)
            .await?;

        if let Some(foreign) = tranche
            .results
            .iter()
            .find(|item| !solution_ids.contains(&item.id))
        {
            tracing::info!(
                "Folder {} holds item {} that is not part of the Solution",
                folder_id,
                foreign.id
            );
            return Ok(false);
        }

        if tranche.results.is_empty() || tranche.next_start < 1 || tranche.next_start <= start {
            return Ok(true);
        }
        start = tranche.next_start;
    }
}

async fn try_delete_solution_folder(
    portal: &dyn PortalOps,
    solution_ids: &SolutionIdSnapshot,
    folder_id: &str,
) -> Result<bool, Error> {
    if !folder_holds_only(portal, folder_id, solution_ids).await? {
        return Ok(false);
    }
    let status = portal.remove_folder(folder_id).await?;
    Ok(status.success)
}

/// Remove the folder a Solution was deployed into when nothing but the
/// Solution's own items ever lived there. Failures are reported as `false`.
pub async fn delete_solution_folder(
    portal: &dyn PortalOps,
    solution_ids: &SolutionIdSnapshot,
    folder_id: &str,
) -> bool {
    if folder_id.is_empty() || solution_ids.is_empty() {
        return false;
    }

    match try_delete_solution_folder(portal, solution_ids, folder_id).await {
        Ok(deleted) => {
            if deleted {
                tracing::info!("Deleted Solution folder {}", folder_id);
            }
            deleted
        }
        Err(e) => {
            tracing::warn!("Failed to delete Solution folder {}: {}", folder_id, e);
            false
        }
    }
}
