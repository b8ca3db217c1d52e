use futures::future::join_all;
use portal_client::PortalOps;

use crate::error::Error;

async fn try_delete_group_if_empty(portal: &dyn PortalOps, group_id: &str) -> Result<bool, Error> {
    let group = portal.get_group(group_id).await?;
    if group.owner != portal.session().username {
        tracing::info!(
            "Group {} is owned by {}, not deleting it",
            group_id,
            group.owner
        );
        return Ok(false);
    }

    let content = portal.get_group_content(group_id, 1).await?;
    if content.total > 0 {
        tracing::info!(
            "Group {} still holds {} items, not deleting it",
            group_id,
            content.total
        );
        return Ok(false);
    }

    if group.protected {
        let status = portal.unprotect_group(group_id).await?;
        if !status.success {
            tracing::warn!("Could not unprotect group {}", group_id);
            return Ok(false);
        }
    }

    let status = portal.remove_group(group_id).await?;
    Ok(status.success)
}

/// Delete a group if the signed-in user owns it and it holds no items.
///
/// Ownership is checked before content so groups of other users are never
/// inspected further. Any failure counts as "not deleted".
pub async fn delete_group_if_empty(portal: &dyn PortalOps, group_id: &str) -> bool {
    match try_delete_group_if_empty(portal, group_id).await {
        Ok(deleted) => deleted,
        Err(e) => {
            tracing::warn!("Failed to delete group {}: {}", group_id, e);
            false
        }
    }
}

/// Delete every owned, empty group in `group_ids` concurrently.
///
/// Returns the ids that were deleted, in input order.
pub async fn delete_empty_groups(portal: &dyn PortalOps, group_ids: &[String]) -> Vec<String> {
    let results = join_all(
        group_ids
            .iter()
            .map(|group_id| delete_group_if_empty(portal, group_id)),
    )
    .await;

    group_ids
        .iter()
        .zip(results)
        .filter(|(_, deleted)| *deleted)
        .map(|(group_id, _)| group_id.clone())
        .collect()
}
