use core_types::{SOLUTION_TO_ITEM_RELATIONSHIP, SolutionPrecis};
use futures::future::try_join_all;
use portal_client::{PortalOps, RelationshipDirection};

use crate::{error::Error, solution_summary::get_solution_summary};

/// Ids of the Solutions an item is related to.
pub async fn get_solutions_related_to_item(
    portal: &dyn PortalOps,
    item_id: &str,
) -> Result<Vec<String>, Error> {
    let related = portal
        .get_related_items(
            item_id,
            SOLUTION_TO_ITEM_RELATIONSHIP,
            RelationshipDirection::Reverse,
        )
        .await?;
    Ok(related
        .related_items
        .into_iter()
        .map(|solution| solution.id)
        .collect())
}

/// Summary of a deployed Solution restricted to the items only it uses.
///
/// Items that are also related to another Solution are left out so tearing
/// down this Solution does not break the other one.
pub async fn get_deletable_solution_info(
    portal: &dyn PortalOps,
    solution_id: &str,
) -> Result<SolutionPrecis, Error> {
    let mut summary = get_solution_summary(portal, solution_id).await?;

    let claims = try_join_all(
        summary
            .items
            .iter()
            .map(|item| get_solutions_related_to_item(portal, &item.id)),
    )
    .await?;

    summary.items = std::mem::take(&mut summary.items)
        .into_iter()
        .zip(claims)
        .filter_map(|(item, solution_ids)| match &solution_ids[..] {
            [single_solution] if single_solution == solution_id => Some(item),
            _ => {
                tracing::info!(
                    "Item {} is related to Solutions {:?}, keeping it",
                    item.id,
                    solution_ids
                );
                None
            }
        })
        .collect();

    Ok(summary)
}
