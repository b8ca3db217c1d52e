use std::collections::HashSet;

use core_types::{
    DEPLOYED_SOLUTION_KEYWORDS, ItemPrecis, ItemType, SOLUTION_TO_ITEM_RELATIONSHIP,
    SolutionPrecis,
};
use portal_client::{ItemBase, PortalOps, RelationshipDirection};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::Error;

/// Manifest version assumed when a Solution's data carries none.
pub const DEFAULT_MANIFEST_VERSION: i64 = 0;

/// One entry of a deployed Solution's `templates` list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionTemplate {
    pub item_id: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub item_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dependencies: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub groups: Vec<String>,
    #[serde(default)]
    pub item: Option<TemplateItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TemplateItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
}

/// Deployed manifests write `null` for empty lists and titles.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl SolutionTemplate {
    pub fn is_group(&self) -> bool {
        ItemType::Group.is(&self.item_type)
    }

    pub fn title(&self) -> &str {
        self.item.as_ref().map(|i| i.title.as_str()).unwrap_or("")
    }
}

pub fn manifest_version(data: &Value) -> i64 {
    let version = &data["metadata"]["version"];
    version
        .as_i64()
        .or_else(|| version.as_f64().map(|v| v as i64))
        .or_else(|| version.as_str().and_then(|v| v.trim().parse::<f64>().ok()).map(|v| v as i64))
        .unwrap_or(DEFAULT_MANIFEST_VERSION)
}

pub fn parse_templates(data: &Value) -> Result<Vec<SolutionTemplate>, Error> {
    match data.get("templates") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(templates) => Ok(serde_json::from_value(templates.clone())?),
    }
}

/// Rebuild the creation order of templates from their dependency lists.
///
/// Repeatedly emits the first template, in list order, whose dependencies
/// inside the Solution have all been emitted. Dependencies on ids outside the
/// template list count as satisfied. A cycle emits the first remaining
/// template so every id appears exactly once.
pub fn reconstruct_build_order(templates: &[SolutionTemplate]) -> Vec<String> {
    let known: HashSet<&str> = templates.iter().map(|t| t.item_id.as_str()).collect();
    let mut emitted: HashSet<&str> = HashSet::with_capacity(templates.len());
    let mut pending: Vec<&SolutionTemplate> = templates.iter().collect();
    let mut build_order = Vec::with_capacity(templates.len());

    while !pending.is_empty() {
        let ready = pending.iter().position(|template| {
            template.dependencies.iter().all(|dependency| {
                dependency == &template.item_id
                    || !known.contains(dependency.as_str())
                    || emitted.contains(dependency.as_str())
            })
        });
        let index = match ready {
            Some(index) => index,
            None => {
                tracing::warn!(
                    "Dependency cycle among templates, emitting {} out of order",
                    pending[0].item_id
                );
                0
            }
        };
        let template = pending.remove(index);
        if emitted.insert(template.item_id.as_str()) {
            build_order.push(template.item_id.clone());
        }
    }

    build_order
}

pub fn build_order_ids(templates: &[SolutionTemplate], version: i64) -> Vec<String> {
    if version < 1 {
        reconstruct_build_order(templates)
    } else {
        templates.iter().map(|t| t.item_id.clone()).collect()
    }
}

/// Group ids referenced by the templates, each once, in first-seen order.
pub fn collect_groups(templates: &[SolutionTemplate]) -> Vec<String> {
    let mut groups: Vec<String> = Vec::new();
    let mut push = |id: &String| {
        if !groups.contains(id) {
            groups.push(id.clone());
        }
    };
    for template in templates {
        if template.is_group() {
            push(&template.item_id);
        } else {
            template.groups.iter().for_each(&mut push);
        }
    }
    groups
}

/// Position of `id` in `order`, -1 when absent so unknown ids sort first.
pub fn build_position(order: &[String], id: &str) -> i64 {
    order
        .iter()
        .position(|candidate| candidate == id)
        .map(|index| index as i64)
        .unwrap_or(-1)
}

pub fn item_precis_from(item: ItemBase) -> ItemPrecis {
    ItemPrecis {
        id: item.id,
        item_type: item.item_type,
        title: item.title,
        modified: item.modified,
        owner: item.owner,
    }
}

fn is_deployed_solution(item: &ItemBase) -> bool {
    ItemType::Solution.is(&item.item_type)
        && DEPLOYED_SOLUTION_KEYWORDS
            .iter()
            .all(|keyword| item.has_keyword(keyword))
}

/// Describe a deployed Solution: its identity, folder, member items in build
/// order and the groups it created.
pub async fn get_solution_summary(
    portal: &dyn PortalOps,
    solution_id: &str,
) -> Result<SolutionPrecis, Error> {
    let (item, data) = futures::try_join!(
        portal.get_item_base(solution_id),
        portal.get_item_data_json(solution_id)
    )?;

    if !is_deployed_solution(&item) {
        tracing::warn!(
            "Item {} of type {} is not a deployed Solution",
            solution_id,
            item.item_type
        );
        return Err(Error::NotADeployedSolution(solution_id.to_string()));
    }
    let data = data.ok_or_else(|| Error::NotADeployedSolution(solution_id.to_string()))?;

    let version = manifest_version(&data);
    let templates = parse_templates(&data)?;

    let related = portal
        .get_related_items(
            solution_id,
            SOLUTION_TO_ITEM_RELATIONSHIP,
            RelationshipDirection::Forward,
        )
        .await?;
    let mut items: Vec<ItemPrecis> = related
        .related_items
        .into_iter()
        .map(item_precis_from)
        .collect();

    let build_order = build_order_ids(&templates, version);
    items.sort_by_key(|item| build_position(&build_order, &item.id));

    tracing::info!(
        "Solution {} (manifest version {}) has {} related items and {} templates",
        solution_id,
        version,
        items.len(),
        templates.len()
    );

    Ok(SolutionPrecis {
        id: item.id,
        title: item.title,
        folder: item.owner_folder.unwrap_or_default(),
        items,
        groups: collect_groups(&templates),
    })
}
