use core_types::{ItemPrecis, SolutionPrecis};
use serde_json::Value;

use crate::solution_summary::{SolutionTemplate, build_position};

/// Id the template was deployed as, falling back to the template's own id.
fn deployed_id(template: &SolutionTemplate, template_dictionary: &Value) -> String {
    template_dictionary
        .get(&template.item_id)
        .and_then(|entry| entry.get("itemId"))
        .and_then(Value::as_str)
        .unwrap_or(&template.item_id)
        .to_string()
}

/// Build a Solution precis from what a deployment reported instead of asking
/// the portal.
///
/// Only templates whose deployed id is listed in `item_ids` are included.
/// Items and groups are each ordered by their position in `item_ids`.
pub fn summary_from_components(
    solution_id: &str,
    item_ids: &[String],
    templates: &[SolutionTemplate],
    template_dictionary: &Value,
) -> SolutionPrecis {
    let mut summary = SolutionPrecis {
        id: solution_id.to_string(),
        folder: template_dictionary
            .get("folderId")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        ..Default::default()
    };

    for template in templates {
        let id = deployed_id(template, template_dictionary);
        if !item_ids.contains(&id) {
            continue;
        }
        if template.is_group() {
            summary.add_group(id);
        } else if !summary.items.iter().any(|item| item.id == id) {
            summary.items.push(ItemPrecis {
                id,
                item_type: template.item_type.clone(),
                title: template.title().to_string(),
                modified: 0,
                owner: String::new(),
            });
        }
    }

    summary
        .items
        .sort_by_key(|item| build_position(item_ids, &item.id));
    summary
        .groups
        .sort_by_key(|group_id| build_position(item_ids, group_id));
    summary
}
