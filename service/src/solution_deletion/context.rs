use std::sync::Arc;

use core_types::{SolutionPrecis, StatusResponse};
use portal_client::PortalOps;

use crate::{
    folder_cleanup::SolutionIdSnapshot, progress::DeleteOptions,
    solution_deletion::model::SolutionDeletionResult,
};

/// Context object that flows through the contents deletion pipeline
pub struct ContentsDeletionContext {
    pub solution_id: String,
    pub summary: SolutionPrecis,
    pub portal: Arc<dyn PortalOps>,
    pub options: DeleteOptions,

    // Accumulated state as pipeline progresses
    pub solution_ids: Option<SolutionIdSnapshot>,
    pub hub_site_item_ids: Vec<String>,
    pub deleted_summary: Option<SolutionPrecis>,
    pub failed_summary: Option<SolutionPrecis>,
    pub deleted_groups: Vec<String>,
    pub solution_item_status: Option<StatusResponse>,
    pub folder_deleted: bool,
}

impl ContentsDeletionContext {
    pub fn new(
        solution_id: impl Into<String>,
        summary: SolutionPrecis,
        portal: Arc<dyn PortalOps>,
        options: DeleteOptions,
    ) -> Self {
        Self {
            solution_id: solution_id.into(),
            summary,
            portal,
            options,
            solution_ids: None,
            hub_site_item_ids: Vec::new(),
            deleted_summary: None,
            failed_summary: None,
            deleted_groups: Vec::new(),
            solution_item_status: None,
            folder_deleted: false,
        }
    }

    pub fn has_failed_items(&self) -> bool {
        self.failed_summary
            .as_ref()
            .is_some_and(|failed| !failed.items.is_empty())
    }

    pub fn solution_item_deleted(&self) -> bool {
        self.solution_item_status
            .as_ref()
            .is_some_and(|status| status.success)
    }

    pub fn into_result(self) -> SolutionDeletionResult {
        let solution_item_deleted = self.solution_item_deleted();
        SolutionDeletionResult {
            deleted: self.deleted_summary,
            failed: self.failed_summary,
            deleted_groups: self.deleted_groups,
            solution_item_deleted,
            folder_deleted: self.folder_deleted,
        }
    }
}
