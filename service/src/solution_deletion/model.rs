use core_types::SolutionPrecis;

/// What a Solution teardown achieved.
///
/// `deleted` and `failed` are both `None` when the Solution could not be
/// resolved at all. Otherwise `failed` lists the items to retry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolutionDeletionResult {
    pub deleted: Option<SolutionPrecis>,
    pub failed: Option<SolutionPrecis>,
    pub deleted_groups: Vec<String>,
    pub solution_item_deleted: bool,
    pub folder_deleted: bool,
}

impl SolutionDeletionResult {
    /// True when every member item was removed or already gone.
    pub fn is_complete(&self) -> bool {
        matches!(&self.failed, Some(failed) if failed.items.is_empty())
    }
}
