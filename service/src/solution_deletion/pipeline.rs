use crate::{
    pipeline::Pipeline,
    solution_deletion::{
        context::ContentsDeletionContext,
        steps::{
            DeleteEmptyGroupsStep, DeleteSolutionFolderStep, DeleteSolutionItemStep,
            RemoveMemberItemsStep, SnapshotSolutionIdsStep,
        },
    },
};

impl Pipeline<ContentsDeletionContext> {
    pub fn new() -> Self {
        Self::with_steps(vec![
            Box::new(SnapshotSolutionIdsStep),
            Box::new(RemoveMemberItemsStep),
            Box::new(DeleteEmptyGroupsStep),
            Box::new(DeleteSolutionItemStep),
            Box::new(DeleteSolutionFolderStep),
        ])
    }
}
