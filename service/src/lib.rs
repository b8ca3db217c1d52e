pub mod component_summary;
pub mod deletable_info;
pub mod error;
pub mod folder_cleanup;
pub mod group_cleanup;
pub mod item_removal;
pub mod pipeline;
pub mod progress;
pub mod solution_deletion;
pub mod solution_summary;

pub use error::Error;
pub use progress::DeleteOptions;
pub use solution_deletion::{SolutionDeletionResult, SolutionDeletionService};
