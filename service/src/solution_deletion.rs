pub mod context;
pub mod model;
pub mod pipeline;
pub mod service;
pub mod steps;

pub use model::SolutionDeletionResult;
pub use service::SolutionDeletionService;
