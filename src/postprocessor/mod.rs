pub mod arcs;
pub mod block;
pub mod config;
pub mod formatter;
pub mod modal;
pub mod pipeline;
pub mod tangential;

pub use config::TangentialConfig;
pub use pipeline::{
    annotate_tangential, expand_arcs, process, Pipeline, ProcessOutput, ProcessStats,
};

/// Internal error type for post-processor failures.
/// The CLI layer maps these to AppError::Config at the boundary.
#[derive(Debug, thiserror::Error)]
pub enum PostProcessorError {
    #[error("config error: {0}")]
    Config(String),
}
