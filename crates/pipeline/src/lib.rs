//! Clipsmith Pipeline
//!
//! Drives every input video through the fixed stage sequence:
//!
//! ```text
//! frame export -> scene detection -> audio analysis -> audio enhancement
//!     -> rule generation (+ rules sidecar) -> rule interpretation -> render
//! ```
//!
//! - **Adapters:** one trait per external collaborator, with ffmpeg, DSP
//!   and HTTP backed defaults
//! - **File pipeline:** a per-file state machine that stops at the first
//!   failed stage and always yields a `ProcessingResult`
//! - **Batch orchestrator:** discovery, chunking, bounded concurrency and
//!   the batch report

pub mod adapters;
pub mod batch;
pub mod file_pipeline;
pub mod stage;

pub use adapters::*;
pub use batch::BatchOrchestrator;
pub use file_pipeline::{FilePipeline, PipelineContext, PipelineState};
