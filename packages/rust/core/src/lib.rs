//! Core pipeline orchestration for pressrun.
//!
//! This crate ties source copying/conversion, excerpting, media
//! relocation, and formula rasterization into the end-to-end publish
//! workflow.

pub mod media;
pub mod publish;

pub use publish::{
    BatchReport, PublishConfig, PublishProgress, PublishReport, SilentProgress, publish,
    publish_all,
};
