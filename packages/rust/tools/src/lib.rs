//! External tool seam for the publishing pipeline.
//!
//! The pipeline shells out for the two jobs it does not do itself:
//! rendering notebooks and rasterizing formulas. Both go through the
//! [`ToolRunner`] trait with a hard per-invocation deadline, so a wedged
//! tool fails the run instead of hanging it.

pub mod notebook;
pub mod rasterize;
pub mod runner;

// Re-export public API at crate root for ergonomic imports.
pub use notebook::{ConvertFormat, NotebookConverter};
pub use rasterize::FormulaRasterizer;
pub use runner::{ProcessRunner, ToolOutput, ToolRunner};
