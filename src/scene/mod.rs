//! Scene model: the clip tree, its timelines, and the project document.

/// Clip nodes, scripts, and the shared tickable surface.
pub mod clip;
pub(crate) mod arena;
/// The root document: metadata, the clip arena, and tick entry points.
pub mod project;
/// Timelines, layers and frames.
pub mod timeline;
/// Affine pose owned by every clip.
pub mod transform;
