//! Flipbook is an interactive timeline playback and scripting runtime.
//!
//! A document is a tree of [`Clip`]s: every clip owns a [`Timeline`] of
//! layers and frames, and every frame places child clips. One [`Project::tick`]
//! advances the whole tree by a single logical frame:
//!
//! - each timeline resolves its active frame per layer,
//! - newly-active frames and clips fire `load`, still-active ones fire
//!   `update`, departed ones fire `unload`,
//! - user scripts attached to those events run in a constructed scope
//!   (named siblings, `this`, `parent`, `project`, the timeline control API),
//! - the first script fault anywhere is captured as a [`ScriptError`] value
//!   and returned to the caller; everything that ran before it keeps its
//!   effects.
//!
//! Rendering, asset handling and project file formats are external
//! collaborators; they consume the playhead, active-frame and
//! [`Transformation`] state this crate maintains.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
mod runtime;
/// Scene model: clips, frames, layers, timelines and the project document.
pub mod scene;
pub(crate) mod script;

pub use crate::foundation::core::{FramePos, FrameSpan};
pub use crate::foundation::error::{FlipbookError, FlipbookResult};
pub use crate::foundation::ids::{ClipId, FrameAddr};
pub use crate::runtime::outcome::ScriptError;
pub use crate::scene::clip::{Clip, ScriptEvent, Scripts, Tickable};
pub use crate::scene::project::Project;
pub use crate::scene::timeline::{Frame, FrameRef, Layer, Timeline};
pub use crate::scene::transform::Transformation;
pub use crate::script::value::Value;
