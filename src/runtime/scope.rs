use crate::foundation::ids::{ClipId, FrameAddr};

/// Which tickable a script is executing for. Determines error attribution
/// (the reported uuid) and where the script's sources are stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ScriptOwner {
    Clip(ClipId),
    Frame(FrameAddr),
}

/// The curated lexical environment for one script execution.
///
/// Built fresh before every run from the tree as it stands — never ambient
/// lookup. Name resolution order for a bare identifier: `this` / `parent` /
/// `project` / `random`, then the named children of `sibling_frame`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ScriptScope {
    /// The `this` binding. For a frame script, the clip owning the frame's
    /// timeline.
    pub(crate) this_clip: ClipId,
    /// The frame whose named children are visible as bare identifiers.
    /// `None` for a detached or root clip (no sibling namespace).
    pub(crate) sibling_frame: Option<FrameAddr>,
    /// The `parent` binding; `None` binds `parent` to undefined.
    pub(crate) parent: Option<ClipId>,
    /// Timeline owner targeted by bare control calls (`stop()`): the script
    /// owner's enclosing clip, or the clip itself at the root.
    pub(crate) control_target: ClipId,
}
