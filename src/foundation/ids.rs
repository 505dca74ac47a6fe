/// Stable handle to a clip record in the project arena.
///
/// Ids are allocated monotonically and never reused, so a handle held across
/// a removal goes inert instead of aliasing a new clip.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct ClipId(pub(crate) u32);

/// Address of one frame: a clip, a layer index on its timeline, and a frame
/// index on that layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameAddr {
    /// The clip whose timeline holds the frame.
    pub clip: ClipId,
    /// Layer index on that timeline.
    pub layer: usize,
    /// Frame index on that layer (frames are kept sorted by start).
    pub frame: usize,
}
