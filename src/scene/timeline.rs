use uuid::Uuid;

use crate::foundation::core::{FramePos, FrameSpan};
use crate::foundation::error::{FlipbookError, FlipbookResult};
use crate::foundation::ids::ClipId;
use crate::scene::clip::Scripts;

/// An interval of its layer's timeline: owns scripts and places child clips.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Frame {
    uuid: Uuid,
    /// Optional name, unique among the frames of one layer. Used by
    /// `gotoAndStop("name")`-style jumps and `currentFrameName`.
    pub identifier: Option<String>,
    span: FrameSpan,
    pub(crate) scripts: Scripts,
    pub(crate) children: Vec<ClipId>,
    #[serde(skip)]
    pub(crate) was_active: bool,
}

impl Frame {
    /// A frame occupying the single position `pos`.
    pub fn at(pos: FramePos) -> Self {
        Self::new(FrameSpan { start: pos, end: pos })
    }

    /// A frame spanning `[start, end]` inclusive. Panics on an inverted span;
    /// use [`FrameSpan::new`] + [`Frame::new`] for validated construction.
    pub fn spanning(start: u32, end: u32) -> Self {
        assert!(1 <= start && start <= end, "invalid frame span");
        Self::new(FrameSpan {
            start: FramePos(start),
            end: FramePos(end),
        })
    }

    /// A frame over a validated span.
    pub fn new(span: FrameSpan) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            identifier: None,
            span,
            scripts: Scripts::default(),
            children: Vec::new(),
            was_active: false,
        }
    }

    /// Builder-style identifier assignment.
    pub fn named(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Stable identity of this frame (reported in script errors).
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// The occupied interval.
    pub fn span(&self) -> FrameSpan {
        self.span
    }

    /// Extend or shrink the frame to end at `end`. The end may not move
    /// before the start. Overlap with sibling frames is the editor's
    /// responsibility, as with any structural edit.
    pub fn set_end(&mut self, end: FramePos) -> FlipbookResult<()> {
        if end.0 < self.span.start.0 {
            return Err(FlipbookError::validation("frame end must be >= start"));
        }
        self.span.end = end;
        Ok(())
    }

    /// Child clips placed on this frame, in insertion order.
    pub fn children(&self) -> &[ClipId] {
        &self.children
    }
}

/// One track of frames along a timeline. Frames are kept sorted by start and
/// may not overlap; at most one frame covers any playhead position.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Layer {
    /// Display name, not interpreted by the runtime.
    pub name: String,
    frames: Vec<Frame>,
}

impl Layer {
    /// An empty layer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frames: Vec::new(),
        }
    }

    /// Insert a frame, keeping the sequence sorted by start. Rejects frames
    /// that overlap an existing one or reuse an existing identifier.
    pub fn add_frame(&mut self, frame: Frame) -> FlipbookResult<()> {
        for existing in &self.frames {
            if existing.span().overlaps(frame.span()) {
                return Err(FlipbookError::validation(format!(
                    "frame [{},{}] overlaps existing frame [{},{}]",
                    frame.span().start.0,
                    frame.span().end.0,
                    existing.span().start.0,
                    existing.span().end.0,
                )));
            }
            if let (Some(a), Some(b)) = (&existing.identifier, &frame.identifier)
                && a == b
            {
                return Err(FlipbookError::validation(format!(
                    "duplicate frame identifier '{b}' on layer '{}'",
                    self.name
                )));
            }
        }
        let at = self
            .frames
            .partition_point(|f| f.span().start.0 < frame.span().start.0);
        self.frames.insert(at, frame);
        Ok(())
    }

    /// Remove and return the frame at `index`.
    pub fn remove_frame(&mut self, index: usize) -> FlipbookResult<Frame> {
        if index >= self.frames.len() {
            return Err(FlipbookError::scene(format!(
                "no frame at index {index} on layer '{}'",
                self.name
            )));
        }
        Ok(self.frames.remove(index))
    }

    /// All frames, sorted by start.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Frame at `index`.
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Mutable frame at `index`.
    pub fn frame_mut(&mut self, index: usize) -> Option<&mut Frame> {
        self.frames.get_mut(index)
    }

    /// Index of the frame covering `pos`, if any. Binary search on the
    /// sorted starts, then a containment check.
    pub fn active_frame_at(&self, pos: FramePos) -> Option<usize> {
        let candidate = self.frames.partition_point(|f| f.span().start.0 <= pos.0);
        let idx = candidate.checked_sub(1)?;
        self.frames[idx].span().contains(pos).then_some(idx)
    }

    /// Last occupied position on this layer (0 when empty).
    pub(crate) fn extent(&self) -> u32 {
        self.frames.iter().map(|f| f.span().end.0).max().unwrap_or(0)
    }
}

/// Reference to a frame position: direct, or by frame identifier.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FrameRef {
    /// A 1-based playhead position (values below 1 clamp to 1).
    Position(FramePos),
    /// A frame identifier; resolves to that frame's start.
    Named(String),
}

impl From<u32> for FrameRef {
    fn from(pos: u32) -> Self {
        Self::Position(FramePos(pos.max(1)))
    }
}

impl From<FramePos> for FrameRef {
    fn from(pos: FramePos) -> Self {
        Self::Position(FramePos(pos.0.max(1)))
    }
}

impl From<&str> for FrameRef {
    fn from(name: &str) -> Self {
        Self::Named(name.to_owned())
    }
}

/// An ordered set of layers sharing one playhead and play state.
///
/// Every clip exclusively owns one timeline. Scripts steer it through the
/// control API; jumps are queued and consumed by the next [`Timeline::advance`]
/// so that `gotoAndPlay(5)` lands exactly on 5 before auto-advance resumes.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Timeline {
    layers: Vec<Layer>,
    playhead: FramePos,
    playing: bool,
    pending_goto: Option<FramePos>,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    /// An empty timeline: no layers, playhead at 1, playing.
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            playhead: FramePos::FIRST,
            playing: true,
            pending_goto: None,
        }
    }

    /// Current playhead position.
    pub fn playhead(&self) -> FramePos {
        self.playhead
    }

    /// Move the playhead directly (editor scrubbing). Values below 1 clamp.
    pub fn set_playhead(&mut self, pos: FramePos) {
        self.playhead = FramePos(pos.0.max(1));
    }

    /// Whether the playhead auto-advances each tick.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Resume auto-advance.
    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Freeze the playhead.
    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Queue a jump for the next [`Timeline::advance`]. A named reference
    /// that matches no frame identifier is a silent no-op.
    pub fn goto_frame(&mut self, frame: impl Into<FrameRef>) {
        match frame.into() {
            FrameRef::Position(pos) => self.pending_goto = Some(pos),
            FrameRef::Named(name) => {
                if let Some(start) = self.find_named_frame(&name) {
                    self.pending_goto = Some(start);
                }
            }
        }
    }

    /// Apply the queued jump, or step the playhead while playing: +1, or
    /// wrap to 1 when that would pass the greatest occupied position.
    pub fn advance(&mut self) {
        if let Some(pos) = self.pending_goto.take() {
            self.playhead = pos;
        } else if self.playing {
            self.playhead = if self.playhead.0 >= self.extent() {
                FramePos::FIRST
            } else {
                self.playhead.next()
            };
        }
    }

    /// Append a layer.
    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Remove and return the layer at `index`.
    pub fn remove_layer(&mut self, index: usize) -> FlipbookResult<Layer> {
        if index >= self.layers.len() {
            return Err(FlipbookError::scene(format!("no layer at index {index}")));
        }
        Ok(self.layers.remove(index))
    }

    /// All layers, in draw order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Layer at `index`.
    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Mutable layer at `index`.
    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }

    /// Index of the frame active on `layer` for the current playhead.
    pub fn active_frame_of(&self, layer: usize) -> Option<usize> {
        self.layers.get(layer)?.active_frame_at(self.playhead)
    }

    /// Last occupied position across all layers (0 when empty).
    pub fn extent(&self) -> u32 {
        self.layers.iter().map(Layer::extent).max().unwrap_or(0)
    }

    /// Start position of the first frame whose identifier equals `name`,
    /// scanning layers in order, then frames in order.
    fn find_named_frame(&self, name: &str) -> Option<FramePos> {
        self.layers.iter().find_map(|layer| {
            layer
                .frames()
                .iter()
                .find(|f| f.identifier.as_deref() == Some(name))
                .map(|f| f.span().start)
        })
    }
}
