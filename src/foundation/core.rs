use crate::foundation::error::{FlipbookError, FlipbookResult};

/// 1-based position on a timeline (a playhead value or frame number).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FramePos(pub u32);

impl FramePos {
    /// The first position of every timeline.
    pub const FIRST: Self = Self(1);

    /// The following position.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// The preceding position, never going below 1.
    pub fn prev(self) -> Self {
        Self(self.0.saturating_sub(1).max(1))
    }
}

/// Inclusive 1-based interval `[start, end]` occupied by a frame on its layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameSpan {
    /// First occupied position.
    pub start: FramePos,
    /// Last occupied position, `>= start`.
    pub end: FramePos,
}

impl FrameSpan {
    /// Create a validated span with `1 <= start <= end`.
    pub fn new(start: FramePos, end: FramePos) -> FlipbookResult<Self> {
        if start.0 == 0 {
            return Err(FlipbookError::validation("FrameSpan positions are 1-based"));
        }
        if start.0 > end.0 {
            return Err(FlipbookError::validation("FrameSpan start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Return `true` when `pos` is inside `[start, end]`.
    pub fn contains(self, pos: FramePos) -> bool {
        self.start.0 <= pos.0 && pos.0 <= self.end.0
    }

    /// Return `true` when the two spans share at least one position.
    pub fn overlaps(self, other: Self) -> bool {
        self.start.0 <= other.end.0 && other.start.0 <= self.end.0
    }

    /// Number of positions covered.
    pub fn len_frames(self) -> u32 {
        self.end.0 - self.start.0 + 1
    }
}
