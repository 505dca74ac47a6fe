use tracing::instrument;

use crate::foundation::error::{FlipbookError, FlipbookResult};
use crate::foundation::ids::{ClipId, FrameAddr};
use crate::foundation::math;
use crate::runtime::outcome::ScriptError;
use crate::runtime::ticker;
use crate::scene::arena::ClipArena;
use crate::scene::clip::Clip;
use crate::scene::timeline::Frame;

/// The root document: project metadata plus the arena holding every clip.
///
/// All structural relationships are id references into the arena, so the
/// recursive clip/timeline ownership is acyclic by construction and the
/// upward `parent` walk needs no managed pointers. The project is also the
/// tick driver: [`Project::tick`] advances the focused subtree by one
/// logical frame.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Project {
    name: String,
    width: u32,
    height: u32,
    framerate: f64,
    background_color: String,
    seed: u64,
    /// Live RNG stream position; serialized so a resumed replay continues
    /// the same deterministic sequence.
    rng_state: u64,
    clips: ClipArena,
    root: ClipId,
    focus: ClipId,
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl Project {
    /// A fresh document: one root clip with a single-frame timeline.
    pub fn new() -> Self {
        let mut clips = ClipArena::new();
        let root = clips.alloc(Clip::new());
        Self {
            name: "My Project".to_owned(),
            width: 720,
            height: 480,
            framerate: 12.0,
            background_color: "#ffffff".to_owned(),
            seed: 0,
            rng_state: 0,
            clips,
            root,
            focus: root,
        }
    }

    // ---- metadata ----

    /// Project name, exposed to scripts as `project.name`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the project.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Canvas width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Set the canvas width (must be > 0).
    pub fn set_width(&mut self, width: u32) -> FlipbookResult<()> {
        if width == 0 {
            return Err(FlipbookError::validation("width must be > 0"));
        }
        self.width = width;
        Ok(())
    }

    /// Canvas height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Set the canvas height (must be > 0).
    pub fn set_height(&mut self, height: u32) -> FlipbookResult<()> {
        if height == 0 {
            return Err(FlipbookError::validation("height must be > 0"));
        }
        self.height = height;
        Ok(())
    }

    /// Logical frames per second. Ticks are externally paced; this is
    /// metadata for the pacing collaborator.
    pub fn framerate(&self) -> f64 {
        self.framerate
    }

    /// Set the framerate (must be finite and > 0).
    pub fn set_framerate(&mut self, framerate: f64) -> FlipbookResult<()> {
        if !framerate.is_finite() || framerate <= 0.0 {
            return Err(FlipbookError::validation("framerate must be > 0"));
        }
        self.framerate = framerate;
        Ok(())
    }

    /// Canvas background color (CSS-style string, uninterpreted here).
    pub fn background_color(&self) -> &str {
        &self.background_color
    }

    /// Set the background color.
    pub fn set_background_color(&mut self, color: impl Into<String>) {
        self.background_color = color.into();
    }

    /// Determinism seed for the script `random` API.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Reseed the script RNG and rewind its stream.
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng_state = seed;
    }

    // ---- tree access ----

    /// The root clip (never removable).
    pub fn root(&self) -> ClipId {
        self.root
    }

    /// The clip targeted by [`Project::tick`].
    pub fn focus(&self) -> ClipId {
        self.focus
    }

    /// Focus another clip (the authored/viewed subtree).
    pub fn set_focus(&mut self, id: ClipId) -> FlipbookResult<()> {
        if self.clips.get(id).is_none() {
            return Err(FlipbookError::scene("cannot focus a removed clip"));
        }
        self.focus = id;
        Ok(())
    }

    /// Shared access to a clip. `None` when the id was removed.
    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.clips.get(id)
    }

    /// Mutable access to a clip.
    pub fn clip_mut(&mut self, id: ClipId) -> Option<&mut Clip> {
        self.clips.get_mut(id)
    }

    /// Shared access to a frame by address.
    pub fn frame(&self, addr: FrameAddr) -> Option<&Frame> {
        self.clips
            .get(addr.clip)?
            .timeline()
            .layer(addr.layer)?
            .frame(addr.frame)
    }

    /// Mutable access to a frame by address.
    pub fn frame_mut(&mut self, addr: FrameAddr) -> Option<&mut Frame> {
        self.clips
            .get_mut(addr.clip)?
            .timeline_mut()
            .layer_mut(addr.layer)?
            .frame_mut(addr.frame)
    }

    /// Address of the first active frame on `clip`'s timeline (layers
    /// scanned in order), the usual insertion point for editor actions.
    pub fn active_frame(&self, clip: ClipId) -> Option<FrameAddr> {
        let timeline = self.clips.get(clip)?.timeline();
        (0..timeline.layers().len()).find_map(|layer| {
            let frame = timeline.active_frame_of(layer)?;
            Some(FrameAddr { clip, layer, frame })
        })
    }

    /// The frame a clip is currently placed on, `None` for the root or a
    /// detached clip.
    pub fn placement_of(&self, id: ClipId) -> Option<FrameAddr> {
        let parent = self.clips.get(id)?.parent()?;
        let timeline = self.clips.get(parent)?.timeline();
        for (li, layer) in timeline.layers().iter().enumerate() {
            for (fi, frame) in layer.frames().iter().enumerate() {
                if frame.children().contains(&id) {
                    return Some(FrameAddr {
                        clip: parent,
                        layer: li,
                        frame: fi,
                    });
                }
            }
        }
        None
    }

    /// The chain `[id, parent, grandparent, ..., root]`. Finite for every
    /// tree because placement is exclusive: a clip cannot be placed under
    /// its own descendant (enforced by [`Project::add_clip`]).
    pub fn lineage(&self, id: ClipId) -> Vec<ClipId> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            chain.push(current);
            cursor = self.clips.get(current).and_then(Clip::parent);
        }
        chain
    }

    // ---- structural editing ----

    /// Allocate a fresh, unplaced clip.
    pub fn create_clip(&mut self) -> ClipId {
        self.clips.alloc(Clip::new())
    }

    /// Place `child` on the frame at `addr`, transferring ownership from any
    /// previous placement (a clip lives on exactly one frame). Rejects
    /// placements under the clip's own subtree and identifier clashes among
    /// the destination frame's children.
    pub fn add_clip(&mut self, addr: FrameAddr, child: ClipId) -> FlipbookResult<()> {
        if self.clips.get(child).is_none() {
            return Err(FlipbookError::scene("cannot place a removed clip"));
        }
        if child == self.root {
            return Err(FlipbookError::scene("the root clip cannot be placed"));
        }
        if self.lineage(addr.clip).contains(&child) {
            return Err(FlipbookError::validation(
                "cannot place a clip under its own subtree",
            ));
        }
        let Some(frame) = self.frame(addr) else {
            return Err(FlipbookError::scene("no frame at the given address"));
        };

        if let Some(name) = self.clips.get(child).and_then(|c| c.identifier.clone()) {
            let clash = frame.children().iter().any(|&sibling| {
                sibling != child
                    && self
                        .clips
                        .get(sibling)
                        .is_some_and(|c| c.identifier.as_deref() == Some(name.as_str()))
            });
            if clash {
                return Err(FlipbookError::validation(format!(
                    "a sibling clip named '{name}' already exists on this frame"
                )));
            }
        }

        self.detach(child);

        let Some(frame) = self.frame_mut(addr) else {
            return Err(FlipbookError::scene("no frame at the given address"));
        };
        frame.children.push(child);
        if let Some(clip) = self.clips.get_mut(child) {
            clip.parent = Some(addr.clip);
        }
        Ok(())
    }

    /// Remove `id` from its frame and destroy it together with its whole
    /// subtree. The root clip cannot be removed.
    pub fn remove_clip(&mut self, id: ClipId) -> FlipbookResult<()> {
        if id == self.root {
            return Err(FlipbookError::scene("the root clip cannot be removed"));
        }
        if self.clips.get(id).is_none() {
            return Err(FlipbookError::scene("clip is already removed"));
        }
        self.detach(id);

        // Free the whole subtree; each clip's child lists are read out of the
        // freed record itself.
        let mut queue = vec![id];
        while let Some(current) = queue.pop() {
            if let Some(clip) = self.clips.free(current) {
                for layer in clip.timeline().layers() {
                    for frame in layer.frames() {
                        queue.extend_from_slice(frame.children());
                    }
                }
            }
        }
        if self.clips.get(self.focus).is_none() {
            self.focus = self.root;
        }
        Ok(())
    }

    fn detach(&mut self, id: ClipId) {
        if let Some(addr) = self.placement_of(id)
            && let Some(frame) = self.frame_mut(addr)
        {
            frame.children.retain(|&c| c != id);
        }
        if let Some(clip) = self.clips.get_mut(id) {
            clip.parent = None;
        }
    }

    // ---- consistency ----

    /// Check structural invariants: positive canvas/framerate, live root and
    /// focus, and parent/placement agreement for every clip.
    pub fn validate(&self) -> FlipbookResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(FlipbookError::validation("canvas width/height must be > 0"));
        }
        if !self.framerate.is_finite() || self.framerate <= 0.0 {
            return Err(FlipbookError::validation("framerate must be > 0"));
        }
        if self.clips.get(self.root).is_none() {
            return Err(FlipbookError::scene("root clip is missing"));
        }
        if self.clips.get(self.focus).is_none() {
            return Err(FlipbookError::scene("focused clip is missing"));
        }
        if self.clips.get(self.root).is_some_and(|c| c.parent().is_some()) {
            return Err(FlipbookError::scene("root clip must not have a parent"));
        }

        for id in self.clips.ids() {
            let clip = self.clips.get(id).expect("id came from the arena");
            for layer in clip.timeline().layers() {
                for frame in layer.frames() {
                    for &child in frame.children() {
                        let Some(child_clip) = self.clips.get(child) else {
                            return Err(FlipbookError::scene(format!(
                                "frame references removed clip {child:?}"
                            )));
                        };
                        if child_clip.parent() != Some(id) {
                            return Err(FlipbookError::scene(format!(
                                "clip {child:?} parent link disagrees with its placement"
                            )));
                        }
                    }
                }
            }
            if let Some(parent) = clip.parent()
                && self.placement_of(id).is_none_or(|addr| addr.clip != parent)
            {
                return Err(FlipbookError::scene(format!(
                    "clip {id:?} is not placed on its parent's timeline"
                )));
            }
        }
        Ok(())
    }

    // ---- tick ----

    /// Advance the focused subtree by one logical frame. Returns the first
    /// script fault encountered anywhere in the traversal, as a value.
    #[instrument(skip(self), level = "debug")]
    pub fn tick(&mut self) -> Result<(), ScriptError> {
        let focus = self.focus;
        ticker::tick_clip(self, focus)
    }

    /// Advance a single clip subtree in isolation (focused-edit and test
    /// scenarios).
    #[instrument(skip(self), level = "debug")]
    pub fn tick_clip(&mut self, id: ClipId) -> Result<(), ScriptError> {
        ticker::tick_clip(self, id)
    }

    // ---- script RNG ----

    pub(crate) fn next_random_integer(&mut self, lo: i64, hi: i64) -> i64 {
        math::rand_integer(&mut self.rng_state, lo, hi)
    }

    pub(crate) fn next_random_float(&mut self, lo: f64, hi: f64) -> f64 {
        math::rand_float(&mut self.rng_state, lo, hi)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/project.rs"]
mod tests;
