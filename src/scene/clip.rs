use std::collections::BTreeMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::foundation::error::{FlipbookError, FlipbookResult};
use crate::foundation::ids::ClipId;
use crate::scene::timeline::{Frame, Layer, Timeline};
use crate::scene::transform::Transformation;
use crate::script::ast::Program;
use crate::script::value::Value;

/// Lifecycle events a tickable entity can attach scripts to.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ScriptEvent {
    /// Fired once, the first tick an entity becomes active.
    Load,
    /// Fired on every subsequent tick while the entity stays active.
    Update,
    /// Fired once when the entity's activity ends.
    Unload,
}

impl ScriptEvent {
    /// The event name as scripts and the editor spell it.
    pub fn name(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Update => "update",
            Self::Unload => "unload",
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub(crate) struct Script {
    pub(crate) event: ScriptEvent,
    pub(crate) source: String,
    /// Compiled form, filled on first execution and dropped on edits.
    #[serde(skip)]
    pub(crate) compiled: Option<Arc<Program>>,
}

/// The scripts attached to one tickable entity: at most one per event.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Scripts {
    entries: Vec<Script>,
}

impl Scripts {
    /// Attach `source` to `event`, replacing any existing script for it.
    pub fn add(&mut self, event: ScriptEvent, source: impl Into<String>) {
        let source = source.into();
        match self.entries.iter_mut().find(|s| s.event == event) {
            Some(existing) => {
                existing.source = source;
                existing.compiled = None;
            }
            None => self.entries.push(Script {
                event,
                source,
                compiled: None,
            }),
        }
    }

    /// Replace the script for `event`; errors when none exists.
    pub fn update(&mut self, event: ScriptEvent, source: impl Into<String>) -> FlipbookResult<()> {
        match self.entries.iter_mut().find(|s| s.event == event) {
            Some(existing) => {
                existing.source = source.into();
                existing.compiled = None;
                Ok(())
            }
            None => Err(FlipbookError::scene(format!(
                "no '{}' script to update",
                event.name()
            ))),
        }
    }

    /// Source text for `event`, if a script is attached.
    pub fn source(&self, event: ScriptEvent) -> Option<&str> {
        self.entries
            .iter()
            .find(|s| s.event == event)
            .map(|s| s.source.as_str())
    }

    pub(crate) fn entry_mut(&mut self, event: ScriptEvent) -> Option<&mut Script> {
        self.entries.iter_mut().find(|s| s.event == event)
    }
}

/// The capability shared by [`Clip`] and [`Frame`]: a stable identity plus
/// lifecycle scripts. The tick traversal fires events against this surface.
pub trait Tickable {
    /// Stable identity, reported as the `uuid` of a [`crate::ScriptError`].
    fn uuid(&self) -> Uuid;

    /// Attached scripts.
    fn scripts(&self) -> &Scripts;

    /// Attached scripts, mutable.
    fn scripts_mut(&mut self) -> &mut Scripts;

    /// Attach (or replace) the script for `event`.
    fn add_script(&mut self, event: ScriptEvent, source: impl Into<String>)
    where
        Self: Sized,
    {
        self.scripts_mut().add(event, source);
    }

    /// Replace the script for `event`; errors when none exists.
    fn update_script(
        &mut self,
        event: ScriptEvent,
        source: impl Into<String>,
    ) -> FlipbookResult<()>
    where
        Self: Sized,
    {
        self.scripts_mut().update(event, source)
    }
}

/// A node of the clip tree: a child placed on some parent frame, and the
/// owner of its own nested [`Timeline`].
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Clip {
    uuid: Uuid,
    /// Optional name, unique among the children of the parent frame. Named
    /// clips are visible to sibling scripts as bare identifiers.
    pub identifier: Option<String>,
    transformation: Transformation,
    timeline: Timeline,
    pub(crate) scripts: Scripts,
    /// Script-defined dynamic properties (`this.score = 3`).
    pub(crate) props: BTreeMap<String, Value>,
    pub(crate) parent: Option<ClipId>,
    #[serde(skip)]
    pub(crate) was_active: bool,
}

impl Default for Clip {
    fn default() -> Self {
        Self::new()
    }
}

impl Clip {
    /// A fresh, unplaced clip. Its timeline starts with one layer holding a
    /// single frame at position 1, so the clip is tickable immediately.
    pub fn new() -> Self {
        let mut timeline = Timeline::new();
        let mut layer = Layer::new("Layer 1");
        layer
            .add_frame(Frame::spanning(1, 1))
            .expect("single frame on an empty layer cannot overlap");
        timeline.add_layer(layer);
        Self {
            uuid: Uuid::new_v4(),
            identifier: None,
            transformation: Transformation::default(),
            timeline,
            scripts: Scripts::default(),
            props: BTreeMap::new(),
            parent: None,
            was_active: false,
        }
    }

    /// Current pose.
    pub fn transformation(&self) -> &Transformation {
        &self.transformation
    }

    /// Current pose, mutable.
    pub fn transformation_mut(&mut self) -> &mut Transformation {
        &mut self.transformation
    }

    /// The timeline this clip exclusively owns.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// The owned timeline, mutable.
    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    /// The parent clip this clip is placed under, `None` for the root or a
    /// detached clip.
    pub fn parent(&self) -> Option<ClipId> {
        self.parent
    }

    /// A dynamic property previously written by a script.
    pub fn prop(&self, name: &str) -> Option<&Value> {
        self.props.get(name)
    }
}

impl Tickable for Clip {
    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn scripts(&self) -> &Scripts {
        &self.scripts
    }

    fn scripts_mut(&mut self) -> &mut Scripts {
        &mut self.scripts
    }
}

impl Tickable for Frame {
    fn uuid(&self) -> Uuid {
        Frame::uuid(self)
    }

    fn scripts(&self) -> &Scripts {
        &self.scripts
    }

    fn scripts_mut(&mut self) -> &mut Scripts {
        &mut self.scripts
    }
}
