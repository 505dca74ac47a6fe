use crate::foundation::ids::ClipId;
use crate::scene::clip::Clip;

/// Flat storage for every clip in a project, addressed by [`ClipId`].
///
/// Slots are allocated monotonically and never reused: a freed slot stays
/// `None`, so ids held by scripts or the editor go inert instead of silently
/// pointing at a different clip. Parent/child relationships are stored as
/// ids, which keeps the recursive clip/timeline ownership acyclic by
/// construction.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub(crate) struct ClipArena {
    slots: Vec<Option<Clip>>,
}

impl ClipArena {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn alloc(&mut self, clip: Clip) -> ClipId {
        let id = ClipId(self.slots.len() as u32);
        self.slots.push(Some(clip));
        id
    }

    pub(crate) fn get(&self, id: ClipId) -> Option<&Clip> {
        self.slots.get(id.0 as usize)?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: ClipId) -> Option<&mut Clip> {
        self.slots.get_mut(id.0 as usize)?.as_mut()
    }

    pub(crate) fn free(&mut self, id: ClipId) -> Option<Clip> {
        self.slots.get_mut(id.0 as usize)?.take()
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = ClipId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|_| ClipId(i as u32)))
    }
}
