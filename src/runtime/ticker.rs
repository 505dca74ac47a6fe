use crate::foundation::ids::{ClipId, FrameAddr};
use crate::runtime::outcome::ScriptError;
use crate::runtime::runner::run_script;
use crate::runtime::scope::ScriptOwner;
use crate::scene::clip::ScriptEvent;
use crate::scene::project::Project;

/// One synchronized descent over a clip subtree:
///
/// 1. the clip fires its own `load` (first activation) or `update`,
/// 2. its timeline's frames are diffed against the playhead — departed
///    frames fire `unload` and deactivate their children, the covered frame
///    fires `load`/`update` and ticks its children in insertion order,
/// 3. the timeline advances (queued jump first, else step-and-wrap).
///
/// The first script fault anywhere aborts the rest of the traversal at every
/// level — including the final advance — and is returned unchanged. Work
/// already done keeps its effects.
pub(crate) fn tick_clip(project: &mut Project, id: ClipId) -> Result<(), ScriptError> {
    let Some(clip) = project.clip_mut(id) else {
        return Ok(());
    };
    let newly_active = !clip.was_active;
    clip.was_active = true;

    let event = if newly_active {
        ScriptEvent::Load
    } else {
        ScriptEvent::Update
    };
    run_script(project, ScriptOwner::Clip(id), event)?;

    tick_timeline(project, id)?;

    if let Some(clip) = project.clip_mut(id) {
        clip.timeline_mut().advance();
    }
    Ok(())
}

/// Diff every frame of `owner`'s timeline against the current playhead and
/// fire the resulting lifecycle events, layer by layer, frames in stored
/// order.
fn tick_timeline(project: &mut Project, owner: ClipId) -> Result<(), ScriptError> {
    let Some(clip) = project.clip(owner) else {
        return Ok(());
    };
    let playhead = clip.timeline().playhead();
    let layer_count = clip.timeline().layers().len();

    for layer in 0..layer_count {
        let frame_count = match project.clip(owner).and_then(|c| c.timeline().layer(layer)) {
            Some(l) => l.frames().len(),
            None => continue,
        };
        for frame in 0..frame_count {
            let addr = FrameAddr {
                clip: owner,
                layer,
                frame,
            };
            let Some((covered, was_active)) = project
                .frame(addr)
                .map(|f| (f.span().contains(playhead), f.was_active))
            else {
                continue;
            };
            match (was_active, covered) {
                (false, true) => fire_frame(project, addr, ScriptEvent::Load)?,
                (true, true) => fire_frame(project, addr, ScriptEvent::Update)?,
                (true, false) => deactivate_frame(project, addr)?,
                (false, false) => {}
            }
        }
    }
    Ok(())
}

/// Fire `event` on a frame: flag first (a failing `load` is not retried as
/// `load`), then the frame's own script, then each child clip in insertion
/// order.
fn fire_frame(project: &mut Project, addr: FrameAddr, event: ScriptEvent) -> Result<(), ScriptError> {
    let Some(frame) = project.frame_mut(addr) else {
        return Ok(());
    };
    frame.was_active = true;

    run_script(project, ScriptOwner::Frame(addr), event)?;

    let children: Vec<ClipId> = match project.frame(addr) {
        Some(frame) => frame.children().to_vec(),
        None => return Ok(()),
    };
    for child in children {
        tick_clip(project, child)?;
    }
    Ok(())
}

/// A frame whose coverage ended: fire `unload`, then deactivate its children
/// (their own `unload`s, recursively down their active subtrees).
fn deactivate_frame(project: &mut Project, addr: FrameAddr) -> Result<(), ScriptError> {
    let Some(frame) = project.frame_mut(addr) else {
        return Ok(());
    };
    frame.was_active = false;

    run_script(project, ScriptOwner::Frame(addr), ScriptEvent::Unload)?;

    let children: Vec<ClipId> = match project.frame(addr) {
        Some(frame) => frame.children().to_vec(),
        None => return Ok(()),
    };
    for child in children {
        deactivate_clip(project, child)?;
    }
    Ok(())
}

fn deactivate_clip(project: &mut Project, id: ClipId) -> Result<(), ScriptError> {
    let Some(clip) = project.clip_mut(id) else {
        return Ok(());
    };
    if !clip.was_active {
        return Ok(());
    }
    clip.was_active = false;

    run_script(project, ScriptOwner::Clip(id), ScriptEvent::Unload)?;

    // Wind down whatever was active on the clip's own timeline.
    let Some(clip) = project.clip(id) else {
        return Ok(());
    };
    let layer_count = clip.timeline().layers().len();
    for layer in 0..layer_count {
        let frame_count = match project.clip(id).and_then(|c| c.timeline().layer(layer)) {
            Some(l) => l.frames().len(),
            None => continue,
        };
        for frame in 0..frame_count {
            let addr = FrameAddr {
                clip: id,
                layer,
                frame,
            };
            if project.frame(addr).is_some_and(|f| f.was_active) {
                deactivate_frame(project, addr)?;
            }
        }
    }
    Ok(())
}
