//! Playhead behavior driven through whole-project ticks: auto-advance,
//! wrap-around, and the timeline control API called from scripts.

use flipbook::{ClipId, FramePos, Frame, Project, ScriptEvent, Tickable};

/// Stretch the root's single default frame to `[1, end]`.
fn stretch_root_frame(project: &mut Project, end: u32) {
    let addr = project.active_frame(project.root()).unwrap();
    project
        .frame_mut(addr)
        .unwrap()
        .set_end(FramePos(end))
        .unwrap();
}

/// Create a clip (optionally named) and place it on the root's active frame.
fn clip_on_root(project: &mut Project, name: Option<&str>) -> ClipId {
    let id = project.create_clip();
    if let Some(name) = name {
        project.clip_mut(id).unwrap().identifier = Some(name.to_owned());
    }
    let addr = project.active_frame(project.root()).unwrap();
    project.add_clip(addr, id).unwrap();
    id
}

fn root_playhead(project: &Project) -> u32 {
    project
        .clip(project.root())
        .unwrap()
        .timeline()
        .playhead()
        .0
}

fn clip_playhead(project: &Project, id: ClipId) -> u32 {
    project.clip(id).unwrap().timeline().playhead().0
}

#[test]
fn default_timeline_advances_one_per_tick_and_wraps() {
    let mut project = Project::new();
    stretch_root_frame(&mut project, 3);

    assert_eq!(root_playhead(&project), 1);
    project.tick().unwrap();
    assert_eq!(root_playhead(&project), 2);
    project.tick().unwrap();
    assert_eq!(root_playhead(&project), 3);
    project.tick().unwrap();
    assert_eq!(root_playhead(&project), 1);
    project.tick().unwrap();
    assert_eq!(root_playhead(&project), 2);
}

#[test]
fn playhead_holds_on_a_single_frame_extent() {
    let mut project = Project::new();
    for _ in 0..4 {
        project.tick().unwrap();
        assert_eq!(root_playhead(&project), 1);
    }
}

#[test]
fn bare_stop_freezes_the_focused_timeline() {
    let mut project = Project::new();
    stretch_root_frame(&mut project, 10);
    let clip = clip_on_root(&mut project, None);
    project
        .clip_mut(clip)
        .unwrap()
        .add_script(ScriptEvent::Load, "stop();");

    project.tick().unwrap();
    assert_eq!(root_playhead(&project), 1);
    project.tick().unwrap();
    assert_eq!(root_playhead(&project), 1);
}

#[test]
fn this_stop_freezes_only_the_calling_clips_timeline() {
    let mut project = Project::new();
    stretch_root_frame(&mut project, 10);
    let clip = clip_on_root(&mut project, None);
    {
        let clip = project.clip_mut(clip).unwrap();
        clip.add_script(ScriptEvent::Load, "this.stop();");
        let frame = clip.timeline_mut().layer_mut(0).unwrap().frame_mut(0).unwrap();
        frame.set_end(FramePos(10)).unwrap();
    }

    project.tick().unwrap();
    project.tick().unwrap();
    project.tick().unwrap();

    // The clip froze at 1; the root timeline kept advancing.
    assert_eq!(clip_playhead(&project, clip), 1);
    assert_eq!(root_playhead(&project), 4);
}

#[test]
fn other_clip_stop_freezes_only_the_referenced_timeline() {
    let mut project = Project::new();
    stretch_root_frame(&mut project, 10);
    let caller = clip_on_root(&mut project, None);
    let other = clip_on_root(&mut project, Some("otherClip"));
    project
        .clip_mut(caller)
        .unwrap()
        .add_script(ScriptEvent::Load, "otherClip.stop();");
    {
        let other = project.clip_mut(other).unwrap();
        let frame = other.timeline_mut().layer_mut(0).unwrap().frame_mut(0).unwrap();
        frame.set_end(FramePos(10)).unwrap();
    }

    project.tick().unwrap();
    project.tick().unwrap();

    assert_eq!(clip_playhead(&project, other), 1);
    assert_eq!(root_playhead(&project), 3);
}

#[test]
fn bare_play_resumes_a_stopped_timeline() {
    let mut project = Project::new();
    stretch_root_frame(&mut project, 10);
    project
        .clip_mut(project.root())
        .unwrap()
        .timeline_mut()
        .stop();
    let clip = clip_on_root(&mut project, None);
    project
        .clip_mut(clip)
        .unwrap()
        .add_script(ScriptEvent::Load, "play();");

    project.tick().unwrap();
    assert_eq!(root_playhead(&project), 2);
    project.tick().unwrap();
    assert_eq!(root_playhead(&project), 3);
}

#[test]
fn goto_and_stop_by_number_lands_and_halts() {
    let mut project = Project::new();
    stretch_root_frame(&mut project, 10);
    let clip = clip_on_root(&mut project, None);
    project
        .clip_mut(clip)
        .unwrap()
        .add_script(ScriptEvent::Load, "gotoAndStop(9);");

    project.tick().unwrap();
    assert_eq!(root_playhead(&project), 9);
    project.tick().unwrap();
    assert_eq!(root_playhead(&project), 9);
}

#[test]
fn this_goto_and_stop_by_name_resolves_on_own_timeline() {
    let mut project = Project::new();
    stretch_root_frame(&mut project, 10);
    let clip = clip_on_root(&mut project, None);
    {
        let clip = project.clip_mut(clip).unwrap();
        clip.add_script(ScriptEvent::Load, "this.gotoAndStop(\"foo\");");
        let layer = clip.timeline_mut().layer_mut(0).unwrap();
        layer.frame_mut(0).unwrap().set_end(FramePos(5)).unwrap();
        layer.add_frame(Frame::spanning(6, 10).named("foo")).unwrap();
    }

    project.tick().unwrap();
    assert_eq!(clip_playhead(&project, clip), 6);
    project.tick().unwrap();
    assert_eq!(clip_playhead(&project, clip), 6);
}

#[test]
fn goto_and_play_lands_then_resumes() {
    let mut project = Project::new();
    stretch_root_frame(&mut project, 10);
    project
        .clip_mut(project.root())
        .unwrap()
        .timeline_mut()
        .stop();
    let clip = clip_on_root(&mut project, None);
    project
        .clip_mut(clip)
        .unwrap()
        .add_script(ScriptEvent::Load, "gotoAndPlay(5);");

    project.tick().unwrap();
    assert_eq!(root_playhead(&project), 5);
    project.tick().unwrap();
    assert_eq!(root_playhead(&project), 6);
}

#[test]
fn goto_next_frame_steps_once_without_resuming() {
    let mut project = Project::new();
    stretch_root_frame(&mut project, 10);
    project
        .clip_mut(project.root())
        .unwrap()
        .timeline_mut()
        .stop();
    let clip = clip_on_root(&mut project, None);
    project
        .clip_mut(clip)
        .unwrap()
        .add_script(ScriptEvent::Load, "gotoNextFrame();");

    project.tick().unwrap();
    assert_eq!(root_playhead(&project), 2);
    project.tick().unwrap();
    assert_eq!(root_playhead(&project), 2);
}

#[test]
fn goto_prev_frame_steps_back_and_clamps_at_one() {
    let mut project = Project::new();
    stretch_root_frame(&mut project, 10);
    {
        let timeline = project.clip_mut(project.root()).unwrap().timeline_mut();
        timeline.stop();
        timeline.set_playhead(FramePos(5));
    }
    let clip = clip_on_root(&mut project, None);
    project
        .clip_mut(clip)
        .unwrap()
        .add_script(ScriptEvent::Load, "gotoPrevFrame();");

    project.tick().unwrap();
    assert_eq!(root_playhead(&project), 4);
    project.tick().unwrap();
    assert_eq!(root_playhead(&project), 4);

    project
        .clip_mut(project.root())
        .unwrap()
        .timeline_mut()
        .set_playhead(FramePos(1));
    let stepper = clip_on_root(&mut project, None);
    project
        .clip_mut(stepper)
        .unwrap()
        .add_script(ScriptEvent::Load, "gotoPrevFrame();");
    project.tick().unwrap();
    assert_eq!(root_playhead(&project), 1);
}

#[test]
fn goto_by_unknown_name_is_a_silent_no_op() {
    let mut project = Project::new();
    stretch_root_frame(&mut project, 10);
    let clip = clip_on_root(&mut project, None);
    project
        .clip_mut(clip)
        .unwrap()
        .add_script(ScriptEvent::Load, "gotoAndStop(\"nowhere\");");

    project.tick().unwrap();
    // The jump found no frame; only the stop applied.
    assert_eq!(root_playhead(&project), 1);
    assert!(!project.clip(project.root()).unwrap().timeline().is_playing());
}

#[test]
fn control_calls_from_frame_scripts_steer_the_owning_clip() {
    let mut project = Project::new();
    stretch_root_frame(&mut project, 10);
    let addr = project.active_frame(project.root()).unwrap();
    project
        .frame_mut(addr)
        .unwrap()
        .add_script(ScriptEvent::Load, "stop();");

    project.tick().unwrap();
    assert_eq!(root_playhead(&project), 1);
    project.tick().unwrap();
    assert_eq!(root_playhead(&project), 1);
}

#[test]
fn stop_then_play_in_one_script_applies_in_order() {
    let mut project = Project::new();
    stretch_root_frame(&mut project, 10);
    let clip = clip_on_root(&mut project, None);
    project
        .clip_mut(clip)
        .unwrap()
        .add_script(ScriptEvent::Load, "stop(); play();");

    project.tick().unwrap();
    assert_eq!(root_playhead(&project), 2);
}
