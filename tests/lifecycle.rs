//! Lifecycle event ordering (load/update/unload) and error propagation:
//! first-error-wins, short-circuit, bubble-up, preserved partial effects.

use flipbook::{ClipId, FrameAddr, FramePos, Frame, Project, ScriptEvent, Tickable, Value};

/// Capture runtime debug output (script faults) in test logs.
fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn clip_on_root(project: &mut Project, name: Option<&str>) -> ClipId {
    let id = project.create_clip();
    if let Some(name) = name {
        project.clip_mut(id).unwrap().identifier = Some(name.to_owned());
    }
    let addr = project.active_frame(project.root()).unwrap();
    project.add_clip(addr, id).unwrap();
    id
}

fn prop<'p>(project: &'p Project, id: ClipId, name: &str) -> Option<&'p Value> {
    project.clip(id).unwrap().prop(name)
}

#[test]
fn load_fires_once_then_update_fires_each_tick() {
    let mut project = Project::new();
    let clip = project.create_clip();
    {
        let clip = project.clip_mut(clip).unwrap();
        clip.add_script(ScriptEvent::Load, "this.loads = 1; this.updates = 0;");
        clip.add_script(ScriptEvent::Update, "this.updates += 1;");
    }

    project.tick_clip(clip).unwrap();
    assert_eq!(prop(&project, clip, "loads"), Some(&Value::Num(1.0)));
    assert_eq!(prop(&project, clip, "updates"), Some(&Value::Num(0.0)));

    project.tick_clip(clip).unwrap();
    project.tick_clip(clip).unwrap();
    assert_eq!(prop(&project, clip, "loads"), Some(&Value::Num(1.0)));
    assert_eq!(prop(&project, clip, "updates"), Some(&Value::Num(2.0)));
}

#[test]
fn unload_fires_when_coverage_ends_before_the_successor_loads() {
    let mut project = Project::new();
    let root = project.root();
    {
        let layer = project
            .clip_mut(root)
            .unwrap()
            .timeline_mut()
            .layer_mut(0)
            .unwrap();
        layer.add_frame(Frame::spanning(2, 2)).unwrap();
    }
    let first = FrameAddr {
        clip: root,
        layer: 0,
        frame: 0,
    };
    let second = FrameAddr {
        clip: root,
        layer: 0,
        frame: 1,
    };
    project
        .frame_mut(first)
        .unwrap()
        .add_script(ScriptEvent::Unload, "this.firstUnloaded = true;");
    // Frame scripts bind `this` to the owning clip, so the successor can
    // observe the unload's effect.
    project
        .frame_mut(second)
        .unwrap()
        .add_script(ScriptEvent::Load, "this.sawUnload = this.firstUnloaded;");

    project.tick().unwrap(); // frame 1 loads, playhead -> 2
    assert_eq!(prop(&project, root, "firstUnloaded"), None);

    project.tick().unwrap(); // frame 1 unloads, frame 2 loads
    assert_eq!(prop(&project, root, "firstUnloaded"), Some(&Value::Bool(true)));
    assert_eq!(prop(&project, root, "sawUnload"), Some(&Value::Bool(true)));
}

#[test]
fn reentering_a_frame_after_wrap_fires_load_again() {
    let mut project = Project::new();
    let root = project.root();
    {
        let layer = project
            .clip_mut(root)
            .unwrap()
            .timeline_mut()
            .layer_mut(0)
            .unwrap();
        layer.add_frame(Frame::spanning(2, 2)).unwrap();
    }
    project
        .clip_mut(root)
        .unwrap()
        .add_script(ScriptEvent::Load, "this.frameTwoLoads = 0;");
    let second = FrameAddr {
        clip: root,
        layer: 0,
        frame: 1,
    };
    project
        .frame_mut(second)
        .unwrap()
        .add_script(ScriptEvent::Load, "this.frameTwoLoads += 1;");

    // Extent 2: the playhead alternates 1, 2, 1, 2, ...
    for _ in 0..4 {
        project.tick().unwrap();
    }
    assert_eq!(prop(&project, root, "frameTwoLoads"), Some(&Value::Num(2.0)));
}

#[test]
fn sibling_after_error_never_runs_but_earlier_effects_stay() {
    init_tracing();
    let mut project = Project::new();
    let a = clip_on_root(&mut project, None);
    let b = clip_on_root(&mut project, None);
    let c = clip_on_root(&mut project, None);
    project
        .clip_mut(a)
        .unwrap()
        .add_script(ScriptEvent::Load, "this.__scriptDidRun = true;");
    project.clip_mut(b).unwrap().add_script(
        ScriptEvent::Load,
        "this.__scriptDidRun = true; thisCausesAnError();",
    );
    project
        .clip_mut(c)
        .unwrap()
        .add_script(ScriptEvent::Load, "this.__scriptDidRun = true;");

    let err = project.tick().unwrap_err();
    assert_eq!(err.message, "thisCausesAnError is not defined");
    assert_eq!(err.uuid, project.clip(b).unwrap().uuid());

    assert_eq!(prop(&project, a, "__scriptDidRun"), Some(&Value::Bool(true)));
    assert_eq!(prop(&project, b, "__scriptDidRun"), Some(&Value::Bool(true)));
    assert_eq!(prop(&project, c, "__scriptDidRun"), None);
}

#[test]
fn errors_bubble_from_child_frames() {
    let mut project = Project::new();
    let clip = project.create_clip();
    let addr = FrameAddr {
        clip,
        layer: 0,
        frame: 0,
    };
    project
        .frame_mut(addr)
        .unwrap()
        .add_script(ScriptEvent::Load, "thisWillCauseAnError();");

    let err = project.tick_clip(clip).unwrap_err();
    assert_eq!(err.message, "thisWillCauseAnError is not defined");
    assert_eq!(err.line_number, 1);
    assert_eq!(err.uuid, project.frame(addr).unwrap().uuid());
}

#[test]
fn errors_report_the_originating_clip_at_any_depth() {
    for depth in 1..10 {
        let mut project = Project::new();
        let top = project.create_clip();
        let mut cursor = top;
        for _ in 0..depth {
            let child = project.create_clip();
            let addr = project.active_frame(cursor).unwrap();
            project.add_clip(addr, child).unwrap();
            cursor = child;
        }
        project
            .clip_mut(cursor)
            .unwrap()
            .add_script(ScriptEvent::Load, "thisWillCauseAnError();");

        let err = project.tick_clip(top).unwrap_err();
        assert_eq!(err.message, "thisWillCauseAnError is not defined");
        assert_eq!(err.line_number, 1);
        assert_eq!(err.uuid, project.clip(cursor).unwrap().uuid());
    }
}

#[test]
fn error_line_numbers_are_one_based_source_lines() {
    let mut project = Project::new();
    let clip = clip_on_root(&mut project, None);
    project
        .clip_mut(clip)
        .unwrap()
        .add_script(ScriptEvent::Load, "this.x = 1;\nthis.y = 2;\nboom();");

    let err = project.tick().unwrap_err();
    assert_eq!(err.message, "boom is not defined");
    assert_eq!(err.line_number, 3);
    // Statements before the fault kept their effects.
    assert_eq!(project.clip(clip).unwrap().transformation().x, 1.0);
    assert_eq!(project.clip(clip).unwrap().transformation().y, 2.0);
}

#[test]
fn syntax_errors_surface_as_script_errors_until_edited() {
    let mut project = Project::new();
    let clip = clip_on_root(&mut project, None);
    project
        .clip_mut(clip)
        .unwrap()
        .add_script(ScriptEvent::Update, "this.x = ;");

    project.tick().unwrap(); // load tick: no update script runs yet
    let err = project.tick().unwrap_err();
    assert_eq!(err.uuid, project.clip(clip).unwrap().uuid());
    assert_eq!(err.line_number, 1);

    // Still broken next tick; fixed after an edit.
    assert!(project.tick().is_err());
    project
        .clip_mut(clip)
        .unwrap()
        .update_script(ScriptEvent::Update, "this.x = 3;")
        .unwrap();
    project.tick().unwrap();
    assert_eq!(project.clip(clip).unwrap().transformation().x, 3.0);
}

#[test]
fn an_erroring_tick_does_not_advance_the_timeline() {
    let mut project = Project::new();
    let addr = project.active_frame(project.root()).unwrap();
    project
        .frame_mut(addr)
        .unwrap()
        .set_end(FramePos(10))
        .unwrap();
    let clip = clip_on_root(&mut project, None);
    project
        .clip_mut(clip)
        .unwrap()
        .add_script(ScriptEvent::Update, "nope();");

    project.tick().unwrap();
    assert_eq!(
        project.clip(project.root()).unwrap().timeline().playhead(),
        FramePos(2)
    );
    project.tick().unwrap_err();
    assert_eq!(
        project.clip(project.root()).unwrap().timeline().playhead(),
        FramePos(2)
    );
    project.tick().unwrap_err();
    assert_eq!(
        project.clip(project.root()).unwrap().timeline().playhead(),
        FramePos(2)
    );
}

#[test]
fn partial_control_requests_before_a_fault_still_apply() {
    let mut project = Project::new();
    let addr = project.active_frame(project.root()).unwrap();
    project
        .frame_mut(addr)
        .unwrap()
        .set_end(FramePos(10))
        .unwrap();
    let clip = clip_on_root(&mut project, None);
    project
        .clip_mut(clip)
        .unwrap()
        .add_script(ScriptEvent::Load, "stop(); boom();");

    project.tick().unwrap_err();
    assert!(!project.clip(project.root()).unwrap().timeline().is_playing());
}

#[test]
fn script_error_serializes_with_camel_case_line_number() {
    let mut project = Project::new();
    let clip = clip_on_root(&mut project, None);
    project
        .clip_mut(clip)
        .unwrap()
        .add_script(ScriptEvent::Load, "missing();");

    let err = project.tick().unwrap_err();
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["message"], "missing is not defined");
    assert_eq!(json["lineNumber"], 1);
    assert_eq!(
        json["uuid"],
        project.clip(clip).unwrap().uuid().to_string()
    );
}

#[test]
fn reading_properties_of_undefined_is_a_script_error() {
    let mut project = Project::new();
    let root_clip = project.root();
    project
        .clip_mut(root_clip)
        .unwrap()
        .add_script(ScriptEvent::Load, "this.__x = parent.x;");

    let err = project.tick().unwrap_err();
    assert_eq!(err.message, "cannot read property 'x' of undefined");
}

#[test]
fn unload_errors_propagate_like_any_other() {
    let mut project = Project::new();
    let root = project.root();
    project
        .clip_mut(root)
        .unwrap()
        .timeline_mut()
        .layer_mut(0)
        .unwrap()
        .add_frame(Frame::spanning(2, 2))
        .unwrap();
    let first = FrameAddr {
        clip: root,
        layer: 0,
        frame: 0,
    };
    project
        .frame_mut(first)
        .unwrap()
        .add_script(ScriptEvent::Unload, "broken();");

    project.tick().unwrap();
    let err = project.tick().unwrap_err();
    assert_eq!(err.message, "broken is not defined");
    assert_eq!(err.uuid, project.frame(first).unwrap().uuid());
}
