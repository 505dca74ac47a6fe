use super::*;
use crate::foundation::core::FramePos;

fn place_on_active_frame(project: &mut Project, parent: ClipId) -> ClipId {
    let clip = project.create_clip();
    let addr = project.active_frame(parent).unwrap();
    project.add_clip(addr, clip).unwrap();
    clip
}

#[test]
fn new_project_has_focused_root_with_one_frame() {
    let project = Project::new();
    assert_eq!(project.focus(), project.root());
    let root = project.clip(project.root()).unwrap();
    assert!(root.parent().is_none());
    assert_eq!(root.timeline().extent(), 1);
    assert_eq!(project.width(), 720);
    assert_eq!(project.height(), 480);
    assert_eq!(project.framerate(), 12.0);
    assert_eq!(project.background_color(), "#ffffff");
    assert_eq!(project.name(), "My Project");
    project.validate().unwrap();
}

#[test]
fn lineage_walks_to_the_root() {
    let mut project = Project::new();
    let root = project.root();
    let a = place_on_active_frame(&mut project, root);
    let b = place_on_active_frame(&mut project, a);
    let c = place_on_active_frame(&mut project, b);

    assert_eq!(project.lineage(c), vec![c, b, a, project.root()]);
    assert_eq!(project.lineage(project.root()), vec![project.root()]);
    project.validate().unwrap();
}

#[test]
fn add_clip_moves_rather_than_duplicates() {
    let mut project = Project::new();
    let root = project.root();
    let a = place_on_active_frame(&mut project, root);
    let b = place_on_active_frame(&mut project, root);
    let child = place_on_active_frame(&mut project, a);

    let b_frame = project.active_frame(b).unwrap();
    project.add_clip(b_frame, child).unwrap();

    assert_eq!(project.clip(child).unwrap().parent(), Some(b));
    let a_frame = project.active_frame(a).unwrap();
    assert!(!project.frame(a_frame).unwrap().children().contains(&child));
    project.validate().unwrap();
}

#[test]
fn add_clip_rejects_placement_under_own_subtree() {
    let mut project = Project::new();
    let root = project.root();
    let a = place_on_active_frame(&mut project, root);
    let child = place_on_active_frame(&mut project, a);

    let child_frame = project.active_frame(child).unwrap();
    assert!(project.add_clip(child_frame, a).is_err());
    let a_frame = project.active_frame(a).unwrap();
    assert!(project.add_clip(a_frame, a).is_err());
    project.validate().unwrap();
}

#[test]
fn add_clip_rejects_duplicate_sibling_identifier() {
    let mut project = Project::new();
    let a = project.create_clip();
    project.clip_mut(a).unwrap().identifier = Some("foo".to_owned());
    let b = project.create_clip();
    project.clip_mut(b).unwrap().identifier = Some("foo".to_owned());

    let root_frame = project.active_frame(project.root()).unwrap();
    project.add_clip(root_frame, a).unwrap();
    assert!(project.add_clip(root_frame, b).is_err());
}

#[test]
fn remove_clip_destroys_the_subtree() {
    let mut project = Project::new();
    let root = project.root();
    let a = place_on_active_frame(&mut project, root);
    let child = place_on_active_frame(&mut project, a);

    project.remove_clip(a).unwrap();
    assert!(project.clip(a).is_none());
    assert!(project.clip(child).is_none());
    assert!(project.remove_clip(project.root()).is_err());
    project.validate().unwrap();
}

#[test]
fn removing_the_focused_clip_refocuses_the_root() {
    let mut project = Project::new();
    let root = project.root();
    let a = place_on_active_frame(&mut project, root);
    project.set_focus(a).unwrap();
    project.remove_clip(a).unwrap();
    assert_eq!(project.focus(), project.root());
}

#[test]
fn active_frame_follows_the_playhead() {
    let mut project = Project::new();
    let root = project.root();
    project
        .clip_mut(root)
        .unwrap()
        .timeline_mut()
        .layer_mut(0)
        .unwrap()
        .add_frame(Frame::spanning(2, 4))
        .unwrap();

    assert_eq!(project.active_frame(root).unwrap().frame, 0);
    project
        .clip_mut(root)
        .unwrap()
        .timeline_mut()
        .set_playhead(FramePos(3));
    assert_eq!(project.active_frame(root).unwrap().frame, 1);
}

#[test]
fn reseeding_rewinds_the_random_stream() {
    let mut project = Project::new();
    project.set_seed(1234);
    let first: Vec<i64> = (0..8).map(|_| project.next_random_integer(0, 100)).collect();
    project.set_seed(1234);
    let second: Vec<i64> = (0..8).map(|_| project.next_random_integer(0, 100)).collect();
    assert_eq!(first, second);
}

#[test]
fn metadata_setters_validate() {
    let mut project = Project::new();
    assert!(project.set_width(0).is_err());
    assert!(project.set_framerate(0.0).is_err());
    assert!(project.set_framerate(f64::NAN).is_err());
    project.set_width(1920).unwrap();
    project.set_height(1080).unwrap();
    project.set_framerate(24.0).unwrap();
    project.validate().unwrap();
}
