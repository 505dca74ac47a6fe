use crate::foundation::ids::ClipId;
use crate::scene::project::Project;
use crate::scene::timeline::FrameRef;

/// One timeline-control operation issued by a script.
///
/// Stop/play/goto are non-local jumps within the tick; modelling them as
/// data lets the runner apply them at a single point instead of mutating
/// timelines from arbitrary evaluation depth. `Goto` is queued on the target
/// timeline and consumed by its next `advance()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ControlRequest {
    /// Clip whose timeline the command targets.
    pub(crate) target: ClipId,
    pub(crate) command: TimelineCommand,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum TimelineCommand {
    Play,
    Stop,
    Goto(FrameRef),
}

/// Apply one request. A request against a removed clip is a no-op.
pub(crate) fn apply(project: &mut Project, request: ControlRequest) {
    let Some(clip) = project.clip_mut(request.target) else {
        return;
    };
    let timeline = clip.timeline_mut();
    match request.command {
        TimelineCommand::Play => timeline.play(),
        TimelineCommand::Stop => timeline.stop(),
        TimelineCommand::Goto(frame) => timeline.goto_frame(frame),
    }
}
