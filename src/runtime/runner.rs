use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::runtime::control;
use crate::runtime::interp::Interp;
use crate::runtime::outcome::ScriptError;
use crate::runtime::scope::{ScriptOwner, ScriptScope};
use crate::scene::clip::{ScriptEvent, Scripts, Tickable};
use crate::scene::project::Project;
use crate::script::ast::Program;
use crate::script::error::line_of_offset;
use crate::script::parser::parse_script;

/// Execute the script attached to `owner` for `event`, if one exists.
///
/// Compiles (and caches) the source, builds the scope, interprets the body,
/// applies the control requests it issued — also for a body that failed
/// partway — and wraps any fault as a [`ScriptError`] carrying the owner's
/// uuid and the 1-based source line.
pub(crate) fn run_script(
    project: &mut Project,
    owner: ScriptOwner,
    event: ScriptEvent,
) -> Result<(), ScriptError> {
    let Some(uuid) = owner_uuid(project, owner) else {
        return Ok(());
    };
    let Some(program) = compile(project, owner, event, uuid)? else {
        return Ok(());
    };

    let scope = build_scope(project, owner);
    let outcome = Interp::new(project, scope).run(&program);
    for request in outcome.requests {
        control::apply(project, request);
    }

    match outcome.result {
        Ok(()) => Ok(()),
        Err(fault) => {
            let line_number = source_line(project, owner, event, fault.offset);
            let err = ScriptError {
                message: fault.message,
                line_number,
                uuid,
            };
            debug!(uuid = %err.uuid, line = err.line_number, "script fault: {}", err.message);
            Err(err)
        }
    }
}

fn owner_uuid(project: &Project, owner: ScriptOwner) -> Option<Uuid> {
    match owner {
        ScriptOwner::Clip(id) => project.clip(id).map(Tickable::uuid),
        ScriptOwner::Frame(addr) => project.frame(addr).map(|f| f.uuid()),
    }
}

fn scripts_mut(project: &mut Project, owner: ScriptOwner) -> Option<&mut Scripts> {
    match owner {
        ScriptOwner::Clip(id) => project.clip_mut(id).map(|c| &mut c.scripts),
        ScriptOwner::Frame(addr) => project.frame_mut(addr).map(|f| &mut f.scripts),
    }
}

/// Fetch the cached program for `event`, compiling on first use. A syntax
/// error surfaces as a `ScriptError` on every tick until the script is
/// edited (compilation failures are not cached).
fn compile(
    project: &mut Project,
    owner: ScriptOwner,
    event: ScriptEvent,
    uuid: Uuid,
) -> Result<Option<Arc<Program>>, ScriptError> {
    let Some(scripts) = scripts_mut(project, owner) else {
        return Ok(None);
    };
    let Some(entry) = scripts.entry_mut(event) else {
        return Ok(None);
    };

    if entry.compiled.is_none() {
        match parse_script(&entry.source) {
            Ok(program) => entry.compiled = Some(Arc::new(program)),
            Err(fault) => {
                let line_number = line_of_offset(&entry.source, fault.offset);
                return Err(ScriptError {
                    message: fault.message,
                    line_number,
                    uuid,
                });
            }
        }
    }
    Ok(entry.compiled.clone())
}

/// Construct the lexical environment for one execution — built fresh per
/// run, never ambient lookup: `this`, the sibling namespace, `parent`, and
/// the timeline bare control calls target.
fn build_scope(project: &Project, owner: ScriptOwner) -> ScriptScope {
    match owner {
        ScriptOwner::Clip(id) => {
            let parent = project.clip(id).and_then(|c| c.parent());
            ScriptScope {
                this_clip: id,
                sibling_frame: project.placement_of(id),
                parent,
                control_target: parent.unwrap_or(id),
            }
        }
        // A frame script belongs to the clip owning the frame's timeline:
        // `this` and `parent` both bind to that clip, its named children are
        // the frame's own children, and bare control calls steer its
        // timeline.
        ScriptOwner::Frame(addr) => ScriptScope {
            this_clip: addr.clip,
            sibling_frame: Some(addr),
            parent: Some(addr.clip),
            control_target: addr.clip,
        },
    }
}

fn source_line(project: &Project, owner: ScriptOwner, event: ScriptEvent, offset: usize) -> u32 {
    let source = match owner {
        ScriptOwner::Clip(id) => project.clip(id).and_then(|c| c.scripts().source(event)),
        ScriptOwner::Frame(addr) => project.frame(addr).and_then(|f| f.scripts.source(event)),
    };
    source.map_or(1, |src| line_of_offset(src, offset))
}
