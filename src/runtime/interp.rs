use smallvec::SmallVec;

use crate::foundation::core::FramePos;
use crate::foundation::ids::ClipId;
use crate::runtime::control::{ControlRequest, TimelineCommand};
use crate::runtime::outcome::ScriptOutcome;
use crate::runtime::scope::ScriptScope;
use crate::scene::project::Project;
use crate::scene::timeline::FrameRef;
use crate::script::ast::{AssignOp, BinaryOp, Expr, Lit, PathExpr, Program, Stmt, UnaryOp};
use crate::script::error::LangError;
use crate::script::lexer::Span;
use crate::script::value::Value;

/// Names steering the timeline control API.
const CONTROL_FNS: [&str; 6] = [
    "stop",
    "play",
    "gotoAndStop",
    "gotoAndPlay",
    "gotoNextFrame",
    "gotoPrevFrame",
];

/// Clip properties backed by the transformation.
const TRANSFORM_PROPS: [&str; 6] = ["x", "y", "scaleX", "scaleY", "rotation", "opacity"];

/// Read-only metadata exposed on the project root clip.
const PROJECT_PROPS: [&str; 5] = ["width", "height", "framerate", "backgroundColor", "name"];

/// Tree-walking evaluator for one script body.
///
/// Property writes mutate the project directly — a failing script keeps
/// whatever it already applied. Control-API calls are recorded as
/// [`ControlRequest`]s for the runner to apply.
pub(crate) struct Interp<'a> {
    project: &'a mut Project,
    scope: ScriptScope,
    requests: SmallVec<[ControlRequest; 4]>,
    /// Fallback error offset: the statement currently executing.
    stmt_offset: usize,
}

impl<'a> Interp<'a> {
    pub(crate) fn new(project: &'a mut Project, scope: ScriptScope) -> Self {
        Self {
            project,
            scope,
            requests: SmallVec::new(),
            stmt_offset: 0,
        }
    }

    pub(crate) fn run(mut self, program: &Program) -> ScriptOutcome {
        for stmt in &program.body {
            if let Err(e) = self.exec_stmt(stmt) {
                return ScriptOutcome {
                    requests: self.requests,
                    result: Err(e),
                };
            }
        }
        ScriptOutcome {
            requests: self.requests,
            result: Ok(()),
        }
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<(), LangError> {
        self.stmt_offset = stmt.span().start;
        match stmt {
            Stmt::Expr { expr, .. } => {
                self.eval(expr)?;
                Ok(())
            }
            Stmt::Assign {
                target, op, value, ..
            } => self.exec_assign(target, *op, value),
            Stmt::If {
                cond,
                then_body,
                else_body,
                span,
            } => {
                let c = self.eval(cond)?;
                let branch = if self.as_bool(c, span.start)? {
                    then_body
                } else {
                    else_body
                };
                for s in branch {
                    self.exec_stmt(s)?;
                }
                Ok(())
            }
        }
    }

    fn exec_assign(
        &mut self,
        target: &PathExpr,
        op: AssignOp,
        value: &Expr,
    ) -> Result<(), LangError> {
        let rhs = self.eval(value)?;
        let offset = target.span.start;

        let (prefix, prop) = match target.segments.split_last() {
            Some((prop, prefix)) if !prefix.is_empty() => (prefix, prop.as_str()),
            _ => {
                let name = &target.segments[0];
                return Err(match name.as_str() {
                    "this" | "parent" | "project" | "random" => {
                        LangError::new(offset, format!("cannot assign to '{name}'"))
                    }
                    _ => LangError::new(offset, format!("{name} is not defined")),
                });
            }
        };

        let mut base = self.resolve_root(&prefix[0], target.span)?;
        for seg in &prefix[1..] {
            base = self.get_property(&base, seg, target.span)?;
        }
        let Value::Clip(id) = base else {
            return Err(LangError::new(
                offset,
                format!("cannot set property '{prop}' of {}", base.type_name()),
            ));
        };

        let combined = match op {
            AssignOp::Set => rhs,
            compound => {
                let current = self.get_clip_property(id, prop)?;
                self.apply_compound(compound, current, rhs, offset)?
            }
        };
        self.set_clip_property(id, prop, combined, offset)
    }

    fn apply_compound(
        &self,
        op: AssignOp,
        current: Value,
        rhs: Value,
        offset: usize,
    ) -> Result<Value, LangError> {
        let sym = match op {
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Set => unreachable!("Set handled by caller"),
        };
        if op == AssignOp::Add
            && let (Value::Str(a), Value::Str(b)) = (&current, &rhs)
        {
            return Ok(Value::Str(format!("{a}{b}")));
        }
        let (Value::Num(a), Value::Num(b)) = (&current, &rhs) else {
            return Err(LangError::new(
                offset,
                format!(
                    "cannot apply '{sym}' to {} and {}",
                    current.type_name(),
                    rhs.type_name()
                ),
            ));
        };
        Ok(Value::Num(match op {
            AssignOp::Add => a + b,
            AssignOp::Sub => a - b,
            AssignOp::Mul => a * b,
            AssignOp::Div => a / b,
            AssignOp::Set => unreachable!(),
        }))
    }

    // ---- expression evaluation ----

    fn eval(&mut self, expr: &Expr) -> Result<Value, LangError> {
        match expr {
            Expr::Lit(lit) => Ok(match lit {
                Lit::Num(v) => Value::Num(*v),
                Lit::Bool(v) => Value::Bool(*v),
                Lit::Str(s) => Value::Str(s.clone()),
            }),
            Expr::Path(path) => self.eval_path(path),
            Expr::Unary { op, expr } => {
                let v = self.eval(expr)?;
                match op {
                    UnaryOp::Neg => {
                        let n = self.as_num(v, self.stmt_offset)?;
                        Ok(Value::Num(-n))
                    }
                    UnaryOp::Not => {
                        let b = self.as_bool(v, self.stmt_offset)?;
                        Ok(Value::Bool(!b))
                    }
                }
            }
            Expr::Binary { op, left, right } => self.eval_binary(*op, left, right),
            Expr::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                let c = self.eval(cond)?;
                if self.as_bool(c, self.stmt_offset)? {
                    self.eval(then_expr)
                } else {
                    self.eval(else_expr)
                }
            }
            Expr::Call { callee, args, span } => self.eval_call(callee, args, *span),
        }
    }

    fn eval_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> Result<Value, LangError> {
        // && and || short-circuit on boolean operands.
        if matches!(op, BinaryOp::And | BinaryOp::Or) {
            let l = self.eval(left)?;
            let l = self.as_bool(l, self.stmt_offset)?;
            if (op == BinaryOp::And && !l) || (op == BinaryOp::Or && l) {
                return Ok(Value::Bool(l));
            }
            let r = self.eval(right)?;
            let r = self.as_bool(r, self.stmt_offset)?;
            return Ok(Value::Bool(r));
        }

        let l = self.eval(left)?;
        let r = self.eval(right)?;
        match op {
            BinaryOp::Eq => Ok(Value::Bool(l.loosely_equals(&r))),
            BinaryOp::Ne => Ok(Value::Bool(!l.loosely_equals(&r))),
            BinaryOp::Add => {
                if let (Value::Str(a), Value::Str(b)) = (&l, &r) {
                    return Ok(Value::Str(format!("{a}{b}")));
                }
                let a = self.as_num(l, self.stmt_offset)?;
                let b = self.as_num(r, self.stmt_offset)?;
                Ok(Value::Num(a + b))
            }
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                let a = self.as_num(l, self.stmt_offset)?;
                let b = self.as_num(r, self.stmt_offset)?;
                Ok(Value::Num(match op {
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                    BinaryOp::Mod => a % b,
                    _ => unreachable!(),
                }))
            }
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                let a = self.as_num(l, self.stmt_offset)?;
                let b = self.as_num(r, self.stmt_offset)?;
                Ok(Value::Bool(match op {
                    BinaryOp::Lt => a < b,
                    BinaryOp::Le => a <= b,
                    BinaryOp::Gt => a > b,
                    BinaryOp::Ge => a >= b,
                    _ => unreachable!(),
                }))
            }
            BinaryOp::And | BinaryOp::Or => unreachable!("short-circuited above"),
        }
    }

    // ---- name resolution ----

    fn eval_path(&mut self, path: &PathExpr) -> Result<Value, LangError> {
        let mut value = self.resolve_root(&path.segments[0], path.span)?;
        for seg in &path.segments[1..] {
            value = self.get_property(&value, seg, path.span)?;
        }
        Ok(value)
    }

    /// Resolve the first segment of a bare path against the scope.
    fn resolve_root(&self, name: &str, span: Span) -> Result<Value, LangError> {
        match name {
            "this" => Ok(Value::Clip(self.scope.this_clip)),
            "parent" => Ok(self
                .scope
                .parent
                .map(Value::Clip)
                .unwrap_or(Value::Null)),
            "project" => Ok(Value::Clip(self.project.root())),
            "random" => Err(LangError::new(
                span.start,
                "random is only callable as random.integer(lo, hi) or random.float(lo, hi)",
            )),
            _ => match self.lookup_sibling(name) {
                Some(id) => Ok(Value::Clip(id)),
                None => Err(LangError::new(span.start, format!("{name} is not defined"))),
            },
        }
    }

    /// A named child of the sibling frame — the frame the executing clip
    /// sits on. Clips on other frames of the same layer are not in scope.
    fn lookup_sibling(&self, name: &str) -> Option<ClipId> {
        let addr = self.scope.sibling_frame?;
        let frame = self.project.frame(addr)?;
        frame.children().iter().copied().find(|&id| {
            self.project
                .clip(id)
                .is_some_and(|c| c.identifier.as_deref() == Some(name))
        })
    }

    fn get_property(&self, base: &Value, name: &str, span: Span) -> Result<Value, LangError> {
        match base {
            Value::Clip(id) => self.get_clip_property(*id, name),
            other => Err(LangError::new(
                span.start,
                format!("cannot read property '{name}' of {}", other.type_name()),
            )),
        }
    }

    /// Property read on a clip value. Unknown names quietly resolve to
    /// `Null`, matching the original runtime's `undefined`.
    fn get_clip_property(&self, id: ClipId, name: &str) -> Result<Value, LangError> {
        let Some(clip) = self.project.clip(id) else {
            return Ok(Value::Null);
        };

        match name {
            "x" => return Ok(Value::Num(clip.transformation().x)),
            "y" => return Ok(Value::Num(clip.transformation().y)),
            "scaleX" => return Ok(Value::Num(clip.transformation().scale_x)),
            "scaleY" => return Ok(Value::Num(clip.transformation().scale_y)),
            "rotation" => return Ok(Value::Num(clip.transformation().rotation)),
            "opacity" => return Ok(Value::Num(clip.transformation().opacity())),
            "currentFrameNumber" => {
                return Ok(Value::Num(f64::from(clip.timeline().playhead().0)));
            }
            "currentFrameName" => {
                let name = self
                    .active_frame_identifier(id)
                    .unwrap_or_default();
                return Ok(Value::Str(name));
            }
            _ => {}
        }

        if id == self.project.root() {
            match name {
                "width" => return Ok(Value::Num(f64::from(self.project.width()))),
                "height" => return Ok(Value::Num(f64::from(self.project.height()))),
                "framerate" => return Ok(Value::Num(self.project.framerate())),
                "backgroundColor" => {
                    return Ok(Value::Str(self.project.background_color().to_owned()));
                }
                "name" => return Ok(Value::Str(self.project.name().to_owned())),
                _ => {}
            }
        }

        if let Some(child) = self.lookup_active_child(id, name) {
            return Ok(Value::Clip(child));
        }

        Ok(clip.prop(name).cloned().unwrap_or(Value::Null))
    }

    /// Identifier of the first active frame on the clip's own timeline.
    fn active_frame_identifier(&self, id: ClipId) -> Option<String> {
        let clip = self.project.clip(id)?;
        let timeline = clip.timeline();
        (0..timeline.layers().len()).find_map(|li| {
            let fi = timeline.active_frame_of(li)?;
            timeline.layer(li)?.frame(fi)?.identifier.clone()
        })
    }

    /// A named child on the clip's currently *active* frames. Children
    /// placed on inactive frames are invisible.
    fn lookup_active_child(&self, id: ClipId, name: &str) -> Option<ClipId> {
        let clip = self.project.clip(id)?;
        let timeline = clip.timeline();
        for li in 0..timeline.layers().len() {
            let Some(fi) = timeline.active_frame_of(li) else {
                continue;
            };
            let frame = timeline.layer(li)?.frame(fi)?;
            let hit = frame.children().iter().copied().find(|&child| {
                self.project
                    .clip(child)
                    .is_some_and(|c| c.identifier.as_deref() == Some(name))
            });
            if hit.is_some() {
                return hit;
            }
        }
        None
    }

    fn set_clip_property(
        &mut self,
        id: ClipId,
        name: &str,
        value: Value,
        offset: usize,
    ) -> Result<(), LangError> {
        if id == self.project.root() && PROJECT_PROPS.contains(&name) {
            return Err(LangError::new(
                offset,
                format!("cannot assign to read-only property '{name}'"),
            ));
        }
        if matches!(name, "currentFrameName" | "currentFrameNumber") {
            return Err(LangError::new(
                offset,
                format!("cannot assign to read-only property '{name}'"),
            ));
        }

        if TRANSFORM_PROPS.contains(&name) {
            let n = self.as_num(value, offset)?;
            let Some(clip) = self.project.clip_mut(id) else {
                return Ok(());
            };
            let t = clip.transformation_mut();
            match name {
                "x" => t.x = n,
                "y" => t.y = n,
                "scaleX" => t.scale_x = n,
                "scaleY" => t.scale_y = n,
                "rotation" => t.rotation = n,
                "opacity" => t.set_opacity(n),
                _ => unreachable!(),
            }
            return Ok(());
        }

        if let Some(clip) = self.project.clip_mut(id) {
            clip.props.insert(name.to_owned(), value);
        }
        Ok(())
    }

    // ---- calls ----

    fn eval_call(
        &mut self,
        callee: &PathExpr,
        args: &[Expr],
        span: Span,
    ) -> Result<Value, LangError> {
        let mut values = Vec::with_capacity(args.len());
        for a in args {
            values.push(self.eval(a)?);
        }

        if let [name] = callee.segments.as_slice() {
            if CONTROL_FNS.contains(&name.as_str()) {
                self.control(self.scope.control_target, name, &values, span)?;
                return Ok(Value::Null);
            }
            if let Some(v) = self.call_builtin(name, &values, span)? {
                return Ok(v);
            }
            // A resolvable name that is not callable reads as a type error;
            // an unresolvable one as a reference error.
            return match self.resolve_root(name, span) {
                Ok(_) => Err(LangError::new(
                    span.start,
                    format!("{name} is not a function"),
                )),
                Err(e) => Err(e),
            };
        }

        let (method, prefix) = callee
            .segments
            .split_last()
            .expect("multi-segment path has a last segment");

        if prefix == ["random"] {
            return self.call_random(method, &values, span);
        }

        let mut receiver = self.resolve_root(&prefix[0], callee.span)?;
        for seg in &prefix[1..] {
            receiver = self.get_property(&receiver, seg, callee.span)?;
        }
        match receiver {
            Value::Clip(id) if CONTROL_FNS.contains(&method.as_str()) => {
                self.control(id, method, &values, span)?;
                Ok(Value::Null)
            }
            Value::Clip(_) => Err(LangError::new(
                span.start,
                format!("{} is not a function", callee.segments.join(".")),
            )),
            other => Err(LangError::new(
                span.start,
                format!("cannot read property '{method}' of {}", other.type_name()),
            )),
        }
    }

    /// The timeline control API: queue typed requests against `target`.
    fn control(
        &mut self,
        target: ClipId,
        name: &str,
        args: &[Value],
        span: Span,
    ) -> Result<(), LangError> {
        let commands: SmallVec<[TimelineCommand; 2]> = match name {
            "stop" => {
                expect_arity(name, args, 0, span)?;
                smallvec::smallvec![TimelineCommand::Stop]
            }
            "play" => {
                expect_arity(name, args, 0, span)?;
                smallvec::smallvec![TimelineCommand::Play]
            }
            "gotoAndStop" => {
                let frame = self.frame_ref_arg(name, args, span)?;
                smallvec::smallvec![TimelineCommand::Goto(frame), TimelineCommand::Stop]
            }
            "gotoAndPlay" => {
                let frame = self.frame_ref_arg(name, args, span)?;
                smallvec::smallvec![TimelineCommand::Goto(frame), TimelineCommand::Play]
            }
            "gotoNextFrame" => {
                expect_arity(name, args, 0, span)?;
                let pos = self.playhead_of(target).next();
                smallvec::smallvec![TimelineCommand::Goto(FrameRef::Position(pos))]
            }
            "gotoPrevFrame" => {
                expect_arity(name, args, 0, span)?;
                let pos = self.playhead_of(target).prev();
                smallvec::smallvec![TimelineCommand::Goto(FrameRef::Position(pos))]
            }
            _ => unreachable!("checked against CONTROL_FNS"),
        };
        self.requests
            .extend(commands.into_iter().map(|command| ControlRequest { target, command }));
        Ok(())
    }

    fn playhead_of(&self, id: ClipId) -> FramePos {
        self.project
            .clip(id)
            .map(|c| c.timeline().playhead())
            .unwrap_or(FramePos::FIRST)
    }

    fn frame_ref_arg(
        &self,
        name: &str,
        args: &[Value],
        span: Span,
    ) -> Result<FrameRef, LangError> {
        expect_arity(name, args, 1, span)?;
        match &args[0] {
            Value::Num(n) => {
                let pos = if n.is_finite() && *n >= 1.0 {
                    n.round() as u32
                } else {
                    1
                };
                Ok(FrameRef::Position(FramePos(pos.max(1))))
            }
            Value::Str(s) => Ok(FrameRef::Named(s.clone())),
            other => Err(LangError::new(
                span.start,
                format!("{name} expects a frame number or name, got {}", other.type_name()),
            )),
        }
    }

    fn call_random(&mut self, method: &str, args: &[Value], span: Span) -> Result<Value, LangError> {
        match method {
            "integer" => {
                expect_arity("random.integer", args, 2, span)?;
                let lo = self.as_num(args[0].clone(), span.start)?;
                let hi = self.as_num(args[1].clone(), span.start)?;
                let v = self.project.next_random_integer(lo as i64, hi as i64);
                Ok(Value::Num(v as f64))
            }
            "float" => {
                expect_arity("random.float", args, 2, span)?;
                let lo = self.as_num(args[0].clone(), span.start)?;
                let hi = self.as_num(args[1].clone(), span.start)?;
                Ok(Value::Num(self.project.next_random_float(lo, hi)))
            }
            other => Err(LangError::new(
                span.start,
                format!("random.{other} is not a function"),
            )),
        }
    }

    /// Numeric builtins shared with the rest of the engine family.
    fn call_builtin(
        &mut self,
        name: &str,
        args: &[Value],
        span: Span,
    ) -> Result<Option<Value>, LangError> {
        let nums = |interp: &Self, count: usize| -> Result<Vec<f64>, LangError> {
            expect_arity(name, args, count, span)?;
            args.iter()
                .map(|v| interp.as_num(v.clone(), span.start))
                .collect()
        };
        let v = match name {
            "abs" => nums(self, 1)?[0].abs(),
            "sin" => nums(self, 1)?[0].sin(),
            "cos" => nums(self, 1)?[0].cos(),
            "min" => {
                let n = nums(self, 2)?;
                n[0].min(n[1])
            }
            "max" => {
                let n = nums(self, 2)?;
                n[0].max(n[1])
            }
            "clamp" => {
                let n = nums(self, 3)?;
                n[0].clamp(n[1], n[2])
            }
            "lerp" => {
                let n = nums(self, 3)?;
                n[0] + (n[1] - n[0]) * n[2]
            }
            _ => return Ok(None),
        };
        Ok(Some(Value::Num(v)))
    }

    // ---- coercions ----

    fn as_num(&self, v: Value, offset: usize) -> Result<f64, LangError> {
        match v {
            Value::Num(n) => Ok(n),
            other => Err(LangError::new(
                offset,
                format!("expected number, got {}", other.type_name()),
            )),
        }
    }

    fn as_bool(&self, v: Value, offset: usize) -> Result<bool, LangError> {
        match v {
            Value::Bool(b) => Ok(b),
            other => Err(LangError::new(
                offset,
                format!("expected boolean, got {}", other.type_name()),
            )),
        }
    }
}

fn expect_arity(name: &str, args: &[Value], count: usize, span: Span) -> Result<(), LangError> {
    if args.len() != count {
        return Err(LangError::new(
            span.start,
            format!("{name} expects {count} arg{}", if count == 1 { "" } else { "s" }),
        ));
    }
    Ok(())
}
