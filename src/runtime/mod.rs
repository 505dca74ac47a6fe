//! Script execution and the recursive tick traversal.
//!
//! The ticker walks the active clip subtree top-down, firing lifecycle
//! events; the runner executes one script body in a constructed scope and
//! reports faults as [`crate::ScriptError`] values; control-API calls are
//! accumulated as typed requests and applied after each script body rather
//! than mutating timelines from inside the evaluator.

pub(crate) mod control;
pub(crate) mod interp;
pub(crate) mod outcome;
pub(crate) mod runner;
pub(crate) mod scope;
pub(crate) mod ticker;
