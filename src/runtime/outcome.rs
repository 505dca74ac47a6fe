use std::fmt;

use smallvec::SmallVec;
use uuid::Uuid;

use crate::runtime::control::ControlRequest;
use crate::script::error::LangError;

/// A captured user-script fault.
///
/// Script errors never escape a tick as panics or API errors: they are
/// reduced to this shape at the single-script granularity and returned up
/// the traversal as a value. `uuid` names the *originating* clip or frame,
/// however deep in the tree it sits. Serializes for the editor as
/// `{ "message": ..., "lineNumber": ..., "uuid": ... }`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptError {
    /// Human-readable description of the fault.
    pub message: String,
    /// 1-based line in the script source where the fault originated.
    pub line_number: u32,
    /// Identity of the clip or frame whose script faulted.
    pub uuid: Uuid,
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {}, {})", self.message, self.line_number, self.uuid)
    }
}

impl std::error::Error for ScriptError {}

/// Result of interpreting one script body: the control requests it issued
/// (kept even when the body failed partway) plus the evaluation result.
#[derive(Debug)]
pub(crate) struct ScriptOutcome {
    pub(crate) requests: SmallVec<[ControlRequest; 4]>,
    pub(crate) result: Result<(), LangError>,
}
