//! Control flow for the evaluator.

use crate::value::Value;

/// The execution signal threaded through statement evaluation. A `return`
/// switches the signal to `Return`; blocks and loops propagate it unchanged
/// until a call boundary consumes it.
#[derive(Debug)]
pub(crate) enum Flow {
    /// Continue normal execution with the given statement value
    Continue(Value),
    /// Unwind to the nearest call boundary with the given value
    Return(Value),
}
