use crate::types::FinishReason;

/// Wire token for a legacy function call stop
pub const FUNCTION_CALL: &str = "function_call";
/// Wire token for an indexed tool call stop
pub const TOOL_CALLS: &str = "tool_calls";

/// Map a wire finish reason to the vendor-neutral one
///
/// Both call tokens collapse to `Stop`: callers tell a tool request apart by
/// the function-call parts, not by the finish reason.
pub fn map_finish_reason(token: &str) -> FinishReason {
    match token {
        "stop" | FUNCTION_CALL | TOOL_CALLS => FinishReason::Stop,
        "length" => FinishReason::MaxTokens,
        "content_filter" => FinishReason::Safety,
        _ => FinishReason::Other,
    }
}

/// Whether the token closes a call window
pub fn is_call_finish(token: &str) -> bool {
    matches!(token, FUNCTION_CALL | TOOL_CALLS)
}
