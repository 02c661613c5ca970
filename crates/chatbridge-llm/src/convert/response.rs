//! Inbound: complete chat-completions response -> vendor-neutral response

use super::arguments::parse_arguments;
use super::finish::map_finish_reason;
use crate::error::LlmError;
use crate::ids::CallIdGenerator;
use crate::protocol::openai::{OpenAiFunctionCall, OpenAiResponse, OpenAiUsage};
use crate::types::{Candidate, FunctionCall, GenerationResponse, Part, Turn, UsageMetadata};

/// Reconstruct a vendor-neutral response from a complete wire response
///
/// Only the first choice is converted; its index is passed through.
///
/// # Errors
///
/// Returns [`LlmError::Protocol`] when the response has no choices.
pub fn reconstruct(response: OpenAiResponse, ids: &dyn CallIdGenerator) -> Result<GenerationResponse, LlmError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::Protocol("response contained no choices".to_owned()))?;

    let message = choice.message;
    let mut parts = Vec::new();

    if let Some(text) = message.content.filter(|text| !text.is_empty()) {
        parts.push(Part::Text(text));
    }

    match (message.tool_calls, message.function_call) {
        (Some(tool_calls), _) if !tool_calls.is_empty() => {
            parts.extend(
                tool_calls
                    .into_iter()
                    .map(|call| Part::FunctionCall(complete_call(call.id, &call.function, ids))),
            );
        }
        (_, Some(legacy)) => {
            parts.push(Part::FunctionCall(complete_call(None, &legacy, ids)));
        }
        _ => {}
    }

    Ok(assemble(
        vec![Candidate {
            content: Turn::model(parts),
            finish_reason: choice.finish_reason.as_deref().map(map_finish_reason),
            index: choice.index,
        }],
        response.usage.map(Into::into),
        response.id,
        response.model,
    ))
}

/// Build a response, mirroring every function-call part into `function_calls`
pub(crate) fn assemble(
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    response_id: Option<String>,
    model_version: Option<String>,
) -> GenerationResponse {
    let calls: Vec<FunctionCall> = candidates
        .iter()
        .flat_map(|candidate| candidate.content.function_calls().cloned())
        .collect();

    GenerationResponse {
        candidates,
        usage_metadata,
        function_calls: (!calls.is_empty()).then_some(calls),
        response_id,
        model_version,
    }
}

fn complete_call(id: Option<String>, function: &OpenAiFunctionCall, ids: &dyn CallIdGenerator) -> FunctionCall {
    FunctionCall {
        id: Some(id.filter(|id| !id.is_empty()).unwrap_or_else(|| ids.next_id())),
        name: function.name.clone(),
        args: parse_arguments(&function.name, &function.arguments),
    }
}

impl From<OpenAiUsage> for UsageMetadata {
    fn from(usage: OpenAiUsage) -> Self {
        Self {
            prompt_token_count: usage.prompt_tokens,
            candidates_token_count: usage.completion_tokens,
            total_token_count: usage.total_tokens,
        }
    }
}
