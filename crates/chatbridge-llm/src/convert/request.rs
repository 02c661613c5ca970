//! Outbound: vendor-neutral request -> chat-completions wire request

use std::sync::Arc;

use crate::ids::{CallIdGenerator, RandomCallIds};
use crate::protocol::openai::{
    OpenAiFunction, OpenAiFunctionCall, OpenAiMessage, OpenAiRequest, OpenAiRole, OpenAiStreamOptions, OpenAiTool,
    OpenAiToolCall,
};
use crate::types::content::empty_object;
use crate::types::{
    FunctionCall, FunctionResponse, GenerationRequest, Part, ResponseFormat, Role, SystemInstruction, Tool, Turn,
};

/// Tool-call id sent when a function response does not name its call
pub const MISSING_CALL_ID: &str = "call_unknown";

/// Name sent for a declared function that has none
pub const UNNAMED_FUNCTION: &str = "unnamed_function";

/// Translates vendor-neutral requests into wire requests for one target model
#[derive(Clone)]
pub struct RequestTranslator {
    model: String,
    include_stream_usage: bool,
    ids: Arc<dyn CallIdGenerator>,
}

impl std::fmt::Debug for RequestTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestTranslator")
            .field("model", &self.model)
            .field("include_stream_usage", &self.include_stream_usage)
            .finish_non_exhaustive()
    }
}

impl RequestTranslator {
    /// Translator targeting `model`, minting random call ids
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            include_stream_usage: false,
            ids: Arc::new(RandomCallIds),
        }
    }

    /// Replace the call-id source
    #[must_use]
    pub fn with_call_ids(mut self, ids: Arc<dyn CallIdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Ask the remote to report usage at the end of a stream
    #[must_use]
    pub const fn with_stream_usage(mut self, include: bool) -> Self {
        self.include_stream_usage = include;
        self
    }

    /// Target model identifier
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Translate a request
    ///
    /// Never fails; parts the wire cannot carry are rendered as placeholders.
    pub fn translate(&self, request: &GenerationRequest, streaming: bool) -> OpenAiRequest {
        let mut messages = Vec::with_capacity(request.contents.len() + 1);

        let system = system_text(
            request.system_instruction.as_ref(),
            request.response_format.as_ref(),
        );
        if !system.is_empty() {
            messages.push(OpenAiMessage::text(OpenAiRole::System, system));
        }

        messages.extend(request.contents.iter().filter_map(|turn| self.translate_turn(turn)));

        let tools = translate_tools(&request.tools);
        let tool_choice = tools.as_ref().map(|_| "auto".to_owned());

        OpenAiRequest {
            model: self.model.clone(),
            messages,
            temperature: request.generation_config.temperature,
            top_p: request.generation_config.top_p,
            stream: streaming,
            stream_options: (streaming && self.include_stream_usage)
                .then_some(OpenAiStreamOptions { include_usage: true }),
            tools,
            tool_choice,
        }
    }

    /// Map one turn to at most one wire message
    ///
    /// Function responses win over function calls, which win over text. Only
    /// the winning kind is forwarded.
    fn translate_turn(&self, turn: &Turn) -> Option<OpenAiMessage> {
        if turn.parts.is_empty() {
            return None;
        }

        if let Some(response) = turn.parts.iter().find_map(|part| match part {
            Part::FunctionResponse(response) => Some(response),
            _ => None,
        }) {
            return Some(tool_result_message(response));
        }

        if let Some(call) = turn.parts.iter().find_map(|part| match part {
            Part::FunctionCall(call) => Some(call),
            _ => None,
        }) {
            return Some(self.tool_call_message(call));
        }

        let role = wire_role(turn.role);
        let texts: Vec<&str> = turn.parts.iter().filter_map(Part::as_text).collect();
        if !texts.is_empty() {
            return Some(OpenAiMessage::text(role, texts.concat()));
        }

        let placeholders: Vec<String> = turn.parts.iter().filter_map(placeholder).collect();
        Some(OpenAiMessage::text(role, placeholders.join("\n")))
    }

    fn tool_call_message(&self, call: &FunctionCall) -> OpenAiMessage {
        let id = call
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| self.ids.next_id());

        OpenAiMessage {
            role: OpenAiRole::Assistant,
            content: None,
            tool_calls: Some(vec![OpenAiToolCall {
                id: Some(id),
                tool_type: "function".to_owned(),
                function: OpenAiFunctionCall {
                    name: call.name.clone(),
                    arguments: call.args.to_string(),
                },
            }]),
            tool_call_id: None,
        }
    }
}

fn tool_result_message(response: &FunctionResponse) -> OpenAiMessage {
    OpenAiMessage {
        role: OpenAiRole::Tool,
        content: Some(response.response.to_string()),
        tool_calls: None,
        tool_call_id: Some(
            response
                .id
                .clone()
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| MISSING_CALL_ID.to_owned()),
        ),
    }
}

const fn wire_role(role: Role) -> OpenAiRole {
    match role {
        Role::User => OpenAiRole::User,
        Role::Model => OpenAiRole::Assistant,
        Role::System => OpenAiRole::System,
    }
}

/// Human-readable stand-in for a part the wire cannot carry
fn placeholder(part: &Part) -> Option<String> {
    match part {
        Part::FileData(file) => Some(format!("[File: {}]", file.file_name())),
        Part::InlineData(data) => Some(format!("[Inline data: {}]", data.mime_type)),
        Part::Text(_) | Part::FunctionCall(_) | Part::FunctionResponse(_) => None,
    }
}

/// System prompt text, with the JSON-output instruction appended when a
/// response schema is requested
fn system_text(instruction: Option<&SystemInstruction>, format: Option<&ResponseFormat>) -> String {
    let base = instruction.map(SystemInstruction::text).unwrap_or_default();

    match format.and_then(ResponseFormat::json_schema) {
        Some(schema) => {
            let directive = format!(
                "Respond only with valid JSON that matches this JSON schema:\n{schema}\n\
                 Do not wrap the JSON in markdown code fences and do not add any other text."
            );
            if base.trim().is_empty() {
                directive
            } else {
                format!("{base}\n\n{directive}")
            }
        }
        None => base.to_owned(),
    }
}

/// Flatten every tool's declarations into one wire tool list
fn translate_tools(tools: &[Tool]) -> Option<Vec<OpenAiTool>> {
    let flattened: Vec<OpenAiTool> = tools
        .iter()
        .flat_map(|tool| &tool.function_declarations)
        .map(|declaration| OpenAiTool {
            tool_type: "function".to_owned(),
            function: OpenAiFunction {
                name: declaration
                    .name
                    .clone()
                    .unwrap_or_else(|| UNNAMED_FUNCTION.to_owned()),
                description: declaration.description.clone(),
                parameters: declaration.parameters.clone().unwrap_or_else(empty_object),
            },
        })
        .collect();

    (!flattened.is_empty()).then_some(flattened)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ids::SequentialCallIds;
    use crate::types::{FileData, FunctionDeclaration, GenerationConfig, InlineData, StructuredInstruction};

    fn translator() -> RequestTranslator {
        RequestTranslator::new("gpt-test").with_call_ids(Arc::new(SequentialCallIds::new("t")))
    }

    fn request(contents: Vec<Turn>) -> GenerationRequest {
        GenerationRequest {
            contents,
            ..GenerationRequest::default()
        }
    }

    #[test]
    fn model_role_becomes_assistant() {
        let req = request(vec![
            Turn::user_text("hi"),
            Turn::model(vec![Part::Text("hello".to_owned())]),
            Turn {
                role: Role::System,
                parts: vec![Part::Text("be brief".to_owned())],
            },
        ]);

        let wire = translator().translate(&req, false);
        let roles: Vec<_> = wire.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![OpenAiRole::User, OpenAiRole::Assistant, OpenAiRole::System]);
        assert_eq!(wire.model, "gpt-test");
        assert!(!wire.stream);
    }

    #[test]
    fn empty_turns_are_dropped() {
        let req = request(vec![
            Turn {
                role: Role::User,
                parts: vec![],
            },
            Turn::user_text("ping"),
        ]);

        let wire = translator().translate(&req, false);
        assert_eq!(wire.messages.len(), 1);
        assert_eq!(wire.messages[0].content.as_deref(), Some("ping"));
    }

    #[test]
    fn text_parts_are_concatenated() {
        let req = request(vec![Turn {
            role: Role::User,
            parts: vec![Part::Text("foo ".to_owned()), Part::Text("bar".to_owned())],
        }]);

        let wire = translator().translate(&req, false);
        assert_eq!(wire.messages[0].content.as_deref(), Some("foo bar"));
    }

    #[test]
    fn function_response_wins_over_text() {
        let req = request(vec![Turn {
            role: Role::User,
            parts: vec![
                Part::Text("ignored".to_owned()),
                Part::FunctionResponse(FunctionResponse {
                    id: Some("call_1".to_owned()),
                    name: "get_weather".to_owned(),
                    response: json!({"temp": 18}),
                }),
            ],
        }]);

        let wire = translator().translate(&req, false);
        assert_eq!(wire.messages.len(), 1);
        let message = &wire.messages[0];
        assert_eq!(message.role, OpenAiRole::Tool);
        assert_eq!(message.content.as_deref(), Some(r#"{"temp":18}"#));
        assert_eq!(message.tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn function_response_without_id_uses_sentinel() {
        let req = request(vec![Turn {
            role: Role::User,
            parts: vec![Part::FunctionResponse(FunctionResponse {
                id: None,
                name: "f".to_owned(),
                response: json!({}),
            })],
        }]);

        let wire = translator().translate(&req, false);
        assert_eq!(wire.messages[0].tool_call_id.as_deref(), Some(MISSING_CALL_ID));
    }

    #[test]
    fn function_call_becomes_assistant_tool_call_with_null_content() {
        let req = request(vec![Turn::model(vec![
            Part::Text("let me check".to_owned()),
            Part::FunctionCall(FunctionCall {
                id: None,
                name: "get_weather".to_owned(),
                args: json!({"city": "SF"}),
            }),
        ])]);

        let wire = translator().translate(&req, false);
        let message = &wire.messages[0];
        assert_eq!(message.role, OpenAiRole::Assistant);
        assert_eq!(message.content, None);

        let calls = message.tool_calls.as_ref().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id.as_deref(), Some("call_t_1"));
        assert_eq!(calls[0].function.name, "get_weather");
        assert_eq!(calls[0].function.arguments, r#"{"city":"SF"}"#);

        let encoded = serde_json::to_value(message).unwrap();
        assert!(encoded["content"].is_null());
    }

    #[test]
    fn unsupported_parts_render_placeholders() {
        let req = request(vec![Turn {
            role: Role::User,
            parts: vec![
                Part::FileData(FileData {
                    mime_type: Some("application/pdf".to_owned()),
                    file_uri: "gs://bucket/reports/q3.pdf".to_owned(),
                    display_name: None,
                }),
                Part::InlineData(InlineData {
                    mime_type: "image/png".to_owned(),
                    data: "aGk=".to_owned(),
                }),
            ],
        }]);

        let wire = translator().translate(&req, false);
        assert_eq!(
            wire.messages[0].content.as_deref(),
            Some("[File: q3.pdf]\n[Inline data: image/png]")
        );
        assert_eq!(wire.messages[0].role, OpenAiRole::User);
    }

    #[test]
    fn system_instruction_shapes_resolve_to_text() {
        let plain = SystemInstruction::from("plain");
        assert_eq!(plain.text(), "plain");

        let with_text = SystemInstruction::Structured(StructuredInstruction {
            text: Some("direct".to_owned()),
            parts: vec![Part::Text("ignored".to_owned())],
        });
        assert_eq!(with_text.text(), "direct");

        let with_parts = SystemInstruction::from(Turn::user_text("from parts"));
        assert_eq!(with_parts.text(), "from parts");

        let empty = SystemInstruction::Structured(StructuredInstruction::default());
        assert_eq!(empty.text(), "");
    }

    #[test]
    fn system_instruction_deserializes_from_string_or_object() {
        let plain: SystemInstruction = serde_json::from_value(json!("be nice")).unwrap();
        assert_eq!(plain.text(), "be nice");

        let turn: SystemInstruction =
            serde_json::from_value(json!({"role": "user", "parts": [{"text": "be terse"}]})).unwrap();
        assert_eq!(turn.text(), "be terse");
    }

    #[test]
    fn system_message_is_prepended() {
        let mut req = request(vec![Turn::user_text("hi")]);
        req.system_instruction = Some(SystemInstruction::from("you are helpful"));

        let wire = translator().translate(&req, false);
        assert_eq!(wire.messages[0].role, OpenAiRole::System);
        assert_eq!(wire.messages[0].content.as_deref(), Some("you are helpful"));
        assert_eq!(wire.messages.len(), 2);
    }

    #[test]
    fn empty_system_instruction_emits_no_message() {
        let mut req = request(vec![Turn::user_text("hi")]);
        req.system_instruction = Some(SystemInstruction::from(""));

        let wire = translator().translate(&req, false);
        assert_eq!(wire.messages.len(), 1);
    }

    #[test]
    fn json_schema_is_injected_into_system_prompt() {
        let schema = json!({"type": "object", "properties": {"answer": {"type": "string"}}});
        let mut req = request(vec![Turn::user_text("hi")]);
        req.response_format = Some(ResponseFormat::json(schema.clone()));

        let wire = translator().translate(&req, false);
        let system: Vec<_> = wire
            .messages
            .iter()
            .filter(|m| m.role == OpenAiRole::System)
            .collect();
        assert_eq!(system.len(), 1);

        let text = system[0].content.as_deref().unwrap();
        assert!(text.starts_with("Respond only with valid JSON"));
        assert!(text.contains(&schema.to_string()));
        assert!(text.contains("markdown code fences"));
    }

    #[test]
    fn json_schema_is_appended_after_existing_system_text() {
        let mut req = request(vec![Turn::user_text("hi")]);
        req.system_instruction = Some(SystemInstruction::from("you are a parser"));
        req.response_format = Some(ResponseFormat::json(json!({"type": "object"})));

        let wire = translator().translate(&req, false);
        let text = wire.messages[0].content.as_deref().unwrap();
        assert!(text.starts_with("you are a parser\n\nRespond only with valid JSON"));
    }

    #[test]
    fn non_json_response_format_is_ignored() {
        let mut req = request(vec![Turn::user_text("hi")]);
        req.response_format = Some(ResponseFormat {
            mime_type: "text/plain".to_owned(),
            schema: Some(json!({"type": "string"})),
        });

        let wire = translator().translate(&req, false);
        assert_eq!(wire.messages.len(), 1);
    }

    #[test]
    fn generation_params_are_forwarded_only_when_set() {
        let mut req = request(vec![Turn::user_text("hi")]);
        let wire = translator().translate(&req, false);
        assert_eq!(wire.temperature, None);
        assert_eq!(wire.top_p, None);

        req.generation_config = GenerationConfig {
            temperature: Some(0.2),
            top_p: Some(0.9),
        };
        let wire = translator().translate(&req, true);
        assert_eq!(wire.temperature, Some(0.2));
        assert_eq!(wire.top_p, Some(0.9));
        assert!(wire.stream);

        let encoded = serde_json::to_value(&translator().translate(&request(vec![]), false)).unwrap();
        assert!(encoded.get("temperature").is_none());
        assert!(encoded.get("top_p").is_none());
    }

    #[test]
    fn tools_are_flattened_with_defaults_and_auto_choice() {
        let mut req = request(vec![Turn::user_text("hi")]);
        req.tools = vec![
            Tool {
                function_declarations: vec![FunctionDeclaration {
                    name: Some("get_weather".to_owned()),
                    description: Some("Weather lookup".to_owned()),
                    parameters: Some(json!({"type": "object"})),
                }],
            },
            Tool {
                function_declarations: vec![FunctionDeclaration::default()],
            },
        ];

        let wire = translator().translate(&req, false);
        let tools = wire.tools.unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].function.name, "get_weather");
        assert_eq!(tools[1].function.name, UNNAMED_FUNCTION);
        assert_eq!(tools[1].function.parameters, json!({}));
        assert_eq!(wire.tool_choice.as_deref(), Some("auto"));
    }

    #[test]
    fn tools_without_declarations_are_omitted() {
        let mut req = request(vec![Turn::user_text("hi")]);
        req.tools = vec![Tool::default()];

        let wire = translator().translate(&req, false);
        assert!(wire.tools.is_none());
        assert!(wire.tool_choice.is_none());
    }

    #[test]
    fn stream_usage_is_requested_only_when_streaming() {
        let translator = translator().with_stream_usage(true);
        let req = request(vec![Turn::user_text("hi")]);

        assert!(translator.translate(&req, false).stream_options.is_none());
        assert_eq!(
            translator.translate(&req, true).stream_options,
            Some(OpenAiStreamOptions { include_usage: true })
        );
    }

    #[test]
    fn translation_is_idempotent() {
        let mut req = request(vec![
            Turn::user_text("what's the weather?"),
            Turn::model(vec![Part::FunctionCall(FunctionCall {
                id: Some("call_9".to_owned()),
                name: "get_weather".to_owned(),
                args: json!({"city": "SF", "unit": "c"}),
            })]),
        ]);
        req.system_instruction = Some(SystemInstruction::from("be brief"));
        req.response_format = Some(ResponseFormat::json(json!({"type": "object"})));

        let translator = translator();
        let first = serde_json::to_vec(&translator.translate(&req, true)).unwrap();
        let second = serde_json::to_vec(&translator.translate(&req, true)).unwrap();
        assert_eq!(first, second);
    }
}
