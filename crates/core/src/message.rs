//! Request and response value types for the Messages API.
//!
//! These mirror the wire shape of an Anthropic-style Messages API so that a
//! completion service can serialize a [`MessageRequest`] as-is and deserialize
//! the body straight into a [`Message`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The role of a message sender in a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
}

/// A single content block. Only text is inspected by the guard.
///
/// Fields a known block carries beyond the modeled ones (`cache_control`,
/// `citations`, ...) are kept in `extra`. Block kinds without a variant here
/// are kept whole in [`ContentBlock::Other`]. Either way a block serializes
/// back to what was received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    Image {
        source: Value,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    ToolResult {
        tool_use_id: String,
        /// A string or a list of blocks
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<Value>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    Thinking {
        thinking: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        signature: Option<String>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    /// Any other block kind (`redacted_thinking`, `document`, ...), verbatim.
    #[serde(untagged)]
    Other(Value),
}

impl ContentBlock {
    /// Create a text block.
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text {
            text: text.into(),
            extra: Map::new(),
        }
    }

    /// Create a tool use block.
    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        ContentBlock::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
            extra: Map::new(),
        }
    }

    /// Create a tool result block with string content.
    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        ContentBlock::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: Some(Value::String(content.into())),
            extra: Map::new(),
        }
    }

    /// The text payload, if this is a text block.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    fn as_text_mut(&mut self) -> Option<&mut String> {
        match self {
            ContentBlock::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    /// The text a tool result hands back to the model: its string content,
    /// or the first text item of its block list.
    pub fn tool_result_text(&self) -> Option<&str> {
        match self {
            ContentBlock::ToolResult { content: Some(Value::String(text)), .. } => Some(text),
            ContentBlock::ToolResult { content: Some(Value::Array(items)), .. } => items
                .iter()
                .filter(|item| item.get("type").and_then(Value::as_str) == Some("text"))
                .find_map(|item| item.get("text").and_then(Value::as_str)),
            _ => None,
        }
    }

    fn tool_result_text_mut(&mut self) -> Option<&mut String> {
        match self {
            ContentBlock::ToolResult { content: Some(Value::String(text)), .. } => Some(text),
            ContentBlock::ToolResult { content: Some(Value::Array(items)), .. } => {
                items.iter_mut().find_map(|item| {
                    if item.get("type").and_then(Value::as_str) != Some("text") {
                        return None;
                    }
                    match item.get_mut("text") {
                        Some(Value::String(text)) => Some(text),
                        _ => None,
                    }
                })
            }
            _ => None,
        }
    }
}

/// Message content: a plain string or a list of blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl InputContent {
    /// The plain string, or the first text block of a block list.
    pub fn first_text(&self) -> Option<&str> {
        match self {
            InputContent::Text(text) => Some(text),
            InputContent::Blocks(blocks) => blocks.iter().find_map(ContentBlock::as_text),
        }
    }

    pub fn first_text_mut(&mut self) -> Option<&mut String> {
        match self {
            InputContent::Text(text) => Some(text),
            InputContent::Blocks(blocks) => blocks.iter_mut().find_map(ContentBlock::as_text_mut),
        }
    }

    /// The text a user turn puts in front of the model: [`first_text`],
    /// or for a turn made only of tool results, the first tool result's text.
    ///
    /// [`first_text`]: Self::first_text
    pub fn prompt_text(&self) -> Option<&str> {
        match self {
            InputContent::Text(text) => Some(text),
            InputContent::Blocks(blocks) => blocks
                .iter()
                .find_map(ContentBlock::as_text)
                .or_else(|| blocks.iter().find_map(ContentBlock::tool_result_text)),
        }
    }

    pub fn prompt_text_mut(&mut self) -> Option<&mut String> {
        match self {
            InputContent::Text(text) => Some(text),
            InputContent::Blocks(blocks) => {
                if blocks.iter().any(|b| b.as_text().is_some()) {
                    blocks.iter_mut().find_map(ContentBlock::as_text_mut)
                } else {
                    blocks.iter_mut().find_map(ContentBlock::tool_result_text_mut)
                }
            }
        }
    }
}

impl From<String> for InputContent {
    fn from(text: String) -> Self {
        InputContent::Text(text)
    }
}

impl From<&str> for InputContent {
    fn from(text: &str) -> Self {
        InputContent::Text(text.to_string())
    }
}

impl From<Vec<ContentBlock>> for InputContent {
    fn from(blocks: Vec<ContentBlock>) -> Self {
        InputContent::Blocks(blocks)
    }
}

/// One turn of the request's message list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMessage {
    pub role: Role,
    pub content: InputContent,
}

impl InputMessage {
    /// Create a user message.
    pub fn user(content: impl Into<InputContent>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message (prefill or prior turn).
    pub fn assistant(content: impl Into<InputContent>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A "create message" request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRequest {
    /// The model to use (e.g., "claude-sonnet-4-20250514")
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// The conversation messages, oldest first
    pub messages: Vec<InputMessage>,

    /// System prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,

    /// Any other provider parameters, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MessageRequest {
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            messages: Vec::new(),
            system: None,
            temperature: None,
            stop_sequences: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Append a message.
    pub fn message(mut self, message: InputMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set an extra provider parameter.
    pub fn param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Prompt text of the latest user message (see [`InputContent::prompt_text`]).
    pub fn latest_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .and_then(|m| m.content.prompt_text())
    }

    pub fn latest_user_text_mut(&mut self) -> Option<&mut String> {
        self.messages
            .iter_mut()
            .rev()
            .find(|m| m.role == Role::User)
            .and_then(|m| m.content.prompt_text_mut())
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    StopSequence,
    ToolUse,
    PauseTurn,
    Refusal,
    #[serde(other)]
    Other,
}

/// Token usage counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,

    /// Cache and server-tool counters, kept as sent
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Usage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            extra: Map::new(),
        }
    }

    pub fn total(&self) -> u64 {
        u64::from(self.input_tokens) + u64::from(self.output_tokens)
    }
}

/// A completion result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,

    /// Which model actually responded
    pub model: String,

    pub role: Role,

    /// Ordered content blocks
    pub content: Vec<ContentBlock>,

    #[serde(default)]
    pub stop_reason: Option<StopReason>,

    #[serde(default)]
    pub stop_sequence: Option<String>,

    #[serde(default)]
    pub usage: Usage,

    /// Remaining response fields (`type`, `container`, ...), kept as sent
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    /// Text of the first text block.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(ContentBlock::as_text)
    }

    pub fn first_text_mut(&mut self) -> Option<&mut String> {
        self.content.iter_mut().find_map(ContentBlock::as_text_mut)
    }
}
