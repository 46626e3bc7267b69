//! Scripted guard and completion doubles for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use shieldline_core::error::{GuardServiceError, ProviderError};
use shieldline_core::guard::{GuardContext, GuardResult, GuardService};
use shieldline_core::message::{ContentBlock, Message, MessageRequest, Role, StopReason, Usage};
use shieldline_core::CompletionService;

/// A guard that answers from a script, recording every call.
///
/// With `passing()`, an empty script passes every text through unchanged.
/// Otherwise panics if more calls are made than verdicts provided.
pub struct ScriptedGuard {
    verdicts: Mutex<VecDeque<Result<GuardResult, GuardServiceError>>>,
    pass_when_empty: bool,
    seen: Mutex<Vec<(String, GuardContext)>>,
}

impl ScriptedGuard {
    pub fn new(verdicts: Vec<Result<GuardResult, GuardServiceError>>) -> Self {
        Self {
            verdicts: Mutex::new(verdicts.into()),
            pass_when_empty: false,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn passing() -> Self {
        Self {
            pass_when_empty: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn seen(&self) -> Vec<(String, GuardContext)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl GuardService for ScriptedGuard {
    fn name(&self) -> &str {
        "scripted_guard"
    }

    async fn guard_text(
        &self,
        text: &str,
        context: &GuardContext,
    ) -> Result<GuardResult, GuardServiceError> {
        self.seen.lock().unwrap().push((text.to_string(), context.clone()));
        match self.verdicts.lock().unwrap().pop_front() {
            Some(verdict) => verdict,
            None if self.pass_when_empty => Ok(GuardResult::pass(text)),
            None => panic!("ScriptedGuard: no more verdicts (call #{})", self.calls()),
        }
    }
}

/// A completion service that returns scripted responses in sequence.
pub struct ScriptedCompletion {
    responses: Mutex<VecDeque<Result<Message, ProviderError>>>,
    requests: Mutex<Vec<MessageRequest>>,
}

impl ScriptedCompletion {
    pub fn new(responses: Vec<Result<Message, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A single text reply.
    pub fn text(text: &str) -> Self {
        Self::new(vec![Ok(text_message(text))])
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl CompletionService for ScriptedCompletion {
    fn name(&self) -> &str {
        "scripted_completion"
    }

    async fn create_message(&self, request: MessageRequest) -> Result<Message, ProviderError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("ScriptedCompletion: no more responses"))
    }
}

/// An assistant message with one text block.
pub fn text_message(text: &str) -> Message {
    Message {
        id: "msg_0123456789".into(),
        model: "claude-sonnet-4-20250514".into(),
        role: Role::Assistant,
        content: vec![ContentBlock::text(text)],
        stop_reason: Some(StopReason::EndTurn),
        stop_sequence: None,
        usage: Usage::new(10, 20),
        extra: Default::default(),
    }
}
