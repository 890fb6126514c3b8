//! Bridge from rig's `CompletionModel` to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::completion::{AssistantContent, CompletionError, CompletionModel, Message};
use rust_decimal::Decimal;

use super::costs::model_cost;
use super::provider::{
    ChatMessage, CompletionRequest, CompletionResponse, FinishReason, LlmProvider, Role,
};
use crate::error::LlmError;

const PROVIDER: &str = "openai";

/// Wraps any rig completion model.
pub struct RigAdapter<M> {
    model: M,
    model_name: String,
}

impl<M: CompletionModel> RigAdapter<M> {
    pub fn new(model: M, model_name: &str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
        }
    }
}

/// A transcript split the way rig wants it: system text as the preamble,
/// the last non-system message as the prompt, everything between as history.
struct RigParts {
    preamble: Option<String>,
    history: Vec<Message>,
    prompt: Message,
}

fn to_rig_message(message: &ChatMessage) -> Message {
    match message.role {
        Role::Assistant => Message::assistant(message.content.clone()),
        Role::User | Role::System => Message::user(message.content.clone()),
    }
}

fn split_messages(messages: &[ChatMessage]) -> Result<RigParts, LlmError> {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();
    let preamble = (!system.is_empty()).then(|| system.join("\n\n"));

    let mut turns: Vec<Message> = messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(to_rig_message)
        .collect();
    let prompt = turns.pop().ok_or_else(|| LlmError::RequestFailed {
        provider: PROVIDER.to_string(),
        reason: "Request has no user or assistant messages".to_string(),
    })?;

    Ok(RigParts {
        preamble,
        history: turns,
        prompt,
    })
}

/// Sort a rig failure into our error kinds. Rig reports API failures as
/// text, so status codes and OpenAI error codes are matched in the message.
fn classify_error(model: &str, err: CompletionError) -> LlmError {
    let message = err.to_string();
    let lower = message.to_lowercase();

    if lower.contains("429") || lower.contains("rate limit") || lower.contains("quota") {
        LlmError::RateLimited {
            provider: PROVIDER.to_string(),
        }
    } else if lower.contains("401")
        || lower.contains("403")
        || lower.contains("api key")
        || lower.contains("unauthorized")
    {
        LlmError::AuthFailed {
            provider: PROVIDER.to_string(),
        }
    } else if lower.contains("model_not_found")
        || (lower.contains("model") && lower.contains("does not exist"))
    {
        LlmError::ModelNotAvailable {
            provider: PROVIDER.to_string(),
            model: model.to_string(),
        }
    } else if matches!(
        err,
        CompletionError::JsonError(_) | CompletionError::ResponseError(_)
    ) {
        LlmError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: message,
        }
    } else {
        LlmError::RequestFailed {
            provider: PROVIDER.to_string(),
            reason: message,
        }
    }
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + Send + Sync + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn cost_per_token(&self) -> (Decimal, Decimal) {
        model_cost(&self.model_name)
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let parts = split_messages(&request.messages)?;

        tracing::debug!(
            model = %self.model_name,
            history = parts.history.len(),
            "Sending completion"
        );

        let mut builder = self
            .model
            .completion_request(parts.prompt)
            .messages(parts.history);
        if let Some(preamble) = parts.preamble {
            builder = builder.preamble(preamble);
        }
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(f64::from(temperature));
        }
        if let Some(max_tokens) = request.max_tokens {
            builder = builder.max_tokens(u64::from(max_tokens));
        }

        let response = builder.send().await.map_err(|e| {
            let err = classify_error(&self.model_name, e);
            tracing::warn!(model = %self.model_name, error = %err, "Completion failed");
            err
        })?;

        let content: String = response
            .choice
            .iter()
            .filter_map(|c| match c {
                AssistantContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        let input_tokens = u32::try_from(response.usage.input_tokens).unwrap_or(u32::MAX);
        let output_tokens = u32::try_from(response.usage.output_tokens).unwrap_or(u32::MAX);
        let finish_reason = match request.max_tokens {
            Some(limit) if output_tokens >= limit => FinishReason::Length,
            _ => FinishReason::Stop,
        };

        Ok(CompletionResponse {
            content,
            input_tokens,
            output_tokens,
            finish_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coaching::prompts::{PERSONA_PROMPT, chat_request, meal_plan_request};
    use crate::coaching::state::initial_transcript;

    #[test]
    fn system_message_becomes_preamble() {
        let request = meal_plan_request("vegan");
        let parts = split_messages(&request.messages).unwrap();
        assert_eq!(
            parts.preamble.as_deref(),
            Some("You are a helpful fitness meal planner.")
        );
        assert!(parts.history.is_empty());
        assert!(matches!(parts.prompt, Message::User { .. }));
    }

    #[test]
    fn chat_transcript_splits_into_history_and_prompt() {
        let mut transcript = initial_transcript();
        transcript.push(ChatMessage::user("hi"));
        transcript.push(ChatMessage::assistant("hey there!"));
        transcript.push(ChatMessage::user("leg day tips?"));

        let parts = split_messages(&chat_request(&transcript, None).messages).unwrap();
        assert_eq!(parts.preamble.as_deref(), Some(PERSONA_PROMPT));
        assert_eq!(parts.history.len(), 2);
        assert!(matches!(parts.history[0], Message::User { .. }));
        assert!(matches!(parts.history[1], Message::Assistant { .. }));
        assert!(matches!(parts.prompt, Message::User { .. }));
    }

    #[test]
    fn persona_only_is_rejected() {
        let err = split_messages(&initial_transcript()).err().unwrap();
        assert!(matches!(err, LlmError::RequestFailed { .. }));
    }

    #[test]
    fn provider_errors_map_to_distinct_kinds() {
        let classify = |text: &str| {
            classify_error("gpt-4", CompletionError::ProviderError(text.to_string()))
        };

        assert!(matches!(
            classify("Rate limit reached for gpt-4 in organization org-123"),
            LlmError::RateLimited { .. }
        ));
        assert!(matches!(
            classify("You exceeded your current quota, please check your plan"),
            LlmError::RateLimited { .. }
        ));
        assert!(matches!(
            classify("Incorrect API key provided: sk-test"),
            LlmError::AuthFailed { .. }
        ));
        match classify("The model `gpt-5-ultra` does not exist or you do not have access to it.") {
            LlmError::ModelNotAvailable { model, .. } => assert_eq!(model, "gpt-4"),
            other => panic!("expected ModelNotAvailable, got {other:?}"),
        }
        match classify("The server had an error while processing your request") {
            LlmError::RequestFailed { reason, .. } => assert!(reason.contains("server had an error")),
            other => panic!("expected RequestFailed, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_response_is_invalid() {
        let err = classify_error(
            "gpt-4",
            CompletionError::ResponseError("Response contained no message or tool call".to_string()),
        );
        assert!(matches!(err, LlmError::InvalidResponse { .. }));
    }
}
