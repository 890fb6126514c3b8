//! Step flow controller: runs the pure transition function and executes the
//! effects it returns.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::effect::Effect;
use super::event::{Event, Purpose, UserAction};
use super::state::SessionState;
use super::transition::{TransitionContext, TransitionError, transition};
use super::validation::ValidationError;
use crate::error::LlmError;
use crate::llm::{CompletionRequest, FinishReason, LlmProvider};

/// Message shown inline with the next render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// Bad form input; nothing changed.
    Validation(ValidationError),
    /// A completion call failed; the same action can be tried again.
    Error { purpose: Purpose, message: String },
}

/// Drives sessions through the wizard. Shared by all sessions.
pub struct CoachController {
    llm: Arc<dyn LlmProvider>,
    context: TransitionContext,
}

impl CoachController {
    pub fn new(llm: Arc<dyn LlmProvider>, context: TransitionContext) -> Self {
        Self { llm, context }
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Apply one user action to a session.
    ///
    /// Validation failures come back as a `Notice` and leave the state
    /// untouched. LLM failures also come back as a `Notice` and keep the
    /// step, but the action's own input stays applied: a confirmed email is
    /// kept and a chat message stays in the transcript awaiting a reply.
    /// Actions that don't belong to the current step are an error.
    pub async fn handle(
        &self,
        state: &mut SessionState,
        action: UserAction,
    ) -> Result<Option<Notice>, TransitionError> {
        let action_name = action.name();
        let step_before = state.step;

        let result = match transition(state, &self.context, Event::User(action)) {
            Ok(result) => result,
            Err(TransitionError::Validation(e)) => {
                debug!(action = action_name, step = %step_before, error = %e, "Rejected input");
                return Ok(Some(Notice::Validation(e)));
            }
            Err(e) => return Err(e),
        };

        *state = result.new_state;
        let notice = self.run_effects(state, result.effects).await?;

        if state.step != step_before {
            info!(action = action_name, from = %step_before, to = %state.step, "Step changed");
        }
        Ok(notice)
    }

    async fn run_effects(
        &self,
        state: &mut SessionState,
        effects: Vec<Effect>,
    ) -> Result<Option<Notice>, TransitionError> {
        let mut pending = effects;

        while !pending.is_empty() {
            let mut follow_up = Vec::new();
            for effect in pending {
                match effect {
                    Effect::RecordLead { profile, confirmed } => {
                        info!(
                            name = profile.name.as_deref().unwrap_or_default(),
                            email = profile.email.as_deref().unwrap_or_default(),
                            goal = profile.goal.map(|g| g.key()).unwrap_or_default(),
                            struggle = profile.struggle.map(|s| s.key()).unwrap_or_default(),
                            timeline = profile.timeline.map(|t| t.key()).unwrap_or_default(),
                            confirmed,
                            "Lead captured"
                        );
                    }
                    Effect::RequestCompletion { purpose, request } => {
                        let content = match self.complete(state, purpose, request).await {
                            Ok(content) => content,
                            Err(e) => {
                                warn!(%purpose, error = %e, "Completion failed");
                                return Ok(Some(Notice::Error {
                                    purpose,
                                    message: e.user_message().to_string(),
                                }));
                            }
                        };
                        let result = transition(
                            state,
                            &self.context,
                            Event::CompletionReady { purpose, content },
                        )?;
                        *state = result.new_state;
                        follow_up.extend(result.effects);
                    }
                }
            }
            pending = follow_up;
        }

        Ok(None)
    }

    /// One blocking completion. Usage is recorded even if the content is unusable.
    async fn complete(
        &self,
        state: &mut SessionState,
        purpose: Purpose,
        request: CompletionRequest,
    ) -> Result<String, LlmError> {
        debug!(%purpose, messages = request.messages.len(), "Requesting completion");
        let response = self.llm.complete(request).await?;

        state.usage.record(
            response.input_tokens,
            response.output_tokens,
            self.llm.cost_per_token(),
        );
        info!(
            %purpose,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            session_cost = %state.usage.estimated_cost,
            "Completion received"
        );

        let content = response.content.trim();
        if content.is_empty() {
            let reason = if response.finish_reason == FinishReason::Length {
                "Response truncated (finish_reason=length) with no content".to_string()
            } else {
                "Empty completion".to_string()
            };
            return Err(LlmError::InvalidResponse {
                provider: self.llm.model_name().to_string(),
                reason,
            });
        }
        Ok(content.to_string())
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedLlm;
    use super::*;
    use crate::coaching::model::{Goal, Struggle, Timeline};
    use crate::coaching::state::Step;
    use crate::coaching::validation::Field;
    use crate::llm::Role;

    fn controller(llm: &Arc<ScriptedLlm>) -> CoachController {
        CoachController::new(llm.clone(), TransitionContext::default())
    }

    fn rate_limited() -> LlmError {
        LlmError::RateLimited {
            provider: "openai".to_string(),
        }
    }

    async fn walk_to_summary(coach: &CoachController, state: &mut SessionState) {
        let actions = [
            UserAction::SubmitLead {
                name: "Alex".to_string(),
                email: "alex@example.com".to_string(),
                goal: Goal::LoseFat,
            },
            UserAction::SelectStruggle {
                struggle: Struggle::Motivation,
            },
            UserAction::SelectTimeline {
                timeline: Timeline::Asap,
            },
        ];
        for action in actions {
            assert_eq!(coach.handle(state, action).await.unwrap(), None);
        }
        assert_eq!(state.step, Step::SummaryReveal);
    }

    #[tokio::test]
    async fn end_to_end_wizard_produces_summary() {
        let llm = Arc::new(ScriptedLlm::new());
        llm.push(Ok("Alex, motivation is a muscle. Let's train it!".to_string()));
        let coach = controller(&llm);
        let mut state = SessionState::default();

        walk_to_summary(&coach, &mut state).await;
        assert_eq!(llm.calls(), 0);

        let notice = coach
            .handle(
                &mut state,
                UserAction::ConfirmEmail {
                    email: "alex@example.com".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(notice, None);
        assert_eq!(state.step, Step::MealPlanner);
        assert_eq!(
            state.summary.as_deref(),
            Some("Alex, motivation is a muscle. Let's train it!")
        );
        assert_eq!(llm.calls(), 1);

        let requests = llm.requests.lock().unwrap();
        let prompt = &requests[0].messages[1].content;
        assert!(prompt.contains("🔥 Lose fat"));
        assert!(prompt.contains("💡 Lack of motivation"));
        assert!(prompt.contains("✅ ASAP"));
    }

    #[tokio::test]
    async fn invalid_email_is_a_notice_without_llm_call() {
        let llm = Arc::new(ScriptedLlm::new());
        let coach = controller(&llm);
        let mut state = SessionState::default();

        walk_to_summary(&coach, &mut state).await;
        let before = state.clone();

        let notice = coach
            .handle(
                &mut state,
                UserAction::ConfirmEmail {
                    email: "alex@@example.com".to_string(),
                },
            )
            .await
            .unwrap();
        match notice {
            Some(Notice::Validation(e)) => assert_eq!(e.field, Field::Email),
            other => panic!("expected validation notice, got {other:?}"),
        }
        assert_eq!(state, before);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn summary_failure_stays_on_step_and_can_be_retried() {
        let llm = Arc::new(ScriptedLlm::new());
        llm.push(Err(rate_limited()));
        let coach = controller(&llm);
        let mut state = SessionState::default();
        walk_to_summary(&coach, &mut state).await;

        let confirm = UserAction::ConfirmEmail {
            email: "alex.fit@example.com".to_string(),
        };
        let notice = coach.handle(&mut state, confirm.clone()).await.unwrap();
        assert!(matches!(
            notice,
            Some(Notice::Error {
                purpose: Purpose::Summary,
                ..
            })
        ));
        assert_eq!(state.step, Step::SummaryReveal);
        assert_eq!(state.profile.name.as_deref(), Some("Alex"));
        assert_eq!(state.profile.email.as_deref(), Some("alex.fit@example.com"));

        let notice = coach.handle(&mut state, confirm).await.unwrap();
        assert_eq!(notice, None);
        assert_eq!(state.step, Step::MealPlanner);
    }

    #[tokio::test]
    async fn chat_failure_keeps_transcript_and_retry_recovers() {
        let llm = Arc::new(ScriptedLlm::new());
        let coach = controller(&llm);
        let mut state = SessionState::default();
        walk_to_summary(&coach, &mut state).await;
        coach
            .handle(
                &mut state,
                UserAction::ConfirmEmail {
                    email: "alex@example.com".to_string(),
                },
            )
            .await
            .unwrap();
        coach
            .handle(&mut state, UserAction::ContinueChatting)
            .await
            .unwrap();

        coach
            .handle(
                &mut state,
                UserAction::SendChat {
                    text: "How many rest days?".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(state.transcript.len(), 3);

        llm.push(Err(LlmError::RequestFailed {
            provider: "openai".to_string(),
            reason: "connection reset".to_string(),
        }));
        let notice = coach
            .handle(
                &mut state,
                UserAction::SendChat {
                    text: "And protein?".to_string(),
                },
            )
            .await
            .unwrap();
        assert!(matches!(notice, Some(Notice::Error { purpose: Purpose::Chat, .. })));
        assert_eq!(state.transcript.len(), 4);
        assert!(state.awaiting_reply());

        let notice = coach.handle(&mut state, UserAction::RetryChat).await.unwrap();
        assert_eq!(notice, None);
        assert_eq!(state.transcript.len(), 5);
        assert_eq!(state.transcript[4].role, Role::Assistant);
    }

    #[tokio::test]
    async fn empty_chat_makes_no_call() {
        let llm = Arc::new(ScriptedLlm::new());
        let coach = controller(&llm);
        let mut state = SessionState {
            step: Step::FreeformChat,
            ..Default::default()
        };
        let notice = coach
            .handle(
                &mut state,
                UserAction::SendChat {
                    text: String::new(),
                },
            )
            .await
            .unwrap();
        assert_eq!(notice, None);
        assert_eq!(llm.calls(), 0);
        assert_eq!(state.transcript.len(), 1);
    }

    #[tokio::test]
    async fn empty_completion_is_reported() {
        let llm = Arc::new(ScriptedLlm::new());
        llm.push(Ok("   ".to_string()));
        let coach = controller(&llm);
        let mut state = SessionState {
            step: Step::MealPlanner,
            ..Default::default()
        };
        let notice = coach
            .handle(
                &mut state,
                UserAction::GenerateMealPlan {
                    preferences: "vegan".to_string(),
                },
            )
            .await
            .unwrap();
        assert!(matches!(notice, Some(Notice::Error { purpose: Purpose::MealPlan, .. })));
        assert!(state.meal_plan.is_none());
        assert_eq!(state.usage.calls, 1);
    }

    #[tokio::test]
    async fn wrong_step_is_an_error() {
        let llm = Arc::new(ScriptedLlm::new());
        let coach = controller(&llm);
        let mut state = SessionState::default();
        let err = coach
            .handle(&mut state, UserAction::ContinueChatting)
            .await
            .unwrap_err();
        assert!(matches!(err, TransitionError::WrongStep { .. }));
        assert_eq!(state.step, Step::LeadCapture);
    }

    #[tokio::test]
    async fn usage_accumulates_across_calls() {
        let llm = Arc::new(ScriptedLlm::new());
        let coach = controller(&llm);
        let mut state = SessionState {
            step: Step::FreeformChat,
            ..Default::default()
        };
        for text in ["one", "two", "three"] {
            coach
                .handle(
                    &mut state,
                    UserAction::SendChat {
                        text: text.to_string(),
                    },
                )
                .await
                .unwrap();
        }
        assert_eq!(state.usage.calls, 3);
        assert_eq!(state.usage.input_tokens, 30);
        assert_eq!(state.usage.output_tokens, 15);
        assert_eq!(state.transcript.len(), 7);
    }
}
