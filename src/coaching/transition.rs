//! Pure state transition function
//!
//! Given the same state, context, and event this always produces the same
//! result. LLM calls are returned as effects and their results come back in
//! as `Event::CompletionReady`.

use thiserror::Error;

use super::effect::Effect;
use super::event::{Event, Purpose, UserAction};
use super::model::LeadProfile;
use super::prompts::{chat_request, meal_plan_request, summary_request};
use super::state::{SessionState, Step, initial_transcript};
use super::validation::{ValidationError, validate_confirmation_email, validate_lead};
use crate::llm::ChatMessage;

/// Inputs to a transition that come from configuration, not the session.
#[derive(Debug, Clone, Default)]
pub struct TransitionContext {
    /// Send at most this many messages after the persona with each chat turn.
    pub history_limit: Option<usize>,
}

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition. The state is left untouched.
#[derive(Debug, Error, PartialEq)]
pub enum TransitionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Action {action} is not available on step {step}")]
    WrongStep { action: &'static str, step: Step },
    #[error("Unexpected {purpose} completion on step {step}")]
    UnexpectedCompletion { purpose: Purpose, step: Step },
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(
    state: &SessionState,
    context: &TransitionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match event {
        Event::User(action) => apply_action(state, context, action),
        Event::CompletionReady { purpose, content } => apply_completion(state, purpose, content),
    }
}

fn apply_action(
    state: &SessionState,
    context: &TransitionContext,
    action: UserAction,
) -> Result<TransitionResult, TransitionError> {
    let step = state.step;
    match (step, action) {
        // Start Over is available everywhere.
        (_, UserAction::StartOver) => {
            let mut next = state.clone();
            next.step = Step::LeadCapture;
            next.profile = LeadProfile::default();
            next.summary = None;
            next.meal_plan = None;
            Ok(TransitionResult::new(next))
        }

        (Step::LeadCapture, UserAction::SubmitLead { name, email, goal }) => {
            let (name, email) = validate_lead(&name, &email)?;
            let mut next = state.clone();
            next.profile.name = Some(name);
            next.profile.email = Some(email);
            next.profile.goal = Some(goal);
            advance(&mut next)?;
            let lead = Effect::record_lead(&next.profile, false);
            Ok(TransitionResult::new(next).with_effect(lead))
        }

        (Step::StruggleSelect, UserAction::SelectStruggle { struggle }) => {
            let mut next = state.clone();
            next.profile.struggle = Some(struggle);
            advance(&mut next)?;
            Ok(TransitionResult::new(next))
        }

        (Step::TimelineSelect, UserAction::SelectTimeline { timeline }) => {
            let mut next = state.clone();
            next.profile.timeline = Some(timeline);
            advance(&mut next)?;
            Ok(TransitionResult::new(next))
        }

        (Step::SummaryReveal, UserAction::ConfirmEmail { email }) => {
            let email = validate_confirmation_email(&email)?;
            let (goal, struggle, timeline) = state.profile.answers().ok_or_else(|| {
                TransitionError::InvalidTransition(
                    "summary requested before all answers were captured".to_string(),
                )
            })?;
            let mut next = state.clone();
            next.profile.email = Some(email);
            Ok(TransitionResult::new(next).with_effect(Effect::request(
                Purpose::Summary,
                summary_request(goal, struggle, timeline),
            )))
        }

        (Step::MealPlanner, UserAction::GenerateMealPlan { preferences }) => {
            let preferences = preferences.trim();
            if preferences.is_empty() {
                return Ok(TransitionResult::new(state.clone()));
            }
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::request(
                Purpose::MealPlan,
                meal_plan_request(preferences),
            )))
        }

        (Step::MealPlanner, UserAction::ContinueChatting) => {
            let mut next = state.clone();
            advance(&mut next)?;
            Ok(TransitionResult::new(next))
        }

        (Step::FreeformChat, UserAction::SendChat { text }) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(TransitionResult::new(state.clone()));
            }
            let mut next = state.clone();
            next.transcript.push(ChatMessage::user(text));
            let request = chat_request(&next.transcript, context.history_limit);
            Ok(TransitionResult::new(next).with_effect(Effect::request(Purpose::Chat, request)))
        }

        (Step::FreeformChat, UserAction::RetryChat) => {
            if !state.awaiting_reply() {
                return Ok(TransitionResult::new(state.clone()));
            }
            let request = chat_request(&state.transcript, context.history_limit);
            Ok(TransitionResult::new(state.clone())
                .with_effect(Effect::request(Purpose::Chat, request)))
        }

        (Step::FreeformChat, UserAction::ResetChat) => {
            let mut next = state.clone();
            next.transcript = initial_transcript();
            Ok(TransitionResult::new(next))
        }

        (step, action) => Err(TransitionError::WrongStep {
            action: action.name(),
            step,
        }),
    }
}

fn apply_completion(
    state: &SessionState,
    purpose: Purpose,
    content: String,
) -> Result<TransitionResult, TransitionError> {
    match (state.step, purpose) {
        (Step::SummaryReveal, Purpose::Summary) => {
            let mut next = state.clone();
            next.summary = Some(content);
            advance(&mut next)?;
            let lead = Effect::record_lead(&next.profile, true);
            Ok(TransitionResult::new(next).with_effect(lead))
        }

        (Step::MealPlanner, Purpose::MealPlan) => {
            let mut next = state.clone();
            next.meal_plan = Some(content);
            Ok(TransitionResult::new(next))
        }

        (Step::FreeformChat, Purpose::Chat) if state.awaiting_reply() => {
            let mut next = state.clone();
            next.transcript.push(ChatMessage::assistant(content));
            Ok(TransitionResult::new(next))
        }

        (step, purpose) => Err(TransitionError::UnexpectedCompletion { purpose, step }),
    }
}

fn advance(state: &mut SessionState) -> Result<Step, TransitionError> {
    state.advance().map_err(TransitionError::InvalidTransition)
}
