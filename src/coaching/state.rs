//! Coaching session state: which step the lead is on and what they've told us.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::model::LeadProfile;
use super::prompts::PERSONA_PROMPT;
use crate::llm::ChatMessage;

/// The steps of the coaching wizard.
///
/// Progresses linearly: LeadCapture → StruggleSelect → TimelineSelect →
/// SummaryReveal → MealPlanner → FreeformChat. Only Start Over goes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    LeadCapture,
    StruggleSelect,
    TimelineSelect,
    SummaryReveal,
    MealPlanner,
    FreeformChat,
}

impl Step {
    /// Check if a forward transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: Step) -> bool {
        use Step::*;
        matches!(
            (self, target),
            (LeadCapture, StruggleSelect)
                | (StruggleSelect, TimelineSelect)
                | (TimelineSelect, SummaryReveal)
                | (SummaryReveal, MealPlanner)
                | (MealPlanner, FreeformChat)
        )
    }

    /// Whether this step is terminal (the open-ended chat).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::FreeformChat)
    }

    /// Get the next step in the linear progression, if any.
    pub fn next(&self) -> Option<Step> {
        use Step::*;
        match self {
            LeadCapture => Some(StruggleSelect),
            StruggleSelect => Some(TimelineSelect),
            TimelineSelect => Some(SummaryReveal),
            SummaryReveal => Some(MealPlanner),
            MealPlanner => Some(FreeformChat),
            FreeformChat => None,
        }
    }

    /// Numeric step index as shown to the widget (0..=5).
    pub fn index(&self) -> u8 {
        *self as u8
    }
}

impl Default for Step {
    fn default() -> Self {
        Self::LeadCapture
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::LeadCapture => "lead_capture",
            Self::StruggleSelect => "struggle_select",
            Self::TimelineSelect => "timeline_select",
            Self::SummaryReveal => "summary_reveal",
            Self::MealPlanner => "meal_planner",
            Self::FreeformChat => "freeform_chat",
        };
        write!(f, "{s}")
    }
}

/// Token totals accumulated over the session's completions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageTotals {
    pub calls: u32,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub estimated_cost: Decimal,
}

impl UsageTotals {
    pub fn record(&mut self, input_tokens: u32, output_tokens: u32, cost: (Decimal, Decimal)) {
        self.calls += 1;
        self.input_tokens += u64::from(input_tokens);
        self.output_tokens += u64::from(output_tokens);
        self.estimated_cost +=
            cost.0 * Decimal::from(input_tokens) + cost.1 * Decimal::from(output_tokens);
    }
}

/// Everything one visitor's session holds. Dropped when the session ends.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub step: Step,
    pub profile: LeadProfile,
    /// Chat transcript; the first entry is always the persona message.
    pub transcript: Vec<ChatMessage>,
    pub summary: Option<String>,
    pub meal_plan: Option<String>,
    pub usage: UsageTotals,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            step: Step::default(),
            profile: LeadProfile::default(),
            transcript: initial_transcript(),
            summary: None,
            meal_plan: None,
            usage: UsageTotals::default(),
        }
    }
}

impl SessionState {
    /// Advance to the next step. Returns an error if already at the terminal step.
    pub fn advance(&mut self) -> Result<Step, String> {
        let next = self
            .step
            .next()
            .ok_or_else(|| "Already at terminal step".to_string())?;
        if !self.step.can_transition_to(next) {
            return Err(format!("Cannot transition from {} to {}", self.step, next));
        }
        self.step = next;
        Ok(next)
    }

    /// Chat exchanges that are not the persona message.
    pub fn visible_messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.transcript.iter().skip(1)
    }

    /// True when the last transcript entry is a user message with no reply.
    pub fn awaiting_reply(&self) -> bool {
        self.transcript.len() > 1
            && self
                .transcript
                .last()
                .is_some_and(|m| m.role == crate::llm::Role::User)
    }
}

/// A transcript holding only the persona message.
pub fn initial_transcript() -> Vec<ChatMessage> {
    vec![ChatMessage::system(PERSONA_PROMPT)]
}
