//! Events that drive the coaching state machine

use serde::Deserialize;

use super::model::{Goal, Struggle, Timeline};

/// What a completion was requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    Summary,
    MealPlan,
    Chat,
}

impl std::fmt::Display for Purpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Summary => write!(f, "summary"),
            Self::MealPlan => write!(f, "meal_plan"),
            Self::Chat => write!(f, "chat"),
        }
    }
}

/// Something the visitor did in the widget (or typed at the CLI).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserAction {
    SubmitLead {
        name: String,
        email: String,
        goal: Goal,
    },
    SelectStruggle {
        struggle: Struggle,
    },
    SelectTimeline {
        timeline: Timeline,
    },
    ConfirmEmail {
        email: String,
    },
    GenerateMealPlan {
        preferences: String,
    },
    ContinueChatting,
    StartOver,
    SendChat {
        text: String,
    },
    RetryChat,
    ResetChat,
}

impl UserAction {
    /// Stable name for logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SubmitLead { .. } => "submit_lead",
            Self::SelectStruggle { .. } => "select_struggle",
            Self::SelectTimeline { .. } => "select_timeline",
            Self::ConfirmEmail { .. } => "confirm_email",
            Self::GenerateMealPlan { .. } => "generate_meal_plan",
            Self::ContinueChatting => "continue_chatting",
            Self::StartOver => "start_over",
            Self::SendChat { .. } => "send_chat",
            Self::RetryChat => "retry_chat",
            Self::ResetChat => "reset_chat",
        }
    }
}

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    User(UserAction),
    /// A requested completion came back.
    CompletionReady { purpose: Purpose, content: String },
}

impl From<UserAction> for Event {
    fn from(action: UserAction) -> Self {
        Event::User(action)
    }
}
