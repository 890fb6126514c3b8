//! Renderable snapshot of a session for the widget and the CLI.

use serde::Serialize;

use super::controller::Notice;
use super::model::{LeadProfile, OptionSets, OptionView};
use super::prompts::CHAT_GREETING;
use super::state::{SessionState, Step, UsageTotals};
use super::voice::{SpeechCue, VoiceInput, speech_cues, voice_input};
use crate::llm::ChatMessage;

/// Per-surface rendering settings.
#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub booking_url: String,
    /// Whether the surface can take dictation (the widget can, the terminal can't).
    pub voice: bool,
}

/// Everything needed to draw the current step.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub step: Step,
    pub step_index: u8,
    pub profile: LeadProfile,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<OptionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeting: Option<&'static str>,
    pub messages: Vec<ChatMessage>,
    pub awaiting_reply: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_input: Option<VoiceInput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub speech: Vec<SpeechCue>,
    pub usage: UsageTotals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

impl SessionView {
    pub fn render(state: &SessionState, notice: Option<Notice>, options: &ViewOptions) -> Self {
        let step = state.step;
        let on_meal_planner = step == Step::MealPlanner;
        let in_chat = step == Step::FreeformChat;

        Self {
            step,
            step_index: step.index(),
            profile: state.profile.clone(),
            choices: choices(step),
            summary: state.summary.clone(),
            meal_plan: state.meal_plan.clone(),
            booking_url: on_meal_planner.then(|| options.booking_url.clone()),
            greeting: in_chat.then_some(CHAT_GREETING),
            messages: if in_chat {
                state.visible_messages().cloned().collect()
            } else {
                Vec::new()
            },
            awaiting_reply: in_chat && state.awaiting_reply(),
            voice_input: if options.voice { voice_input(step) } else { None },
            speech: speech_cues(state),
            usage: state.usage.clone(),
            notice,
        }
    }
}

fn choices(step: Step) -> Vec<OptionView> {
    let options = OptionSets::all();
    match step {
        Step::LeadCapture => options.goals,
        Step::StruggleSelect => options.struggles,
        Step::TimelineSelect => options.timelines,
        _ => Vec::new(),
    }
}
