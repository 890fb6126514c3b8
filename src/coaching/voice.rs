//! Voice cues for the widget: which text field takes dictation, and what to read aloud.

use serde::Serialize;

use super::state::{SessionState, Step};

/// Language for both recognition and synthesis.
pub const VOICE_LANG: &str = "en-US";

/// A text field the widget may fill from speech recognition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceInput {
    pub field_id: &'static str,
    pub lang: &'static str,
}

/// Text the widget may read aloud. Playback is the client's business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeechCue {
    pub text: String,
    pub lang: &'static str,
}

impl SpeechCue {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            lang: VOICE_LANG,
        }
    }
}

/// Dictation target for a step, if any.
pub fn voice_input(step: Step) -> Option<VoiceInput> {
    let field_id = match step {
        Step::MealPlanner => "meal_input",
        Step::FreeformChat => "chat_input",
        _ => return None,
    };
    Some(VoiceInput {
        field_id,
        lang: VOICE_LANG,
    })
}

/// Generated text on the current step that can be spoken.
pub fn speech_cues(state: &SessionState) -> Vec<SpeechCue> {
    if state.step != Step::MealPlanner {
        return Vec::new();
    }
    state
        .summary
        .iter()
        .chain(state.meal_plan.iter())
        .map(SpeechCue::new)
        .collect()
}
