//! Persona and completion request templates.
//!
//! Every function here is a pure string builder: same answers in, same
//! request out.

use super::model::{Goal, Struggle, Timeline};
use crate::llm::{ChatMessage, CompletionRequest};

/// Persona system message that opens every chat transcript.
pub const PERSONA_PROMPT: &str = "\
You are Lex, a friendly, energetic, and motivational fitness coach.
You always speak in an upbeat, supportive tone. You use emojis sometimes to sound fun and engaging.
You're casual and feel like a gym buddy. If the user feels down or unmotivated, cheer them up.

Avoid sounding robotic or formal. Keep your replies short, helpful, and fun. Be proactive and helpful.";

/// Opening line shown above an empty chat. Never stored in the transcript.
pub const CHAT_GREETING: &str =
    "Hey! I'm Lex, your AI fitness buddy 💪 What's your goal today? Let's make it happen!";

pub const SAMPLING_TEMPERATURE: f32 = 0.7;
pub const SUMMARY_MAX_TOKENS: u32 = 150;
pub const MEAL_PLAN_MAX_TOKENS: u32 = 300;
pub const CHAT_MAX_TOKENS: u32 = 300;

const SUMMARY_SYSTEM: &str = "You are a helpful assistant.";
const MEAL_PLAN_SYSTEM: &str = "You are a helpful fitness meal planner.";

/// Build the user prompt asking for an encouraging summary of the answers.
pub fn summary_prompt(goal: Goal, struggle: Struggle, timeline: Timeline) -> String {
    format!(
        "You are a friendly fitness coach assistant.\n\
         Here are the user's answers:\n\
         Goal: {goal}\n\
         Struggle: {struggle}\n\
         Timeline: {timeline}\n\n\
         Write a warm, encouraging summary of their fitness journey and next steps."
    )
}

pub fn summary_request(goal: Goal, struggle: Struggle, timeline: Timeline) -> CompletionRequest {
    CompletionRequest::new(vec![
        ChatMessage::system(SUMMARY_SYSTEM),
        ChatMessage::user(summary_prompt(goal, struggle, timeline)),
    ])
    .with_temperature(SAMPLING_TEMPERATURE)
    .with_max_tokens(SUMMARY_MAX_TOKENS)
}

/// Build the meal-plan prompt. The preference text is embedded verbatim.
pub fn meal_plan_prompt(preferences: &str) -> String {
    format!(
        "Create a simple 3-day meal plan for someone with these dietary \
         preferences/restrictions: {preferences}"
    )
}

pub fn meal_plan_request(preferences: &str) -> CompletionRequest {
    CompletionRequest::new(vec![
        ChatMessage::system(MEAL_PLAN_SYSTEM),
        ChatMessage::user(meal_plan_prompt(preferences)),
    ])
    .with_temperature(SAMPLING_TEMPERATURE)
    .with_max_tokens(MEAL_PLAN_MAX_TOKENS)
}

/// Build the chat request from the transcript.
///
/// With no `history_limit` the whole transcript goes out as-is. With a limit,
/// the persona message is kept and only the most recent `limit` messages
/// after it are sent.
pub fn chat_request(transcript: &[ChatMessage], history_limit: Option<usize>) -> CompletionRequest {
    let messages = match (history_limit, transcript.split_first()) {
        (Some(limit), Some((persona, rest))) if rest.len() > limit => {
            let mut messages = Vec::with_capacity(limit + 1);
            messages.push(persona.clone());
            messages.extend_from_slice(&rest[rest.len() - limit..]);
            messages
        }
        _ => transcript.to_vec(),
    };

    CompletionRequest::new(messages)
        .with_temperature(SAMPLING_TEMPERATURE)
        .with_max_tokens(CHAT_MAX_TOKENS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    #[test]
    fn summary_embeds_all_three_answers() {
        let prompt = summary_prompt(Goal::LoseFat, Struggle::Motivation, Timeline::Asap);
        assert!(prompt.contains("Goal: 🔥 Lose fat"));
        assert!(prompt.contains("Struggle: 💡 Lack of motivation"));
        assert!(prompt.contains("Timeline: ✅ ASAP"));
    }

    #[test]
    fn summary_request_uses_fixed_sampling() {
        let request = summary_request(Goal::BuildMuscle, Struggle::Diet, Timeline::WithinMonth);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(request.max_tokens, Some(150));
    }

    #[test]
    fn summary_is_deterministic() {
        let a = summary_request(Goal::GetInShape, Struggle::NotEnoughTime, Timeline::Asap);
        let b = summary_request(Goal::GetInShape, Struggle::NotEnoughTime, Timeline::Asap);
        assert_eq!(a, b);
    }

    #[test]
    fn meal_plan_embeds_preferences_verbatim() {
        let request = meal_plan_request("vegetarian, no nuts {really}");
        assert!(request.messages[1].content.ends_with("vegetarian, no nuts {really}"));
        assert!(request.messages[1].content.contains("3-day meal plan"));
        assert_eq!(request.max_tokens, Some(300));
    }

    fn transcript(turns: usize) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(PERSONA_PROMPT)];
        for i in 0..turns {
            messages.push(ChatMessage::user(format!("q{i}")));
            messages.push(ChatMessage::assistant(format!("a{i}")));
        }
        messages
    }

    #[test]
    fn chat_sends_full_transcript_without_limit() {
        let messages = transcript(20);
        let request = chat_request(&messages, None);
        assert_eq!(request.messages, messages);
        assert_eq!(request.max_tokens, Some(300));
    }

    #[test]
    fn chat_limit_keeps_persona_and_tail() {
        let messages = transcript(5);
        let request = chat_request(&messages, Some(3));
        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[0].content, PERSONA_PROMPT);
        assert_eq!(request.messages[1].content, "a3");
        assert_eq!(request.messages[3].content, "a4");
    }

    #[test]
    fn chat_limit_larger_than_history_is_noop() {
        let messages = transcript(2);
        let request = chat_request(&messages, Some(10));
        assert_eq!(request.messages, messages);
    }
}
