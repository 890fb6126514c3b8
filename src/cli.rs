//! CLI surface: stdin/stdout REPL driving a single coaching session.
//!
//! Every field is typed by hand; the terminal never offers dictation.

use std::str::FromStr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::coaching::{
    CoachController, Goal, Notice, SessionState, SessionView, Step, Struggle, Timeline,
    UserAction, ViewOptions,
};

/// Lead-capture answers typed so far, one prompt at a time.
#[derive(Debug, Default)]
struct LeadDraft {
    name: Option<String>,
    email: Option<String>,
}

/// What a typed line means on the current step.
#[derive(Debug, PartialEq)]
enum Command {
    Quit,
    Act(UserAction),
    /// Part of a multi-line form was stored; prompt for the next field.
    Continue,
    Invalid(String),
}

/// Pick from a fixed option list by 1-based number, key, or label.
fn pick<T: Copy + FromStr>(all: &[T], line: &str) -> Option<T> {
    match line.parse::<usize>() {
        Ok(n) if (1..=all.len()).contains(&n) => Some(all[n - 1]),
        Ok(_) => None,
        Err(_) => line.parse().ok(),
    }
}

fn interpret(state: &SessionState, draft: &mut LeadDraft, line: &str) -> Command {
    let line = line.trim();
    match line {
        "/quit" | "/exit" => return Command::Quit,
        "/restart" => {
            *draft = LeadDraft::default();
            return Command::Act(UserAction::StartOver);
        }
        _ => {}
    }

    match state.step {
        Step::LeadCapture => {
            if draft.name.is_none() {
                draft.name = Some(line.to_string());
                return Command::Continue;
            }
            if draft.email.is_none() {
                draft.email = Some(line.to_string());
                return Command::Continue;
            }
            let Some(goal) = pick(&Goal::ALL, line) else {
                return Command::Invalid(format!("Pick a goal from 1 to {}.", Goal::ALL.len()));
            };
            let draft = std::mem::take(draft);
            Command::Act(UserAction::SubmitLead {
                name: draft.name.unwrap_or_default(),
                email: draft.email.unwrap_or_default(),
                goal,
            })
        }
        Step::StruggleSelect => match pick(&Struggle::ALL, line) {
            Some(struggle) => Command::Act(UserAction::SelectStruggle { struggle }),
            None => Command::Invalid(format!("Pick a struggle from 1 to {}.", Struggle::ALL.len())),
        },
        Step::TimelineSelect => match pick(&Timeline::ALL, line) {
            Some(timeline) => Command::Act(UserAction::SelectTimeline { timeline }),
            None => Command::Invalid(format!("Pick a timeline from 1 to {}.", Timeline::ALL.len())),
        },
        Step::SummaryReveal => {
            // Enter keeps the email from the first form.
            let email = if line.is_empty() {
                state.profile.email.clone().unwrap_or_default()
            } else {
                line.to_string()
            };
            Command::Act(UserAction::ConfirmEmail { email })
        }
        Step::MealPlanner => match line {
            "/chat" => Command::Act(UserAction::ContinueChatting),
            _ => Command::Act(UserAction::GenerateMealPlan {
                preferences: line.to_string(),
            }),
        },
        Step::FreeformChat => match line {
            "/retry" => Command::Act(UserAction::RetryChat),
            "/reset" => Command::Act(UserAction::ResetChat),
            _ => Command::Act(UserAction::SendChat {
                text: line.to_string(),
            }),
        },
    }
}

fn numbered<T: std::fmt::Display>(all: &[T]) -> String {
    all.iter()
        .enumerate()
        .map(|(i, o)| format!("  {}. {o}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

fn prompt(state: &SessionState, draft: &LeadDraft) -> String {
    match state.step {
        Step::LeadCapture if draft.name.is_none() => "Your name:".to_string(),
        Step::LeadCapture if draft.email.is_none() => "Your email:".to_string(),
        Step::LeadCapture => format!("What's your main fitness goal?\n{}", numbered(&Goal::ALL)),
        Step::StruggleSelect => format!(
            "What's your biggest struggle right now?\n{}",
            numbered(&Struggle::ALL)
        ),
        Step::TimelineSelect => format!(
            "How soon do you want results?\n{}",
            numbered(&Timeline::ALL)
        ),
        Step::SummaryReveal => format!(
            "Confirm your email to see your plan [{}]:",
            state.profile.email.as_deref().unwrap_or_default()
        ),
        Step::MealPlanner => {
            "Describe your food preferences for a 3-day meal plan, or /chat to talk to Lex:"
                .to_string()
        }
        Step::FreeformChat => "Ask Lex anything (/retry, /reset, /restart, /quit):".to_string(),
    }
}

fn render(view: &SessionView, step_before: Step, messages_before: usize) {
    match &view.notice {
        Some(Notice::Validation(e)) => println!("\n⚠️  {}\n", e.message),
        Some(Notice::Error { message, .. }) => println!("\n❌ {message}\n"),
        None => {}
    }

    match view.step {
        Step::MealPlanner => {
            if step_before != Step::MealPlanner {
                if let Some(summary) = &view.summary {
                    println!("\n🎯 Your Personalized Plan\n\n{summary}\n");
                }
                if let Some(url) = &view.booking_url {
                    println!("📅 Book your free 1-on-1 session: {url}\n");
                }
            } else if let Some(plan) = view.meal_plan.as_ref().filter(|_| view.notice.is_none()) {
                println!("\n🥗 Your 3-Day Meal Plan\n\n{plan}\n");
            }
        }
        Step::FreeformChat => {
            if step_before != Step::FreeformChat {
                println!("\n{}\n", view.greeting.unwrap_or_default());
            }
            for message in view.messages.iter().skip(messages_before) {
                if message.role == crate::llm::Role::Assistant {
                    println!("\nLex: {}\n", message.content);
                }
            }
        }
        _ => {}
    }
}

/// Run the REPL until EOF or /quit.
pub async fn run(controller: Arc<CoachController>, options: ViewOptions) -> anyhow::Result<()> {
    let mut state = SessionState::default();
    let mut draft = LeadDraft::default();

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    eprint!("{}\n> ", prompt(&state, &draft));
    while let Some(line) = lines.next_line().await? {
        match interpret(&state, &mut draft, &line) {
            Command::Quit => break,
            Command::Continue => {}
            Command::Invalid(message) => println!("\n⚠️  {message}\n"),
            Command::Act(action) => {
                let step_before = state.step;
                let messages_before = state.visible_messages().count();
                match controller.handle(&mut state, action).await {
                    Ok(notice) => {
                        let view = SessionView::render(&state, notice, &options);
                        let shown = if step_before == state.step { messages_before } else { 0 };
                        render(&view, step_before, shown);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Rejected action");
                        println!("\n⚠️  {e}\n");
                    }
                }
            }
        }
        eprint!("{}\n> ", prompt(&state, &draft));
    }

    tracing::info!(
        calls = state.usage.calls,
        input_tokens = state.usage.input_tokens,
        output_tokens = state.usage.output_tokens,
        cost = %state.usage.estimated_cost,
        "CLI session ended"
    );
    Ok(())
}
