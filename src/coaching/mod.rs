//! Coaching wizard: lead capture, personalised summary, meal plan, then chat.
//!
//! A visitor moves through six steps. Each user action goes through the pure
//! `transition` function; the `CoachController` executes the effects it
//! returns (LLM calls, lead logging) and feeds completions back in. Views are
//! rendered from the resulting state.

pub mod controller;
pub mod effect;
pub mod event;
pub mod model;
pub mod prompts;
pub mod state;
pub mod transition;
pub mod validation;
pub mod view;
pub mod voice;

pub use controller::{CoachController, Notice};
pub use event::{Event, Purpose, UserAction};
pub use model::{Goal, LeadProfile, OptionSets, Struggle, Timeline};
pub use state::{SessionState, Step, UsageTotals};
pub use transition::{TransitionContext, TransitionError};
pub use validation::{Field, ValidationError};
pub use view::{SessionView, ViewOptions};
