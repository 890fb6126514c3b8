//! Lead profile and the fixed answer sets offered by the wizard.

use serde::{Deserialize, Serialize};

/// Primary fitness goal, asked on the lead-capture form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Goal {
    BuildMuscle,
    LoseFat,
    ImproveEndurance,
    GetInShape,
}

impl Goal {
    pub const ALL: [Goal; 4] = [
        Goal::BuildMuscle,
        Goal::LoseFat,
        Goal::ImproveEndurance,
        Goal::GetInShape,
    ];

    /// Label shown to the user and embedded in prompts.
    pub fn label(self) -> &'static str {
        match self {
            Self::BuildMuscle => "🏋️‍♂️ Build muscle",
            Self::LoseFat => "🔥 Lose fat",
            Self::ImproveEndurance => "🏃‍♀️ Improve endurance",
            Self::GetInShape => "💪 Get in shape overall",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::BuildMuscle => "build_muscle",
            Self::LoseFat => "lose_fat",
            Self::ImproveEndurance => "improve_endurance",
            Self::GetInShape => "get_in_shape",
        }
    }
}

/// What the lead says is holding them back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Struggle {
    NotEnoughTime,
    Diet,
    Motivation,
    UnsureWhatWorks,
}

impl Struggle {
    pub const ALL: [Struggle; 4] = [
        Struggle::NotEnoughTime,
        Struggle::Diet,
        Struggle::Motivation,
        Struggle::UnsureWhatWorks,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::NotEnoughTime => "⏳ Not enough time",
            Self::Diet => "🥗 Struggle with diet",
            Self::Motivation => "💡 Lack of motivation",
            Self::UnsureWhatWorks => "🤷 Not sure what works for me",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::NotEnoughTime => "not_enough_time",
            Self::Diet => "diet",
            Self::Motivation => "motivation",
            Self::UnsureWhatWorks => "unsure_what_works",
        }
    }
}

/// When the lead wants to start seeing results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Timeline {
    Asap,
    WithinMonth,
    TwoToThreeMonths,
}

impl Timeline {
    pub const ALL: [Timeline; 3] = [
        Timeline::Asap,
        Timeline::WithinMonth,
        Timeline::TwoToThreeMonths,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Asap => "✅ ASAP",
            Self::WithinMonth => "🗓️ Within a month",
            Self::TwoToThreeMonths => "📅 In 2–3 months",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Asap => "asap",
            Self::WithinMonth => "within_month",
            Self::TwoToThreeMonths => "two_to_three_months",
        }
    }
}

/// Error returned when a string is neither an option key nor its label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{input}' is not one of the {kind} options")]
pub struct UnknownOption {
    pub kind: &'static str,
    pub input: String,
}

fn parse_option<T: Copy>(
    kind: &'static str,
    input: &str,
    all: &[T],
    key: fn(T) -> &'static str,
    label: fn(T) -> &'static str,
) -> Result<T, UnknownOption> {
    let trimmed = input.trim();
    all.iter()
        .copied()
        .find(|o| key(*o) == trimmed || label(*o) == trimmed)
        .ok_or_else(|| UnknownOption {
            kind,
            input: input.to_string(),
        })
}

impl std::str::FromStr for Goal {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_option("goal", s, &Self::ALL, Self::key, Self::label)
    }
}

impl std::str::FromStr for Struggle {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_option("struggle", s, &Self::ALL, Self::key, Self::label)
    }
}

impl std::str::FromStr for Timeline {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_option("timeline", s, &Self::ALL, Self::key, Self::label)
    }
}

impl TryFrom<String> for Goal {
    type Error = UnknownOption;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl TryFrom<String> for Struggle {
    type Error = UnknownOption;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl TryFrom<String> for Timeline {
    type Error = UnknownOption;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl std::fmt::Display for Goal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::fmt::Display for Struggle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::fmt::Display for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Contact details and answers collected across the wizard.
///
/// Fields fill in step by step and are complete once the summary step is
/// reached. Start Over resets the whole profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<Goal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub struggle: Option<Struggle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<Timeline>,
}

impl LeadProfile {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The three answers the summary is written from, once all are captured.
    pub fn answers(&self) -> Option<(Goal, Struggle, Timeline)> {
        Some((self.goal?, self.struggle?, self.timeline?))
    }
}

/// One selectable option as exposed to the widget.
#[derive(Debug, Clone, Serialize)]
pub struct OptionView {
    pub key: &'static str,
    pub label: &'static str,
}

/// All option sets, for rendering the form controls.
#[derive(Debug, Clone, Serialize)]
pub struct OptionSets {
    pub goals: Vec<OptionView>,
    pub struggles: Vec<OptionView>,
    pub timelines: Vec<OptionView>,
}

impl OptionSets {
    pub fn all() -> Self {
        Self {
            goals: Goal::ALL
                .iter()
                .map(|g| OptionView {
                    key: g.key(),
                    label: g.label(),
                })
                .collect(),
            struggles: Struggle::ALL
                .iter()
                .map(|s| OptionView {
                    key: s.key(),
                    label: s.label(),
                })
                .collect(),
            timelines: Timeline::ALL
                .iter()
                .map(|t| OptionView {
                    key: t.key(),
                    label: t.label(),
                })
                .collect(),
        }
    }
}
