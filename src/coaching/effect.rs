//! Effects produced by state transitions

use super::event::Purpose;
use super::model::LeadProfile;
use crate::llm::CompletionRequest;

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Make one blocking completion call and feed the result back.
    RequestCompletion {
        purpose: Purpose,
        request: CompletionRequest,
    },

    /// Report a captured or confirmed lead to the log.
    RecordLead { profile: LeadProfile, confirmed: bool },
}

impl Effect {
    pub fn request(purpose: Purpose, request: CompletionRequest) -> Self {
        Effect::RequestCompletion { purpose, request }
    }

    pub fn record_lead(profile: &LeadProfile, confirmed: bool) -> Self {
        Effect::RecordLead {
            profile: profile.clone(),
            confirmed,
        }
    }
}
