use crate::models::{LoanDecision, OfferRecommendation};
use crate::session::{Message, Role, OPERATOR, REVIEWERS, REVIEWER_GREETING};
use std::collections::BTreeSet;

/// Case-insensitive substring that routes a submission to the assistant.
/// Anything else is recorded in the transcript but left unanswered.
pub const ASSISTANT_KEYWORD: &str = "metaai";

const SYSTEM_PROMPT: &str = "You are an AI assistant that helps business users understand the \
     outputs of ML/AI models. You explain model decisions, clarify features, and answer \
     follow-up questions in clear, non-technical language.";

const GREETING: &str = "Hello! I am MetaAI. Like metadata explains data, I explain ML/AI model \
     output to users. Ask me about any model decision, or generate a prediction on the left to \
     have it explained.";

/// Side effect a state transition asks the caller to run. Keeps the session
/// logic free of any HTTP or UI concern.
#[derive(Debug, Clone)]
pub enum Effect {
    ExplainLoan(LoanDecision),
    ExplainOffer(OfferRecommendation),
    CompleteChat(Vec<Message>),
}

/// Session-scoped context: transcript, review participants, and the latest
/// generated records. Owned by the app; one logical thread mutates it.
pub struct SessionState {
    messages: Vec<Message>,
    active_participant: String,
    invited: BTreeSet<&'static str>,
    latest_loan: Option<LoanDecision>,
    latest_offer: Option<OfferRecommendation>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            messages: Self::bootstrap(),
            active_participant: OPERATOR.to_string(),
            invited: BTreeSet::new(),
            latest_loan: None,
            latest_offer: None,
        }
    }

    fn bootstrap() -> Vec<Message> {
        vec![Message::system(SYSTEM_PROMPT), Message::assistant(GREETING)]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn active_participant(&self) -> &str {
        &self.active_participant
    }

    pub fn latest_loan(&self) -> Option<&LoanDecision> {
        self.latest_loan.as_ref()
    }

    pub fn latest_offer(&self) -> Option<&OfferRecommendation> {
        self.latest_offer.as_ref()
    }

    /// Resets the transcript to the two-message bootstrap. Invited reviewers,
    /// the active participant, and the latest records survive a clear.
    pub fn clear_transcript(&mut self) {
        self.messages = Self::bootstrap();
    }

    /// Records a free-text submission under the active participant's prefix.
    /// Returns a completion effect only when the text mentions the assistant.
    pub fn submit(&mut self, text: &str) -> Option<Effect> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let author = self.active_participant.clone();
        self.messages
            .push(Message::user(format!("{author}: {text}"), author));

        if text.to_ascii_lowercase().contains(ASSISTANT_KEYWORD) {
            Some(Effect::CompleteChat(self.messages.clone()))
        } else {
            None
        }
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// Overwrites the latest slot, logs the user-authored summary, and asks
    /// for an explanation.
    pub fn record_loan(&mut self, decision: LoanDecision) -> Effect {
        self.messages.push(Message::user(
            format!("{OPERATOR}: {}", decision.summary()),
            OPERATOR,
        ));
        self.latest_loan = Some(decision.clone());
        Effect::ExplainLoan(decision)
    }

    pub fn record_offer(&mut self, recommendation: OfferRecommendation) -> Effect {
        self.messages.push(Message::user(
            format!("{OPERATOR}: {}", recommendation.summary()),
            OPERATOR,
        ));
        self.latest_offer = Some(recommendation.clone());
        Effect::ExplainOffer(recommendation)
    }

    pub fn can_invite(&self, name: &str) -> bool {
        REVIEWERS.iter().any(|reviewer| *reviewer == name)
            && !self.invited.iter().any(|invited| *invited == name)
    }

    /// One-shot invitation: adds the reviewer, makes them the active
    /// participant, and appends their greeting. Idempotent after first use.
    pub fn invite(&mut self, name: &str) -> bool {
        let Some(reviewer) = REVIEWERS.iter().copied().find(|reviewer| *reviewer == name) else {
            return false;
        };
        if !self.invited.insert(reviewer) {
            return false;
        }

        self.active_participant = reviewer.to_string();
        self.messages.push(Message::user(
            format!("{reviewer}: {REVIEWER_GREETING}"),
            reviewer,
        ));
        true
    }

    pub fn participant_options(&self) -> Vec<String> {
        let mut options = vec![OPERATOR.to_string()];
        options.extend(self.invited.iter().map(|invited| invited.to_string()));
        options
    }

    pub fn has_invited_reviewers(&self) -> bool {
        !self.invited.is_empty()
    }

    /// Changes which prefix subsequent submissions carry. History is never
    /// rewritten. Unknown names are ignored.
    pub fn set_active_participant(&mut self, name: &str) {
        if self.participant_options().iter().any(|option| option == name) {
            self.active_participant = name.to_string();
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
