#[derive(Debug, Clone)]
pub enum AppEvent {
    ExplanationReady(String),
    AssistantReply(String),
    RequestFailed(String),
}
