//! Follow-up conversation about one review.
//!
//! The transcript is append-only. A send appends the user turn immediately and
//! the assistant turn when the remote call settles; only one send may be in
//! flight per transcript. Every request carries the whole transcript, since
//! the service keeps no conversation state unless a `session_id` is given.

use crate::api::ReviewBackend;
use crate::error::Result;
use crate::types::{ChatMessage, ChatRequest, ChatResponse, ReviewResult};

/// Assistant turn appended when the remote call fails.
pub const CHAT_APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Clone)]
pub struct ChatSession {
    code: String,
    review_context: String,
    language: String,
    session_id: Option<String>,
    transcript: Vec<ChatMessage>,
    sending: bool,
}

impl ChatSession {
    /// Starts an empty conversation about `review` of `code`.
    pub fn new(review: &ReviewResult, code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            review_context: review_context(review),
            language: review.language.clone(),
            session_id: review.session_id.clone(),
            transcript: Vec::new(),
            sending: false,
        }
    }

    /// Seeds the transcript, e.g. with the messages of a server session.
    pub fn with_transcript(mut self, messages: Vec<ChatMessage>) -> Self {
        self.transcript = messages;
        self
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Appends the user turn and returns the request to send.
    ///
    /// Returns `None`, leaving the transcript untouched, when `text` is blank or
    /// a send is already in flight.
    pub fn begin_send(&mut self, text: &str) -> Option<ChatRequest> {
        let text = text.trim();
        if text.is_empty() || self.sending {
            return None;
        }
        self.transcript.push(ChatMessage::user(text));
        self.sending = true;
        Some(ChatRequest {
            code: self.code.clone(),
            review_context: self.review_context.clone(),
            messages: self.transcript.clone(),
            language: self.language.clone(),
            session_id: self.session_id.clone(),
        })
    }

    /// Appends the assistant turn for the in-flight send.
    ///
    /// Failures append [`CHAT_APOLOGY`]. Ignored when nothing is in flight.
    pub fn complete(&mut self, result: Result<ChatResponse>) {
        if !self.sending {
            return;
        }
        self.sending = false;
        let content = match result {
            Ok(resp) => resp.content,
            Err(e) => {
                tracing::warn!("chat failed: {e}");
                CHAT_APOLOGY.to_owned()
            }
        };
        self.transcript.push(ChatMessage::assistant(content));
    }

    /// Runs a whole send inline. Returns `false` if the send was rejected.
    pub async fn send<B: ReviewBackend>(&mut self, text: &str, backend: &B) -> bool {
        let Some(request) = self.begin_send(text) else {
            return false;
        };
        let result = backend.chat(&request).await;
        self.complete(result);
        true
    }
}

/// Plain-text summary of a review, sent as `review_context`.
pub fn review_context(review: &ReviewResult) -> String {
    let mut out = format!("Score: {}/10\nReasoning: {}", review.score, review.reasoning);
    if !review.issues.is_empty() {
        out.push_str("\nIssues:");
        for issue in &review.issues {
            out.push_str("\n- ");
            out.push_str(issue);
        }
    }
    if !review.suggestions.is_empty() {
        out.push_str("\nSuggestions:");
        for suggestion in &review.suggestions {
            out.push_str("\n- ");
            out.push_str(suggestion);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn context_lists_issues_and_suggestions() {
        let review = ReviewResult {
            score: 4,
            issues: vec!["eval is unsafe".into()],
            suggestions: vec!["use JSON.parse".into()],
            reasoning: "risky".into(),
            language: "javascript".into(),
            session_id: None,
        };
        assert_eq!(
            review_context(&review),
            "Score: 4/10\nReasoning: risky\nIssues:\n- eval is unsafe\nSuggestions:\n- use JSON.parse"
        );
    }
}
