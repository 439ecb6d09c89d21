//! Tool outcomes
//!
//! Every tool call ends in exactly one [`ToolResult`]. Failures are values,
//! not errors: they are rendered into the same text channel as successes.

use crate::mcp::types::CallToolResult;

/// Failure taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Input matches several pages
    Ambiguous,
    /// No page for the title
    NotFound,
    /// Name absent from the catalog
    UnknownTool,
    /// Missing, unknown or mistyped argument
    Validation,
    /// Provider failure other than the two above
    Upstream,
    /// Fault inside the server while executing a call
    Internal,
}

impl FailureKind {
    /// Whether the failure is an answer the user can act on rather than a fault
    pub fn is_recoverable(self) -> bool {
        matches!(self, FailureKind::Ambiguous | FailureKind::NotFound)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolResult {
    Text(String),
    Failure {
        kind: FailureKind,
        message: String,
        /// Candidate titles, provider order; only set for [`FailureKind::Ambiguous`]
        suggestions: Vec<String>,
    },
}

impl ToolResult {
    pub fn text(body: impl Into<String>) -> Self {
        ToolResult::Text(body.into())
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        ToolResult::Failure {
            kind,
            message: message.into(),
            suggestions: Vec::new(),
        }
    }

    pub fn ambiguous(message: impl Into<String>, suggestions: Vec<String>) -> Self {
        ToolResult::Failure {
            kind: FailureKind::Ambiguous,
            message: message.into(),
            suggestions,
        }
    }

    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            ToolResult::Text(_) => None,
            ToolResult::Failure { kind, .. } => Some(*kind),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.kind().is_some()
    }

    pub fn suggestions(&self) -> &[String] {
        match self {
            ToolResult::Text(_) => &[],
            ToolResult::Failure { suggestions, .. } => suggestions,
        }
    }

    /// Render for `tools/call`
    ///
    /// Ambiguous and not-found outcomes read as ordinary answers; the other
    /// kinds carry an `Error:` prefix and set `isError`.
    pub fn into_call_result(self) -> CallToolResult {
        match self {
            ToolResult::Text(body) => CallToolResult::text(body),
            ToolResult::Failure { kind, message, .. } if kind.is_recoverable() => {
                CallToolResult::text(message)
            }
            ToolResult::Failure { message, .. } => CallToolResult::error(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_renders_plain() {
        let rendered = ToolResult::text("hello").into_call_result();
        assert!(!rendered.is_error);
        assert_eq!(rendered.text_content(), "hello");
    }

    #[test]
    fn test_not_found_is_not_flagged_as_error() {
        let rendered =
            ToolResult::failure(FailureKind::NotFound, "No Wikipedia page found for 'X'")
                .into_call_result();
        assert!(!rendered.is_error);
        assert_eq!(rendered.text_content(), "No Wikipedia page found for 'X'");
    }

    #[test]
    fn test_internal_failure_is_flagged() {
        let rendered = ToolResult::failure(FailureKind::Internal, "boom").into_call_result();
        assert!(rendered.is_error);
        assert_eq!(rendered.text_content(), "Error: boom");
    }

    #[test]
    fn test_accessors() {
        let result = ToolResult::ambiguous("pick one", vec!["A".into(), "B".into()]);
        assert_eq!(result.kind(), Some(FailureKind::Ambiguous));
        assert_eq!(result.suggestions(), ["A".to_string(), "B".to_string()]);
        assert!(ToolResult::text("ok").suggestions().is_empty());
    }
}
