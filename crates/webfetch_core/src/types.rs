use std::fmt;
use std::time::Duration;

/// Result of one HTTP retrieval attempt.
///
/// Every failure path is a value of this type; the fetcher never propagates
/// errors past its boundary, so consumers need no error-handling scaffolding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success(FetchSuccess),
    Failure(FetchFailure),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }
}

/// A completed 2xx retrieval. The body is already charset-decoded text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSuccess {
    pub status_code: u16,
    pub content_type: Option<String>,
    pub body: String,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// DNS, connect, TLS, or transport failure.
    Network,
    /// The per-call deadline elapsed.
    Timeout,
    /// A response arrived with a non-2xx status.
    HttpStatus(u16),
    /// The body exceeded the configured size ceiling.
    TooLarge { max_bytes: u64, actual: Option<u64> },
    /// The document could not be processed.
    Parse,
    /// The request itself was unusable, e.g. an unparseable URL.
    InvalidInput,
}

impl FailureKind {
    /// Stable snake_case label used on the wire.
    pub fn label(&self) -> &'static str {
        match self {
            FailureKind::Network => "network",
            FailureKind::Timeout => "timeout",
            FailureKind::HttpStatus(_) => "http_status",
            FailureKind::TooLarge { .. } => "too_large",
            FailureKind::Parse => "parse",
            FailureKind::InvalidInput => "invalid_input",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Parse => write!(f, "parse error"),
            FailureKind::InvalidInput => write!(f, "invalid input"),
        }
    }
}
