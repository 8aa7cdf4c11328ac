use std::fmt;

/// Machine-readable error codes for scripts and agents driving `chores`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    ItemNotFound,
    InvalidPosition,
    EmptyText,
    CorruptStore,
    StorageWriteFailed,
    StorageUnavailable,
    LockContention,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::ItemNotFound => "E2001",
            Self::InvalidPosition => "E2002",
            Self::EmptyText => "E2003",
            Self::CorruptStore => "E3003",
            Self::StorageWriteFailed => "E5001",
            Self::LockContention => "E5002",
            Self::StorageUnavailable => "E5003",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::ItemNotFound => "Item not found",
            Self::InvalidPosition => "Position out of range",
            Self::EmptyText => "Item text is empty",
            Self::CorruptStore => "Stored list could not be decoded",
            Self::StorageWriteFailed => "Storage write failed",
            Self::StorageUnavailable => "Storage unavailable",
            Self::LockContention => "Lock contention",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to users and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in ~/.config/chores/config.toml and retry."),
            Self::ItemNotFound => Some("Run `chores list` to see current keys."),
            Self::InvalidPosition => Some("Positions start at 1; run `chores list` to see them."),
            Self::EmptyText => Some("Provide some non-whitespace text."),
            Self::CorruptStore => {
                Some("Inspect the database with sqlite3 or point --db at a fresh file.")
            }
            Self::StorageWriteFailed => Some("Check disk space and write permissions."),
            Self::StorageUnavailable => Some("Check that the database path is reachable."),
            Self::LockContention => Some("Retry after the other `chores` process exits."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
