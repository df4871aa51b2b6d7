//! Error types for mapping command invocations

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, CommandError>;

/// Ways a mapping command invocation can fail.
///
/// An empty result set is not an error; it is rendered as an informational
/// reply instead.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("You do not have permission to update the default version!")]
    PermissionDenied,

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("No such version: {0}")]
    UnknownVersion(String),

    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("Usage error: {0}")]
    Usage(String),

    #[error("The default version can only be set inside a guild.")]
    NotInGuild,

    #[error("Command `{0}` has no storage attached")]
    NotInitialized(String),

    #[error("Mapping lookup failed: {0}")]
    LookupFailure(#[source] anyhow::Error),

    #[error("Failed to send reply: {0}")]
    Reply(#[source] anyhow::Error),
}

impl CommandError {
    /// True for errors caused by the invoking user, which are shown back to
    /// them verbatim. Everything else is fatal for the invocation.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied
                | Self::InvalidVersion(_)
                | Self::UnknownVersion(_)
                | Self::MissingArgument(_)
                | Self::Usage(_)
                | Self::NotInGuild
        )
    }
}
