//! Reporting failed command invocations.
//!
//! User errors are echoed back to the channel. Fatal errors are logged at a
//! level that depends on whether the underlying Discord failure is permanent,
//! and the user gets a generic apology.

use mappings_command::{ChatContext, CommandError};
use serenity::http::HttpError;
use tracing::{error, warn};

pub const GENERIC_FAILURE: &str = "Something went wrong while running that command.";

/// How a Discord API failure should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorOutcome {
    /// The request can never succeed (missing access, unknown channel, ...).
    Permanent,
    /// Network trouble, rate limits, server errors.
    Transient,
}

/// Classify a serenity error by HTTP status.
pub fn classify(err: &serenity::Error) -> ErrorOutcome {
    match err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(resp)) => {
            classify_status(resp.status_code.as_u16())
        }
        _ => ErrorOutcome::Transient,
    }
}

fn classify_status(status: u16) -> ErrorOutcome {
    match status {
        429 => ErrorOutcome::Transient,
        400..=499 => ErrorOutcome::Permanent,
        _ => ErrorOutcome::Transient,
    }
}

/// Find the serenity error behind an anyhow chain, if any.
fn serenity_cause(err: &anyhow::Error) -> Option<&serenity::Error> {
    err.chain().find_map(|cause| cause.downcast_ref::<serenity::Error>())
}

/// Tell the user what went wrong with `command`, logging fatal errors.
pub async fn report<C: ChatContext>(ctx: &C, command: &str, err: CommandError) {
    if err.is_user_error() {
        if let Err(e) = ctx.reply(&err.to_string()).await {
            warn!("Failed to report error for '{}': {}", command, e);
        }
        return;
    }

    match &err {
        CommandError::Reply(cause) => {
            match serenity_cause(cause).map(classify) {
                Some(ErrorOutcome::Permanent) => {
                    // The channel rejects us; replying would fail the same way
                    error!("'{}' could not reply [permanent]: {:#}", command, cause);
                    return;
                }
                _ => warn!("'{}' could not reply [transient]: {:#}", command, cause),
            }
        }
        CommandError::LookupFailure(cause) => {
            error!("'{}' lookup failed: {:#}", command, cause);
        }
        other => error!("'{}' failed: {}", command, other),
    }

    if let Err(e) = ctx.reply(GENERIC_FAILURE).await {
        warn!("Failed to report error for '{}': {}", command, e);
    }
}
