//! Lookup orchestration with a bounded first wait.
//!
//! Flow:
//! 1. Spawn the downloader lookup as its own task.
//! 2. Wait up to [`FAST_PATH_BUDGET`] for it. Cached lookups finish here
//!    without any visible side effects.
//! 3. Otherwise start typing, post [`BUILDING_NOTICE`], and wait for the same
//!    task without bound. The notice is retracted whether the task succeeds
//!    or fails.
//! 4. `NoSuchVersion` becomes [`CommandError::UnknownVersion`].

#[path = "lookup_tests.rs"]
mod lookup_tests;

use tokio::task::{JoinError, JoinHandle};
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use crate::context::ChatContext;
use crate::downloader::{LookupRequest, LookupResponse, MappingDownloader};
use crate::error::{CommandError, Result};
use crate::mapping::MappingEntry;

/// How long a lookup may take before the user is told to wait.
pub const FAST_PATH_BUDGET: Duration = Duration::from_millis(500);

pub const BUILDING_NOTICE: &str = "Building mappings database, this may take a moment.";

type PendingLookup = JoinHandle<anyhow::Result<LookupResponse>>;

/// Run `request` against `downloader` and return the matching entries.
pub async fn resolve<C, D>(ctx: &C, downloader: &D, request: LookupRequest) -> Result<Vec<MappingEntry>>
where
    C: ChatContext,
    D: MappingDownloader + ?Sized,
{
    let version = request.version.clone();
    debug!(
        "Looking up '{}' for version {} (type: {:?})",
        request.name, version, request.kind
    );

    let mut pending: PendingLookup = tokio::spawn(downloader.lookup(request));

    let response = match timeout(FAST_PATH_BUDGET, &mut pending).await {
        Ok(joined) => flatten(joined)?,
        Err(_) => {
            info!("Lookup for version {} exceeded {:?}, waiting it out", version, FAST_PATH_BUDGET);
            wait_slow(ctx, pending).await?
        }
    };

    match response {
        LookupResponse::Mappings(mappings) => {
            debug!("Lookup for version {} returned {} entries", version, mappings.len());
            Ok(mappings)
        }
        LookupResponse::NoSuchVersion => Err(CommandError::UnknownVersion(version)),
    }
}

async fn wait_slow<C: ChatContext>(ctx: &C, pending: PendingLookup) -> Result<LookupResponse> {
    let _typing = ctx.start_typing();
    let notice = ctx.reply(BUILDING_NOTICE).await.map_err(CommandError::Reply)?;

    let joined = pending.await;

    if let Err(e) = ctx.delete(notice).await {
        warn!("Failed to retract building notice {}: {}", notice.message_id, e);
    }

    flatten(joined)
}

fn flatten(joined: std::result::Result<anyhow::Result<LookupResponse>, JoinError>) -> Result<LookupResponse> {
    joined
        .map_err(|e| CommandError::LookupFailure(e.into()))?
        .map_err(CommandError::LookupFailure)
}
