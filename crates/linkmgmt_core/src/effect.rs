use std::time::Duration;

use crate::{JobId, LinkDraft, LinkId, LinkPatch};

/// Deferred work requested by `update`. Every variant except `CancelScrape`
/// and `Quit` produces exactly one result `Msg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadLinks,
    CreateLink(LinkDraft),
    UpdateLink { id: LinkId, patch: LinkPatch },
    DeleteLink { id: LinkId },
    StartScrape {
        job_id: JobId,
        url: String,
        timeout: Duration,
    },
    CancelScrape { job_id: JobId },
    Quit,
}
