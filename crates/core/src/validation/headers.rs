//! Header-based entity classification for freshly parsed sheets.

use crate::entity::EntityKind;

/// Normalized header names that must all be present for each kind.
pub const CLIENT_REQUIRED_HEADERS: &[&str] = &["clientid", "clientname", "prioritylevel"];
pub const WORKER_REQUIRED_HEADERS: &[&str] = &["workerid", "workername", "skills"];
pub const TASK_REQUIRED_HEADERS: &[&str] = &["taskid", "taskname", "duration"];

/// Required header set for a kind.
pub fn required_headers(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Clients => CLIENT_REQUIRED_HEADERS,
        EntityKind::Workers => WORKER_REQUIRED_HEADERS,
        EntityKind::Tasks => TASK_REQUIRED_HEADERS,
    }
}

/// Classify a header row into an entity kind.
///
/// Headers are trimmed and lowercased. Kinds are tried in the fixed order
/// clients, workers, tasks; the first kind whose required headers are all
/// present wins, so a sheet carrying both client and worker columns is
/// classified as clients.
pub fn classify_headers<S: AsRef<str>>(headers: &[S]) -> Option<EntityKind> {
    let normalized: Vec<String> = headers
        .iter()
        .map(|h| h.as_ref().trim().to_lowercase())
        .collect();

    EntityKind::ALL.into_iter().find(|kind| {
        required_headers(*kind)
            .iter()
            .all(|required| normalized.iter().any(|h| h == required))
    })
}
