use std::collections::HashSet;
use std::sync::Mutex;

use tracing::debug;

/// Users that currently have a product submission being persisted.
///
/// One instance is shared by every request, so a user cannot have two
/// submissions in flight at once even from different connections.
#[derive(Debug, Default)]
pub struct InFlightSubmissions {
    uids: Mutex<HashSet<String>>,
}

impl InFlightSubmissions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `uid` as submitting until the returned guard is dropped.
    ///
    /// `None` if `uid` already has a submission in flight.
    pub fn try_begin(&self, uid: &str) -> Option<InFlightGuard<'_>> {
        let mut uids = self.uids.lock().unwrap_or_else(|e| e.into_inner());
        if !uids.insert(uid.to_owned()) {
            debug!(uid, "Submission already in flight");
            return None;
        }
        Some(InFlightGuard {
            owner: self,
            uid: uid.to_owned(),
        })
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.uids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(uid)
    }
}

/// Releases the user's slot in [`InFlightSubmissions`] on drop.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    owner: &'a InFlightSubmissions,
    uid: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.owner
            .uids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.uid);
    }
}
