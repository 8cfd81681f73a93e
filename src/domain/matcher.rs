//! Selecting which requests a user should see.

use std::cmp::Reverse;

use tracing::debug;

use crate::domain::BloodRequest;

/// Open requests from other users, newest first.
///
/// Only active requests not created by `current_user_id` are kept. Requests
/// without a creation time sort after every timestamped one, and ties keep
/// their source order.
pub fn matchable_requests<'a>(
    requests: &'a [BloodRequest],
    current_user_id: &str,
) -> Vec<&'a BloodRequest> {
    let mut matched: Vec<_> = requests
        .iter()
        .filter(|request| request.is_active() && !request.is_owned_by(current_user_id))
        .collect();
    newest_first(&mut matched);
    debug!(
        total = requests.len(),
        matched = matched.len(),
        "matched open requests"
    );
    matched
}

/// Every request created by `user_id`, in any status, newest first.
pub fn own_requests<'a>(requests: &'a [BloodRequest], user_id: &str) -> Vec<&'a BloodRequest> {
    let mut own: Vec<_> = requests
        .iter()
        .filter(|request| request.is_owned_by(user_id))
        .collect();
    newest_first(&mut own);
    own
}

fn newest_first(requests: &mut [&BloodRequest]) {
    // `None < Some(_)`, so reversing puts untimestamped requests last.
    requests.sort_by_key(|request| Reverse(request.created_at));
}

/// Re-runs [`matchable_requests`] over each snapshot of a live request feed.
///
/// The feed is any iterator of snapshots, e.g. one per change notification
/// from the backing store. Nothing is carried over from one snapshot to the
/// next.
#[derive(Debug)]
pub struct MatchFeed<I> {
    snapshots: I,
    current_user_id: String,
}

impl<I> MatchFeed<I> {
    /// Watch `snapshots` on behalf of `current_user_id`.
    pub fn new(snapshots: I, current_user_id: impl Into<String>) -> Self {
        Self {
            snapshots,
            current_user_id: current_user_id.into(),
        }
    }
}

impl<I> Iterator for MatchFeed<I>
where
    I: Iterator<Item = Vec<BloodRequest>>,
{
    type Item = Vec<BloodRequest>;

    fn next(&mut self) -> Option<Self::Item> {
        let snapshot = self.snapshots.next()?;
        Some(
            matchable_requests(&snapshot, &self.current_user_id)
                .into_iter()
                .cloned()
                .collect(),
        )
    }
}
