//! Overall status from per-channel classifications

use crate::types::SignalStatus;

/// Combine channel statuses into one verdict.
///
/// A failed fetch (`connectivity_ok == false`) always yields OFFLINE, since
/// whatever per-channel data is still around is stale. Otherwise the highest
/// precedence wins: CRITICAL > WARNING > OFFLINE > NO_DATA > NORMAL. An empty
/// set of channels is NO_DATA.
pub fn aggregate<I>(statuses: I, connectivity_ok: bool) -> SignalStatus
where
    I: IntoIterator<Item = SignalStatus>,
{
    if !connectivity_ok {
        return SignalStatus::Offline;
    }
    statuses
        .into_iter()
        .max_by_key(|s| s.precedence())
        .unwrap_or(SignalStatus::NoData)
}
