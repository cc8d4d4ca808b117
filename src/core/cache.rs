//! Freshness policy for cached rate snapshots.

use chrono::NaiveDate;
use tracing::debug;

use super::currency::RateSnapshot;

/// Whether `snapshot` can be used as-is on `today`.
///
/// Fresh means fetched today, not older upstream than the fetch itself, and
/// carrying a rate for every known currency.
pub fn is_fresh(snapshot: &RateSnapshot, today: NaiveDate) -> bool {
    if snapshot.fetched_on != today {
        debug!(fetched_on = %snapshot.fetched_on, %today, "Rates not fetched today");
        return false;
    }
    if snapshot.provider_updated_on < snapshot.fetched_on {
        debug!(
            provider_updated_on = %snapshot.provider_updated_on,
            "Provider data predates the fetch"
        );
        return false;
    }
    if !snapshot.is_complete() {
        debug!("Rate snapshot is missing currencies");
        return false;
    }
    true
}
