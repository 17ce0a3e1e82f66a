use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unix timestamp in whole seconds (UTC).
///
/// All engine timestamps (submission, gate deadlines, resolutions,
/// outcomes) use this newtype so they compare and serialize uniformly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp())
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.0, 0).unwrap_or_default()
    }

    /// Shift forward by `secs` seconds.
    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs as i64))
    }

    /// Seconds elapsed since this timestamp; zero if in the future.
    pub fn age_secs(&self) -> u64 {
        (Timestamp::now().0 - self.0).max(0) as u64
    }
}
