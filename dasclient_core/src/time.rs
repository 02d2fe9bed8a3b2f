use std::{fmt, time::Duration};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A UTC instant. Serialized as an RFC 3339 string.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_epoch_secs(epoch_secs: i64) -> Option<Self> {
        DateTime::from_timestamp(epoch_secs, 0).map(Self)
    }

    pub fn to_rfc3339(self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn checked_add(self, duration: Duration) -> Option<Self> {
        let chrono_duration = chrono::Duration::from_std(duration).ok()?;
        self.0.checked_add_signed(chrono_duration).map(Self)
    }

    pub fn checked_sub(self, duration: Duration) -> Option<Self> {
        let chrono_duration = chrono::Duration::from_std(duration).ok()?;
        self.0.checked_sub_signed(chrono_duration).map(Self)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::Timestamp;

    fn epoch(secs: i64) -> Timestamp {
        Timestamp::from_epoch_secs(secs).expect("valid epoch")
    }

    #[test]
    fn rfc3339_uses_utc_designator() {
        assert_eq!(epoch(1_700_000_000).to_rfc3339(), "2023-11-14T22:13:20Z");
    }

    #[test]
    fn serde_reads_offsets_as_utc() {
        let parsed: Timestamp =
            serde_json::from_str("\"2023-11-15T00:13:20+02:00\"").expect("valid rfc3339");
        assert_eq!(parsed, epoch(1_700_000_000));
    }

    #[test]
    fn checked_arithmetic_moves_both_ways() {
        let ts = epoch(1_000);
        let later = ts.checked_add(Duration::from_secs(90)).expect("in range");
        let earlier = ts.checked_sub(Duration::from_secs(30)).expect("in range");

        assert_eq!(later, epoch(1_090));
        assert_eq!(earlier, epoch(970));
    }
}
