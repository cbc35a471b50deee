// ── Identity newtypes ──
//
// Event, booking and category ids share the backend's numeric id space
// but must never be confused with one another.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }
    };
}

numeric_id!(
    /// Server-assigned event id.
    EventId
);

numeric_id!(
    /// Booking id. Negative values are local placeholders that have not
    /// been reconciled with a server-assigned id yet.
    BookingId
);

numeric_id!(CategoryId);

/// Most recently issued placeholder id in this process.
static LAST_LOCAL: AtomicI64 = AtomicI64::new(0);

impl BookingId {
    /// Placeholder id derived from a millisecond timestamp.
    ///
    /// Ids are unique within the process: a timestamp that does not move
    /// past the previous one yields the next lower id instead.
    pub fn local(timestamp_ms: i64) -> Self {
        let candidate = -timestamp_ms.saturating_abs().max(1);
        let issued = |last: i64| candidate.min(last.saturating_sub(1));
        let previous = match LAST_LOCAL.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(issued(last))
        }) {
            Ok(last) | Err(last) => last,
        };
        Self(issued(previous))
    }

    pub fn is_local(self) -> bool {
        self.0 < 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn local_booking_ids_are_negative() {
        let id = BookingId::local(1_700_000_000_000);
        assert!(id.is_local());
        assert!(id.get() <= -1_700_000_000_000);
        assert!(!BookingId(12).is_local());
    }

    #[test]
    fn local_ids_from_the_same_millisecond_differ() {
        let ids: Vec<BookingId> = (0..5).map(|_| BookingId::local(1_750_000_000_000)).collect();
        for pair in ids.windows(2) {
            assert!(pair[1] < pair[0], "{ids:?}");
        }
        assert!(BookingId::local(0).is_local());
    }

    #[test]
    fn ids_serialize_as_bare_numbers() {
        assert_eq!(serde_json::to_string(&EventId(42)).unwrap(), "42");
        assert_eq!("  7 ".parse::<CategoryId>().unwrap(), CategoryId(7));
    }
}
