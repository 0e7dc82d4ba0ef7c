use std::{fmt::Display, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Largest hour value the time entry accepts.
pub const MAX_INCREMENT_HOURS: u8 = 23;
/// Largest minute value the time entry accepts.
pub const MAX_INCREMENT_MINUTES: u8 = 59;

const MINUTES_IN_HOUR: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubjectId(Uuid);

impl SubjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw shape of the time types on the wire. Deserialization goes through the validating
/// constructors, so out of range values are rejected instead of stored.
#[derive(Deserialize)]
struct RawTime<H> {
    hours: H,
    minutes: u32,
}

/// Accumulated time. Minutes are always kept in `0..=59`, everything above is carried into hours.
/// Hours saturate at [u64::MAX].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawTime<u64>")]
pub struct TimeSpent {
    hours: u64,
    minutes: u32,
}

impl TimeSpent {
    pub const ZERO: TimeSpent = TimeSpent {
        hours: 0,
        minutes: 0,
    };

    /// Returns `None` when `minutes` would break the normalization.
    pub fn new_opt(hours: u64, minutes: u32) -> Option<Self> {
        if minutes > MAX_INCREMENT_MINUTES as u32 {
            None
        } else {
            Some(Self { hours, minutes })
        }
    }

    pub fn from_total_minutes(total: u64) -> Self {
        Self {
            hours: total / MINUTES_IN_HOUR,
            minutes: (total % MINUTES_IN_HOUR) as u32,
        }
    }

    pub fn hours(&self) -> u64 {
        self.hours
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn total_minutes(&self) -> u64 {
        self.hours
            .saturating_mul(MINUTES_IN_HOUR)
            .saturating_add(self.minutes as u64)
    }

    /// Folds an entered increment into the total. Minutes overflowing the hour are carried.
    pub fn accumulate(self, increment: TimeIncrement) -> Self {
        let minutes = self.minutes + increment.minutes as u32;
        Self {
            hours: self
                .hours
                .saturating_add(increment.hours as u64)
                .saturating_add((minutes / 60) as u64),
            minutes: minutes % 60,
        }
    }
}

impl TryFrom<RawTime<u64>> for TimeSpent {
    type Error = String;

    fn try_from(RawTime { hours, minutes }: RawTime<u64>) -> Result<Self, Self::Error> {
        Self::new_opt(hours, minutes)
            .ok_or_else(|| format!("{minutes} minutes don't fit into an hour"))
    }
}

impl Display for TimeSpent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} hr {} min", self.hours, self.minutes)
    }
}

/// A single time entry as picked by the user. Construction enforces the picker's range, so
/// anything holding a [TimeIncrement] can be accumulated without further checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawTime<u32>")]
pub struct TimeIncrement {
    hours: u8,
    minutes: u8,
}

impl TimeIncrement {
    pub const ZERO: TimeIncrement = TimeIncrement {
        hours: 0,
        minutes: 0,
    };

    pub fn new_opt(hours: u8, minutes: u8) -> Option<Self> {
        if hours > MAX_INCREMENT_HOURS || minutes > MAX_INCREMENT_MINUTES {
            None
        } else {
            Some(Self { hours, minutes })
        }
    }

    pub fn hours(&self) -> u8 {
        self.hours
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }
}

impl TryFrom<RawTime<u32>> for TimeIncrement {
    type Error = String;

    fn try_from(RawTime { hours, minutes }: RawTime<u32>) -> Result<Self, Self::Error> {
        u8::try_from(hours)
            .ok()
            .zip(u8::try_from(minutes).ok())
            .and_then(|(hours, minutes)| Self::new_opt(hours, minutes))
            .ok_or_else(|| format!("{hours} hr {minutes} min is outside of the time entry range"))
    }
}

impl Display for TimeIncrement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} hr {} min", self.hours, self.minutes)
    }
}

/// Something the user tracks time against. Identity, name and creation moment never change after
/// creation; only the accumulated time does, and only through [Subject::log].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    id: SubjectId,
    name: Arc<str>,
    time: TimeSpent,
    created_at: DateTime<Utc>,
}

impl Subject {
    pub fn new(name: impl Into<Arc<str>>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: SubjectId::new(),
            name: name.into(),
            time: TimeSpent::ZERO,
            created_at,
        }
    }

    pub fn with_time(self, time: TimeSpent) -> Self {
        Self { time, ..self }
    }

    pub fn id(&self) -> SubjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn time(&self) -> TimeSpent {
        self.time
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) fn log(&mut self, increment: TimeIncrement) -> TimeSpent {
        self.time = self.time.accumulate(increment);
        self.time
    }
}
