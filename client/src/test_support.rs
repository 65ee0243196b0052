//! Shared fixtures for client tests.
//!
//! Compiled for unit tests and, through the `test-support` feature, for the
//! integration tests under `tests/`.

use std::sync::Mutex;

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{Item, ItemId};

/// Identity used by [`sample_item`].
pub const SAMPLE_ITEM_ID: Uuid = Uuid::from_u128(1);

/// Fixed instant used as the default creation date in fixtures.
pub fn fixed_instant() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single() {
        Some(instant) => instant,
        None => panic!("fixture timestamp is ambiguous"),
    }
}

/// Item `{SAMPLE_ITEM_ID, name, "", price}` created at [`fixed_instant`].
pub fn sample_item(name: &str, price: i64) -> Item {
    match Item::new(
        ItemId::from_uuid(SAMPLE_ITEM_ID),
        name,
        "",
        Decimal::from(price),
        fixed_instant(),
    ) {
        Ok(item) => item,
        Err(error) => panic!("invalid fixture item: {error}"),
    }
}

/// Clock whose time only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward.
    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Default for MutableClock {
    fn default() -> Self {
        Self::new(fixed_instant())
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}
