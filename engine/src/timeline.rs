//! Point-in-time queries over a computed schedule: what is unlocked now, what
//! can still be claimed, and when the next unlock happens.

use chrono::TimeDelta;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{Amount, ComputedSchedule, Timestamp, RELEASE_AMOUNT_DP};

/// A discrete unlock: `amount` becomes available at `at`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockEvent {
    pub at: Timestamp,
    pub amount: Amount,
}

impl ComputedSchedule {
    /// Amount unlocked at `now`.
    ///
    /// Rules:
    /// - before the cliff instant: 0
    /// - at the cliff: the cliff amount
    /// - afterwards: cliff amount plus `completed / n` of the remainder,
    ///   rounded down at six decimals
    /// - at or after the projected end: the full total
    ///
    /// `release_amount` is rounded up for display and never summed here, so
    /// schedules with millions of tiny releases do not unlock early.
    pub fn vested_at(&self, now: Timestamp) -> Amount {
        let total = self.amount_to_be_vested;
        if now < self.cliff_date_time {
            return Decimal::ZERO;
        }
        if now >= self.projected_end_date_time {
            return total;
        }

        let linear = self.linear_share(self.completed_releases(now));
        self.cliff_amount
            .checked_add(linear)
            .map_or(self.cliff_amount, |vested| vested.min(total).normalize())
    }

    /// Unlocked but not yet claimed at `now`; never negative.
    pub fn claimable_at(&self, now: Timestamp, already_claimed: Amount) -> Amount {
        (self.vested_at(now) - already_claimed)
            .max(Decimal::ZERO)
            .normalize()
    }

    /// Unlocked share of the total at `now`, in `[0, 1]`.
    pub fn progress_at(&self, now: Timestamp) -> Decimal {
        self.vested_at(now)
            .checked_div(self.amount_to_be_vested)
            .map_or(Decimal::ZERO, |p| p.normalize())
    }

    /// First unlock strictly after `now`, or `None` once everything is vested.
    pub fn next_unlock_after(&self, now: Timestamp) -> Option<UnlockEvent> {
        let vested_now = self.vested_at(now);
        if vested_now >= self.amount_to_be_vested {
            return None;
        }

        let first = if now < self.cliff_date_time {
            0
        } else {
            let completed = self.completed_releases(now);
            (completed + 1).max(self.first_release_raising(completed))
        };
        (first..=self.number_of_releases).find_map(|i| {
            let at = self.release_date(i)?;
            let amount = self.vested_at(at) - vested_now;
            (at > now && amount > Decimal::ZERO).then_some(UnlockEvent { at, amount })
        })
    }

    /// Instant of the `i`-th release; release 0 is the cliff itself.
    pub fn release_date(&self, i: u64) -> Option<Timestamp> {
        let offset = i.checked_mul(self.interval_seconds)?;
        let delta = TimeDelta::try_seconds(i64::try_from(offset).ok()?)?;
        self.cliff_date_time.checked_add_signed(delta)
    }

    /// Lower bound on the first release index whose linear share exceeds that
    /// of `completed`. Dense schedules move by less than one unit of the last
    /// decimal per release, so scanning release by release would be slow.
    fn first_release_raising(&self, completed: u64) -> u64 {
        let n = self.number_of_releases;
        let pool = self.amount_to_be_vested - self.cliff_amount;
        if pool <= Decimal::ZERO {
            return completed + 1;
        }
        let target = self.linear_share(completed) + Decimal::new(1, RELEASE_AMOUNT_DP);
        target
            .checked_mul(Decimal::from(n))
            .and_then(|scaled| scaled.checked_div(pool))
            .and_then(|k| k.ceil().to_u64())
            // Division rounding may overshoot by one.
            .map_or(completed + 1, |k| k.saturating_sub(1).min(n))
    }

    /// `(total - cliff) * completed / n`, truncated at six decimals.
    fn linear_share(&self, completed: u64) -> Amount {
        let n = self.number_of_releases;
        if completed == 0 || n == 0 {
            return Decimal::ZERO;
        }
        let pool = (self.amount_to_be_vested - self.cliff_amount).max(Decimal::ZERO);
        if completed >= n {
            return pool;
        }

        let (completed, n) = (Decimal::from(completed), Decimal::from(n));
        pool.checked_mul(completed)
            .and_then(|scaled| scaled.checked_div(n))
            .or_else(|| pool.checked_div(n)?.checked_mul(completed))
            .map_or(Decimal::ZERO, |share| {
                share
                    .round_dp_with_strategy(RELEASE_AMOUNT_DP, RoundingStrategy::ToZero)
                    .min(pool)
            })
    }

    fn completed_releases(&self, now: Timestamp) -> u64 {
        if now < self.cliff_date_time || self.interval_seconds == 0 {
            return 0;
        }
        let elapsed = (now - self.cliff_date_time).num_seconds().unsigned_abs();
        (elapsed / self.interval_seconds).min(self.number_of_releases)
    }
}

/* ---------------------------------- TESTS ---------------------------------- */
