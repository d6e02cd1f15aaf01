//! Simulation clock for the Hamlet simulation.
//!
//! The clock is the single source of truth for all temporal state. It
//! tracks the tick counter and the simulation time in milliseconds; the
//! in-game hour and time of day are derived from the latter and never stored
//! independently.
//!
//! All temporal derivations use checked arithmetic (no silent overflow).

use chrono::NaiveTime;

use crate::config::TimeConfig;

/// Hours in one in-game day.
pub(crate) const HOURS_PER_DAY: u64 = 24;

/// Real seconds in one in-game hour, used to map onto [`NaiveTime`].
const SECONDS_PER_HOUR: u64 = 3_600;

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Tick counter or simulation time would overflow.
    #[error("clock overflow: cannot advance beyond u64::MAX")]
    Overflow,

    /// Invalid time configuration (e.g. zero milliseconds per hour).
    #[error("invalid time configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Simulation clock.
///
/// Advanced once per tick by the tick's delta. In-game time starts at
/// `start_hour` and one in-game hour lasts `ms_per_game_hour` simulation
/// milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimClock {
    /// Ticks completed so far.
    tick: u64,
    /// Simulation time in milliseconds.
    now_ms: u64,
    /// In-game hour at `now_ms == 0`.
    start_hour: u8,
    /// Simulation milliseconds per in-game hour (at least 1).
    ms_per_game_hour: u64,
}

impl SimClock {
    /// Create a clock at tick 0, time 0.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `ms_per_game_hour` is zero
    /// or `start_hour` is not below 24.
    pub fn new(config: &TimeConfig) -> Result<Self, ClockError> {
        Self::from_parts(0, 0, config.start_hour, config.ms_per_game_hour)
    }

    /// Create a clock from explicit parameters (useful for testing and
    /// state restoration).
    ///
    /// # Errors
    ///
    /// Same as [`SimClock::new`].
    pub fn from_parts(
        tick: u64,
        now_ms: u64,
        start_hour: u8,
        ms_per_game_hour: u64,
    ) -> Result<Self, ClockError> {
        if ms_per_game_hour == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "ms_per_game_hour must be at least 1".to_owned(),
            });
        }
        if u64::from(start_hour) >= HOURS_PER_DAY {
            return Err(ClockError::InvalidConfig {
                reason: "start_hour must be below 24".to_owned(),
            });
        }
        Ok(Self {
            tick,
            now_ms,
            start_hour,
            ms_per_game_hour,
        })
    }

    /// Advance by one tick of `delta_ms`. Returns the new simulation time.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Overflow`] if the tick counter or the time would
    /// exceed `u64::MAX`. The clock is unchanged on error.
    pub fn advance(&mut self, delta_ms: u64) -> Result<u64, ClockError> {
        let tick = self.tick.checked_add(1).ok_or(ClockError::Overflow)?;
        let now_ms = self.now_ms.checked_add(delta_ms).ok_or(ClockError::Overflow)?;
        self.tick = tick;
        self.now_ms = now_ms;
        Ok(now_ms)
    }

    /// Ticks completed so far.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulation time in milliseconds.
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Simulation milliseconds since in-game midnight of day 0.
    fn ms_since_first_midnight(&self) -> u64 {
        u64::from(self.start_hour)
            .saturating_mul(self.ms_per_game_hour)
            .saturating_add(self.now_ms)
    }

    /// Simulation milliseconds per in-game day.
    fn ms_per_day(&self) -> u64 {
        self.ms_per_game_hour.saturating_mul(HOURS_PER_DAY)
    }

    /// Whole in-game days elapsed since day 0.
    pub fn day(&self) -> u64 {
        self.ms_since_first_midnight()
            .checked_div(self.ms_per_day())
            .unwrap_or(0)
    }

    /// Current in-game hour in `0..24`.
    pub fn hour(&self) -> u8 {
        let hours = self
            .ms_since_first_midnight()
            .checked_div(self.ms_per_game_hour)
            .unwrap_or(0);
        let hour = hours.checked_rem(HOURS_PER_DAY).unwrap_or(0);
        u8::try_from(hour).unwrap_or(0)
    }

    /// Current in-game time of day with second precision.
    pub fn time_of_day(&self) -> NaiveTime {
        let into_day = self
            .ms_since_first_midnight()
            .checked_rem(self.ms_per_day())
            .unwrap_or(0);
        let seconds = u128::from(into_day)
            .saturating_mul(u128::from(SECONDS_PER_HOUR))
            .checked_div(u128::from(self.ms_per_game_hour))
            .unwrap_or(0);
        u32::try_from(seconds)
            .ok()
            .and_then(|secs| NaiveTime::from_num_seconds_from_midnight_opt(secs, 0))
            .unwrap_or(NaiveTime::MIN)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn clock(start_hour: u8, ms_per_hour: u64) -> SimClock {
        SimClock::from_parts(0, 0, start_hour, ms_per_hour).unwrap()
    }

    #[test]
    fn new_clock_starts_at_zero() {
        let c = SimClock::new(&TimeConfig::default()).unwrap();
        assert_eq!(c.tick(), 0);
        assert_eq!(c.now_ms(), 0);
        assert_eq!(c.hour(), 6);
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(SimClock::from_parts(0, 0, 6, 0).is_err());
        assert!(SimClock::from_parts(0, 0, 24, 1_000).is_err());
    }

    #[test]
    fn advance_moves_tick_and_time() {
        let mut c = clock(0, 1_000);
        assert_eq!(c.advance(250).unwrap(), 250);
        assert_eq!(c.advance(250).unwrap(), 500);
        assert_eq!(c.tick(), 2);
    }

    #[test]
    fn advance_overflow_leaves_clock_unchanged() {
        let mut c = SimClock::from_parts(3, u64::MAX, 0, 1_000).unwrap();
        assert_eq!(c.advance(1), Err(ClockError::Overflow));
        assert_eq!(c.tick(), 3);
        assert_eq!(c.now_ms(), u64::MAX);
    }

    #[test]
    fn hour_wraps_at_midnight() {
        let mut c = clock(22, 1_000);
        assert_eq!(c.hour(), 22);
        c.advance(2_000).unwrap();
        assert_eq!(c.hour(), 0);
        assert_eq!(c.day(), 1);
        c.advance(5_500).unwrap();
        assert_eq!(c.hour(), 5);
    }

    #[test]
    fn time_of_day_has_minutes() {
        let mut c = clock(8, 1_000);
        c.advance(1_500).unwrap();
        assert_eq!(
            c.time_of_day(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
    }
}
