use crate::{
    error::Error,
    snowflake_id::{MAX_DATACENTER_ID, MAX_MACHINE_ID, MAX_SEQUENCE, MAX_TIMESTAMP},
    SnowflakeId,
};
use idforge_core::{Clock, IdGenerator, SystemClock};
use jiff::{tz::TimeZone, Timestamp};
use rand::Rng;
use std::sync::Mutex;
use tracing::{debug, error, trace};
use typed_builder::TypedBuilder;

/// Default epoch: 2018-01-01T00:00:00+08:00.
pub const DEFAULT_EPOCH: Timestamp = Timestamp::constant(1_514_736_000, 0);

// 2^56 - 1 has 17 decimal digits.
const MAX_DECIMAL_DIGITS: usize = 17;

/// Configures a Snowflake generator instance.
#[derive(Debug, Clone, TypedBuilder)]
pub struct SnowflakeSettings {
    /// Datacenter index in the range `[0, 7]`.
    #[builder]
    pub datacenter_id: u8,
    /// Machine index in the range `[0, 3]`, unique within the datacenter.
    #[builder]
    pub machine_id: u8,
    /// Custom epoch used as the zero point for the 41-bit timestamp field.
    #[builder(default = DEFAULT_EPOCH)]
    pub start_epoch: Timestamp,
    /// Zone used to render the date digits of fallback serial numbers.
    #[builder(default = TimeZone::system())]
    pub time_zone: TimeZone,
}

#[derive(Debug, Default)]
struct GeneratorState {
    last_millis: Option<i64>,
    sequence: u16,
}

/// Snowflake ID generator.
///
/// Every call to [`Snowflake::next_id`] runs under one lock. When the
/// 1024 sequence values of a millisecond run out, the call spins for the next
/// millisecond while still holding the lock, so all callers of the instance
/// stall with it.
///
/// Ids are unique across processes only if every running instance has its own
/// `(datacenter_id, machine_id)` pair. Nothing is persisted: after a restart
/// the same pair must not be reused until the clock has moved past the last
/// id issued before the restart.
pub struct Snowflake<C: Clock = SystemClock> {
    start_epoch: Timestamp,
    start_millis: i64,
    datacenter_id: u8,
    machine_id: u8,
    time_zone: TimeZone,
    clock: C,
    state: Mutex<GeneratorState>,
}

impl Snowflake<SystemClock> {
    /// Creates a generator backed by the real system clock.
    pub fn new(settings: SnowflakeSettings) -> Result<Self, Error> {
        Self::with_clock(settings, SystemClock)
    }
}

impl<C: Clock> Snowflake<C> {
    /// Creates a generator that reads time from `clock`.
    pub fn with_clock(settings: SnowflakeSettings, clock: C) -> Result<Self, Error> {
        if settings.datacenter_id > MAX_DATACENTER_ID {
            return Err(Error::InvalidDatacenterId {
                datacenter_id: settings.datacenter_id,
                max: MAX_DATACENTER_ID,
            });
        }
        if settings.machine_id > MAX_MACHINE_ID {
            return Err(Error::InvalidMachineId {
                machine_id: settings.machine_id,
                max: MAX_MACHINE_ID,
            });
        }

        let now = clock.now();
        if settings.start_epoch > now {
            return Err(Error::EpochAhead {
                epoch: settings.start_epoch,
                now,
            });
        }

        debug!(
            datacenter_id = settings.datacenter_id,
            machine_id = settings.machine_id,
            epoch = %settings.start_epoch,
            "created snowflake generator"
        );

        Ok(Self {
            start_epoch: settings.start_epoch,
            start_millis: settings.start_epoch.as_millisecond(),
            datacenter_id: settings.datacenter_id,
            machine_id: settings.machine_id,
            time_zone: settings.time_zone,
            clock,
            state: Mutex::new(GeneratorState::default()),
        })
    }

    pub fn datacenter_id(&self) -> u8 {
        self.datacenter_id
    }

    pub fn machine_id(&self) -> u8 {
        self.machine_id
    }

    /// The epoch the timestamp field counts from.
    pub fn start_epoch(&self) -> Timestamp {
        self.start_epoch
    }

    /// Generates the next unique id.
    ///
    /// - same millisecond as the last id: the sequence increments; on
    ///   overflow the call waits for the next millisecond and restarts at 0
    /// - later millisecond: the sequence restarts at 0
    /// - earlier millisecond: fails with [`Error::ClockMovedBackwards`] and
    ///   leaves the state untouched
    pub fn next_id(&self) -> Result<SnowflakeId, Error> {
        let mut state = self.state.lock().map_err(|_| Error::StatePoisoned)?;

        let mut now = self.clock.now().as_millisecond();

        let sequence = match state.last_millis {
            None => 0,
            Some(last) if now < last => {
                error!(now, last, "clock moved backwards, refusing to generate snowflake id");
                return Err(Error::ClockMovedBackwards { now, last });
            }
            Some(last) if now == last => {
                let next = (state.sequence + 1) & MAX_SEQUENCE;
                if next == 0 {
                    now = self.wait_next_millis(last)?;
                }
                next
            }
            Some(_) => 0,
        };

        // Milliseconds elapsed since the custom epoch.
        let elapsed = u64::try_from(now - self.start_millis).map_err(|_| {
            error!(
                now,
                epoch = self.start_millis,
                "clock is behind the generator epoch"
            );
            Error::ClockMovedBackwards {
                now,
                last: self.start_millis,
            }
        })?;
        if elapsed > MAX_TIMESTAMP {
            return Err(Error::OverTimeLimit);
        }

        state.last_millis = Some(now);
        state.sequence = sequence;

        Ok(SnowflakeId::new()
            .with_timestamp(elapsed)
            .with_datacenter_id(self.datacenter_id)
            .with_machine_id(self.machine_id)
            .with_sequence(sequence))
    }

    /// Generates ids until one renders with at least `min_digits` decimal
    /// digits.
    ///
    /// Shortly after the epoch ids are small; this trades a wait for a
    /// predictable width. `min_digits` is capped at the widest possible id.
    pub fn next_id_with_min_digits(&self, min_digits: usize) -> Result<SnowflakeId, Error> {
        let min_digits = min_digits.min(MAX_DECIMAL_DIGITS);
        loop {
            let id = self.next_id()?;
            if id.as_u64().to_string().len() >= min_digits {
                return Ok(id);
            }
        }
    }

    /// Returns `prefix` followed by the decimal form of the next id.
    ///
    /// If no id can be generated (for example after a clock regression) this
    /// logs the failure and returns `prefix` + `ddHHmmss` + five random
    /// digits instead. That fallback is only probabilistically unique and is
    /// not ordered: callers that need the strict guarantee must use
    /// [`Snowflake::next_id`].
    pub fn serial_number(&self, prefix: &str) -> String {
        match self.next_id() {
            Ok(id) => format!("{prefix}{id}"),
            Err(err) => {
                error!(
                    prefix,
                    error = %err,
                    "snowflake generation failed, using random serial number"
                );
                let time = self
                    .clock
                    .now()
                    .to_zoned(self.time_zone.clone())
                    .strftime("%d%H%M%S")
                    .to_string();
                let suffix: u32 = rand::rng().random_range(0..100_000);
                format!("{prefix}{time}{suffix:05}")
            }
        }
    }

    fn wait_next_millis(&self, last: i64) -> Result<i64, Error> {
        trace!(last, "sequence exhausted, waiting for next millisecond");
        let target = Timestamp::from_millisecond(last + 1).map_err(|_| Error::OverTimeLimit)?;
        loop {
            self.clock.wait_until(target);
            let now = self.clock.now().as_millisecond();
            if now > last {
                return Ok(now);
            }
        }
    }
}

impl<C: Clock> IdGenerator for Snowflake<C> {
    type Id = SnowflakeId;
    type Error = Error;

    fn generate(&self) -> Result<Self::Id, Self::Error> {
        self.next_id()
    }
}
