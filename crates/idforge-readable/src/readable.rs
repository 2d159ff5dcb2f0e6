use crate::{
    error::Error,
    host::{HostIdentity, NetworkInterfaces},
    ReadableId,
};
use idforge_core::{base62, Base62Error, Clock, IdGenerator, SystemClock};
use jiff::{civil::DateTime, tz::TimeZone, SignedDuration, Timestamp};
use std::sync::{Mutex, OnceLock};
use tracing::{debug, error, trace};
use typed_builder::TypedBuilder;

/// Year encoded as symbol `0`.
pub const START_YEAR: i16 = 2019;

/// Number of values a two symbol sequence can hold (62^2).
pub const MAX_SEQUENCE: u16 = 62 * 62;

/// App symbol used when no app id is given.
pub const DEFAULT_APP_SYMBOL: char = '0';

/// Configures a readable generator instance.
#[derive(Debug, Clone, TypedBuilder)]
pub struct ReadableSettings {
    /// Zone the timestamp symbols are rendered in.
    #[builder(default = TimeZone::system())]
    pub time_zone: TimeZone,
}

#[derive(Debug, Default)]
struct GeneratorState {
    /// Local time of the last issued id, truncated to the second.
    last_issued: Option<DateTime>,
    sequence: u16,
}

/// Readable ID generator with one-second resolution.
///
/// Up to `MAX_SEQUENCE - 1` ids are issued per second. The call that would
/// exceed that spins until the next second while holding the generator lock,
/// so every caller of the instance waits with it.
///
/// Ticks follow the rendered local time, not the epoch second. When a zone
/// repeats an hour (a DST fall-back) the sequence keeps counting through the
/// repeated seconds that were already used, and seconds that render earlier
/// than the last issued id are refused as a regression.
pub struct ReadableGenerator<H: HostIdentity = NetworkInterfaces, C: Clock = SystemClock> {
    host: H,
    clock: C,
    time_zone: TimeZone,
    machine_symbol: OnceLock<char>,
    state: Mutex<GeneratorState>,
}

impl ReadableGenerator<NetworkInterfaces, SystemClock> {
    /// Creates a generator that identifies the host by its network hardware
    /// and reads the system clock.
    pub fn new(settings: ReadableSettings) -> Self {
        Self::with_parts(settings, NetworkInterfaces, SystemClock)
    }
}

impl<H: HostIdentity> ReadableGenerator<H, SystemClock> {
    pub fn with_host(settings: ReadableSettings, host: H) -> Self {
        Self::with_parts(settings, host, SystemClock)
    }
}

impl<H: HostIdentity, C: Clock> ReadableGenerator<H, C> {
    pub fn with_parts(settings: ReadableSettings, host: H, clock: C) -> Self {
        Self {
            host,
            clock,
            time_zone: settings.time_zone,
            machine_symbol: OnceLock::new(),
            state: Mutex::new(GeneratorState::default()),
        }
    }

    /// The machine symbol, derived from the host on first use.
    pub fn machine_symbol(&self) -> Result<char, Error> {
        if let Some(&symbol) = self.machine_symbol.get() {
            return Ok(symbol);
        }
        // Racing first callers derive the same symbol; whichever lands first
        // is kept.
        let symbol = self.host.machine_symbol()?;
        Ok(*self.machine_symbol.get_or_init(|| symbol))
    }

    /// Generates the next id, tagged with `app_id` if given.
    ///
    /// `app_id` is read as a base62 number and reduced to one symbol in
    /// `1..=z`; a missing or blank app id uses [`DEFAULT_APP_SYMBOL`].
    pub fn next_id(&self, app_id: Option<&str>) -> Result<ReadableId, Error> {
        let machine = self.machine_symbol()?;
        let app = app_symbol(app_id)?;

        let mut state = self.state.lock().map_err(|_| Error::StatePoisoned)?;

        let mut now = self.render(self.clock.now());

        let sequence = match state.last_issued {
            None => 0,
            Some(last) if now < last => return Err(regression(now, last)),
            Some(last) if now == last => {
                let next = state.sequence + 1;
                if next >= MAX_SEQUENCE - 1 {
                    now = self.wait_next_second(last)?;
                    0
                } else {
                    next
                }
            }
            Some(_) => 0,
        };

        let id = ReadableId::assemble(machine, app, sequence, now)?;

        state.last_issued = Some(now);
        state.sequence = sequence;

        Ok(id)
    }

    /// Local time of `at` in the configured zone, truncated to the second.
    fn render(&self, at: Timestamp) -> DateTime {
        let civil = at.to_zoned(self.time_zone.clone()).datetime();
        civil.saturating_sub(SignedDuration::from_nanos(i64::from(
            civil.subsec_nanosecond(),
        )))
    }

    fn wait_next_second(&self, last: DateTime) -> Result<DateTime, Error> {
        trace!(%last, "sequence exhausted, waiting for next second");
        loop {
            let target = next_second(self.clock.now())?;
            self.clock.wait_until(target);
            let now = self.render(self.clock.now());
            if now > last {
                return Ok(now);
            }
            if now < last {
                return Err(regression(now, last));
            }
        }
    }
}

fn next_second(now: Timestamp) -> Result<Timestamp, Error> {
    now.as_second()
        .checked_add(1)
        .and_then(|second| Timestamp::from_second(second).ok())
        .ok_or(Error::OverTimeLimit)
}

fn regression(now: DateTime, last: DateTime) -> Error {
    error!(
        %now,
        %last,
        "clock moved backwards, refusing to generate readable id"
    );
    Error::ClockMovedBackwards { now, last }
}

/// Reduces an app id to a single symbol the same way host addresses are:
/// value mod 61, plus one.
fn app_symbol(app_id: Option<&str>) -> Result<char, Error> {
    let Some(app_id) = app_id.filter(|id| !id.trim().is_empty()) else {
        return Ok(DEFAULT_APP_SYMBOL);
    };

    // Reduce while folding so arbitrarily long app ids cannot overflow.
    let modulus = base62::BASE - 1;
    let reduced = app_id
        .chars()
        .enumerate()
        .try_fold(0u64, |acc, (position, symbol)| -> Result<u64, Base62Error> {
            let digit = base62::index_of(symbol)
                .ok_or(Base62Error::InvalidSymbol { symbol, position })?;
            Ok((acc * base62::BASE + u64::from(digit)) % modulus)
        })
        .map_err(Error::InvalidAppId)?;

    let symbol = base62::nonzero_symbol(reduced);
    debug!(app_id, symbol = %symbol, "derived app symbol");
    Ok(symbol)
}

impl<H: HostIdentity, C: Clock> IdGenerator for ReadableGenerator<H, C> {
    type Id = ReadableId;
    type Error = Error;

    fn generate(&self) -> Result<Self::Id, Self::Error> {
        self.next_id(None)
    }
}
