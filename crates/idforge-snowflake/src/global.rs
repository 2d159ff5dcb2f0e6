//! Optional process-wide default generator.
//!
//! Prefer constructing a [`Snowflake`] and passing it to callers. When a
//! shared default is still wanted it is installed once, explicitly, at
//! startup; there is no implicit lazily-created instance.

use crate::{error::Error, Snowflake, SnowflakeSettings};
use std::sync::OnceLock;
use tracing::info;

static DEFAULT: OnceLock<Snowflake> = OnceLock::new();

/// Installs the default generator. Fails if one is already installed.
pub fn init(settings: SnowflakeSettings) -> Result<&'static Snowflake, Error> {
    let datacenter_id = settings.datacenter_id;
    let machine_id = settings.machine_id;
    let generator = Snowflake::new(settings)?;
    DEFAULT
        .set(generator)
        .map_err(|_| Error::AlreadyInitialized)?;
    info!(datacenter_id, machine_id, "installed default snowflake generator");
    get().ok_or(Error::AlreadyInitialized)
}

/// Returns the default generator if [`init`] has run.
pub fn get() -> Option<&'static Snowflake> {
    DEFAULT.get()
}
