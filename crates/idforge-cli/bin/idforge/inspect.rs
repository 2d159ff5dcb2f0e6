use anyhow::anyhow;
use idforge_readable::ReadableId;
use idforge_snowflake::SnowflakeId;
use jiff::Timestamp;
use std::fmt::Write;

/// Renders the fields packed into a snowflake id counted from `epoch`.
pub fn describe_snowflake(raw: u64, epoch: Timestamp) -> anyhow::Result<String> {
    let id = SnowflakeId::from_u64(raw).ok_or_else(|| anyhow!("{raw} is not a snowflake id"))?;
    let issued = id
        .instant(epoch)
        .ok_or_else(|| anyhow!("{raw} lies outside the supported time range for {epoch}"))?;

    let mut out = String::new();
    writeln!(out, "timestamp:     {} ms after {epoch}", id.timestamp())?;
    writeln!(out, "issued at:     {issued}")?;
    writeln!(out, "datacenter id: {}", id.datacenter_id())?;
    writeln!(out, "machine id:    {}", id.machine_id())?;
    writeln!(out, "sequence:      {}", id.sequence())?;
    Ok(out)
}

/// Renders the fields encoded in a readable id.
pub fn describe_readable(raw: &str) -> anyhow::Result<String> {
    let parts = ReadableId::parse(raw)?.parts();

    let mut out = String::new();
    writeln!(out, "machine:  {}", parts.machine)?;
    writeln!(out, "app:      {}", parts.app)?;
    writeln!(out, "sequence: {}", parts.sequence)?;
    writeln!(out, "time:     {}", parts.date_time()?)?;
    Ok(out)
}
