mod cli;
mod inspect;

use crate::cli::{Base62Command, Command, ReadableArgs, SnowflakeArgs, CLI};
use anyhow::Context;
use clap::Parser;
use idforge_core::{base62, IdGenerator};
use idforge_readable::{ReadableGenerator, ReadableSettings};
use idforge_snowflake::{Snowflake, SnowflakeSettings, DEFAULT_EPOCH};
use jiff::Timestamp;
use std::fmt::Display;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = CLI::parse();

    match config.command {
        Command::Snowflake(args) => run_snowflake(args),
        Command::Readable(args) => run_readable(args),
        Command::InspectSnowflake { id, epoch_ms } => {
            print!("{}", inspect::describe_snowflake(id, epoch_from_millis(epoch_ms)?)?);
            Ok(())
        }
        Command::InspectReadable { id } => {
            print!("{}", inspect::describe_readable(&id)?);
            Ok(())
        }
        Command::Base62(Base62Command::Encode { value }) => {
            println!("{}", base62::encode(value));
            Ok(())
        }
        Command::Base62(Base62Command::Decode { value }) => {
            println!("{}", base62::decode(&value)?);
            Ok(())
        }
    }
}

fn epoch_from_millis(epoch_ms: Option<i64>) -> anyhow::Result<Timestamp> {
    match epoch_ms {
        Some(ms) => Timestamp::from_millisecond(ms).context("invalid epoch"),
        None => Ok(DEFAULT_EPOCH),
    }
}

fn run_snowflake(args: SnowflakeArgs) -> anyhow::Result<()> {
    let settings = SnowflakeSettings::builder()
        .datacenter_id(args.datacenter_id)
        .machine_id(args.machine_id)
        .start_epoch(epoch_from_millis(args.epoch_ms)?)
        .build();

    info!(
        datacenter_id = settings.datacenter_id,
        machine_id = settings.machine_id,
        epoch = %settings.start_epoch,
        count = args.count,
        "generating snowflake ids"
    );

    let generator = Snowflake::new(settings)?;
    match args.prefix {
        Some(prefix) => {
            for _ in 0..args.count {
                println!("{}", generator.serial_number(&prefix));
            }
            Ok(())
        }
        None => print_ids(&generator, args.count),
    }
}

fn run_readable(args: ReadableArgs) -> anyhow::Result<()> {
    let generator = ReadableGenerator::new(ReadableSettings::builder().build());
    let machine = generator.machine_symbol()?;

    info!(
        machine = %machine,
        app_id = args.app_id.as_deref().unwrap_or_default(),
        count = args.count,
        "generating readable ids"
    );

    match args.app_id.as_deref() {
        Some(app_id) => {
            for _ in 0..args.count {
                println!("{}", generator.next_id(Some(app_id))?);
            }
            Ok(())
        }
        None => print_ids(&generator, args.count),
    }
}

fn print_ids<G>(generator: &G, count: usize) -> anyhow::Result<()>
where
    G: IdGenerator,
    G::Id: Display,
{
    for _ in 0..count {
        println!("{}", generator.generate()?);
    }
    Ok(())
}
