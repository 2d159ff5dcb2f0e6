use clap::{Args, Parser, Subcommand};

pub const DATACENTER_ID_ENV: &str = "IDFORGE_DATACENTER_ID";
pub const MACHINE_ID_ENV: &str = "IDFORGE_MACHINE_ID";
pub const EPOCH_MS_ENV: &str = "IDFORGE_EPOCH_MS";
pub const APP_ID_ENV: &str = "IDFORGE_APP_ID";

#[derive(Debug, Parser)]
#[command(name = "idforge", about = "Generate and inspect unique identifiers")]
pub struct CLI {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate 64-bit snowflake ids.
    Snowflake(SnowflakeArgs),
    /// Generate 10 character readable ids.
    Readable(ReadableArgs),
    /// Print the fields packed into a snowflake id.
    InspectSnowflake {
        id: u64,
        #[arg(long, env = EPOCH_MS_ENV)]
        epoch_ms: Option<i64>,
    },
    /// Print the fields encoded in a readable id.
    InspectReadable { id: String },
    /// Convert between integers and base62.
    #[command(subcommand)]
    Base62(Base62Command),
}

#[derive(Debug, Args)]
pub struct SnowflakeArgs {
    #[arg(long, env = DATACENTER_ID_ENV, default_value_t = 0)]
    pub datacenter_id: u8,

    #[arg(long, env = MACHINE_ID_ENV, default_value_t = 0)]
    pub machine_id: u8,

    /// Custom epoch in milliseconds since the Unix epoch.
    #[arg(long, env = EPOCH_MS_ENV)]
    pub epoch_ms: Option<i64>,

    #[arg(long, short = 'n', default_value_t = 1)]
    pub count: usize,

    /// Print serial numbers with this prefix instead of bare ids.
    #[arg(long)]
    pub prefix: Option<String>,
}

#[derive(Debug, Args)]
pub struct ReadableArgs {
    #[arg(long, env = APP_ID_ENV)]
    pub app_id: Option<String>,

    #[arg(long, short = 'n', default_value_t = 1)]
    pub count: usize,
}

#[derive(Debug, Subcommand)]
pub enum Base62Command {
    Encode { value: u64 },
    Decode { value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_snowflake_flags() {
        let cli = CLI::try_parse_from([
            "idforge",
            "snowflake",
            "--datacenter-id",
            "3",
            "--machine-id",
            "1",
            "-n",
            "5",
        ])
        .unwrap();
        match cli.command {
            Command::Snowflake(args) => {
                assert_eq!(args.datacenter_id, 3);
                assert_eq!(args.machine_id, 1);
                assert_eq!(args.count, 5);
                assert!(args.prefix.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_base62_subcommands() {
        let cli = CLI::try_parse_from(["idforge", "base62", "decode", "10"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Base62(Base62Command::Decode { ref value }) if value == "10"
        ));
    }

    #[test]
    fn rejects_non_numeric_ids() {
        assert!(CLI::try_parse_from(["idforge", "snowflake", "--machine-id", "x"]).is_err());
    }
}
