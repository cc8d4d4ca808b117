use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxpad::core::CurrencyCode;
use fxpad::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Keep rates, slots and history in memory only
    #[arg(short, long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxpad::AppCommand {
    fn from(cmd: Commands) -> fxpad::AppCommand {
        match cmd {
            Commands::Convert {
                expression,
                from,
                save,
            } => fxpad::AppCommand::Convert {
                expression,
                from,
                save,
            },
            Commands::Rates { refresh } => fxpad::AppCommand::Rates { refresh },
            Commands::History { restore } => fxpad::AppCommand::History { restore },
            Commands::Slots { replace, visible } => fxpad::AppCommand::Slots { replace, visible },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount, e.g. `fxpad convert "100+25,5" --from USD`
    Convert {
        /// Amount or arithmetic expression using + - * /
        #[arg(allow_hyphen_values = true)]
        expression: String,
        /// Currency the expression is in; defaults to the first slot
        #[arg(short, long)]
        from: Option<CurrencyCode>,
        /// Save the conversion to history
        #[arg(short, long)]
        save: bool,
    },
    /// Show the current exchange rates
    Rates {
        /// Fetch new rates even if the held ones are fresh
        #[arg(short, long)]
        refresh: bool,
    },
    /// Show saved conversions grouped by day
    History {
        /// Bring back the N-th most recent conversion
        #[arg(long, value_name = "N")]
        restore: Option<usize>,
    },
    /// Show or change the currency slots
    Slots {
        /// Replace a slot, e.g. `2=TRY`
        #[arg(long, value_name = "SLOT=CODE", value_parser = parse_slot)]
        replace: Option<(usize, CurrencyCode)>,
        /// Number of slots to show
        #[arg(long, value_name = "N")]
        visible: Option<usize>,
    },
}

fn parse_slot(value: &str) -> Result<(usize, CurrencyCode), String> {
    let (slot, code) = value
        .split_once('=')
        .ok_or_else(|| format!("expected SLOT=CODE, got `{value}`"))?;
    let slot = slot
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid slot `{slot}`: {e}"))?;
    let code = code.parse::<CurrencyCode>().map_err(|e| e.to_string())?;
    Ok((slot, code))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxpad::cli::setup::setup(),
        Some(cmd) => {
            fxpad::run_command(cmd.into(), cli.config_path.as_deref(), cli.ephemeral).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
