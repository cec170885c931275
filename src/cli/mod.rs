pub mod output;
pub mod report;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use report::{process_day_command, process_week_command, ReportCommand};
use tracing::level_filters::LevelFilter;

use crate::{
    tracker::{start_tracker, TrackerConfig, DEFAULT_DATA_FILE},
    utils::{
        dir::create_application_default_path,
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Focustime", version, long_about = None)]
#[command(about = "Tracks how long your editor stays focused", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(
        about = "Run the tracker in the current console. The host editor talks to it through stdin and stdout"
    )]
    Serve {
        #[arg(
            long,
            help = "Storage directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
        )]
        dir: Option<PathBuf>,
        #[arg(long, default_value = DEFAULT_DATA_FILE, help = "Name of the data file")]
        file: String,
        #[arg(
            long,
            help = "Start as if the window isn't focused until the host says otherwise"
        )]
        unfocused: bool,
    },
    #[command(about = "Display focused minutes per day for a week, Monday to Sunday")]
    Week {
        #[command(flatten)]
        command: ReportCommand,
    },
    #[command(about = "Display focused minutes per hour for a day")]
    Day {
        #[command(flatten)]
        command: ReportCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };

    match args.commands {
        Commands::Serve {
            dir,
            file,
            unfocused,
        } => {
            let dir = dir.map_or_else(create_application_default_path, Ok)?;
            enable_logging(CLI_PREFIX, &dir.join("logs"), logging_level, args.log)?;
            start_tracker(serve_config(dir, &file, unfocused)).await
        }
        Commands::Week { command } => {
            let dir = command.storage_dir()?;
            enable_logging(CLI_PREFIX, &dir.join("logs"), logging_level, args.log)?;
            process_week_command(command).await
        }
        Commands::Day { command } => {
            let dir = command.storage_dir()?;
            enable_logging(CLI_PREFIX, &dir.join("logs"), logging_level, args.log)?;
            process_day_command(command).await
        }
    }
}

fn serve_config(dir: PathBuf, file: &str, unfocused: bool) -> TrackerConfig {
    TrackerConfig {
        start_focused: !unfocused,
        ..TrackerConfig::new(dir, file)
    }
}
