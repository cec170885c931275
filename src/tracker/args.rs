use std::path::PathBuf;

use clap::Parser;
use tracing::level_filters::LevelFilter;

use super::DEFAULT_DATA_FILE;

#[derive(Parser, Debug)]
#[command(name = "focustime-tracker", version)]
#[command(about = "Tracks focused editor time, speaking line-delimited JSON over stdio")]
pub struct TrackerArgs {
    /// Storage directory provided by the host. By default tries $XDG_STATE_HOME or
    /// $HOME/.local/state
    #[arg(long)]
    pub dir: Option<PathBuf>,
    /// Name of the data file inside the storage directory.
    #[arg(long, default_value = DEFAULT_DATA_FILE)]
    pub file: String,
    /// Start as if the window isn't focused until the host says otherwise.
    #[arg(long)]
    pub unfocused: bool,
    /// Mirror logs to stderr. This option is for debugging purposes only.
    #[arg(long = "log-console")]
    pub log_console: bool,
    #[arg(long = "log-filter")]
    pub log: Option<LevelFilter>,
}
