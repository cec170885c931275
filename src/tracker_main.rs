use anyhow::Result;
use clap::Parser;
use focustime::{
    tracker::{args::TrackerArgs, start_tracker, TrackerConfig},
    utils::{
        dir::create_application_default_path,
        logging::{enable_logging, TRACKER_PREFIX},
        runtime::single_thread_runtime,
    },
};
use tracing::error;

fn main() -> Result<()> {
    run(TrackerArgs::parse())
}

fn run(args: TrackerArgs) -> Result<()> {
    let app_dir = args.dir.map_or_else(create_application_default_path, Ok)?;
    enable_logging(TRACKER_PREFIX, &app_dir.join("logs"), args.log, args.log_console)?;

    let config = TrackerConfig {
        start_focused: !args.unfocused,
        ..TrackerConfig::new(app_dir, &args.file)
    };

    let runtime = single_thread_runtime()?;
    let result = runtime
        .block_on(start_tracker(config))
        .inspect_err(|e| error!("Tracker stopped with an error {e:?}"));
    // Reading stdin happens on a blocking thread that can't be interrupted, don't wait for it.
    runtime.shutdown_background();
    result
}
