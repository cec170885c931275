use std::{fmt::Display, path::PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};

use crate::{
    tracker::{
        query::{current_week, hourly_breakdown},
        storage::{entities::SessionStore, session_storage::JsonFileStorage},
        DEFAULT_DATA_FILE,
    },
    utils::{dir::create_application_default_path, time::day_key},
};

use super::{
    output::{render_day, render_week},
    Args,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct ReportCommand {
    #[arg(
        long,
        help = "Storage directory. By default tries to read from $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long, default_value = DEFAULT_DATA_FILE, help = "Name of the data file")]
    file: String,
    #[arg(
        long,
        short,
        help = "Day to report on, today by default. Examples are \"yesterday\", \"last monday\", \"15/03/2025\""
    )]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

impl ReportCommand {
    pub fn storage_dir(&self) -> Result<PathBuf> {
        self.dir
            .clone()
            .map_or_else(create_application_default_path, Ok)
    }

    fn target_date(&self) -> Result<NaiveDate> {
        parse_target_date(self.date.as_deref(), self.date_style)
    }

    async fn load_store(&self) -> Result<SessionStore> {
        let storage = JsonFileStorage::new(self.storage_dir()?.join(&self.file))?;
        let store = storage
            .try_load()
            .await
            .with_context(|| format!("Can't read data from {:?}", storage.path()))?;
        Ok(store.unwrap_or_default())
    }
}

/// Command to process `week` command. Prints totals for the calendar week containing the
/// requested date.
pub async fn process_week_command(command: ReportCommand) -> Result<()> {
    let date = command.target_date()?;
    let store = command.load_store().await?;
    let view = current_week(&store, date);

    println!("Week of {}", view.dates[0]);
    print!("{}", render_week(&view));
    Ok(())
}

/// Command to process `day` command. Prints the hourly breakdown of the requested date.
pub async fn process_day_command(command: ReportCommand) -> Result<()> {
    let date = command.target_date()?;
    let store = command.load_store().await?;
    let key = day_key(date);
    let view = hourly_breakdown(&store, &key);

    println!("{key}");
    print!("{}", render_day(&view));
    Ok(())
}

fn parse_target_date(date: Option<&str>, date_style: DateStyle) -> Result<NaiveDate> {
    let now = Local::now();
    match date.map(|s| parse_date_string(s, now, date_style.into())) {
        Some(Ok(v)) => Ok(v.date_naive()),
        Some(Err(e)) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate date {e}"),
            )
            .into()),
        None => Ok(now.date_naive()),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{Local, NaiveDate};
    use tempfile::tempdir;

    use crate::tracker::storage::{
        entities::SessionStore,
        session_storage::{JsonFileStorage, SessionStorage},
    };

    use super::{parse_target_date, DateStyle, ReportCommand};

    #[test]
    fn test_parse_target_date_styles() -> Result<()> {
        assert_eq!(
            parse_target_date(Some("04/03/2024"), DateStyle::Uk)?,
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
        );
        assert_eq!(
            parse_target_date(Some("03/04/2024"), DateStyle::Us)?,
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
        );
        assert_eq!(parse_target_date(None, DateStyle::Uk)?, Local::now().date_naive());
        assert!(parse_target_date(Some("not a date at all"), DateStyle::Uk).is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_load_store_from_directory() -> Result<()> {
        let dir = tempdir()?;
        let mut store = SessionStore::new();
        store.day_mut("2024-03-04").add_second(10);
        JsonFileStorage::new(dir.path().join("data.json"))?
            .save(&store)
            .await?;

        let command = ReportCommand {
            dir: Some(dir.path().to_path_buf()),
            file: "data.json".into(),
            date: None,
            date_style: DateStyle::Uk,
        };

        assert_eq!(command.load_store().await?, store);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_store_reports_corrupt_file() -> Result<()> {
        let dir = tempdir()?;
        std::fs::write(dir.path().join("data.json"), "[1, 2")?;

        let command = ReportCommand {
            dir: Some(dir.path().to_path_buf()),
            file: "data.json".into(),
            date: None,
            date_style: DateStyle::Uk,
        };

        assert!(command.load_store().await.is_err());
        Ok(())
    }
}
