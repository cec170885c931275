//! Terminal rendering of the chart views.

use std::fmt::Write;

use crate::tracker::query::{HourlyView, WeeklyView};

/// Length of the longest bar.
const BAR_WIDTH: u64 = 40;

/// Renders labels and minute values as horizontal bars scaled to the largest value.
pub fn render_bars<'a>(labels: impl IntoIterator<Item = &'a str>, values: &[u64]) -> String {
    let labels = labels.into_iter().collect::<Vec<_>>();
    let label_width = labels.iter().map(|v| v.chars().count()).max().unwrap_or(0);
    let max = values.iter().copied().max().unwrap_or(0);

    let mut output = String::new();
    for (label, value) in labels.iter().zip(values) {
        let length = if max == 0 { 0 } else { value * BAR_WIDTH / max };
        let padding = label_width - label.chars().count();
        // Writing into a String can't fail.
        let _ = writeln!(
            output,
            "{label}{}  {} {}",
            " ".repeat(padding),
            "#".repeat(length as usize),
            format_minutes(*value)
        );
    }
    output
}

pub fn render_week(view: &WeeklyView) -> String {
    let mut output = render_bars(view.days.iter().map(String::as_str), &view.values);
    let total = view.values.iter().sum::<u64>();
    let _ = writeln!(output, "Total {}", format_minutes(total));
    output
}

pub fn render_day(view: &HourlyView) -> String {
    let mut output = render_bars(view.hours.iter().map(String::as_str), &view.values);
    let total = view.values.iter().sum::<u64>();
    let _ = writeln!(output, "Total {}", format_minutes(total));
    output
}

fn format_minutes(minutes: u64) -> String {
    if minutes >= 60 {
        format!("{}h{}m", minutes / 60, minutes % 60)
    } else {
        format!("{minutes}m")
    }
}
