//! Plain-text rendering of the dashboard screen.

use std::fmt::Write;

use weather_now_core::{
    Location, UnitPreference,
    view::{Body, DashboardView, Header, HourlyRows, NO_MORE_FORECAST, Screen},
};

const RULE: &str = "────────────────────────────────────────────────────────";

pub fn screen(screen: &Screen) -> String {
    let mut out = String::new();
    header(&mut out, &screen.header);

    match &screen.body {
        Body::Loading => {
            let _ = writeln!(out, "\n  Loading...");
        }
        Body::Failed {
            message,
            detail,
            retryable,
        } => {
            let _ = writeln!(out, "\n  🚫 Something went wrong");
            let _ = writeln!(out, "  {message}");
            let _ = writeln!(out, "  ({detail})");
            if *retryable {
                let _ = writeln!(out, "  ↻ Retry is available.");
            }
        }
        Body::Dashboard(view) => dashboard(&mut out, view),
    }

    out
}

fn header(out: &mut String, header: &Header) {
    let _ = writeln!(
        out,
        "☀️  {}    Units: {}    [{}]",
        header.title,
        units_summary(&header.units),
        header.toggle_label
    );
    let _ = writeln!(out, "{RULE}");
}

pub fn units_summary(units: &UnitPreference) -> String {
    format!(
        "{} · {} · {}",
        units.temp.symbol(),
        units.speed.symbol(),
        units.precip.symbol()
    )
}

fn dashboard(out: &mut String, view: &DashboardView) {
    let current = &view.current;
    let _ = writeln!(out, "\n  {}", current.location);
    let _ = writeln!(out, "  {}", current.date_line);
    let _ = writeln!(
        out,
        "  {}  {}°  {}",
        current.weather.icon.glyph(),
        current.temperature,
        current.weather.label
    );

    let _ = writeln!(out);
    for pair in view.details.chunks(2) {
        let line: Vec<String> = pair
            .iter()
            .map(|item| format!("{:<14}{:>10}", item.label, item.value))
            .collect();
        let _ = writeln!(out, "  {}", line.join("    "));
    }

    let _ = writeln!(out, "\nDaily forecast");
    let _ = writeln!(out, "{RULE}");
    let days: Vec<String> = view.daily.iter().map(|d| format!("{:<8}", d.day)).collect();
    let icons: Vec<String> = view
        .daily
        .iter()
        .map(|d| format!("{:<7}", d.weather.icon.glyph()))
        .collect();
    let temps: Vec<String> = view
        .daily
        .iter()
        .map(|d| format!("{:<8}", format!("{}°/{}°", d.max, d.min)))
        .collect();
    let _ = writeln!(out, "  {}", days.concat().trim_end());
    let _ = writeln!(out, "  {}", icons.concat().trim_end());
    let _ = writeln!(out, "  {}", temps.concat().trim_end());

    let _ = writeln!(out, "\nHourly forecast · {}", view.hourly.selected_name);
    let _ = writeln!(out, "{RULE}");
    match &view.hourly.rows {
        HourlyRows::Entries(rows) => {
            for row in rows {
                let _ = writeln!(
                    out,
                    "  {:>5}  {}  {:>4}°",
                    row.label.to_string(),
                    row.weather.icon.glyph(),
                    row.temperature
                );
            }
        }
        HourlyRows::NoMoreForecast => {
            let _ = writeln!(out, "  {NO_MORE_FORECAST}");
        }
    }
}

pub fn location_line(index: usize, location: &Location) -> String {
    format!(
        "{:>2}. {} ({:.4}, {:.4})",
        index + 1,
        location.display_name(),
        location.latitude,
        location.longitude
    )
}
