use std::fs;

use anyhow::{Context, Result};
use chrono::Utc;
use memento::LiveClock;
use memento::Precision;
use memento::Tick;
use memento::calendar::calendar_span;
use memento::config::Settings;
use memento::grid::GridLayout;
use memento::svg::{self, CalendarView};
use tracing::info;
use tracing_subscriber::EnvFilter;

const CALENDAR_PATH: &str = "calendar.svg";

fn print_tick(tick: &Tick, precision: Precision, show_percent: bool) {
    let line = svg::countdown_line(tick, precision);
    if show_percent {
        println!("{line}  ({:.2}%)", tick.lived_percent);
    } else {
        println!("{line}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Settings path: first argument, else MEMENTO_CONFIG
    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => std::env::var("MEMENTO_CONFIG")
            .context("pass a settings path or set MEMENTO_CONFIG")?,
    };
    let settings =
        Settings::load(&path).with_context(|| format!("failed to load settings from {path}"))?;
    let projection = settings.projection()?;

    let now = Utc::now();
    let remaining = calendar_span(now.date_naive(), projection.end());
    info!("projected end {}, {remaining} left", projection.end());

    // Calendar
    let weeks = projection.week_buckets(now);
    let view = CalendarView {
        weeks: &weeks,
        layout: GridLayout::fit(weeks.total_weeks, settings.viewport),
        accent: &settings.accent_color,
        lived_percent: settings.show_percent.then(|| projection.lived_percent(now)),
        remaining,
    };
    fs::write(CALENDAR_PATH, svg::generate_calendar_svg(&view, settings.theme))
        .with_context(|| format!("failed to write {CALENDAR_PATH}"))?;
    println!("Generated {CALENDAR_PATH} ({:?} theme) successfully.", settings.theme);

    // Countdown
    let precision = settings.precision();
    let show_percent = settings.show_percent;
    let mut clock = LiveClock::new(precision);
    let subscription = clock.subscribe(move |tick| print_tick(tick, precision, show_percent));
    clock.configure(settings.birth_date, settings.lifespan_years)?;
    if let Some(tick) = clock.latest() {
        print_tick(&tick, precision, show_percent);
    }

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;

    subscription.unsubscribe();
    clock.teardown();

    Ok(())
}
