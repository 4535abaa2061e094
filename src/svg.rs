use serde::{Deserialize, Serialize};

use crate::calendar::CalendarSpan;
use crate::grid::GridLayout;
use crate::projection::{Precision, Tick, WeekBuckets};

const PADDING: u32 = 15;
const HEADER_HEIGHT: u32 = 40;
const HEADER_BASELINE: u32 = 28;
const CELL_GAP: u32 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

pub struct ThemeColors {
    pub bg: &'static str,
    pub text: &'static str,
    pub future: &'static str,
}

impl Theme {
    pub fn colors(self) -> ThemeColors {
        match self {
            Theme::Dark => ThemeColors {
                bg: "#161b22",
                text: "#c9d1d9",
                future: "#616e7f",
            },
            Theme::Light => ThemeColors {
                bg: "#ffffff",
                text: "#24292f",
                future: "#6a737d",
            },
        }
    }
}

/// What the calendar image shows.
pub struct CalendarView<'a> {
    pub weeks: &'a WeekBuckets,
    pub layout: GridLayout,
    pub accent: &'a str,
    /// `None` hides the percentage in the header.
    pub lived_percent: Option<f64>,
    /// Calendar time left until the end date.
    pub remaining: CalendarSpan,
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// "12345d 06h 07m 08s", or without seconds at minute precision.
pub fn countdown_line(tick: &Tick, precision: Precision) -> String {
    let c = &tick.countdown;
    if precision.shows_seconds() {
        format!("{}d {:02}h {:02}m {:02}s", c.days, c.hours, c.minutes, c.seconds)
    } else {
        format!("{}d {:02}h {:02}m", c.days, c.hours, c.minutes)
    }
}

fn header_text(view: &CalendarView) -> String {
    let weeks = format!(
        "{} of {} weeks lived, {} left",
        view.weeks.weeks_past, view.weeks.total_weeks, view.remaining
    );
    match view.lived_percent {
        Some(pct) => format!("{pct:.2}% · {weeks}"),
        None => weeks,
    }
}

fn build_cells(view: &CalendarView) -> String {
    let size = view.layout.cell_size.saturating_sub(CELL_GAP).max(1);
    let current = view.weeks.current();
    let mut out = String::new();

    for bucket in &view.weeks.buckets {
        let (x, y) = view.layout.cell_origin(bucket.index);
        let (x, y) = (x + PADDING, y + HEADER_HEIGHT);
        let class = if bucket.is_past {
            "past"
        } else if Some(bucket.index) == current {
            "now"
        } else {
            "future"
        };
        out.push_str(&format!(
            "<rect class=\"{class}\" x=\"{x}\" y=\"{y}\" width=\"{size}\" height=\"{size}\"/>\n"
        ));
    }

    out
}

/// Renders the week grid as a standalone SVG document.
pub fn generate_calendar_svg(view: &CalendarView, theme: Theme) -> String {
    let colors = theme.colors();
    let w = view.layout.width() + 2 * PADDING;
    let h = view.layout.height() + HEADER_HEIGHT + PADDING;
    let accent = escape_xml(view.accent);

    format!(
        r#"<?xml version='1.0' encoding='UTF-8'?>
<svg xmlns="http://www.w3.org/2000/svg"
     width="{w}px" height="{h}px"
     font-family="ConsolasFallback,Consolas,monospace"
     font-size="16px">

<style>
.past   {{ fill: {accent}; }}
.now    {{ fill: none; stroke: {accent}; stroke-width: 1; }}
.future {{ fill: none; stroke: {future}; stroke-width: 0.5; }}
</style>

<rect width="{w}px" height="{h}px" fill="{bg}" rx="15"/>

<text x="{PADDING}" y="{HEADER_BASELINE}" fill="{text}">{header}</text>

{cells}
</svg>
"#,
        w = w,
        h = h,
        bg = colors.bg,
        text = colors.text,
        future = colors.future,
        accent = accent,
        header = escape_xml(&header_text(view)),
        cells = build_cells(view)
    )
}
