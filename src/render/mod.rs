//! Text rendering of reconciled months.
//!
//! Produces a fixed-width report: a summary block, one table row per day
//! (date, category glyph, overtime, official worked, secondary worked, diff,
//! anomaly marker) and a totals row. Styling is passed in through
//! [`RenderContext`]; nothing here touches process-wide state.

use std::fmt::Write as _;

use crate::config::RenderConfig;
use crate::models::{
    CalendarDate, DayCategory, MonthRecord, OfficialSnapshot, SecondarySnapshot,
};
use crate::reconcile::{MonthTotals, ReconciledDay, ReconciledMonth};

const RULE: &str = "-----------------------------------------------------------";
const LABEL_WIDTH: usize = 38;

/// ANSI styling, or none at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub enabled: bool,
}

impl Palette {
    pub fn plain() -> Self {
        Self { enabled: false }
    }

    pub fn ansi() -> Self {
        Self { enabled: true }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("\u{1b}[{}m{}\u{1b}[0m", code, text)
        } else {
            text.to_string()
        }
    }

    pub fn red(&self, text: &str) -> String {
        self.paint("91", text)
    }

    pub fn yellow(&self, text: &str) -> String {
        self.paint("93", text)
    }

    pub fn reverse(&self, text: &str) -> String {
        self.paint("7", text)
    }
}

/// Glyphs used for day categories and markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphSet {
    Emoji,
    Ascii,
}

impl GlyphSet {
    pub fn category(&self, category: DayCategory) -> &'static str {
        match (self, category) {
            (GlyphSet::Emoji, DayCategory::Holiday) => "🎉",
            (GlyphSet::Emoji, DayCategory::Vacation) => "🌴",
            (GlyphSet::Emoji, DayCategory::MedicalLeave) => "🩺",
            (GlyphSet::Emoji, DayCategory::CalendarAdjustment) => "📅",
            (GlyphSet::Emoji, DayCategory::Weekend) => "💤",
            (GlyphSet::Emoji, DayCategory::WorkDay) => "🚧",
            (GlyphSet::Emoji, DayCategory::Other) => "💩",
            (GlyphSet::Ascii, DayCategory::Holiday) => "H",
            (GlyphSet::Ascii, DayCategory::Vacation) => "V",
            (GlyphSet::Ascii, DayCategory::MedicalLeave) => "M",
            (GlyphSet::Ascii, DayCategory::CalendarAdjustment) => "C",
            (GlyphSet::Ascii, DayCategory::Weekend) => "-",
            (GlyphSet::Ascii, DayCategory::WorkDay) => "W",
            (GlyphSet::Ascii, DayCategory::Other) => "?",
        }
    }

    pub fn anomaly(&self) -> &'static str {
        match self {
            GlyphSet::Emoji => "⚡",
            GlyphSet::Ascii => "!",
        }
    }

    pub fn totals(&self) -> &'static str {
        match self {
            GlyphSet::Emoji => "🎲",
            GlyphSet::Ascii => "=",
        }
    }
}

/// Everything the renderer needs besides the data.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub palette: Palette,
    pub glyphs: GlyphSet,
    pub official_label: String,
    pub secondary_label: String,
    /// Row to highlight, normally the current date.
    pub today: Option<CalendarDate>,
}

impl RenderContext {
    pub fn from_config(config: &RenderConfig, today: Option<CalendarDate>) -> Self {
        Self {
            palette: Palette {
                enabled: config.color,
            },
            glyphs: if config.emoji {
                GlyphSet::Emoji
            } else {
                GlyphSet::Ascii
            },
            official_label: config.official_label.clone(),
            secondary_label: config.secondary_label.clone(),
            today,
        }
    }

    /// Uncoloured ASCII output with default labels.
    pub fn plain() -> Self {
        Self {
            palette: Palette::plain(),
            glyphs: GlyphSet::Ascii,
            official_label: "Official".to_string(),
            secondary_label: "Secondary".to_string(),
            today: None,
        }
    }

    pub fn with_today(mut self, today: CalendarDate) -> Self {
        self.today = Some(today);
        self
    }
}

/// Period details shown in the summary block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodMeta {
    pub fetch_date: String,
    pub fetch_time: String,
    pub month: String,
    pub year: String,
    pub month_worked: String,
    pub month_expected: String,
    pub secondary_total: String,
    pub year_overtime: String,
}

impl PeriodMeta {
    /// Collect header values for `month` of the official snapshot.
    pub fn from_snapshots(
        official: &OfficialSnapshot,
        month: &MonthRecord,
        secondary: &SecondarySnapshot,
    ) -> Self {
        Self {
            fetch_date: official.fetch_date.clone(),
            fetch_time: official.fetch_time.clone(),
            month: month.month.clone(),
            year: official.year.clone(),
            month_worked: month.worked_time_in_month.clone(),
            month_expected: month.expected_worked_time_in_month.clone(),
            secondary_total: secondary.summary.worked_time.clone(),
            year_overtime: official.overtime_in_year.clone(),
        }
    }
}

fn summary_line(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, " {:<width$}{}", label, value, width = LABEL_WIDTH);
}

fn render_header(out: &mut String, meta: &PeriodMeta, ctx: &RenderContext) {
    let _ = writeln!(out, "------------------------- Summary -------------------------");
    summary_line(
        out,
        "Last Remote Fetch:",
        &format!(
            "{} {}",
            ctx.palette.red(&meta.fetch_date),
            ctx.palette.red(&meta.fetch_time)
        ),
    );
    summary_line(out, "Reporting Date:", &format!("{} {}", meta.month, meta.year));
    summary_line(
        out,
        &format!("{} Monthly Worked Hours:", ctx.official_label),
        &format!("{} of {}", meta.month_worked, meta.month_expected),
    );
    summary_line(
        out,
        &format!("{} Yearly Worked Hours:", ctx.secondary_label),
        &meta.secondary_total,
    );
    summary_line(out, "This Year Overtime:", &meta.year_overtime);
    out.push('\n');
}

fn render_row(out: &mut String, day: &ReconciledDay, ctx: &RenderContext) {
    let mut date_cell = format!("{:<10}", day.date.as_str());
    if ctx.today.as_ref() == Some(&day.date) {
        date_cell = ctx.palette.reverse(&date_cell);
    }

    let marker = if day.anomaly {
        ctx.palette.yellow(ctx.glyphs.anomaly())
    } else {
        String::new()
    };

    let line = format!(
        " {} {} | {:<8} | {:<9} | {:<9} | {:<7} {}",
        date_cell,
        ctx.glyphs.category(day.category),
        day.official_overtime,
        day.official_worked,
        day.secondary_worked,
        day.diff,
        marker,
    );
    let _ = writeln!(out, "{}", line.trim_end());
}

fn render_totals(out: &mut String, totals: &MonthTotals, ctx: &RenderContext) {
    let line = format!(
        " {:<10} {} | {:<8} | {:<9} | {:<9} | {}",
        "",
        ctx.glyphs.totals(),
        totals.overtime,
        totals.official_worked,
        totals.secondary_worked,
        ctx.palette.red(&totals.diff.to_string()),
    );
    let _ = writeln!(out, "{}", line);
}

/// Render a reconciled month as a fixed-width report.
pub fn render(reconciled: &ReconciledMonth, meta: &PeriodMeta, ctx: &RenderContext) -> String {
    let mut out = String::new();

    render_header(&mut out, meta, ctx);

    let _ = writeln!(
        out,
        " {:<12} | {:<8} | {:<9} | {:<9} | Diff",
        "Date", "Overtime", ctx.official_label, ctx.secondary_label
    );
    let _ = writeln!(out, "{}", RULE);

    for day in &reconciled.days {
        render_row(&mut out, day, ctx);
    }

    let _ = writeln!(out, "{}", RULE);
    render_totals(&mut out, &reconciled.totals, ctx);

    out
}

/// Short "last available data" block covering both sources.
pub fn render_overview(
    official: &OfficialSnapshot,
    secondary: &SecondarySnapshot,
    ctx: &RenderContext,
) -> String {
    let mut out = String::new();
    let latest = official.monthly_data.last();

    let _ = writeln!(out, "========= Last Available Summary =========");
    let lines = [
        (
            "Last Update:".to_string(),
            format!(
                "{} {}",
                ctx.palette.red(&official.fetch_date),
                ctx.palette.red(&official.fetch_time)
            ),
        ),
        (
            "Reporting Date:".to_string(),
            latest
                .map(|m| format!("{} {}", m.month, official.year))
                .unwrap_or_default(),
        ),
        (
            "Required Hours:".to_string(),
            latest
                .map(|m| m.expected_worked_time_in_month.clone())
                .unwrap_or_default(),
        ),
        (
            format!("{} Clocked Time:", ctx.official_label),
            latest
                .map(|m| m.worked_time_in_month.clone())
                .unwrap_or_default(),
        ),
        (
            format!("{} Clocked Time:", ctx.secondary_label),
            secondary.summary.worked_time.clone(),
        ),
        (
            "Secondary Range:".to_string(),
            format!(
                "{} - {}",
                secondary.summary.reporting_date_from, secondary.summary.reporting_date_to
            ),
        ),
        (
            "Total Yearly Overtime:".to_string(),
            official.overtime_in_year.clone(),
        ),
    ];
    for (label, value) in lines {
        let _ = writeln!(out, " {:<24}{}", label, value);
    }
    out.push_str("==========================================");

    out
}
