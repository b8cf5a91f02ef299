//! SVG line chart of betas over time.

use crate::report::ReportError;
use chrono::NaiveDate;
use fremantle_beta::BetaTable;
use std::fmt::Write;

const WIDTH: f64 = 720.0;
const HEIGHT: f64 = 360.0;
const PADDING: f64 = 48.0;
const MAX_X_LABELS: usize = 8;
const Y_TICKS: usize = 5;
const PALETTE: [&str; 8] = [
    "#348dc1", "#ff9933", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
];

/// Default chart title.
pub const DEFAULT_TITLE: &str = "Stock Beta over time";

/// A line chart with one series per ticker, evaluation date on x and beta on y.
#[derive(Debug, Clone)]
pub struct BetaChart<'a> {
    table: &'a BetaTable,
    title: String,
    width: f64,
    height: f64,
}

impl<'a> BetaChart<'a> {
    /// Chart the given table with the default title and size.
    pub fn new(table: &'a BetaTable) -> Self {
        Self {
            table,
            title: DEFAULT_TITLE.to_string(),
            width: WIDTH,
            height: HEIGHT,
        }
    }

    /// Override the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Override the canvas size in pixels.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width.max(4.0 * PADDING);
        self.height = height.max(4.0 * PADDING);
        self
    }

    /// Render the chart as a standalone SVG document.
    pub fn to_svg(&self) -> Result<String, ReportError> {
        let dates = self.table.dates();
        let (first, last) = match (dates.iter().min(), dates.iter().max()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(ReportError::EmptyTable),
        };
        let (lo, hi) = self.table.range().ok_or(ReportError::EmptyTable)?;
        let (lo, hi) = widen(lo.min(1.0), hi.max(1.0));

        let frame = Frame {
            first,
            span_days: (last - first).num_days().max(0) as f64,
            lo,
            hi,
            width: self.width,
            height: self.height,
        };

        let mut svg = String::new();
        // Writing into a String cannot fail.
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><style>text{{font-family:Arial,sans-serif;font-size:10px;fill:#666}}</style>"#,
            w = self.width,
            h = self.height
        );
        let _ = write!(
            svg,
            r##"<rect x="0" y="0" width="{w}" height="{h}" fill="#ffffff" />"##,
            w = self.width,
            h = self.height
        );
        let _ = write!(
            svg,
            r##"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" font-size="14" fill="#333">{title}</text>"##,
            x = self.width / 2.0,
            y = PADDING / 2.0,
            title = escape(&self.title)
        );

        self.draw_axes(&mut svg, &frame, &dates);

        let one = frame.y(1.0);
        let _ = write!(
            svg,
            r##"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="#bbbbbb" stroke-width="1" stroke-dasharray="4 3" />"##,
            x1 = PADDING,
            x2 = self.width - PADDING,
            y = one
        );

        for (idx, ticker) in self.table.tickers().iter().enumerate() {
            let color = PALETTE[idx % PALETTE.len()];
            let points = self
                .table
                .series(ticker)
                .into_iter()
                .map(|(date, beta)| format!("{:.2},{:.2}", frame.x(date), frame.y(beta)))
                .collect::<Vec<_>>();
            if points.is_empty() {
                continue;
            }
            let _ = write!(
                svg,
                r#"<polyline fill="none" stroke="{color}" stroke-width="1.5" points="{points}" />"#,
                points = points.join(" ")
            );
        }

        self.draw_legend(&mut svg);
        svg.push_str("</svg>");
        Ok(svg)
    }

    fn draw_axes(&self, svg: &mut String, frame: &Frame, dates: &[NaiveDate]) {
        let bottom = self.height - PADDING;
        let right = self.width - PADDING;

        let _ = write!(
            svg,
            r##"<line x1="{l:.2}" y1="{b:.2}" x2="{r:.2}" y2="{b:.2}" stroke="#000" stroke-width="1" /><line x1="{l:.2}" y1="{t:.2}" x2="{l:.2}" y2="{b:.2}" stroke="#000" stroke-width="1" />"##,
            l = PADDING,
            r = right,
            t = PADDING,
            b = bottom
        );

        let step = dates.len().div_ceil(MAX_X_LABELS).max(1);
        for date in dates.iter().step_by(step) {
            let x = frame.x(*date);
            let _ = write!(
                svg,
                r##"<line x1="{x:.2}" y1="{t:.2}" x2="{x:.2}" y2="{b:.2}" stroke="#dddddd" stroke-width="0.5" /><text x="{x:.2}" y="{y:.2}" text-anchor="middle">{label}</text>"##,
                t = PADDING,
                b = bottom,
                y = bottom + 14.0,
                label = date.format("%Y-%m")
            );
        }

        for i in 0..=Y_TICKS {
            let value = frame.lo + (frame.hi - frame.lo) * i as f64 / Y_TICKS as f64;
            let y = frame.y(value);
            let _ = write!(
                svg,
                r##"<line x1="{l:.2}" y1="{y:.2}" x2="{r:.2}" y2="{y:.2}" stroke="#eeeeee" stroke-width="0.5" /><text x="{x:.2}" y="{ty:.2}" text-anchor="end">{value:.2}</text>"##,
                l = PADDING,
                r = right,
                x = PADDING - 6.0,
                ty = y + 3.0
            );
        }

        let _ = write!(
            svg,
            r##"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" font-size="12" fill="#333">Date</text>"##,
            x = self.width / 2.0,
            y = self.height - PADDING / 4.0
        );
        let _ = write!(
            svg,
            r##"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" font-size="12" fill="#333" transform="rotate(-90 {x:.2} {y:.2})">Beta</text>"##,
            x = PADDING / 3.0,
            y = self.height / 2.0
        );
    }

    /// Legend in the lower-left corner of the plot area.
    fn draw_legend(&self, svg: &mut String) {
        let tickers = self.table.tickers();
        let x = PADDING + 10.0;
        let mut y = self.height - PADDING - 10.0 - 16.0 * (tickers.len().saturating_sub(1)) as f64;
        for (idx, ticker) in tickers.iter().enumerate() {
            let color = PALETTE[idx % PALETTE.len()];
            let _ = write!(
                svg,
                r##"<line x1="{x1:.2}" y1="{ly:.2}" x2="{x2:.2}" y2="{ly:.2}" stroke="{color}" stroke-width="1.5" /><text x="{tx:.2}" y="{y:.2}" text-anchor="start" fill="#333">{label}</text>"##,
                x1 = x,
                x2 = x + 20.0,
                ly = y - 4.0,
                tx = x + 26.0,
                label = escape(ticker)
            );
            y += 16.0;
        }
    }
}

/// Maps dates and betas onto canvas coordinates.
struct Frame {
    first: NaiveDate,
    span_days: f64,
    lo: f64,
    hi: f64,
    width: f64,
    height: f64,
}

impl Frame {
    fn x(&self, date: NaiveDate) -> f64 {
        let inner = self.width - 2.0 * PADDING;
        if self.span_days == 0.0 {
            return PADDING + inner / 2.0;
        }
        let offset = (date - self.first).num_days() as f64;
        PADDING + offset / self.span_days * inner
    }

    fn y(&self, value: f64) -> f64 {
        let inner = self.height - 2.0 * PADDING;
        let norm = (value - self.lo) / (self.hi - self.lo);
        PADDING + (1.0 - norm) * inner
    }
}

/// Pad the value range so lines never sit on the frame.
fn widen(lo: f64, hi: f64) -> (f64, f64) {
    let pad = ((hi - lo) * 0.1).max(0.05);
    (lo - pad, hi + pad)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
