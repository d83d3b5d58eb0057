//! Chart Plotter Module
//! Draws the hospitalization trend with egui_plot.

use crate::data::{date_to_epoch_days, epoch_days_to_date};
use crate::stats::SummaryRow;
use egui::Color32;
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};
use std::collections::BTreeMap;

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(121, 85, 72),   // Brown
    Color32::from_rgb(96, 125, 139),  // Blue Grey
];

pub const RATE_AXIS_LABEL: &str = "Rate per 100,000";

/// Points of one region's line.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSeries {
    pub state: String,
    /// `[epoch days, mean rate]`, ascending by date
    pub points: Vec<[f64; 2]>,
}

/// Line chart of mean rate over time, one series per region.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Color for the n-th series.
    pub fn series_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Split a summary into per-region series, regions in sorted order.
    pub fn build_series(summary: &[SummaryRow]) -> Vec<TrendSeries> {
        let mut by_state: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
        for row in summary {
            by_state
                .entry(row.state.as_str())
                .or_default()
                .push([date_to_epoch_days(row.date) as f64, row.mean_rate]);
        }

        by_state
            .into_iter()
            .map(|(state, mut points)| {
                points.sort_by(|a, b| a[0].total_cmp(&b[0]));
                TrendSeries {
                    state: state.to_string(),
                    points,
                }
            })
            .collect()
    }

    /// Format an x-axis value (epoch days) as `YYYY-MM`.
    pub fn month_label(x: f64) -> String {
        if !x.is_finite() {
            return String::new();
        }
        epoch_days_to_date(x.round() as i32)
            .map(|date| date.format("%Y-%m").to_string())
            .unwrap_or_default()
    }

    pub fn draw_trend_chart(ui: &mut egui::Ui, summary: &[SummaryRow], height: f32) {
        let series = Self::build_series(summary);

        Plot::new("national-trend")
            .height(height)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Date")
            .y_axis_label(RATE_AXIS_LABEL)
            .x_axis_formatter(|mark, _range| Self::month_label(mark.value))
            .label_formatter(|name, value| {
                if name.is_empty() {
                    String::new()
                } else {
                    format!("{}\n{}\n{:.1}", name, Self::month_label(value.x), value.y)
                }
            })
            .show(ui, |plot_ui| {
                for (i, s) in series.iter().enumerate() {
                    let color = Self::series_color(i);

                    plot_ui.line(
                        Line::new(PlotPoints::from_iter(s.points.iter().copied()))
                            .color(color)
                            .width(2.0)
                            .name(&s.state),
                    );

                    plot_ui.points(
                        Points::new(PlotPoints::from_iter(s.points.iter().copied()))
                            .radius(3.0)
                            .color(color)
                            .name(&s.state),
                    );
                }
            });
    }
}
