//! Chart Viewer Widget
//! Trend section of the central panel.

use crate::charts::ChartPlotter;
use crate::stats::SummaryRow;
use egui::RichText;

const CHART_HEIGHT: f32 = 380.0;

pub const NO_DATA_MESSAGE: &str = "No data available for the selected filters.";

/// Shows the summary as a line chart, or a notice when nothing matched.
#[derive(Default)]
pub struct ChartViewer {
    summary: Vec<SummaryRow>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_summary(&mut self, summary: Vec<SummaryRow>) {
        self.summary = summary;
    }

    pub fn clear(&mut self) {
        self.summary.clear();
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        if self.summary.is_empty() {
            egui::Frame::none()
                .fill(ui.visuals().widgets.noninteractive.bg_fill)
                .rounding(5.0)
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.label(RichText::new(format!("ℹ {}", NO_DATA_MESSAGE)).size(13.0));
                });
            return;
        }

        ui.label(RichText::new("Trend Over Time").size(18.0).strong());
        ui.add_space(5.0);
        ChartPlotter::draw_trend_chart(ui, &self.summary, CHART_HEIGHT);
    }
}
