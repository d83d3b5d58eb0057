//! Dashboard Main Application
//! Main window with the data controls, the trend chart and the raw table.

use crate::config::DashboardConfig;
use crate::data::{apply_filters, DataLoader, DataSource, Session};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, DataTable};
use crate::stats::summarize;
use egui::{Color32, RichText, SidePanel};
use tracing::{debug, info, warn};

pub const TITLE: &str = "US COVID-19 Hospitalization Dashboard";

const DESCRIPTION: &str = "Monthly hospitalization rates from CDC COVID-NET Surveillance. \
Rates represent laboratory-confirmed COVID-19 hospitalizations per 100,000 residents \
in participating surveillance areas.";

/// Main application window.
pub struct DashboardApp {
    loader: DataLoader,
    session: Session,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    data_table: DataTable,
    /// Load error shown above the chart
    error: Option<String>,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let mut app = Self {
            loader: DataLoader::new(&config),
            session: Session::new(),
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            data_table: DataTable::new(),
            error: None,
        };
        app.load_initial();
        app
    }

    /// Load the session's current source on startup.
    fn load_initial(&mut self) {
        match self.session.load(&self.loader) {
            Ok(table) => {
                if table.is_empty() {
                    warn!("{} has no usable rows", self.loader.local_path().display());
                }
                self.control_panel.update_options(table);
                self.control_panel
                    .set_status(&format!("Loaded {} rows from local snapshot", table.len()));
                self.error = None;
            }
            Err(e) => {
                self.control_panel.set_status(&format!("Error: {}", e));
                self.error = Some(format!(
                    "Could not load {}: {}",
                    self.loader.local_path().display(),
                    e
                ));
            }
        }
        self.recompute();
    }

    /// Handle the "Fetch updated data" button.
    fn handle_refresh(&mut self) {
        info!("fetching updated data from {}", self.loader.data_url());

        match self.session.refresh(&self.loader) {
            Ok(table) => {
                self.control_panel.update_options(table);
                self.control_panel
                    .set_status(&format!("Loaded {} rows from remote feed", table.len()));
                self.error = None;
            }
            Err(e) => {
                warn!("refresh failed, keeping previous data: {}", e);
                self.control_panel
                    .set_status(&format!("Refresh failed: {}. Showing previous data.", e));
                self.error = Some(format!("Fetching updated data failed: {}", e));
            }
        }
        self.recompute();
    }

    /// Re-run filter and aggregation for the current selection.
    fn recompute(&mut self) {
        let Some(table) = self.session.table() else {
            self.chart_viewer.clear();
            self.data_table.clear();
            return;
        };

        let view = apply_filters(table, &self.control_panel.selection);
        if view.is_empty() {
            debug!("no rows match the current selection");
        }
        self.chart_viewer.set_summary(summarize(&view));
        self.data_table.set_rows(view.rows_newest_first());
    }

    fn source_text(&self) -> String {
        let source = match self.session.cached_source() {
            Some(DataSource::Local) => self.loader.local_path().display().to_string(),
            Some(DataSource::Remote) => self.loader.data_url().to_string(),
            None => return "No data loaded".to_string(),
        };

        match self.session.table().and_then(|t| t.date_bounds()) {
            Some((first, last)) => format!(
                "Source: {} ({} to {})",
                source,
                first.format("%Y-%m"),
                last.format("%Y-%m")
            ),
            None => format!("Source: {}", source),
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Data Controls
        SidePanel::left("data_controls")
            .min_width(280.0)
            .max_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let refresh_disabled = self.session.data_refreshed();
                    match self.control_panel.show(ui, refresh_disabled) {
                        ControlPanelAction::FetchUpdatedData => self.handle_refresh(),
                        ControlPanelAction::SelectionChanged => self.recompute(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart and table
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label(RichText::new(TITLE).size(24.0).strong());
            ui.label(DESCRIPTION);
            ui.label(
                RichText::new(self.source_text())
                    .size(11.0)
                    .color(Color32::GRAY),
            );
            ui.add_space(8.0);

            if let Some(error) = &self.error {
                ui.label(
                    RichText::new(error)
                        .size(13.0)
                        .color(Color32::from_rgb(220, 53, 69)),
                );
                ui.add_space(8.0);
            }

            let Some(table) = self.session.table() else {
                return;
            };

            self.chart_viewer.show(ui);
            ui.add_space(12.0);
            ui.separator();
            self.data_table.show(ui, table);
        });
    }
}
