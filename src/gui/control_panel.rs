//! Control Panel Widget
//! Left side panel with the refresh button, date range and category filters.

use crate::charts::ChartPlotter;
use crate::data::{
    date_to_epoch_days, DateRange, Dimension, FilterSelection, HospitalizationTable,
};
use chrono::NaiveDate;
use egui::{Color32, RichText, ScrollArea};
use std::collections::BTreeMap;

/// Sidebar state: available options and the current selection.
pub struct ControlPanel {
    pub selection: FilterSelection,
    options: BTreeMap<Dimension, Vec<String>>,
    months: Vec<NaiveDate>,
    start_idx: usize,
    end_idx: usize,
    pub status: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            selection: FilterSelection::new(),
            options: BTreeMap::new(),
            months: Vec::new(),
            start_idx: 0,
            end_idx: 0,
            status: "Ready".to_string(),
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild options from a freshly loaded table and reset the selection to everything.
    pub fn update_options(&mut self, table: &HospitalizationTable) {
        self.options = Dimension::ALL
            .iter()
            .map(|&dim| (dim, table.unique_values(dim)))
            .collect();
        self.months = table.months();
        self.start_idx = 0;
        self.end_idx = self.months.len().saturating_sub(1);

        self.selection = FilterSelection::new();
        self.sync_date_range();
    }

    fn sync_date_range(&mut self) {
        self.selection.date_range = match (
            self.months.get(self.start_idx),
            self.months.get(self.end_idx),
        ) {
            (Some(&start), Some(&end)) => Some(DateRange::new(start, end)),
            _ => None,
        };
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui, refresh_disabled: bool) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.add_space(5.0);
        ui.label(RichText::new("Data Controls").size(18.0).strong());
        ui.add_space(8.0);

        // ===== Refresh Section =====
        ui.add_enabled_ui(!refresh_disabled, |ui| {
            let button = egui::Button::new(RichText::new("⟳ Fetch updated data").size(14.0))
                .min_size(egui::vec2(200.0, 30.0));
            if ui.add(button).clicked() {
                action = ControlPanelAction::FetchUpdatedData;
            }
        });

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Date Range Section =====
        ui.label(RichText::new("Date range:").size(14.0).strong());
        ui.add_space(5.0);

        if self.months.is_empty() {
            ui.label(RichText::new("No dates available").color(Color32::GRAY));
        } else {
            let last = self.months.len() - 1;
            let mut changed = false;

            ui.horizontal(|ui| {
                ui.add_sized([40.0, 20.0], egui::Label::new("From"));
                changed |= ui
                    .add(egui::Slider::new(&mut self.start_idx, 0..=last).show_value(false))
                    .changed();
                ui.label(month_text(self.months[self.start_idx]));
            });
            ui.horizontal(|ui| {
                ui.add_sized([40.0, 20.0], egui::Label::new("To"));
                changed |= ui
                    .add(egui::Slider::new(&mut self.end_idx, 0..=last).show_value(false))
                    .changed();
                ui.label(month_text(self.months[self.end_idx]));
            });

            if changed {
                self.sync_date_range();
                action = ControlPanelAction::SelectionChanged;
            }
        }

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Category Filters =====
        for dim in Dimension::ALL {
            let options = self.options.get(&dim).map(Vec::as_slice).unwrap_or(&[]);
            let selected = self.selection.selected_count(dim);
            let header = if selected == 0 {
                dim.label().to_string()
            } else {
                format!("{} ({} selected)", dim.label(), selected)
            };

            ui.collapsing(header, |ui| {
                if options.is_empty() {
                    ui.label(RichText::new("No values").color(Color32::GRAY));
                    return;
                }

                ScrollArea::vertical()
                    .id_salt(dim.column())
                    .max_height(160.0)
                    .show(ui, |ui| {
                        for value in options {
                            let mut checked = self.selection.is_selected(dim, value);
                            if ui.checkbox(&mut checked, value.as_str()).changed() {
                                self.selection.set_selected(dim, value, checked);
                                action = ControlPanelAction::SelectionChanged;
                            }
                        }
                    });

                if ui.small_button("Clear").clicked() {
                    self.selection.clear(dim);
                    action = ControlPanelAction::SelectionChanged;
                }
            });
            ui.add_space(4.0);
        }

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status =====
        let status_color = if self.status.contains("Error") || self.status.contains("failed") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set status line
    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

fn month_text(date: NaiveDate) -> String {
    ChartPlotter::month_label(date_to_epoch_days(date) as f64)
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    FetchUpdatedData,
    SelectionChanged,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::snapshot_table;

    #[test]
    fn options_reset_selection_to_full_span() {
        let table = snapshot_table();
        let mut panel = ControlPanel::new();
        panel.selection.set_selected(Dimension::State, "TX", true);

        panel.update_options(&table);

        assert_eq!(panel.selection.selected_count(Dimension::State), 0);
        let (min, max) = table.date_bounds().unwrap();
        assert_eq!(panel.selection.date_range, Some(DateRange::new(min, max)));
        assert_eq!(panel.options[&Dimension::State], vec!["CA", "NY"]);
    }

    #[test]
    fn month_text_is_year_month() {
        assert_eq!(
            month_text(NaiveDate::from_ymd_opt(2021, 11, 1).unwrap()),
            "2021-11"
        );
    }
}
