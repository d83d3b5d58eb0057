//! Data Table Widget
//! Raw rows of the filtered table, newest first.

use crate::data::HospitalizationTable;
use egui::{RichText, ScrollArea};

const ROW_HEIGHT: f32 = 18.0;

#[derive(Default)]
pub struct DataTable {
    /// Table row indices in display order
    rows: Vec<usize>,
}

impl DataTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rows(&mut self, rows: Vec<usize>) {
        self.rows = rows;
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn show(&self, ui: &mut egui::Ui, table: &HospitalizationTable) {
        ui.label(RichText::new("Raw Data").size(18.0).strong());
        let counts = format!("{} rows, {} columns", self.rows.len(), table.frame().width());
        ui.label(RichText::new(counts).size(11.0).color(egui::Color32::GRAY));
        ui.add_space(5.0);

        let columns = table.column_names();

        ScrollArea::both()
            .id_salt("raw-data-table")
            .auto_shrink([false, false])
            .show_rows(ui, ROW_HEIGHT, self.rows.len(), |ui, row_range| {
                egui::Grid::new("raw-data-grid")
                    .striped(true)
                    .min_col_width(60.0)
                    .spacing([12.0, 2.0])
                    .show(ui, |ui| {
                        for name in &columns {
                            ui.label(RichText::new(name).strong().size(11.0));
                        }
                        ui.end_row();

                        for &row in &self.rows[row_range] {
                            for name in &columns {
                                ui.label(RichText::new(table.cell_text(name, row)).size(11.0));
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}
