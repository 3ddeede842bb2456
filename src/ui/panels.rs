use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use covid_dash::data::filter::RegionSelector;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – parameter widgets
// ---------------------------------------------------------------------------

/// Render the left parameter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Parameters");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Country selector ----
            ui.strong("Select Country");
            let current = state.controls.region.label().to_string();
            egui::ComboBox::from_id_salt("country")
                .selected_text(&current)
                .width(ui.available_width() * 0.9)
                .show_ui(ui, |ui: &mut Ui| {
                    let options = std::iter::once(RegionSelector::WORLDWIDE_LABEL)
                        .chain(dataset.locations.iter().map(String::as_str));
                    for label in options {
                        if ui.selectable_label(current == label, label).clicked() {
                            state.controls.region = RegionSelector::from_label(label);
                            changed = true;
                        }
                    }
                });
            ui.add_space(12.0);

            // ---- Population and GDP ranges (worldwide mode only) ----
            let worldwide = state.controls.region.is_worldwide();
            ui.add_enabled_ui(worldwide, |ui: &mut Ui| {
                ui.strong("Set a filter based on the population");
                if let Some(span) = dataset.population_span {
                    changed |= range_sliders(ui, &mut state.controls.population, span);
                }
                ui.add_space(12.0);

                ui.strong("Set a filter based on the GDP");
                if let Some(span) = dataset.gdp_span {
                    changed |= range_sliders(ui, &mut state.controls.gdp_per_capita, span);
                }
            });
            ui.add_space(12.0);

            // ---- Date window ----
            ui.strong("Select the time period");
            ui.horizontal(|ui: &mut Ui| {
                ui.label("From");
                changed |= ui
                    .add(DatePickerButton::new(&mut state.controls.start).id_salt("start_date"))
                    .changed();
            });
            ui.horizontal(|ui: &mut Ui| {
                ui.label("To");
                changed |= ui
                    .add(DatePickerButton::new(&mut state.controls.end).id_salt("end_date"))
                    .changed();
            });
            if let Some((first, last)) = dataset.date_span {
                for day in [&mut state.controls.start, &mut state.controls.end] {
                    let clamped = (*day).clamp(first, last);
                    if clamped != *day {
                        *day = clamped;
                        changed = true;
                    }
                }
            }
        });

    if changed {
        state.recompute();
    }
}

/// Low/high sliders over the dataset span. Returns whether either moved.
///
/// The sliders do not push each other; an inverted pair is reported by
/// `recompute` instead of being silently swapped.
fn range_sliders(ui: &mut Ui, range: &mut [f64; 2], (min, max): (f64, f64)) -> bool {
    let mut changed = false;
    for (value, text) in range.iter_mut().zip(["min", "max"]) {
        changed |= ui
            .add(
                egui::Slider::new(value, min..=max)
                    .logarithmic(min > 0.0)
                    .text(text),
            )
            .changed();
    }
    changed
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} observations, {} countries",
                ds.len(),
                ds.locations.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open OWID COVID-19 data")
        .add_filter("Supported files", &["csv", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_file(&path);
    }
}
