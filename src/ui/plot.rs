use chrono::{Duration, NaiveDate};
use eframe::egui::{RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};

use covid_dash::data::query::Chart;
use covid_dash::data::series::{BarSeries, LineSeries};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel: both charts stacked
// ---------------------------------------------------------------------------

pub fn charts(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            if state.dataset.is_none() {
                ui.heading("Open a file to view the data  (File → Open…)");
            } else {
                ui.heading("Fix the parameters to redraw the charts");
            }
        });
        return;
    };

    let height = (ui.available_height() / 2.0 - 60.0).max(120.0);

    chart_header(ui, "Stringency Index", &view.stringency);
    stringency_plot(ui, state, &view.stringency.series, height);

    ui.separator();

    chart_header(ui, "New Cases", &view.new_cases);
    new_cases_plot(ui, state, &view.new_cases.series, height);
}

fn chart_header<S>(ui: &mut Ui, card: &str, chart: &Chart<S>) {
    ui.label(RichText::new(card).strong());
    ui.heading(&chart.title);
    if let Some(notice) = &chart.notice {
        ui.label(RichText::new(notice).italics());
    }
}

// -- Date axis: days since 1970-01-01 --

fn day_number(date: NaiveDate) -> f64 {
    date.signed_duration_since(NaiveDate::default()).num_days() as f64
}

/// Grid marks far outside chrono's range (zoomed out) get no label.
fn day_label(value: f64) -> String {
    Duration::try_days(value.round() as i64)
        .and_then(|offset| NaiveDate::default().checked_add_signed(offset))
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Stringency: one line per location
// ---------------------------------------------------------------------------

fn stringency_plot(ui: &mut Ui, state: &AppState, series: &LineSeries, height: f32) {
    Plot::new("stringency_plot")
        .height(height)
        .legend(Legend::default())
        .x_axis_label("Date")
        .y_axis_label(series.indicator.label())
        .x_axis_formatter(|mark, _range| day_label(mark.value))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for track in &series.tracks {
                let points: PlotPoints = track
                    .points
                    .iter()
                    .map(|p| [day_number(p.date), p.value])
                    .collect();

                let line = Line::new(points)
                    .name(&track.label)
                    .color(state.color_map.color_for(&track.label))
                    .width(1.5);

                plot_ui.line(line);
            }
        });
}

// ---------------------------------------------------------------------------
// New cases: horizontal bars, largest on top
// ---------------------------------------------------------------------------

fn new_cases_plot(ui: &mut Ui, state: &AppState, series: &BarSeries, height: f32) {
    let n = series.entries.len();
    let bars: Vec<Bar> = series
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            Bar::new((n - 1 - i) as f64, entry.value)
                .name(&entry.label)
                .fill(state.color_map.color_for(&entry.label))
                .width(0.7)
        })
        .collect();

    // Row i from the bottom carries the label of entry n-1-i.
    let labels: Vec<String> = series.entries.iter().rev().map(|e| e.label.clone()).collect();

    Plot::new("new_cases_plot")
        .height(height)
        .x_axis_label(series.indicator.label())
        .y_axis_label("Countries")
        .y_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_axis_round_trips() {
        let d = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        assert_eq!(day_number(d), 18628.0);
        assert_eq!(day_label(18628.2), "2021-01-01");
    }

    #[test]
    fn day_axis_survives_extreme_zoom() {
        assert_eq!(day_label(-1.0), "1969-12-31");
        assert_eq!(day_label(1e15), "");
        assert_eq!(day_label(-1e15), "");
        assert_eq!(day_label(f64::MAX), "");
    }
}
