use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use eframe::egui::{self, Align2, Color32, FontId, RichText, ScrollArea, Sense, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, GridMark, Legend, Plot};

use crate::color::{heat_color, text_on, CategoryColors};
use crate::data::query::{
    IndustryCount, IndustryMatrix, InvestorTotal, Outcome, SeasonCount, SeasonIndustryCount,
};
use crate::error::ColumnMissing;
use crate::pages::{investor_display_name, metric_text, HomeReport, IndustryReport, PageReport, SharkReport};
use crate::state::AppState;

const CHART_HEIGHT: f32 = 300.0;
const WARNING: Color32 = Color32::from_rgb(0xE6, 0xA2, 0x3C);

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the selected page in the central panel.
pub fn page_view(ui: &mut Ui, state: &AppState) {
    let report = match &state.report {
        Some(report) => report,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                match &state.status_message {
                    Some(msg) => ui.heading(RichText::new(msg).color(Color32::RED)),
                    None => ui.heading("Open a dataset to begin  (File → Open…)"),
                };
            });
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match report {
            PageReport::Home(home) => home_page(ui, home),
            PageReport::Industry(industry) => industry_page(ui, industry, &state.industry_colors),
            PageReport::Sharks(sharks) => shark_page(ui, sharks),
        });
}

fn home_page(ui: &mut Ui, report: &HomeReport) {
    ui.heading("Pitch Records - Data Analysis");
    ui.label("This dashboard summarises every pitch in the loaded dataset.");
    ui.add_space(8.0);

    ui.strong("Overall Metrics");
    ui.columns(3, |cols| {
        metric_tile(&mut cols[0], "Total Startups", &report.total_startups);
        metric_tile(&mut cols[1], "Industries", &report.total_industries);
        metric_tile(&mut cols[2], "Seasons", &report.total_seasons);
    });
    ui.add_space(8.0);

    with_outcome(ui, &report.by_season, |ui, seasons| {
        ui.strong("Startups by Season");
        season_chart(ui, seasons);
    });
}

fn industry_page(ui: &mut Ui, report: &IndustryReport, colors: &CategoryColors) {
    ui.heading("Industry Analysis");

    with_outcome(ui, &report.by_industry, |ui, industries| {
        ui.strong("Startups by Industry");
        industry_chart(ui, industries, colors);
        counts_table(
            ui,
            "industry_table",
            ("Industry", "Startups"),
            industries.iter().map(|c| (c.industry.clone(), c.count.to_string())),
        );
    });
    ui.add_space(8.0);

    with_outcome(ui, &report.by_season_and_industry, |ui, rows| {
        ui.strong("Popular Industries by Season");
        stacked_industry_chart(ui, rows, colors);
    });
}

fn shark_page(ui: &mut Ui, report: &SharkReport) {
    ui.heading("Shark Participation");

    with_outcome(ui, &report.totals, |ui, totals| {
        ui.strong("Shark Investment Count");
        investor_chart(ui, totals);
    });
    ui.add_space(8.0);

    with_outcome(ui, &report.by_industry, |ui, matrix| {
        ui.strong("Shark Participation by Industry");
        heatmap(ui, matrix);
    });
}

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

/// Draw `ready` for a result, or the placeholder text for a skipped query.
fn with_outcome<T>(ui: &mut Ui, outcome: &Outcome<T>, ready: impl FnOnce(&mut Ui, &T)) {
    match outcome {
        Outcome::Ready(value) => ready(ui, value),
        Outcome::Skipped(missing) => placeholder(ui, missing),
    }
}

fn placeholder(ui: &mut Ui, missing: &ColumnMissing) {
    ui.label(RichText::new(format!("⚠ {missing}")).color(WARNING));
}

fn metric_tile(ui: &mut Ui, label: &str, value: &Outcome<usize>) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(label);
        ui.label(RichText::new(metric_text(value)).size(28.0).strong());
    });
}

/// X-axis formatter that prints `labels[i]` at integer position `i`.
fn category_axis(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let idx = mark.value.round();
        if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }
}

/// Category bar plot with fixed axes; charts are drawn in order.
fn show_bars(
    ui: &mut Ui,
    id: &str,
    (x_label, y_label): (&str, &str),
    labels: Vec<String>,
    charts: Vec<BarChart>,
) {
    let mut plot = Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .x_axis_formatter(category_axis(labels))
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false);
    if charts.len() > 1 {
        plot = plot.legend(Legend::default());
    }
    plot.show(ui, |plot_ui| {
        for chart in charts {
            plot_ui.bar_chart(chart);
        }
    });
}

fn season_chart(ui: &mut Ui, seasons: &[SeasonCount]) {
    let palette = crate::color::generate_palette(seasons.len());
    let bars: Vec<Bar> = seasons
        .iter()
        .zip(palette)
        .enumerate()
        .map(|(i, (s, color))| {
            Bar::new(i as f64, s.count as f64)
                .name(format!("Season {}", s.season))
                .fill(color)
                .width(0.7)
        })
        .collect();
    let labels = seasons.iter().map(|s| s.season.to_string()).collect();

    show_bars(
        ui,
        "startups_by_season",
        ("Season", "Number of Startups"),
        labels,
        vec![BarChart::new(bars)],
    );
}

fn industry_chart(ui: &mut Ui, industries: &[IndustryCount], colors: &CategoryColors) {
    let bars: Vec<Bar> = industries
        .iter()
        .enumerate()
        .map(|(i, c)| {
            Bar::new(i as f64, c.count as f64)
                .name(&c.industry)
                .fill(colors.color_for(&c.industry))
                .stroke(egui::Stroke::new(1.0, Color32::BLACK))
                .width(0.7)
        })
        .collect();
    let labels = industries.iter().map(|c| c.industry.clone()).collect();

    show_bars(
        ui,
        "industry_distribution",
        ("Industry", "Number of Startups"),
        labels,
        vec![BarChart::new(bars)],
    );
}

fn stacked_industry_chart(ui: &mut Ui, rows: &[SeasonIndustryCount], colors: &CategoryColors) {
    let seasons: Vec<i64> = rows
        .iter()
        .map(|r| r.season)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let industries: BTreeSet<&str> = rows.iter().map(|r| r.industry.as_str()).collect();

    let mut charts: Vec<BarChart> = Vec::with_capacity(industries.len());
    for industry in industries {
        let bars = seasons
            .iter()
            .enumerate()
            .map(|(i, season)| {
                let count = rows
                    .iter()
                    .find(|r| r.season == *season && r.industry == industry)
                    .map_or(0, |r| r.count);
                Bar::new(i as f64, count as f64).name(format!("{industry} (season {season})"))
            })
            .collect();
        let below: Vec<&BarChart> = charts.iter().collect();
        let chart = BarChart::new(bars)
            .name(industry)
            .color(colors.color_for(industry))
            .width(0.7)
            .stack_on(&below);
        charts.push(chart);
    }
    let labels = seasons.iter().map(|s| s.to_string()).collect();

    show_bars(
        ui,
        "industry_by_season",
        ("Season", "Number of Startups"),
        labels,
        charts,
    );
}

fn investor_chart(ui: &mut Ui, totals: &[InvestorTotal]) {
    let bars: Vec<Bar> = totals
        .iter()
        .enumerate()
        .map(|(i, t)| {
            Bar::new(i as f64, t.total)
                .name(investor_display_name(&t.investor))
                .width(0.7)
        })
        .collect();
    let labels = totals.iter().map(|t| investor_display_name(&t.investor)).collect();

    show_bars(
        ui,
        "shark_investments",
        ("Shark", "Number of Investments"),
        labels,
        vec![BarChart::new(bars).color(Color32::LIGHT_BLUE)],
    );
}

/// Industry × investor grid, each cell coloured by its share of the maximum.
fn heatmap(ui: &mut Ui, matrix: &IndustryMatrix) {
    let max = matrix.max_value();
    let cell = egui::vec2(72.0, 22.0);

    egui::Grid::new("shark_industry_heatmap")
        .spacing([2.0, 2.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for investor in &matrix.investors {
                ui.strong(investor_display_name(investor));
            }
            ui.end_row();

            for (industry, row) in matrix.industries.iter().zip(&matrix.cells) {
                ui.label(industry);
                for (investor, &value) in matrix.investors.iter().zip(row) {
                    let (rect, response) = ui.allocate_exact_size(cell, Sense::hover());
                    let fill = heat_color(if max > 0.0 { value / max } else { 0.0 });
                    let painter = ui.painter();
                    painter.rect_filled(rect, 2.0, fill);
                    painter.text(
                        rect.center(),
                        Align2::CENTER_CENTER,
                        value.to_string(),
                        FontId::proportional(12.0),
                        text_on(fill),
                    );
                    response.on_hover_text(format!(
                        "{industry} / {}: {value}",
                        investor_display_name(investor)
                    ));
                }
                ui.end_row();
            }
        });
}

fn counts_table(
    ui: &mut Ui,
    id: &str,
    header: (&str, &str),
    rows: impl Iterator<Item = (String, String)>,
) {
    let rows: Vec<(String, String)> = rows.collect();
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto().at_least(160.0))
            .column(Column::remainder())
            .header(20.0, |mut h| {
                h.col(|ui: &mut Ui| {
                    ui.strong(header.0);
                });
                h.col(|ui: &mut Ui| {
                    ui.strong(header.1);
                });
            })
            .body(|mut body| {
                for (label, value) in &rows {
                    body.row(18.0, |mut row| {
                        row.col(|ui: &mut Ui| {
                            ui.label(label);
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(value);
                        });
                    });
                }
            });
    });
}
