use eframe::egui::{self, Align2, Color32, FontId, RichText, Sense, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Plot};

use crate::color::{correlation_color, SeriesColors};
use crate::data::charts::ChartData;
use crate::data::model::{Pclass, Sex, Survival, View};
use crate::data::summary::{CorrelationMatrix, Summary};
use crate::state::AppState;

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render KPIs, charts, heatmap and the passenger table.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let (Some(view), Some(summary)) = (&state.view, &state.summary) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a passenger table to begin  (File → Open…)");
        });
        return;
    };

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            kpi_row(ui, summary);
            ui.separator();
            ui.label(RichText::new("Hover over the charts for more information").italics());
            ui.add_space(4.0);

            let charts = &state.charts;
            ui.columns(2, |cols: &mut [Ui]| {
                survival_by_class(&mut cols[0], charts);
                age_by_sex(&mut cols[1], charts);
            });
            ui.columns(3, |cols: &mut [Ui]| {
                survivors_by_sex(&mut cols[0], charts);
                fare_by_survival(&mut cols[1], charts);
                passengers_by_port(&mut cols[2], charts);
            });

            ui.add_space(8.0);
            ui.heading("Correlation heatmap");
            correlation_heatmap(ui, &summary.correlation);

            ui.add_space(8.0);
            egui::CollapsingHeader::new(RichText::new(format!("Passengers ({})", view.len())).strong())
                .default_open(false)
                .show(ui, |ui: &mut Ui| passenger_table(ui, view));
        });
}

// ---------------------------------------------------------------------------
// KPI tiles
// ---------------------------------------------------------------------------

fn kpi_row(ui: &mut Ui, summary: &Summary) {
    let tiles = [
        ("Total Passengers", summary.total_count.to_string()),
        ("Total Survived", summary.total_survived.to_string()),
        ("Survival Rate", summary.survival_rate_label()),
        ("Total Fare", summary.total_fare_label()),
        ("Average Age", summary.average_age_label()),
    ];
    ui.columns(tiles.len(), |cols: &mut [Ui]| {
        for (col, (title, value)) in cols.iter_mut().zip(tiles) {
            col.group(|ui: &mut Ui| {
                ui.set_min_width(ui.available_width());
                ui.label(title);
                ui.heading(RichText::new(value).strong());
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

fn chart(id: &str) -> Plot {
    Plot::new(id)
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
}

fn survival_by_class(ui: &mut Ui, charts: &ChartData) {
    ui.strong("Survival by Passenger Class");
    let colors = SeriesColors::new(2);
    let series: Vec<BarChart> = [Survival::DidNotSurvive, Survival::Survived]
        .into_iter()
        .enumerate()
        .map(|(i, survival)| {
            let offset = if i == 0 { -0.2 } else { 0.2 };
            let bars = charts
                .survival_by_class
                .iter()
                .filter(|(_, s, _)| *s == survival)
                .map(|&(pclass, _, n)| {
                    Bar::new(f64::from(pclass.number()) + offset, n as f64)
                        .width(0.4)
                        .name(format!("Class {pclass}"))
                })
                .collect();
            BarChart::new(bars)
                .name(survival.to_string())
                .color(colors.get(i))
        })
        .collect();

    chart("survival_by_class")
        .x_axis_label("Passenger Class")
        .y_axis_label("Count")
        .include_x(f64::from(Pclass::First.number()) - 0.5)
        .include_x(f64::from(Pclass::Third.number()) + 0.5)
        .show(ui, |plot_ui| {
            for s in series {
                plot_ui.bar_chart(s);
            }
        });
}

fn age_by_sex(ui: &mut Ui, charts: &ChartData) {
    ui.strong("Age Distribution by Gender");
    let hist = &charts.age_by_sex;
    let colors = SeriesColors::new(2);
    let color_of = |sex: Sex| colors.get(if sex == Sex::Male { 0 } else { 1 });

    let mut stacked: Vec<BarChart> = Vec::new();
    for (sex, counts) in &hist.counts {
        let bars = counts
            .iter()
            .enumerate()
            .map(|(bin, &n)| {
                let start = hist.bin_start(bin);
                Bar::new(start + hist.bin_width / 2.0, n as f64)
                    .width(hist.bin_width)
                    .name(format!("{start:.0}–{:.0}", start + hist.bin_width))
            })
            .collect();
        let below: Vec<&BarChart> = stacked.iter().collect();
        let chart = BarChart::new(bars)
            .name(sex.label())
            .color(color_of(*sex))
            .stack_on(&below);
        stacked.push(chart);
    }

    chart("age_by_sex")
        .link_axis("age_axis", [true, false])
        .x_axis_label("Age")
        .y_axis_label("Count")
        .show(ui, |plot_ui| {
            for c in stacked {
                plot_ui.bar_chart(c);
            }
        });

    // Marginal box per sex, on the same age axis.
    chart("age_by_sex_box")
        .link_axis("age_axis", [true, false])
        .height(CHART_HEIGHT / 3.0)
        .show_axes([true, false])
        .show(ui, |plot_ui| {
            for (row, (sex, b)) in charts.age_box_by_sex.iter().enumerate() {
                let color = color_of(*sex);
                let elem = BoxElem::new(row as f64, BoxSpread::new(b.min, b.q1, b.median, b.q3, b.max))
                    .name(format!("{} (n = {})", sex.label(), b.count))
                    .box_width(0.6)
                    .fill(color.gamma_multiply(0.4));
                plot_ui.box_plot(
                    BoxPlot::new(vec![elem])
                        .name(sex.label())
                        .color(color)
                        .horizontal(),
                );
            }
        });
}

fn survivors_by_sex(ui: &mut Ui, charts: &ChartData) {
    ui.strong("Survival by Gender");
    let colors = SeriesColors::new(charts.survivors_by_sex.len());
    chart("survivors_by_sex")
        .y_axis_label("Survivors")
        .show(ui, |plot_ui| {
            for (i, (sex, n)) in charts.survivors_by_sex.iter().enumerate() {
                let bar = Bar::new(i as f64, *n as f64).width(0.6).name(sex.label());
                plot_ui.bar_chart(BarChart::new(vec![bar]).name(sex.label()).color(colors.get(i)));
            }
        });
}

fn fare_by_survival(ui: &mut Ui, charts: &ChartData) {
    ui.strong("Fare Distribution by Survival");
    let colors = SeriesColors::new(2);
    chart("fare_by_survival")
        .x_axis_label("Survived")
        .y_axis_label("Fare")
        .show(ui, |plot_ui| {
            for (survival, b) in &charts.fare_by_survival {
                let x = match survival {
                    Survival::DidNotSurvive => 0.0,
                    Survival::Survived => 1.0,
                };
                let color = colors.get(x as usize);
                let elem = BoxElem::new(x, BoxSpread::new(b.min, b.q1, b.median, b.q3, b.max))
                    .name(format!("{survival} (n = {})", b.count))
                    .box_width(0.5)
                    .fill(color.gamma_multiply(0.4));
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(survival.to_string()).color(color));
            }
        });
}

fn passengers_by_port(ui: &mut Ui, charts: &ChartData) {
    ui.strong("Survival by Embarked Port");
    let colors = SeriesColors::new(3);
    chart("passengers_by_port")
        .y_axis_label("Passengers")
        .show(ui, |plot_ui| {
            for (i, (port, n)) in charts.passengers_by_port.iter().enumerate() {
                let bar = Bar::new(i as f64, *n as f64).width(0.6).name(port.name());
                plot_ui.bar_chart(BarChart::new(vec![bar]).name(port.name()).color(colors.get(i)));
            }
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

fn correlation_heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    let features = matrix.features();
    let cell_width = ((ui.available_width() - 110.0) / features.len() as f32).clamp(48.0, 140.0);
    let cell = egui::vec2(cell_width, 34.0);

    egui::Grid::new("correlation_heatmap")
        .spacing([2.0, 2.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for f in features {
                ui.strong(f.label());
            }
            ui.end_row();

            for row_feature in features {
                ui.strong(row_feature.label());
                for col_feature in features {
                    let r = matrix.get(*row_feature, *col_feature);
                    let (rect, response) = ui.allocate_exact_size(cell, Sense::hover());
                    ui.painter().rect_filled(rect, 2.0, correlation_color(r));
                    ui.painter().text(
                        rect.center(),
                        Align2::CENTER_CENTER,
                        r.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}")),
                        FontId::proportional(13.0),
                        Color32::WHITE,
                    );
                    response.on_hover_text(format!(
                        "{} × {}",
                        row_feature.label(),
                        col_feature.label()
                    ));
                }
                ui.end_row();
            }
        });
}

// ---------------------------------------------------------------------------
// Passenger table
// ---------------------------------------------------------------------------

fn passenger_table(ui: &mut Ui, view: &View) {
    let passengers = view.dataset().passengers();
    let rows = view.rows();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(320.0)
        .column(Column::auto())
        .column(Column::initial(260.0).at_least(120.0))
        .columns(Column::auto(), 10)
        .header(20.0, |mut header| {
            for title in [
                "Id", "Name", "Title", "Sex", "Age", "Class", "SibSp", "Parch", "Family", "Fare",
                "Port", "Survival",
            ] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let p = &passengers[rows[row.index()]];
                let cells = [
                    p.passenger_id.map(|id| id.to_string()).unwrap_or_default(),
                    p.name.clone(),
                    p.title().unwrap_or("").to_string(),
                    p.sex.to_string(),
                    p.age.map(|a| a.to_string()).unwrap_or_default(),
                    p.pclass.to_string(),
                    p.sib_sp.to_string(),
                    p.parch.to_string(),
                    p.family_size().to_string(),
                    p.fare.map(|f| format!("{f:.2}")).unwrap_or_default(),
                    p.embarked.map(|e| e.code().to_string()).unwrap_or_default(),
                    p.survival().to_string(),
                ];
                for text in cells {
                    row.col(|ui: &mut Ui| {
                        ui.label(text);
                    });
                }
            });
        });
}
