use crate::{table::PivotTable, AnalysisError};
use plotters::{
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};
use std::{error::Error, path::Path};
use tracing::debug;

/// Title and file name of a single chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSpec {
    /// file stem below `analysis/charts`
    pub name: &'static str,
    pub title: &'static str,
    pub y_label: &'static str,
}

pub const THROUGHPUT_CHART: ChartSpec = ChartSpec {
    name: "throughput_comparison",
    title: "Throughput Comparison (Ops/sec)",
    y_label: "Throughput (ops/sec)",
};

pub const READ_LATENCY_CHART: ChartSpec = ChartSpec {
    name: "read_latency_comparison",
    title: "Read Average Latency Comparison",
    y_label: "Latency (us)",
};

/// Anything a pivot table can be drawn into
pub trait ChartSink {
    fn render(
        &mut self,
        spec: &ChartSpec,
        table: &PivotTable,
        path: &Path,
    ) -> Result<(), AnalysisError>;
}

/// Grouped bar charts as PNG, one group per workload and one bar per database
#[derive(Debug, Clone, Copy)]
pub struct PlottersSink {
    pub size: (u32, u32),
}

impl Default for PlottersSink {
    fn default() -> Self {
        Self { size: (1000, 600) }
    }
}

impl ChartSink for PlottersSink {
    fn render(
        &mut self,
        spec: &ChartSpec,
        table: &PivotTable,
        path: &Path,
    ) -> Result<(), AnalysisError> {
        debug!(chart = spec.name, "Rendering {} workloads", table.workloads.len());

        draw_grouped_bars(spec, table, path, self.size).map_err(|e| AnalysisError::Render {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

fn draw_grouped_bars(
    spec: &ChartSpec,
    table: &PivotTable,
    path: &Path,
    size: (u32, u32),
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let groups = table.workloads.len().max(1) as f64;
    let bar_width = 0.8 / table.databases.len().max(1) as f64;
    let top = match table.max_value() {
        Some(max) if max > 0.0 => max * 1.1,
        _ => 1.0,
    };

    let mut chart = ChartBuilder::on(&root)
        .caption(spec.title, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d(0f64..groups, 0f64..top)?;

    // workload names are drawn below, the numeric x axis carries no meaning
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .x_desc("Workload")
        .y_desc(spec.y_label)
        .draw()?;

    for (index, database) in table.databases.iter().enumerate() {
        let color = Palette99::pick(index).to_rgba();
        let offset = 0.1 + bar_width * index as f64;

        chart
            .draw_series(
                table
                    .workloads
                    .iter()
                    .enumerate()
                    .filter_map(|(group, workload)| {
                        table.get(workload, database).map(|value| {
                            let left = group as f64 + offset;
                            Rectangle::new([(left, 0.0), (left + bar_width, value)], color.filled())
                        })
                    }),
            )?
            .label(database.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    let label_style =
        TextStyle::from(("sans-serif", 16).into_font()).pos(Pos::new(HPos::Center, VPos::Top));
    for (group, workload) in table.workloads.iter().enumerate() {
        let (x, y) = chart.backend_coord(&(group as f64 + 0.5, 0.0));
        root.draw(&Text::new(workload.as_str(), (x, y + 6), label_style.clone()))?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;

    Ok(())
}
