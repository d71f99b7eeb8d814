use crate::error::AppError;
use crate::models::StatusPivot;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontTransform, Palette, Palette99, PaletteColor};
use std::path::{Path, PathBuf};

pub const STACKED_COUNTS_FILE: &str = "llm_stacked_counts.png";
pub const STACKED_PERCENT_FILE: &str = "llm_stacked_percent.png";
pub const YES_NO_FILE: &str = "llm_yes_no_counts.png";
pub const HEATMAP_FILE: &str = "llm_heatmap_status.png";

/// Render every chart into `out_dir`, creating it if absent. Returns the
/// paths actually written; the YES/NO chart is skipped when neither column
/// exists in the pivot.
pub fn render_all(pivot: &StatusPivot, out_dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    if pivot.rows.is_empty() {
        tracing::warn!("Pivot table has no rows, no charts written");
        return Ok(Vec::new());
    }
    std::fs::create_dir_all(out_dir)?;

    let mut written = Vec::new();

    let path = out_dir.join(STACKED_COUNTS_FILE);
    render_stacked_counts(pivot, &path)?;
    written.push(path);

    let path = out_dir.join(STACKED_PERCENT_FILE);
    render_stacked_percent(pivot, &path)?;
    written.push(path);

    let path = out_dir.join(YES_NO_FILE);
    if render_yes_no(pivot, &path)? {
        written.push(path);
    }

    let path = out_dir.join(HEATMAP_FILE);
    render_heatmap(pivot, &path)?;
    written.push(path);

    Ok(written)
}

pub fn render_stacked_counts(pivot: &StatusPivot, path: &Path) -> Result<(), AppError> {
    let model_names: Vec<String> = pivot.rows.iter().map(|row| row.model.clone()).collect();
    let (width, height) = bar_canvas_size(pivot.rows.len());
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let y_max = pivot.max_total() + (pivot.max_total() / 20).max(1);
    let mut chart = ChartBuilder::on(&root)
        .caption("LLM findings per status (stacked)", ("sans-serif", 28))
        .margin(16)
        .x_label_area_size(150)
        .y_label_area_size(70)
        .build_cartesian_2d((0..pivot.rows.len()).into_segmented(), 0u64..y_max)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(pivot.rows.len())
        .x_label_formatter(&|value| segment_label(value, &model_names))
        .x_label_style(
            ("sans-serif", 14)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .y_desc("Findings")
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(chart_error)?;

    let mut stack_base = vec![0u64; pivot.rows.len()];
    for (status_idx, status) in pivot.statuses.iter().enumerate() {
        let style = series_color(status_idx).filled();
        let bars: Vec<_> = pivot
            .rows
            .iter()
            .enumerate()
            .map(|(row_idx, row)| {
                let bottom = stack_base[row_idx];
                let top = bottom + row.counts[status_idx];
                stack_base[row_idx] = top;
                segment_bar(row_idx, bottom, top, style)
            })
            .collect();
        chart
            .draw_series(bars)
            .map_err(chart_error)?
            .label(status.as_str())
            .legend(move |(x, y)| legend_swatch(x, y, status_idx));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.85))
        .border_style(&BLACK)
        .label_font(("sans-serif", 15))
        .draw()
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    Ok(())
}

pub fn render_stacked_percent(pivot: &StatusPivot, path: &Path) -> Result<(), AppError> {
    let model_names: Vec<String> = pivot.rows.iter().map(|row| row.model.clone()).collect();
    let shares = pivot.proportions();
    let (width, height) = bar_canvas_size(pivot.rows.len());
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("LLM share per status (stacked)", ("sans-serif", 28))
        .margin(16)
        .x_label_area_size(150)
        .y_label_area_size(70)
        .build_cartesian_2d((0..pivot.rows.len()).into_segmented(), 0f64..1.05f64)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(pivot.rows.len())
        .x_label_formatter(&|value| segment_label(value, &model_names))
        .x_label_style(
            ("sans-serif", 14)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .y_desc("Share of findings")
        .y_label_formatter(&|share| format!("{:.0}%", share * 100.0))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(chart_error)?;

    let mut stack_base = vec![0f64; pivot.rows.len()];
    for (status_idx, status) in pivot.statuses.iter().enumerate() {
        let style = series_color(status_idx).filled();
        let bars: Vec<_> = shares
            .iter()
            .enumerate()
            .map(|(row_idx, row_shares)| {
                let bottom = stack_base[row_idx];
                let top = bottom + row_shares[status_idx];
                stack_base[row_idx] = top;
                segment_bar(row_idx, bottom, top, style)
            })
            .collect();
        chart
            .draw_series(bars)
            .map_err(chart_error)?
            .label(status.as_str())
            .legend(move |(x, y)| legend_swatch(x, y, status_idx));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.85))
        .border_style(&BLACK)
        .label_font(("sans-serif", 15))
        .draw()
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    Ok(())
}

/// Grouped YES/NO bars. Returns false (nothing written) when the pivot has
/// neither a YES nor a NO column.
pub fn render_yes_no(pivot: &StatusPivot, path: &Path) -> Result<bool, AppError> {
    let yes_no = pivot.yes_no_indices();
    if yes_no.is_empty() {
        tracing::warn!("No YES/NO columns found, skipping the YES/NO chart");
        return Ok(false);
    }

    let model_names: Vec<String> = pivot.rows.iter().map(|row| row.model.clone()).collect();
    let (width, height) = bar_canvas_size(pivot.rows.len());
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let top_count = pivot
        .rows
        .iter()
        .flat_map(|row| yes_no.iter().map(|&idx| row.counts[idx]))
        .max()
        .unwrap_or(0);
    let y_max = top_count + (top_count / 20).max(1);

    let mut chart = ChartBuilder::on(&root)
        .caption("LLM YES vs NO (counts)", ("sans-serif", 28))
        .margin(16)
        .x_label_area_size(150)
        .y_label_area_size(70)
        .build_cartesian_2d((0..pivot.rows.len()).into_segmented(), 0u64..y_max)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(pivot.rows.len())
        .x_label_formatter(&|value| segment_label(value, &model_names))
        .x_label_style(
            ("sans-serif", 14)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .y_desc("Findings")
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(chart_error)?;

    // Side-by-side placement inside each model slot, expressed as pixel
    // margins on full-slot rectangles.
    let (plot_width, _) = chart.plotting_area().dim_in_pixel();
    let slot = (plot_width / pivot.rows.len() as u32).max(1);
    let group = yes_no.len() as u32;
    let sub_width = (slot * 4 / 5 / group).max(1);
    let pad = slot.saturating_sub(sub_width * group) / 2;

    for (position, &status_idx) in yes_no.iter().enumerate() {
        let style = series_color(status_idx).filled();
        let left = pad + position as u32 * sub_width;
        let right = slot.saturating_sub(left + sub_width);
        let bars: Vec<_> = pivot
            .rows
            .iter()
            .enumerate()
            .map(|(row_idx, row)| {
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(row_idx), 0u64),
                        (SegmentValue::Exact(row_idx + 1), row.counts[status_idx]),
                    ],
                    style,
                );
                bar.set_margin(0, 0, left, right);
                bar
            })
            .collect();
        chart
            .draw_series(bars)
            .map_err(chart_error)?
            .label(pivot.statuses[status_idx].as_str())
            .legend(move |(x, y)| legend_swatch(x, y, status_idx));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.85))
        .border_style(&BLACK)
        .label_font(("sans-serif", 15))
        .draw()
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    Ok(true)
}

pub fn render_heatmap(pivot: &StatusPivot, path: &Path) -> Result<(), AppError> {
    let n_rows = pivot.rows.len();
    let n_cols = pivot.statuses.len();
    let shares = pivot.proportions();

    // First pivot row drawn at the top, matching the bar chart order.
    let display_rows: Vec<String> = pivot
        .rows
        .iter()
        .rev()
        .map(|row| row.model.clone())
        .collect();

    let (width, height) = heatmap_canvas_size(n_rows, n_cols);
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Status share per LLM", ("sans-serif", 28))
        .margin(16)
        .x_label_area_size(50)
        .y_label_area_size(230)
        .build_cartesian_2d((0..n_cols).into_segmented(), (0..n_rows).into_segmented())
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(n_cols)
        .y_labels(n_rows)
        .x_label_formatter(&|value| segment_label(value, &pivot.statuses))
        .y_label_formatter(&|value| segment_label(value, &display_rows))
        .label_style(("sans-serif", 15))
        .draw()
        .map_err(chart_error)?;

    let mut cells = Vec::with_capacity(n_rows * n_cols);
    let mut annotations = Vec::with_capacity(n_rows * n_cols);
    for (row_idx, row_shares) in shares.iter().enumerate() {
        let y = n_rows - 1 - row_idx;
        for (col_idx, &share) in row_shares.iter().enumerate() {
            cells.push(Rectangle::new(
                [
                    (SegmentValue::Exact(col_idx), SegmentValue::Exact(y)),
                    (SegmentValue::Exact(col_idx + 1), SegmentValue::Exact(y + 1)),
                ],
                blues(share).filled(),
            ));
            let ink = if share > 0.5 { &WHITE } else { &BLACK };
            annotations.push(Text::new(
                format!("{:.2}", share),
                (SegmentValue::CenterOf(col_idx), SegmentValue::CenterOf(y)),
                ("sans-serif", 16)
                    .into_font()
                    .color(ink)
                    .pos(Pos::new(HPos::Center, VPos::Center)),
            ));
        }
    }
    chart.draw_series(cells).map_err(chart_error)?;
    chart.draw_series(annotations).map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    Ok(())
}

fn chart_error<E: std::fmt::Display>(err: E) -> AppError {
    AppError::Chart(err.to_string())
}

fn series_color(idx: usize) -> PaletteColor<Palette99> {
    Palette99::pick(idx)
}

fn segment_label(value: &SegmentValue<usize>, labels: &[String]) -> String {
    match value {
        SegmentValue::CenterOf(idx) | SegmentValue::Exact(idx) => {
            labels.get(*idx).cloned().unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    }
}

fn segment_bar<Y>(idx: usize, bottom: Y, top: Y, style: ShapeStyle) -> Rectangle<(SegmentValue<usize>, Y)> {
    let mut bar = Rectangle::new(
        [
            (SegmentValue::Exact(idx), bottom),
            (SegmentValue::Exact(idx + 1), top),
        ],
        style,
    );
    bar.set_margin(0, 0, 12, 12);
    bar
}

fn legend_swatch(x: i32, y: i32, status_idx: usize) -> Rectangle<(i32, i32)> {
    Rectangle::new(
        [(x, y - 6), (x + 12, y + 6)],
        series_color(status_idx).filled(),
    )
}

/// Light-to-dark ramp for proportion cells (0.0 near white, 1.0 dark blue).
fn blues(value: f64) -> RGBColor {
    let t = value.clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
    RGBColor(lerp(247, 8), lerp(251, 48), lerp(255, 107))
}

fn bar_canvas_size(models: usize) -> (u32, u32) {
    let width = (models as u32 * 180).clamp(1280, 3840);
    (width, 720)
}

fn heatmap_canvas_size(models: usize, statuses: usize) -> (u32, u32) {
    let width = (statuses as u32 * 160 + 360).clamp(900, 3840);
    let height = (models as u32 * 60 + 220).clamp(480, 2160);
    (width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PivotRow;

    fn make_pivot(statuses: &[&str], rows: &[(&str, &[u64])]) -> StatusPivot {
        StatusPivot {
            statuses: statuses.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|(model, counts)| PivotRow {
                    model: model.to_string(),
                    counts: counts.to_vec(),
                    total: counts.iter().sum(),
                })
                .collect(),
        }
    }

    #[test]
    fn renders_all_four_charts() {
        let pivot = make_pivot(
            &["ERROR", "NO", "YES"],
            &[("ModelA", &[1, 2, 4]), ("ModelB", &[0, 1, 1])],
        );
        let dir = tempfile::tempdir().unwrap();

        let written = render_all(&pivot, dir.path()).unwrap();
        assert_eq!(written.len(), 4);
        for name in [
            STACKED_COUNTS_FILE,
            STACKED_PERCENT_FILE,
            YES_NO_FILE,
            HEATMAP_FILE,
        ] {
            assert!(dir.path().join(name).is_file(), "missing {}", name);
        }
    }

    #[test]
    fn skips_yes_no_chart_without_yes_no_columns() {
        let pivot = make_pivot(
            &["ERROR", "N/A"],
            &[("ModelA", &[2, 1]), ("ModelB", &[1, 0])],
        );
        let dir = tempfile::tempdir().unwrap();

        let written = render_all(&pivot, dir.path()).unwrap();
        assert_eq!(written.len(), 3);
        assert!(!dir.path().join(YES_NO_FILE).exists());
        assert!(dir.path().join(STACKED_COUNTS_FILE).is_file());
        assert!(dir.path().join(STACKED_PERCENT_FILE).is_file());
        assert!(dir.path().join(HEATMAP_FILE).is_file());
    }

    #[test]
    fn writes_nothing_for_an_empty_pivot() {
        let pivot = make_pivot(&[], &[]);
        let dir = tempfile::tempdir().unwrap();

        let written = render_all(&pivot, dir.path()).unwrap();
        assert!(written.is_empty());
        assert!(!dir.path().join(STACKED_COUNTS_FILE).exists());
    }

    #[test]
    fn blues_ramp_spans_light_to_dark() {
        assert_eq!(blues(0.0), RGBColor(247, 251, 255));
        assert_eq!(blues(1.0), RGBColor(8, 48, 107));
        let mid = blues(0.5);
        assert!(mid.0 > 8 && mid.0 < 247);
    }
}
