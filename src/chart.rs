use std::path::Path;

use plotters::prelude::*;
use plotters::style::FontTransform;
use tracing::info;

use crate::error::{AttendanceError, Result};
use crate::models::AttendanceSummary;
use crate::output::write_atomic;

pub const CHART_FILE_NAME: &str = "attendance_summary.svg";

const SIZE: (u32, u32) = (1000, 600);
const FONT: &str = "sans-serif";

/// Dark-to-light ramp sampled from the magma colour map.
const PALETTE: [RGBColor; 6] = [
    RGBColor(0x22, 0x11, 0x50),
    RGBColor(0x5f, 0x18, 0x7f),
    RGBColor(0x98, 0x2d, 0x80),
    RGBColor(0xd3, 0x43, 0x6e),
    RGBColor(0xf8, 0x76, 0x5c),
    RGBColor(0xfe, 0xbb, 0x81),
];

fn bar_color(index: usize, count: usize) -> RGBColor {
    if count <= 1 {
        return PALETTE[PALETTE.len() / 2];
    }
    PALETTE[index * (PALETTE.len() - 1) / (count - 1)]
}

fn chart_error(err: impl std::fmt::Display) -> AttendanceError {
    AttendanceError::Chart(err.to_string())
}

pub fn render_bar_chart(summary: &AttendanceSummary) -> Result<String> {
    let names: Vec<&str> = summary
        .students
        .iter()
        .map(|student| student.student_name.as_str())
        .collect();
    let count = names.len();
    let mut svg = String::new();

    {
        let root = SVGBackend::with_string(&mut svg, SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Student Attendance Percentage", (FONT, 24))
            .margin(20)
            .x_label_area_size(140)
            .y_label_area_size(60)
            .build_cartesian_2d((0..count.max(1)).into_segmented(), 0f64..100f64)
            .map_err(chart_error)?;

        let label = |value: &SegmentValue<usize>| match value {
            SegmentValue::CenterOf(index) => names
                .get(*index)
                .map(|name| name.to_string())
                .unwrap_or_default(),
            _ => String::new(),
        };

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(count.max(1))
            .x_label_formatter(&label)
            .x_label_style((FONT, 12).into_font().transform(FontTransform::Rotate90))
            .y_labels(6)
            .x_desc("Student Name")
            .y_desc("Attendance (%)")
            .draw()
            .map_err(chart_error)?;

        chart
            .draw_series(summary.students.iter().enumerate().map(|(index, student)| {
                let top = student.percentage.clamp(0.0, 100.0);
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(index), 0.0),
                        (SegmentValue::Exact(index + 1), top),
                    ],
                    bar_color(index, count).filled(),
                );
                bar.set_margin(0, 0, 6, 6);
                bar
            }))
            .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
    }

    Ok(svg)
}

pub fn write_bar_chart(summary: &AttendanceSummary, path: &Path) -> Result<()> {
    let svg = render_bar_chart(summary)?;
    write_atomic(path, svg.as_bytes())?;
    info!(path = %path.display(), students = summary.students.len(), "wrote attendance chart");
    Ok(())
}
