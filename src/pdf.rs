//! Single-table PDF export of the loaded dataset.
//!
//! The document uses only the standard Helvetica fonts, so no font data is
//! embedded and every content stream stays plain ASCII.

use std::fmt::Write as _;
use std::ops::Range;
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::models::AttendanceDataset;
use crate::output::write_atomic;

pub const REPORT_FILE_NAME: &str = "attendance_report.pdf";
pub const REPORT_TITLE: &str = "Attendance Report";

// A4 in points.
const PAGE_WIDTH: f64 = 595.28;
const PAGE_HEIGHT: f64 = 841.89;
const MARGIN: f64 = 72.0;

const TITLE_SIZE: f64 = 18.0;
const TITLE_BLOCK: f64 = 42.0;
const FONT_SIZE: f64 = 10.0;
const CELL_PADDING: f64 = 6.0;
const ROW_HEIGHT: f64 = 18.0;
const HEADER_ROW_HEIGHT: f64 = 26.0;
const HEADER_BOTTOM_PADDING: f64 = 12.0;
const HEADER_FILL: &str = "0.678 0.847 0.902";

/// Helvetica advance widths (1/1000 em) for ASCII 32..=126.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "/F1",
            Font::Bold => "/F2",
        }
    }
}

fn text_width(text: &str, font: Font, size: f64) -> f64 {
    let units: f64 = text
        .chars()
        .map(|ch| {
            let code = ch as usize;
            if (32..=126).contains(&code) {
                HELVETICA_WIDTHS[code - 32] as f64
            } else {
                556.0
            }
        })
        .sum();
    // Bold glyphs run roughly 5% wider than the regular metrics.
    let scale = if font == Font::Bold { 1.05 } else { 1.0 };
    units * scale * size / 1000.0
}

/// Encodes text as a PDF literal string in WinAnsi; characters outside
/// Latin-1 become `?`.
fn pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('(');
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            ' '..='~' => out.push(ch),
            '\u{a0}'..='\u{ff}' => {
                let _ = write!(out, "\\{:03o}", ch as u32);
            }
            _ => out.push('?'),
        }
    }
    out.push(')');
    out
}

fn fit_text(text: &str, font: Font, width: f64) -> String {
    let available = width - 2.0 * CELL_PADDING;
    if text_width(text, font, FONT_SIZE) <= available {
        return text.to_string();
    }

    let mut fitted = String::new();
    for ch in text.chars() {
        let candidate = format!("{fitted}{ch}...");
        if text_width(&candidate, font, FONT_SIZE) > available {
            break;
        }
        fitted.push(ch);
    }
    fitted.push_str("...");
    fitted
}

struct TableLayout {
    widths: Vec<f64>,
    left: f64,
}

impl TableLayout {
    fn measure(header: &[String], rows: &[Vec<String>]) -> Self {
        let mut widths: Vec<f64> = header
            .iter()
            .map(|cell| text_width(cell, Font::Bold, FONT_SIZE) + 2.0 * CELL_PADDING)
            .collect();
        for row in rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = width.max(text_width(cell, Font::Regular, FONT_SIZE) + 2.0 * CELL_PADDING);
            }
        }

        let available = PAGE_WIDTH - 2.0 * MARGIN;
        let total: f64 = widths.iter().sum();
        if total > available {
            let scale = available / total;
            widths.iter_mut().for_each(|width| *width *= scale);
        }

        let total: f64 = widths.iter().sum();
        Self {
            widths,
            left: (PAGE_WIDTH - total) / 2.0,
        }
    }

    fn total_width(&self) -> f64 {
        self.widths.iter().sum()
    }
}

/// Splits `row_count` rows into per-page ranges. The first page also carries
/// the title; every page repeats the header row.
fn paginate(row_count: usize) -> Vec<Range<usize>> {
    let usable = PAGE_HEIGHT - 2.0 * MARGIN - HEADER_ROW_HEIGHT;
    let first_page = (((usable - TITLE_BLOCK) / ROW_HEIGHT).floor() as usize).max(1);
    let other_pages = ((usable / ROW_HEIGHT).floor() as usize).max(1);

    let mut pages = Vec::new();
    let mut start = 0;
    let mut capacity = first_page;
    loop {
        let end = (start + capacity).min(row_count);
        pages.push(start..end);
        if end >= row_count {
            break;
        }
        start = end;
        capacity = other_pages;
    }
    pages
}

struct PageWriter<'a> {
    layout: &'a TableLayout,
    stream: String,
    cursor: f64,
}

impl<'a> PageWriter<'a> {
    fn new(layout: &'a TableLayout) -> Self {
        Self {
            layout,
            stream: String::new(),
            cursor: PAGE_HEIGHT - MARGIN,
        }
    }

    fn title(&mut self, title: &str) {
        let width = text_width(title, Font::Bold, TITLE_SIZE);
        let x = (PAGE_WIDTH - width) / 2.0;
        let y = self.cursor - TITLE_SIZE;
        let _ = writeln!(
            self.stream,
            "BT {} {TITLE_SIZE:.0} Tf 0 g {x:.2} {y:.2} Td {} Tj ET",
            Font::Bold.resource(),
            pdf_string(title)
        );
        self.cursor -= TITLE_BLOCK;
    }

    fn row(&mut self, cells: &[String], header: bool) {
        let (height, font, baseline_offset) = if header {
            (HEADER_ROW_HEIGHT, Font::Bold, HEADER_BOTTOM_PADDING)
        } else {
            (ROW_HEIGHT, Font::Regular, (ROW_HEIGHT - FONT_SIZE) / 2.0 + 2.0)
        };
        let bottom = self.cursor - height;

        if header {
            let _ = writeln!(
                self.stream,
                "{HEADER_FILL} rg {:.2} {bottom:.2} {:.2} {height:.2} re f",
                self.layout.left,
                self.layout.total_width()
            );
        }

        let mut x = self.layout.left;
        for (width, cell) in self.layout.widths.iter().zip(cells) {
            let text = fit_text(cell, font, *width);
            let text_x = x + (width - text_width(&text, font, FONT_SIZE)) / 2.0;
            let _ = writeln!(
                self.stream,
                "0 0 0 RG 1 w {x:.2} {bottom:.2} {width:.2} {height:.2} re S"
            );
            let _ = writeln!(
                self.stream,
                "BT {} {FONT_SIZE:.0} Tf 0 g {text_x:.2} {:.2} Td {} Tj ET",
                font.resource(),
                bottom + baseline_offset,
                pdf_string(&text)
            );
            x += width;
        }

        self.cursor = bottom;
    }

    fn finish(self) -> String {
        self.stream
    }
}

/// Minimal PDF 1.4 object writer that records byte offsets for the xref table.
struct PdfDocument {
    buffer: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfDocument {
    fn new() -> Self {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n");
        Self {
            buffer,
            offsets: Vec::new(),
        }
    }

    fn object(&mut self, id: usize, body: &str) {
        debug_assert_eq!(id, self.offsets.len() + 1);
        self.offsets.push(self.buffer.len());
        self.buffer
            .extend_from_slice(format!("{id} 0 obj\n{body}\nendobj\n").as_bytes());
    }

    fn stream_object(&mut self, id: usize, content: &str) {
        let body = format!(
            "<< /Length {} >>\nstream\n{content}endstream",
            content.len()
        );
        self.object(id, &body);
    }

    fn finish(mut self, root: usize, info: usize) -> Vec<u8> {
        let xref_offset = self.buffer.len();
        let size = self.offsets.len() + 1;

        let mut xref = format!("xref\n0 {size}\n0000000000 65535 f \n");
        for offset in &self.offsets {
            let _ = write!(xref, "{offset:010} 00000 n \n");
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {size} /Root {root} 0 R /Info {info} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n"
        );

        self.buffer.extend_from_slice(xref.as_bytes());
        self.buffer
    }
}

pub fn render_pdf(dataset: &AttendanceDataset) -> Vec<u8> {
    let rows: Vec<Vec<String>> = (0..dataset.len())
        .filter_map(|index| dataset.row(index))
        .collect();
    let layout = TableLayout::measure(&dataset.columns, &rows);
    let pages = paginate(rows.len());

    const CATALOG: usize = 1;
    const PAGES: usize = 2;
    const FIRST_PAGE: usize = 6;

    let page_ids: Vec<usize> = (0..pages.len()).map(|i| FIRST_PAGE + 2 * i).collect();
    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");

    let mut doc = PdfDocument::new();
    doc.object(CATALOG, &format!("<< /Type /Catalog /Pages {PAGES} 0 R >>"));
    doc.object(
        PAGES,
        &format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", pages.len()),
    );
    doc.object(
        3,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    );
    doc.object(
        4,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
    );
    doc.object(
        5,
        &format!(
            "<< /Title {} /Producer (attendance-analyzer) >>",
            pdf_string(REPORT_TITLE)
        ),
    );

    for (page_index, range) in pages.iter().enumerate() {
        let mut page = PageWriter::new(&layout);
        if page_index == 0 {
            page.title(REPORT_TITLE);
        }
        page.row(&dataset.columns, true);
        for row in &rows[range.clone()] {
            page.row(row, false);
        }

        let page_id = page_ids[page_index];
        doc.object(
            page_id,
            &format!(
                "<< /Type /Page /Parent {PAGES} 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                page_id + 1
            ),
        );
        doc.stream_object(page_id + 1, &page.finish());
    }

    doc.finish(CATALOG, 5)
}

pub fn export_pdf(dataset: &AttendanceDataset, path: &Path) -> Result<()> {
    let bytes = render_pdf(dataset);
    write_atomic(path, &bytes)?;
    info!(
        path = %path.display(),
        rows = dataset.len(),
        bytes = bytes.len(),
        "exported attendance report"
    );
    Ok(())
}
