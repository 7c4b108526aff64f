use printpdf::*;
use lopdf::{Dictionary, Document, Object};
use std::io::Cursor;
use std::path::Path;

use crate::dtr_data::{DayEntry, DtrForm, CERTIFICATION, FORM_NUMBER, FORM_TITLE, VERIFIED_TEXT};
use crate::error::{DtrError, DtrResult};
use crate::render::RenderOptions;

/// A4 landscape
const PAGE_WIDTH_MM: f64 = 297.0;
const PAGE_HEIGHT_MM: f64 = 210.0;
const MARGIN_MM: f64 = 8.0;
const GAP_MM: f64 = 10.0;

/// Column share of the form width: Day, 4 times, undertime hours/minutes
const COLUMN_RATIOS: [f64; 7] = [0.10, 0.17, 0.17, 0.17, 0.17, 0.11, 0.11];

const DAY_ROW_H: f64 = 3.4;
const HEADER_ROW_H: f64 = 4.0;

/// mm → Mm
fn mm(val: f64) -> Mm {
    Mm(val as f32)
}

/// Advance width in em, grouped from the Helvetica metrics
fn char_em(c: char) -> f64 {
    match c {
        'i' | 'j' | 'l' => 0.222,
        ' ' | '.' | ',' | ':' | ';' | '!' | '\'' | '|' | 'I' | 'f' | 't' | '/' => 0.278,
        'r' | '(' | ')' | '-' | '[' | ']' => 0.333,
        'm' | 'M' => 0.833,
        'W' => 0.944,
        'w' => 0.722,
        'J' => 0.5,
        'A'..='Z' => 0.7,
        '0'..='9' | 'a'..='z' => 0.556,
        _ if c.is_ascii() => 0.584,
        _ => 1.0,
    }
}

/// Approximate rendered width
fn text_width_mm(text: &str, font_size_pt: f32) -> f64 {
    let em_mm = font_size_pt as f64 * 0.352778; // 1pt = 0.352778mm
    text.chars().map(|c| char_em(c) * em_mm).sum()
}

/// Largest size not above `font_size_pt` at which the text fits `max_width_mm`
fn fit_font_size(text: &str, max_width_mm: f64, font_size_pt: f32) -> f32 {
    let width = text_width_mm(text, font_size_pt);
    if width <= max_width_mm || width <= 0.0 {
        font_size_pt
    } else {
        (font_size_pt as f64 * max_width_mm / width) as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
}

/// Text X for a cell
fn calc_text_x(cell_x: f64, cell_w: f64, text: &str, font_size_pt: f32, align: Align) -> f64 {
    let padding = 0.5;
    match align {
        Align::Center => cell_x + (cell_w - text_width_mm(text, font_size_pt)) / 2.0,
        Align::Left => cell_x + padding,
    }
}

/// Top-left origin → PDF bottom-left origin, baseline centred in the cell
fn y_convert_text(y_mm: f64, h_mm: f64, font_size_pt: f32) -> Mm {
    let font_size_mm = font_size_pt as f64 * 0.352778;
    let descender = font_size_mm * 0.2;
    let text_y = y_mm + (h_mm + font_size_mm) / 2.0 - descender;
    mm(PAGE_HEIGHT_MM - text_y)
}

/// Y conversion for rectangles and lines
fn y_convert(y_mm: f64) -> Mm {
    mm(PAGE_HEIGHT_MM - y_mm)
}

/// Greedy word wrap against the approximate width
fn wrap_text(text: &str, max_width_mm: f64, font_size_pt: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if !current.is_empty() && text_width_mm(&candidate, font_size_pt) > max_width_mm {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn pdf_err(err: impl std::fmt::Display) -> DtrError {
    DtrError::Pdf(err.to_string())
}

/// Builtin fonts only cover WinAnsi
fn builtin_safe(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '–' | '—' => '-',
            _ => c,
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
enum Style {
    Regular,
    Bold,
    Italic,
}

/// Single-page DTR document on top of printpdf
pub struct DtrPdf {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    builtin: bool,
}

impl DtrPdf {
    pub fn new(title: &str, font_path: Option<&Path>) -> DtrResult<Self> {
        let (doc, page, layer) =
            PdfDocument::new(title, mm(PAGE_WIDTH_MM), mm(PAGE_HEIGHT_MM), "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);

        let (regular, bold, italic, builtin) = match font_path {
            Some(path) => {
                let font_data = std::fs::read(path)?;
                let font = doc.add_external_font(Cursor::new(font_data)).map_err(pdf_err)?;
                (font.clone(), font.clone(), font, false)
            }
            None => (
                doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?,
                doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?,
                doc.add_builtin_font(BuiltinFont::HelveticaOblique).map_err(pdf_err)?,
                true,
            ),
        };

        layer.set_outline_thickness(0.2);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            italic,
            builtin,
        })
    }

    fn font(&self, style: Style) -> &IndirectFontRef {
        match style {
            Style::Regular => &self.regular,
            Style::Bold => &self.bold,
            Style::Italic => &self.italic,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn text(&self, x: f64, y: f64, w: f64, h: f64, text: &str, size: f32, align: Align, style: Style) {
        if text.trim().is_empty() {
            return;
        }
        let text = if self.builtin { builtin_safe(text) } else { text.to_string() };
        let size = fit_font_size(&text, w - 1.0, size);
        let text_x = calc_text_x(x, w, &text, size, align);
        self.layer
            .use_text(text, size, mm(text_x), y_convert_text(y, h, size), self.font(style));
    }

    /// Bordered cell with centred text
    #[allow(clippy::too_many_arguments)]
    fn cell(&self, x: f64, y: f64, w: f64, h: f64, text: &str, size: f32, style: Style) {
        self.draw_rect(x, y, w, h);
        self.text(x, y, w, h, text, size, Align::Center, style);
    }

    fn hline(&self, x1: f64, x2: f64, y: f64) {
        let points = vec![
            (Point::new(mm(x1), y_convert(y)), false),
            (Point::new(mm(x2), y_convert(y)), false),
        ];
        self.layer.add_line(Line {
            points,
            is_closed: false,
        });
    }

    fn draw_rect(&self, x: f64, y: f64, w: f64, h: f64) {
        let points = vec![
            (Point::new(mm(x), y_convert(y)), false),
            (Point::new(mm(x + w), y_convert(y)), false),
            (Point::new(mm(x + w), y_convert(y + h)), false),
            (Point::new(mm(x), y_convert(y + h)), false),
        ];
        self.layer.add_line(Line {
            points,
            is_closed: true,
        });
    }

    /// Draw one copy of the form with its left edge at `x0`
    pub fn render_form(&self, form: &DtrForm, x0: f64, width: f64) {
        let mut y = 6.0;

        self.text(x0, y, width, 3.5, FORM_NUMBER, 6.0, Align::Left, Style::Italic);
        y += 3.5;
        let [country, agency, division, school] = form.header.lines();
        for line in [country, agency, division] {
            self.text(x0, y, width, 3.5, line, 7.5, Align::Center, Style::Regular);
            y += 3.5;
        }
        self.text(x0, y, width, 3.5, school, 7.5, Align::Center, Style::Bold);
        y += 4.0;
        self.text(x0, y, width, 5.0, FORM_TITLE, 10.0, Align::Center, Style::Bold);
        y += 5.0;
        self.text(x0, y, width, 3.0, "---o0o---", 6.0, Align::Center, Style::Regular);
        y += 4.5;

        // name block
        let name = form.employee_name.to_uppercase();
        self.text(x0, y, width, 4.5, &name, 9.0, Align::Center, Style::Bold);
        self.hline(x0, x0 + width, y + 4.5);
        y += 5.0;
        self.text(x0, y, width, 3.0, "(Name)", 6.5, Align::Center, Style::Regular);
        y += 3.5;

        // official hours
        let label_w = width * 0.42;
        let details = [
            ("For the month of:", Some(form.report.month_year_str())),
            ("Official hours for arrival and departure:", None),
            ("Regular days:", Some(form.schedule.regular_hours_str())),
            ("Saturday:", Some(form.schedule.saturday_policy.clone())),
        ];
        for (label, value) in details {
            self.text(x0, y, label_w, 3.5, label, 6.5, Align::Left, Style::Regular);
            if let Some(value) = value {
                self.text(x0 + label_w, y, width - label_w, 3.5, &value, 7.0, Align::Center, Style::Bold);
                self.hline(x0 + label_w, x0 + width, y + 3.5);
            }
            y += 3.5;
        }
        y += 1.0;

        // table
        let widths: Vec<f64> = COLUMN_RATIOS.iter().map(|r| r * width).collect();
        let xs: Vec<f64> = widths
            .iter()
            .scan(x0, |x, w| {
                let start = *x;
                *x += w;
                Some(start)
            })
            .collect();
        let span = |from: usize, to: usize| widths[from..=to].iter().sum::<f64>();

        self.cell(xs[0], y, widths[0], HEADER_ROW_H * 2.0, "Day", 6.5, Style::Bold);
        self.cell(xs[1], y, span(1, 2), HEADER_ROW_H, "A.M.", 6.5, Style::Bold);
        self.cell(xs[3], y, span(3, 4), HEADER_ROW_H, "P.M.", 6.5, Style::Bold);
        self.cell(xs[5], y, span(5, 6), HEADER_ROW_H, "Undertime", 6.5, Style::Bold);
        y += HEADER_ROW_H;
        let sub_headers = ["Arrival", "Departure", "Arrival", "Departure", "Hours", "Minutes"];
        for (i, text) in sub_headers.iter().enumerate() {
            self.cell(xs[i + 1], y, widths[i + 1], HEADER_ROW_H, text, 6.0, Style::Bold);
        }
        y += HEADER_ROW_H;

        for row in &form.report.days {
            self.cell(xs[0], y, widths[0], DAY_ROW_H, &row.day.to_string(), 6.5, Style::Regular);
            match row.entry {
                DayEntry::Weekend { day_name } => {
                    self.cell(xs[1], y, span(1, 6), DAY_ROW_H, day_name.label(), 6.5, Style::Bold);
                }
                _ => {
                    for (i, text) in row.cells().iter().enumerate() {
                        self.cell(xs[i + 1], y, widths[i + 1], DAY_ROW_H, text, 6.5, Style::Regular);
                    }
                }
            }
            y += DAY_ROW_H;
        }

        let total = form.report.total;
        self.cell(xs[0], y, widths[0], HEADER_ROW_H, "TOTAL", 6.5, Style::Bold);
        self.cell(xs[1], y, span(1, 4), HEADER_ROW_H, "", 6.5, Style::Regular);
        self.cell(xs[5], y, widths[5], HEADER_ROW_H, &total.hours.to_string(), 6.5, Style::Bold);
        self.cell(xs[6], y, widths[6], HEADER_ROW_H, &total.minutes.to_string(), 6.5, Style::Bold);
        y += HEADER_ROW_H + 1.0;

        // footer
        for line in wrap_text(CERTIFICATION, width - 1.0, 6.0) {
            self.text(x0, y, width, 2.6, &line, 6.0, Align::Left, Style::Italic);
            y += 2.6;
        }
        y += 5.5;
        self.hline(x0 + width * 0.1, x0 + width * 0.9, y);
        self.text(x0, y + 0.5, width, 3.0, "(Signature of Employee)", 6.0, Align::Center, Style::Regular);
        y += 4.5;
        self.text(x0, y, width, 2.5, VERIFIED_TEXT, 6.0, Align::Left, Style::Regular);
        y += 8.5;
        self.hline(x0 + width * 0.2, x0 + width * 0.8, y);
        self.text(x0, y + 0.5, width, 3.0, &form.header.verifier_title, 6.5, Align::Center, Style::Bold);
    }

    /// Serialize, then stamp the document info with lopdf
    pub fn save_to_bytes(self, form: &DtrForm) -> DtrResult<Vec<u8>> {
        let bytes = self
            .doc
            .save_to_bytes()
            .map_err(pdf_err)?;
        set_document_info(&bytes, form)
    }
}

fn set_document_info(bytes: &[u8], form: &DtrForm) -> DtrResult<Vec<u8>> {
    let mut doc = Document::load_mem(bytes)?;
    let month = form.report.month_year_str();

    let info = Dictionary::from_iter(vec![
        ("Title", Object::string_literal(format!("{} - {}", FORM_TITLE, month))),
        ("Author", Object::string_literal(form.employee_name.as_str())),
        ("Subject", Object::string_literal(month.as_str())),
        ("Creator", Object::string_literal("dtr-pdf-rs")),
    ]);
    let info_id = doc.add_object(Object::Dictionary(info));
    doc.trailer.set("Info", Object::Reference(info_id));

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

/// A4 landscape PDF, copies side by side
pub fn render_pdf(form: &DtrForm, options: &RenderOptions) -> DtrResult<Vec<u8>> {
    let title = format!("{} - {}", FORM_TITLE, form.report.month_year_str());
    let pdf = DtrPdf::new(&title, options.pdf_font.as_deref())?;

    let copy_width = (PAGE_WIDTH_MM - 2.0 * MARGIN_MM - GAP_MM) / 2.0;
    let copies = options.copies();
    let first_x = if copies == 1 {
        (PAGE_WIDTH_MM - copy_width) / 2.0
    } else {
        MARGIN_MM
    };
    for copy in 0..copies {
        let x0 = first_x + copy as f64 * (copy_width + GAP_MM);
        pdf.render_form(form, x0, copy_width);
    }

    pdf.save_to_bytes(form)
}
