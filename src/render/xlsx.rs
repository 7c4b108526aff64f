use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatUnderline, Workbook, Worksheet, XlsxError};

use crate::dtr_data::{DayEntry, DtrForm, CERTIFICATION, FORM_NUMBER, FORM_TITLE, VERIFIED_TEXT};
use crate::error::DtrResult;
use crate::render::RenderOptions;

/// Columns per copy: Day + 4 times + 2 undertime
const FORM_COLUMNS: u16 = 7;
/// First table row (after the header block)
const TABLE_HEADER_ROW: u32 = 15;

/// Shared cell formats
struct Formats {
    plain: Format,
    italic: Format,
    centered: Format,
    bold_centered: Format,
    title: Format,
    name: Format,
    value: Format,
    column_header: Format,
    cell: Format,
    weekend: Format,
    total: Format,
    certify: Format,
    signature_line: Format,
}

impl Formats {
    fn new() -> Self {
        let base = Format::new().set_font_name("Arial").set_font_size(9);
        let centered = base
            .clone()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);
        let cell = centered.clone().set_border(FormatBorder::Thin);

        Self {
            plain: base.clone(),
            italic: base.clone().set_italic(),
            bold_centered: centered.clone().set_bold(),
            title: centered
                .clone()
                .set_bold()
                .set_font_size(14)
                .set_underline(FormatUnderline::Single),
            name: centered
                .clone()
                .set_bold()
                .set_font_size(12)
                .set_border_bottom(FormatBorder::Thin),
            value: centered.clone().set_bold().set_border_bottom(FormatBorder::Thin),
            column_header: cell
                .clone()
                .set_bold()
                .set_background_color(Color::RGB(0xF0F0F0)),
            weekend: cell.clone().set_bold(),
            total: cell.clone().set_bold(),
            certify: base
                .clone()
                .set_italic()
                .set_text_wrap()
                .set_align(FormatAlign::Top),
            signature_line: base.clone().set_border_top(FormatBorder::Thin),
            cell,
            centered,
        }
    }
}

/// Workbook with one "DTR" sheet, copies side by side with a spacer column
pub fn render_xlsx(form: &DtrForm, options: &RenderOptions) -> DtrResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let formats = Formats::new();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("DTR")?;
    worksheet.set_landscape();
    worksheet.set_paper_size(9); // A4

    for copy in 0..options.copies() {
        let col = (copy as u16) * (FORM_COLUMNS + 1);
        write_copy(worksheet, &formats, form, col)?;
        if copy + 1 < options.copies() {
            worksheet.set_column_width(col + FORM_COLUMNS, 3)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Merge a full-width line of the form
fn full_line(ws: &mut Worksheet, row: u32, col: u16, text: &str, format: &Format) -> Result<(), XlsxError> {
    ws.merge_range(row, col, row, col + FORM_COLUMNS - 1, text, format)?;
    Ok(())
}

/// Label in the first two columns, value underlined across the rest
fn detail_line(
    ws: &mut Worksheet,
    formats: &Formats,
    row: u32,
    col: u16,
    label: &str,
    value: &str,
) -> Result<(), XlsxError> {
    ws.merge_range(row, col, row, col + 1, label, &formats.plain)?;
    ws.merge_range(row, col + 2, row, col + FORM_COLUMNS - 1, value, &formats.value)?;
    Ok(())
}

fn write_copy(ws: &mut Worksheet, formats: &Formats, form: &DtrForm, col: u16) -> Result<(), XlsxError> {
    ws.set_column_width(col, 6)?;
    for offset in 1..FORM_COLUMNS {
        ws.set_column_width(col + offset, 10)?;
    }

    // header block
    full_line(ws, 0, col, FORM_NUMBER, &formats.italic)?;
    let [country, agency, division, school] = form.header.lines();
    full_line(ws, 1, col, country, &formats.centered)?;
    full_line(ws, 2, col, agency, &formats.centered)?;
    full_line(ws, 3, col, division, &formats.centered)?;
    full_line(ws, 4, col, school, &formats.bold_centered)?;
    full_line(ws, 5, col, FORM_TITLE, &formats.title)?;
    full_line(ws, 6, col, "---o0o---", &formats.centered)?;

    full_line(ws, 8, col, &form.employee_name.to_uppercase(), &formats.name)?;
    full_line(ws, 9, col, "(Name)", &formats.centered)?;
    detail_line(ws, formats, 10, col, "For the month of:", &form.report.month_year_str())?;
    full_line(ws, 11, col, "Official hours for arrival and departure:", &formats.plain)?;
    detail_line(ws, formats, 12, col, "Regular days:", &form.schedule.regular_hours_str())?;
    detail_line(ws, formats, 13, col, "Saturday:", &form.schedule.saturday_policy)?;

    // table header
    let head = TABLE_HEADER_ROW;
    let header_fmt = &formats.column_header;
    ws.merge_range(head, col, head + 1, col, "Day", header_fmt)?;
    ws.merge_range(head, col + 1, head, col + 2, "A.M.", header_fmt)?;
    ws.merge_range(head, col + 3, head, col + 4, "P.M.", header_fmt)?;
    ws.merge_range(head, col + 5, head, col + 6, "Undertime", header_fmt)?;
    let sub_headers = ["Arrival", "Departure", "Arrival", "Departure", "Hours", "Minutes"];
    for (offset, text) in sub_headers.iter().enumerate() {
        ws.write_string_with_format(head + 1, col + 1 + offset as u16, *text, header_fmt)?;
    }

    // day rows
    let mut row = head + 2;
    for day in &form.report.days {
        ws.write_number_with_format(row, col, day.day, &formats.cell)?;
        match day.entry {
            DayEntry::Weekend { day_name } => {
                ws.merge_range(row, col + 1, row, col + 6, day_name.label(), &formats.weekend)?;
            }
            DayEntry::NoData => {
                for offset in 1..FORM_COLUMNS {
                    ws.write_blank(row, col + offset, &formats.cell)?;
                }
            }
            DayEntry::Worked { undertime, .. } => {
                let cells = day.cells();
                for (offset, text) in cells[..4].iter().enumerate() {
                    let c = col + 1 + offset as u16;
                    if text.is_empty() {
                        ws.write_blank(row, c, &formats.cell)?;
                    } else {
                        ws.write_string_with_format(row, c, text, &formats.cell)?;
                    }
                }
                ws.write_number_with_format(row, col + 5, undertime.hours, &formats.cell)?;
                ws.write_number_with_format(row, col + 6, undertime.minutes, &formats.cell)?;
            }
        }
        row += 1;
    }

    // totals
    let total = form.report.total;
    ws.write_string_with_format(row, col, "TOTAL", &formats.total)?;
    ws.merge_range(row, col + 1, row, col + 4, "", &formats.total)?;
    ws.write_number_with_format(row, col + 5, total.hours, &formats.total)?;
    ws.write_number_with_format(row, col + 6, total.minutes, &formats.total)?;

    // certification and signatures
    let footer = row + 2;
    ws.merge_range(footer, col, footer + 2, col + FORM_COLUMNS - 1, CERTIFICATION, &formats.certify)?;
    ws.merge_range(footer + 5, col + 1, footer + 5, col + 5, "", &formats.signature_line)?;
    full_line(ws, footer + 6, col, "(Signature of Employee)", &formats.centered)?;
    full_line(ws, footer + 8, col, VERIFIED_TEXT, &formats.plain)?;
    ws.merge_range(footer + 11, col + 2, footer + 11, col + 4, "", &formats.signature_line)?;
    full_line(ws, footer + 12, col, &form.header.verifier_title, &formats.bold_centered)?;

    Ok(())
}
