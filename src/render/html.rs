use askama::Template;

use crate::dtr_data::{DtrForm, CERTIFICATION, FORM_NUMBER, FORM_TITLE, VERIFIED_TEXT};
use crate::error::DtrResult;
use crate::render::RenderOptions;

/// Print-ready form, copies side by side (`templates/dtr.html`)
#[derive(Template)]
#[template(path = "dtr.html")]
struct DtrHtml<'a> {
    form: &'a DtrForm,
    copies: u32,
    month: String,
    regular_hours: String,
    form_number: &'static str,
    form_title: &'static str,
    certification: &'static str,
    verified_text: &'static str,
}

/// Standalone HTML document
pub fn render_html(form: &DtrForm, options: &RenderOptions) -> DtrResult<String> {
    let page = DtrHtml {
        form,
        copies: options.copies(),
        month: form.report.month_year_str(),
        regular_hours: form.schedule.regular_hours_str(),
        form_number: FORM_NUMBER,
        form_title: FORM_TITLE,
        certification: CERTIFICATION,
        verified_text: VERIFIED_TEXT,
    };
    Ok(page.render()?)
}
