//! One renderer per output format. All of them read a finished [`DtrForm`];
//! day classification happens once in `month_table`.

pub mod html;
pub mod pdf;
pub mod xlsx;

use std::path::{Path, PathBuf};

use tracing::info;

use crate::dtr_data::DtrForm;
use crate::error::{DtrError, DtrResult};

/// Output document format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Html,
    Xlsx,
    Pdf,
}

impl OutputFormat {
    /// "html" / "xlsx" / "pdf", case-insensitive
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "html" | "htm" => Some(OutputFormat::Html),
            "xlsx" | "excel" | "spreadsheet" => Some(OutputFormat::Xlsx),
            "pdf" => Some(OutputFormat::Pdf),
            _ => None,
        }
    }

    pub fn from_extension(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_name)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Pdf => "pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Html => "text/html; charset=utf-8",
            OutputFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            OutputFormat::Pdf => "application/pdf",
        }
    }
}

/// Layout options shared by every format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub copies: u32,               // identical forms side by side
    pub pdf_font: Option<PathBuf>, // TTF for the PDF, builtin Helvetica when None
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            copies: 2,
            pdf_font: None,
        }
    }
}

impl RenderOptions {
    pub(crate) fn copies(&self) -> u32 {
        self.copies.clamp(1, 2)
    }
}

pub fn render(form: &DtrForm, format: OutputFormat, options: &RenderOptions) -> DtrResult<Vec<u8>> {
    let bytes = match format {
        OutputFormat::Html => html::render_html(form, options)?.into_bytes(),
        OutputFormat::Xlsx => xlsx::render_xlsx(form, options)?,
        OutputFormat::Pdf => pdf::render_pdf(form, options)?,
    };

    info!(
        employee = %form.employee_name,
        month = %form.report.month_year_str(),
        format = format.extension(),
        bytes = bytes.len(),
        "rendered DTR"
    );
    Ok(bytes)
}

/// Render and write to `path`, picking the format from its extension
pub fn render_to_file(form: &DtrForm, path: &Path, options: &RenderOptions) -> DtrResult<()> {
    let format = OutputFormat::from_extension(path).ok_or_else(|| {
        DtrError::InvalidRequest(format!(
            "unsupported output extension: {}",
            path.display()
        ))
    })?;
    let bytes = render(form, format, options)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
