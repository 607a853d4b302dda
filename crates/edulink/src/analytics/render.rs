//! Rendering a [`ReportTable`] into a downloadable artifact.

use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;

use super::report::{ReportFormat, ReportTable};
use super::ReportError;

/// Rendered report bytes plus the headers needed to serve them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub format: ReportFormat,
    pub content_type: &'static str,
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}

/// Metadata kept about the last artifact a scheduled report produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactSummary {
    pub filename: String,
    pub content_type: &'static str,
    pub size_bytes: usize,
}

impl From<&Artifact> for ArtifactSummary {
    fn from(artifact: &Artifact) -> Self {
        Self {
            filename: artifact.filename.clone(),
            content_type: artifact.content_type,
            size_bytes: artifact.bytes.len(),
        }
    }
}

pub fn render(table: &ReportTable, format: ReportFormat) -> Result<Artifact, ReportError> {
    let bytes = match format {
        ReportFormat::Csv => to_csv(table)?,
        ReportFormat::Xlsx => to_xlsx(table)?,
        ReportFormat::Json => serde_json::to_vec_pretty(table)?,
        ReportFormat::Html => to_html(table, false).into_bytes(),
        ReportFormat::Pdf => to_html(table, true).into_bytes(),
    };
    Ok(Artifact {
        format,
        content_type: format.content_type(),
        filename: filename(table, format),
        bytes,
    })
}

fn filename(table: &ReportTable, format: ReportFormat) -> String {
    format!(
        "{}-{}-{}-{}.{}",
        table.metric.label(),
        table.group_by.label(),
        table.from.format("%Y%m%d"),
        table.to.format("%Y%m%d"),
        format.extension()
    )
}

fn to_csv(table: &ReportTable) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        let count = row.count.to_string();
        writer.write_record([row.label.as_str(), count.as_str()])?;
    }
    let total = table.total.to_string();
    writer.write_record(["total", total.as_str()])?;
    writer
        .into_inner()
        .map_err(|err| ReportError::Csv(csv::Error::from(err.into_error())))
}

fn to_xlsx(table: &ReportTable) -> Result<Vec<u8>, ReportError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(table.metric.label())?;

    worksheet.write_string_with_format(0, 0, &table.title, &bold)?;
    for (col, header) in (0u16..).zip(&table.columns) {
        worksheet.write_string_with_format(2, col, header, &bold)?;
    }
    let mut row_index: u32 = 3;
    for row in &table.rows {
        worksheet.write_string(row_index, 0, &row.label)?;
        worksheet.write_number(row_index, 1, row.count as f64)?;
        row_index += 1;
    }
    worksheet.write_string_with_format(row_index, 0, "total", &bold)?;
    worksheet.write_number_with_format(row_index, 1, table.total as f64, &bold)?;

    Ok(workbook.save_to_buffer()?)
}

const PRINT_STYLE: &str = "@page { size: A4; margin: 2cm; } \
     body { font-family: serif; } \
     @media print { .no-print { display: none; } }";

fn to_html(table: &ReportTable, printable: bool) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(&table.title)));
    html.push_str(
        "<style>table { border-collapse: collapse; } th, td { border: 1px solid #999; padding: 4px 8px; }</style>\n",
    );
    if printable {
        html.push_str(&format!("<style media=\"print\">{PRINT_STYLE}</style>\n"));
    }
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape_html(&table.title)));
    html.push_str(&format!(
        "<p>Range: {}</p>\n<table>\n<thead><tr>",
        escape_html(&table.range_label())
    ));
    for header in &table.columns {
        html.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for row in &table.rows {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            escape_html(&row.label),
            row.count
        ));
    }
    html.push_str(&format!(
        "</tbody>\n<tfoot><tr><th>total</th><th>{}</th></tr></tfoot>\n</table>\n</body>\n</html>\n",
        table.total
    ));
    html
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
