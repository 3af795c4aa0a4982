use std::fmt::Display;
use std::path::Path;

use batch_core::{
    export_precheck, ApiVariant, ArticleRecord, CategoryRecord, ExportRefusal, ResultRecord,
};
use batch_logging::batch_info;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::persist::{AtomicFileWriter, PersistError};
use crate::types::ExportSummary;

pub const CSV_HEADER: &str = "url,code,label,relevance,abs_relevance";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xml,
    Csv,
}

impl ExportFormat {
    pub fn for_variant(variant: ApiVariant) -> Self {
        match variant {
            ApiVariant::Extraction => ExportFormat::Xml,
            ApiVariant::Categorization => ExportFormat::Csv,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("export refused: {0}")]
    Refused(ExportRefusal),
    #[error("render error: {0}")]
    Render(String),
    #[error("write failed: {0}")]
    Io(#[from] PersistError),
}

/// Renders the records and writes them to `destination` in one atomic step.
/// Refusals are decided before anything touches the filesystem.
pub fn export_results(
    records: &[ResultRecord],
    destination: Option<&Path>,
    format: ExportFormat,
) -> Result<ExportSummary, ExportError> {
    let destination = export_precheck(destination, records).map_err(ExportError::Refused)?;
    let content = match format {
        ExportFormat::Xml => render_xml(records)?,
        ExportFormat::Csv => render_csv(records),
    };
    let path = AtomicFileWriter::new(destination).write(content.as_bytes())?;
    batch_info!("exported {} records to {}", records.len(), path.display());
    Ok(ExportSummary {
        path,
        record_count: records.len(),
    })
}

/// Pretty-printed `Posts` document, one `Post` per record with 1-based ids.
pub fn render_xml(records: &[ResultRecord]) -> Result<String, ExportError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(render_err)?;
    writer
        .write_event(Event::Start(BytesStart::new("Posts")))
        .map_err(render_err)?;

    for (index, record) in records.iter().enumerate() {
        let id = (index + 1).to_string();
        let mut post = BytesStart::new("Post");
        post.push_attribute(("id", id.as_str()));
        writer.write_event(Event::Start(post)).map_err(render_err)?;
        match record {
            ResultRecord::Article(article) => write_article(&mut writer, article)?,
            ResultRecord::Categories(categories) => write_categories(&mut writer, categories)?,
        }
        writer
            .write_event(Event::End(BytesEnd::new("Post")))
            .map_err(render_err)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("Posts")))
        .map_err(render_err)?;
    let mut xml = String::from_utf8(writer.into_inner()).map_err(render_err)?;
    xml.push('\n');
    Ok(xml)
}

fn write_article(writer: &mut Writer<Vec<u8>>, article: &ArticleRecord) -> Result<(), ExportError> {
    write_text(writer, "Title", Some(&article.title))?;
    write_text(writer, "Html", Some(&article.html))?;
    write_text(writer, "OriginalHtml", Some(&article.raw_html))?;
    write_text(writer, "Text", article.text.as_deref())?;
    write_text(writer, "Url", Some(&article.url))?;
    write_text(writer, "Description", article.description.as_deref())?;
    if article.images.is_empty() {
        return write_text(writer, "Images", None);
    }
    writer
        .write_event(Event::Start(BytesStart::new("Images")))
        .map_err(render_err)?;
    for image in &article.images {
        write_text(writer, "Image", Some(image))?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("Images")))
        .map_err(render_err)?;
    Ok(())
}

fn write_categories(
    writer: &mut Writer<Vec<u8>>,
    record: &CategoryRecord,
) -> Result<(), ExportError> {
    write_text(writer, "Url", Some(&record.url))?;
    if record.categories.is_empty() {
        return write_text(writer, "Categories", None);
    }
    writer
        .write_event(Event::Start(BytesStart::new("Categories")))
        .map_err(render_err)?;
    for category in &record.categories {
        writer
            .write_event(Event::Start(BytesStart::new("Category")))
            .map_err(render_err)?;
        write_text(writer, "Code", Some(&category.code))?;
        write_text(writer, "Label", Some(&category.label))?;
        write_text(writer, "Relevance", Some(&category.relevance))?;
        write_text(writer, "AbsRelevance", Some(&category.abs_relevance))?;
        writer
            .write_event(Event::End(BytesEnd::new("Category")))
            .map_err(render_err)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("Categories")))
        .map_err(render_err)?;
    Ok(())
}

/// `<name>text</name>`, or `<name/>` when there is nothing to write.
fn write_text(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: Option<&str>,
) -> Result<(), ExportError> {
    match text.filter(|text| !text.is_empty()) {
        Some(text) => {
            writer
                .write_event(Event::Start(BytesStart::new(name)))
                .map_err(render_err)?;
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(render_err)?;
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(render_err)?;
        }
        None => {
            writer
                .write_event(Event::Empty(BytesStart::new(name)))
                .map_err(render_err)?;
        }
    }
    Ok(())
}

fn render_err<E: Display>(err: E) -> ExportError {
    ExportError::Render(err.to_string())
}

/// One row per record; only the first category of each record is written.
pub fn render_csv(records: &[ResultRecord]) -> String {
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');
    for record in records {
        let first = record.categories().first();
        let field = |value: Option<&String>| quote(value.map(String::as_str).unwrap_or_default());
        let row = [
            url_field(record.source_url()),
            field(first.map(|c| &c.code)),
            field(first.map(|c| &c.label)),
            field(first.map(|c| &c.relevance)),
            field(first.map(|c| &c.abs_relevance)),
        ];
        csv.push_str(&row.join(","));
        csv.push('\n');
    }
    csv
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn url_field(url: &str) -> String {
    if url.contains([',', '"', '\n', '\r']) {
        quote(url)
    } else {
        url.to_string()
    }
}
