//! Attached template files
//!
//! Checks a file against the allowed extensions and size limit for its
//! kind, and reads its content in a shape that depends on the extension.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::TemplateError;
use crate::model::ControlItem;

/// Largest accepted file, in bytes.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

const TEMPLATE_TYPES: &[&str] = &[".xlsx", ".xls", ".csv", ".json"];
const IMAGE_TYPES: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".svg"];
const DOCUMENT_TYPES: &[&str] = &[".pdf", ".doc", ".docx", ".txt"];

/// What a file is being attached as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FileKind {
    #[default]
    Template,
    Image,
    Document,
}

impl FileKind {
    /// Allowed extensions, lowercase with the leading dot.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            FileKind::Template => TEMPLATE_TYPES,
            FileKind::Image => IMAGE_TYPES,
            FileKind::Document => DOCUMENT_TYPES,
        }
    }
}

/// Metadata of a file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub size_formatted: String,
    pub extension: String,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Content read from a file.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateContent {
    Json(Value),
    /// CSV records keyed by trimmed header.
    Rows(Vec<BTreeMap<String, String>>),
    Text(String),
    Bytes(Vec<u8>),
}

impl TemplateContent {
    /// Control items described by the content.
    ///
    /// CSV headers match the item fields ignoring case, spaces and
    /// punctuation, so `Control ID` and `controlId` are the same column.
    pub fn control_items(&self) -> Vec<ControlItem> {
        match self {
            TemplateContent::Json(value) => ControlItem::list_from_json(value),
            TemplateContent::Rows(rows) => rows.iter().filter_map(control_from_record).collect(),
            TemplateContent::Text(_) | TemplateContent::Bytes(_) => Vec::new(),
        }
    }
}

/// Lowercase extension of `name` with the leading dot.
pub fn extension_of(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) => format!(".{}", ext.to_lowercase()),
        None => format!(".{}", name.to_lowercase()),
    }
}

/// Collect every reason `name`/`size` is not acceptable as `kind`.
pub fn validate_file(name: &str, size: u64, kind: FileKind) -> Vec<TemplateError> {
    let mut errors = Vec::new();
    if size > MAX_FILE_SIZE {
        errors.push(TemplateError::TooLarge {
            size,
            limit: MAX_FILE_SIZE,
        });
    }
    let extension = extension_of(name);
    let allowed = kind.extensions();
    if !allowed.contains(&extension.as_str()) {
        errors.push(TemplateError::Unsupported { extension, allowed });
    }
    errors
}

/// Metadata for the file at `path`.
pub async fn file_info(path: &Path) -> Result<FileInfo, TemplateError> {
    let metadata = tokio::fs::metadata(path).await?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let size = metadata.len();
    Ok(FileInfo {
        extension: extension_of(&name),
        name,
        size,
        size_formatted: format_file_size(size),
        last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
    })
}

/// Read a file according to its extension.
///
/// `.json` parses to a value, `.csv` to records, `.txt` to text and
/// anything else to raw bytes.
pub async fn read_template(path: &Path) -> Result<TemplateContent, TemplateError> {
    let extension = extension_of(&path.to_string_lossy());
    match extension.as_str() {
        ".json" => {
            let text = tokio::fs::read_to_string(path).await?;
            serde_json::from_str(&text)
                .map(TemplateContent::Json)
                .map_err(|e| TemplateError::Parse(e.to_string()))
        }
        ".csv" => {
            let text = tokio::fs::read_to_string(path).await?;
            parse_csv(&text).map(TemplateContent::Rows)
        }
        ".txt" => Ok(TemplateContent::Text(tokio::fs::read_to_string(path).await?)),
        _ => Ok(TemplateContent::Bytes(tokio::fs::read(path).await?)),
    }
}

/// Parse CSV text into records keyed by the trimmed header row.
///
/// Records whose width differs from the header are skipped.
pub fn parse_csv(text: &str) -> Result<Vec<BTreeMap<String, String>>, TemplateError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| TemplateError::Parse(e.to_string()))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| TemplateError::Parse(e.to_string()))?;
        if record.len() != headers.len() {
            continue;
        }
        rows.push(
            headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect(),
        );
    }
    Ok(rows)
}

/// Human-readable size, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", text, UNITS[unit])
}

fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn control_from_record(record: &BTreeMap<String, String>) -> Option<ControlItem> {
    let mut item = ControlItem::default();
    for (header, value) in record {
        match normalize_header(header).as_str() {
            "controlid" | "id" => item.control_id = value.clone(),
            "controlcategory" | "category" => item.control_category = value.clone(),
            "controldescription" | "description" => item.control_description = value.clone(),
            _ => {}
        }
    }
    (!item.control_id.is_empty()).then_some(item)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(10 * 1024 * 1024), "10 MB");
        assert_eq!(format_file_size(1_288_490_189), "1.2 GB");
    }

    #[test]
    fn test_validate_file() {
        assert!(validate_file("controls.CSV", 100, FileKind::Template).is_empty());

        let errors = validate_file("photo.png", MAX_FILE_SIZE + 1, FileKind::Template);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].to_string(), "File size exceeds 10MB limit");
        assert_eq!(
            errors[1].to_string(),
            "File type not supported. Allowed types: .xlsx, .xls, .csv, .json"
        );

        assert!(validate_file("photo.png", 10, FileKind::Image).is_empty());
    }

    #[test]
    fn test_parse_csv_trims_and_skips_ragged_rows() {
        let text = " controlId , controlCategory,controlDescription\n\
                    A.1, Access ,\"Review, quarterly\"\n\
                    A.2,Access\n\
                    \n\
                    B.1,Backup,Daily backups\n";
        let rows = parse_csv(text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["controlId"], "A.1");
        assert_eq!(rows[0]["controlCategory"], "Access");
        assert_eq!(rows[0]["controlDescription"], "Review, quarterly");
        assert_eq!(rows[1]["controlId"], "B.1");
    }

    #[test]
    fn test_control_items_from_csv_headers() {
        let rows = parse_csv("Control ID,Category,Description\nA.1,Access,Review\n,x,y\n").unwrap();
        let items = TemplateContent::Rows(rows).control_items();
        assert_eq!(items, [ControlItem::new("A.1", "Access", "Review")]);
    }

    #[tokio::test]
    async fn test_read_template_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("controls.json");
        std::fs::write(&json, r#"{"rows":[{"controlId":"A.1"}]}"#).unwrap();
        let content = read_template(&json).await.unwrap();
        assert_eq!(content.control_items().len(), 1);

        let txt = dir.path().join("notes.txt");
        std::fs::write(&txt, "hello").unwrap();
        assert_eq!(
            read_template(&txt).await.unwrap(),
            TemplateContent::Text("hello".into())
        );

        let bad = dir.path().join("broken.json");
        std::fs::write(&bad, "{").unwrap();
        assert!(matches!(
            read_template(&bad).await,
            Err(TemplateError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_file_info() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Controls.CSV");
        std::fs::write(&path, vec![b'x'; 2048]).unwrap();
        let info = file_info(&path).await.unwrap();
        assert_eq!(info.name, "Controls.CSV");
        assert_eq!(info.extension, ".csv");
        assert_eq!(info.size, 2048);
        assert_eq!(info.size_formatted, "2 KB");
    }
}
