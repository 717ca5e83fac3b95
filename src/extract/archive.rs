//! ZIP export support
//!
//! The phone exports `export.zip` containing `apple_health_export/export.xml`
//! next to clinical records and workout routes. Only the main export document
//! is read, streamed straight out of the archive.

use crate::extract::dataset::Dataset;
use crate::extract::error::{ExtractError, ExtractResult};
use crate::extract::reader::{RecordExtractor, DEFAULT_READ_BUFFER};
use std::io::{BufReader, Read, Seek};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Check for the local file header signature
pub fn is_zip(prefix: &[u8]) -> bool {
    prefix.starts_with(ZIP_MAGIC)
}

/// Whether an archive entry is the main export document
fn is_export_entry(name: &str) -> bool {
    let file_name = name.rsplit('/').next().unwrap_or(name);
    file_name.eq_ignore_ascii_case("export.xml")
}

/// Locate `export.xml` inside a ZIP archive and extract from it
pub fn extract_from_zip<R: Read + Seek>(
    extractor: &RecordExtractor<'_>,
    source: R,
) -> ExtractResult<Dataset> {
    let mut archive = zip::ZipArchive::new(source)?;

    let name = archive
        .file_names()
        .find(|name| is_export_entry(name))
        .map(str::to_string)
        .ok_or(ExtractError::MissingExport)?;

    let entry = archive.by_name(&name)?;
    tracing::debug!(
        entry = %entry.name(),
        size = entry.size(),
        "Reading export from archive"
    );

    extractor.extract(BufReader::with_capacity(DEFAULT_READ_BUFFER, entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MetricCatalog;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    const EXPORT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<HealthData locale="en_US">
 <Record type="HKQuantityTypeIdentifierStepCount" unit="count" value="1000" startDate="2024-02-01 09:00:00 +0000"/>
 <Record type="HKQuantityTypeIdentifierStepCount" unit="count" value="2000" startDate="2024-02-01 17:00:00 +0000"/>
</HealthData>
"#;

    fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_is_zip() {
        assert!(is_zip(b"PK\x03\x04rest"));
        assert!(!is_zip(b"<?xml"));
        assert!(!is_zip(b"PK"));
    }

    #[test]
    fn test_is_export_entry() {
        assert!(is_export_entry("apple_health_export/export.xml"));
        assert!(is_export_entry("Export.xml"));
        assert!(!is_export_entry("apple_health_export/export_cda.xml"));
        assert!(!is_export_entry("apple_health_export/workout-routes/route.gpx"));
    }

    #[test]
    fn test_extract_from_zip_bytes() {
        let bytes = build_zip(&[
            ("apple_health_export/export_cda.xml", "<ClinicalDocument/>"),
            ("apple_health_export/export.xml", EXPORT_XML),
        ]);

        let dataset = RecordExtractor::new(MetricCatalog::healthkit())
            .extract_bytes(&bytes)
            .unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_extract_from_zip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.zip");
        std::fs::write(&path, build_zip(&[("apple_health_export/export.xml", EXPORT_XML)]))
            .unwrap();

        let dataset = RecordExtractor::new(MetricCatalog::healthkit())
            .extract_path(&path)
            .unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_zip_without_export() {
        let bytes = build_zip(&[("notes.txt", "hello")]);
        let result = RecordExtractor::new(MetricCatalog::healthkit()).extract_bytes(&bytes);
        assert!(matches!(result, Err(ExtractError::MissingExport)));
    }

    #[test]
    fn test_corrupt_zip() {
        let mut bytes = build_zip(&[("export.xml", EXPORT_XML)]);
        bytes.truncate(20);
        let result = RecordExtractor::new(MetricCatalog::healthkit()).extract_bytes(&bytes);
        assert!(matches!(result, Err(ExtractError::Archive(_))));
    }
}
