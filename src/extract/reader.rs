//! Streaming record extractor
//!
//! Walks the export with `quick_xml` one event at a time, so the document is
//! never materialized as a tree. `Record` elements are picked up at any depth.
//!
//! Apple Health record layout:
//!
//! ```text
//! <Record type="HKQuantityTypeIdentifierHeartRate" sourceName="Apple Watch"
//!         unit="count/min" creationDate="2024-01-15 10:31:02 -0500"
//!         startDate="2024-01-15 10:30:00 -0500"
//!         endDate="2024-01-15 10:30:00 -0500" value="72"/>
//! ```

use crate::catalog::MetricCatalog;
use crate::extract::archive;
use crate::extract::dataset::{Dataset, ExtractStats};
use crate::extract::error::{ExtractError, ExtractResult};
use crate::extract::observation::{parse_start_date, parse_value, Observation};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::time::Instant;

const RECORD_TAG: &[u8] = b"Record";

/// Default read buffer for file-backed extraction
pub const DEFAULT_READ_BUFFER: usize = 256 * 1024;

/// Raw attributes of one `Record` element
#[derive(Debug, Default)]
struct RawRecord {
    record_type: Option<String>,
    value: Option<String>,
    unit: Option<String>,
    start_date: Option<String>,
}

/// Turns an export document into a [`Dataset`]
#[derive(Debug, Clone, Copy)]
pub struct RecordExtractor<'a> {
    catalog: &'a MetricCatalog,
}

impl<'a> RecordExtractor<'a> {
    /// Create an extractor recognizing the metrics of `catalog`
    pub fn new(catalog: &'a MetricCatalog) -> Self {
        Self { catalog }
    }

    /// Extract from an XML document
    pub fn extract<R: BufRead>(&self, source: R) -> ExtractResult<Dataset> {
        let started = Instant::now();
        let mut xml = Reader::from_reader(source);
        xml.trim_text(true).check_end_names(true);

        let mut observations = Vec::new();
        let mut stats = ExtractStats::default();
        let mut buf = Vec::new();
        let mut depth: usize = 0;
        let mut roots: usize = 0;

        loop {
            let event = xml
                .read_event_into(&mut buf)
                .map_err(|e| ExtractError::from_xml(xml.buffer_position(), e))?;

            match event {
                Event::Start(ref element) => {
                    if depth == 0 {
                        roots += 1;
                    }
                    depth += 1;
                    self.visit(element, &mut observations, &mut stats)?;
                }
                Event::Empty(ref element) => {
                    if depth == 0 {
                        roots += 1;
                    }
                    self.visit(element, &mut observations, &mut stats)?;
                }
                Event::End(_) => {
                    depth = depth.checked_sub(1).ok_or_else(|| {
                        ExtractError::Malformed(format!(
                            "unexpected closing tag at byte {}",
                            xml.buffer_position()
                        ))
                    })?;
                }
                Event::Text(ref text) if depth == 0 && !is_blank(text) => {
                    return Err(ExtractError::Malformed(format!(
                        "text outside the root element at byte {}",
                        xml.buffer_position()
                    )));
                }
                Event::CData(_) if depth == 0 => {
                    return Err(ExtractError::Malformed(format!(
                        "CDATA outside the root element at byte {}",
                        xml.buffer_position()
                    )));
                }
                Event::Eof => break,
                _ => {}
            }

            if roots > 1 {
                return Err(ExtractError::Malformed(format!(
                    "more than one root element (second at byte {})",
                    xml.buffer_position()
                )));
            }

            buf.clear();
        }

        if roots == 0 {
            return Err(ExtractError::Malformed(
                "document has no root element".to_string(),
            ));
        }
        if depth > 0 {
            return Err(ExtractError::Malformed(format!(
                "unexpected end of document with {} unclosed element(s)",
                depth
            )));
        }

        stats.observations = observations.len();
        tracing::info!(
            records = stats.records_seen,
            observations = stats.observations,
            unrecognized = stats.unrecognized,
            invalid_value = stats.invalid_value,
            invalid_timestamp = stats.invalid_timestamp,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Extraction completed"
        );

        Ok(Dataset::new(observations, stats))
    }

    /// Extract from an in-memory upload, XML or ZIP
    pub fn extract_bytes(&self, bytes: &[u8]) -> ExtractResult<Dataset> {
        if archive::is_zip(bytes) {
            archive::extract_from_zip(self, std::io::Cursor::new(bytes))
        } else {
            self.extract(bytes)
        }
    }

    /// Extract from a file on disk, XML or ZIP
    pub fn extract_path(&self, path: &Path) -> ExtractResult<Dataset> {
        let mut file = File::open(path)?;

        let mut magic = [0u8; 4];
        let read = read_prefix(&mut file, &mut magic)?;
        file.seek(SeekFrom::Start(0))?;

        tracing::debug!(path = %path.display(), "Reading export");

        if archive::is_zip(&magic[..read]) {
            archive::extract_from_zip(self, file)
        } else {
            self.extract(BufReader::with_capacity(DEFAULT_READ_BUFFER, file))
        }
    }

    /// Handle one opening or self-closing element
    fn visit(
        &self,
        element: &BytesStart<'_>,
        observations: &mut Vec<Observation>,
        stats: &mut ExtractStats,
    ) -> ExtractResult<()> {
        if element.local_name().as_ref() != RECORD_TAG {
            return check_attributes(element);
        }
        stats.records_seen += 1;

        let raw = read_attributes(element)?;
        if let Some(observation) = self.coerce(raw, stats) {
            observations.push(observation);
        }
        Ok(())
    }

    /// Validate a raw record, counting the reason when it is dropped
    fn coerce(&self, raw: RawRecord, stats: &mut ExtractStats) -> Option<Observation> {
        let metric_id = match raw.record_type {
            Some(t) if self.catalog.contains(&t) => t,
            _ => {
                stats.unrecognized += 1;
                return None;
            }
        };

        let Some(value) = raw.value.as_deref().and_then(parse_value) else {
            tracing::trace!(metric = %metric_id, value = ?raw.value, "Skipping record with invalid value");
            stats.invalid_value += 1;
            return None;
        };

        let Some(timestamp) = raw.start_date.as_deref().and_then(parse_start_date) else {
            tracing::trace!(metric = %metric_id, start_date = ?raw.start_date, "Skipping record with invalid start date");
            stats.invalid_timestamp += 1;
            return None;
        };

        let category = self.catalog.category_of(&metric_id).ok()?.to_string();

        Some(Observation {
            metric_id,
            value,
            unit: raw.unit.unwrap_or_default(),
            timestamp,
            category,
        })
    }
}

/// Reject duplicate, unquoted or otherwise broken attributes
fn check_attributes(element: &BytesStart<'_>) -> ExtractResult<()> {
    for attr in element.attributes() {
        attr.map_err(|e| ExtractError::Malformed(format!("bad attribute: {}", e)))?;
    }
    Ok(())
}

/// Whitespace, optionally behind a UTF-8 byte order mark
fn is_blank(text: &[u8]) -> bool {
    text.strip_prefix(b"\xEF\xBB\xBF".as_slice())
        .unwrap_or(text)
        .iter()
        .all(u8::is_ascii_whitespace)
}

/// Pull the attributes Vitalog cares about out of an element
fn read_attributes(element: &BytesStart<'_>) -> ExtractResult<RawRecord> {
    let mut raw = RawRecord::default();

    for attr in element.attributes() {
        let attr = attr.map_err(|e| ExtractError::Malformed(format!("bad attribute: {}", e)))?;

        let slot = match attr.key.as_ref() {
            b"type" => &mut raw.record_type,
            b"value" => &mut raw.value,
            b"unit" => &mut raw.unit,
            b"startDate" => &mut raw.start_date,
            _ => continue,
        };

        let value = attr
            .unescape_value()
            .map_err(|e| ExtractError::Malformed(format!("bad attribute value: {}", e)))?;
        *slot = Some(value.into_owned());
    }

    Ok(raw)
}

/// Read up to `buf.len()` bytes, stopping early at end of file
fn read_prefix<R: Read>(source: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}
