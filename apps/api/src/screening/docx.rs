//! WordprocessingML (`.docx`) body text.
//!
//! Only `word/document.xml` is read. Body paragraphs come first, one per
//! line, followed by one line per row of each top-level table with the cell
//! texts joined by `" | "`. Headers, footers and comments are not part of the
//! output.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use super::extraction::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Upper bound on the inflated size of `word/document.xml`.
const MAX_DOCUMENT_XML_BYTES: u64 = 200 * 1024 * 1024;

const CELL_SEPARATOR: &str = " | ";

pub fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let xml = read_document_part(bytes)?;
    body_text(&xml)
}

fn read_document_part(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::Docx(format!("not a zip container: {e}")))?;
    let part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractionError::Docx(format!("{DOCUMENT_PART}: {e}")))?;

    let mut xml = String::new();
    part.take(MAX_DOCUMENT_XML_BYTES + 1)
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::Docx(format!("{DOCUMENT_PART}: {e}")))?;
    if xml.len() as u64 > MAX_DOCUMENT_XML_BYTES {
        return Err(ExtractionError::Docx(format!(
            "{DOCUMENT_PART} inflates past {MAX_DOCUMENT_XML_BYTES} bytes"
        )));
    }
    Ok(xml)
}

fn body_text(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut body = BodyText::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => body.open(e.name().as_ref()),
            Ok(Event::Empty(e)) => body.inline(e.name().as_ref()),
            Ok(Event::End(e)) => body.close(e.name().as_ref()),
            Ok(Event::Text(t)) if body.in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| ExtractionError::Docx(format!("bad text at {}: {e}", reader.buffer_position())))?;
                body.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ExtractionError::Docx(format!(
                    "malformed XML at {}: {e}",
                    reader.buffer_position()
                )))
            }
        }
    }

    Ok(body.finish())
}

/// Streaming collector over the `w:` element events of one document body.
#[derive(Debug, Default)]
struct BodyText {
    paragraphs: Vec<String>,
    rows: Vec<String>,
    /// Paragraphs can nest (text boxes); the innermost is last.
    open_paragraphs: Vec<String>,
    table_depth: usize,
    row: Vec<String>,
    cell: Vec<String>,
    in_run: bool,
    in_text: bool,
}

impl BodyText {
    fn open(&mut self, name: &[u8]) {
        match name {
            b"w:p" => self.open_paragraphs.push(String::new()),
            b"w:r" => self.in_run = true,
            b"w:t" => self.in_text = true,
            b"w:tbl" => self.table_depth += 1,
            b"w:tr" if self.table_depth == 1 => self.row.clear(),
            b"w:tc" if self.table_depth == 1 => self.cell.clear(),
            other => self.inline(other),
        }
    }

    /// Self-closing elements. `w:tab` outside a run is a tab stop definition.
    fn inline(&mut self, name: &[u8]) {
        if !self.in_run {
            return;
        }
        match name {
            b"w:tab" => self.push_str("\t"),
            b"w:br" | b"w:cr" => self.push_str("\n"),
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"w:t" => self.in_text = false,
            b"w:r" => self.in_run = false,
            b"w:p" => {
                let Some(text) = self.open_paragraphs.pop() else {
                    return;
                };
                match self.table_depth {
                    0 if !text.is_empty() => self.paragraphs.push(text),
                    1 => self.cell.push(text),
                    _ => {}
                }
            }
            b"w:tc" if self.table_depth == 1 => {
                self.row.push(self.cell.join("\n").trim().to_string());
            }
            b"w:tr" if self.table_depth == 1 => {
                if self.row.iter().any(|cell| !cell.is_empty()) {
                    self.rows.push(self.row.join(CELL_SEPARATOR));
                }
            }
            b"w:tbl" => self.table_depth = self.table_depth.saturating_sub(1),
            _ => {}
        }
    }

    fn push_str(&mut self, text: &str) {
        if let Some(paragraph) = self.open_paragraphs.last_mut() {
            paragraph.push_str(text);
        }
    }

    fn finish(self) -> String {
        self.paragraphs
            .into_iter()
            .chain(self.rows)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::{Cursor, Write};

    use zip::write::SimpleFileOptions;

    /// Wraps `body` (children of `w:body`) into a minimal `.docx` container.
    pub(crate) fn docx_with_body(body: &str) -> Vec<u8> {
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        writer.start_file("[Content_Types].xml", options).unwrap();
        writer.write_all(b"<Types/>").unwrap();
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(document.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    pub(crate) fn paragraph(text: &str) -> String {
        format!(r#"<w:p><w:r><w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#)
    }
}
