//! Raw text extraction from OOXML word-processing documents.
//!
//! Reads `word/document.xml` out of the zip container and walks it with
//! quick-xml: text runs are concatenated, tabs and breaks are kept, and every
//! paragraph ends with a line break.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use super::DocumentError;

const DOCUMENT_PART: &str = "word/document.xml";

pub fn extract_docx_text(bytes: &[u8]) -> Result<String, DocumentError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| DocumentError::Docx(format!("Failed to open archive: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| DocumentError::Docx(format!("Missing {DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| DocumentError::Docx(format!("Failed to read {DOCUMENT_PART}: {e}")))?;

    document_xml_to_text(&xml)
}

fn document_xml_to_text(xml: &str) -> Result<String, DocumentError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;
    // Tabs and breaks are content only inside a run; `w:pPr/w:tabs` also holds `w:tab` stops.
    let mut in_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text = true,
                b"r" => in_run = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"tab" if in_run => out.push('\t'),
                b"br" | b"cr" if in_run => out.push('\n'),
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|err| DocumentError::Docx(format!("Bad text run: {err}")))?;
                out.push_str(&text);
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"r" => in_run = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DocumentError::Docx(format!(
                    "XML error at position {}: {e}",
                    reader.error_position()
                )))
            }
            _ => {}
        }
    }

    Ok(out)
}
