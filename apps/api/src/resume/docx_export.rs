//! Word-processor export: packs a record into a minimal `.docx` in memory.
//!
//! The package carries only the three parts a reader needs (content types,
//! package relationships, main document). Formatting is expressed as direct
//! run properties so no styles part is required.

use std::io::{Cursor, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::models::resume::ResumeRecord;

const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

// Half-points, as OOXML measures font size.
const NAME_SIZE: u32 = 32;
const CONTACT_SIZE: u32 = 20;
const HEADING_SIZE: u32 = 24;
const DETAIL_SIZE: u32 = 18;
// Twentieths of a point.
const HEADING_SPACING: u32 = 400;
const DETAIL_COLOR: &str = "666666";

#[derive(Debug, Error)]
pub enum DocxExportError {
    #[error("failed to write document XML: {0}")]
    Xml(String),

    #[error("failed to build archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Default)]
struct Run {
    text: String,
    bold: bool,
    italic: bool,
    size: Option<u32>,
    color: Option<&'static str>,
}

impl Run {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    fn bold(text: impl Into<String>) -> Self {
        Self {
            bold: true,
            ..Self::plain(text)
        }
    }

    fn italic(text: impl Into<String>) -> Self {
        Self {
            italic: true,
            ..Self::plain(text)
        }
    }

    fn sized(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    fn colored(mut self, color: &'static str) -> Self {
        self.color = Some(color);
        self
    }
}

#[derive(Debug, Default)]
struct Paragraph {
    runs: Vec<Run>,
    centered: bool,
    spacing_before: Option<u32>,
}

impl Paragraph {
    fn of(runs: Vec<Run>) -> Self {
        Self {
            runs,
            ..Default::default()
        }
    }

    fn centered(runs: Vec<Run>) -> Self {
        Self {
            centered: true,
            ..Self::of(runs)
        }
    }

    fn heading(title: &str) -> Self {
        Self {
            spacing_before: Some(HEADING_SPACING),
            ..Self::of(vec![Run::bold(title).sized(HEADING_SIZE)])
        }
    }
}

/// Renders the record as `.docx` bytes. Section order and content follow the
/// text export; the record is only read.
pub fn render_docx(record: &ResumeRecord) -> Result<Vec<u8>, DocxExportError> {
    let document_xml = document_xml(&layout(record))?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in [
        ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
        ("_rels/.rels", PACKAGE_RELS_XML.as_bytes()),
        ("word/document.xml", document_xml.as_slice()),
    ] {
        zip.start_file(name, file_options())?;
        zip.write_all(body)?;
    }
    Ok(zip.finish()?.into_inner())
}

fn file_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

fn layout(record: &ResumeRecord) -> Vec<Paragraph> {
    let info = &record.personal_info;
    let name = if info.name.trim().is_empty() {
        "YOUR NAME"
    } else {
        info.name.as_str()
    };

    let mut paragraphs = vec![
        Paragraph::centered(vec![Run::bold(name).sized(NAME_SIZE)]),
        Paragraph::centered(vec![
            Run::plain(joined(&[&info.email, &info.phone])).sized(CONTACT_SIZE)
        ]),
        Paragraph::centered(vec![Run::plain(info.address.as_str()).sized(CONTACT_SIZE)]),
        Paragraph::heading("PROFESSIONAL SUMMARY"),
        Paragraph::of(vec![Run::plain(record.objective.trim())]),
        Paragraph::heading("WORK EXPERIENCE"),
    ];

    for exp in &record.experience {
        paragraphs.push(Paragraph::of(vec![
            Run::bold(exp.title.as_str()),
            Run::italic(format!(" - {}", exp.company)),
        ]));
        paragraphs.push(detail_line(&[&exp.dates, &exp.location]));
        paragraphs.extend(
            exp.description
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|line| Paragraph::of(vec![Run::plain(line)])),
        );
    }

    paragraphs.push(Paragraph::heading("EDUCATION"));
    for edu in &record.education {
        paragraphs.push(Paragraph::of(vec![
            Run::bold(edu.degree.as_str()),
            Run::italic(format!(" - {}", edu.school)),
        ]));
        paragraphs.push(detail_line(&[&edu.dates, &edu.location]));
    }

    paragraphs.push(Paragraph::heading("SKILLS & QUALIFICATIONS"));
    paragraphs.push(Paragraph::of(vec![Run::plain(record.skills.join(", "))]));

    paragraphs.push(Paragraph::heading("REFERENCES"));
    for reference in &record.references {
        paragraphs.push(Paragraph::of(vec![Run::bold(reference.name.as_str())]));
        paragraphs.push(Paragraph::of(vec![
            Run::plain(joined(&[&reference.relation, &reference.contact])).sized(DETAIL_SIZE)
        ]));
    }

    paragraphs
}

fn detail_line(parts: &[&str]) -> Paragraph {
    Paragraph::of(vec![Run::plain(joined(parts))
        .sized(DETAIL_SIZE)
        .colored(DETAIL_COLOR)])
}

/// Non-blank parts separated by ` | `.
fn joined(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

fn document_xml(paragraphs: &[Paragraph]) -> Result<Vec<u8>, DocxExportError> {
    let mut xml = XmlOut::new();

    xml.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    let mut root = BytesStart::new("w:document");
    root.push_attribute(("xmlns:w", WORDML_NS));
    xml.emit(Event::Start(root))?;
    xml.open("w:body")?;

    for paragraph in paragraphs {
        write_paragraph(&mut xml, paragraph)?;
    }

    xml.close("w:body")?;
    xml.close("w:document")?;
    Ok(xml.into_inner())
}

fn write_paragraph(xml: &mut XmlOut, paragraph: &Paragraph) -> Result<(), DocxExportError> {
    xml.open("w:p")?;

    if paragraph.centered || paragraph.spacing_before.is_some() {
        xml.open("w:pPr")?;
        if let Some(before) = paragraph.spacing_before {
            xml.empty_with("w:spacing", ("w:before", before.to_string().as_str()))?;
        }
        if paragraph.centered {
            xml.empty_with("w:jc", ("w:val", "center"))?;
        }
        xml.close("w:pPr")?;
    }

    for run in paragraph.runs.iter().filter(|r| !r.text.is_empty()) {
        write_run(xml, run)?;
    }

    xml.close("w:p")
}

fn write_run(xml: &mut XmlOut, run: &Run) -> Result<(), DocxExportError> {
    xml.open("w:r")?;

    if run.bold || run.italic || run.size.is_some() || run.color.is_some() {
        xml.open("w:rPr")?;
        if run.bold {
            xml.emit(Event::Empty(BytesStart::new("w:b")))?;
        }
        if run.italic {
            xml.emit(Event::Empty(BytesStart::new("w:i")))?;
        }
        if let Some(color) = run.color {
            xml.empty_with("w:color", ("w:val", color))?;
        }
        if let Some(size) = run.size {
            xml.empty_with("w:sz", ("w:val", size.to_string().as_str()))?;
        }
        xml.close("w:rPr")?;
    }

    let text = xml_safe(&run.text);
    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            xml.emit(Event::Empty(BytesStart::new("w:br")))?;
        }
        let mut element = BytesStart::new("w:t");
        element.push_attribute(("xml:space", "preserve"));
        xml.emit(Event::Start(element))?;
        xml.emit(Event::Text(BytesText::new(line)))?;
        xml.close("w:t")?;
    }

    xml.close("w:r")
}

/// Drops characters XML 1.0 cannot carry, and carriage returns; line breaks
/// stay as `\n` for the caller to turn into `w:br`.
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|c| {
            matches!(*c,
                '\t' | '\n' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..)
        })
        .collect()
}

/// Thin wrapper that folds quick-xml's writer errors into [`DocxExportError`].
struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    fn emit(&mut self, event: Event<'_>) -> Result<(), DocxExportError> {
        self.writer
            .write_event(event)
            .map_err(|e| DocxExportError::Xml(e.to_string()))
    }

    fn open(&mut self, name: &str) -> Result<(), DocxExportError> {
        self.emit(Event::Start(BytesStart::new(name)))
    }

    fn close(&mut self, name: &str) -> Result<(), DocxExportError> {
        self.emit(Event::End(BytesEnd::new(name)))
    }

    fn empty_with(&mut self, name: &str, attr: (&str, &str)) -> Result<(), DocxExportError> {
        let mut element = BytesStart::new(name);
        element.push_attribute(attr);
        self.emit(Event::Empty(element))
    }

    fn into_inner(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::{extract_text, DOCX_MIME};
    use crate::models::resume::{Education, Experience, PersonalInfo, Reference};

    fn sample() -> ResumeRecord {
        ResumeRecord {
            personal_info: PersonalInfo {
                name: "Ana Cruz".to_string(),
                email: "ana@example.com".to_string(),
                phone: "555".to_string(),
                address: "Lipa City".to_string(),
                photo: Some("data:image/png;base64,AAAA".to_string()),
            },
            objective: "Reliable cook & baker".to_string(),
            experience: vec![Experience {
                id: "exp-0".to_string(),
                title: "Cook".to_string(),
                company: "Diner <Main St>".to_string(),
                location: String::new(),
                dates: "2020 - 2023".to_string(),
                description: "Prepared meals\n\nManaged pantry".to_string(),
            }],
            education: vec![Education {
                id: "edu-0".to_string(),
                school: "Batangas State".to_string(),
                degree: "BS Hospitality".to_string(),
                dates: "2019".to_string(),
                location: "Batangas".to_string(),
            }],
            skills: vec!["Cooking".to_string(), "Driving".to_string()],
            references: vec![Reference {
                id: "ref-0".to_string(),
                name: "Maria Santos".to_string(),
                contact: "0917".to_string(),
                relation: "Former employer".to_string(),
            }],
        }
    }

    #[test]
    fn test_docx_reads_back_through_text_extraction() {
        let bytes = render_docx(&sample()).unwrap();
        let text = extract_text(&bytes, DOCX_MIME).unwrap();

        for expected in [
            "Ana Cruz",
            "ana@example.com | 555",
            "Reliable cook & baker",
            "Cook - Diner <Main St>",
            "2020 - 2023",
            "Prepared meals\nManaged pantry",
            "BS Hospitality - Batangas State",
            "2019 | Batangas",
            "Cooking, Driving",
            "Former employer | 0917",
        ] {
            assert!(text.contains(expected), "missing {expected:?} in {text:?}");
        }

        let order = ["PROFESSIONAL SUMMARY", "WORK EXPERIENCE", "EDUCATION", "REFERENCES"];
        let positions: Vec<usize> = order.iter().map(|h| text.find(h).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_package_has_required_parts() {
        let bytes = render_docx(&ResumeRecord::placeholder()).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        for part in ["[Content_Types].xml", "_rels/.rels", "word/document.xml"] {
            assert!(archive.by_name(part).is_ok(), "missing part {part}");
        }
    }

    #[test]
    fn test_blank_name_uses_placeholder_heading() {
        let bytes = render_docx(&ResumeRecord::default()).unwrap();
        let text = extract_text(&bytes, DOCX_MIME).unwrap();
        assert!(text.starts_with("YOUR NAME"));
    }

    #[test]
    fn test_photo_is_not_embedded() {
        let bytes = render_docx(&sample()).unwrap();
        let text = extract_text(&bytes, DOCX_MIME).unwrap();
        assert!(!text.contains("base64"));
    }

    #[test]
    fn test_control_characters_dropped_and_newlines_become_breaks() {
        let mut record = sample();
        record.objective = "line one\r\nline two\u{0B} tabbed\u{1}".to_string();
        let bytes = render_docx(&record).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.clone())).unwrap();
        let mut xml = String::new();
        std::io::Read::read_to_string(&mut archive.by_name("word/document.xml").unwrap(), &mut xml)
            .unwrap();
        assert!(!xml.contains('\u{0B}'));
        assert!(!xml.contains('\u{1}'));
        assert!(!xml.contains('\r'));
        assert!(xml.contains("<w:br/>"));

        let text = extract_text(&bytes, DOCX_MIME).unwrap();
        assert!(text.contains("line one\nline two tabbed"));
    }

    #[test]
    fn test_xml_safe_keeps_printable_text() {
        assert_eq!(xml_safe("Caf\u{e9}\t\u{1F600}\u{7}"), "Caf\u{e9}\t\u{1F600}");
    }

    #[test]
    fn test_joined_skips_blank_parts() {
        assert_eq!(joined(&["2020", "  "]), "2020");
        assert_eq!(joined(&["", ""]), "");
        assert_eq!(joined(&["a", "b"]), "a | b");
    }
}
