//! DOCX output
//!
//! Writes a minimal WordprocessingML package: one paragraph per text block,
//! line breaks between the block's lines and a page break between PDF
//! pages. Section size is taken from the first page.

use std::io::{Cursor, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::document::{DocumentInfo, DocumentResult, OutputFormat, PageText, TextBlock};

use super::Converter;

const NS_WORD: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// US Letter in points, used when the document has no pages
const DEFAULT_PAGE: (f32, f32) = (612.0, 792.0);
/// Half-inch margins in twips
const MARGIN_TWIPS: &str = "720";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
  <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
</Types>"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
</Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:docDefaults>
    <w:rPrDefault>
      <w:rPr>
        <w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:eastAsia="Calibri" w:cs="Calibri"/>
        <w:sz w:val="22"/>
      </w:rPr>
    </w:rPrDefault>
    <w:pPrDefault>
      <w:pPr>
        <w:spacing w:after="120"/>
      </w:pPr>
    </w:pPrDefault>
  </w:docDefaults>
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal">
    <w:name w:val="Normal"/>
    <w:qFormat/>
  </w:style>
</w:styles>"#;

#[derive(Debug, Clone, Copy, Default)]
pub struct DocxConverter;

impl Converter for DocxConverter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Docx
    }

    fn render(&self, info: &DocumentInfo, pages: &[PageText]) -> DocumentResult<Vec<u8>> {
        let document_xml = document_xml(pages)?;
        let core_xml = core_xml(info)?;

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let opt = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        zip.start_file("[Content_Types].xml", opt)?;
        zip.write_all(CONTENT_TYPES_XML.as_bytes())?;

        zip.start_file("_rels/.rels", opt)?;
        zip.write_all(RELS_XML.as_bytes())?;

        zip.start_file("docProps/core.xml", opt)?;
        zip.write_all(&core_xml)?;

        zip.start_file("word/document.xml", opt)?;
        zip.write_all(&document_xml)?;

        zip.start_file("word/_rels/document.xml.rels", opt)?;
        zip.write_all(DOCUMENT_RELS_XML.as_bytes())?;

        zip.start_file("word/styles.xml", opt)?;
        zip.write_all(STYLES_XML.as_bytes())?;

        Ok(zip.finish()?.into_inner())
    }
}

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn new_writer() -> DocumentResult<XmlWriter> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(writer)
}

fn document_xml(pages: &[PageText]) -> DocumentResult<Vec<u8>> {
    let mut writer = new_writer()?;

    writer.write_event(Event::Start(
        BytesStart::new("w:document").with_attributes([("xmlns:w", NS_WORD)]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("w:body")))?;

    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            write_page_break(&mut writer)?;
        }
        if page.is_empty() {
            writer.write_event(Event::Empty(BytesStart::new("w:p")))?;
            continue;
        }
        for block in page.blocks.iter().filter(|b| !b.lines.is_empty()) {
            write_paragraph(&mut writer, block)?;
        }
    }

    let (width, height) = pages
        .first()
        .map(|p| (p.width, p.height))
        .unwrap_or(DEFAULT_PAGE);
    write_section(&mut writer, width, height)?;

    writer.write_event(Event::End(BytesEnd::new("w:body")))?;
    writer.write_event(Event::End(BytesEnd::new("w:document")))?;

    Ok(writer.into_inner().into_inner())
}

fn write_paragraph(writer: &mut XmlWriter, block: &TextBlock) -> DocumentResult<()> {
    writer.write_event(Event::Start(BytesStart::new("w:p")))?;

    for (i, line) in block.lines.iter().enumerate() {
        writer.write_event(Event::Start(BytesStart::new("w:r")))?;

        if let Some(size) = half_points(line.font_size) {
            writer.write_event(Event::Start(BytesStart::new("w:rPr")))?;
            let size = size.to_string();
            writer.write_event(Event::Empty(
                BytesStart::new("w:sz").with_attributes([("w:val", size.as_str())]),
            ))?;
            writer.write_event(Event::End(BytesEnd::new("w:rPr")))?;
        }

        if i > 0 {
            writer.write_event(Event::Empty(BytesStart::new("w:br")))?;
        }

        writer.write_event(Event::Start(
            BytesStart::new("w:t").with_attributes([("xml:space", "preserve")]),
        ))?;
        writer.write_event(Event::Text(BytesText::new(&xml_safe(&line.text))))?;
        writer.write_event(Event::End(BytesEnd::new("w:t")))?;

        writer.write_event(Event::End(BytesEnd::new("w:r")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}

fn write_page_break(writer: &mut XmlWriter) -> DocumentResult<()> {
    writer.write_event(Event::Start(BytesStart::new("w:p")))?;
    writer.write_event(Event::Start(BytesStart::new("w:r")))?;
    writer.write_event(Event::Empty(
        BytesStart::new("w:br").with_attributes([("w:type", "page")]),
    ))?;
    writer.write_event(Event::End(BytesEnd::new("w:r")))?;
    writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}

fn write_section(writer: &mut XmlWriter, width: f32, height: f32) -> DocumentResult<()> {
    let w = twips(width).to_string();
    let h = twips(height).to_string();

    writer.write_event(Event::Start(BytesStart::new("w:sectPr")))?;
    writer.write_event(Event::Empty(
        BytesStart::new("w:pgSz").with_attributes([("w:w", w.as_str()), ("w:h", h.as_str())]),
    ))?;
    writer.write_event(Event::Empty(BytesStart::new("w:pgMar").with_attributes([
        ("w:top", MARGIN_TWIPS),
        ("w:right", MARGIN_TWIPS),
        ("w:bottom", MARGIN_TWIPS),
        ("w:left", MARGIN_TWIPS),
        ("w:header", "0"),
        ("w:footer", "0"),
        ("w:gutter", "0"),
    ])))?;
    writer.write_event(Event::End(BytesEnd::new("w:sectPr")))?;
    Ok(())
}

fn core_xml(info: &DocumentInfo) -> DocumentResult<Vec<u8>> {
    let mut writer = new_writer()?;

    writer.write_event(Event::Start(BytesStart::new("cp:coreProperties").with_attributes([
        (
            "xmlns:cp",
            "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
        ),
        ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
        ("xmlns:dcterms", "http://purl.org/dc/terms/"),
        ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
    ])))?;

    write_simple_element(&mut writer, "dc:title", &info.title)?;
    if let Some(author) = &info.author {
        write_simple_element(&mut writer, "dc:creator", author)?;
    }

    let created = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    writer.write_event(Event::Start(
        BytesStart::new("dcterms:created").with_attributes([("xsi:type", "dcterms:W3CDTF")]),
    ))?;
    writer.write_event(Event::Text(BytesText::new(&created)))?;
    writer.write_event(Event::End(BytesEnd::new("dcterms:created")))?;

    writer.write_event(Event::End(BytesEnd::new("cp:coreProperties")))?;
    Ok(writer.into_inner().into_inner())
}

fn write_simple_element(writer: &mut XmlWriter, name: &str, value: &str) -> DocumentResult<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(&xml_safe(value))))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Points to twentieths of a point
fn twips(points: f32) -> u32 {
    (points.max(1.0) * 20.0).round() as u32
}

/// Font size in half-points, `None` when the size is unknown
fn half_points(size: f32) -> Option<u32> {
    if !size.is_finite() || size <= 0.0 {
        return None;
    }
    Some(((size * 2.0).round() as u32).clamp(2, 3276))
}

/// Drop characters XML 1.0 cannot carry
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || !c.is_control())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut out = String::new();
        part.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_package_parts() {
        let pages = vec![page(0, vec![vec![line("Hello", 72.0, 72.0, 12.0)]])];
        let bytes = DocxConverter.render(&info("doc", 1), &pages).unwrap();

        let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "[Content_Types].xml",
                "_rels/.rels",
                "docProps/core.xml",
                "word/_rels/document.xml.rels",
                "word/document.xml",
                "word/styles.xml",
            ]
        );
    }

    #[test]
    fn test_paragraphs_and_breaks() {
        let pages = vec![
            page(
                0,
                vec![vec![line("Hello", 72.0, 72.0, 12.0), line("there", 72.0, 86.0, 12.0)]],
            ),
            page(1, vec![vec![line("Second page", 72.0, 72.0, 10.5)]]),
        ];
        let bytes = DocxConverter.render(&info("doc", 2), &pages).unwrap();
        let xml = read_part(&bytes, "word/document.xml");

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
        assert!(xml.contains("<w:t xml:space=\"preserve\">Hello</w:t>"));
        assert!(xml.contains("<w:br/><w:t xml:space=\"preserve\">there</w:t>"));
        assert!(xml.contains("<w:sz w:val=\"24\"/>"));
        assert!(xml.contains("<w:sz w:val=\"21\"/>"));
        assert_eq!(xml.matches("<w:br w:type=\"page\"/>").count(), 1);
        assert!(xml.contains("<w:pgSz w:w=\"12240\" w:h=\"15840\"/>"));
    }

    #[test]
    fn test_text_is_escaped_and_sanitized() {
        let pages = vec![page(0, vec![vec![line("R&D <draft>\u{1}", 0.0, 0.0, 0.0)]])];
        let bytes = DocxConverter.render(&info("Q&A", 1), &pages).unwrap();

        let xml = read_part(&bytes, "word/document.xml");
        assert!(xml.contains(">R&amp;D &lt;draft&gt;</w:t>"));
        assert!(!xml.contains("<w:rPr>"));

        let core = read_part(&bytes, "docProps/core.xml");
        assert!(core.contains("<dc:title>Q&amp;A</dc:title>"));
        assert!(core.contains("<dc:creator>A. Writer</dc:creator>"));
    }

    #[test]
    fn test_no_pages_uses_letter_size() {
        let bytes = DocxConverter.render(&info("empty", 0), &[]).unwrap();
        let xml = read_part(&bytes, "word/document.xml");
        assert!(xml.contains("<w:pgSz w:w=\"12240\" w:h=\"15840\"/>"));
        assert!(!xml.contains("w:type=\"page\""));
    }

    #[test]
    fn test_half_points() {
        assert_eq!(half_points(12.0), Some(24));
        assert_eq!(half_points(0.0), None);
        assert_eq!(half_points(f32::NAN), None);
        assert_eq!(half_points(5000.0), Some(3276));
    }
}
