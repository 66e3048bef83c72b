//! HTML output
//!
//! Each page becomes a fixed-size `div` and each line an absolutely
//! positioned paragraph, so the result keeps the original layout when
//! opened in a browser.

use std::fmt::Write as _;

use crate::document::{DocumentInfo, DocumentResult, OutputFormat, PageText, TextLine};

use super::Converter;

const STYLE: &str = "body{background:#f0f0f0;margin:0;padding:16px}\
.page{position:relative;background:#fff;margin:0 auto 16px;box-shadow:0 1px 4px rgba(0,0,0,.3);overflow:hidden}\
.page p{position:absolute;margin:0;white-space:pre;font-family:sans-serif}";

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlConverter;

impl Converter for HtmlConverter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Html
    }

    fn render(&self, info: &DocumentInfo, pages: &[PageText]) -> DocumentResult<Vec<u8>> {
        let mut out = String::new();

        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        let _ = writeln!(out, "<title>{}</title>", html_escape::encode_text(&info.title));
        if let Some(author) = &info.author {
            let _ = writeln!(
                out,
                "<meta name=\"author\" content=\"{}\">",
                html_escape::encode_double_quoted_attribute(author)
            );
        }
        let _ = writeln!(out, "<style>{}</style>", STYLE);
        out.push_str("</head>\n<body>\n");

        for page in pages {
            write_page(&mut out, page);
        }

        out.push_str("</body>\n</html>\n");
        Ok(out.into_bytes())
    }
}

fn write_page(out: &mut String, page: &PageText) {
    let _ = writeln!(
        out,
        "<div class=\"page\" id=\"page{}\" style=\"width:{:.1}pt;height:{:.1}pt\">",
        page.index + 1,
        page.width,
        page.height
    );

    for block in &page.blocks {
        for line in &block.lines {
            write_line(out, line);
        }
    }

    out.push_str("</div>\n");
}

fn write_line(out: &mut String, line: &TextLine) {
    let _ = write!(
        out,
        "<p style=\"left:{:.1}pt;top:{:.1}pt",
        line.bbox.x, line.bbox.y
    );
    if line.font_size > 0.0 {
        let _ = write!(
            out,
            ";font-size:{:.1}pt;line-height:{:.1}pt",
            line.font_size,
            line.bbox.height.max(line.font_size)
        );
    }
    let _ = writeln!(out, "\">{}</p>", html_escape::encode_text(&line.text));
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;

    fn render(pages: &[PageText]) -> String {
        let bytes = HtmlConverter.render(&info("Report & <Notes>", pages.len()), pages).unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_document_skeleton() {
        let html = render(&[page(0, vec![])]);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<meta charset=\"utf-8\">"));
        assert!(html.contains("<title>Report &amp; &lt;Notes&gt;</title>"));
        assert!(html.contains("<meta name=\"author\" content=\"A. Writer\">"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_pages_and_positioned_lines() {
        let html = render(&[
            page(0, vec![vec![line("Hello", 72.0, 90.5, 12.0)]]),
            page(1, vec![vec![line("World", 100.0, 200.0, 10.0)]]),
        ]);

        assert!(html.contains("id=\"page1\" style=\"width:612.0pt;height:792.0pt\""));
        assert!(html.contains("id=\"page2\""));
        assert!(html.contains(
            "<p style=\"left:72.0pt;top:90.5pt;font-size:12.0pt;line-height:12.0pt\">Hello</p>"
        ));
        assert!(html.contains("left:100.0pt;top:200.0pt"));
        assert_eq!(html.matches("<div class=\"page\"").count(), 2);
    }

    #[test]
    fn test_line_text_is_escaped() {
        let html = render(&[page(0, vec![vec![line("a < b && c > d", 0.0, 0.0, 0.0)]])]);
        assert!(html.contains(">a &lt; b &amp;&amp; c &gt; d</p>"));
        assert!(html.contains("<p style=\"left:0.0pt;top:0.0pt\">"));
    }
}
