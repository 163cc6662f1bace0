//! Paragraph text from Word `.docx` uploads.
//!
//! A `.docx` is a zip archive; the body lives in `word/document.xml`, one
//! `<w:p>` per paragraph with the visible text in `<w:t>` runs. Each
//! paragraph becomes one line so the result can go straight to the segmenter.

use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};

const DOCUMENT_PART: &str = "word/document.xml";

/// Decompressed size cap for the document part.
const MAX_DOCUMENT_BYTES: u64 = 32 * 1024 * 1024;

pub fn extract_text(bytes: &[u8]) -> Result<String, String> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| format!("Not a .docx file: {}", e))?;
    let part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| format!("Missing {}: {}", DOCUMENT_PART, e))?;

    let mut xml = String::new();
    part.take(MAX_DOCUMENT_BYTES)
        .read_to_string(&mut xml)
        .map_err(|e| format!("Failed to read {}: {}", DOCUMENT_PART, e))?;

    paragraphs_from_xml(&xml)
}

/// Join the paragraphs of a WordprocessingML body with `\n`. Empty
/// paragraphs are kept as blank lines; tabs and line breaks inside a
/// paragraph are kept as `\t` and `\n`.
pub fn paragraphs_from_xml(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("Invalid document XML at byte {}: {}", reader.buffer_position(), e))?;
        match event {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" | b"w:cr" => current.push('\n'),
                b"w:p" => paragraphs.push(String::new()),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t.decode().map_err(|e| format!("Bad text encoding: {}", e))?;
                current.push_str(&text);
            }
            Event::GeneralRef(r) if in_text => {
                let resolved = r
                    .resolve_char_ref()
                    .map_err(|e| format!("Bad character reference: {}", e))?;
                match resolved {
                    Some(ch) => current.push(ch),
                    None => {
                        let name = r.decode().map_err(|e| format!("Bad entity: {}", e))?;
                        let value = resolve_xml_entity(&name)
                            .ok_or_else(|| format!("Unknown entity &{};", name))?;
                        current.push_str(value);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs.join("\n"))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    /// Minimal `.docx` with one paragraph per entry; `""` is an empty paragraph.
    pub(crate) fn docx_fixture(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| {
                if p.is_empty() {
                    "<w:p/>".to_string()
                } else {
                    format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", p)
                }
            })
            .collect();
        let xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{}<w:sectPr/></w:body></w:document>",
            body
        );

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("[Content_Types].xml", zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(b"<Types/>").unwrap();
        writer
            .start_file(DOCUMENT_PART, zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extract_paragraphs() {
        let doc = docx_fixture(&["2022.3.30", "洗澡时的对话", "妈妈：该洗澡了", "", "哈哈：好的"]);
        let text = extract_text(&doc).unwrap();
        assert_eq!(text, "2022.3.30\n洗澡时的对话\n妈妈：该洗澡了\n\n哈哈：好的");
    }

    #[test]
    fn test_runs_tabs_and_entities() {
        let xml = "<w:document><w:body>\
                   <w:p><w:r><w:t>妈妈：</w:t></w:r><w:r><w:tab/><w:t>A &amp; B &#x4F60;</w:t></w:r></w:p>\
                   <w:p><w:r><w:t>第一行</w:t><w:br/><w:t>第二行</w:t></w:r></w:p>\
                   <w:p><w:r><w:delText>删掉的</w:delText><w:t>留下</w:t></w:r></w:p>\
                   </w:body></w:document>";
        let text = paragraphs_from_xml(xml).unwrap();
        assert_eq!(text, "妈妈：\tA & B 你\n第一行\n第二行\n留下");
    }

    #[test]
    fn test_rejects_non_docx() {
        assert!(extract_text(b"plain text, not a zip").is_err());

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("readme.txt", zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(b"hi").unwrap();
        let archive = writer.finish().unwrap().into_inner();
        let err = extract_text(&archive).unwrap_err();
        assert!(err.contains(DOCUMENT_PART));
    }
}
