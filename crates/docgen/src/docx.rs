//! DOCX template parsing and rendering.
//!
//! A DOCX file is a ZIP archive of XML parts. Placeholders of the form
//! `{{name}}` may appear in the document body, in tables, and in headers and
//! footers, so `word/document.xml`, `word/header*.xml`, and `word/footer*.xml`
//! are all scanned. Word routinely splits literal text across multiple
//! `<w:r>` runs (spell-check boundaries, formatting changes), which tears a
//! placeholder into pieces like `<w:t>{{cli</w:t>...<w:t>ent}}</w:t>`;
//! rendering first heals such splits so every placeholder sits inside a
//! single `<w:t>` element, then substitutes values with XML escaping.

use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::sync::LazyLock;

use regex::Regex;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::DocgenError;

/// Matches a `{{ name }}` placeholder in decoded text. Inner whitespace is
/// ignored, so `{{name}}` and `{{ name }}` are the same field.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").expect("valid regex"));

/// Matches a placeholder inside healed XML. `<` and `>` are excluded so the
/// match can never cross an element boundary.
static PLACEHOLDER_XML_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([^{}<>]+?)\s*\}\}").expect("valid regex"));

/// Matches a `<w:t>` text element and captures its content. Text content in
/// well-formed XML cannot contain `<`, so `[^<]*` is exact.
static TEXT_SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>").expect("valid regex"));

/// Matches any XML tag, for text extraction.
static XML_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

/// A single entry from the template archive.
struct DocxPart {
    name: String,
    data: Vec<u8>,
}

impl DocxPart {
    /// Whether this part can contain visible document text.
    fn is_text_part(&self) -> bool {
        let name = self.name.as_str();
        name == "word/document.xml"
            || (name.starts_with("word/header") && name.ends_with(".xml"))
            || (name.starts_with("word/footer") && name.ends_with(".xml"))
    }
}

/// A loaded DOCX template, ready for placeholder extraction and rendering.
pub struct DocxTemplate {
    /// All archive entries in their original order.
    parts: Vec<DocxPart>,
}

impl DocxTemplate {
    /// Load a template from DOCX bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocgenError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;

        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            parts.push(DocxPart {
                name: entry.name().to_string(),
                data,
            });
        }

        let template = DocxTemplate { parts };
        if !template.parts.iter().any(|p| p.name == "word/document.xml") {
            return Err(DocgenError::InvalidTemplate(
                "archive has no word/document.xml part".into(),
            ));
        }
        Ok(template)
    }

    /// Text parts in scan order: body first, then headers, then footers.
    fn text_parts(&self) -> Vec<&DocxPart> {
        let mut parts: Vec<&DocxPart> = self.parts.iter().filter(|p| p.is_text_part()).collect();
        parts.sort_by_key(|p| match p.name.as_str() {
            "word/document.xml" => (0, p.name.clone()),
            name if name.starts_with("word/header") => (1, p.name.clone()),
            _ => (2, p.name.clone()),
        });
        parts
    }

    /// Extract placeholder names in order of first appearance, deduplicated.
    pub fn placeholders(&self) -> Result<Vec<String>, DocgenError> {
        let mut seen = Vec::new();
        for part in self.text_parts() {
            let xml = part_as_str(part)?;
            let text = decode_entities(&XML_TAG_RE.replace_all(xml, ""));
            for caps in PLACEHOLDER_RE.captures_iter(&text) {
                let name = caps[1].trim().to_string();
                if !name.is_empty() && !seen.contains(&name) {
                    seen.push(name);
                }
            }
        }
        Ok(seen)
    }

    /// Render the template: substitute every placeholder with its value from
    /// `values` (placeholders without a value render as empty strings) and
    /// return the bytes of the filled DOCX.
    ///
    /// Non-text parts are copied through byte-for-byte.
    pub fn render(&self, values: &HashMap<String, String>) -> Result<Vec<u8>, DocgenError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        for part in &self.parts {
            writer.start_file(&part.name, options)?;
            if part.is_text_part() {
                let xml = part_as_str(part)?;
                let healed = heal_split_runs(xml);
                let rendered = PLACEHOLDER_XML_RE.replace_all(&healed, |caps: &regex::Captures| {
                    let name = decode_entities(caps[1].trim());
                    values
                        .get(&name)
                        .map(|v| encode_entities(v))
                        .unwrap_or_default()
                });
                writer.write_all(rendered.as_bytes())?;
            } else {
                writer.write_all(&part.data)?;
            }
        }

        Ok(writer.finish()?.into_inner())
    }
}

fn part_as_str(part: &DocxPart) -> Result<&str, DocgenError> {
    std::str::from_utf8(&part.data)
        .map_err(|e| DocgenError::InvalidTemplate(format!("{} is not UTF-8: {e}", part.name)))
}

/// Rewrite an XML part so that every `{{...}}` placeholder whose text is
/// split across multiple `<w:t>` elements is pulled into the first of them.
///
/// The algorithm concatenates the decoded text of all `<w:t>` elements,
/// finds placeholders in that flat text, and redistributes the characters:
/// a placeholder's full text is assigned to the element where it starts,
/// while text outside placeholders stays with its original element.
fn heal_split_runs(xml: &str) -> String {
    // Segment ranges within the XML and within the flat text.
    struct Segment {
        /// Byte range of the element's text content inside `xml`.
        xml_text: std::ops::Range<usize>,
        /// Byte range of the decoded text inside `flat`.
        flat: std::ops::Range<usize>,
    }

    let mut segments = Vec::new();
    let mut flat = String::new();
    for caps in TEXT_SEGMENT_RE.captures_iter(xml) {
        let m = caps.get(1).expect("one capture group");
        let decoded = decode_entities(m.as_str());
        let start = flat.len();
        flat.push_str(&decoded);
        segments.push(Segment {
            xml_text: m.range(),
            flat: start..flat.len(),
        });
    }

    if segments.is_empty() {
        return xml.to_string();
    }

    // New decoded text per segment.
    let mut new_texts: Vec<String> = segments.iter().map(|_| String::new()).collect();

    // Append flat[range] to the segments it overlaps.
    let distribute = |range: std::ops::Range<usize>, new_texts: &mut Vec<String>| {
        for (seg, text) in segments.iter().zip(new_texts.iter_mut()) {
            let start = range.start.max(seg.flat.start);
            let end = range.end.min(seg.flat.end);
            if start < end {
                text.push_str(&flat[start..end]);
            }
        }
    };

    let mut pos = 0;
    for m in PLACEHOLDER_RE.find_iter(&flat) {
        distribute(pos..m.start(), &mut new_texts);
        // The whole placeholder goes to the segment where it begins.
        let owner = segments
            .iter()
            .position(|seg| seg.flat.contains(&m.start()))
            .expect("match starts inside some segment");
        new_texts[owner].push_str(m.as_str());
        pos = m.end();
    }
    distribute(pos..flat.len(), &mut new_texts);

    // Splice the re-encoded texts back into the XML.
    let mut out = String::with_capacity(xml.len());
    let mut last = 0;
    for (seg, text) in segments.iter().zip(new_texts.iter()) {
        out.push_str(&xml[last..seg.xml_text.start]);
        out.push_str(&encode_entities(text));
        last = seg.xml_text.end;
    }
    out.push_str(&xml[last..]);
    out
}

/// Decode the five predefined XML entities.
fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Encode text for inclusion in XML content.
fn encode_entities(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
