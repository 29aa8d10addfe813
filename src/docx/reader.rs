use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

use crate::chapter::Paragraph;
use crate::error::{Error, Result};
use crate::util::{decode_text, local_name, resolve_entity};

pub(crate) const DOCUMENT_PART: &str = "word/document.xml";
pub(crate) const STYLES_PART: &str = "word/styles.xml";

/// Word stores "body text" as outline level 9.
const BODY_OUTLINE_LEVEL: u8 = 9;

/// Read the body paragraphs of a DOCX file on disk.
///
/// Each body-level `w:p` becomes one [`Paragraph`] carrying its text and
/// outline level. Paragraphs nested in tables are not part of the stream.
///
/// # Example
///
/// ```no_run
/// use folio::read_paragraphs;
///
/// let paragraphs = read_paragraphs("book.docx")?;
/// for p in paragraphs.iter().filter(|p| p.outline_level == Some(0)) {
///     println!("{}", p.text);
/// }
/// # Ok::<(), folio::Error>(())
/// ```
pub fn read_paragraphs<P: AsRef<Path>>(path: P) -> Result<Vec<Paragraph>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    let file = std::fs::File::open(path)?;
    read_paragraphs_from_reader(file)
}

/// Read DOCX paragraphs from any [`Read`] + [`Seek`] source.
///
/// The archive is owned by this call and released on every return path.
pub fn read_paragraphs_from_reader<R: Read + Seek>(reader: R) -> Result<Vec<Paragraph>> {
    let mut archive = ZipArchive::new(reader)?;

    let document = match read_archive_file(&mut archive, DOCUMENT_PART) {
        Ok(xml) => xml,
        Err(Error::Zip(zip::result::ZipError::FileNotFound)) => {
            return Err(Error::InvalidDocx(format!("missing {DOCUMENT_PART}")));
        }
        Err(e) => return Err(e),
    };

    let styles = match read_archive_file(&mut archive, STYLES_PART) {
        Ok(xml) => parse_style_outlines(&xml).unwrap_or_else(|e| {
            log::warn!("ignoring unreadable {STYLES_PART}: {e}");
            StyleOutlines::default()
        }),
        Err(_) => StyleOutlines::default(),
    };

    Ok(parse_document(&document, &styles))
}

/// Extract paragraphs from a `document.xml` string.
///
/// A missing `w:body` or malformed XML yields an empty list.
pub fn parse_document(xml: &str, styles: &StyleOutlines) -> Vec<Paragraph> {
    match parse_body(xml, styles) {
        Ok(Some(paragraphs)) => {
            log::debug!("extracted {} paragraphs", paragraphs.len());
            paragraphs
        }
        Ok(None) => {
            log::warn!("document has no body element");
            Vec::new()
        }
        Err(e) => {
            log::warn!("malformed document body: {e}");
            Vec::new()
        }
    }
}

/// Outline levels declared by paragraph styles in `styles.xml`.
#[derive(Debug, Clone, Default)]
pub struct StyleOutlines {
    /// style id -> (declared outline level, basedOn style id)
    styles: HashMap<String, (Option<Option<u8>>, Option<String>)>,
}

impl StyleOutlines {
    /// Outline level of a style, following `basedOn` links.
    ///
    /// The nearest style that declares `outlineLvl` decides, so an explicit
    /// body-text level stops the walk.
    pub fn outline_level(&self, style_id: &str) -> Option<u8> {
        let mut id = style_id;
        // Style chains are shallow; the bound only guards against cycles.
        for _ in 0..16 {
            let (declared, based_on) = self.styles.get(id)?;
            if let Some(level) = declared {
                return *level;
            }
            id = based_on.as_deref()?;
        }
        None
    }
}

/// A declared `outlineLvl` value: `Some(None)` is body text, `None` is an
/// unreadable value that counts as undeclared.
fn parse_outline(value: &str) -> Option<Option<u8>> {
    let level: u8 = value.trim().parse().ok()?;
    Some((level < BODY_OUTLINE_LEVEL).then_some(level))
}

fn val_attribute(e: &BytesStart) -> Result<Option<String>> {
    for attr in e.attributes().flatten() {
        if local_name(attr.key.as_ref()) == b"val" {
            return Ok(Some(String::from_utf8(attr.value.to_vec())?));
        }
    }
    Ok(None)
}

pub fn parse_style_outlines(xml: &str) -> Result<StyleOutlines> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut outlines = StyleOutlines::default();
    let mut current: Option<(String, Option<Option<u8>>, Option<String>)> = None;
    let mut in_ppr = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"style" => {
                        let mut id = String::new();
                        for attr in e.attributes().flatten() {
                            if local_name(attr.key.as_ref()) == b"styleId" {
                                id = String::from_utf8(attr.value.to_vec())?;
                            }
                        }
                        current = Some((id, None, None));
                    }
                    b"pPr" => in_ppr = current.is_some(),
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                let name = e.name();
                let Some((_, level, based_on)) = current.as_mut() else {
                    continue;
                };
                match local_name(name.as_ref()) {
                    b"basedOn" => *based_on = val_attribute(&e)?,
                    b"outlineLvl" if in_ppr => {
                        *level = val_attribute(&e)?.as_deref().and_then(parse_outline);
                    }
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"pPr" => in_ppr = false,
                    b"style" => {
                        if let Some((id, level, based_on)) = current.take()
                            && !id.is_empty()
                        {
                            outlines.styles.insert(id, (level, based_on));
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    Ok(outlines)
}

/// Collection state for the body-level paragraph being read.
struct ParagraphState {
    depth: usize,
    text: String,
    in_text: bool,
    /// Just closed a `w:t`; stray text here belongs to the paragraph.
    after_text: bool,
    ppr_depth: Option<usize>,
    /// Direct `outlineLvl`, if the paragraph declares one.
    outline: Option<Option<u8>>,
    style: Option<String>,
}

impl ParagraphState {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            text: String::new(),
            in_text: false,
            after_text: false,
            ppr_depth: None,
            outline: None,
            style: None,
        }
    }

    fn open(&mut self, local: &[u8], e: &BytesStart, depth: usize) -> Result<()> {
        self.after_text = false;
        match local {
            b"pPr" if depth == self.depth + 1 => self.ppr_depth = Some(depth),
            b"t" => self.in_text = true,
            _ => self.property(local, e, depth)?,
        }
        Ok(())
    }

    fn empty(&mut self, local: &[u8], e: &BytesStart, depth: usize) -> Result<()> {
        self.after_text = false;
        self.property(local, e, depth)
    }

    /// Direct children of this paragraph's `w:pPr`.
    fn property(&mut self, local: &[u8], e: &BytesStart, depth: usize) -> Result<()> {
        if self.ppr_depth.is_none_or(|ppr| depth != ppr + 1) {
            return Ok(());
        }
        match local {
            b"outlineLvl" => self.outline = val_attribute(e)?.as_deref().and_then(parse_outline),
            b"pStyle" => self.style = val_attribute(e)?,
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, local: &[u8], depth: usize) {
        match local {
            b"t" => {
                self.in_text = false;
                self.after_text = true;
                return;
            }
            b"pPr" if self.ppr_depth == Some(depth) => self.ppr_depth = None,
            _ => {}
        }
        self.after_text = false;
    }

    fn push_text(&mut self, text: &str) {
        if self.in_text || (self.after_text && !text.trim().is_empty()) {
            self.text.push_str(text);
        }
    }

    fn finish(self, styles: &StyleOutlines) -> Paragraph {
        let text = self.text.replace('\n', " ").trim().to_string();
        let outline = match self.outline {
            Some(level) => level,
            None => self.style.as_deref().and_then(|s| styles.outline_level(s)),
        };
        Paragraph::new(text, outline)
    }
}

fn parse_body(xml: &str, styles: &StyleOutlines) -> Result<Option<Vec<Paragraph>>> {
    let mut reader = Reader::from_str(xml);

    let mut depth = 0usize;
    let mut body_depth: Option<usize> = None;
    let mut found_body = false;
    let mut paragraphs = Vec::new();
    let mut current: Option<ParagraphState> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                let name = e.name();
                let local = local_name(name.as_ref());

                if !found_body && local == b"body" {
                    found_body = true;
                    body_depth = Some(depth);
                    continue;
                }
                let Some(body) = body_depth else {
                    continue;
                };
                match current.as_mut() {
                    Some(paragraph) => paragraph.open(local, &e, depth)?,
                    None if local == b"p" && depth == body + 1 => {
                        current = Some(ParagraphState::new(depth));
                    }
                    None => {}
                }
            }
            Event::Empty(e) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                match current.as_mut() {
                    Some(paragraph) => paragraph.empty(local, &e, depth + 1)?,
                    None if local == b"p" && body_depth == Some(depth) => {
                        paragraphs.push(Paragraph::body(""));
                    }
                    None => {}
                }
            }
            Event::Text(e) => {
                if let Some(paragraph) = current.as_mut() {
                    paragraph.push_text(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::GeneralRef(e) => {
                if let Some(paragraph) = current.as_mut() {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(resolved) = resolve_entity(&entity) {
                        paragraph.push_text(&resolved);
                    }
                }
            }
            Event::End(e) => {
                let name = e.name();
                let local = local_name(name.as_ref());

                if let Some(paragraph) = current.as_mut() {
                    if paragraph.depth == depth {
                        if let Some(done) = current.take() {
                            paragraphs.push(done.finish(styles));
                        }
                    } else {
                        paragraph.close(local, depth);
                    }
                } else if body_depth == Some(depth) {
                    body_depth = None;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(found_body.then_some(paragraphs))
}

fn read_archive_file<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let bytes = read_archive_file_bytes(archive, path)?;
    // Parts may carry a UTF-8 or UTF-16 BOM
    Ok(decode_text(&bytes).into_owned())
}

fn read_archive_file_bytes<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<Vec<u8>> {
    match archive.by_name(path) {
        Ok(mut file) => {
            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            return Ok(contents);
        }
        Err(zip::result::ZipError::FileNotFound) => {}
        Err(e) => return Err(e.into()),
    }

    // Fallback: some producers percent-encode part names in the central directory
    let encoded =
        percent_encoding::utf8_percent_encode(path, percent_encoding::NON_ALPHANUMERIC)
            .to_string()
            .replace("%2F", "/")
            .replace("%2E", ".")
            .replace("%5F", "_");
    if encoded == path {
        return Err(zip::result::ZipError::FileNotFound.into());
    }

    let mut file = archive.by_name(&encoded)?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)?;
    Ok(contents)
}
