//! Document model -> DOCX package.
//!
//! Serializes a [`Document`] as a minimal WordprocessingML package: content
//! types, package and document relationships, the main document part, a
//! styles part defining every style the builder references, a numbering part
//! for the two list styles, and the embedded media.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::Result;
use crate::util::escape_xml;

use super::model::{
    Document, Element, Para, ParaStyle, Picture, Run, RunContent, Table, heading_size_pt,
};

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Text area width for Letter paper with the margins below, in twips.
const TEXT_WIDTH_TWIPS: usize = 8646;
const PAGE_WIDTH_TWIPS: u32 = 12240;
const PAGE_HEIGHT_TWIPS: u32 = 15840;
const MARGIN_VERTICAL_TWIPS: u32 = 1440;
const MARGIN_HORIZONTAL_TWIPS: u32 = 1797;

const BULLET_NUM_ID: u32 = 1;
const DECIMAL_NUM_ID: u32 = 2;

/// Write a document to a `.docx` file, replacing any existing file.
pub fn write_docx<P: AsRef<Path>>(document: &Document, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_docx_to_writer(document, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a document as a DOCX package to any [`Write`] + [`Seek`] sink.
pub fn write_docx_to_writer<W: Write + Seek>(document: &Document, writer: W) -> Result<()> {
    let mut zip = ZipWriter::new(writer);

    let deflated = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(6));
    // Images are already compressed
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    zip.start_file("[Content_Types].xml", deflated)?;
    zip.write_all(content_types_xml(document).as_bytes())?;

    zip.start_file("_rels/.rels", deflated)?;
    zip.write_all(package_rels_xml().as_bytes())?;

    zip.start_file("word/_rels/document.xml.rels", deflated)?;
    zip.write_all(document_rels_xml(document).as_bytes())?;

    zip.start_file("word/document.xml", deflated)?;
    zip.write_all(document_xml(document).as_bytes())?;

    zip.start_file("word/styles.xml", deflated)?;
    zip.write_all(styles_xml(document).as_bytes())?;

    zip.start_file("word/numbering.xml", deflated)?;
    zip.write_all(numbering_xml().as_bytes())?;

    for media in &document.media {
        zip.start_file(format!("word/{}", media.target), stored)?;
        zip.write_all(&media.data)?;
    }

    zip.finish()?;
    log::debug!(
        "wrote docx: {} body elements, {} media parts",
        document.body.len(),
        document.media.len()
    );
    Ok(())
}

fn content_types_xml(document: &Document) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
"#,
    );

    let formats: BTreeSet<_> = document
        .media
        .iter()
        .map(|m| (m.format.extension(), m.format.mime_type()))
        .collect();
    for (extension, mime) in formats {
        xml.push_str(&format!(
            "  <Default Extension=\"{extension}\" ContentType=\"{mime}\"/>\n"
        ));
    }

    xml.push_str(
        r#"  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
  <Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>
</Types>
"#,
    );
    xml
}

fn package_rels_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="{REL_BASE}/officeDocument" Target="word/document.xml"/>
</Relationships>
"#
    )
}

fn document_rels_xml(document: &Document) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="{REL_BASE}/styles" Target="styles.xml"/>
  <Relationship Id="rId2" Type="{REL_BASE}/numbering" Target="numbering.xml"/>
"#
    );
    for media in &document.media {
        xml.push_str(&format!(
            "  <Relationship Id=\"{}\" Type=\"{REL_BASE}/image\" Target=\"{}\"/>\n",
            media.rel_id,
            escape_xml(&media.target)
        ));
    }
    xml.push_str("</Relationships>\n");
    xml
}

fn document_xml(document: &Document) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{NS_W}" xmlns:r="{NS_R}" xmlns:wp="{NS_WP}" xmlns:a="{NS_A}" xmlns:pic="{NS_PIC}">
<w:body>
"#
    );

    for element in &document.body {
        match element {
            Element::Para(para) => write_para(&mut xml, para),
            Element::Table(table) => write_table(&mut xml, table),
            Element::PageBreak => xml.push_str("<w:p><w:r><w:br w:type=\"page\"/></w:r></w:p>\n"),
        }
    }

    xml.push_str(&format!(
        "<w:sectPr><w:pgSz w:w=\"{PAGE_WIDTH_TWIPS}\" w:h=\"{PAGE_HEIGHT_TWIPS}\"/>\
         <w:pgMar w:top=\"{MARGIN_VERTICAL_TWIPS}\" w:right=\"{MARGIN_HORIZONTAL_TWIPS}\" \
         w:bottom=\"{MARGIN_VERTICAL_TWIPS}\" w:left=\"{MARGIN_HORIZONTAL_TWIPS}\" \
         w:header=\"720\" w:footer=\"720\" w:gutter=\"0\"/></w:sectPr>\n"
    ));
    xml.push_str("</w:body>\n</w:document>\n");
    xml
}

fn write_para(xml: &mut String, para: &Para) {
    xml.push_str("<w:p>");

    let mut props = String::new();
    if let Some(style) = para.style {
        props.push_str(&format!("<w:pStyle w:val=\"{}\"/>", style.style_id()));
    }
    if let Some(indent) = para.indent_left {
        props.push_str(&format!("<w:ind w:left=\"{indent}\"/>"));
    }
    if para.centered {
        props.push_str("<w:jc w:val=\"center\"/>");
    }
    if let Some(level) = para.outline_level {
        props.push_str(&format!("<w:outlineLvl w:val=\"{level}\"/>"));
    }
    if !props.is_empty() {
        xml.push_str("<w:pPr>");
        xml.push_str(&props);
        xml.push_str("</w:pPr>");
    }

    for run in &para.runs {
        write_run(xml, run);
    }
    xml.push_str("</w:p>\n");
}

fn write_run(xml: &mut String, run: &Run) {
    xml.push_str("<w:r>");

    let format = &run.format;
    let mut props = String::new();
    if let Some(font) = &format.font {
        let font = escape_xml(font);
        props.push_str(&format!(
            "<w:rFonts w:ascii=\"{font}\" w:hAnsi=\"{font}\" w:eastAsia=\"{font}\"/>"
        ));
    }
    if format.bold {
        props.push_str("<w:b/>");
    }
    if format.italic {
        props.push_str("<w:i/>");
    }
    if let Some(size) = format.size_pt {
        // Half-points
        props.push_str(&format!(
            "<w:sz w:val=\"{0}\"/><w:szCs w:val=\"{0}\"/>",
            size * 2
        ));
    }
    if !props.is_empty() {
        xml.push_str("<w:rPr>");
        xml.push_str(&props);
        xml.push_str("</w:rPr>");
    }

    match &run.content {
        RunContent::Text(text) => {
            for (i, piece) in text.split('\t').enumerate() {
                if i > 0 {
                    xml.push_str("<w:tab/>");
                }
                if !piece.is_empty() {
                    xml.push_str("<w:t xml:space=\"preserve\">");
                    xml.push_str(&escape_xml(piece));
                    xml.push_str("</w:t>");
                }
            }
        }
        RunContent::Break => xml.push_str("<w:br/>"),
        RunContent::Picture(picture) => write_picture(xml, picture),
    }
    xml.push_str("</w:r>");
}

fn write_picture(xml: &mut String, picture: &Picture) {
    let Picture {
        rel_id,
        id,
        name,
        width_emu: cx,
        height_emu: cy,
    } = picture;
    let name = escape_xml(name);
    xml.push_str(&format!(
        "<w:drawing><wp:inline distT=\"0\" distB=\"0\" distL=\"0\" distR=\"0\">\
         <wp:extent cx=\"{cx}\" cy=\"{cy}\"/>\
         <wp:docPr id=\"{id}\" name=\"{name}\"/>\
         <wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect=\"1\"/></wp:cNvGraphicFramePr>\
         <a:graphic><a:graphicData uri=\"{NS_PIC}\"><pic:pic>\
         <pic:nvPicPr><pic:cNvPr id=\"0\" name=\"{name}\"/><pic:cNvPicPr/></pic:nvPicPr>\
         <pic:blipFill><a:blip r:embed=\"{rel_id}\"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>\
         <pic:spPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm>\
         <a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></pic:spPr>\
         </pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing>"
    ));
}

fn write_table(xml: &mut String, table: &Table) {
    let cell_width = TEXT_WIDTH_TWIPS / table.columns.max(1);

    xml.push_str(
        "<w:tbl><w:tblPr><w:tblStyle w:val=\"TableGrid\"/><w:tblW w:w=\"0\" w:type=\"auto\"/></w:tblPr>",
    );
    xml.push_str("<w:tblGrid>");
    for _ in 0..table.columns {
        xml.push_str(&format!("<w:gridCol w:w=\"{cell_width}\"/>"));
    }
    xml.push_str("</w:tblGrid>\n");

    for row in &table.rows {
        xml.push_str("<w:tr>");
        for cell in row {
            xml.push_str(&format!(
                "<w:tc><w:tcPr><w:tcW w:w=\"{cell_width}\" w:type=\"dxa\"/></w:tcPr>"
            ));
            write_para(xml, cell);
            xml.push_str("</w:tc>");
        }
        xml.push_str("</w:tr>\n");
    }
    xml.push_str("</w:tbl>\n");
}

fn styles_xml(document: &Document) -> String {
    let font = escape_xml(&document.body_font);
    let size = document.body_size_pt * 2;

    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="{NS_W}">
<w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:eastAsia="{font}" w:cs="{font}"/><w:sz w:val="{size}"/><w:szCs w:val="{size}"/></w:rPr></w:rPrDefault><w:pPrDefault/></w:docDefaults>
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/><w:pPr><w:spacing w:after="120" w:line="360" w:lineRule="auto"/></w:pPr></w:style>
<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="240"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="28"/><w:szCs w:val="28"/></w:rPr></w:style>
"#
    );

    // Markdown level 1 is `Title`
    for level in 2..=4u8 {
        let heading = ParaStyle::Heading(level).style_id();
        let size = heading_size_pt(level, document.body_size_pt) * 2;
        xml.push_str(&format!(
            "<w:style w:type=\"paragraph\" w:styleId=\"{heading}\"><w:name w:val=\"heading {level}\"/>\
             <w:basedOn w:val=\"Normal\"/><w:next w:val=\"Normal\"/><w:qFormat/>\
             <w:pPr><w:keepNext/><w:spacing w:before=\"240\" w:after=\"120\"/><w:outlineLvl w:val=\"{}\"/></w:pPr>\
             <w:rPr><w:b/><w:sz w:val=\"{size}\"/><w:szCs w:val=\"{size}\"/></w:rPr></w:style>\n",
            level - 1
        ));
    }

    for (style, name, num_id) in [
        (ParaStyle::ListBullet, "List Bullet", BULLET_NUM_ID),
        (ParaStyle::ListNumber, "List Number", DECIMAL_NUM_ID),
    ] {
        xml.push_str(&format!(
            "<w:style w:type=\"paragraph\" w:styleId=\"{}\"><w:name w:val=\"{name}\"/>\
             <w:basedOn w:val=\"Normal\"/><w:pPr><w:numPr><w:ilvl w:val=\"0\"/><w:numId w:val=\"{num_id}\"/></w:numPr>\
             <w:ind w:left=\"720\" w:hanging=\"360\"/></w:pPr></w:style>\n",
            style.style_id()
        ));
    }

    xml.push_str(
        r#"<w:style w:type="table" w:styleId="TableGrid"><w:name w:val="Table Grid"/><w:tblPr><w:tblBorders><w:top w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:left w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:bottom w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:right w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideH w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideV w:val="single" w:sz="4" w:space="0" w:color="auto"/></w:tblBorders><w:tblCellMar><w:left w:w="108" w:type="dxa"/><w:right w:w="108" w:type="dxa"/></w:tblCellMar></w:tblPr></w:style>
</w:styles>
"#,
    );
    xml
}

fn numbering_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="{NS_W}">
<w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="singleLevel"/><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="&#8226;"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum>
<w:abstractNum w:abstractNumId="1"><w:multiLevelType w:val="singleLevel"/><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum>
<w:num w:numId="{BULLET_NUM_ID}"><w:abstractNumId w:val="0"/></w:num>
<w:num w:numId="{DECIMAL_NUM_ID}"><w:abstractNumId w:val="1"/></w:num>
</w:numbering>
"#
    )
}
