//! Builders for small but structurally valid sample documents.

use lopdf::{dictionary, Dictionary, Document, Object};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub fn minimal_pdf() -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

pub fn write_pdf(path: &Path, creation: Option<&str>, modified: Option<&str>) {
    let mut doc = minimal_pdf();
    let mut info = Dictionary::new();
    if let Some(value) = creation {
        info.set("CreationDate", Object::string_literal(value));
    }
    if let Some(value) = modified {
        info.set("ModDate", Object::string_literal(value));
    }
    let info_id = doc.add_object(info);
    doc.trailer.set("Info", info_id);
    doc.save(path).unwrap();
}

pub fn core_properties_xml(created: &str, modified: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:creator>Tester</dc:creator><dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">{}</dcterms:modified></cp:coreProperties>"#,
        created, modified
    )
}

/// Write an OOXML package; `core_xml` goes to `docProps/core.xml`.
pub fn write_ooxml(path: &Path, core_xml: Option<&str>) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
        .unwrap();

    if let Some(xml) = core_xml {
        zip.start_file("_rels/.rels", options).unwrap();
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#)
            .unwrap();
        zip.start_file("docProps/core.xml", options).unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
    }

    zip.finish().unwrap();
}

/// Write a `.msg` compound file holding the given `(tag, value)` pairs as
/// Unicode string property streams.
pub fn write_msg(path: &Path, properties: &[(&str, &str)]) {
    let mut message = cfb::create(path).unwrap();
    for (tag, value) in properties {
        let mut stream = message
            .create_stream(format!("/__substg1.0_{}001F", tag))
            .unwrap();
        let bytes: Vec<u8> = value.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
        stream.write_all(&bytes).unwrap();
    }
    message.flush().unwrap();
}

/// SOI immediately followed by EOI: a JPEG with no APP1 segment.
pub const JPEG_WITHOUT_EXIF: &[u8] = &[0xFF, 0xD8, 0xFF, 0xD9];

/// JPEG carrying a little-endian EXIF block with IFD0 `DateTime` and an
/// Exif IFD holding `DateTimeOriginal`. Both values must be 19 characters.
pub fn jpeg_with_exif(date_time: &str, date_time_original: &str) -> Vec<u8> {
    assert_eq!(date_time.len(), 19);
    assert_eq!(date_time_original.len(), 19);

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&8u32.to_le_bytes());

    // IFD0 at 8: two entries, ends at 38.
    tiff.extend_from_slice(&2u16.to_le_bytes());
    push_entry(&mut tiff, 0x0132, 2, 20, 38);
    push_entry(&mut tiff, 0x8769, 4, 1, 58);
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff.extend_from_slice(date_time.as_bytes());
    tiff.push(0);

    // Exif IFD at 58: one entry, value at 76.
    tiff.extend_from_slice(&1u16.to_le_bytes());
    push_entry(&mut tiff, 0x9003, 2, 20, 76);
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff.extend_from_slice(date_time_original.as_bytes());
    tiff.push(0);

    let mut app1 = b"Exif\0\0".to_vec();
    app1.extend_from_slice(&tiff);

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpeg.extend_from_slice(&((app1.len() + 2) as u16).to_be_bytes());
    jpeg.extend_from_slice(&app1);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

fn push_entry(buf: &mut Vec<u8>, tag: u16, field_type: u16, count: u32, value: u32) {
    buf.extend_from_slice(&tag.to_le_bytes());
    buf.extend_from_slice(&field_type.to_le_bytes());
    buf.extend_from_slice(&count.to_le_bytes());
    buf.extend_from_slice(&value.to_le_bytes());
}
