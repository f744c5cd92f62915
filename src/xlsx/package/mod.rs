use crate::common::errors::AppError;
use crate::xlsx::cell_address::{CellAddress, CellRange};
use crate::xlsx::sheet_model::CellContent;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

mod cell_edit;
mod merged_anchor;
mod workbook_xml;

pub use workbook_xml::SheetEntry;

// Raw xlsx package: every zip entry kept in its original order so untouched
// parts (styles, themes, drawings) round-trip byte for byte.
pub struct XlsxPackage {
    entries: Vec<(String, Vec<u8>)>,
}

impl XlsxPackage {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, AppError> {
        let mut zip = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            let name = file.name().to_string();
            if name.ends_with('/') {
                continue;
            }
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            entries.push((name, bytes));
        }

        let package = Self { entries };
        if package.part("xl/workbook.xml").is_none() {
            return Err(AppError::InvalidWorkbook(
                "missing xl/workbook.xml part".to_string(),
            ));
        }
        Ok(package)
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, bytes)| bytes.as_slice())
    }

    pub fn part_str(&self, name: &str) -> Result<String, AppError> {
        let bytes = self
            .part(name)
            .ok_or_else(|| AppError::InvalidWorkbook(format!("missing part: {name}")))?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| AppError::XmlParseError(format!("{name}: {e}")))
    }

    pub fn set_part(&mut self, name: &str, bytes: Vec<u8>) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = bytes,
            None => self.entries.push((name.to_string(), bytes)),
        }
    }

    pub fn remove_part(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(n, _)| n != name);
        before != self.entries.len()
    }

    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        let out = File::create(path)?;
        self.write_to(out)?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, AppError> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    fn write_to<W: Write + Seek>(&self, out: W) -> Result<(), AppError> {
        let mut writer = ZipWriter::new(out);
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        // ZIP files do not require explicit directory entries; only files are written.
        for (name, bytes) in &self.entries {
            writer.start_file(name.as_str(), deflated)?;
            writer.write_all(bytes)?;
        }
        writer.finish()?;
        Ok(())
    }

    fn local_name(name: &[u8]) -> &[u8] {
        match name.iter().rposition(|b| *b == b':') {
            Some(idx) => &name[idx + 1..],
            None => name,
        }
    }

    fn attr_value(e: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>, AppError> {
        for attr in e.attributes() {
            let attr = attr?;
            if Self::local_name(attr.key.as_ref()) == local {
                return Ok(Some(attr.unescape_value()?.into_owned()));
            }
        }
        Ok(None)
    }
}
