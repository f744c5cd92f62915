use super::*;

impl XlsxPackage {
    pub fn merge_regions(sheet_xml: &[u8]) -> Result<Vec<CellRange>, AppError> {
        let mut reader = Reader::from_reader(sheet_xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();
        let mut regions = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e)
                    if Self::local_name(e.name().as_ref()) == b"mergeCell" =>
                {
                    if let Some(reference) = Self::attr_value(&e, b"ref")? {
                        let region = CellRange::parse(&reference)?;
                        // A one-cell merge covers nothing.
                        if !region.is_single_cell() {
                            regions.push(region);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(regions)
    }

    // Only the top-left cell of a merge region holds a value.
    pub fn resolve_merged_anchor(regions: &[CellRange], target: CellAddress) -> CellAddress {
        regions
            .iter()
            .find(|region| region.contains(target))
            .map(|region| region.start)
            .unwrap_or(target)
    }
}
