use super::*;
use xmltree::{Element, XMLNode};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const CALC_CHAIN_PART: &str = "xl/calcChain.xml";

// Workbook children ordered after <calcPr>.
const FOLLOWS_CALC_PR: &[&[u8]] = &[
    b"oleSize",
    b"customWorkbookViews",
    b"pivotCaches",
    b"smartTagPr",
    b"smartTagTypes",
    b"webPublishing",
    b"fileRecoveryPr",
    b"webPublishObjects",
    b"extLst",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    pub name: String,
    pub part: String,
}

impl XlsxPackage {
    // Sheets in workbook order, each resolved through the workbook relationships to its part.
    pub fn sheet_entries(&self) -> Result<Vec<SheetEntry>, AppError> {
        let workbook = Self::parse_element(&self.part_str(WORKBOOK_PART)?)?;
        let rels = Self::parse_element(&self.part_str(WORKBOOK_RELS_PART)?)?;

        let mut targets: BTreeMap<String, String> = BTreeMap::new();
        for rel in Self::child_elements(&rels) {
            if let (Some(id), Some(target)) = (Self::attr(rel, "Id"), Self::attr(rel, "Target")) {
                targets.insert(id.to_string(), Self::resolve_target(target));
            }
        }

        let sheets = Self::child_elements(&workbook)
            .find(|e| e.name == "sheets")
            .ok_or_else(|| AppError::InvalidWorkbook("workbook.xml has no <sheets>".to_string()))?;

        let mut entries = Vec::new();
        for sheet in Self::child_elements(sheets).filter(|e| e.name == "sheet") {
            let name = Self::attr(sheet, "name").unwrap_or_default().to_string();
            let rel_id = Self::attr(sheet, "id").ok_or_else(|| {
                AppError::InvalidWorkbook(format!("sheet '{name}' has no relationship id"))
            })?;
            let part = targets.get(rel_id).cloned().ok_or_else(|| {
                AppError::InvalidWorkbook(format!("sheet '{name}' points to unknown part {rel_id}"))
            })?;
            entries.push(SheetEntry { name, part });
        }
        Ok(entries)
    }

    // Written formulas carry no cached value; make the application recompute on open.
    // A new <calcPr> goes before the first workbook child that must follow it.
    pub fn force_full_calc_on_load(&mut self) -> Result<(), AppError> {
        let Some(original) = self.part(WORKBOOK_PART) else {
            return Ok(());
        };
        let mut reader = Reader::from_reader(original);
        reader.config_mut().trim_text(false);
        let mut writer = Writer::new(Vec::with_capacity(original.len() + 64));
        let mut buf = Vec::new();
        let mut depth = 0usize;
        let mut saw_calc_pr = false;

        loop {
            let event = reader.read_event_into(&mut buf)?;
            if depth == 1 && !saw_calc_pr {
                let insert_here = match &event {
                    Event::Start(e) | Event::Empty(e) => {
                        FOLLOWS_CALC_PR.contains(&Self::local_name(e.name().as_ref()))
                    }
                    Event::End(_) => true,
                    _ => false,
                };
                if insert_here {
                    let mut calc_pr = BytesStart::new("calcPr");
                    calc_pr.push_attribute(("fullCalcOnLoad", "1"));
                    writer.write_event(Event::Empty(calc_pr))?;
                    saw_calc_pr = true;
                }
            }

            match event {
                Event::Empty(e) if Self::local_name(e.name().as_ref()) == b"calcPr" => {
                    saw_calc_pr = true;
                    writer.write_event(Event::Empty(Self::patched_calc_pr(&e)?))?;
                }
                Event::Start(e) if Self::local_name(e.name().as_ref()) == b"calcPr" => {
                    saw_calc_pr = true;
                    depth += 1;
                    writer.write_event(Event::Start(Self::patched_calc_pr(&e)?))?;
                }
                Event::Start(e) => {
                    depth += 1;
                    writer.write_event(Event::Start(e.into_owned()))?;
                }
                Event::End(e) => {
                    depth = depth.saturating_sub(1);
                    writer.write_event(Event::End(e.into_owned()))?;
                }
                Event::Eof => break,
                ev => writer.write_event(ev.into_owned())?,
            }
            buf.clear();
        }

        self.set_part(WORKBOOK_PART, writer.into_inner());
        Ok(())
    }

    // A stale calc chain makes Excel "repair" the file once formula cells change.
    pub fn drop_calc_chain(&mut self) -> Result<(), AppError> {
        if !self.remove_part(CALC_CHAIN_PART) {
            return Ok(());
        }
        if let Some(rels) = self.part(WORKBOOK_RELS_PART) {
            let updated = Self::strip_elements(rels, b"Relationship", |e| {
                Ok(Self::attr_value(e, b"Type")?.is_some_and(|t| t.ends_with("/calcChain")))
            })?;
            self.set_part(WORKBOOK_RELS_PART, updated);
        }
        if let Some(types) = self.part(CONTENT_TYPES_PART) {
            let updated = Self::strip_elements(types, b"Override", |e| {
                Ok(Self::attr_value(e, b"PartName")?.is_some_and(|p| p == "/xl/calcChain.xml"))
            })?;
            self.set_part(CONTENT_TYPES_PART, updated);
        }
        Ok(())
    }

    fn strip_elements<F>(xml: &[u8], local: &[u8], mut matches: F) -> Result<Vec<u8>, AppError>
    where
        F: FnMut(&BytesStart<'_>) -> Result<bool, AppError>,
    {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(false);
        let mut writer = Writer::new(Vec::with_capacity(xml.len()));
        let mut buf = Vec::new();
        let mut skip_depth = 0usize;

        loop {
            let event = reader.read_event_into(&mut buf)?;
            if skip_depth > 0 {
                match event {
                    Event::Start(_) => skip_depth += 1,
                    Event::End(_) => skip_depth -= 1,
                    Event::Eof => break,
                    _ => {}
                }
                buf.clear();
                continue;
            }
            match event {
                Event::Empty(e) if Self::local_name(e.name().as_ref()) == local && matches(&e)? => {}
                Event::Start(e) if Self::local_name(e.name().as_ref()) == local && matches(&e)? => {
                    skip_depth = 1;
                }
                Event::Eof => break,
                ev => writer.write_event(ev.into_owned())?,
            }
            buf.clear();
        }
        Ok(writer.into_inner())
    }

    fn patched_calc_pr(e: &BytesStart<'_>) -> Result<BytesStart<'static>, AppError> {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let mut calc_pr = BytesStart::new(name);
        for attr in e.attributes() {
            let attr = attr?;
            if Self::local_name(attr.key.as_ref()) == b"fullCalcOnLoad" {
                continue;
            }
            calc_pr.push_attribute((attr.key.as_ref(), attr.value.as_ref()));
        }
        calc_pr.push_attribute(("fullCalcOnLoad", "1"));
        Ok(calc_pr)
    }

    fn parse_element(xml: &str) -> Result<Element, AppError> {
        Element::parse(xml.as_bytes()).map_err(|e| AppError::XmlParseError(e.to_string()))
    }

    fn child_elements(element: &Element) -> impl Iterator<Item = &Element> {
        element.children.iter().filter_map(|node| match node {
            XMLNode::Element(e) => Some(e),
            _ => None,
        })
    }

    fn attr<'a>(element: &'a Element, local: &str) -> Option<&'a str> {
        element
            .attributes
            .iter()
            .find(|(k, _)| k.as_str() == local || k.rsplit(':').next() == Some(local))
            .map(|(_, v)| v.as_str())
    }

    // Relationship targets are relative to xl/ unless rooted at the package.
    fn resolve_target(target: &str) -> String {
        if let Some(rooted) = target.strip_prefix('/') {
            return rooted.to_string();
        }
        let mut segments: Vec<&str> = vec!["xl"];
        for segment in target.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                s => segments.push(s),
            }
        }
        segments.join("/")
    }
}
