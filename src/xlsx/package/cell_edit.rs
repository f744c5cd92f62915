use super::*;
use quick_xml::escape::escape;

type RowEdits<'a> = BTreeMap<u32, Vec<(usize, &'a CellContent)>>;

impl XlsxPackage {
    // Rewrites <sheetData> so every edited cell carries its new content while
    // untouched rows, cells and the cell's own style index stay as they were.
    pub fn patch_sheet_cells(
        sheet_xml: &[u8],
        edits: &BTreeMap<CellAddress, CellContent>,
    ) -> Result<Vec<u8>, AppError> {
        let rows = Self::group_by_row(edits);
        let pending: Vec<u32> = rows.keys().copied().collect();
        let mut next_row = 0usize;

        let mut reader = Reader::from_reader(sheet_xml);
        reader.config_mut().trim_text(false);
        let mut writer = Writer::new(Vec::with_capacity(sheet_xml.len() + edits.len() * 64));
        let mut buf = Vec::new();
        let mut saw_sheet_data = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) if Self::local_name(e.name().as_ref()) == b"sheetData" => {
                    saw_sheet_data = true;
                    writer.write_event(Event::Start(e.into_owned()))?;
                    Self::patch_sheet_data(&mut reader, &mut writer, &rows, &pending, &mut next_row)?;
                }
                Event::Empty(e) if Self::local_name(e.name().as_ref()) == b"sheetData" => {
                    saw_sheet_data = true;
                    if rows.is_empty() {
                        writer.write_event(Event::Empty(e.into_owned()))?;
                    } else {
                        writer.write_event(Event::Start(e.into_owned()))?;
                        Self::write_remaining_rows(&mut writer, &rows, &pending, &mut next_row)?;
                        writer.write_event(Event::End(BytesEnd::new("sheetData")))?;
                    }
                }
                Event::End(e) if Self::local_name(e.name().as_ref()) == b"worksheet" => {
                    if !saw_sheet_data && !rows.is_empty() {
                        writer.write_event(Event::Start(BytesStart::new("sheetData")))?;
                        Self::write_remaining_rows(&mut writer, &rows, &pending, &mut next_row)?;
                        writer.write_event(Event::End(BytesEnd::new("sheetData")))?;
                    }
                    writer.write_event(Event::End(e.into_owned()))?;
                }
                Event::Eof => break,
                ev => writer.write_event(ev.into_owned())?,
            }
            buf.clear();
        }

        Ok(writer.into_inner())
    }

    fn group_by_row(edits: &BTreeMap<CellAddress, CellContent>) -> RowEdits<'_> {
        let mut rows: RowEdits<'_> = BTreeMap::new();
        // BTreeMap order is (row, col), so each row's cells arrive sorted by column.
        for (address, content) in edits {
            rows.entry(address.row as u32 + 1)
                .or_default()
                .push((address.col, content));
        }
        rows
    }

    fn patch_sheet_data<R: std::io::BufRead>(
        reader: &mut Reader<R>,
        writer: &mut Writer<Vec<u8>>,
        rows: &RowEdits<'_>,
        pending: &[u32],
        next_row: &mut usize,
    ) -> Result<(), AppError> {
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) if Self::local_name(e.name().as_ref()) == b"row" => {
                    let row_start = e.into_owned();
                    let Some(row_num) = Self::row_number(&row_start)? else {
                        writer.write_event(Event::Start(row_start))?;
                        buf.clear();
                        continue;
                    };
                    Self::write_rows_before(writer, rows, pending, next_row, row_num)?;
                    match rows.get(&row_num) {
                        Some(cells) => {
                            *next_row += 1;
                            writer.write_event(Event::Start(Self::row_without_spans(&row_start)?))?;
                            Self::patch_row(reader, writer, row_num, cells)?;
                        }
                        None => writer.write_event(Event::Start(row_start))?,
                    }
                }
                Event::Empty(e) if Self::local_name(e.name().as_ref()) == b"row" => {
                    let row_empty = e.into_owned();
                    let Some(row_num) = Self::row_number(&row_empty)? else {
                        writer.write_event(Event::Empty(row_empty))?;
                        buf.clear();
                        continue;
                    };
                    Self::write_rows_before(writer, rows, pending, next_row, row_num)?;
                    match rows.get(&row_num) {
                        Some(cells) => {
                            *next_row += 1;
                            writer.write_event(Event::Start(Self::row_without_spans(&row_empty)?))?;
                            for (col, content) in cells {
                                Self::write_cell(writer, row_num, *col, content, None)?;
                            }
                            writer.write_event(Event::End(BytesEnd::new("row")))?;
                        }
                        None => writer.write_event(Event::Empty(row_empty))?,
                    }
                }
                Event::End(e) if Self::local_name(e.name().as_ref()) == b"sheetData" => {
                    Self::write_remaining_rows(writer, rows, pending, next_row)?;
                    writer.write_event(Event::End(e.into_owned()))?;
                    return Ok(());
                }
                Event::Eof => {
                    return Err(AppError::XmlParseError(
                        "unexpected EOF inside sheetData".to_string(),
                    ))
                }
                ev => writer.write_event(ev.into_owned())?,
            }
            buf.clear();
        }
    }

    fn patch_row<R: std::io::BufRead>(
        reader: &mut Reader<R>,
        writer: &mut Writer<Vec<u8>>,
        row_num: u32,
        cells: &[(usize, &CellContent)],
    ) -> Result<(), AppError> {
        let mut buf = Vec::new();
        let mut next_cell = 0usize;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) if Self::local_name(e.name().as_ref()) == b"c" => {
                    let cell_start = e.into_owned();
                    let Some(col) = Self::cell_column(&cell_start, row_num)? else {
                        writer.write_event(Event::Start(cell_start))?;
                        buf.clear();
                        continue;
                    };
                    Self::write_cells_before(writer, row_num, cells, &mut next_cell, col)?;
                    if next_cell < cells.len() && cells[next_cell].0 == col {
                        Self::skip_cell_body(reader)?;
                        let style = Self::attr_value(&cell_start, b"s")?;
                        Self::write_cell(writer, row_num, col, cells[next_cell].1, style.as_deref())?;
                        next_cell += 1;
                    } else {
                        writer.write_event(Event::Start(cell_start))?;
                    }
                }
                Event::Empty(e) if Self::local_name(e.name().as_ref()) == b"c" => {
                    let cell_empty = e.into_owned();
                    let Some(col) = Self::cell_column(&cell_empty, row_num)? else {
                        writer.write_event(Event::Empty(cell_empty))?;
                        buf.clear();
                        continue;
                    };
                    Self::write_cells_before(writer, row_num, cells, &mut next_cell, col)?;
                    if next_cell < cells.len() && cells[next_cell].0 == col {
                        let style = Self::attr_value(&cell_empty, b"s")?;
                        Self::write_cell(writer, row_num, col, cells[next_cell].1, style.as_deref())?;
                        next_cell += 1;
                    } else {
                        writer.write_event(Event::Empty(cell_empty))?;
                    }
                }
                Event::End(e) if Self::local_name(e.name().as_ref()) == b"row" => {
                    while next_cell < cells.len() {
                        let (col, content) = cells[next_cell];
                        Self::write_cell(writer, row_num, col, content, None)?;
                        next_cell += 1;
                    }
                    writer.write_event(Event::End(e.into_owned()))?;
                    return Ok(());
                }
                Event::Eof => {
                    return Err(AppError::XmlParseError(
                        "unexpected EOF inside row".to_string(),
                    ))
                }
                ev => writer.write_event(ev.into_owned())?,
            }
            buf.clear();
        }
    }

    fn skip_cell_body<R: std::io::BufRead>(reader: &mut Reader<R>) -> Result<(), AppError> {
        let mut buf = Vec::new();
        let mut depth = 1usize;
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(_) => depth += 1,
                Event::End(_) => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Event::Eof => {
                    return Err(AppError::XmlParseError(
                        "unexpected EOF inside cell".to_string(),
                    ))
                }
                _ => {}
            }
            buf.clear();
        }
    }

    fn write_rows_before(
        writer: &mut Writer<Vec<u8>>,
        rows: &RowEdits<'_>,
        pending: &[u32],
        next_row: &mut usize,
        row_num: u32,
    ) -> Result<(), AppError> {
        while *next_row < pending.len() && pending[*next_row] < row_num {
            Self::write_new_row(writer, pending[*next_row], rows)?;
            *next_row += 1;
        }
        Ok(())
    }

    fn write_remaining_rows(
        writer: &mut Writer<Vec<u8>>,
        rows: &RowEdits<'_>,
        pending: &[u32],
        next_row: &mut usize,
    ) -> Result<(), AppError> {
        while *next_row < pending.len() {
            Self::write_new_row(writer, pending[*next_row], rows)?;
            *next_row += 1;
        }
        Ok(())
    }

    fn write_new_row(
        writer: &mut Writer<Vec<u8>>,
        row_num: u32,
        rows: &RowEdits<'_>,
    ) -> Result<(), AppError> {
        let mut row = BytesStart::new("row");
        row.push_attribute(("r", row_num.to_string().as_str()));
        writer.write_event(Event::Start(row))?;
        for (col, content) in rows.get(&row_num).map(Vec::as_slice).unwrap_or_default() {
            Self::write_cell(writer, row_num, *col, content, None)?;
        }
        writer.write_event(Event::End(BytesEnd::new("row")))?;
        Ok(())
    }

    fn write_cells_before(
        writer: &mut Writer<Vec<u8>>,
        row_num: u32,
        cells: &[(usize, &CellContent)],
        next_cell: &mut usize,
        col: usize,
    ) -> Result<(), AppError> {
        while *next_cell < cells.len() && cells[*next_cell].0 < col {
            let (new_col, content) = cells[*next_cell];
            Self::write_cell(writer, row_num, new_col, content, None)?;
            *next_cell += 1;
        }
        Ok(())
    }

    fn write_cell(
        writer: &mut Writer<Vec<u8>>,
        row_num: u32,
        col: usize,
        content: &CellContent,
        style: Option<&str>,
    ) -> Result<(), AppError> {
        let a1 = CellAddress::new(row_num as usize - 1, col).to_a1();
        let mut cell = format!(r#"<c r="{a1}""#);
        if let Some(s) = style.filter(|s| *s != "0") {
            cell.push_str(&format!(r#" s="{}""#, escape(s)));
        }

        match content {
            CellContent::Formula(formula) => {
                let formula = formula.strip_prefix('=').unwrap_or(formula);
                cell.push_str(&format!("><f>{}</f></c>", escape(formula)));
            }
            CellContent::Number(n) if n.is_finite() => {
                cell.push_str(&format!("><v>{n}</v></c>"));
            }
            CellContent::Number(n) => Self::push_inline_string(&mut cell, &n.to_string()),
            CellContent::Text(text) => Self::push_inline_string(&mut cell, text),
        }

        writer.get_mut().extend_from_slice(cell.as_bytes());
        Ok(())
    }

    fn push_inline_string(cell: &mut String, text: &str) {
        cell.push_str(r#" t="inlineStr"><is><t"#);
        if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
            cell.push_str(r#" xml:space="preserve""#);
        }
        cell.push('>');
        cell.push_str(&escape(text));
        cell.push_str("</t></is></c>");
    }

    fn row_number(row: &BytesStart<'_>) -> Result<Option<u32>, AppError> {
        Ok(Self::attr_value(row, b"r")?.and_then(|r| r.trim().parse().ok()))
    }

    // Cells without an r attribute (or pointing at another row) are passed through untouched.
    fn cell_column(cell: &BytesStart<'_>, row_num: u32) -> Result<Option<usize>, AppError> {
        let Some(reference) = Self::attr_value(cell, b"r")? else {
            return Ok(None);
        };
        match CellAddress::parse(&reference) {
            Ok(address) if address.row as u32 + 1 == row_num => Ok(Some(address.col)),
            _ => Ok(None),
        }
    }

    // spans is only a load hint and goes stale once cells are added to the row.
    fn row_without_spans(row: &BytesStart<'_>) -> Result<BytesStart<'static>, AppError> {
        let name = String::from_utf8_lossy(row.name().as_ref()).into_owned();
        let mut patched = BytesStart::new(name);
        for attr in row.attributes() {
            let attr = attr?;
            if Self::local_name(attr.key.as_ref()) == b"spans" {
                continue;
            }
            patched.push_attribute((attr.key.as_ref(), attr.value.as_ref()));
        }
        Ok(patched)
    }
}
