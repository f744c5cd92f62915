use calamine::{open_workbook_auto, Data, Range, Reader};
use pager_report::xlsx::cell_address::CellAddress;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const SUMMARY: &str = "Summary";
pub const DETAIL: &str = "DBD One Pager-with Eval.";

#[derive(Debug, Clone)]
pub enum Value {
    Text(&'static str),
    Number(f64),
}

pub struct Fixtures {
    pub dir: TempDir,
    pub input_a: PathBuf,
    pub input_b: PathBuf,
    pub template: PathBuf,
    pub reference: PathBuf,
}

impl Fixtures {
    pub fn new() -> Self {
        Self::with_reference(&[("A1", Value::Text("Channels")), ("B1", Value::Text("Net Rate"))])
    }

    // ER Channels header row supplied by the caller; data rows are fixed.
    pub fn with_reference(er_header: &[(&str, Value)]) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let input_a = dir.path().join("Non Cricket Input.xlsx");
        let input_b = dir.path().join("TVR Output.xlsx");
        let template = dir.path().join("Skeleton Output.xlsx");
        let reference = dir.path().join("ER and CPRP Channels TV and Digital CTV-Mobile CPM.xlsx");

        write_input_a(&input_a, &[]);
        write_input_b(&input_b);
        write_template(&template);
        write_reference(&reference, er_header);

        Self {
            dir,
            input_a,
            input_b,
            template,
            reference,
        }
    }
}

fn put(sheet: &mut Worksheet, a1: &str, value: &Value) {
    let address = CellAddress::parse(a1).expect("fixture address");
    let (row, col) = (address.row as u32, address.col as u16);
    match value {
        Value::Text(text) => sheet.write_string(row, col, *text).expect("write string"),
        Value::Number(n) => sheet.write_number(row, col, *n).expect("write number"),
    };
}

fn fill(sheet: &mut Worksheet, cells: &[(&str, Value)]) {
    for (a1, value) in cells {
        put(sheet, a1, value);
    }
}

pub fn write_input_a(path: &Path, property_overrides: &[(&str, Value)]) {
    let mut workbook = Workbook::new();

    let property = workbook.add_worksheet();
    property.set_name("Property Details").expect("name");
    let mut property_cells = vec![
        ("A1", Value::Text("Property Name")),
        ("B1", Value::Text("Mega Show")),
        ("B3", Value::Text("Acme Brand")),
        ("B4", Value::Text("FMCG")),
        ("B7", Value::Text("Prime Time")),
        ("B8", Value::Text("25 January 2025")),
        ("B9", Value::Text("20:00")),
        ("B10", Value::Text("21:00")),
        ("B11", Value::Text("Hindi")),
        ("B12", Value::Number(10.0)),
        ("B13", Value::Number(4.0)),
        ("B14", Value::Number(2.0)),
        ("A29", Value::Text("Sponsor")),
        ("B29", Value::Text("Star Network")),
        ("B32", Value::Number(1.5)),
        ("B36", Value::Text("NCCS All 15+")),
        ("B37", Value::Text("Maharashtra")),
        ("B45", Value::Text("202501 - 202504")),
    ];
    for (a1, value) in property_overrides {
        property_cells.retain(|(existing, _)| existing != a1);
        property_cells.push((*a1, value.clone()));
    }
    fill(property, &property_cells);

    let channel = workbook.add_worksheet();
    channel.set_name("Channel & Platform Details").expect("name");
    fill(
        channel,
        &[
            ("B5", Value::Text("Television")),
            ("C5", Value::Text("Star Plus")),
            ("C6", Value::Text("Star Plus HD")),
            ("C9", Value::Text("Hotstar")),
            ("E9", Value::Number(120.0)),
            ("E10", Value::Number(80.0)),
            ("G5", Value::Number(11.0)),
            ("J9", Value::Number(2.5)),
            ("K9", Value::Number(3.5)),
            ("L9", Value::Number(150.0)),
            ("O5", Value::Number(30.0)),
        ],
    );

    let performance = workbook.add_worksheet();
    performance.set_name("Program Performance").expect("name");
    fill(
        performance,
        &[
            ("F12", Value::Text("2025-01-01 00:00:00")),
            ("G12", Value::Text("2025-03-31 00:00:00")),
            ("L11", Value::Number(1.25)),
            ("L12", Value::Number(0.75)),
        ],
    );

    workbook.save(path).expect("save input A");
}

pub fn write_input_b(path: &Path) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    fill(
        sheet,
        &[
            ("A1", Value::Text("Channel")),
            ("B1", Value::Text("TVR")),
            ("A2", Value::Text("Star Plus")),
            ("B2", Value::Number(1.1)),
        ],
    );
    workbook.save(path).expect("save input B");
}

// Two-sheet report skeleton with grouped (merged) cells and a styled label.
pub fn write_template(path: &Path) {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let summary = workbook.add_worksheet();
    summary.set_name(SUMMARY).expect("name");
    summary.merge_range(1, 1, 1, 10, "", &bold).expect("merge B2:K2");
    summary.merge_range(40, 3, 40, 4, "", &bold).expect("merge D41:E41");
    summary.write_string(3, 0, "Campaign Period").expect("label");

    let detail = workbook.add_worksheet();
    detail.set_name(DETAIL).expect("name");
    detail.merge_range(1, 1, 1, 10, "", &bold).expect("merge B2:K2");
    detail.merge_range(27, 10, 30, 10, "", &bold).expect("merge K28:K31");
    detail.merge_range(27, 11, 30, 11, "", &bold).expect("merge L28:L31");
    detail.write_string_with_format(9, 2, "TBD", &bold).expect("styled C10");
    detail.write_string(26, 2, "Channel").expect("header");
    detail.write_formula(44, 3, "=L32/10^7").expect("D45");

    workbook.save(path).expect("save template");
}

pub fn write_reference(path: &Path, er_header: &[(&str, Value)]) {
    let mut workbook = Workbook::new();

    let er = workbook.add_worksheet();
    er.set_name("ER Channels").expect("name");
    fill(er, er_header);
    fill(
        er,
        &[
            ("A2", Value::Text("STAR PLUS HD ")),
            ("B2", Value::Number(1250.0)),
        ],
    );

    let cprp = workbook.add_worksheet();
    cprp.set_name("CPRP Channels").expect("name");
    fill(
        cprp,
        &[
            ("A1", Value::Text("Channels")),
            ("B1", Value::Text("Market CPRP")),
            ("C1", Value::Text("All India CPRP")),
            ("A2", Value::Text("star plus")),
            ("B2", Value::Number(5100.0)),
            ("C2", Value::Number(61000.0)),
        ],
    );

    workbook.save(path).expect("save reference");
}

pub fn values(path: &Path, sheet: &str) -> Range<Data> {
    let mut workbook = open_workbook_auto(path).expect("open output");
    workbook.worksheet_range(sheet).expect("sheet values")
}

pub fn formulas(path: &Path, sheet: &str) -> Range<String> {
    let mut workbook = open_workbook_auto(path).expect("open output");
    workbook.worksheet_formula(sheet).expect("sheet formulas")
}

pub fn cell<'a, T>(range: &'a Range<T>, a1: &str) -> Option<&'a T>
where
    T: calamine::CellType,
{
    let address = CellAddress::parse(a1).expect("address");
    range.get_value((address.row as u32, address.col as u32))
}

pub fn text_at(range: &Range<Data>, a1: &str) -> String {
    match cell(range, a1) {
        Some(Data::String(s)) => s.clone(),
        other => panic!("{a1}: expected text, got {other:?}"),
    }
}

pub fn number_at(range: &Range<Data>, a1: &str) -> f64 {
    match cell(range, a1) {
        Some(Data::Float(n)) => *n,
        Some(Data::Int(n)) => *n as f64,
        other => panic!("{a1}: expected number, got {other:?}"),
    }
}

pub fn zip_part(path: &Path, name: &str) -> Option<String> {
    let file = std::fs::File::open(path).expect("open zip");
    let mut archive = zip::ZipArchive::new(file).expect("zip");
    let mut entry = archive.by_name(name).ok()?;
    let mut text = String::new();
    entry.read_to_string(&mut text).expect("read part");
    Some(text)
}
