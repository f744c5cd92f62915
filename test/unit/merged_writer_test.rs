use pager_report::xlsx::cell_address::{CellAddress, CellRange};
use pager_report::xlsx::merged_writer::{MergedCellWriter, TemplateSheet};
use pager_report::xlsx::package::XlsxPackage;
use pager_report::xlsx::sheet_model::CellContent;

fn detail_sheet() -> TemplateSheet {
    let merges = vec![
        CellRange::parse("B2:K2").expect("range"),
        CellRange::parse("K28:K31").expect("range"),
    ];
    TemplateSheet::new("Detail".to_string(), "xl/worksheets/sheet2.xml".to_string(), merges)
}

#[test]
fn write_inside_merge_lands_on_anchor() {
    let mut sheet = detail_sheet();
    let anchor = MergedCellWriter::write(&mut sheet, "F2", CellContent::text("Title"))
        .expect("write");
    assert_eq!(anchor.to_a1(), "B2");
    assert_eq!(
        sheet.edits.get(&CellAddress::parse("B2").expect("B2")),
        Some(&CellContent::text("Title"))
    );
    assert_eq!(sheet.edits.len(), 1);
}

#[test]
fn write_outside_merges_is_direct() {
    let mut sheet = detail_sheet();
    let anchor = MergedCellWriter::write(&mut sheet, "C21", CellContent::Number(3.0))
        .expect("write");
    assert_eq!(anchor, CellAddress::parse("C21").expect("C21"));
}

#[test]
fn repeated_writes_are_idempotent_and_last_wins() {
    let mut sheet = detail_sheet();
    for cell in ["K28", "K29", "K30", "K31"] {
        MergedCellWriter::write(&mut sheet, cell, CellContent::formula("=L32/G32*10"))
            .expect("write");
    }
    let once = sheet.edits.clone();
    MergedCellWriter::write(&mut sheet, "K31", CellContent::formula("=L32/G32*10"))
        .expect("write");
    assert_eq!(sheet.edits, once);
    assert_eq!(sheet.edits.len(), 1);

    MergedCellWriter::write(&mut sheet, "K29", CellContent::Number(0.0)).expect("write");
    assert_eq!(
        sheet.edits.get(&CellAddress::parse("K28").expect("K28")),
        Some(&CellContent::Number(0.0))
    );
    assert!(!sheet.has_formulas());
}

#[test]
fn merge_regions_are_read_from_sheet_xml() {
    let xml = br#"<worksheet><sheetData/><mergeCells count="2"><mergeCell ref="B2:K2"/><mergeCell ref="D41:E41"/></mergeCells></worksheet>"#;
    let regions = XlsxPackage::merge_regions(xml).expect("regions");
    assert_eq!(regions.len(), 2);
    let target = CellAddress::parse("E41").expect("E41");
    assert_eq!(
        XlsxPackage::resolve_merged_anchor(&regions, target).to_a1(),
        "D41"
    );
}

#[test]
fn single_cell_merges_are_ignored() {
    let xml = br#"<worksheet><mergeCells count="2"><mergeCell ref="C3:C3"/><mergeCell ref="K28:K31"/></mergeCells></worksheet>"#;
    let regions = XlsxPackage::merge_regions(xml).expect("regions");
    assert_eq!(regions, vec![CellRange::parse("K28:K31").expect("range")]);
}

#[test]
fn invalid_reference_is_an_error() {
    let mut sheet = detail_sheet();
    assert!(MergedCellWriter::write(&mut sheet, "not-a-cell", CellContent::text("x")).is_err());
}
