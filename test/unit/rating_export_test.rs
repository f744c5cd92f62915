use calamine::{open_workbook_auto, Data, Reader};
use pager_report::report::rating_export::RatingExport;
use pager_report::report::ratings::{FetchedRatings, RegionRatings};
use tempfile::tempdir;

#[test]
fn file_name_replaces_spaces_and_commas() {
    assert_eq!(
        RatingExport::file_name("Mega Show, Live", "20250101_120000"),
        "Mega_Show__Live_TVR_Data_20250101_120000.xlsx"
    );
}

#[test]
fn export_lists_region_then_india() {
    let dir = tempdir().expect("tempdir");
    let fetched = FetchedRatings {
        region: "Maharashtra".to_string(),
        channel_regular: "Star Plus".to_string(),
        channel_hd: String::new(),
        local: Some(RegionRatings { regular: 1.5, hd: 0.0 }),
        india: Some(RegionRatings { regular: 2.5, hd: 0.0 }),
    };

    let path = RatingExport::write(&dir.path().join("exports"), "Mega Show", &fetched).expect("export");

    let mut workbook = open_workbook_auto(&path).expect("open export");
    let sheet = workbook.worksheet_range_at(0).expect("sheet").expect("range");
    let rows: Vec<Vec<Data>> = sheet.rows().map(|r| r.to_vec()).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][0], Data::String("Region".to_string()));
    assert_eq!(rows[1][0], Data::String("Maharashtra".to_string()));
    assert_eq!(rows[1][2], Data::Float(1.5));
    assert_eq!(rows[2][0], Data::String("India".to_string()));
    assert_eq!(rows[2][2], Data::Float(2.5));
}
