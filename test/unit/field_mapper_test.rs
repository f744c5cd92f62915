use crate::support::{campaign_inputs, campaign_inputs_with, number, sheet, text};
use pager_report::report::cell_write::{CellWrite, OutputSheet};
use pager_report::report::field_mapper::{sheet_reference, FieldMapper, DATA_UNAVAILABLE};
use pager_report::report::fields::{FieldSet, InputSheets};
use pager_report::report::ratings::{RatingResult, RatingValues};
use pager_report::report::reference_rates::{ReferenceRates, CPRP_SHEET, ER_SHEET, NOT_FOUND};
use pager_report::xlsx::sheet_model::CellContent;

const DETAIL: &str = "DBD One Pager-with Eval.";

fn rates() -> ReferenceRates {
    let er = sheet(
        ER_SHEET,
        &[
            ("A1", text("Channels")),
            ("B1", text("Net Rate")),
            ("A2", text("star plus hd")),
            ("B2", number(1250.0)),
        ],
    );
    let cprp = sheet(
        CPRP_SHEET,
        &[
            ("A1", text("Channels")),
            ("B1", text("Market CPRP")),
            ("C1", text("All India CPRP")),
            ("A2", text("Colors")),
            ("B2", number(4300.0)),
            ("C2", number(61000.0)),
        ],
    );
    ReferenceRates::from_sheets(&er, &cprp).expect("rates")
}

fn map(inputs: &InputSheets, ratings: RatingResult) -> Vec<CellWrite> {
    let fields = FieldSet::extract(inputs);
    FieldMapper::map(&fields, &rates(), ratings, 2025, DETAIL).expect("map")
}

// Final content of a cell after applying writes in order.
fn final_value(writes: &[CellWrite], sheet: OutputSheet, cell: &str) -> Option<CellContent> {
    writes
        .iter()
        .rev()
        .find(|w| w.sheet == sheet && w.cell == cell)
        .map(|w| w.content.clone())
}

fn detail(writes: &[CellWrite], cell: &str) -> CellContent {
    final_value(writes, OutputSheet::Detail, cell).unwrap_or_else(|| panic!("Detail {cell} not written"))
}

fn summary(writes: &[CellWrite], cell: &str) -> CellContent {
    final_value(writes, OutputSheet::Summary, cell).unwrap_or_else(|| panic!("Summary {cell} not written"))
}

#[test]
fn titles_and_campaign_labels() {
    let writes = map(&campaign_inputs(), RatingResult::Empty);
    assert_eq!(
        detail(&writes, "B2"),
        CellContent::text("Mega Show - 2025 Driven By: Star Network")
    );
    assert_eq!(
        summary(&writes, "B2"),
        CellContent::text("Mega Show - 2025 Driven By Star Network")
    );
    assert_eq!(detail(&writes, "C10"), CellContent::text("Jan'25 - Feb'25"));
    assert_eq!(summary(&writes, "D4"), CellContent::text("Jan'25 - Feb'25"));
    assert_eq!(detail(&writes, "H21"), CellContent::text("Jan'25 - Mar'25"));
    assert_eq!(detail(&writes, "H22"), CellContent::text("Jan'25 - Mar'25"));
    assert_eq!(detail(&writes, "F10"), CellContent::text("20:00 - 21:00"));
    assert_eq!(summary(&writes, "D19"), CellContent::text("20:00 - 21:00 (Timing)"));
    assert_eq!(summary(&writes, "D20"), CellContent::text("TV Telecast - On"));
    assert_eq!(summary(&writes, "D21"), CellContent::text("Digital Telecast - On"));
}

#[test]
fn reference_rates_and_sentinel() {
    let writes = map(&campaign_inputs(), RatingResult::Empty);
    assert_eq!(detail(&writes, "M31"), CellContent::Number(1250.0));
    assert_eq!(detail(&writes, "M28"), CellContent::text(NOT_FOUND));
    for cell in ["N28", "N29", "N30", "N31"] {
        assert_eq!(detail(&writes, cell), CellContent::Number(61000.0), "{cell}");
    }
}

#[test]
fn adjusted_counts_and_mirrored_channels() {
    let writes = map(&campaign_inputs(), RatingResult::Empty);
    for cell in ["E28", "E29"] {
        assert_eq!(detail(&writes, cell), CellContent::Number(8.0));
    }
    for cell in ["E30", "E31"] {
        assert_eq!(detail(&writes, cell), CellContent::Number(4.0));
    }
    assert_eq!(summary(&writes, "D26"), CellContent::Number(8.0));
    assert_eq!(summary(&writes, "D29"), CellContent::Number(4.0));
    assert_eq!(detail(&writes, "C30"), CellContent::text("Star Plus"));
    assert_eq!(detail(&writes, "C31"), CellContent::text("Star Plus HD"));
    assert_eq!(summary(&writes, "C28"), CellContent::text("Star Plus"));
    assert_eq!(summary(&writes, "G29"), CellContent::text("Television"));
    assert_eq!(summary(&writes, "D6"), CellContent::text("Sponsor"));
}

#[test]
fn defaulted_counts_use_field_defaults() {
    let inputs = campaign_inputs_with(&[("B12", text("")), ("B13", text(""))], &[], &[]);
    let writes = map(&inputs, RatingResult::Empty);
    assert_eq!(detail(&writes, "E28"), CellContent::Number(0.0));
    assert_eq!(detail(&writes, "E30"), CellContent::Number(1.0));
}

#[test]
fn static_formulas_are_written_verbatim() {
    let writes = map(&campaign_inputs(), RatingResult::Empty);
    let expected = [
        ("G28", "=F28*E28"),
        ("G32", "=SUM(G28:G31)"),
        ("J30", "=I30*G30/10"),
        ("K31", "=L32/G32*10"),
        ("L29", "=1.5*10000000"),
        ("L32", "=SUM(L28:L31)"),
        ("O31", "=J31*N31"),
        ("G38", "=(I39*1000000)*0.6"),
        ("H37", "=(I38*1000000)*0.4"),
        ("L37", "=(K37*I37/1000)*10^6"),
        ("L39", "=SUM(L37:L38)"),
    ];
    for (cell, formula) in expected {
        assert_eq!(detail(&writes, cell), CellContent::formula(formula), "{cell}");
    }
    assert_eq!(detail(&writes, "O38"), CellContent::text(DATA_UNAVAILABLE));
    assert_eq!(detail(&writes, "O39"), CellContent::text(DATA_UNAVAILABLE));
}

#[test]
fn cross_sheet_formulas_use_detail_sheet_name() {
    let writes = map(&campaign_inputs(), RatingResult::Empty);
    assert_eq!(
        summary(&writes, "D41"),
        CellContent::formula("='DBD One Pager-with Eval.'!D45")
    );
    assert_eq!(
        summary(&writes, "F41"),
        CellContent::formula("='DBD One Pager-with Eval.'!E45")
    );
    assert_eq!(sheet_reference("Bob's Plan"), "'Bob''s Plan'");
}

#[test]
fn empty_ratings_write_zeros() {
    let writes = map(&campaign_inputs(), RatingResult::Empty);
    for cell in ["I28", "I29", "I30", "I31", "H28", "H29", "H30", "H31"] {
        assert_eq!(detail(&writes, cell), CellContent::Number(0.0), "{cell}");
    }
}

#[test]
fn ratings_are_mirrored_and_written_last() {
    let ratings = RatingResult::Values(RatingValues {
        region_regular: 1.25,
        region_hd: 0.25,
        india_regular: 2.5,
        india_hd: 0.5,
    });
    let writes = map(&campaign_inputs(), ratings);
    assert_eq!(detail(&writes, "I28"), CellContent::Number(1.25));
    assert_eq!(detail(&writes, "I30"), CellContent::Number(1.25));
    assert_eq!(detail(&writes, "I29"), CellContent::Number(0.25));
    assert_eq!(detail(&writes, "I31"), CellContent::Number(0.25));
    assert_eq!(detail(&writes, "H28"), CellContent::Number(2.5));
    assert_eq!(detail(&writes, "H30"), CellContent::Number(2.5));
    assert_eq!(detail(&writes, "H29"), CellContent::Number(0.5));
    assert_eq!(detail(&writes, "H31"), CellContent::Number(0.5));

    let last = writes.last().expect("writes");
    assert_eq!((last.sheet, last.cell), (OutputSheet::Detail, "H31"));
}

#[test]
fn malformed_start_date_stops_mapping() {
    let inputs = campaign_inputs_with(&[("B8", text("someday"))], &[], &[]);
    let fields = FieldSet::extract(&inputs);
    assert!(FieldMapper::map(&fields, &rates(), RatingResult::Empty, 2025, DETAIL).is_err());
}
