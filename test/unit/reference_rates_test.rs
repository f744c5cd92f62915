use crate::support::{number, sheet, text};
use pager_report::common::errors::AppError;
use pager_report::report::reference_rates::{
    RateValue, ReferenceRates, CPRP_SHEET, ER_SHEET, NOT_FOUND,
};
use pager_report::xlsx::sheet_model::{CellContent, SourceSheet};

fn er_sheet() -> SourceSheet {
    sheet(
        ER_SHEET,
        &[
            ("A1", text("Channels")),
            ("B1", text("Net Rate")),
            ("A2", text("  Star Plus HD ")),
            ("B2", number(1250.0)),
            ("A3", text("Colors")),
            ("B3", number(900.0)),
        ],
    )
}

fn cprp_sheet() -> SourceSheet {
    sheet(
        CPRP_SHEET,
        &[
            ("A1", text("Channels")),
            ("B1", text("Market CPRP")),
            ("C1", text("All India CPRP")),
            ("A2", text("STAR PLUS")),
            ("B2", number(5100.0)),
            ("A3", text("Colors")),
            ("B3", number(4300.0)),
            ("C3", number(61000.0)),
            ("C4", number(62000.0)),
        ],
    )
}

#[test]
fn lookup_ignores_case_and_surrounding_whitespace() {
    let rates = ReferenceRates::from_sheets(&er_sheet(), &cprp_sheet()).expect("rates");
    assert_eq!(
        rates.net_rate("star plus hd").expect("lookup"),
        RateValue::Found(number(1250.0))
    );
    assert_eq!(
        rates.market_cprp("  Star Plus").expect("lookup"),
        RateValue::Found(number(5100.0))
    );
}

#[test]
fn miss_yields_sentinel_text() {
    let rates = ReferenceRates::from_sheets(&er_sheet(), &cprp_sheet()).expect("rates");
    let value = rates.net_rate("Zee TV").expect("lookup");
    assert_eq!(value, RateValue::NotFound);
    assert_eq!(value.to_content(), CellContent::text(NOT_FOUND));
    assert_eq!(NOT_FOUND, "(ER not found)");
}

#[test]
fn blank_channel_never_matches_a_blank_reference_row() {
    let er = sheet(
        ER_SHEET,
        &[
            ("A1", text("Channels")),
            ("B1", text("Net Rate")),
            ("A2", text("   ")),
            ("B2", number(700.0)),
        ],
    );
    let rates = ReferenceRates::from_sheets(&er, &cprp_sheet()).expect("rates");
    assert_eq!(rates.net_rate("").expect("lookup"), RateValue::NotFound);
    assert_eq!(rates.net_rate("  ").expect("lookup"), RateValue::NotFound);
}

#[test]
fn all_india_cprp_is_first_non_blank_value() {
    let rates = ReferenceRates::from_sheets(&er_sheet(), &cprp_sheet()).expect("rates");
    assert_eq!(
        rates.all_india_cprp().expect("value"),
        RateValue::Found(number(61000.0))
    );
}

#[test]
fn all_india_cprp_without_values_is_not_found() {
    let cprp = sheet(
        CPRP_SHEET,
        &[
            ("A1", text("Channels")),
            ("B1", text("Market CPRP")),
            ("C1", text("All India CPRP")),
            ("A2", text("Colors")),
        ],
    );
    let rates = ReferenceRates::from_sheets(&er_sheet(), &cprp).expect("rates");
    assert_eq!(rates.all_india_cprp().expect("value"), RateValue::NotFound);
}

#[test]
fn missing_column_names_column_and_sheet() {
    let er = sheet(
        ER_SHEET,
        &[("A1", text("Channels")), ("B1", text("Rate"))],
    );
    let err = ReferenceRates::from_sheets(&er, &cprp_sheet()).expect_err("missing column");
    assert!(matches!(err, AppError::MissingColumn { .. }));
    assert_eq!(
        err.to_string(),
        "missing required column 'Net Rate' in sheet 'ER Channels'"
    );
    assert_eq!(err.status(), 500);
}

#[test]
fn cprp_columns_are_validated_at_load() {
    let cprp = sheet(
        CPRP_SHEET,
        &[("A1", text("Channels")), ("B1", text("Market CPRP"))],
    );
    let err = ReferenceRates::from_sheets(&er_sheet(), &cprp).expect_err("missing column");
    assert!(err.to_string().contains("'All India CPRP'"), "{err}");
}
