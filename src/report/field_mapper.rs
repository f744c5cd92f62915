use crate::common::errors::AppError;
use crate::report::cell_write::{CellWrite, OutputSheet};
use crate::report::fields::FieldSet;
use crate::report::ratings::RatingResult;
use crate::report::reference_rates::ReferenceRates;
use crate::xlsx::sheet_model::CellContent;
use tracing::{info, warn};

use crate::report::cell_write::OutputSheet::{Detail, Summary};

pub const DATA_UNAVAILABLE: &str = "(data unavailable)";

// Ordered list of writes; a later write to the same cell wins.
#[derive(Debug, Default)]
struct WriteList {
    writes: Vec<CellWrite>,
}

impl WriteList {
    fn put(&mut self, sheet: OutputSheet, cell: &'static str, content: CellContent) {
        self.writes.push(CellWrite::new(sheet, cell, content));
    }

    fn text(&mut self, sheet: OutputSheet, cell: &'static str, text: impl Into<String>) {
        self.put(sheet, cell, CellContent::text(text));
    }

    fn formula(&mut self, sheet: OutputSheet, cell: &'static str, formula: impl Into<String>) {
        self.put(sheet, cell, CellContent::formula(formula));
    }

    fn number(&mut self, sheet: OutputSheet, cell: &'static str, n: f64) {
        self.put(sheet, cell, CellContent::Number(n));
    }

    fn field(&mut self, sheet: OutputSheet, cells: &[&'static str], fields: &FieldSet, name: &str) {
        let content = fields.content(name);
        for &cell in cells {
            self.put(sheet, cell, content.clone());
        }
    }
}

pub struct FieldMapper;

impl FieldMapper {
    // Builds every template write for one report. Pure apart from logging.
    pub fn map(
        fields: &FieldSet,
        rates: &ReferenceRates,
        ratings: RatingResult,
        year: i32,
        detail_sheet: &str,
    ) -> Result<Vec<CellWrite>, AppError> {
        let period = fields.campaign_period()?;
        let campaign_label = period.label();
        let performance_label = fields.performance_label()?;

        let program = fields.text("pd_b1");
        let driven_by = fields.text("pd_b29");
        let timing = format!("{} - {}", fields.text("pd_b9"), fields.text("pd_b10"));
        let b12_adjusted = fields.number("pd_b12") - 2.0;
        let b13 = fields.number("pd_b13");

        let mut w = WriteList::default();

        // Detail: header and campaign block.
        w.text(Detail, "B2", format!("{program} - {year} Driven By: {driven_by}"));
        w.field(Detail, &["C5"], fields, "pd_b3");

        let net_rate = rates.net_rate(&fields.trimmed("cp_c6"))?;
        w.put(Detail, "M31", net_rate.to_content());
        let market_cprp = rates.market_cprp(&fields.trimmed("cp_c5"))?;
        w.put(Detail, "M28", market_cprp.to_content());
        let all_india = rates.all_india_cprp()?.to_content();
        for cell in ["N28", "N29", "N30", "N31"] {
            w.put(Detail, cell, all_india.clone());
        }

        w.text(Detail, "H21", performance_label.clone());
        w.text(Detail, "H22", performance_label);

        w.field(Detail, &["D15"], fields, "cp_c9");
        w.text(Detail, "C10", campaign_label.clone());
        w.field(Detail, &["D10"], fields, "pd_b11");
        w.field(Detail, &["E10"], fields, "pd_b7");
        w.text(Detail, "F10", timing.clone());

        w.field(Detail, &["C21"], fields, "cp_c5");
        w.field(Detail, &["C22"], fields, "cp_c6");
        w.field(Detail, &["D21", "D22"], fields, "pd_b1");
        w.field(Detail, &["E21", "E22"], fields, "cp_c9");
        w.field(Detail, &["G21"], fields, "pp_l11");
        w.field(Detail, &["G22"], fields, "pp_l12");

        // Detail: TV plan rows 28-32. Rows 30/31 repeat the channels of rows 28/29.
        w.field(Detail, &["C28", "C30"], fields, "cp_c5");
        w.field(Detail, &["C29", "C31"], fields, "cp_c6");
        w.field(Detail, &["D28", "D29", "D30", "D31"], fields, "pd_b1");
        w.number(Detail, "E28", b12_adjusted);
        w.number(Detail, "E29", b12_adjusted);
        w.number(Detail, "E30", b13);
        w.number(Detail, "E31", b13);
        w.field(Detail, &["F28"], fields, "cp_o5");
        w.field(Detail, &["F29"], fields, "cp_o6");
        w.field(Detail, &["F30"], fields, "cp_o7");
        w.field(Detail, &["F31"], fields, "cp_o8");

        w.formula(Detail, "G28", "=F28*E28");
        w.formula(Detail, "G29", "=F29*E29");
        w.formula(Detail, "G30", "=F30*E30");
        w.formula(Detail, "G31", "=F31*E31");
        w.formula(Detail, "G32", "=SUM(G28:G31)");

        w.formula(Detail, "J28", "=I28*G28/10");
        w.formula(Detail, "J29", "=I29*G29/10");
        w.formula(Detail, "J30", "=I30*G30/10");
        w.formula(Detail, "J31", "=I31*G31/10");
        w.formula(Detail, "J32", "=SUM(J28:J31)");

        for cell in ["K28", "K29", "K30", "K31"] {
            w.formula(Detail, cell, "=L32/G32*10");
        }

        let investment = format!("={}*10000000", fields.text("pd_b32"));
        for cell in ["L28", "L29", "L30", "L31"] {
            w.formula(Detail, cell, investment.clone());
        }
        w.formula(Detail, "L32", "=SUM(L28:L31)");

        w.formula(Detail, "O28", "=J28*N28");
        w.formula(Detail, "O29", "=J29*N29");
        w.formula(Detail, "O30", "=J30*N30");
        w.formula(Detail, "O31", "=J31*N31");
        w.formula(Detail, "O32", "=SUM(O28:O31)");

        // Detail: digital rows 37-39.
        w.field(Detail, &["C37", "C38"], fields, "cp_c9");
        w.field(Detail, &["D37", "D38"], fields, "pd_b1");
        w.field(Detail, &["E37", "E38"], fields, "cp_c9");
        w.field(Detail, &["F37"], fields, "cp_e9");
        w.field(Detail, &["F38"], fields, "cp_e10");

        w.formula(Detail, "G37", "=(I38*1000000)*0.6");
        w.formula(Detail, "G38", "=(I39*1000000)*0.6");
        w.formula(Detail, "G39", "=SUM(G37:G38)");
        w.formula(Detail, "H37", "=(I38*1000000)*0.4");
        w.formula(Detail, "H38", "=(I39*1000000)*0.4");

        w.field(Detail, &["I37"], fields, "cp_k9");
        w.field(Detail, &["I38"], fields, "cp_k10");
        w.field(Detail, &["J37"], fields, "cp_j9");
        w.field(Detail, &["J38"], fields, "cp_j10");
        w.field(Detail, &["K37"], fields, "cp_l9");
        w.field(Detail, &["K38"], fields, "cp_l10");

        w.formula(Detail, "L37", "=(K37*I37/1000)*10^6");
        w.formula(Detail, "L38", "=(K38*I38/1000)*10^6");
        w.formula(Detail, "L39", "=SUM(L37:L38)");

        w.text(Detail, "O38", DATA_UNAVAILABLE);
        w.text(Detail, "O39", DATA_UNAVAILABLE);

        // Summary.
        w.text(Summary, "B2", format!("{program} - {year} Driven By {driven_by}"));
        w.text(Summary, "D4", campaign_label);
        w.field(Summary, &["D5"], fields, "pd_b1");
        w.field(Summary, &["D6"], fields, "pd_a29");
        w.field(Summary, &["D7"], fields, "pd_b4");
        w.field(Summary, &["D10"], fields, "pd_b20");
        w.field(Summary, &["D11"], fields, "pd_b23");
        w.field(Summary, &["H10"], fields, "pd_b21");
        w.field(Summary, &["H11"], fields, "pd_b22");
        w.field(Summary, &["D14"], fields, "pd_b26");
        w.field(Summary, &["D15"], fields, "pd_b29");
        w.field(Summary, &["H14"], fields, "pd_b27");
        w.field(Summary, &["H15"], fields, "pd_b28");
        w.text(Summary, "D19", format!("{timing} (Timing)"));
        w.text(Summary, "D20", "TV Telecast - On");
        w.text(Summary, "D21", "Digital Telecast - On");

        w.field(Summary, &["C26", "C28"], fields, "cp_c5");
        w.field(Summary, &["C27", "C29"], fields, "cp_c6");
        w.number(Summary, "D26", b12_adjusted);
        w.number(Summary, "D27", b12_adjusted);
        w.number(Summary, "D28", b13);
        w.number(Summary, "D29", b13);
        w.field(Summary, &["E26", "E27", "E28", "E29"], fields, "pd_b1");
        w.field(Summary, &["F26"], fields, "cp_g5");
        w.field(Summary, &["F27"], fields, "cp_g6");
        w.field(Summary, &["F28"], fields, "cp_g7");
        w.field(Summary, &["F29"], fields, "cp_g8");

        w.field(Summary, &["C34", "C35"], fields, "cp_c9");
        w.field(Summary, &["D34"], fields, "cp_e9");
        w.field(Summary, &["D35"], fields, "cp_e10");
        w.field(Summary, &["E34", "E35"], fields, "pd_b1");
        w.field(Summary, &["F34"], fields, "cp_j9");
        w.field(Summary, &["F35"], fields, "cp_j10");
        w.field(Summary, &["G34"], fields, "cp_k9");
        w.field(Summary, &["G26", "G27", "G28", "G29"], fields, "cp_b5");
        w.field(Summary, &["G35"], fields, "cp_k10");

        let detail_ref = sheet_reference(detail_sheet);
        w.formula(Summary, "D41", format!("={detail_ref}!D45"));
        w.formula(Summary, "F41", format!("={detail_ref}!E45"));

        // Ratings go last so they win over anything above.
        if ratings.is_empty() {
            warn!("no ratings returned, writing 0 to rating cells");
        }
        let values = ratings.values_or_zero();
        w.number(Detail, "I28", values.region_regular);
        w.number(Detail, "I29", values.region_hd);
        w.number(Detail, "I30", values.region_regular);
        w.number(Detail, "I31", values.region_hd);
        w.number(Detail, "H28", values.india_regular);
        w.number(Detail, "H29", values.india_hd);
        w.number(Detail, "H30", values.india_regular);
        w.number(Detail, "H31", values.india_hd);

        info!(writes = w.writes.len(), label = %period.label(), "mapped report fields");
        Ok(w.writes)
    }
}

// Quoted sheet name for cross-sheet formulas; embedded quotes are doubled.
pub fn sheet_reference(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}
