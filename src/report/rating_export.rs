use crate::common::errors::AppError;
use crate::report::ratings::{FetchedRatings, RegionRatings, INDIA};
use chrono::Local;
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};
use tracing::info;

pub const HEADERS: [&str; 3] = ["Region", "Channel", "TVR_Value"];

// Audit copy of every rating fetch, one workbook per run.
pub struct RatingExport;

impl RatingExport {
    pub fn file_name(program: &str, stamp: &str) -> String {
        let safe_program = program.replace([' ', ','], "_");
        format!("{safe_program}_TVR_Data_{stamp}.xlsx")
    }

    pub fn write(dir: &Path, program: &str, fetched: &FetchedRatings) -> Result<PathBuf, AppError> {
        std::fs::create_dir_all(dir)?;
        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let path = dir.join(Self::file_name(program, &stamp));

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let bold = Format::new().set_bold();
        for (col, header) in HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &bold)?;
        }

        let mut row = 1u32;
        for (region, ratings) in [
            (fetched.region.as_str(), fetched.local),
            (INDIA, fetched.india),
        ] {
            let ratings = ratings.unwrap_or(RegionRatings { regular: 0.0, hd: 0.0 });
            for (channel, tvr) in [
                (fetched.channel_regular.as_str(), ratings.regular),
                (fetched.channel_hd.as_str(), ratings.hd),
            ] {
                if channel.is_empty() {
                    continue;
                }
                worksheet.write_string(row, 0, region)?;
                worksheet.write_string(row, 1, channel)?;
                worksheet.write_number(row, 2, tvr)?;
                row += 1;
            }
        }

        workbook.save(&path)?;
        info!(path = %path.display(), rows = row - 1, "exported rating data");
        Ok(path)
    }
}
