use crate::error::Result;
use crate::models::candidate::Candidate;
use crate::pipeline::{compare_by_progress, recruitment_flow, stage_order, CandidateStatus};
use rust_xlsxwriter::*;
use std::collections::HashMap;

pub struct ExportService;

impl ExportService {
    fn status_color(status: CandidateStatus) -> Color {
        match status {
            CandidateStatus::Applied | CandidateStatus::ResumeScraped => Color::RGB(0x3B82F6),
            CandidateStatus::Screened | CandidateStatus::Survey | CandidateStatus::CodingTest => {
                Color::RGB(0xF59E0B)
            }
            CandidateStatus::InterviewTeamLead | CandidateStatus::InterviewGeneralManager => {
                Color::RGB(0x8B5CF6)
            }
            CandidateStatus::Offer | CandidateStatus::Hired => Color::RGB(0x10B981),
            CandidateStatus::Rejected => Color::RGB(0xEF4444),
        }
    }

    /// Two-sheet workbook: candidates ordered by pipeline progress and a
    /// funnel with the number of candidates currently in each stage.
    pub fn generate_pipeline_xlsx(candidates: &[Candidate]) -> Result<Vec<u8>> {
        let mut sorted: Vec<&Candidate> = candidates.iter().collect();
        sorted.sort_by(|a, b| compare_by_progress(b.processed_status, a.processed_status));

        let header_bg = Color::RGB(0x0F172A);
        let border_color = Color::RGB(0xE2E8F0);
        let alt_row = Color::RGB(0xF8FAFC);

        let header_format = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(Color::White)
            .set_background_color(header_bg)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);

        let mut workbook = Workbook::new();

        {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name("Candidates")?;

            let columns = [
                ("#", 6.0),
                ("Name", 30.0),
                ("Email", 30.0),
                ("WhatsApp", 18.0),
                ("Location", 20.0),
                ("Experience (months)", 18.0),
                ("Senior", 10.0),
                ("Stage", 26.0),
                ("Stage order", 12.0),
                ("Applied at", 20.0),
                ("Updated at", 20.0),
            ];
            for (i, (name, width)) in columns.iter().enumerate() {
                worksheet.set_column_width(i as u16, *width)?;
                worksheet.write_string_with_format(0, i as u16, *name, &header_format)?;
            }
            worksheet.set_row_height(0, 26)?;
            worksheet.set_freeze_panes(1, 0)?;

            for (idx, candidate) in sorted.iter().enumerate() {
                let row = 1 + idx as u32;
                let bg = if idx % 2 == 0 { alt_row } else { Color::White };
                let base_fmt = Format::new()
                    .set_font_size(10)
                    .set_background_color(bg)
                    .set_border(FormatBorder::Thin)
                    .set_border_color(border_color);
                let center_fmt = base_fmt.clone().set_align(FormatAlign::Center);
                let status_fmt = Format::new()
                    .set_font_size(10)
                    .set_bold()
                    .set_font_color(Color::White)
                    .set_background_color(Self::status_color(candidate.processed_status))
                    .set_align(FormatAlign::Center)
                    .set_border(FormatBorder::Thin)
                    .set_border_color(border_color);

                worksheet.write_number_with_format(row, 0, (idx + 1) as f64, &center_fmt)?;
                worksheet.write_string_with_format(row, 1, &candidate.name, &base_fmt.clone().set_bold())?;
                worksheet.write_string_with_format(row, 2, &candidate.email, &base_fmt)?;
                worksheet.write_string_with_format(row, 3, candidate.whatsapp.as_deref().unwrap_or("-"), &base_fmt)?;
                worksheet.write_string_with_format(row, 4, candidate.location.as_deref().unwrap_or("-"), &base_fmt)?;
                match candidate.experience_month {
                    Some(months) => worksheet.write_number_with_format(row, 5, months as f64, &center_fmt)?,
                    None => worksheet.write_string_with_format(row, 5, "-", &center_fmt)?,
                };
                worksheet.write_string_with_format(row, 6, if candidate.is_senior { "Yes" } else { "No" }, &center_fmt)?;
                worksheet.write_string_with_format(row, 7, &candidate.processed_status.title(), &status_fmt)?;
                worksheet.write_number_with_format(row, 8, stage_order(candidate.processed_status) as f64, &center_fmt)?;
                worksheet.write_string_with_format(
                    row,
                    9,
                    &candidate.applied_at.format("%Y-%m-%d %H:%M").to_string(),
                    &center_fmt,
                )?;
                let updated = candidate
                    .updated_at
                    .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                worksheet.write_string_with_format(row, 10, &updated, &center_fmt)?;
            }

            if !sorted.is_empty() {
                worksheet.autofilter(0, 0, sorted.len() as u32, (columns.len() - 1) as u16)?;
            }
        }

        {
            let mut counts: HashMap<CandidateStatus, u32> = HashMap::new();
            for candidate in candidates {
                *counts.entry(candidate.processed_status).or_default() += 1;
            }

            let worksheet = workbook.add_worksheet();
            worksheet.set_name("Funnel")?;
            worksheet.set_column_width(0, 10.0)?;
            worksheet.set_column_width(1, 28.0)?;
            worksheet.set_column_width(2, 14.0)?;

            for (i, name) in ["Order", "Stage", "Candidates"].iter().enumerate() {
                worksheet.write_string_with_format(0, i as u16, *name, &header_format)?;
            }

            let cell_fmt = Format::new()
                .set_font_size(10)
                .set_border(FormatBorder::Thin)
                .set_border_color(border_color);

            let flow = recruitment_flow(true);
            for (idx, stage) in flow.iter().enumerate() {
                let row = 1 + idx as u32;
                worksheet.write_number_with_format(row, 0, stage.order as f64, &cell_fmt)?;
                worksheet.write_string_with_format(row, 1, &stage.title, &cell_fmt)?;
                let count = counts.get(&stage.value).copied().unwrap_or(0);
                worksheet.write_number_with_format(row, 2, count as f64, &cell_fmt)?;
            }

            let total_row = 1 + flow.len() as u32;
            let total_fmt = cell_fmt.clone().set_bold();
            worksheet.write_string_with_format(total_row, 1, "Total", &total_fmt)?;
            worksheet.write_number_with_format(total_row, 2, candidates.len() as f64, &total_fmt)?;
        }

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn candidate(status: CandidateStatus) -> Candidate {
        Candidate {
            id: Uuid::new_v4(),
            name: "Rahmat".into(),
            email: format!("{}@example.com", status),
            whatsapp: None,
            location: Some("Jakarta".into()),
            highest_degree: None,
            expected_salary: None,
            experience_month: Some(30),
            profile_data: None,
            processed_status: status,
            is_senior: false,
            survey: None,
            coding_test: None,
            interview: None,
            applied_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn export_produces_xlsx_archive() {
        let candidates = vec![
            candidate(CandidateStatus::Survey),
            candidate(CandidateStatus::Hired),
            candidate(CandidateStatus::Rejected),
        ];
        let bytes = ExportService::generate_pipeline_xlsx(&candidates).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn export_handles_empty_selection() {
        let bytes = ExportService::generate_pipeline_xlsx(&[]).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
