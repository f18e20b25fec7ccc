use crate::batch::{BatchStats, PadBatch, PadItem, PadStatus};
use crate::error::PadResult;
use crate::padder::PadOutcome;
use serde::Serialize;
use std::path::Path;

pub fn format_size_kb(bytes: u64) -> String {
    format!("{} KB", (bytes + 1023) / 1024)
}

pub fn files_found_message(count: usize) -> String {
    format!("{} file(s) found", count)
}

pub fn files_processed_message(count: usize) -> String {
    format!("{} file(s) processed", count)
}

fn status_label(item: &PadItem) -> &'static str {
    match item.status {
        PadStatus::Padded { .. } => "padded",
        PadStatus::Failed(_) => "failed",
        PadStatus::Pending if item.selected => "pending",
        PadStatus::Pending => "skipped",
    }
}

pub fn listing_row(item: &PadItem) -> String {
    format!(
        "{:<8} {:>10}  {}",
        status_label(item),
        format_size_kb(item.size_bytes),
        item.relative_path.display()
    )
}

pub fn print_listing(batch: &PadBatch) {
    for item in batch.items() {
        println!("{}", listing_row(item));
        if let PadStatus::Failed(reason) = &item.status {
            println!("         ⚠ {}", reason);
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchSnapshot<'a> {
    pub root: &'a Path,
    pub items: &'a [PadItem],
    pub stats: BatchStats,
}

pub fn to_json(batch: &PadBatch) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&BatchSnapshot {
        root: batch.root(),
        items: batch.items(),
        stats: batch.stats(),
    })
}

#[derive(Debug, Serialize)]
pub struct PlannedFile<'a> {
    pub relative_path: &'a Path,
    pub outcome: Option<PadOutcome>,
    pub error: Option<String>,
}

/// Serialize a dry-run plan; failures carry their message instead of an outcome.
pub fn plan_to_json(plan: &[(&PadItem, PadResult<PadOutcome>)]) -> serde_json::Result<String> {
    let files: Vec<PlannedFile<'_>> = plan
        .iter()
        .map(|(item, result)| PlannedFile {
            relative_path: &item.relative_path,
            outcome: result.as_ref().ok().copied(),
            error: result.as_ref().err().map(|e| e.to_string()),
        })
        .collect();
    serde_json::to_string_pretty(&files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::padder::Padding;
    use image::{Rgba, RgbaImage};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_format_size_rounds_up() {
        assert_eq!(format_size_kb(0), "0 KB");
        assert_eq!(format_size_kb(1), "1 KB");
        assert_eq!(format_size_kb(1024), "1 KB");
        assert_eq!(format_size_kb(1025), "2 KB");
    }

    #[test]
    fn test_summary_messages() {
        assert_eq!(files_found_message(3), "3 file(s) found");
        assert_eq!(files_processed_message(0), "0 file(s) processed");
    }

    #[test]
    fn test_listing_row_and_json() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        let file = root.join("icon.png");
        fs::write(&file, vec![0u8; 2048]).unwrap();

        let batch = PadBatch::from_files(root, vec![file]);
        let row = listing_row(&batch.items()[0]);
        assert!(row.starts_with("pending"));
        assert!(row.contains("2 KB"));
        assert!(row.ends_with("icon.png"));

        let json: serde_json::Value = serde_json::from_str(&to_json(&batch).unwrap()).unwrap();
        assert_eq!(json["stats"]["total"], 1);
        assert_eq!(json["items"][0]["status"], "Pending");
        assert_eq!(
            PathBuf::from(json["items"][0]["relative_path"].as_str().unwrap()),
            PathBuf::from("icon.png")
        );
    }

    #[test]
    fn test_plan_json_reports_outcomes_and_errors() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        let good = root.join("good.png");
        let bad = root.join("bad.png");
        RgbaImage::from_pixel(5, 4, Rgba([9, 9, 9, 255]))
            .save(&good)
            .unwrap();
        fs::write(&bad, b"nope").unwrap();

        let batch = PadBatch::from_files(root, vec![bad, good]);
        let plan = batch.plan(Padding::new(3, true).unwrap());
        let json: serde_json::Value =
            serde_json::from_str(&plan_to_json(&plan).unwrap()).unwrap();

        assert!(json[0]["outcome"].is_null());
        assert!(json[0]["error"].is_string());
        assert_eq!(json[1]["outcome"]["padded"], serde_json::json!([7, 5]));
        assert_eq!(json[1]["outcome"]["offset"], serde_json::json!([1, 0]));
        assert!(json[1]["error"].is_null());
    }
}
