use crate::error::{PadError, PadResult};
use crate::finder;
use crate::padder::{self, PadOutcome, Padding};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum PadStatus {
    Pending,
    Padded { width: u32, height: u32 },
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct PadItem {
    pub path: PathBuf,
    pub relative_path: PathBuf,
    pub size_bytes: u64,
    pub selected: bool,
    pub status: PadStatus,
    pub found_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl PadItem {
    pub fn new(root: &Path, path: PathBuf) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.clone());
        let size_bytes = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

        Self {
            path,
            relative_path,
            size_bytes,
            selected: true,
            status: PadStatus::Pending,
            found_at: Utc::now(),
            processed_at: None,
        }
    }

    fn complete(&mut self, outcome: &PadOutcome) {
        let (width, height) = outcome.padded;
        self.status = PadStatus::Padded { width, height };
        self.processed_at = Some(Utc::now());
        self.selected = false;
    }

    fn fail(&mut self, error: &PadError) {
        self.status = PadStatus::Failed(error.to_string());
        self.processed_at = Some(Utc::now());
    }
}

/// Reported after each processed file.
#[derive(Debug, Clone)]
pub struct Progress<'a> {
    pub done: usize,
    pub total: usize,
    pub percent: usize,
    pub path: &'a Path,
    pub result: &'a PadResult<PadOutcome>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub total: usize,
    pub selected: usize,
    pub padded: usize,
    pub failed: usize,
}

/// Files discovered under one root, in listing order.
#[derive(Debug, Clone)]
pub struct PadBatch {
    root: PathBuf,
    items: Vec<PadItem>,
}

impl PadBatch {
    /// Search `root` for files matching `pattern`, all selected.
    pub fn discover(root: &Path, pattern: &str) -> PadResult<Self> {
        if !root.is_dir() {
            return Err(PadError::NotADirectory(root.to_path_buf()));
        }
        let root = std::path::absolute(root).map_err(|source| PadError::Open {
            path: root.to_path_buf(),
            source,
        })?;
        let files = finder::find_files(&root, pattern)?;
        log::info!("{} file(s) found under {}", files.len(), root.display());
        Ok(Self::from_files(root, files))
    }

    pub fn from_files(root: PathBuf, files: Vec<PathBuf>) -> Self {
        let items = files
            .into_iter()
            .map(|path| PadItem::new(&root, path))
            .collect();
        Self { root, items }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn items(&self) -> &[PadItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Include or exclude a file from the next run.
    ///
    /// `path` may be absolute or relative to the root. Returns false when no
    /// item matches.
    pub fn set_selected(&mut self, path: &Path, selected: bool) -> bool {
        let target = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        match self.items.iter_mut().find(|item| item.path == target) {
            Some(item) => {
                item.selected = selected;
                true
            }
            None => false,
        }
    }

    pub fn selected_items(&self) -> impl Iterator<Item = &PadItem> {
        self.items.iter().filter(|item| item.selected)
    }

    /// Pad every selected file in order, one at a time.
    ///
    /// A failing file is marked and skipped; the rest of the batch still
    /// runs. Padded files are deselected. Returns how many files succeeded.
    pub fn run<F>(&mut self, padding: Padding, mut on_progress: F) -> usize
    where
        F: FnMut(Progress<'_>),
    {
        let total = self.items.len();
        let mut processed = 0;

        for (index, item) in self.items.iter_mut().enumerate() {
            if !item.selected {
                continue;
            }

            let result = padder::pad_file(&item.path, padding);
            match &result {
                Ok(outcome) => {
                    item.complete(outcome);
                    processed += 1;
                }
                Err(e) => {
                    log::warn!("Skipping {}: {}", item.path.display(), e);
                    item.fail(e);
                }
            }

            on_progress(Progress {
                done: index + 1,
                total,
                percent: (index + 1) * 100 / total,
                path: &item.path,
                result: &result,
            });
        }

        log::info!("{} of {} file(s) padded", processed, total);
        processed
    }

    /// Dry-run counterpart of [`PadBatch::run`]; nothing is written.
    pub fn plan(&self, padding: Padding) -> Vec<(&PadItem, PadResult<PadOutcome>)> {
        self.selected_items()
            .map(|item| (item, padder::plan_file(&item.path, padding)))
            .collect()
    }

    pub fn stats(&self) -> BatchStats {
        let mut stats = BatchStats {
            total: self.items.len(),
            ..BatchStats::default()
        };
        for item in &self.items {
            if item.selected {
                stats.selected += 1;
            }
            match item.status {
                PadStatus::Padded { .. } => stats.padded += 1,
                PadStatus::Failed(_) => stats.failed += 1,
                PadStatus::Pending => {}
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    fn write_png(path: &Path, width: u32, height: u32) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        RgbaImage::from_pixel(width, height, Rgba([0, 128, 255, 255]))
            .save(path)
            .unwrap();
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        write_png(&dir.path().join("a.png"), 5, 5);
        write_png(&dir.path().join("nested/b.png"), 6, 3);
        fs::write(dir.path().join("readme.txt"), b"skip me").unwrap();
        dir
    }

    #[test]
    fn test_discover_builds_selected_items() {
        let dir = fixture();
        let batch = PadBatch::discover(dir.path(), "*.png").unwrap();

        assert_eq!(batch.len(), 2);
        assert!(batch.items().iter().all(|item| item.selected));
        assert!(batch.items().iter().all(|item| item.size_bytes > 0));
        assert_eq!(batch.items()[0].relative_path, PathBuf::from("a.png"));
        assert_eq!(
            batch.items()[1].relative_path,
            PathBuf::from("nested").join("b.png")
        );
        assert!(batch.items().iter().all(|item| item.path.is_absolute()));
    }

    #[test]
    fn test_discover_rejects_files_and_missing_dirs() {
        let dir = fixture();
        let err = PadBatch::discover(&dir.path().join("a.png"), "*.png").unwrap_err();
        assert!(matches!(err, PadError::NotADirectory(_)));
        let err = PadBatch::discover(&dir.path().join("nope"), "*.png").unwrap_err();
        assert!(matches!(err, PadError::NotADirectory(_)));
    }

    #[test]
    fn test_run_pads_selected_and_reports_progress() {
        let dir = fixture();
        let mut batch = PadBatch::discover(dir.path(), "*.png").unwrap();
        assert!(batch.set_selected(Path::new("a.png"), false));

        let mut percents = Vec::new();
        let processed = batch.run(Padding::new(4, false).unwrap(), |progress| {
            percents.push(progress.percent);
        });

        assert_eq!(processed, 1);
        assert_eq!(percents, vec![100]);
        assert_eq!(batch.items()[0].status, PadStatus::Pending);
        assert_eq!(
            batch.items()[1].status,
            PadStatus::Padded {
                width: 8,
                height: 6
            }
        );
        assert!(!batch.items()[1].selected);
        assert_eq!(
            image::image_dimensions(dir.path().join("a.png")).unwrap(),
            (5, 5)
        );
    }

    #[test]
    fn test_run_continues_past_broken_file() {
        let dir = fixture();
        fs::write(dir.path().join("0-broken.png"), b"garbage").unwrap();
        let mut batch = PadBatch::discover(dir.path(), "*.png").unwrap();
        assert_eq!(batch.len(), 3);

        let mut seen = Vec::new();
        let processed = batch.run(Padding::new(2, true).unwrap(), |progress| {
            seen.push((progress.percent, progress.result.is_ok()));
        });

        assert_eq!(processed, 2);
        assert_eq!(seen, vec![(33, false), (66, true), (100, true)]);
        assert!(matches!(batch.items()[0].status, PadStatus::Failed(_)));
        assert!(batch.items()[0].selected);

        let stats = batch.stats();
        assert_eq!(
            stats,
            BatchStats {
                total: 3,
                selected: 1,
                padded: 2,
                failed: 1
            }
        );
    }

    #[test]
    fn test_set_selected_unknown_path() {
        let dir = fixture();
        let mut batch = PadBatch::discover(dir.path(), "*.png").unwrap();
        assert!(!batch.set_selected(Path::new("missing.png"), false));
        assert_eq!(batch.selected_items().count(), 2);
    }

    #[test]
    fn test_plan_leaves_files_untouched() {
        let dir = fixture();
        let batch = PadBatch::discover(dir.path(), "*.png").unwrap();

        let plan = batch.plan(Padding::new(4, false).unwrap());
        let sizes: Vec<_> = plan
            .iter()
            .map(|(_, result)| result.as_ref().unwrap().padded)
            .collect();
        assert_eq!(sizes, vec![(6, 6), (8, 6)]);
        assert_eq!(
            image::image_dimensions(dir.path().join("nested/b.png")).unwrap(),
            (6, 3)
        );
    }
}
