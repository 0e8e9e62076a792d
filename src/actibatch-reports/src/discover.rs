use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{ReportError, Result};

pub const EPOCH_SUFFIX: &str = "epochs.csv";
pub const REPORT_SUFFIX: &str = "sleep-report.csv";
pub const WEAR_SUFFIX: &str = "WearTimeValidationDetails.csv";

/// Exports found in one subject's directory.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SubjectFiles {
    pub epoch_file: Option<PathBuf>,
    pub sleep_report: Option<PathBuf>,
    pub wear_time: Option<PathBuf>,
}

impl SubjectFiles {
    pub fn complete(&self) -> bool {
        self.epoch_file.is_some() && self.sleep_report.is_some() && self.wear_time.is_some()
    }
}

/// Walks the immediate children of a study folder, one directory per
/// subject, keyed by directory name. Epoch and report exports sit directly
/// in the subject directory; wear-time validations one level deeper, next
/// to the other device-software output.
pub fn search_folder(root: &Path) -> Result<BTreeMap<String, SubjectFiles>> {
    let mut found = BTreeMap::new();
    for path in read_dir_sorted(root)? {
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };

        let files = subject_files(&path)?;
        if files.epoch_file.is_none() {
            warn!("{name}: no epoch export found");
        }
        if files.sleep_report.is_none() {
            warn!("{name}: no sleep report found");
        }
        if files.wear_time.is_none() {
            warn!("{name}: no wear time validation found");
        }
        found.insert(name.to_string(), files);
    }
    Ok(found)
}

fn subject_files(dir: &Path) -> Result<SubjectFiles> {
    let mut files = SubjectFiles::default();
    for path in read_dir_sorted(dir)? {
        if path.is_dir() {
            for nested in read_dir_sorted(&path)? {
                if nested.is_file()
                    && name_ends_with(&nested, WEAR_SUFFIX)
                    && files.wear_time.is_none()
                {
                    files.wear_time = Some(nested);
                }
            }
        } else if name_ends_with(&path, EPOCH_SUFFIX) && files.epoch_file.is_none() {
            files.epoch_file = Some(path);
        } else if name_ends_with(&path, REPORT_SUFFIX) && files.sleep_report.is_none() {
            files.sleep_report = Some(path);
        }
    }
    Ok(files)
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|error| ReportError::Io(dir.to_path_buf(), error))?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|error| ReportError::Io(dir.to_path_buf(), error))?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

fn name_ends_with(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_each_subject_export() {
        let dir = tempfile::tempdir().unwrap();
        let seven = dir.path().join("7");
        fs::create_dir_all(seven.join("validation")).unwrap();
        fs::write(seven.join("test7epochs.csv"), "timestamp,counts\n").unwrap();
        fs::write(seven.join("7-sleep-report.csv"), "").unwrap();
        fs::write(
            seven.join("validation").join("StudyWearTimeValidationDetails.csv"),
            "",
        )
        .unwrap();
        // stray file at study level is not a subject
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let found = search_folder(dir.path()).unwrap();
        assert_eq!(found.len(), 1);
        let files = &found["7"];
        assert!(files.complete());
        assert!(
            files
                .wear_time
                .as_ref()
                .unwrap()
                .ends_with("validation/StudyWearTimeValidationDetails.csv")
        );
    }

    #[test]
    fn incomplete_subjects_are_still_listed() {
        let dir = tempfile::tempdir().unwrap();
        let eight = dir.path().join("8");
        fs::create_dir_all(&eight).unwrap();
        fs::write(eight.join("test8epochs.csv"), "timestamp,counts\n").unwrap();

        let found = search_folder(dir.path()).unwrap();
        let files = &found["8"];
        assert!(!files.complete());
        assert!(files.epoch_file.is_some());
        assert!(files.sleep_report.is_none());
        assert!(files.wear_time.is_none());
    }

    #[test]
    fn wear_validation_is_only_found_one_level_down() {
        let dir = tempfile::tempdir().unwrap();
        let nine = dir.path().join("9");
        // wear file directly in the subject directory does not count
        fs::create_dir_all(&nine).unwrap();
        fs::write(nine.join("StudyWearTimeValidationDetails.csv"), "").unwrap();

        let found = search_folder(dir.path()).unwrap();
        assert!(found["9"].wear_time.is_none());
    }
}
