use std::fmt;
use std::path::PathBuf;

/// Non-fatal conditions found while planning or applying an update.
/// These are reported to the user and recorded in the execution log.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateWarning {
    /// The current version could not be normalized; no update is proposed
    MalformedCurrentVersion { raw: String },
    /// The newest selectable release is the current version
    UpToDate { current: String },
    /// The release list was empty after filtering
    NoReleases { app: String },
    /// The value in the file was not the expected current version
    ValueDrift {
        file: PathBuf,
        path: String,
        expected: String,
        found: String,
    },
    /// A target file is gone, usually because the application was removed upstream
    TargetMissing { file: PathBuf },
    /// The target key could not be located in its file
    KeyMissing { file: PathBuf, path: String },
    /// A prune rule matched no list item
    BlockNotPresent {
        file: PathBuf,
        field: String,
        value: String,
    },
}

impl fmt::Display for UpdateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateWarning::MalformedCurrentVersion { raw } => {
                write!(f, "Current version '{}' is not a recognizable version", raw)
            }
            UpdateWarning::UpToDate { current } => {
                write!(f, "Already up to date at '{}'", current)
            }
            UpdateWarning::NoReleases { app } => {
                write!(f, "No candidate releases found for '{}'", app)
            }
            UpdateWarning::ValueDrift {
                file,
                path,
                expected,
                found,
            } => write!(
                f,
                "{}: '{}' is '{}', expected '{}'; replacing it anyway",
                file.display(),
                path,
                found,
                expected
            ),
            UpdateWarning::TargetMissing { file } => {
                write!(
                    f,
                    "File '{}' no longer exists; was the application removed?",
                    file.display()
                )
            }
            UpdateWarning::KeyMissing { file, path } => {
                write!(f, "Key '{}' not found in '{}'", path, file.display())
            }
            UpdateWarning::BlockNotPresent { file, field, value } => write!(
                f,
                "No block with {}: {} in '{}'; nothing to remove",
                field,
                value,
                file.display()
            ),
        }
    }
}
