//! Filesystem path completion and resolution for File mode

use directories::BaseDirs;
use std::fmt;
use std::fs::{self, File};
use std::io::Read;
use std::path::{PathBuf, MAIN_SEPARATOR};

/// Outcome of resolving a File-mode submission
pub struct Resolution {
    /// Readable source, when the path could be opened
    pub source: Option<Box<dyn Read>>,
    /// Message to show, success or failure
    pub message: String,
    /// Whether the message reports success
    pub success: bool,
}

impl Resolution {
    fn failed(message: String) -> Self {
        Self {
            source: None,
            message,
            success: false,
        }
    }
}

/// One completion candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Candidate path as it should appear in the input line
    pub path: String,
    /// Whether the candidate is a directory
    pub is_dir: bool,
    /// File size, for regular files
    pub size: Option<u64>,
}

impl fmt::Display for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.is_dir, self.size) {
            (true, _) => write!(f, "{}{}", self.path, MAIN_SEPARATOR),
            (false, Some(size)) => write!(f, "{:<40} {:>10} bytes", self.path, size),
            (false, None) => write!(f, "{}", self.path),
        }
    }
}

/// Path completion and resolution service
pub trait PathService {
    /// Candidates starting with `prefix`, sorted by path
    fn complete(&self, prefix: &str) -> Vec<Completion>;

    /// Open `path` for upload
    fn resolve(&self, path: &str) -> Resolution;
}

/// [`PathService`] backed by the local filesystem
#[derive(Debug, Clone, Default)]
pub struct FsPaths {
    home: Option<PathBuf>,
}

impl FsPaths {
    /// Create a service expanding `~` to the user's home directory
    pub fn new() -> Self {
        Self {
            home: BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()),
        }
    }

    fn expand(&self, path: &str) -> PathBuf {
        match (path.strip_prefix('~'), &self.home) {
            (Some(rest), Some(home)) if rest.is_empty() || rest.starts_with(['/', MAIN_SEPARATOR]) => {
                home.join(rest.trim_start_matches(['/', MAIN_SEPARATOR]))
            }
            _ => PathBuf::from(path),
        }
    }
}

impl PathService for FsPaths {
    fn complete(&self, prefix: &str) -> Vec<Completion> {
        // Split the typed text into the directory part (kept verbatim) and
        // the file name stem being completed.
        let split = prefix
            .rfind(['/', MAIN_SEPARATOR])
            .map_or(0, |i| i + 1);
        let (dir_text, stem) = prefix.split_at(split);
        let dir = if dir_text.is_empty() {
            PathBuf::from(".")
        } else {
            self.expand(dir_text)
        };

        let Ok(entries) = fs::read_dir(&dir) else {
            return Vec::new();
        };

        let mut matches: Vec<Completion> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                if !name.starts_with(stem) || (name.starts_with('.') && !stem.starts_with('.')) {
                    return None;
                }
                let metadata = fs::metadata(entry.path()).ok();
                let is_dir = metadata.as_ref().is_some_and(fs::Metadata::is_dir);
                Some(Completion {
                    path: format!("{dir_text}{name}"),
                    is_dir,
                    size: metadata.filter(|m| m.is_file()).map(|m| m.len()),
                })
            })
            .collect();
        matches.sort_by(|a, b| a.path.cmp(&b.path));
        matches
    }

    fn resolve(&self, path: &str) -> Resolution {
        if path.trim().is_empty() {
            return Resolution::failed("No file name given".to_string());
        }
        let expanded = self.expand(path);
        match fs::metadata(&expanded) {
            Err(e) => Resolution::failed(format!("Cannot access {}: {}", path, e)),
            Ok(m) if m.is_dir() => Resolution::failed(format!("{} is a directory", path)),
            Ok(m) => match File::open(&expanded) {
                Ok(file) => Resolution {
                    source: Some(Box::new(file)),
                    message: format!("Sending {} ({} bytes)", expanded.display(), m.len()),
                    success: true,
                },
                Err(e) => Resolution::failed(format!("Cannot open {}: {}", path, e)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn sandbox() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("firmware.bin"), [0u8; 12]).unwrap();
        fs::write(dir.path().join("firmware.hex"), b":00").unwrap();
        fs::write(dir.path().join(".hidden"), b"").unwrap();
        fs::create_dir(dir.path().join("fixtures")).unwrap();
        dir
    }

    fn prefix(dir: &Path, rest: &str) -> String {
        format!("{}{}{}", dir.display(), MAIN_SEPARATOR, rest)
    }

    #[test]
    fn test_complete_lists_sorted_matches() {
        let dir = sandbox();
        let matches = FsPaths::new().complete(&prefix(dir.path(), "fi"));
        let names: Vec<&str> = matches
            .iter()
            .map(|c| c.path.rsplit(MAIN_SEPARATOR).next().unwrap())
            .collect();
        assert_eq!(names, ["firmware.bin", "firmware.hex", "fixtures"]);
        assert!(matches[2].is_dir);
        assert_eq!(matches[0].size, Some(12));
    }

    #[test]
    fn test_complete_single_and_hidden() {
        let dir = sandbox();
        let paths = FsPaths::new();
        let matches = paths.complete(&prefix(dir.path(), "firmware.h"));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].path, prefix(dir.path(), "firmware.hex"));

        assert_eq!(paths.complete(&prefix(dir.path(), "")).len(), 3);
        assert_eq!(paths.complete(&prefix(dir.path(), ".h")).len(), 1);
        assert!(paths.complete(&prefix(dir.path(), "zzz")).is_empty());
    }

    #[test]
    fn test_resolve_file() {
        let dir = sandbox();
        let mut resolution = FsPaths::new().resolve(&prefix(dir.path(), "firmware.bin"));
        assert!(resolution.success);
        assert!(resolution.message.contains("12 bytes"));
        let mut content = Vec::new();
        resolution.source.as_mut().unwrap().read_to_end(&mut content).unwrap();
        assert_eq!(content.len(), 12);
    }

    #[test]
    fn test_resolve_failures() {
        let dir = sandbox();
        let paths = FsPaths::new();

        let missing = paths.resolve(&prefix(dir.path(), "missing.bin"));
        assert!(!missing.success);
        assert!(missing.source.is_none());

        let directory = paths.resolve(&prefix(dir.path(), "fixtures"));
        assert!(!directory.success);
        assert!(directory.message.ends_with("is a directory"));

        assert!(!paths.resolve("  ").success);
    }

    #[test]
    fn test_completion_display() {
        let dir = Completion {
            path: "src".into(),
            is_dir: true,
            size: None,
        };
        assert_eq!(dir.to_string(), format!("src{}", MAIN_SEPARATOR));
    }
}
