use std::path::{Path, PathBuf};

/// Layout of the files produced for one results file.
///
/// Every artifact lives directly under the output directory and is named
/// after the input file's stem, so `results.json` yields
/// `results_analysis.txt`, `results_charts.svg`, and `results_summary.json`.
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
    base: String,
}

impl OutputDir {
    /// Create a layout for `input` under `root`. Nothing is touched on disk.
    pub fn new(root: impl Into<PathBuf>, input: &Path) -> Self {
        Self {
            root: root.into(),
            base: base_name(input),
        }
    }

    /// The output directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Base name shared by every output file.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Path to the text report.
    pub fn text_report(&self) -> PathBuf {
        self.root.join(format!("{}_analysis.txt", self.base))
    }

    /// Path to the chart document, with the backend's extension.
    pub fn charts(&self, extension: &str) -> PathBuf {
        self.root.join(format!("{}_charts.{extension}", self.base))
    }

    /// Path to the JSON summary.
    pub fn summary(&self) -> PathBuf {
        self.root.join(format!("{}_summary.json", self.base))
    }

    /// Create the output directory (and parents) if absent.
    pub fn ensure(&self) -> Result<(), OutputError> {
        std::fs::create_dir_all(&self.root).map_err(|e| OutputError::CreateDir {
            path: self.root.clone(),
            source: e,
        })
    }
}

/// File name without its last extension (`results.json` -> `results`).
fn base_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "results".to_string())
}

/// Write `contents` to `path` via a temporary sibling and a rename, so
/// readers never see a partial file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), OutputError> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = dir.join(format!(".{name}.tmp.{}", std::process::id()));

    std::fs::write(&tmp_path, contents).map_err(|e| OutputError::Write {
        path: tmp_path.clone(),
        source: e,
    })?;

    std::fs::rename(&tmp_path, path).map_err(|e| OutputError::Rename {
        from: tmp_path,
        to: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Errors from preparing or writing output files.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("failed to create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to rename {} to {}: {source}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}
