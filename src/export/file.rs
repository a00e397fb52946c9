//! Delivery of finished exports to the local filesystem.

use super::dependencies::DownloadSink;
use super::types::ExportError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name of the paginated document export.
pub const DOCUMENT_FILENAME: &str = "dashboard-report.pdf";

/// File name of the slide deck export.
pub const SLIDE_DECK_FILENAME: &str = "dashboard-charts.pptx";

/// Default directory for delivered files: the user's download directory,
/// falling back to the home directory.
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Writes exports into a fixed directory, the local stand-in for a browser download.
#[derive(Debug, Clone)]
pub struct FileDownloadSink {
    directory: PathBuf,
}

impl FileDownloadSink {
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl DownloadSink for FileDownloadSink {
    fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
        save_download(bytes, &self.directory, filename)
    }
}

/// Ensure the output directory exists, creating it if necessary.
///
/// # Returns
/// The canonicalized path to the directory
pub fn ensure_directory_exists(directory: &Path) -> Result<PathBuf, ExportError> {
    if !directory.exists() {
        log::info!("Creating export directory: {}", directory.display());
        fs::create_dir_all(directory)?;
    }

    let canonical = directory
        .canonicalize()
        .unwrap_or_else(|_| directory.to_path_buf());

    Ok(canonical)
}

/// Rejects names that would escape the output directory.
pub fn validate_filename(filename: &str) -> Result<&str, ExportError> {
    let invalid = filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(['/', '\\']);
    if invalid {
        return Err(ExportError::Write(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid export file name '{filename}'"),
        )));
    }
    Ok(filename)
}

/// Save export bytes under `filename` inside `directory`.
///
/// # Returns
/// Path to the saved file
pub fn save_download(
    bytes: &[u8],
    directory: &Path,
    filename: &str,
) -> Result<PathBuf, ExportError> {
    let filename = validate_filename(filename)?;
    let directory = ensure_directory_exists(directory)?;
    let file_path = directory.join(filename);

    log::info!(
        "Saving export to: {} ({} bytes)",
        file_path.display(),
        bytes.len()
    );

    fs::write(&file_path, bytes)?;

    let written_size = fs::metadata(&file_path)?.len();
    log::debug!("File written: {} bytes", written_size);

    #[cfg(unix)]
    {
        use std::fs::Permissions;
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&file_path, Permissions::from_mode(0o600))?;
    }

    Ok(file_path)
}

/// Expand tilde (~) in path strings.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_download_creates_directory_and_writes_bytes() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("nested").join("out");
        let path = save_download(b"%PDF-1.5", &target, DOCUMENT_FILENAME).unwrap();
        assert!(path.ends_with(DOCUMENT_FILENAME));
        assert_eq!(fs::read(&path).unwrap(), b"%PDF-1.5");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn rejects_path_like_names() {
        assert!(validate_filename("../escape.png").is_err());
        assert!(validate_filename("a/b.png").is_err());
        assert!(validate_filename("").is_err());
        assert_eq!(validate_filename("chart.png").unwrap(), "chart.png");
    }

    #[test]
    fn sink_delivers_into_its_directory() {
        let temp = tempfile::tempdir().unwrap();
        let sink = FileDownloadSink::new(temp.path().to_path_buf());
        let path = sink.deliver(SLIDE_DECK_FILENAME, b"PK").unwrap();
        assert_eq!(path.parent().unwrap(), temp.path().canonicalize().unwrap());
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde("~/Downloads");
        assert!(!expanded.to_string_lossy().starts_with("~"));

        let no_tilde = expand_tilde("/absolute/path");
        assert_eq!(no_tilde, PathBuf::from("/absolute/path"));
    }
}
