use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Whether the path has an `.html` or `.htm` extension (any case)
pub fn is_html_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}

/// Saved HTML pages at `path`.
///
/// A file is returned as is when it is an HTML file. A directory is searched
/// recursively and the matches are sorted by lowercased path.
pub fn collect_html_files(path: &Path) -> io::Result<Vec<PathBuf>> {
    let metadata = fs::metadata(path)?;
    if metadata.is_file() {
        return Ok(if is_html_file(path) {
            vec![path.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let mut files = Vec::new();
    walk(path, &mut files)?;
    files.sort_by_key(|p| p.to_string_lossy().to_lowercase());
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk(&path, files)?;
        } else if file_type.is_file() && is_html_file(&path) {
            files.push(path);
        }
    }
    Ok(())
}

/// Open a URL in the system's default browser
pub fn open_in_browser(url: &str) -> io::Result<()> {
    ::log::debug!("Opening {} in the default browser", url);
    open::that(url)
}
