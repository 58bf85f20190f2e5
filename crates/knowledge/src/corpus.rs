//! Corpus loading: the source document as an ordered sequence of pages.

use fastrag_core::{AppError, AppResult};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Separates pages inside a single-file corpus.
pub const PAGE_BREAK: char = '\u{000C}';

const PAGE_EXTENSIONS: &[&str] = &["txt"];

/// Load corpus pages from `path`.
///
/// - A directory yields one page per `.txt` file, ordered by path.
/// - A file is split into pages on form feeds; without any it is one page.
pub fn load_pages(path: &Path) -> AppResult<Vec<String>> {
    if path.is_dir() {
        load_directory(path)
    } else if path.is_file() {
        let text = std::fs::read_to_string(path)?;
        let pages: Vec<String> = text.split(PAGE_BREAK).map(str::to_string).collect();
        tracing::info!("Loaded {} pages from {:?}", pages.len(), path);
        Ok(pages)
    } else {
        Err(AppError::Config(format!(
            "Corpus path does not exist: {:?}",
            path
        )))
    }
}

fn load_directory(root: &Path) -> AppResult<Vec<String>> {
    let files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_page_file(e.path()))
        .map(|e| e.into_path())
        .collect();

    if files.is_empty() {
        return Err(AppError::Config(format!(
            "Corpus directory {:?} contains no page files ({})",
            root,
            PAGE_EXTENSIONS.join(", ")
        )));
    }

    let mut pages = Vec::with_capacity(files.len());
    for file in &files {
        tracing::debug!("Reading page {:?}", file);
        pages.push(std::fs::read_to_string(file)?);
    }

    tracing::info!("Loaded {} pages from {:?}", pages.len(), root);
    Ok(pages)
}

fn is_page_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| PAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
