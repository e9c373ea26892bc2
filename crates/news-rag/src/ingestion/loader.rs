//! Raw article loading from the crawled directory

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::types::Article;

/// List `*.json` files directly under `dir`, sorted by path
///
/// A missing or unreadable directory yields an empty list.
pub fn list_article_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_json(p))
        .collect();

    files.sort();
    files
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Read and parse a single article file
pub async fn load_article(path: &Path) -> Result<Article> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::article_parse(path, e.to_string()))?;

    serde_json::from_str(&content).map_err(|e| Error::article_parse(path, e.to_string()))
}

/// Load every parseable article from `paths`, skipping bad files
pub async fn load_articles(paths: &[PathBuf]) -> Vec<Article> {
    let mut articles = Vec::with_capacity(paths.len());
    for path in paths {
        match load_article(path).await {
            Ok(article) => articles.push(article),
            Err(e) => tracing::warn!("Skipping article: {}", e),
        }
    }
    articles
}
