use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::Document;

const RECORD_DELIMITER: &str = "---";
const CATEGORY_PREFIX: &str = "category:";

/// Reads plain-text corpus files into ordered documents.
///
/// Records are separated by blank lines or a line holding only `---`. A record
/// whose first line is `category: <name>` carries that category.
#[derive(Debug, Default)]
pub struct CorpusLoader;

impl CorpusLoader {
    pub fn new() -> Self { Self }

    /// Load a single corpus file, or every `.txt` file under a directory.
    pub fn load(&self, path: &Path) -> Result<Vec<Document>> {
        if path.is_dir() { self.load_dir(path) } else { self.load_file(path) }
    }

    pub fn load_file(&self, path: &Path) -> Result<Vec<Document>> {
        let content = read_file_content(path)?;
        let docs = self.parse(&content);
        debug!(path = %path.display(), documents = docs.len(), "parsed corpus file");
        Ok(docs)
    }

    pub fn load_dir(&self, dir: &Path) -> Result<Vec<Document>> {
        let files = list_txt_files(dir);
        if files.is_empty() {
            info!(dir = %dir.display(), "no .txt files found");
            return Ok(vec![]);
        }
        let mut texts = Vec::new();
        for file in &files {
            let content = read_file_content(file)?;
            texts.extend(parse_records(&content));
        }
        let docs: Vec<Document> = texts
            .into_iter()
            .enumerate()
            .map(|(i, (text, category))| Document::new(i, &text, category))
            .collect();
        info!(files = files.len(), documents = docs.len(), "loaded corpus directory");
        Ok(docs)
    }

    pub fn parse(&self, content: &str) -> Vec<Document> {
        parse_records(content)
            .into_iter()
            .enumerate()
            .map(|(i, (text, category))| Document::new(i, &text, category))
            .collect()
    }
}

/// Write documents so that [`CorpusLoader::parse`] yields the same records.
///
/// Every record starts with a `category:` line, left empty for uncategorized
/// documents, so a body line that looks like a header is never lifted on reload.
pub fn write_corpus(path: &Path, docs: &[Document]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::Storage(format!("create {}: {}", parent.display(), e)))?;
    }
    let mut out = String::new();
    for (i, doc) in docs.iter().enumerate() {
        if i > 0 { out.push_str("\n\n"); }
        out.push_str(CATEGORY_PREFIX);
        if let Some(category) = &doc.category {
            out.push(' ');
            out.push_str(category);
        }
        out.push('\n');
        out.push_str(&normalize_text(&doc.text));
    }
    out.push('\n');
    fs::write(path, out).map_err(|e| Error::Storage(format!("write {}: {}", path.display(), e)))
}

/// Canonical form of a document body: trailing whitespace and blank or
/// delimiter lines removed, outer whitespace trimmed.
pub fn normalize_text(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .filter(|l| !is_separator(l))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn is_separator(line: &str) -> bool {
    let t = line.trim();
    t.is_empty() || t == RECORD_DELIMITER
}

fn parse_records(content: &str) -> Vec<(String, Option<String>)> {
    let mut records = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in content.lines() {
        if is_separator(line) {
            flush_record(&mut current, &mut records);
        } else {
            current.push(line.trim_end());
        }
    }
    flush_record(&mut current, &mut records);
    records
}

fn flush_record(lines: &mut Vec<&str>, records: &mut Vec<(String, Option<String>)>) {
    if lines.is_empty() { return; }
    let mut body: &[&str] = lines.as_slice();
    let mut category = None;
    if let Some(first) = body.first() {
        let trimmed = first.trim_start();
        let head = trimmed.get(..CATEGORY_PREFIX.len());
        if head.is_some_and(|h| h.eq_ignore_ascii_case(CATEGORY_PREFIX)) {
            let name = trimmed[CATEGORY_PREFIX.len()..].trim();
            if !name.is_empty() { category = Some(name.to_string()); }
            body = &body[1..];
        }
    }
    let text = body.join("\n").trim().to_string();
    if !text.is_empty() { records.push((text, category)); }
    lines.clear();
}

fn read_file_content(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            let bytes = fs::read(path).map_err(|e| Error::Storage(format!("read {}: {}", path.display(), e)))?;
            Ok(String::from_utf8_lossy(&bytes).to_string())
        }
        Err(e) => Err(Error::Storage(format!("read {}: {}", path.display(), e))),
    }
}

fn list_txt_files(root: &Path) -> Vec<PathBuf> {
    let mut txt_files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("txt"))
        .collect();
    txt_files.sort();
    txt_files
}
