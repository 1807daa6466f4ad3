use anyhow::{ensure, Result};
use lexindex::index::has_text_extension;
use lexindex::{Category, InputDocument};
use std::fs;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

const SKIP_DIRS: &[&str] = &["target", "node_modules", "__pycache__", "dist", "build", "venv"];

const CODE_EXTENSIONS: &[&str] = &[
    "rs", "py", "js", "jsx", "ts", "tsx", "go", "java", "kt", "scala", "c", "h", "cc", "cpp", "hpp", "cs",
    "rb", "php", "swift", "m", "sh", "bash", "zsh", "sql", "html", "css", "scss", "vue", "svelte", "lua",
    "toml", "yaml", "yml", "json", "xml", "gradle", "dart", "ex", "exs", "hs", "ml", "r", "pl",
];

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIP_DIRS.contains(&&*name)
}

/// Classify a file from its path and raw bytes.
pub fn classify(path: &str, bytes: &[u8]) -> Category {
    if bytes.contains(&0) || std::str::from_utf8(bytes).is_err() {
        return Category::Binary;
    }
    let ext = Path::new(path).extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase());
    match ext {
        Some(ext) if CODE_EXTENSIONS.contains(&ext.as_str()) => Category::Code,
        _ if has_text_extension(path) => Category::Text,
        _ => Category::Other,
    }
}

/// Walk `root` and read every file into an [`InputDocument`] keyed by its
/// `/`-separated path relative to `root`. Binary files keep an empty body.
pub fn collect_documents(root: &Path) -> Result<Vec<InputDocument>> {
    ensure!(root.is_dir(), "input {} is not a directory", root.display());
    let mut docs = Vec::new();
    let walker = WalkDir::new(root).sort_by_file_name().into_iter().filter_entry(|e| !is_skipped_dir(e));
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let p = entry.path();
        let rel = p
            .strip_prefix(root)
            .unwrap_or(p)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let bytes = match fs::read(p) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(path = %p.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };
        let category = classify(&rel, &bytes);
        let content = match category {
            Category::Binary => String::new(),
            _ => String::from_utf8(bytes).unwrap_or_default(),
        };
        docs.push(InputDocument { path: rel, content, category });
    }
    tracing::info!(root = %root.display(), num_files = docs.len(), "collected files");
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_content_and_extension() {
        assert_eq!(classify("src/main.rs", b"fn main() {}"), Category::Code);
        assert_eq!(classify("README.md", b"# title"), Category::Text);
        assert_eq!(classify("LICENSE", b"MIT"), Category::Other);
        assert_eq!(classify("img.png", &[0x89, b'P', b'N', b'G', 0, 1]), Category::Binary);
        assert_eq!(classify("bad.rs", &[0xff, 0xfe, 0xfd]), Category::Binary);
    }

    #[test]
    fn walks_and_skips_hidden_and_build_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("target/debug")).unwrap();
        fs::write(root.join("src/lib.rs"), "pub fn parse() {}").unwrap();
        fs::write(root.join("notes.txt"), "remember the parser").unwrap();
        fs::write(root.join(".git/HEAD"), "ref: refs/heads/main").unwrap();
        fs::write(root.join("target/debug/out.rs"), "generated").unwrap();

        let docs = collect_documents(root).unwrap();
        let paths: Vec<&str> = docs.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["notes.txt", "src/lib.rs"]);
        assert_eq!(docs[1].category, Category::Code);
    }
}
