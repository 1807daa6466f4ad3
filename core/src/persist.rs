use crate::index::IndexSnapshot;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{create_dir_all, rename, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const STATE_VERSION: u32 = 1;

/// The cacheable part of an index: idf and snippets. Document vectors are
/// never part of it, so a restored index cannot rank until it is rebuilt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexState {
    pub idf: Vec<(String, f32)>,
    pub metadata: Vec<(String, String)>,
}

impl IndexState {
    /// Entries are sorted by key so identical indexes export identical bytes.
    pub fn from_snapshot(snapshot: &IndexSnapshot) -> Self {
        let mut idf: Vec<(String, f32)> = snapshot.idf.iter().map(|(t, w)| (t.clone(), *w)).collect();
        idf.sort_by(|a, b| a.0.cmp(&b.0));
        let mut metadata: Vec<(String, String)> =
            snapshot.metadata.iter().map(|(p, s)| (p.clone(), s.clone())).collect();
        metadata.sort_by(|a, b| a.0.cmp(&b.0));
        Self { idf, metadata }
    }

    /// A snapshot with these tables and no document vectors.
    pub fn into_snapshot(self) -> IndexSnapshot {
        IndexSnapshot {
            documents: Vec::new(),
            idf: self.idf.into_iter().collect::<HashMap<_, _>>(),
            metadata: self.metadata.into_iter().collect::<HashMap<_, _>>(),
            num_docs: 0,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(blob: &str) -> Result<Self> {
        serde_json::from_str(blob).context("malformed index state")
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: usize,
    pub num_vectorized: usize,
    pub created_at: String,
    pub version: u32,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn state(&self) -> PathBuf { self.root.join("state.json") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

/// Write through a sibling `.tmp` file and rename, so a reader of the cache
/// never sees a truncated file.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir)?;
    }
    let tmp = path.with_extension("tmp");
    let mut f = File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
    f.write_all(contents.as_bytes())?;
    f.sync_all()?;
    rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

fn read_file(path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    Ok(buf)
}

pub fn save_state(paths: &IndexPaths, state: &IndexState) -> Result<()> {
    write_atomic(&paths.state(), &state.to_json()?)
}

/// Read `state.json` as a raw string; parsing is left to the importer so that
/// a corrupt cache never replaces a live index.
pub fn read_state_blob(paths: &IndexPaths) -> Result<String> {
    read_file(&paths.state())
}

pub fn load_state(paths: &IndexPaths) -> Result<IndexState> {
    IndexState::from_json(&read_state_blob(paths)?)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    write_atomic(&paths.meta(), &serde_json::to_string_pretty(meta)?)
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let path = paths.meta();
    serde_json::from_str(&read_file(&path)?).with_context(|| format!("malformed {}", path.display()))
}
