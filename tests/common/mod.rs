#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// sha256("x")
pub const DIGEST_X: &str = "2d711642b726b04401627ca9fbac32f5c8530fb1903cc4db02258717921a4881";
/// sha256("y")
pub const DIGEST_Y: &str = "a1fce4363854ff888cff4b8e7875d600c2682390412a8cf79b37d0b11148b0fa";

/// Temporary file tree fixture for consistent test setup
pub struct TestTree {
    pub temp_dir: TempDir,
}

impl TestTree {
    /// Create an empty tree
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// `a.txt` = "x", `sub/b.txt` = "y", `.git` = anything
    pub fn scenario() -> Result<Self> {
        let tree = Self::new()?;
        tree.write("a.txt", "x")?;
        tree.write("sub/b.txt", "y")?;
        tree.write(".git", "gitdir: elsewhere")?;
        Ok(tree)
    }

    /// Root of the tree, canonicalized so recorded paths compare cleanly
    pub fn path(&self) -> PathBuf {
        fs::canonicalize(self.temp_dir.path()).unwrap_or_else(|_| self.temp_dir.path().into())
    }

    /// Write `content` at `relative`, creating parent directories
    pub fn write(&self, relative: &str, content: impl AsRef<[u8]>) -> Result<PathBuf> {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Default manifest location inside the tree
    pub fn manifest(&self) -> PathBuf {
        self.path().join("SHA256")
    }

    /// Manifest lines, in file order
    pub fn manifest_lines(&self) -> Result<Vec<String>> {
        read_lines(&self.manifest())
    }
}

pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    Ok(fs::read_to_string(path)?
        .lines()
        .map(str::to_string)
        .collect())
}

/// Config file in `dir` with sorted output and `threads` workers
pub fn write_config(dir: &Path, threads: usize) -> Result<PathBuf> {
    let path = dir.join("config.toml");
    fs::write(
        &path,
        format!("[hashing]\nparallel_threads = {threads}\n\n[manifest]\nsort_paths = true\n"),
    )?;
    Ok(path)
}
