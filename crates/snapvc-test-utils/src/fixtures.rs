//! Test fixtures for creating reproducible working trees.
//!
//! Provides a builder for temporary project directories and helpers for
//! mutating and inspecting them during a test.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// A temporary test project with configurable file structure.
///
/// Creates a temporary directory that is automatically cleaned up
/// when the project is dropped. File contents are raw bytes, so binary
/// fixtures are as easy to set up as text.
///
/// # Example
///
/// ```rust
/// use snapvc_test_utils::fixtures::TestProject;
///
/// let project = TestProject::new()
///     .with_file("README.md", "# demo\n")
///     .with_dir("empty")
///     .build();
///
/// assert!(project.file_exists("README.md"));
/// assert!(project.path().join("empty").is_dir());
/// ```
pub struct TestProject {
    /// The temporary directory backing this project.
    temp_dir: TempDir,
    /// Files to create (path relative to root -> contents).
    files: BTreeMap<PathBuf, Vec<u8>>,
    /// Directories to create (paths relative to root).
    dirs: Vec<PathBuf>,
}

impl TestProject {
    /// Create a new test project builder.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
            files: BTreeMap::new(),
            dirs: Vec::new(),
        }
    }

    /// Add a file to the project.
    ///
    /// The path should be relative to the project root.
    /// Parent directories are created automatically.
    pub fn with_file(mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) -> Self {
        self.files
            .insert(path.as_ref().to_path_buf(), contents.into());
        self
    }

    /// Add an empty directory to the project.
    pub fn with_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.dirs.push(path.as_ref().to_path_buf());
        self
    }

    /// Add a snapvc configuration file.
    pub fn with_config(self, config: &str) -> Self {
        self.with_file("snapvc.json", config)
    }

    /// Add a small mixed tree: nested text files and one binary file.
    pub fn with_sample_tree(self) -> Self {
        self.with_file("README.md", content::README)
            .with_file("src/lib.rs", content::RUST_LIB)
            .with_file("src/nested/deep.txt", "deep\n")
            .with_file("assets/blob.bin", content::binary())
    }

    /// Build the project, creating all files and directories.
    pub fn build(self) -> BuiltTestProject {
        let root = self.temp_dir.path();

        for dir in &self.dirs {
            let full_path = root.join(dir);
            fs::create_dir_all(&full_path).unwrap_or_else(|e| {
                panic!("Failed to create directory {}: {}", full_path.display(), e)
            });
        }

        for (path, contents) in &self.files {
            write_bytes(&root.join(path), contents);
        }

        BuiltTestProject {
            temp_dir: self.temp_dir,
        }
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// A built test project with files created on disk.
///
/// The temporary directory is automatically cleaned up when this is dropped.
pub struct BuiltTestProject {
    temp_dir: TempDir,
}

impl BuiltTestProject {
    /// Get the path to the project root.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Read a file from the project as text.
    pub fn read_file(&self, path: impl AsRef<Path>) -> String {
        let full_path = self.path().join(path.as_ref());
        fs::read_to_string(&full_path)
            .unwrap_or_else(|e| panic!("Failed to read file {}: {}", full_path.display(), e))
    }

    /// Read a file from the project as raw bytes.
    pub fn read_bytes(&self, path: impl AsRef<Path>) -> Vec<u8> {
        let full_path = self.path().join(path.as_ref());
        fs::read(&full_path)
            .unwrap_or_else(|e| panic!("Failed to read file {}: {}", full_path.display(), e))
    }

    /// Check if a file exists in the project.
    pub fn file_exists(&self, path: impl AsRef<Path>) -> bool {
        self.path().join(path.as_ref()).exists()
    }

    /// Write a file to the project (for modifying during tests).
    pub fn write_file(&self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) {
        write_bytes(&self.path().join(path.as_ref()), contents.as_ref());
    }

    /// Delete a file from the project.
    pub fn delete_file(&self, path: impl AsRef<Path>) {
        let full_path = self.path().join(path.as_ref());
        fs::remove_file(&full_path)
            .unwrap_or_else(|e| panic!("Failed to delete file {}: {}", full_path.display(), e));
    }

    /// Every regular file in the project with its contents, keyed by
    /// relative path.
    pub fn tree(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        self.tree_excluding(None)
    }

    /// Like [`BuiltTestProject::tree`], skipping everything under the
    /// relative directory `excluded`.
    pub fn tree_without(&self, excluded: impl AsRef<Path>) -> BTreeMap<PathBuf, Vec<u8>> {
        self.tree_excluding(Some(excluded.as_ref()))
    }

    fn tree_excluding(&self, excluded: Option<&Path>) -> BTreeMap<PathBuf, Vec<u8>> {
        let root = self.path();
        let skip = excluded.map(|dir| root.join(dir));

        WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| skip.as_deref().map_or(true, |dir| !entry.path().starts_with(dir)))
            .map(|entry| entry.unwrap_or_else(|e| panic!("Failed to walk {}: {}", root.display(), e)))
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| {
                let relative = entry
                    .path()
                    .strip_prefix(root)
                    .expect("walked path is under the root")
                    .to_path_buf();
                let contents = fs::read(entry.path()).unwrap_or_else(|e| {
                    panic!("Failed to read file {}: {}", entry.path().display(), e)
                });
                (relative, contents)
            })
            .collect()
    }

    /// Relative paths of every regular file outside `excluded`, sorted.
    pub fn file_list_without(&self, excluded: impl AsRef<Path>) -> Vec<PathBuf> {
        self.tree_without(excluded).into_keys().collect()
    }
}

fn write_bytes(full_path: &Path, contents: &[u8]) {
    if let Some(parent) = full_path.parent() {
        fs::create_dir_all(parent).unwrap_or_else(|e| {
            panic!(
                "Failed to create parent directory for {}: {}",
                full_path.display(),
                e
            )
        });
    }
    fs::write(full_path, contents)
        .unwrap_or_else(|e| panic!("Failed to write file {}: {}", full_path.display(), e));
}

/// Common test file contents.
pub mod content {
    /// A short markdown file.
    pub const README: &str = "# sample\n\nA tree used in snapshot tests.\n";

    /// A small Rust library file.
    pub const RUST_LIB: &str = r#"pub fn add(a: i32, b: i32) -> i32 {
    a + b
}
"#;

    /// Bytes that are not valid UTF-8 and include NUL and CRLF.
    pub fn binary() -> Vec<u8> {
        vec![0x00, 0xff, 0xfe, b'\r', b'\n', 0x80, 0x00, 0x1b, b'x']
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_creates_files_and_dirs() {
        let project = TestProject::new()
            .with_file("a.txt", "a")
            .with_file("nested/b.bin", vec![1u8, 2, 3])
            .with_dir("empty")
            .build();

        assert_eq!(project.read_file("a.txt"), "a");
        assert_eq!(project.read_bytes("nested/b.bin"), vec![1, 2, 3]);
        assert!(project.path().join("empty").is_dir());
    }

    #[test]
    fn tree_without_skips_excluded_dir() {
        let project = TestProject::new()
            .with_file("keep.txt", "k")
            .with_file(".snapvc/entry.json", "{}")
            .with_file(".snapvc-other/kept.txt", "k")
            .build();

        assert_eq!(project.tree().len(), 3);
        assert_eq!(
            project.file_list_without(".snapvc"),
            vec![PathBuf::from(".snapvc-other/kept.txt"), PathBuf::from("keep.txt")]
        );
    }

    #[test]
    fn write_and_delete() {
        let project = TestProject::new().build();
        project.write_file("x/y.txt", "y");
        assert!(project.file_exists("x/y.txt"));
        project.delete_file("x/y.txt");
        assert!(!project.file_exists("x/y.txt"));
    }
}
