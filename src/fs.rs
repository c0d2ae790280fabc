//! The filesystem view of an archive

use std::fmt;
use std::io;

use camino::Utf8PathBuf;
use chrono::NaiveDateTime;
use log::*;

use crate::archive::Archive;
use crate::file::{File, SeekStrategy};
use crate::path;
use crate::result::*;
use crate::tree::{Node, Tree};

/// What `stat` and friends report about a file or directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    name: String,
    is_dir: bool,
    size: u64,
    modified: Option<NaiveDateTime>,
}

impl Metadata {
    fn from_node(node: &Node) -> Self {
        Self {
            name: node.name().to_owned(),
            is_dir: node.is_dir(),
            size: node.size(),
            modified: node.modified(),
        }
    }

    /// The last segment of the path (`""` for the root)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// True for regular files, which is everything but directories.
    /// Archives have no links, devices, etc.
    pub fn is_file(&self) -> bool {
        !self.is_dir
    }

    /// Uncompressed size of a file. Always 0 for directories.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u64 {
        self.size
    }

    /// When the entry was last modified, if the archive says.
    /// Directories the archive didn't list explicitly have no time.
    pub fn modified(&self) -> Option<NaiveDateTime> {
        self.modified
    }
}

/// A read-only filesystem, as seen by things that serve or walk files.
pub trait FileSystem {
    type File<'a>: io::Read + io::Seek
    where
        Self: 'a;

    fn stat(&self, path: &str) -> FsResult<Metadata>;

    /// Like `stat`, but doesn't follow a final symbolic link.
    fn lstat(&self, path: &str) -> FsResult<Metadata>;

    fn read_dir(&self, path: &str) -> FsResult<Vec<Metadata>>;

    fn open(&self, path: &str) -> FsResult<Self::File<'_>>;
}

/// An archive, viewed as a read-only directory tree
///
/// Paths are slash-separated and may be written however the caller likes:
/// `/docs/intro.txt`, `docs/intro.txt`, and `//docs//intro.txt/` are the same file.
/// The root is `/`, `//`, or the empty string.
///
/// Building the tree is the only real work; everything afterwards is a lookup,
/// so a `ZipFs` can be shared between threads and used concurrently.
pub struct ZipFs<A> {
    archive: A,
    tree: Tree,
    name: String,
    seek_strategy: SeekStrategy,
}

impl<A: Archive> ZipFs<A> {
    /// Builds the directory tree for `archive`.
    ///
    /// Fails with [`FsError::MalformedArchive`] if the entries
    /// can't form a sane tree. No partially-built filesystem is returned.
    pub fn new(archive: A) -> FsResult<Self> {
        let tree = Tree::build(archive.entries())?;
        info!(
            "Indexed {} archive entries into {} files and directories",
            archive.entries().len(),
            tree.len()
        );
        Ok(Self {
            archive,
            tree,
            name: String::new(),
            seek_strategy: SeekStrategy::default(),
        })
    }

    /// Names the filesystem, e.g. after the archive's file, for display.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Sets how files opened from now on handle seeks.
    pub fn seek_strategy(mut self, strategy: SeekStrategy) -> Self {
        self.seek_strategy = strategy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn archive(&self) -> &A {
        &self.archive
    }

    fn lookup<P: AsRef<str>>(&self, path: P) -> FsResult<(Utf8PathBuf, &Node)> {
        let canonical = path::normalize(path.as_ref());
        let node = self.tree.resolve(&canonical)?;
        Ok((canonical, node))
    }

    pub fn stat<P: AsRef<str>>(&self, path: P) -> FsResult<Metadata> {
        let (_, node) = self.lookup(path)?;
        Ok(Metadata::from_node(node))
    }

    /// The same as [`stat()`](#method.stat): archives have no symbolic links.
    pub fn lstat<P: AsRef<str>>(&self, path: P) -> FsResult<Metadata> {
        self.stat(path)
    }

    /// Lists a directory's immediate children, sorted by name.
    pub fn read_dir<P: AsRef<str>>(&self, path: P) -> FsResult<Vec<Metadata>> {
        let (canonical, node) = self.lookup(path)?;
        if !node.is_dir() {
            return Err(FsError::NotADirectory(canonical));
        }
        Ok(self.tree.children(node).map(Metadata::from_node).collect())
    }

    /// Opens a file for reading.
    pub fn open<P: AsRef<str>>(&self, path: P) -> FsResult<File<'_, A>> {
        let (canonical, node) = self.lookup(path)?;
        let index = node
            .entry()
            .ok_or_else(|| FsError::IsADirectory(canonical.clone()))?;
        let entry = self.archive.entries().get(index).ok_or_else(|| {
            FsError::malformed(format!("Entry for /{} disappeared from the archive", canonical))
        })?;
        debug!("Opening /{} with {:?}", canonical, self.seek_strategy);
        File::open(
            &self.archive,
            entry,
            Metadata::from_node(node),
            self.seek_strategy,
        )
    }

    /// Reads a whole file into memory.
    pub fn read_file<P: AsRef<str>>(&self, path: P) -> FsResult<Vec<u8>> {
        self.open(path)?.read_remaining()
    }
}

impl<A: Archive> FileSystem for ZipFs<A> {
    type File<'a> = File<'a, A> where Self: 'a;

    fn stat(&self, path: &str) -> FsResult<Metadata> {
        ZipFs::stat(self, path)
    }

    fn lstat(&self, path: &str) -> FsResult<Metadata> {
        ZipFs::lstat(self, path)
    }

    fn read_dir(&self, path: &str) -> FsResult<Vec<Metadata>> {
        ZipFs::read_dir(self, path)
    }

    fn open(&self, path: &str) -> FsResult<Self::File<'_>> {
        ZipFs::open(self, path)
    }
}

impl<A> fmt::Display for ZipFs<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zipfs({})", self.name)
    }
}
