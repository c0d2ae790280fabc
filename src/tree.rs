//! The directory tree behind a [`ZipFs`](../fs/struct.ZipFs.html).
//!
//! A ZIP archive is a flat list of named entries. Directories only show up
//! when an archiver bothers to write an entry for them, which many don't.
//! We build a real tree once, up front, inserting a directory for every
//! path prefix, so every later lookup is a short walk from the root.
//!
//! Nodes live in an arena (a `Vec`) and refer to their children by index.
//! The tree is never modified after it's built.

use std::collections::BTreeMap;

use camino::Utf8Path;
use chrono::NaiveDateTime;
use log::*;

use crate::archive::ArchiveEntry;
use crate::path;
use crate::result::*;

/// Index of a node in the arena
type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug)]
enum NodeKind {
    Directory { children: BTreeMap<String, NodeId> },
    /// `entry` indexes the archive's entry list.
    File { size: u64, entry: usize },
}

/// A file or directory in the tree
#[derive(Debug)]
pub struct Node {
    name: String,
    modified: Option<NaiveDateTime>,
    kind: NodeKind,
}

impl Node {
    fn directory(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            modified: None,
            kind: NodeKind::Directory {
                children: BTreeMap::new(),
            },
        }
    }

    /// The last segment of the node's path. Empty for the root.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }

    /// Uncompressed size for files, zero for directories
    pub fn size(&self) -> u64 {
        match self.kind {
            NodeKind::File { size, .. } => size,
            NodeKind::Directory { .. } => 0,
        }
    }

    pub fn modified(&self) -> Option<NaiveDateTime> {
        self.modified
    }

    /// The index of the archive entry backing a file. Directories have none.
    pub fn entry(&self) -> Option<usize> {
        match self.kind {
            NodeKind::File { entry, .. } => Some(entry),
            NodeKind::Directory { .. } => None,
        }
    }
}

#[derive(Debug)]
pub struct Tree {
    /// `nodes[ROOT]` is the root directory.
    nodes: Vec<Node>,
}

impl Tree {
    /// Builds the tree from an archive's entries.
    ///
    /// - Every proper prefix of an entry's path becomes a directory,
    ///   whether or not the archive has an entry for it.
    /// - If two files share a path, the later entry wins.
    /// - If a file and a directory share a path, the directory wins and the
    ///   file is dropped, regardless of which came first.
    ///
    /// Entry names that climb out of the archive with `..` are rejected.
    pub fn build<E: ArchiveEntry>(entries: &[E]) -> FsResult<Self> {
        let mut tree = Tree {
            nodes: vec![Node::directory("")],
        };

        for (index, entry) in entries.iter().enumerate() {
            let name = entry.name();
            if path::has_parent_segment(name) {
                return Err(FsError::malformed(format!(
                    "Entry {} has a parent dir (..) in its path",
                    name
                )));
            }
            let canonical = path::normalize(name);
            if canonical.as_str().is_empty() {
                debug!("Ignoring entry {:?} for the archive root", name);
                continue;
            }

            if entry.is_dir() {
                let dir = tree.ensure_directories(&canonical);
                tree.nodes[dir].modified = entry.last_modified();
                debug!("Directory /{}", canonical);
            } else {
                tree.insert_file(&canonical, index, entry);
            }
        }

        debug!("Built tree of {} nodes", tree.nodes.len());
        Ok(tree)
    }

    /// Walks down `canonical` from the root, creating directories as needed.
    /// Returns the last one.
    fn ensure_directories(&mut self, canonical: &Utf8Path) -> NodeId {
        let mut current = ROOT;
        for segment in path::segments(canonical) {
            current = match self.child(current, segment) {
                Some(existing) if self.nodes[existing].is_dir() => existing,
                Some(file) => {
                    warn!(
                        "/{} is both a file and a directory in the archive; keeping the directory",
                        canonical
                    );
                    self.nodes[file] = Node::directory(segment);
                    file
                }
                None => self.add_child(current, Node::directory(segment)),
            };
        }
        current
    }

    fn insert_file<E: ArchiveEntry>(&mut self, canonical: &Utf8Path, index: usize, entry: &E) {
        let parent = self.ensure_directories(canonical.parent().unwrap_or(Utf8Path::new("")));
        let base = path::base_name(canonical);

        let file = Node {
            name: base.to_owned(),
            modified: entry.last_modified(),
            kind: NodeKind::File {
                size: entry.size(),
                entry: index,
            },
        };

        match self.child(parent, base) {
            Some(existing) if self.nodes[existing].is_dir() => {
                warn!(
                    "/{} is both a file and a directory in the archive; keeping the directory",
                    canonical
                );
            }
            Some(existing) => {
                debug!("Duplicate entry for /{}; using the later one", canonical);
                self.nodes[existing] = file;
            }
            None => {
                debug!("File /{} ({} bytes)", canonical, entry.size());
                self.add_child(parent, file);
            }
        }
    }

    fn child(&self, dir: NodeId, name: &str) -> Option<NodeId> {
        match &self.nodes[dir].kind {
            NodeKind::Directory { children } => children.get(name).copied(),
            NodeKind::File { .. } => None,
        }
    }

    fn add_child(&mut self, dir: NodeId, node: Node) -> NodeId {
        let id = self.nodes.len();
        let name = node.name.clone();
        self.nodes.push(node);
        if let NodeKind::Directory { children } = &mut self.nodes[dir].kind {
            children.insert(name, id);
        }
        id
    }

    /// Finds the node at a canonical path.
    ///
    /// Fails with `NotFound` if any segment is missing,
    /// including when an intermediate segment is a file.
    pub fn resolve(&self, canonical: &Utf8Path) -> FsResult<&Node> {
        let mut current = ROOT;
        for segment in path::segments(canonical) {
            current = self
                .child(current, segment)
                .ok_or_else(|| FsError::NotFound(canonical.to_owned()))?;
        }
        Ok(&self.nodes[current])
    }

    /// A directory's immediate children, sorted by name.
    /// Files have none.
    pub fn children<'t>(&'t self, node: &'t Node) -> impl Iterator<Item = &'t Node> + 't {
        let ids = match &node.kind {
            NodeKind::Directory { children } => Some(children.values()),
            NodeKind::File { .. } => None,
        };
        ids.into_iter().flatten().map(move |&id| &self.nodes[id])
    }

    /// Total number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}
