//! Synthetic directories derived from channel paths.
//!
//! The manifest only names channels, e.g. `/data/in/0` and `/data/log`. The
//! directories `/`, `/data` and `/data/in` are implied by those names and
//! get their own handles, placed right after the last channel handle.
use std::collections::BTreeSet;

use crate::channel::{ChannelItem, HANDLE_CLOSED};
use crate::registry::ChannelRegistry;

/// One implied directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub path: String,
    pub handle: i32,
    /// Immediate subdirectories plus `.` and the entry in the parent.
    pub nlink: u32,
    pub flags: i32,
}

impl DirEntry {
    pub fn is_open(&self) -> bool {
        self.flags >= 0
    }
}

/// One element of a directory listing.
#[derive(Debug, Clone, Copy)]
pub enum DirChild<'a> {
    Dir(&'a DirEntry),
    Channel(i32, &'a ChannelItem),
}

impl<'a> DirChild<'a> {
    pub fn handle(&self) -> i32 {
        match self {
            DirChild::Dir(dir) => dir.handle,
            DirChild::Channel(handle, _) => *handle,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, DirChild::Dir(_))
    }

    /// Last path segment, as listed in the parent.
    pub fn name(&self) -> &'a str {
        let path = match self {
            DirChild::Dir(dir) => dir.path.as_str(),
            DirChild::Channel(_, item) => item.name(),
        };
        path.rsplit('/').next().unwrap_or(path)
    }
}

/// Returns the single segment `path` adds to `parent`, or `None` when `path`
/// is not an immediate child of `parent`.
pub fn child_name<'a>(parent: &str, path: &'a str) -> Option<&'a str> {
    let rest = if parent == "/" {
        path.strip_prefix('/')?
    } else {
        path.strip_prefix(parent)?.strip_prefix('/')?
    };
    if rest.is_empty() || rest.contains('/') {
        None
    } else {
        Some(rest)
    }
}

/// Every proper prefix of `path` that ends right before a `/`.
fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('/')
        .map(move |(i, _)| &path[..i])
        .filter(|prefix| !prefix.is_empty() && !prefix.ends_with('/'))
}

#[derive(Debug, Clone, Default)]
pub struct ManifestDirs {
    dirs: Vec<DirEntry>,
}

impl ManifestDirs {
    /// Collects the directories implied by every channel name. Handles are
    /// assigned in ascending path order starting at the channel count.
    pub fn from_channels(registry: &ChannelRegistry) -> Self {
        let mut paths: BTreeSet<&str> = BTreeSet::new();
        paths.insert("/");
        for (_, item) in registry.iter() {
            paths.extend(ancestors(item.name()));
        }

        let first_handle = registry.count() as i32;
        let dirs = paths
            .iter()
            .enumerate()
            .map(|(i, path)| {
                let subdirs = paths
                    .iter()
                    .filter(|other| child_name(path, other).is_some())
                    .count() as u32;
                DirEntry {
                    path: path.to_string(),
                    handle: first_handle + i as i32,
                    nlink: subdirs + 2,
                    flags: HANDLE_CLOSED,
                }
            })
            .collect();
        ManifestDirs { dirs }
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DirEntry> {
        self.dirs.iter()
    }

    /// Lookup by path. A trailing slash is ignored, so `/data/` finds `/data`.
    pub fn match_dir(&self, path: &str) -> Option<&DirEntry> {
        let path = normalize(path);
        self.dirs.iter().find(|d| d.path == path)
    }

    pub fn match_dir_mut(&mut self, path: &str) -> Option<&mut DirEntry> {
        let path = normalize(path);
        self.dirs.iter_mut().find(|d| d.path == path)
    }

    pub fn match_handle(&self, handle: i32) -> Option<&DirEntry> {
        self.dirs.iter().find(|d| d.handle == handle)
    }

    pub fn match_handle_mut(&mut self, handle: i32) -> Option<&mut DirEntry> {
        self.dirs.iter_mut().find(|d| d.handle == handle)
    }

    /// The `index`-th entry of directory `dir_handle`: subdirectories in path
    /// order first, then channels in handle order. `None` past the end or for
    /// an unknown directory.
    pub fn list<'a>(
        &'a self,
        registry: &'a ChannelRegistry,
        dir_handle: i32,
        index: usize,
    ) -> Option<DirChild<'a>> {
        let parent = self.match_handle(dir_handle)?.path.as_str();
        let dirs = self
            .dirs
            .iter()
            .filter(move |d| child_name(parent, &d.path).is_some())
            .map(DirChild::Dir);
        let channels = registry
            .iter()
            .filter(move |(_, item)| child_name(parent, item.name()).is_some())
            .map(|(handle, item)| DirChild::Channel(handle, item));
        dirs.chain(channels).nth(index)
    }
}

fn normalize(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    }
}
