//! An in-kernel debug filesystem.
//!
//! Debugfs holds directories and small attribute files that drivers create
//! to expose knobs for bring-up and validation. Every file is a
//! [`SimpleAttribute`]: its content is a single `u64`, read as decimal
//! text and written as decimal, hex or octal text.
//!
//! Directories own their children. Removing a directory with
//! [`Debugfs::remove_recursive()`] detaches the whole subtree, and any
//! [`FileRef`] still held to a removed file fails with [`Errno::Io`].

#![no_std]

extern crate alloc;

use alloc::{
    collections::BTreeMap,
    format,
    string::{String, ToString},
    sync::{Arc, Weak},
    vec::Vec,
};
use bitflags::bitflags;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use errno::{Errno, Result};
use log::{debug, trace};
use spin::{Mutex, Once};

mod attr;
pub use attr::*;


bitflags! {
    /// Unix permission bits of a debugfs file.
    pub struct Mode: u16 {
        const OWNER_READ  = 0o400;
        const OWNER_WRITE = 0o200;
        const GROUP_READ  = 0o040;
        const GROUP_WRITE = 0o020;
        const OTHER_READ  = 0o004;
        const OTHER_WRITE = 0o002;
    }
}

/// A strong reference to a directory.
pub type DirRef = Arc<Mutex<DebugDir>>;
/// A weak reference to a directory, as held by its children.
pub type WeakDirRef = Weak<Mutex<DebugDir>>;
/// A strong reference to a file.
pub type FileRef = Arc<DebugFile>;

/// Either kind of debugfs node.
#[derive(Clone)]
pub enum FileOrDir {
    File(FileRef),
    Dir(DirRef),
}

impl FileOrDir {
    pub fn name(&self) -> String {
        match self {
            FileOrDir::File(f) => f.name().to_string(),
            FileOrDir::Dir(d) => d.lock().name().to_string(),
        }
    }
}

/// A debugfs directory.
pub struct DebugDir {
    name: String,
    parent: Option<WeakDirRef>,
    children: BTreeMap<String, FileOrDir>,
}

impl DebugDir {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<DirRef> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    pub fn get_child(&self, name: &str) -> Option<FileOrDir> {
        self.children.get(name).cloned()
    }

    /// Returns the names of this directory's children, in sorted order.
    pub fn list_children(&self) -> Vec<String> {
        self.children.keys().cloned().collect()
    }

    fn insert_child(&mut self, name: &str, child: FileOrDir) -> Result<()> {
        if self.children.contains_key(name) {
            return Err(Errno::Exists);
        }
        self.children.insert(name.to_string(), child);
        Ok(())
    }
}

/// A debugfs attribute file.
pub struct DebugFile {
    name: String,
    mode: Mode,
    attr: Arc<dyn SimpleAttribute>,
    removed: AtomicBool,
}

impl DebugFile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    fn check_live(&self) -> Result<()> {
        if self.removed.load(Ordering::Acquire) {
            Err(Errno::Io)
        } else {
            Ok(())
        }
    }

    /// Reads the attribute as `"<decimal>\n"` into `buffer`,
    /// returning how many bytes were copied.
    pub fn read(&self, buffer: &mut [u8]) -> Result<usize> {
        self.check_live()?;
        if !self.mode.contains(Mode::OWNER_READ) {
            return Err(Errno::PermissionDenied);
        }
        let text = format!("{}\n", self.attr.get()?);
        let len = text.len().min(buffer.len());
        buffer[..len].copy_from_slice(&text.as_bytes()[..len]);
        Ok(len)
    }

    /// Reads the attribute into a new `String`.
    pub fn read_to_string(&self) -> Result<String> {
        let mut buf = [0u8; 24];
        let len = self.read(&mut buf)?;
        core::str::from_utf8(&buf[..len])
            .map(String::from)
            .map_err(|_| Errno::Io)
    }

    /// Parses `buffer` as an unsigned integer and stores it in the attribute.
    ///
    /// Returns the number of bytes consumed, which is all of them.
    pub fn write(&self, buffer: &[u8]) -> Result<usize> {
        self.check_live()?;
        if !self.mode.contains(Mode::OWNER_WRITE) {
            return Err(Errno::PermissionDenied);
        }
        let text = core::str::from_utf8(buffer).map_err(|_| Errno::InvalidArgs)?;
        let val = parse_u64(text)?;
        trace!("debugfs: {} <- {}", self.name, val);
        self.attr.set(val)?;
        Ok(buffer.len())
    }
}

/// A debugfs instance: a root directory and everything below it.
pub struct Debugfs {
    root: DirRef,
}

impl Debugfs {
    pub fn new() -> Self {
        Debugfs {
            root: Arc::new(Mutex::new(DebugDir {
                name: String::from("/"),
                parent: None,
                children: BTreeMap::new(),
            })),
        }
    }

    pub fn root(&self) -> &DirRef {
        &self.root
    }

    fn check_name(name: &str) -> Result<()> {
        if name.is_empty() || name.contains('/') {
            Err(Errno::InvalidArgs)
        } else {
            Ok(())
        }
    }

    /// Creates a directory `name` in `parent`, or in the root if `parent` is `None`.
    pub fn create_dir(&self, name: &str, parent: Option<&DirRef>) -> Result<DirRef> {
        Self::check_name(name)?;
        let parent = parent.unwrap_or(&self.root);
        let dir = Arc::new(Mutex::new(DebugDir {
            name: name.to_string(),
            parent: Some(Arc::downgrade(parent)),
            children: BTreeMap::new(),
        }));
        parent.lock().insert_child(name, FileOrDir::Dir(dir.clone()))?;
        debug!("debugfs: created directory {}", name);
        Ok(dir)
    }

    /// Creates an attribute file `name` in `parent` with the given `mode`.
    pub fn create_file(
        &self,
        name: &str,
        mode: Mode,
        parent: Option<&DirRef>,
        attr: Arc<dyn SimpleAttribute>,
    ) -> Result<FileRef> {
        Self::check_name(name)?;
        let parent = parent.unwrap_or(&self.root);
        let file = Arc::new(DebugFile {
            name: name.to_string(),
            mode,
            attr,
            removed: AtomicBool::new(false),
        });
        parent.lock().insert_child(name, FileOrDir::File(file.clone()))?;
        debug!("debugfs: created file {} ({:o})", name, mode.bits());
        Ok(file)
    }

    /// Creates a file exposing `value` directly.
    pub fn create_u64(
        &self,
        name: &str,
        mode: Mode,
        parent: Option<&DirRef>,
        value: &'static AtomicU64,
    ) -> Result<FileRef> {
        self.create_file(name, mode, parent, Arc::new(U64Attribute(value)))
    }

    /// Finds the node at `path`, relative to the root.
    pub fn lookup(&self, path: &str) -> Option<FileOrDir> {
        let mut node = FileOrDir::Dir(self.root.clone());
        for component in path.split('/').filter(|c| !c.is_empty()) {
            let next = match &node {
                FileOrDir::Dir(dir) => dir.lock().get_child(component)?,
                FileOrDir::File(_) => return None,
            };
            node = next;
        }
        Some(node)
    }

    /// Finds the file at `path`, relative to the root.
    pub fn lookup_file(&self, path: &str) -> Option<FileRef> {
        match self.lookup(path)? {
            FileOrDir::File(f) => Some(f),
            FileOrDir::Dir(_) => None,
        }
    }

    /// Removes `dir` and everything below it.
    ///
    /// The root can't be removed; only its children are dropped then.
    pub fn remove_recursive(&self, dir: &DirRef) {
        let parent = dir.lock().parent();
        if let Some(parent) = parent {
            let name = dir.lock().name.clone();
            parent.lock().children.remove(&name);
        }
        let name = dir.lock().name.clone();
        Self::mark_removed(dir);
        debug!("debugfs: removed {}", name);
    }

    fn mark_removed(dir: &DirRef) {
        let children = core::mem::take(&mut dir.lock().children);
        for (_, child) in children {
            match child {
                FileOrDir::File(f) => f.removed.store(true, Ordering::Release),
                FileOrDir::Dir(d) => Self::mark_removed(&d),
            }
        }
    }
}

impl Default for Debugfs {
    fn default() -> Self {
        Self::new()
    }
}

static DEBUGFS: Once<Debugfs> = Once::new();

/// Returns the system-wide debugfs.
pub fn debugfs() -> &'static Debugfs {
    DEBUGFS.call_once(Debugfs::new)
}
