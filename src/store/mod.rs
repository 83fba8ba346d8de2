//! File access abstraction layer
//!
//! The editor never touches the filesystem directly. It goes through the
//! [DocumentStore] trait, which has two implementations:
//!
//! - [fs::FsStore]: real files under a root directory, written atomically
//! - [memory::MemoryStore]: an in-memory map for tests and previews
//!
//! ```rust
//! # use std::path::Path;
//! # use version_bump::store::{DocumentStore, MemoryStore};
//! # fn example() -> version_bump::Result<()> {
//! let store = MemoryStore::new();
//! store.insert("values.yaml", "image:\n  tag: 1.0\n");
//! let text = store.read(Path::new("values.yaml"))?;
//! assert!(text.contains("tag: 1.0"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod fs;
pub mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use std::path::Path;

use crate::error::Result;

/// Whole-file read and write of configuration documents
///
/// ## Error Handling
///
/// A missing file is always reported as
/// [FileNotFound](crate::error::BumpError::FileNotFound) so callers can tell
/// "the application was removed upstream" apart from real I/O failures.
pub trait DocumentStore: Send + Sync {
    /// Read the full text of a file
    fn read(&self, path: &Path) -> Result<String>;

    /// Replace the full text of a file.
    ///
    /// Either the whole new text is stored or the file is left as it was.
    fn write(&self, path: &Path, text: &str) -> Result<()>;

    fn exists(&self, path: &Path) -> bool;
}
