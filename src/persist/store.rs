//! persist::store
//!
//! Save and load family trees over byte sinks and sources.
//!
//! # Architecture
//!
//! The store is a thin layer over the schema: [`save`] captures a
//! validated, checksummed [`TreeFileV1`] and writes it as JSON;
//! [`load`] reads bytes, parses strictly, and rebuilds the tree. Path
//! helpers cover the common case of `.ft` files on disk.
//!
//! Corrupt input - non-UTF-8 bytes, malformed JSON, a wrong kind or
//! version, a failed checksum, or tables violating the graph invariants -
//! surfaces as [`StoreError::Corrupt`]; filesystem failures surface as
//! [`StoreError::Io`].
//!
//! # Example
//!
//! ```
//! use lignage::core::tree::FamilyTree;
//! use lignage::core::types::Gender;
//! use lignage::persist::store;
//!
//! let mut tree = FamilyTree::new();
//! let jean = tree.add_person("Jean", "Dupont", Gender::Male, None).unwrap();
//! tree.set_root(jean);
//!
//! let mut buffer = Vec::new();
//! store::save(&tree, &mut buffer).unwrap();
//!
//! let loaded = store::load(buffer.as_slice()).unwrap();
//! assert_eq!(loaded, tree);
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::schema::{parse_tree_file, FileError, TreeFileV1};
use crate::core::tree::FamilyTree;

/// File extension for saved family trees.
pub const FILE_EXTENSION: &str = "ft";

/// Errors from save/load operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The bytes are not a valid family tree file.
    #[error("corrupt family tree file: {0}")]
    Corrupt(#[from] FileError),

    /// The underlying reader or writer failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize the tree's reachable set into a writer.
///
/// # Errors
///
/// - [`StoreError::Corrupt`] if the payload cannot be serialized
/// - [`StoreError::Io`] if the writer fails
pub fn save<W: Write>(tree: &FamilyTree, mut writer: W) -> Result<(), StoreError> {
    let file = TreeFileV1::snapshot(tree)?;
    let json =
        serde_json::to_string_pretty(&file).map_err(|e| FileError::Parse(e.to_string()))?;
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;

    debug!(persons = file.tree.persons.len(), "family tree saved");
    Ok(())
}

/// Read a family tree from a reader.
///
/// # Errors
///
/// - [`StoreError::Corrupt`] if the bytes are not UTF-8, the document is
///   malformed, the checksum fails, or the tables violate an invariant
/// - [`StoreError::Io`] if the reader fails
pub fn load<R: Read>(mut reader: R) -> Result<FamilyTree, StoreError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let json = String::from_utf8(bytes)
        .map_err(|_| FileError::Parse("file is not valid UTF-8".into()))?;

    let file = parse_tree_file(&json)?;
    let tree = file.into_tree()?;

    debug!(persons = tree.person_count(), "family tree loaded");
    Ok(tree)
}

/// Save the tree to a file path.
///
/// The path is used as given; call [`ensure_extension`] first to append
/// the `.ft` extension to a user-chosen name that lacks it.
pub fn save_to_path(tree: &FamilyTree, path: impl AsRef<Path>) -> Result<(), StoreError> {
    let file = File::create(path.as_ref())?;
    save(tree, BufWriter::new(file))
}

/// Load a tree from a file path.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<FamilyTree, StoreError> {
    let file = File::open(path.as_ref())?;
    load(BufReader::new(file))
}

/// Append the `.ft` extension unless the path already carries it.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use lignage::persist::store::ensure_extension;
///
/// assert_eq!(ensure_extension(Path::new("dupont")), Path::new("dupont.ft"));
/// assert_eq!(ensure_extension(Path::new("dupont.ft")), Path::new("dupont.ft"));
/// assert_eq!(ensure_extension(Path::new("v1.2")), Path::new("v1.2.ft"));
/// ```
pub fn ensure_extension(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == FILE_EXTENSION) {
        return path.to_path_buf();
    }
    let mut with_ext = path.as_os_str().to_os_string();
    with_ext.push(".");
    with_ext.push(FILE_EXTENSION);
    PathBuf::from(with_ext)
}
