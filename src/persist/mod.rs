//! persist
//!
//! Whole-tree persistence: the `.ft` file schema and save/load.
//!
//! # Modules
//!
//! - [`schema`] - Versioned file format, checksum, validation
//! - [`store`] - Save/load over readers and writers, path helpers
//!
//! # Design Principles
//!
//! - Files are self-describing and strictly parsed
//! - A load either yields a fully valid tree or a corruption error
//! - Saving persists exactly the reachable set, compacted

pub mod schema;
pub mod store;
