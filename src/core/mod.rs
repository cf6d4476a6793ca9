//! core
//!
//! Core domain types and operations for Lignage.
//!
//! # Modules
//!
//! - [`types`] - Strong types: PersonName, Gender, PersonId, etc.
//! - [`person`] - The person record and its attribute operations
//! - [`tree`] - The family tree arena and relationship operations
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Relationship slots are write-once; second writes fail, never silently
//! - Child and sibling sequences are shared by handle, not copied

pub mod person;
pub mod tree;
pub mod types;
