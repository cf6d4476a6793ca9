//! Lignage - A family tree data model for Rust
//!
//! Lignage models a genealogical family tree: a mutable graph of person
//! records connected by parent, spouse, child, and sibling relationships,
//! with rules that keep the graph biologically and structurally consistent,
//! and a save/load mechanism that persists the whole graph as a single
//! `.ft` file.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`core`](crate::core) - Domain types, the person record, and the tree arena
//! - [`persist`] - Versioned file schema and save/load operations
//!
//! Presentation concerns (forms, tree widgets, menus) are deliberately
//! absent: a UI layer consumes this crate by constructing persons,
//! invoking relationship operations, and re-deriving its view by walking
//! the tree from the root.
//!
//! # Correctness Invariants
//!
//! Lignage maintains the following invariants:
//!
//! 1. A person is never observable in an invalid state (names and maiden
//!    names are validated at construction)
//! 2. Mother, father, and spouse are write-once and gender-checked
//! 3. Children and sibling sequences never contain duplicates
//! 4. A loaded file is either a fully valid tree or a corruption error -
//!    never a partially applied state

pub mod core;
pub mod persist;
