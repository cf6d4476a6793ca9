//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`PersonName`] - Validated name component (given names, family name,
//!   maiden name)
//! - [`Gender`] - The two genders the model admits
//! - [`RelativeKind`] - Selector for relationship-attachment operations
//! - [`Attribute`] - Selector for presence queries
//! - [`PersonId`] / [`ListId`] - Stable arena indices
//! - [`UtcTimestamp`] - RFC3339 timestamp for file envelopes
//! - [`Checksum`] - SHA-256 payload hash for corruption detection
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use lignage::core::types::PersonName;
//!
//! // Valid constructions (input is trimmed first)
//! let name = PersonName::new("  Marie ").unwrap();
//! assert_eq!(name.as_str(), "Marie");
//!
//! // Any script, plus space, period, apostrophe, and hyphen
//! assert!(PersonName::new("Jean-Luc O'Neill Jr.").is_ok());
//! assert!(PersonName::new("Skłodowska").is_ok());
//!
//! // Invalid constructions fail at creation time
//! assert!(PersonName::new("R2D2").is_err());
//! assert!(PersonName::new("   ").is_err());
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid name: {0}")]
    InvalidName(String),
}

/// A validated name component.
///
/// Names are trimmed of leading and trailing whitespace, then checked
/// against the name alphabet:
/// - Letters in any script
/// - Space, period, apostrophe, hyphen
/// - At least one character after trimming
///
/// This admits names like `Aklam Moses Crack.` or `L'ourve D'Marche`
/// while rejecting digits and punctuation that never appears in a name.
///
/// # Example
///
/// ```
/// use lignage::core::types::PersonName;
///
/// let name = PersonName::new("de la Cruz").unwrap();
/// assert_eq!(name.as_str(), "de la Cruz");
///
/// assert!(PersonName::new("").is_err());
/// assert!(PersonName::new("x_y").is_err());
/// assert!(PersonName::new("4chan").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonName(String);

impl PersonName {
    /// Create a new validated name. The input is trimmed before validation.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidName` if the trimmed input is empty or
    /// contains a character outside the name alphabet.
    pub fn new(name: impl AsRef<str>) -> Result<Self, TypeError> {
        let name = name.as_ref().trim();
        Self::validate(name)?;
        Ok(Self(name.to_string()))
    }

    /// Validate a trimmed name against the name alphabet.
    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidName("name cannot be empty".into()));
        }

        for c in name.chars() {
            if !c.is_alphabetic() && !matches!(c, ' ' | '.' | '\'' | '-') {
                return Err(TypeError::InvalidName(format!(
                    "name cannot contain '{c}'"
                )));
            }
        }

        Ok(())
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PersonName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<PersonName> for String {
    fn from(name: PersonName) -> Self {
        name.0
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PersonName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two genders the model admits.
///
/// Fixed at construction; the relationship rules (mother is female, father
/// is male, spouses have opposite genders) assume it never changes once
/// relationships exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// The display glyph used by [`display_name`](crate::core::person::Person::display_name).
    pub fn glyph(self) -> &'static str {
        match self {
            Gender::Male => "\u{2642}",
            Gender::Female => "\u{2640}",
        }
    }

    /// The other gender.
    pub fn opposite(self) -> Self {
        match self {
            Gender::Male => Gender::Female,
            Gender::Female => Gender::Male,
        }
    }
}

/// Selector for relationship-attachment operations.
///
/// See [`FamilyTree::attach_relative`](crate::core::tree::FamilyTree::attach_relative).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelativeKind {
    Father,
    Mother,
    Child,
    Sibling,
    Spouse,
}

impl std::fmt::Display for RelativeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RelativeKind::Father => "father",
            RelativeKind::Mother => "mother",
            RelativeKind::Child => "child",
            RelativeKind::Sibling => "sibling",
            RelativeKind::Spouse => "spouse",
        };
        write!(f, "{s}")
    }
}

/// Selector for presence queries.
///
/// See [`FamilyTree::has_attribute`](crate::core::tree::FamilyTree::has_attribute).
/// `Parents` is true iff `Father` or `Mother` is; the sequence attributes
/// are true iff the sequence is non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Father,
    Mother,
    Children,
    Spouse,
    MaidenName,
    Parents,
    Siblings,
}

/// Stable index of a person in a [`FamilyTree`](crate::core::tree::FamilyTree) arena.
///
/// Ids are only issued by `add_person` and are valid for the tree that
/// issued them; using an id against a different tree is a caller bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub(crate) usize);

impl PersonId {
    /// The position of this person in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for PersonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable index of a shared child/sibling sequence in a tree arena.
///
/// Two persons holding the same `ListId` alias the same underlying
/// sequence: an append through one is visible through the other. Equality
/// of handles is therefore the aliasing test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(pub(crate) usize);

impl ListId {
    /// The position of this sequence in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ListId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A UTC timestamp in RFC3339 format.
///
/// # Example
///
/// ```
/// use lignage::core::types::UtcTimestamp;
///
/// let now = UtcTimestamp::now();
/// assert!(now.to_string().contains('T'));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtcTimestamp(chrono::DateTime<chrono::Utc>);

impl UtcTimestamp {
    /// Create a timestamp for the current moment.
    pub fn now() -> Self {
        Self(chrono::Utc::now())
    }

    /// Create a timestamp from a chrono DateTime.
    pub fn from_datetime(dt: chrono::DateTime<chrono::Utc>) -> Self {
        Self(dt)
    }

    /// Get the underlying datetime.
    pub fn as_datetime(&self) -> &chrono::DateTime<chrono::Utc> {
        &self.0
    }
}

impl std::fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// A SHA-256 hash over serialized tree payload bytes.
///
/// Stored in the file envelope and recomputed on load; a mismatch means
/// the payload was altered after it was written.
///
/// # Example
///
/// ```
/// use lignage::core::types::Checksum;
///
/// let a = Checksum::compute(b"the same bytes");
/// let b = Checksum::compute(b"the same bytes");
/// assert_eq!(a, b);
///
/// let c = Checksum::compute(b"different bytes");
/// assert_ne!(a, c);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Compute the checksum of a byte slice.
    pub fn compute(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hex::encode(hasher.finalize()))
    }

    /// Get the checksum as a hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Checksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
