//! persist::schema
//!
//! The `.ft` file schema (v1).
//!
//! # Schema Design
//!
//! A saved tree is a single self-describing JSON document:
//! - Self-describing with `kind` and `schema_version`
//! - Strictly parsed (unknown fields rejected)
//! - Payload integrity guarded by a SHA-256 checksum
//!
//! # Reachable-Set Compaction
//!
//! The payload holds exactly the persons reachable from the root, with
//! ids remapped to a dense range. Sequence handles survive remapping, so
//! two persons that aliased one children sequence in memory still alias
//! one sequence after a round-trip. Records that became unreachable (for
//! example after the root was replaced) are not written at all.
//!
//! # Example
//!
//! ```
//! use lignage::core::tree::FamilyTree;
//! use lignage::core::types::Gender;
//! use lignage::persist::schema::{parse_tree_file, TreeFileV1, FILE_KIND};
//!
//! let mut tree = FamilyTree::new();
//! let jean = tree.add_person("Jean", "Dupont", Gender::Male, None).unwrap();
//! tree.set_root(jean);
//!
//! let file = TreeFileV1::snapshot(&tree).unwrap();
//! assert_eq!(file.kind, FILE_KIND);
//!
//! // Serialize and parse back
//! let json = serde_json::to_string(&file).unwrap();
//! let parsed = parse_tree_file(&json).unwrap();
//! let restored = parsed.into_tree().unwrap();
//! assert_eq!(restored.person(restored.root().unwrap()).display_name(), "♂ Jean Dupont");
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::person::Person;
use crate::core::tree::FamilyTree;
use crate::core::types::{Checksum, Gender, ListId, PersonId, UtcTimestamp};

/// The kind identifier for family tree files.
pub const FILE_KIND: &str = "lignage.family-tree";

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors from file schema operations.
#[derive(Debug, Error, PartialEq)]
pub enum FileError {
    #[error("failed to parse family tree file: {0}")]
    Parse(String),

    #[error("invalid kind '{found}', expected '{}'", FILE_KIND)]
    InvalidKind { found: String },

    #[error("unsupported schema version {0}, supported: {SCHEMA_VERSION}")]
    UnsupportedVersion(u32),

    #[error("checksum mismatch: expected {expected}, found {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("invalid file value: {0}")]
    InvalidValue(String),
}

/// Envelope for version dispatch before full parsing.
///
/// This allows us to check the kind and schema version before attempting
/// to parse the full document.
#[derive(Debug, Deserialize)]
struct FileEnvelope {
    kind: String,
    schema_version: u32,
}

/// Parse and fully validate a family tree file.
///
/// The kind and schema version are checked first, then the document is
/// parsed strictly, the payload checksum is verified, and the decoded
/// tables are validated against the graph invariants. A successful parse
/// therefore always yields an installable tree.
///
/// # Errors
///
/// Returns an error if:
/// - The JSON is malformed or contains unknown fields
/// - The `kind` field doesn't match [`FILE_KIND`]
/// - The `schema_version` is not supported
/// - The checksum doesn't match the payload
/// - The tables violate a graph invariant (out-of-range ids, a male
///   mother, duplicate sequence entries, ...)
pub fn parse_tree_file(json: &str) -> Result<TreeFileV1, FileError> {
    // First, extract the envelope to check kind and version
    let envelope: FileEnvelope =
        serde_json::from_str(json).map_err(|e| FileError::Parse(e.to_string()))?;

    if envelope.kind != FILE_KIND {
        return Err(FileError::InvalidKind {
            found: envelope.kind,
        });
    }

    match envelope.schema_version {
        1 => {
            let file: TreeFileV1 =
                serde_json::from_str(json).map_err(|e| FileError::Parse(e.to_string()))?;
            file.verify_checksum()?;
            file.tree.validate()?;
            Ok(file)
        }
        v => Err(FileError::UnsupportedVersion(v)),
    }
}

/// A family tree file (v1).
///
/// This is the complete document stored in a `.ft` file. Use
/// [`parse_tree_file`] to parse from JSON with validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TreeFileV1 {
    /// Kind identifier (always "lignage.family-tree")
    pub kind: String,

    /// Schema version (always 1 for this struct)
    pub schema_version: u32,

    /// When the file was written (informational)
    pub saved_at: UtcTimestamp,

    /// SHA-256 over the serialized payload
    pub checksum: Checksum,

    /// The compacted tree payload
    pub tree: TreeSnapshot,
}

impl TreeFileV1 {
    /// Capture a tree into a file document, compacting to the reachable
    /// set and stamping the payload checksum.
    ///
    /// # Errors
    ///
    /// Returns [`FileError::Parse`] if the payload cannot be serialized
    /// for checksumming.
    pub fn snapshot(tree: &FamilyTree) -> Result<Self, FileError> {
        let snapshot = TreeSnapshot::compact(tree);
        let checksum = snapshot.checksum()?;
        Ok(Self {
            kind: FILE_KIND.to_string(),
            schema_version: SCHEMA_VERSION,
            saved_at: UtcTimestamp::now(),
            checksum,
            tree: snapshot,
        })
    }

    /// Verify that the stored checksum matches the payload.
    pub fn verify_checksum(&self) -> Result<(), FileError> {
        let actual = self.tree.checksum()?;
        if actual != self.checksum {
            return Err(FileError::ChecksumMismatch {
                expected: self.checksum.as_str().to_string(),
                actual: actual.as_str().to_string(),
            });
        }
        Ok(())
    }

    /// Consume the document and rebuild the tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the checksum or a graph invariant fails (both
    /// already checked by [`parse_tree_file`]; this re-checks so the
    /// conversion is safe on documents built by hand).
    pub fn into_tree(self) -> Result<FamilyTree, FileError> {
        self.verify_checksum()?;
        self.tree.into_tree()
    }
}

/// The compacted tree payload: persons, shared sequences, root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TreeSnapshot {
    /// Index of the root person, absent for an empty tree
    pub root: Option<PersonId>,

    /// Person records, indexed by [`PersonId`]
    pub persons: Vec<Person>,

    /// Shared child/sibling sequences, indexed by [`ListId`]
    pub lists: Vec<Vec<PersonId>>,
}

impl TreeSnapshot {
    /// Compact a tree to its reachable set.
    ///
    /// Persons are emitted in breadth-first order from the root (so a
    /// non-empty snapshot always has `root == Some(0)`), relationship
    /// fields are remapped, and only sequences referenced by a reachable
    /// person are kept - with their sharing structure intact.
    pub fn compact(tree: &FamilyTree) -> Self {
        let reachable = tree.reachable_from_root();

        let person_map: HashMap<PersonId, PersonId> = reachable
            .iter()
            .enumerate()
            .map(|(index, id)| (*id, PersonId(index)))
            .collect();

        let mut list_map: HashMap<ListId, ListId> = HashMap::new();
        let mut lists: Vec<Vec<PersonId>> = Vec::new();
        let mut remap_list = |old: ListId| -> ListId {
            *list_map.entry(old).or_insert_with(|| {
                let members = tree
                    .list(old)
                    .iter()
                    .map(|member| person_map[member])
                    .collect();
                lists.push(members);
                ListId(lists.len() - 1)
            })
        };

        let persons = reachable
            .iter()
            .map(|id| {
                let record = tree.person(*id);
                Person {
                    given_names: record.given_names.clone(),
                    family_name: record.family_name.clone(),
                    maiden_name: record.maiden_name.clone(),
                    gender: record.gender,
                    mother: record.mother.map(|m| person_map[&m]),
                    father: record.father.map(|f| person_map[&f]),
                    spouse: record.spouse.map(|s| person_map[&s]),
                    children: remap_list(record.children),
                    siblings: remap_list(record.siblings),
                }
            })
            .collect();

        Self {
            root: if reachable.is_empty() {
                None
            } else {
                Some(PersonId(0))
            },
            persons,
            lists,
        }
    }

    /// Compute the payload checksum over the canonical JSON form.
    pub fn checksum(&self) -> Result<Checksum, FileError> {
        let bytes = serde_json::to_vec(self).map_err(|e| FileError::Parse(e.to_string()))?;
        Ok(Checksum::compute(&bytes))
    }

    /// Validate the tables against the graph invariants.
    ///
    /// This checks that:
    /// - The root and every relationship index is in range
    /// - Every sequence handle is in range
    /// - A mother is female, a father is male, spouses have opposite
    ///   genders
    /// - No sequence contains a duplicate or out-of-range entry
    /// - A maiden name only appears on a female person
    pub fn validate(&self) -> Result<(), FileError> {
        let persons = self.persons.len();
        let lists = self.lists.len();

        let check_person = |label: &str, id: PersonId| -> Result<(), FileError> {
            if id.index() >= persons {
                return Err(FileError::InvalidValue(format!(
                    "{label} index {id} out of range"
                )));
            }
            Ok(())
        };

        if let Some(root) = self.root {
            check_person("root", root)?;
        }

        for (index, person) in self.persons.iter().enumerate() {
            if let Some(mother) = person.mother {
                check_person("mother", mother)?;
                if self.persons[mother.index()].gender != Gender::Female {
                    return Err(FileError::InvalidValue(format!(
                        "mother of person {index} is not female"
                    )));
                }
            }
            if let Some(father) = person.father {
                check_person("father", father)?;
                if self.persons[father.index()].gender != Gender::Male {
                    return Err(FileError::InvalidValue(format!(
                        "father of person {index} is not male"
                    )));
                }
            }
            if let Some(spouse) = person.spouse {
                check_person("spouse", spouse)?;
                if self.persons[spouse.index()].gender == person.gender {
                    return Err(FileError::InvalidValue(format!(
                        "spouse of person {index} has the same gender"
                    )));
                }
            }
            if person.maiden_name.is_some() && person.gender != Gender::Female {
                return Err(FileError::InvalidValue(format!(
                    "maiden name on non-female person {index}"
                )));
            }
            for (label, list) in [("children", person.children), ("siblings", person.siblings)] {
                if list.index() >= lists {
                    return Err(FileError::InvalidValue(format!(
                        "{label} sequence {list} of person {index} out of range"
                    )));
                }
            }
        }

        for (index, list) in self.lists.iter().enumerate() {
            let mut seen = std::collections::HashSet::new();
            for member in list {
                check_person("sequence member", *member)?;
                if !seen.insert(member) {
                    return Err(FileError::InvalidValue(format!(
                        "sequence {index} contains person {member} twice"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Consume the validated payload and build the tree.
    fn into_tree(self) -> Result<FamilyTree, FileError> {
        self.validate()?;
        Ok(FamilyTree::from_parts(self.persons, self.lists, self.root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RelativeKind;

    fn dupont_tree() -> FamilyTree {
        let mut tree = FamilyTree::new();
        let jean = tree
            .add_person("Jean", "Dupont", Gender::Male, None)
            .unwrap();
        tree.set_root(jean);
        let marie = tree
            .add_person("Marie", "Curie", Gender::Female, Some("Skłodowska"))
            .unwrap();
        tree.attach_relative(jean, RelativeKind::Spouse, marie)
            .unwrap();
        let paul = tree
            .add_person("Paul", "Dupont", Gender::Male, None)
            .unwrap();
        tree.attach_relative(jean, RelativeKind::Child, paul)
            .unwrap();
        tree
    }

    mod snapshot {
        use super::*;

        #[test]
        fn kind_and_version_stamped() {
            let file = TreeFileV1::snapshot(&dupont_tree()).unwrap();
            assert_eq!(file.kind, FILE_KIND);
            assert_eq!(file.schema_version, SCHEMA_VERSION);
            file.verify_checksum().unwrap();
        }

        #[test]
        fn empty_tree() {
            let file = TreeFileV1::snapshot(&FamilyTree::new()).unwrap();
            assert_eq!(file.tree.root, None);
            assert!(file.tree.persons.is_empty());
            assert!(file.tree.lists.is_empty());
        }

        #[test]
        fn root_compacts_to_zero() {
            let file = TreeFileV1::snapshot(&dupont_tree()).unwrap();
            assert_eq!(file.tree.root, Some(PersonId(0)));
            assert_eq!(file.tree.persons.len(), 3);
        }

        #[test]
        fn unreachable_records_dropped() {
            let mut tree = dupont_tree();
            tree.add_person("Zoe", "Durand", Gender::Female, None)
                .unwrap();
            let file = TreeFileV1::snapshot(&tree).unwrap();
            assert_eq!(file.tree.persons.len(), 3);
        }

        #[test]
        fn sequence_sharing_survives_compaction() {
            let file = TreeFileV1::snapshot(&dupont_tree()).unwrap();
            let root = &file.tree.persons[0];
            let spouse = &file.tree.persons[root.spouse().unwrap().index()];
            assert_eq!(root.children_list(), spouse.children_list());
            assert_eq!(root.siblings_list(), spouse.siblings_list());
        }
    }

    mod roundtrip {
        use super::*;

        #[test]
        fn parse_back_equals() {
            let tree = dupont_tree();
            let file = TreeFileV1::snapshot(&tree).unwrap();
            let json = serde_json::to_string_pretty(&file).unwrap();
            let parsed = parse_tree_file(&json).unwrap();
            assert_eq!(file, parsed);

            let restored = parsed.into_tree().unwrap();
            let root = restored.root().unwrap();
            assert_eq!(restored.person(root).display_name(), "♂ Jean Dupont");
            let spouse = restored.person(root).spouse().unwrap();
            assert_eq!(
                restored.person(spouse).display_name(),
                "♀ Marie Curie (Skłodowska)"
            );
            assert_eq!(restored.children(root), restored.children(spouse));
        }
    }

    mod corruption {
        use super::*;

        fn valid_json() -> String {
            serde_json::to_string(&TreeFileV1::snapshot(&dupont_tree()).unwrap()).unwrap()
        }

        #[test]
        fn malformed_json() {
            let json = valid_json();
            let truncated: String = json.chars().take(json.chars().count() / 2).collect();
            assert!(matches!(
                parse_tree_file(&truncated),
                Err(FileError::Parse(_))
            ));
        }

        #[test]
        fn invalid_kind() {
            let json = r#"{ "kind": "wrong-kind", "schema_version": 1 }"#;
            assert!(matches!(
                parse_tree_file(json),
                Err(FileError::InvalidKind { .. })
            ));
        }

        #[test]
        fn unsupported_version() {
            let json = r#"{ "kind": "lignage.family-tree", "schema_version": 99 }"#;
            assert!(matches!(
                parse_tree_file(json),
                Err(FileError::UnsupportedVersion(99))
            ));
        }

        #[test]
        fn unknown_fields_rejected() {
            let json = valid_json();
            let with_extra = json.replacen("{", "{ \"extra\": true, ", 1);
            assert!(matches!(
                parse_tree_file(&with_extra),
                Err(FileError::Parse(_))
            ));
        }

        #[test]
        fn tampered_payload_fails_checksum() {
            let json = valid_json();
            let tampered = json.replace("Paul", "Saul");
            assert!(matches!(
                parse_tree_file(&tampered),
                Err(FileError::ChecksumMismatch { .. })
            ));
        }
    }

    mod validate {
        use super::*;

        fn snapshot_of(tree: &FamilyTree) -> TreeSnapshot {
            TreeSnapshot::compact(tree)
        }

        #[test]
        fn valid_snapshot_passes() {
            snapshot_of(&dupont_tree()).validate().unwrap();
        }

        #[test]
        fn out_of_range_root() {
            let mut snapshot = snapshot_of(&dupont_tree());
            snapshot.root = Some(PersonId(99));
            assert!(matches!(
                snapshot.validate(),
                Err(FileError::InvalidValue(_))
            ));
        }

        #[test]
        fn out_of_range_link() {
            let mut snapshot = snapshot_of(&dupont_tree());
            snapshot.persons[2].father = Some(PersonId(42));
            assert!(matches!(
                snapshot.validate(),
                Err(FileError::InvalidValue(_))
            ));
        }

        #[test]
        fn wrong_gender_mother() {
            let mut snapshot = snapshot_of(&dupont_tree());
            // Point the child's mother at the (male) root.
            snapshot.persons[2].mother = Some(PersonId(0));
            assert!(matches!(
                snapshot.validate(),
                Err(FileError::InvalidValue(_))
            ));
        }

        #[test]
        fn same_gender_spouse() {
            let mut snapshot = snapshot_of(&dupont_tree());
            snapshot.persons[0].spouse = Some(PersonId(2));
            assert!(matches!(
                snapshot.validate(),
                Err(FileError::InvalidValue(_))
            ));
        }

        #[test]
        fn duplicate_sequence_entry() {
            let mut snapshot = snapshot_of(&dupont_tree());
            let member = snapshot.lists[0].first().copied();
            if let Some(member) = member {
                snapshot.lists[0].push(member);
            } else {
                snapshot.lists[0] = vec![PersonId(2), PersonId(2)];
            }
            assert!(matches!(
                snapshot.validate(),
                Err(FileError::InvalidValue(_))
            ));
        }

        #[test]
        fn maiden_name_on_male() {
            let mut snapshot = snapshot_of(&dupont_tree());
            let maiden = snapshot.persons[1].maiden_name.clone();
            snapshot.persons[0].maiden_name = maiden;
            assert!(matches!(
                snapshot.validate(),
                Err(FileError::InvalidValue(_))
            ));
        }
    }
}
