//! core::person
//!
//! The person record: identity attributes and relationship slots.
//!
//! # Record Design
//!
//! A `Person` is created fully formed through
//! [`FamilyTree::add_person`](crate::core::tree::FamilyTree::add_person) -
//! validation happens before the record exists, so a person is never
//! observable in an invalid state. Relationship slots (`mother`, `father`,
//! `spouse`) are write-once and only mutated by the tree's relationship
//! operations; the child and sibling sequences are held by handle
//! ([`ListId`]) into the tree's arena so that spouses and co-parents can
//! alias the same sequence.
//!
//! The record doubles as the persisted row: it serializes with strict
//! field checking and index-based links, exactly as it is stored in a
//! `.ft` file.

use serde::{Deserialize, Serialize};

use super::tree::TreeError;
use super::types::{Gender, ListId, PersonId, PersonName};

/// A single family member.
///
/// # Example
///
/// ```
/// use lignage::core::tree::FamilyTree;
/// use lignage::core::types::Gender;
///
/// let mut tree = FamilyTree::new();
/// let id = tree
///     .add_person("Marie", "Curie", Gender::Female, Some("Skłodowska"))
///     .unwrap();
///
/// let marie = tree.person(id);
/// assert_eq!(marie.given_names(), "Marie");
/// assert_eq!(marie.maiden_name(), Some("Skłodowska"));
/// assert_eq!(marie.display_name(), "♀ Marie Curie (Skłodowska)");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Person {
    pub(crate) given_names: PersonName,
    pub(crate) family_name: PersonName,
    pub(crate) maiden_name: Option<PersonName>,
    pub(crate) gender: Gender,
    pub(crate) mother: Option<PersonId>,
    pub(crate) father: Option<PersonId>,
    pub(crate) spouse: Option<PersonId>,
    pub(crate) children: ListId,
    pub(crate) siblings: ListId,
}

impl Person {
    /// Build a record from validated parts. Sequence handles are allocated
    /// by the owning tree.
    pub(crate) fn new(
        given_names: PersonName,
        family_name: PersonName,
        gender: Gender,
        maiden_name: Option<PersonName>,
        children: ListId,
        siblings: ListId,
    ) -> Self {
        Self {
            given_names,
            family_name,
            maiden_name,
            gender,
            mother: None,
            father: None,
            spouse: None,
            children,
            siblings,
        }
    }

    /// Validate a raw maiden-name input against the gender rule and the
    /// name alphabet. An empty (or all-whitespace) input clears the field.
    ///
    /// The gender rule is checked first: a non-female person cannot carry
    /// a maiden name, regardless of whether the value would otherwise be
    /// a valid name.
    pub(crate) fn parse_maiden_name(
        gender: Gender,
        value: &str,
    ) -> Result<Option<PersonName>, TreeError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }
        if gender != Gender::Female {
            return Err(TreeError::InvalidAttribute(
                "a maiden name is only valid for a female person".into(),
            ));
        }
        Ok(Some(PersonName::new(value)?))
    }

    /// The given names.
    pub fn given_names(&self) -> &str {
        self.given_names.as_str()
    }

    /// The family name.
    pub fn family_name(&self) -> &str {
        self.family_name.as_str()
    }

    /// The maiden name, if present.
    pub fn maiden_name(&self) -> Option<&str> {
        self.maiden_name.as_ref().map(PersonName::as_str)
    }

    /// The gender, fixed at construction.
    pub fn gender(&self) -> Gender {
        self.gender
    }

    /// The mother, if linked.
    pub fn mother(&self) -> Option<PersonId> {
        self.mother
    }

    /// The father, if linked.
    pub fn father(&self) -> Option<PersonId> {
        self.father
    }

    /// The spouse, if linked.
    pub fn spouse(&self) -> Option<PersonId> {
        self.spouse
    }

    /// Handle of the children sequence. Two persons with equal handles
    /// alias the same sequence.
    pub fn children_list(&self) -> ListId {
        self.children
    }

    /// Handle of the sibling sequence.
    pub fn siblings_list(&self) -> ListId {
        self.siblings
    }

    /// Replace the given names.
    ///
    /// # Errors
    ///
    /// Fails with the invalid-name error if the trimmed input violates
    /// the name alphabet.
    pub fn set_given_names(&mut self, value: &str) -> Result<(), TreeError> {
        self.given_names = PersonName::new(value)?;
        Ok(())
    }

    /// Replace the family name.
    ///
    /// # Errors
    ///
    /// Fails with the invalid-name error if the trimmed input violates
    /// the name alphabet.
    pub fn set_family_name(&mut self, value: &str) -> Result<(), TreeError> {
        self.family_name = PersonName::new(value)?;
        Ok(())
    }

    /// Set or clear the maiden name. An empty input clears the field.
    ///
    /// # Errors
    ///
    /// Fails with the invalid-attribute error on a non-female person
    /// (regardless of name validity), and with the invalid-name error if
    /// the value violates the name alphabet.
    pub fn set_maiden_name(&mut self, value: &str) -> Result<(), TreeError> {
        self.maiden_name = Self::parse_maiden_name(self.gender, value)?;
        Ok(())
    }

    /// A deterministic human-readable label: gender glyph, given names,
    /// family name, and the maiden name in parentheses when present.
    ///
    /// # Example
    ///
    /// ```
    /// use lignage::core::tree::FamilyTree;
    /// use lignage::core::types::Gender;
    ///
    /// let mut tree = FamilyTree::new();
    /// let id = tree.add_person("Jean", "Dupont", Gender::Male, None).unwrap();
    /// assert_eq!(tree.person(id).display_name(), "♂ Jean Dupont");
    /// ```
    pub fn display_name(&self) -> String {
        let mut label = format!(
            "{} {} {}",
            self.gender.glyph(),
            self.given_names,
            self.family_name
        );
        if let Some(maiden) = &self.maiden_name {
            label.push_str(&format!(" ({maiden})"));
        }
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(gender: Gender, maiden: Option<&str>) -> Person {
        Person::new(
            PersonName::new("Marie").unwrap(),
            PersonName::new("Curie").unwrap(),
            gender,
            maiden.map(|m| PersonName::new(m).unwrap()),
            ListId(0),
            ListId(1),
        )
    }

    mod display_name {
        use super::*;

        #[test]
        fn male_without_maiden_name() {
            let mut p = person(Gender::Male, None);
            p.set_given_names("Jean").unwrap();
            p.set_family_name("Dupont").unwrap();
            assert_eq!(p.display_name(), "♂ Jean Dupont");
        }

        #[test]
        fn female_with_maiden_name() {
            let p = person(Gender::Female, Some("Skłodowska"));
            assert_eq!(p.display_name(), "♀ Marie Curie (Skłodowska)");
        }

        #[test]
        fn female_without_maiden_name() {
            let p = person(Gender::Female, None);
            assert_eq!(p.display_name(), "♀ Marie Curie");
        }
    }

    mod maiden_name {
        use super::*;

        #[test]
        fn female_can_set() {
            let mut p = person(Gender::Female, None);
            p.set_maiden_name("Skłodowska").unwrap();
            assert_eq!(p.maiden_name(), Some("Skłodowska"));
        }

        #[test]
        fn male_rejected_even_with_valid_name() {
            let mut p = person(Gender::Male, None);
            let err = p.set_maiden_name("Skłodowska").unwrap_err();
            assert!(matches!(err, TreeError::InvalidAttribute(_)));
        }

        #[test]
        fn male_rejected_before_name_validation() {
            let mut p = person(Gender::Male, None);
            let err = p.set_maiden_name("not a name 123").unwrap_err();
            assert!(matches!(err, TreeError::InvalidAttribute(_)));
        }

        #[test]
        fn empty_clears() {
            let mut p = person(Gender::Female, Some("Skłodowska"));
            p.set_maiden_name("").unwrap();
            assert_eq!(p.maiden_name(), None);
            p.set_maiden_name("   ").unwrap();
            assert_eq!(p.maiden_name(), None);
        }

        #[test]
        fn empty_allowed_on_male() {
            let mut p = person(Gender::Male, None);
            p.set_maiden_name("").unwrap();
            assert_eq!(p.maiden_name(), None);
        }

        #[test]
        fn invalid_name_rejected_on_female() {
            let mut p = person(Gender::Female, None);
            let err = p.set_maiden_name("abc123").unwrap_err();
            assert!(matches!(err, TreeError::Name(_)));
        }
    }

    mod name_setters {
        use super::*;

        #[test]
        fn setters_trim_and_validate() {
            let mut p = person(Gender::Female, None);
            p.set_given_names("  Irène ").unwrap();
            assert_eq!(p.given_names(), "Irène");
            assert!(p.set_family_name("Joliot-Curie!").is_err());
            // Failed write leaves the previous value in place
            assert_eq!(p.family_name(), "Curie");
        }
    }

    mod serde_format {
        use super::*;

        #[test]
        fn roundtrip() {
            let p = person(Gender::Female, Some("Skłodowska"));
            let json = serde_json::to_string(&p).unwrap();
            let parsed: Person = serde_json::from_str(&json).unwrap();
            assert_eq!(p, parsed);
        }

        #[test]
        fn unknown_fields_rejected() {
            let json = r#"{
                "given_names": "Marie",
                "family_name": "Curie",
                "maiden_name": null,
                "gender": "female",
                "mother": null,
                "father": null,
                "spouse": null,
                "children": 0,
                "siblings": 1,
                "shoe_size": 38
            }"#;
            let result: Result<Person, _> = serde_json::from_str(json);
            assert!(result.is_err());
        }
    }
}
