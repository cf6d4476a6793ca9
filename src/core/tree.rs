//! core::tree
//!
//! The family tree arena and its relationship operations.
//!
//! # Architecture
//!
//! The tree owns two arenas and a root pointer:
//! - Person records, addressed by [`PersonId`]
//! - Child/sibling sequences, addressed by [`ListId`]
//!
//! Relationship fields are stored as optional indices rather than owned
//! references, so the cyclic kinship graph (mother, father, spouse,
//! children, siblings all pointing back at each other) involves no
//! ownership cycles. Sequences are shared by handle: spouses and
//! co-parents hold the *same* `ListId`, so an append through one person
//! is visible through the other without any synchronization logic.
//!
//! # Invariants
//!
//! - `mother`, `father`, and `spouse` are write-once; a second write
//!   fails with [`TreeError::DuplicateRelation`], never silently
//! - A mother is female, a father is male, spouses have opposite genders
//! - Sequences never contain duplicate entries
//! - At most one root; replacing it discards the old subtree's
//!   reachability (records linger in the arena but are invisible to
//!   traversal and dropped by save-time compaction)
//!
//! # Example
//!
//! ```
//! use lignage::core::tree::FamilyTree;
//! use lignage::core::types::{Gender, RelativeKind};
//!
//! let mut tree = FamilyTree::new();
//! let jean = tree.add_person("Jean", "Dupont", Gender::Male, None).unwrap();
//! tree.set_root(jean);
//!
//! let marie = tree.add_person("Marie", "Curie", Gender::Female, None).unwrap();
//! tree.attach_relative(jean, RelativeKind::Spouse, marie).unwrap();
//!
//! let paul = tree.add_person("Paul", "Dupont", Gender::Male, None).unwrap();
//! tree.attach_relative(jean, RelativeKind::Child, paul).unwrap();
//!
//! // Attaching the child to the married father also linked the mother,
//! // and the spouses share one children sequence.
//! assert_eq!(tree.person(paul).mother(), Some(marie));
//! assert_eq!(tree.children(jean), tree.children(marie));
//! ```

use std::collections::{HashSet, VecDeque};

use thiserror::Error;
use tracing::debug;

use super::person::Person;
use super::types::{Attribute, Gender, ListId, PersonId, RelativeKind, TypeError};

/// Errors from tree operations.
#[derive(Debug, Error, PartialEq)]
pub enum TreeError {
    /// A name failed validation.
    #[error("name validation failed: {0}")]
    Name(#[from] TypeError),

    /// A write-once relationship slot was already set.
    #[error("{0} already set")]
    DuplicateRelation(RelativeKind),

    /// A relationship or attribute was attempted with the wrong gender.
    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),

    /// The root was queried on a tree that has none.
    #[error("family tree has no root")]
    EmptyTree,
}

/// A mutable kinship graph with a single designated root.
///
/// Every person is reachable only by traversing the root's relationship
/// fields transitively; there is no separate registry. A person added but
/// never attached has no visible effect on the graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FamilyTree {
    pub(crate) persons: Vec<Person>,
    pub(crate) lists: Vec<Vec<PersonId>>,
    pub(crate) root: Option<PersonId>,
}

impl FamilyTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a tree from already-validated tables. Used by the
    /// persistence layer after a file passes validation.
    pub(crate) fn from_parts(
        persons: Vec<Person>,
        lists: Vec<Vec<PersonId>>,
        root: Option<PersonId>,
    ) -> Self {
        Self {
            persons,
            lists,
            root,
        }
    }

    /// Create a person in the arena, fully validated.
    ///
    /// The new person starts with no relationships and freshly allocated
    /// (empty) child and sibling sequences. It is invisible to the graph
    /// until attached to a reachable person or made the root; discarding
    /// a half-built person simply means never attaching it.
    ///
    /// # Errors
    ///
    /// - [`TreeError::Name`] if a name violates the name alphabet
    /// - [`TreeError::InvalidAttribute`] if a non-empty maiden name is
    ///   supplied for a non-female person
    ///
    /// # Example
    ///
    /// ```
    /// use lignage::core::tree::FamilyTree;
    /// use lignage::core::types::Gender;
    ///
    /// let mut tree = FamilyTree::new();
    /// assert!(tree.add_person("Jean", "Dupont", Gender::Male, None).is_ok());
    /// assert!(tree.add_person("Jean", "Dup0nt", Gender::Male, None).is_err());
    /// assert!(tree
    ///     .add_person("Jean", "Dupont", Gender::Male, Some("Durand"))
    ///     .is_err());
    /// ```
    pub fn add_person(
        &mut self,
        given_names: &str,
        family_name: &str,
        gender: Gender,
        maiden_name: Option<&str>,
    ) -> Result<PersonId, TreeError> {
        let given_names = super::types::PersonName::new(given_names)?;
        let family_name = super::types::PersonName::new(family_name)?;
        let maiden_name = match maiden_name {
            Some(value) => Person::parse_maiden_name(gender, value)?,
            None => None,
        };

        let children = self.alloc_list();
        let siblings = self.alloc_list();
        let id = PersonId(self.persons.len());
        self.persons.push(Person::new(
            given_names,
            family_name,
            gender,
            maiden_name,
            children,
            siblings,
        ));

        debug!(person = id.index(), "person added");
        Ok(id)
    }

    /// Number of records in the arena, including unattached ones.
    pub fn person_count(&self) -> usize {
        self.persons.len()
    }

    /// Get a person, or `None` if the id does not belong to this tree.
    pub fn get(&self, id: PersonId) -> Option<&Person> {
        self.persons.get(id.0)
    }

    /// Get a person.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree. Ids obtained from
    /// [`add_person`](Self::add_person) on the same tree are always valid.
    pub fn person(&self, id: PersonId) -> &Person {
        &self.persons[id.0]
    }

    /// Get a person mutably, for the validated attribute setters.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree.
    pub fn person_mut(&mut self, id: PersonId) -> &mut Person {
        &mut self.persons[id.0]
    }

    // ------------------------------------------------------------------
    // Root lifecycle
    // ------------------------------------------------------------------

    /// Whether the tree has a root.
    pub fn has_root(&self) -> bool {
        self.root.is_some()
    }

    /// The root person.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::EmptyTree`] if no root has been set. Callers
    /// that prefer a boolean protocol can check [`has_root`](Self::has_root)
    /// first.
    pub fn root(&self) -> Result<PersonId, TreeError> {
        self.root.ok_or(TreeError::EmptyTree)
    }

    /// Unconditionally replace the root.
    ///
    /// This is how a brand-new tree is started and how a loaded tree is
    /// installed. Replacing the root of a populated tree discards the old
    /// subtree (no merge): its records become unreachable. There is no
    /// transition back to the empty state; construct a fresh tree instead.
    pub fn set_root(&mut self, person: PersonId) {
        debug!(person = person.index(), "root replaced");
        self.root = Some(person);
    }

    // ------------------------------------------------------------------
    // Relationship operations
    // ------------------------------------------------------------------

    /// Link `mother` as the mother of `child`.
    ///
    /// On success the child is appended to the mother's children sequence
    /// and to her sibling sequence (both guarded against duplicates),
    /// then the child's mother slot is written. The sibling append has no
    /// counterpart in [`set_father`](Self::set_father); the asymmetry is
    /// documented behavior, pinned by tests.
    ///
    /// # Errors
    ///
    /// - [`TreeError::DuplicateRelation`] if the child already has a mother
    /// - [`TreeError::InvalidAttribute`] if `mother` is not female
    pub fn set_mother(&mut self, child: PersonId, mother: PersonId) -> Result<(), TreeError> {
        if self.persons[child.0].mother.is_some() {
            return Err(TreeError::DuplicateRelation(RelativeKind::Mother));
        }
        if self.persons[mother.0].gender != Gender::Female {
            return Err(TreeError::InvalidAttribute(
                "a mother must be female".into(),
            ));
        }

        let children = self.persons[mother.0].children;
        let siblings = self.persons[mother.0].siblings;
        self.push_unique(children, child);
        self.push_unique(siblings, child);
        self.persons[child.0].mother = Some(mother);

        debug!(
            child = child.index(),
            mother = mother.index(),
            "mother linked"
        );
        Ok(())
    }

    /// Link `father` as the father of `child`.
    ///
    /// On success the child is appended to the father's children sequence
    /// (guarded against duplicates), then the child's father slot is
    /// written. Unlike [`set_mother`](Self::set_mother), the father's
    /// sibling sequence is not touched.
    ///
    /// # Errors
    ///
    /// - [`TreeError::DuplicateRelation`] if the child already has a father
    /// - [`TreeError::InvalidAttribute`] if `father` is not male
    pub fn set_father(&mut self, child: PersonId, father: PersonId) -> Result<(), TreeError> {
        if self.persons[child.0].father.is_some() {
            return Err(TreeError::DuplicateRelation(RelativeKind::Father));
        }
        if self.persons[father.0].gender != Gender::Male {
            return Err(TreeError::InvalidAttribute("a father must be male".into()));
        }

        let children = self.persons[father.0].children;
        self.push_unique(children, child);
        self.persons[child.0].father = Some(father);

        debug!(
            child = child.index(),
            father = father.index(),
            "father linked"
        );
        Ok(())
    }

    /// Link `spouse` as the spouse of `person`, mutually.
    ///
    /// On success the spouse's children and sibling fields are pointed at
    /// `person`'s sequences (shared handles, not copies - subsequent
    /// appends through either are visible through both), `person`'s
    /// spouse slot is written, and, if the spouse's own slot is still
    /// empty, the back-link is written too.
    ///
    /// # Errors
    ///
    /// - [`TreeError::DuplicateRelation`] if `person` already has a spouse
    /// - [`TreeError::InvalidAttribute`] if both have the same gender
    pub fn set_spouse(&mut self, person: PersonId, spouse: PersonId) -> Result<(), TreeError> {
        if self.persons[person.0].spouse.is_some() {
            return Err(TreeError::DuplicateRelation(RelativeKind::Spouse));
        }
        if self.persons[spouse.0].gender == self.persons[person.0].gender {
            return Err(TreeError::InvalidAttribute(
                "a spouse must be of the opposite gender".into(),
            ));
        }

        let children = self.persons[person.0].children;
        let siblings = self.persons[person.0].siblings;
        self.persons[spouse.0].children = children;
        self.persons[spouse.0].siblings = siblings;
        self.persons[person.0].spouse = Some(spouse);
        if self.persons[spouse.0].spouse.is_none() {
            self.persons[spouse.0].spouse = Some(person);
        }

        debug!(
            person = person.index(),
            spouse = spouse.index(),
            "spouses linked"
        );
        Ok(())
    }

    /// Attach `child` as a child of `parent`, propagating parent links.
    ///
    /// For a male parent: the child's father slot is linked if empty; the
    /// child adopts the parent's sibling sequence if its own is empty
    /// (shared handle); and if the parent has a spouse and the child has
    /// no mother, the spouse is linked as mother (which also pushes the
    /// child onto her children and sibling sequences). A female parent is
    /// symmetric with mother/father swapped. Finally the child is
    /// appended to the parent's children sequence unless already present.
    ///
    /// # Errors
    ///
    /// The intermediate steps are validated in turn; each guard above
    /// makes them infallible in practice, but a failure at any step
    /// leaves every already-written link valid.
    pub fn attach_child(&mut self, parent: PersonId, child: PersonId) -> Result<(), TreeError> {
        match self.persons[parent.0].gender {
            Gender::Male => {
                if self.persons[child.0].father.is_none() {
                    self.set_father(child, parent)?;
                }
                if self.sibling_count(child) == 0 {
                    self.persons[child.0].siblings = self.persons[parent.0].siblings;
                }
                if let Some(spouse) = self.persons[parent.0].spouse {
                    if self.persons[child.0].mother.is_none() {
                        self.set_mother(child, spouse)?;
                    }
                }
            }
            Gender::Female => {
                if self.persons[child.0].mother.is_none() {
                    self.set_mother(child, parent)?;
                }
                if self.sibling_count(child) == 0 {
                    self.persons[child.0].siblings = self.persons[parent.0].siblings;
                }
                if let Some(spouse) = self.persons[parent.0].spouse {
                    if self.persons[child.0].father.is_none() {
                        self.set_father(child, spouse)?;
                    }
                }
            }
        }

        let children = self.persons[parent.0].children;
        self.push_unique(children, child);

        debug!(
            parent = parent.index(),
            child = child.index(),
            "child attached"
        );
        Ok(())
    }

    /// Append `sibling` to `person`'s sibling sequence unless already
    /// present.
    ///
    /// No reciprocal append is performed on `sibling`: the relationship
    /// list is flat and one-directional, as documented.
    pub fn attach_sibling(&mut self, person: PersonId, sibling: PersonId) {
        let siblings = self.persons[person.0].siblings;
        self.push_unique(siblings, sibling);
    }

    /// Attach a relative of the given kind. Convenience dispatch used by
    /// callers that carry the kind as data; forwards whatever error the
    /// underlying operation raises.
    pub fn attach_relative(
        &mut self,
        person: PersonId,
        kind: RelativeKind,
        relative: PersonId,
    ) -> Result<(), TreeError> {
        match kind {
            RelativeKind::Father => self.set_father(person, relative),
            RelativeKind::Mother => self.set_mother(person, relative),
            RelativeKind::Child => self.attach_child(person, relative),
            RelativeKind::Sibling => {
                self.attach_sibling(person, relative);
                Ok(())
            }
            RelativeKind::Spouse => self.set_spouse(person, relative),
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Whether the person has the given attribute: a present relationship
    /// slot, a non-empty sequence, a maiden name, or (`Parents`) either
    /// parent.
    pub fn has_attribute(&self, person: PersonId, attribute: Attribute) -> bool {
        let record = &self.persons[person.0];
        match attribute {
            Attribute::Father => record.father.is_some(),
            Attribute::Mother => record.mother.is_some(),
            Attribute::Spouse => record.spouse.is_some(),
            Attribute::MaidenName => record.maiden_name.is_some(),
            Attribute::Parents => record.father.is_some() || record.mother.is_some(),
            Attribute::Children => !self.list(record.children).is_empty(),
            Attribute::Siblings => !self.list(record.siblings).is_empty(),
        }
    }

    /// The person's children, in insertion order.
    pub fn children(&self, person: PersonId) -> &[PersonId] {
        self.list(self.persons[person.0].children)
    }

    /// The person's siblings, in insertion order.
    pub fn siblings(&self, person: PersonId) -> &[PersonId] {
        self.list(self.persons[person.0].siblings)
    }

    /// Number of children.
    pub fn child_count(&self, person: PersonId) -> usize {
        self.children(person).len()
    }

    /// Number of siblings.
    pub fn sibling_count(&self, person: PersonId) -> usize {
        self.siblings(person).len()
    }

    /// All persons reachable from `person` via children, breadth-first,
    /// excluding `person` itself. Deterministic: children are visited in
    /// insertion order.
    pub fn descendants(&self, person: PersonId) -> Vec<PersonId> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        let mut queue: VecDeque<PersonId> = self.children(person).iter().copied().collect();

        while let Some(current) = queue.pop_front() {
            if visited.insert(current) {
                result.push(current);
                queue.extend(self.children(current).iter().copied());
            }
        }

        result
    }

    /// All persons reachable from `person` via mother/father links,
    /// breadth-first from the immediate parents upward, excluding
    /// `person` itself.
    pub fn ancestors(&self, person: PersonId) -> Vec<PersonId> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        let record = &self.persons[person.0];
        let mut queue: VecDeque<PersonId> =
            record.mother.into_iter().chain(record.father).collect();

        while let Some(current) = queue.pop_front() {
            if visited.insert(current) {
                result.push(current);
                let record = &self.persons[current.0];
                queue.extend(record.mother.into_iter().chain(record.father));
            }
        }

        result
    }

    /// The reachable set: every person obtainable by following mother,
    /// father, spouse, children, and sibling links transitively from the
    /// root, in breadth-first order starting with the root. Empty when
    /// the tree has no root.
    ///
    /// Rendering walks this set; saving persists exactly this set.
    pub fn reachable_from_root(&self) -> Vec<PersonId> {
        let root = match self.root {
            Some(root) => root,
            None => return Vec::new(),
        };

        let mut result = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([root]);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            result.push(current);

            let record = &self.persons[current.0];
            queue.extend(record.mother);
            queue.extend(record.father);
            queue.extend(record.spouse);
            queue.extend(self.list(record.children).iter().copied());
            queue.extend(self.list(record.siblings).iter().copied());
        }

        result
    }

    // ------------------------------------------------------------------
    // Sequence arena
    // ------------------------------------------------------------------

    fn alloc_list(&mut self) -> ListId {
        self.lists.push(Vec::new());
        ListId(self.lists.len() - 1)
    }

    pub(crate) fn list(&self, id: ListId) -> &[PersonId] {
        &self.lists[id.0]
    }

    /// Append to a sequence unless the entry is already present.
    fn push_unique(&mut self, list: ListId, person: PersonId) {
        let entries = &mut self.lists[list.0];
        if !entries.contains(&person) {
            entries.push(person);
        }
    }
}
