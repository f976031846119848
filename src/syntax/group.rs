//! Color groups and the registry that interns them
//!
//! A group is a hierarchical, dot-separated name such as
//! `identifier.function`. Every name is interned once per registry so
//! comparing two groups is an integer comparison.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;

static GLOBAL: Lazy<GroupRegistry> = Lazy::new(GroupRegistry::new);

/// An interned color group
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Group {
    id: u32,
    name: Arc<str>,
}

impl Group {
    /// Identifier assigned by the registry
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The full dotted name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the enclosing group (`identifier.function` -> `identifier`)
    pub fn parent_name(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(parent, _)| parent)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    groups: HashMap<Arc<str>, Group>,
    count: u32,
}

/// Append-only name -> group table
///
/// Cloning the registry yields another handle to the same table, so
/// definitions built from clones compare groups by identity.
#[derive(Debug, Clone, Default)]
pub struct GroupRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl GroupRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry shared by every definition that does not
    /// bring its own
    pub fn global() -> &'static GroupRegistry {
        &GLOBAL
    }

    /// Return the group for `name`, allocating the next id if unseen
    pub fn intern(&self, name: &str) -> Group {
        if let Some(group) = self.lookup(name) {
            return group;
        }

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        // Another writer may have won the race between the two locks
        if let Some(group) = inner.groups.get(name) {
            return group.clone();
        }

        inner.count += 1;
        let name: Arc<str> = Arc::from(name);
        let group = Group {
            id: inner.count,
            name: Arc::clone(&name),
        };
        inner.groups.insert(name, group.clone());
        group
    }

    /// Look up a group without interning it
    pub fn lookup(&self, name: &str) -> Option<Group> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.groups.get(name).cloned()
    }

    /// The group one level up in the hierarchy, interned here
    pub fn parent(&self, group: &Group) -> Option<Group> {
        group.parent_name().map(|name| self.intern(name))
    }

    /// Number of groups interned so far
    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every group and restart numbering.
    ///
    /// Groups handed out before the reset keep their old ids, so this is
    /// only meant for isolating independent sessions such as tests.
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.groups.clear();
        inner.count = 0;
    }
}
