//! Interned identifiers for parts and spanners.
//!
//! Parts are referenced from many places during layout (staves, instrument
//! names, cross-staff checks), so they are keyed by a cheap, `Copy`
//! [`Id`] backed by a global string interner.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock, PoisonError},
};

use serde::{Deserialize, Deserializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner shared by every [`Id`].
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Interned identifier.
///
/// # Examples
///
/// ```
/// use engrave_core::identifier::Id;
///
/// let piano = Id::new("piano");
/// assert_eq!(piano, Id::new("piano"));
/// assert_eq!(piano, "piano");
///
/// let right_hand = piano.create_nested(Id::new("rh"));
/// assert_eq!(right_hand, "piano::rh");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from a name, interning it on first use.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Creates an identifier for an unnamed element from its index.
    pub fn from_anonymous(idx: usize) -> Self {
        Self::new(&format!("__{idx}"))
    }

    /// Creates a nested ID by joining this ID and `child_id` with `::`.
    pub fn create_nested(&self, child_id: Id) -> Self {
        let mut interner = interner();
        let nested_name = format!(
            "{}::{}",
            interner.resolve(self.0).unwrap_or_default(),
            interner.resolve(child_id.0).unwrap_or_default()
        );
        Self(interner.get_or_intern(nested_name))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interner = interner();
        write!(f, "{}", interner.resolve(self.0).unwrap_or_default())
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        interner().resolve(self.0) == Some(other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Self::new(&name))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_new_interns_equal_names() {
        let violin = Id::new("violin");
        let again = Id::new("violin");
        let viola = Id::new("viola");

        assert_eq!(violin, again);
        assert_ne!(violin, viola);
        assert_eq!(violin, "violin");
    }

    #[test]
    fn test_from_anonymous() {
        assert_eq!(Id::from_anonymous(3), Id::from_anonymous(3));
        assert_ne!(Id::from_anonymous(3), Id::from_anonymous(4));
        assert_eq!(Id::from_anonymous(3), "__3");
    }

    #[test]
    fn test_create_nested() {
        let part = Id::new("piano");
        let nested = part.create_nested(Id::new("lh"));
        assert_eq!(nested, "piano::lh");
        assert_eq!(format!("{nested}"), "piano::lh");
    }

    #[test]
    fn test_hash_key() {
        let mut staves_per_part = HashMap::new();
        staves_per_part.insert(Id::new("organ"), 3);
        staves_per_part.insert(Id::new("flute"), 1);

        assert_eq!(staves_per_part.get(&Id::from("organ")), Some(&3));
        assert_eq!(staves_per_part.len(), 2);
    }

    #[test]
    fn test_partial_eq_str_ref() {
        let id = Id::new("cello");
        let name = String::from("cello");
        assert!(id == name.as_str());
        assert!(id != "bass");
    }
}
