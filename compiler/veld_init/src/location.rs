//! Abstract locations: opaque identifiers for storage.
//!
//! Two operations observing the same location are known to alias; two
//! observing different locations are known not to. Locations are created
//! by `alloc_stack` instructions and by function parameters, and extended
//! along sub-object paths by `element_addr`. They are never reused: the
//! instruction arena never recycles ids, so a revisited `alloc_stack`
//! names the same location it named before.

use std::fmt;

use veld_ir::InstId;

use crate::value::PartPath;

/// Where a location's storage was born.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LocationRoot {
    /// Storage backing the `i`-th function parameter, created at entry.
    Argument(u32),
    /// Storage created by the `alloc_stack` instruction with this id.
    Instruction(InstId),
}

/// An abstract location: a root plus a sub-object path.
///
/// Equality is structural. A location with an empty path designates a
/// whole allocation; only those appear as memory keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    pub root: LocationRoot,
    pub path: PartPath,
}

impl Location {
    /// The whole storage of parameter `i`.
    pub fn argument(i: u32) -> Self {
        Location {
            root: LocationRoot::Argument(i),
            path: PartPath::new(),
        }
    }

    /// The whole storage allocated by `inst`.
    pub fn instruction(inst: InstId) -> Self {
        Location {
            root: LocationRoot::Instruction(inst),
            path: PartPath::new(),
        }
    }

    /// Extend this location along `path`.
    ///
    /// Extending an already-extended location concatenates paths, so
    /// `l.sub(p).sub(q)` equals `l.sub(pq)`.
    #[must_use]
    pub fn sub(&self, path: &[u32]) -> Self {
        let mut extended = self.path.clone();
        extended.extend_from_slice(path);
        Location {
            root: self.root,
            path: extended,
        }
    }

    /// Does this location designate a whole allocation?
    #[inline]
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// The whole allocation containing this location.
    pub fn root_location(&self) -> Location {
        Location {
            root: self.root,
            path: PartPath::new(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root {
            LocationRoot::Argument(i) => write!(f, "arg{i}")?,
            LocationRoot::Instruction(inst) => write!(f, "{inst}")?,
        }
        for k in &self.path {
            write!(f, ".{k}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_structural() {
        assert_eq!(Location::argument(0), Location::argument(0));
        assert_ne!(Location::argument(0), Location::argument(1));
        assert_ne!(
            Location::argument(0),
            Location::instruction(InstId::new(0))
        );
        assert_eq!(
            Location::instruction(InstId::new(3)).sub(&[1]),
            Location::instruction(InstId::new(3)).sub(&[1])
        );
        assert_ne!(
            Location::instruction(InstId::new(3)).sub(&[1]),
            Location::instruction(InstId::new(3)).sub(&[2])
        );
    }

    #[test]
    fn sub_concatenates_paths() {
        let l = Location::argument(1);
        assert_eq!(l.sub(&[0]).sub(&[2, 1]), l.sub(&[0, 2, 1]));
        assert!(l.is_root());
        assert!(!l.sub(&[0]).is_root());
    }

    #[test]
    fn root_location_strips_the_path() {
        let l = Location::instruction(InstId::new(7)).sub(&[0, 1]);
        assert_eq!(l.root_location(), Location::instruction(InstId::new(7)));
    }

    #[test]
    fn display_shows_root_and_path() {
        assert_eq!(Location::argument(2).to_string(), "arg2");
        assert_eq!(
            Location::instruction(InstId::new(4)).sub(&[0, 3]).to_string(),
            "i4.0.3"
        );
    }
}
