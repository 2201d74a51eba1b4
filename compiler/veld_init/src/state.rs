//! The atom lattice of object states.
//!
//! Every byte of every object is, at every program point, in exactly one
//! of three states: it holds a live value, it holds nothing, or its value
//! was moved away. The merge operator combines the states an object can
//! be in on different incoming paths of a join block.

use std::collections::BTreeSet;
use std::fmt;

use veld_ir::InstId;

/// The initialization state of (a region of) an object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObjectState {
    /// The storage holds a live value.
    Initialized,
    /// The storage exists but holds no value.
    Uninitialized,
    /// The value was moved away. `consumers` records the instruction(s)
    /// that took it; more than one only after a join of paths that each
    /// consumed the object.
    Consumed { consumers: BTreeSet<InstId> },
}

impl ObjectState {
    /// A `Consumed` state with a single consumer.
    pub fn consumed(by: InstId) -> Self {
        ObjectState::Consumed {
            consumers: BTreeSet::from([by]),
        }
    }

    /// Is this `Initialized`?
    #[inline]
    pub fn is_initialized(&self) -> bool {
        matches!(self, ObjectState::Initialized)
    }

    /// Merge with the state the object has on another incoming path.
    ///
    /// This is a conservative superposition, not a classical lattice
    /// join: `Initialized` is the identity, `Uninitialized` absorbs
    /// `Initialized`, and `Consumed` absorbs everything, unioning
    /// consumer sets when both sides consumed. An object live on only
    /// one path is therefore treated as having the other path's state,
    /// which is what lets later uses report "uninitialized" or
    /// "consumed" rather than a vaguer condition.
    #[must_use]
    pub fn merge(self, other: ObjectState) -> ObjectState {
        match (self, other) {
            (ObjectState::Initialized, rhs) => rhs,
            (lhs, ObjectState::Initialized) => lhs,
            (ObjectState::Uninitialized, rhs) => rhs,
            (lhs, ObjectState::Uninitialized) => lhs,
            (
                ObjectState::Consumed { consumers: mut a },
                ObjectState::Consumed { consumers: b },
            ) => {
                a.extend(b);
                ObjectState::Consumed { consumers: a }
            }
        }
    }
}

impl fmt::Display for ObjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectState::Initialized => f.write_str("initialized"),
            ObjectState::Uninitialized => f.write_str("uninitialized"),
            ObjectState::Consumed { consumers } => {
                f.write_str("consumed by {")?;
                for (k, c) in consumers.iter().enumerate() {
                    if k > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{c}")?;
                }
                f.write_str("}")
            }
        }
    }
}
