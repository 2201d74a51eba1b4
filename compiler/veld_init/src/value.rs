//! Per-object lattice values and part-path queries.
//!
//! An [`ObjectValue`] describes the state of one object. `Full` means
//! every byte shares one [`ObjectState`]; `Partial` tracks each
//! sub-object slot separately, with the slot count fixed by the type's
//! abstract layout.
//!
//! # Canonical form
//!
//! A `Partial` whose children are all `Full(s)` for one common `s` is
//! non-canonical; [`canonicalized`](ObjectValue::canonicalized) collapses
//! it to `Full(s)`. Every value stored in a context is canonical, and all
//! lattice operations here are defined on (and return) canonical forms.

use std::fmt;

use smallvec::SmallVec;

use veld_ir::InstId;

use crate::state::ObjectState;

/// A path of sub-object slot indices, relative to some root object.
///
/// The empty path designates the root itself.
pub type PartPath = SmallVec<[u32; 4]>;

/// The `{initialized, uninitialized, consumed}` decomposition of a
/// partial value's slots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartPaths {
    /// Paths to fully initialized leaves.
    pub initialized: Vec<PartPath>,
    /// Paths to fully uninitialized leaves.
    pub uninitialized: Vec<PartPath>,
    /// Paths to fully consumed leaves.
    pub consumed: Vec<PartPath>,
}

/// The abstract state of one object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObjectValue {
    /// Every byte of the object shares this state.
    Full(ObjectState),
    /// Per-slot states; one child per sub-object slot of the layout.
    Partial(Vec<ObjectValue>),
}

impl ObjectValue {
    /// A fully initialized value.
    pub fn initialized() -> Self {
        ObjectValue::Full(ObjectState::Initialized)
    }

    /// A fully uninitialized value.
    pub fn uninitialized() -> Self {
        ObjectValue::Full(ObjectState::Uninitialized)
    }

    /// A value fully consumed by `i`.
    pub fn consumed(by: InstId) -> Self {
        ObjectValue::Full(ObjectState::consumed(by))
    }

    /// Is this `Full(Initialized)`?
    #[inline]
    pub fn is_full_initialized(&self) -> bool {
        matches!(self, ObjectValue::Full(ObjectState::Initialized))
    }

    /// Is this `Full(Uninitialized)`?
    #[inline]
    pub fn is_full_uninitialized(&self) -> bool {
        matches!(self, ObjectValue::Full(ObjectState::Uninitialized))
    }

    /// Does any region of this value hold a live value?
    pub fn has_initialized_part(&self) -> bool {
        match self {
            ObjectValue::Full(s) => s.is_initialized(),
            ObjectValue::Partial(parts) => parts.iter().any(ObjectValue::has_initialized_part),
        }
    }

    /// Was any region of this value moved away?
    pub fn has_consumed_part(&self) -> bool {
        match self {
            ObjectValue::Full(s) => matches!(s, ObjectState::Consumed { .. }),
            ObjectValue::Partial(parts) => parts.iter().any(ObjectValue::has_consumed_part),
        }
    }

    /// Is this value in canonical form?
    pub fn is_canonical(&self) -> bool {
        match self {
            ObjectValue::Full(_) => true,
            ObjectValue::Partial(parts) => {
                parts.iter().all(ObjectValue::is_canonical) && uniform_state(parts).is_none()
            }
        }
    }

    /// The canonical form of this value.
    #[must_use]
    pub fn canonicalized(self) -> Self {
        match self {
            full @ ObjectValue::Full(_) => full,
            ObjectValue::Partial(parts) => {
                let parts: Vec<ObjectValue> =
                    parts.into_iter().map(ObjectValue::canonicalized).collect();
                if let Some(s) = uniform_state(&parts) {
                    ObjectValue::Full(s)
                } else {
                    ObjectValue::Partial(parts)
                }
            }
        }
    }

    /// Merge with the value the object has on another incoming path.
    ///
    /// `Full` merges slot-wise against `Partial` by expanding to the
    /// partial's arity; both sides always describe the same type, so the
    /// arities agree when both are partial. The result is canonical.
    #[must_use]
    pub fn merge(self, other: ObjectValue) -> ObjectValue {
        match (self, other) {
            (ObjectValue::Full(a), ObjectValue::Full(b)) => ObjectValue::Full(a.merge(b)),
            (ObjectValue::Full(a), ObjectValue::Partial(bs)) => {
                expand_merge(&a, bs, /*full_on_left=*/ true)
            }
            (ObjectValue::Partial(bs), ObjectValue::Full(a)) => {
                expand_merge(&a, bs, /*full_on_left=*/ false)
            }
            (ObjectValue::Partial(a), ObjectValue::Partial(b)) => {
                assert_eq!(a.len(), b.len(), "merging values of different layouts");
                ObjectValue::Partial(
                    a.into_iter()
                        .zip(b)
                        .map(|(x, y)| x.merge(y))
                        .collect(),
                )
                .canonicalized()
            }
        }
    }

    /// The sub-value at `path`.
    ///
    /// A `Full` region short-circuits: every sub-object of a uniform
    /// region shares its state.
    pub fn part_at(&self, path: &[u32]) -> ObjectValue {
        let mut current = self;
        for &k in path {
            match current {
                ObjectValue::Full(_) => break,
                ObjectValue::Partial(parts) => current = &parts[k as usize],
            }
        }
        current.clone()
    }

    /// Paths to the fully initialized leaves of this value.
    ///
    /// For a `Full(Initialized)` value the single path is empty (the
    /// whole object).
    pub fn initialized_paths(&self) -> Vec<PartPath> {
        let mut out = Vec::new();
        collect_paths(self, &mut PartPath::new(), &mut out, |s| s.is_initialized());
        out
    }

    /// The `{initialized, uninitialized, consumed}` view of a partial
    /// value's slots. `None` unless the value is `Partial`.
    pub fn paths(&self) -> Option<PartPaths> {
        let ObjectValue::Partial(_) = self else {
            return None;
        };
        let mut result = PartPaths::default();
        collect_paths(self, &mut PartPath::new(), &mut result.initialized, |s| {
            s.is_initialized()
        });
        collect_paths(self, &mut PartPath::new(), &mut result.uninitialized, |s| {
            matches!(s, ObjectState::Uninitialized)
        });
        collect_paths(self, &mut PartPath::new(), &mut result.consumed, |s| {
            matches!(s, ObjectState::Consumed { .. })
        });
        Some(result)
    }

    /// Paths initialized in `self` but not in `other`.
    pub fn difference(&self, other: &ObjectValue) -> Vec<PartPath> {
        let mut out = Vec::new();
        difference_rec(self, other, &mut PartPath::new(), &mut out);
        out
    }
}

impl fmt::Display for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectValue::Full(s) => s.fmt(f),
            ObjectValue::Partial(parts) => {
                f.write_str("[")?;
                for (k, p) in parts.iter().enumerate() {
                    if k > 0 {
                        f.write_str(", ")?;
                    }
                    p.fmt(f)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// The common state of `parts` if they are all `Full` and equal.
fn uniform_state(parts: &[ObjectValue]) -> Option<ObjectState> {
    let first = first_state(parts)?;
    parts
        .iter()
        .all(|p| matches!(p, ObjectValue::Full(s) if s == first))
        .then(|| first.clone())
}

fn first_state(parts: &[ObjectValue]) -> Option<&ObjectState> {
    match parts.first() {
        Some(ObjectValue::Full(s)) => Some(s),
        _ => None,
    }
}

/// Merge a `Full` state against partial slots, preserving argument order
/// (state merge is commutative, but keeping order makes that fact
/// testable rather than assumed).
fn expand_merge(full: &ObjectState, parts: Vec<ObjectValue>, full_on_left: bool) -> ObjectValue {
    ObjectValue::Partial(
        parts
            .into_iter()
            .map(|p| {
                if full_on_left {
                    ObjectValue::Full(full.clone()).merge(p)
                } else {
                    p.merge(ObjectValue::Full(full.clone()))
                }
            })
            .collect(),
    )
    .canonicalized()
}

fn collect_paths(
    value: &ObjectValue,
    prefix: &mut PartPath,
    out: &mut Vec<PartPath>,
    wanted: impl Fn(&ObjectState) -> bool + Copy,
) {
    match value {
        ObjectValue::Full(s) => {
            if wanted(s) {
                out.push(prefix.clone());
            }
        }
        ObjectValue::Partial(parts) => {
            for (k, p) in parts.iter().enumerate() {
                #[expect(clippy::cast_possible_truncation, reason = "slot counts fit in u32")]
                prefix.push(k as u32);
                collect_paths(p, prefix, out, wanted);
                prefix.pop();
            }
        }
    }
}

fn difference_rec(a: &ObjectValue, b: &ObjectValue, prefix: &mut PartPath, out: &mut Vec<PartPath>) {
    match (a, b) {
        // Nothing is missing from a fully initialized right-hand side.
        (_, ObjectValue::Full(ObjectState::Initialized)) => {}
        (ObjectValue::Full(ObjectState::Initialized), ObjectValue::Full(_)) => {
            out.push(prefix.clone());
        }
        (ObjectValue::Full(s), ObjectValue::Partial(bs)) if s.is_initialized() => {
            for (k, bp) in bs.iter().enumerate() {
                #[expect(clippy::cast_possible_truncation, reason = "slot counts fit in u32")]
                prefix.push(k as u32);
                difference_rec(a, bp, prefix, out);
                prefix.pop();
            }
        }
        // Nothing initialized on the left to report.
        (ObjectValue::Full(_), _) => {}
        (ObjectValue::Partial(aps), _) => {
            for (k, ap) in aps.iter().enumerate() {
                #[expect(clippy::cast_possible_truncation, reason = "slot counts fit in u32")]
                prefix.push(k as u32);
                match b {
                    ObjectValue::Partial(bs) => difference_rec(ap, &bs[k], prefix, out),
                    full => difference_rec(ap, full, prefix, out),
                }
                prefix.pop();
            }
        }
    }
}

#[cfg(test)]
mod tests;
