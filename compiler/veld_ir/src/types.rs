//! Interned type handles and the abstract layout query.
//!
//! `TypeId` is the canonical type representation: a 32-bit index into a
//! unified [`TypeTable`]. Builtin types have fixed indices for O(1)
//! lookup, and type equality is O(1) index comparison.
//!
//! The mid-end never inspects machine layout. What the object-state pass
//! needs is the *abstract* layout — how many sub-objects a value has and
//! what their types are — exposed by [`TypeTable::layout`].

use std::fmt;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// A 32-bit index into the type table.
///
/// Types are compared by index equality, not structural comparison.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    // Builtin types, pre-interned at table creation for O(1) access.

    /// The `Int` type (64-bit signed integer).
    pub const INT: Self = Self(0);
    /// The `Bool` type.
    pub const BOOL: Self = Self(1);
    /// The raw pointer type used by FFI shims.
    pub const PTR: Self = Self(2);
    /// The unit type `()`.
    pub const UNIT: Self = Self(3);

    /// First index for dynamically interned types.
    pub const FIRST_DYNAMIC: u32 = 4;

    /// Create an index from a raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize`.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Check if this is a builtin type (pre-interned).
    ///
    /// Builtins are indivisible for the purposes of object-state tracking:
    /// they have no sub-objects and may be overwritten without an explicit
    /// deinitialization.
    #[inline]
    pub const fn is_builtin(self) -> bool {
        self.0 < Self::FIRST_DYNAMIC
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TypeId::INT => f.write_str("Int"),
            TypeId::BOOL => f.write_str("Bool"),
            TypeId::PTR => f.write_str("Ptr"),
            TypeId::UNIT => f.write_str("Unit"),
            other => write!(f, "t{}", other.0),
        }
    }
}

/// A builtin (machine-level) type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum BuiltinType {
    Int,
    Bool,
    Ptr,
    Unit,
}

/// Structural data of an interned type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeData {
    /// A builtin type with no sub-objects.
    Builtin(BuiltinType),
    /// A record (product) type; one slot per part, in declaration order.
    Record(Vec<TypeId>),
}

/// The abstract layout of a type: its sub-object slots.
///
/// Builtins have zero parts. A record has one part per field. The slot
/// count fixes the arity of `partial` object values in the state analysis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeLayout {
    /// The type this layout describes.
    pub ty: TypeId,
    /// Types of the sub-object slots, empty for builtins.
    pub parts: SmallVec<[TypeId; 4]>,
}

impl TypeLayout {
    /// Number of sub-object slots.
    #[inline]
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Type of slot `k`.
    ///
    /// # Panics
    ///
    /// Panics if `k` is out of bounds.
    #[inline]
    pub fn part(&self, k: usize) -> TypeId {
        self.parts[k]
    }
}

/// Unified type table: interner plus layout queries.
pub struct TypeTable {
    types: Vec<TypeData>,
    interned: FxHashMap<TypeData, TypeId>,
}

impl TypeTable {
    /// Create a table with the builtin types pre-interned at their fixed
    /// indices.
    pub fn new() -> Self {
        let builtins = [
            TypeData::Builtin(BuiltinType::Int),
            TypeData::Builtin(BuiltinType::Bool),
            TypeData::Builtin(BuiltinType::Ptr),
            TypeData::Builtin(BuiltinType::Unit),
        ];
        let mut interned = FxHashMap::default();
        for (i, data) in builtins.iter().enumerate() {
            #[expect(clippy::cast_possible_truncation, reason = "4 builtins")]
            interned.insert(data.clone(), TypeId::from_raw(i as u32));
        }
        TypeTable {
            types: builtins.to_vec(),
            interned,
        }
    }

    /// Intern a record type with the given part types.
    pub fn record(&mut self, parts: Vec<TypeId>) -> TypeId {
        self.intern(TypeData::Record(parts))
    }

    /// Look up the structural data of a type.
    ///
    /// # Panics
    ///
    /// Panics if `ty` was not interned in this table.
    pub fn data(&self, ty: TypeId) -> &TypeData {
        &self.types[ty.index()]
    }

    /// The abstract layout of `ty`: its sub-object slots.
    pub fn layout(&self, ty: TypeId) -> TypeLayout {
        let parts = match self.data(ty) {
            TypeData::Builtin(_) => SmallVec::new(),
            TypeData::Record(parts) => parts.iter().copied().collect(),
        };
        TypeLayout { ty, parts }
    }

    /// The type of the sub-object reached by following `path` from `ty`.
    ///
    /// An empty path designates `ty` itself.
    ///
    /// # Panics
    ///
    /// Panics if the path does not designate a slot of `ty`.
    pub fn part_at_path(&self, ty: TypeId, path: &[u32]) -> TypeId {
        let mut current = ty;
        for &k in path {
            current = self.layout(current).part(k as usize);
        }
        current
    }

    fn intern(&mut self, data: TypeData) -> TypeId {
        if let Some(&id) = self.interned.get(&data) {
            return id;
        }
        let id = TypeId::from_raw(
            u32::try_from(self.types.len()).unwrap_or_else(|_| panic!("type count exceeds u32::MAX")),
        );
        self.types.push(data.clone());
        self.interned.insert(data, id);
        id
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
