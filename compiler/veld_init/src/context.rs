//! The abstract interpreter's state: SSA bindings plus abstract memory.
//!
//! A [`Context`] pairs `locals` (what each SSA name denotes: an owned
//! object value, or a set of storage locations for address-typed names)
//! with `memory` (the state of every live allocation). Memory is keyed by
//! whole allocations; reads and writes at extended locations navigate the
//! allocation's value along the part path, materializing `Partial` nodes
//! from the type's abstract layout as needed, and re-canonicalize on the
//! way out.
//!
//! Contexts are value-typed: the driver clones them at block boundaries
//! and merges them at joins. The lattice's small height keeps the deep
//! copies cheap for realistically sized functions.

use rustc_hash::{FxHashMap, FxHashSet};

use veld_ir::{Local, TypeId, TypeTable};

use crate::location::Location;
use crate::value::ObjectValue;

/// What an SSA name denotes during interpretation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Binding {
    /// An owned object value.
    Object(ObjectValue),
    /// The set of storage locations the name may designate. Always
    /// non-empty; grows at joins of paths that bound different storage.
    Locations(FxHashSet<Location>),
}

/// The state of one live allocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    /// The allocation's type; fixes the layout for path navigation.
    pub ty: TypeId,
    /// The object value stored in the allocation. Always canonical.
    pub value: ObjectValue,
}

/// The interpreter's state at one program point.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Context {
    /// SSA definitions in scope, keyed by local.
    pub locals: FxHashMap<Local, Binding>,
    /// Live allocations, keyed by root location.
    pub memory: FxHashMap<Location, Cell>,
}

impl Context {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage at `loc`. Returns `false` if the location is
    /// already allocated (the caller reports the stack leak).
    pub fn allocate(&mut self, loc: Location, ty: TypeId, value: ObjectValue) -> bool {
        debug_assert!(loc.is_root(), "allocating at sub-location {loc}");
        if self.memory.contains_key(&loc) {
            return false;
        }
        self.memory.insert(loc, Cell { ty, value });
        true
    }

    /// Free the storage at `loc`.
    ///
    /// # Panics
    ///
    /// Panics if `loc` is not a live allocation.
    pub fn deallocate(&mut self, loc: &Location) {
        let removed = self.memory.remove(loc);
        assert!(removed.is_some(), "deallocating dead location {loc}");
    }

    /// Is the allocation containing `loc` live?
    pub fn contains(&self, loc: &Location) -> bool {
        self.memory.contains_key(&loc.root_location())
    }

    /// Bind `local` to an owned object value.
    pub fn bind_object(&mut self, local: Local, value: ObjectValue) {
        debug_assert!(value.is_canonical());
        self.locals.insert(local, Binding::Object(value));
    }

    /// Bind `local` to a set of storage locations.
    pub fn bind_locations(&mut self, local: Local, locations: FxHashSet<Location>) {
        debug_assert!(!locations.is_empty(), "binding {local:?} to no locations");
        self.locals.insert(local, Binding::Locations(locations));
    }

    /// The object value bound to `local`.
    ///
    /// # Panics
    ///
    /// Panics if `local` is unbound or bound to locations; both indicate
    /// malformed IR upstream.
    pub fn object(&self, local: Local) -> &ObjectValue {
        match self.locals.get(&local) {
            Some(Binding::Object(v)) => v,
            Some(Binding::Locations(_)) => panic!("{local} denotes storage, not an object"),
            None => panic!("{local} is unbound"),
        }
    }

    /// Mutable access to the object value bound to `local`.
    pub fn object_mut(&mut self, local: Local) -> &mut ObjectValue {
        match self.locals.get_mut(&local) {
            Some(Binding::Object(v)) => v,
            Some(Binding::Locations(_)) => panic!("{local} denotes storage, not an object"),
            None => panic!("{local} is unbound"),
        }
    }

    /// The location set bound to `local`.
    ///
    /// # Panics
    ///
    /// Panics if `local` is unbound or bound to an object.
    pub fn locations(&self, local: Local) -> &FxHashSet<Location> {
        match self.locals.get(&local) {
            Some(Binding::Locations(ls)) => ls,
            Some(Binding::Object(_)) => panic!("{local} denotes an object, not storage"),
            None => panic!("{local} is unbound"),
        }
    }

    /// The value stored at `loc`, navigating its part path.
    ///
    /// A uniform (`Full`) region short-circuits: all of its sub-objects
    /// share its state.
    ///
    /// # Panics
    ///
    /// Panics if the allocation containing `loc` is not live.
    pub fn value_at(&self, loc: &Location) -> ObjectValue {
        let cell = self
            .memory
            .get(&loc.root_location())
            .unwrap_or_else(|| panic!("reading dead location {loc}"));
        cell.value.part_at(&loc.path)
    }

    /// Overwrite the value at `loc` with `value`, materializing partial
    /// nodes along the path from the allocation's layout and
    /// re-canonicalizing ancestors.
    ///
    /// # Panics
    ///
    /// Panics if the allocation containing `loc` is not live.
    pub fn write_at(&mut self, loc: &Location, value: ObjectValue, types: &TypeTable) {
        let cell = self
            .memory
            .get_mut(&loc.root_location())
            .unwrap_or_else(|| panic!("writing dead location {loc}"));
        write_rec(&mut cell.value, cell.ty, &loc.path, value, types);
        debug_assert!(cell.value.is_canonical());
    }

    /// The type of the storage designated by `loc`.
    ///
    /// # Panics
    ///
    /// Panics if the allocation containing `loc` is not live.
    pub fn located_type(&self, loc: &Location, types: &TypeTable) -> TypeId {
        let cell = self
            .memory
            .get(&loc.root_location())
            .unwrap_or_else(|| panic!("typing dead location {loc}"));
        types.part_at_path(cell.ty, &loc.path)
    }

    /// The value common to every location in `locations`.
    ///
    /// Locations bound to one SSA name must agree on their contents;
    /// divergence indicates a violation of borrowing discipline upstream.
    ///
    /// # Panics
    ///
    /// Panics if the set is empty or two locations disagree.
    pub fn common_value(&self, locations: &FxHashSet<Location>) -> ObjectValue {
        let mut iter = locations.iter();
        let first_loc = iter.next().unwrap_or_else(|| panic!("empty location set"));
        let first = self.value_at(first_loc);
        for loc in iter {
            let v = self.value_at(loc);
            assert!(
                v == first,
                "aliasing locations disagree: {first_loc} holds {first}, {loc} holds {v}"
            );
        }
        first
    }

    /// Merge with the context of another incoming path.
    ///
    /// Locals keep only the names defined on every path (those whose
    /// definitions dominate the join); location sets union, object values
    /// merge slot-wise. Memory keeps only the allocations live on every
    /// path.
    pub fn merge(&mut self, other: &Context) {
        self.locals.retain(|k, _| other.locals.contains_key(k));
        for (local, binding) in &mut self.locals {
            match (binding, &other.locals[local]) {
                (Binding::Object(a), Binding::Object(b)) => {
                    *a = std::mem::replace(a, ObjectValue::uninitialized()).merge(b.clone());
                }
                (Binding::Locations(a), Binding::Locations(b)) => {
                    a.extend(b.iter().cloned());
                }
                _ => panic!("{local} bound to an object on one path and storage on another"),
            }
        }

        self.memory.retain(|k, _| other.memory.contains_key(k));
        for (loc, cell) in &mut self.memory {
            let theirs = &other.memory[loc];
            debug_assert_eq!(cell.ty, theirs.ty, "allocation {loc} changed type");
            cell.value = std::mem::replace(&mut cell.value, ObjectValue::uninitialized())
                .merge(theirs.value.clone());
        }
    }
}

fn write_rec(
    value: &mut ObjectValue,
    ty: TypeId,
    path: &[u32],
    new: ObjectValue,
    types: &TypeTable,
) {
    let Some((&k, rest)) = path.split_first() else {
        *value = new.canonicalized();
        return;
    };
    let layout = types.layout(ty);
    if let ObjectValue::Full(s) = value {
        *value = ObjectValue::Partial(vec![ObjectValue::Full(s.clone()); layout.part_count()]);
    }
    let ObjectValue::Partial(parts) = value else {
        unreachable!()
    };
    write_rec(&mut parts[k as usize], layout.part(k as usize), rest, new, types);
    let owned = std::mem::replace(value, ObjectValue::uninitialized());
    *value = owned.canonicalized();
}

#[cfg(test)]
mod tests;
