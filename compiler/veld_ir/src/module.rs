//! A module: the unit the mid-end passes operate on.

use std::ops::{Index, IndexMut};

use crate::function::Function;
use crate::ids::FunctionId;
use crate::types::TypeTable;

/// A collection of functions plus the type table they share.
pub struct Module {
    /// Interned types and layout queries.
    pub types: TypeTable,
    functions: Vec<Function>,
}

impl Module {
    /// Create an empty module.
    pub fn new() -> Self {
        Module {
            types: TypeTable::new(),
            functions: Vec::new(),
        }
    }

    /// Add a function and return its id.
    pub fn add_function(&mut self, function: Function) -> FunctionId {
        let id = FunctionId::new(
            u32::try_from(self.functions.len())
                .unwrap_or_else(|_| panic!("function count exceeds u32::MAX")),
        );
        self.functions.push(function);
        id
    }

    /// Mutable access to a function together with shared access to the
    /// type table.
    ///
    /// Passes rewrite function bodies while querying layouts; the split
    /// borrow keeps both usable at once.
    pub fn function_and_types(&mut self, f: FunctionId) -> (&mut Function, &TypeTable) {
        (&mut self.functions[f.index()], &self.types)
    }
}

impl Default for Module {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<FunctionId> for Module {
    type Output = Function;

    fn index(&self, f: FunctionId) -> &Function {
        &self.functions[f.index()]
    }
}

impl IndexMut<FunctionId> for Module {
    fn index_mut(&mut self, f: FunctionId) -> &mut Function {
        &mut self.functions[f.index()]
    }
}
