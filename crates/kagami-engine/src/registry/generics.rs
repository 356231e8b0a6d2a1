//! Generic instantiation registry
//!
//! Tracks which (definition, ordered type arguments) pairs have already been
//! instantiated and what they produced, so instantiation is idempotent: the
//! same pair always resolves to the same result handle. A reverse index
//! answers "which instantiations exist for this definition".

use rustc_hash::FxHashMap;

use kagami_sdk::{MethodHandle, TypeHandle};

/// A generic definition: either a type or a method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericDef {
    /// A generic type definition
    Type(TypeHandle),
    /// A generic method definition
    Method(MethodHandle),
}

/// Registry of generic instantiations
#[derive(Debug, Default)]
pub struct GenericRegistry {
    /// (definition, ordered args) -> raw result handle
    instantiations: FxHashMap<(GenericDef, Vec<TypeHandle>), u32>,
    /// definition -> raw result handles, in creation order
    by_definition: FxHashMap<GenericDef, Vec<u32>>,
}

impl GenericRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an existing instantiation
    pub fn get(&self, def: GenericDef, args: &[TypeHandle]) -> Option<u32> {
        // Keyed by owned Vec; the borrow-by-slice lookup goes through a
        // temporary to keep the map type simple
        self.instantiations.get(&(def, args.to_vec())).copied()
    }

    /// Record a new instantiation
    pub fn insert(&mut self, def: GenericDef, args: Vec<TypeHandle>, result: u32) {
        self.instantiations.insert((def, args), result);
        self.by_definition.entry(def).or_default().push(result);
    }

    /// All instantiations recorded for a definition
    pub fn instantiations_of(&self, def: GenericDef) -> Vec<u32> {
        self.by_definition.get(&def).cloned().unwrap_or_default()
    }

    /// Number of recorded instantiations
    pub fn count(&self) -> usize {
        self.instantiations.len()
    }
}
