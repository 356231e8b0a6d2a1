//! Type registry
//!
//! Owns every registered type and its members, allocates handles, and
//! answers name lookup, member resolution, and inheritance walks.

use rustc_hash::FxHashMap;

use kagami_sdk::{
    FieldInfo, MemberKind, MethodHandle, MethodInfo, ModuleHandle, TypeHandle, TypeInfo, TypeKind,
};

/// A registered type and its members
#[derive(Debug, Clone)]
pub struct TypeDef {
    /// Handle of this type
    pub handle: TypeHandle,
    /// Type name (unique across the registry)
    pub name: String,
    /// Type kind
    pub kind: TypeKind,
    /// Owning module, if any
    pub module: Option<ModuleHandle>,
    /// Parent type, if any
    pub parent: Option<TypeHandle>,
    /// Type parameter names (non-empty for generic definitions)
    pub type_params: Vec<String>,
    /// Type arguments (non-empty for generic instances)
    pub type_args: Vec<TypeHandle>,
    /// Declared fields in index order
    pub fields: Vec<FieldInfo>,
    /// Declared methods in index order
    pub methods: Vec<MethodInfo>,
}

impl TypeDef {
    /// Build the public info record for this type
    pub fn info(&self) -> TypeInfo {
        TypeInfo {
            kind: self.kind,
            name: self.name.clone(),
            handle: self.handle,
            module: self.module,
            parent: self.parent,
            element: None,
            type_params: self.type_params.clone(),
            type_args: self.type_args.clone(),
        }
    }
}

/// Where a member handle points
#[derive(Debug, Clone, Copy)]
enum MemberSlot {
    /// Member stored in its declaring type's tables
    Attached {
        owner: TypeHandle,
        kind: MemberKind,
        index: usize,
    },
}

/// Registry of all types and their members
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: FxHashMap<u32, TypeDef>,
    by_name: FxHashMap<String, TypeHandle>,
    members: FxHashMap<u32, MemberSlot>,
    /// Generic method instantiations, detached from any type's member tables
    /// so that member enumeration stays a pure query
    detached_methods: FxHashMap<u32, MethodInfo>,
    next_type: u32,
    next_member: u32,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next type handle
    pub fn alloc_type(&mut self) -> TypeHandle {
        let h = TypeHandle::from_raw(self.next_type);
        self.next_type += 1;
        h
    }

    /// Reserve the next member handle (shared space for fields and methods)
    pub fn alloc_member(&mut self) -> u32 {
        let raw = self.next_member;
        self.next_member += 1;
        raw
    }

    /// Insert a fully built type definition
    ///
    /// The definition's members must already carry handles allocated from
    /// this registry; they are indexed here for resolution.
    pub fn insert(&mut self, def: TypeDef) {
        for (i, field) in def.fields.iter().enumerate() {
            self.members.insert(
                field.handle.raw(),
                MemberSlot::Attached {
                    owner: def.handle,
                    kind: MemberKind::Field,
                    index: i,
                },
            );
        }
        for (i, method) in def.methods.iter().enumerate() {
            self.members.insert(
                method.handle.raw(),
                MemberSlot::Attached {
                    owner: def.handle,
                    kind: MemberKind::Method,
                    index: i,
                },
            );
        }
        self.by_name.insert(def.name.clone(), def.handle);
        self.types.insert(def.handle.raw(), def);
    }

    /// Insert a generic method instantiation that belongs to no member table
    pub fn insert_detached_method(&mut self, info: MethodInfo) {
        self.detached_methods.insert(info.handle.raw(), info);
    }

    /// Get a type by handle
    pub fn get(&self, handle: TypeHandle) -> Option<&TypeDef> {
        self.types.get(&handle.raw())
    }

    /// Whether a type handle resolves
    pub fn contains(&self, handle: TypeHandle) -> bool {
        self.types.contains_key(&handle.raw())
    }

    /// Resolve a type name
    pub fn by_name(&self, name: &str) -> Option<TypeHandle> {
        self.by_name.get(name).copied()
    }

    /// Resolve a field handle to its info
    pub fn field_info(&self, raw: u32) -> Option<&FieldInfo> {
        match self.members.get(&raw)? {
            MemberSlot::Attached { owner, kind, index } => {
                if *kind != MemberKind::Field {
                    return None;
                }
                self.types.get(&owner.raw())?.fields.get(*index)
            }
        }
    }

    /// Resolve a method handle to its info
    pub fn method_info(&self, raw: u32) -> Option<&MethodInfo> {
        if let Some(info) = self.detached_methods.get(&raw) {
            return Some(info);
        }
        match self.members.get(&raw)? {
            MemberSlot::Attached { owner, kind, index } => {
                if *kind != MemberKind::Method {
                    return None;
                }
                self.types.get(&owner.raw())?.methods.get(*index)
            }
        }
    }

    /// Whether a method handle resolves (attached or detached)
    pub fn contains_method(&self, handle: MethodHandle) -> bool {
        self.method_info(handle.raw()).is_some()
    }

    /// Walk the inheritance chain from a type to its root ancestor
    ///
    /// The first element is the type itself, the last is the root.
    pub fn hierarchy(&self, handle: TypeHandle) -> Vec<TypeHandle> {
        let mut chain = Vec::new();
        let mut current = Some(handle);
        while let Some(h) = current {
            match self.types.get(&h.raw()) {
                Some(def) => {
                    chain.push(h);
                    current = def.parent;
                }
                None => break,
            }
        }
        chain
    }

    /// Check whether `sub` is `sup` or inherits from it
    pub fn is_subtype_of(&self, sub: TypeHandle, sup: TypeHandle) -> bool {
        if sub == sup {
            return true;
        }
        let mut current = self.types.get(&sub.raw()).and_then(|d| d.parent);
        while let Some(h) = current {
            if h == sup {
                return true;
            }
            current = self.types.get(&h.raw()).and_then(|d| d.parent);
        }
        false
    }

    /// Number of registered types
    pub fn type_count(&self) -> usize {
        self.types.len()
    }
}
