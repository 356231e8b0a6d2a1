//! Module registry
//!
//! Modules move through a two-state lifecycle: types may only be added while
//! the module is `Building`; only `Sealed` modules are loadable. Sealing is
//! the point after which the module's metadata is immutable.

use rustc_hash::FxHashMap;

use kagami_sdk::{ModuleHandle, ModuleInfo, ReflectError, ReflectResult, TypeHandle};

/// Module lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    /// Module is being built
    Building,
    /// Module is sealed; metadata is immutable and the module is loadable
    Sealed,
}

/// A registered module
#[derive(Debug, Clone)]
pub struct ModuleDef {
    /// Handle of this module
    pub handle: ModuleHandle,
    /// Module name (unique across the registry)
    pub name: String,
    /// Lifecycle state
    pub state: ModuleState,
    /// Types registered in this module, in registration order
    pub types: Vec<TypeHandle>,
}

impl ModuleDef {
    /// Build the public info record for this module
    pub fn info(&self) -> ModuleInfo {
        ModuleInfo {
            name: self.name.clone(),
            handle: self.handle,
            sealed: self.state == ModuleState::Sealed,
        }
    }
}

/// Registry of all modules
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: FxHashMap<u32, ModuleDef>,
    by_name: FxHashMap<String, ModuleHandle>,
    next: u32,
}

impl ModuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new module in the `Building` state
    pub fn create(&mut self, name: &str) -> ReflectResult<ModuleHandle> {
        if self.by_name.contains_key(name) {
            return Err(ReflectError::DuplicateName(name.to_string()));
        }
        let handle = ModuleHandle::from_raw(self.next);
        self.next += 1;
        self.modules.insert(
            handle.raw(),
            ModuleDef {
                handle,
                name: name.to_string(),
                state: ModuleState::Building,
                types: Vec::new(),
            },
        );
        self.by_name.insert(name.to_string(), handle);
        Ok(handle)
    }

    /// Record a type in a module that is still being built
    pub fn add_type(&mut self, module: ModuleHandle, ty: TypeHandle) -> ReflectResult<()> {
        let def = self
            .modules
            .get_mut(&module.raw())
            .ok_or_else(|| ReflectError::UnknownHandle(module.to_string()))?;
        if def.state == ModuleState::Sealed {
            return Err(ReflectError::ModuleSealed(def.name.clone()));
        }
        def.types.push(ty);
        Ok(())
    }

    /// Seal a module, making it immutable and loadable
    ///
    /// Sealing an already sealed module is a no-op.
    pub fn seal(&mut self, module: ModuleHandle) -> ReflectResult<()> {
        let def = self
            .modules
            .get_mut(&module.raw())
            .ok_or_else(|| ReflectError::UnknownHandle(module.to_string()))?;
        def.state = ModuleState::Sealed;
        Ok(())
    }

    /// Resolve a sealed module by name
    pub fn load(&self, name: &str) -> ReflectResult<ModuleHandle> {
        let handle = self
            .by_name
            .get(name)
            .copied()
            .ok_or_else(|| ReflectError::UnknownModule(name.to_string()))?;
        let def = &self.modules[&handle.raw()];
        if def.state != ModuleState::Sealed {
            return Err(ReflectError::ModuleNotSealed(name.to_string()));
        }
        Ok(handle)
    }

    /// Get a module by handle
    pub fn get(&self, module: ModuleHandle) -> Option<&ModuleDef> {
        self.modules.get(&module.raw())
    }

    /// Number of registered modules
    pub fn count(&self) -> usize {
        self.modules.len()
    }
}
