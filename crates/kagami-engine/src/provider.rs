//! Registry-backed reflection provider
//!
//! `RuntimeReflector` is the default implementation of the capability
//! traits: every query is answered from the metadata registries, and a
//! build surface (`define_module` / `define_type` / `attach_attribute` /
//! `seal_module`) populates them. Once the embedder has sealed its modules
//! the provider behaves as a pure query engine: identical queries always
//! produce equal answers, which is what the caching decorator relies on.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use kagami_sdk::{
    AttributeInfo, ElementRef, FieldHandle, FieldInfo, GenericConstruction, HandleResolution,
    MemberFilter, MemberInfo, MemberInvocation, MemberQuery, MethodHandle, MethodInfo,
    ModuleHandle, ModuleInfo, ModuleLoading, ParameterInfo, ReflectError, ReflectResult,
    TypeHandle, TypeInfo, TypeIntrospection, TypeKind, Value,
};

use crate::define::{MethodBody, TypeDefinition};
use crate::registry::{
    AttributeStore, GenericDef, GenericRegistry, ModuleRegistry, TypeDef, TypeRegistry,
};

static EMPTY_ATTRS: Lazy<Arc<[AttributeInfo]>> = Lazy::new(|| Vec::new().into());

/// The default, registry-backed reflection provider
///
/// Thread-safe: registries sit behind `RwLock`s, so queries from concurrent
/// callers need no external locking.
pub struct RuntimeReflector {
    types: RwLock<TypeRegistry>,
    modules: RwLock<ModuleRegistry>,
    generics: RwLock<GenericRegistry>,
    attributes: RwLock<AttributeStore>,
    bodies: RwLock<FxHashMap<u32, MethodBody>>,
    field_values: RwLock<FxHashMap<u32, Value>>,
}

impl Default for RuntimeReflector {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeReflector {
    /// Create an empty provider
    pub fn new() -> Self {
        Self {
            types: RwLock::new(TypeRegistry::new()),
            modules: RwLock::new(ModuleRegistry::new()),
            generics: RwLock::new(GenericRegistry::new()),
            attributes: RwLock::new(AttributeStore::new()),
            bodies: RwLock::new(FxHashMap::default()),
            field_values: RwLock::new(FxHashMap::default()),
        }
    }

    // ========================================================================
    // Build surface
    // ========================================================================

    /// Register a new module in the building state
    pub fn define_module(&self, name: &str) -> ReflectResult<ModuleHandle> {
        let handle = self.modules.write().create(name)?;
        debug!(module = name, "defined module");
        Ok(handle)
    }

    /// Seal a module, making it immutable and loadable
    pub fn seal_module(&self, module: ModuleHandle) -> ReflectResult<()> {
        self.modules.write().seal(module)?;
        debug!(module = module.raw(), "sealed module");
        Ok(())
    }

    /// Register a type from a definition record
    ///
    /// Allocates the type and member handles, stores method bodies and field
    /// values, and records the type in its module (which must still be
    /// building).
    pub fn define_type(&self, definition: TypeDefinition) -> ReflectResult<TypeHandle> {
        let mut types = self.types.write();
        let mut modules = self.modules.write();

        if types.by_name(&definition.name).is_some() {
            return Err(ReflectError::DuplicateName(definition.name));
        }
        if let Some(parent) = definition.parent {
            if !types.contains(parent) {
                return Err(ReflectError::UnknownHandle(parent.to_string()));
            }
        }
        if let Some(module) = definition.module {
            // Surfaces UnknownHandle/ModuleSealed before any handle is spent
            let def = modules
                .get(module)
                .ok_or_else(|| ReflectError::UnknownHandle(module.to_string()))?;
            if def.info().sealed {
                return Err(ReflectError::ModuleSealed(def.name.clone()));
            }
        }

        let handle = types.alloc_type();
        let mut bodies = self.bodies.write();
        let mut field_values = self.field_values.write();

        let mut fields = Vec::with_capacity(definition.fields.len());
        for (index, fd) in definition.fields.into_iter().enumerate() {
            let field_handle = FieldHandle::from_raw(types.alloc_member());
            if let Some(value) = fd.initial_value {
                field_values.insert(field_handle.raw(), value);
            }
            fields.push(FieldInfo {
                name: fd.name,
                handle: field_handle,
                declaring: handle,
                type_name: fd.type_name,
                modifiers: fd.modifiers,
                index,
            });
        }

        let mut methods = Vec::with_capacity(definition.methods.len());
        for (index, md) in definition.methods.into_iter().enumerate() {
            let method_handle = MethodHandle::from_raw(types.alloc_member());
            if let Some(body) = md.body {
                bodies.insert(method_handle.raw(), body);
            }
            methods.push(MethodInfo {
                name: md.name,
                handle: method_handle,
                declaring: handle,
                return_type: md.return_type,
                parameters: md.parameters,
                modifiers: md.modifiers,
                type_params: md.type_params,
                index,
            });
        }

        let name = definition.name.clone();
        types.insert(TypeDef {
            handle,
            name: definition.name,
            kind: definition.kind,
            module: definition.module,
            parent: definition.parent,
            type_params: definition.type_params,
            type_args: Vec::new(),
            fields,
            methods,
        });
        if let Some(module) = definition.module {
            modules.add_type(module, handle)?;
        }
        debug!(ty = %name, handle = handle.raw(), "defined type");
        Ok(handle)
    }

    /// Attach an attribute to a registered element
    pub fn attach_attribute(
        &self,
        element: ElementRef,
        attribute: AttributeInfo,
    ) -> ReflectResult<()> {
        self.check_element(element)?;
        self.attributes.write().define(element, attribute);
        Ok(())
    }

    // ========================================================================
    // Query helpers
    // ========================================================================

    fn check_element(&self, element: ElementRef) -> ReflectResult<()> {
        let types = self.types.read();
        let ok = match element {
            ElementRef::Type(t) => types.contains(t),
            ElementRef::Method(m) => types.method_info(m.raw()).is_some(),
            ElementRef::Field(f) => types.field_info(f.raw()).is_some(),
        };
        if ok {
            Ok(())
        } else {
            let desc = match element {
                ElementRef::Type(t) => t.to_string(),
                ElementRef::Method(m) => m.to_string(),
                ElementRef::Field(f) => f.to_string(),
            };
            Err(ReflectError::UnknownHandle(desc))
        }
    }

    /// Enumerate fields along the hierarchy, honoring shadowing: a name
    /// declared closer to `ty` hides the same name further up the chain.
    fn collect_fields(&self, ty: TypeHandle, filter: MemberFilter) -> ReflectResult<Vec<FieldInfo>> {
        let types = self.types.read();
        if !types.contains(ty) {
            return Err(ReflectError::UnknownHandle(ty.to_string()));
        }
        let chain = if filter.contains(MemberFilter::DECLARED_ONLY) {
            vec![ty]
        } else {
            types.hierarchy(ty)
        };
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut out = Vec::new();
        for t in chain {
            if let Some(def) = types.get(t) {
                for f in &def.fields {
                    if seen.insert(f.name.clone()) && filter.admits(f.modifiers) {
                        out.push(f.clone());
                    }
                }
            }
        }
        Ok(out)
    }

    fn collect_methods(
        &self,
        ty: TypeHandle,
        filter: MemberFilter,
    ) -> ReflectResult<Vec<MethodInfo>> {
        let types = self.types.read();
        if !types.contains(ty) {
            return Err(ReflectError::UnknownHandle(ty.to_string()));
        }
        let chain = if filter.contains(MemberFilter::DECLARED_ONLY) {
            vec![ty]
        } else {
            types.hierarchy(ty)
        };
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut out = Vec::new();
        for t in chain {
            if let Some(def) = types.get(t) {
                for m in &def.methods {
                    if seen.insert(m.name.clone()) && filter.admits(m.modifiers) {
                        out.push(m.clone());
                    }
                }
            }
        }
        Ok(out)
    }

    fn collect_members(
        &self,
        ty: TypeHandle,
        filter: MemberFilter,
    ) -> ReflectResult<Vec<MemberInfo>> {
        let mut out: Vec<MemberInfo> = self
            .collect_fields(ty, filter)?
            .into_iter()
            .map(MemberInfo::Field)
            .collect();
        out.extend(
            self.collect_methods(ty, filter)?
                .into_iter()
                .map(MemberInfo::Method),
        );
        Ok(out)
    }

    /// Substitute generic parameter names with argument type names
    fn substitute(name: &str, map: &FxHashMap<&str, &str>) -> String {
        match map.get(name) {
            Some(replacement) => (*replacement).to_string(),
            None => name.to_string(),
        }
    }
}

// ============================================================================
// Capability implementations
// ============================================================================

impl ModuleLoading for RuntimeReflector {
    fn load_module(&self, name: &str) -> ReflectResult<ModuleHandle> {
        self.modules.read().load(name)
    }

    fn module_info(&self, module: ModuleHandle) -> ReflectResult<ModuleInfo> {
        self.modules
            .read()
            .get(module)
            .map(|def| def.info())
            .ok_or_else(|| ReflectError::UnknownHandle(module.to_string()))
    }

    fn type_by_name(&self, name: &str) -> ReflectResult<TypeHandle> {
        self.types
            .read()
            .by_name(name)
            .ok_or_else(|| ReflectError::UnknownType(name.to_string()))
    }

    fn types_in(&self, module: ModuleHandle) -> ReflectResult<Vec<TypeHandle>> {
        self.modules
            .read()
            .get(module)
            .map(|def| def.types.clone())
            .ok_or_else(|| ReflectError::UnknownHandle(module.to_string()))
    }
}

impl TypeIntrospection for RuntimeReflector {
    fn attributes(&self, element: ElementRef) -> ReflectResult<Arc<[AttributeInfo]>> {
        self.check_element(element)?;
        let attrs = self.attributes.read().all(element);
        if attrs.is_empty() {
            Ok(EMPTY_ATTRS.clone())
        } else {
            Ok(attrs.into())
        }
    }

    fn attributes_of_kind(
        &self,
        element: ElementRef,
        kind: &str,
    ) -> ReflectResult<Arc<[AttributeInfo]>> {
        self.check_element(element)?;
        let attrs = self.attributes.read().of_kind(element, kind);
        if attrs.is_empty() {
            Ok(EMPTY_ATTRS.clone())
        } else {
            Ok(attrs.into())
        }
    }

    fn has_attribute(&self, element: ElementRef, kind: &str) -> ReflectResult<bool> {
        self.check_element(element)?;
        Ok(self.attributes.read().has(element, kind))
    }

    fn fields(&self, ty: TypeHandle, filter: MemberFilter) -> ReflectResult<Arc<[FieldInfo]>> {
        Ok(self.collect_fields(ty, filter)?.into())
    }

    fn methods(&self, ty: TypeHandle, filter: MemberFilter) -> ReflectResult<Arc<[MethodInfo]>> {
        Ok(self.collect_methods(ty, filter)?.into())
    }

    fn find_members(
        &self,
        ty: TypeHandle,
        query: &MemberQuery,
    ) -> ReflectResult<Arc<[MemberInfo]>> {
        let mut members = self.collect_members(ty, query.filter)?;
        members.retain(|m| query.matches(m));
        Ok(members.into())
    }

    fn find_members_where(
        &self,
        ty: TypeHandle,
        filter: MemberFilter,
        predicate: &dyn Fn(&MemberInfo) -> bool,
    ) -> ReflectResult<Vec<MemberInfo>> {
        let mut members = self.collect_members(ty, filter)?;
        members.retain(|m| predicate(m));
        Ok(members)
    }
}

impl GenericConstruction for RuntimeReflector {
    fn instantiate_type(
        &self,
        definition: TypeHandle,
        args: &[TypeHandle],
    ) -> ReflectResult<TypeHandle> {
        // Validation pass under read locks
        {
            let types = self.types.read();
            let def = types
                .get(definition)
                .ok_or_else(|| ReflectError::UnknownHandle(definition.to_string()))?;
            if def.kind != TypeKind::GenericDefinition {
                return Err(ReflectError::NotGeneric(def.name.clone()));
            }
            if args.len() != def.type_params.len() {
                return Err(ReflectError::ArityMismatch {
                    expected: def.type_params.len(),
                    got: args.len(),
                });
            }
            for arg in args {
                if !types.contains(*arg) {
                    return Err(ReflectError::UnknownHandle(arg.to_string()));
                }
            }
            if let Some(existing) = self.generics.read().get(GenericDef::Type(definition), args) {
                return Ok(TypeHandle::from_raw(existing));
            }
        }

        // Construction pass; the re-check keeps racing instantiations of the
        // same pair converging on one handle
        let mut types = self.types.write();
        let mut generics = self.generics.write();
        if let Some(existing) = generics.get(GenericDef::Type(definition), args) {
            return Ok(TypeHandle::from_raw(existing));
        }

        let def = types
            .get(definition)
            .ok_or_else(|| ReflectError::UnknownHandle(definition.to_string()))?
            .clone();
        let arg_names: Vec<String> = args
            .iter()
            .map(|a| types.get(*a).map(|d| d.name.clone()).unwrap_or_default())
            .collect();
        let substitutions: FxHashMap<&str, &str> = def
            .type_params
            .iter()
            .map(|p| p.as_str())
            .zip(arg_names.iter().map(|n| n.as_str()))
            .collect();
        let instance_name = format!("{}_{}", def.name, arg_names.join("_"));

        let handle = types.alloc_type();
        let mut bodies = self.bodies.write();
        let mut field_values = self.field_values.write();

        let fields = def
            .fields
            .iter()
            .map(|f| {
                let field_handle = FieldHandle::from_raw(types.alloc_member());
                if let Some(value) = field_values.get(&f.handle.raw()).cloned() {
                    field_values.insert(field_handle.raw(), value);
                }
                FieldInfo {
                    name: f.name.clone(),
                    handle: field_handle,
                    declaring: handle,
                    type_name: Self::substitute(&f.type_name, &substitutions),
                    modifiers: f.modifiers,
                    index: f.index,
                }
            })
            .collect();

        let methods = def
            .methods
            .iter()
            .map(|m| {
                let method_handle = MethodHandle::from_raw(types.alloc_member());
                if let Some(body) = bodies.get(&m.handle.raw()).cloned() {
                    bodies.insert(method_handle.raw(), body);
                }
                MethodInfo {
                    name: m.name.clone(),
                    handle: method_handle,
                    declaring: handle,
                    return_type: Self::substitute(&m.return_type, &substitutions),
                    parameters: m
                        .parameters
                        .iter()
                        .map(|p| ParameterInfo {
                            name: p.name.clone(),
                            type_name: Self::substitute(&p.type_name, &substitutions),
                            index: p.index,
                            optional: p.optional,
                        })
                        .collect(),
                    modifiers: m.modifiers,
                    type_params: m.type_params.clone(),
                    index: m.index,
                }
            })
            .collect();

        types.insert(TypeDef {
            handle,
            name: instance_name.clone(),
            kind: TypeKind::GenericInstance,
            module: None,
            parent: def.parent,
            type_params: Vec::new(),
            type_args: args.to_vec(),
            fields,
            methods,
        });
        generics.insert(GenericDef::Type(definition), args.to_vec(), handle.raw());
        debug!(instance = %instance_name, "instantiated generic type");
        Ok(handle)
    }

    fn instantiate_method(
        &self,
        definition: MethodHandle,
        args: &[TypeHandle],
    ) -> ReflectResult<MethodHandle> {
        {
            let types = self.types.read();
            let def = types
                .method_info(definition.raw())
                .ok_or_else(|| ReflectError::UnknownHandle(definition.to_string()))?;
            if def.type_params.is_empty() {
                return Err(ReflectError::NotGeneric(def.name.clone()));
            }
            if args.len() != def.type_params.len() {
                return Err(ReflectError::ArityMismatch {
                    expected: def.type_params.len(),
                    got: args.len(),
                });
            }
            for arg in args {
                if !types.contains(*arg) {
                    return Err(ReflectError::UnknownHandle(arg.to_string()));
                }
            }
            if let Some(existing) = self
                .generics
                .read()
                .get(GenericDef::Method(definition), args)
            {
                return Ok(MethodHandle::from_raw(existing));
            }
        }

        let mut types = self.types.write();
        let mut generics = self.generics.write();
        if let Some(existing) = generics.get(GenericDef::Method(definition), args) {
            return Ok(MethodHandle::from_raw(existing));
        }

        let def = types
            .method_info(definition.raw())
            .ok_or_else(|| ReflectError::UnknownHandle(definition.to_string()))?
            .clone();
        let arg_names: Vec<String> = args
            .iter()
            .map(|a| types.get(*a).map(|d| d.name.clone()).unwrap_or_default())
            .collect();
        let substitutions: FxHashMap<&str, &str> = def
            .type_params
            .iter()
            .map(|p| p.as_str())
            .zip(arg_names.iter().map(|n| n.as_str()))
            .collect();

        let handle = MethodHandle::from_raw(types.alloc_member());
        let mut bodies = self.bodies.write();
        if let Some(body) = bodies.get(&definition.raw()).cloned() {
            bodies.insert(handle.raw(), body);
        }
        types.insert_detached_method(MethodInfo {
            name: def.name.clone(),
            handle,
            declaring: def.declaring,
            return_type: Self::substitute(&def.return_type, &substitutions),
            parameters: def
                .parameters
                .iter()
                .map(|p| ParameterInfo {
                    name: p.name.clone(),
                    type_name: Self::substitute(&p.type_name, &substitutions),
                    index: p.index,
                    optional: p.optional,
                })
                .collect(),
            modifiers: def.modifiers,
            type_params: Vec::new(),
            index: def.index,
        });
        generics.insert(GenericDef::Method(definition), args.to_vec(), handle.raw());
        debug!(method = %def.name, "instantiated generic method");
        Ok(handle)
    }

    fn instantiations_of(&self, definition: TypeHandle) -> ReflectResult<Vec<TypeHandle>> {
        if !self.types.read().contains(definition) {
            return Err(ReflectError::UnknownHandle(definition.to_string()));
        }
        Ok(self
            .generics
            .read()
            .instantiations_of(GenericDef::Type(definition))
            .into_iter()
            .map(TypeHandle::from_raw)
            .collect())
    }
}

impl MemberInvocation for RuntimeReflector {
    fn invoke(
        &self,
        method: MethodHandle,
        receiver: Option<Value>,
        args: &[Value],
    ) -> ReflectResult<Value> {
        let info = {
            let types = self.types.read();
            types
                .method_info(method.raw())
                .ok_or_else(|| ReflectError::UnknownHandle(method.to_string()))?
                .clone()
        };
        if !info.type_params.is_empty() {
            return Err(ReflectError::InvocationError(format!(
                "generic method definition {} must be instantiated before invocation",
                info.name
            )));
        }
        if info.modifiers.is_static && receiver.is_some() {
            return Err(ReflectError::InvocationError(format!(
                "static method {} does not take a receiver",
                info.name
            )));
        }
        if !info.modifiers.is_static && receiver.is_none() {
            return Err(ReflectError::InvocationError(format!(
                "instance method {} requires a receiver",
                info.name
            )));
        }
        let required = info.required_arity();
        if args.len() < required || args.len() > info.parameters.len() {
            return Err(ReflectError::ArityMismatch {
                expected: info.parameters.len(),
                got: args.len(),
            });
        }
        let body = self
            .bodies
            .read()
            .get(&method.raw())
            .cloned()
            .ok_or_else(|| {
                ReflectError::InvocationError(format!("method {} has no body", info.name))
            })?;
        body(receiver.as_ref(), args)
    }

    fn get_field(&self, field: FieldHandle) -> ReflectResult<Value> {
        let name = {
            let types = self.types.read();
            types
                .field_info(field.raw())
                .ok_or_else(|| ReflectError::UnknownHandle(field.to_string()))?
                .name
                .clone()
        };
        self.field_values
            .read()
            .get(&field.raw())
            .cloned()
            .ok_or_else(|| {
                ReflectError::InvocationError(format!("field {} has no registered value", name))
            })
    }
}

impl HandleResolution for RuntimeReflector {
    fn resolve_type(&self, ty: TypeHandle) -> ReflectResult<Arc<TypeInfo>> {
        self.types
            .read()
            .get(ty)
            .map(|def| Arc::new(def.info()))
            .ok_or_else(|| ReflectError::UnknownHandle(ty.to_string()))
    }

    fn resolve_method(&self, method: MethodHandle) -> ReflectResult<Arc<MethodInfo>> {
        self.types
            .read()
            .method_info(method.raw())
            .map(|info| Arc::new(info.clone()))
            .ok_or_else(|| ReflectError::UnknownHandle(method.to_string()))
    }

    fn resolve_field(&self, field: FieldHandle) -> ReflectResult<Arc<FieldInfo>> {
        self.types
            .read()
            .field_info(field.raw())
            .map(|info| Arc::new(info.clone()))
            .ok_or_else(|| ReflectError::UnknownHandle(field.to_string()))
    }
}
