//! The memoizing reflection decorator

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, trace};

use kagami_sdk::{
    AttributeInfo, ElementRef, FieldHandle, FieldInfo, GenericConstruction, HandleResolution,
    MemberFilter, MemberInfo, MemberInvocation, MemberQuery, MethodHandle, MethodInfo,
    ModuleHandle, ModuleInfo, ModuleLoading, Reflector, ReflectResult, TypeHandle, TypeInfo,
    TypeIntrospection, Value,
};

use super::key::{AttrKey, GenericKey, MemberKey, SearchKey};
use super::options::CacheOptions;

/// A reflection provider decorator that memoizes selected query categories
///
/// Wraps any [`Reflector`] and implements the same surface. Queries in
/// enabled categories are answered from per-category concurrent maps keyed
/// by (element, arguments); everything else forwards directly. Entries are
/// never evicted: the wrapped metadata is immutable, so a stored answer
/// stays correct for the decorator's lifetime.
///
/// Concurrent first accesses of one key may each reach the provider (a
/// stampede), which duplicates work but not results; last write wins and
/// every later hit observes one stored snapshot. The shard lock is never
/// held across a delegated call.
pub struct CachedReflector<R> {
    inner: R,
    options: CacheOptions,
    attrs: DashMap<AttrKey, Arc<[AttributeInfo]>>,
    fields: DashMap<MemberKey, Arc<[FieldInfo]>>,
    methods: DashMap<MemberKey, Arc<[MethodInfo]>>,
    searches: DashMap<SearchKey, Arc<[MemberInfo]>>,
    generics: DashMap<GenericKey, u32>,
}

impl<R> CachedReflector<R> {
    /// Wrap a provider with the given category flags
    pub fn new(inner: R, options: CacheOptions) -> Self {
        debug!(options = %options, "constructed caching reflector");
        Self {
            inner,
            options,
            attrs: DashMap::new(),
            fields: DashMap::new(),
            methods: DashMap::new(),
            searches: DashMap::new(),
            generics: DashMap::new(),
        }
    }

    /// The configured category flags
    pub fn options(&self) -> CacheOptions {
        self.options
    }

    /// A reference to the wrapped provider
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Unwrap, discarding all cached entries
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Total number of stored entries across all regions
    pub fn entry_count(&self) -> usize {
        self.attrs.len()
            + self.fields.len()
            + self.methods.len()
            + self.searches.len()
            + self.generics.len()
    }

    fn enabled(&self, category: CacheOptions) -> bool {
        self.options.contains(category)
    }
}

impl<R: Reflector> ModuleLoading for CachedReflector<R> {
    fn load_module(&self, name: &str) -> ReflectResult<ModuleHandle> {
        self.inner.load_module(name)
    }

    fn module_info(&self, module: ModuleHandle) -> ReflectResult<ModuleInfo> {
        self.inner.module_info(module)
    }

    fn type_by_name(&self, name: &str) -> ReflectResult<TypeHandle> {
        self.inner.type_by_name(name)
    }

    fn types_in(&self, module: ModuleHandle) -> ReflectResult<Vec<TypeHandle>> {
        self.inner.types_in(module)
    }
}

impl<R: Reflector> TypeIntrospection for CachedReflector<R> {
    fn attributes(&self, element: ElementRef) -> ReflectResult<Arc<[AttributeInfo]>> {
        if !self.enabled(CacheOptions::ATTRIBUTES) {
            return self.inner.attributes(element);
        }
        let key = AttrKey::unfiltered(element);
        if let Some(hit) = self.attrs.get(&key) {
            trace!(?element, "attribute cache hit");
            return Ok(hit.clone());
        }
        let result = self.inner.attributes(element)?;
        self.attrs.insert(key, result.clone());
        trace!(?element, "attribute cache miss stored");
        Ok(result)
    }

    fn attributes_of_kind(
        &self,
        element: ElementRef,
        kind: &str,
    ) -> ReflectResult<Arc<[AttributeInfo]>> {
        if !self.enabled(CacheOptions::ATTRIBUTES) {
            return self.inner.attributes_of_kind(element, kind);
        }
        let key = AttrKey::of_kind(element, kind);
        if let Some(hit) = self.attrs.get(&key) {
            trace!(?element, kind, "attribute cache hit");
            return Ok(hit.clone());
        }
        let result = self.inner.attributes_of_kind(element, kind)?;
        self.attrs.insert(key, result.clone());
        trace!(?element, kind, "attribute cache miss stored");
        Ok(result)
    }

    fn has_attribute(&self, element: ElementRef, kind: &str) -> ReflectResult<bool> {
        if !self.enabled(CacheOptions::ATTRIBUTES) {
            return self.inner.has_attribute(element, kind);
        }
        // Answered from the unfiltered entry so the boolean variant and the
        // list variant share one region and cannot disagree
        let attrs = self.attributes(element)?;
        Ok(attrs.iter().any(|a| a.kind == kind))
    }

    fn fields(&self, ty: TypeHandle, filter: MemberFilter) -> ReflectResult<Arc<[FieldInfo]>> {
        if !self.enabled(CacheOptions::MEMBERS) {
            return self.inner.fields(ty, filter);
        }
        let key = MemberKey { ty, filter };
        if let Some(hit) = self.fields.get(&key) {
            trace!(ty = ty.raw(), "field enumeration cache hit");
            return Ok(hit.clone());
        }
        let result = self.inner.fields(ty, filter)?;
        self.fields.insert(key, result.clone());
        trace!(ty = ty.raw(), "field enumeration cache miss stored");
        Ok(result)
    }

    fn methods(&self, ty: TypeHandle, filter: MemberFilter) -> ReflectResult<Arc<[MethodInfo]>> {
        if !self.enabled(CacheOptions::MEMBERS) {
            return self.inner.methods(ty, filter);
        }
        let key = MemberKey { ty, filter };
        if let Some(hit) = self.methods.get(&key) {
            trace!(ty = ty.raw(), "method enumeration cache hit");
            return Ok(hit.clone());
        }
        let result = self.inner.methods(ty, filter)?;
        self.methods.insert(key, result.clone());
        trace!(ty = ty.raw(), "method enumeration cache miss stored");
        Ok(result)
    }

    fn find_members(
        &self,
        ty: TypeHandle,
        query: &MemberQuery,
    ) -> ReflectResult<Arc<[MemberInfo]>> {
        if !self.enabled(CacheOptions::SEARCH) {
            return self.inner.find_members(ty, query);
        }
        let key = SearchKey {
            ty,
            query: query.clone(),
        };
        if let Some(hit) = self.searches.get(&key) {
            trace!(ty = ty.raw(), "member search cache hit");
            return Ok(hit.clone());
        }
        let result = self.inner.find_members(ty, query)?;
        self.searches.insert(key, result.clone());
        trace!(ty = ty.raw(), "member search cache miss stored");
        Ok(result)
    }

    fn find_members_where(
        &self,
        ty: TypeHandle,
        filter: MemberFilter,
        predicate: &dyn Fn(&MemberInfo) -> bool,
    ) -> ReflectResult<Vec<MemberInfo>> {
        // Opaque predicates have no stable identity to key on; always
        // delegate, even when SEARCH caching is enabled
        self.inner.find_members_where(ty, filter, predicate)
    }
}

impl<R: Reflector> GenericConstruction for CachedReflector<R> {
    fn instantiate_type(
        &self,
        definition: TypeHandle,
        args: &[TypeHandle],
    ) -> ReflectResult<TypeHandle> {
        if !self.enabled(CacheOptions::GENERICS) {
            return self.inner.instantiate_type(definition, args);
        }
        let key = GenericKey::for_type(definition, args);
        if let Some(hit) = self.generics.get(&key) {
            trace!(definition = definition.raw(), "instantiation cache hit");
            return Ok(TypeHandle::from_raw(*hit));
        }
        let result = self.inner.instantiate_type(definition, args)?;
        self.generics.insert(key, result.raw());
        trace!(definition = definition.raw(), "instantiation cache miss stored");
        Ok(result)
    }

    fn instantiate_method(
        &self,
        definition: MethodHandle,
        args: &[TypeHandle],
    ) -> ReflectResult<MethodHandle> {
        if !self.enabled(CacheOptions::GENERICS) {
            return self.inner.instantiate_method(definition, args);
        }
        let key = GenericKey::for_method(definition, args);
        if let Some(hit) = self.generics.get(&key) {
            trace!(definition = definition.raw(), "instantiation cache hit");
            return Ok(MethodHandle::from_raw(*hit));
        }
        let result = self.inner.instantiate_method(definition, args)?;
        self.generics.insert(key, result.raw());
        trace!(definition = definition.raw(), "instantiation cache miss stored");
        Ok(result)
    }

    fn instantiations_of(&self, definition: TypeHandle) -> ReflectResult<Vec<TypeHandle>> {
        // Grows as instantiations are constructed, so never memoized
        self.inner.instantiations_of(definition)
    }
}

impl<R: Reflector> MemberInvocation for CachedReflector<R> {
    fn invoke(
        &self,
        method: MethodHandle,
        receiver: Option<Value>,
        args: &[Value],
    ) -> ReflectResult<Value> {
        self.inner.invoke(method, receiver, args)
    }

    fn get_field(&self, field: FieldHandle) -> ReflectResult<Value> {
        self.inner.get_field(field)
    }
}

impl<R: Reflector> HandleResolution for CachedReflector<R> {
    fn resolve_type(&self, ty: TypeHandle) -> ReflectResult<Arc<TypeInfo>> {
        self.inner.resolve_type(ty)
    }

    fn resolve_method(&self, method: MethodHandle) -> ReflectResult<Arc<MethodInfo>> {
        self.inner.resolve_method(method)
    }

    fn resolve_field(&self, field: FieldHandle) -> ReflectResult<Arc<FieldInfo>> {
        self.inner.resolve_field(field)
    }
}
