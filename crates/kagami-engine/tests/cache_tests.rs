//! Caching decorator behavior against a call-counting provider

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use kagami_engine::{
    CacheOptions, CachedReflector, FieldDefinition, MethodDefinition, RuntimeReflector,
    TypeDefinition,
};
use kagami_sdk::{
    AttributeInfo, ElementRef, FieldHandle, FieldInfo, GenericConstruction, HandleResolution,
    MemberFilter, MemberInfo, MemberInvocation, MemberQuery, MethodHandle, MethodInfo,
    ModuleHandle, ModuleInfo, ModuleLoading, ReflectError, ReflectResult, TypeHandle, TypeInfo,
    TypeIntrospection, Value,
};

/// Decorator that counts how often each query category reaches the
/// underlying provider
struct CountingReflector<R> {
    inner: R,
    attribute_calls: AtomicUsize,
    enumeration_calls: AtomicUsize,
    search_calls: AtomicUsize,
    construction_calls: AtomicUsize,
}

impl<R> CountingReflector<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            attribute_calls: AtomicUsize::new(0),
            enumeration_calls: AtomicUsize::new(0),
            search_calls: AtomicUsize::new(0),
            construction_calls: AtomicUsize::new(0),
        }
    }

    fn attribute_calls(&self) -> usize {
        self.attribute_calls.load(Ordering::SeqCst)
    }

    fn enumeration_calls(&self) -> usize {
        self.enumeration_calls.load(Ordering::SeqCst)
    }

    fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    fn construction_calls(&self) -> usize {
        self.construction_calls.load(Ordering::SeqCst)
    }
}

impl<R: ModuleLoading> ModuleLoading for CountingReflector<R> {
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

impl<R: TypeIntrospection> TypeIntrospection for CountingReflector<R> {
    fn attributes(&self, element: ElementRef) -> ReflectResult<Arc<[AttributeInfo]>> {
        self.attribute_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.attributes(element)
    }

    fn attributes_of_kind(
        &self,
        element: ElementRef,
        kind: &str,
    ) -> ReflectResult<Arc<[AttributeInfo]>> {
        self.attribute_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.attributes_of_kind(element, kind)
    }

    fn has_attribute(&self, element: ElementRef, kind: &str) -> ReflectResult<bool> {
        self.attribute_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.has_attribute(element, kind)
    }

    fn fields(&self, ty: TypeHandle, filter: MemberFilter) -> ReflectResult<Arc<[FieldInfo]>> {
        self.enumeration_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fields(ty, filter)
    }

    fn methods(&self, ty: TypeHandle, filter: MemberFilter) -> ReflectResult<Arc<[MethodInfo]>> {
        self.enumeration_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.methods(ty, filter)
    }

    fn find_members(
        &self,
        ty: TypeHandle,
        query: &MemberQuery,
    ) -> ReflectResult<Arc<[MemberInfo]>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find_members(ty, query)
    }

    fn find_members_where(
        &self,
        ty: TypeHandle,
        filter: MemberFilter,
        predicate: &dyn Fn(&MemberInfo) -> bool,
    ) -> ReflectResult<Vec<MemberInfo>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find_members_where(ty, filter, predicate)
    }
}

impl<R: GenericConstruction> GenericConstruction for CountingReflector<R> {
    fn instantiate_type(
        &self,
        definition: TypeHandle,
        args: &[TypeHandle],
    ) -> ReflectResult<TypeHandle> {
        self.construction_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.instantiate_type(definition, args)
    }

    fn instantiate_method(
        &self,
        definition: MethodHandle,
        args: &[TypeHandle],
    ) -> ReflectResult<MethodHandle> {
        self.construction_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.instantiate_method(definition, args)
    }

    fn instantiations_of(&self, definition: TypeHandle) -> ReflectResult<Vec<TypeHandle>> {
        self.inner.instantiations_of(definition)
    }
}

impl<R: MemberInvocation> MemberInvocation for CountingReflector<R> {
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

impl<R: HandleResolution> HandleResolution for CountingReflector<R> {
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

/// A provider with one class carrying a field, two methods, and an
/// attribute, plus primitives and a generic definition
struct Fixture {
    provider: RuntimeReflector,
    user: TypeHandle,
    list: TypeHandle,
    int: TypeHandle,
    str_: TypeHandle,
}

fn fixture() -> Fixture {
    let provider = RuntimeReflector::new();
    let module = provider.define_module("app").unwrap();
    let int = provider
        .define_type(TypeDefinition::primitive("int"))
        .unwrap();
    let str_ = provider
        .define_type(TypeDefinition::primitive("str"))
        .unwrap();
    let user = provider
        .define_type(
            TypeDefinition::class("User", module)
                .with_field(FieldDefinition::new("name", "str"))
                .with_method(MethodDefinition::new("greet", "str"))
                .with_method(MethodDefinition::new("rename", "null").with_param("to", "str")),
        )
        .unwrap();
    let list = provider
        .define_type(
            TypeDefinition::class("List", module)
                .generic_over(&["T"])
                .with_field(FieldDefinition::new("head", "T")),
        )
        .unwrap();
    provider
        .attach_attribute(user.into(), AttributeInfo::with_args("entity", vec![Value::from("users")]))
        .unwrap();
    provider.seal_module(module).unwrap();
    Fixture {
        provider,
        user,
        list,
        int,
        str_,
    }
}

#[test]
fn attribute_queries_hit_provider_once_when_enabled() {
    let f = fixture();
    let counting = CountingReflector::new(f.provider);
    let cached = CachedReflector::new(counting, CacheOptions::ATTRIBUTES);

    let first = cached.attributes(f.user.into()).unwrap();
    let second = cached.attributes(f.user.into()).unwrap();
    let third = cached.attributes(f.user.into()).unwrap();

    assert_eq!(cached.inner().attribute_calls(), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&second, &third));
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].kind, "entity");
}

#[test]
fn disabled_category_reaches_provider_every_time() {
    let f = fixture();
    let counting = CountingReflector::new(f.provider);
    let cached = CachedReflector::new(counting, CacheOptions::NONE);

    for _ in 0..3 {
        cached.attributes(f.user.into()).unwrap();
        cached.fields(f.user, MemberFilter::DEFAULT).unwrap();
    }
    assert_eq!(cached.inner().attribute_calls(), 3);
    assert_eq!(cached.inner().enumeration_calls(), 3);
    assert_eq!(cached.entry_count(), 0);
}

#[test]
fn categories_are_independent_regions() {
    let f = fixture();
    let counting = CountingReflector::new(f.provider);
    // Only attributes are memoized
    let cached = CachedReflector::new(counting, CacheOptions::ATTRIBUTES);

    for _ in 0..2 {
        cached.attributes(f.user.into()).unwrap();
        cached.methods(f.user, MemberFilter::DEFAULT).unwrap();
        cached
            .find_members(f.user, &MemberQuery::new().with_prefix("re"))
            .unwrap();
    }

    assert_eq!(cached.inner().attribute_calls(), 1);
    assert_eq!(cached.inner().enumeration_calls(), 2);
    assert_eq!(cached.inner().search_calls(), 2);
}

#[test]
fn generic_instantiation_keys_are_order_sensitive() {
    let provider = RuntimeReflector::new();
    let module = provider.define_module("app").unwrap();
    let int = provider
        .define_type(TypeDefinition::primitive("int"))
        .unwrap();
    let str_ = provider
        .define_type(TypeDefinition::primitive("str"))
        .unwrap();
    let pair = provider
        .define_type(TypeDefinition::class("Pair", module).generic_over(&["K", "V"]))
        .unwrap();
    provider.seal_module(module).unwrap();

    let counting = CountingReflector::new(provider);
    let cached = CachedReflector::new(counting, CacheOptions::GENERICS);

    let int_str = cached.instantiate_type(pair, &[int, str_]).unwrap();
    let str_int = cached.instantiate_type(pair, &[str_, int]).unwrap();
    assert_ne!(int_str, str_int);
    assert_eq!(cached.inner().construction_calls(), 2);

    // Repeats with the same ordered arguments are hits
    assert_eq!(cached.instantiate_type(pair, &[int, str_]).unwrap(), int_str);
    assert_eq!(cached.instantiate_type(pair, &[str_, int]).unwrap(), str_int);
    assert_eq!(cached.inner().construction_calls(), 2);

    let names = [
        cached.resolve_type(int_str).unwrap().name.clone(),
        cached.resolve_type(str_int).unwrap().name.clone(),
    ];
    assert_eq!(names, ["Pair_int_str".to_string(), "Pair_str_int".to_string()]);
}

#[test]
fn failures_propagate_and_are_never_cached() {
    let f = fixture();
    let counting = CountingReflector::new(f.provider);
    let cached = CachedReflector::new(counting, CacheOptions::ALL);

    let missing = ElementRef::Type(TypeHandle::from_raw(9999));
    let first = cached.attributes(missing);
    let second = cached.attributes(missing);

    assert!(matches!(first, Err(ReflectError::UnknownHandle(_))));
    assert_eq!(first, second);
    // Both calls reached the provider; nothing was stored
    assert_eq!(cached.inner().attribute_calls(), 2);
    assert_eq!(cached.entry_count(), 0);

    // A failing instantiation is also retried
    let bad = cached.instantiate_type(f.list, &[]);
    assert!(matches!(bad, Err(ReflectError::ArityMismatch { .. })));
    let _ = cached.instantiate_type(f.list, &[]);
    assert_eq!(cached.inner().construction_calls(), 2);
}

#[test]
fn predicate_search_always_delegates() {
    let f = fixture();
    let counting = CountingReflector::new(f.provider);
    let cached = CachedReflector::new(counting, CacheOptions::ALL);

    for _ in 0..3 {
        let hits = cached
            .find_members_where(f.user, MemberFilter::DEFAULT, &|m| {
                m.name().starts_with("re")
            })
            .unwrap();
        assert_eq!(hits.len(), 1);
    }
    assert_eq!(cached.inner().search_calls(), 3);

    // Criteria-based search with the same intent is memoized
    for _ in 0..3 {
        cached
            .find_members(f.user, &MemberQuery::new().with_prefix("re"))
            .unwrap();
    }
    assert_eq!(cached.inner().search_calls(), 4);
}

#[test]
fn enumeration_keys_include_the_filter() {
    let f = fixture();
    let counting = CountingReflector::new(f.provider);
    let cached = CachedReflector::new(counting, CacheOptions::MEMBERS);

    cached.fields(f.user, MemberFilter::DEFAULT).unwrap();
    cached.fields(f.user, MemberFilter::ALL).unwrap();
    cached.fields(f.user, MemberFilter::DEFAULT).unwrap();
    cached.fields(f.user, MemberFilter::ALL).unwrap();

    assert_eq!(cached.inner().enumeration_calls(), 2);
}

#[test]
fn field_and_method_enumerations_do_not_collide() {
    let f = fixture();
    let counting = CountingReflector::new(f.provider);
    let cached = CachedReflector::new(counting, CacheOptions::MEMBERS);

    let fields = cached.fields(f.user, MemberFilter::DEFAULT).unwrap();
    let methods = cached.methods(f.user, MemberFilter::DEFAULT).unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(methods.len(), 2);
    assert_eq!(cached.entry_count(), 2);
}

#[test]
fn uncached_capabilities_forward_unchanged() {
    let f = fixture();
    let counting = CountingReflector::new(f.provider);
    let cached = CachedReflector::new(counting, CacheOptions::ALL);

    assert_eq!(cached.load_module("app").unwrap().raw(), 0);
    assert_eq!(cached.type_by_name("User").unwrap(), f.user);
    assert_eq!(cached.resolve_type(f.user).unwrap().name, "User");
    assert_eq!(cached.instantiations_of(f.list).unwrap(), Vec::new());

    let greet = cached.methods(f.user, MemberFilter::DEFAULT).unwrap()[0].handle;
    assert!(matches!(
        cached.invoke(greet, Some(Value::Null), &[]),
        Err(ReflectError::InvocationError(_))
    ));
}

#[test]
fn concurrent_first_access_converges_on_one_snapshot() {
    let f = fixture();
    let cached = Arc::new(CachedReflector::new(f.provider, CacheOptions::MEMBERS));

    let results: Vec<Arc<[MethodInfo]>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cached = Arc::clone(&cached);
                let user = f.user;
                scope.spawn(move || cached.methods(user, MemberFilter::DEFAULT).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // Whatever raced, the stored snapshot is what every later call observes
    let stored = cached.methods(f.user, MemberFilter::DEFAULT).unwrap();
    let again = cached.methods(f.user, MemberFilter::DEFAULT).unwrap();
    assert!(Arc::ptr_eq(&stored, &again));
    for r in results {
        assert_eq!(r.as_ref(), stored.as_ref());
    }
    assert_eq!(cached.entry_count(), 1);
}

#[test]
fn options_accessor_reports_configuration() {
    let f = fixture();
    let opts = CacheOptions::ATTRIBUTES.union(CacheOptions::GENERICS);
    let cached = CachedReflector::new(f.provider, opts);
    assert_eq!(cached.options(), opts);
    assert!(cached.options().contains(CacheOptions::ATTRIBUTES));
    assert!(!cached.options().contains(CacheOptions::MEMBERS));
    let _ = f.int;
    let _ = f.str_;
}
