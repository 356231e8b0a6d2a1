//! Capability traits mirroring the runtime reflection surface
//!
//! The surface is split by responsibility so callers can depend on exactly
//! the capability they use, and so decorators (caching, counting, faking)
//! can be layered per concern. `Reflector` aggregates all five and is
//! blanket-implemented.
//!
//! Collections come back as `Arc<[T]>` snapshots. A caching decorator hands
//! the same snapshot to every caller of an equal query, so callers must
//! treat results as read-only.

use std::sync::Arc;

use crate::error::ReflectResult;
use crate::filter::{MemberFilter, MemberQuery};
use crate::handle::{ElementRef, FieldHandle, MethodHandle, ModuleHandle, TypeHandle};
use crate::info::{
    AttributeInfo, FieldInfo, MemberInfo, MethodInfo, ModuleInfo, TypeInfo,
};
use crate::value::Value;

/// Module and type loading
pub trait ModuleLoading {
    /// Resolve a sealed module by name
    fn load_module(&self, name: &str) -> ReflectResult<ModuleHandle>;

    /// Get module information
    fn module_info(&self, module: ModuleHandle) -> ReflectResult<ModuleInfo>;

    /// Resolve a type by its registered name
    fn type_by_name(&self, name: &str) -> ReflectResult<TypeHandle>;

    /// List the types registered in a module
    fn types_in(&self, module: ModuleHandle) -> ReflectResult<Vec<TypeHandle>>;
}

/// Member and attribute introspection — the cacheable query surface
pub trait TypeIntrospection {
    /// Get all attributes attached to an element
    fn attributes(&self, element: ElementRef) -> ReflectResult<Arc<[AttributeInfo]>>;

    /// Get the attributes of one kind attached to an element
    fn attributes_of_kind(
        &self,
        element: ElementRef,
        kind: &str,
    ) -> ReflectResult<Arc<[AttributeInfo]>>;

    /// Check whether an attribute of the given kind is attached to an element
    fn has_attribute(&self, element: ElementRef, kind: &str) -> ReflectResult<bool>;

    /// Enumerate the fields of a type selected by a filter
    fn fields(
        &self,
        ty: TypeHandle,
        filter: MemberFilter,
    ) -> ReflectResult<Arc<[FieldInfo]>>;

    /// Enumerate the methods of a type selected by a filter
    fn methods(
        &self,
        ty: TypeHandle,
        filter: MemberFilter,
    ) -> ReflectResult<Arc<[MethodInfo]>>;

    /// Search members by value-comparable criteria
    fn find_members(
        &self,
        ty: TypeHandle,
        query: &MemberQuery,
    ) -> ReflectResult<Arc<[MemberInfo]>>;

    /// Search members with an opaque predicate
    ///
    /// Closures have no stable identity, so this query cannot be keyed and
    /// is never memoized — every call reaches the underlying provider, even
    /// through a caching decorator. Prefer [`find_members`] where the
    /// criteria fit.
    ///
    /// [`find_members`]: TypeIntrospection::find_members
    fn find_members_where(
        &self,
        ty: TypeHandle,
        filter: MemberFilter,
        predicate: &dyn Fn(&MemberInfo) -> bool,
    ) -> ReflectResult<Vec<MemberInfo>>;
}

/// Generic type and method construction
pub trait GenericConstruction {
    /// Instantiate a generic type definition with ordered type arguments
    ///
    /// Instantiation is idempotent: the same definition and argument list
    /// always yield the same handle.
    fn instantiate_type(
        &self,
        definition: TypeHandle,
        args: &[TypeHandle],
    ) -> ReflectResult<TypeHandle>;

    /// Instantiate a generic method definition with ordered type arguments
    fn instantiate_method(
        &self,
        definition: MethodHandle,
        args: &[TypeHandle],
    ) -> ReflectResult<MethodHandle>;

    /// List the instantiations of a generic type definition made so far
    ///
    /// The answer grows as new instantiations are constructed, so it is not
    /// a pure query and is never memoized.
    fn instantiations_of(&self, definition: TypeHandle) -> ReflectResult<Vec<TypeHandle>>;
}

/// Member invocation
pub trait MemberInvocation {
    /// Invoke a method
    ///
    /// Instance methods require a receiver value; static methods reject one.
    fn invoke(
        &self,
        method: MethodHandle,
        receiver: Option<Value>,
        args: &[Value],
    ) -> ReflectResult<Value>;

    /// Read the registered value of a field
    ///
    /// Answers the initial value supplied at definition time; fields defined
    /// without one report an invocation error.
    fn get_field(&self, field: FieldHandle) -> ReflectResult<Value>;
}

/// Resolution of handles back to metadata records
pub trait HandleResolution {
    /// Resolve a type handle
    fn resolve_type(&self, ty: TypeHandle) -> ReflectResult<Arc<TypeInfo>>;

    /// Resolve a method handle
    fn resolve_method(&self, method: MethodHandle) -> ReflectResult<Arc<MethodInfo>>;

    /// Resolve a field handle
    fn resolve_field(&self, field: FieldHandle) -> ReflectResult<Arc<FieldInfo>>;
}

/// The aggregate reflection surface
///
/// Blanket-implemented for any type providing all five capabilities, so a
/// provider (or a decorator wrapping one) is a `Reflector` automatically.
pub trait Reflector:
    ModuleLoading + TypeIntrospection + GenericConstruction + MemberInvocation + HandleResolution
{
}

impl<T> Reflector for T where
    T: ModuleLoading
        + TypeIntrospection
        + GenericConstruction
        + MemberInvocation
        + HandleResolution
{
}
