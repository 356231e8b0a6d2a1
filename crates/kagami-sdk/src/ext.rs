//! Convenience extensions over the capability traits
//!
//! One-line forwards that fill in default arguments. Nothing here adds
//! behavior; each method delegates to exactly one capability call.

use std::sync::Arc;

use crate::capability::Reflector;
use crate::error::ReflectResult;
use crate::filter::{MemberFilter, MemberQuery};
use crate::handle::{ElementRef, MethodHandle, TypeHandle};
use crate::info::{AttributeInfo, FieldInfo, MemberInfo, MethodInfo};
use crate::value::Value;

/// Default-argument conveniences, available on every [`Reflector`]
pub trait ReflectorExt: Reflector {
    /// Fields selected by the default filter (public, instance and static)
    fn all_fields(&self, ty: TypeHandle) -> ReflectResult<Arc<[FieldInfo]>> {
        self.fields(ty, MemberFilter::DEFAULT)
    }

    /// Methods selected by the default filter
    fn all_methods(&self, ty: TypeHandle) -> ReflectResult<Arc<[MethodInfo]>> {
        self.methods(ty, MemberFilter::DEFAULT)
    }

    /// Fields declared on the type itself, default visibility
    fn declared_fields(&self, ty: TypeHandle) -> ReflectResult<Arc<[FieldInfo]>> {
        self.fields(ty, MemberFilter::DEFAULT.union(MemberFilter::DECLARED_ONLY))
    }

    /// Public instance methods only
    fn instance_methods(&self, ty: TypeHandle) -> ReflectResult<Arc<[MethodInfo]>> {
        self.methods(ty, MemberFilter::PUBLIC.union(MemberFilter::INSTANCE))
    }

    /// Members with an exact name, default filter
    fn find_by_name(&self, ty: TypeHandle, name: &str) -> ReflectResult<Arc<[MemberInfo]>> {
        self.find_members(ty, &MemberQuery::new().with_name(name))
    }

    /// The first attribute of a kind on an element, if any
    fn first_attribute(
        &self,
        element: ElementRef,
        kind: &str,
    ) -> ReflectResult<Option<AttributeInfo>> {
        Ok(self.attributes_of_kind(element, kind)?.first().cloned())
    }

    /// Invoke a static method (no receiver)
    fn invoke_static(&self, method: MethodHandle, args: &[Value]) -> ReflectResult<Value> {
        self.invoke(method, None, args)
    }
}

impl<T: Reflector + ?Sized> ReflectorExt for T {}
