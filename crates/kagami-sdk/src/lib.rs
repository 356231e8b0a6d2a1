//! Kagami SDK - Capability traits and metadata types for the Kagami
//! reflection layer
//!
//! This crate defines the stable surface that both providers and consumers
//! program against:
//! - **Handles**: opaque identifiers for modules, types, and members
//! - **Info types**: plain metadata records describing reflective elements
//! - **Filters**: binding-flag style member filters and search queries
//! - **Capabilities**: one trait per responsibility (loading, introspection,
//!   generic construction, invocation, handle resolution) plus the
//!   `Reflector` aggregate
//! - **Extensions**: convenience methods that fill in default arguments
//!
//! Implementations live elsewhere (the `kagami-engine` crate provides the
//! registry-backed provider and the memoizing cache decorator); tests can
//! substitute fakes because everything here is trait-shaped.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod capability;
mod error;
mod ext;
mod filter;
mod handle;
mod info;
mod value;

pub use capability::{
    GenericConstruction, HandleResolution, MemberInvocation, ModuleLoading, Reflector,
    TypeIntrospection,
};
pub use error::{ReflectError, ReflectResult};
pub use ext::ReflectorExt;
pub use filter::{MemberFilter, MemberQuery};
pub use handle::{ElementRef, FieldHandle, MethodHandle, ModuleHandle, TypeHandle};
pub use info::{
    AttributeInfo, FieldInfo, MemberInfo, MemberKind, MethodInfo, Modifiers, ModuleInfo,
    ParameterInfo, TypeInfo, TypeKind,
};
pub use value::Value;
