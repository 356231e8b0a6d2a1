//! Kagami Reflection Runtime
//!
//! This crate provides the runtime behind the `kagami-sdk` capability
//! traits:
//! - **Registries**: metadata stores for modules, types, generic
//!   instantiations, and attributes (`registry` module)
//! - **Provider**: [`RuntimeReflector`], the registry-backed default
//!   implementation, plus the definition records used to populate it
//!   (`define` module)
//! - **Cache**: [`CachedReflector`], a decorator that memoizes attribute
//!   lookups, member enumeration, member search, and generic instantiation,
//!   per-category via [`CacheOptions`] flags (`cache` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use kagami_engine::{CachedReflector, CacheOptions, RuntimeReflector, TypeDefinition};
//! use kagami_sdk::{MemberFilter, ReflectorExt, TypeIntrospection};
//!
//! let runtime = RuntimeReflector::new();
//! let module = runtime.define_module("app")?;
//! let user = runtime.define_type(TypeDefinition::class("User", module))?;
//! runtime.seal_module(module)?;
//!
//! let reflector = CachedReflector::new(runtime, CacheOptions::ALL);
//! let fields = reflector.all_fields(user)?; // memoized snapshot
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cache;
pub mod define;
pub mod provider;
pub mod registry;

pub use cache::{CacheOptions, CachedReflector};
pub use define::{FieldDefinition, MethodBody, MethodDefinition, TypeDefinition};
pub use provider::RuntimeReflector;

// The stable surface, re-exported so embedders need only one dependency
pub use kagami_sdk as sdk;
