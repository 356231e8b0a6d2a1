//! Memoizing introspection cache
//!
//! [`CachedReflector`] wraps any [`Reflector`](kagami_sdk::Reflector) and
//! memoizes four query categories, each independently toggled by
//! [`CacheOptions`] flags: attribute lookups, member enumeration, member
//! search, and generic instantiation. Everything else on the surface is a
//! direct forward.
//!
//! Memoization never changes observable results: the wrapped provider is
//! assumed pure over immutable metadata, failures propagate verbatim and
//! are never stored, and entries live as long as the decorator.

mod cached;
mod key;
mod options;

pub use cached::CachedReflector;
pub use key::{AttrKey, GenericKey, MemberKey, SearchKey};
pub use options::CacheOptions;
