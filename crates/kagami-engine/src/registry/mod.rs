//! Metadata registries — the ground truth behind the default provider
//!
//! Four stores, each owning one slice of the reflective metadata:
//! - [`TypeRegistry`]: types and their members, with handle allocation
//! - [`ModuleRegistry`]: modules with a Building/Sealed lifecycle
//! - [`GenericRegistry`]: generic definitions and their instantiations
//! - [`AttributeStore`]: attributes attached to elements
//!
//! Registries are plain single-threaded structures; the provider wraps them
//! in locks. Once a module is sealed its metadata never changes, which is
//! the property that makes downstream memoization sound.

mod attributes;
mod generics;
mod modules;
mod types;

pub use attributes::AttributeStore;
pub use generics::{GenericDef, GenericRegistry};
pub use modules::{ModuleDef, ModuleRegistry, ModuleState};
pub use types::{TypeDef, TypeRegistry};
