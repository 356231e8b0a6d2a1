//! Metadata records for reflective elements
//!
//! Plain data returned by introspection queries. All records are immutable
//! snapshots: once a module is sealed, the same query always yields equal
//! records, which is what makes memoization of these queries sound.

use crate::handle::{FieldHandle, MethodHandle, ModuleHandle, TypeHandle};
use crate::value::Value;

/// Type kind enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Built-in scalar types (int, float, bool, str)
    Primitive,
    /// Concrete class types
    Class,
    /// Interface types
    Interface,
    /// Generic type definitions (uninstantiated, carry type parameters)
    GenericDefinition,
    /// Instantiated generic types
    GenericInstance,
    /// Array types
    Array,
}

/// Runtime type information
#[derive(Debug, Clone, PartialEq)]
pub struct TypeInfo {
    /// Type kind
    pub kind: TypeKind,
    /// Type name
    pub name: String,
    /// Handle of this type
    pub handle: TypeHandle,
    /// Owning module (primitives and generic instances are module-less)
    pub module: Option<ModuleHandle>,
    /// Parent type (for classes with a declared base)
    pub parent: Option<TypeHandle>,
    /// Element type (for arrays)
    pub element: Option<TypeHandle>,
    /// Type parameter names (for generic definitions)
    pub type_params: Vec<String>,
    /// Type arguments (for generic instances)
    pub type_args: Vec<TypeHandle>,
}

impl TypeInfo {
    /// Create info for a primitive type
    pub fn primitive(name: &str, handle: TypeHandle) -> Self {
        Self {
            kind: TypeKind::Primitive,
            name: name.to_string(),
            handle,
            module: None,
            parent: None,
            element: None,
            type_params: Vec::new(),
            type_args: Vec::new(),
        }
    }

    /// Create info for a class type
    pub fn class(name: &str, handle: TypeHandle) -> Self {
        Self {
            kind: TypeKind::Class,
            name: name.to_string(),
            handle,
            module: None,
            parent: None,
            element: None,
            type_params: Vec::new(),
            type_args: Vec::new(),
        }
    }

    /// Whether this type is a generic definition awaiting instantiation
    pub fn is_generic_definition(&self) -> bool {
        self.kind == TypeKind::GenericDefinition
    }

    /// Whether this type is an instantiated generic
    pub fn is_generic_instance(&self) -> bool {
        self.kind == TypeKind::GenericInstance
    }
}

/// Modifier flags for members
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Public visibility
    pub is_public: bool,
    /// Static member
    pub is_static: bool,
    /// Readonly field
    pub is_readonly: bool,
    /// Abstract member
    pub is_abstract: bool,
}

impl Modifiers {
    /// Public instance member, the common case
    pub fn public() -> Self {
        Self {
            is_public: true,
            ..Self::default()
        }
    }
}

/// Field information
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    /// Field name
    pub name: String,
    /// Handle of this field
    pub handle: FieldHandle,
    /// Declaring type
    pub declaring: TypeHandle,
    /// Name of the field's type
    pub type_name: String,
    /// Modifier flags
    pub modifiers: Modifiers,
    /// Field index within the declaring type
    pub index: usize,
}

/// Parameter information
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterInfo {
    /// Parameter name
    pub name: String,
    /// Name of the parameter's type
    pub type_name: String,
    /// Parameter index
    pub index: usize,
    /// Whether the parameter may be omitted at the call site
    pub optional: bool,
}

/// Method information
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    /// Method name
    pub name: String,
    /// Handle of this method
    pub handle: MethodHandle,
    /// Declaring type
    pub declaring: TypeHandle,
    /// Name of the return type
    pub return_type: String,
    /// Parameters in order
    pub parameters: Vec<ParameterInfo>,
    /// Modifier flags
    pub modifiers: Modifiers,
    /// Type parameter names (non-empty for generic method definitions)
    pub type_params: Vec<String>,
    /// Method index within the declaring type
    pub index: usize,
}

impl MethodInfo {
    /// Whether this method is a generic definition awaiting instantiation
    pub fn is_generic_definition(&self) -> bool {
        !self.type_params.is_empty()
    }

    /// Number of parameters that must be supplied at the call site
    pub fn required_arity(&self) -> usize {
        self.parameters.iter().filter(|p| !p.optional).count()
    }
}

/// A custom attribute attached to an element
///
/// Attributes are named tags with positional value arguments, attached to
/// types, methods, or fields at definition time.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeInfo {
    /// Attribute kind, e.g. `"deprecated"` or `"route"`
    pub kind: String,
    /// Positional arguments
    pub args: Vec<Value>,
}

impl AttributeInfo {
    /// Create an attribute with no arguments
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            args: Vec::new(),
        }
    }

    /// Create an attribute with positional arguments
    pub fn with_args(kind: &str, args: Vec<Value>) -> Self {
        Self {
            kind: kind.to_string(),
            args,
        }
    }
}

/// Kind discriminant for members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// A field
    Field,
    /// A method
    Method,
}

/// A member search result: either a field or a method
#[derive(Debug, Clone, PartialEq)]
pub enum MemberInfo {
    /// A field member
    Field(FieldInfo),
    /// A method member
    Method(MethodInfo),
}

impl MemberInfo {
    /// The member's name
    pub fn name(&self) -> &str {
        match self {
            MemberInfo::Field(f) => &f.name,
            MemberInfo::Method(m) => &m.name,
        }
    }

    /// The member's modifier flags
    pub fn modifiers(&self) -> Modifiers {
        match self {
            MemberInfo::Field(f) => f.modifiers,
            MemberInfo::Method(m) => m.modifiers,
        }
    }

    /// The member's kind discriminant
    pub fn kind(&self) -> MemberKind {
        match self {
            MemberInfo::Field(_) => MemberKind::Field,
            MemberInfo::Method(_) => MemberKind::Method,
        }
    }

    /// The declaring type
    pub fn declaring(&self) -> TypeHandle {
        match self {
            MemberInfo::Field(f) => f.declaring,
            MemberInfo::Method(m) => m.declaring,
        }
    }
}

/// Module information
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleInfo {
    /// Module name
    pub name: String,
    /// Handle of this module
    pub handle: ModuleHandle,
    /// Whether the module has been sealed (made immutable and loadable)
    pub sealed: bool,
}
