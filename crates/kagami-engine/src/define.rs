//! Definition records for building types at runtime
//!
//! Callers describe a type with plain records, then hand the record to
//! [`RuntimeReflector::define_type`](crate::RuntimeReflector::define_type),
//! which allocates handles, builds the metadata, and registers everything.

use std::sync::Arc;

use kagami_sdk::{
    ModuleHandle, Modifiers, ParameterInfo, ReflectResult, TypeHandle, TypeKind, Value,
};

/// A registered method body
///
/// Receives the receiver (if any) and the positional arguments; the provider
/// checks arity and receiver placement before dispatch.
pub type MethodBody =
    Arc<dyn Fn(Option<&Value>, &[Value]) -> ReflectResult<Value> + Send + Sync>;

/// Definition for a field of a type being built
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    /// Field name
    pub name: String,
    /// Name of the field's type
    pub type_name: String,
    /// Modifier flags
    pub modifiers: Modifiers,
    /// Value reported by field reads, if registered
    pub initial_value: Option<Value>,
}

impl FieldDefinition {
    /// Create a public instance field
    pub fn new(name: &str, type_name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
            modifiers: Modifiers::public(),
            initial_value: None,
        }
    }

    /// Mark as static
    pub fn as_static(mut self) -> Self {
        self.modifiers.is_static = true;
        self
    }

    /// Mark as readonly
    pub fn as_readonly(mut self) -> Self {
        self.modifiers.is_readonly = true;
        self
    }

    /// Mark as non-public
    pub fn non_public(mut self) -> Self {
        self.modifiers.is_public = false;
        self
    }

    /// Register the value reported by field reads
    pub fn with_initial(mut self, value: Value) -> Self {
        self.initial_value = Some(value);
        self
    }
}

/// Definition for a method of a type being built
#[derive(Clone)]
pub struct MethodDefinition {
    /// Method name
    pub name: String,
    /// Name of the return type
    pub return_type: String,
    /// Parameters in order
    pub parameters: Vec<ParameterInfo>,
    /// Modifier flags
    pub modifiers: Modifiers,
    /// Type parameter names (non-empty makes this a generic definition)
    pub type_params: Vec<String>,
    /// Invocable body, if any
    pub body: Option<MethodBody>,
}

impl std::fmt::Debug for MethodDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodDefinition")
            .field("name", &self.name)
            .field("return_type", &self.return_type)
            .field("parameters", &self.parameters)
            .field("modifiers", &self.modifiers)
            .field("type_params", &self.type_params)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

impl MethodDefinition {
    /// Create a public instance method
    pub fn new(name: &str, return_type: &str) -> Self {
        Self {
            name: name.to_string(),
            return_type: return_type.to_string(),
            parameters: Vec::new(),
            modifiers: Modifiers::public(),
            type_params: Vec::new(),
            body: None,
        }
    }

    /// Append a required parameter
    pub fn with_param(mut self, name: &str, type_name: &str) -> Self {
        let index = self.parameters.len();
        self.parameters.push(ParameterInfo {
            name: name.to_string(),
            type_name: type_name.to_string(),
            index,
            optional: false,
        });
        self
    }

    /// Append an optional parameter
    pub fn with_optional_param(mut self, name: &str, type_name: &str) -> Self {
        let index = self.parameters.len();
        self.parameters.push(ParameterInfo {
            name: name.to_string(),
            type_name: type_name.to_string(),
            index,
            optional: true,
        });
        self
    }

    /// Mark as static
    pub fn as_static(mut self) -> Self {
        self.modifiers.is_static = true;
        self
    }

    /// Mark as non-public
    pub fn non_public(mut self) -> Self {
        self.modifiers.is_public = false;
        self
    }

    /// Declare type parameters, making this a generic method definition
    pub fn generic_over(mut self, params: &[&str]) -> Self {
        self.type_params = params.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Attach the invocable body
    pub fn with_body<F>(mut self, body: F) -> Self
    where
        F: Fn(Option<&Value>, &[Value]) -> ReflectResult<Value> + Send + Sync + 'static,
    {
        self.body = Some(Arc::new(body));
        self
    }
}

/// Definition for a type being built
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    /// Type name
    pub name: String,
    /// Type kind
    pub kind: TypeKind,
    /// Owning module (required for classes and interfaces)
    pub module: Option<ModuleHandle>,
    /// Parent type
    pub parent: Option<TypeHandle>,
    /// Type parameter names (non-empty makes this a generic definition)
    pub type_params: Vec<String>,
    /// Field definitions
    pub fields: Vec<FieldDefinition>,
    /// Method definitions
    pub methods: Vec<MethodDefinition>,
}

impl TypeDefinition {
    /// Create a class definition
    pub fn class(name: &str, module: ModuleHandle) -> Self {
        Self {
            name: name.to_string(),
            kind: TypeKind::Class,
            module: Some(module),
            parent: None,
            type_params: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Create an interface definition
    pub fn interface(name: &str, module: ModuleHandle) -> Self {
        Self {
            kind: TypeKind::Interface,
            ..Self::class(name, module)
        }
    }

    /// Create a module-less primitive definition
    pub fn primitive(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: TypeKind::Primitive,
            module: None,
            parent: None,
            type_params: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Set the parent type
    pub fn with_parent(mut self, parent: TypeHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Declare type parameters, making this a generic type definition
    pub fn generic_over(mut self, params: &[&str]) -> Self {
        self.type_params = params.iter().map(|p| p.to_string()).collect();
        self.kind = TypeKind::GenericDefinition;
        self
    }

    /// Append a field definition
    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Append a method definition
    pub fn with_method(mut self, method: MethodDefinition) -> Self {
        self.methods.push(method);
        self
    }
}
