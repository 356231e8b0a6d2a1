//! Error types for the reflection surface

/// Result type for reflective operations
pub type ReflectResult<T> = Result<T, ReflectError>;

/// Errors raised by reflection providers
///
/// Decorators (including the memoizing cache) never originate their own
/// variants; they propagate whatever the wrapped provider raised.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReflectError {
    /// Module name did not resolve
    #[error("Unknown module: {0}")]
    UnknownModule(String),

    /// Type name did not resolve
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// Member name did not resolve
    #[error("Unknown member: {0}")]
    UnknownMember(String),

    /// A handle did not resolve to a registered element
    #[error("Unresolved handle: {0}")]
    UnknownHandle(String),

    /// Mutation attempted on a sealed module
    #[error("Module is sealed: {0}")]
    ModuleSealed(String),

    /// Load attempted on a module still being built
    #[error("Module is not sealed: {0}")]
    ModuleNotSealed(String),

    /// A name is already registered
    #[error("Duplicate name: {0}")]
    DuplicateName(String),

    /// Wrong number of arguments
    #[error("Arity mismatch: expected {expected}, got {got}")]
    ArityMismatch {
        /// Expected argument count
        expected: usize,
        /// Supplied argument count
        got: usize,
    },

    /// Wrong kind of argument or receiver
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type name
        expected: String,
        /// Actual type name
        got: String,
    },

    /// Instantiation requested on a non-generic element
    #[error("Not a generic definition: {0}")]
    NotGeneric(String),

    /// A method body reported a failure
    #[error("Invocation error: {0}")]
    InvocationError(String),
}
