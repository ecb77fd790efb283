//! Built-in checks

pub mod constant_condition;
pub mod null_pointer;
pub mod object_disposed;
pub mod unchecked_argument;

pub use constant_condition::{
    ConstantConditionCheck, CONDITION_ALWAYS_SAME_DEAD_CODE_RULE, CONDITION_ALWAYS_SAME_RULE,
};
pub use null_pointer::{NullPointerDereferenceCheck, NULL_POINTER_DEREFERENCE_RULE};
pub use object_disposed::{ObjectDisposedCheck, OBJECT_DISPOSED_RULE};
pub use unchecked_argument::{UncheckedArgumentCheck, UNCHECKED_ARGUMENT_RULE};
