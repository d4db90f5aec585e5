//! Schema system - typed model, decoding, flattening, validation and rendering

pub mod decode;
pub mod flatten;
pub mod node;
pub mod path;
pub mod registry;
pub mod validator;
pub mod wizard;

pub use decode::{decode, SchemaError};
pub use flatten::flatten;
pub use node::{
    ArrayNode, BooleanNode, IntegerNode, NumberNode, ObjectNode, Properties, SchemaKind,
    SchemaNode, StringNode,
};
pub use path::{child_path, leaves, resolve, Leaf};
pub use registry::SchemaRegistry;
pub use validator::{check_leaf, validate_all, validate_field, validate_tree, FieldError};
pub use wizard::{SchemaWizard, WizardResult};
