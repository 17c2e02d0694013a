pub mod errors;
pub mod graph;
pub mod model;
pub mod scalar;
pub mod view;

pub use errors::SchemaError;
pub use graph::{Cardinality, ConditionValue, GraphLink, GraphMechanism, GraphSchema};
pub use model::{ModelField, ModelKind};
pub use scalar::ScalarType;
pub use view::{
    ComputedFn, FieldModifier, FieldSource, InjectSource, TransformFn, ViewEntry, ViewField,
    ViewSchema,
};
