//! Core module - form values, state, acquisition and session orchestration

pub mod config;
pub mod form;
pub mod provider;
pub mod session;
pub mod value;

pub use config::Config;
pub use form::{FieldErrors, FieldValues, FormEvent, FormState, SubscriptionId};
pub use provider::{
    DataError, EmptyPrefill, FilePrefillProvider, FileSchemaProvider, LocalError, NetworkError,
    PrefillProvider, SchemaProvider, StaticSchemaProvider,
};
pub use session::{
    Acquisition, EditError, FieldViolation, FormSession, LoadError, LoadStage, LoadState,
    LoadTicket, SubmitError,
};
pub use value::DynamicValue;
