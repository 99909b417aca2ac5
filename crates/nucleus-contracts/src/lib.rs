// Wire types for the Brain Nucleus client
//
// Everything the hub sends or accepts over HTTP lives here, so the client
// library and the CLI agree on one set of serde definitions. Optional
// envelope fields are omitted from the wire body when absent, never
// serialized as null.

pub mod capability;
pub mod event;
pub mod hub;
pub mod schema;

pub use capability::{
    CapabilityEntry, CapabilityStatus, RegisterCapabilitiesRequest, RegistrationOutcome,
};
pub use event::{EventAck, EventEnvelope, EventOptions, OccurredAt, Severity};
pub use hub::{DataTypeDescriptor, HubConfig, VersionInfo};
pub use schema::{DataTypeSchema, PropertySpec, PropertyType, SchemaBody};
