//! The translation engine: packet translators, per-session state and the
//! worker that drives a session.

pub mod collision;
pub mod entity;
pub mod error;
pub mod inventory;
pub mod registry;
pub mod session;
pub mod translators;
pub mod worker;

pub use error::{MetadataError, RegistrationError};
pub use registry::{Dispatch, PacketTranslator, TranslatorRegistry};
pub use session::{Registries, Session, SessionConfig};
pub use translators::Translators;
pub use worker::{Outbound, SessionEvent, SessionHandle, SessionWorker};
