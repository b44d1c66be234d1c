use thiserror::Error;

/// Registration mistakes are programming errors and stop the proxy from starting.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("packet type {0} already has a translator")]
    DuplicateTranslator(&'static str),
    #[error("entity kind {0:?} registered twice")]
    DuplicateKind(crate::entity::EntityKind),
    #[error("java entity type {0} claimed by two kinds")]
    DuplicateJavaType(&'static str),
    #[error("entity kind {kind:?} names unregistered parent {parent:?}")]
    MissingParent {
        kind: crate::entity::EntityKind,
        parent: crate::entity::EntityKind,
    },
    #[error("entity kind {0:?} is its own ancestor")]
    CyclicKind(crate::entity::EntityKind),
}

#[derive(Debug, Error, PartialEq)]
pub enum MetadataError {
    #[error("expected {expected}, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}
