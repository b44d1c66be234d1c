//! Packet translators for both directions, and the startup step that
//! registers them.

pub mod bedrock;
pub mod java;

use crate::error::RegistrationError;
use crate::registry::TranslatorRegistry;
use tracing::info;

/// Every translator the proxy knows, split by the side packets arrive from.
pub struct Translators {
    /// Packets from the Java server.
    pub java: TranslatorRegistry,
    /// Packets from the Bedrock client.
    pub bedrock: TranslatorRegistry,
}

impl Translators {
    /// Registers all translators. Fails if any packet type is claimed twice.
    pub fn build() -> Result<Self, RegistrationError> {
        let mut java = TranslatorRegistry::new();
        java::register(&mut java)?;
        let mut bedrock = TranslatorRegistry::new();
        bedrock::register(&mut bedrock)?;
        info!(
            "Registered {} Java and {} Bedrock translators",
            java.len(),
            bedrock.len()
        );
        Ok(Self { java, bedrock })
    }
}
