//! Packet translator dispatch, keyed by the concrete runtime type of a packet.

use crate::error::RegistrationError;
use crate::session::Session;
use crossplay_protocol::Packet;
use std::any::TypeId;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{error, trace};

/// Translates one packet type. Plain functions and closures with the
/// matching signature are translators.
pub trait PacketTranslator<P: Packet>: Send + Sync {
    fn translate(&self, session: &mut Session, packet: &P) -> anyhow::Result<()>;
}

impl<P, F> PacketTranslator<P> for F
where
    P: Packet,
    F: Fn(&mut Session, &P) -> anyhow::Result<()> + Send + Sync,
{
    fn translate(&self, session: &mut Session, packet: &P) -> anyhow::Result<()> {
        self(session, packet)
    }
}

trait ErasedTranslator: Send + Sync {
    fn translate_erased(&self, session: &mut Session, packet: &dyn Packet) -> anyhow::Result<()>;
}

struct Typed<P, T> {
    translator: T,
    _packet: PhantomData<fn(&P)>,
}

impl<P, T> ErasedTranslator for Typed<P, T>
where
    P: Packet,
    T: PacketTranslator<P>,
{
    fn translate_erased(&self, session: &mut Session, packet: &dyn Packet) -> anyhow::Result<()> {
        match packet.as_any().downcast_ref::<P>() {
            Some(packet) => self.translator.translate(session, packet),
            None => Ok(()),
        }
    }
}

/// Outcome of dispatching one packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Translated,
    /// No translator for this packet type.
    Unhandled,
    /// The translator returned an error or panicked; already logged.
    Failed,
}

/// Append-only table from packet type to its single translator.
#[derive(Default)]
pub struct TranslatorRegistry {
    translators: HashMap<TypeId, Box<dyn ErasedTranslator>>,
}

impl TranslatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the translator for `P`. A second translator for the same
    /// type is rejected.
    pub fn register<P, T>(&mut self, translator: T) -> Result<(), RegistrationError>
    where
        P: Packet,
        T: PacketTranslator<P> + 'static,
    {
        match self.translators.entry(TypeId::of::<P>()) {
            Entry::Occupied(_) => Err(RegistrationError::DuplicateTranslator(std::any::type_name::<P>())),
            Entry::Vacant(slot) => {
                slot.insert(Box::new(Typed {
                    translator,
                    _packet: PhantomData::<fn(&P)>,
                }));
                Ok(())
            }
        }
    }

    pub fn handles<P: Packet>(&self) -> bool {
        self.translators.contains_key(&TypeId::of::<P>())
    }

    pub fn len(&self) -> usize {
        self.translators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translators.is_empty()
    }

    /// Runs the translator registered for the packet's exact type. Failures
    /// are logged and contained; the session keeps going.
    pub fn dispatch(&self, session: &mut Session, packet: &dyn Packet) -> Dispatch {
        let Some(translator) = self.translators.get(&packet.as_any().type_id()) else {
            trace!("No translator for {}", packet.name());
            return Dispatch::Unhandled;
        };
        match catch_unwind(AssertUnwindSafe(|| translator.translate_erased(session, packet))) {
            Ok(Ok(())) => Dispatch::Translated,
            Ok(Err(e)) => {
                error!(packet = packet.name(), session = session.id(), "Translator failed: {:#}", e);
                Dispatch::Failed
            }
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(packet = packet.name(), session = session.id(), "Translator panicked: {}", message);
                Dispatch::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::test_session;
    use crossplay_protocol::bedrock::SetPlayerGameType;
    use crossplay_protocol::java::{CloseContainer, UnloadChunk};

    fn close_ok(session: &mut Session, _packet: &CloseContainer) -> anyhow::Result<()> {
        session.send_upstream_packet(SetPlayerGameType { game_mode: 1 });
        Ok(())
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = TranslatorRegistry::new();
        registry.register::<CloseContainer, _>(close_ok).unwrap();
        let err = registry.register::<CloseContainer, _>(close_ok).unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateTranslator(name) if name.ends_with("CloseContainer")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_dispatch_by_exact_type() {
        let mut registry = TranslatorRegistry::new();
        registry.register::<CloseContainer, _>(close_ok).unwrap();
        let mut session = test_session();

        let unload = UnloadChunk { chunk_x: 0, chunk_z: 0 };
        assert_eq!(registry.dispatch(&mut session, &unload), Dispatch::Unhandled);
        assert!(session.take_upstream().is_empty());

        let close = CloseContainer { window_id: 1 };
        assert_eq!(registry.dispatch(&mut session, &close), Dispatch::Translated);
        assert_eq!(session.take_upstream().len(), 1);
    }

    #[test]
    fn test_failing_translator_does_not_stop_the_next_packet() {
        let mut registry = TranslatorRegistry::new();
        registry
            .register::<UnloadChunk, _>(|_: &mut Session, packet: &UnloadChunk| -> anyhow::Result<()> {
                if packet.chunk_x < 0 {
                    panic!("negative chunk");
                }
                anyhow::bail!("chunk {} is broken", packet.chunk_x)
            })
            .unwrap();
        registry.register::<CloseContainer, _>(close_ok).unwrap();
        let mut session = test_session();

        assert_eq!(
            registry.dispatch(&mut session, &UnloadChunk { chunk_x: 1, chunk_z: 0 }),
            Dispatch::Failed
        );
        assert_eq!(
            registry.dispatch(&mut session, &UnloadChunk { chunk_x: -1, chunk_z: 0 }),
            Dispatch::Failed
        );
        assert_eq!(
            registry.dispatch(&mut session, &CloseContainer { window_id: 1 }),
            Dispatch::Translated
        );
        assert!(session.is_active());
    }
}
