//! Trait for pluggable peer-to-peer (P2P) networking.
//!
//! Main trait: [`Network`].

use ed25519_dalek::VerifyingKey;

use super::messages::Message;

/// Trait for pluggable peer-to-peer (P2P) networking.
///
/// The bootstrapper only ever sends directed messages: poll fan-out is bounded by the outstanding
/// budget and ancestors requests go to one peer at a time, so there is no broadcast method.
pub trait Network: Clone + Send + 'static {
    /// Send a message to the specified peer without blocking.
    fn send(&mut self, peer: VerifyingKey, message: Message);

    /// Receive a message from any peer. Returns immediately with a None if no message is
    /// available now.
    fn recv(&mut self) -> Option<(VerifyingKey, Message)>;
}
