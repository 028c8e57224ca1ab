//! Service layer for pact
//!
//! Services sit between the CLI handlers and the configuration and crypto
//! layers. They work on an in-memory [`Configuration`](crate::config::Configuration);
//! persisting it is left to the caller.

pub mod envelope;
pub mod keys;
pub mod pacts;

pub use envelope::EnvelopeService;
pub use keys::{KeyHalf, KeyManager, KeypairState};
pub use pacts::{PactRegistry, SelfPact, SELF_PACT};
