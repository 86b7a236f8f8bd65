//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod activation_gateway;
mod activation_registry;
mod authenticator;
mod notifier;
mod pending_code_store;

#[cfg(test)]
pub use activation_gateway::MockActivationGateway;
pub use activation_gateway::{ActivationGateway, ActivationGatewayError};
#[cfg(test)]
pub use activation_registry::MockActivationRegistry;
pub use activation_registry::{ActivationRegistry, ActivationRegistryError};
pub use authenticator::{Authenticator, FixtureAuthenticator};
pub use notifier::{NoOpNotifier, Notification, NotificationKind, Notifier};
pub use pending_code_store::{PendingCodeStore, PendingCodeStoreError};
