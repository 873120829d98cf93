//! OAuth client credential issuance.

pub mod registration;

pub use registration::{ClientCredentials, ClientRegistrationService, generate_credentials};
