/// Credential issuing and verification.
///
/// Two token kinds share one signing primitive but carry different trust
/// models: session tokens are cross-checked against the revocation ledger,
/// API tokens are signature-only (their revocation is deletion of the stored
/// entry on the identity record).

mod claims;
mod password;
mod token_service;

pub use claims::ApiTokenClaims;
pub use claims::SessionClaims;
pub use password::hash_password;
pub use password::verify_password;
pub use token_service::TokenService;
