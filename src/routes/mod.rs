/// Router Module Index
///
/// Splits the API by access requirement. The authenticated router is wrapped in the
/// access-gate layer as a whole, so an endpoint added there cannot be exposed without a
/// token by accident.

/// Routes reachable without a token: health, registration, login and share links.
pub mod public;

/// Routes that require a valid bearer token.
pub mod authenticated;
