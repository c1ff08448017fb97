/*
[INPUT]:  Identity configuration and bearer tokens
[OUTPUT]: Validated credentials and auth errors
[POS]:    Auth layer - handles Cognito API authentication
[UPDATE]: When auth flow or credential storage changes
*/

pub mod session;
pub mod token;

pub use session::{AuthSession, Identity};
pub use token::{Credential, TokenStore};
