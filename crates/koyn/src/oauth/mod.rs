//! OAuth2 login support: provider userinfo fetch plus profile
//! normalization. Token redemption against the provider happens client
//! side; this module only turns a provider access token into a first-party
//! account.

mod client;
mod profile;

pub use client::OAuthClient;
pub use profile::{OAuthProfile, normalize};
