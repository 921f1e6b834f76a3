//! Common test utilities for vestry-auth-core integration tests

pub mod jwks_mock;
pub mod mock_repos;

#[allow(unused_imports)]
pub use jwks_mock::{JwksMockServer, TestIdTokenClaims, TestKeyPair};
#[allow(unused_imports)]
pub use mock_repos::{test_profile, FlakyIdentityProvider, MockProfileRepository};
