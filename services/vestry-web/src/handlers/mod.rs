//! HTTP handlers

mod health;
mod pages;
mod profile;
mod session;

pub use health::{health, ready};
pub use pages::{dashboard, index, login, people, unauthorized};
pub use profile::{get_profile, update_profile};
pub use session::{create_session, delete_session};
