//! Vestry Axum Integration
//!
//! Tower layers and axum extractors that apply Vestry's gating rules to
//! HTTP requests.
//!
//! - **Layers**: [`EdgeGateLayer`] redirects anonymous navigations to the
//!   login page; [`SessionLayer`] resolves the viewer from the gate cookie or
//!   a bearer token
//! - **Extractors**: [`RequireSession`], [`MaybeSession`], [`RequireRole`]
//!
//! # Quick Start
//!
//! ```ignore
//! use vestry_axum::{roles, EdgeGateLayer, RequireRole, SessionLayer};
//! use axum::{Router, routing::get};
//!
//! async fn people(viewer: RequireRole<roles::Staff>) -> String {
//!     format!("Hello, {}!", viewer.display_name())
//! }
//!
//! let app = Router::new()
//!     .route("/people", get(people))
//!     .layer(SessionLayer::new(verifier, profiles))
//!     .layer(EdgeGateLayer::new(edge_gate));
//! ```

pub mod context;
pub mod error;
pub mod extractors;
pub mod layer;

pub use context::{Viewer, ViewerSource};
pub use error::GateRejection;
pub use extractors::{roles, MaybeSession, RequireRole, RequireSession, RoleBound};
pub use layer::{EdgeGateLayer, EdgeGateService, SessionLayer, SessionService};
