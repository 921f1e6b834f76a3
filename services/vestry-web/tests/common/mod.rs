//! Shared fixtures for router tests

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use tower::ServiceExt;
use vestry_auth_core::{AuthError, GateTokenSigner, SessionVerifier};
use vestry_db::MemoryProfileRepository;
use vestry_types::{ChurchId, Profile, Role, Session, UserId};
use vestry_web::{build_router, AppState};

pub const GATE_SECRET: &str = "vestry-web-test-secret-0123456789abcdef";

/// Accepts ID tokens of the form `id:<uid>`
pub struct StaticIdTokens;

#[async_trait]
impl SessionVerifier for StaticIdTokens {
    async fn verify_session(&self, token: &str) -> Result<Session, AuthError> {
        match token.strip_prefix("id:") {
            Some(uid) if !uid.is_empty() => {
                Ok(Session::new(uid, Some(format!("{uid}@example.org"))))
            }
            _ => Err(AuthError::InvalidToken),
        }
    }
}

pub fn id_token(uid: &str) -> String {
    format!("id:{uid}")
}

pub fn profile(uid: &str, first: &str, role: Role, church: &str) -> Profile {
    Profile {
        uid: UserId::new(uid),
        email: Some(format!("{uid}@example.org")),
        first_name: first.to_string(),
        last_name: "Tester".to_string(),
        role,
        church_id: Some(ChurchId::new(church)),
        phone: None,
        photo_url: None,
    }
}

pub fn seeded_profiles() -> MemoryProfileRepository {
    MemoryProfileRepository::with_profiles([
        profile("admin", "Ada", Role::SystemAdmin, "c9"),
        profile("leader", "Lois", Role::Leader, "c1"),
        profile("member", "Mark", Role::Member, "c1"),
        profile("visitor", "Vera", Role::Visitor, "c1"),
        profile("other", "Otto", Role::Member, "c2"),
    ])
}

pub struct TestApp {
    pub router: Router,
    pub profiles: MemoryProfileRepository,
}

impl TestApp {
    /// Raw ID tokens in the cookie, presence-only edge gate
    pub fn new() -> Self {
        let profiles = seeded_profiles();
        let state = AppState::new(Arc::new(StaticIdTokens), Arc::new(profiles.clone()));
        Self {
            router: build_router(state, None),
            profiles,
        }
    }

    /// Signed gate tokens in the cookie, verifying edge gate
    pub fn signed() -> Self {
        let profiles = seeded_profiles();
        let signer = GateTokenSigner::new(GATE_SECRET, 3600).unwrap();
        let state = AppState::new(Arc::new(StaticIdTokens), Arc::new(profiles.clone()))
            .with_gate_signer(signer);
        Self {
            router: build_router(state, None),
            profiles,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::get(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn json(
        &self,
        method: &str,
        path: &str,
        cookie: Option<&str>,
        body: serde_json::Value,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }
}

pub fn gate_cookie(value: &str) -> String {
    format!("__firebase_auth_token={value}")
}

pub fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

pub fn set_cookie(response: &Response<Body>) -> String {
    response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .to_string()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
