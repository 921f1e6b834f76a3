//! Tower middleware layers.
//!
//! - [`EdgeGateLayer`] runs the edge gate before any handler and answers
//!   anonymous navigations with a redirect to the login page.
//! - [`SessionLayer`] resolves the request's [`Viewer`] and stores it in the
//!   request extensions for the extractors.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{header, Request, Response};
use futures::future::BoxFuture;
use pin_project_lite::pin_project;
use tower::{Layer, Service};
use vestry_auth_core::{cookie_value, EdgeDecision, EdgeGate, SessionVerifier, GATE_COOKIE_NAME};
use vestry_db::ProfileRepository;

use crate::context::{Viewer, ViewerSource};
use crate::error::redirect;
use crate::extractors::ViewerExt;

// ============================================================================
// Edge gate
// ============================================================================

/// Tower layer that applies the [`EdgeGate`] to every request.
#[derive(Clone)]
pub struct EdgeGateLayer {
    gate: Arc<EdgeGate>,
}

impl EdgeGateLayer {
    #[must_use]
    pub fn new(gate: EdgeGate) -> Self {
        Self {
            gate: Arc::new(gate),
        }
    }
}

impl<S> Layer<S> for EdgeGateLayer {
    type Service = EdgeGateService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        EdgeGateService {
            inner,
            gate: Arc::clone(&self.gate),
        }
    }
}

/// The edge gate service.
#[derive(Clone)]
pub struct EdgeGateService<S> {
    inner: S,
    gate: Arc<EdgeGate>,
}

impl<S> Service<Request<Body>> for EdgeGateService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Send + 'static,
    S::Future: Send,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = EdgeGateFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let path = req.uri().path();
        let cookies = req
            .headers()
            .get(header::COOKIE)
            .and_then(|value| value.to_str().ok());

        let decision = self.gate.check(path, cookies);
        metrics::counter!("vestry_edge_decisions_total", "decision" => decision.label())
            .increment(1);

        match decision {
            EdgeDecision::Pass => EdgeGateFuture::Inner {
                future: self.inner.call(req),
            },
            EdgeDecision::Redirect(location) => {
                tracing::debug!(path = %req.uri().path(), %location, "Edge gate redirect");
                EdgeGateFuture::Redirect {
                    response: Some(redirect(&location)),
                }
            }
        }
    }
}

pin_project! {
    /// Future for [`EdgeGateService`].
    #[project = EdgeGateFutureProj]
    pub enum EdgeGateFuture<F> {
        Inner {
            #[pin]
            future: F,
        },
        Redirect {
            response: Option<Response<Body>>,
        },
    }
}

impl<F, E> Future for EdgeGateFuture<F>
where
    F: Future<Output = Result<Response<Body>, E>>,
{
    type Output = Result<Response<Body>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.project() {
            EdgeGateFutureProj::Inner { future } => future.poll(cx),
            EdgeGateFutureProj::Redirect { response } => match response.take() {
                Some(response) => Poll::Ready(Ok(response)),
                None => panic!("polled after completion"),
            },
        }
    }
}

// ============================================================================
// Session resolution
// ============================================================================

/// Tower layer that resolves the request viewer.
///
/// Credentials are taken from `Authorization: Bearer` first, then the gate
/// cookie. Requests without valid credentials pass through without a viewer;
/// the extractors decide what that means for each route.
#[derive(Clone)]
pub struct SessionLayer {
    resolver: Arc<ViewerResolver>,
}

#[derive(Clone)]
struct ViewerResolver {
    bearer_verifier: Arc<dyn SessionVerifier>,
    cookie_verifier: Arc<dyn SessionVerifier>,
    profiles: Arc<dyn ProfileRepository>,
    cookie_name: String,
    allow_bearer: bool,
}

impl SessionLayer {
    /// Verify bearer tokens and gate cookies with `verifier`.
    #[must_use]
    pub fn new(verifier: Arc<dyn SessionVerifier>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self {
            resolver: Arc::new(ViewerResolver {
                bearer_verifier: Arc::clone(&verifier),
                cookie_verifier: verifier,
                profiles,
                cookie_name: GATE_COOKIE_NAME.to_string(),
                allow_bearer: true,
            }),
        }
    }

    /// Verify gate cookies with a different verifier (signed gate tokens).
    #[must_use]
    pub fn with_cookie_verifier(mut self, verifier: Arc<dyn SessionVerifier>) -> Self {
        self.resolver_mut(|r| r.cookie_verifier = verifier);
        self
    }

    /// Set the gate cookie name.
    #[must_use]
    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.resolver_mut(|r| r.cookie_name = name);
        self
    }

    /// Set whether bearer tokens are accepted.
    #[must_use]
    pub fn allow_bearer(mut self, allow: bool) -> Self {
        self.resolver_mut(|r| r.allow_bearer = allow);
        self
    }

    fn resolver_mut(&mut self, update: impl FnOnce(&mut ViewerResolver)) {
        let mut resolver = ViewerResolver::clone(&self.resolver);
        update(&mut resolver);
        self.resolver = Arc::new(resolver);
    }
}

impl<S> Layer<S> for SessionLayer {
    type Service = SessionService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionService {
            inner,
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl ViewerResolver {
    fn credentials(&self, req: &Request<Body>) -> Option<(String, ViewerSource)> {
        if self.allow_bearer {
            if let Some(token) = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
            {
                return Some((token.trim().to_string(), ViewerSource::BearerToken));
            }
        }

        req.headers()
            .get(header::COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|cookies| cookie_value(cookies, &self.cookie_name))
            .filter(|token| !token.is_empty())
            .map(|token| (token.to_string(), ViewerSource::GateCookie))
    }

    async fn resolve(&self, token: String, source: ViewerSource) -> Option<Viewer> {
        let verifier = match source {
            ViewerSource::BearerToken => &self.bearer_verifier,
            ViewerSource::GateCookie => &self.cookie_verifier,
        };

        let session = match verifier.verify_session(&token).await {
            Ok(session) => session,
            Err(e) => {
                tracing::debug!(?source, error = %e, "Rejected session credentials");
                return None;
            }
        };

        let viewer = Viewer::new(session, source);
        match self.profiles.find_by_uid(viewer.uid()).await {
            Ok(Some(profile)) => Some(viewer.with_profile(profile)),
            Ok(None) => {
                tracing::warn!(uid = %viewer.uid(), "Profile document does not exist");
                Some(viewer.with_profile_error(vestry_auth_core::AuthError::ProfileNotFound.to_string()))
            }
            Err(e) => {
                tracing::error!(uid = %viewer.uid(), error = %e, "Error fetching profile");
                Some(viewer.with_profile_error(e.to_string()))
            }
        }
    }
}

/// The session resolution service.
#[derive(Clone)]
pub struct SessionService<S> {
    inner: S,
    resolver: Arc<ViewerResolver>,
}

impl<S> Service<Request<Body>> for SessionService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = SessionFuture<S>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        // Take the service that was driven to readiness
        let clone = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, clone);

        let resolving: BoxFuture<'static, Option<Viewer>> = match self.resolver.credentials(&req) {
            Some((token, source)) => {
                let resolver = Arc::clone(&self.resolver);
                Box::pin(async move { resolver.resolve(token, source).await })
            }
            None => Box::pin(futures::future::ready(None)),
        };

        SessionFuture {
            state: SessionState::Resolving {
                resolving,
                inner: Some(inner),
                req: Some(req),
            },
        }
    }
}

pin_project! {
    /// Future for [`SessionService`].
    pub struct SessionFuture<S>
    where
        S: Service<Request<Body>>,
    {
        #[pin]
        state: SessionState<S>,
    }
}

pin_project! {
    #[project = SessionStateProj]
    enum SessionState<S>
    where
        S: Service<Request<Body>>,
    {
        Resolving {
            resolving: BoxFuture<'static, Option<Viewer>>,
            inner: Option<S>,
            req: Option<Request<Body>>,
        },
        Calling {
            #[pin]
            future: S::Future,
        },
    }
}

impl<S> Future for SessionFuture<S>
where
    S: Service<Request<Body>, Response = Response<Body>>,
{
    type Output = Result<S::Response, S::Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        loop {
            let this = self.as_mut().project();

            match this.state.project() {
                SessionStateProj::Resolving {
                    resolving,
                    inner,
                    req,
                } => {
                    let viewer = match resolving.as_mut().poll(cx) {
                        Poll::Ready(viewer) => viewer,
                        Poll::Pending => return Poll::Pending,
                    };

                    let (Some(mut request), Some(mut service)) = (req.take(), inner.take()) else {
                        panic!("polled after completion");
                    };

                    if let Some(viewer) = viewer {
                        request.extensions_mut().insert(ViewerExt(viewer));
                    }

                    let future = service.call(request);
                    self.as_mut().project().state.set(SessionState::Calling { future });
                }
                SessionStateProj::Calling { future } => {
                    return future.poll(cx);
                }
            }
        }
    }
}
