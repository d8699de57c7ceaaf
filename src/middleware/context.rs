use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;

/// Request identity and shape, as seen by handlers and receivers.
///
/// The host application's auth layer is expected to put the authenticated
/// user id in the `x-user-id` header before the request reaches this
/// router; a missing or malformed header means an anonymous request.
/// AJAX detection follows the `X-Requested-With: XMLHttpRequest`
/// convention.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub user_id: Option<i64>,
    pub is_ajax: bool,
    /// Raw query string, kept for redirect computation.
    pub query: Option<String>,
    pub referer: Option<String>,
    /// Redirect target carried in the POST body, filled in by the view.
    pub next: Option<String>,
}

impl RequestContext {
    /// Context for an authenticated user; mainly useful for library
    /// callers invoking handlers outside the HTTP path.
    pub fn authenticated(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// Post-save redirect target: the body-provided `next`, then the
    /// configured query parameter, then the Referer, then `/`.
    pub fn next_url(&self, querystring_key: &str) -> String {
        if let Some(next) = self.next.as_deref()
            && !next.is_empty()
        {
            return next.to_string();
        }
        if let Some(qs) = self.query.as_deref() {
            for (k, v) in url::form_urlencoded::parse(qs.as_bytes()) {
                if k == querystring_key && !v.is_empty() {
                    return v.into_owned();
                }
            }
        }
        self.referer.clone().unwrap_or_else(|| "/".to_string())
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;

        let user_id = headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok());

        let is_ajax = headers
            .get("x-requested-with")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"));

        let referer = headers
            .get("referer")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        Ok(Self {
            user_id,
            is_ajax,
            query: parts.uri.query().map(|q| q.to_string()),
            referer,
            next: None,
        })
    }
}
