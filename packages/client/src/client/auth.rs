//! Per-attempt authentication hook
//!
//! The hook runs once per candidate attempt, on a freshly built request, so
//! it can inject credentials that rotate between attempts (e.g. a ticket
//! refreshed by a background task).

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use http::header::{HeaderValue, AUTHORIZATION};
use http::request::Parts;

use crate::error::{constructors, Result};

/// Mutates the outgoing request before it is sent to one candidate address.
pub trait AuthHook: Send + Sync {
    fn apply<'a>(&'a self, parts: &'a mut Parts) -> BoxFuture<'a, Result<()>>;
}

/// Static bearer-token hook.
pub struct BearerAuth {
    value: HeaderValue,
}

impl BearerAuth {
    pub fn new(token: &str) -> Result<Self> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(constructors::builder)?;
        value.set_sensitive(true);
        Ok(Self { value })
    }
}

impl AuthHook for BearerAuth {
    fn apply<'a>(&'a self, parts: &'a mut Parts) -> BoxFuture<'a, Result<()>> {
        parts.headers.insert(AUTHORIZATION, self.value.clone());
        async { Ok(()) }.boxed()
    }
}
