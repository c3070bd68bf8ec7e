//! # Request Context
//!
//! The bearer token and tenant id for one caller, passed explicitly to
//! every request.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  login (out of scope) ──► RequestContext::new(token, tenant)           │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │  DocumentService::fetch(&ctx, ..) ──► ApiClient ──► ctx.apply(request) │
//! │                                                     Authorization:     │
//! │                                                       Bearer <token>   │
//! │                                                     X-Tenant-ID:       │
//! │                                                       <tenant>         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing in the workspace reads credentials from a global; a call
//! without a context does not compile.

use reqwest::header::HeaderValue;
use reqwest::RequestBuilder;
use std::fmt;

use crate::error::{ClientError, ClientResult};

/// Header carrying the tenant id.
pub const TENANT_HEADER: &str = "X-Tenant-ID";

/// Credentials for one caller and tenant.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestContext {
    token: String,
    tenant_id: String,
}

fn header_safe(field: &str, value: &str) -> ClientResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ClientError::InvalidContext(format!("{field} is empty")));
    }
    HeaderValue::from_str(value)
        .map_err(|_| ClientError::InvalidContext(format!("{field} contains invalid characters")))?;
    Ok(value.to_string())
}

impl RequestContext {
    /// Builds a context, rejecting blank values and values that cannot
    /// travel in an HTTP header.
    pub fn new(token: impl AsRef<str>, tenant_id: impl AsRef<str>) -> ClientResult<Self> {
        Ok(RequestContext {
            token: header_safe("bearer token", token.as_ref())?,
            tenant_id: header_safe("tenant id", tenant_id.as_ref())?,
        })
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Same token, another tenant (for users who belong to several).
    pub fn for_tenant(&self, tenant_id: impl AsRef<str>) -> ClientResult<Self> {
        Ok(RequestContext {
            token: self.token.clone(),
            tenant_id: header_safe("tenant id", tenant_id.as_ref())?,
        })
    }

    /// Adds the authorization and tenant headers to a request.
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header(TENANT_HEADER, &self.tenant_id)
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("token", &"<redacted>")
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}
