//! # khata-client: REST Client for Khata ERP
//!
//! Talks to the ERP backend on behalf of one caller at a time. Credentials
//! travel in a [`RequestContext`] handed to every call; the client holds
//! none of its own.
//!
//! ## Request Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ClientConfig ──► ApiClient (reqwest, timeout, user agent)              │
//! │                       │                                                 │
//! │        ┌──────────────┴──────────────┐                                  │
//! │        ▼                             ▼                                  │
//! │  DocumentService               PayrollService                          │
//! │  list / fetch / submit         fetch_structure / payslip               │
//! │        │                             │                                  │
//! │        └──── &RequestContext ────────┘                                  │
//! │              Authorization: Bearer …                                    │
//! │              X-Tenant-ID: …                                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use khata_client::{ApiClient, ClientConfig, DocumentService, RequestContext};
//! use khata_core::DocumentKind;
//!
//! # async fn run() -> khata_client::ClientResult<()> {
//! let api = ApiClient::new(ClientConfig::load_or_default(None))?;
//! let ctx = RequestContext::new("token-from-login", "tenant-1")?;
//! let page = DocumentService::new(api).list(&ctx, DocumentKind::SalesInvoice, 1).await?;
//! println!("{} invoices", page.items.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod context;
pub mod documents;
pub mod error;
pub mod payroll;
pub mod wire;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use context::{RequestContext, TENANT_HEADER};
pub use documents::{DocumentService, SubmitReceipt};
pub use error::{ClientError, ClientResult};
pub use payroll::PayrollService;
pub use wire::{DocumentListItem, Page};
