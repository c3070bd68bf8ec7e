//! # Document Service
//!
//! List, fetch and submit for every document kind through one code path.
//!
//! ## Submit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Document ──► validate_document ──► TotalsCalculator::compute          │
//! │                    │ (fails: nothing sent)       │                      │
//! │                    ▼                             ▼                      │
//! │              ClientError::Validation     DocumentBody + totals          │
//! │                                                  │                      │
//! │                          id == None ──► POST {kind.endpoint()}          │
//! │                          id == Some ──► PUT  {kind.endpoint()}/{id}     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use khata_core::validation::validate_document;
use khata_core::{Document, DocumentInput, DocumentKind, DocumentTotals, TotalsCalculator};
use serde_json::Value;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::api::ApiClient;
use crate::context::RequestContext;
use crate::error::ClientResult;
use crate::wire::{unwrap_record, DocumentBody, DocumentListItem, ListEnvelope, Page, SavedBody};

/// Outcome of a successful submit.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitReceipt {
    /// Id the backend assigned or kept.
    pub id: Option<Uuid>,
    /// Document number as stored by the backend.
    pub number: String,
    /// Whether the document was created rather than updated.
    pub created: bool,
    /// The totals that were sent.
    pub totals: DocumentTotals,
}

#[derive(Debug, Clone)]
pub struct DocumentService {
    api: ApiClient,
}

impl DocumentService {
    pub fn new(api: ApiClient) -> Self {
        DocumentService { api }
    }

    /// One page (1-based) of the list view for `kind`.
    #[instrument(skip(self, ctx), fields(tenant = ctx.tenant_id()))]
    pub async fn list(
        &self,
        ctx: &RequestContext,
        kind: DocumentKind,
        page: u32,
    ) -> ClientResult<Page<DocumentListItem>> {
        let page = page.max(1);
        let page_size = self.api.config().page_size;
        let query = [("page", page.to_string()), ("limit", page_size.to_string())];

        let envelope: ListEnvelope = self.api.get(ctx, kind.endpoint(), &query).await?;
        let items: Vec<DocumentListItem> = envelope
            .rows
            .into_iter()
            .map(DocumentListItem::from_value)
            .collect();

        debug!(rows = items.len(), total = ?envelope.total, "Fetched document page");
        Ok(Page {
            items,
            page,
            page_size,
            total: envelope.total,
        })
    }

    /// Loads one document and reads it through the lenient form model.
    #[instrument(skip(self, ctx), fields(tenant = ctx.tenant_id()))]
    pub async fn fetch(
        &self,
        ctx: &RequestContext,
        kind: DocumentKind,
        id: Uuid,
    ) -> ClientResult<Document> {
        let path = format!("{}/{}", kind.endpoint(), id);
        let value: Value = self.api.get(ctx, &path, &[]).await?;

        let mut document = DocumentInput::from_value(unwrap_record(value)).into_document(kind)?;
        document.id = Some(id);
        Ok(document)
    }

    /// Validates, recomputes totals and sends the document.
    ///
    /// Nothing is sent when validation fails.
    #[instrument(skip_all, fields(tenant = ctx.tenant_id(), kind = %document.kind, number = %document.number))]
    pub async fn submit(
        &self,
        ctx: &RequestContext,
        document: &Document,
        calculator: &TotalsCalculator,
    ) -> ClientResult<SubmitReceipt> {
        validate_document(document)?;

        let totals = document.totals(calculator);
        let body = DocumentBody::new(document, &totals);

        let (saved, created): (Value, bool) = match document.id {
            None => (self.api.post(ctx, document.kind.endpoint(), &body).await?, true),
            Some(id) => {
                let path = format!("{}/{}", document.kind.endpoint(), id);
                (self.api.put(ctx, &path, &body).await?, false)
            }
        };

        let saved = SavedBody::from_value(saved);
        let id = Uuid::parse_str(saved.id.trim()).ok().or(document.id);
        let number = if saved.number.trim().is_empty() {
            document.number.clone()
        } else {
            saved.number.trim().to_string()
        };

        info!(created, net_total = %totals.net_total, "Document submitted");
        Ok(SubmitReceipt {
            id,
            number,
            created,
            totals,
        })
    }
}
