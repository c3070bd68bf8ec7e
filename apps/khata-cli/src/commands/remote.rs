//! `fetch` and `list`: read-only calls against the backend.

use anyhow::{Context, Result};
use khata_client::{ApiClient, DocumentService, RequestContext};
use khata_core::{DocumentKind, DocumentSummary};
use tracing::info;
use uuid::Uuid;

use crate::config::CliConfig;
use crate::render;
use crate::AuthArgs;

fn service(config: &CliConfig, auth: &AuthArgs) -> Result<(DocumentService, RequestContext)> {
    let ctx = RequestContext::new(&auth.token, &auth.tenant).context("building request context")?;
    let api = ApiClient::new(config.api.clone()).context("building API client")?;
    Ok((DocumentService::new(api), ctx))
}

pub async fn fetch(config: &CliConfig, auth: &AuthArgs, kind: DocumentKind, id: Uuid) -> Result<()> {
    let (service, ctx) = service(config, auth)?;
    info!(%kind, %id, tenant = ctx.tenant_id(), "Fetching document");

    let document = service
        .fetch(&ctx, kind, id)
        .await
        .with_context(|| format!("fetching {kind} {id}"))?;

    let totals = document.totals(&config.calculator(kind));
    let summary =
        DocumentSummary::build_with_suffix(&document, &totals, &config.suffix_for(&document.currency));
    println!("{}", render::summary(&summary));
    Ok(())
}

pub async fn list(config: &CliConfig, auth: &AuthArgs, kind: DocumentKind, page: u32) -> Result<()> {
    let (service, ctx) = service(config, auth)?;

    let page = service
        .list(&ctx, kind, page)
        .await
        .with_context(|| format!("listing {kind}"))?;
    println!("{}", render::document_page(&page, &config.currency));
    Ok(())
}
