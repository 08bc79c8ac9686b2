pub mod normalize;
pub mod query;
pub mod render;
pub mod scope;
pub mod translate;

mod error;

pub use error::{Error, Result};
pub use normalize::RecordNormalizer;
pub use query::{InsertDirection, QueryRequest, QueryResponse, SortBy, SortOrder};
pub use scope::ScopeFilter;

use std::{future::Future, path::Path, pin::Pin, sync::Arc};

use mmd_config::{Config, Solr, XsltProcessor};
use mmd_providers::{
	solr::{self, SelectParams, SelectResponse},
	xslt,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait SearchBackend
where
	Self: Send + Sync,
{
	fn select<'a>(
		&'a self,
		cfg: &'a Solr,
		params: &'a SelectParams,
	) -> BoxFuture<'a, mmd_providers::Result<SelectResponse>>;
}

pub trait XmlTransformer
where
	Self: Send + Sync,
{
	fn transform<'a>(
		&'a self,
		cfg: &'a XsltProcessor,
		stylesheet: &'a Path,
		source: &'a [u8],
	) -> BoxFuture<'a, mmd_providers::Result<Vec<u8>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub backend: Arc<dyn SearchBackend>,
	pub transformer: Arc<dyn XmlTransformer>,
}
impl Providers {
	pub fn new(backend: Arc<dyn SearchBackend>, transformer: Arc<dyn XmlTransformer>) -> Self {
		Self { backend, transformer }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { backend: provider.clone(), transformer: provider }
	}
}

/// Query translation and record normalization over one MMD Solr core.
pub struct CatalogService {
	pub cfg: Config,
	pub providers: Providers,
	scope: ScopeFilter,
}
impl CatalogService {
	pub fn new(cfg: Config) -> Self {
		Self::with_providers(cfg, Providers::default())
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		let scope = ScopeFilter::from_config(&cfg);

		Self { cfg, providers, scope }
	}

	pub fn scope(&self) -> &ScopeFilter {
		&self.scope
	}

	pub fn normalizer(&self) -> RecordNormalizer<'_> {
		RecordNormalizer::new(&self.cfg, self.providers.transformer.as_ref())
	}

	pub(crate) async fn select(&self, params: &SelectParams) -> Result<SelectResponse> {
		tracing::debug!(
			q = %params.q,
			fq = ?params.filters(),
			start = params.start,
			rows = params.rows,
			"Issuing Solr select."
		);

		let response = self.providers.backend.select(&self.cfg.solr, params).await?;

		tracing::debug!(
			num_found = response.response.num_found,
			returned = response.response.docs.len(),
			"Solr select returned."
		);

		Ok(response)
	}
}

struct DefaultProviders;

impl SearchBackend for DefaultProviders {
	fn select<'a>(
		&'a self,
		cfg: &'a Solr,
		params: &'a SelectParams,
	) -> BoxFuture<'a, mmd_providers::Result<SelectResponse>> {
		Box::pin(solr::select(cfg, params))
	}
}

impl XmlTransformer for DefaultProviders {
	fn transform<'a>(
		&'a self,
		cfg: &'a XsltProcessor,
		stylesheet: &'a Path,
		source: &'a [u8],
	) -> BoxFuture<'a, mmd_providers::Result<Vec<u8>>> {
		Box::pin(xslt::transform(cfg, stylesheet, source))
	}
}
