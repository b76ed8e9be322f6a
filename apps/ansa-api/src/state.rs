use std::sync::Arc;

use ansa_service::ResolverService;
use ansa_storage::{db::Db, qdrant::QdrantStore};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<ResolverService>,
}
impl AppState {
	pub async fn new(config: ansa_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let qdrant = QdrantStore::new(&config.storage.qdrant)?;

		qdrant.ensure_collections().await?;

		let service = ResolverService::new(config, db, qdrant);

		Ok(Self { service: Arc::new(service) })
	}
}
