use qdrant_client::{
	client::Payload,
	qdrant::{
		CreateCollectionBuilder, Distance, PointStruct, Query, QueryPointsBuilder, ScoredPoint,
		UpsertPointsBuilder, VectorParamsBuilder,
	},
};
use uuid::Uuid;

use crate::Result;

/// Thin wrapper over the three vector surfaces: learned answers, knowledge
/// chunks, and unanswered questions. Each surface is its own collection with
/// a single dense cosine vector.
pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub learned_collection: String,
	pub chunk_collection: String,
	pub unanswered_collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &ansa_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self {
			client,
			learned_collection: cfg.learned_collection.clone(),
			chunk_collection: cfg.chunk_collection.clone(),
			unanswered_collection: cfg.unanswered_collection.clone(),
			vector_dim: cfg.vector_dim,
		})
	}

	/// Idempotent. The chunk collection is populated by an external ingestion
	/// pipeline; creating it empty here only spares first-boot ordering.
	pub async fn ensure_collections(&self) -> Result<()> {
		for collection in
			[&self.learned_collection, &self.chunk_collection, &self.unanswered_collection]
		{
			if self.client.collection_exists(collection).await? {
				continue;
			}

			self.client
				.create_collection(CreateCollectionBuilder::new(collection.clone()).vectors_config(
					VectorParamsBuilder::new(u64::from(self.vector_dim), Distance::Cosine),
				))
				.await?;
		}

		Ok(())
	}

	pub async fn search(
		&self,
		collection: &str,
		vector: Vec<f32>,
		top_k: u64,
		min_similarity: f32,
	) -> Result<Vec<ScoredPoint>> {
		let query = QueryPointsBuilder::new(collection)
			.query(Query::new_nearest(vector))
			.limit(top_k)
			.score_threshold(min_similarity)
			.with_payload(true);
		let response = self.client.query(query).await?;

		Ok(response.result)
	}

	pub async fn upsert(
		&self,
		collection: &str,
		id: Uuid,
		vector: Vec<f32>,
		payload: Payload,
	) -> Result<()> {
		let point = PointStruct::new(id.to_string(), vector, payload);

		self.client
			.upsert_points(UpsertPointsBuilder::new(collection, vec![point]).wait(true))
			.await?;

		Ok(())
	}
}
