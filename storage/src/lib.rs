//storage holds the MongoDB schema, async CRUD and the background snapshot sink

pub mod models;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use crate::models::{LayoutDoc, TerrainDoc};
use bson::doc;
use futures_util::stream::TryStreamExt;
use layout_core::{LayoutError, LayoutSnapshot, PersistenceError, SnapshotSink, Terrain};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, IndexModel};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("mongodb: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("stored terrain is malformed: {0}")]
    Corrupt(#[from] LayoutError),
}

pub type Result<T> = std::result::Result<T, StorageError>;

// fail fast when no server is listening
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub uri: String,
    pub database: String,
    pub terrain_collection: String,
    pub layout_collection: String,
    pub app_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "site_layout".to_string(),
            terrain_collection: "terrains".to_string(),
            layout_collection: "layouts".to_string(),
            app_name: "SiteLayout".to_string(),
        }
    }
}

impl StorageConfig {
    // Defaults overridden by SITE_LAYOUT_* environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        let vars = [
            ("SITE_LAYOUT_MONGO_URI", &mut config.uri),
            ("SITE_LAYOUT_DB", &mut config.database),
            ("SITE_LAYOUT_TERRAIN_COLLECTION", &mut config.terrain_collection),
            ("SITE_LAYOUT_LAYOUT_COLLECTION", &mut config.layout_collection),
        ];
        for (key, slot) in vars {
            if let Ok(value) = env::var(key) {
                if !value.trim().is_empty() {
                    *slot = value;
                }
            }
        }
        config
    }
}

pub struct LayoutStorage {
    terrains: Collection<TerrainDoc>,
    layouts: Collection<LayoutDoc>,
}

impl LayoutStorage {
    // Connect and make sure each project owns at most one document per collection.
    pub async fn init(config: &StorageConfig) -> Result<Self> {
        let mut opts = ClientOptions::parse(&config.uri).await?;
        opts.app_name = Some(config.app_name.clone());
        opts.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);
        let client = Client::with_options(opts)?;
        let db = client.database(&config.database);
        let terrains: Collection<TerrainDoc> = db.collection(&config.terrain_collection);
        let layouts: Collection<LayoutDoc> = db.collection(&config.layout_collection);

        let unique = IndexOptions::builder().unique(true).build();
        terrains
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "project_id": 1 })
                    .options(unique.clone())
                    .build(),
            )
            .await?;
        layouts
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "project_id": 1 })
                    .options(unique)
                    .build(),
            )
            .await?;

        log::info!("connected to {} / {}", config.uri, config.database);
        Ok(Self { terrains, layouts })
    }

    // Replace the project's terrain with this revision.
    pub async fn save_terrain(&self, terrain: &Terrain) -> Result<()> {
        let doc_obj = TerrainDoc::from(terrain);
        self.terrains
            .replace_one(doc! { "project_id": &doc_obj.project_id }, doc_obj)
            .upsert(true)
            .await?;
        Ok(())
    }

    pub async fn load_terrain(&self, project_id: &str) -> Result<Option<Terrain>> {
        match self.terrains.find_one(doc! { "project_id": project_id }).await? {
            Some(doc_obj) => Ok(Some(Terrain::try_from(doc_obj)?)),
            None => Ok(None),
        }
    }

    pub async fn save_layout(&self, snapshot: &LayoutSnapshot) -> Result<()> {
        let doc_obj = LayoutDoc::from(snapshot);
        self.layouts
            .replace_one(doc! { "project_id": &doc_obj.project_id }, doc_obj)
            .upsert(true)
            .await?;
        Ok(())
    }

    pub async fn load_layout(&self, project_id: &str) -> Result<Option<LayoutSnapshot>> {
        let found = self.layouts.find_one(doc! { "project_id": project_id }).await?;
        Ok(found.map(LayoutSnapshot::from))
    }

    // Every project with a stored terrain.
    pub async fn list_projects(&self) -> Result<Vec<String>> {
        let mut cursor = self.terrains.find(doc! {}).await?;
        let mut ids = Vec::new();
        while let Some(doc_obj) = cursor.try_next().await? {
            ids.push(doc_obj.project_id);
        }
        ids.sort();
        Ok(ids)
    }

    // Delete terrain and layout (for clean-up).
    pub async fn delete_project(&self, project_id: &str) -> Result<()> {
        self.terrains.delete_many(doc! { "project_id": project_id }).await?;
        self.layouts.delete_many(doc! { "project_id": project_id }).await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Job {
    Terrain(Terrain),
    Layout(LayoutSnapshot),
}

impl Job {
    fn describe(&self) -> (&str, &'static str) {
        match self {
            Job::Terrain(t) => (t.project_id(), "terrain"),
            Job::Layout(l) => (l.project_id.as_str(), "layout"),
        }
    }
}

// A write that didn't make it to the store. Not retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceFailure {
    pub project_id: String,
    pub what: &'static str,
    pub error: String,
}

/// [`SnapshotSink`] backed by [`LayoutStorage`]. Snapshots are queued to one
/// background task on the given runtime and written in the order they were
/// handed over; failures come back on the receiver returned by [`MongoSink::spawn`].
pub struct MongoSink {
    jobs: mpsc::UnboundedSender<Job>,
}

impl MongoSink {
    pub fn spawn(storage: Arc<LayoutStorage>, handle: &Handle) -> (Self, mpsc::UnboundedReceiver<PersistenceFailure>) {
        let (jobs, mut queue) = mpsc::unbounded_channel::<Job>();
        let (failures, failed) = mpsc::unbounded_channel();

        handle.spawn(async move {
            while let Some(job) = queue.recv().await {
                let result = match &job {
                    Job::Terrain(terrain) => storage.save_terrain(terrain).await,
                    Job::Layout(layout) => storage.save_layout(layout).await,
                };
                if let Err(err) = result {
                    let (project_id, what) = job.describe();
                    log::warn!("failed to store {what} for {project_id}: {err}");
                    let _ = failures.send(PersistenceFailure {
                        project_id: project_id.to_string(),
                        what,
                        error: err.to_string(),
                    });
                }
            }
            log::debug!("snapshot writer stopped");
        });

        (Self { jobs }, failed)
    }

    fn enqueue(&self, job: Job) -> std::result::Result<(), PersistenceError> {
        self.jobs.send(job).map_err(|_| PersistenceError::Unavailable)
    }
}

impl SnapshotSink for MongoSink {
    fn store_terrain(&self, terrain: &Terrain) -> std::result::Result<(), PersistenceError> {
        self.enqueue(Job::Terrain(terrain.clone()))
    }

    fn store_layout(&self, layout: &LayoutSnapshot) -> std::result::Result<(), PersistenceError> {
        self.enqueue(Job::Layout(layout.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::StorageConfig;

    #[test]
    fn storage_config_defaults() {
        let config = StorageConfig::default();
        assert_eq!(config.uri, "mongodb://localhost:27017");
        assert_eq!(config.database, "site_layout");
        assert_eq!(config.terrain_collection, "terrains");
        assert_eq!(config.layout_collection, "layouts");
    }
}
