pub mod config;
pub mod controllers;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
pub mod storage;
pub mod store;

use anyhow::Context;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use config::{Config, StoreBackend};
use services::{
    EventService, MediaService, ProjectionService, RsvpService, SlugGenerator, TemplateService,
    ViewCounter, ViewWorker,
};
use storage::{BlobStore, LocalBlobStore};
use store::{memory::InMemoryStore, postgres::PgStore, Stores};

// Shared state для всего приложения
pub struct AppState {
    pub config: Config,
    pub tokens: middleware::TokenKeys,
    pub events: EventService,
    pub projection: ProjectionService,
    pub rsvp: RsvpService,
    pub media: MediaService,
    pub templates: TemplateService,
    pub blobs: Arc<dyn BlobStore>,
    view_worker: Mutex<Option<ViewWorker>>,
}

impl AppState {
    /// Собирает сервисы поверх готовых хранилищ. Запускает воркер счётчика
    /// просмотров, поэтому вызывается внутри рантайма tokio.
    pub fn new(config: Config, stores: Stores, blobs: Arc<dyn BlobStore>) -> Arc<Self> {
        let slugs = Arc::new(SlugGenerator::from_seed(
            config.slug.seed,
            config.slug.max_attempts,
        ));
        let (views, view_worker) =
            ViewCounter::spawn(stores.events.clone(), config.view_counter.queue_capacity);

        let events = EventService::new(stores.events.clone(), stores.templates.clone(), slugs);
        let projection = ProjectionService::new(
            events.clone(),
            stores.events.clone(),
            stores.guests.clone(),
            stores.media.clone(),
            views,
        );

        Arc::new(Self {
            tokens: middleware::TokenKeys::new(&config.jwt.secret, config.jwt.expires_in_hours),
            rsvp: RsvpService::new(stores.events.clone(), stores.guests.clone()),
            media: MediaService::new(stores.events.clone(), stores.media.clone()),
            templates: TemplateService::new(stores.templates.clone()),
            events,
            projection,
            blobs,
            config,
            view_worker: Mutex::new(Some(view_worker)),
        })
    }

    /// Останавливает фоновые задачи: закрывает очередь просмотров и ждёт,
    /// пока принятые просмотры будут записаны. Повторный вызов ничего не делает.
    pub async fn shutdown(&self) {
        if let Some(worker) = self.view_worker.lock().await.take() {
            worker.shutdown().await;
        }
    }

    /// Подключает хранилище согласно конфигурации и готовит каталог для файлов.
    pub async fn connect(config: Config) -> anyhow::Result<Arc<Self>> {
        let stores = match config.app.store_backend {
            StoreBackend::Postgres => {
                let url = config
                    .database
                    .url
                    .as_deref()
                    .context("DATABASE_URL must be set")?;
                Stores::postgres(PgStore::connect(url, config.database.pool_size).await?)
            }
            StoreBackend::Memory => {
                info!("Using in-memory store, data is lost on restart");
                Stores::in_memory(InMemoryStore::new())
            }
        };

        let blobs = LocalBlobStore::new(&config.storage.base_path, &config.storage.base_url);
        blobs
            .ensure_dirs()
            .await
            .with_context(|| format!("Failed to prepare {}", config.storage.base_path))?;

        Ok(Self::new(config, stores, Arc::new(blobs)))
    }
}
