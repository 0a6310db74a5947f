//! Фоновый счётчик просмотров публичных страниц.
//!
//! Запросы кладут id события в ограниченную очередь и не ждут результата.
//! Один воркер применяет инкременты. Переполненная очередь или ошибка
//! хранилища означают потерянный просмотр: задача логируется и выбрасывается.
//! При остановке сервиса очередь закрывается и дочитывается до конца.

use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::store::EventStore;

#[derive(Clone)]
pub struct ViewCounter {
    tx: mpsc::Sender<Uuid>,
}

/// Ручка воркера: `shutdown` закрывает очередь и дожидается применения
/// всего, что успело в неё попасть.
pub struct ViewWorker {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ViewCounter {
    /// Запускает воркер на текущем рантайме tokio.
    pub fn spawn(events: Arc<dyn EventStore>, capacity: usize) -> (Self, ViewWorker) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let (stop, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run(events, rx, stop_rx));
        (Self { tx }, ViewWorker { stop, handle })
    }

    /// `true`, если задача принята в очередь.
    pub fn record(&self, event_id: Uuid) -> bool {
        match self.tx.try_send(event_id) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(%event_id, "view counter queue is full, dropping view");
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!(%event_id, "view counter is stopped, dropping view");
                false
            }
        }
    }
}

impl ViewWorker {
    /// Новые просмотры после вызова отклоняются, уже принятые применяются.
    pub async fn shutdown(self) {
        // воркер мог уже завершиться сам, тогда получателя нет
        let _ = self.stop.send(true);
        if let Err(e) = self.handle.await {
            warn!(error = %e, "view counter worker ended abnormally");
        }
    }
}

async fn apply(events: &dyn EventStore, event_id: Uuid) {
    match events.increment_view_count(event_id).await {
        Ok(()) => debug!(%event_id, "view counted"),
        Err(e) => warn!(%event_id, error = %e, "failed to count view, discarding"),
    }
}

async fn run(
    events: Arc<dyn EventStore>,
    mut rx: mpsc::Receiver<Uuid>,
    mut stop: watch::Receiver<bool>,
) {
    info!("View counter started");
    let mut detached = false;
    loop {
        tokio::select! {
            job = rx.recv() => match job {
                Some(event_id) => apply(events.as_ref(), event_id).await,
                None => break,
            },
            changed = stop.changed(), if !detached => {
                if changed.is_err() {
                    // ручку выбросили: работаем, пока живы отправители
                    detached = true;
                    continue;
                }
                rx.close();
                let mut drained = 0usize;
                while let Some(event_id) = rx.recv().await {
                    apply(events.as_ref(), event_id).await;
                    drained += 1;
                }
                info!(drained, "View counter drained queued views");
                break;
            }
        }
    }
    info!("View counter stopped");
}
