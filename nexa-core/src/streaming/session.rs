//! Streaming session lifecycle: segment cache, transcoder process slots,
//! idle teardown (spec.md §4.G, §5).

use crate::streaming::capability::{resolve_plan, select_part};
use dashmap::DashMap;
use nexa_contracts::catalog::MediaPartRepository;
use nexa_contracts::error::{CoreError, CoreResult};
use nexa_contracts::streaming::{CapabilityProfile, DeliveryMode, StreamPlan};
use nexa_model::prelude::*;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Child;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// One active play session: the resolved part/plan plus whatever
/// transcoder subprocess and segment cache entries it owns. Holding a
/// `Transcode`-mode session's semaphore permit for its lifetime is what
/// bounds `MaxConcurrentTranscodes` concurrent encodes.
pub struct StreamSession {
    pub id: Uuid,
    pub item_id: MetadataItemId,
    pub part: MediaPart,
    pub plan: StreamPlan,
    last_segment_request_ms: AtomicI64,
    transcoder: Mutex<Option<Child>>,
    _transcode_permit: Option<OwnedSemaphorePermit>,
}

impl StreamSession {
    fn touch(&self) {
        self.last_segment_request_ms.store(chrono::Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    fn idle_for(&self) -> Duration {
        let last = self.last_segment_request_ms.load(Ordering::Relaxed);
        let elapsed_ms = (chrono::Utc::now().timestamp_millis() - last).max(0);
        Duration::from_millis(elapsed_ms as u64)
    }
}

/// Owns every active streaming session, the segment cache, and the
/// transcoder process pool. One instance per server process.
pub struct StreamingSessionManager {
    media_parts: Arc<dyn MediaPartRepository>,
    sessions: DashMap<Uuid, Arc<StreamSession>>,
    segments: DashMap<(Uuid, u32), Arc<Vec<u8>>>,
    transcode_slots: Arc<Semaphore>,
    idle_timeout: Duration,
}

impl StreamingSessionManager {
    pub fn new(media_parts: Arc<dyn MediaPartRepository>, settings: StreamingSettings) -> Arc<Self> {
        Arc::new(Self {
            media_parts,
            sessions: DashMap::new(),
            segments: DashMap::new(),
            transcode_slots: Arc::new(Semaphore::new(settings.max_concurrent_transcodes.max(1))),
            idle_timeout: Duration::from_secs(settings.idle_timeout_secs),
        })
    }

    /// Resolves the play plan and opens a session, queuing behind the
    /// transcoder semaphore when the plan requires a transcode (spec.md
    /// §5 "new sessions queue").
    pub async fn start_session(&self, item_id: MetadataItemId, profile: CapabilityProfile) -> CoreResult<Arc<StreamSession>> {
        let parts = self.media_parts.for_item(item_id).await?;
        let part = select_part(&parts, &profile)?.clone();
        let plan = resolve_plan(item_id, &part, &profile);

        let permit = if plan.delivery_mode == DeliveryMode::Transcode {
            Some(
                self.transcode_slots
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|_| CoreError::internal("transcoder pool is shut down"))?,
            )
        } else {
            None
        };

        let session = Arc::new(StreamSession {
            id: Uuid::new_v4(),
            item_id,
            part,
            plan,
            last_segment_request_ms: AtomicI64::new(chrono::Utc::now().timestamp_millis()),
            transcoder: Mutex::new(None),
            _transcode_permit: permit,
        });
        self.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    pub fn session(&self, id: Uuid) -> CoreResult<Arc<StreamSession>> {
        self.sessions.get(&id).map(|e| e.clone()).ok_or_else(|| CoreError::not_found("streaming session not found"))
    }

    pub async fn attach_transcoder(&self, session_id: Uuid, child: Child) {
        if let Some(session) = self.sessions.get(&session_id) {
            *session.transcoder.lock().await = Some(child);
        }
    }

    /// Cache lookup. Touches the session's last-activity clock so the idle
    /// reaper doesn't tear it down mid-playback.
    pub fn cached_segment(&self, session_id: Uuid, index: u32) -> Option<Arc<Vec<u8>>> {
        if let Some(session) = self.sessions.get(&session_id) {
            session.touch();
        }
        self.segments.get(&(session_id, index)).map(|e| e.clone())
    }

    /// Inserts a produced segment. Never overwrites an existing index —
    /// per spec.md §5, a late-arriving lower segment index after a higher
    /// one is allowed but must not clobber an already-cached entry.
    pub fn cache_segment(&self, session_id: Uuid, index: u32, bytes: Vec<u8>) {
        self.segments.entry((session_id, index)).or_insert_with(|| Arc::new(bytes));
    }

    pub async fn teardown(&self, session_id: Uuid) {
        if let Some((_, session)) = self.sessions.remove(&session_id) {
            if let Some(mut child) = session.transcoder.lock().await.take() {
                let _ = child.kill().await;
            }
        }
        self.segments.retain(|(id, _), _| *id != session_id);
    }

    /// Runs for the server's lifetime, tearing down sessions that have
    /// seen no segment request for `IdleTimeoutSecs` (spec.md §4.G).
    pub async fn run_idle_reaper(self: Arc<Self>, token: CancellationToken) {
        let mut ticker = tokio::time::interval(Duration::from_secs(5));
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let idle: Vec<Uuid> = self
                        .sessions
                        .iter()
                        .filter(|e| e.value().idle_for() >= self.idle_timeout)
                        .map(|e| *e.key())
                        .collect();
                    for id in idle {
                        tracing::info!(session = %id, "tearing down idle streaming session");
                        self.teardown(id).await;
                    }
                }
                _ = token.cancelled() => break,
            }
        }
    }
}
