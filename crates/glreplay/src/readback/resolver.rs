use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lru::LruCache;
use tokio::sync::{oneshot, Mutex as AsyncMutex};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::stage::{self, StagePlan};
use super::{ReadbackError, ReadbackKey, ReadbackStats, ResolvedTexture};
use crate::config::ReadbackConfig;
use crate::content::ContentStore;
use crate::emitter::ReplaySession;
use crate::state::{ReplayTarget, TextureSource};

/// A replay session shared between resolutions. Holding the lock grants exclusive use of the
/// session's device context.
pub type SharedSession = Arc<AsyncMutex<Box<dyn ReplaySession>>>;

/// Live replay sessions by capture and device.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<ReplayTarget, SharedSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `session` for `target`, replacing any previous one.
    pub fn insert(
        &self,
        target: ReplayTarget,
        session: impl ReplaySession + 'static,
    ) -> SharedSession {
        let session: SharedSession = Arc::new(AsyncMutex::new(Box::new(session)));
        self.lock().insert(target, Arc::clone(&session));
        session
    }

    pub fn remove(&self, target: &ReplayTarget) -> Option<SharedSession> {
        self.lock().remove(target)
    }

    pub fn get(&self, target: &ReplayTarget) -> Option<SharedSession> {
        self.lock().get(target).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ReplayTarget, SharedSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

type Outcome = Result<ResolvedTexture, ReadbackError>;

struct InFlight {
    generation: u64,
    token: CancellationToken,
    waiters: Vec<oneshot::Sender<Outcome>>,
    /// Callers still awaiting this resolution. Reaching zero cancels it.
    live: usize,
}

struct ResolverState {
    cache: Option<LruCache<ReadbackKey, ResolvedTexture>>,
    in_flight: HashMap<ReadbackKey, InFlight>,
    next_generation: u64,
}

struct Inner {
    textures: Arc<dyn TextureSource>,
    sessions: Arc<SessionRegistry>,
    content: Arc<ContentStore>,
    config: ReadbackConfig,
    stats: ReadbackStats,
    state: Mutex<ResolverState>,
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, ResolverState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Resolves [`ReadbackKey`]s into texture bytes.
///
/// Cheap to clone; clones share the cache, the in-flight table and the statistics.
#[derive(Clone)]
pub struct ReadbackResolver {
    inner: Arc<Inner>,
}

impl ReadbackResolver {
    pub fn new(
        textures: Arc<dyn TextureSource>,
        sessions: Arc<SessionRegistry>,
        content: Arc<ContentStore>,
        config: ReadbackConfig,
    ) -> Self {
        let cache = NonZeroUsize::new(config.cache_capacity).map(LruCache::new);
        Self {
            inner: Arc::new(Inner {
                textures,
                sessions,
                content,
                config,
                stats: ReadbackStats::new(),
                state: Mutex::new(ResolverState {
                    cache,
                    in_flight: HashMap::new(),
                    next_generation: 0,
                }),
            }),
        }
    }

    pub fn stats(&self) -> &ReadbackStats {
        &self.inner.stats
    }

    /// Resolves `key`, joining an identical in-flight resolution if there is one.
    ///
    /// Must be called from within a tokio runtime. Dropping the returned future withdraws this
    /// caller; once every caller of a resolution has withdrawn, the resolution is cancelled at its
    /// next step boundary and its transient device state is torn down.
    pub async fn resolve_texture(
        &self,
        key: ReadbackKey,
    ) -> Result<ResolvedTexture, ReadbackError> {
        let inner = &self.inner;
        inner.stats.inc_requests();

        let (rx, _waiter) = {
            let mut state = inner.lock_state();
            if let Some(hit) = state.cache.as_mut().and_then(|cache| cache.get(&key)) {
                inner.stats.inc_cache_hits();
                debug!(texture = %key.texture, position = %key.position, "readback cache hit");
                return Ok(hit.clone());
            }

            let (tx, rx) = oneshot::channel();
            let generation = match state.in_flight.get_mut(&key) {
                Some(entry) => {
                    entry.waiters.push(tx);
                    entry.live += 1;
                    inner.stats.inc_joins();
                    debug!(
                        texture = %key.texture,
                        position = %key.position,
                        "joined in-flight readback"
                    );
                    entry.generation
                }
                None => {
                    let generation = state.next_generation;
                    state.next_generation += 1;
                    let token = CancellationToken::new();
                    state.in_flight.insert(
                        key,
                        InFlight {
                            generation,
                            token: token.clone(),
                            waiters: vec![tx],
                            live: 1,
                        },
                    );
                    tokio::spawn(run_resolution(Arc::clone(inner), key, generation, token));
                    generation
                }
            };
            (
                rx,
                Waiter {
                    inner: Arc::clone(inner),
                    key,
                    generation,
                },
            )
        };

        rx.await.unwrap_or(Err(ReadbackError::Cancelled))
    }
}

/// Registration of one caller on an in-flight resolution.
struct Waiter {
    inner: Arc<Inner>,
    key: ReadbackKey,
    generation: u64,
}

impl Drop for Waiter {
    fn drop(&mut self) {
        let mut state = self.inner.lock_state();
        let Some(entry) = state.in_flight.get_mut(&self.key) else {
            // Already completed.
            return;
        };
        if entry.generation != self.generation {
            return;
        }
        entry.live = entry.live.saturating_sub(1);
        if entry.live == 0 {
            entry.token.cancel();
            state.in_flight.remove(&self.key);
            debug!(
                texture = %self.key.texture,
                position = %self.key.position,
                "readback abandoned by all callers"
            );
        }
    }
}

async fn run_resolution(
    inner: Arc<Inner>,
    key: ReadbackKey,
    generation: u64,
    token: CancellationToken,
) {
    let outcome = resolve_uncached(&inner, &key, &token).await;
    match &outcome {
        Ok(_) => {}
        Err(ReadbackError::Cancelled) => inner.stats.inc_cancellations(),
        Err(err) => {
            inner.stats.inc_failures();
            debug!(
                texture = %key.texture,
                position = %key.position,
                error = %err,
                "readback failed"
            );
        }
    }

    let (waiters, released) = {
        let mut state = inner.lock_state();
        // The cache holds the only lasting reference on a resolved blob; whatever it pushes out
        // (or never admits) is released.
        let released = match (&outcome, state.cache.as_mut()) {
            (Ok(resolved), Some(cache)) => {
                cache.push(key, resolved.clone()).map(|(_, evicted)| evicted.id)
            }
            (Ok(resolved), None) => Some(resolved.id),
            (Err(_), _) => None,
        };
        // A newer resolution may own the slot if every caller of this one withdrew.
        let current = state
            .in_flight
            .get(&key)
            .is_some_and(|entry| entry.generation == generation);
        let waiters = if current {
            state
                .in_flight
                .remove(&key)
                .map(|entry| entry.waiters)
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        (waiters, released)
    };
    if let Some(id) = released {
        if inner.content.release(&id) {
            debug!(%id, "released evicted readback blob");
        }
    }
    for sender in waiters {
        let _ = sender.send(outcome.clone());
    }
}

async fn resolve_uncached(
    inner: &Inner,
    key: &ReadbackKey,
    token: &CancellationToken,
) -> Result<ResolvedTexture, ReadbackError> {
    let texture = inner
        .textures
        .texture_at(key.target.capture, key.position, key.texture)
        .ok_or(ReadbackError::TextureNotFound {
            texture: key.texture,
            position: key.position,
        })?;
    let plan = StagePlan::new(&texture, key, &inner.config)?;
    let session = inner
        .sessions
        .get(&key.target)
        .ok_or(ReadbackError::SessionNotFound(key.target))?;

    let guard = tokio::select! {
        _ = token.cancelled() => return Err(ReadbackError::Cancelled),
        guard = session.lock_owned() => guard,
    };

    inner.stats.inc_extractions();
    debug!(
        texture = %key.texture,
        position = %key.position,
        level = key.level,
        layer = key.layer,
        size = plan.size,
        "staging texture readback"
    );
    let staged_key = *key;
    let staged_token = token.clone();
    let bytes = tokio::task::spawn_blocking(move || {
        let mut guard = guard;
        stage::extract(&mut **guard, &plan, &staged_key, &staged_token)
    })
    .await
    .map_err(|err| ReadbackError::Internal(err.to_string()))??;

    let bytes: Arc<[u8]> = bytes.into();
    let id = inner.content.store(Arc::clone(&bytes));
    Ok(ResolvedTexture {
        id,
        width: plan.image.width,
        height: plan.image.height,
        bytes,
    })
}
