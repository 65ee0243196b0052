//! In-process item transport.
//!
//! Keeps items in memory and answers with the statuses the catalogue service
//! uses: `200` for reads, `201` for creation, `204` for replacement and
//! deletion, `400` for payloads that violate item limits and `404` for
//! unknown ids. Patches are answered with the patched item (`200`), without
//! a body (`204`) or with a malformed body (`200`), depending on
//! [`PatchReplyMode`].
//!
//! Faults can be injected ahead of any call: scripted faults are consumed in
//! order first, then seeded random faults fire at a configured rate.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::Clock;
use outcome::ProtocolStatus;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::domain::ports::{ItemTransport, TransportError, TransportReply};
use crate::domain::{Item, ItemId, ItemUpdate, NewItem, PatchDocument};

const MALFORMED_PATCH_BODY: &str = "expected value at line 1 column 1";

/// How the in-memory transport answers an accepted patch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PatchReplyMode {
    /// `200` with the patched item.
    #[default]
    WithBody,
    /// `204` without content.
    WithoutBody,
    /// `200` with a body that cannot be decoded.
    MalformedBody,
}

struct RandomFaults {
    rate: f64,
    rng: Mutex<SmallRng>,
}

/// [`ItemTransport`] backed by an in-memory map.
pub struct InMemoryItemTransport {
    items: Mutex<BTreeMap<ItemId, Item>>,
    clock: Arc<dyn Clock>,
    patch_reply: PatchReplyMode,
    scripted_faults: Mutex<VecDeque<TransportError>>,
    random_faults: Option<RandomFaults>,
    calls: AtomicUsize,
}

impl InMemoryItemTransport {
    /// Empty store stamping creation dates from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            items: Mutex::new(BTreeMap::new()),
            clock,
            patch_reply: PatchReplyMode::default(),
            scripted_faults: Mutex::new(VecDeque::new()),
            random_faults: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Seed the store with existing items.
    pub fn with_items(self, items: impl IntoIterator<Item = Item>) -> Self {
        let seeded = items.into_iter().map(|item| (item.id(), item)).collect();
        Self {
            items: Mutex::new(seeded),
            ..self
        }
    }

    /// Choose how accepted patches are answered.
    pub fn with_patch_reply(mut self, mode: PatchReplyMode) -> Self {
        self.patch_reply = mode;
        self
    }

    /// Fail calls at random with probability `rate`, reproducibly for a
    /// given `seed`. The rate is clamped to `0.0..=1.0`.
    pub fn with_random_faults(mut self, rate: f64, seed: u64) -> Self {
        let rate = if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) };
        self.random_faults = Some(RandomFaults {
            rate,
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        });
        self
    }

    /// Queue `fault` to be raised by a future call, after any faults already
    /// queued.
    pub fn push_fault(&self, fault: TransportError) -> Result<(), TransportError> {
        lock(&self.scripted_faults)?.push_back(fault);
        Ok(())
    }

    /// Number of calls received, faulted ones included.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Stored copy of an item.
    pub fn snapshot(&self, id: &ItemId) -> Result<Option<Item>, TransportError> {
        Ok(lock(&self.items)?.get(id).cloned())
    }

    /// Count a call and raise the next injected fault, if any.
    fn begin(&self, operation: &'static str) -> Result<(), TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(fault) = lock(&self.scripted_faults)?.pop_front() {
            debug!(operation, kind = fault.kind(), "injecting scripted fault");
            return Err(fault);
        }
        if let Some(random) = &self.random_faults {
            if lock(&random.rng)?.gen_bool(random.rate) {
                debug!(operation, rate = random.rate, "injecting random fault");
                return Err(TransportError::connection(
                    format!("injected fault during {operation}"),
                    None,
                ));
            }
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, TransportError> {
    mutex
        .lock()
        .map_err(|_| TransportError::connection("in-memory store lock poisoned", None))
}

#[async_trait]
impl ItemTransport for InMemoryItemTransport {
    async fn fetch_all(&self) -> Result<TransportReply<Vec<Item>>, TransportError> {
        self.begin("fetch_all")?;
        let items = lock(&self.items)?.values().cloned().collect();
        Ok(TransportReply::decoded(ProtocolStatus::OK, items))
    }

    async fn fetch_one(&self, id: &ItemId) -> Result<TransportReply<Item>, TransportError> {
        self.begin("fetch_one")?;
        Ok(match lock(&self.items)?.get(id) {
            Some(item) => TransportReply::decoded(ProtocolStatus::OK, item.clone()),
            None => TransportReply::empty(ProtocolStatus::NOT_FOUND),
        })
    }

    async fn create(&self, item: &NewItem) -> Result<TransportReply<Item>, TransportError> {
        self.begin("create")?;
        let created = match Item::from_new(ItemId::random(), item, self.clock.utc()) {
            Ok(created) => created,
            Err(error) => {
                debug!(%error, "rejecting invalid item");
                return Ok(TransportReply::empty(ProtocolStatus::BAD_REQUEST));
            }
        };
        lock(&self.items)?.insert(created.id(), created.clone());
        Ok(TransportReply::decoded(ProtocolStatus::CREATED, created))
    }

    async fn replace(
        &self,
        id: &ItemId,
        update: &ItemUpdate,
    ) -> Result<TransportReply<()>, TransportError> {
        self.begin("replace")?;
        let mut items = lock(&self.items)?;
        let Some(stored) = items.get_mut(id) else {
            return Ok(TransportReply::empty(ProtocolStatus::NOT_FOUND));
        };
        Ok(match stored.apply_update(update) {
            Ok(()) => TransportReply::empty(ProtocolStatus::NO_CONTENT),
            Err(error) => {
                debug!(item_id = %id, %error, "rejecting invalid replacement");
                TransportReply::empty(ProtocolStatus::BAD_REQUEST)
            }
        })
    }

    async fn apply_patch(
        &self,
        id: &ItemId,
        patch: &PatchDocument,
    ) -> Result<TransportReply<Item>, TransportError> {
        self.begin("apply_patch")?;
        let mut items = lock(&self.items)?;
        let Some(stored) = items.get_mut(id) else {
            return Ok(TransportReply::empty(ProtocolStatus::NOT_FOUND));
        };
        let patched = match patch.apply_to(stored) {
            Ok(patched) => patched,
            Err(error) => {
                debug!(item_id = %id, %error, "rejecting invalid patch");
                return Ok(TransportReply::empty(ProtocolStatus::BAD_REQUEST));
            }
        };
        *stored = patched.clone();
        Ok(match self.patch_reply {
            PatchReplyMode::WithBody => TransportReply::decoded(ProtocolStatus::OK, patched),
            PatchReplyMode::WithoutBody => TransportReply::empty(ProtocolStatus::NO_CONTENT),
            PatchReplyMode::MalformedBody => {
                TransportReply::undecodable(ProtocolStatus::OK, MALFORMED_PATCH_BODY)
            }
        })
    }

    async fn delete(&self, id: &ItemId) -> Result<TransportReply<()>, TransportError> {
        self.begin("delete")?;
        Ok(match lock(&self.items)?.remove(id) {
            Some(_) => TransportReply::empty(ProtocolStatus::NO_CONTENT),
            None => TransportReply::empty(ProtocolStatus::NOT_FOUND),
        })
    }
}
