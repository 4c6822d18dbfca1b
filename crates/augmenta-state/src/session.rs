//! Tracking session
//!
//! The session owns every table and is the only place state changes.
//! `ingest` routes a message, extracts its fields, mutates the matching
//! table and emits one event.
//!
//! Locking:
//! - One session-wide `RwLock` guards the tables; queries take the read
//!   side and return copies.
//! - A reentrant emission lock serializes ingestion so subscribers see
//!   events in mutation order. The table lock is released before handlers
//!   run, so a handler may query the session or even ingest re-entrantly.

use augmenta_core::{AuxData, Entity, ObjectId, OscMessage, Scene, SceneEvent, VideoOutput};
use parking_lot::{ReentrantMutex, RwLock};
use tracing::{debug, trace, warn};

use crate::{
    apply_recipe, AddressRouter, AuxDataStore, EntityStore, EventBus, Lifecycle, ProtocolVersion,
    Recipe, Route, SceneState, SchemaTable, SubscriptionId, VideoOutputState,
};

/// Counters kept by a session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Messages that matched a route and were applied
    pub messages_ingested: u64,
    /// Messages dropped as unroutable
    pub messages_dropped: u64,
    /// Events handed to the bus
    pub events_emitted: u64,
    /// Scene snapshots applied since the last clear
    pub scene_snapshots: u64,
    /// Video output snapshots applied since the last clear
    pub video_output_snapshots: u64,
}

/// What `ingest` did with a message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IngestOutcome {
    Applied(Lifecycle),
    Dropped,
}

#[derive(Debug, Default)]
struct SessionTables {
    objects: EntityStore,
    extras: AuxDataStore,
    scene: SceneState,
    video_output: VideoOutputState,
    stats: SessionStats,
}

impl SessionTables {
    fn apply(&mut self, route: Route, msg: &OscMessage) -> Option<SceneEvent> {
        match (route.lifecycle, route.recipe) {
            (Lifecycle::Enter | Lifecycle::Update, Recipe::Entity { id_index, fields }) => {
                let pid = read_id(msg, id_index);
                let upserted = self.objects.upsert(pid, |entity| {
                    apply_recipe(entity, fields, msg);
                });
                debug!(%pid, created = upserted.created, lifecycle = ?route.lifecycle, "Object upserted");

                Some(if route.lifecycle == Lifecycle::Enter {
                    SceneEvent::ObjectEntered(upserted.record)
                } else {
                    SceneEvent::ObjectUpdated(upserted.record)
                })
            }
            (Lifecycle::Leave, Recipe::Entity { id_index, .. }) => {
                let pid = read_id(msg, id_index);
                let last = self.objects.remove(pid);
                if last.is_none() {
                    debug!(%pid, "Leave for an object that is not present");
                } else {
                    debug!(%pid, "Object left");
                }
                Some(SceneEvent::ObjectWillLeave(last.unwrap_or_default()))
            }
            (Lifecycle::AuxEnter | Lifecycle::AuxUpdate, Recipe::AuxData { id_index, fields }) => {
                let pid = read_id(msg, id_index);
                let upserted = self.extras.upsert(pid, |aux| {
                    apply_recipe(aux, fields, msg);
                });
                debug!(%pid, created = upserted.created, lifecycle = ?route.lifecycle, "Aux data upserted");

                Some(if route.lifecycle == Lifecycle::AuxEnter {
                    SceneEvent::AuxEntered(upserted.record)
                } else {
                    SceneEvent::AuxUpdated(upserted.record)
                })
            }
            (Lifecycle::AuxLeave, Recipe::AuxData { id_index, .. }) => {
                let pid = read_id(msg, id_index);
                let last = self.extras.remove(pid);
                debug!(%pid, present = last.is_some(), "Aux data left");
                Some(SceneEvent::AuxLeft(last.unwrap_or_default()))
            }
            (Lifecycle::SceneSnapshot, Recipe::Scene { fields }) => {
                let mut scene = self.scene.get();
                apply_recipe(&mut scene, fields, msg);
                self.scene.apply_snapshot(scene);
                Some(SceneEvent::SceneUpdated(scene))
            }
            (Lifecycle::VideoOutputSnapshot, Recipe::VideoOutput { fields }) => {
                let mut output = self.video_output.get();
                apply_recipe(&mut output, fields, msg);
                self.video_output.apply_snapshot(output);
                Some(SceneEvent::VideoOutputUpdated(output))
            }
            (lifecycle, recipe) => {
                warn!(?lifecycle, kind = ?recipe.kind(), "Schema route pairs a lifecycle with the wrong record kind");
                None
            }
        }
    }
}

/// Read the id argument; an unreadable id falls back to the unresolved key
fn read_id(msg: &OscMessage, index: usize) -> ObjectId {
    match msg.get_int32(index) {
        Some(id) => ObjectId::new(id),
        None => {
            trace!(address = %msg.address, index, "Id argument missing or mistyped");
            ObjectId::UNRESOLVED
        }
    }
}

/// Live model of one scene
pub struct TrackingSession {
    router: AddressRouter,
    tables: RwLock<SessionTables>,
    emit_order: ReentrantMutex<()>,
    bus: EventBus,
}

impl TrackingSession {
    /// Create a session for a fixed protocol version
    pub fn new(version: ProtocolVersion) -> Self {
        TrackingSession::with_schema(SchemaTable::for_version(version))
    }

    pub fn with_schema(schema: SchemaTable) -> Self {
        TrackingSession {
            router: AddressRouter::new(schema),
            tables: RwLock::new(SessionTables::default()),
            emit_order: ReentrantMutex::new(()),
            bus: EventBus::new(),
        }
    }

    pub fn protocol_version(&self) -> ProtocolVersion {
        self.router.schema().version()
    }

    pub fn router(&self) -> &AddressRouter {
        &self.router
    }

    /// Apply one message and deliver the resulting event.
    ///
    /// Never fails: unroutable messages are dropped, unreadable arguments
    /// leave their field unchanged.
    pub fn ingest(&self, msg: &OscMessage) -> IngestOutcome {
        let Some(route) = self.router.route(&msg.address) else {
            trace!(address = %msg.address, "Dropping unroutable message");
            self.tables.write().stats.messages_dropped += 1;
            return IngestOutcome::Dropped;
        };

        let _order = self.emit_order.lock();

        let event = {
            let mut tables = self.tables.write();
            let event = tables.apply(route, msg);
            match event {
                Some(_) => {
                    tables.stats.messages_ingested += 1;
                    tables.stats.events_emitted += 1;
                }
                None => tables.stats.messages_dropped += 1,
            }
            event
        };

        match event {
            Some(event) => {
                self.bus.publish(&event);
                IngestOutcome::Applied(route.lifecycle)
            }
            None => IngestOutcome::Dropped,
        }
    }

    /// Ingest messages in order
    pub fn ingest_all<'a, I>(&self, messages: I) -> usize
    where
        I: IntoIterator<Item = &'a OscMessage>,
    {
        messages
            .into_iter()
            .filter(|msg| matches!(self.ingest(msg), IngestOutcome::Applied(_)))
            .count()
    }

    /// Register an event handler
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&SceneEvent) + Send + Sync + 'static,
    {
        self.bus.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// All present objects, unordered
    pub fn objects(&self) -> Vec<Entity> {
        self.tables.read().objects.snapshot()
    }

    /// Ids of all present objects, sorted
    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.tables.read().objects.ids()
    }

    pub fn object(&self, pid: ObjectId) -> Option<Entity> {
        self.tables.read().objects.get(pid)
    }

    pub fn object_count(&self) -> usize {
        self.tables.read().objects.len()
    }

    /// Object with the lowest age
    pub fn newest_object(&self) -> Option<Entity> {
        self.tables.read().objects.newest()
    }

    /// Object with the highest age
    pub fn oldest_object(&self) -> Option<Entity> {
        self.tables.read().objects.oldest()
    }

    #[deprecated(note = "the sentinel is ambiguous; use `newest_object`")]
    #[allow(deprecated)]
    pub fn newest_object_or_sentinel(&self) -> Entity {
        self.tables.read().objects.newest_or_sentinel()
    }

    #[deprecated(note = "the default record is indistinguishable from a real object; use `oldest_object`")]
    #[allow(deprecated)]
    pub fn oldest_object_or_default(&self) -> Entity {
        self.tables.read().objects.oldest_or_default()
    }

    /// All present auxiliary records, unordered
    pub fn extras(&self) -> Vec<AuxData> {
        self.tables.read().extras.snapshot()
    }

    pub fn extra(&self, pid: ObjectId) -> Option<AuxData> {
        self.tables.read().extras.get(pid)
    }

    pub fn scene(&self) -> Scene {
        self.tables.read().scene.get()
    }

    pub fn video_output(&self) -> VideoOutput {
        self.tables.read().video_output.get()
    }

    pub fn stats(&self) -> SessionStats {
        let tables = self.tables.read();
        SessionStats {
            scene_snapshots: tables.scene.snapshot_count(),
            video_output_snapshots: tables.video_output.snapshot_count(),
            ..tables.stats
        }
    }

    /// Empty both keyed tables and reset the single records. No events are
    /// emitted; counters are kept.
    pub fn clear(&self) {
        let _order = self.emit_order.lock();
        let mut tables = self.tables.write();
        tables.objects.clear();
        tables.extras.clear();
        tables.scene.reset();
        tables.video_output.reset();
        debug!("Session cleared");
    }
}

impl Default for TrackingSession {
    fn default() -> Self {
        TrackingSession::new(ProtocolVersion::default())
    }
}
