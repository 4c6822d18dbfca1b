//! Lifecycle events
//!
//! Events are emitted by the session in ingestion order. Each carries a
//! copy of the record it describes.

use serde::Serialize;

use crate::{AuxData, Entity, Scene, VideoOutput};

/// Event classification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    SceneUpdated,
    ObjectEntered,
    ObjectUpdated,
    ObjectWillLeave,
    VideoOutputUpdated,
    AuxEntered,
    AuxUpdated,
    AuxLeft,
}

/// Notification delivered to subscribers
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum SceneEvent {
    SceneUpdated(Scene),
    ObjectEntered(Entity),
    ObjectUpdated(Entity),
    /// Last known record, or a default record if the id was never present
    ObjectWillLeave(Entity),
    VideoOutputUpdated(VideoOutput),
    AuxEntered(AuxData),
    AuxUpdated(AuxData),
    /// Last known record, or a default record if the id was never present
    AuxLeft(AuxData),
}

impl SceneEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SceneEvent::SceneUpdated(_) => EventKind::SceneUpdated,
            SceneEvent::ObjectEntered(_) => EventKind::ObjectEntered,
            SceneEvent::ObjectUpdated(_) => EventKind::ObjectUpdated,
            SceneEvent::ObjectWillLeave(_) => EventKind::ObjectWillLeave,
            SceneEvent::VideoOutputUpdated(_) => EventKind::VideoOutputUpdated,
            SceneEvent::AuxEntered(_) => EventKind::AuxEntered,
            SceneEvent::AuxUpdated(_) => EventKind::AuxUpdated,
            SceneEvent::AuxLeft(_) => EventKind::AuxLeft,
        }
    }

    /// Entity payload, for object events
    pub fn entity(&self) -> Option<&Entity> {
        match self {
            SceneEvent::ObjectEntered(e)
            | SceneEvent::ObjectUpdated(e)
            | SceneEvent::ObjectWillLeave(e) => Some(e),
            _ => None,
        }
    }

    /// Aux payload, for aux events
    pub fn aux(&self) -> Option<&AuxData> {
        match self {
            SceneEvent::AuxEntered(a) | SceneEvent::AuxUpdated(a) | SceneEvent::AuxLeft(a) => {
                Some(a)
            }
            _ => None,
        }
    }
}
