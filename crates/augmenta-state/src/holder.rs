//! Single-record holders
//!
//! The scene and the video output are one record each, replaced wholesale
//! on every snapshot message.

use augmenta_core::{Scene, VideoOutput};

/// Holds the latest snapshot of a single record
#[derive(Debug, Clone, Default)]
pub struct RecordHolder<T> {
    current: T,
    snapshots: u64,
}

pub type SceneState = RecordHolder<Scene>;
pub type VideoOutputState = RecordHolder<VideoOutput>;

impl<T: Copy + Default> RecordHolder<T> {
    pub fn new() -> Self {
        RecordHolder {
            current: T::default(),
            snapshots: 0,
        }
    }

    /// Replace the stored record
    pub fn apply_snapshot(&mut self, record: T) {
        self.current = record;
        self.snapshots += 1;
    }

    /// Copy of the stored record
    pub fn get(&self) -> T {
        self.current
    }

    /// Number of snapshots applied since creation or the last reset
    pub fn snapshot_count(&self) -> u64 {
        self.snapshots
    }

    pub fn reset(&mut self) {
        self.current = T::default();
        self.snapshots = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use augmenta_core::Vec2;

    #[test]
    fn test_snapshot_replaces_record() {
        let mut state = SceneState::new();
        assert_eq!(state.get(), Scene::default());

        state.apply_snapshot(Scene {
            num_objects: 3,
            size: Vec2::new(10.0, 5.0),
            ..Default::default()
        });
        state.apply_snapshot(Scene {
            num_objects: 1,
            ..Default::default()
        });

        // Wholesale: nothing from the first snapshot survives
        assert_eq!(state.get().num_objects, 1);
        assert_eq!(state.get().size, Vec2::ZERO);
        assert_eq!(state.snapshot_count(), 2);

        state.reset();
        assert_eq!(state.snapshot_count(), 0);
    }
}
