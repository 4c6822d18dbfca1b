//! Field extraction
//!
//! A recipe is an ordered list of `(argument index, field)` bindings. Each
//! binding is attempted on its own: when the typed accessor fails (index
//! out of range or wrong argument type) the field keeps whatever value it
//! had, and extraction moves on to the next binding.

use std::fmt;

use augmenta_core::{AuxData, Entity, OscMessage, Scene, VideoOutput};
use tracing::trace;

/// One `(argument index, field)` pair
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Binding<F> {
    pub index: usize,
    pub field: F,
}

impl<F> Binding<F> {
    pub const fn new(index: usize, field: F) -> Self {
        Binding { index, field }
    }
}

/// A record whose fields can be written from message arguments
pub trait Extract {
    type Field: Copy + fmt::Debug;

    /// Write `field` from the argument at `index`.
    /// Returns `false` and leaves the field untouched if the accessor fails.
    fn extract_field(&mut self, field: Self::Field, msg: &OscMessage, index: usize) -> bool;
}

/// Apply every binding of a recipe; returns the number of failed bindings
pub fn apply_recipe<R: Extract>(
    record: &mut R,
    bindings: &[Binding<R::Field>],
    msg: &OscMessage,
) -> usize {
    let mut failed = 0;
    for binding in bindings {
        if !record.extract_field(binding.field, msg, binding.index) {
            trace!(
                address = %msg.address,
                index = binding.index,
                field = ?binding.field,
                "Argument missing or mistyped, keeping previous value"
            );
            failed += 1;
        }
    }
    failed
}

#[inline]
fn store<T>(slot: &mut T, value: Option<T>) -> bool {
    match value {
        Some(v) => {
            *slot = v;
            true
        }
        None => false,
    }
}

/// Writable [`Entity`] fields
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityField {
    Frame,
    Oid,
    Age,
    CentroidX,
    CentroidY,
    VelocityX,
    VelocityY,
    Orientation,
    Depth,
    RectX,
    RectY,
    RectWidth,
    RectHeight,
    RectRotation,
    Height,
    HighestX,
    HighestY,
    HighestZ,
}

impl Extract for Entity {
    type Field = EntityField;

    fn extract_field(&mut self, field: EntityField, msg: &OscMessage, index: usize) -> bool {
        match field {
            EntityField::Frame => store(&mut self.frame, msg.get_int32(index)),
            EntityField::Oid => store(&mut self.oid, msg.get_int32(index)),
            EntityField::Age => store(&mut self.age, msg.get_float(index)),
            EntityField::CentroidX => store(&mut self.centroid.x, msg.get_float(index)),
            EntityField::CentroidY => store(&mut self.centroid.y, msg.get_float(index)),
            EntityField::VelocityX => store(&mut self.velocity.x, msg.get_float(index)),
            EntityField::VelocityY => store(&mut self.velocity.y, msg.get_float(index)),
            EntityField::Orientation => store(&mut self.orientation, msg.get_float(index)),
            EntityField::Depth => store(&mut self.depth, msg.get_float(index)),
            EntityField::RectX => store(&mut self.bounding_rect_pos.x, msg.get_float(index)),
            EntityField::RectY => store(&mut self.bounding_rect_pos.y, msg.get_float(index)),
            EntityField::RectWidth => store(&mut self.bounding_rect_size.x, msg.get_float(index)),
            EntityField::RectHeight => store(&mut self.bounding_rect_size.y, msg.get_float(index)),
            EntityField::RectRotation => {
                store(&mut self.bounding_rect_rotation, msg.get_float(index))
            }
            EntityField::Height => store(&mut self.height, msg.get_float(index)),
            EntityField::HighestX => store(&mut self.highest.x, msg.get_float(index)),
            EntityField::HighestY => store(&mut self.highest.y, msg.get_float(index)),
            EntityField::HighestZ => store(&mut self.highest.z, msg.get_float(index)),
        }
    }
}

/// Writable [`AuxData`] fields
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuxField {
    Frame,
    Oid,
    HighestX,
    HighestY,
    Distance,
    Reflectivity,
}

impl Extract for AuxData {
    type Field = AuxField;

    fn extract_field(&mut self, field: AuxField, msg: &OscMessage, index: usize) -> bool {
        match field {
            AuxField::Frame => store(&mut self.frame, msg.get_int32(index)),
            AuxField::Oid => store(&mut self.oid, msg.get_int32(index)),
            AuxField::HighestX => store(&mut self.highest.x, msg.get_float(index)),
            AuxField::HighestY => store(&mut self.highest.y, msg.get_float(index)),
            AuxField::Distance => store(&mut self.distance, msg.get_float(index)),
            AuxField::Reflectivity => store(&mut self.reflectivity, msg.get_float(index)),
        }
    }
}

/// Writable [`Scene`] fields
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneField {
    CurrentTime,
    NumObjects,
    Width,
    Height,
    PercentCovered,
    AverageMotionX,
    AverageMotionY,
    Depth,
}

impl Extract for Scene {
    type Field = SceneField;

    fn extract_field(&mut self, field: SceneField, msg: &OscMessage, index: usize) -> bool {
        match field {
            SceneField::CurrentTime => store(&mut self.current_time, msg.get_int32(index)),
            SceneField::NumObjects => store(&mut self.num_objects, msg.get_int32(index)),
            SceneField::Width => store(&mut self.size.x, msg.get_float(index)),
            SceneField::Height => store(&mut self.size.y, msg.get_float(index)),
            SceneField::PercentCovered => store(&mut self.percent_covered, msg.get_float(index)),
            SceneField::AverageMotionX => store(&mut self.average_motion.x, msg.get_float(index)),
            SceneField::AverageMotionY => store(&mut self.average_motion.y, msg.get_float(index)),
            SceneField::Depth => store(&mut self.depth, msg.get_float(index)),
        }
    }
}

/// Writable [`VideoOutput`] fields
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VideoOutputField {
    OffsetX,
    OffsetY,
    Width,
    Height,
    ResolutionX,
    ResolutionY,
}

impl Extract for VideoOutput {
    type Field = VideoOutputField;

    fn extract_field(&mut self, field: VideoOutputField, msg: &OscMessage, index: usize) -> bool {
        match field {
            VideoOutputField::OffsetX => store(&mut self.offset.x, msg.get_float(index)),
            VideoOutputField::OffsetY => store(&mut self.offset.y, msg.get_float(index)),
            VideoOutputField::Width => store(&mut self.size.x, msg.get_float(index)),
            VideoOutputField::Height => store(&mut self.size.y, msg.get_float(index)),
            VideoOutputField::ResolutionX => store(&mut self.resolution.x, msg.get_int32(index)),
            VideoOutputField::ResolutionY => store(&mut self.resolution.y, msg.get_int32(index)),
        }
    }
}
