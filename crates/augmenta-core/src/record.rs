//! Tracked records
//!
//! Every record is a plain `Copy` value. The session hands out copies, so a
//! consumer holding a record is never affected by later ingestion.

use serde::{Deserialize, Serialize};

use crate::ObjectId;

/// 2D vector (normalized scene coordinates unless noted otherwise)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }
}

/// 3D vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Vec3 { x, y, z }
    }
}

/// Integer 2D point (pixel resolutions)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntPoint {
    pub x: i32,
    pub y: i32,
}

impl IntPoint {
    pub fn new(x: i32, y: i32) -> Self {
        IntPoint { x, y }
    }
}

/// A tracked object currently present in the scene
///
/// Which shape attributes are populated depends on the protocol version:
/// the legacy layout carries `depth` and `highest`, the current layout
/// carries `frame`, `orientation`, `bounding_rect_rotation` and `height`.
/// Fields a version does not carry stay at their default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Scene frame number of the last update
    pub frame: i32,
    /// Persistent id, unique while present
    pub pid: ObjectId,
    /// Rank among present objects (0 = first), stored as received
    pub oid: i32,
    /// Time alive in seconds
    pub age: f32,
    /// Position projected to the ground
    pub centroid: Vec2,
    /// Speed and direction
    pub velocity: Vec2,
    /// CCW rotation w.r.t. the horizontal axis, 0 to 360
    pub orientation: f32,
    /// Distance to the sensor (legacy layout)
    pub depth: f32,
    /// Center of the bounding rectangle
    pub bounding_rect_pos: Vec2,
    /// Width and height of the bounding rectangle
    pub bounding_rect_size: Vec2,
    /// CCW rotation of the bounding rectangle
    pub bounding_rect_rotation: f32,
    /// Object height in meters
    pub height: f32,
    /// Highest point of the object (legacy layout)
    pub highest: Vec3,
}

impl Entity {
    /// Empty record keyed by `pid`
    pub fn with_pid(pid: ObjectId) -> Self {
        Entity {
            pid,
            ..Default::default()
        }
    }
}

/// Supplementary per-object attributes, keyed by the same id domain as
/// [`Entity`] but with an independent lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AuxData {
    pub frame: i32,
    pub pid: ObjectId,
    pub oid: i32,
    /// Highest point projected to the ground
    pub highest: Vec2,
    /// Distance to the sensor in meters
    pub distance: f32,
    /// Reflectivity reported by the sensor
    pub reflectivity: f32,
}

impl AuxData {
    pub fn with_pid(pid: ObjectId) -> Self {
        AuxData {
            pid,
            ..Default::default()
        }
    }
}

/// Scene-wide aggregates, replaced wholesale on every scene message
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Time in frame number
    pub current_time: i32,
    /// Number of objects in the scene
    pub num_objects: i32,
    /// Scene size in meters
    pub size: Vec2,
    /// Percentage of the scene covered by objects (legacy layout)
    pub percent_covered: f32,
    /// Average motion of all objects (legacy layout)
    pub average_motion: Vec2,
    /// Scene depth (legacy layout)
    pub depth: f32,
}

/// Mapping of the scene onto a downstream video output
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoOutput {
    /// Offset from the scene top left, in meters
    pub offset: Vec2,
    /// Size in meters
    pub size: Vec2,
    /// Resolution in pixels
    pub resolution: IntPoint,
}
