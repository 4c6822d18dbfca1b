//! Identity types for tracked objects
//!
//! Object ids are the 32-bit `pid` assigned by the tracking producer on
//! first appearance. An id stays unique while the object is present and
//! may only be reused after the object has left.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Persistent object identity (`pid`)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ObjectId(pub i32);

impl ObjectId {
    /// Key used when a message carries no readable id
    pub const UNRESOLVED: ObjectId = ObjectId(-1);

    #[inline]
    pub fn new(id: i32) -> Self {
        ObjectId(id)
    }

    #[inline]
    pub fn value(self) -> i32 {
        self.0
    }

    #[inline]
    pub fn is_resolved(self) -> bool {
        self != ObjectId::UNRESOLVED
    }
}

impl From<i32> for ObjectId {
    fn from(id: i32) -> Self {
        ObjectId(id)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
