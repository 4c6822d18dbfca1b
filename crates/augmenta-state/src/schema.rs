//! Versioned schema tables
//!
//! Each protocol version is a static table mapping `(container, inner
//! container, method)` to a lifecycle and a field recipe. Routing logic
//! never branches on the version; supporting a new layout means adding a
//! table here.
//!
//! V1 (legacy):
//! - `/person/{enter,update,leave}`:
//!   pid, oid, age, centroid.x/y, velocity.x/y, depth,
//!   rect.x/y/w/h, highest.x/y/z
//! - `.../scene`: currentTime, percentCovered, numObjects,
//!   averageMotion.x/y, size.x/y, depth
//!
//! V2 (current):
//! - `/object/{enter,update,leave}`:
//!   frame, pid, oid, age, centroid.x/y, velocity.x/y, orientation,
//!   rect.x/y/w/h, rect.rotation, height
//! - `/object/extra/{enter,update,leave}`:
//!   frame, pid, oid, highest.x/y, distance, reflectivity
//! - `.../scene`: frame, numObjects, size.x/y
//! - `.../fusion`: offset.x/y, size.x/y, resolution.x/y
//!
//! `.../scene` and `.../fusion` rows match under any container, including
//! none, except a container the table already owns: `/object/scene` is not
//! a scene message in V2, while `/scene` and `/tracker/scene` are.

use std::fmt;
use std::str::FromStr;

use augmenta_core::AugmentaError;
use serde::{Deserialize, Serialize};

use crate::{AuxField, Binding, EntityField, SceneField, VideoOutputField};

/// Protocol version selected for a deployment
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolVersion {
    V1,
    #[default]
    V2,
}

impl ProtocolVersion {
    pub const ALL: [ProtocolVersion; 2] = [ProtocolVersion::V1, ProtocolVersion::V2];
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolVersion::V1 => write!(f, "v1"),
            ProtocolVersion::V2 => write!(f, "v2"),
        }
    }
}

impl FromStr for ProtocolVersion {
    type Err = AugmentaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(ProtocolVersion::V1),
            "v2" | "2" => Ok(ProtocolVersion::V2),
            _ => Err(AugmentaError::UnknownProtocolVersion(s.to_string())),
        }
    }
}

/// Record a route writes into
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Entity,
    AuxData,
    Scene,
    VideoOutput,
}

/// What a routed message does to the scene model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    Enter,
    Update,
    Leave,
    SceneSnapshot,
    AuxEnter,
    AuxUpdate,
    AuxLeave,
    VideoOutputSnapshot,
}

impl Lifecycle {
    /// Record kind this lifecycle applies to
    pub fn record_kind(self) -> RecordKind {
        match self {
            Lifecycle::Enter | Lifecycle::Update | Lifecycle::Leave => RecordKind::Entity,
            Lifecycle::AuxEnter | Lifecycle::AuxUpdate | Lifecycle::AuxLeave => RecordKind::AuxData,
            Lifecycle::SceneSnapshot => RecordKind::Scene,
            Lifecycle::VideoOutputSnapshot => RecordKind::VideoOutput,
        }
    }
}

/// Field recipe for one route
///
/// Keyed records carry the argument index of their id separately: the id
/// is read first to find the record, the other fields are applied to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recipe {
    Entity {
        id_index: usize,
        fields: &'static [Binding<EntityField>],
    },
    AuxData {
        id_index: usize,
        fields: &'static [Binding<AuxField>],
    },
    Scene {
        fields: &'static [Binding<SceneField>],
    },
    VideoOutput {
        fields: &'static [Binding<VideoOutputField>],
    },
}

impl Recipe {
    pub fn kind(&self) -> RecordKind {
        match self {
            Recipe::Entity { .. } => RecordKind::Entity,
            Recipe::AuxData { .. } => RecordKind::AuxData,
            Recipe::Scene { .. } => RecordKind::Scene,
            Recipe::VideoOutput { .. } => RecordKind::VideoOutput,
        }
    }

    /// Number of field bindings (the id binding excluded)
    pub fn field_count(&self) -> usize {
        match self {
            Recipe::Entity { fields, .. } => fields.len(),
            Recipe::AuxData { fields, .. } => fields.len(),
            Recipe::Scene { fields } => fields.len(),
            Recipe::VideoOutput { fields } => fields.len(),
        }
    }
}

/// Address pattern.
///
/// A `None` container is a wildcard: the row matches any address with the
/// same method, whatever its containers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub container: Option<&'static str>,
    pub inner: Option<&'static str>,
    pub method: &'static str,
}

impl RouteKey {
    pub const fn any_container(method: &'static str) -> Self {
        RouteKey {
            container: None,
            inner: None,
            method,
        }
    }

    pub const fn contained(container: &'static str, method: &'static str) -> Self {
        RouteKey {
            container: Some(container),
            inner: None,
            method,
        }
    }

    pub const fn nested(container: &'static str, inner: &'static str, method: &'static str) -> Self {
        RouteKey {
            container: Some(container),
            inner: Some(inner),
            method,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.container.is_none()
    }

    pub fn matches(&self, container: Option<&str>, inner: Option<&str>, method: &str) -> bool {
        if self.method != method {
            return false;
        }
        match self.container {
            Some(own) => container == Some(own) && self.inner == inner,
            None => true,
        }
    }
}

/// One table row
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchemaRoute {
    pub key: RouteKey,
    pub lifecycle: Lifecycle,
    pub recipe: Recipe,
}

/// Routing table for the active protocol version
#[derive(Clone, Copy, Debug)]
pub struct SchemaTable {
    version: ProtocolVersion,
    routes: &'static [SchemaRoute],
}

impl SchemaTable {
    pub fn for_version(version: ProtocolVersion) -> Self {
        let routes = match version {
            ProtocolVersion::V1 => V1_ROUTES,
            ProtocolVersion::V2 => V2_ROUTES,
        };
        SchemaTable { version, routes }
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn routes(&self) -> &'static [SchemaRoute] {
        self.routes
    }

    /// Find the row for an address split into its parts
    pub fn lookup(
        &self,
        container: Option<&str>,
        inner: Option<&str>,
        method: &str,
    ) -> Option<&'static SchemaRoute> {
        let routes: &'static [SchemaRoute] = self.routes;
        let exact = routes
            .iter()
            .find(|route| !route.key.is_wildcard() && route.key.matches(container, inner, method));
        if exact.is_some() {
            return exact;
        }

        // Containers owned by the table never fall through to wildcard rows
        if let Some(container) = container {
            if routes.iter().any(|route| route.key.container == Some(container)) {
                return None;
            }
        }

        routes
            .iter()
            .find(|route| route.key.is_wildcard() && route.key.matches(container, inner, method))
    }
}

impl Default for SchemaTable {
    fn default() -> Self {
        SchemaTable::for_version(ProtocolVersion::default())
    }
}

// V1 (legacy) layouts

const V1_ENTITY: &[Binding<EntityField>] = &[
    Binding::new(1, EntityField::Oid),
    Binding::new(2, EntityField::Age),
    Binding::new(3, EntityField::CentroidX),
    Binding::new(4, EntityField::CentroidY),
    Binding::new(5, EntityField::VelocityX),
    Binding::new(6, EntityField::VelocityY),
    Binding::new(7, EntityField::Depth),
    Binding::new(8, EntityField::RectX),
    Binding::new(9, EntityField::RectY),
    Binding::new(10, EntityField::RectWidth),
    Binding::new(11, EntityField::RectHeight),
    Binding::new(12, EntityField::HighestX),
    Binding::new(13, EntityField::HighestY),
    Binding::new(14, EntityField::HighestZ),
];

const V1_SCENE: &[Binding<SceneField>] = &[
    Binding::new(0, SceneField::CurrentTime),
    Binding::new(1, SceneField::PercentCovered),
    Binding::new(2, SceneField::NumObjects),
    Binding::new(3, SceneField::AverageMotionX),
    Binding::new(4, SceneField::AverageMotionY),
    Binding::new(5, SceneField::Width),
    Binding::new(6, SceneField::Height),
    Binding::new(7, SceneField::Depth),
];

const V1_ENTITY_RECIPE: Recipe = Recipe::Entity {
    id_index: 0,
    fields: V1_ENTITY,
};

static V1_ROUTES: &[SchemaRoute] = &[
    SchemaRoute {
        key: RouteKey::contained("person", "enter"),
        lifecycle: Lifecycle::Enter,
        recipe: V1_ENTITY_RECIPE,
    },
    SchemaRoute {
        key: RouteKey::contained("person", "update"),
        lifecycle: Lifecycle::Update,
        recipe: V1_ENTITY_RECIPE,
    },
    SchemaRoute {
        key: RouteKey::contained("person", "leave"),
        lifecycle: Lifecycle::Leave,
        recipe: V1_ENTITY_RECIPE,
    },
    SchemaRoute {
        key: RouteKey::any_container("scene"),
        lifecycle: Lifecycle::SceneSnapshot,
        recipe: Recipe::Scene { fields: V1_SCENE },
    },
];

// V2 (current) layouts

const V2_ENTITY: &[Binding<EntityField>] = &[
    Binding::new(0, EntityField::Frame),
    Binding::new(2, EntityField::Oid),
    Binding::new(3, EntityField::Age),
    Binding::new(4, EntityField::CentroidX),
    Binding::new(5, EntityField::CentroidY),
    Binding::new(6, EntityField::VelocityX),
    Binding::new(7, EntityField::VelocityY),
    Binding::new(8, EntityField::Orientation),
    Binding::new(9, EntityField::RectX),
    Binding::new(10, EntityField::RectY),
    Binding::new(11, EntityField::RectWidth),
    Binding::new(12, EntityField::RectHeight),
    Binding::new(13, EntityField::RectRotation),
    Binding::new(14, EntityField::Height),
];

const V2_AUX: &[Binding<AuxField>] = &[
    Binding::new(0, AuxField::Frame),
    Binding::new(2, AuxField::Oid),
    Binding::new(3, AuxField::HighestX),
    Binding::new(4, AuxField::HighestY),
    Binding::new(5, AuxField::Distance),
    Binding::new(6, AuxField::Reflectivity),
];

const V2_SCENE: &[Binding<SceneField>] = &[
    Binding::new(0, SceneField::CurrentTime),
    Binding::new(1, SceneField::NumObjects),
    Binding::new(2, SceneField::Width),
    Binding::new(3, SceneField::Height),
];

const V2_VIDEO_OUTPUT: &[Binding<VideoOutputField>] = &[
    Binding::new(0, VideoOutputField::OffsetX),
    Binding::new(1, VideoOutputField::OffsetY),
    Binding::new(2, VideoOutputField::Width),
    Binding::new(3, VideoOutputField::Height),
    Binding::new(4, VideoOutputField::ResolutionX),
    Binding::new(5, VideoOutputField::ResolutionY),
];

const V2_ENTITY_RECIPE: Recipe = Recipe::Entity {
    id_index: 1,
    fields: V2_ENTITY,
};

const V2_AUX_RECIPE: Recipe = Recipe::AuxData {
    id_index: 1,
    fields: V2_AUX,
};

static V2_ROUTES: &[SchemaRoute] = &[
    SchemaRoute {
        key: RouteKey::contained("object", "enter"),
        lifecycle: Lifecycle::Enter,
        recipe: V2_ENTITY_RECIPE,
    },
    SchemaRoute {
        key: RouteKey::contained("object", "update"),
        lifecycle: Lifecycle::Update,
        recipe: V2_ENTITY_RECIPE,
    },
    SchemaRoute {
        key: RouteKey::contained("object", "leave"),
        lifecycle: Lifecycle::Leave,
        recipe: V2_ENTITY_RECIPE,
    },
    SchemaRoute {
        key: RouteKey::nested("object", "extra", "enter"),
        lifecycle: Lifecycle::AuxEnter,
        recipe: V2_AUX_RECIPE,
    },
    SchemaRoute {
        key: RouteKey::nested("object", "extra", "update"),
        lifecycle: Lifecycle::AuxUpdate,
        recipe: V2_AUX_RECIPE,
    },
    SchemaRoute {
        key: RouteKey::nested("object", "extra", "leave"),
        lifecycle: Lifecycle::AuxLeave,
        recipe: V2_AUX_RECIPE,
    },
    SchemaRoute {
        key: RouteKey::any_container("scene"),
        lifecycle: Lifecycle::SceneSnapshot,
        recipe: Recipe::Scene { fields: V2_SCENE },
    },
    SchemaRoute {
        key: RouteKey::any_container("fusion"),
        lifecycle: Lifecycle::VideoOutputSnapshot,
        recipe: Recipe::VideoOutput {
            fields: V2_VIDEO_OUTPUT,
        },
    },
];
