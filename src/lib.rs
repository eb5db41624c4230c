// Block Canvas - Core Library

pub mod block;
pub mod connector;
pub mod error;
pub mod event;
pub mod geometry;
pub mod link;
pub mod serialization;
pub mod settings;
pub mod store;

// Re-export main types for convenience
pub use block::{Block, BlockId, BlockKey, BlockMetadata, Edge, LinkKind, Position, Size};
pub use connector::{Connector, Marker};
pub use error::{GraphError, GraphResult};
pub use event::{EventBus, EventType, GraphEvent, SubscriptionId};
pub use geometry::{anchor_point, control_points, route, ConnectorPath, Point, Rectangle};
pub use link::{LinkInfo, LinkIntent, ParseLinkError};
pub use serialization::{BlockRecord, Document, LinkRecord, DOCUMENT_VERSION};
pub use settings::{GraphSettings, SettingsPatch};
pub use store::GraphStore;
