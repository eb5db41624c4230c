use crate::Rectangle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Width given to a block created without an explicit size
pub const DEFAULT_BLOCK_WIDTH: f64 = 250.0;

/// Height given to a block created without an explicit size
pub const DEFAULT_BLOCK_HEIGHT: f64 = 150.0;

/// Opaque, immutable block identifier.
///
/// Generated ids look like `block-01hx...` but any string read from a
/// document is accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    /// Generate a fresh id (sortable, timestamp-based)
    pub fn generate() -> Self {
        Self(format!("block-{}", Ulid::new().to_string().to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BlockId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Stable arena handle for a block inside one store.
///
/// Keys are never reused while the store lives; importing a document
/// starts a fresh arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockKey(pub(crate) usize);

impl BlockKey {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Canvas coordinates of a block's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Block dimensions on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_WIDTH, DEFAULT_BLOCK_HEIGHT)
    }
}

/// Stored edge type. The user-facing "reverse" intent is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    #[default]
    Single,
    Double,
}

/// Directed entry in a block's outgoing link table
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub target: BlockKey,
    pub kind: LinkKind,
    pub created_at: DateTime<Utc>,
}

/// Creation and last-modification timestamps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockMetadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlockMetadata {
    fn now() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
        }
    }
}

/// A free-floating content node on the canvas.
///
/// Blocks are owned by a [`crate::GraphStore`]; every mutation goes through
/// the store so that events are published and link invariants hold.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    id: BlockId,
    key: BlockKey,
    content: String,
    block_type: String,
    position: Position,
    size: Size,
    links: Vec<Edge>,
    metadata: BlockMetadata,
}

impl Block {
    pub(crate) fn new(
        key: BlockKey,
        id: BlockId,
        content: impl Into<String>,
        block_type: impl Into<String>,
        position: Position,
        size: Size,
    ) -> Self {
        Self {
            id,
            key,
            content: content.into(),
            block_type: block_type.into(),
            position,
            size,
            links: Vec::new(),
            metadata: BlockMetadata::now(),
        }
    }

    pub fn id(&self) -> &BlockId {
        &self.id
    }

    pub fn key(&self) -> BlockKey {
        self.key
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Free-form type tag such as "default", "note" or "task"
    pub fn block_type(&self) -> &str {
        &self.block_type
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn metadata(&self) -> BlockMetadata {
        self.metadata
    }

    /// Outgoing edges in insertion order
    pub fn links(&self) -> &[Edge] {
        &self.links
    }

    /// Bounding rectangle on the canvas
    pub fn rect(&self) -> Rectangle {
        Rectangle::new(
            self.position.x,
            self.position.y,
            self.size.width,
            self.size.height,
        )
    }

    /// Check whether this block has an outgoing edge to `target`
    pub fn has_link(&self, target: BlockKey) -> bool {
        self.links.iter().any(|e| e.target == target)
    }

    /// Get the outgoing edge to `target`, if any
    pub fn link_to(&self, target: BlockKey) -> Option<&Edge> {
        self.links.iter().find(|e| e.target == target)
    }

    pub(crate) fn set_content(&mut self, content: String) {
        self.content = content;
        self.touch();
    }

    pub(crate) fn set_block_type(&mut self, block_type: String) {
        self.block_type = block_type;
        self.touch();
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
        self.touch();
    }

    pub(crate) fn set_size(&mut self, size: Size) {
        self.size = size;
        self.touch();
    }

    pub(crate) fn set_metadata(&mut self, metadata: BlockMetadata) {
        self.metadata = metadata;
    }

    /// Insert or replace the edge to `target`
    pub(crate) fn insert_link(&mut self, target: BlockKey, kind: LinkKind) {
        self.insert_link_at(target, kind, Utc::now());
        self.touch();
    }

    /// Insert or replace the edge to `target` keeping a given creation time
    pub(crate) fn insert_link_at(
        &mut self,
        target: BlockKey,
        kind: LinkKind,
        created_at: DateTime<Utc>,
    ) {
        let edge = Edge {
            target,
            kind,
            created_at,
        };
        match self.links.iter_mut().find(|e| e.target == target) {
            Some(existing) => *existing = edge,
            None => self.links.push(edge),
        }
    }

    /// Remove the edge to `target`; returns whether one existed
    pub(crate) fn remove_link(&mut self, target: BlockKey) -> bool {
        let before = self.links.len();
        self.links.retain(|e| e.target != target);
        let removed = self.links.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    fn touch(&mut self) {
        self.metadata.updated_at = Utc::now();
    }
}
