use crate::{
    Block, BlockId, BlockKey, EventBus, EventType, GraphError, GraphEvent, GraphResult,
    GraphSettings, Position, Size, SubscriptionId,
};
use anyhow::Result;
use log::debug;
use std::collections::HashMap;

/// Where the first block lands when no position is given
pub const FIRST_BLOCK_POSITION: Position = Position { x: 50.0, y: 50.0 };

/// Top-left origin of the grid used by [`GraphStore::arrange_blocks`]
const ARRANGE_ORIGIN: f64 = 50.0;

/// Store owning every block on the canvas.
///
/// Blocks live in an arena addressed by [`BlockKey`]; the id index maps the
/// public [`BlockId`] onto it. Iteration follows creation order.
#[derive(Debug)]
pub struct GraphStore {
    /// Arena slots; a deleted block leaves `None` behind
    slots: Vec<Option<Block>>,

    /// Public id -> arena key
    index: HashMap<BlockId, BlockKey>,

    settings: GraphSettings,

    bus: EventBus,
}

impl GraphStore {
    /// Create an empty store with default settings
    pub fn new() -> Self {
        Self::with_settings(GraphSettings::default())
    }

    pub fn with_settings(settings: GraphSettings) -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
            settings,
            bus: EventBus::new(),
        }
    }

    pub fn settings(&self) -> &GraphSettings {
        &self.settings
    }

    // ========== Block CRUD Operations ==========

    /// Create a new block and add it to the store.
    ///
    /// Without a position the block is auto-placed `default_spacing` to the
    /// right of the rightmost block (or at `(50, 50)` on an empty canvas).
    /// A supplied size is raised to the configured minimum. A supplied position
    /// with a non-finite coordinate is treated as absent.
    pub fn create_block(
        &mut self,
        content: impl Into<String>,
        block_type: impl Into<String>,
        position: Option<Position>,
        size: Option<Size>,
    ) -> BlockId {
        let position = position
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .unwrap_or_else(|| self.auto_position());
        let size = self.clamp_size(size.unwrap_or_default());

        let key = BlockKey(self.slots.len());
        let id = BlockId::generate();
        let block = Block::new(key, id.clone(), content, block_type, position, size);

        debug!(
            "event=block_create module=store status=ok id={} type={} x={} y={}",
            id,
            block.block_type(),
            position.x,
            position.y
        );
        let created = EventType::BlockCreated {
            id: id.clone(),
            block_type: block.block_type().to_string(),
            position,
            size,
        };

        self.slots.push(Some(block));
        self.index.insert(id.clone(), key);
        self.bus.publish(created);

        id
    }

    /// Get a block by ID
    pub fn get_block(&self, id: &BlockId) -> Option<&Block> {
        self.key_of(id).and_then(|key| self.get_block_by_key(key))
    }

    /// Get a block by arena key
    pub fn get_block_by_key(&self, key: BlockKey) -> Option<&Block> {
        self.slots.get(key.0).and_then(Option::as_ref)
    }

    /// Resolve a block id to its arena key
    pub fn key_of(&self, id: &BlockId) -> Option<BlockKey> {
        self.index.get(id).copied()
    }

    /// Iterate over all blocks in creation order
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub fn get_all_blocks(&self) -> Vec<&Block> {
        self.blocks().collect()
    }

    /// Move a block, optionally snapping each coordinate to the grid.
    ///
    /// A non-finite coordinate leaves that axis where it was. Returns the
    /// position actually stored.
    pub fn set_block_position(
        &mut self,
        id: &BlockId,
        x: f64,
        y: f64,
        snap_to_grid: bool,
    ) -> GraphResult<Position> {
        let key = self.require_key(id, "block_move")?;
        let current = self
            .get_block_by_key(key)
            .map(Block::position)
            .unwrap_or_default();
        let x = if x.is_finite() { x } else { current.x };
        let y = if y.is_finite() { y } else { current.y };

        let position = if snap_to_grid {
            Position::new(self.settings.snap(x), self.settings.snap(y))
        } else {
            Position::new(x, y)
        };

        self.move_block(key, position);
        Ok(position)
    }

    /// Resize a block; dimensions below the configured minimum are raised to it.
    ///
    /// Returns the size actually stored.
    pub fn set_block_size(
        &mut self,
        id: &BlockId,
        width: f64,
        height: f64,
    ) -> GraphResult<Size> {
        let key = self.require_key(id, "block_resize")?;
        let size = self.clamp_size(Size::new(width, height));

        if let Some(block) = self.block_mut(key) {
            block.set_size(size);
        }

        debug!(
            "event=block_resize module=store status=ok id={} width={} height={}",
            id, size.width, size.height
        );
        self.bus.publish(EventType::BlockResized {
            id: id.clone(),
            size,
        });

        Ok(size)
    }

    /// Update a block's content
    pub fn set_block_content(
        &mut self,
        id: &BlockId,
        content: impl Into<String>,
    ) -> GraphResult<()> {
        let key = self.require_key(id, "block_update")?;
        if let Some(block) = self.block_mut(key) {
            block.set_content(content.into());
        }
        self.publish_updated(key);
        Ok(())
    }

    /// Update a block's type tag
    pub fn set_block_type(
        &mut self,
        id: &BlockId,
        block_type: impl Into<String>,
    ) -> GraphResult<()> {
        let key = self.require_key(id, "block_update")?;
        if let Some(block) = self.block_mut(key) {
            block.set_block_type(block_type.into());
        }
        self.publish_updated(key);
        Ok(())
    }

    /// Delete a block and every link pointing at it
    pub fn delete_block(&mut self, id: &BlockId) -> GraphResult<()> {
        let key = self.require_key(id, "block_delete")?;

        self.slots[key.0] = None;
        self.index.remove(id);

        let mut purged = 0;
        for block in self.slots.iter_mut().flatten() {
            if block.remove_link(key) {
                purged += 1;
            }
        }

        debug!(
            "event=block_delete module=store status=ok id={} purged_links={}",
            id, purged
        );
        self.bus.publish(EventType::BlockDeleted { id: id.clone() });

        Ok(())
    }

    // ========== Queries ==========

    /// Case-insensitive substring search over block content
    pub fn search_blocks(&self, query: &str) -> Vec<&Block> {
        let needle = query.to_lowercase();
        self.blocks()
            .filter(|b| b.content().to_lowercase().contains(&needle))
            .collect()
    }

    /// All blocks holding an edge to `id`
    pub fn get_incoming_links(&self, id: &BlockId) -> Vec<&Block> {
        match self.key_of(id) {
            Some(key) => self.blocks().filter(|b| b.has_link(key)).collect(),
            None => Vec::new(),
        }
    }

    /// Blocks targeted by `id`'s own edges
    pub fn get_outgoing_links(&self, id: &BlockId) -> Vec<&Block> {
        match self.get_block(id) {
            Some(block) => block
                .links()
                .iter()
                .filter_map(|edge| self.get_block_by_key(edge.target))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Topmost block containing the point (later blocks draw above earlier ones)
    pub fn block_at_point(&self, x: f64, y: f64) -> Option<&Block> {
        self.slots
            .iter()
            .rev()
            .flatten()
            .find(|b| b.rect().contains_point(x, y))
    }

    /// Count blocks
    pub fn block_count(&self) -> usize {
        self.index.len()
    }

    /// Count stored edges (a double link counts twice)
    pub fn link_count(&self) -> usize {
        self.blocks().map(|b| b.links().len()).sum()
    }

    // ========== Layout ==========

    /// Lay every block out on a grid, `columns` per row, in creation order.
    ///
    /// Returns the number of blocks moved.
    pub fn arrange_blocks(&mut self, columns: usize) -> usize {
        let columns = columns.max(1);
        let spacing = self.settings.default_spacing;
        let keys: Vec<BlockKey> = self.blocks().map(Block::key).collect();

        for (i, key) in keys.iter().enumerate() {
            let col = (i % columns) as f64;
            let row = (i / columns) as f64;
            let position = Position::new(
                self.settings.snap(ARRANGE_ORIGIN + col * spacing),
                self.settings.snap(ARRANGE_ORIGIN + row * spacing),
            );
            self.move_block(*key, position);
        }

        let count = keys.len();
        debug!(
            "event=blocks_arrange module=store status=ok count={} columns={}",
            count, columns
        );
        self.bus.publish(EventType::BlocksArranged { count });
        count
    }

    // ========== Event Subscription ==========

    /// Register a listener for every future mutation event
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&GraphEvent) -> Result<()> + 'static,
    {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Get all recorded events
    pub fn events(&self) -> &[GraphEvent] {
        self.bus.events()
    }

    /// Take all recorded events
    pub fn drain_events(&mut self) -> Vec<GraphEvent> {
        self.bus.drain()
    }

    /// Clear event log
    pub fn clear_events(&mut self) {
        self.bus.clear();
    }

    pub fn event_bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    // ========== Internals ==========

    pub(crate) fn require_key(&self, id: &BlockId, op: &str) -> GraphResult<BlockKey> {
        self.key_of(id).ok_or_else(|| {
            debug!(
                "event={} module=store status=error error_code=not_found id={}",
                op, id
            );
            GraphError::NotFound(id.clone())
        })
    }

    pub(crate) fn block_mut(&mut self, key: BlockKey) -> Option<&mut Block> {
        self.slots.get_mut(key.0).and_then(Option::as_mut)
    }

    pub(crate) fn publish(&mut self, event: EventType) {
        self.bus.publish(event);
    }

    /// Swap in a freshly built arena (import path)
    pub(crate) fn replace_blocks(&mut self, blocks: Vec<Block>, settings: GraphSettings) {
        self.index = blocks.iter().map(|b| (b.id().clone(), b.key())).collect();
        self.slots = blocks.into_iter().map(Some).collect();
        self.settings = settings;
    }

    fn move_block(&mut self, key: BlockKey, position: Position) {
        let Some(block) = self.block_mut(key) else {
            return;
        };
        block.set_position(position);
        let id = block.id().clone();

        debug!(
            "event=block_move module=store status=ok id={} x={} y={}",
            id, position.x, position.y
        );
        self.bus.publish(EventType::BlockMoved { id, position });
    }

    fn publish_updated(&mut self, key: BlockKey) {
        let Some(block) = self.get_block_by_key(key) else {
            return;
        };
        let event = EventType::BlockUpdated {
            id: block.id().clone(),
            content: block.content().to_string(),
            block_type: block.block_type().to_string(),
        };

        debug!(
            "event=block_update module=store status=ok id={}",
            block.id()
        );
        self.bus.publish(event);
    }

    fn auto_position(&self) -> Position {
        let mut rightmost: Option<Position> = None;
        for position in self.blocks().map(Block::position) {
            // `>=` so that the last block among equal x values decides y
            if rightmost.map_or(true, |best| position.x >= best.x) {
                rightmost = Some(position);
            }
        }

        match rightmost {
            Some(anchor) => Position::new(anchor.x + self.settings.default_spacing, anchor.y),
            None => FIRST_BLOCK_POSITION,
        }
    }

    fn clamp_size(&self, size: Size) -> Size {
        let clamp = |value: f64, min: f64| if value.is_finite() { value.max(min) } else { min };
        Size::new(
            clamp(size.width, self.settings.min_block_width),
            clamp(size.height, self.settings.min_block_height),
        )
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}
