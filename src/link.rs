use crate::{BlockId, BlockKey, EventType, GraphError, GraphResult, GraphStore, LinkKind};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// User-facing link direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkIntent {
    /// `from -> to`
    Single,
    /// `to -> from`, stored as a single edge on the `to` block
    Reverse,
    /// Both directions
    Double,
}

/// Error for an unrecognized link type string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown link type: {0}")]
pub struct ParseLinkError(String);

impl FromStr for LinkIntent {
    type Err = ParseLinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(LinkIntent::Single),
            "reverse" => Ok(LinkIntent::Reverse),
            "double" => Ok(LinkIntent::Double),
            other => Err(ParseLinkError(other.to_string())),
        }
    }
}

impl fmt::Display for LinkIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LinkIntent::Single => "single",
            LinkIntent::Reverse => "reverse",
            LinkIntent::Double => "double",
        })
    }
}

impl FromStr for LinkKind {
    type Err = ParseLinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(LinkKind::Single),
            "double" => Ok(LinkKind::Double),
            other => Err(ParseLinkError(other.to_string())),
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LinkKind::Single => "single",
            LinkKind::Double => "double",
        })
    }
}

/// Link between two blocks as reconstructed from both edge tables.
///
/// For a single link `from`/`to` follow the edge that actually exists, so a
/// reverse link queried as `(a, b)` reports `from = b, to = a`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInfo {
    pub kind: LinkKind,
    pub from: BlockId,
    pub to: BlockId,
}

impl LinkInfo {
    /// Check if this link involves a given block
    pub fn involves(&self, id: &BlockId) -> bool {
        &self.from == id || &self.to == id
    }
}

impl GraphStore {
    // ========== Link Reconciliation ==========

    /// Link two blocks, replacing whatever edges the pair had before.
    ///
    /// Calling it again with the same arguments leaves the edges unchanged.
    /// A block may link to itself; it then holds a single edge to its own key.
    pub fn link_blocks(
        &mut self,
        from: &BlockId,
        to: &BlockId,
        intent: LinkIntent,
    ) -> GraphResult<()> {
        let from_key = self.require_key(from, "blocks_link")?;
        let to_key = self.require_key(to, "blocks_link")?;

        self.clear_pair(from_key, to_key);
        match intent {
            LinkIntent::Single => self.add_edge(from_key, to_key, LinkKind::Single),
            LinkIntent::Reverse => self.add_edge(to_key, from_key, LinkKind::Single),
            LinkIntent::Double => {
                self.add_edge(from_key, to_key, LinkKind::Double);
                self.add_edge(to_key, from_key, LinkKind::Double);
            }
        }

        debug!(
            "event=blocks_link module=link status=ok from={} to={} intent={}",
            from, to, intent
        );
        self.publish(EventType::BlocksLinked {
            from: from.clone(),
            to: to.clone(),
            intent,
        });

        Ok(())
    }

    /// Change the link between two blocks; replaces, never merges
    pub fn update_link_type(
        &mut self,
        from: &BlockId,
        to: &BlockId,
        intent: LinkIntent,
    ) -> GraphResult<()> {
        self.link_blocks(from, to, intent)
    }

    /// Remove every edge between two blocks, in both directions.
    ///
    /// Fails only when neither id is known.
    pub fn unlink_blocks(&mut self, from: &BlockId, to: &BlockId) -> GraphResult<()> {
        match (self.key_of(from), self.key_of(to)) {
            (None, None) => {
                debug!(
                    "event=blocks_unlink module=link status=error error_code=not_found \
                     from={} to={}",
                    from, to
                );
                return Err(GraphError::NotFound(from.clone()));
            }
            (Some(from_key), Some(to_key)) => self.clear_pair(from_key, to_key),
            // No edge can target an unknown block
            _ => {}
        }

        debug!(
            "event=blocks_unlink module=link status=ok from={} to={}",
            from, to
        );
        self.publish(EventType::BlocksUnlinked {
            from: from.clone(),
            to: to.clone(),
        });

        Ok(())
    }

    /// Reconstruct the link between two blocks, if any
    pub fn get_link_info(&self, from: &BlockId, to: &BlockId) -> Option<LinkInfo> {
        let from_block = self.get_block(from)?;
        let to_block = self.get_block(to)?;

        // Both directions of a self link are the same edge
        if from_block.key() == to_block.key() {
            return from_block.link_to(to_block.key()).map(|edge| LinkInfo {
                kind: edge.kind,
                from: from.clone(),
                to: to.clone(),
            });
        }

        let forward = from_block.has_link(to_block.key());
        let backward = to_block.has_link(from_block.key());

        match (forward, backward) {
            (true, true) => Some(LinkInfo {
                kind: LinkKind::Double,
                from: from.clone(),
                to: to.clone(),
            }),
            (true, false) => Some(LinkInfo {
                kind: LinkKind::Single,
                from: from.clone(),
                to: to.clone(),
            }),
            (false, true) => Some(LinkInfo {
                kind: LinkKind::Single,
                from: to.clone(),
                to: from.clone(),
            }),
            (false, false) => None,
        }
    }

    /// Check whether `from` holds an edge to `to`
    pub fn has_link(&self, from: &BlockId, to: &BlockId) -> bool {
        match (self.get_block(from), self.key_of(to)) {
            (Some(block), Some(target)) => block.has_link(target),
            _ => false,
        }
    }

    fn add_edge(&mut self, from: BlockKey, to: BlockKey, kind: LinkKind) {
        if let Some(block) = self.block_mut(from) {
            block.insert_link(to, kind);
        }
    }

    fn clear_pair(&mut self, a: BlockKey, b: BlockKey) {
        if let Some(block) = self.block_mut(a) {
            block.remove_link(b);
        }
        if let Some(block) = self.block_mut(b) {
            block.remove_link(a);
        }
    }
}
