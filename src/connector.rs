use crate::{route, Block, BlockId, ConnectorPath, GraphStore, LinkKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Arrow decoration drawn at one end of a connector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marker {
    /// Tail of a one-way link
    Source,
    /// Arrowhead pointing into the block
    Target,
}

/// A drawable link between two blocks
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub from: BlockId,
    pub to: BlockId,
    pub kind: LinkKind,
    pub path: ConnectorPath,
    pub start_marker: Marker,
    pub end_marker: Marker,
}

impl GraphStore {
    /// One connector per linked pair of blocks.
    ///
    /// A double link lives in both blocks' tables but is drawn once, with
    /// arrowheads at both ends. Single links run from the block holding the
    /// edge to its target. Self links have no connector.
    pub fn connectors(&self) -> Vec<Connector> {
        let mut seen = HashSet::new();
        let mut connectors = Vec::new();

        for block in self.blocks() {
            for edge in block.links() {
                if edge.target == block.key() {
                    continue;
                }
                let pair = if block.key() < edge.target {
                    (block.key(), edge.target)
                } else {
                    (edge.target, block.key())
                };
                if !seen.insert(pair) {
                    continue;
                }

                if let Some(target) = self.get_block_by_key(edge.target) {
                    let kind = if target.has_link(block.key()) {
                        LinkKind::Double
                    } else {
                        LinkKind::Single
                    };
                    connectors.push(build_connector(block, target, kind));
                }
            }
        }

        connectors
    }

    /// Connector for a single pair, e.g. to re-route after one block moved
    pub fn connector_between(&self, a: &BlockId, b: &BlockId) -> Option<Connector> {
        if a == b {
            return None;
        }
        let info = self.get_link_info(a, b)?;
        let from = self.get_block(&info.from)?;
        let to = self.get_block(&info.to)?;
        Some(build_connector(from, to, info.kind))
    }
}

fn build_connector(from: &Block, to: &Block, kind: LinkKind) -> Connector {
    let (start_marker, end_marker) = match kind {
        LinkKind::Double => (Marker::Target, Marker::Target),
        LinkKind::Single => (Marker::Source, Marker::Target),
    };

    Connector {
        from: from.id().clone(),
        to: to.id().clone(),
        kind,
        path: route(&from.rect(), &to.rect()),
        start_marker,
        end_marker,
    }
}
