use crate::{
    Block, BlockId, BlockKey, BlockMetadata, EventType, GraphError, GraphResult, GraphStore,
    LinkKind, Position, SettingsPatch, Size,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

/// Version string written into exported documents
pub const DOCUMENT_VERSION: &str = "1.0";

/// Exported graph: blocks, settings and export time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub blocks: Vec<BlockRecord>,
    #[serde(default)]
    pub settings: SettingsPatch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
}

/// One block as stored in a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRecord {
    pub id: BlockId,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type", default = "default_block_type")]
    pub block_type: String,
    /// Outgoing links in table order
    #[serde(default)]
    pub links: Vec<LinkRecord>,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BlockMetadata>,
}

fn default_block_type() -> String {
    "default".to_string()
}

/// Link entry in a block record.
///
/// Older documents list bare target ids; those import as single links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkRecord {
    Legacy(BlockId),
    Current {
        id: BlockId,
        #[serde(rename = "type", default)]
        kind: LinkKind,
        #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
        created_at: Option<DateTime<Utc>>,
    },
}

impl LinkRecord {
    pub fn target(&self) -> &BlockId {
        match self {
            LinkRecord::Legacy(id) => id,
            LinkRecord::Current { id, .. } => id,
        }
    }

    pub fn kind(&self) -> LinkKind {
        match self {
            LinkRecord::Legacy(_) => LinkKind::Single,
            LinkRecord::Current { kind, .. } => *kind,
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        match self {
            LinkRecord::Legacy(_) => None,
            LinkRecord::Current { created_at, .. } => *created_at,
        }
    }
}

impl GraphStore {
    // ========== Export ==========

    /// Snapshot the store as a document
    pub fn export_document(&self) -> Document {
        let blocks: Vec<BlockRecord> = self
            .blocks()
            .map(|block| BlockRecord {
                id: block.id().clone(),
                content: block.content().to_string(),
                block_type: block.block_type().to_string(),
                links: block
                    .links()
                    .iter()
                    .filter_map(|edge| {
                        self.get_block_by_key(edge.target).map(|target| LinkRecord::Current {
                            id: target.id().clone(),
                            kind: edge.kind,
                            created_at: Some(edge.created_at),
                        })
                    })
                    .collect(),
                position: block.position(),
                size: Some(block.size()),
                metadata: Some(block.metadata()),
            })
            .collect();

        info!(
            "event=blocks_export module=serialization status=ok count={}",
            blocks.len()
        );

        Document {
            version: Some(DOCUMENT_VERSION.to_string()),
            blocks,
            settings: SettingsPatch::from(self.settings()),
            exported_at: Some(Utc::now()),
        }
    }

    /// Export the store as pretty-printed JSON
    pub fn export_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.export_document())
            .context("Failed to serialize document")
    }

    /// Save the exported document to a file
    pub fn save_document(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create document: {}", path.display()))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.export_document())
            .with_context(|| format!("Failed to write document: {}", path.display()))?;
        Ok(())
    }

    // ========== Import ==========

    /// Replace the store's contents with a JSON document.
    ///
    /// The document is fully validated before anything changes; on error
    /// the store is left as it was.
    pub fn import_json(&mut self, json: &str) -> GraphResult<usize> {
        let document: Document = serde_json::from_str(json).map_err(|err| {
            error!(
                "event=blocks_import module=serialization status=error \
                 error_code=parse_failed error={}",
                err
            );
            GraphError::MalformedDocument(err.to_string())
        })?;

        self.import_document(document)
    }

    /// Replace the store's contents with `document`.
    ///
    /// Settings are merged key by key; blocks are replaced wholesale. Links
    /// to ids missing from the document (or to the block itself) are dropped.
    /// Returns the number of imported blocks.
    pub fn import_document(&mut self, document: Document) -> GraphResult<usize> {
        let mut keys: HashMap<BlockId, BlockKey> = HashMap::with_capacity(document.blocks.len());
        for (i, record) in document.blocks.iter().enumerate() {
            if keys.insert(record.id.clone(), BlockKey(i)).is_some() {
                error!(
                    "event=blocks_import module=serialization status=error \
                     error_code=duplicate_id id={}",
                    record.id
                );
                return Err(GraphError::MalformedDocument(format!(
                    "duplicate block id: {}",
                    record.id
                )));
            }
        }

        let mut settings = *self.settings();
        settings.apply(&document.settings);

        let now = Utc::now();
        let mut blocks = Vec::with_capacity(document.blocks.len());
        let mut dropped = 0;

        for (i, record) in document.blocks.into_iter().enumerate() {
            let key = BlockKey(i);
            let mut block = Block::new(
                key,
                record.id,
                record.content,
                record.block_type,
                record.position,
                record.size.unwrap_or_default(),
            );

            for link in &record.links {
                match keys.get(link.target()) {
                    Some(&target) => {
                        let created_at = link.created_at().unwrap_or(now);
                        block.insert_link_at(target, link.kind(), created_at);
                    }
                    None => {
                        warn!(
                            "event=blocks_import module=serialization status=warn \
                             block={} dropped_link={}",
                            block.id(),
                            link.target()
                        );
                        dropped += 1;
                    }
                }
            }

            block.set_metadata(record.metadata.unwrap_or(BlockMetadata {
                created_at: now,
                updated_at: now,
            }));
            blocks.push(block);
        }

        let count = blocks.len();
        self.replace_blocks(blocks, settings);

        info!(
            "event=blocks_import module=serialization status=ok count={} dropped_links={}",
            count, dropped
        );
        self.publish(EventType::BlocksImported { count });

        Ok(count)
    }

    /// Load a document file into the store
    pub fn load_document(&mut self, path: &Path) -> Result<usize> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to open document: {}", path.display()))?;
        self.import_json(&json)
            .with_context(|| format!("Failed to import document: {}", path.display()))
    }
}
