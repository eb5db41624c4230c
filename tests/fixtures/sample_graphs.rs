// Helper functions to build stores with various configurations

use block_canvas::{BlockId, GraphStore, LinkIntent, Position, Size};

/// Two unlinked blocks side by side
pub fn create_pair() -> (GraphStore, BlockId, BlockId) {
    let mut store = GraphStore::new();
    let a = store.create_block("A", "default", None, None);
    let b = store.create_block("B", "default", None, None);
    (store, a, b)
}

/// A hub block linked to three spokes, one of each intent
pub fn create_hub_and_spokes() -> (GraphStore, BlockId, Vec<BlockId>) {
    let mut store = GraphStore::new();
    let hub = store.create_block("Hub", "note", Some(Position::new(400.0, 400.0)), None);

    let spokes: Vec<BlockId> = [
        ("Forward", LinkIntent::Single),
        ("Backward", LinkIntent::Reverse),
        ("Both", LinkIntent::Double),
    ]
    .into_iter()
    .map(|(content, intent)| {
        let spoke = store.create_block(content, "task", None, None);
        store.link_blocks(&hub, &spoke, intent).unwrap();
        spoke
    })
    .collect();

    (store, hub, spokes)
}

/// Document in the legacy format: links are bare id strings
pub fn legacy_document_json() -> &'static str {
    r#"{
        "blocks": [
            { "id": "block-1", "content": "First", "type": "note", "links": ["block-2"],
              "position": { "x": 50, "y": 50 }, "size": { "width": 250, "height": 150 } },
            { "id": "block-2", "content": "Second", "type": "note", "links": ["block-1", "block-3"],
              "position": { "x": 350, "y": 50 } },
            { "id": "block-3", "content": "Third", "type": "task", "links": [],
              "position": { "x": 650, "y": 50 } }
        ],
        "settings": {
            "gridSize": 20, "defaultSpacing": 300, "minBlockWidth": 150, "minBlockHeight": 100
        },
        "exportedAt": "2023-11-14T09:30:00.000Z"
    }"#
}

/// A store with custom sizes, all three link intents and edited content
pub fn create_mixed_store() -> GraphStore {
    let mut store = GraphStore::new();
    let a = store.create_block("Alpha", "note", None, Some(Size::new(320.0, 180.0)));
    let b = store.create_block("Beta", "task", None, None);
    let c = store.create_block("Gamma", "default", Some(Position::new(50.0, 500.0)), None);
    let d = store.create_block("Delta", "default", None, None);

    store.link_blocks(&a, &b, LinkIntent::Single).unwrap();
    store.link_blocks(&b, &c, LinkIntent::Double).unwrap();
    store.link_blocks(&c, &d, LinkIntent::Reverse).unwrap();
    store.set_block_content(&d, "Delta (edited)").unwrap();
    store.set_block_position(&c, 61.0, 489.0, true).unwrap();

    store
}
