mod fixtures;

use block_canvas::{
    anchor_point, BlockId, EventType, GraphError, GraphSettings, GraphStore, LinkIntent, LinkKind,
    Position, Rectangle, Size,
};
use fixtures::sample_graphs::*;
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn linking_twice_yields_same_edges() {
    let (mut store, a, b) = create_pair();

    store.link_blocks(&a, &b, LinkIntent::Single).unwrap();
    let once = store.export_document().blocks;

    store.link_blocks(&a, &b, LinkIntent::Single).unwrap();
    let twice = store.export_document().blocks;

    let targets = |doc: &Vec<block_canvas::BlockRecord>| -> Vec<Vec<(BlockId, LinkKind)>> {
        doc.iter()
            .map(|r| r.links.iter().map(|l| (l.target().clone(), l.kind())).collect())
            .collect()
    };
    assert_eq!(targets(&once), targets(&twice));
}

#[test]
fn export_import_round_trip() {
    let store = create_mixed_store();
    let exported = store.export_document();

    let mut restored = GraphStore::new();
    restored.import_json(&store.export_json().unwrap()).unwrap();

    for (original, copy) in exported.blocks.iter().zip(restored.export_document().blocks.iter()) {
        assert_eq!(copy.id, original.id);
        assert_eq!(copy.content, original.content);
        assert_eq!(copy.block_type, original.block_type);
        assert_eq!(copy.links, original.links);
        assert_eq!(copy.position, original.position);
        assert_eq!(copy.size, original.size);
    }
    assert_eq!(restored.block_count(), store.block_count());
    assert_eq!(restored.link_count(), store.link_count());
}

#[test]
fn legacy_links_import_as_single_edges() {
    let mut store = GraphStore::new();
    assert_eq!(store.import_json(legacy_document_json()).unwrap(), 3);

    let (one, two, three) = (
        BlockId::from("block-1"),
        BlockId::from("block-2"),
        BlockId::from("block-3"),
    );

    // block-1 and block-2 list each other, which reads back as a double link
    assert_eq!(store.get_link_info(&one, &two).unwrap().kind, LinkKind::Double);
    let info = store.get_link_info(&three, &two).unwrap();
    assert_eq!(info.kind, LinkKind::Single);
    assert_eq!((info.from, info.to), (two.clone(), three.clone()));

    for block in store.blocks() {
        assert!(block.links().iter().all(|edge| edge.kind == LinkKind::Single));
    }
    assert_eq!(store.get_block(&two).unwrap().size(), Size::new(250.0, 150.0));
}

#[test]
fn reverse_link_reports_actual_direction() {
    let (mut store, a, b) = create_pair();
    store.link_blocks(&a, &b, LinkIntent::Reverse).unwrap();

    let info = store.get_link_info(&a, &b).unwrap();
    assert_eq!(info.kind, LinkKind::Single);
    assert_eq!(info.from, b);
    assert_eq!(info.to, a);
    assert!(info.involves(&a));
}

#[test]
fn double_link_is_symmetric() {
    let (mut store, a, b) = create_pair();
    store.link_blocks(&a, &b, LinkIntent::Double).unwrap();

    assert_eq!(store.get_link_info(&a, &b).unwrap().kind, LinkKind::Double);
    let block_a = store.get_block(&a).unwrap();
    let block_b = store.get_block(&b).unwrap();
    assert!(block_a.has_link(block_b.key()));
    assert!(block_b.has_link(block_a.key()));
}

#[test]
fn deleting_a_block_purges_references() {
    let (mut store, hub, spokes) = create_hub_and_spokes();
    let hub_key = store.key_of(&hub).unwrap();

    store.delete_block(&hub).unwrap();

    assert!(store.blocks().all(|b| !b.has_link(hub_key)));
    assert_eq!(store.link_count(), 0);
    for spoke in &spokes {
        assert!(store.get_link_info(spoke, &hub).is_none());
    }
}

#[test]
fn grid_snap_and_size_floor() {
    let (mut store, a, _) = create_pair();

    assert_eq!(
        store.set_block_position(&a, 27.0, 33.0, true).unwrap(),
        Position::new(20.0, 40.0)
    );
    assert_eq!(store.set_block_size(&a, 10.0, 10.0).unwrap(), Size::new(150.0, 100.0));
}

#[test]
fn anchor_on_right_edge_midpoint() {
    let a = Rectangle::new(0.0, 0.0, 100.0, 100.0);
    let b = Rectangle::new(300.0, 0.0, 100.0, 100.0);
    let anchor = anchor_point(&a, &b);
    assert_eq!((anchor.x, anchor.y), (100.0, 50.0));
}

#[test]
fn auto_placement_follows_default_spacing() {
    let settings = GraphSettings {
        default_spacing: 220.0,
        ..GraphSettings::default()
    };
    let mut store = GraphStore::with_settings(settings);

    let first = store.create_block("First", "default", None, None);
    let second = store.create_block("Second", "default", None, None);

    assert_eq!(store.get_block(&first).unwrap().position(), Position::new(50.0, 50.0));
    assert_eq!(store.get_block(&second).unwrap().position(), Position::new(270.0, 50.0));
}

#[test]
fn listeners_observe_mutations_in_order() {
    let mut store = GraphStore::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    store.subscribe(move |event| {
        sink.borrow_mut().push(event.event.name());
        Ok(())
    });

    let a = store.create_block("A", "default", None, None);
    let b = store.create_block("B", "default", None, None);
    store.set_block_content(&a, "A2").unwrap();
    store.set_block_size(&a, 300.0, 300.0).unwrap();
    store.link_blocks(&a, &b, LinkIntent::Double).unwrap();
    store.unlink_blocks(&a, &b).unwrap();
    store.arrange_blocks(3);
    store.delete_block(&b).unwrap();
    store.import_json(r#"{ "blocks": [] }"#).unwrap();

    assert_eq!(
        *seen.borrow(),
        vec![
            "blockCreated",
            "blockCreated",
            "blockUpdated",
            "blockResized",
            "blocksLinked",
            "blocksUnlinked",
            "blockMoved",
            "blockMoved",
            "blocksArranged",
            "blockDeleted",
            "blocksImported",
        ]
    );
    assert_eq!(store.block_count(), 0);
}

#[test]
fn failed_operations_publish_nothing() {
    let (mut store, a, _) = create_pair();
    store.clear_events();

    let missing = BlockId::from("missing");
    assert_eq!(
        store.set_block_content(&missing, "x"),
        Err(GraphError::NotFound(missing.clone()))
    );
    assert_eq!(
        store.link_blocks(&a, &missing, LinkIntent::Single),
        Err(GraphError::NotFound(missing.clone()))
    );
    assert!(store.import_json("not json").is_err());

    assert!(store.events().is_empty());
}

#[test]
fn import_event_reports_count() {
    let mut store = GraphStore::new();
    store.import_json(legacy_document_json()).unwrap();

    assert_eq!(
        store.drain_events().pop().unwrap().event,
        EventType::BlocksImported { count: 3 }
    );
}
