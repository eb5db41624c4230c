use anyhow::{Context, Result};
use block_canvas::{GraphSettings, GraphStore, LinkIntent, Position};
use flexi_logger::Logger;
use std::path::PathBuf;

/// Usage: block_canvas [SETTINGS_JSON] [EXPORT_PATH]
fn main() -> Result<()> {
    let _logger = Logger::try_with_env_or_str("info")
        .context("Invalid log specification")?
        .start()
        .context("Failed to start logger")?;

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => GraphSettings::load(&PathBuf::from(path))?,
        None => GraphSettings::default(),
    };
    let export_path = args.next().map(PathBuf::from);

    println!("Block Canvas - Graph Core Demo");
    println!("==============================\n");

    let mut store = GraphStore::with_settings(settings);
    store.subscribe(|event| {
        println!("  [{}] {}", event.timestamp.format("%H:%M:%S"), event.event.name());
        Ok(())
    });

    let idea = store.create_block("Idea", "note", None, None);
    let plan = store.create_block("Plan", "task", None, None);
    let ship = store.create_block("Ship it", "task", Some(Position::new(50.0, 400.0)), None);

    store.link_blocks(&idea, &plan, LinkIntent::Single)?;
    store.link_blocks(&plan, &ship, LinkIntent::Double)?;
    store.link_blocks(&idea, &ship, LinkIntent::Reverse)?;

    println!("\n✓ Created {} blocks and {} edges", store.block_count(), store.link_count());

    println!("\n🔗 Connectors:");
    for connector in store.connectors() {
        println!(
            "  {} -> {} ({}): {}",
            connector.from,
            connector.to,
            connector.kind,
            connector.path.to_svg_path()
        );
    }

    store.arrange_blocks(2);
    println!("\n✓ Arranged blocks on a 2-column grid");

    if let Some(path) = export_path {
        store.save_document(&path)?;
        let mut restored = GraphStore::new();
        let count = restored.load_document(&path)?;
        println!("\n✓ Exported to {} and re-imported {} blocks", path.display(), count);
    }

    Ok(())
}
