use std::sync::Arc;
use std::time::Duration;

use layout_core::{
    Catalog, Dimensions, InputEvent, InputKind, InputPhase, LayoutSession, MaterialType, ScreenPoint,
    SessionConfig, Terrain,
};
use layout_storage::{LayoutStorage, MongoSink, StorageConfig};

#[tokio::main]
async fn main() -> Result<(), layout_storage::StorageError> {
    let config = StorageConfig::from_env();
    let storage = Arc::new(LayoutStorage::init(&config).await?);
    let (sink, mut failures) = MongoSink::spawn(storage.clone(), &tokio::runtime::Handle::current());

    // Place one tree through a scripted drag
    let terrain = Terrain::flat("demo-terrain", "demo", 9, Dimensions::new(30.0, 30.0), MaterialType::Grass)?;
    let mut session = LayoutSession::new(Catalog::builtin(), terrain, SessionConfig::default(), Some(Box::new(sink)));
    session.set_active_template(Some("tree-large"))?;
    let project = |p: ScreenPoint| Some((p.x, p.y));
    for (i, (phase, x)) in [(InputPhase::Down, 2.0), (InputPhase::Move, 15.0), (InputPhase::Up, 15.0)]
        .into_iter()
        .enumerate()
    {
        let now = Duration::from_millis(16 * i as u64);
        let event = InputEvent::new(InputKind::Mouse, phase, ScreenPoint::new(x, 10.0), now);
        session.tick(now, &[event], &project)?;
    }
    drop(session);

    // the writer drains its queue before failures close
    while let Some(failure) = failures.recv().await {
        println!("not stored: {failure:?}");
    }

    match storage.load_layout("demo").await? {
        Some(layout) => println!("Round-trip success: {} element(s) stored", layout.elements.len()),
        None => println!("Layout not found!"),
    }

    // Clean up
    storage.delete_project("demo").await?;
    Ok(())
}
