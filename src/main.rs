//! Headless tabletop entrypoint: restore or deal a table, then save it.

use tabletop::{demo, load_snapshot, save_snapshot, AppConfig, StrategyRegistry, TableEnvironment};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tabletop=info,tabletop_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    let env = TableEnvironment::with_config(config.core.clone(), StrategyRegistry::with_builtins());
    let table = env.create_table()?;

    if !load_snapshot(&config.snapshot_path, &table)? {
        tracing::info!("No snapshot found; dealing a demo table");
        demo::deal_demo_table(&env, &table)?;
    }

    tracing::info!(
        revision = table.revision_number(),
        components = table.tabletop().component_count(),
        bounds = ?table.tabletop().bounds(),
        "Table ready"
    );

    save_snapshot(&config.snapshot_path, &table)?;
    env.await_pending_events();
    env.dispose();
    Ok(())
}
