use std::sync::Arc;

use anyhow::Context;
use notes_service::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;
    init_tracing(&config)?;

    let state = AppState::new(config.clone(), Arc::new(MemoryNoteStore::new()));

    Server::new(config)
        .serve(router(state))
        .await
        .context("serving HTTP")?;

    Ok(())
}
