//! Drives the client components against a running `valentine` service.
//!
//! ```text
//! valentine-demo send <sender> <recipient> [message]   create, print links, wait for an answer
//! valentine-demo accept <id>                           accept as the recipient
//! ```

use std::sync::Arc;

use anyhow::{Context, bail};
use tracing::info;
use uuid::Uuid;

use valentine_client::builder::{Field, RequestBuilder, SubmitOutcome};
use valentine_client::config::ClientConfig;
use valentine_client::http::HttpRecordStore;
use valentine_client::player::NullOutput;
use valentine_client::renderer::{AcceptOutcome, RequestRenderer, ViewMode};
use valentine_client::share::{MemoryClipboard, ShareKind, ShareSurface};
use valentine_client::status::{StatusState, StatusViewer};
use valentine_client::store::RecordStore;
use valentine_client::ui::{self, UiEvent, UiHandle};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "valentine_demo=info,valentine_client=info".into()),
        )
        .init();

    let config = ClientConfig::from_env()?;
    let store: Arc<dyn RecordStore> = Arc::new(HttpRecordStore::new(&config.store_url)?);

    let (ui, mut events) = ui::channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                UiEvent::Navigate(route) => info!("-> {}", route),
                UiEvent::Notify(n) => info!("[{}] {}", n.title, n.description),
                UiEvent::Celebrate(_) => info!("🎉"),
                UiEvent::OpenExternal(url) => info!("open {}", url),
            }
        }
    });

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["send", sender, recipient, rest @ ..] => {
            let message = rest.first().copied().unwrap_or("Will you be my Valentine?");
            send(store, &config, ui, sender, recipient, message).await?;
        }
        ["accept", id] => {
            let id: Uuid = id.parse().context("request id must be a UUID")?;
            accept(store, ui, id).await?;
        }
        _ => bail!("usage: valentine-demo send <sender> <recipient> [message] | accept <id>"),
    }

    printer.abort();
    Ok(())
}

async fn send(
    store: Arc<dyn RecordStore>,
    config: &ClientConfig,
    ui: UiHandle,
    sender: &str,
    recipient: &str,
    message: &str,
) -> anyhow::Result<()> {
    let builder = RequestBuilder::new(store.clone(), ui.clone());
    builder.set(Field::SenderName, sender);
    builder.set(Field::RecipientName, recipient);
    builder.set(Field::Message, message);
    info!(
        "Picked {} / {} / {}",
        builder.surprise_gift(),
        builder.surprise_theme(),
        builder.surprise_song()
    );

    let id = match builder.submit().await {
        SubmitOutcome::Created(id) => id,
        other => bail!("request not created: {:?}", other),
    };

    let share = ShareSurface::load(
        store.clone(),
        id,
        &config.site_url,
        ui.clone(),
        Box::new(MemoryClipboard::new()),
    )
    .await;
    info!("Link: {}", share.link());
    for platform in share.platforms(ShareKind::Invite) {
        info!("{} {}: {}", platform.icon, platform.name, platform.url);
    }

    let viewer = StatusViewer::open(store, id, ui).await;
    let mut state = viewer.watch();
    info!("Waiting for {} to answer (Ctrl-C to stop)", recipient);
    loop {
        match &*state.borrow_and_update() {
            StatusState::Accepted(snapshot) => {
                info!("{} accepted at {}", snapshot.recipient_name, snapshot.updated_at);
                break;
            }
            StatusState::NotFound => bail!("request {} disappeared", id),
            StatusState::Failed(e) => bail!("status unavailable: {}", e),
            StatusState::Loading | StatusState::Awaiting(_) => {}
        }
        state.changed().await.context("status feed closed")?;
    }

    viewer.close();
    Ok(())
}

async fn accept(store: Arc<dyn RecordStore>, ui: UiHandle, id: Uuid) -> anyhow::Result<()> {
    let renderer = RequestRenderer::new(store, ui, id, ViewMode::Live, Box::new(NullOutput));
    renderer.load().await;

    match renderer.accept().await {
        AcceptOutcome::Accepted => Ok(()),
        AcceptOutcome::Ignored => {
            info!("Nothing to accept for {} ({:?})", id, renderer.gate());
            Ok(())
        }
        AcceptOutcome::Failed => bail!("accept failed"),
    }
}
