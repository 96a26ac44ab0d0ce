use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use valentine_types::events::{GatewayCommand, GatewayEvent};

use crate::dispatcher::Dispatcher;

/// Heartbeat interval: server sends a Ping every 15 seconds.
/// If 2 consecutive Pongs are missed (~30s), the connection is dropped.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

type Subscriptions = Arc<RwLock<HashSet<Uuid>>>;

/// Handle a single gateway WebSocket for its whole lifetime.
pub async fn handle_connection(socket: WebSocket, dispatcher: Dispatcher) {
    let (mut sender, receiver) = socket.split();
    let session_id = Uuid::new_v4();

    info!("Gateway session {} connected", session_id);

    if send_event(&mut sender, &GatewayEvent::Ready { session_id })
        .await
        .is_err()
    {
        return;
    }

    dispatcher.session_opened(session_id).await;
    run_connection_loop(sender, receiver, dispatcher.clone(), session_id).await;
    dispatcher.session_closed(session_id).await;

    info!("Gateway session {} disconnected", session_id);
}

async fn run_connection_loop(
    mut sender: SplitSink<WebSocket, Message>,
    mut receiver: SplitStream<WebSocket>,
    dispatcher: Dispatcher,
    session_id: Uuid,
) {
    let mut broadcast_rx = dispatcher.subscribe();

    // Per-connection request subscriptions (shared between send and recv tasks).
    let subscriptions: Subscriptions = Arc::new(RwLock::new(HashSet::new()));
    let send_subscriptions = subscriptions.clone();

    // Targeted replies from the recv task (subscription acks)
    let (reply_tx, mut reply_rx) = tokio::sync::mpsc::unbounded_channel::<GatewayEvent>();

    let pong_received = Arc::new(AtomicBool::new(true));
    let pong_flag_send = pong_received.clone();
    let pong_flag_recv = pong_received.clone();

    // Forward matching broadcasts + replies -> client, with heartbeat
    let mut send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        heartbeat.tick().await;
        let mut missed_heartbeats: u8 = 0;

        loop {
            tokio::select! {
                result = broadcast_rx.recv() => {
                    let event = match result {
                        Ok(event) => event,
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                            warn!("Session {} lagged by {} events", session_id, n);
                            continue;
                        }
                        Err(_) => break,
                    };

                    if !should_deliver(&event, &send_subscriptions) {
                        continue;
                    }

                    if send_event(&mut sender, &event).await.is_err() {
                        break;
                    }
                }
                reply = reply_rx.recv() => {
                    let Some(event) = reply else { break };
                    if send_event(&mut sender, &event).await.is_err() {
                        break;
                    }
                }
                _ = heartbeat.tick() => {
                    if pong_flag_send.swap(false, Ordering::Acquire) {
                        missed_heartbeats = 0;
                    } else {
                        missed_heartbeats += 1;
                        if missed_heartbeats >= 2 {
                            warn!("Heartbeat timeout (missed {} pongs), dropping session {}", missed_heartbeats, session_id);
                            break;
                        }
                    }
                    if sender.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Read commands from client
    let recv_subscriptions = subscriptions.clone();
    let recv_dispatcher = dispatcher.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<GatewayCommand>(&text) {
                    Ok(cmd) => {
                        let ids = apply_command(&recv_subscriptions, cmd);
                        recv_dispatcher
                            .set_session_subscriptions(session_id, ids.clone())
                            .await;
                        let _ = reply_tx.send(GatewayEvent::Subscribed { request_ids: ids });
                    }
                    Err(e) => {
                        warn!(
                            "Session {} bad command: {} -- raw: {}",
                            session_id,
                            e,
                            text.chars().take(200).collect::<String>()
                        );
                    }
                },
                Message::Pong(_) => {
                    pong_flag_recv.store(true, Ordering::Release);
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
}

async fn send_event(
    sender: &mut SplitSink<WebSocket, Message>,
    event: &GatewayEvent,
) -> Result<(), ()> {
    let text = match serde_json::to_string(event) {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to encode gateway event: {}", e);
            return Ok(());
        }
    };
    sender.send(Message::Text(text.into())).await.map_err(|_| ())
}

/// Apply a command to the session's subscription set and return the
/// resulting set, sorted for a stable acknowledgement.
fn apply_command(subscriptions: &Subscriptions, cmd: GatewayCommand) -> Vec<Uuid> {
    let mut subs = match subscriptions.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    match cmd {
        GatewayCommand::Subscribe { request_ids } => {
            debug!("Subscribing to {} requests", request_ids.len());
            *subs = request_ids.into_iter().collect();
        }
        GatewayCommand::Unsubscribe { request_ids } => {
            for id in &request_ids {
                subs.remove(id);
            }
        }
    }

    let mut ids: Vec<Uuid> = subs.iter().copied().collect();
    ids.sort();
    ids
}

fn should_deliver(event: &GatewayEvent, subscriptions: &Subscriptions) -> bool {
    match event.request_id() {
        Some(request_id) => match subscriptions.read() {
            Ok(subs) => subs.contains(&request_id),
            Err(poisoned) => poisoned.into_inner().contains(&request_id),
        },
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valentine_types::models::Request;

    fn update_for(id: Uuid) -> GatewayEvent {
        let now = chrono::Utc::now();
        GatewayEvent::RequestUpdate {
            request: Request {
                id,
                sender_name: "Sam".into(),
                recipient_name: "Lee".into(),
                message: "Hi".into(),
                custom_message: None,
                gift: "🌹 Red Rose Bouquet".into(),
                theme: "classic_romance".into(),
                music: "midnight_glow".into(),
                accepted: true,
                created_at: now,
                updated_at: now,
            },
        }
    }

    #[test]
    fn updates_filtered_by_subscription() {
        let subs: Subscriptions = Arc::default();
        let watched = Uuid::new_v4();
        let other = Uuid::new_v4();

        assert!(!should_deliver(&update_for(watched), &subs));

        apply_command(&subs, GatewayCommand::Subscribe { request_ids: vec![watched] });
        assert!(should_deliver(&update_for(watched), &subs));
        assert!(!should_deliver(&update_for(other), &subs));

        let remaining = apply_command(&subs, GatewayCommand::Unsubscribe { request_ids: vec![watched] });
        assert!(remaining.is_empty());
        assert!(!should_deliver(&update_for(watched), &subs));
    }

    #[test]
    fn subscribe_replaces_previous_set() {
        let subs: Subscriptions = Arc::default();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        apply_command(&subs, GatewayCommand::Subscribe { request_ids: vec![first] });
        let ids = apply_command(&subs, GatewayCommand::Subscribe { request_ids: vec![second] });
        assert_eq!(ids, vec![second]);
    }

    #[test]
    fn connection_events_always_delivered() {
        let subs: Subscriptions = Arc::default();
        let ready = GatewayEvent::Ready { session_id: Uuid::new_v4() };
        assert!(should_deliver(&ready, &subs));
    }
}
