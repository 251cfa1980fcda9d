#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use frame_stream::core::{DeviceProvider, PngCodec, RenderSettings, Viewport};
use frame_stream::loaders::AssetSceneLoader;
use frame_stream::{ServerMessage, Session, SessionConfig, SessionContext};
use tokio::sync::mpsc;

/// Interval long enough that only explicit `fire()` calls produce frames
pub const MANUAL: Duration = Duration::from_secs(3600);

pub fn context(tick_interval: Duration, shared: bool) -> Arc<SessionContext> {
    Arc::new(SessionContext {
        loader: Arc::new(AssetSceneLoader::new(std::env::temp_dir())),
        devices: DeviceProvider::software(Viewport::new(16, 9), RenderSettings::default(), shared),
        codec: Arc::new(PngCodec::default()),
        config: SessionConfig {
            tick_interval,
            ..SessionConfig::default()
        },
    })
}

pub async fn wait_idle(session: &Session) {
    for _ in 0..1000 {
        if !session.pipeline().is_busy() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("frame tick never finished");
}

pub async fn recv(rx: &mut mpsc::Receiver<ServerMessage>) -> ServerMessage {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for outbound message")
        .expect("outbound channel closed")
}

pub fn drain(rx: &mut mpsc::Receiver<ServerMessage>) -> usize {
    let mut count = 0;
    while rx.try_recv().is_ok() {
        count += 1;
    }
    count
}
