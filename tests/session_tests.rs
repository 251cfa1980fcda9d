mod common;

use std::time::Duration;

use common::{context, drain, recv, wait_idle, MANUAL};
use frame_stream::core::TickOutcome;
use frame_stream::error::SceneLoadError;
use frame_stream::protocol;
use frame_stream::{
    CameraTransform, ClientMessage, ConnectionId, MoveAxis, ServerMessage, Session, SessionState, Timestamp,
};
use glam::Vec3;
use tokio::sync::mpsc;

#[cfg(test)]
mod session_tests {
    use super::*;

    fn session(tick: Duration) -> (Session, mpsc::Receiver<ServerMessage>) {
        let (tx, rx) = mpsc::channel(16);
        (Session::new(ConnectionId::new(), context(tick, false), tx), rx)
    }

    fn mouse(dx: f32, dy: f32) -> ClientMessage {
        ClientMessage::MouseMove {
            movement_x: dx,
            movement_y: dy,
        }
    }

    #[tokio::test]
    async fn test_new_session_is_idle() {
        let (session, _rx) = session(MANUAL);
        assert_eq!(session.state(), SessionState::Connected);
        assert!(!session.pointer_locked());
        assert!(session.scene_name().is_none());
        assert_eq!(session.pipeline().fire(), TickOutcome::NotRunning);
    }

    #[tokio::test]
    async fn test_mouse_look_only_while_locked() {
        let (mut session, _rx) = session(MANUAL);

        session.dispatch(mouse(100.0, 0.0)).await;
        assert_eq!(session.camera_transform().yaw, 0.0);

        session.dispatch(ClientMessage::Lock).await;
        session.dispatch(mouse(100.0, 0.0)).await;
        let locked_yaw = session.camera_transform().yaw;
        assert!((locked_yaw - (-100.0 * 0.002)).abs() < 1e-6);

        session.dispatch(ClientMessage::Unlock).await;
        session.dispatch(mouse(100.0, 0.0)).await;
        assert_eq!(session.camera_transform().yaw, locked_yaw);
    }

    #[tokio::test]
    async fn test_out_of_range_motion_keeps_camera_usable() {
        let (mut session, _rx) = session(MANUAL);
        session.dispatch(ClientMessage::Lock).await;

        for text in [
            r#"{"kind":"mousemove","payload":{"movementX":1e39,"movementY":0}}"#,
            r#"{"kind":"moveForward","payload":{"distance":1e39}}"#,
        ] {
            assert!(protocol::decode(text).is_err(), "{text}");
        }

        session.dispatch(mouse(f32::INFINITY, 0.0)).await;
        session
            .dispatch(ClientMessage::Move {
                axis: MoveAxis::Forward,
                distance: f32::INFINITY,
            })
            .await;
        assert_eq!(session.camera_transform(), CameraTransform::default());

        session
            .dispatch(ClientMessage::Move {
                axis: MoveAxis::Forward,
                distance: 0.25,
            })
            .await;
        session.dispatch(mouse(1.0, 0.0)).await;

        let camera = session.camera_transform();
        assert!((camera.position - Vec3::new(0.0, 0.0, -0.25)).length() < 1e-6);
        assert!((camera.yaw + 0.002).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_lock_error_changes_nothing() {
        let (mut session, _rx) = session(MANUAL);
        session.dispatch(ClientMessage::LockError).await;
        assert!(!session.pointer_locked());
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[tokio::test]
    async fn test_moves_apply_without_lock() {
        let (mut session, _rx) = session(MANUAL);
        session
            .dispatch(ClientMessage::Move {
                axis: MoveAxis::Forward,
                distance: 0.25,
            })
            .await;
        session
            .dispatch(ClientMessage::Move {
                axis: MoveAxis::Up,
                distance: 0.25,
            })
            .await;

        let position = session.camera_transform().position;
        assert!((position - Vec3::new(0.0, 0.25, -0.25)).length() < 1e-6);
    }

    #[tokio::test]
    async fn test_timestamp_echo_is_exact() {
        let (mut session, mut rx) = session(MANUAL);
        for ts in [Timestamp::from(0i64), Timestamp::from(1_700_000_000_123i64), Timestamp::from(u64::MAX)] {
            session.dispatch(ClientMessage::ClientTimestamp(ts.clone())).await;
            assert_eq!(recv(&mut rx).await, ServerMessage::TimestampResponse(ts));
        }
    }

    #[tokio::test]
    async fn test_load_scene_starts_streaming() {
        let (mut session, mut rx) = session(MANUAL);
        session.dispatch(ClientMessage::LoadScene("empty".into())).await;

        assert_eq!(session.state(), SessionState::SceneReady);
        assert_eq!(session.scene_name(), Some("empty"));
        assert!(session.pipeline().is_running());

        assert!(matches!(session.pipeline().fire(), TickOutcome::Started(_)));
        let ServerMessage::Image(png) = recv(&mut rx).await else {
            panic!("expected an image");
        };
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 9));
    }

    #[tokio::test]
    async fn test_timer_drives_frames_after_load() {
        let (mut session, mut rx) = session(Duration::from_millis(20));
        session.load_scene("pyramid").await.unwrap();

        for _ in 0..3 {
            assert!(matches!(recv(&mut rx).await, ServerMessage::Image(_)));
        }
        assert!(session.pipeline_stats().delivered >= 3);
    }

    #[tokio::test]
    async fn test_no_images_after_stop() {
        let (mut session, mut rx) = session(Duration::from_millis(10));
        session.load_scene("empty").await.unwrap();
        recv(&mut rx).await;

        session.pipeline().stop();
        wait_idle(&session).await;
        drain(&mut rx);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(drain(&mut rx), 0);
        assert_eq!(session.pipeline().fire(), TickOutcome::NotRunning);
    }

    #[tokio::test]
    async fn test_reload_resets_camera() {
        let (mut session, _rx) = session(MANUAL);
        session.load_scene("empty").await.unwrap();

        session.dispatch(ClientMessage::Lock).await;
        session.dispatch(mouse(50.0, 20.0)).await;
        session
            .dispatch(ClientMessage::Move {
                axis: MoveAxis::Right,
                distance: 3.0,
            })
            .await;
        assert_ne!(session.camera_transform().position, Vec3::ZERO);

        session.dispatch(ClientMessage::LoadScene("demo".into())).await;
        let camera = session.camera_transform();
        assert_eq!(camera.position, Vec3::ZERO);
        assert_eq!((camera.yaw, camera.pitch), (0.0, 0.0));
        assert_eq!(session.scene_name(), Some("demo"));
        assert_eq!(session.state(), SessionState::SceneReady);
    }

    #[tokio::test]
    async fn test_failed_load_leaves_session_connected() {
        let (mut session, _rx) = session(MANUAL);
        session.load_scene("empty").await.unwrap();
        session
            .dispatch(ClientMessage::Move {
                axis: MoveAxis::Forward,
                distance: 1.0,
            })
            .await;
        let before = session.camera_transform();

        let missing = format!("frame-stream-missing-{}.glb", ConnectionId::new());
        let err = session.load_scene(&missing).await.unwrap_err();
        assert!(matches!(err, SceneLoadError::NotFound(_)));

        assert_eq!(session.state(), SessionState::Connected);
        assert!(session.scene_name().is_none());
        assert!(!session.pipeline().is_running());
        assert_eq!(session.camera_transform(), before);
    }

    #[tokio::test]
    async fn test_closed_session_ignores_messages() {
        let (mut session, mut rx) = session(MANUAL);
        session.load_scene("empty").await.unwrap();
        session.close();
        session.close();

        assert_eq!(session.state(), SessionState::Closed);
        assert!(!session.pipeline().is_running());

        session.dispatch(ClientMessage::Lock).await;
        session.dispatch(ClientMessage::ClientTimestamp(Timestamp::from(7i64))).await;
        session.dispatch(ClientMessage::LoadScene("demo".into())).await;

        assert!(!session.pointer_locked());
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(drain(&mut rx), 0);
    }
}
