//! End-to-end tests driving raw frames through the dispatcher.
//!
//! These exercise the whole pipeline (header decode, role gate, body
//! decode, effect) against the public recording doubles, the way the
//! session host process wires it up.

use std::sync::Arc;

use deskshare_control::mock::{
    FixedClock, RecordingDesktop, RecordingRegistry, RecordingReplySender,
};
use deskshare_control::{DesktopControl, InputDispatcher, SessionId, SessionRegistry};
use deskshare_core::protocol::codec::encode_message;
use deskshare_core::protocol::messages::{
    ControlMessage, KeyPayload, MovePayload, PingPayload, ScrollPayload, TouchPayload,
};
use uuid::Uuid;

struct Harness {
    dispatcher: InputDispatcher,
    desktop: Arc<RecordingDesktop>,
    registry: Arc<RecordingRegistry>,
    reply: RecordingReplySender,
    host: SessionId,
    viewer: SessionId,
}

fn harness() -> Harness {
    let host = Uuid::new_v4();
    let desktop = Arc::new(RecordingDesktop::new());
    let registry = Arc::new(RecordingRegistry::with_host(host));
    let dispatcher = InputDispatcher::new(
        Arc::clone(&desktop) as Arc<dyn DesktopControl>,
        Arc::clone(&registry) as Arc<dyn SessionRegistry>,
        Arc::new(FixedClock(1_722_000_000_000)),
    );
    Harness {
        dispatcher,
        desktop,
        registry,
        reply: RecordingReplySender::default(),
        host,
        viewer: Uuid::new_v4(),
    }
}

#[test]
fn test_host_session_drives_the_shared_desktop_end_to_end() {
    let h = harness();

    let frames = [
        encode_message(&ControlMessage::Move(MovePayload { x: 800, y: 600 })),
        encode_message(&ControlMessage::ButtonDown(KeyPayload { code: 1 })),
        encode_message(&ControlMessage::ButtonUp(KeyPayload { code: 1 })),
        encode_message(&ControlMessage::KeyDown(KeyPayload { code: 65 })),
        encode_message(&ControlMessage::KeyUp(KeyPayload { code: 65 })),
        encode_message(&ControlMessage::Scroll(ScrollPayload::Current {
            delta_x: 0,
            delta_y: -120,
            control_key: false,
        })),
    ];

    for frame in &frames {
        h.dispatcher.handle(&h.host, frame, &h.reply).unwrap();
    }

    assert_eq!(*h.desktop.moves.lock().unwrap(), vec![(800, 600)]);
    assert_eq!(*h.registry.host_cursor.lock().unwrap(), vec![(800, 600)]);
    assert_eq!(*h.desktop.button_downs.lock().unwrap(), vec![1]);
    assert_eq!(*h.desktop.button_ups.lock().unwrap(), vec![1]);
    assert_eq!(*h.desktop.key_downs.lock().unwrap(), vec![65]);
    assert_eq!(*h.desktop.key_ups.lock().unwrap(), vec![65]);
    assert_eq!(*h.desktop.scrolls.lock().unwrap(), vec![(0, -120, false)]);
    assert!(h.reply.frames.lock().unwrap().is_empty());
}

#[test]
fn test_viewer_session_never_reaches_the_desktop() {
    let h = harness();

    let frames = [
        encode_message(&ControlMessage::Move(MovePayload { x: 5, y: 6 })),
        encode_message(&ControlMessage::KeyDown(KeyPayload { code: 65 })),
        encode_message(&ControlMessage::Scroll(ScrollPayload::Legacy { x: 1, y: 1 })),
        encode_message(&ControlMessage::TouchUpdate(TouchPayload {
            touch_id: 3,
            x: 4,
            y: 5,
            pressure: 6,
        })),
    ];

    for frame in &frames {
        h.dispatcher.handle(&h.viewer, frame, &h.reply).unwrap();
    }

    // The move lands in the viewer's advisory record only; everything else
    // is silently dropped.
    assert_eq!(h.desktop.total_calls(), 0);
    assert_eq!(
        *h.registry.advisory_cursors.lock().unwrap(),
        vec![(h.viewer, 5, 6)]
    );
    assert!(h.registry.host_cursor.lock().unwrap().is_empty());
}

#[test]
fn test_every_session_gets_a_latency_reply() {
    let h = harness();
    let ping = encode_message(&ControlMessage::Ping(PingPayload {
        client_ts_high: 9,
        client_ts_low: 1234,
    }));

    h.dispatcher.handle(&h.host, &ping, &h.reply).unwrap();
    h.dispatcher.handle(&h.viewer, &ping, &h.reply).unwrap();

    let frames = h.reply.frames.lock().unwrap();
    assert_eq!(frames.len(), 2);
    for pong in frames.iter() {
        // Same echoed words for both senders, same fixed server clock.
        assert_eq!(&pong[4..8], &9u32.to_be_bytes());
        assert_eq!(&pong[8..12], &1234u32.to_be_bytes());
        assert_eq!(pong.len(), 20);
    }
}

#[test]
fn test_host_handover_changes_routing_between_frames() {
    let h = harness();
    let frame = encode_message(&ControlMessage::KeyDown(KeyPayload { code: 65 }));

    // Before handover the viewer's key press is dropped.
    h.dispatcher.handle(&h.viewer, &frame, &h.reply).unwrap();
    assert!(h.desktop.key_downs.lock().unwrap().is_empty());

    // The registry hands host control to the viewer.
    *h.registry.host.lock().unwrap() = Some(h.viewer);

    // The same bytes now drive the desktop; host status is re-read per frame.
    h.dispatcher.handle(&h.viewer, &frame, &h.reply).unwrap();
    assert_eq!(*h.desktop.key_downs.lock().unwrap(), vec![65]);

    // And the former host is dropped.
    h.dispatcher.handle(&h.host, &frame, &h.reply).unwrap();
    assert_eq!(*h.desktop.key_downs.lock().unwrap(), vec![65]);
}

#[test]
fn test_malformed_frame_aborts_only_that_message() {
    let h = harness();
    let truncated_key = [0x00, 0x03, 0x00, 0x04, 0x00];

    let result = h.dispatcher.handle(&h.host, &truncated_key, &h.reply);
    assert!(result.is_err());
    assert_eq!(h.desktop.total_calls(), 0);

    // The session keeps working: the next well-formed frame lands.
    let key = encode_message(&ControlMessage::KeyDown(KeyPayload { code: 66 }));
    h.dispatcher.handle(&h.host, &key, &h.reply).unwrap();
    assert_eq!(*h.desktop.key_downs.lock().unwrap(), vec![66]);
}

#[test]
fn test_frames_from_a_future_protocol_revision_are_ignored() {
    let h = harness();
    // Opcode 0x0C does not exist in this build.
    let frame = [0x00, 0x0C, 0x00, 0x03, 0x01, 0x02, 0x03];

    let result = h.dispatcher.handle(&h.host, &frame, &h.reply);

    assert!(result.is_ok());
    assert_eq!(h.desktop.total_calls(), 0);
    assert!(h.reply.frames.lock().unwrap().is_empty());
}
