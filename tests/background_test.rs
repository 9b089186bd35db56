#![cfg(not(target_arch = "wasm32"))]

use std::time::Duration;

use alpaca_viewer::flow::{Background, EventFuture};
use futures::channel::oneshot;

fn background() -> Background<u32> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("tokio runtime");
    Background::new(runtime)
}

/// Poll like the event loop does until `count` events arrived.
fn drain(background: &mut Background<u32>, count: usize) -> Vec<u32> {
    let mut events = Vec::new();
    for _ in 0..500 {
        events.extend(background.ready());
        if events.len() >= count {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    events
}

#[test]
fn should_keep_drawing_while_a_load_is_pending() {
    let mut background = background();
    let (release, gate) = oneshot::channel::<()>();
    let load: EventFuture<u32> = Box::pin(async move {
        gate.await.ok();
        7
    });

    // Would never return if spawning waited for the future.
    background.spawn(vec![load]);
    for _ in 0..3 {
        assert!(background.ready().is_empty());
    }

    release.send(()).expect("load still waiting");
    assert_eq!(drain(&mut background, 1), vec![7]);
    assert!(background.ready().is_empty());
}

#[test]
fn should_deliver_a_batch_in_order() {
    let mut background = background();
    let futures: Vec<EventFuture<u32>> = vec![
        Box::pin(async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            1
        }),
        Box::pin(async { 2 }),
    ];
    background.spawn(futures);
    assert_eq!(drain(&mut background, 2), vec![1, 2]);
}
