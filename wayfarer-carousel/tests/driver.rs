use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep};
use wayfarer_carousel::{
    AutoplayDriver, Carousel, CarouselConfig, CarouselKey, CarouselMessage,
    CarouselRegistry, Direction, update,
};

const INTERVAL: Duration = Duration::from_millis(1_000);

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn counting() -> (Arc<AtomicUsize>, impl FnMut() -> anyhow::Result<()> + Send + 'static) {
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let callback = move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    };
    (fired, callback)
}

#[tokio::test(start_paused = true)]
async fn fires_once_per_interval() {
    let (fired, callback) = counting();
    let _driver = AutoplayDriver::start(INTERVAL, callback);

    sleep(ms(999)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    sleep(ms(2)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    sleep(ms(2_000)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn pause_suppresses_until_resume() {
    let (fired, callback) = counting();
    let driver = AutoplayDriver::start(INTERVAL, callback);

    sleep(ms(100)).await;
    driver.pause();
    sleep(ms(2_900)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    // A full fresh interval after resuming.
    driver.resume();
    sleep(ms(999)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    sleep(ms(2)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn reset_reschedules_from_the_interaction() {
    let (fired, callback) = counting();
    let driver = AutoplayDriver::start(INTERVAL, callback);

    sleep(ms(900)).await;
    driver.reset();
    sleep(ms(998)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    sleep(ms(3)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn stop_is_idempotent() {
    let (fired, callback) = counting();
    let mut driver = AutoplayDriver::start(INTERVAL, callback);

    sleep(ms(500)).await;
    driver.stop();
    driver.stop();
    assert!(driver.is_stopped());
    driver.resume();
    driver.reset();
    sleep(ms(5_000)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_stops_the_countdown() {
    let (fired, callback) = counting();
    let driver = AutoplayDriver::start(INTERVAL, callback);
    drop(driver);
    sleep(ms(3_000)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn failing_callbacks_do_not_stop_autoplay() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let _driver = AutoplayDriver::start(INTERVAL, move || {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        if n % 2 == 0 {
            anyhow::bail!("consumer rejected advance {n}");
        }
        panic!("consumer bug on advance {n}");
    });

    sleep(ms(3_500)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

/// A five-slide carousel whose autoplay runs on a driver. Every driver fire
/// lands on the returned channel, the way a host event loop receives it.
fn driven() -> (Carousel<char>, mpsc::UnboundedReceiver<()>) {
    let items: Arc<[char]> = "ABCDE".chars().collect::<Vec<_>>().into();
    let config = CarouselConfig {
        window_size: 1.0,
        item_stride: 100.0,
        autoplay_ms: None,
        transition_ms: 100,
        ..CarouselConfig::default()
    };
    let mut carousel = Carousel::new(items, config, 100.0, Instant::now().into_std());
    let (tx, rx) = mpsc::unbounded_channel();
    carousel.attach_driver(AutoplayDriver::start(INTERVAL, move || {
        tx.send(()).map_err(|_| anyhow::anyhow!("host loop gone"))
    }));
    (carousel, rx)
}

#[tokio::test(start_paused = true)]
async fn hover_pause_holds_an_attached_driver() {
    let (mut carousel, mut rx) = driven();
    assert!(carousel.has_driver());
    assert!(carousel.autoplay().is_stopped());

    sleep(ms(200)).await;
    carousel.set_paused(true, Instant::now().into_std());
    sleep(ms(3_000)).await;
    assert!(rx.try_recv().is_err());
    // A fire that races the pause is ignored as well.
    assert!(!carousel.auto_advance(Instant::now().into_std()));
    assert_eq!(carousel.logical_index(), Some(0));

    carousel.set_paused(false, Instant::now().into_std());
    sleep(ms(999)).await;
    assert!(rx.try_recv().is_err());
    sleep(ms(2)).await;
    assert!(rx.try_recv().is_ok());
    assert!(carousel.auto_advance(Instant::now().into_std()));
    assert_eq!(carousel.logical_index(), Some(1));
}

#[tokio::test(start_paused = true)]
async fn manual_navigation_resets_an_attached_driver() {
    let (mut carousel, mut rx) = driven();

    sleep(ms(900)).await;
    assert!(carousel.advance(Direction::Forward, Instant::now().into_std()));
    carousel.on_transition_end();

    // No second advance right behind the manual one.
    sleep(ms(200)).await;
    assert!(rx.try_recv().is_err());
    sleep(ms(799)).await;
    assert!(rx.try_recv().is_err());

    sleep(ms(2)).await;
    assert!(rx.try_recv().is_ok());
    assert!(carousel.auto_advance(Instant::now().into_std()));
    assert_eq!(carousel.logical_index(), Some(2));

    carousel.on_transition_end();
    assert!(carousel.jump_to(0, Instant::now().into_std()));
    sleep(ms(999)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn unmount_stops_an_attached_driver() {
    let (mut carousel, mut rx) = driven();
    sleep(ms(500)).await;
    carousel.unmount();
    assert!(!carousel.has_driver());
    sleep(ms(5_000)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn registry_hover_routes_to_the_driver() {
    let (carousel, mut rx) = driven();
    let key = CarouselKey::DestinationHero;
    let mut registry = CarouselRegistry::new();
    registry.get_or_insert_with(key.clone(), || carousel);

    let now = Instant::now().into_std();
    update(&mut registry, CarouselMessage::PointerEnter(key.clone()), now).unwrap();
    sleep(ms(2_500)).await;
    assert!(rx.try_recv().is_err());

    let now = Instant::now().into_std();
    update(&mut registry, CarouselMessage::PointerLeave(key.clone()), now).unwrap();
    sleep(ms(1_001)).await;
    assert!(rx.try_recv().is_ok());
    let now = Instant::now().into_std();
    assert!(update(&mut registry, CarouselMessage::AutoAdvance(key.clone()), now).unwrap());
    assert_eq!(registry.get(&key).unwrap().logical_index(), Some(1));
}
