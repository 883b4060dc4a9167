use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use debouncer::Debouncer;
use debouncer::ManualVisibility;
use debouncer::TokioTimer;
use tokio::task::LocalSet;
use tokio::time::sleep;

use crate::enable_logger;

#[tokio::test(start_paused = true)]
async fn trailing_debounce_on_tokio_local_set() {
    enable_logger();
    let local = LocalSet::new();
    local
        .run_until(async {
            let timer = TokioTimer::new();
            let runs = Rc::new(Cell::new(0u32));
            let last = Rc::new(Cell::new(0u32));

            let (r, l) = (Rc::clone(&runs), Rc::clone(&last));
            let debounced: Debouncer<u32, ()> = Debouncer::builder(Rc::new(timer.clone()))
                .callable(move |_, n: u32| {
                    r.set(r.get() + 1);
                    l.set(n);
                })
                .wait_ms(100)
                .build()
                .unwrap();

            for n in 1..=4 {
                debounced.call(n);
                sleep(Duration::from_millis(50)).await;
            }
            assert_eq!(runs.get(), 0);

            sleep(Duration::from_millis(60)).await;
            assert_eq!(runs.get(), 1);
            assert_eq!(last.get(), 4);
            assert_eq!(timer.pending_count(), 0);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn clear_cancels_tokio_timer() {
    enable_logger();
    let local = LocalSet::new();
    local
        .run_until(async {
            let timer = TokioTimer::new();
            let runs = Rc::new(Cell::new(0u32));

            let r = Rc::clone(&runs);
            let debounced: Debouncer<(), ()> = Debouncer::builder(Rc::new(timer.clone()))
                .callable(move |_, ()| r.set(r.get() + 1))
                .build()
                .unwrap();

            debounced.call(());
            debounced.clear();
            assert_eq!(timer.pending_count(), 0);

            sleep(Duration::from_millis(500)).await;
            assert_eq!(runs.get(), 0);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn hidden_host_fires_before_deadline() {
    enable_logger();
    let local = LocalSet::new();
    local
        .run_until(async {
            let timer = TokioTimer::new();
            let visibility = Rc::new(ManualVisibility::new());
            let runs = Rc::new(Cell::new(0u32));

            let r = Rc::clone(&runs);
            let debounced: Debouncer<(), ()> = Debouncer::builder(Rc::new(timer.clone()))
                .callable(move |_, ()| r.set(r.get() + 1))
                .wait(Duration::from_secs(10))
                .visibility(visibility.clone())
                .build()
                .unwrap();

            debounced.call(());
            sleep(Duration::from_millis(10)).await;
            visibility.set_hidden(true);

            assert_eq!(runs.get(), 1);
            assert_eq!(timer.pending_count(), 0);

            sleep(Duration::from_secs(20)).await;
            assert_eq!(runs.get(), 1);
        })
        .await;
}
