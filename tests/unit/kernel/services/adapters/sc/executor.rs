use super::*;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

fn create_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap()
}

#[test]
fn completes_within_bound() {
    let rt = create_runtime();
    let executor = TimeoutExecutor::new();
    let outcome = rt.block_on(executor.run(Duration::from_secs(2), |_cancel| {
        std::thread::sleep(Duration::from_millis(50));
        21 * 2
    }));
    assert_eq!(outcome, Outcome::Completed(42));
    assert_eq!(executor.in_flight(), 0);
}

#[test]
fn times_out_without_waiting_for_the_operation() {
    let rt = create_runtime();
    let executor = TimeoutExecutor::new();
    let started = Instant::now();
    let outcome = rt.block_on(executor.run(Duration::from_millis(100), |_cancel| {
        std::thread::sleep(Duration::from_secs(2));
        1
    }));
    assert_eq!(outcome, Outcome::TimedOut);
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(executor.in_flight(), 1);
}

#[test]
fn operation_error_is_a_completed_payload() {
    let rt = create_runtime();
    let executor = TimeoutExecutor::new();
    let outcome: Outcome<Result<(), String>> = rt.block_on(
        executor.run(Duration::from_secs(1), |_cancel| Err("boom".to_string())),
    );
    assert_eq!(outcome, Outcome::Completed(Err("boom".to_string())));
}

#[test]
fn panic_is_reported_separately() {
    let rt = create_runtime();
    let executor = TimeoutExecutor::new();
    let outcome: Outcome<()> =
        rt.block_on(executor.run(Duration::from_secs(1), |_cancel| panic!("backend bug")));
    assert!(matches!(outcome, Outcome::Panicked(_)));
    assert!(!outcome.is_completed());
    assert_eq!(executor.in_flight(), 0);
}

#[test]
fn timed_out_operation_sees_cancellation() {
    let rt = create_runtime();
    let executor = TimeoutExecutor::new();
    let observed = Arc::new(AtomicBool::new(false));
    let observed_in_op = Arc::clone(&observed);

    let outcome = rt.block_on(executor.run(Duration::from_millis(50), move |cancel| {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if cancel.is_cancelled() {
                observed_in_op.store(true, Ordering::SeqCst);
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }));
    assert_eq!(outcome, Outcome::TimedOut);

    let deadline = Instant::now() + Duration::from_secs(2);
    while executor.in_flight() > 0 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
    assert!(observed.load(Ordering::SeqCst));
    assert_eq!(executor.in_flight(), 0);
}

#[test]
fn completed_accessor() {
    assert_eq!(Outcome::Completed(3).completed(), Some(3));
    assert_eq!(Outcome::<i32>::TimedOut.completed(), None);
    assert_eq!(Outcome::<i32>::Panicked("x".into()).completed(), None);
}
