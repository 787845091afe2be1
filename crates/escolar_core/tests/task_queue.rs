use escolar_core::service::tasks::TaskQueue;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[test]
fn submitted_job_runs_and_reports_ok() {
    let queue = TaskQueue::new(2);
    let ran = Arc::new(AtomicUsize::new(0));

    let marker = Arc::clone(&ran);
    let handle = queue.submit("respaldo", move || {
        marker.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    assert_eq!(handle.label(), "respaldo");

    let outcome = handle.wait().unwrap();
    assert_eq!(outcome.label, "respaldo");
    assert_eq!(outcome.result, Ok(()));
    assert_eq!(ran.load(Ordering::SeqCst), 1);
}

#[test]
fn failing_job_reports_its_error() {
    let queue = TaskQueue::new(1);

    let handle = queue.submit("exportar", || Err("disco lleno".to_string()));

    let outcome = handle.wait().unwrap();
    assert_eq!(outcome.result, Err("disco lleno".to_string()));
}

#[test]
fn many_jobs_complete_across_workers() {
    let queue = TaskQueue::new(4);
    let counter = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..20)
        .map(|index| {
            let counter = Arc::clone(&counter);
            queue.submit(format!("tarea-{index}"), move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.wait().unwrap().result.is_ok());
    }

    assert_eq!(counter.load(Ordering::SeqCst), 20);
    assert_eq!(queue.pending_count(), 0);
}

#[test]
fn single_worker_preserves_submission_order() {
    let queue = TaskQueue::new(1);
    let order = Arc::new(Mutex::new(Vec::new()));

    let handles: Vec<_> = (0..5)
        .map(|index| {
            let order = Arc::clone(&order);
            queue.submit(format!("tarea-{index}"), move || {
                order.lock().unwrap().push(index);
                Ok(())
            })
        })
        .collect();

    for handle in handles {
        handle.wait().unwrap();
    }

    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
}

#[test]
fn dropping_the_queue_drains_pending_jobs() {
    let queue = TaskQueue::new(1);
    let counter = Arc::new(AtomicUsize::new(0));

    // Occupy the only worker so the rest stack up as pending.
    let blocker = Arc::clone(&counter);
    queue.submit("lenta", move || {
        thread::sleep(Duration::from_millis(50));
        blocker.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    for index in 0..3 {
        let counter = Arc::clone(&counter);
        queue.submit(format!("pendiente-{index}"), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
    }

    drop(queue);

    assert_eq!(counter.load(Ordering::SeqCst), 4);
}

#[test]
fn dropped_handles_do_not_poison_the_queue() {
    let queue = TaskQueue::new(1);

    // Nobody waits on this one.
    drop(queue.submit("olvidada", || Ok(())));

    let outcome = queue.submit("atendida", || Ok(())).wait().unwrap();
    assert_eq!(outcome.result, Ok(()));
}

#[test]
fn zero_workers_is_clamped_to_one() {
    let queue = TaskQueue::new(0);

    let outcome = queue.submit("minima", || Ok(())).wait().unwrap();
    assert_eq!(outcome.result, Ok(()));
}
