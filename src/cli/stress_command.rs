use crate::cli::report::{millis, print_json, StressReport};
use crate::cli::{Command, Output};
use keylock::utils::parse_duration;
use keylock::{KeyedLocker, LockError, Locker, Result, Span};
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Default)]
struct Occupancy {
    current: AtomicUsize,
    peak: AtomicUsize,
    acquisitions: AtomicUsize,
}

pub fn execute_stress(cmd: Command, output: Output) -> Result<()> {
    let Command::Stress {
        key,
        threads,
        iterations,
        hold,
    } = cmd
    else {
        return Err(LockError::Other(
            "Internal error: expected Stress command".to_string(),
        ));
    };

    let hold = parse_duration(&hold)?;
    let locker = KeyedLocker::new()?;
    let occupancy = Occupancy::default();

    info!(
        "Stressing key {:?}: {} thread(s) x {} iteration(s)",
        key, threads, iterations
    );

    let start = Instant::now();
    let (shared, key_ref, occupancy_ref) = (&locker, key.as_str(), &occupancy);
    thread::scope(|scope| {
        let workers: Vec<_> = (0..threads)
            .map(move |_| {
                scope.spawn(move || run_worker(shared, key_ref, iterations, hold, occupancy_ref))
            })
            .collect();

        workers.into_iter().try_for_each(|worker| {
            worker
                .join()
                .map_err(|_| LockError::Other("Stress worker panicked".to_string()))?
        })
    })?;
    let elapsed = start.elapsed();

    let peak = occupancy.peak.load(Ordering::SeqCst);
    let acquisitions = occupancy.acquisitions.load(Ordering::SeqCst);
    let remaining = locker.tracked_keys();

    if output.json {
        print_json(&StressReport {
            key: &key,
            acquisitions,
            peak_holders: peak,
            tracked_keys: remaining,
            elapsed_ms: millis(elapsed),
        })?;
    } else if !output.quiet {
        println!("Acquisitions: {}", acquisitions);
        println!("Peak concurrent holders: {}", peak);
        println!("Tracked keys after run: {}", remaining);
        println!("Elapsed: {:?}", elapsed);
    }

    if peak > 1 {
        return Err(LockError::Other(format!(
            "Mutual exclusion violated on {:?}: {} concurrent holders",
            key, peak
        )));
    }
    if remaining != 0 {
        return Err(LockError::Other(format!(
            "Registry still tracks {} key(s) after all locks were released",
            remaining
        )));
    }

    Ok(())
}

fn run_worker<L: Locker>(
    locker: &L,
    key: &str,
    iterations: usize,
    hold: Duration,
    occupancy: &Occupancy,
) -> Result<()> {
    let mut rng = rand::thread_rng();

    for _ in 0..iterations {
        let handle = locker.acquire_lock(key, Span::Infinite)?;

        let holders = occupancy.current.fetch_add(1, Ordering::SeqCst) + 1;
        occupancy.peak.fetch_max(holders, Ordering::SeqCst);
        occupancy.acquisitions.fetch_add(1, Ordering::SeqCst);

        if !hold.is_zero() {
            let micros = rng.gen_range(0..=hold_micros(hold));
            thread::sleep(Duration::from_micros(micros));
        }

        occupancy.current.fetch_sub(1, Ordering::SeqCst);
        handle.release();
    }

    debug!("Stress worker finished on {:?}", key);
    Ok(())
}

/// Upper bound of the random hold time in microseconds, saturating at `u64::MAX`
fn hold_micros(hold: Duration) -> u64 {
    u64::try_from(hold.as_micros()).unwrap_or(u64::MAX)
}
