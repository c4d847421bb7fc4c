use crate::cli::report::{millis, print_json, ExpireReport};
use crate::cli::{Command, Output};
use keylock::utils::parse_span;
use keylock::{KeyedLocker, LockError, Result, Span};
use std::time::Instant;
use tracing::info;

pub fn execute_expire(cmd: Command, output: Output) -> Result<()> {
    let Command::Expire {
        key,
        expiration,
        timeout,
    } = cmd
    else {
        return Err(LockError::Other(
            "Internal error: expected Expire command".to_string(),
        ));
    };

    let expiration = parse_span(&expiration)?;
    let timeout = parse_span(&timeout)?;

    if expiration.is_infinite() && timeout.is_infinite() {
        return Err(LockError::Other(
            "Refusing to wait forever on a lock that never expires".to_string(),
        ));
    }

    let locker = KeyedLocker::new()?;

    // Never released explicitly; only the expiration can free it
    let holder = locker.acquire_lock(&key, expiration)?;
    info!("Holding {:?} (expiration: {})", key, expiration);

    let start = Instant::now();
    let waiter = locker.try_acquire_lock(&key, timeout, Span::Infinite);
    let elapsed = start.elapsed();

    let Some(waiter) = waiter else {
        if output.json {
            print_json(&ExpireReport {
                key: &key,
                acquired: false,
                holder_released: None,
                elapsed_ms: millis(elapsed),
            })?;
        }
        drop(holder);
        return Err(LockError::lock_timeout(
            key,
            timeout.as_duration().unwrap_or(elapsed),
        ));
    };

    if output.json {
        print_json(&ExpireReport {
            key: &key,
            acquired: true,
            holder_released: Some(holder.is_released()),
            elapsed_ms: millis(elapsed),
        })?;
    } else if !output.quiet {
        println!("Acquired {:?} after {:?}", key, elapsed);
        println!("First holder released by expiration: {}", holder.is_released());
    }

    waiter.release();
    Ok(())
}
