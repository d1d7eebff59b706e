//! End-to-end pool scenarios
//!
//! Longer sequences mixing acquire, release, wrapper close and pool close,
//! including callers on several threads hitting one pool at once.

#[cfg(test)]
mod scenario_tests {
    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use qpool::{PoolConfig, QueuePool};
    use rstest::*;
    use std::io;
    use std::net::TcpStream;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use crate::fixtures::{EchoServer, echo_server, round_trip};

    #[rstest]
    fn test_three_acquires_two_slots(echo_server: EchoServer) -> Result<()> {
        let pool = echo_server.pool(0, 2)?;

        let conns = (0..3).map(|_| pool.acquire()).collect::<Result<Vec<_>, _>>()?;
        echo_server.wait_accepted(3)?;
        assert_eq!(pool.count(), 0);

        for conn in conns {
            pool.release(conn)?;
        }

        assert_eq!(pool.count(), 2);
        echo_server.wait_disconnected(1)?;
        assert_eq!(echo_server.disconnected(), 1);
        Ok(())
    }

    #[rstest]
    fn test_third_dial_fails_during_warm_up(echo_server: EchoServer) -> Result<()> {
        let calls = Arc::new(AtomicUsize::new(0));
        let connector = echo_server.connector();
        let counter = calls.clone();
        let factory = move || -> io::Result<TcpStream> {
            if counter.fetch_add(1, Ordering::SeqCst) == 2 {
                return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "third dial"));
            }
            qpool::ConnectionFactory::create(&connector)
        };

        let (pool, errors) = QueuePool::new(PoolConfig::new(5, 10), factory);

        assert_eq!(pool.count(), 4);
        assert_eq!(errors.map(|e| e.len()), Some(1));
        echo_server.wait_accepted(4)?;
        Ok(())
    }

    #[rstest]
    fn test_concurrent_reusable_round_trips(echo_server: EchoServer) -> Result<()> {
        const THREADS: usize = 8;
        const ROUNDS: usize = 25;
        let pool = echo_server.pool(2, 4)?;

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let pool = pool.clone();
                thread::spawn(move || -> Result<()> {
                    for round in 0..ROUNDS {
                        let mut conn = pool.acquire_reusable()?;
                        let payload = format!("t{}-r{}", t, round);
                        let echoed = round_trip(&mut conn, payload.as_bytes())?;
                        assert_eq!(echoed, payload.as_bytes());
                        conn.set_usable();
                        conn.close()?;
                    }
                    Ok(())
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker panicked")?;
        }

        assert!(pool.count() <= 4);
        assert!(echo_server.accepted() >= 2);

        // Surplus streams were closed on release, the rest go on close
        pool.close()?;
        echo_server.wait_disconnected(echo_server.accepted())?;
        Ok(())
    }

    #[rstest]
    fn test_close_while_workers_release(echo_server: EchoServer) -> Result<()> {
        let pool = echo_server.pool(0, 16)?;
        let conns = (0..8).map(|_| pool.acquire()).collect::<Result<Vec<_>, _>>()?;
        echo_server.wait_accepted(8)?;

        let handles: Vec<_> = conns
            .into_iter()
            .map(|conn| {
                let pool = pool.clone();
                thread::spawn(move || pool.release(conn))
            })
            .collect();
        pool.close()?;
        for handle in handles {
            handle.join().expect("worker panicked")?;
        }

        // Whichever side won the race, every socket ends up closed
        echo_server.wait_disconnected(8)?;
        assert_eq!(pool.count(), 0);
        Ok(())
    }
}
