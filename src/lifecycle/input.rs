//! Line input read off the runtime.
//!
//! Tokio's stdin parks a blocking read on the runtime's blocking pool, and
//! runtime shutdown waits for it. Reading on a detached OS thread lets the
//! process exit while a read is still pending.

use std::io::{self, BufRead};
use std::thread;

use tokio::sync::mpsc;

/// Read lines from `reader` on a dedicated thread.
///
/// The channel closes at end of input, after a read error (which is sent
/// first), or once the receiver is dropped and the next line arrives.
pub fn spawn_line_reader<R>(reader: R) -> io::Result<mpsc::UnboundedReceiver<io::Result<String>>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    thread::Builder::new()
        .name("line-reader".into())
        .spawn(move || {
            for line in reader.lines() {
                let failed = line.is_err();
                if tx.send(line).is_err() || failed {
                    break;
                }
            }
        })?;
    Ok(rx)
}

/// [`spawn_line_reader`] over the process's stdin.
pub fn stdin_lines() -> io::Result<mpsc::UnboundedReceiver<io::Result<String>>> {
    spawn_line_reader(io::BufReader::new(io::stdin()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use std::sync::mpsc as std_mpsc;
    use std::time::{Duration, Instant};

    /// Blocks every read until the paired sender is dropped.
    struct Stalled(std_mpsc::Receiver<()>);

    impl Read for Stalled {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            let _ = self.0.recv();
            Ok(0)
        }
    }

    #[tokio::test]
    async fn yields_lines_then_closes() {
        let mut lines = spawn_line_reader(Cursor::new("abc:1\n\nxyz\n")).unwrap();
        assert_eq!(lines.recv().await.unwrap().unwrap(), "abc:1");
        assert_eq!(lines.recv().await.unwrap().unwrap(), "");
        assert_eq!(lines.recv().await.unwrap().unwrap(), "xyz");
        assert!(lines.recv().await.is_none());
    }

    #[test]
    fn pending_read_does_not_block_runtime_shutdown() {
        let (_hold, stall) = std_mpsc::channel::<()>();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();

        let mut lines = runtime.block_on(async {
            spawn_line_reader(io::BufReader::new(Stalled(stall))).unwrap()
        });
        let waited = runtime.block_on(async {
            tokio::time::timeout(Duration::from_millis(50), lines.recv()).await
        });
        assert!(waited.is_err());

        let started = Instant::now();
        drop(lines);
        drop(runtime);
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
