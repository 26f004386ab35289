use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use bytes::BytesMut;
use tracing::trace;

use crate::config::DEFAULT_POLL_INTERVAL;
use crate::error::{Result, TransportError};

const READ_CHUNK_SIZE: usize = 256;

/// Byte-level send/receive over a duplex stream, with deadlines.
///
/// Owns the physical byte stream and nothing else: no framing, no retry,
/// no protocol knowledge. Receiving accumulates bytes until a
/// caller-supplied predicate is satisfied or the deadline elapses.
pub struct Channel<P> {
    port: P,
    poll_interval: Duration,
}

impl<P: Read + Write> Channel<P> {
    /// Create a channel over `port` with the default poll interval.
    pub fn new(port: P) -> Self {
        Self::with_poll_interval(port, DEFAULT_POLL_INTERVAL)
    }

    /// Create a channel with an explicit poll interval.
    ///
    /// The poll interval bounds how long a single blocking read may take
    /// when no bytes arrive, so a deadline is overshot by at most one
    /// interval.
    pub fn with_poll_interval(port: P, poll_interval: Duration) -> Self {
        Self {
            port,
            poll_interval,
        }
    }

    /// Write all bytes to the stream.
    pub fn send(&mut self, bytes: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < bytes.len() {
            match self.port.write(&bytes[offset..]) {
                Ok(0) => {
                    return Err(TransportError::Io(std::io::Error::new(
                        ErrorKind::WriteZero,
                        "stream accepted no bytes",
                    )))
                }
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                // Non-blocking writer with a full buffer; back off for
                // one poll interval instead of spinning.
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    std::thread::sleep(self.poll_interval)
                }
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
        match self.port.flush() {
            Ok(()) => {
                trace!(len = bytes.len(), "sent");
                Ok(())
            }
            Err(err) => Err(TransportError::Io(err)),
        }
    }

    /// Accumulate bytes into `buf` until `predicate` succeeds or
    /// `deadline` elapses.
    ///
    /// The predicate is re-checked after every read (and once up front,
    /// so bytes left over from an earlier call count). Waiting blocks on
    /// the stream for at most one poll interval per read; it never
    /// busy-spins.
    pub fn receive_until<F>(&mut self, buf: &mut BytesMut, predicate: F, deadline: Instant) -> Result<()>
    where
        F: Fn(&[u8]) -> bool,
    {
        let started = Instant::now();
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            if predicate(buf) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(TransportError::Timeout {
                    waited: started.elapsed(),
                });
            }
            match self.port.read(&mut chunk) {
                Ok(0) => std::thread::sleep(self.poll_interval),
                Ok(n) => {
                    trace!(len = n, "received");
                    buf.extend_from_slice(&chunk[..n]);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                // The port's own read timeout expired without data; the
                // outer deadline decides when to give up.
                Err(err)
                    if err.kind() == ErrorKind::TimedOut || err.kind() == ErrorKind::WouldBlock =>
                {
                    std::thread::sleep(self.poll_interval)
                }
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &P {
        &self.port
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Consume the channel and return the inner stream.
    pub fn into_inner(self) -> P {
        self.port
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Delivers scripted byte chunks, one per read call.
    struct ScriptedReader {
        chunks: Vec<Vec<u8>>,
        written: Vec<u8>,
    }

    impl ScriptedReader {
        fn new(chunks: Vec<Vec<u8>>) -> Self {
            Self {
                chunks,
                written: Vec::new(),
            }
        }
    }

    impl Read for ScriptedReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.chunks.is_empty() {
                return Err(std::io::Error::from(ErrorKind::TimedOut));
            }
            let chunk = self.chunks.remove(0);
            buf[..chunk.len()].copy_from_slice(&chunk);
            Ok(chunk.len())
        }
    }

    impl Write for ScriptedReader {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn receive_accumulates_across_reads() {
        let port = ScriptedReader::new(vec![vec![0x7E, 0x00], vec![0xD1], vec![0x00, 0x2E, 0x7E]]);
        let mut channel = Channel::new(port);
        let mut buf = BytesMut::new();
        channel
            .receive_until(
                &mut buf,
                |bytes| bytes.len() >= 6,
                Instant::now() + Duration::from_millis(100),
            )
            .unwrap();
        assert_eq!(buf.as_ref(), &[0x7E, 0x00, 0xD1, 0x00, 0x2E, 0x7E]);
    }

    #[test]
    fn predicate_checked_before_first_read() {
        // Leftover bytes from an earlier exchange satisfy the predicate
        // without touching the stream.
        let port = ScriptedReader::new(vec![]);
        let mut channel = Channel::new(port);
        let mut buf = BytesMut::from(&[0x01, 0x02][..]);
        channel
            .receive_until(
                &mut buf,
                |bytes| bytes.len() >= 2,
                Instant::now() + Duration::from_millis(5),
            )
            .unwrap();
    }

    #[test]
    fn silent_stream_times_out_near_deadline() {
        let port = ScriptedReader::new(vec![]);
        let mut channel = Channel::new(port);
        let mut buf = BytesMut::new();
        let budget = Duration::from_millis(30);
        let started = Instant::now();
        let err = channel
            .receive_until(&mut buf, |_| false, started + budget)
            .unwrap_err();
        let elapsed = started.elapsed();
        assert!(matches!(err, TransportError::Timeout { .. }));
        assert!(elapsed >= budget, "gave up early: {elapsed:?}");
        assert!(
            elapsed < budget + Duration::from_millis(50),
            "overshot deadline: {elapsed:?}"
        );
    }

    #[test]
    fn send_writes_all_bytes() {
        let port = ScriptedReader::new(vec![]);
        let mut channel = Channel::new(port);
        channel.send(&[0x7E, 0x00, 0xD1, 0x00, 0x2E, 0x7E]).unwrap();
        assert_eq!(
            channel.get_ref().written,
            vec![0x7E, 0x00, 0xD1, 0x00, 0x2E, 0x7E]
        );
    }

    #[test]
    fn send_handles_partial_writes() {
        struct OneBytePort(Vec<u8>);
        impl Read for OneBytePort {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(ErrorKind::TimedOut))
            }
        }
        impl Write for OneBytePort {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.push(buf[0]);
                Ok(1)
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut channel = Channel::new(OneBytePort(Vec::new()));
        channel.send(&[1, 2, 3, 4]).unwrap();
        assert_eq!(channel.get_ref().0, vec![1, 2, 3, 4]);
    }

    #[test]
    fn blocked_writer_backs_off_instead_of_spinning() {
        struct FullThenReady {
            rejections: u8,
            written: Vec<u8>,
        }
        impl Read for FullThenReady {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(ErrorKind::TimedOut))
            }
        }
        impl Write for FullThenReady {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                if self.rejections > 0 {
                    self.rejections -= 1;
                    return Err(std::io::Error::from(ErrorKind::WouldBlock));
                }
                self.written.extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let port = FullThenReady {
            rejections: 3,
            written: Vec::new(),
        };
        let mut channel = Channel::with_poll_interval(port, Duration::from_millis(5));
        let started = Instant::now();
        channel.send(&[0x7E, 0x00, 0x7E]).unwrap();
        assert_eq!(channel.get_ref().written, vec![0x7E, 0x00, 0x7E]);
        // One poll interval slept per rejected write.
        assert!(
            started.elapsed() >= Duration::from_millis(15),
            "no backoff: {:?}",
            started.elapsed()
        );
    }

    #[test]
    fn interrupted_read_is_retried() {
        struct InterruptedThenData {
            state: u8,
        }
        impl Read for InterruptedThenData {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if self.state == 0 {
                    self.state = 1;
                    return Err(std::io::Error::from(ErrorKind::Interrupted));
                }
                buf[0] = 0xAB;
                Ok(1)
            }
        }
        impl Write for InterruptedThenData {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut channel = Channel::new(InterruptedThenData { state: 0 });
        let mut buf = BytesMut::new();
        channel
            .receive_until(
                &mut buf,
                |bytes| !bytes.is_empty(),
                Instant::now() + Duration::from_millis(100),
            )
            .unwrap();
        assert_eq!(buf.as_ref(), &[0xAB]);
    }

    #[test]
    fn broken_stream_surfaces_io_error() {
        struct BrokenPort;
        impl Read for BrokenPort {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(ErrorKind::BrokenPipe))
            }
        }
        impl Write for BrokenPort {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(ErrorKind::BrokenPipe))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut channel = Channel::new(BrokenPort);
        let mut buf = BytesMut::new();
        let err = channel
            .receive_until(&mut buf, |_| false, Instant::now() + Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, TransportError::Io(_)));

        let err = channel.send(&[0x00]).unwrap_err();
        assert!(matches!(err, TransportError::Io(_)));
    }
}
