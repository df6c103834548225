//! Line sources
//!
//! A [`LineSource`] hands out one raw line per call and reports timeouts and
//! end-of-stream as distinct events. [`Lines`] turns any source into a lazy,
//! non-restartable iterator that only ends when the underlying stream closes.

use std::collections::VecDeque;
use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// What a single read produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// A raw line, line terminator included if the stream had one
    Line(String),
    /// Nothing arrived within the read timeout
    Timeout,
    /// The stream was closed
    EndOfStream,
}

pub trait LineSource {
    fn next_line(&mut self) -> io::Result<LineEvent>;
}

impl<S: LineSource + ?Sized> LineSource for Box<S> {
    fn next_line(&mut self) -> io::Result<LineEvent> {
        (**self).next_line()
    }
}

/// Blocking source over any buffered reader; never times out
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn next_line(&mut self) -> io::Result<LineEvent> {
        match read_raw_line(&mut self.reader)? {
            Some(line) => Ok(LineEvent::Line(line)),
            None => Ok(LineEvent::EndOfStream),
        }
    }
}

/// Read one line as raw bytes, replacing invalid UTF-8 with U+FFFD
///
/// Serial noise must reach the parser as an ordinary malformed line rather
/// than abort the stream. Returns `None` at end-of-stream.
fn read_raw_line<R: BufRead + ?Sized>(reader: &mut R) -> io::Result<Option<String>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }

    let line = match String::from_utf8(buf) {
        Ok(line) => line,
        Err(e) => {
            debug!("line is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };
    Ok(Some(line))
}

/// Source with a per-read timeout
///
/// A reader thread forwards lines over a channel so the consumer can wait
/// with a deadline. The thread exits at end-of-stream, on a read error, or
/// once the source is dropped and its next send fails.
pub struct TimedSource {
    rx: Receiver<io::Result<String>>,
    timeout: Duration,
    _reader: JoinHandle<()>,
}

impl TimedSource {
    pub fn spawn<R>(mut reader: R, timeout: Duration) -> io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("line-reader".to_string())
            .spawn(move || loop {
                match read_raw_line(&mut reader) {
                    Ok(None) => break,
                    Ok(Some(line)) => {
                        if tx.send(Ok(line)).is_err() {
                            break;
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        let _ = tx.send(Err(e));
                        break;
                    }
                }
            })?;

        Ok(Self {
            rx,
            timeout,
            _reader: handle,
        })
    }
}

impl LineSource for TimedSource {
    fn next_line(&mut self) -> io::Result<LineEvent> {
        match self.rx.recv_timeout(self.timeout) {
            Ok(Ok(line)) => Ok(LineEvent::Line(line)),
            Ok(Err(e)) => Err(e),
            Err(RecvTimeoutError::Timeout) => Ok(LineEvent::Timeout),
            Err(RecvTimeoutError::Disconnected) => Ok(LineEvent::EndOfStream),
        }
    }
}

/// Source replaying a fixed list of events, then end-of-stream
#[derive(Debug, Default, Clone)]
pub struct ScriptedSource {
    events: VecDeque<LineEvent>,
}

impl ScriptedSource {
    pub fn new(events: impl IntoIterator<Item = LineEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(lines.into_iter().map(|l| LineEvent::Line(l.into())))
    }
}

impl LineSource for ScriptedSource {
    fn next_line(&mut self) -> io::Result<LineEvent> {
        Ok(self.events.pop_front().unwrap_or(LineEvent::EndOfStream))
    }
}

/// Lazy iterator over the lines of a source
///
/// Timeouts are logged and waited through. Iteration ends at end-of-stream
/// or after yielding a read error.
pub struct Lines<S> {
    source: S,
    finished: bool,
    timeouts: u64,
}

impl<S: LineSource> Lines<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            finished: false,
            timeouts: 0,
        }
    }

    /// Number of reads that timed out so far
    pub fn timeouts(&self) -> u64 {
        self.timeouts
    }
}

impl<S: LineSource> Iterator for Lines<S> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            match self.source.next_line() {
                Ok(LineEvent::Line(line)) => return Some(Ok(line)),
                Ok(LineEvent::Timeout) => {
                    self.timeouts += 1;
                    debug!(timeouts = self.timeouts, "no line within read timeout");
                }
                Ok(LineEvent::EndOfStream) => {
                    self.finished = true;
                    return None;
                }
                Err(e) => {
                    warn!("line source failed: {}", e);
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<S: LineSource> std::iter::FusedIterator for Lines<S> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reader_source() {
        let mut source = ReaderSource::new(Cursor::new("a,b\r\nc\n"));
        assert_eq!(source.next_line().unwrap(), LineEvent::Line("a,b\r\n".to_string()));
        assert_eq!(source.next_line().unwrap(), LineEvent::Line("c\n".to_string()));
        assert_eq!(source.next_line().unwrap(), LineEvent::EndOfStream);
    }

    #[test]
    fn test_reader_source_tolerates_invalid_utf8() {
        let input: &[u8] = b"0,0,0,0,0,0,0\r\n\xff\xfe noise\r\n1,1,1,1,1,1,1\r\n";
        let lines: Vec<String> = Lines::new(ReaderSource::new(input))
            .map(|l| l.unwrap())
            .collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "\u{FFFD}\u{FFFD} noise\r\n");
        assert_eq!(lines[2], "1,1,1,1,1,1,1\r\n");
    }

    #[test]
    fn test_timed_source_tolerates_invalid_utf8() {
        let input = b"\xff\r\n4,5,6\n".to_vec();
        let source = TimedSource::spawn(Cursor::new(input), Duration::from_secs(5)).unwrap();
        let lines: Vec<String> = Lines::new(source).map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["\u{FFFD}\r\n".to_string(), "4,5,6\n".to_string()]);
    }

    #[test]
    fn test_lines_skip_timeouts() {
        let source = ScriptedSource::new(vec![
            LineEvent::Timeout,
            LineEvent::Line("first".to_string()),
            LineEvent::Timeout,
            LineEvent::Timeout,
            LineEvent::Line("second".to_string()),
        ]);
        let mut lines = Lines::new(source);

        assert_eq!(lines.next().unwrap().unwrap(), "first");
        assert_eq!(lines.next().unwrap().unwrap(), "second");
        assert!(lines.next().is_none());
        assert!(lines.next().is_none());
        assert_eq!(lines.timeouts(), 3);
    }

    struct FailingSource;

    impl LineSource for FailingSource {
        fn next_line(&mut self) -> io::Result<LineEvent> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }
    }

    #[test]
    fn test_lines_stop_after_error() {
        let mut lines = Lines::new(FailingSource);
        assert!(lines.next().unwrap().is_err());
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_timed_source_reads_until_end() {
        let reader = Cursor::new("1,2,3\n4,5,6\n");
        let source = TimedSource::spawn(reader, Duration::from_secs(5)).unwrap();
        let lines: Vec<String> = Lines::new(source).map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["1,2,3\n".to_string(), "4,5,6\n".to_string()]);
    }

    #[test]
    fn test_timed_source_reports_timeout() {
        // a reader that blocks longer than the timeout before closing
        struct SlowReader;

        impl io::Read for SlowReader {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                thread::sleep(Duration::from_millis(300));
                Ok(0)
            }
        }

        let reader = io::BufReader::new(SlowReader);
        let mut source = TimedSource::spawn(reader, Duration::from_millis(20)).unwrap();
        assert_eq!(source.next_line().unwrap(), LineEvent::Timeout);

        let mut event = source.next_line().unwrap();
        while event == LineEvent::Timeout {
            event = source.next_line().unwrap();
        }
        assert_eq!(event, LineEvent::EndOfStream);
    }
}
