//! PadSession: drives snapshots through the pipeline into a report sink.

use crate::input::{SnapshotSource, SourceError};
use crate::output::{ReportSink, TransportError};
use crate::pipeline::ReportPipeline;
use crate::time::Millis;
use pad_proto::GamepadSnapshot;

/// One controller-to-host session: a snapshot source, the translation
/// pipeline, and a report sink.
///
/// The session is strictly lossy: a tick whose sink is not ready drops that
/// tick's report and recomputes from fresh state on the next tick. Nothing
/// is queued.
///
/// # Error Handling
///
/// On a source error the session processes a neutral snapshot instead, so a
/// broken input subsystem cannot leave stale controls pressed on the host.
pub struct PadSession<S, K> {
    pipeline: ReportPipeline,
    source: S,
    sink: K,
}

impl<S: SnapshotSource, K: ReportSink> PadSession<S, K> {
    /// Create a session from a pipeline, a source, and a sink.
    pub fn new(pipeline: ReportPipeline, source: S, sink: K) -> Self {
        Self {
            pipeline,
            source,
            sink,
        }
    }

    /// Run the session indefinitely, reading the clock once per tick.
    ///
    /// This method never returns under normal operation.
    pub async fn run<F: Fn() -> Millis>(&mut self, clock: F) -> ! {
        loop {
            let _ = self.tick_once(clock()).await;
        }
    }

    /// Process a single tick at the given clock reading.
    ///
    /// Returns the result of the operation for testing purposes.
    pub async fn tick_once(&mut self, now: Millis) -> Result<(), SessionError> {
        let (snapshot, source_result) = match self.source.next().await {
            Ok(snapshot) => (snapshot, Ok(())),
            Err(e) => {
                // Process a neutral snapshot to prevent stale inputs
                (GamepadSnapshot::neutral(), Err(SessionError::Source(e)))
            }
        };

        let report = self.pipeline.process_tick(&snapshot, now);

        if !self.sink.is_ready() {
            // Skip this tick, no queueing
            return source_result.and(Err(SessionError::Transport(TransportError::Dropped)));
        }

        self.sink
            .send(&report)
            .await
            .map_err(SessionError::Transport)?;
        source_result
    }

    /// Parse a host-originated output report for this session's protocol.
    pub fn parse_output_report(&self, buf: &[u8]) -> Option<pad_proto::RumbleCommand> {
        self.pipeline.parse_output_report(buf)
    }

    /// Get a reference to the pipeline.
    pub fn pipeline(&self) -> &ReportPipeline {
        &self.pipeline
    }

    /// Get a mutable reference to the snapshot source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Get a mutable reference to the report sink.
    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    /// Decompose the session into its parts.
    pub fn into_parts(self) -> (ReportPipeline, S, K) {
        (self.pipeline, self.source, self.sink)
    }
}

/// Error type for session ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError {
    /// Error from the snapshot source.
    Source(SourceError),
    /// Error from the report transport.
    Transport(TransportError),
}

impl core::fmt::Display for SessionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Source(e) => write!(f, "source: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::pipeline::PipelineConfig;
    use core::future::Future;
    use core::pin::Pin;
    use core::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};
    use pad_proto::{AssembledReport, Buttons};
    use std::sync::{Arc, Mutex};
    use std::vec;
    use std::vec::Vec;

    // Simple mock snapshot source
    struct MockSource {
        snapshots: Vec<Result<GamepadSnapshot, SourceError>>,
        index: usize,
    }

    impl MockSource {
        fn new(snapshots: Vec<Result<GamepadSnapshot, SourceError>>) -> Self {
            Self {
                snapshots,
                index: 0,
            }
        }
    }

    impl SnapshotSource for MockSource {
        fn next(&mut self) -> impl Future<Output = Result<GamepadSnapshot, SourceError>> {
            let result = if self.index < self.snapshots.len() {
                let r = self.snapshots[self.index];
                self.index += 1;
                r
            } else {
                Err(SourceError::Disconnected)
            };
            core::future::ready(result)
        }

        fn is_connected(&self) -> bool {
            self.index < self.snapshots.len()
        }
    }

    // Simple mock report sink
    struct MockSink {
        sent: Arc<Mutex<Vec<AssembledReport>>>,
        ready: bool,
    }

    impl MockSink {
        fn new() -> Self {
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
                ready: true,
            }
        }
    }

    impl ReportSink for MockSink {
        fn send(&mut self, report: &AssembledReport) -> impl Future<Output = Result<(), TransportError>> {
            self.sent.lock().unwrap().push(*report);
            core::future::ready(Ok(()))
        }

        fn is_ready(&self) -> bool {
            self.ready
        }
    }

    // Helper to run a future to completion (simple blocking executor)
    fn block_on<F: Future>(mut f: F) -> F::Output {
        fn noop_raw_waker() -> RawWaker {
            fn noop(_: *const ()) {}
            fn clone(_: *const ()) -> RawWaker {
                noop_raw_waker()
            }
            static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, noop, noop, noop);
            RawWaker::new(core::ptr::null(), &VTABLE)
        }

        let waker = unsafe { Waker::from_raw(noop_raw_waker()) };
        let mut cx = Context::from_waker(&waker);

        // SAFETY: We don't move f after pinning
        let mut f = unsafe { Pin::new_unchecked(&mut f) };

        loop {
            match f.as_mut().poll(&mut cx) {
                Poll::Ready(result) => return result,
                Poll::Pending => {
                    panic!("Mock future returned Pending unexpectedly");
                }
            }
        }
    }

    fn neutral_minimal_report() -> AssembledReport {
        let mut pipeline = ReportPipeline::new(PipelineConfig::minimal());
        pipeline.process_tick(&GamepadSnapshot::neutral(), 0)
    }

    #[test]
    fn test_session_forwards_report() {
        let snapshot = GamepadSnapshot {
            buttons: Buttons::A | Buttons::B,
            ..GamepadSnapshot::neutral()
        };

        let source = MockSource::new(vec![Ok(snapshot)]);
        let sink = MockSink::new();
        let sent_ref = sink.sent.clone();

        let mut session = PadSession::new(
            ReportPipeline::new(PipelineConfig::minimal()),
            source,
            sink,
        );

        let result = block_on(session.tick_once(0));
        assert!(result.is_ok());

        let sent = sent_ref.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let bytes = sent[0].as_bytes();
        let buttons = u16::from_le_bytes([bytes[0], bytes[1]]);
        assert_eq!(buttons, (Buttons::A | Buttons::B).raw());
    }

    #[test]
    fn test_session_sends_neutral_on_source_error() {
        let source = MockSource::new(vec![Err(SourceError::Invalid)]);
        let sink = MockSink::new();
        let sent_ref = sink.sent.clone();

        let mut session = PadSession::new(
            ReportPipeline::new(PipelineConfig::minimal()),
            source,
            sink,
        );

        let result = block_on(session.tick_once(0));
        assert!(matches!(
            result,
            Err(SessionError::Source(SourceError::Invalid))
        ));

        let sent = sent_ref.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], neutral_minimal_report());
    }

    #[test]
    fn test_session_drops_report_when_sink_not_ready() {
        let snapshot = GamepadSnapshot::neutral();
        let source = MockSource::new(vec![Ok(snapshot), Ok(snapshot)]);
        let mut sink = MockSink::new();
        sink.ready = false;
        let sent_ref = sink.sent.clone();

        let mut session = PadSession::new(
            ReportPipeline::new(PipelineConfig::minimal()),
            source,
            sink,
        );

        let result = block_on(session.tick_once(0));
        assert!(matches!(
            result,
            Err(SessionError::Transport(TransportError::Dropped))
        ));
        // Nothing queued: the report is gone
        assert!(sent_ref.lock().unwrap().is_empty());

        // Next tick recomputes and delivers once the sink is ready again
        session.sink_mut().ready = true;
        let result = block_on(session.tick_once(1));
        assert!(result.is_ok());
        assert_eq!(sent_ref.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_session_output_report_passthrough() {
        let session = PadSession::new(
            ReportPipeline::new(PipelineConfig::ps4()),
            MockSource::new(vec![]),
            MockSink::new(),
        );

        let mut out = [0u8; 8];
        out[0] = 0x05;
        out[4] = 3;
        out[5] = 9;
        let rumble = session.parse_output_report(&out).unwrap();
        assert_eq!(rumble.left, 9);
        assert_eq!(rumble.right, 3);
    }
}
