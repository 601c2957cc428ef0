//! Status reporting for long-running operations
//!
//! A [`StatusReporter`] tells the user that something is in progress and
//! then how it ended. On a terminal it animates a cycling indicator on stderr;
//! everywhere else (pipes, files, or when `EDGEKIT_LOG` is set) it writes
//! plain append-only lines instead.
//!
//! ```text
//! Deploying ..            <- interactive, redrawn every 500ms
//! Deploying ... [OK]
//! ```
//!
//! Reporters never fail the operation they describe: write errors are
//! dropped.

use console::{Style, Term};
use edgekit_telemetry::Timer;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle, TermLike};
use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

/// Interval between animation frames
pub const TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Animation frames; the last entry is shown once finished
const FRAMES: [&str; 4] = [".", "..", "...", "..."];

/// How a reporter renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Animated, redrawn in place on stderr
    Interactive,
    /// One line at start and one at stop
    Log,
}

impl OutputMode {
    /// Log mode when requested or when stdout is not a terminal
    pub fn resolve(log_requested: bool, is_tty: bool) -> Self {
        if log_requested || !is_tty {
            OutputMode::Log
        } else {
            OutputMode::Interactive
        }
    }
}

/// Outcome shown when an operation finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    WarnOk,
    Warn,
    Fail,
}

impl Outcome {
    /// Text between the brackets
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Ok | Outcome::WarnOk => "OK",
            Outcome::Warn => "WARN",
            Outcome::Fail => "FAIL",
        }
    }

    fn style(self) -> Style {
        match self {
            Outcome::Ok => Style::new().green(),
            Outcome::WarnOk | Outcome::Warn => Style::new().cyan(),
            Outcome::Fail => Style::new().red(),
        }
    }

    /// `"... [LABEL]\n"`, colored when the target stream supports it
    pub fn suffix(self, for_stderr: bool) -> String {
        let style = if for_stderr {
            self.style().for_stderr()
        } else {
            self.style()
        };
        format!("... [{}]\n", style.apply_to(self.label()))
    }
}

enum Sink {
    Log(Box<dyn Write + Send>),
    Interactive {
        bar: ProgressBar,
        term: Box<dyn TermLike>,
    },
}

/// Handle for one in-progress operation
///
/// Created running by one of the `start` constructors and stopped by
/// [`stop`](Self::stop) or one of its variants. Stopping twice is a no-op.
/// Dropping a running interactive reporter cancels its ticker and clears the
/// frame without printing a final line.
pub struct StatusReporter {
    prefix: String,
    final_message: String,
    mode: OutputMode,
    running: bool,
    sink: Sink,
    timer: Option<Timer>,
}

impl StatusReporter {
    /// Start on the process streams: stdout in log mode, stderr otherwise
    pub fn start(mode: OutputMode, prefix: &str, final_message: &str) -> Self {
        match mode {
            OutputMode::Log => Self::start_with_writer(prefix, final_message, io::stdout()),
            OutputMode::Interactive => Self::start_on_term(prefix, final_message, Term::stderr()),
        }
    }

    /// Start in log mode, writing lines to `writer`
    pub fn start_with_writer<W>(prefix: &str, final_message: &str, writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        let mut writer: Box<dyn Write + Send> = Box::new(writer);
        if let Err(e) = writeln!(writer, "{}", prefix).and_then(|_| writer.flush()) {
            tracing::trace!(error = %e, "status line dropped");
        }

        Self::running(prefix, final_message, OutputMode::Log, Sink::Log(writer))
    }

    /// Start in interactive mode, animating on `term`
    pub fn start_on_term<T>(prefix: &str, final_message: &str, term: T) -> Self
    where
        T: TermLike + Clone + 'static,
    {
        let style = ProgressStyle::with_template("{prefix}{spinner}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&FRAMES);

        let bar = ProgressBar::with_draw_target(
            None,
            ProgressDrawTarget::term_like(Box::new(term.clone())),
        );
        bar.set_style(style);
        bar.set_prefix(prefix.to_string());
        bar.tick();
        bar.enable_steady_tick(TICK_INTERVAL);

        let sink = Sink::Interactive {
            bar,
            term: Box::new(term),
        };
        Self::running(prefix, final_message, OutputMode::Interactive, sink)
    }

    fn running(prefix: &str, final_message: &str, mode: OutputMode, sink: Sink) -> Self {
        tracing::debug!(prefix, ?mode, "status started");
        Self {
            prefix: prefix.to_string(),
            final_message: final_message.to_string(),
            mode,
            running: true,
            sink,
            timer: Some(Timer::start(prefix.trim())),
        }
    }

    /// Text shown before the outcome
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Line printed when the reporter stops
    pub fn final_message(&self) -> &str {
        &self.final_message
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop and print `final_message`, after the prefix when `use_prefix`
    ///
    /// In interactive mode the ticker is joined before anything is written,
    /// so no frame can land after the final line.
    pub fn stop(&mut self, final_message: &str, use_prefix: bool) {
        if !self.running {
            return;
        }

        self.final_message = if use_prefix {
            format!("{}{}", self.prefix, final_message)
        } else {
            final_message.to_string()
        };
        self.finish();
    }

    /// Stop with the message given at start, without the prefix
    pub fn stop_with_final_message(&mut self) {
        if self.running {
            self.finish();
        }
    }

    /// Stop with a green `... [OK]`
    pub fn stop_ok(&mut self) {
        self.stop_with(Outcome::Ok);
    }

    /// Stop with a cyan `... [OK]`: succeeded with warnings
    pub fn stop_warn_ok(&mut self) {
        self.stop_with(Outcome::WarnOk);
    }

    /// Stop with a cyan `... [WARN]`
    pub fn stop_warn(&mut self) {
        self.stop_with(Outcome::Warn);
    }

    /// Stop with a red `... [FAIL]`
    pub fn stop_fail(&mut self) {
        self.stop_with(Outcome::Fail);
    }

    /// Stop with the suffix for `outcome`
    pub fn stop_with(&mut self, outcome: Outcome) {
        let suffix = outcome.suffix(self.mode == OutputMode::Interactive);
        self.stop(&suffix, true);
    }

    fn finish(&mut self) {
        self.running = false;
        let line = self.final_message.trim_end_matches('\n');

        let written = match &mut self.sink {
            Sink::Log(writer) => writeln!(writer, "{}", line).and_then(|_| writer.flush()),
            Sink::Interactive { bar, term } => {
                bar.disable_steady_tick();
                bar.finish_and_clear();
                if line.is_empty() {
                    Ok(())
                } else {
                    term.write_line(line).and_then(|_| term.flush())
                }
            }
        };
        if let Err(e) = written {
            tracing::trace!(error = %e, "status line dropped");
        }

        if let Some(timer) = self.timer.take() {
            timer.stop();
        }
    }
}

impl fmt::Debug for StatusReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusReporter")
            .field("prefix", &self.prefix)
            .field("final_message", &self.final_message)
            .field("mode", &self.mode)
            .field("running", &self.running)
            .finish()
    }
}

impl Drop for StatusReporter {
    fn drop(&mut self) {
        if let (true, Sink::Interactive { bar, .. }) = (self.running, &self.sink) {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}

type Factory = Box<dyn FnMut(&str, &str) -> StatusReporter + Send>;

/// Holder for at most one active reporter
///
/// Starting a new operation replaces (and cancels) whatever was running, and
/// the `stop` family does nothing when the slot is empty.
pub struct StatusSlot {
    factory: Factory,
    current: Option<StatusReporter>,
}

impl StatusSlot {
    /// Slot whose reporters render in `mode` on the process streams
    pub fn new(mode: OutputMode) -> Self {
        Self::with_factory(move |prefix, final_message| {
            StatusReporter::start(mode, prefix, final_message)
        })
    }

    /// Slot whose reporters never touch stdout
    ///
    /// For commands whose stdout is data (JSON, exports): log-mode lines go to
    /// stderr too, so piped output stays parseable.
    pub fn on_stderr(mode: OutputMode) -> Self {
        Self::with_factory(move |prefix, final_message| match mode {
            OutputMode::Log => {
                StatusReporter::start_with_writer(prefix, final_message, io::stderr())
            }
            OutputMode::Interactive => {
                StatusReporter::start_on_term(prefix, final_message, Term::stderr())
            }
        })
    }

    /// Slot with a custom reporter constructor
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: FnMut(&str, &str) -> StatusReporter + Send + 'static,
    {
        Self {
            factory: Box::new(factory),
            current: None,
        }
    }

    /// Start a reporter, replacing any running one
    pub fn start(&mut self, prefix: &str, final_message: &str) -> &mut StatusReporter {
        if let Some(previous) = self.current.take() {
            tracing::debug!(prefix = previous.prefix(), "replacing running status");
            drop(previous);
        }
        self.current.insert((self.factory)(prefix, final_message))
    }

    /// Whether a reporter is running
    pub fn is_active(&self) -> bool {
        self.current.as_ref().is_some_and(StatusReporter::is_running)
    }

    pub fn stop(&mut self, final_message: &str, use_prefix: bool) {
        if let Some(mut reporter) = self.current.take() {
            reporter.stop(final_message, use_prefix);
        }
    }

    pub fn stop_ok(&mut self) {
        self.stop_with(Outcome::Ok);
    }

    pub fn stop_warn_ok(&mut self) {
        self.stop_with(Outcome::WarnOk);
    }

    pub fn stop_warn(&mut self) {
        self.stop_with(Outcome::Warn);
    }

    pub fn stop_fail(&mut self) {
        self.stop_with(Outcome::Fail);
    }

    pub fn stop_with(&mut self, outcome: Outcome) {
        if let Some(mut reporter) = self.current.take() {
            reporter.stop_with(outcome);
        }
    }
}

impl fmt::Debug for StatusSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusSlot")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indicatif::InMemoryTerm;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Buffer {
        fn contents(&self) -> String {
            let bytes = self.0.lock().unwrap().clone();
            console::strip_ansi_codes(&String::from_utf8(bytes).unwrap()).into_owned()
        }
    }

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn screen(term: &InMemoryTerm) -> String {
        console::strip_ansi_codes(&term.contents()).into_owned()
    }

    #[test]
    fn test_mode_resolution() {
        assert_eq!(OutputMode::resolve(false, true), OutputMode::Interactive);
        assert_eq!(OutputMode::resolve(true, true), OutputMode::Log);
        assert_eq!(OutputMode::resolve(false, false), OutputMode::Log);
        assert_eq!(OutputMode::resolve(true, false), OutputMode::Log);
    }

    #[test]
    fn test_outcome_suffixes() {
        let plain = |o: Outcome| console::strip_ansi_codes(&o.suffix(false)).into_owned();
        assert_eq!(plain(Outcome::Ok), "... [OK]\n");
        assert_eq!(plain(Outcome::WarnOk), "... [OK]\n");
        assert_eq!(plain(Outcome::Warn), "... [WARN]\n");
        assert_eq!(plain(Outcome::Fail), "... [FAIL]\n");
    }

    #[test]
    fn test_log_start_writes_prefix_line() {
        let buf = Buffer::default();
        let reporter = StatusReporter::start_with_writer("Building... ", "ignored", buf.clone());

        assert_eq!(buf.contents(), "Building... \n");
        assert_eq!(reporter.mode(), OutputMode::Log);
        assert!(reporter.is_running());
    }

    #[test]
    fn test_log_stop_ok_scenario() {
        let buf = Buffer::default();
        let mut reporter = StatusReporter::start_with_writer("Building... ", "", buf.clone());
        reporter.stop_ok();

        assert_eq!(buf.contents(), "Building... \nBuilding... ... [OK]\n");
        assert!(!reporter.is_running());
    }

    #[test]
    fn test_log_stop_with_prefix() {
        let buf = Buffer::default();
        let mut reporter = StatusReporter::start_with_writer("Fetching ", "", buf.clone());
        reporter.stop("done", true);

        assert_eq!(buf.contents(), "Fetching \nFetching done\n");
        assert_eq!(reporter.final_message(), "Fetching done");
    }

    #[test]
    fn test_log_stop_without_prefix() {
        let buf = Buffer::default();
        let mut reporter = StatusReporter::start_with_writer("Fetching ", "", buf.clone());
        reporter.stop("all good", false);

        assert_eq!(buf.contents(), "Fetching \nall good\n");
    }

    #[test]
    fn test_stop_twice_is_noop() {
        let buf = Buffer::default();
        let mut reporter = StatusReporter::start_with_writer("Saving ", "", buf.clone());
        reporter.stop_fail();
        reporter.stop_ok();
        reporter.stop("again", false);

        assert_eq!(buf.contents(), "Saving \nSaving ... [FAIL]\n");
    }

    #[test]
    fn test_stop_with_final_message_from_start() {
        let buf = Buffer::default();
        let mut reporter = StatusReporter::start_with_writer("Syncing ", "Synced", buf.clone());
        reporter.stop_with_final_message();

        assert_eq!(buf.contents(), "Syncing \nSynced\n");
    }

    #[test]
    fn test_interactive_draws_prefix_then_final_line() {
        let term = InMemoryTerm::new(10, 80);
        let mut reporter = StatusReporter::start_on_term("Deploying ", "", term.clone());

        assert_eq!(reporter.mode(), OutputMode::Interactive);
        assert!(screen(&term).starts_with("Deploying ."));

        reporter.stop_fail();
        assert_eq!(screen(&term), "Deploying ... [FAIL]");
    }

    #[test]
    fn test_interactive_no_frames_after_stop() {
        let term = InMemoryTerm::new(10, 80);
        let mut reporter = StatusReporter::start_on_term("Deploying ", "", term.clone());
        std::thread::sleep(TICK_INTERVAL + Duration::from_millis(100));
        reporter.stop_ok();

        let after_stop = screen(&term);
        std::thread::sleep(TICK_INTERVAL * 2);

        assert_eq!(after_stop, "Deploying ... [OK]");
        assert_eq!(screen(&term), after_stop);
    }

    #[test]
    fn test_interactive_empty_final_message_clears() {
        let term = InMemoryTerm::new(10, 80);
        let mut reporter = StatusReporter::start_on_term("Working ", "", term.clone());
        reporter.stop_with_final_message();

        assert_eq!(screen(&term), "");
    }

    #[test]
    fn test_dropping_running_reporter_clears_frame() {
        let term = InMemoryTerm::new(10, 80);
        let reporter = StatusReporter::start_on_term("Abandoned ", "", term.clone());
        drop(reporter);

        assert_eq!(screen(&term), "");
    }

    #[test]
    fn test_slot_stop_without_start_is_silent() {
        let buf = Buffer::default();
        let sink = buf.clone();
        let mut slot = StatusSlot::with_factory(move |prefix, final_message| {
            StatusReporter::start_with_writer(prefix, final_message, sink.clone())
        });

        slot.stop_ok();
        slot.stop_warn_ok();
        slot.stop_warn();
        slot.stop_fail();
        slot.stop("message", false);

        assert!(!slot.is_active());
        assert_eq!(buf.contents(), "");
    }

    #[test]
    fn test_slot_start_then_stop() {
        let buf = Buffer::default();
        let sink = buf.clone();
        let mut slot = StatusSlot::with_factory(move |prefix, final_message| {
            StatusReporter::start_with_writer(prefix, final_message, sink.clone())
        });

        slot.start("Purging ", "");
        assert!(slot.is_active());
        slot.stop_warn();
        assert!(!slot.is_active());

        assert_eq!(buf.contents(), "Purging \nPurging ... [WARN]\n");
    }

    #[test]
    fn test_slot_second_start_replaces_first() {
        let term = InMemoryTerm::new(10, 80);
        let target = term.clone();
        let mut slot = StatusSlot::with_factory(move |prefix, final_message| {
            StatusReporter::start_on_term(prefix, final_message, target.clone())
        });

        slot.start("First ", "");
        slot.start("Second ", "");
        slot.stop_ok();

        std::thread::sleep(TICK_INTERVAL + Duration::from_millis(100));
        assert_eq!(screen(&term), "Second ... [OK]");
    }

    #[test]
    fn test_stderr_slot_keeps_log_mode() {
        let mut slot = StatusSlot::on_stderr(OutputMode::Log);

        let reporter = slot.start("Loading ", "");
        assert_eq!(reporter.mode(), OutputMode::Log);
        assert!(slot.is_active());

        slot.stop_ok();
        assert!(!slot.is_active());
    }
}
