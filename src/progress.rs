//! The self-refreshing progress line.
//!
//! A [`Progress`] owns its display state and, while visible, one background thread that
//! redraws the line. The state follows a "Hot/Cold" split so that callers on any thread can
//! mutate it while the render thread reads it:
//!
//! * **Hot Data:** determined flag, percentage, width, dots flag, pending percentage, the
//!   frame invalidation marker and the hidden flag are stored in atomics.
//! * **Cold Data:** text, pending text, indicator, styles, colors, symbols and the output
//!   sink are guarded by a [`Mutex`](parking_lot::Mutex). The render thread holds it for a
//!   whole layout pass, so a line is never built from half-applied changes.
//!
//! A second mutex/condvar pair only carries the "wake up" and "stop" signals, so signalling
//! never waits for a render in progress.
//!
//! # Rate-limited updates
//!
//! [`Progress::set_info_update_interval`] limits how often text and percentage changes
//! become visible. Changes arriving too early are kept as *pending* values (see
//! [`Progress::pending_text`]) and applied by the render thread once the interval elapsed.

use std::{
    fmt,
    io::{Stdout, Write},
    ops::AddAssign,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU16, AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use compact_str::CompactString;
use parking_lot::{Condvar, MappedMutexGuard, Mutex, MutexGuard};
use web_time::Instant;

use crate::{
    Error, Result,
    builder::ProgressBuilder,
    indicator::{FailureSymbol, Indicator, SuccessSymbol},
    render,
    style::{Style, StyleTable},
    text::ColorContext,
};

/// Number of dots appended to the text.
pub const MAX_DOTS: usize = 3;

/// Time between two dot animation steps.
pub const DOTS_UPDATE_INTERVAL: Duration = Duration::from_secs(1);

/// Upper bound of the percentage.
pub const MAX_PERCENTAGE: f64 = 100.0;

/// Smallest width able to hold either kind of progress line.
pub const MIN_WIDTH: u16 = {
    // Dots plus " 100.0%".
    let determined = MAX_DOTS + " 100.0%".len();
    // Dots plus a one-column frame with a space on each side.
    let indicator = 2 + 1 + MAX_DOTS;
    if determined > indicator {
        determined as u16
    } else {
        indicator as u16
    }
};

/// Widest line drawn; larger widths are clamped to it.
pub const MAX_WIDTH: u16 = 512;

/// An `f64` stored in an [`AtomicU64`]. `NaN` encodes "no value".
pub(crate) struct AtomicPercentage(AtomicU64);

impl AtomicPercentage {
    const NONE: u64 = f64::NAN.to_bits();

    fn new(value: Option<f64>) -> Self {
        Self(AtomicU64::new(value.map_or(Self::NONE, f64::to_bits)))
    }

    pub(crate) fn load(&self) -> Option<f64> {
        let value = f64::from_bits(self.0.load(Ordering::Relaxed));
        (!value.is_nan()).then_some(value)
    }

    pub(crate) fn store(&self, value: Option<f64>) {
        self.0
            .store(value.map_or(Self::NONE, f64::to_bits), Ordering::Relaxed);
    }

    pub(crate) fn take(&self) -> Option<f64> {
        let value = f64::from_bits(self.0.swap(Self::NONE, Ordering::Relaxed));
        (!value.is_nan()).then_some(value)
    }
}

/// Clamps into `[0, MAX_PERCENTAGE]`; `NaN` counts as zero.
fn clamp_percentage(percentage: f64) -> f64 {
    if percentage.is_nan() {
        0.0
    } else {
        percentage.clamp(0.0, MAX_PERCENTAGE)
    }
}

pub(crate) fn validate_width(width: u16) -> Result<u16> {
    if width < MIN_WIDTH {
        return Err(Error::InsufficientWidth {
            width,
            min: MIN_WIDTH,
        });
    }
    Ok(width.min(MAX_WIDTH))
}

fn duration_to_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// Marks that no info update has been made visible yet.
const NEVER: u64 = u64::MAX;

/// "Cold" storage, read and written under one lock.
pub(crate) struct Cold<W> {
    pub(crate) text: CompactString,
    pub(crate) pending_text: Option<CompactString>,
    pub(crate) indicator: Indicator,
    pub(crate) styles: StyleTable,
    pub(crate) colors: ColorContext,
    pub(crate) success_symbol: CompactString,
    pub(crate) failure_symbol: CompactString,
    pub(crate) sink: W,
}

/// Signals from callers to the render thread.
#[derive(Debug, Default)]
pub(crate) struct Wake {
    /// Something changed; coalesces any number of notifications into one wakeup.
    notified: bool,
    /// `hide` was requested.
    stop: bool,
}

/// State shared between a [`Progress`] handle and its render thread.
pub(crate) struct Shared<W> {
    pub(crate) determined: AtomicBool,
    pub(crate) percentage: AtomicPercentage,
    pub(crate) pending_percentage: AtomicPercentage,
    pub(crate) width: AtomicU16,
    pub(crate) append_dots: AtomicBool,
    /// Set when the frame cursor must restart from the first frame.
    pub(crate) invalidate_frame: AtomicBool,
    pub(crate) hidden: AtomicBool,

    /// Minimal spacing between visible info updates, in nanoseconds.
    info_update_interval: AtomicU64,
    /// Time (nanoseconds since `epoch`) of the last visible info update, or `NEVER`.
    last_info_update: AtomicU64,
    epoch: Instant,

    pub(crate) cold: Mutex<Cold<W>>,

    wake: Mutex<Wake>,
    wake_signal: Condvar,
}

impl<W> Shared<W> {
    fn new(determined: bool, width: u16, append_dots: bool, cold: Cold<W>) -> Self {
        Self {
            determined: AtomicBool::new(determined),
            percentage: AtomicPercentage::new(Some(0.0)),
            pending_percentage: AtomicPercentage::new(None),
            width: AtomicU16::new(width),
            append_dots: AtomicBool::new(append_dots),
            invalidate_frame: AtomicBool::new(true),
            hidden: AtomicBool::new(true),
            info_update_interval: AtomicU64::new(0),
            last_info_update: AtomicU64::new(NEVER),
            epoch: Instant::now(),
            cold: Mutex::new(cold),
            wake: Mutex::new(Wake::default()),
            wake_signal: Condvar::new(),
        }
    }

    pub(crate) fn percentage(&self) -> f64 {
        self.percentage.load().unwrap_or_default()
    }

    fn now_nanos(&self) -> u64 {
        duration_to_nanos(self.epoch.elapsed())
    }

    /// Makes the render thread re-evaluate the state right away.
    pub(crate) fn notify(&self) {
        let mut wake = self.wake.lock();
        wake.notified = true;
        self.wake_signal.notify_one();
    }

    fn request_stop(&self) {
        let mut wake = self.wake.lock();
        wake.stop = true;
        self.wake_signal.notify_one();
    }

    /// Blocks until notified or until `timeout` elapses. Returns `true` if asked to stop.
    pub(crate) fn wait(&self, timeout: Duration) -> bool {
        let mut wake = self.wake.lock();
        if !wake.notified && !wake.stop {
            let _ = self.wake_signal.wait_for(&mut wake, timeout);
        }
        wake.notified = false;
        wake.stop
    }

    /// Nanoseconds left until info may change again; zero when it may change now.
    ///
    /// Derived from the current interval, so shortening the interval takes effect at once.
    fn info_update_delay(&self, now: u64) -> u64 {
        let interval = self.info_update_interval.load(Ordering::Relaxed);
        let last = self.last_info_update.load(Ordering::Relaxed);
        if interval == 0 || last == NEVER {
            return 0;
        }
        last.saturating_add(interval).saturating_sub(now)
    }

    fn flush_pending(&self, cold: &mut Cold<W>) {
        if let Some(text) = cold.pending_text.take() {
            cold.text = text;
        }
        if let Some(percentage) = self.pending_percentage.take() {
            self.percentage.store(Some(percentage));
        }
    }

    /// Applies new info now, or parks it as pending if the update interval hasn't elapsed.
    fn commit_info(
        &self,
        cold: &mut Cold<W>,
        text: Option<CompactString>,
        percentage: Option<f64>,
    ) {
        let now = self.now_nanos();

        if self.info_update_delay(now) == 0 {
            self.flush_pending(cold);
            if let Some(text) = text {
                cold.text = text;
            }
            if let Some(percentage) = percentage {
                self.percentage.store(Some(percentage));
            }
            self.last_info_update.store(now, Ordering::Relaxed);
        } else {
            if let Some(text) = text {
                cold.pending_text = Some(text);
            }
            if let Some(percentage) = percentage {
                self.pending_percentage.store(Some(percentage));
            }
        }
    }

    /// Applies pending info whose deadline passed.
    ///
    /// Returns the time left until pending info becomes due, if any is still waiting.
    pub(crate) fn apply_due_info(&self, cold: &mut Cold<W>) -> Option<Duration> {
        if cold.pending_text.is_none() && self.pending_percentage.load().is_none() {
            return None;
        }

        let now = self.now_nanos();
        match self.info_update_delay(now) {
            0 => {
                self.flush_pending(cold);
                self.last_info_update.store(now, Ordering::Relaxed);
                None
            }
            delay => Some(Duration::from_nanos(delay)),
        }
    }
}

/// A single-line progress display refreshed by a background thread.
///
/// A progress line is either *determined* (text, a partially filled bar and a percentage)
/// or an *indicator* (an animated frame followed by the text). It starts hidden;
/// [`show`](Self::show) spawns the render thread and [`hide`](Self::hide) or
/// [`finish`](Self::finish) stop it. Dropping the handle hides it.
///
/// Every method takes `&self`, so a `Progress` can be shared between threads (e.g. behind
/// an [`Arc`] or in a scoped thread) and updated from any of them.
///
/// # Examples
///
/// ```
/// use line_progress::{ColorContext, Progress};
///
/// let progress = Progress::builder("Downloading")
///     .determined(true)
///     .width(40)
///     .colors(ColorContext::PLAIN)
///     .sink(Vec::new())
///     .build()
///     .unwrap();
/// progress.show().unwrap();
/// progress.set_percentage(42.0);
/// progress.finish(true, "Downloaded").unwrap();
///
/// assert!(progress.sink().ends_with(b" + Downloaded\n"));
/// ```
pub struct Progress<W: Write + Send + 'static = Stdout> {
    pub(crate) shared: Arc<Shared<W>>,
    updater: Mutex<Option<JoinHandle<()>>>,
}

impl Progress<Stdout> {
    /// Creates a progress line on standard output, as wide as the terminal.
    ///
    /// # Errors
    ///
    /// [`Error::Probe`] when standard output is not a terminal, or
    /// [`Error::InsufficientWidth`] when the terminal is too narrow.
    pub fn stdout(text: impl Into<CompactString>, determined: bool) -> Result<Self> {
        ProgressBuilder::new(text).determined(determined).build()
    }

    /// Starts building a progress line with [`ProgressBuilder`].
    #[must_use]
    pub fn builder(text: impl Into<CompactString>) -> ProgressBuilder {
        ProgressBuilder::new(text)
    }
}

impl<W: Write + Send + 'static> Progress<W> {
    /// Creates a hidden progress line writing to `sink`.
    ///
    /// Colors are detected from the environment (see [`ColorContext::detect`]).
    ///
    /// # Errors
    ///
    /// [`Error::InsufficientWidth`] when `width` is below [`MIN_WIDTH`].
    pub fn new(
        text: impl Into<CompactString>,
        determined: bool,
        width: u16,
        sink: W,
    ) -> Result<Self> {
        ProgressBuilder::new(text)
            .determined(determined)
            .width(width)
            .sink(sink)
            .build()
    }

    pub(crate) fn from_parts(
        determined: bool,
        width: u16,
        append_dots: bool,
        info_update_interval: Duration,
        cold: Cold<W>,
    ) -> Self {
        let shared = Shared::new(determined, width, append_dots, cold);
        shared
            .info_update_interval
            .store(duration_to_nanos(info_update_interval), Ordering::Relaxed);

        Self {
            shared: Arc::new(shared),
            updater: Mutex::new(None),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Makes the progress line visible by starting its render thread.
    ///
    /// Does nothing if it is already visible.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the operating system refuses to spawn the thread.
    pub fn show(&self) -> Result<()> {
        let mut updater = self.updater.lock();
        if updater.is_some() {
            return Ok(());
        }

        *self.shared.wake.lock() = Wake::default();
        self.shared.invalidate_frame.store(true, Ordering::Release);

        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("line-progress".into())
            .spawn(move || render::run(&shared))?;

        self.shared.hidden.store(false, Ordering::Release);
        *updater = Some(handle);
        log::trace!("progress line shown");
        Ok(())
    }

    /// Stops the render thread and clears the line.
    ///
    /// Blocks until the thread has written its final blank line. Does nothing if the
    /// progress line is already hidden.
    pub fn hide(&self) {
        let mut updater = self.updater.lock();
        let Some(handle) = updater.take() else {
            return;
        };

        self.shared.hidden.store(true, Ordering::Release);
        self.shared.request_stop();

        if handle.join().is_err() {
            log::debug!("progress render thread panicked");
        }
        log::trace!("progress line hidden");
    }

    /// Hides the line and prints a result line.
    ///
    /// The result line is a space, the success or failure symbol in its style, a reset and
    /// the plain style, a space and `message`, followed by a newline. `message` is written as is; run
    /// it through [`ColorContext::format_copy`] first to use markup in it.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] when writing to the sink fails.
    pub fn finish(&self, success: bool, message: &str) -> Result<()> {
        self.hide();

        let mut cold = self.shared.cold.lock();
        let cold = &mut *cold;
        let (style, symbol) = if success {
            (Style::SuccessSymbol, &cold.success_symbol)
        } else {
            (Style::FailureSymbol, &cold.failure_symbol)
        };

        let line = format!(
            " {}{symbol}{} {message}\n",
            cold.styles.compiled(style),
            cold.styles.closing(),
        );
        cold.sink.write_all(line.as_bytes())?;
        cold.sink.flush()?;
        Ok(())
    }

    /// Returns `true` while no render thread runs.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.shared.hidden.load(Ordering::Acquire)
    }

    // ========================================================================
    // Info: text and percentage
    // ========================================================================

    /// The currently displayed text.
    #[must_use]
    pub fn text(&self) -> CompactString {
        self.shared.cold.lock().text.clone()
    }

    /// Changes the text.
    ///
    /// Subject to the [info update interval](Self::set_info_update_interval).
    pub fn set_text(&self, text: impl Into<CompactString>) {
        self.set_info_parts(Some(text.into()), None);
    }

    /// The currently displayed percentage.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        self.shared.percentage()
    }

    /// Changes the percentage, clamped to `[0, 100]` (`NaN` counts as 0).
    ///
    /// Subject to the [info update interval](Self::set_info_update_interval).
    pub fn set_percentage(&self, percentage: f64) {
        self.set_info_parts(None, Some(clamp_percentage(percentage)));
    }

    /// Changes text and percentage together.
    pub fn set_info(&self, text: impl Into<CompactString>, percentage: f64) {
        self.set_info_parts(Some(text.into()), Some(clamp_percentage(percentage)));
    }

    fn set_info_parts(&self, text: Option<CompactString>, percentage: Option<f64>) {
        let mut cold = self.shared.cold.lock();
        self.shared.commit_info(&mut cold, text, percentage);
        drop(cold);
        self.shared.notify();
    }

    /// Adds one to the percentage.
    pub fn inc(&self) {
        self.add(1.0);
    }

    /// Adds `delta` to the most recently requested percentage (pending or current).
    pub fn add(&self, delta: f64) {
        let mut cold = self.shared.cold.lock();
        let base = self
            .shared
            .pending_percentage
            .load()
            .unwrap_or_else(|| self.shared.percentage());
        self.shared
            .commit_info(&mut cold, None, Some(clamp_percentage(base + delta)));
        drop(cold);
        self.shared.notify();
    }

    /// Text waiting for the info update interval to elapse.
    #[must_use]
    pub fn pending_text(&self) -> Option<CompactString> {
        self.shared.cold.lock().pending_text.clone()
    }

    /// Percentage waiting for the info update interval to elapse.
    #[must_use]
    pub fn pending_percentage(&self) -> Option<f64> {
        self.shared.pending_percentage.load()
    }

    /// Minimal time between two visible text/percentage changes.
    #[must_use]
    pub fn info_update_interval(&self) -> Duration {
        Duration::from_nanos(self.shared.info_update_interval.load(Ordering::Relaxed))
    }

    /// Limits how often text and percentage changes become visible.
    ///
    /// `Duration::ZERO` (the default) shows every change immediately. Otherwise a change
    /// arriving sooner than `interval` after the previous visible one is kept pending,
    /// replacing any pending value of the same kind, and applied once the interval elapsed.
    ///
    /// The interval is measured from the last visible change, so a new interval applies to
    /// pending info right away.
    pub fn set_info_update_interval(&self, interval: Duration) {
        self.shared
            .info_update_interval
            .store(duration_to_nanos(interval), Ordering::Relaxed);
        self.shared.notify();
    }

    // ========================================================================
    // Layout
    // ========================================================================

    /// Whether the line shows a percentage (`true`) or an indicator (`false`).
    #[must_use]
    pub fn is_determined(&self) -> bool {
        self.shared.determined.load(Ordering::Relaxed)
    }

    /// Switches between percentage and indicator display.
    pub fn set_determined(&self, determined: bool) {
        self.shared.determined.store(determined, Ordering::Relaxed);
        self.shared.notify();
    }

    /// Width of the line in columns.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.shared.width.load(Ordering::Relaxed)
    }

    /// Changes the width. Widths above [`MAX_WIDTH`] are clamped.
    ///
    /// # Errors
    ///
    /// [`Error::InsufficientWidth`] below [`MIN_WIDTH`]; the width is left unchanged.
    pub fn set_width(&self, width: u16) -> Result<()> {
        let width = validate_width(width)?;
        self.shared.width.store(width, Ordering::Relaxed);
        self.shared.notify();
        Ok(())
    }

    /// Whether animated dots follow the text.
    #[must_use]
    pub fn appends_dots(&self) -> bool {
        self.shared.append_dots.load(Ordering::Relaxed)
    }

    /// Enables or disables the trailing dots.
    pub fn set_append_dots(&self, enable: bool) {
        self.shared.append_dots.store(enable, Ordering::Relaxed);
        self.shared.notify();
    }

    /// The indicator animation.
    #[must_use]
    pub fn indicator(&self) -> Indicator {
        self.shared.cold.lock().indicator.clone()
    }

    /// Replaces the indicator; the animation restarts from its first frame.
    ///
    /// Accepts an [`Indicator`] or a [`BuiltInIndicator`](crate::BuiltInIndicator).
    pub fn set_indicator(&self, indicator: impl Into<Indicator>) {
        let indicator = indicator.into();
        self.shared.cold.lock().indicator = indicator;
        self.shared.invalidate_frame.store(true, Ordering::Release);
        self.shared.notify();
    }

    // ========================================================================
    // Appearance
    // ========================================================================

    /// Markup of a region.
    #[must_use]
    pub fn style(&self, style: Style) -> CompactString {
        self.shared.cold.lock().styles.markup(style).into()
    }

    /// Changes the markup of a region. It is compiled right away with the current colors.
    pub fn set_style(&self, style: Style, markup: &str) {
        let mut guard = self.shared.cold.lock();
        let cold = &mut *guard;
        cold.styles.set(style, markup, &cold.colors);
        drop(guard);
        self.shared.notify();
    }

    /// Color support level and palette used for the styles.
    #[must_use]
    pub fn colors(&self) -> ColorContext {
        self.shared.cold.lock().colors
    }

    /// Changes the color context and recompiles every style.
    pub fn set_colors(&self, colors: ColorContext) {
        let mut cold = self.shared.cold.lock();
        cold.colors = colors;
        cold.styles.recompile(&colors);
        drop(cold);
        self.shared.notify();
    }

    /// Symbol of success result lines.
    #[must_use]
    pub fn success_symbol(&self) -> CompactString {
        self.shared.cold.lock().success_symbol.clone()
    }

    /// Changes the success symbol. Accepts text or a [`SuccessSymbol`].
    pub fn set_success_symbol(&self, symbol: impl Into<CompactString>) {
        self.shared.cold.lock().success_symbol = symbol.into();
    }

    /// Symbol of failure result lines.
    #[must_use]
    pub fn failure_symbol(&self) -> CompactString {
        self.shared.cold.lock().failure_symbol.clone()
    }

    /// Changes the failure symbol. Accepts text or a [`FailureSymbol`].
    pub fn set_failure_symbol(&self, symbol: impl Into<CompactString>) {
        self.shared.cold.lock().failure_symbol = symbol.into();
    }

    /// Locks and returns the output sink.
    ///
    /// The render thread can't draw while the guard is alive, so keep it short.
    pub fn sink(&self) -> MappedMutexGuard<'_, W> {
        MutexGuard::map(self.shared.cold.lock(), |cold| &mut cold.sink)
    }

    // ========================================================================
    // Copies
    // ========================================================================

    /// Creates an independent, hidden copy writing to `sink`.
    ///
    /// Everything but the sink and the visibility is copied. Pending info becomes the
    /// copy's current info, since it is the most recent value requested.
    pub fn duplicate<V: Write + Send + 'static>(&self, sink: V) -> Progress<V> {
        let source = self.shared.cold.lock();
        let copy = Progress::from_parts(
            false,
            MIN_WIDTH,
            true,
            Duration::ZERO,
            Cold {
                text: CompactString::default(),
                pending_text: None,
                indicator: source.indicator.clone(),
                styles: source.styles.clone(),
                colors: source.colors,
                success_symbol: CompactString::default(),
                failure_symbol: CompactString::default(),
                sink,
            },
        );

        let mut target = copy.shared.cold.lock();
        copy_state(&*self.shared, &*source, &*copy.shared, &mut *target);
        drop(target);
        copy
    }

    /// Copies the state of `other` into `self`, like [`duplicate`](Self::duplicate).
    ///
    /// The sink and visibility of `self` are kept; a visible line redraws with the new
    /// state. Both instances are locked in a consistent order, so concurrent copies in
    /// opposite directions can't deadlock.
    pub fn assign_from<V: Write + Send + 'static>(&self, other: &Progress<V>) {
        let mine = Arc::as_ptr(&self.shared).cast::<()>();
        let theirs = Arc::as_ptr(&other.shared).cast::<()>();
        if mine == theirs {
            return;
        }

        let (mut target, source) = if mine < theirs {
            let target = self.shared.cold.lock();
            (target, other.shared.cold.lock())
        } else {
            let source = other.shared.cold.lock();
            (self.shared.cold.lock(), source)
        };
        copy_state(&*other.shared, &*source, &*self.shared, &mut *target);
        drop(target);
        drop(source);

        self.shared.notify();
    }
}

/// Copies everything but the sink and run state from one shared state into another.
fn copy_state<S, T>(
    source: &Shared<S>,
    source_cold: &Cold<S>,
    target: &Shared<T>,
    target_cold: &mut Cold<T>,
) {
    target
        .determined
        .store(source.determined.load(Ordering::Relaxed), Ordering::Relaxed);
    target
        .width
        .store(source.width.load(Ordering::Relaxed), Ordering::Relaxed);
    target
        .append_dots
        .store(source.append_dots.load(Ordering::Relaxed), Ordering::Relaxed);
    target.info_update_interval.store(
        source.info_update_interval.load(Ordering::Relaxed),
        Ordering::Relaxed,
    );
    target.last_info_update.store(NEVER, Ordering::Relaxed);

    let percentage = source
        .pending_percentage
        .load()
        .unwrap_or_else(|| source.percentage());
    target.percentage.store(Some(percentage));
    target.pending_percentage.store(None);

    target_cold.text = source_cold
        .pending_text
        .clone()
        .unwrap_or_else(|| source_cold.text.clone());
    target_cold.pending_text = None;
    target_cold.indicator = source_cold.indicator.clone();
    target_cold.styles = source_cold.styles.clone();
    target_cold.colors = source_cold.colors;
    target_cold.success_symbol = source_cold.success_symbol.clone();
    target_cold.failure_symbol = source_cold.failure_symbol.clone();
    target.invalidate_frame.store(true, Ordering::Release);
}

impl<W: Write + Send + 'static> Drop for Progress<W> {
    fn drop(&mut self) {
        self.hide();
    }
}

impl<W: Write + Send + 'static> AddAssign<f64> for Progress<W> {
    fn add_assign(&mut self, delta: f64) {
        self.add(delta);
    }
}

impl<W: Write + Send + 'static> fmt::Debug for Progress<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Atomics only, so debugging never waits for the render thread.
        f.debug_struct("Progress")
            .field("determined", &self.is_determined())
            .field("percentage", &self.percentage())
            .field("width", &self.width())
            .field("hidden", &self.is_hidden())
            .finish_non_exhaustive()
    }
}

impl From<SuccessSymbol> for CompactString {
    fn from(symbol: SuccessSymbol) -> Self {
        Self::const_new(symbol.as_str())
    }
}

impl From<FailureSymbol> for CompactString {
    fn from(symbol: FailureSymbol) -> Self {
        Self::const_new(symbol.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::{thread, time::Duration};

    use super::{MAX_WIDTH, MIN_WIDTH, Progress};
    use crate::{
        BuiltInIndicator, ColorContext, ColorSupport, Error, Palette, Style, SuccessSymbol,
    };

    fn colored() -> ColorContext {
        ColorContext::new(Some(ColorSupport::Ansi8), Palette::DEFAULT)
    }

    fn progress(determined: bool) -> Progress<Vec<u8>> {
        Progress::builder("")
            .determined(determined)
            .width(40)
            .colors(ColorContext::PLAIN)
            .sink(Vec::new())
            .build()
            .unwrap()
    }

    /// Width Handling
    /// Widths below the minimum are rejected at construction and on update.
    #[test]
    fn test_width_handling() {
        assert_eq!(MIN_WIDTH, 10);
        for width in 0..MIN_WIDTH {
            assert!(matches!(
                Progress::new("", false, width, Vec::new()),
                Err(Error::InsufficientWidth { min: 10, .. })
            ));
        }
        for width in [MIN_WIDTH, 80, MAX_WIDTH] {
            assert!(Progress::new("", true, width, Vec::new()).is_ok());
        }

        let p = Progress::new("", false, u16::MAX, Vec::new()).unwrap();
        assert_eq!(p.width(), MAX_WIDTH);
        assert!(p.set_width(0).is_err());
        assert_eq!(p.width(), MAX_WIDTH, "failed update leaves the width untouched");
        p.set_width(MIN_WIDTH).unwrap();
        assert_eq!(p.width(), MIN_WIDTH);
    }

    /// Percentage Clamping
    #[test]
    #[allow(clippy::float_cmp)]
    fn test_percentage_clamping() {
        let p = progress(true);
        for (input, stored) in [
            (-5.0, 0.0),
            (0.0, 0.0),
            (42.5, 42.5),
            (100.0, 100.0),
            (250.0, 100.0),
            (f64::NAN, 0.0),
            (f64::INFINITY, 100.0),
        ] {
            p.set_percentage(input);
            assert_eq!(p.percentage(), stored, "input {input}");
        }

        p.set_percentage(98.5);
        p.inc();
        assert_eq!(p.percentage(), 99.5);
        let mut p = p;
        p += 3.0;
        assert_eq!(p.percentage(), 100.0);
    }

    /// Show/Hide Lifecycle
    /// At least one frame is drawn before hiding, and hiding twice writes nothing more.
    #[test]
    fn test_show_then_hide() {
        let p = progress(false);
        assert!(p.is_hidden());

        p.show().unwrap();
        p.show().unwrap();
        assert!(!p.is_hidden());
        p.hide();
        assert!(p.is_hidden());

        let written = p.sink().clone();
        assert!(!written.is_empty());

        p.hide();
        assert_eq!(*p.sink(), written, "second hide is a no-op");
    }

    /// Result Messages
    /// Result lines use the symbol style, then the plain style, then the message.
    #[test]
    fn test_result_messages() {
        let p = Progress::builder("")
            .width(40)
            .colors(colored())
            .sink(Vec::new())
            .build()
            .unwrap();

        p.set_style(Style::Plain, "<r>");
        p.set_style(Style::SuccessSymbol, "<b>");
        p.set_success_symbol("+");
        p.finish(true, "success").unwrap();
        assert_eq!(p.sink().as_slice(), b" \x1b[1m+\x1b[0m success\n");
        p.sink().clear();

        p.set_colors(ColorContext::PLAIN);
        p.set_style(Style::Plain, "<u>");
        p.set_style(Style::FailureSymbol, "<i>");
        p.set_failure_symbol("-");
        p.finish(false, "failure").unwrap();
        assert_eq!(p.sink().as_slice(), b" - failure\n");
    }

    /// Rate-limited Info
    /// Early changes stay pending, copies see them at once, the render thread applies them.
    #[test]
    #[allow(clippy::float_cmp)]
    fn test_update_interval_of_information() {
        let p = progress(true);
        p.show().unwrap();

        p.set_info_update_interval(Duration::from_millis(10));
        p.set_text("abc");
        // Postpone this information.
        p.set_info("def", 1.0);
        assert_eq!(p.text(), "abc");
        assert_eq!(p.percentage(), 0.0);
        assert_eq!(p.pending_text().as_deref(), Some("def"));
        assert_eq!(p.pending_percentage(), Some(1.0));

        let copy = p.duplicate(Vec::new());
        assert_eq!(copy.text(), "def");
        assert_eq!(copy.percentage(), 1.0);
        assert!(copy.is_hidden());

        // Wait for the pending values to be applied.
        thread::sleep(Duration::from_millis(15));
        assert_eq!(p.text(), "def");
        assert_eq!(p.percentage(), 1.0);
        assert!(p.pending_text().is_none());
        assert!(p.pending_percentage().is_none());

        p.set_info_update_interval(Duration::ZERO);
        p.set_text("xyz");
        // Percentage must be applied immediately.
        p.set_percentage(100.0);
        assert_eq!(p.text(), "xyz");
        assert_eq!(p.percentage(), 100.0);
    }

    /// Shortened Interval
    /// Pending info follows the new interval instead of the deadline of the old one.
    #[test]
    fn test_shortened_update_interval() {
        let p = progress(true);
        p.show().unwrap();

        p.set_info_update_interval(Duration::from_secs(3600));
        p.set_text("a");
        p.set_info_update_interval(Duration::from_millis(10));
        p.set_text("b");

        thread::sleep(Duration::from_millis(50));
        assert_eq!(p.text(), "b");
        assert!(p.pending_text().is_none());
    }

    /// Rendered Stream
    /// Every draw clears the line first, mutators redraw an idle line at once, and hiding
    /// leaves a single blank line.
    #[test]
    fn test_rendered_stream() {
        let p = Progress::builder("abc")
            .determined(true)
            .width(20)
            .append_dots(false)
            .colors(ColorContext::PLAIN)
            .sink(Vec::new())
            .build()
            .unwrap();
        let blank = format!("\r{}\r", " ".repeat(20));

        p.show().unwrap();
        thread::sleep(Duration::from_millis(50));
        let first = format!("{blank}abc             0.0%");
        assert!(p.sink().starts_with(first.as_bytes()));

        // Nothing animates, so only the mutator can trigger this redraw.
        p.set_percentage(50.0);
        thread::sleep(Duration::from_millis(50));
        let half = format!("{blank}abc            50.0%");
        let written = String::from_utf8(p.sink().clone()).unwrap();
        assert!(written.contains(&half));

        p.hide();
        let written = String::from_utf8(p.sink().clone()).unwrap();
        assert!(written.ends_with(&format!("{half}{blank}")));
    }

    /// Copy Semantics
    /// Copies carry configuration but neither the sink contents nor the visibility.
    #[test]
    fn test_duplicate_and_assign() {
        let p = progress(false);
        p.set_text("copy me");
        p.set_indicator(BuiltInIndicator::UnicodeFlashingBullet);
        p.set_style(Style::Indicator, "<u>");
        p.set_success_symbol(SuccessSymbol::UnicodeCheckMark);
        p.set_append_dots(false);
        p.show().unwrap();

        let copy = p.duplicate(Vec::new());
        assert!(copy.is_hidden());
        assert!(copy.sink().is_empty());
        assert_eq!(copy.text(), "copy me");
        assert_eq!(copy.indicator(), p.indicator());
        assert_eq!(copy.style(Style::Indicator), "<u>");
        assert_eq!(copy.success_symbol(), "\u{2713}");
        assert!(!copy.appends_dots());

        let target = progress(true);
        target.assign_from(&copy);
        assert_eq!(target.text(), "copy me");
        assert!(!target.is_determined());
        assert!(target.sink().is_empty());

        // Self-assignment is a no-op.
        target.assign_from(&target);
        assert_eq!(target.text(), "copy me");
        p.hide();
    }

    /// Concurrent Mutation
    /// Mutators can be called from many threads while the line renders.
    #[test]
    fn test_concurrent_mutators() {
        let p = progress(true);
        p.show().unwrap();

        thread::scope(|s| {
            for i in 0..4 {
                let p = &p;
                s.spawn(move || {
                    for _ in 0..25 {
                        p.inc();
                        p.set_text(format!("worker {i}"));
                    }
                });
            }
        });

        p.hide();
        assert!((p.percentage() - 100.0).abs() < f64::EPSILON);
        assert!(p.text().starts_with("worker "));
    }
}
