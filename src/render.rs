//! The render thread of a visible [`Progress`](crate::Progress).
//!
//! Each pass applies due pending info, lays the line out under the cold lock, writes it and
//! then sleeps until the next frame, dot step or pending deadline, or until a mutator wakes
//! it. Layout itself is done by pure functions so it can be tested without threads.

use std::{io::Write, iter, sync::atomic::Ordering, time::Duration};

use web_time::Instant;

use crate::{
    progress::{DOTS_UPDATE_INTERVAL, MAX_DOTS, MAX_PERCENTAGE, Shared},
    style::{Style, StyleTable},
};

/// Longest sleep between two passes when nothing animates.
const MAX_WAIT: Duration = Duration::from_secs(60 * 60);

/// Columns reserved for an indicator frame and the spaces around it.
const INDICATOR_COLUMNS: usize = 3;

/// Animation state owned by the render thread.
#[derive(Debug)]
struct Animation {
    frame_cursor: usize,
    frame_elapsed: Duration,
    dots: usize,
    dots_elapsed: Duration,
}

impl Animation {
    const fn new() -> Self {
        Self {
            frame_cursor: 0,
            frame_elapsed: Duration::ZERO,
            dots: 0,
            dots_elapsed: Duration::ZERO,
        }
    }

    /// Advances the frame cursor; returns the time until the next frame.
    fn tick_frame(&mut self, elapsed: Duration, interval: Duration, restart: bool) -> Duration {
        if restart {
            self.frame_cursor = 0;
            self.frame_elapsed = Duration::ZERO;
        } else {
            self.frame_elapsed += elapsed;
            if self.frame_elapsed >= interval {
                self.frame_elapsed = Duration::ZERO;
                self.frame_cursor = self.frame_cursor.wrapping_add(1);
            }
        }
        interval.saturating_sub(self.frame_elapsed)
    }

    /// Advances the dot count; returns the time until the next step.
    fn tick_dots(&mut self, elapsed: Duration) -> Duration {
        self.dots_elapsed += elapsed;
        if self.dots_elapsed >= DOTS_UPDATE_INTERVAL {
            self.dots_elapsed = Duration::ZERO;
            self.dots = (self.dots + 1) % (MAX_DOTS + 1);
        }
        DOTS_UPDATE_INTERVAL.saturating_sub(self.dots_elapsed)
    }
}

/// Body of the render thread. Returns after writing a blank line once asked to stop.
pub(crate) fn run<W: Write>(shared: &Shared<W>) {
    let mut animation = Animation::new();
    let mut previous = Instant::now();
    let mut elapsed = Duration::ZERO;

    loop {
        let wait = render(shared, &mut animation, elapsed);
        if shared.wait(wait) {
            let width = usize::from(shared.width.load(Ordering::Relaxed));
            let mut cold = shared.cold.lock();
            write_line(&mut cold.sink, width, "");
            return;
        }

        let now = Instant::now();
        elapsed = now.duration_since(previous);
        previous = now;
    }
}

/// Draws one line and returns how long the thread may sleep afterwards.
fn render<W: Write>(shared: &Shared<W>, animation: &mut Animation, elapsed: Duration) -> Duration {
    let determined = shared.determined.load(Ordering::Relaxed);
    let width = usize::from(shared.width.load(Ordering::Relaxed));
    let append_dots = shared.append_dots.load(Ordering::Relaxed);

    let mut guard = shared.cold.lock();
    let cold = &mut *guard;

    let mut wait = MAX_WAIT;
    if let Some(remaining) = shared.apply_due_info(cold) {
        wait = wait.min(remaining);
    }
    let percentage = shared.percentage();

    let mut space = width;
    let mut frame = "";
    let percentage_text = if determined {
        let text = format_percentage(percentage);
        space = space.saturating_sub(text.len() + 1);
        text
    } else {
        let restart = shared.invalidate_frame.swap(false, Ordering::AcqRel);
        let interval = cold.indicator.update_interval();
        wait = wait.min(animation.tick_frame(elapsed, interval, restart));
        frame = cold.indicator.frame(animation.frame_cursor);
        space = space.saturating_sub(INDICATOR_COLUMNS);
        String::new()
    };

    let dots = if append_dots {
        space = space.saturating_sub(MAX_DOTS);
        if cold.text.chars().count() > space {
            // No room to animate: the text is cut and the dots mark the cut.
            MAX_DOTS
        } else {
            wait = wait.min(animation.tick_dots(elapsed));
            animation.dots
        }
    } else {
        0
    };

    let text = truncate(&cold.text, space);
    let line = if determined {
        determined_line(text, dots, &percentage_text, percentage, width, &cold.styles)
    } else {
        indicator_line(frame, text, dots, &cold.styles)
    };
    write_line(&mut cold.sink, width, &line);

    wait
}

/// Clears the current line and writes `line` over it.
fn write_line<W: Write>(sink: &mut W, width: usize, line: &str) {
    let blank: String = iter::repeat_n(' ', width).collect();
    let result = write!(sink, "\r{blank}\r{line}").and_then(|()| sink.flush());
    if let Err(e) = result {
        log::debug!("failed to draw progress line: {e}");
    }
}

fn format_percentage(percentage: f64) -> String {
    format!("{percentage:.1}%")
}

/// Cuts `text` to at most `columns` code points.
fn truncate(text: &str, columns: usize) -> &str {
    text.char_indices()
        .nth(columns)
        .map_or(text, |(end, _)| &text[..end])
}

/// Lays out a determined line: text, dots, padding and percentage, with the loading bar
/// style covering the first `width * percentage / 100` columns.
fn determined_line(
    text: &str,
    dots: usize,
    percentage_text: &str,
    percentage: f64,
    width: usize,
    styles: &StyleTable,
) -> String {
    let plain = styles.closing();
    let percentage_style = styles.compiled(Style::Percentage);

    let mut bar = String::with_capacity(width);
    bar.push_str(text);
    bar.extend(iter::repeat_n('.', dots));
    let filled = bar.chars().count();
    let padding = width.saturating_sub(filled + percentage_text.len());
    bar.extend(iter::repeat_n(' ', padding));
    let bar_columns = filled + padding;

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let boundary = (width as f64 * percentage / MAX_PERCENTAGE).round() as usize;

    let mut suffix = String::from(percentage_text);
    if boundary >= bar_columns {
        let at = (boundary - bar_columns).min(suffix.len());
        suffix.insert_str(at, percentage_style);
        suffix.insert_str(at, plain);
    } else {
        let at = bar
            .char_indices()
            .nth(boundary)
            .map_or(bar.len(), |(i, _)| i);
        bar.insert_str(at, plain);
    }

    format!(
        "{}{bar}{percentage_style}{suffix}{plain}",
        styles.compiled(Style::LoadingBar)
    )
}

/// Lays out an indicator line: the frame between two spaces, then text and dots.
fn indicator_line(frame: &str, text: &str, dots: usize, styles: &StyleTable) -> String {
    let mut line = format!(
        " {}{frame}{} {text}",
        styles.compiled(Style::Indicator),
        styles.closing()
    );
    line.extend(iter::repeat_n('.', dots));
    line
}
