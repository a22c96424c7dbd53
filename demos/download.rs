//! Simulates a few downloads shared between worker threads.
//!
//! Run with `RUST_LOG=trace cargo run --example download` to see the lifecycle logs.

use std::{thread, time::Duration};

use line_progress::{
    BuiltInIndicator, ColorContext, MessagePrefixes, Message, Progress, Result, Style,
    SuccessSymbol,
};

static PREFIXES: MessagePrefixes = MessagePrefixes::new();

fn main() -> Result<()> {
    env_logger::init();

    let colors = ColorContext::detect();

    let resolving = Progress::builder("Resolving mirrors")
        .indicator(BuiltInIndicator::Spinner)
        .colors(colors)
        .build()?;
    resolving.show()?;
    thread::sleep(Duration::from_millis(1500));
    resolving.finish(true, "Resolved 3 mirrors")?;

    let download = Progress::builder("Downloading archive")
        .determined(true)
        .colors(colors)
        .style(Style::LoadingBar, "~G~")
        .success_symbol(SuccessSymbol::UnicodeCheckMark)
        .info_update_interval(Duration::from_millis(100))
        .build()?;
    download.show()?;

    thread::scope(|s| {
        for worker in 0..4 {
            let download = &download;
            s.spawn(move || {
                for chunk in 0..25 {
                    thread::sleep(Duration::from_millis(40 + worker * 10));
                    download.set_text(format!("Downloading chunk {chunk} on worker {worker}"));
                    download.inc();
                }
            });
        }
    });
    download.finish(true, &colors.format_copy("Downloaded <b>archive.tar.gz<r>"))?;

    eprintln!("{}", PREFIXES.note("checksum verified", &colors));
    eprint!(
        "{}",
        PREFIXES.format_message(Message::Warning, "mirror 2 was slow\n", &colors)
    );
    Ok(())
}
