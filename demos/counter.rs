//! Counter demo: three independent counters on one bar.
//!
//! Run it as a bar's status command, for example in a sway/i3 config:
//!
//! ```text
//! bar {
//!     status_command cargo run --example counter
//! }
//! ```
//!
//! Clicks on the label: left toggles pause, middle raises an error, right
//! resets, scrolling changes the tick rate. Clicks on the number: left
//! increments (Shift+left decrements), middle raises an error, right resets,
//! scrolling steps the count.

use std::time::Duration;

use anyhow::bail;
use crossbeam_channel::select;
use tickbar::{
    button, Align, Bar, BarConfig, Block, BorderWidth, Color, Instance, MinWidth, Modifiers,
    Module,
};
use tracing_subscriber::EnvFilter;

struct Counter {
    label: &'static str,
    rate: Duration,
}

impl Module for Counter {
    fn run(&self, i: &Instance) -> anyhow::Result<()> {
        let mut count: i64 = 0;
        let mut paused = false;
        let mut clicked = false;

        i.tick(self.rate)?;
        loop {
            i.update(clicked, |render| {
                let color = if paused {
                    Color::rgb(0xFF, 0xFF, 0x00)
                } else {
                    Color::rgb(0x00, 0xFF, 0x00)
                };
                render.block(
                    Block::new(format!("{} ", self.label))
                        .with_instance("text")
                        .with_color(color),
                );

                let color = match count {
                    ..=-1 => Color::rgb(0x00, 0x00, 0x88),
                    0 => Color::rgb(0x88, 0x00, 0x00),
                    _ => Color::rgb(0x00, 0x88, 0x00),
                };
                render.block(
                    Block::new(count.to_string())
                        .with_instance("count")
                        .with_min_width(MinWidth::Text("0000".into()))
                        .with_align(Align::Center)
                        .with_separator(true)
                        .with_background(color)
                        .with_border(color)
                        .with_border_left(BorderWidth::Pixels(4))
                        .with_border_right(BorderWidth::Pixels(4)),
                );
            });

            clicked = false;
            select! {
                recv(i.stopped()) -> msg => {
                    msg?;
                    i.debug(format_args!("stopped={}", i.is_stopped()));
                }
                recv(i.ticked()) -> msg => {
                    msg?;
                    if !paused && !i.is_stopped() {
                        count += 1;
                    }
                }
                recv(i.event()) -> msg => {
                    let event = msg?;
                    clicked = true;
                    match (event.instance.as_str(), event.button) {
                        (_, button::MIDDLE) => bail!("fake error"),
                        (_, button::RIGHT) => count = 0,
                        ("text", button::LEFT) => paused = !paused,
                        ("text", button::SCROLL_UP) => i.tick(self.rate)?,
                        ("text", button::SCROLL_DOWN) => i.tick(self.rate / 2)?,
                        ("count", button::LEFT) if event.modifiers.contains(Modifiers::SHIFT) => {
                            count -= 1;
                        }
                        ("count", button::LEFT | button::SCROLL_UP) => count += 1,
                        ("count", button::SCROLL_DOWN) => count -= 1,
                        _ => {}
                    }
                }
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    // stdout belongs to the bar protocol.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = BarConfig::default().with_tick_base(Duration::from_millis(250));
    let modules: Vec<Box<dyn Module>> = vec![
        Box::new(Counter {
            label: "A",
            rate: Duration::from_secs(1),
        }),
        Box::new(Counter {
            label: "B",
            rate: Duration::from_secs(1),
        }),
        Box::new(Counter {
            label: "C",
            rate: Duration::from_millis(500),
        }),
    ];

    Bar::new(config, modules).run()?;
    Ok(())
}
