//! Codec benchmark: block encoding and click event decoding.
//!
//! Both run on every frame or click, so they should stay well under a
//! microsecond for typical blocks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tickbar::protocol::parse_line;
use tickbar::{Align, Block, BorderWidth, Color, Event, MinWidth};

fn block_encode_plain(c: &mut Criterion) {
    let block = Block::new("12:34:56");
    let mut buf = Vec::with_capacity(256);

    c.bench_function("block_encode_plain", |b| {
        b.iter(|| {
            buf.clear();
            black_box(&block).append_json(&mut buf);
            black_box(buf.len())
        })
    });
}

fn block_encode_styled(c: &mut Criterion) {
    let block = Block::new("cpu 42%")
        .with_short_text("42%")
        .with_instance("cpu0")
        .with_color(Color::rgb(0xFF, 0xAA, 0x00))
        .with_background(Color::rgba(0x20, 0x20, 0x20, 0xC0))
        .with_border(Color::rgb(0x88, 0x00, 0x00))
        .with_border_left(BorderWidth::Pixels(4))
        .with_border_right(BorderWidth::Disabled)
        .with_min_width(MinWidth::Text("cpu 100%".into()))
        .with_align(Align::Right)
        .with_separator(true)
        .with_separator_block_width(9);
    let mut buf = Vec::with_capacity(512);

    c.bench_function("block_encode_styled", |b| {
        b.iter(|| {
            buf.clear();
            black_box(&block).append_json(&mut buf);
            black_box(buf.len())
        })
    });
}

fn block_encode_escaped(c: &mut Criterion) {
    let block = Block::new("say \"hi\"\t\\ \u{1}");
    let mut buf = Vec::with_capacity(256);

    c.bench_function("block_encode_escaped", |b| {
        b.iter(|| {
            buf.clear();
            black_box(&block).append_json(&mut buf);
            black_box(buf.len())
        })
    });
}

fn event_decode(c: &mut Criterion) {
    let line = r#",{"name":"3","instance":"count","button":1,"modifiers":["Shift","Mod2"],"x":1820,"y":12,"relative_x":14,"relative_y":12,"output_x":1820,"output_y":12,"width":48,"height":22}"#;

    c.bench_function("event_decode_line", |b| {
        b.iter(|| parse_line(black_box(line)))
    });

    let object = &line.as_bytes()[1..];
    c.bench_function("event_decode_object", |b| {
        b.iter(|| Event::from_json(black_box(object)))
    });
}

criterion_group!(
    benches,
    block_encode_plain,
    block_encode_styled,
    block_encode_escaped,
    event_decode,
);
criterion_main!(benches);
