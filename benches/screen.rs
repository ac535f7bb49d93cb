//! Screen benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use vt_screen::{NoopSink, Screen};

fn new_screen(lines: usize, columns: usize) -> Screen {
    Screen::new(lines, columns, 10_000, Box::new(NoopSink))
}

fn bench_screen_draw(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    group.bench_function("draw_ascii", |b| {
        b.iter(|| {
            let mut screen = new_screen(24, 80);
            for _ in 0..50 {
                screen.draw_text("Hello, World! ");
            }
            black_box(screen)
        })
    });

    group.finish();
}

fn bench_screen_scroll(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    group.bench_function("scroll", |b| {
        b.iter(|| {
            let mut screen = new_screen(24, 80);
            for i in 0..100 {
                screen.draw_text(&format!("Line {}: Some text content here", i));
                screen.linefeed();
                screen.carriage_return();
            }
            black_box(screen)
        })
    });

    group.finish();
}

fn bench_screen_sgr(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    group.bench_function("sgr_apply", |b| {
        b.iter(|| {
            let mut screen = new_screen(24, 80);
            for _ in 0..100 {
                screen.cursor_position(1, 1);
                screen.erase_in_display(2, false);
                screen.select_graphic_rendition(&[1, 31]);
                screen.draw_text("Hello");
                screen.select_graphic_rendition(&[0]);
            }
            black_box(screen)
        })
    });

    group.finish();
}

fn bench_screen_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    group.bench_function("resize", |b| {
        b.iter(|| {
            let mut screen = new_screen(24, 80);
            for _ in 0..20 {
                screen.draw_text("Hello, World!");
                screen.linefeed();
                screen.carriage_return();
            }
            screen.resize(40, 120).unwrap();
            screen.resize(24, 80).unwrap();
            screen.resize(50, 132).unwrap();
            black_box(screen)
        })
    });

    group.finish();
}

fn bench_screen_full_redraw(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    // Simulate a full screen repaint (like vim opening)
    let row = "X".repeat(80);
    group.throughput(Throughput::Bytes((row.len() * 24) as u64));

    group.bench_function("full_redraw", |b| {
        b.iter(|| {
            let mut screen = new_screen(24, 80);
            for y in 1..=24 {
                screen.cursor_position(y, 1);
                screen.draw_text(&row);
            }
            black_box(screen)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_screen_draw,
    bench_screen_scroll,
    bench_screen_sgr,
    bench_screen_resize,
    bench_screen_full_redraw
);

criterion_main!(benches);
