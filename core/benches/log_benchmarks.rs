use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

use rewind_core::edits::{BatchEdit, BatchValues, Property, ValueEdit};
use rewind_core::{EditLog, Editable, Handle};

struct Node {
    x: f32,
    opacity: f32,
}

impl Editable for Node {}

fn x_of(node: &Node) -> f32 {
    node.x
}

fn set_x(node: &mut Node, value: f32) {
    node.x = value;
}

fn opacity_of(node: &Node) -> f32 {
    node.opacity
}

fn set_opacity(node: &mut Node, value: f32) {
    node.opacity = value;
}

const X: Property<Node, f32> = Property::new("x", x_of, set_x);
const OPACITY: Property<Node, f32> = Property::new("opacity", opacity_of, set_opacity);

fn node() -> Handle<Node> {
    Handle::new(Node {
        x: 0.0,
        opacity: 1.0,
    })
}

// ---------------------------------------------------------------------------
// Recording
// ---------------------------------------------------------------------------

fn bench_drag_merge(c: &mut Criterion) {
    c.bench_function("drag_1000_merged_moves", |b| {
        b.iter(|| {
            let log = EditLog::default();
            let n = node();
            for i in 0..1000 {
                log.add_edit(Box::new(ValueEdit::perform(&n, X, black_box(i as f32))));
            }
            black_box(log.len())
        });
    });
}

fn bench_trim_at_limit(c: &mut Criterion) {
    c.bench_function("add_1000_with_limit_100", |b| {
        b.iter(|| {
            let log = EditLog::new(Some(100));
            let n = node();
            for i in 0..1000 {
                log.add_edit(Box::new(ValueEdit::perform(&n, X, i as f32).unmergeable()));
            }
            black_box(log.len())
        });
    });
}

fn bench_batch_record(c: &mut Criterion) {
    let nodes: Vec<_> = (0..64).map(|_| node()).collect();
    c.bench_function("batch_opacity_64_nodes", |b| {
        b.iter(|| {
            BatchEdit::perform(nodes.clone(), OPACITY, BatchValues::Shared(black_box(0.5)))
                .map(|edit| black_box(edit.len()))
        });
    });
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

fn filled_log(len: usize) -> (EditLog, Handle<Node>) {
    let log = EditLog::new(None);
    let n = node();
    for i in 0..len {
        log.add_edit(Box::new(ValueEdit::perform(&n, X, i as f32).unmergeable()));
    }
    (log, n)
}

fn bench_undo_redo_walk(c: &mut Criterion) {
    c.bench_function("undo_redo_walk_1000", |b| {
        b.iter_batched(
            || filled_log(1000),
            |(log, _node)| {
                while log.undo().is_ok() {}
                while log.redo().is_ok() {}
                black_box(log.cursor())
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_jump(c: &mut Criterion) {
    c.bench_function("jump_to_start_and_back_1000", |b| {
        b.iter_batched(
            || filled_log(1000),
            |(log, _node)| {
                let _ = log.move_cursor_to(0);
                let _ = log.move_cursor_to(1000);
                black_box(log.cursor())
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_drag_merge,
    bench_trim_at_limit,
    bench_batch_record,
    bench_undo_redo_walk,
    bench_jump,
);
criterion_main!(benches);
