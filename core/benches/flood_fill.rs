//! Flood fill and first-click placement benchmarks

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use mineterm_core::*;

/// A board whose only mine sits in the far corner, so one open floods almost everything.
fn corner_mine_board(size: Coord2) -> Board {
    let mut board = Board::new(GameConfig::new(size, 1)).unwrap();
    board[size].mine = true;
    board
}

fn bench_open_squares(c: &mut Criterion) {
    let mut group = c.benchmark_group("open_squares");

    for size in [(30, 16), (256, 256), (1024, 1024)] {
        let board = corner_mine_board(size);
        group.throughput(Throughput::Elements(u64::from(board.total_cells())));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", size.0, size.1)),
            &board,
            |b, board| {
                b.iter_batched_ref(
                    || board.clone(),
                    |board| black_box(board.open_squares((1, 1))),
                    criterion::BatchSize::LargeInput,
                )
            },
        );
    }

    group.finish();
}

fn bench_first_click(c: &mut Criterion) {
    let mut group = c.benchmark_group("place_mines_avoiding");

    for config in [
        GameConfig::beginner(),
        GameConfig::intermediate(),
        GameConfig::expert(),
    ] {
        let center = (config.width() / 2 + 1, config.height() / 2 + 1);
        let name = format!("{}x{}/{}", config.width(), config.height(), config.mines);
        group.bench_function(name, |b| {
            let mut placer = RandomMinePlacer::new(0);
            b.iter(|| {
                let mut board = Board::new(config).unwrap();
                placer.place_mines(&mut board);
                black_box(placer.place_mines_avoiding(&mut board, center))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_open_squares, bench_first_click);
criterion_main!(benches);
