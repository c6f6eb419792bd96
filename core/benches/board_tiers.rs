use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use demine_core::{Board, LevelParams, MAX_LEVEL, RandomMineGenerator};

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for level in [1, 5, MAX_LEVEL] {
        let params = LevelParams::for_level(level).unwrap();
        group.bench_function(format!("level_{level}"), |b| {
            b.iter_batched(
                || {
                    (
                        Board::new(params.dim, params.mines),
                        RandomMineGenerator::new(u64::from(level)),
                    )
                },
                |(mut board, mut generator)| {
                    board.generate(&mut generator, (0, 0)).unwrap();
                    board
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_cascade(c: &mut Criterion) {
    let mut group = c.benchmark_group("cascade");
    for level in [1, MAX_LEVEL] {
        let params = LevelParams::for_level(level).unwrap();
        let dim = params.dim;
        // mines along the top row, so a far-corner click floods the rest
        let mines: Vec<_> = (0..dim).map(|col| (0, col)).collect();
        group.bench_function(format!("level_{level}"), |b| {
            b.iter_batched(
                || Board::with_mines(dim, &mines).unwrap(),
                |mut board| {
                    board.reveal((dim - 1, dim - 1)).unwrap();
                    board
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_generate, bench_cascade);
criterion_main!(benches);
