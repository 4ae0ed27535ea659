//! Criterion benchmarks for CYK parsing and short induction runs.
//!
//! Uses the a^n b^n language so that sentence length drives parse cost.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gcs_induction::cyk::{ClassicExecutors, CykEngine, StochasticExecutors};
use gcs_induction::grammar::{PopulationConfig, Rule, RulePopulation, Sentence, Symbol};
use gcs_induction::induction::{InductionConfig, InductionRunner, StopConfig};

const A: Symbol = -1;
const B: Symbol = -2;

fn anbn(n: usize) -> Vec<Symbol> {
    let mut s = vec![A; n];
    s.extend(vec![B; n]);
    s
}

/// S -> A B | A X, X -> S B, A -> a, B -> b
fn anbn_grammar() -> RulePopulation {
    RulePopulation::from_rules(
        PopulationConfig::default(),
        [
            Rule::non_terminal(1, 2, 3),
            Rule::non_terminal(1, 2, 4),
            Rule::non_terminal(4, 1, 3),
            Rule::terminal(2, A),
            Rule::terminal(3, B),
        ],
    )
}

fn corpus() -> Vec<Sentence> {
    let mut sentences: Vec<Sentence> = (1..=4).map(|n| Sentence::positive(anbn(n))).collect();
    for n in 1..=3 {
        let mut s = anbn(n);
        s.push(B);
        sentences.push(Sentence::negative(s));
        sentences.push(Sentence::negative(vec![B; n + 1]));
    }
    sentences
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_cyk_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("cyk_classify");
    let grammar = anbn_grammar();

    for &n in &[2usize, 8, 16] {
        let sentence = Sentence::positive(anbn(n));
        group.bench_with_input(BenchmarkId::from_parameter(2 * n), &sentence, |b, s| {
            b.iter(|| {
                let result = CykEngine::classify(black_box(&grammar), black_box(s));
                black_box(result)
            })
        });
    }
    group.finish();
}

fn bench_induction(c: &mut Criterion) {
    let mut group = c.benchmark_group("induction");
    group.sample_size(10);

    let sentences = corpus();
    let config = InductionConfig::default()
        .with_population(
            PopulationConfig::default()
                .with_max_non_terminal_symbols(8)
                .with_max_non_terminal_rules(60),
        )
        .with_stop(StopConfig::default().with_max_steps(20))
        .with_seed(42);

    group.bench_function("classic_20_steps", |b| {
        b.iter(|| {
            let result = InductionRunner::run(&ClassicExecutors, black_box(&sentences), black_box(&config));
            black_box(result)
        })
    });
    group.bench_function("stochastic_20_steps", |b| {
        b.iter(|| {
            let result = InductionRunner::run(&StochasticExecutors, black_box(&sentences), black_box(&config));
            black_box(result)
        })
    });
    group.finish();
}

criterion_group!(benches, bench_cyk_classify, bench_induction);
criterion_main!(benches);
