//! CYK table construction with on-demand coverage.

use rand::Rng;

use super::coverage::{CoverageConfig, CoverageOperator, CoverageOperators, CoverageSite};
use super::table::{Detector, Environment, Production, ProductionPool};
use super::traceback::Traceback;
use crate::error::Result;
use crate::grammar::{Label, Rule, RulePopulation, RuleStore, Sentence, StochasticRulePopulation, Symbol};
use crate::induction::GrammarState;
use crate::stats::{Classification, ClassicFitness, FitnessFunction, RuleStatistics};

/// Outcome of parsing one sentence.
#[derive(Debug, Clone)]
pub struct CykResult {
    /// Whether the top cell derives the starting symbol.
    pub belongs_to_grammar: bool,

    /// Label of the parsed sentence.
    pub label: Label,

    /// Verdict against the label; `None` for unknown labels.
    pub classification: Option<Classification>,

    /// The completed table.
    pub environment: Environment,
}

/// CYK parser. Holds the coverage operators applied while parsing.
#[derive(Debug, Clone)]
pub struct CykEngine {
    operators: CoverageOperators,
}

impl CykEngine {
    pub fn new(coverage: &CoverageConfig) -> Self {
        Self {
            operators: CoverageOperators::from_config(coverage),
        }
    }

    /// Engine whose parses never modify the grammar.
    pub fn without_coverage() -> Self {
        Self::new(&CoverageConfig::disabled())
    }

    /// Parses a sentence, synthesizing rules through the coverage operators
    /// where the table has gaps.
    ///
    /// Synthesized rules are submitted to the state's supervisor with the
    /// operator's hint and immediately take part in the rest of the parse.
    pub fn parse<P: RuleStore, R: Rng>(
        &self,
        sentence: &Sentence,
        state: &mut GrammarState<P>,
        rng: &mut R,
    ) -> Result<CykResult> {
        let n = sentence.len();
        let positive = sentence.is_positive();
        let start = state.population.population().starting_symbol();
        let mut env = Environment::new(n);

        for (col, &terminal) in sentence.symbols().iter().enumerate() {
            let mut pool = terminal_pool(&state.population, col, terminal);
            let site = CoverageSite::Terminal { col, terminal };
            if pool.has_no_effectors() {
                for op in [&self.operators.terminal, &self.operators.universal] {
                    if self.apply(op, site, &mut pool, &env, state, rng)? {
                        break;
                    }
                }
            }
            if n == 1 && positive && !pool.has_effector(start) {
                self.apply(&self.operators.starting, site, &mut pool, &env, state, rng)?;
            }
            *env.cell_mut(0, col)? = pool;
        }

        for row in 1..n {
            for col in 0..n - row {
                let mut pool = split_pool(&state.population, &env, row, col)?;
                let top = row == n - 1;
                if positive && pool.has_no_effectors() {
                    // One rule per empty cell: Full is preferred on the top cell,
                    // Aggressive below it; the other runs only if its gate fails.
                    let unsatisfied = pool.unsatisfied().to_vec();
                    let site = CoverageSite::Split {
                        detectors: &unsatisfied,
                    };
                    let order = if top {
                        [&self.operators.full, &self.operators.aggressive]
                    } else {
                        [&self.operators.aggressive, &self.operators.full]
                    };
                    for op in order {
                        if self.apply(op, site, &mut pool, &env, state, rng)? {
                            break;
                        }
                    }
                } else if positive && top && !pool.has_effector(start) {
                    let candidates = if pool.unsatisfied().is_empty() {
                        pool.detectors()
                    } else {
                        pool.unsatisfied().to_vec()
                    };
                    let site = CoverageSite::Split {
                        detectors: &candidates,
                    };
                    self.apply(&self.operators.full, site, &mut pool, &env, state, rng)?;
                }
                *env.cell_mut(row, col)? = pool;
            }
        }

        Ok(finish(sentence, start, env))
    }

    /// Parses a sentence against a fixed grammar, without coverage.
    pub fn classify<P: RuleStore>(population: &P, sentence: &Sentence) -> Result<CykResult> {
        let n = sentence.len();
        let mut env = Environment::new(n);
        for (col, &terminal) in sentence.symbols().iter().enumerate() {
            *env.cell_mut(0, col)? = terminal_pool(population, col, terminal);
        }
        for row in 1..n {
            for col in 0..n - row {
                let pool = split_pool(population, &env, row, col)?;
                *env.cell_mut(row, col)? = pool;
            }
        }
        Ok(finish(sentence, population.population().starting_symbol(), env))
    }

    /// Runs one coverage operator on `pool`. Returns `true` if a rule was
    /// synthesized and added to the cell.
    fn apply<P: RuleStore, R: Rng>(
        &self,
        op: &CoverageOperator,
        site: CoverageSite<'_>,
        pool: &mut ProductionPool,
        env: &Environment,
        state: &mut GrammarState<P>,
        rng: &mut R,
    ) -> Result<bool> {
        let Some((rule, detector)) = op.cover(state.population.population(), site, rng)? else {
            return Ok(false);
        };
        state.add_rule(rule, op.hint(), rng);
        let probability = state.population.probability(&rule) * inside_probability(env, &detector)?;
        pool.add(Production::new(detector, rule, probability));
        tracing::trace!(kind = ?op.kind(), rule = %rule, "coverage");
        Ok(true)
    }
}

fn finish(sentence: &Sentence, start: Symbol, environment: Environment) -> CykResult {
    let belongs_to_grammar = environment.top().is_some_and(|top| top.has_effector(start));
    CykResult {
        belongs_to_grammar,
        label: sentence.label(),
        classification: Classification::of(sentence.label(), belongs_to_grammar),
        environment,
    }
}

/// Row-0 cell: the terminal rule deriving `terminal`, if any.
fn terminal_pool<P: RuleStore>(population: &P, col: usize, terminal: Symbol) -> ProductionPool {
    let mut pool = ProductionPool::new();
    let detector = Detector::terminal(col, terminal);
    if let Some(rule) = population.population().terminal_rules(terminal) {
        pool.add(Production::new(detector, *rule, population.probability(rule)));
    }
    pool
}

/// Row ≥ 1 cell: every split and every effector pair of its child cells.
fn split_pool<P: RuleStore>(
    population: &P,
    env: &Environment,
    row: usize,
    col: usize,
) -> Result<ProductionPool> {
    let mut pool = ProductionPool::new();
    for shift in 0..row {
        let left = env.cell(shift, col)?;
        let right = env.cell(row - shift - 1, col + shift + 1)?;
        for &l in left.effectors() {
            for &r in right.effectors() {
                let detector = Detector::split(row, col, shift, l, r);
                match population.population().rules_by_right(&[l, r])? {
                    Some(rule) => {
                        let inside = left.best_probability(l) * right.best_probability(r);
                        let p = population.probability(rule) * inside;
                        pool.add(Production::new(detector, *rule, p));
                    }
                    None => pool.add(Production::empty(detector)),
                }
            }
        }
    }
    Ok(pool)
}

/// Product of the best child probabilities of a split detector; `1.0` for
/// terminal detectors.
fn inside_probability(env: &Environment, detector: &Detector) -> Result<f64> {
    let (Some((lr, lc)), Some((rr, rc)), Some(right)) =
        (detector.left_cell(), detector.right_cell(), detector.right)
    else {
        return Ok(1.0);
    };
    Ok(env.cell(lr, lc)?.best_probability(detector.left) * env.cell(rr, rc)?.best_probability(right))
}

/// Wiring of one grammar variant: its population type, traceback and the
/// post-pass hook.
pub trait CykExecutorSet {
    /// Population type parsed by this variant.
    type Population: RuleStore + Clone + Send;

    fn traceback(&self) -> Traceback;

    /// Fitness family used when the configuration does not pick one.
    fn default_fitness(&self) -> FitnessFunction;

    /// Wraps a plain population into this variant's population type.
    fn wrap(&self, population: RulePopulation) -> Self::Population;

    /// Called once per generation after the parse pass and the fitness
    /// update.
    fn after_pass(&self, population: &mut Self::Population, statistics: &RuleStatistics);

    /// Attributes rule usage of an accepted sentence to the statistics.
    /// Returns the number of usages recorded.
    fn record_usage(&self, result: &CykResult, state: &mut GrammarState<Self::Population>) -> Result<usize> {
        if !result.belongs_to_grammar {
            return Ok(0);
        }
        let start = state.population.population().starting_symbol();
        let used = self.traceback().trace(&result.environment, start)?;
        Ok(used
            .iter()
            .filter(|rule| state.statistics.record_usage(rule, result.label))
            .count())
    }
}

/// Classic GCS: plain population, exhaustive traceback.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicExecutors;

impl CykExecutorSet for ClassicExecutors {
    type Population = RulePopulation;

    fn traceback(&self) -> Traceback {
        Traceback::Exhaustive
    }

    fn default_fitness(&self) -> FitnessFunction {
        FitnessFunction::Classic(ClassicFitness::default())
    }

    fn wrap(&self, population: RulePopulation) -> RulePopulation {
        population
    }

    fn after_pass(&self, _population: &mut RulePopulation, _statistics: &RuleStatistics) {}
}

/// Stochastic GCS: probabilistic population, best-tree traceback and
/// probability re-estimation after every pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct StochasticExecutors;

impl CykExecutorSet for StochasticExecutors {
    type Population = StochasticRulePopulation;

    fn traceback(&self) -> Traceback {
        Traceback::BestTree
    }

    fn default_fitness(&self) -> FitnessFunction {
        FitnessFunction::Pasieka
    }

    fn wrap(&self, population: RulePopulation) -> StochasticRulePopulation {
        StochasticRulePopulation::from_population(population)
    }

    fn after_pass(&self, population: &mut StochasticRulePopulation, statistics: &RuleStatistics) {
        perform_probability_estimation(population, statistics);
    }
}

/// Re-estimates rule probabilities from accumulated fitness.
///
/// Each rule's raw weight becomes its fitness and parent groups are
/// renormalized. Groups whose parent went unused this pass keep their
/// weights.
pub fn perform_probability_estimation(
    population: &mut StochasticRulePopulation,
    statistics: &RuleStatistics,
) {
    let weights: Vec<(Rule, f64)> = population
        .population()
        .rules()
        .filter(|r| {
            statistics
                .left_side_info(r.parent())
                .is_some_and(|side| side.usage > 0)
        })
        .map(|r| (*r, statistics.fitness(r).max(0.0)))
        .collect();
    population.set_weights(weights);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adding::{AddingRuleHint, CrowdingConfig, ElitismConfig, RuleAddingSupervisor};
    use crate::cyk::coverage::CoverageOperatorConfig;
    use crate::grammar::PopulationConfig;
    use crate::random::create_rng;

    const S: Symbol = 1;
    const A: Symbol = 2;
    const B: Symbol = 3;
    const TA: Symbol = -1;
    const TB: Symbol = -2;

    fn ab_grammar() -> RulePopulation {
        RulePopulation::from_rules(
            PopulationConfig::default(),
            [
                Rule::non_terminal(S, A, B),
                Rule::terminal(A, TA),
                Rule::terminal(B, TB),
            ],
        )
    }

    fn state<P: RuleStore>(population: P, function: FitnessFunction) -> GrammarState<P> {
        GrammarState::new(
            population,
            function,
            RuleAddingSupervisor::with_defaults(CrowdingConfig::default(), ElitismConfig::default()),
        )
    }

    #[test]
    fn test_accepts_ab_rejects_aa() {
        let pop = ab_grammar();
        let ab = CykEngine::classify(&pop, &Sentence::positive(vec![TA, TB])).unwrap();
        assert!(ab.belongs_to_grammar);
        assert_eq!(ab.classification, Some(Classification::TruePositive));

        let aa = CykEngine::classify(&pop, &Sentence::negative(vec![TA, TA])).unwrap();
        assert!(!aa.belongs_to_grammar);
        assert_eq!(aa.classification, Some(Classification::TrueNegative));
        let top = aa.environment.top().unwrap();
        assert_eq!(top.unsatisfied(), &[Detector::split(1, 0, 0, A, A)]);
    }

    #[test]
    fn test_longer_sentence() {
        // S -> A S2, S2 -> S B : a^n b^n
        let pop = RulePopulation::from_rules(
            PopulationConfig::default(),
            [
                Rule::non_terminal(S, A, B),
                Rule::non_terminal(S, A, 4),
                Rule::non_terminal(4, S, B),
                Rule::terminal(A, TA),
                Rule::terminal(B, TB),
            ],
        );
        let accept = |s: Vec<Symbol>| {
            CykEngine::classify(&pop, &Sentence::positive(s))
                .unwrap()
                .belongs_to_grammar
        };
        assert!(accept(vec![TA, TA, TB, TB]));
        assert!(accept(vec![TA, TA, TA, TB, TB, TB]));
        assert!(!accept(vec![TA, TB, TA, TB]));
        assert!(!accept(vec![TA, TA, TB]));
    }

    #[test]
    fn test_empty_sentence_is_rejected() {
        let result = CykEngine::classify(&ab_grammar(), &Sentence::positive(vec![])).unwrap();
        assert!(!result.belongs_to_grammar);
    }

    #[test]
    fn test_parse_without_coverage_leaves_grammar_unchanged() {
        let mut st = state(ab_grammar(), FitnessFunction::default());
        let mut rng = create_rng(1);
        let engine = CykEngine::without_coverage();
        let result = engine
            .parse(&Sentence::positive(vec![TA, -3]), &mut st, &mut rng)
            .unwrap();
        assert!(!result.belongs_to_grammar);
        assert_eq!(st.population.len(), 3);
    }

    #[test]
    fn test_terminal_and_full_coverage_make_sentence_parse() {
        // a single non-terminal symbol makes every random parent S
        let config = PopulationConfig::default().with_max_non_terminal_symbols(1);
        let grammar = RulePopulation::from_rules(config, ab_grammar().to_rules());
        let mut st = state(grammar, FitnessFunction::default());
        let mut rng = create_rng(5);
        let engine = CykEngine::new(&CoverageConfig::default());
        let sentence = Sentence::positive(vec![TA, -3]);
        let result = engine.parse(&sentence, &mut st, &mut rng).unwrap();

        assert!(result.belongs_to_grammar);
        // terminal coverage adds S -> c, then the empty top cell gets S -> A S
        assert!(st.population.has_rule(&Rule::terminal(S, -3)));
        assert!(st.population.has_rule(&Rule::non_terminal(S, A, S)));
        assert_eq!(st.population.len(), 5);
        assert_eq!(st.statistics.len(), 5);

        // the grammar learned it: a plain parse now accepts
        assert!(CykEngine::classify(&st.population, &sentence).unwrap().belongs_to_grammar);
    }

    #[test]
    fn test_full_coverage_alone_fills_lower_cells() {
        let grammar = RulePopulation::from_rules(
            PopulationConfig::default(),
            [Rule::terminal(A, TA), Rule::terminal(B, TB)],
        );
        let coverage = CoverageConfig::disabled()
            .with_full(CoverageOperatorConfig::new(1.0, AddingRuleHint::ExpandPopulation));
        let mut st = state(grammar, FitnessFunction::default());
        let mut rng = create_rng(3);
        let result = CykEngine::new(&coverage)
            .parse(&Sentence::positive(vec![TA, TB, TB]), &mut st, &mut rng)
            .unwrap();

        assert!(result.belongs_to_grammar);
        // both row-1 cells and then the top cell get one start rule each
        assert!(st.population.has_rule(&Rule::non_terminal(S, A, B)));
        assert!(st.population.has_rule(&Rule::non_terminal(S, B, B)));
        assert_eq!(st.population.len(), 5);
    }

    #[test]
    fn test_empty_top_cell_gets_a_single_rule() {
        let coverage = CoverageConfig::disabled()
            .with_aggressive(CoverageOperatorConfig::new(1.0, AddingRuleHint::ExpandPopulation))
            .with_full(CoverageOperatorConfig::new(1.0, AddingRuleHint::ExpandPopulation));
        let mut st = state(ab_grammar(), FitnessFunction::default());
        let mut rng = create_rng(3);
        let result = CykEngine::new(&coverage)
            .parse(&Sentence::positive(vec![TB, TA]), &mut st, &mut rng)
            .unwrap();

        assert!(result.belongs_to_grammar);
        assert!(st.population.has_rule(&Rule::non_terminal(S, B, A)));
        assert_eq!(st.population.len(), 4);
    }

    #[test]
    fn test_starting_coverage_on_single_terminal() {
        let coverage = CoverageConfig::disabled().with_starting(CoverageOperatorConfig::new(
            1.0,
            AddingRuleHint::ExpandPopulation,
        ));
        let mut st = state(ab_grammar(), FitnessFunction::default());
        let mut rng = create_rng(5);
        let result = CykEngine::new(&coverage)
            .parse(&Sentence::positive(vec![TA]), &mut st, &mut rng)
            .unwrap();
        assert!(result.belongs_to_grammar);
        assert!(st.population.has_rule(&Rule::terminal(S, TA)));
        // S -> a takes the terminal's slot from A -> a
        assert!(!st.population.has_rule(&Rule::terminal(A, TA)));
        assert_eq!(st.population.len(), 3);
        assert!(!st.statistics.tracks(&Rule::terminal(A, TA)));
    }

    #[test]
    fn test_no_structural_coverage_on_negative_sentences() {
        let mut st = state(ab_grammar(), FitnessFunction::default());
        let mut rng = create_rng(5);
        let engine = CykEngine::new(&CoverageConfig::default());
        let result = engine
            .parse(&Sentence::negative(vec![TB, TA]), &mut st, &mut rng)
            .unwrap();
        assert!(!result.belongs_to_grammar);
        assert_eq!(result.classification, Some(Classification::TrueNegative));
        assert_eq!(st.population.len(), 3);
    }

    #[test]
    fn test_universal_coverage_without_symbol_fails() {
        let coverage = CoverageConfig::disabled().with_universal(CoverageOperatorConfig::new(
            1.0,
            AddingRuleHint::ExpandPopulation,
        ));
        let mut st = state(ab_grammar(), FitnessFunction::default());
        let mut rng = create_rng(5);
        let err = CykEngine::new(&coverage)
            .parse(&Sentence::positive(vec![-7]), &mut st, &mut rng)
            .unwrap_err();
        assert_eq!(err, crate::error::Error::MissingUniversalSymbol);
    }

    #[test]
    fn test_classic_record_usage() {
        let mut st = state(ab_grammar(), FitnessFunction::default());
        let result = CykEngine::classify(&st.population, &Sentence::positive(vec![TA, TB])).unwrap();
        let recorded = ClassicExecutors.record_usage(&result, &mut st).unwrap();
        assert_eq!(recorded, 3);
        let info = st.statistics.rule_info(&Rule::non_terminal(S, A, B)).unwrap();
        assert_eq!(info.valid_usage, 1);
    }

    #[test]
    fn test_stochastic_viterbi_and_estimation() {
        const X: Symbol = 4;
        let mut base = ab_grammar();
        base.add_rule(Rule::non_terminal(X, A, A));
        base.add_rule(Rule::non_terminal(S, A, X));
        base.add_rule(Rule::non_terminal(S, X, A));
        let pop = StochasticExecutors.wrap(base);
        let mut st = state(pop, FitnessFunction::Pasieka);

        // "a a a": S -> A X and S -> X A both parse, the best tree takes one
        let sentence = Sentence::positive(vec![TA, TA, TA]);
        let result = CykEngine::classify(&st.population, &sentence).unwrap();
        assert!(result.belongs_to_grammar);
        let recorded = StochasticExecutors.record_usage(&result, &mut st).unwrap();
        // S rule, X -> A A, and A -> a three times
        assert_eq!(recorded, 5);

        st.statistics.update_fitness();
        StochasticExecutors.after_pass(&mut st.population, &st.statistics);
        for parent in [S, A, B, X] {
            assert!((st.population.parent_probability_sum(parent) - 1.0).abs() < 1e-9);
        }
        assert_eq!(st.population.probability(&Rule::non_terminal(S, A, B)), 0.0);
    }
}
