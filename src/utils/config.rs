use anyhow::{anyhow, Context, Result};
use rand::{rngs::StdRng, SeedableRng};
use serde::Deserialize;
use std::io::Read;
use strum_macros::{AsRefStr, EnumIter, EnumString};

/// The local search heuristics available to solve weighted MAX-SAT formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumIter, EnumString, Deserialize)]
pub enum LocalSearch {
    /// Greedy flips with random restarts.
    #[strum(serialize = "gsat")]
    #[serde(rename = "gsat")]
    Gsat,
    /// Random walk over unsatisfied clauses.
    #[strum(serialize = "walksat")]
    #[serde(rename = "walksat")]
    WalkSat,
}

/// The numeric tunables of the learners.
///
/// Every field has a default value, so a configuration file only needs to give the overridden ones.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LearnerConfig {
    /// Lower bound of the random weights given to undecided operators.
    pub operator_weight_min: u32,
    /// Upper bound of the random weights given to undecided operators.
    pub operator_weight_max: u32,
    /// Weight of information constraints.
    pub information_weight: f64,
    /// Weight multiplier of frequency-derived unit clauses.
    pub frequency_weight: f64,
    /// Weight multiplier of plan constraints.
    pub plan_weight: f64,
    /// Ratio above which a tallied fact becomes a unit clause.
    pub probability_threshold: f64,
    /// Ratio from which a pair of consecutive operators produces plan constraints.
    pub plan_frequency_threshold: f64,
    /// Number of restarts of the local search.
    pub max_restarts: usize,
    /// Number of steps without improvement ending a restart.
    pub max_non_improving_steps: usize,
    /// Maximal number of flips of a restart.
    pub max_flips: usize,
    /// Probability to flip a random variable instead of the best one.
    pub random_flip_probability: f64,
    /// Number of true variables an operator may have before being penalized.
    pub size_bound: usize,
    /// Penalty applied to each operator exceeding the size bound.
    pub size_penalty: f64,
    /// The local search heuristic.
    pub local_search: LocalSearch,
    /// A seed for the random number generator; entropy is used if unset.
    pub seed: Option<u64>,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            operator_weight_min: 50,
            operator_weight_max: 100,
            information_weight: 20.,
            frequency_weight: 20.,
            plan_weight: 20.,
            probability_threshold: 0.5,
            plan_frequency_threshold: 0.1,
            max_restarts: 10,
            max_non_improving_steps: 50,
            max_flips: 10_000,
            random_flip_probability: 0.1,
            size_bound: 30,
            size_penalty: 10.,
            local_search: LocalSearch::Gsat,
            seed: None,
        }
    }
}

impl LearnerConfig {
    /// Reads a configuration from a JSON document.
    ///
    /// Missing fields take their default values.
    ///
    /// # Example
    ///
    /// ```
    /// # use amlearn::utils::LearnerConfig;
    /// let config = LearnerConfig::read_json(&mut r#"{"max_restarts": 3}"#.as_bytes()).unwrap();
    /// assert_eq!(3, config.max_restarts);
    /// assert_eq!(LearnerConfig::default().max_flips, config.max_flips);
    /// ```
    pub fn read_json(reader: &mut dyn Read) -> Result<Self> {
        let config: LearnerConfig =
            serde_json::from_reader(reader).context("while reading the learner configuration")?;
        config.check()?;
        Ok(config)
    }

    /// Checks the consistency of the values.
    pub fn check(&self) -> Result<()> {
        if self.operator_weight_min == 0 || self.operator_weight_min > self.operator_weight_max {
            return Err(anyhow!(
                "operator weights must satisfy 0 < min <= max, got [{}, {}]",
                self.operator_weight_min,
                self.operator_weight_max
            ));
        }
        let probabilities = [
            ("probability_threshold", self.probability_threshold),
            ("plan_frequency_threshold", self.plan_frequency_threshold),
            ("random_flip_probability", self.random_flip_probability),
        ];
        if let Some((name, value)) = probabilities
            .iter()
            .find(|(_, v)| !(0. ..=1.).contains(v))
        {
            return Err(anyhow!("{} must be in [0, 1], got {}", name, value));
        }
        if self.max_restarts == 0 {
            return Err(anyhow!("at least one local search restart is required"));
        }
        Ok(())
    }

    /// Builds the random number generator of a learning run.
    pub fn new_rng(&self) -> StdRng {
        match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        }
    }
}
