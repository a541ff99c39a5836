use super::{cli_manager::logging_level_cli_arg, command::Command, common};
use amlearn::{
    io::DomainWriter,
    learners::{self, LearningAlgorithm, LearningStatus},
    utils::CancellationToken,
};
use anyhow::{anyhow, Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use log::{info, warn};
use std::{
    str::FromStr,
    time::{Duration, Instant},
};
use strum::IntoEnumIterator;

const CMD_NAME: &str = "learn";

const ARG_ALGORITHM: &str = "ALGORITHM";
const ARG_TIMEOUT: &str = "TIMEOUT";
const ARG_SEED: &str = "SEED";

const POLLING_INTERVAL: Duration = Duration::from_millis(10);

/// Learns the operators of a domain and writes the resulting domain to the standard output.
pub(crate) struct LearnCommand {
    algorithms: Vec<&'static str>,
}

impl LearnCommand {
    pub(crate) fn new() -> Self {
        LearnCommand {
            algorithms: LearningAlgorithm::iter().map(|a| a.into()).collect(),
        }
    }
}

impl<'a> Command<'a> for LearnCommand {
    fn name(&self) -> &str {
        CMD_NAME
    }

    fn clap_subcommand(&self) -> App<'a, 'a> {
        let default_algorithm: &'static str = LearningAlgorithm::Arms.into();
        SubCommand::with_name(CMD_NAME)
            .about("Learns the preconditions and effects of the operators of a domain")
            .setting(AppSettings::DisableVersion)
            .arg(common::input_args())
            .arg(
                Arg::with_name(ARG_ALGORITHM)
                    .short("a")
                    .long("algorithm")
                    .empty_values(false)
                    .multiple(false)
                    .possible_values(&self.algorithms)
                    .default_value(default_algorithm)
                    .help("the learning algorithm")
                    .required(false),
            )
            .arg(common::config_arg())
            .arg(
                Arg::with_name(ARG_SEED)
                    .long("seed")
                    .empty_values(false)
                    .multiple(false)
                    .help("the seed of the random number generator (overrides the configuration)")
                    .required(false),
            )
            .arg(
                Arg::with_name(ARG_TIMEOUT)
                    .long("timeout")
                    .empty_values(false)
                    .multiple(false)
                    .help("the time limit in seconds after which the learning is cancelled")
                    .required(false),
            )
            .arg(logging_level_cli_arg())
    }

    fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()> {
        let problem = common::read_problem(arg_matches)?;
        let mut config = common::read_config(arg_matches)?;
        if let Some(s) = arg_matches.value_of(ARG_SEED) {
            config.seed = Some(
                s.parse::<u64>()
                    .with_context(|| format!("invalid seed: {}", s))?,
            );
        }
        let timeout = arg_matches
            .value_of(ARG_TIMEOUT)
            .map(|t| {
                t.parse::<f64>()
                    .ok()
                    .filter(|secs| secs.is_finite() && *secs >= 0.)
                    .map(Duration::from_secs_f64)
                    .ok_or_else(|| anyhow!("invalid timeout: {}", t))
            })
            .transpose()?;
        let algorithm = LearningAlgorithm::from_str(
            arg_matches
                .value_of(ARG_ALGORITHM)
                .context("missing learning algorithm")?,
        )?;
        info!("learning with algorithm {}", algorithm.as_ref());
        let learner = learners::new_learner(algorithm, config);
        let start = Instant::now();
        let handle = learners::run_in_background(
            learner,
            problem.model,
            problem.worlds,
            CancellationToken::default(),
        );
        if let Some(t) = timeout {
            while !handle.is_finished() {
                if start.elapsed() >= t {
                    warn!("timeout reached; cancelling the learning run");
                    handle.cancel();
                    break;
                }
                std::thread::sleep(POLLING_INTERVAL);
            }
        }
        let (model, status) = handle.join().context("while learning the operators")?;
        info!("learning took {:?}", start.elapsed());
        match status {
            LearningStatus::Completed => {
                DomainWriter::default().write_domain(&model, &mut std::io::stdout())
            }
            LearningStatus::Cancelled => Err(anyhow!("the learning run was cancelled")),
        }
    }
}
