use super::{app_helper::AppHelper, command::Command, AuthorsCommand, CheckCommand, LearnCommand};
use amlearn::{
    io::{JsonProblemReader, Problem, ProblemReader},
    utils::LearnerConfig,
};
use anyhow::{Context, Result};
use clap::{Arg, ArgMatches};
use log::info;
use std::{
    fs::{self, File},
    io::BufReader,
    path::PathBuf,
};

pub(crate) fn create_app_helper() -> AppHelper<'static> {
    let app_name = option_env!("CARGO_PKG_NAME").unwrap_or("unknown app name");
    let app_version = option_env!("CARGO_PKG_VERSION").unwrap_or("unknown version");
    let authors = option_env!("CARGO_PKG_AUTHORS").unwrap_or("unknown authors");
    let mut app = AppHelper::new(
        app_name,
        app_version,
        authors,
        "amlearn, an action model learner for automated planning domains.",
    );
    let commands: Vec<Box<dyn Command>> = vec![
        Box::new(AuthorsCommand::new(app_name, app_version, authors)),
        Box::new(CheckCommand::new()),
        Box::new(LearnCommand::new()),
    ];
    for c in commands {
        app.add_command(c);
    }
    app
}

pub(crate) const ARG_INPUT: &str = "INPUT";

pub(crate) fn input_args() -> Arg<'static, 'static> {
    Arg::with_name(ARG_INPUT)
        .short("f")
        .empty_values(false)
        .multiple(false)
        .help("the JSON file that contains the domain and the plans")
        .required(true)
}

pub(crate) const ARG_CONFIG: &str = "CONFIG";

pub(crate) fn config_arg() -> Arg<'static, 'static> {
    Arg::with_name(ARG_CONFIG)
        .long("config")
        .empty_values(false)
        .multiple(false)
        .help("a JSON file overriding the default learner parameters")
        .required(false)
}

pub(crate) fn read_problem(arg_matches: &ArgMatches<'_>) -> Result<Problem> {
    let file_path = arg_matches
        .value_of(ARG_INPUT)
        .context("missing input file")?;
    let canonicalized = canonicalize_file_path(file_path)?;
    info!("reading input file {:?}", canonicalized);
    let mut file_reader = BufReader::new(File::open(canonicalized)?);
    let problem = JsonProblemReader::default()
        .read(&mut file_reader)
        .with_context(|| format!(r#"while reading problem file "{}""#, file_path))?;
    info!(
        "the domain has {} type(s), {} predicate(s) and {} operator(s)",
        problem.model.n_types(),
        problem.model.n_predicates(),
        problem.model.n_operators()
    );
    info!(
        "the problem has {} world(s) and {} plan(s)",
        problem.worlds.len(),
        problem.worlds.iter().map(|w| w.plans().len()).sum::<usize>()
    );
    Ok(problem)
}

pub(crate) fn read_config(arg_matches: &ArgMatches<'_>) -> Result<LearnerConfig> {
    match arg_matches.value_of(ARG_CONFIG) {
        Some(file_path) => {
            let canonicalized = canonicalize_file_path(file_path)?;
            info!("reading configuration file {:?}", canonicalized);
            let mut file_reader = BufReader::new(File::open(canonicalized)?);
            LearnerConfig::read_json(&mut file_reader)
                .with_context(|| format!(r#"while reading configuration file "{}""#, file_path))
        }
        None => Ok(LearnerConfig::default()),
    }
}

/// Canonicalize a path given by the user.
pub(crate) fn canonicalize_file_path(file_path: &str) -> Result<PathBuf> {
    fs::canonicalize(PathBuf::from(file_path))
        .with_context(|| format!(r#"while opening file "{}""#, file_path))
}
