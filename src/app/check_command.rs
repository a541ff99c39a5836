use super::{cli_manager::logging_level_cli_arg, command::Command, common};
use amlearn::transition::{apply_action, is_applicable};
use anyhow::{Context, Result};
use clap::{App, AppSettings, ArgMatches, SubCommand};
use log::{info, warn};

const CMD_NAME: &str = "check";

/// Reads a problem file and replays the plans against the operators that are already defined.
pub(crate) struct CheckCommand;

impl CheckCommand {
    pub(crate) fn new() -> Self {
        CheckCommand
    }
}

impl<'a> Command<'a> for CheckCommand {
    fn name(&self) -> &str {
        CMD_NAME
    }

    fn clap_subcommand(&self) -> App<'a, 'a> {
        SubCommand::with_name(CMD_NAME)
            .about("Checks a problem file for errors")
            .setting(AppSettings::DisableVersion)
            .arg(common::input_args())
            .arg(logging_level_cli_arg())
    }

    fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()> {
        let problem = common::read_problem(arg_matches)?;
        let model = &problem.model;
        let mut n_checked = 0;
        let mut n_mismatches = 0;
        for (i, plan) in problem.worlds.iter().flat_map(|w| w.plans()).enumerate() {
            for (k, action) in plan.actions().iter().enumerate() {
                if model.operator(action.operator()).is_undefined() {
                    continue;
                }
                let (before, after) = match (&plan.states()[k], &plan.states()[k + 1]) {
                    (Some(b), Some(a)) => (b, a),
                    _ => continue,
                };
                let context = || format!("in plan {}, step {}", i, k);
                if !is_applicable(model, action, before).with_context(context)? {
                    warn!(
                        "in plan {}, step {}: action {} is not applicable",
                        i,
                        k,
                        action.display(model)
                    );
                }
                let applied = apply_action(model, action, before).with_context(context)?;
                if &applied != after {
                    warn!(
                        "in plan {}, step {}: action {} does not lead to the observed state",
                        i,
                        k,
                        action.display(model)
                    );
                    n_mismatches += 1;
                }
                n_checked += 1;
            }
        }
        info!(
            "{} observed transition(s) checked, {} mismatch(es)",
            n_checked, n_mismatches
        );
        Ok(())
    }
}
