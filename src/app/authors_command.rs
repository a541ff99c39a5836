use super::{cli_manager::logging_level_cli_arg, command::Command};
use anyhow::Result;
use clap::{App, AppSettings, ArgMatches, SubCommand};

const CMD_NAME: &str = "authors";

/// Prints the name and the version of the application, followed by its authors.
pub(crate) struct AuthorsCommand {
    banner: String,
}

impl AuthorsCommand {
    pub(crate) fn new(app_name: &str, app_version: &str, authors: &str) -> Self {
        AuthorsCommand {
            banner: format!("{} {}\n{}", app_name, app_version, authors.replace(':', ", ")),
        }
    }
}

impl<'a> Command<'a> for AuthorsCommand {
    fn name(&self) -> &str {
        CMD_NAME
    }

    fn clap_subcommand(&self) -> App<'a, 'a> {
        SubCommand::with_name(CMD_NAME)
            .about("Displays the version and the authors of amlearn")
            .setting(AppSettings::DisableVersion)
            .arg(logging_level_cli_arg())
    }

    fn execute(&self, _arg_matches: &ArgMatches<'_>) -> Result<()> {
        println!("{}", self.banner);
        Ok(())
    }
}
