use anyhow::Result;
use clap::{App, ArgMatches};

/// A subcommand of the application.
///
/// A command describes its own arguments as a clap subcommand, and runs itself given the matched arguments.
/// Command names must be unique among the commands of an application.
pub(crate) trait Command<'a> {
    /// Returns the name of the command, as typed on the command line.
    fn name(&self) -> &str;

    /// Returns the clap subcommand describing the arguments of this command.
    fn clap_subcommand(&self) -> App<'a, 'a>;

    /// Runs the command.
    ///
    /// An error makes the application exit with a failure status code.
    fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()>;
}
