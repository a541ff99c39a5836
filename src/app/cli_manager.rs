use super::{app_helper::init_logger_with_level, command::Command};
use anyhow::{anyhow, Result};
use clap::{App, AppSettings, Arg};
use log::{info, LevelFilter};
use std::{ffi::OsString, str::FromStr};
use sysinfo::System;

/// Handles the set of commands and dispatches the CLI arguments to them.
pub(crate) struct CliManager<'a> {
    app_name: &'a str,
    version: &'a str,
    author: &'a str,
    about: &'a str,
    commands: Vec<Box<dyn Command<'a>>>,
}

const LOGGING_LEVEL_ARG: &str = "LOGGING_LEVEL";

pub(crate) fn logging_level_cli_arg<'a>() -> Arg<'a, 'a> {
    Arg::with_name(LOGGING_LEVEL_ARG)
        .long("logging-level")
        .multiple(false)
        .default_value("info")
        .possible_values(&["trace", "debug", "info", "warn", "error", "off"])
        .help("set the minimal logging level")
}

impl<'a> CliManager<'a> {
    pub(crate) fn new(app_name: &'a str, version: &'a str, author: &'a str, about: &'a str) -> Self {
        CliManager {
            app_name,
            version,
            author,
            about,
            commands: vec![],
        }
    }

    pub(crate) fn add_command(&mut self, command: Box<dyn Command<'a>>) {
        self.commands.push(command);
    }

    pub(crate) fn parse_cli<I, T>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut app = App::new(self.app_name)
            .global_setting(AppSettings::DisableVersion)
            .global_setting(AppSettings::VersionlessSubcommands)
            .setting(AppSettings::SubcommandRequiredElseHelp)
            .version(self.version)
            .author(self.author)
            .about(self.about);
        for c in self.commands.iter() {
            app = app.subcommand(c.clap_subcommand());
        }
        match app.get_matches_from_safe(args) {
            Ok(matches) => {
                let (name, sub_matches) = matches.subcommand();
                let command = self
                    .commands
                    .iter()
                    .find(|c| c.name() == name)
                    .ok_or_else(|| anyhow!("unknown command {}", name))?;
                let sub_matches =
                    sub_matches.ok_or_else(|| anyhow!("missing arguments for command {}", name))?;
                let level = sub_matches
                    .value_of(LOGGING_LEVEL_ARG)
                    .and_then(|l| LevelFilter::from_str(l).ok())
                    .unwrap_or(LevelFilter::Info);
                init_logger_with_level(level);
                info!("{} {}", self.app_name, self.version);
                sys_info();
                command.execute(sub_matches)
            }
            Err(clap::Error {
                kind: clap::ErrorKind::HelpDisplayed,
                message,
                ..
            }) => {
                println!("{}", message);
                Ok(())
            }
            Err(e) => Err(anyhow!("{}", e.message)),
        }
    }
}

fn sys_info() {
    info!("----------------------------------------");
    let sys = System::new_all();
    let unknown = || "[unknown]".to_string();
    info!("running on {}", System::host_name().unwrap_or_else(unknown));
    info!(
        "OS is {} {} with kernel {}",
        System::name().unwrap_or_else(unknown),
        System::os_version().unwrap_or_else(unknown),
        System::kernel_version().unwrap_or_else(unknown)
    );
    let mut cpu_kinds: Vec<&str> = sys.cpus().iter().map(|c| c.brand()).collect();
    cpu_kinds.sort_unstable();
    cpu_kinds.dedup();
    info!(
        "physical core count: {} {:?}",
        sys.physical_core_count()
            .map(|n| n.to_string())
            .unwrap_or_else(unknown),
        cpu_kinds
    );
    info!("total memory: {} KB", sys.total_memory() / 1024);
    info!("----------------------------------------");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{ArgMatches, SubCommand};
    use std::{cell::RefCell, rc::Rc};

    struct FlagCommand {
        executed: Rc<RefCell<bool>>,
        flag_set: Rc<RefCell<bool>>,
    }

    impl<'a> Command<'a> for FlagCommand {
        fn name(&self) -> &str {
            "flag"
        }

        fn clap_subcommand(&self) -> App<'a, 'a> {
            SubCommand::with_name("flag")
                .arg(Arg::with_name("FLAG").short("x"))
                .arg(logging_level_cli_arg())
        }

        fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()> {
            *self.executed.borrow_mut() = true;
            *self.flag_set.borrow_mut() = arg_matches.is_present("FLAG");
            Ok(())
        }
    }

    fn run(args: Vec<&'static str>) -> Result<(bool, bool)> {
        let mut manager = CliManager::new("app", "0.0.0", "author", "about");
        let executed = Rc::new(RefCell::new(false));
        let flag_set = Rc::new(RefCell::new(false));
        manager.add_command(Box::new(FlagCommand {
            executed: Rc::clone(&executed),
            flag_set: Rc::clone(&flag_set),
        }));
        manager.parse_cli(args)?;
        let result = (*executed.borrow(), *flag_set.borrow());
        Ok(result)
    }

    #[test]
    fn test_command() {
        assert_eq!((true, false), run(vec!["app", "flag", "--logging-level", "off"]).unwrap());
    }

    #[test]
    fn test_command_with_flag() {
        assert_eq!(
            (true, true),
            run(vec!["app", "flag", "-x", "--logging-level", "off"]).unwrap()
        );
    }

    #[test]
    fn test_wrong_subcommand() {
        assert!(run(vec!["app", "foo"]).is_err());
    }

    #[test]
    fn test_wrong_arg() {
        assert!(run(vec!["app", "flag", "-y"]).is_err());
    }

    #[test]
    fn test_help() {
        assert_eq!((false, false), run(vec!["app", "-h"]).unwrap());
        assert_eq!((false, false), run(vec!["app", "flag", "-h"]).unwrap());
    }
}
