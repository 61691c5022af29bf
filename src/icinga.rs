//! Generation of an Icinga 2 `CheckCommand` definition from the command line interface.

use clap::ArgAction;

pub struct CommandDescription {
    arguments: Vec<ArgumentDescription>,
}

struct ArgumentDescription {
    long: String,
    var: String,
    description: Option<String>,
    is_flag: bool,
    default_value: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ToIcingaCommandError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid executable path")]
    InvalidExecutablePath,
    #[error("error converting to command description: {0}")]
    CommandDescriptionFromError(#[from] CommandDescriptionFromError),
}

impl CommandDescription {
    /// Renders the definition. Custom variables are prefixed with `name`, so the check for
    /// `--host` reads `$ganglia_host$` when `name` is "ganglia".
    pub fn to_icinga_command(&self, name: &str, command_path: &str) -> String {
        let mut out = format!("object CheckCommand \"{name}\" {{\n");

        out.push_str(&format!("  command = [ \"{}\" ]\n", escape_string(command_path)));
        out.push_str("  arguments = {\n");
        for arg in &self.arguments {
            out.push_str(&format!("    \"--{}\" = {{\n", arg.long));

            if arg.is_flag {
                out.push_str(&format!("      set_if = \"${name}_{}$\"\n", arg.var));
            } else {
                out.push_str(&format!("      value = \"${name}_{}$\"\n", arg.var));
            }

            if let Some(description) = &arg.description {
                out.push_str(&format!(
                    "      description = \"{}\"\n",
                    escape_string(description)
                ));
            }

            out.push_str("    }\n");
        }
        out.push_str("  }\n");

        let defaults: Vec<_> = self
            .arguments
            .iter()
            .filter_map(|arg| arg.default_value.as_ref().map(|value| (arg, value)))
            .collect();
        if !defaults.is_empty() {
            out.push('\n');
        }
        for (arg, default_value) in defaults {
            out.push_str(&format!(
                "  vars.{name}_{} = \"{}\"\n",
                arg.var,
                escape_string(default_value)
            ));
        }

        out.push_str("}\n");
        out
    }
}

fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "$$")
}

#[derive(Debug, thiserror::Error)]
pub enum CommandDescriptionFromError {
    #[error("argument {0} has no long name")]
    MissingLongArgument(String),
}

impl TryFrom<&clap::Command> for CommandDescription {
    type Error = CommandDescriptionFromError;

    fn try_from(cmd: &clap::Command) -> Result<Self, Self::Error> {
        let mut arguments = Vec::new();

        for arg in cmd.get_arguments().filter(|arg| !arg.is_hide_set()) {
            let long = arg
                .get_long()
                .ok_or_else(|| {
                    CommandDescriptionFromError::MissingLongArgument(arg.get_id().to_string())
                })?
                .to_owned();

            let var = long.replace('-', "_");
            let description = arg.get_help().map(|s| s.to_string());
            let is_flag = matches!(arg.get_action(), ArgAction::SetTrue | ArgAction::SetFalse);

            let default_value = arg
                .get_default_values()
                .first()
                .and_then(|v| v.to_str())
                .map(|s| s.to_string());

            arguments.push(ArgumentDescription {
                long,
                var,
                description,
                is_flag,
                default_value,
            });
        }

        Ok(CommandDescription { arguments })
    }
}

/// Returns the Icinga 2 `CheckCommand` definition for `cmd`, pointing at the running executable.
pub fn check_command_config(
    name: &str,
    cmd: &clap::Command,
) -> Result<String, ToIcingaCommandError> {
    let description = CommandDescription::try_from(cmd)?;
    let current_exe = std::env::current_exe()?;
    let command_path = current_exe
        .to_str()
        .ok_or(ToIcingaCommandError::InvalidExecutablePath)?;

    Ok(description.to_icinga_command(name, command_path))
}
