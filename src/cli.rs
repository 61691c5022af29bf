use std::ffi::OsString;

use clap::Parser;

use crate::gmond::{DEFAULT_PORT, DEFAULT_SERVER};

/// Printed instead of any clap report whenever the arguments can't be used.
pub const USAGE: &str = "Usage: check_ganglia -h|--host= -m|--metric= -w|--warning= -c|--critical= [-s|--server=] [-p|--port=] ";

// Required values are optional here so a missing one is reported with USAGE, not by clap.
/// Checks a single metric of a single host against the XML feed of a ganglia gmond daemon.
#[derive(Debug, Parser)]
#[command(name = "check_ganglia", disable_help_flag = true, args_override_self = true)]
pub struct Cli {
    /// Name of the host as reported in the gmond feed
    #[arg(short = 'h', long)]
    pub host: Option<String>,
    /// Name of the metric to check
    #[arg(short, long)]
    pub metric: Option<String>,
    /// Warning threshold
    #[arg(short, long, allow_negative_numbers = true)]
    pub warning: Option<f64>,
    /// Critical threshold, lower than the warning threshold if lower values are worse
    #[arg(short, long, allow_negative_numbers = true)]
    pub critical: Option<f64>,
    /// Address of the gmond daemon
    #[arg(short, long, default_value = DEFAULT_SERVER)]
    pub server: String,
    /// TCP port of the gmond daemon
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Print an icinga CheckCommand definition for this plugin and exit
    #[arg(long, hide = true)]
    pub icinga_command: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    #[error("{0}")]
    Invalid(#[from] clap::Error),
    #[error("missing required argument --{0}")]
    Missing(&'static str),
}

/// Everything a single check needs to know.
#[derive(Clone, Debug, PartialEq)]
pub struct Invocation {
    pub host: String,
    pub metric: String,
    pub warning: f64,
    pub critical: f64,
    pub server: String,
    pub port: u16,
}

/// What the command line asks for.
#[derive(Debug, PartialEq)]
pub enum Request {
    Check(Invocation),
    IcingaCommand,
}

impl Cli {
    pub fn into_invocation(self) -> Result<Invocation, UsageError> {
        Ok(Invocation {
            host: self.host.ok_or(UsageError::Missing("host"))?,
            metric: self.metric.ok_or(UsageError::Missing("metric"))?,
            warning: self.warning.ok_or(UsageError::Missing("warning"))?,
            critical: self.critical.ok_or(UsageError::Missing("critical"))?,
            server: self.server,
            port: self.port,
        })
    }
}

/// Parses a full argument list, including the program name.
pub fn parse_from<I, T>(args: I) -> Result<Request, UsageError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;

    if cli.icinga_command {
        return Ok(Request::IcingaCommand);
    }

    cli.into_invocation().map(Request::Check)
}
