//! The check_ganglia crate reads a single metric of a single host from the XML feed of a ganglia
//! gmond daemon and turns it into a nagios/icinga check result.

use std::fmt;
use std::process;

pub mod check;
pub mod cli;
pub mod gmond;
pub mod icinga;
mod runner;
pub mod threshold;

pub use crate::check::{check, PLUGIN_NAME};
pub use crate::runner::{Runner, RunnerResult};
pub use crate::threshold::TriggerIfValue;

/// A Resource represents the outcome of a single check if you view it from the perspective of
/// nagios: a state and a human readable description, prefixed by the name of the plugin.
///
/// ```rust
/// # use check_ganglia::{Resource, ServiceState};
/// let resource = Resource::new("CHECKGANGLIA", ServiceState::Warning)
///     .with_description("load_one is 5.50");
/// assert_eq!(&resource.to_nagios_string(), "CHECKGANGLIA WARNING: load_one is 5.50");
/// assert_eq!(resource.exit_code(), 1);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Resource {
    name: String,
    state: ServiceState,
    description: Option<String>,
}

impl Resource {
    pub fn new(name: &str, state: ServiceState) -> Self {
        Resource {
            name: name.to_owned(),
            state,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the single status line nagios reads to determine the service state.
    pub fn to_nagios_string(&self) -> String {
        let mut s = format!("{} {}", self.name, self.state);

        if let Some(ref description) = self.description {
            s.push_str(&format!(": {}", description));
        }

        s
    }

    /// Will return the exit code of the state of this resource.
    pub fn exit_code(&self) -> i32 {
        self.state.exit_code()
    }

    /// Will print Self::to_nagios_string and exit with the exit code from Self::exit_code
    pub fn print_and_exit(&self) -> ! {
        println!("{}", self.to_nagios_string());
        process::exit(self.exit_code());
    }
}

/// Represents a service state from nagios.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceState {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl ServiceState {
    /// Returns the corresponding nagios exit code to signal the service state of self.
    pub fn exit_code(&self) -> i32 {
        match self {
            ServiceState::Ok => 0,
            ServiceState::Warning => 1,
            ServiceState::Critical => 2,
            ServiceState::Unknown => 3,
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceState::Ok => "OK",
            ServiceState::Warning => "WARNING",
            ServiceState::Critical => "CRITICAL",
            ServiceState::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}
