use std::fmt::Display;

use tracing::warn;

use crate::{Resource, ServiceState};

/// Runs a check and turns a failure into a check result instead of a crash.
pub struct Runner<E> {
    name: String,
    on_error: Option<Box<dyn FnOnce(&E) -> (ServiceState, String)>>,
}

impl<E: Display> Runner<E> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            on_error: None,
        }
    }

    pub fn on_error(mut self, f: impl FnOnce(&E) -> (ServiceState, String) + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    /// This will run either the default `on_error` handler, which reports [ServiceState::Unknown]
    /// with the error message, or the one specified by calling [Runner::on_error].
    pub fn safe_run(self, f: impl FnOnce() -> Result<Resource, E>) -> RunnerResult {
        match f() {
            Ok(resource) => RunnerResult::Ok(resource),
            Err(err) => {
                let (state, msg) = self
                    .on_error
                    .map(|f| f(&err))
                    .unwrap_or_else(|| (ServiceState::Unknown, err.to_string()));
                warn!(%state, error = %err, "check failed");

                RunnerResult::Err(Resource::new(&self.name, state).with_description(msg))
            }
        }
    }
}

#[derive(Debug)]
pub enum RunnerResult {
    Ok(Resource),
    Err(Resource),
}

impl RunnerResult {
    pub fn resource(&self) -> &Resource {
        match self {
            RunnerResult::Ok(resource) | RunnerResult::Err(resource) => resource,
        }
    }

    pub fn print_and_exit(self) -> ! {
        self.resource().print_and_exit()
    }
}
