use tracing::debug;

use crate::cli::Invocation;
use crate::gmond::{self, ExtractError};
use crate::threshold;
use crate::{Resource, ServiceState};

/// Printed in front of every status line.
pub const PLUGIN_NAME: &str = "CHECKGANGLIA";

/// Fetches the requested metric from gmond and classifies it.
pub fn check(invocation: &Invocation) -> Result<Resource, ExtractError> {
    let value = gmond::fetch_metric(
        &invocation.server,
        invocation.port,
        &invocation.host,
        &invocation.metric,
    )?;

    Ok(classify(
        &invocation.metric,
        value,
        invocation.warning,
        invocation.critical,
    ))
}

pub fn classify(metric: &str, value: f64, warning: f64, critical: f64) -> Resource {
    let state = threshold::evaluate(value, warning, critical);
    debug!(metric, value, warning, critical, %state, "classified");

    Resource::new(PLUGIN_NAME, state).with_description(format!("{metric} is {value:.2}"))
}

/// Every extraction failure is reported the same way, as UNKNOWN.
pub fn unknown(err: &ExtractError) -> (ServiceState, String) {
    (
        ServiceState::Unknown,
        format!("Error while getting value \"{err}\""),
    )
}
