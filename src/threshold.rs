use crate::ServiceState;

/// Direction in which a value has to move to trigger an alarm.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerIfValue {
    /// Higher values are worse.
    Greater,
    /// Lower values are worse.
    Less,
}

impl TriggerIfValue {
    /// Picks the direction from the order of the thresholds: a critical threshold above the
    /// warning threshold means higher values are worse, anything else means lower values are.
    ///
    /// ```rust
    /// # use check_ganglia::TriggerIfValue;
    /// assert_eq!(TriggerIfValue::from_thresholds(4.0, 8.0), TriggerIfValue::Greater);
    /// assert_eq!(TriggerIfValue::from_thresholds(20.0, 10.0), TriggerIfValue::Less);
    /// assert_eq!(TriggerIfValue::from_thresholds(5.0, 5.0), TriggerIfValue::Less);
    /// ```
    pub fn from_thresholds(warning: f64, critical: f64) -> Self {
        if critical > warning {
            TriggerIfValue::Greater
        } else {
            TriggerIfValue::Less
        }
    }

    fn triggers(&self, value: f64, threshold: f64) -> bool {
        match self {
            TriggerIfValue::Greater => value >= threshold,
            TriggerIfValue::Less => threshold >= value,
        }
    }
}

/// Classifies `value` against the given thresholds. The state is always one of Ok, Warning or
/// Critical; a value which compares false against both thresholds (NaN) is Ok.
pub fn evaluate(value: f64, warning: f64, critical: f64) -> ServiceState {
    let trigger = TriggerIfValue::from_thresholds(warning, critical);

    if trigger.triggers(value, critical) {
        ServiceState::Critical
    } else if trigger.triggers(value, warning) {
        ServiceState::Warning
    } else {
        ServiceState::Ok
    }
}
