//! Runtime configuration and startup validation.
//!
//! Invalid configuration is fatal: [`Config::validate`] runs before any
//! timer is armed and the mesh refuses to start on the first violation.

use alloc::vec::Vec;
use core::fmt;

use crate::time::Duration;
use crate::types::{
    NodeId, DEFAULT_HELLO_INTERVAL_MS, DEFAULT_MEAN_OFF_MS, DEFAULT_MEAN_ON_MS,
    DEFAULT_TRAFFIC_INTERVAL_MS, HELLO_EXPIRY_TOLERANCE_MS, TRAFFIC_START_DELAY_MS,
};

/// Mean dwell times for the duty-cycle controller's exponential draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DutyCycleConfig {
    /// Mean time the uplink interface stays up.
    pub mean_on: Duration,
    /// Mean time the uplink interface stays down.
    pub mean_off: Duration,
}

impl Default for DutyCycleConfig {
    fn default() -> Self {
        Self {
            mean_on: Duration::from_millis(DEFAULT_MEAN_ON_MS),
            mean_off: Duration::from_millis(DEFAULT_MEAN_OFF_MS),
        }
    }
}

/// Protocol configuration for one mesh.
#[derive(Clone, Debug)]
pub struct Config {
    /// The fixed access point bridging into the wired backbone.
    pub gateway: NodeId,
    /// The relay that generates application traffic.
    pub source: NodeId,
    /// All mobile relays, including the source, excluding the gateway.
    pub relays: Vec<NodeId>,
    /// Interval between Hello broadcasts per node.
    pub hello_interval: Duration,
    /// Grace period past `hello_interval` before an unrefreshed edge expires.
    pub hello_tolerance: Duration,
    /// Interval between generated application messages.
    pub traffic_interval: Duration,
    /// Delay before the first generated message.
    pub traffic_start: Duration,
    /// Duty cycling of relay uplinks; `None` keeps every interface up.
    pub duty_cycle: Option<DutyCycleConfig>,
}

impl Config {
    pub fn new(gateway: NodeId, source: NodeId, relays: Vec<NodeId>) -> Self {
        Self {
            gateway,
            source,
            relays,
            hello_interval: Duration::from_millis(DEFAULT_HELLO_INTERVAL_MS),
            hello_tolerance: Duration::from_millis(HELLO_EXPIRY_TOLERANCE_MS),
            traffic_interval: Duration::from_millis(DEFAULT_TRAFFIC_INTERVAL_MS),
            traffic_start: Duration::from_millis(TRAFFIC_START_DELAY_MS),
            duty_cycle: Some(DutyCycleConfig::default()),
        }
    }

    pub fn with_hello_interval(mut self, interval: Duration) -> Self {
        self.hello_interval = interval;
        self
    }

    pub fn with_hello_tolerance(mut self, tolerance: Duration) -> Self {
        self.hello_tolerance = tolerance;
        self
    }

    pub fn with_traffic_interval(mut self, interval: Duration) -> Self {
        self.traffic_interval = interval;
        self
    }

    pub fn with_traffic_start(mut self, start: Duration) -> Self {
        self.traffic_start = start;
        self
    }

    pub fn with_duty_cycle(mut self, duty_cycle: Option<DutyCycleConfig>) -> Self {
        self.duty_cycle = duty_cycle;
        self
    }

    /// Total lifetime of an unrefreshed edge.
    pub fn edge_expiry(&self) -> Duration {
        self.hello_interval + self.hello_tolerance
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.relays.is_empty() {
            return Err(ConfigError::NoRelays);
        }
        for (i, &relay) in self.relays.iter().enumerate() {
            if self.relays[..i].contains(&relay) {
                return Err(ConfigError::DuplicateRelay(relay));
            }
        }
        if self.hello_interval.is_zero() {
            return Err(ConfigError::ZeroHelloInterval);
        }
        if self.traffic_interval.is_zero() {
            return Err(ConfigError::ZeroTrafficInterval);
        }
        if !self.relays.contains(&self.source) {
            return Err(ConfigError::SourceNotRelay(self.source));
        }
        if self.relays.contains(&self.gateway) {
            return Err(ConfigError::GatewayListedAsRelay(self.gateway));
        }
        if let Some(duty) = self.duty_cycle {
            if duty.mean_on.is_zero() || duty.mean_off.is_zero() {
                return Err(ConfigError::ZeroDutyMean);
            }
        }
        Ok(())
    }
}

/// Configuration invariant violations, all fatal at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    NoRelays,
    DuplicateRelay(NodeId),
    ZeroHelloInterval,
    ZeroTrafficInterval,
    SourceNotRelay(NodeId),
    GatewayListedAsRelay(NodeId),
    ZeroDutyMean,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoRelays => write!(f, "relay set is empty"),
            ConfigError::DuplicateRelay(id) => write!(f, "relay {} listed twice", id),
            ConfigError::ZeroHelloInterval => write!(f, "hello interval must be positive"),
            ConfigError::ZeroTrafficInterval => write!(f, "traffic interval must be positive"),
            ConfigError::SourceNotRelay(id) => write!(f, "source {} is not a relay", id),
            ConfigError::GatewayListedAsRelay(id) => {
                write!(f, "gateway {} must not appear in the relay set", id)
            }
            ConfigError::ZeroDutyMean => write!(f, "duty-cycle means must be positive"),
        }
    }
}

impl core::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn base() -> Config {
        Config::new(0, 1, vec![1, 2, 3])
    }

    #[test]
    fn test_defaults_validate() {
        let config = base();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.edge_expiry(), Duration::from_millis(1100));
    }

    #[test]
    fn test_empty_relays_rejected() {
        let config = Config::new(0, 1, vec![]);
        assert_eq!(config.validate(), Err(ConfigError::NoRelays));
    }

    #[test]
    fn test_duplicate_relay_rejected() {
        let config = Config::new(0, 1, vec![1, 2, 2]);
        assert_eq!(config.validate(), Err(ConfigError::DuplicateRelay(2)));
    }

    #[test]
    fn test_zero_intervals_rejected() {
        let config = base().with_hello_interval(Duration::ZERO);
        assert_eq!(config.validate(), Err(ConfigError::ZeroHelloInterval));

        let config = base().with_traffic_interval(Duration::ZERO);
        assert_eq!(config.validate(), Err(ConfigError::ZeroTrafficInterval));
    }

    #[test]
    fn test_source_must_be_relay() {
        let config = Config::new(0, 9, vec![1, 2]);
        assert_eq!(config.validate(), Err(ConfigError::SourceNotRelay(9)));
    }

    #[test]
    fn test_gateway_must_not_be_relay() {
        let config = Config::new(2, 1, vec![1, 2]);
        assert_eq!(config.validate(), Err(ConfigError::GatewayListedAsRelay(2)));
    }

    #[test]
    fn test_zero_duty_mean_rejected() {
        let config = base().with_duty_cycle(Some(DutyCycleConfig {
            mean_on: Duration::ZERO,
            mean_off: Duration::from_millis(500),
        }));
        assert_eq!(config.validate(), Err(ConfigError::ZeroDutyMean));
    }

    #[test]
    fn test_duty_cycle_optional() {
        let config = base().with_duty_cycle(None);
        assert_eq!(config.validate(), Ok(()));
    }
}
