// Exchange Rate Provider Port
use crate::error::Result;
use async_trait::async_trait;

/// Source of the coin's external exchange rate (1.0 = peg)
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn exchange_rate(&self) -> Result<f64>;
}

/// Rate provider serving a configured constant (production placeholder
/// until an exchange feed is wired in)
pub struct FixedRateProvider {
    rate: f64,
}

impl FixedRateProvider {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }
}

#[async_trait]
impl RateProvider for FixedRateProvider {
    async fn exchange_rate(&self) -> Result<f64> {
        Ok(self.rate)
    }
}

pub mod mocks {
    use super::*;
    use crate::error::AgentError;
    use std::sync::Mutex;

    /// Rate provider whose answer can be changed between cycles
    pub struct MockRateProvider {
        rate: Mutex<std::result::Result<f64, String>>,
    }

    impl MockRateProvider {
        pub fn new(rate: f64) -> Self {
            Self {
                rate: Mutex::new(Ok(rate)),
            }
        }

        pub fn set_rate(&self, rate: f64) {
            *self.rate.lock().unwrap() = Ok(rate);
        }

        pub fn set_unavailable(&self, reason: impl Into<String>) {
            *self.rate.lock().unwrap() = Err(reason.into());
        }
    }

    #[async_trait]
    impl RateProvider for MockRateProvider {
        async fn exchange_rate(&self) -> Result<f64> {
            self.rate
                .lock()
                .unwrap()
                .clone()
                .map_err(AgentError::RateUnavailable)
        }
    }
}
