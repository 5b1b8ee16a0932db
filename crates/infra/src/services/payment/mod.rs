use crate::config::Config;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeOutcome {
    Succeeded,
    Failed,
}

/// Payment provider boundary. The wire protocol is out of scope; the
/// core only needs "attempt a charge, get succeeded/failed".
#[async_trait::async_trait]
pub trait IPaymentGateway: Send + Sync {
    async fn charge(&self, token: &str, amount_minor: i64) -> anyhow::Result<ChargeOutcome>;
}

#[derive(Debug, Serialize)]
struct ChargeBody<'a> {
    token: &'a str,
    amount_minor: i64,
}

#[derive(Debug, Deserialize)]
struct ChargeResponse {
    status: String,
}

pub struct PaymentGatewayRestApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PaymentGatewayRestApi {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.external_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.payment_gateway_url.clone(),
            api_key: config.payment_gateway_api_key.clone(),
        })
    }
}

#[async_trait::async_trait]
impl IPaymentGateway for PaymentGatewayRestApi {
    async fn charge(&self, token: &str, amount_minor: i64) -> anyhow::Result<ChargeOutcome> {
        let res: ChargeResponse = self
            .client
            .post(format!("{}/charges", self.base_url))
            .header("kinobot-payment-key", &self.api_key)
            .json(&ChargeBody {
                token,
                amount_minor,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        match res.status.as_str() {
            "succeeded" => Ok(ChargeOutcome::Succeeded),
            _ => Ok(ChargeOutcome::Failed),
        }
    }
}

/// Scriptable gateway for tests: set the outcome, inspect the attempts.
pub struct InMemoryPaymentGateway {
    outcome: Mutex<ChargeOutcome>,
    charges: Mutex<Vec<(String, i64)>>,
}

impl InMemoryPaymentGateway {
    pub fn new() -> Self {
        Self {
            outcome: Mutex::new(ChargeOutcome::Succeeded),
            charges: Mutex::new(Vec::new()),
        }
    }

    pub fn set_outcome(&self, outcome: ChargeOutcome) {
        *self.outcome.lock().unwrap() = outcome;
    }

    pub fn charges(&self) -> Vec<(String, i64)> {
        self.charges.lock().unwrap().clone()
    }
}

impl Default for InMemoryPaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IPaymentGateway for InMemoryPaymentGateway {
    async fn charge(&self, token: &str, amount_minor: i64) -> anyhow::Result<ChargeOutcome> {
        self.charges
            .lock()
            .unwrap()
            .push((token.to_string(), amount_minor));
        Ok(*self.outcome.lock().unwrap())
    }
}
