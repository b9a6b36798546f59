//! Who may play online.
//!
//! Online play requires a signed-in identity with a live subscription. The
//! billing provider itself is outside this crate; it is reached only through
//! [`EntitlementGate`].

use crate::config::GameConfig;
use async_trait::async_trait;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Subscription plan.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Plan {
    /// No paid plan.
    #[default]
    Free,
    /// Billed monthly.
    Monthly,
    /// Billed yearly.
    Annual,
}

impl Plan {
    /// Whether checkout can be started for this plan.
    pub fn is_purchasable(self) -> bool {
        matches!(self, Plan::Monthly | Plan::Annual)
    }
}

/// Stored subscription status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubscriptionStatus {
    /// Paid and current.
    Active,
    /// In a trial period.
    Trialing,
    /// Ended or unrecoverable.
    Canceled,
    /// Payment pending or never started.
    #[default]
    Inactive,
}

impl SubscriptionStatus {
    /// Maps a billing provider status onto the stored status.
    #[instrument]
    pub fn from_provider_status(status: &str) -> Self {
        match status {
            "active" => SubscriptionStatus::Active,
            "trialing" => SubscriptionStatus::Trialing,
            "canceled" | "unpaid" | "incomplete_expired" => SubscriptionStatus::Canceled,
            _ => SubscriptionStatus::Inactive,
        }
    }

    /// Whether this status allows online play.
    pub fn is_entitled(self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Trialing)
    }
}

/// A user's subscription row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Subscription {
    /// Plan purchased.
    pub plan: Plan,
    /// Current status.
    pub status: SubscriptionStatus,
}

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user id from the auth provider.
    pub user_id: String,
    /// Subscription, if the user ever had one.
    pub subscription: Option<Subscription>,
}

impl Identity {
    /// An identity with no subscription.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            subscription: None,
        }
    }

    /// Attaches a subscription.
    pub fn with_subscription(mut self, plan: Plan, status: SubscriptionStatus) -> Self {
        self.subscription = Some(Subscription { plan, status });
        self
    }
}

/// Capability check consulted before creating or joining a room.
#[async_trait]
pub trait EntitlementGate: Send + Sync {
    /// Whether `identity` may play online. No identity is never entitled.
    async fn is_entitled(&self, identity: Option<&Identity>) -> bool;

    /// Starts a purchase and returns the URL to send the user to.
    async fn start_checkout(&self, identity: Option<&Identity>, plan: Plan)
    -> Result<String, GateError>;
}

/// Gate backed by the stored subscription status.
#[derive(Debug, Clone)]
pub struct SubscriptionGate {
    checkout_base_url: String,
}

impl SubscriptionGate {
    /// Creates a gate that sends checkouts to `checkout_base_url`.
    pub fn new(checkout_base_url: impl Into<String>) -> Self {
        Self {
            checkout_base_url: checkout_base_url.into(),
        }
    }

    /// Creates a gate using the configured checkout URL.
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.checkout_base_url())
    }
}

/// The gate `config` asks for.
#[instrument(skip(config), fields(required = config.require_subscription()))]
pub fn gate_from_config(config: &GameConfig) -> Arc<dyn EntitlementGate> {
    if *config.require_subscription() {
        info!(checkout = %config.checkout_base_url(), "Online play requires a subscription");
        Arc::new(SubscriptionGate::from_config(config))
    } else {
        Arc::new(OpenGate)
    }
}

#[async_trait]
impl EntitlementGate for SubscriptionGate {
    #[instrument(skip(self, identity))]
    async fn is_entitled(&self, identity: Option<&Identity>) -> bool {
        let entitled = identity
            .and_then(|id| id.subscription.as_ref())
            .is_some_and(|sub| sub.status.is_entitled());
        debug!(entitled, "Checked entitlement");
        entitled
    }

    #[instrument(skip(self, identity))]
    async fn start_checkout(
        &self,
        identity: Option<&Identity>,
        plan: Plan,
    ) -> Result<String, GateError> {
        let identity = identity.ok_or_else(|| GateError::new("Unauthorized".to_string()))?;
        if !plan.is_purchasable() {
            return Err(GateError::new(format!("Invalid plan: {}", plan)));
        }
        Ok(format!(
            "{}?plan={}&user={}",
            self.checkout_base_url, plan, identity.user_id
        ))
    }
}

/// Gate that lets everyone play; used for in-process games.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenGate;

#[async_trait]
impl EntitlementGate for OpenGate {
    async fn is_entitled(&self, _identity: Option<&Identity>) -> bool {
        true
    }

    async fn start_checkout(
        &self,
        _identity: Option<&Identity>,
        _plan: Plan,
    ) -> Result<String, GateError> {
        Err(GateError::new("Checkout is not available".to_string()))
    }
}

/// Entitlement or checkout failure.
#[derive(Debug, Clone, Display, Error)]
#[display("Gate error: {} at {}:{}", message, file, line)]
pub struct GateError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl GateError {
    /// Creates a new gate error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_provider_status_mapping() {
        use SubscriptionStatus::*;
        let cases = [
            ("active", Active),
            ("trialing", Trialing),
            ("canceled", Canceled),
            ("unpaid", Canceled),
            ("incomplete_expired", Canceled),
            ("past_due", Inactive),
            ("incomplete", Inactive),
            ("something_new", Inactive),
        ];
        for (raw, expected) in cases {
            assert_eq!(SubscriptionStatus::from_provider_status(raw), expected, "{raw}");
        }
    }

    #[test]
    fn test_only_active_and_trialing_are_entitled() {
        assert!(SubscriptionStatus::Active.is_entitled());
        assert!(SubscriptionStatus::Trialing.is_entitled());
        assert!(!SubscriptionStatus::Canceled.is_entitled());
        assert!(!SubscriptionStatus::Inactive.is_entitled());
    }

    #[test]
    fn test_plan_parse() {
        assert_eq!(Plan::from_str("annual").unwrap(), Plan::Annual);
        assert!(Plan::from_str("weekly").is_err());
        assert!(!Plan::Free.is_purchasable());
    }
}
