//! Loading, saving and testing payment method configurations.
//!
//! Every call goes through a simulated network hop: it waits for the
//! configured latency and fails with the configured probability.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::store::KeyValueStore;
use super::types::{
    BankTransferConfig, CreditCardConfig, PaymentMethodConfig, StripeConfig, method_slug,
};
use crate::audit::{DeskAuditEvent, DeskAuditLogger};
use crate::config::PaymentConfigSettings;
use crate::error::{DeskError, Result};

/// Outcome of a Stripe connection test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionTest {
    pub success: bool,
    pub message: String,
}

#[derive(Clone)]
pub struct PaymentConfigService {
    store: Arc<dyn KeyValueStore>,
    settings: PaymentConfigSettings,
    audit: Arc<dyn DeskAuditLogger>,
}

impl PaymentConfigService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        settings: PaymentConfigSettings,
        audit: Arc<dyn DeskAuditLogger>,
    ) -> Self {
        Self {
            store,
            settings,
            audit,
        }
    }

    async fn simulate_network(&self) -> Result<()> {
        if self.settings.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.settings.latency_ms)).await;
        }
        if self.settings.failure_rate > 0.0 && fastrand::f64() < self.settings.failure_rate {
            tracing::warn!(target: "ledgerdesk::payment_config", "simulated network failure");
            return Err(DeskError::unavailable(
                "Erreur réseau simulée, veuillez réessayer",
            ));
        }
        Ok(())
    }

    async fn stored<C: PaymentMethodConfig>(&self) -> Result<Option<C>> {
        match self.store.get(C::STORAGE_KEY).await? {
            Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|e| {
                DeskError::internal(format!("corrupt {} entry: {}", C::STORAGE_KEY, e))
            }),
            None => Ok(None),
        }
    }

    /// Stored configuration, or the default when nothing was saved.
    pub async fn load<C: PaymentMethodConfig>(&self) -> Result<C> {
        self.simulate_network().await?;
        Ok(self.stored().await?.unwrap_or_default())
    }

    /// Put back stored secrets that the client only saw masked.
    pub async fn restore_secrets<C: PaymentMethodConfig>(&self, mut config: C) -> Result<C> {
        if let Some(stored) = self.stored::<C>().await? {
            config.restore_secrets(&stored);
        }
        Ok(config)
    }

    /// Save a configuration edited from its masked view.
    pub async fn save_edited<C: PaymentMethodConfig>(&self, config: C) -> Result<C> {
        let config = self.restore_secrets(config).await?;
        self.save(config).await
    }

    /// Validate and persist a configuration. Returns what was stored.
    pub async fn save<C: PaymentMethodConfig>(&self, config: C) -> Result<C> {
        self.simulate_network().await?;
        config.validate()?;

        let raw = serde_json::to_string(&config)?;
        self.store.set(C::STORAGE_KEY, raw).await?;

        tracing::info!(
            target: "ledgerdesk::payment_config",
            method = method_slug(C::METHOD),
            enabled = config.is_enabled(),
            "payment configuration saved"
        );
        self.audit
            .log(DeskAuditEvent::PaymentConfigSaved {
                method: method_slug(C::METHOD).to_string(),
                enabled: config.is_enabled(),
            })
            .await;
        Ok(config)
    }

    pub async fn load_stripe(&self) -> Result<StripeConfig> {
        self.load().await
    }

    pub async fn save_stripe(&self, config: StripeConfig) -> Result<StripeConfig> {
        self.save(config).await
    }

    pub async fn load_credit_card(&self) -> Result<CreditCardConfig> {
        self.load().await
    }

    pub async fn save_credit_card(&self, config: CreditCardConfig) -> Result<CreditCardConfig> {
        self.save(config).await
    }

    pub async fn load_bank_transfer(&self) -> Result<BankTransferConfig> {
        self.load().await
    }

    pub async fn save_bank_transfer(
        &self,
        config: BankTransferConfig,
    ) -> Result<BankTransferConfig> {
        self.save(config).await
    }

    /// Check Stripe keys without contacting Stripe.
    ///
    /// Keys are checked for presence and for the prefix matching the mode.
    pub async fn test_stripe_connection(&self, config: &StripeConfig) -> Result<ConnectionTest> {
        self.simulate_network().await?;
        let probe = StripeConfig {
            enabled: true,
            ..config.clone()
        };
        let result = match probe.validate() {
            Ok(()) => ConnectionTest {
                success: true,
                message: if config.test_mode {
                    "Connexion à Stripe réussie (mode test)".to_string()
                } else {
                    "Connexion à Stripe réussie".to_string()
                },
            },
            Err(err) => ConnectionTest {
                success: false,
                message: err.to_string(),
            },
        };
        tracing::debug!(
            target: "ledgerdesk::payment_config",
            success = result.success,
            "stripe connection tested"
        );
        Ok(result)
    }
}

impl std::fmt::Debug for PaymentConfigService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfigService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
