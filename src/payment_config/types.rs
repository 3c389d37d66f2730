//! Payment method configuration types and their validation.

use std::fmt;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{DeskError, Result};
use crate::records::PaymentMethodKind;

/// A storable payment method configuration.
pub trait PaymentMethodConfig:
    Serialize + DeserializeOwned + Default + Clone + fmt::Debug + Send + Sync + 'static
{
    const METHOD: PaymentMethodKind;

    /// Key under which the configuration is persisted.
    const STORAGE_KEY: &'static str;

    fn is_enabled(&self) -> bool;

    /// First problem with the configuration, as a user-facing message.
    ///
    /// Disabled configurations are always valid.
    fn validate(&self) -> Result<()>;

    /// Copy with secrets masked, safe to return to clients.
    fn masked(&self) -> Self;

    /// Replace masked secrets sent back by a client with the stored values.
    fn restore_secrets(&mut self, _stored: &Self) {}
}

fn is_masked(value: &str) -> bool {
    value.contains("****")
}

/// URL segment used for a payment method (`stripe`, `credit-card`, `bank-transfer`).
pub fn method_slug(method: PaymentMethodKind) -> &'static str {
    match method {
        PaymentMethodKind::Stripe => "stripe",
        PaymentMethodKind::CreditCard => "credit-card",
        PaymentMethodKind::BankTransfer => "bank-transfer",
    }
}

fn required(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DeskError::validation(message));
    }
    Ok(())
}

/// Mask a secret, keeping its `xx_yyyy_` prefix and last four characters.
///
/// `sk_live_51Habcd` becomes `sk_live_****abcd`. Short values are fully masked.
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    let head_len = secret
        .rfind('_')
        .map(|i| i + 1)
        .filter(|&end| secret[end..].chars().count() > 4)
        .unwrap_or(0);
    format!("{}****{}", &secret[..head_len], tail)
}

/// Stripe account settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripeConfig {
    pub enabled: bool,
    /// Use test keys (`pk_test_` / `sk_test_`).
    pub test_mode: bool,
    pub publishable_key: String,
    pub secret_key: String,
    pub webhook_secret: String,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            test_mode: true,
            publishable_key: String::new(),
            secret_key: String::new(),
            webhook_secret: String::new(),
        }
    }
}

impl fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripeConfig")
            .field("enabled", &self.enabled)
            .field("test_mode", &self.test_mode)
            .field("publishable_key", &self.publishable_key)
            .field("secret_key", &mask_secret(&self.secret_key))
            .field("webhook_secret", &mask_secret(&self.webhook_secret))
            .finish()
    }
}

impl PaymentMethodConfig for StripeConfig {
    const METHOD: PaymentMethodKind = PaymentMethodKind::Stripe;
    const STORAGE_KEY: &'static str = "payment-config-stripe";

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        required(&self.publishable_key, "La clé publique Stripe est requise")?;
        required(&self.secret_key, "La clé secrète Stripe est requise")?;

        let (pk_prefix, sk_prefix) = if self.test_mode {
            ("pk_test_", "sk_test_")
        } else {
            ("pk_live_", "sk_live_")
        };
        if !self.publishable_key.starts_with(pk_prefix) {
            return Err(DeskError::validation(format!(
                "La clé publique Stripe doit commencer par {}",
                pk_prefix
            )));
        }
        if !self.secret_key.starts_with(sk_prefix) {
            return Err(DeskError::validation(format!(
                "La clé secrète Stripe doit commencer par {}",
                sk_prefix
            )));
        }
        if !self.webhook_secret.is_empty() && !self.webhook_secret.starts_with("whsec_") {
            return Err(DeskError::validation(
                "Le secret du webhook Stripe doit commencer par whsec_",
            ));
        }
        Ok(())
    }

    fn masked(&self) -> Self {
        Self {
            secret_key: mask_secret(&self.secret_key),
            webhook_secret: mask_secret(&self.webhook_secret),
            ..self.clone()
        }
    }

    fn restore_secrets(&mut self, stored: &Self) {
        if is_masked(&self.secret_key) {
            self.secret_key = stored.secret_key.clone();
        }
        if is_masked(&self.webhook_secret) {
            self.webhook_secret = stored.webhook_secret.clone();
        }
    }
}

/// Card networks accepted at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    /// Carte Bancaire (French domestic network).
    Cb,
}

/// Direct card processing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditCardConfig {
    pub enabled: bool,
    pub processor: String,
    pub merchant_id: String,
    pub accepted_brands: Vec<CardBrand>,
    pub require_cvv: bool,
    pub three_d_secure: bool,
}

impl Default for CreditCardConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            processor: String::new(),
            merchant_id: String::new(),
            accepted_brands: vec![CardBrand::Visa, CardBrand::Mastercard, CardBrand::Cb],
            require_cvv: true,
            three_d_secure: true,
        }
    }
}

impl PaymentMethodConfig for CreditCardConfig {
    const METHOD: PaymentMethodKind = PaymentMethodKind::CreditCard;
    const STORAGE_KEY: &'static str = "payment-config-credit-card";

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        required(&self.processor, "Le processeur de paiement est requis")?;
        required(&self.merchant_id, "L'identifiant marchand est requis")?;
        if self.accepted_brands.is_empty() {
            return Err(DeskError::validation(
                "Sélectionnez au moins une marque de carte acceptée",
            ));
        }
        Ok(())
    }

    fn masked(&self) -> Self {
        self.clone()
    }
}

/// Bank transfer instructions shown to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankTransferConfig {
    pub enabled: bool,
    pub account_holder: String,
    pub iban: String,
    pub bic: String,
    pub bank_name: String,
    pub payment_reference_prefix: String,
    pub instructions: String,
}

impl Default for BankTransferConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            account_holder: String::new(),
            iban: String::new(),
            bic: String::new(),
            bank_name: String::new(),
            payment_reference_prefix: "FAC".to_string(),
            instructions: String::new(),
        }
    }
}

impl PaymentMethodConfig for BankTransferConfig {
    const METHOD: PaymentMethodKind = PaymentMethodKind::BankTransfer;
    const STORAGE_KEY: &'static str = "payment-config-bank-transfer";

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        required(&self.account_holder, "Le titulaire du compte est requis")?;
        required(&self.iban, "L'IBAN est requis")?;
        if !is_valid_iban(&self.iban) {
            return Err(DeskError::validation("L'IBAN est invalide"));
        }
        required(&self.bic, "Le BIC est requis")?;
        if !is_valid_bic(&self.bic) {
            return Err(DeskError::validation("Le BIC est invalide"));
        }
        if self.payment_reference_prefix.len() > 10 {
            return Err(DeskError::validation(
                "Le préfixe de référence ne peut pas dépasser 10 caractères",
            ));
        }
        Ok(())
    }

    fn masked(&self) -> Self {
        Self {
            iban: mask_iban(&self.iban),
            ..self.clone()
        }
    }

    fn restore_secrets(&mut self, stored: &Self) {
        if is_masked(&self.iban) {
            self.iban = stored.iban.clone();
        }
    }
}

fn compact(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase()
}

/// ISO 13616 check: country code, check digits and mod-97 checksum.
pub fn is_valid_iban(iban: &str) -> bool {
    let iban = compact(iban);
    if !(15..=34).contains(&iban.len()) || !iban.chars().all(|c| c.is_ascii_alphanumeric()) {
        return false;
    }
    let bytes = iban.as_bytes();
    if !bytes[..2].iter().all(u8::is_ascii_alphabetic) || !bytes[2..4].iter().all(u8::is_ascii_digit)
    {
        return false;
    }

    let rearranged = iban[4..].chars().chain(iban[..4].chars());
    let mut remainder: u32 = 0;
    for c in rearranged {
        let value = match c.to_digit(36) {
            Some(v) => v,
            None => return false,
        };
        remainder = if value >= 10 {
            (remainder * 100 + value) % 97
        } else {
            (remainder * 10 + value) % 97
        };
    }
    remainder == 1
}

/// SWIFT BIC: 4-letter bank, 2-letter country, 2 location characters,
/// optional 3-character branch.
pub fn is_valid_bic(bic: &str) -> bool {
    let bic = compact(bic);
    if bic.len() != 8 && bic.len() != 11 {
        return false;
    }
    let bytes = bic.as_bytes();
    bytes[..6].iter().all(u8::is_ascii_alphabetic)
        && bytes[6..].iter().all(u8::is_ascii_alphanumeric)
}

fn mask_iban(iban: &str) -> String {
    let iban = compact(iban);
    if iban.len() <= 8 {
        return "****".to_string();
    }
    format!("{} **** {}", &iban[..4], &iban[iban.len() - 4..])
}
