//! Payment method configuration: Stripe, direct card processing and bank transfer.
//!
//! Configurations are stored as JSON strings in a [`KeyValueStore`] under
//! fixed keys (`payment-config-stripe`, ...). [`PaymentConfigService`] adds
//! validation, auditing and the simulated network behaviour.

mod service;
mod store;
mod types;

pub use service::{ConnectionTest, PaymentConfigService};
pub use store::{InMemoryKeyValueStore, KeyValueStore};
pub use types::{
    BankTransferConfig, CardBrand, CreditCardConfig, PaymentMethodConfig, StripeConfig,
    is_valid_bic, is_valid_iban, mask_secret, method_slug,
};
