//! Subscribers (customers holding one or more subscriptions).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    LabeledEnum, Patch, Record, SubscriptionRef, require_email, require_non_empty,
    require_non_negative,
};
use crate::error::Result;

/// Account status of a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriberStatus {
    Active,
    Trial,
    Suspended,
    Inactive,
}

impl LabeledEnum for SubscriberStatus {
    const ALL: &'static [Self] = &[Self::Active, Self::Trial, Self::Suspended, Self::Inactive];

    fn code(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Trial => "trial",
            Self::Suspended => "suspended",
            Self::Inactive => "inactive",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Active => "Actif",
            Self::Trial => "Essai",
            Self::Suspended => "Suspendu",
            Self::Inactive => "Inactif",
        }
    }
}

/// How often a subscriber is billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycle {
    Monthly,
    Quarterly,
    Yearly,
}

impl LabeledEnum for BillingCycle {
    const ALL: &'static [Self] = &[Self::Monthly, Self::Quarterly, Self::Yearly];

    fn code(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Monthly => "Mensuel",
            Self::Quarterly => "Trimestriel",
            Self::Yearly => "Annuel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    pub status: SubscriberStatus,
    pub billing_cycle: BillingCycle,
    pub joined_at: NaiveDate,
    /// Recurring amount normalised to one month, in cents.
    pub monthly_amount_cents: i64,
    #[serde(default)]
    pub subscriptions: Vec<SubscriptionRef>,
}

impl Subscriber {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        status: SubscriberStatus,
        billing_cycle: BillingCycle,
        joined_at: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            company: None,
            status,
            billing_cycle,
            joined_at,
            monthly_amount_cents: 0,
            subscriptions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    #[must_use]
    pub fn with_monthly_amount(mut self, cents: i64) -> Self {
        self.monthly_amount_cents = cents;
        self
    }

    #[must_use]
    pub fn with_subscriptions<I, T>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.subscriptions = titles.into_iter().map(SubscriptionRef::new).collect();
        self
    }
}

impl Record for Subscriber {
    const ENTITY: &'static str = "subscribers";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Inline edit of a subscriber row.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SubscriberPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub status: Option<SubscriberStatus>,
    #[serde(default)]
    pub billing_cycle: Option<BillingCycle>,
    #[serde(default)]
    pub monthly_amount_cents: Option<i64>,
}

impl Patch<Subscriber> for SubscriberPatch {
    fn apply_to(self, subscriber: &mut Subscriber) -> Result<()> {
        if let Some(name) = &self.name {
            require_non_empty(name, "Le nom de l'abonné est requis")?;
        }
        if let Some(email) = &self.email {
            require_email(email)?;
        }
        if let Some(amount) = self.monthly_amount_cents {
            require_non_negative(amount)?;
        }

        if let Some(name) = self.name {
            subscriber.name = name.trim().to_string();
        }
        if let Some(email) = self.email {
            subscriber.email = email.trim().to_string();
        }
        if let Some(company) = self.company {
            subscriber.company = if company.trim().is_empty() { None } else { Some(company) };
        }
        if let Some(status) = self.status {
            subscriber.status = status;
        }
        if let Some(cycle) = self.billing_cycle {
            subscriber.billing_cycle = cycle;
        }
        if let Some(amount) = self.monthly_amount_cents {
            subscriber.monthly_amount_cents = amount;
        }
        Ok(())
    }
}
