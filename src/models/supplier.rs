use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

use super::{nullable, require_non_empty, require_non_negative, ModelError, Validate};
use crate::constants::DEFAULT_PAYMENT_TERMS_DAYS;
use crate::repository::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SupplierStatus {
    #[default]
    Active,
    Inactive,
    PendingApproval,
}

impl SupplierStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupplierStatus::Active => "Active",
            SupplierStatus::Inactive => "Inactive",
            SupplierStatus::PendingApproval => "PendingApproval",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().replace(['_', '-', ' '], "").as_str() {
            "active" => Some(SupplierStatus::Active),
            "inactive" => Some(SupplierStatus::Inactive),
            "pendingapproval" => Some(SupplierStatus::PendingApproval),
            _ => None,
        }
    }
}

/// Supplier payment terms in days.
///
/// Accepted wire shapes: `45`, `45.0`, `"45"`, `"Net 45"`. Fractional days round to the
/// nearest whole day. Anything else (null, negative, out of range, unparseable text)
/// becomes the 30 day default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PaymentTerms(u16);

impl PaymentTerms {
    pub fn days(value: u16) -> Self {
        Self(value)
    }

    pub fn as_days(&self) -> u16 {
        self.0
    }

    /// Whole days from a non-negative count; fractional counts round to the nearest day
    fn from_f64(days: f64) -> Option<Self> {
        if !days.is_finite() || days < 0.0 {
            return None;
        }
        let rounded = days.round();
        (rounded <= f64::from(u16::MAX)).then(|| Self(rounded as u16))
    }

    /// Parse a free-form terms string such as `"Net 60"`, `"15"` or `"Net 45.5"`
    pub fn parse_text(raw: &str) -> Self {
        raw.find(|c: char| c.is_ascii_digit())
            .map(|start| {
                let tail = &raw[start..];
                let end = tail
                    .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                    .unwrap_or(tail.len());
                tail[..end].trim_end_matches('.')
            })
            .and_then(|number| number.parse::<f64>().ok())
            .and_then(Self::from_f64)
            .unwrap_or_default()
    }

    fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => n.as_f64().and_then(Self::from_f64).unwrap_or_default(),
            serde_json::Value::String(s) => Self::parse_text(s),
            _ => Self::default(),
        }
    }
}

impl Default for PaymentTerms {
    fn default() -> Self {
        Self(DEFAULT_PAYMENT_TERMS_DAYS)
    }
}

impl fmt::Display for PaymentTerms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Net {}", self.0)
    }
}

impl Serialize for PaymentTerms {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.0)
    }
}

impl<'de> Deserialize<'de> for PaymentTerms {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self::from_json(&value))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: SupplierStatus,
    pub rating: f64,
    pub credit_limit: f64,
    pub current_balance: f64,
    pub payment_terms: PaymentTerms,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Supplier {
    /// Remaining credit before the limit is reached (negative when over the limit)
    pub fn available_credit(&self) -> f64 {
        self.credit_limit - self.current_balance
    }
}

/// Supplier listing row with counts the backend derives from products and orders
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SupplierSummary {
    #[serde(flatten)]
    pub supplier: Supplier,
    pub products_count: usize,
    pub orders_count: usize,
    pub total_value: f64,
}

fn check_rating(rating: f64) -> Result<(), ModelError> {
    if !(0.0..=5.0).contains(&rating) {
        return Err(ModelError::Validation("Rating must be between 0 and 5".to_string()));
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), ModelError> {
    let trimmed = email.trim();
    if !trimmed.is_empty() && !trimmed.contains('@') {
        return Err(ModelError::Validation(format!("Invalid email address '{trimmed}'")));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SupplierCreate {
    pub name: String,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub status: Option<SupplierStatus>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub credit_limit: f64,
    #[serde(default)]
    pub current_balance: f64,
    #[serde(default)]
    pub payment_terms: PaymentTerms,
}

impl Validate for SupplierCreate {
    fn validate(&self) -> Result<(), ModelError> {
        require_non_empty("Supplier name", &self.name)?;
        if let Some(email) = &self.email {
            check_email(email)?;
        }
        check_rating(self.rating)?;
        require_non_negative("Credit limit", self.credit_limit)?;
        if !self.current_balance.is_finite() {
            return Err(ModelError::Validation("Current balance must be a number".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SupplierUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub address: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SupplierStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_balance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<PaymentTerms>,
}

impl Validate for SupplierUpdate {
    fn validate(&self) -> Result<(), ModelError> {
        if let Some(name) = &self.name {
            require_non_empty("Supplier name", name)?;
        }
        if let Some(Some(email)) = &self.email {
            check_email(email)?;
        }
        if let Some(rating) = self.rating {
            check_rating(rating)?;
        }
        if let Some(limit) = self.credit_limit {
            require_non_negative("Credit limit", limit)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SupplierFilter {
    pub status: Option<SupplierStatus>,
}

impl Entity for Supplier {
    type Create = SupplierCreate;
    type Update = SupplierUpdate;
    type Filter = SupplierFilter;

    const NAME: &'static str = "Supplier";

    fn id(&self) -> Uuid {
        self.id
    }

    fn create(input: SupplierCreate, now: DateTime<Utc>) -> Result<Self, ModelError> {
        Ok(Supplier {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            contact_person: input.contact_person,
            email: input.email.map(|e| e.trim().to_string()),
            phone: input.phone,
            address: input.address,
            status: input.status.unwrap_or_default(),
            rating: input.rating,
            credit_limit: input.credit_limit,
            current_balance: input.current_balance,
            payment_terms: input.payment_terms,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply(&mut self, update: SupplierUpdate, now: DateTime<Utc>) -> Result<(), ModelError> {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(contact_person) = update.contact_person {
            self.contact_person = contact_person;
        }
        if let Some(email) = update.email {
            self.email = email.map(|e| e.trim().to_string());
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(address) = update.address {
            self.address = address;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(rating) = update.rating {
            self.rating = rating;
        }
        if let Some(limit) = update.credit_limit {
            self.credit_limit = limit;
        }
        if let Some(balance) = update.current_balance {
            self.current_balance = balance;
        }
        if let Some(terms) = update.payment_terms {
            self.payment_terms = terms;
        }
        self.updated_at = now;
        Ok(())
    }

    fn matches(&self, filter: &SupplierFilter) -> bool {
        filter.status.map_or(true, |s| self.status == s)
    }
}

#[cfg(test)]
pub(crate) fn sample_supplier(name: &str) -> Supplier {
    let now = Utc::now();
    Supplier {
        id: Uuid::new_v4(),
        name: name.to_string(),
        contact_person: None,
        email: None,
        phone: None,
        address: None,
        status: SupplierStatus::Active,
        rating: 4.0,
        credit_limit: 10_000.0,
        current_balance: 0.0,
        payment_terms: PaymentTerms::default(),
        created_at: now,
        updated_at: now,
    }
}
