use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{nullable, require_non_empty, require_non_negative_int, ModelError, Validate};
use crate::repository::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WarehouseStatus {
    #[default]
    Active,
    Inactive,
    Maintenance,
}

impl WarehouseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarehouseStatus::Active => "active",
            WarehouseStatus::Inactive => "inactive",
            WarehouseStatus::Maintenance => "maintenance",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "active" => Some(WarehouseStatus::Active),
            "inactive" => Some(WarehouseStatus::Inactive),
            "maintenance" => Some(WarehouseStatus::Maintenance),
            _ => None,
        }
    }
}

/// Occupied capacity as a percentage; 0 when capacity is 0, never negative.
///
/// Occupancy above capacity is not rejected anywhere, so rates above 100 are possible.
pub fn utilization_rate(current_occupancy: i32, capacity: i32) -> f64 {
    if capacity <= 0 {
        return 0.0;
    }
    let occupancy = f64::from(current_occupancy.max(0));
    occupancy / f64::from(capacity) * 100.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub capacity: i32,
    pub current_occupancy: i32,
    pub status: WarehouseStatus,
    pub manager_id: Option<Uuid>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Warehouse {
    pub fn utilization_rate(&self) -> f64 {
        utilization_rate(self.current_occupancy, self.capacity)
    }

    pub fn remaining_capacity(&self) -> i32 {
        (self.capacity - self.current_occupancy).max(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseCreate {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub capacity: i32,
    #[serde(default)]
    pub current_occupancy: i32,
    #[serde(default)]
    pub status: Option<WarehouseStatus>,
    #[serde(default)]
    pub manager_id: Option<Uuid>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
}

impl Validate for WarehouseCreate {
    fn validate(&self) -> Result<(), ModelError> {
        require_non_empty("Warehouse name", &self.name)?;
        require_non_empty("Location", &self.location)?;
        require_non_negative_int("Capacity", self.capacity)?;
        require_non_negative_int("Current occupancy", self.current_occupancy)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_occupancy: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WarehouseStatus>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<Option<String>>,
}

impl Validate for WarehouseUpdate {
    fn validate(&self) -> Result<(), ModelError> {
        if let Some(name) = &self.name {
            require_non_empty("Warehouse name", name)?;
        }
        if let Some(location) = &self.location {
            require_non_empty("Location", location)?;
        }
        if let Some(capacity) = self.capacity {
            require_non_negative_int("Capacity", capacity)?;
        }
        if let Some(occupancy) = self.current_occupancy {
            require_non_negative_int("Current occupancy", occupancy)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseFilter {
    pub manager_id: Option<Uuid>,
    pub status: Option<WarehouseStatus>,
}

impl Entity for Warehouse {
    type Create = WarehouseCreate;
    type Update = WarehouseUpdate;
    type Filter = WarehouseFilter;

    const NAME: &'static str = "Warehouse";

    fn id(&self) -> Uuid {
        self.id
    }

    fn create(input: WarehouseCreate, now: DateTime<Utc>) -> Result<Self, ModelError> {
        Ok(Warehouse {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            location: input.location.trim().to_string(),
            capacity: input.capacity,
            current_occupancy: input.current_occupancy,
            status: input.status.unwrap_or_default(),
            manager_id: input.manager_id,
            contact_email: input.contact_email,
            contact_phone: input.contact_phone,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply(&mut self, update: WarehouseUpdate, now: DateTime<Utc>) -> Result<(), ModelError> {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(location) = update.location {
            self.location = location.trim().to_string();
        }
        if let Some(capacity) = update.capacity {
            self.capacity = capacity;
        }
        if let Some(occupancy) = update.current_occupancy {
            self.current_occupancy = occupancy;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(manager_id) = update.manager_id {
            self.manager_id = manager_id;
        }
        if let Some(contact_email) = update.contact_email {
            self.contact_email = contact_email;
        }
        if let Some(contact_phone) = update.contact_phone {
            self.contact_phone = contact_phone;
        }
        self.updated_at = now;
        Ok(())
    }

    fn matches(&self, filter: &WarehouseFilter) -> bool {
        filter.manager_id.map_or(true, |id| self.manager_id == Some(id))
            && filter.status.map_or(true, |s| self.status == s)
    }
}

#[cfg(test)]
pub(crate) fn sample_warehouse(name: &str, capacity: i32, occupancy: i32) -> Warehouse {
    let now = Utc::now();
    Warehouse {
        id: Uuid::new_v4(),
        name: name.to_string(),
        location: "Dock 1".to_string(),
        capacity,
        current_occupancy: occupancy,
        status: WarehouseStatus::Active,
        manager_id: None,
        contact_email: None,
        contact_phone: None,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_has_zero_utilization() {
        assert_eq!(utilization_rate(0, 0), 0.0);
        assert_eq!(utilization_rate(500, 0), 0.0);
    }

    #[test]
    fn test_utilization_is_percentage_of_capacity() {
        assert!((utilization_rate(250, 1000) - 25.0).abs() < f64::EPSILON);
        assert!((utilization_rate(1000, 1000) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_utilization_never_negative() {
        for occupancy in [-50, -1, 0, 1, 50] {
            for capacity in [-10, 0, 1, 100] {
                assert!(utilization_rate(occupancy, capacity) >= 0.0);
            }
        }
    }

    #[test]
    fn test_over_capacity_is_reported_as_is() {
        let warehouse = sample_warehouse("Overflow", 100, 150);
        assert!((warehouse.utilization_rate() - 150.0).abs() < f64::EPSILON);
        assert_eq!(warehouse.remaining_capacity(), 0);
    }
}
