use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::stage::Stage;

/// Identifier of a work order, generated when the row is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkOrderId(Uuid);

impl WorkOrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WorkOrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for WorkOrderId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Every attribute of a work order except its identity and timestamps.
///
/// Lookup references (work type, commune, company, ...) are carried by their
/// natural key; the store resolves them to rows on create and save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkOrderFields {
    pub name: String,
    pub description: Option<String>,
    /// Program the work belongs to ("entorno" in the source export).
    pub environment: Option<String>,
    pub stage: Option<Stage>,
    pub work_type: Option<String>,
    pub responsible_area: Option<String>,
    pub contract_amount: Option<Decimal>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub commune: Option<u32>,
    pub neighborhood: Option<String>,
    pub planned_start: Option<NaiveDate>,
    pub planned_end: Option<NaiveDate>,
    pub duration_months: Option<u32>,
    /// Completion percentage, always within 0..=100.
    pub progress: Decimal,
    pub workforce_count: Option<u32>,
    pub contracting_type: Option<String>,
    pub contracting_number: Option<String>,
    pub tender_year: Option<i32>,
    pub company: Option<String>,
    pub company_tax_id: Option<String>,
    /// Administrative file ("expediente") number.
    pub file_number: Option<String>,
    pub funding_source: Option<String>,
    pub beneficiaries: Option<String>,
    pub featured: Option<bool>,
    /// Part of the government's public commitments ("compromiso").
    pub commitment: Option<bool>,
    /// Chosen through the "BA Elige" participatory budget.
    pub ba_elige: Option<bool>,
    pub image_1: Option<String>,
    pub image_2: Option<String>,
    pub image_3: Option<String>,
    pub image_4: Option<String>,
    pub internal_link: Option<String>,
    /// Download link for the tender documents ("pliego").
    pub tender_documents_url: Option<String>,
    pub environmental_study_url: Option<String>,
}

impl WorkOrderFields {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A persisted public works project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: WorkOrderId,
    #[serde(flatten)]
    pub fields: WorkOrderFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkOrder {
    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn stage(&self) -> Option<Stage> {
        self.fields.stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_parse_back() {
        let a = WorkOrderId::new();
        let b = WorkOrderId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string().parse::<WorkOrderId>().unwrap(), a);
        assert!("not-a-uuid".parse::<WorkOrderId>().is_err());
    }

    #[test]
    fn named_fields_start_empty() {
        let fields = WorkOrderFields::named("Escuela 12");
        assert_eq!(fields.name, "Escuela 12");
        assert_eq!(fields.progress, Decimal::ZERO);
        assert!(fields.stage.is_none());
        assert!(fields.workforce_count.is_none());
    }

    #[test]
    fn work_order_serializes_flat() {
        let now = Utc::now();
        let order = WorkOrder {
            id: WorkOrderId::new(),
            fields: WorkOrderFields {
                stage: Some(Stage::InProgress),
                ..WorkOrderFields::named("Plaza Houssay")
            },
            created_at: now,
            updated_at: now,
        };
        let json: serde_json::Value = serde_json::to_value(&order).unwrap();
        assert_eq!(json["name"], "Plaza Houssay");
        assert_eq!(json["stage"], "IN_PROGRESS");
        assert_eq!(json["id"], order.id.to_string());
    }
}
