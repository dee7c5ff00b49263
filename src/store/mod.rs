//! Persistence for work orders and their lookup tables.
//!
//! [`RecordStore`] is the repository the lifecycle and the reporting code talk
//! to. [`SqliteStore`] is the only backend; tests run it against an in-memory
//! database.

mod sqlite;

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::ObrasError;
use crate::lifecycle::{Stage, WorkOrder, WorkOrderFields, WorkOrderId};

pub use sqlite::SqliteStore;

/// The lookup tables a work order can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Stage,
    WorkType,
    ResponsibleArea,
    Commune,
    Neighborhood,
    ContractingType,
    Company,
    FundingSource,
}

impl EntityKind {
    pub(crate) fn table(self) -> &'static str {
        match self {
            EntityKind::Stage => "stages",
            EntityKind::WorkType => "work_types",
            EntityKind::ResponsibleArea => "responsible_areas",
            EntityKind::Commune => "communes",
            EntityKind::Neighborhood => "neighborhoods",
            EntityKind::ContractingType => "contracting_types",
            EntityKind::Company => "companies",
            EntityKind::FundingSource => "funding_sources",
        }
    }

    pub(crate) fn key_column(self) -> &'static str {
        match self {
            EntityKind::Commune => "number",
            _ => "name",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Stage => "stage",
            EntityKind::WorkType => "work type",
            EntityKind::ResponsibleArea => "responsible area",
            EntityKind::Commune => "commune",
            EntityKind::Neighborhood => "neighborhood",
            EntityKind::ContractingType => "contracting type",
            EntityKind::Company => "company",
            EntityKind::FundingSource => "funding source",
        };
        f.write_str(label)
    }
}

/// A row in one of the lookup tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: i64,
}

/// The natural key of a lookup row, tagged with the table it lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<'a> {
    Stage(Stage),
    WorkType(&'a str),
    ResponsibleArea(&'a str),
    Commune(u32),
    /// Neighborhood names are unique city-wide; each belongs to one commune.
    Neighborhood { name: &'a str, commune: u32 },
    ContractingType(&'a str),
    /// Companies are matched by name; the tax id is recorded on creation.
    Company { name: &'a str, tax_id: Option<&'a str> },
    FundingSource(&'a str),
}

impl Lookup<'_> {
    pub fn kind(&self) -> EntityKind {
        match self {
            Lookup::Stage(_) => EntityKind::Stage,
            Lookup::WorkType(_) => EntityKind::WorkType,
            Lookup::ResponsibleArea(_) => EntityKind::ResponsibleArea,
            Lookup::Commune(_) => EntityKind::Commune,
            Lookup::Neighborhood { .. } => EntityKind::Neighborhood,
            Lookup::ContractingType(_) => EntityKind::ContractingType,
            Lookup::Company { .. } => EntityKind::Company,
            Lookup::FundingSource(_) => EntityKind::FundingSource,
        }
    }

    /// Builds a name-keyed lookup for `kind`.
    ///
    /// Returns `None` for the kinds whose key is not a bare name (stage,
    /// commune and neighborhood).
    pub fn by_name(kind: EntityKind, name: &str) -> Option<Lookup<'_>> {
        match kind {
            EntityKind::WorkType => Some(Lookup::WorkType(name)),
            EntityKind::ResponsibleArea => Some(Lookup::ResponsibleArea(name)),
            EntityKind::ContractingType => Some(Lookup::ContractingType(name)),
            EntityKind::Company => Some(Lookup::Company { name, tax_id: None }),
            EntityKind::FundingSource => Some(Lookup::FundingSource(name)),
            EntityKind::Stage | EntityKind::Commune | EntityKind::Neighborhood => None,
        }
    }
}

/// Selection criteria for counting and summing work orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkOrderFilter {
    pub stage: Option<Stage>,
    /// Keeps only work orders whose duration is known and at most this long.
    pub max_duration_months: Option<u32>,
}

impl WorkOrderFilter {
    pub fn in_stage(stage: Stage) -> Self {
        Self {
            stage: Some(stage),
            ..Default::default()
        }
    }

    pub fn max_duration(mut self, months: u32) -> Self {
        self.max_duration_months = Some(months);
        self
    }
}

/// Dimension used by [`RecordStore::aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Stage,
    WorkType,
    ResponsibleArea,
    Commune,
}

/// Work order count and contract amount total for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    /// `None` collects the work orders with no value for the dimension.
    pub key: Option<String>,
    pub count: u64,
    pub total_amount: Decimal,
}

/// A row `bulk_load` could not persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub index: usize,
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: Vec<SkippedRow>,
}

impl LoadReport {
    pub fn merge(&mut self, other: LoadReport) {
        self.loaded += other.loaded;
        self.skipped.extend(other.skipped);
    }
}

/// Repository over work orders and their lookup tables.
pub trait RecordStore {
    /// Resolves a lookup row without creating it.
    fn find(&self, lookup: &Lookup<'_>) -> Result<Option<EntityRef>, ObrasError>;

    /// Resolves a lookup row, inserting it first if it does not exist.
    ///
    /// Calling this twice with the same key yields equal references.
    fn get_or_create(&self, lookup: &Lookup<'_>) -> Result<EntityRef, ObrasError>;

    fn create_work_order(&self, fields: &WorkOrderFields) -> Result<WorkOrderId, ObrasError>;

    fn load(&self, id: &WorkOrderId) -> Result<WorkOrder, ObrasError>;

    /// Persists every field of `order` in one transaction.
    fn save(&self, order: &WorkOrder) -> Result<(), ObrasError>;

    fn count_where(&self, filter: &WorkOrderFilter) -> Result<u64, ObrasError>;

    fn sum_amount_where(&self, filter: &WorkOrderFilter) -> Result<Decimal, ObrasError>;

    /// Groups work orders by `key`, largest groups first.
    fn aggregate(&self, key: GroupKey) -> Result<Vec<GroupSummary>, ObrasError>;

    /// Natural keys of every row of a lookup table, ascending.
    fn names(&self, kind: EntityKind) -> Result<Vec<String>, ObrasError>;

    fn neighborhoods_by_commune(
        &self,
        communes: &[u32],
    ) -> Result<Vec<(u32, Vec<String>)>, ObrasError>;

    /// Inserts a batch of work orders in one transaction, skipping the rows
    /// that fail validation or hit a uniqueness constraint.
    fn bulk_load(&mut self, rows: &[WorkOrderFields]) -> Result<LoadReport, ObrasError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_reports_its_kind() {
        assert_eq!(Lookup::Commune(3).kind(), EntityKind::Commune);
        assert_eq!(
            Lookup::Neighborhood {
                name: "Palermo",
                commune: 14
            }
            .kind(),
            EntityKind::Neighborhood
        );
        assert_eq!(Lookup::Stage(Stage::New).kind(), EntityKind::Stage);
    }

    #[test]
    fn by_name_only_covers_name_keyed_kinds() {
        assert_eq!(
            Lookup::by_name(EntityKind::WorkType, "Vial"),
            Some(Lookup::WorkType("Vial"))
        );
        assert!(Lookup::by_name(EntityKind::Commune, "3").is_none());
        assert!(Lookup::by_name(EntityKind::Neighborhood, "Palermo").is_none());
    }

    #[test]
    fn filter_builders() {
        let filter = WorkOrderFilter::in_stage(Stage::Finished).max_duration(24);
        assert_eq!(filter.stage, Some(Stage::Finished));
        assert_eq!(filter.max_duration_months, Some(24));
        assert_eq!(WorkOrderFilter::default().stage, None);
    }

    #[test]
    fn load_reports_merge() {
        let mut total = LoadReport {
            loaded: 2,
            skipped: vec![],
        };
        total.merge(LoadReport {
            loaded: 3,
            skipped: vec![SkippedRow {
                index: 4,
                name: "Obra".into(),
                reason: "dup".into(),
            }],
        });
        assert_eq!(total.loaded, 5);
        assert_eq!(total.skipped.len(), 1);
    }
}
