use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::ObrasError;
use crate::lifecycle::Stage;
use crate::store::{EntityKind, GroupKey, GroupSummary, RecordStore, WorkOrderFilter};

/// Communes whose neighborhoods are listed in the report.
pub const LISTED_COMMUNES: [u32; 3] = [1, 2, 3];

/// Longest duration, in months, counted as finished on time.
pub const ON_TIME_MONTHS: u32 = 24;

/// Summary indicators over every stored work order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicators {
    pub responsible_areas: Vec<String>,
    pub work_types: Vec<String>,
    pub by_stage: Vec<GroupSummary>,
    pub by_work_type: Vec<GroupSummary>,
    pub neighborhoods: Vec<(u32, Vec<String>)>,
    pub finished_on_time: u64,
    pub total_amount: Decimal,
    pub total_work_orders: u64,
}

impl Indicators {
    pub fn collect<S: RecordStore + ?Sized>(store: &S) -> Result<Self, ObrasError> {
        let everything = WorkOrderFilter::default();
        Ok(Self {
            responsible_areas: store.names(EntityKind::ResponsibleArea)?,
            work_types: store.names(EntityKind::WorkType)?,
            by_stage: store.aggregate(GroupKey::Stage)?,
            by_work_type: store.aggregate(GroupKey::WorkType)?,
            neighborhoods: store.neighborhoods_by_commune(&LISTED_COMMUNES)?,
            finished_on_time: store
                .count_where(&WorkOrderFilter::in_stage(Stage::Finished).max_duration(ON_TIME_MONTHS))?,
            total_amount: store.sum_amount_where(&everything)?,
            total_work_orders: store.count_where(&everything)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::WorkOrderFields;
    use crate::store::SqliteStore;

    fn order(name: &str, stage: Stage, work_type: &str, months: Option<u32>, amount: i64) -> WorkOrderFields {
        WorkOrderFields {
            stage: Some(stage),
            work_type: Some(work_type.to_string()),
            responsible_area: Some("Ministerio de Espacio Público".to_string()),
            duration_months: months,
            contract_amount: Some(Decimal::from(amount)),
            ..WorkOrderFields::named(name)
        }
    }

    #[test]
    fn empty_store_reports_zeroes() {
        let store = SqliteStore::in_memory().unwrap();
        let indicators = Indicators::collect(&store).unwrap();
        assert!(indicators.responsible_areas.is_empty());
        assert!(indicators.by_stage.is_empty());
        assert!(indicators.neighborhoods.is_empty());
        assert_eq!(indicators.finished_on_time, 0);
        assert_eq!(indicators.total_amount, Decimal::ZERO);
        assert_eq!(indicators.total_work_orders, 0);
    }

    #[test]
    fn collects_every_section() {
        let mut store = SqliteStore::in_memory().unwrap();
        let mut rows = vec![
            order("Plaza A", Stage::Finished, "Espacio Público", Some(12), 100),
            order("Plaza B", Stage::Finished, "Espacio Público", Some(24), 200),
            order("Plaza C", Stage::Finished, "Espacio Público", Some(36), 300),
            order("Escuela", Stage::InProgress, "Escuelas", None, 1000),
            WorkOrderFields {
                commune: Some(1),
                neighborhood: Some("Retiro".to_string()),
                ..order("Hospital", Stage::Finished, "Salud", None, 50)
            },
        ];
        rows.push(WorkOrderFields {
            commune: Some(2),
            neighborhood: Some("Recoleta".to_string()),
            ..WorkOrderFields::named("Sin datos")
        });
        rows.push(WorkOrderFields {
            commune: Some(14),
            neighborhood: Some("Palermo".to_string()),
            ..WorkOrderFields::named("Fuera de zona")
        });
        assert_eq!(store.bulk_load(&rows).unwrap().loaded, 7);

        let indicators = Indicators::collect(&store).unwrap();
        assert_eq!(indicators.responsible_areas, vec!["Ministerio de Espacio Público"]);
        assert_eq!(indicators.work_types, vec!["Escuelas", "Espacio Público", "Salud"]);

        assert_eq!(indicators.by_stage[0].key.as_deref(), Some("FINISHED"));
        assert_eq!(indicators.by_stage[0].count, 4);

        let public_space = &indicators.by_work_type[0];
        assert_eq!(public_space.key.as_deref(), Some("Espacio Público"));
        assert_eq!(public_space.count, 3);
        assert_eq!(public_space.total_amount, Decimal::from(600));

        assert_eq!(
            indicators.neighborhoods,
            vec![
                (1, vec!["Retiro".to_string()]),
                (2, vec!["Recoleta".to_string()])
            ]
        );
        // Unknown durations are never counted as on time.
        assert_eq!(indicators.finished_on_time, 2);
        assert_eq!(indicators.total_amount, Decimal::from(1650));
        assert_eq!(indicators.total_work_orders, 7);
    }
}
