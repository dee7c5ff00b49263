use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::ObrasError;
use crate::lifecycle::{WorkLifecycle, WorkOrder, WorkOrderFields};
use crate::store::RecordStore;

/// Creates "Escuela 12" and walks it from NEW to FINISHED.
///
/// `on_step` is called after every transition with a short description and
/// the order as it now stands.
pub fn run<S: RecordStore + ?Sized>(
    store: &S,
    mut on_step: impl FnMut(&str, &WorkOrder),
) -> Result<WorkOrder, ObrasError> {
    let lifecycle = WorkLifecycle::new(store);
    let fields = WorkOrderFields {
        description: Some("Demo work order".to_string()),
        work_type: Some("Escuelas".to_string()),
        responsible_area: Some("Ministerio de Educación".to_string()),
        ..WorkOrderFields::named("Escuela 12")
    };
    let id = store.create_work_order(&fields)?;
    let mut order = store.load(&id)?;

    lifecycle.start_project(&mut order)?;
    on_step("project started", &order);

    lifecycle.begin_contracting(&mut order, "Licitación Pública", "LIC-001")?;
    on_step("contracting LIC-001", &order);

    lifecycle.award(&mut order, "ACME", Some("30-1-1"), "EXP-1")?;
    on_step("awarded to ACME", &order);

    lifecycle.begin(
        &mut order,
        NaiveDate::from_ymd_opt(2025, 1, 1),
        NaiveDate::from_ymd_opt(2025, 6, 1),
        "GCBA",
        10,
    )?;
    on_step("works started", &order);

    lifecycle.update_progress(&mut order, Decimal::from(50))?;
    on_step("progress 50%", &order);

    lifecycle.finish(&mut order)?;
    on_step("finished", &order);

    Ok(order)
}
