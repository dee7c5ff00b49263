use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::info;

use super::stage::Stage;
use super::work_order::WorkOrder;
use crate::error::ObrasError;
use crate::store::{EntityKind, RecordStore};

/// Drives a [`WorkOrder`] through its stages.
///
/// Every operation checks its guards, applies the change to a copy of the
/// order, persists the copy through [`RecordStore::save`] and only then
/// writes it back into the caller's value. A rejected or failed operation
/// leaves both the caller's value and the stored row untouched.
pub struct WorkLifecycle<'a, S: RecordStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> WorkLifecycle<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Marks a freshly created order as a new project with no progress.
    pub fn start_project(&self, order: &mut WorkOrder) -> Result<(), ObrasError> {
        if !matches!(order.stage(), None | Some(Stage::New)) {
            return Err(invalid("start", order));
        }
        self.commit(order, |next| {
            next.fields.stage = Some(Stage::New);
            next.fields.progress = Decimal::ZERO;
        })
    }

    /// `New` to `Contracting`. The contracting type is created on save when
    /// it is not known yet.
    pub fn begin_contracting(
        &self,
        order: &mut WorkOrder,
        contracting_type: &str,
        contracting_number: &str,
    ) -> Result<(), ObrasError> {
        require_stage(order, Stage::New, "begin contracting for")?;
        let contracting_type = required_name(EntityKind::ContractingType, contracting_type)?;
        self.commit(order, |next| {
            next.fields.stage = Some(Stage::Contracting);
            next.fields.contracting_type = Some(contracting_type.to_string());
            next.fields.contracting_number = non_blank(contracting_number);
        })
    }

    /// `Contracting` to `Awarded`.
    ///
    /// A tax id fills in a company stored without one. A company already
    /// registered under a different tax id is an integrity error.
    pub fn award(
        &self,
        order: &mut WorkOrder,
        company: &str,
        tax_id: Option<&str>,
        file_number: &str,
    ) -> Result<(), ObrasError> {
        require_stage(order, Stage::Contracting, "award")?;
        let company = required_name(EntityKind::Company, company)?;
        let tax_id = tax_id.and_then(non_blank);
        self.commit(order, |next| {
            next.fields.stage = Some(Stage::Awarded);
            next.fields.company = Some(company.to_string());
            next.fields.company_tax_id = tax_id;
            next.fields.file_number = non_blank(file_number);
        })
    }

    /// `Awarded` to `InProgress`, recording dates, funding and workforce.
    /// The start date may not fall after the planned end.
    pub fn begin(
        &self,
        order: &mut WorkOrder,
        start: Option<NaiveDate>,
        planned_end: Option<NaiveDate>,
        funding_source: &str,
        workforce_count: u32,
    ) -> Result<(), ObrasError> {
        require_stage(order, Stage::Awarded, "begin")?;
        if let (Some(start), Some(end)) = (start, planned_end) {
            if start > end {
                return Err(ObrasError::Validation(format!(
                    "start date {start} is after planned end {end}"
                )));
            }
        }
        let funding_source = required_name(EntityKind::FundingSource, funding_source)?;
        self.commit(order, |next| {
            next.fields.stage = Some(Stage::InProgress);
            next.fields.planned_start = start;
            next.fields.planned_end = planned_end;
            next.fields.funding_source = Some(funding_source.to_string());
            next.fields.workforce_count = Some(workforce_count);
        })
    }

    /// Sets the completion percentage of any open order. `percent` must lie
    /// within 0..=100.
    pub fn update_progress(&self, order: &mut WorkOrder, percent: Decimal) -> Result<(), ObrasError> {
        if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
            return Err(ObrasError::Validation(format!(
                "progress must be between 0 and 100, got {percent}"
            )));
        }
        require_open(order, "update progress of")?;
        self.commit(order, |next| next.fields.progress = percent)
    }

    /// Adds `extra_months` (positive) to the planned duration.
    pub fn extend_duration(&self, order: &mut WorkOrder, extra_months: i64) -> Result<(), ObrasError> {
        let extra = positive(extra_months, "extra months")?;
        require_open(order, "extend")?;
        let months = increment(order.fields.duration_months, extra, "duration")?;
        self.commit(order, |next| next.fields.duration_months = Some(months))
    }

    /// Adds `extra` (positive) workers. An unset count starts from zero.
    pub fn add_workforce(&self, order: &mut WorkOrder, extra: i64) -> Result<(), ObrasError> {
        let extra = positive(extra, "extra workforce")?;
        require_open(order, "add workforce to")?;
        let count = increment(order.fields.workforce_count, extra, "workforce")?;
        self.commit(order, |next| next.fields.workforce_count = Some(count))
    }

    /// Closes an open order at 100% progress.
    pub fn finish(&self, order: &mut WorkOrder) -> Result<(), ObrasError> {
        require_open(order, "finish")?;
        self.commit(order, |next| {
            next.fields.stage = Some(Stage::Finished);
            next.fields.progress = Decimal::ONE_HUNDRED;
        })
    }

    /// Cancels an open order. Progress is kept as it was.
    pub fn rescind(&self, order: &mut WorkOrder) -> Result<(), ObrasError> {
        require_open(order, "rescind")?;
        self.commit(order, |next| next.fields.stage = Some(Stage::Rescinded))
    }

    fn commit(
        &self,
        order: &mut WorkOrder,
        apply: impl FnOnce(&mut WorkOrder),
    ) -> Result<(), ObrasError> {
        let mut next = order.clone();
        apply(&mut next);
        next.updated_at = Utc::now();
        self.store.save(&next)?;

        if next.stage() != order.stage() {
            info!(
                id = %order.id,
                name = %order.name(),
                from = ?order.stage(),
                to = ?next.stage(),
                "stage transition"
            );
        }
        *order = next;
        Ok(())
    }
}

fn invalid(action: &'static str, order: &WorkOrder) -> ObrasError {
    ObrasError::InvalidTransition {
        action,
        stage: order.stage(),
    }
}

fn require_stage(order: &WorkOrder, expected: Stage, action: &'static str) -> Result<(), ObrasError> {
    if order.stage() == Some(expected) {
        Ok(())
    } else {
        Err(invalid(action, order))
    }
}

fn require_open(order: &WorkOrder, action: &'static str) -> Result<(), ObrasError> {
    match order.stage() {
        Some(stage) if stage.is_terminal() => Err(invalid(action, order)),
        _ => Ok(()),
    }
}

fn positive(value: i64, what: &str) -> Result<u32, ObrasError> {
    if value <= 0 {
        return Err(ObrasError::Validation(format!(
            "{what} must be positive, got {value}"
        )));
    }
    u32::try_from(value).map_err(|_| ObrasError::Validation(format!("{what} is too large: {value}")))
}

// Unset counts as zero.
fn increment(current: Option<u32>, extra: u32, what: &str) -> Result<u32, ObrasError> {
    current
        .unwrap_or(0)
        .checked_add(extra)
        .ok_or_else(|| ObrasError::Validation(format!("{what} would overflow")))
}

fn required_name(kind: EntityKind, value: &str) -> Result<&str, ObrasError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ObrasError::Validation(format!("{kind} name must not be empty")));
    }
    Ok(value)
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
