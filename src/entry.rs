//! Interactive creation of work orders.
//!
//! Every question goes through [`InputProvider`], so the flow runs the same
//! against a terminal or a scripted test double.

use std::str::FromStr;

use console::{Style, Term};
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::ObrasError;
use crate::etl::parse_date;
use crate::lifecycle::{WorkLifecycle, WorkOrder, WorkOrderFields};
use crate::store::{EntityKind, Lookup, RecordStore};

pub trait InputProvider {
    /// Asks a free-text question. Blank answers come back as `None`.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>, ObrasError>;

    fn confirm(&mut self, question: &str) -> Result<bool, ObrasError>;

    /// Shows a message that needs no answer.
    fn notify(&mut self, message: &str) -> Result<(), ObrasError>;
}

/// Reads answers from the controlling terminal.
pub struct ConsoleInput {
    term: Term,
    prompt: Style,
    warning: Style,
}

impl ConsoleInput {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
            prompt: Style::new().cyan().bold(),
            warning: Style::new().yellow(),
        }
    }
}

impl Default for ConsoleInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputProvider for ConsoleInput {
    fn ask(&mut self, prompt: &str) -> Result<Option<String>, ObrasError> {
        self.term.write_str(&format!("{} ", self.prompt.apply_to(format!("{prompt}:"))))?;
        let line = self.term.read_line()?;
        let line = line.trim();
        Ok((!line.is_empty()).then(|| line.to_string()))
    }

    fn confirm(&mut self, question: &str) -> Result<bool, ObrasError> {
        loop {
            self.term.write_str(&format!("{} ", self.prompt.apply_to(format!("{question} [s/n]:"))))?;
            match self.term.read_line()?.trim().to_lowercase().as_str() {
                "s" | "si" | "sí" | "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.term.write_line(&self.warning.apply_to("Answer s or n.").to_string())?,
            }
        }
    }

    fn notify(&mut self, message: &str) -> Result<(), ObrasError> {
        self.term.write_line(&self.warning.apply_to(message).to_string())?;
        Ok(())
    }
}

/// Asks for a value of a name-keyed lookup table.
///
/// Known values are returned as typed. An unknown value is only accepted
/// once the operator confirms it should be created; declining asks again.
/// Blank input returns `None`.
pub fn resolve_or_create<S: RecordStore + ?Sized>(
    input: &mut dyn InputProvider,
    store: &S,
    kind: EntityKind,
    prompt: &str,
) -> Result<Option<String>, ObrasError> {
    if Lookup::by_name(kind, "").is_none() {
        return Err(ObrasError::Validation(format!(
            "{kind} values are not looked up by name"
        )));
    }
    resolve_with(input, store, prompt, |value| Lookup::by_name(kind, value))
}

// `lookup` returns `None` when the answer cannot be read at all.
fn resolve_with<S, F>(
    input: &mut dyn InputProvider,
    store: &S,
    prompt: &str,
    lookup: F,
) -> Result<Option<String>, ObrasError>
where
    S: RecordStore + ?Sized,
    F: Fn(&str) -> Option<Lookup<'_>>,
{
    loop {
        let Some(value) = input.ask(prompt)? else {
            return Ok(None);
        };
        let Some(key) = lookup(&value) else {
            input.notify(&format!("'{value}' is not a valid value."))?;
            continue;
        };
        match store.find(&key) {
            Ok(Some(_)) => return Ok(Some(value)),
            Ok(None) => {
                let kind = key.kind();
                if input.confirm(&format!("The {kind} '{value}' does not exist. Create it?"))? {
                    debug!(%kind, value = %value, "new lookup value confirmed");
                    return Ok(Some(value));
                }
            }
            Err(err @ ObrasError::Integrity(_)) => input.notify(&err.to_string())?,
            Err(err) => return Err(err),
        }
    }
}

fn ask_required(input: &mut dyn InputProvider, prompt: &str) -> Result<String, ObrasError> {
    loop {
        if let Some(value) = input.ask(prompt)? {
            return Ok(value);
        }
        input.notify("This field is required.")?;
    }
}

fn ask_parsed<T, F>(input: &mut dyn InputProvider, prompt: &str, parse: F) -> Result<Option<T>, ObrasError>
where
    F: Fn(&str) -> Option<T>,
{
    loop {
        let Some(value) = input.ask(prompt)? else {
            return Ok(None);
        };
        match parse(&value) {
            Some(parsed) => return Ok(Some(parsed)),
            None => input.notify(&format!("Could not read '{value}', try again or leave blank."))?,
        }
    }
}

fn parse_from<T: FromStr>(raw: &str) -> Option<T> {
    raw.trim().parse().ok()
}

/// Asks for every field of a new work order, stores it and starts it as a
/// new project.
pub fn new_work_order<S: RecordStore + ?Sized>(
    input: &mut dyn InputProvider,
    store: &S,
    lifecycle: &WorkLifecycle<'_, S>,
) -> Result<WorkOrder, ObrasError> {
    let name = ask_required(input, "Name")?;
    let description = input.ask("Description (optional)")?;
    let address = input.ask("Address (optional)")?;
    let contract_amount = ask_parsed(input, "Contract amount, e.g. 123456.78 (optional)", |raw| {
        parse_from::<Decimal>(raw).filter(|amount| !amount.is_sign_negative())
    })?;
    let work_type = resolve_or_create(input, store, EntityKind::WorkType, "Work type")?;
    let responsible_area =
        resolve_or_create(input, store, EntityKind::ResponsibleArea, "Responsible area")?;
    let planned_start = ask_parsed(input, "Planned start, YYYY-MM-DD (optional)", parse_date)?;
    let duration_months = ask_parsed(input, "Duration in months (optional)", parse_from::<u32>)?;

    let commune = resolve_with(input, store, "Commune number (optional)", |raw| {
        parse_from::<u32>(raw)
            .filter(|&n| n > 0)
            .map(Lookup::Commune)
    })?
    .and_then(|raw| parse_from::<u32>(&raw));

    let neighborhood = match commune {
        Some(commune) => resolve_with(input, store, "Neighborhood (optional)", |name| {
            Some(Lookup::Neighborhood { name, commune })
        })?,
        None => None,
    };

    let fields = WorkOrderFields {
        description,
        address,
        contract_amount,
        work_type,
        responsible_area,
        planned_start,
        duration_months,
        commune,
        neighborhood,
        ..WorkOrderFields::named(name)
    };

    let id = store.create_work_order(&fields)?;
    let mut order = store.load(&id)?;
    lifecycle.start_project(&mut order)?;
    Ok(order)
}
