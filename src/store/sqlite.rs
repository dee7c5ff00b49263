use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, named_params, params, params_from_iter};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::{
    EntityKind, EntityRef, GroupKey, GroupSummary, LoadReport, Lookup, RecordStore, SkippedRow,
    WorkOrderFilter,
};
use crate::error::ObrasError;
use crate::lifecycle::{Stage, WorkOrder, WorkOrderFields, WorkOrderId};

const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS stages (
  id INTEGER PRIMARY KEY,
  name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS work_types (
  id INTEGER PRIMARY KEY,
  name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS responsible_areas (
  id INTEGER PRIMARY KEY,
  name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS communes (
  id INTEGER PRIMARY KEY,
  number INTEGER NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS neighborhoods (
  id INTEGER PRIMARY KEY,
  name TEXT NOT NULL UNIQUE,
  commune_id INTEGER NOT NULL REFERENCES communes(id)
);

CREATE TABLE IF NOT EXISTS contracting_types (
  id INTEGER PRIMARY KEY,
  name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS companies (
  id INTEGER PRIMARY KEY,
  name TEXT NOT NULL UNIQUE,
  tax_id TEXT UNIQUE
);

CREATE TABLE IF NOT EXISTS funding_sources (
  id INTEGER PRIMARY KEY,
  name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS work_orders (
  id TEXT PRIMARY KEY,
  name TEXT NOT NULL,
  description TEXT,
  environment TEXT,
  stage_id INTEGER REFERENCES stages(id),
  work_type_id INTEGER REFERENCES work_types(id),
  responsible_area_id INTEGER REFERENCES responsible_areas(id),
  contract_amount TEXT,
  address TEXT,
  latitude REAL,
  longitude REAL,
  commune_id INTEGER REFERENCES communes(id),
  neighborhood_id INTEGER REFERENCES neighborhoods(id),
  planned_start TEXT,
  planned_end TEXT,
  duration_months INTEGER,
  progress TEXT NOT NULL DEFAULT '0',
  workforce_count INTEGER,
  contracting_type_id INTEGER REFERENCES contracting_types(id),
  contracting_number TEXT,
  tender_year INTEGER,
  company_id INTEGER REFERENCES companies(id),
  file_number TEXT,
  funding_source_id INTEGER REFERENCES funding_sources(id),
  beneficiaries TEXT,
  featured INTEGER,
  commitment INTEGER,
  ba_elige INTEGER,
  image_1 TEXT,
  image_2 TEXT,
  image_3 TEXT,
  image_4 TEXT,
  internal_link TEXT,
  tender_documents_url TEXT,
  environmental_study_url TEXT,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL
);
"#;

const SELECT_WORK_ORDER: &str = "
SELECT w.id, w.name, w.description, w.environment, s.name, wt.name, ra.name,
       w.contract_amount, w.address, w.latitude, w.longitude, c.number, n.name,
       w.planned_start, w.planned_end, w.duration_months, w.progress, w.workforce_count,
       ct.name, w.contracting_number, w.tender_year, co.name, co.tax_id, w.file_number,
       fs.name, w.beneficiaries, w.featured, w.commitment, w.ba_elige, w.image_1,
       w.image_2, w.image_3, w.image_4, w.internal_link, w.tender_documents_url,
       w.environmental_study_url, w.created_at, w.updated_at
FROM work_orders w
LEFT JOIN stages s ON s.id = w.stage_id
LEFT JOIN work_types wt ON wt.id = w.work_type_id
LEFT JOIN responsible_areas ra ON ra.id = w.responsible_area_id
LEFT JOIN communes c ON c.id = w.commune_id
LEFT JOIN neighborhoods n ON n.id = w.neighborhood_id
LEFT JOIN contracting_types ct ON ct.id = w.contracting_type_id
LEFT JOIN companies co ON co.id = w.company_id
LEFT JOIN funding_sources fs ON fs.id = w.funding_source_id
WHERE w.id = ?1
";

// ?1 is the canonical stage label, ?2 the duration ceiling; NULL disables either.
const FILTERED_WORK_ORDERS: &str = "
FROM work_orders w
LEFT JOIN stages s ON s.id = w.stage_id
WHERE (?1 IS NULL OR s.name = ?1)
  AND (?2 IS NULL OR w.duration_months <= ?2)
";

/// [`RecordStore`] backed by a SQLite database file.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and makes sure every table exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ObrasError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| ObrasError::StorageConnection {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        debug!(path = %path.display(), "database ready");
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, ObrasError> {
        let conn =
            Connection::open_in_memory().map_err(|source| ObrasError::StorageConnection {
                path: ":memory:".into(),
                source,
            })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), ObrasError> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }
}

impl RecordStore for SqliteStore {
    fn find(&self, lookup: &Lookup<'_>) -> Result<Option<EntityRef>, ObrasError> {
        find_in(&self.conn, lookup)
    }

    fn get_or_create(&self, lookup: &Lookup<'_>) -> Result<EntityRef, ObrasError> {
        let tx = self.conn.unchecked_transaction()?;
        let entity = get_or_create_in(&tx, lookup)?;
        tx.commit()?;
        Ok(entity)
    }

    fn create_work_order(&self, fields: &WorkOrderFields) -> Result<WorkOrderId, ObrasError> {
        let tx = self.conn.unchecked_transaction()?;
        let id = insert_work_order(&tx, fields, Utc::now())?;
        tx.commit()?;
        info!(%id, name = %fields.name, "work order created");
        Ok(id)
    }

    fn load(&self, id: &WorkOrderId) -> Result<WorkOrder, ObrasError> {
        self.conn
            .query_row(SELECT_WORK_ORDER, params![id.to_string()], map_work_order)
            .optional()?
            .ok_or_else(|| ObrasError::WorkOrderNotFound(id.to_string()))
    }

    fn save(&self, order: &WorkOrder) -> Result<(), ObrasError> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = write_fields(&tx, &order.id, &order.fields, order.updated_at)?;
        if changed == 0 {
            return Err(ObrasError::WorkOrderNotFound(order.id.to_string()));
        }
        tx.commit()?;
        debug!(id = %order.id, "work order saved");
        Ok(())
    }

    fn count_where(&self, filter: &WorkOrderFilter) -> Result<u64, ObrasError> {
        let stage = filter.stage.map(|stage| stage.to_string());
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) {FILTERED_WORK_ORDERS}"),
            params![stage, filter.max_duration_months],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    fn sum_amount_where(&self, filter: &WorkOrderFilter) -> Result<Decimal, ObrasError> {
        let stage = filter.stage.map(|stage| stage.to_string());
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT w.contract_amount {FILTERED_WORK_ORDERS}"))?;
        let amounts = stmt.query_map(params![stage, filter.max_duration_months], |row| {
            decimal_at(row, 0)
        })?;

        let mut total = Decimal::ZERO;
        for amount in amounts {
            if let Some(amount) = amount? {
                total += amount;
            }
        }
        Ok(total)
    }

    fn aggregate(&self, key: GroupKey) -> Result<Vec<GroupSummary>, ObrasError> {
        let (label, join) = match key {
            GroupKey::Stage => ("g.name", "LEFT JOIN stages g ON g.id = w.stage_id"),
            GroupKey::WorkType => ("g.name", "LEFT JOIN work_types g ON g.id = w.work_type_id"),
            GroupKey::ResponsibleArea => (
                "g.name",
                "LEFT JOIN responsible_areas g ON g.id = w.responsible_area_id",
            ),
            GroupKey::Commune => (
                "CAST(g.number AS TEXT)",
                "LEFT JOIN communes g ON g.id = w.commune_id",
            ),
        };
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {label}, w.contract_amount FROM work_orders w {join}"))?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, Option<String>>(0)?, decimal_at(row, 1)?))
        })?;

        let mut groups: BTreeMap<Option<String>, (u64, Decimal)> = BTreeMap::new();
        for row in rows {
            let (group, amount) = row?;
            let entry = groups.entry(group).or_insert((0, Decimal::ZERO));
            entry.0 += 1;
            if let Some(amount) = amount {
                entry.1 += amount;
            }
        }

        let mut summaries: Vec<GroupSummary> = groups
            .into_iter()
            .map(|(key, (count, total_amount))| GroupSummary {
                key,
                count,
                total_amount,
            })
            .collect();
        summaries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        Ok(summaries)
    }

    fn names(&self, kind: EntityKind) -> Result<Vec<String>, ObrasError> {
        let column = kind.key_column();
        let mut stmt = self.conn.prepare(&format!(
            "SELECT CAST({column} AS TEXT) FROM {} ORDER BY {column}",
            kind.table()
        ))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn neighborhoods_by_commune(
        &self,
        communes: &[u32],
    ) -> Result<Vec<(u32, Vec<String>)>, ObrasError> {
        if communes.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; communes.len()].join(", ");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT c.number, n.name
             FROM neighborhoods n
             JOIN communes c ON c.id = n.commune_id
             WHERE c.number IN ({placeholders})
             ORDER BY c.number, n.name"
        ))?;
        let rows = stmt.query_map(params_from_iter(communes.iter()), |row| {
            Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut grouped: Vec<(u32, Vec<String>)> = Vec::new();
        for row in rows {
            let (number, name) = row?;
            match grouped.last_mut() {
                Some((current, names)) if *current == number => names.push(name),
                _ => grouped.push((number, vec![name])),
            }
        }
        Ok(grouped)
    }

    fn bulk_load(&mut self, rows: &[WorkOrderFields]) -> Result<LoadReport, ObrasError> {
        let tx = self.conn.transaction()?;
        let now = Utc::now();
        let mut report = LoadReport::default();

        for (index, fields) in rows.iter().enumerate() {
            tx.execute_batch("SAVEPOINT load_row")?;
            match insert_work_order(&tx, fields, now) {
                Ok(id) => {
                    tx.execute_batch("RELEASE load_row")?;
                    report.loaded += 1;
                    debug!(%id, index, "row loaded");
                }
                Err(err) if is_row_error(&err) => {
                    tx.execute_batch("ROLLBACK TO load_row; RELEASE load_row")?;
                    warn!(index, name = %fields.name, error = %err, "skipping row");
                    report.skipped.push(SkippedRow {
                        index,
                        name: fields.name.clone(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        tx.commit()?;
        info!(
            loaded = report.loaded,
            skipped = report.skipped.len(),
            "batch committed"
        );
        Ok(report)
    }
}

// Failures tied to the content of a single row; anything else aborts the batch.
fn is_row_error(err: &ObrasError) -> bool {
    matches!(err, ObrasError::Integrity(_)) || err.is_validation()
}

fn require_name(kind: EntityKind, name: &str) -> Result<&str, ObrasError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ObrasError::Validation(format!("{kind} name must not be empty")));
    }
    Ok(name)
}

fn find_by_name(conn: &Connection, kind: EntityKind, name: &str) -> Result<Option<i64>, ObrasError> {
    let id = conn
        .query_row(
            &format!("SELECT id FROM {} WHERE name = ?1", kind.table()),
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Id and commune number of the neighborhood called `name`, if any.
fn neighborhood_row(conn: &Connection, name: &str) -> Result<Option<(i64, u32)>, ObrasError> {
    let row = conn
        .query_row(
            "SELECT n.id, c.number
             FROM neighborhoods n
             JOIN communes c ON c.id = n.commune_id
             WHERE n.name = ?1",
            params![name],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    Ok(row)
}

fn find_in(conn: &Connection, lookup: &Lookup<'_>) -> Result<Option<EntityRef>, ObrasError> {
    let kind = lookup.kind();
    let id = match lookup {
        Lookup::Stage(stage) => find_by_name(conn, kind, &stage.to_string())?,
        Lookup::Commune(number) => conn
            .query_row(
                "SELECT id FROM communes WHERE number = ?1",
                params![number],
                |row| row.get(0),
            )
            .optional()?,
        Lookup::Neighborhood { name, commune } => {
            let name = require_name(kind, name)?;
            match neighborhood_row(conn, name)? {
                Some((id, owner)) if owner == *commune => Some(id),
                Some((_, owner)) => {
                    return Err(ObrasError::Integrity(format!(
                        "neighborhood '{name}' belongs to commune {owner}, not {commune}"
                    )));
                }
                None => None,
            }
        }
        Lookup::Company { name, .. }
        | Lookup::WorkType(name)
        | Lookup::ResponsibleArea(name)
        | Lookup::ContractingType(name)
        | Lookup::FundingSource(name) => find_by_name(conn, kind, require_name(kind, name)?)?,
    };
    Ok(id.map(|id| EntityRef { kind, id }))
}

fn get_or_create_in(conn: &Connection, lookup: &Lookup<'_>) -> Result<EntityRef, ObrasError> {
    if let Some(found) = find_in(conn, lookup)? {
        if let Lookup::Company {
            tax_id: Some(tax_id),
            ..
        } = lookup
        {
            let tax_id = tax_id.trim();
            if !tax_id.is_empty() {
                let stored: Option<String> = conn.query_row(
                    "SELECT tax_id FROM companies WHERE id = ?1",
                    params![found.id],
                    |row| row.get(0),
                )?;
                match stored {
                    None => {
                        conn.execute(
                            "UPDATE companies SET tax_id = ?1 WHERE id = ?2",
                            params![tax_id, found.id],
                        )?;
                    }
                    Some(stored) if stored != tax_id => {
                        return Err(ObrasError::Integrity(format!(
                            "company is registered with tax id {stored}, not {tax_id}"
                        )));
                    }
                    Some(_) => {}
                }
            }
        }
        return Ok(found);
    }

    let kind = lookup.kind();
    match lookup {
        Lookup::Stage(stage) => {
            conn.execute(
                "INSERT INTO stages (name) VALUES (?1)",
                params![stage.to_string()],
            )?;
        }
        Lookup::Commune(number) => {
            conn.execute("INSERT INTO communes (number) VALUES (?1)", params![number])?;
        }
        Lookup::Neighborhood { name, commune } => {
            let owner = get_or_create_in(conn, &Lookup::Commune(*commune))?;
            conn.execute(
                "INSERT INTO neighborhoods (name, commune_id) VALUES (?1, ?2)",
                params![name.trim(), owner.id],
            )?;
        }
        Lookup::Company { name, tax_id } => {
            let tax_id = tax_id.map(str::trim).filter(|tax_id| !tax_id.is_empty());
            conn.execute(
                "INSERT INTO companies (name, tax_id) VALUES (?1, ?2)",
                params![name.trim(), tax_id],
            )?;
        }
        Lookup::WorkType(name)
        | Lookup::ResponsibleArea(name)
        | Lookup::ContractingType(name)
        | Lookup::FundingSource(name) => {
            conn.execute(
                &format!("INSERT INTO {} (name) VALUES (?1)", kind.table()),
                params![name.trim()],
            )?;
        }
    }

    let id = conn.last_insert_rowid();
    debug!(%kind, id, "lookup row created");
    Ok(EntityRef { kind, id })
}

/// Row ids of every lookup a work order references.
#[derive(Debug, Default)]
struct ResolvedRefs {
    stage: Option<i64>,
    work_type: Option<i64>,
    responsible_area: Option<i64>,
    commune: Option<i64>,
    neighborhood: Option<i64>,
    contracting_type: Option<i64>,
    company: Option<i64>,
    funding_source: Option<i64>,
}

fn resolve_refs(conn: &Connection, fields: &WorkOrderFields) -> Result<ResolvedRefs, ObrasError> {
    let id_of = |lookup: Option<Lookup<'_>>| -> Result<Option<i64>, ObrasError> {
        lookup
            .map(|lookup| get_or_create_in(conn, &lookup).map(|entity| entity.id))
            .transpose()
    };

    let mut refs = ResolvedRefs {
        stage: id_of(fields.stage.map(Lookup::Stage))?,
        work_type: id_of(fields.work_type.as_deref().map(Lookup::WorkType))?,
        responsible_area: id_of(fields.responsible_area.as_deref().map(Lookup::ResponsibleArea))?,
        commune: id_of(fields.commune.map(Lookup::Commune))?,
        contracting_type: id_of(fields.contracting_type.as_deref().map(Lookup::ContractingType))?,
        company: id_of(fields.company.as_deref().map(|name| Lookup::Company {
            name,
            tax_id: fields.company_tax_id.as_deref(),
        }))?,
        funding_source: id_of(fields.funding_source.as_deref().map(Lookup::FundingSource))?,
        ..Default::default()
    };

    refs.neighborhood = match (fields.neighborhood.as_deref(), fields.commune) {
        (Some(name), Some(commune)) => id_of(Some(Lookup::Neighborhood { name, commune }))?,
        (Some(name), None) => {
            let name = require_name(EntityKind::Neighborhood, name)?;
            match neighborhood_row(conn, name)? {
                Some((id, _)) => Some(id),
                None => {
                    return Err(ObrasError::Validation(format!(
                        "neighborhood '{name}' cannot be created without a commune"
                    )));
                }
            }
        }
        (None, _) => None,
    };
    Ok(refs)
}

fn validate_fields(fields: &WorkOrderFields) -> Result<(), ObrasError> {
    if fields.name.trim().is_empty() {
        return Err(ObrasError::Validation(
            "work order name must not be empty".into(),
        ));
    }
    if fields.progress < Decimal::ZERO || fields.progress > Decimal::ONE_HUNDRED {
        return Err(ObrasError::Validation(format!(
            "progress {} is outside 0..=100",
            fields.progress
        )));
    }
    Ok(())
}

fn insert_work_order(
    conn: &Connection,
    fields: &WorkOrderFields,
    now: DateTime<Utc>,
) -> Result<WorkOrderId, ObrasError> {
    validate_fields(fields)?;
    let id = WorkOrderId::new();
    conn.execute(
        "INSERT INTO work_orders (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        params![id.to_string(), fields.name.trim(), now],
    )?;
    write_fields(conn, &id, fields, now)?;
    Ok(id)
}

/// Writes every column of an existing row. Returns the number of rows changed.
fn write_fields(
    conn: &Connection,
    id: &WorkOrderId,
    fields: &WorkOrderFields,
    updated_at: DateTime<Utc>,
) -> Result<usize, ObrasError> {
    validate_fields(fields)?;
    let refs = resolve_refs(conn, fields)?;
    let changed = conn.execute(
        "UPDATE work_orders SET
           name = :name,
           description = :description,
           environment = :environment,
           stage_id = :stage_id,
           work_type_id = :work_type_id,
           responsible_area_id = :responsible_area_id,
           contract_amount = :contract_amount,
           address = :address,
           latitude = :latitude,
           longitude = :longitude,
           commune_id = :commune_id,
           neighborhood_id = :neighborhood_id,
           planned_start = :planned_start,
           planned_end = :planned_end,
           duration_months = :duration_months,
           progress = :progress,
           workforce_count = :workforce_count,
           contracting_type_id = :contracting_type_id,
           contracting_number = :contracting_number,
           tender_year = :tender_year,
           company_id = :company_id,
           file_number = :file_number,
           funding_source_id = :funding_source_id,
           beneficiaries = :beneficiaries,
           featured = :featured,
           commitment = :commitment,
           ba_elige = :ba_elige,
           image_1 = :image_1,
           image_2 = :image_2,
           image_3 = :image_3,
           image_4 = :image_4,
           internal_link = :internal_link,
           tender_documents_url = :tender_documents_url,
           environmental_study_url = :environmental_study_url,
           updated_at = :updated_at
         WHERE id = :id",
        named_params! {
            ":id": id.to_string(),
            ":name": fields.name.trim(),
            ":description": fields.description,
            ":environment": fields.environment,
            ":stage_id": refs.stage,
            ":work_type_id": refs.work_type,
            ":responsible_area_id": refs.responsible_area,
            ":contract_amount": fields.contract_amount.map(|amount| amount.to_string()),
            ":address": fields.address,
            ":latitude": fields.latitude,
            ":longitude": fields.longitude,
            ":commune_id": refs.commune,
            ":neighborhood_id": refs.neighborhood,
            ":planned_start": fields.planned_start,
            ":planned_end": fields.planned_end,
            ":duration_months": fields.duration_months,
            ":progress": fields.progress.to_string(),
            ":workforce_count": fields.workforce_count,
            ":contracting_type_id": refs.contracting_type,
            ":contracting_number": fields.contracting_number,
            ":tender_year": fields.tender_year,
            ":company_id": refs.company,
            ":file_number": fields.file_number,
            ":funding_source_id": refs.funding_source,
            ":beneficiaries": fields.beneficiaries,
            ":featured": fields.featured,
            ":commitment": fields.commitment,
            ":ba_elige": fields.ba_elige,
            ":image_1": fields.image_1,
            ":image_2": fields.image_2,
            ":image_3": fields.image_3,
            ":image_4": fields.image_4,
            ":internal_link": fields.internal_link,
            ":tender_documents_url": fields.tender_documents_url,
            ":environmental_study_url": fields.environmental_study_url,
            ":updated_at": updated_at,
        },
    )?;
    Ok(changed)
}

fn conversion_error<E>(index: usize, err: E) -> rusqlite::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, err.into())
}

fn decimal_at(row: &Row<'_>, index: usize) -> rusqlite::Result<Option<Decimal>> {
    let raw: Option<String> = row.get(index)?;
    raw.map(|raw| Decimal::from_str(&raw))
        .transpose()
        .map_err(|err| conversion_error(index, err))
}

fn map_work_order(row: &Row<'_>) -> rusqlite::Result<WorkOrder> {
    let id: String = row.get(0)?;
    let id = id
        .parse::<WorkOrderId>()
        .map_err(|err| conversion_error(0, err))?;
    let stage: Option<String> = row.get(4)?;
    let stage = stage
        .map(|label| label.parse::<Stage>())
        .transpose()
        .map_err(|err| conversion_error(4, err))?;
    let progress = decimal_at(row, 16)?.unwrap_or_default();

    Ok(WorkOrder {
        id,
        fields: WorkOrderFields {
            name: row.get(1)?,
            description: row.get(2)?,
            environment: row.get(3)?,
            stage,
            work_type: row.get(5)?,
            responsible_area: row.get(6)?,
            contract_amount: decimal_at(row, 7)?,
            address: row.get(8)?,
            latitude: row.get(9)?,
            longitude: row.get(10)?,
            commune: row.get(11)?,
            neighborhood: row.get(12)?,
            planned_start: row.get(13)?,
            planned_end: row.get(14)?,
            duration_months: row.get(15)?,
            progress,
            workforce_count: row.get(17)?,
            contracting_type: row.get(18)?,
            contracting_number: row.get(19)?,
            tender_year: row.get(20)?,
            company: row.get(21)?,
            company_tax_id: row.get(22)?,
            file_number: row.get(23)?,
            funding_source: row.get(24)?,
            beneficiaries: row.get(25)?,
            featured: row.get(26)?,
            commitment: row.get(27)?,
            ba_elige: row.get(28)?,
            image_1: row.get(29)?,
            image_2: row.get(30)?,
            image_3: row.get(31)?,
            image_4: row.get(32)?,
            internal_link: row.get(33)?,
            tender_documents_url: row.get(34)?,
            environmental_study_url: row.get(35)?,
        },
        created_at: row.get(36)?,
        updated_at: row.get(37)?,
    })
}
