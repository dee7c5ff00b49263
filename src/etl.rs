//! CSV ingestion for the urban public works export.
//!
//! The pipeline is `extract` → `clean` → `to_work_orders` → [`load_rows`].
//! Parsing is lenient: a cell that cannot be read becomes a missing value and
//! a warning. Only a row without a name is rejected outright.

use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::ObrasError;
use crate::lifecycle::{Stage, WorkOrderFields};
use crate::store::{LoadReport, RecordStore, SkippedRow};

/// Cell values that mean "no data" in the export.
const PLACEHOLDERS: [&str; 5] = ["-", "nd", "n/a", "sin dato", "s/d"];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Text encodings the export is known to ship in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    /// Also covers windows-1252 exports; each byte maps to the code point of
    /// the same value.
    Latin1,
}

impl FromStr for Encoding {
    type Err = ObrasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" | "windows-1252" | "cp1252" => Ok(Encoding::Latin1),
            other => Err(ObrasError::Config(format!("unsupported encoding: {other}"))),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Utf8 => f.write_str("utf-8"),
            Encoding::Latin1 => f.write_str("latin-1"),
        }
    }
}

/// Where to read the export from and how to parse it.
#[derive(Debug, Clone)]
pub struct CsvSource {
    pub path: PathBuf,
    pub delimiter: u8,
    pub encoding: Encoding,
}

/// A parsed CSV file: header names and one optional cell per column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// A data row that could not be turned into a work order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("row {index}: {reason}")]
pub struct RowError {
    pub index: usize,
    pub reason: String,
}

pub fn extract(path: &Path, delimiter: u8, encoding: Encoding) -> Result<RawTable, ObrasError> {
    let bytes = std::fs::read(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => ObrasError::FileNotFound(path.to_path_buf()),
        _ => ObrasError::Io(err),
    })?;
    let text = decode(path, &bytes, encoding)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(ObrasError::EmptyInput(path.to_path_buf()));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|cell| Some(cell.to_string())).collect());
    }
    if rows.is_empty() {
        return Err(ObrasError::EmptyInput(path.to_path_buf()));
    }

    debug!(path = %path.display(), columns = headers.len(), rows = rows.len(), "csv extracted");
    Ok(RawTable { headers, rows })
}

fn decode(path: &Path, bytes: &[u8], encoding: Encoding) -> Result<String, ObrasError> {
    match encoding {
        Encoding::Utf8 => {
            let text = std::str::from_utf8(bytes).map_err(|err| ObrasError::Encoding {
                path: path.to_path_buf(),
                encoding: encoding.to_string(),
                detail: err.to_string(),
            })?;
            Ok(text.strip_prefix('\u{feff}').unwrap_or(text).to_string())
        }
        Encoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

pub fn normalize_column(name: &str) -> String {
    name.trim().to_lowercase().replace('-', "_")
}

/// Normalizes the headers, blanks out placeholder cells and drops rows with
/// no data left.
pub fn clean(table: RawTable) -> RawTable {
    let headers = table.headers.iter().map(|h| normalize_column(h)).collect();
    let rows = table
        .rows
        .into_iter()
        .map(|row| row.into_iter().map(|cell| cell.filter(|v| !is_placeholder(v))).collect::<Vec<_>>())
        .filter(|row| row.iter().any(Option::is_some))
        .collect();
    RawTable { headers, rows }
}

fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || PLACEHOLDERS.iter().any(|p| value.eq_ignore_ascii_case(p))
}

pub fn to_work_orders(table: &RawTable) -> Vec<Result<WorkOrderFields, RowError>> {
    let columns: HashMap<&str, usize> = table
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.as_str(), i))
        .collect();

    table
        .rows
        .iter()
        .enumerate()
        .map(|(index, cells)| {
            RowReader {
                index,
                columns: &columns,
                cells,
            }
            .work_order()
        })
        .collect()
}

struct RowReader<'a> {
    index: usize,
    columns: &'a HashMap<&'a str, usize>,
    cells: &'a [Option<String>],
}

impl RowReader<'_> {
    fn raw(&self, column: &str) -> Option<&str> {
        let i = *self.columns.get(column)?;
        self.cells.get(i)?.as_deref()
    }

    fn text(&self, column: &str) -> Option<String> {
        self.raw(column).map(str::to_string)
    }

    fn parse<T>(&self, column: &str, parser: impl Fn(&str) -> Option<T>) -> Option<T> {
        let raw = self.raw(column)?;
        let value = parser(raw);
        if value.is_none() {
            warn!(row = self.index, column, value = raw, "unreadable value left empty");
        }
        value
    }

    fn work_order(&self) -> Result<WorkOrderFields, RowError> {
        let name = self.text("nombre").ok_or_else(|| RowError {
            index: self.index,
            reason: "missing name".to_string(),
        })?;

        let stage = self.raw("etapa").and_then(|label| {
            let stage = Stage::from_source_label(label);
            if stage.is_none() {
                warn!(row = self.index, label, "unknown stage label, stage left unset");
            }
            stage
        });

        let progress = self
            .parse("porcentaje_avance", parse_decimal)
            .map(|p| self.clamp_progress(p))
            .unwrap_or(Decimal::ZERO);

        let commune = self.parse("comuna", parse_commune);
        let neighborhood = self.text("barrio").filter(|barrio| {
            if commune.is_none() {
                warn!(row = self.index, neighborhood = %barrio, "neighborhood without commune, dropped");
            }
            commune.is_some()
        });

        Ok(WorkOrderFields {
            name,
            description: self.text("descripcion"),
            environment: self.text("entorno"),
            stage,
            work_type: self.text("tipo"),
            responsible_area: self.text("area_responsable"),
            contract_amount: self.parse("monto_contrato", parse_decimal),
            address: self.text("direccion"),
            latitude: self.parse("lat", parse_coordinate),
            longitude: self.parse("lng", parse_coordinate),
            commune,
            neighborhood,
            planned_start: self.parse("fecha_inicio", parse_date),
            planned_end: self.parse("fecha_fin_inicial", parse_date),
            duration_months: self.parse("plazo_meses", parse_count),
            progress,
            workforce_count: self.parse("mano_obra", parse_count),
            contracting_type: self.text("contratacion_tipo"),
            contracting_number: self.text("nro_contratacion"),
            tender_year: self.parse("licitacion_anio", |raw| {
                parse_whole(raw).and_then(|y| i32::try_from(y).ok())
            }),
            company: self.text("licitacion_oferta_empresa"),
            company_tax_id: self.text("cuit_contratista"),
            file_number: self.text("expediente_numero"),
            funding_source: self.text("financiamiento"),
            beneficiaries: self.text("beneficiarios"),
            featured: self.parse("destacada", parse_bool),
            commitment: self.parse("compromiso", parse_bool),
            ba_elige: self.parse("ba_elige", parse_bool),
            image_1: self.text("imagen_1"),
            image_2: self.text("imagen_2"),
            image_3: self.text("imagen_3"),
            image_4: self.text("imagen_4"),
            internal_link: self.text("link_interno"),
            tender_documents_url: self.text("pliego_descarga"),
            environmental_study_url: self.text("estudio_ambiental_descarga"),
        })
    }

    fn clamp_progress(&self, progress: Decimal) -> Decimal {
        let clamped = progress.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
        if clamped != progress {
            warn!(row = self.index, %progress, %clamped, "progress out of range, clamped");
        }
        clamped
    }
}

/// Accepts `$`, `%`, `1.234,56` and `1,234.56` notations.
fn parse_decimal(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | '%') && !c.is_whitespace())
        .collect();
    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) if cleaned.matches(',').count() > 1 => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        (None, Some(_)) if cleaned.matches('.').count() > 1 => cleaned.replace('.', ""),
        _ => cleaned,
    };
    Decimal::from_str(&normalized).ok()
}

/// Whole numbers, also when written as `12.0`.
fn parse_whole(raw: &str) -> Option<i64> {
    let value = parse_decimal(raw)?;
    if value.fract().is_zero() { value.to_i64() } else { None }
}

fn parse_count(raw: &str) -> Option<u32> {
    parse_whole(raw).and_then(|n| u32::try_from(n).ok())
}

fn parse_commune(raw: &str) -> Option<u32> {
    let lower = raw.trim().to_lowercase();
    let number = lower.strip_prefix("comuna").unwrap_or(&lower).trim();
    parse_count(number).filter(|&n| n > 0)
}

fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    // Some exports append a midnight time.
    let date = raw.split_whitespace().next()?;
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date, format).ok())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "si" | "sí" | "true" | "1" => Some(true),
        "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Persists parsed rows in batches of `batch_size`, one transaction each.
///
/// Rows that failed parsing and rows the store rejects both end up in the
/// report's `skipped` list, indexed by their position in `rows`.
pub fn load_rows<S: RecordStore + ?Sized>(
    store: &mut S,
    rows: Vec<Result<WorkOrderFields, RowError>>,
    batch_size: usize,
) -> Result<LoadReport, ObrasError> {
    let mut report = LoadReport::default();
    let mut batch = Vec::with_capacity(batch_size);
    let mut batch_indices = Vec::with_capacity(batch_size);

    for (index, row) in rows.into_iter().enumerate() {
        match row {
            Ok(fields) => {
                batch.push(fields);
                batch_indices.push(index);
            }
            Err(err) => {
                warn!(row = err.index, reason = %err.reason, "skipping row");
                report.skipped.push(SkippedRow {
                    index: err.index,
                    name: String::new(),
                    reason: err.reason,
                });
            }
        }
        if batch.len() >= batch_size.max(1) {
            flush(store, &mut batch, &mut batch_indices, &mut report)?;
        }
    }
    flush(store, &mut batch, &mut batch_indices, &mut report)?;

    report.skipped.sort_by_key(|row| row.index);
    Ok(report)
}

fn flush<S: RecordStore + ?Sized>(
    store: &mut S,
    batch: &mut Vec<WorkOrderFields>,
    indices: &mut Vec<usize>,
    report: &mut LoadReport,
) -> Result<(), ObrasError> {
    if batch.is_empty() {
        return Ok(());
    }
    let mut outcome = store.bulk_load(batch)?;
    // Map batch-local positions back to the row's position in the file.
    for skipped in &mut outcome.skipped {
        if let Some(&index) = indices.get(skipped.index) {
            skipped.index = index;
        }
    }
    report.merge(outcome);
    batch.clear();
    indices.clear();
    Ok(())
}

/// Runs the whole pipeline for one export file.
pub fn ingest<S: RecordStore + ?Sized>(
    store: &mut S,
    source: &CsvSource,
    batch_size: usize,
) -> Result<LoadReport, ObrasError> {
    info!(path = %source.path.display(), encoding = %source.encoding, "extracting");
    let table = clean(extract(&source.path, source.delimiter, source.encoding)?);
    let rows = to_work_orders(&table);
    info!(rows = rows.len(), "rows parsed");

    let report = load_rows(store, rows, batch_size)?;
    info!(
        loaded = report.loaded,
        skipped = report.skipped.len(),
        "ingestion finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::store::{EntityKind, SqliteStore, WorkOrderFilter};

    const HEADER: &str = "Nombre;Etapa;Tipo;Area-Responsable;Monto_Contrato;Comuna;Barrio;Fecha_Inicio;Plazo_Meses;Porcentaje_Avance;Cuit_Contratista;Licitacion_Oferta_Empresa;Destacada";

    fn csv_file(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    fn parse(lines: &[&str]) -> Vec<Result<WorkOrderFields, RowError>> {
        let body = format!("{HEADER}\n{}\n", lines.join("\n"));
        let file = csv_file(body.as_bytes());
        let table = extract(file.path(), b';', Encoding::Utf8).unwrap();
        to_work_orders(&clean(table))
    }

    #[test]
    fn encoding_names() {
        assert_eq!("UTF-8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("iso-8859-1".parse::<Encoding>().unwrap(), Encoding::Latin1);
        assert_eq!("windows-1252".parse::<Encoding>().unwrap(), Encoding::Latin1);
        assert!(matches!(
            "ebcdic".parse::<Encoding>(),
            Err(ObrasError::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = extract(Path::new("/no/such/obras.csv"), b';', Encoding::Utf8).unwrap_err();
        assert!(matches!(err, ObrasError::FileNotFound(_)));
    }

    #[test]
    fn invalid_utf8_is_an_encoding_error() {
        let file = csv_file(b"nombre;barrio\nPlaza;N\xfa\xf1ez\n");
        let err = extract(file.path(), b';', Encoding::Utf8).unwrap_err();
        assert!(matches!(err, ObrasError::Encoding { .. }));
    }

    #[test]
    fn latin1_decodes_every_byte() {
        let file = csv_file(b"nombre;barrio\nPlaza;N\xfa\xf1ez\n");
        let table = extract(file.path(), b';', Encoding::Latin1).unwrap();
        assert_eq!(table.rows[0][1].as_deref(), Some("Núñez"));
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let empty = csv_file(b"");
        assert!(matches!(
            extract(empty.path(), b';', Encoding::Utf8),
            Err(ObrasError::EmptyInput(_))
        ));

        let header_only = csv_file(b"nombre;etapa\n");
        assert!(matches!(
            extract(header_only.path(), b';', Encoding::Utf8),
            Err(ObrasError::EmptyInput(_))
        ));
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let file = csv_file("\u{feff}nombre;etapa\nPlaza;Finalizada\n".as_bytes());
        let table = extract(file.path(), b';', Encoding::Utf8).unwrap();
        assert_eq!(table.headers[0], "nombre");
    }

    #[test]
    fn column_names_are_normalized() {
        assert_eq!(normalize_column("  Area-Responsable "), "area_responsable");
        assert_eq!(normalize_column("LAT"), "lat");
    }

    #[test]
    fn clean_blanks_placeholders_and_drops_empty_rows() {
        let table = RawTable {
            headers: vec!["Nombre".into(), "Barrio".into()],
            rows: vec![
                vec![Some("Plaza".into()), Some("s/d".into())],
                vec![Some("-".into()), Some("ND".into())],
                vec![Some("Escuela".into()), Some("Sin Dato".into())],
                vec![Some("".into()), Some("n/a".into())],
                vec![Some("Hospital".into()), Some("Palermo".into())],
            ],
        };
        let cleaned = clean(table);
        assert_eq!(cleaned.headers, vec!["nombre", "barrio"]);
        assert_eq!(cleaned.rows.len(), 3);
        assert_eq!(cleaned.rows[0], vec![Some("Plaza".to_string()), None]);
        assert_eq!(cleaned.rows[2][1].as_deref(), Some("Palermo"));
    }

    #[test]
    fn rows_map_to_fields() {
        let rows = parse(&[
            "Escuela 12;En ejecución;Escuelas;Ministerio de Educación;$ 1.234.567,89;Comuna 3;Balvanera;15/03/2021;12.0;45,5;30-1-1;ACME;SI",
        ]);
        let fields = rows[0].as_ref().unwrap();
        assert_eq!(fields.name, "Escuela 12");
        assert_eq!(fields.stage, Some(Stage::InProgress));
        assert_eq!(fields.work_type.as_deref(), Some("Escuelas"));
        assert_eq!(fields.responsible_area.as_deref(), Some("Ministerio de Educación"));
        assert_eq!(fields.contract_amount, Some(Decimal::new(123456789, 2)));
        assert_eq!(fields.commune, Some(3));
        assert_eq!(fields.neighborhood.as_deref(), Some("Balvanera"));
        assert_eq!(fields.planned_start, NaiveDate::from_ymd_opt(2021, 3, 15));
        assert_eq!(fields.duration_months, Some(12));
        assert_eq!(fields.progress, Decimal::new(455, 1));
        assert_eq!(fields.company_tax_id.as_deref(), Some("30-1-1"));
        assert_eq!(fields.company.as_deref(), Some("ACME"));
        assert_eq!(fields.featured, Some(true));
    }

    #[test]
    fn unreadable_values_become_missing() {
        let rows = parse(&[
            "Plaza;Suspendida;Espacio Público;;mucho;Centro;;ayer;doce;150;;;quizás",
        ]);
        let fields = rows[0].as_ref().unwrap();
        assert_eq!(fields.stage, None);
        assert_eq!(fields.contract_amount, None);
        assert_eq!(fields.commune, None);
        assert_eq!(fields.planned_start, None);
        assert_eq!(fields.duration_months, None);
        assert_eq!(fields.progress, Decimal::ONE_HUNDRED);
        assert_eq!(fields.featured, None);
    }

    #[test]
    fn missing_name_is_a_row_error() {
        let rows = parse(&["Plaza;Finalizada", "-;Finalizada"]);
        assert!(rows[0].is_ok());
        assert_eq!(
            rows[1],
            Err(RowError {
                index: 1,
                reason: "missing name".into()
            })
        );
    }

    #[test]
    fn lenient_parsers() {
        assert_eq!(parse_decimal("1234.56"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_decimal("1,234.56"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_decimal("1.234,56"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_decimal("$1.000.000"), Some(Decimal::from(1_000_000)));
        assert_eq!(parse_decimal("abc"), None);

        assert_eq!(parse_commune("3"), Some(3));
        assert_eq!(parse_commune("3.0"), Some(3));
        assert_eq!(parse_commune("COMUNA 14"), Some(14));
        assert_eq!(parse_commune("3.5"), None);
        assert_eq!(parse_commune("0"), None);

        assert_eq!(parse_date("2025-01-01"), NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(parse_date("01-06-2025"), NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(parse_date("2025-01-01 00:00:00"), NaiveDate::from_ymd_opt(2025, 1, 1));

        assert_eq!(parse_bool("Sí"), Some(true));
        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_coordinate("-34,6037"), Some(-34.6037));
    }

    #[test]
    fn load_rows_batches_and_reindexes_skips() {
        let mut store = SqliteStore::in_memory().unwrap();
        let rows = parse(&[
            "Obra A;Finalizada;Vial;;100;1;;;;;30-1;Alfa;",
            "Obra B;Finalizada;Vial;;200;1;;;;;30-2;Beta;",
            "-;Finalizada",
            "Obra D;Finalizada;Vial;;300;1;;;;;30-1;Gamma;",
            "Obra E;Adjudicada;Escuelas;;400;2;;;;;30-3;Delta;",
        ]);

        let report = load_rows(&mut store, rows, 2).unwrap();
        assert_eq!(report.loaded, 3);
        let skipped: Vec<usize> = report.skipped.iter().map(|row| row.index).collect();
        assert_eq!(skipped, vec![2, 3]);
        assert_eq!(report.skipped[1].name, "Obra D");

        assert_eq!(store.count_where(&WorkOrderFilter::default()).unwrap(), 3);
        assert_eq!(
            store.sum_amount_where(&WorkOrderFilter::default()).unwrap(),
            Decimal::from(700)
        );
        assert_eq!(store.names(EntityKind::Commune).unwrap(), vec!["1", "2"]);
    }

    #[test]
    fn neighborhood_without_commune_is_dropped_on_load() {
        let mut store = SqliteStore::in_memory().unwrap();
        let rows = parse(&[
            "Plaza;Finalizada;;;;1;Retiro",
            "Escuela;Finalizada;;;;;Boedo",
        ]);
        assert_eq!(rows[1].as_ref().unwrap().neighborhood, None);

        let report = load_rows(&mut store, rows, 500).unwrap();
        assert_eq!(report.loaded, 2);
        assert!(report.skipped.is_empty());
        assert_eq!(
            store.neighborhoods_by_commune(&[1]).unwrap(),
            vec![(1, vec!["Retiro".to_string()])]
        );
    }

    #[test]
    fn optional_columns_are_mapped() {
        let body = "nombre;compromiso;ba_elige;imagen_1;imagen_4;link_interno;pliego_descarga;estudio_ambiental_descarga\n\
                    Plaza;SI;no;https://img/1.jpg;https://img/4.jpg;https://obras/plaza;https://pliegos/p.pdf;https://estudios/e.pdf\n";
        let file = csv_file(body.as_bytes());
        let table = clean(extract(file.path(), b';', Encoding::Utf8).unwrap());
        let rows = to_work_orders(&table);
        let fields = rows[0].as_ref().unwrap();

        assert_eq!(fields.commitment, Some(true));
        assert_eq!(fields.ba_elige, Some(false));
        assert_eq!(fields.image_1.as_deref(), Some("https://img/1.jpg"));
        assert_eq!(fields.image_2, None);
        assert_eq!(fields.image_4.as_deref(), Some("https://img/4.jpg"));
        assert_eq!(fields.internal_link.as_deref(), Some("https://obras/plaza"));
        assert_eq!(fields.tender_documents_url.as_deref(), Some("https://pliegos/p.pdf"));
        assert_eq!(
            fields.environmental_study_url.as_deref(),
            Some("https://estudios/e.pdf")
        );
    }

    #[test]
    fn ingest_reads_a_file_end_to_end() {
        let mut store = SqliteStore::in_memory().unwrap();
        let body = "nombre,etapa,comuna\nPlaza,Finalizada,4\n,,\nHospital,En obra,7\n";
        let file = csv_file(body.as_bytes());
        let source = CsvSource {
            path: file.path().to_path_buf(),
            delimiter: b',',
            encoding: Encoding::Utf8,
        };

        let report = ingest(&mut store, &source, 500).unwrap();
        assert_eq!(report.loaded, 2);
        assert!(report.skipped.is_empty());
        assert_eq!(
            store
                .count_where(&WorkOrderFilter::in_stage(Stage::Finished))
                .unwrap(),
            1
        );
    }
}
