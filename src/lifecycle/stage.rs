use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The six stages of a public works project.
///
/// Each work order flows through: NEW → CONTRACTING → AWARDED → IN_PROGRESS
/// and ends in either FINISHED or RESCINDED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    New,
    Contracting,
    Awarded,
    InProgress,
    Finished,
    Rescinded,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::New,
        Stage::Contracting,
        Stage::Awarded,
        Stage::InProgress,
        Stage::Finished,
        Stage::Rescinded,
    ];

    /// No transition leaves a terminal stage.
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Finished | Stage::Rescinded)
    }

    /// Maps the free-text stage labels used by the city's open data export.
    ///
    /// Matching ignores case, surrounding whitespace and Spanish accents.
    /// Returns `None` for labels with no lifecycle counterpart.
    pub fn from_source_label(label: &str) -> Option<Stage> {
        let folded = fold_accents(label.trim()).to_lowercase();
        let stage = match folded.as_str() {
            "proyecto" | "en proyecto" | "nuevo" | "nueva" => Stage::New,
            "en licitacion" | "licitacion" | "en contratacion" | "contratacion" => {
                Stage::Contracting
            }
            "adjudicada" | "adjudicado" => Stage::Awarded,
            "en ejecucion" | "en obra" | "iniciada" | "en curso" => Stage::InProgress,
            "finalizada" | "finalizado" | "terminada" => Stage::Finished,
            "rescindida" | "rescindido" => Stage::Rescinded,
            _ => return None,
        };
        Some(stage)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::New => write!(f, "NEW"),
            Stage::Contracting => write!(f, "CONTRACTING"),
            Stage::Awarded => write!(f, "AWARDED"),
            Stage::InProgress => write!(f, "IN_PROGRESS"),
            Stage::Finished => write!(f, "FINISHED"),
            Stage::Rescinded => write!(f, "RESCINDED"),
        }
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.to_string() == s)
            .ok_or_else(|| format!("unknown stage label: {s}"))
    }
}

fn fold_accents(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' => 'a',
            'é' | 'è' | 'ë' => 'e',
            'í' | 'ì' | 'ï' => 'i',
            'ó' | 'ò' | 'ö' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            'Á' | 'À' | 'Ä' => 'A',
            'É' | 'È' | 'Ë' => 'E',
            'Í' | 'Ì' | 'Ï' => 'I',
            'Ó' | 'Ò' | 'Ö' => 'O',
            'Ú' | 'Ù' | 'Ü' => 'U',
            other => other,
        })
        .collect()
}
