/*!
Parseur de ligne de statut pour assertions de tests

Décompose `<sujet>: <STATUT>! <résumé> | 'label'=v<unité>;w;c;min;max;`
en structure, pour vérifier une sonde champ par champ plutôt que par
comparaison de chaîne complète.
*/

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value;
use symbion_probes::classify::Status;

/// Un tuple de performance décodé
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerfTuple {
    pub label: String,
    pub value: f64,
    pub unit: String,
    pub warn: Option<f64>,
    pub crit: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Ligne de statut décodée
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusLine {
    pub subject: String,
    pub status: Status,
    pub summary: String,
    pub perf: Vec<PerfTuple>,
}

impl StatusLine {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end();
        let (head, perf) = match line.split_once(" | ") {
            Some((head, perf)) => (head, Some(perf)),
            None => (line, None),
        };

        let (subject, rest) = head
            .split_once(": ")
            .with_context(|| format!("No subject separator in '{}'", line))?;
        let (keyword, summary) = rest
            .split_once("! ")
            .with_context(|| format!("No status keyword in '{}'", line))?;

        let status = match keyword {
            "OK" => Status::Ok,
            "WARNING" => Status::Warning,
            "CRITICAL" => Status::Critical,
            "UNKNOWN" => Status::Unknown,
            other => bail!("Unknown status keyword '{}'", other),
        };

        let perf = match perf {
            Some(perf) => parse_perf(perf)?,
            None => Vec::new(),
        };

        Ok(Self {
            subject: subject.to_string(),
            status,
            summary: summary.to_string(),
            perf,
        })
    }

    pub fn perf_by_label(&self, label: &str) -> Option<&PerfTuple> {
        self.perf.iter().find(|tuple| tuple.label == label)
    }

    /// Vue JSON, pour les assertions par chemin (`perf.0.value`)
    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

fn parse_perf(perf: &str) -> Result<Vec<PerfTuple>> {
    let mut tuples = Vec::new();
    let mut rest = perf.trim();

    // Labels are quoted and may contain spaces, so split on quotes first
    while !rest.is_empty() {
        let body = rest
            .strip_prefix('\'')
            .with_context(|| format!("Perf tuple must start with a quote: '{}'", rest))?;
        let (label, after) = body
            .split_once("'=")
            .with_context(|| format!("Unterminated perf label in '{}'", rest))?;
        let (fields, next) = match after.split_once(' ') {
            Some((fields, next)) => (fields, next.trim_start()),
            None => (after, ""),
        };
        tuples.push(parse_tuple(label, fields)?);
        rest = next;
    }

    Ok(tuples)
}

fn parse_tuple(label: &str, fields: &str) -> Result<PerfTuple> {
    let parts: Vec<&str> = fields.split(';').collect();
    if parts.len() != 6 || !parts[5].is_empty() {
        bail!("Perf tuple '{}' needs 5 ';'-terminated fields, got '{}'", label, fields);
    }

    let value_field = parts[0];
    let split = value_field
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
        .unwrap_or(value_field.len());
    let (number, unit) = value_field.split_at(split);

    Ok(PerfTuple {
        label: label.to_string(),
        value: number
            .parse()
            .with_context(|| format!("Bad perf value '{}' for '{}'", value_field, label))?,
        unit: unit.to_string(),
        warn: optional(parts[1])?,
        crit: optional(parts[2])?,
        min: optional(parts[3])?,
        max: optional(parts[4])?,
    })
}

fn optional(field: &str) -> Result<Option<f64>> {
    if field.is_empty() {
        return Ok(None);
    }
    Ok(Some(field.parse().with_context(|| format!("Bad perf field '{}'", field))?))
}
