/*!
Test Harness pour sondes Symbion

Facilite l'écriture de tests de sondes avec:
- Exécution d'une sonde et capture de sa ligne de statut
- Assertions sur le statut, le code de sortie et les données de perf
- Historique des exécutions pour vérifier l'idempotence
*/

use crate::status_line::StatusLine;
use anyhow::{bail, Result};
use serde_json::Value;
use std::collections::HashMap;
use symbion_probes::classify::Status;
use symbion_probes::error::ProbeError;
use symbion_probes::probes::{self, Probe};
use symbion_probes::report::Report;

/// Harness de test pour sondes
pub struct ProbeHarness {
    runs: Vec<Run>,
}

#[derive(Debug, Clone)]
pub struct Run {
    pub report: Report,
    pub line: StatusLine,
}

impl ProbeHarness {
    pub fn new() -> Self {
        env_logger::try_init().ok(); // Init logging pour tests

        Self { runs: Vec::new() }
    }

    /// Exécute une sonde construite et enregistre le résultat
    pub async fn run<P: Probe>(&mut self, probe: &P) -> Result<&Run> {
        let report = probes::run(probe).await;
        self.record(report)
    }

    /// Exécute une sonde dont la construction a pu échouer
    pub async fn run_validated<P: Probe>(
        &mut self,
        subject: &str,
        built: std::result::Result<P, ProbeError>,
    ) -> Result<&Run> {
        let report = probes::run_validated(subject, built).await;
        self.record(report)
    }

    fn record(&mut self, report: Report) -> Result<&Run> {
        let rendered = report.render();
        let line = StatusLine::parse(&rendered)?;
        log::info!("🔎 {} -> exit {}", rendered, report.exit_code());

        self.runs.push(Run { report, line });
        self.last()
    }

    pub fn last(&self) -> Result<&Run> {
        match self.runs.last() {
            Some(run) => Ok(run),
            None => bail!("No probe has run yet"),
        }
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Assert sur le statut et le code de sortie de la dernière exécution
    pub fn assert_status(&self, expected: Status) -> Result<()> {
        let run = self.last()?;
        if run.line.status != expected {
            bail!("Expected {} but got line: {}", expected, run.report.render());
        }
        if run.report.exit_code() != expected.exit_code() {
            bail!(
                "Exit code {} does not match {}",
                run.report.exit_code(),
                expected
            );
        }
        log::info!("✅ Status {} as expected", expected);
        Ok(())
    }

    /// Assert sur la ligne complète
    pub fn assert_line(&self, expected: &str) -> Result<()> {
        let actual = self.last()?.report.render();
        if actual != expected {
            bail!("Line mismatch:\n  expected: {}\n  actual:   {}", expected, actual);
        }
        Ok(())
    }

    /// Assert qu'un tuple de perf existe avec la valeur donnée (deux décimales)
    pub fn assert_perf(&self, label: &str, value: f64) -> Result<()> {
        let run = self.last()?;
        match run.line.perf_by_label(label) {
            Some(tuple) if (tuple.value - value).abs() < 0.005 => Ok(()),
            Some(tuple) => bail!("Perf '{}' = {}, expected {}", label, tuple.value, value),
            None => bail!("Perf '{}' missing from: {}", label, run.report.render()),
        }
    }

    /// Les lignes d'erreur ne portent aucune donnée de perf
    pub fn assert_no_perf(&self) -> Result<()> {
        let run = self.last()?;
        if !run.line.perf.is_empty() {
            bail!("Unexpected perf data in: {}", run.report.render());
        }
        Ok(())
    }

    /// Assert qu'un champ a une valeur spécifique (`perf.0.max`, `status`...)
    pub fn assert_field_equals(&self, field_path: &str, expected: &Value) -> Result<()> {
        let json = self.last()?.line.to_json()?;
        match get_nested_field(&json, field_path) {
            Some(actual) if actual == expected => Ok(()),
            Some(actual) => bail!(
                "Field '{}' mismatch: expected {:?}, got {:?}",
                field_path,
                expected,
                actual
            ),
            None => bail!("Field '{}' not found", field_path),
        }
    }

    /// Toutes les exécutions ont produit la même ligne
    pub fn assert_idempotent(&self) -> Result<()> {
        let mut lines = self.runs.iter().map(|run| run.report.render());
        if let Some(first) = lines.next() {
            if let Some(other) = lines.find(|line| *line != first) {
                bail!("Runs differ:\n  {}\n  {}", first, other);
            }
        }
        Ok(())
    }

    /// Stats sur les exécutions collectées
    pub fn get_stats(&self) -> TestStats {
        let mut status_counts = HashMap::new();
        for run in &self.runs {
            *status_counts.entry(run.line.status).or_insert(0) += 1;
        }

        TestStats {
            total_runs: self.runs.len(),
            status_counts,
        }
    }

    pub fn reset(&mut self) {
        self.runs.clear();
        log::info!("🧹 Probe harness reset");
    }
}

impl Default for ProbeHarness {
    fn default() -> Self {
        Self::new()
    }
}

fn get_nested_field<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;

    for part in path.split('.') {
        current = match current {
            Value::Object(obj) => obj.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

#[derive(Debug)]
pub struct TestStats {
    pub total_runs: usize,
    pub status_counts: HashMap<Status, usize>,
}

impl TestStats {
    pub fn print(&self) {
        println!("📊 Probe runs: {}", self.total_runs);
        for (status, count) in &self.status_counts {
            println!("    {}: {}", status, count);
        }
    }
}

/// Macro pour écrire un scénario de sonde avec un harness prêt
#[macro_export]
macro_rules! probe_test {
    ($name:ident, |$harness:ident| $body:block) => {
        #[tokio::test]
        async fn $name() {
            async fn scenario(
                $harness: &mut $crate::test_utils::ProbeHarness,
            ) -> anyhow::Result<()> $body

            let mut harness = $crate::test_utils::ProbeHarness::new();
            match scenario(&mut harness).await {
                Ok(()) => {
                    harness.get_stats().print();
                    println!("✅ Scenario '{}' passed", stringify!($name));
                }
                Err(e) => {
                    eprintln!("❌ Scenario '{}' failed: {:#}", stringify!($name), e);
                    panic!("Scenario failed: {:#}", e);
                }
            }
        }
    };
}
