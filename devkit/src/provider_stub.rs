/*!
Stubs de fournisseurs de métriques pour tests sans système réel

Permet de tester les sondes sans toucher aux disques, services ou compteurs
de l'hôte. Chaque stub enregistre ses appels pour vérifier, par exemple,
qu'une validation ratée n'a jamais interrogé le fournisseur.
*/

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use symbion_probes::error::ProbeError;
use symbion_probes::metric::Sample;
use symbion_probes::providers::{MetricProvider, RawCounter};
use symbion_probes::sampler::Pause;

/// Fournisseur `ReadOnce` qui renvoie toujours la même réponse
#[derive(Debug, Clone)]
pub struct StubProvider<T> {
    response: Result<T, ProbeError>,
    calls: Arc<Mutex<usize>>,
}

impl<T> StubProvider<T>
where
    T: Clone + Send + Sync,
{
    pub fn new(value: T) -> Self {
        Self::responding(Ok(value))
    }

    /// Ressource absente ou hors ligne (disque non prêt, service inconnu...)
    pub fn offline(resource: &str, reason: &str) -> Self {
        Self::responding(Err(ProbeError::unavailable(resource, reason)))
    }

    pub fn responding(response: Result<T, ProbeError>) -> Self {
        Self {
            response,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Nombre de lectures effectuées (partagé entre les clones)
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl<T> MetricProvider for StubProvider<T>
where
    T: Clone + Send + Sync,
{
    type Output = T;

    async fn read_once(&self) -> Result<T, ProbeError> {
        *self.calls.lock().unwrap() += 1;
        log::debug!("🧪 [STUB] read_once #{}", self.calls());
        self.response.clone()
    }
}

/// Compteur brut qui rejoue une suite d'échantillons
#[derive(Debug, Clone)]
pub struct ScriptedCounter {
    samples: Arc<Mutex<VecDeque<Result<Sample, ProbeError>>>>,
    reads: Arc<Mutex<usize>>,
}

impl ScriptedCounter {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self::scripted(samples.into_iter().map(Ok).collect())
    }

    pub fn scripted(script: Vec<Result<Sample, ProbeError>>) -> Self {
        Self {
            samples: Arc::new(Mutex::new(script.into())),
            reads: Arc::new(Mutex::new(0)),
        }
    }

    pub fn reads(&self) -> usize {
        *self.reads.lock().unwrap()
    }

    /// Échantillons pas encore consommés
    pub fn remaining(&self) -> usize {
        self.samples.lock().unwrap().len()
    }
}

impl RawCounter for ScriptedCounter {
    async fn read_raw(&self) -> Result<Sample, ProbeError> {
        *self.reads.lock().unwrap() += 1;
        let next = self.samples.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(ProbeError::SamplingError("counter script exhausted".into())))
    }
}

/// Pause instantanée qui garde la trace des intervalles demandés
#[derive(Debug, Clone, Default)]
pub struct RecordingPause {
    intervals: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingPause {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intervals(&self) -> Vec<Duration> {
        self.intervals.lock().unwrap().clone()
    }
}

impl Pause for RecordingPause {
    async fn pause(&self, interval: Duration) {
        self.intervals.lock().unwrap().push(interval);
        log::debug!("⏸️ [STUB] pause {:?}", interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_counts_calls_across_clones() {
        let stub = StubProvider::new(42_u32);
        let handle = stub.clone();

        assert_eq!(stub.read_once().await.unwrap(), 42);
        assert_eq!(stub.read_once().await.unwrap(), 42);
        assert_eq!(handle.calls(), 2);
    }

    #[tokio::test]
    async fn test_offline_stub() {
        let stub: StubProvider<u32> = StubProvider::offline("The E drive", "not ready");
        let err = stub.read_once().await.unwrap_err();
        assert_eq!(err.to_string(), "The E drive is unavailable: not ready");
    }

    #[tokio::test]
    async fn test_scripted_counter_exhausts() {
        let counter = ScriptedCounter::new(vec![Sample::new(1, 10)]);
        assert_eq!(counter.read_raw().await.unwrap(), Sample::new(1, 10));
        assert!(matches!(
            counter.read_raw().await,
            Err(ProbeError::SamplingError(_))
        ));
        assert_eq!(counter.reads(), 2);
        assert_eq!(counter.remaining(), 0);
    }

    #[tokio::test]
    async fn test_recording_pause() {
        let pause = RecordingPause::new();
        pause.pause(Duration::from_millis(1000)).await;
        assert_eq!(pause.intervals(), vec![Duration::from_millis(1000)]);
    }
}
