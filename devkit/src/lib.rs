/*!
# Symbion DevKit - Stubs et Utilitaires pour tests de sondes

Bibliothèque facilitant le test des sondes Symbion avec:
- Stubs de fournisseurs de métriques (lecture unique, compteurs, pause)
- Parseur de ligne de statut et de données de performance
- Harness d'exécution avec assertions
*/

pub mod provider_stub;
pub mod status_line;
pub mod test_utils;

pub use provider_stub::{RecordingPause, ScriptedCounter, StubProvider};
pub use status_line::{PerfTuple, StatusLine};
pub use test_utils::ProbeHarness;
