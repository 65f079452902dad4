//! Processor utilisation probe, aggregate or per core
//!
//! Utilisation is a rate, so the probe takes two counter samples one
//! interval apart through the sampler.

use std::time::Duration;

use crate::classify::classify;
use crate::error::ProbeError;
use crate::probes::Probe;
use crate::providers::{CpuInstance, RawCounter};
use crate::report::{PerfDatum, Report};
use crate::sampler::{sample_rate, Pause};
use crate::threshold::{Bounds, Polarity, ThresholdPair};

pub struct CpuProbe<C, W> {
    instance: CpuInstance,
    counter: C,
    pause: W,
    interval: Duration,
    thresholds: ThresholdPair,
}

impl<C, W> CpuProbe<C, W>
where
    C: RawCounter + Sync,
    W: Pause + Sync,
{
    pub fn subject_for(instance: &str) -> String {
        format!("[{}]", instance.trim())
    }

    /// Aggregate processor probe
    pub fn total(
        raw_warning: &str,
        raw_critical: &str,
        connect: impl FnOnce(CpuInstance) -> C,
        pause: W,
        interval: Duration,
    ) -> Result<Self, ProbeError> {
        Self::build(CpuInstance::Total, raw_warning, raw_critical, connect, pause, interval)
    }

    /// Single core probe; the instance must be a core index or `_Total`
    pub fn core(
        raw_instance: &str,
        raw_warning: &str,
        raw_critical: &str,
        connect: impl FnOnce(CpuInstance) -> C,
        pause: W,
        interval: Duration,
    ) -> Result<Self, ProbeError> {
        let instance = CpuInstance::parse(raw_instance)?;
        Self::build(instance, raw_warning, raw_critical, connect, pause, interval)
    }

    fn build(
        instance: CpuInstance,
        raw_warning: &str,
        raw_critical: &str,
        connect: impl FnOnce(CpuInstance) -> C,
        pause: W,
        interval: Duration,
    ) -> Result<Self, ProbeError> {
        let thresholds =
            ThresholdPair::parse(raw_warning, raw_critical, Polarity::AscendingBad, Bounds::PERCENT)?;
        Ok(Self {
            instance,
            counter: connect(instance),
            pause,
            interval,
            thresholds,
        })
    }
}

impl<C, W> Probe for CpuProbe<C, W>
where
    C: RawCounter + Sync,
    W: Pause + Sync,
{
    fn subject(&self) -> String {
        Self::subject_for(&self.instance.to_string())
    }

    async fn evaluate(&self) -> Result<Report, ProbeError> {
        let reading = sample_rate(&self.counter, &self.pause, self.interval).await?;
        let verdict = classify(&reading, &self.thresholds);

        let summary = match self.instance {
            CpuInstance::Total => format!("% CPU Usage = {:.2}%", reading.value),
            CpuInstance::Core(_) => format!("% Processor Time = {:.2}%", reading.value),
        };

        let subject = self.subject();
        let perf = PerfDatum::from_reading(subject.clone(), &reading, &self.thresholds);
        Ok(Report::new(subject, verdict, summary).with_perf(perf))
    }
}
