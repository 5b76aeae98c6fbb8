// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Engine configuration.

use std::str::FromStr;

/// Which luminance provider the engine should try to use.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EnergyBackend {
    /// Accelerated if it comes up, direct otherwise.
    Auto,
    /// Always the direct per-pixel formula.
    Direct,
    /// Ask for the accelerated provider.  Still falls back to the
    /// direct formula if it cannot be initialized.
    Accelerated,
}

impl Default for EnergyBackend {
    fn default() -> Self {
        EnergyBackend::Auto
    }
}

impl FromStr for EnergyBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(EnergyBackend::Auto),
            "direct" => Ok(EnergyBackend::Direct),
            "accelerated" => Ok(EnergyBackend::Accelerated),
            other => Err(format!("unknown energy backend '{}'", other)),
        }
    }
}

/// How inserted seams are positioned in the original frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpansionMode {
    /// Seam coordinates recorded against the shrinking working copy are
    /// applied to the original buffer as they are.
    Approximate,
    /// Every working-copy pixel remembers which original coordinate it
    /// came from, and seams are recorded in original coordinates.
    Exact,
}

impl Default for ExpansionMode {
    fn default() -> Self {
        ExpansionMode::Approximate
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarveConfig {
    /// Up to this many consecutive removals share one acquired
    /// luminance map.  1 re-acquires after every removal.
    pub batch: usize,
    pub backend: EnergyBackend,
    /// Threads for the accelerated provider and the worker pool; 0
    /// means one per CPU.
    pub threads: usize,
    /// Weight of a pixel's own luminance in its local cost, on top of
    /// the forward-energy transition term.
    pub importance_weight: i32,
    pub expansion: ExpansionMode,
}

impl Default for CarveConfig {
    fn default() -> Self {
        CarveConfig {
            batch: 1,
            backend: EnergyBackend::Auto,
            threads: 0,
            importance_weight: 1,
            expansion: ExpansionMode::Approximate,
        }
    }
}

impl CarveConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset for constrained-compute targets: halve the number of
    /// luminance acquisitions during reduction.
    pub fn constrained() -> Self {
        Self::default().with_batch(2)
    }

    pub fn with_batch(mut self, batch: usize) -> Self {
        self.batch = batch.max(1);
        self
    }

    pub fn with_backend(mut self, backend: EnergyBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_importance_weight(mut self, weight: i32) -> Self {
        self.importance_weight = weight;
        self
    }

    pub fn with_expansion(mut self, expansion: ExpansionMode) -> Self {
        self.expansion = expansion;
        self
    }

    /// The thread count with 0 resolved against the machine.
    pub fn effective_threads(&self) -> usize {
        if self.threads > 0 {
            return self.threads;
        }
        #[cfg(feature = "threaded")]
        {
            num_cpus::get()
        }
        #[cfg(not(feature = "threaded"))]
        {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_recompute_every_seam() {
        let config = CarveConfig::default();
        assert_eq!(config.batch, 1);
        assert_eq!(config.backend, EnergyBackend::Auto);
        assert_eq!(config.expansion, ExpansionMode::Approximate);
    }

    #[test]
    fn batch_is_at_least_one() {
        assert_eq!(CarveConfig::new().with_batch(0).batch, 1);
        assert_eq!(CarveConfig::constrained().batch, 2);
    }

    #[test]
    fn backend_names_parse() {
        assert_eq!("Direct".parse(), Ok(EnergyBackend::Direct));
        assert_eq!("accelerated".parse(), Ok(EnergyBackend::Accelerated));
        assert!("gpu".parse::<EnergyBackend>().is_err());
    }
}
