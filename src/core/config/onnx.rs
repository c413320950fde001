//! ONNX Runtime session settings and compute device selection.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How aggressively ONNX Runtime rewrites the model graph at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationLevel {
    Disabled,
    Basic,
    Extended,
    #[default]
    All,
}

/// An ONNX Runtime execution provider, tried in the order they are listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExecutionProvider {
    Cpu,
    Cuda {
        #[serde(default)]
        device_id: Option<i32>,
        /// Arena limit in bytes.
        #[serde(default)]
        memory_limit: Option<usize>,
    },
}

/// Compute device selected on the command line or in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// Run every model on the CPU.
    #[default]
    Cpu,
    /// Run on CUDA, falling back to the CPU provider.
    Cuda,
}

impl FromStr for Device {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" => Ok(Device::Cpu),
            "cuda" | "gpu" => Ok(Device::Cuda),
            other => Err(format!("unknown device '{other}', expected 'cpu' or 'cuda'")),
        }
    }
}

impl Device {
    /// Providers for this device, most preferred first.
    pub fn execution_providers(self) -> Vec<ExecutionProvider> {
        match self {
            Device::Cpu => vec![ExecutionProvider::Cpu],
            Device::Cuda => vec![
                ExecutionProvider::Cuda {
                    device_id: None,
                    memory_limit: None,
                },
                ExecutionProvider::Cpu,
            ],
        }
    }
}

/// Per-session ONNX Runtime settings shared by the detector and recognizers.
///
/// Unset fields fall back to what the engine derives from the [`Device`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrtSessionConfig {
    pub intra_threads: Option<usize>,
    pub inter_threads: Option<usize>,
    pub optimization: OptimizationLevel,
    /// Overrides the providers implied by the device.
    pub providers: Option<Vec<ExecutionProvider>>,
    /// ONNX Runtime's own log verbosity, 0 (verbose) to 4 (fatal).
    pub log_level: Option<u8>,
}

impl OrtSessionConfig {
    /// Session settings for a recognizer on `device`.
    ///
    /// CPU recognizers run many lines side by side on the worker pool, so
    /// each session is pinned to a single intra/inter-op thread.
    pub fn for_recognizer(&self, device: Device) -> Self {
        let mut cfg = self.for_detector(device);
        if device == Device::Cpu {
            cfg.intra_threads.get_or_insert(1);
            cfg.inter_threads.get_or_insert(1);
        }
        cfg
    }

    /// Session settings for the layout detector on `device`.
    pub fn for_detector(&self, device: Device) -> Self {
        let mut cfg = self.clone();
        cfg.providers
            .get_or_insert_with(|| device.execution_providers());
        cfg
    }

    /// The providers to register, CPU when nothing was chosen.
    pub fn providers(&self) -> Vec<ExecutionProvider> {
        self.providers
            .clone()
            .unwrap_or_else(|| vec![ExecutionProvider::Cpu])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_recognizer_is_single_threaded() {
        let config = OrtSessionConfig::default().for_recognizer(Device::Cpu);
        assert_eq!(config.intra_threads, Some(1));
        assert_eq!(config.inter_threads, Some(1));

        let config = OrtSessionConfig {
            intra_threads: Some(3),
            ..Default::default()
        }
        .for_recognizer(Device::Cpu);
        assert_eq!(config.intra_threads, Some(3));
    }

    #[test]
    fn test_cuda_device_keeps_cpu_fallback() {
        let config = OrtSessionConfig::default().for_detector(Device::Cuda);
        let providers = config.providers();
        assert_eq!(providers.len(), 2);
        assert!(matches!(providers[0], ExecutionProvider::Cuda { .. }));
        assert_eq!(providers[1], ExecutionProvider::Cpu);
        assert_eq!(config.intra_threads, None);
    }

    #[test]
    fn test_explicit_providers_win_over_device() {
        let config = OrtSessionConfig {
            providers: Some(vec![ExecutionProvider::Cpu]),
            ..Default::default()
        }
        .for_recognizer(Device::Cuda);
        assert_eq!(config.providers(), vec![ExecutionProvider::Cpu]);
    }

    #[test]
    fn test_session_config_from_yaml() {
        let yaml = "optimization: basic\nproviders:\n  - kind: cuda\n    device_id: 1\n  - kind: cpu\n";
        let config: OrtSessionConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.optimization, OptimizationLevel::Basic);
        assert_eq!(
            config.providers(),
            vec![
                ExecutionProvider::Cuda {
                    device_id: Some(1),
                    memory_limit: None
                },
                ExecutionProvider::Cpu
            ]
        );
    }

    #[test]
    fn test_device_from_str() {
        assert_eq!("CPU".parse::<Device>().unwrap(), Device::Cpu);
        assert_eq!("cuda".parse::<Device>().unwrap(), Device::Cuda);
        assert!("tpu".parse::<Device>().is_err());
    }
}
