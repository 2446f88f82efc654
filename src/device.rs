// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Execution device selection.
use std::fmt;
use std::str::FromStr;

use crate::error::PoseError;

/// Hardware device for running the heatmap network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    /// CPU execution provider (always available).
    #[default]
    Cpu,
    /// CUDA for NVIDIA GPUs; the argument is the device index.
    /// Requires the `cuda` feature.
    Cuda(usize),
    /// Apple `CoreML`. Requires the `coreml` feature.
    CoreMl,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda(i) => write!(f, "cuda:{i}"),
            Self::CoreMl => write!(f, "coreml"),
        }
    }
}

impl FromStr for Device {
    type Err = PoseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_lowercase();
        match s.as_str() {
            "cpu" => Ok(Self::Cpu),
            "coreml" | "mps" => Ok(Self::CoreMl),
            _ => {
                let rest = s
                    .strip_prefix("cuda")
                    .ok_or_else(|| PoseError::ConfigError(format!("Unknown device: {s}")))?;
                if rest.is_empty() {
                    return Ok(Self::Cuda(0));
                }
                parse_device_index(rest)
                    .map(Self::Cuda)
                    .ok_or_else(|| PoseError::ConfigError(format!("Invalid device index: {s}")))
            }
        }
    }
}

/// Helper to parse device index from string (e.g. ":0")
fn parse_device_index(s: &str) -> Option<usize> {
    s.strip_prefix(':')
        .and_then(|index_str| index_str.parse::<usize>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_device() {
        assert_eq!(Device::from_str("cpu").unwrap(), Device::Cpu);
        assert_eq!(Device::from_str("CPU").unwrap(), Device::Cpu);
        assert_eq!(Device::from_str("cuda").unwrap(), Device::Cuda(0));
        assert_eq!(Device::from_str("cuda:1").unwrap(), Device::Cuda(1));
        assert_eq!(Device::from_str("mps").unwrap(), Device::CoreMl);
        assert_eq!(Device::from_str("coreml").unwrap(), Device::CoreMl);
    }

    #[test]
    fn test_parse_device_errors() {
        assert!(matches!(
            Device::from_str("tpu"),
            Err(PoseError::ConfigError(_))
        ));
        assert!(Device::from_str("cuda:x").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for device in [Device::Cpu, Device::Cuda(2), Device::CoreMl] {
            assert_eq!(device.to_string().parse::<Device>().unwrap(), device);
        }
    }
}
