//! Compute device resolution.
//!
//! The device is chosen once per process. GPU backends are only candidates
//! when the crate was built with the matching feature.

use std::fmt;
use std::path::Path;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

static ACTIVE_DEVICE: OnceCell<ComputeDevice> = OnceCell::new();

/// Device requested in the settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePreference {
    Auto,
    Cpu,
    Cuda,
    Metal,
}

/// Device the model runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComputeDevice {
    Cpu,
    Cuda(usize),
    Metal,
}

/// What the host and the build offer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSupport {
    pub cuda: bool,
    pub metal: bool,
}

impl DeviceSupport {
    /// Probes the current build and host.
    pub fn probe() -> Self {
        Self {
            cuda: cfg!(feature = "cuda") && cuda_device_present(),
            metal: cfg!(feature = "metal") && cfg!(target_os = "macos"),
        }
    }
}

fn cuda_device_present() -> bool {
    match std::env::var("CUDA_VISIBLE_DEVICES") {
        Ok(v) if v.trim().is_empty() || v.trim() == "-1" => false,
        _ => Path::new("/dev/nvidiactl").exists() || Path::new("/dev/nvidia0").exists(),
    }
}

impl ComputeDevice {
    /// Picks a device from a preference and what is available.
    ///
    /// `Auto` prefers CUDA, then Metal, then the CPU. An explicit GPU
    /// preference that cannot be honoured falls back to the CPU.
    pub fn select(preference: DevicePreference, support: DeviceSupport) -> Self {
        match preference {
            DevicePreference::Cpu => ComputeDevice::Cpu,
            DevicePreference::Cuda if support.cuda => ComputeDevice::Cuda(0),
            DevicePreference::Metal if support.metal => ComputeDevice::Metal,
            DevicePreference::Cuda | DevicePreference::Metal => {
                warn!("Requested device {:?} is not available, using CPU", preference);
                ComputeDevice::Cpu
            }
            DevicePreference::Auto if support.cuda => ComputeDevice::Cuda(0),
            DevicePreference::Auto if support.metal => ComputeDevice::Metal,
            DevicePreference::Auto => ComputeDevice::Cpu,
        }
    }

    /// Resolves the process-wide device.
    ///
    /// The first call probes the host and fixes the result. Later calls return
    /// the same device whatever preference they pass.
    pub fn resolve(preference: DevicePreference) -> Self {
        *ACTIVE_DEVICE.get_or_init(|| {
            let device = Self::select(preference, DeviceSupport::probe());
            info!("Compute device resolved: {}", device);
            device
        })
    }
}

impl fmt::Display for ComputeDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputeDevice::Cpu => write!(f, "cpu"),
            ComputeDevice::Cuda(ordinal) => write!(f, "cuda:{}", ordinal),
            ComputeDevice::Metal => write!(f, "metal"),
        }
    }
}
