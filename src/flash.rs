// SPDX-License-Identifier: GPL-3.0-only

//! Hardware torch control via Linux sysfs
//!
//! Discovers and controls flash LEDs exposed at `/sys/class/leds/*:flash`.
//! Uses torch mode (brightness file) which is group-writable by `feedbackd`,
//! avoiding the root-only `flash_strobe`/`flash_brightness` interface.

use crate::backends::camera::TorchHardware;
use crate::constants::torch::{FLASH_SUFFIX, LEDS_DIR};
use crate::errors::TorchError;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// A flash LED device discovered via sysfs
#[derive(Debug, Clone)]
pub struct FlashDevice {
    /// Sysfs path, e.g. `/sys/class/leds/white:flash`
    path: PathBuf,
    /// Maximum brightness value (from `max_brightness` file)
    max_brightness: u32,
    /// Human-readable name (directory basename)
    name: String,
}

impl FlashDevice {
    /// Get the device name (e.g. "white:flash")
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set raw brightness value (0 = off, max_brightness = full)
    pub fn set_brightness(&self, value: u32) -> Result<(), TorchError> {
        let clamped = value.min(self.max_brightness);
        std::fs::write(self.path.join("brightness"), clamped.to_string())?;
        Ok(())
    }

    /// Read the current raw brightness
    pub fn brightness(&self) -> Result<u32, TorchError> {
        let value = std::fs::read_to_string(self.path.join("brightness"))?;
        value
            .trim()
            .parse()
            .map_err(|_| TorchError(format!("invalid brightness {:?}", value.trim())))
    }

    /// Turn off the LED
    pub fn off(&self) -> Result<(), TorchError> {
        self.set_brightness(0)
    }

    /// Turn on at full brightness
    pub fn on(&self) -> Result<(), TorchError> {
        self.set_brightness(self.max_brightness)
    }
}

/// Result of hardware flash detection.
///
/// Separates "hardware exists" from "we can control it" so the caller can
/// show a helpful permission error instead of silently having no torch.
pub struct FlashHardware {
    /// Devices we can actually control (writable)
    pub devices: Vec<FlashDevice>,
    /// User-facing error if hardware was found but not writable
    pub permission_error: Option<String>,
}

impl FlashHardware {
    /// Scan `/sys/class/leds/` for `*:flash` entries.
    pub fn detect() -> FlashHardware {
        Self::detect_in(Path::new(LEDS_DIR))
    }

    /// Scan `leds_dir` for `*:flash` entries.
    ///
    /// If LEDs exist but the brightness file is not writable, builds a
    /// user-friendly error message with the privilege escalation command
    /// and group name.
    pub fn detect_in(leds_dir: &Path) -> FlashHardware {
        let Ok(entries) = std::fs::read_dir(leds_dir) else {
            warn!(path = %leds_dir.display(), "Cannot read LED directory, torch discovery skipped");
            return FlashHardware {
                devices: Vec::new(),
                permission_error: None,
            };
        };

        let mut devices = Vec::new();
        let mut permission_failures: Vec<PathBuf> = Vec::new();

        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name_str) = name.to_str() else {
                continue;
            };

            // Match entries like "white:flash", "yellow:flash"
            if !name_str.ends_with(FLASH_SUFFIX) {
                continue;
            }

            let led_path = entry.path();
            let brightness_path = led_path.join("brightness");
            let max_brightness_path = led_path.join("max_brightness");

            let max_brightness = match std::fs::read_to_string(&max_brightness_path) {
                Ok(s) => match s.trim().parse::<u32>() {
                    Ok(v) if v > 0 => v,
                    _ => {
                        warn!(
                            path = %max_brightness_path.display(),
                            "Invalid max_brightness value"
                        );
                        continue;
                    }
                },
                Err(e) => {
                    warn!(
                        path = %max_brightness_path.display(),
                        error = %e,
                        "Cannot read max_brightness"
                    );
                    continue;
                }
            };

            match std::fs::OpenOptions::new()
                .write(true)
                .open(&brightness_path)
            {
                Ok(_) => {
                    info!(name = name_str, max_brightness, "Discovered flash LED");
                    devices.push(FlashDevice {
                        path: led_path,
                        max_brightness,
                        name: name_str.to_string(),
                    });
                }
                Err(_) => {
                    warn!(
                        path = %brightness_path.display(),
                        "Flash LED found but not writable"
                    );
                    permission_failures.push(brightness_path);
                }
            }
        }

        // Sort by name for deterministic ordering (white before yellow)
        devices.sort_by(|a, b| a.name.cmp(&b.name));

        let permission_error = if !permission_failures.is_empty() && devices.is_empty() {
            Some(build_permission_error(&permission_failures))
        } else {
            None
        };

        FlashHardware {
            devices,
            permission_error,
        }
    }

    /// Whether any controllable flash devices were found
    pub fn has_devices(&self) -> bool {
        !self.devices.is_empty()
    }
}

/// Build a user-friendly permission error message.
///
/// Detects the current username, the required group from file ownership,
/// and whether `doas` or `sudo` is available.
fn build_permission_error(failures: &[PathBuf]) -> String {
    let username = std::env::var("USER").unwrap_or_else(|_| "user".to_string());

    let escalation_tool = if Path::new("/usr/bin/doas").exists() {
        "doas"
    } else {
        "sudo"
    };

    let group = failures
        .first()
        .and_then(|path| {
            let gid = std::fs::metadata(path).ok()?.gid();
            // Resolve GID to group name by reading /etc/group
            let group_contents = std::fs::read_to_string("/etc/group").ok()?;
            group_contents.lines().find_map(|line| {
                let parts: Vec<&str> = line.split(':').collect();
                (parts.len() >= 3 && parts[2].parse::<u32>().ok() == Some(gid))
                    .then(|| parts[0].to_string())
            })
        })
        .unwrap_or_else(|| "feedbackd".to_string());

    format!(
        "Flash LEDs detected but cannot be controlled.\n\n\
         Run: {escalation_tool} adduser {username} {group}\n\n\
         Then log out and back in."
    )
}

type TorchObserver = Box<dyn Fn(bool) + Send + Sync>;

/// Torch backed by every writable sysfs flash LED
///
/// After a successful write that changes the torch state, the observer is
/// called with the new state. Repeated requests for the current state are
/// not reported again.
pub struct SysfsTorch {
    devices: Vec<FlashDevice>,
    enabled: Mutex<bool>,
    observer: Option<TorchObserver>,
}

impl SysfsTorch {
    /// Wrap `devices`, taking the torch as on if any LED is lit
    pub fn new(devices: Vec<FlashDevice>) -> Self {
        let enabled = devices
            .iter()
            .any(|dev| dev.brightness().is_ok_and(|value| value > 0));
        Self {
            devices,
            enabled: Mutex::new(enabled),
            observer: None,
        }
    }

    /// Discover flash LEDs under `/sys/class/leds`
    pub fn detect() -> Result<Self, TorchError> {
        let hardware = FlashHardware::detect();
        if let Some(error) = hardware.permission_error {
            return Err(TorchError(error));
        }
        Ok(Self::new(hardware.devices))
    }

    /// Call `observer` with each actual torch transition
    pub fn with_observer(mut self, observer: impl Fn(bool) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn devices(&self) -> &[FlashDevice] {
        &self.devices
    }

    pub fn is_enabled(&self) -> bool {
        *self.enabled.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Write the requested state to every LED
    ///
    /// Succeeds if at least one LED accepted the write.
    pub fn apply(&self, enabled: bool) -> Result<(), TorchError> {
        if self.devices.is_empty() {
            return Err(TorchError("no flash LED available".into()));
        }

        let mut written = 0;
        for dev in &self.devices {
            let result = if enabled { dev.on() } else { dev.off() };
            match result {
                Ok(()) => written += 1,
                Err(e) => warn!(device = %dev.name, error = %e, enabled, "Failed to switch flash LED"),
            }
        }

        if written == 0 {
            return Err(TorchError(format!(
                "could not switch any of {} flash LEDs",
                self.devices.len()
            )));
        }

        let changed = {
            let mut state = self.enabled.lock().unwrap_or_else(|e| e.into_inner());
            let changed = *state != enabled;
            *state = enabled;
            changed
        };

        if changed {
            debug!(enabled, "Torch state applied");
            if let Some(observer) = &self.observer {
                observer(enabled);
            }
        }
        Ok(())
    }
}

impl TorchHardware for SysfsTorch {
    fn set_torch(&self, enabled: bool) {
        if let Err(e) = self.apply(enabled) {
            warn!(error = %e, enabled, "Torch request failed");
        }
    }
}
