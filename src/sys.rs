//! Accelerator detection and GPU reporting.
//!
//! The service itself never touches the GPU directly; the engines do. This
//! module only answers two questions for `/health`: which device will the
//! engines run on, and what does the GPU look like right now. Both come from
//! `nvidia-smi`, the one probe available on every CUDA host.

use serde::Serialize;
use std::process::Command;

/// GPU details for health reporting. Absent entirely on CPU-only hosts.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GpuInfo {
    pub gpu_name: String,
    pub gpu_memory_total_mb: u64,
    pub gpu_memory_used_mb: u64,
}

/// Device the engines will select: "cuda" when a working NVIDIA GPU is
/// visible, "cpu" otherwise.
pub fn detect_device() -> &'static str {
    if gpu_info().is_some() { "cuda" } else { "cpu" }
}

/// Query the first GPU via `nvidia-smi`. Returns `None` when the tool is
/// missing, fails, or prints something unparseable.
pub fn gpu_info() -> Option<GpuInfo> {
    let output = Command::new("nvidia-smi")
        .args([
            "--query-gpu=name,memory.total,memory.used",
            "--format=csv,noheader,nounits",
        ])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_gpu_csv(&stdout)
}

/// Parse the first line of `nvidia-smi` CSV output.
fn parse_gpu_csv(csv: &str) -> Option<GpuInfo> {
    let line = csv.lines().next()?.trim();
    if line.is_empty() {
        return None;
    }

    let mut fields = line.split(',').map(str::trim);
    let name = fields.next()?.to_string();
    let total: u64 = fields.next()?.parse().ok()?;
    let used: u64 = fields.next()?.parse().ok()?;

    Some(GpuInfo {
        gpu_name: name,
        gpu_memory_total_mb: total,
        gpu_memory_used_mb: used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gpu_csv_single_gpu() {
        let info = parse_gpu_csv("NVIDIA GeForce RTX 4090, 24564, 1024\n").unwrap();
        assert_eq!(info.gpu_name, "NVIDIA GeForce RTX 4090");
        assert_eq!(info.gpu_memory_total_mb, 24564);
        assert_eq!(info.gpu_memory_used_mb, 1024);
    }

    #[test]
    fn test_parse_gpu_csv_takes_first_of_multiple() {
        let csv = "Tesla T4, 15360, 500\nTesla T4, 15360, 0\n";
        let info = parse_gpu_csv(csv).unwrap();
        assert_eq!(info.gpu_memory_used_mb, 500);
    }

    #[test]
    fn test_parse_gpu_csv_rejects_garbage() {
        assert!(parse_gpu_csv("").is_none());
        assert!(parse_gpu_csv("\n").is_none());
        assert!(parse_gpu_csv("no commas here").is_none());
        assert!(parse_gpu_csv("name, not-a-number, 5").is_none());
    }

    #[test]
    fn test_detect_device_returns_known_value() {
        let device = detect_device();
        assert!(device == "cuda" || device == "cpu");
    }
}
