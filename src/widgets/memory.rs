// Used and total memory from /proc/meminfo.
// By: Curtis Jones <mail@curtisjones.ca>

use super::Widget;
use crate::error::{read_file, Error, Result};
use std::{collections::HashMap, path::PathBuf, time::Duration};

/// Used and total memory in MiB.
pub struct Memory {
    meminfo: PathBuf,
    interval: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Usage {
    pub used_mb: f64,
    pub total_mb: f64,
}

impl Memory {
    pub fn new(interval: Duration) -> Self {
        Self::with_meminfo("/proc/meminfo", interval)
    }

    pub fn with_meminfo<P: Into<PathBuf>>(meminfo: P, interval: Duration) -> Self {
        Self {
            meminfo: meminfo.into(),
            interval,
        }
    }

    pub fn usage(&self) -> Result<Usage> {
        let raw = read_file(self.meminfo.clone())?;
        // Every line looks like "MemTotal:       16318384 kB".
        let table: HashMap<&str, u64> = raw
            .lines()
            .filter_map(|l| {
                let mut parts = l.split(':');
                let key = parts.next()?.trim();
                let val = parts.next()?.split_whitespace().next()?.parse().ok()?;
                Some((key, val))
            })
            .collect();
        let get = |key: &'static str| {
            table.get(key).copied().ok_or_else(|| Error::Parse {
                what: key,
                path: self.meminfo.clone(),
                value: String::new(),
            })
        };
        let opt = |key: &str| table.get(key).copied().unwrap_or(0);

        let total = get("MemTotal")?;
        let free = get("MemFree")?;
        let cached = opt("Cached") + opt("SReclaimable");
        let mut used = total as i64 - free as i64 - opt("Buffers") as i64 - cached as i64;
        if used < 0 {
            used = total as i64 - free as i64;
        }
        Ok(Usage {
            used_mb: used as f64 / 1024.0,
            total_mb: total as f64 / 1024.0,
        })
    }
}

impl Widget for Memory {
    fn name(&self) -> &str {
        "memory"
    }

    fn interval(&self) -> Option<Duration> {
        Some(self.interval)
    }

    fn poll(&mut self) -> Result<String> {
        let u = self.usage()?;
        Ok(format!("\u{f538} {:.0}/{:.0}MB", u.used_mb, u.total_mb))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn used_excludes_cache_and_buffers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meminfo");
        fs::write(
            &path,
            "MemTotal:        8388608 kB\n\
             MemFree:         2097152 kB\n\
             MemAvailable:    5000000 kB\n\
             Buffers:          102400 kB\n\
             Cached:          1945600 kB\n\
             SReclaimable:      51200 kB\n",
        )
        .unwrap();
        let mut m = Memory::with_meminfo(&path, Duration::from_secs(1));
        // 8192 - 2048 - 100 - 1900 - 50
        assert_eq!(m.poll().unwrap(), "\u{f538} 4094/8192MB");
    }

    #[test]
    fn odd_accounting_falls_back_to_total_minus_free() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meminfo");
        fs::write(
            &path,
            "MemTotal: 2048 kB\nMemFree: 1024 kB\nCached: 4096 kB\n",
        )
        .unwrap();
        let u = Memory::with_meminfo(&path, Duration::from_secs(1)).usage().unwrap();
        assert_eq!(u.used_mb, 1.0);
        assert_eq!(u.total_mb, 2.0);
    }

    #[test]
    fn missing_total_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meminfo");
        fs::write(&path, "MemFree: 1024 kB\n").unwrap();
        let mut m = Memory::with_meminfo(&path, Duration::from_secs(1));
        assert!(matches!(m.poll(), Err(Error::Parse { what: "MemTotal", .. })));
    }
}
