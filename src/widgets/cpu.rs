// Total cpu load, from the aggregate line in /proc/stat.
// By: Curtis Jones <mail@curtisjones.ca>

use super::Widget;
use crate::error::{read_file, Error, Result};
use std::{path::PathBuf, time::Duration};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Times {
    busy: u64,
    total: u64,
}

pub struct Cpu {
    stat: PathBuf,
    interval: Duration,
    last: Option<Times>,
}

impl Cpu {
    pub fn new(interval: Duration) -> Self {
        Self::with_stat("/proc/stat", interval)
    }

    pub fn with_stat<P: Into<PathBuf>>(stat: P, interval: Duration) -> Self {
        Self {
            stat: stat.into(),
            interval,
            last: None,
        }
    }

    fn read_times(&self) -> Result<Times> {
        let raw = read_file(self.stat.clone())?;
        let bad = || Error::Parse {
            what: "cpu times",
            path: self.stat.clone(),
            value: raw.lines().next().unwrap_or("").to_owned(),
        };
        let line = raw
            .lines()
            .find(|l| l.starts_with("cpu "))
            .ok_or_else(bad)?;
        // user nice system idle iowait irq softirq steal guest guest_nice
        let fields = line
            .split_whitespace()
            .skip(1)
            .map(|f| f.parse::<u64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| bad())?;
        if fields.len() < 4 {
            return Err(bad());
        }
        // guest time is already counted in user and nice.
        let total: u64 = fields.iter().take(8).sum();
        let idle = fields[3] + fields.get(4).copied().unwrap_or(0);
        Ok(Times {
            busy: total.saturating_sub(idle),
            total,
        })
    }

    /// Percent busy since the previous call. The first call has nothing to compare to and says 0.
    pub fn load_percent(&mut self) -> Result<f64> {
        let now = self.read_times()?;
        let pct = match self.last.replace(now) {
            Some(prev) if now.total > prev.total => {
                let busy = now.busy.saturating_sub(prev.busy) as f64;
                (busy / (now.total - prev.total) as f64 * 100.0).min(100.0)
            }
            _ => 0.0,
        };
        Ok(pct)
    }
}

impl Widget for Cpu {
    fn name(&self) -> &str {
        "cpu"
    }

    fn interval(&self) -> Option<Duration> {
        Some(self.interval)
    }

    fn poll(&mut self) -> Result<String> {
        Ok(format!("\u{f2db} {:.1}%", self.load_percent()?))
    }
}
