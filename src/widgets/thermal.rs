// Temperature of one labelled hwmon sensor, "Package id 0" on most intel boxes.
// By: Curtis Jones <mail@curtisjones.ca>

use super::Widget;
use crate::error::{read_file, Error, Result};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::debug;

pub struct Thermal {
    root: PathBuf,
    tag: String,
    interval: Duration,
    // Found on the first successful lookup, so we don't rescan every poll.
    input: Option<PathBuf>,
}

impl Thermal {
    pub fn new<S: Into<String>>(tag: S, interval: Duration) -> Self {
        Self::with_root("/sys/class/hwmon", tag, interval)
    }

    pub fn with_root<P: Into<PathBuf>, S: Into<String>>(
        root: P,
        tag: S,
        interval: Duration,
    ) -> Self {
        Self {
            root: root.into(),
            tag: tag.into(),
            interval,
            input: None,
        }
    }

    /// Walk every hwmon device looking for a temp*_label that matches our tag.
    fn find_input(&self) -> Result<PathBuf> {
        let entries = fs::read_dir(&self.root).map_err(|source| Error::Read {
            path: self.root.clone(),
            source,
        })?;
        let mut devices: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
        devices.sort();
        for dev in devices {
            if let Some(p) = labelled_input(&dev, &self.tag) {
                debug!(sensor = %p.display(), tag = %self.tag, "found thermal sensor");
                return Ok(p);
            }
        }
        Err(Error::NoSensor(self.tag.clone()))
    }

    /// Degrees celsius.
    pub fn temperature(&mut self) -> Result<f64> {
        let input = match &self.input {
            Some(p) => p.clone(),
            None => {
                let p = self.find_input()?;
                self.input = Some(p.clone());
                p
            }
        };
        let raw = match read_file(input.clone()) {
            Ok(r) => r,
            Err(e) => {
                // Sensor may have moved after a module reload.
                self.input = None;
                return Err(e);
            }
        };
        let milli: i64 = raw.trim().parse().map_err(|_| Error::Parse {
            what: "temperature",
            path: input,
            value: raw.trim().to_owned(),
        })?;
        Ok(milli as f64 / 1000.0)
    }
}

fn labelled_input(dev: &Path, tag: &str) -> Option<PathBuf> {
    let mut labels: Vec<PathBuf> = fs::read_dir(dev)
        .ok()?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.starts_with("temp") && n.ends_with("_label"))
        })
        .collect();
    labels.sort();
    labels.into_iter().find_map(|label| {
        let text = fs::read_to_string(&label).ok()?;
        if text.trim() != tag {
            return None;
        }
        let name = label.file_name()?.to_str()?.replace("_label", "_input");
        let input = label.with_file_name(name);
        if input.exists() {
            Some(input)
        } else {
            None
        }
    })
}

impl Widget for Thermal {
    fn name(&self) -> &str {
        "thermal"
    }

    fn interval(&self) -> Option<Duration> {
        Some(self.interval)
    }

    fn poll(&mut self) -> Result<String> {
        Ok(format!("\u{f2c7} {:.1}°C", self.temperature()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor(root: &Path, dev: &str, idx: u32, label: &str, milli: &str) {
        let d = root.join(dev);
        fs::create_dir_all(&d).unwrap();
        fs::write(d.join(format!("temp{}_label", idx)), format!("{}\n", label)).unwrap();
        fs::write(d.join(format!("temp{}_input", idx)), format!("{}\n", milli)).unwrap();
    }

    #[test]
    fn finds_the_tagged_sensor() {
        let dir = tempfile::tempdir().unwrap();
        sensor(dir.path(), "hwmon0", 1, "Composite", "38850");
        sensor(dir.path(), "hwmon3", 1, "Package id 0", "52000");
        sensor(dir.path(), "hwmon3", 2, "Core 0", "49000");

        let mut t = Thermal::with_root(dir.path(), "Package id 0", Duration::from_secs(1));
        assert_eq!(t.poll().unwrap(), "\u{f2c7} 52.0°C");

        fs::write(dir.path().join("hwmon3").join("temp1_input"), "61500").unwrap();
        assert_eq!(t.poll().unwrap(), "\u{f2c7} 61.5°C");
    }

    #[test]
    fn unknown_tag() {
        let dir = tempfile::tempdir().unwrap();
        sensor(dir.path(), "hwmon0", 1, "Composite", "38850");
        let mut t = Thermal::with_root(dir.path(), "Package id 0", Duration::from_secs(1));
        assert!(matches!(t.poll(), Err(Error::NoSensor(_))));
    }

    #[test]
    fn vanished_sensor_is_looked_up_again() {
        let dir = tempfile::tempdir().unwrap();
        sensor(dir.path(), "hwmon1", 1, "Tctl", "40000");
        let mut t = Thermal::with_root(dir.path(), "Tctl", Duration::from_secs(1));
        assert_eq!(t.temperature().unwrap(), 40.0);

        fs::remove_dir_all(dir.path().join("hwmon1")).unwrap();
        sensor(dir.path(), "hwmon2", 1, "Tctl", "45000");
        assert!(t.temperature().is_err());
        assert_eq!(t.temperature().unwrap(), 45.0);
    }
}
