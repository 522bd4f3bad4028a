// Download and upload rate of whatever interface the default route goes out of.
// By: Curtis Jones <mail@curtisjones.ca>

use super::Widget;
use crate::error::{read_file, Error, Result};
use std::{
    io,
    path::PathBuf,
    process::{Command, Stdio},
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tracing::{debug, trace};

/// What we show when there is no default route.
pub const OFFLINE: &str = "\u{f127} Offline";

const MEGABYTE: f64 = 1_048_576.0;
const KILOBYTE: f64 = 1024.0;

/// Finds the name of the interface used by the default route.
pub trait RouteLookup {
    /// An empty string means there is no default route right now.
    fn default_interface(&mut self) -> io::Result<String>;
}

/// Reads the received and transmitted byte totals of an interface.
pub trait Counters {
    fn read(&self, dev: &str) -> Result<(u64, u64)>;
}

/// Wall clock in seconds. Allowed to stall or jump backwards.
pub trait TimeSource {
    fn now(&self) -> f64;
}

/// Asks `ip route` for the default route.
pub struct IpRoute {
    command: String,
    args: Vec<String>,
}

impl IpRoute {
    pub fn new() -> Self {
        Self {
            command: String::from("ip"),
            args: vec![String::from("route")],
        }
    }
}

impl Default for IpRoute {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteLookup for IpRoute {
    fn default_interface(&mut self) -> io::Result<String> {
        let out = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()?;
        if !out.status.success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{} exited with {}", self.command, out.status),
            ));
        }
        let table = String::from_utf8_lossy(&out.stdout);
        Ok(parse_default_route(&table).unwrap_or("").to_owned())
    }
}

/// Pull the device out of the first `default` line of an `ip route` listing.
pub fn parse_default_route(table: &str) -> Option<&str> {
    let line = table.lines().find(|l| l.starts_with("default"))?;
    let mut words = line.split_whitespace();
    // skip until the word after "dev".
    words.find(|&w| w == "dev")?;
    words.next().filter(|w| !w.is_empty())
}

/// The per interface counters under /sys/class/net.
pub struct SysfsCounters {
    root: PathBuf,
}

impl SysfsCounters {
    pub fn new() -> Self {
        Self::with_root("/sys/class/net")
    }

    pub fn with_root<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    fn counter(&self, dev: &str, file: &'static str) -> Result<u64> {
        let path = self.root.join(dev).join("statistics").join(file);
        let raw = read_file(path.clone())?;
        raw.trim().parse::<u64>().map_err(|_| Error::Parse {
            what: file,
            path,
            value: raw.trim().to_owned(),
        })
    }
}

impl Default for SysfsCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl Counters for SysfsCounters {
    fn read(&self, dev: &str) -> Result<(u64, u64)> {
        Ok((
            self.counter(dev, "rx_bytes")?,
            self.counter(dev, "tx_bytes")?,
        ))
    }
}

pub struct WallClock;

impl TimeSource for WallClock {
    fn now(&self) -> f64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs_f64(),
            // Clock set before 1970, treat it as negative time.
            Err(e) => -e.duration().as_secs_f64(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Sample {
    rx: u64,
    tx: u64,
    time: f64,
}

/// Polling widget for network throughput.
pub struct NetSpeed<R = IpRoute, C = SysfsCounters, T = WallClock> {
    route: R,
    counters: C,
    clock: T,
    interval: Duration,
    last: Option<Sample>,
}

impl NetSpeed {
    pub fn new(interval: Duration) -> Self {
        NetSpeed::with_sources(IpRoute::new(), SysfsCounters::new(), WallClock, interval)
    }
}

impl<R: RouteLookup, C: Counters, T: TimeSource> NetSpeed<R, C, T> {
    pub fn with_sources(route: R, counters: C, clock: T, interval: Duration) -> Self {
        Self {
            route,
            counters,
            clock,
            interval,
            last: None,
        }
    }

    /// One sample. Lookup failure means offline, counter failures are returned.
    pub fn sample(&mut self) -> Result<String> {
        let dev = match self.route.default_interface() {
            Ok(d) => d.trim().to_owned(),
            Err(e) => {
                debug!("default route lookup failed: {}", e);
                return Ok(OFFLINE.to_owned());
            }
        };
        if dev.is_empty() {
            return Ok(OFFLINE.to_owned());
        }

        let (rx, tx) = self.counters.read(&dev)?;
        let now = self.clock.now();

        let last = match self.last.replace(Sample { rx, tx, time: now }) {
            Some(s) => s,
            // Nothing to compare against yet.
            None => return Ok(format!("\u{f1eb} {} 0.0↓ 0.0↑", dev)),
        };

        let mut elapsed = now - last.time;
        if elapsed <= 0.0 {
            elapsed = 1.0;
        }
        // Signed on purpose, a counter reset shows up as one odd reading.
        let rx_rate = (rx as f64 - last.rx as f64) / elapsed;
        let tx_rate = (tx as f64 - last.tx as f64) / elapsed;
        trace!(dev = %dev, rx_rate, tx_rate, elapsed, "net sample");

        Ok(format!(
            "\u{f1eb} {} {}↓ {}↑",
            dev,
            format_rate(rx_rate),
            format_rate(tx_rate)
        ))
    }
}

impl<R: RouteLookup, C: Counters, T: TimeSource> Widget for NetSpeed<R, C, T> {
    fn name(&self) -> &str {
        "net"
    }

    fn interval(&self) -> Option<Duration> {
        Some(self.interval)
    }

    fn poll(&mut self) -> Result<String> {
        self.sample()
    }
}

/// Bytes per second with the biggest unit the value is above.
pub fn format_rate(val: f64) -> String {
    if val > MEGABYTE {
        format!("{:.1}MB/s", val / MEGABYTE)
    } else if val > KILOBYTE {
        format!("{:.1}KB/s", val / KILOBYTE)
    } else {
        format!("{:.0}B/s", val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        cell::{Cell, RefCell},
        collections::VecDeque,
        fs,
        rc::Rc,
    };

    #[derive(Clone, Default)]
    struct FakeRoute(Rc<RefCell<VecDeque<io::Result<String>>>>);

    impl FakeRoute {
        fn push(&self, r: io::Result<&str>) {
            self.0.borrow_mut().push_back(r.map(String::from));
        }
    }

    impl RouteLookup for FakeRoute {
        fn default_interface(&mut self) -> io::Result<String> {
            self.0
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(String::from("eth0")))
        }
    }

    #[derive(Clone, Default)]
    struct FakeCounters(Rc<Cell<(u64, u64)>>);

    impl Counters for FakeCounters {
        fn read(&self, _dev: &str) -> Result<(u64, u64)> {
            Ok(self.0.get())
        }
    }

    #[derive(Clone, Default)]
    struct FakeClock(Rc<Cell<f64>>);

    impl TimeSource for FakeClock {
        fn now(&self) -> f64 {
            self.0.get()
        }
    }

    struct Rig {
        route: FakeRoute,
        counters: FakeCounters,
        clock: FakeClock,
        widget: NetSpeed<FakeRoute, FakeCounters, FakeClock>,
    }

    fn rig() -> Rig {
        let route = FakeRoute::default();
        let counters = FakeCounters::default();
        let clock = FakeClock::default();
        let widget = NetSpeed::with_sources(
            route.clone(),
            counters.clone(),
            clock.clone(),
            Duration::from_secs(1),
        );
        Rig {
            route,
            counters,
            clock,
            widget,
        }
    }

    impl Rig {
        fn at(&mut self, rx: u64, tx: u64, time: f64) -> String {
            self.counters.0.set((rx, tx));
            self.clock.0.set(time);
            self.widget.poll().unwrap()
        }
    }

    #[test]
    fn rate_formatting() {
        assert_eq!(format_rate(2_097_152.0), "2.0MB/s");
        assert_eq!(format_rate(2048.0), "2.0KB/s");
        assert_eq!(format_rate(500.0), "500B/s");
        assert_eq!(format_rate(0.0), "0B/s");
        // Thresholds are exclusive.
        assert_eq!(format_rate(1024.0), "1024B/s");
        assert_eq!(format_rate(1_048_576.0), "1024.0KB/s");
    }

    #[test]
    fn first_poll_is_always_zero() {
        let mut r = rig();
        assert_eq!(r.at(5_000_000, 9_000, 100.0), "\u{f1eb} eth0 0.0↓ 0.0↑");
    }

    #[test]
    fn rate_is_delta_over_elapsed() {
        let mut r = rig();
        r.at(0, 0, 10.0);
        assert_eq!(r.at(4096, 1000, 12.0), "\u{f1eb} eth0 2.0KB/s↓ 500B/s↑");
        assert_eq!(
            r.at(4096 + 3 * 2_097_152, 1000, 15.0),
            "\u{f1eb} eth0 2.0MB/s↓ 0B/s↑"
        );
        assert_eq!(
            r.at(4096 + 3 * 2_097_152 + 300, 1300, 15.5),
            "\u{f1eb} eth0 600B/s↓ 600B/s↑"
        );
    }

    #[test]
    fn zero_or_backwards_elapsed_counts_as_one() {
        let mut r = rig();
        r.at(0, 0, 50.0);
        assert_eq!(r.at(2048, 500, 50.0), "\u{f1eb} eth0 2.0KB/s↓ 500B/s↑");
        assert_eq!(r.at(4096, 1000, 49.0), "\u{f1eb} eth0 2.0KB/s↓ 500B/s↑");
    }

    #[test]
    fn empty_lookup_is_offline_whatever_came_before() {
        let mut r = rig();
        r.route.push(Ok(""));
        assert_eq!(r.at(1, 1, 1.0), "\u{f127} Offline");
        r.at(0, 0, 2.0);
        r.at(2048, 2048, 3.0);
        r.route.push(Ok("  \n"));
        assert_eq!(r.at(9999, 9999, 4.0), OFFLINE);
    }

    #[test]
    fn failed_lookup_is_offline_and_keeps_state() {
        let mut r = rig();
        r.at(0, 0, 1.0);
        r.route.push(Err(io::Error::new(io::ErrorKind::NotFound, "no ip")));
        assert_eq!(r.at(1024 * 1024, 0, 2.0), OFFLINE);
        // Last good sample is still the one from t=1.
        assert_eq!(r.at(4096, 0, 3.0), "\u{f1eb} eth0 2.0KB/s↓ 0B/s↑");
    }

    #[test]
    fn counter_reset_gives_one_odd_reading() {
        let mut r = rig();
        r.at(10_000, 10_000, 1.0);
        assert_eq!(r.at(0, 0, 2.0), "\u{f1eb} eth0 -10000B/s↓ -10000B/s↑");
        assert_eq!(r.at(2048, 0, 3.0), "\u{f1eb} eth0 2.0KB/s↓ 0B/s↑");
    }

    #[test]
    fn interface_name_comes_through() {
        let mut r = rig();
        r.route.push(Ok("wlp3s0"));
        assert_eq!(r.at(0, 0, 1.0), "\u{f1eb} wlp3s0 0.0↓ 0.0↑");
    }

    #[test]
    fn route_table_parsing() {
        let table = "192.168.1.0/24 dev wlan0 proto kernel scope link\n\
                     default via 192.168.1.1 dev wlan0 proto dhcp metric 600\n\
                     default via 10.0.0.1 dev eth0\n";
        assert_eq!(parse_default_route(table), Some("wlan0"));
        assert_eq!(parse_default_route("default dev wg0 scope link"), Some("wg0"));
        assert_eq!(parse_default_route("10.0.0.0/8 dev eth0\n"), None);
        assert_eq!(parse_default_route(""), None);
        assert_eq!(parse_default_route("default via 10.0.0.1"), None);
    }

    #[test]
    fn sysfs_counters() {
        let dir = tempfile::tempdir().unwrap();
        let stats = dir.path().join("eth0").join("statistics");
        fs::create_dir_all(&stats).unwrap();
        fs::write(stats.join("rx_bytes"), "123456\n").unwrap();
        fs::write(stats.join("tx_bytes"), "789\n").unwrap();

        let c = SysfsCounters::with_root(dir.path());
        assert_eq!(c.read("eth0").unwrap(), (123_456, 789));
        assert!(matches!(c.read("eth1"), Err(Error::Read { .. })));

        fs::write(stats.join("tx_bytes"), "lots").unwrap();
        assert!(matches!(c.read("eth0"), Err(Error::Parse { .. })));
    }

    #[test]
    fn missing_counters_propagate() {
        let dir = tempfile::tempdir().unwrap();
        let route = FakeRoute::default();
        let mut w = NetSpeed::with_sources(
            route,
            SysfsCounters::with_root(dir.path()),
            FakeClock::default(),
            Duration::from_secs(1),
        );
        assert!(w.poll().is_err());
    }
}
