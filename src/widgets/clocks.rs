use anyhow::{anyhow, Result};
use chrono::{DateTime, FixedOffset, Utc};
use unicode_width::UnicodeWidthStr;

use super::Source;
use crate::config::ZoneConfig;

const TIME_FORMAT: &str = "%H:%M:%S  %a %d %b";

/// Current time at a list of fixed UTC offsets
pub struct Clocks {
    zones: Vec<ZoneConfig>,
}

impl Clocks {
    pub fn new(zones: Vec<ZoneConfig>) -> Self {
        Self { zones }
    }

    fn render_at(&self, now: DateTime<Utc>) -> Result<Vec<String>> {
        if self.zones.is_empty() {
            return Ok(vec![now.format(TIME_FORMAT).to_string()]);
        }

        let label_width = self.zones.iter().map(|z| z.label.width()).max().unwrap_or(0);

        self.zones
            .iter()
            .map(|zone| {
                let offset = FixedOffset::east_opt(zone.offset_minutes.saturating_mul(60))
                    .ok_or_else(|| {
                        anyhow!("{}: offset {} minutes is out of range", zone.label, zone.offset_minutes)
                    })?;
                // Pad by display width so wide labels still line up
                let pad = " ".repeat(label_width - zone.label.width());
                Ok(format!(
                    "{}{}  {}",
                    zone.label,
                    pad,
                    now.with_timezone(&offset).format(TIME_FORMAT)
                ))
            })
            .collect()
    }
}

impl Source for Clocks {
    fn fetch(&self) -> Result<Vec<String>> {
        self.render_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn zone(label: &str, offset_minutes: i32) -> ZoneConfig {
        ZoneConfig {
            label: label.to_string(),
            offset_minutes,
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_offsets_applied() {
        let clocks = Clocks::new(vec![zone("UTC", 0), zone("Kolkata", 330), zone("LA", -420)]);
        let lines = clocks.render_at(noon()).unwrap();
        assert_eq!(lines[0], "UTC      12:00:00  Fri 15 Mar");
        assert_eq!(lines[1], "Kolkata  17:30:00  Fri 15 Mar");
        assert_eq!(lines[2], "LA       05:00:00  Fri 15 Mar");
    }

    #[test]
    fn test_wide_labels_align() {
        let clocks = Clocks::new(vec![zone("東京", 540), zone("NYC", -240)]);
        let lines = clocks.render_at(noon()).unwrap();
        assert_eq!(lines[0], "東京  21:00:00  Fri 15 Mar");
        assert_eq!(lines[1], "NYC   08:00:00  Fri 15 Mar");
    }

    #[test]
    fn test_no_zones_shows_utc() {
        let lines = Clocks::new(vec![]).render_at(noon()).unwrap();
        assert_eq!(lines, vec!["12:00:00  Fri 15 Mar"]);
    }

    #[test]
    fn test_bad_offset_is_an_error() {
        let clocks = Clocks::new(vec![zone("Mars", 100_000)]);
        assert!(clocks.render_at(noon()).is_err());
    }
}
