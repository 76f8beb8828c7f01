//! Date-indexed NAV series and the NAV lookup policy

use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::dates::{parse_dmy, serde_dmy};
use crate::error::Result;

/// Price of one fund unit on a date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavPoint {
    #[serde(with = "serde_dmy")]
    pub date: NaiveDate,
    pub nav: f64,
}

impl NavPoint {
    pub fn new(date: NaiveDate, nav: f64) -> Self {
        Self { date, nav }
    }
}

/// NAV record as sent by the scheme API: both fields are strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawNavPoint {
    /// DD-MM-YYYY
    pub date: String,
    /// Decimal string
    pub nav: String,
}

/// NAV history sorted ascending by date with one point per date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<NavPoint>", into = "Vec<NavPoint>")]
pub struct NavSeries {
    points: Vec<NavPoint>,
}

impl From<Vec<NavPoint>> for NavSeries {
    fn from(points: Vec<NavPoint>) -> Self {
        Self::new(points)
    }
}

impl From<NavSeries> for Vec<NavPoint> {
    fn from(series: NavSeries) -> Self {
        series.points
    }
}

impl NavSeries {
    /// Sort by date and keep the first point seen for each date
    pub fn new(mut points: Vec<NavPoint>) -> Self {
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        Self { points }
    }

    /// Build from upstream string records.
    ///
    /// A bad date rejects the whole series since it cannot be placed on the
    /// timeline. A bad price is kept as 0, which values to zero units.
    pub fn from_raw(raw: &[RawNavPoint]) -> Result<Self> {
        let mut points = Vec::with_capacity(raw.len());
        for record in raw {
            let date = parse_dmy("nav.date", &record.date)?;
            let nav = match record.nav.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => {
                    warn!("unparseable NAV '{}' on {}, using 0", record.nav, record.date);
                    0.0
                }
            };
            points.push(NavPoint { date, nav });
        }
        Ok(Self::new(points))
    }

    /// Union of several series. When two series price the same date the
    /// earlier series in iteration order wins.
    pub fn merge<'a>(series: impl IntoIterator<Item = &'a NavSeries>) -> Self {
        let points = series
            .into_iter()
            .flat_map(|s| s.points.iter().copied())
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[NavPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&NavPoint> {
        self.points.first()
    }

    /// Most recent point
    pub fn latest(&self) -> Option<&NavPoint> {
        self.points.last()
    }

    /// Point before the most recent one
    pub fn previous(&self) -> Option<&NavPoint> {
        self.points.len().checked_sub(2).map(|i| &self.points[i])
    }

    /// NAV used to settle a purchase dated `date`:
    /// 1. the point on `date`,
    /// 2. else the first point after it (next trading day),
    /// 3. else the latest point.
    pub fn lookup(&self, date: NaiveDate) -> Option<&NavPoint> {
        let idx = self.points.partition_point(|p| p.date < date);
        self.points.get(idx).or_else(|| self.points.last())
    }

    /// NAV value for `date` under [`lookup`](Self::lookup), 0 for an empty series
    pub fn nav_on(&self, date: NaiveDate) -> f64 {
        self.lookup(date).map(|p| p.nav).unwrap_or(0.0)
    }

    /// Latest point dated on or before `date`
    pub fn on_or_before(&self, date: NaiveDate) -> Option<&NavPoint> {
        let idx = self.points.partition_point(|p| p.date <= date);
        idx.checked_sub(1).map(|i| &self.points[i])
    }
}
