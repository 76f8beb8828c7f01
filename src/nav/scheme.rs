//! Typed records for the upstream scheme API
//!
//! Only the fields listed here are kept; anything else the API sends is
//! dropped during deserialization.

use serde::{Deserialize, Serialize};

use super::series::{NavSeries, RawNavPoint};
use crate::error::Result;

/// Version of the [`SchemeDetails`] shape
pub const SCHEMA_VERSION: u32 = 1;

fn schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Scheme metadata from the NAV history endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeMeta {
    #[serde(alias = "schemeCode")]
    pub scheme_code: u32,
    #[serde(alias = "schemeName")]
    pub scheme_name: String,
    #[serde(default, alias = "fundHouse")]
    pub fund_house: String,
    #[serde(default, alias = "schemeType")]
    pub scheme_type: Option<String>,
    #[serde(default, alias = "schemeCategory")]
    pub scheme_category: Option<String>,
    #[serde(default, alias = "isinGrowth")]
    pub isin_growth: Option<String>,
    #[serde(default, alias = "isinDivReinvestment")]
    pub isin_div_reinvestment: Option<String>,
}

/// NAV history response: metadata plus string NAV records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeHistory {
    pub meta: SchemeMeta,
    #[serde(default)]
    pub data: Vec<RawNavPoint>,
}

impl SchemeHistory {
    pub fn nav_series(&self) -> Result<NavSeries> {
        NavSeries::from_raw(&self.data)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavInfo {
    pub nav: f64,
    #[serde(default)]
    pub date: String,
}

/// Trailing returns published by the fund house, in percent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReturnsInfo {
    pub week1: Option<f64>,
    pub year1: Option<f64>,
    pub year3: Option<f64>,
    pub year5: Option<f64>,
    pub inception: Option<f64>,
    pub date: Option<String>,
}

/// Scheme details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchemeDetails {
    #[serde(default = "schema_version")]
    pub schema_version: u32,
    pub code: Option<String>,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub fund_house: Option<String>,
    pub category: Option<String>,
    pub fund_type: Option<String>,
    pub plan: Option<String>,
    #[serde(rename = "ISIN")]
    pub isin: Option<String>,
    pub start_date: Option<String>,
    pub lump_min: Option<f64>,
    pub lump_max: Option<f64>,
    pub sip_min: Option<f64>,
    pub sip_max: Option<f64>,
    pub lock_in_period: Option<f64>,
    pub expense_ratio: Option<String>,
    pub fund_manager: Option<String>,
    pub crisil_rating: Option<String>,
    pub investment_objective: Option<String>,
    pub aum: Option<f64>,
    pub volatility: Option<f64>,
    pub nav: Option<NavInfo>,
    pub last_nav: Option<NavInfo>,
    pub returns: Option<ReturnsInfo>,
}

impl Default for SchemeDetails {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            code: None,
            name: None,
            short_name: None,
            fund_house: None,
            category: None,
            fund_type: None,
            plan: None,
            isin: None,
            start_date: None,
            lump_min: None,
            lump_max: None,
            sip_min: None,
            sip_max: None,
            lock_in_period: None,
            expense_ratio: None,
            fund_manager: None,
            crisil_rating: None,
            investment_objective: None,
            aum: None,
            volatility: None,
            nav: None,
            last_nav: None,
            returns: None,
        }
    }
}

impl SchemeDetails {
    /// Change between the previous and current published NAV: (absolute, percent)
    pub fn nav_change(&self) -> Option<(f64, f64)> {
        let current = self.nav.as_ref()?.nav;
        let previous = self.last_nav.as_ref()?.nav;
        let change = current - previous;
        let pct = if previous > 0.0 { change / previous * 100.0 } else { 0.0 };
        Some((change, pct))
    }
}
