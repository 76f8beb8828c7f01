//! Engine configuration
//!
//! Every field has a default, so a JSON file only needs to name the values
//! it overrides.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metrics::{PortfolioMethod, Timeframe, XirrConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// XIRR solver settings (guess 10%, 100 iterations, |NPV| < 1e-6)
    #[serde(default)]
    pub xirr: XirrConfig,

    /// How portfolio CAGR and XIRR combine funds (default: merged timeline)
    #[serde(default)]
    pub portfolio_method: PortfolioMethod,

    /// Trailing windows for scheme returns (default: 1W to 5Y)
    #[serde(default = "default_timeframes")]
    pub timeframes: Vec<Timeframe>,
}

fn default_timeframes() -> Vec<Timeframe> {
    Timeframe::defaults()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            xirr: XirrConfig::default(),
            portfolio_method: PortfolioMethod::default(),
            timeframes: default_timeframes(),
        }
    }
}

impl EngineConfig {
    /// Load a (possibly partial) JSON config file
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
