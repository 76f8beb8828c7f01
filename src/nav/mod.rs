//! NAV history: series, lookup policy and upstream data loading

mod scheme;
mod series;
pub mod loader;

pub use loader::{load_nav, load_nav_csv, load_nav_from_reader, load_scheme_history};
pub use scheme::{NavInfo, ReturnsInfo, SchemeDetails, SchemeHistory, SchemeMeta, SCHEMA_VERSION};
pub use series::{NavPoint, NavSeries, RawNavPoint};
