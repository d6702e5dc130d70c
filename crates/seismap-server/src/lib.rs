//! HTTP tile service for seismap.
//!
//! Serves three products, `intensity`, `exposure` and `updatedExposure`, as
//! JSON arrays of tile estimates:
//!
//! ```text
//! GET /intensity?bbox=-10,35,30,60&z=4
//! [{"location":{"z":4,"x":5,"y":3},"bbox":{...},"estimate":{"degree":0.25,"estimate":3.1}}, ...]
//! ```
//!
//! Every response refines each requested tile once, so repeating a request
//! returns progressively better estimates.

pub mod config;
pub mod error;
pub mod http;
pub mod products;
pub mod service;

pub use config::{Cli, Command, ConfigError, ServeArgs, ServiceConfig, MAX_SERVICE_LEVELS};
pub use error::{ServiceError, StartupError, ValidationError};
pub use http::{router, run};
pub use products::{Product, Products, TileEstimate, TileStream};
pub use service::{LocatedEstimate, TileQuery, TileRequest, TileService};
