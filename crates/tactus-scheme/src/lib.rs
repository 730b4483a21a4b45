//! # tactus-scheme
//!
//! The orchestration layer of the contact library: coupling schemes that
//! sequence init → bin → check → apply → timestep-vote each cycle, the
//! owning [`Context`] handle hosts drive the library through, and the
//! per-cycle interface output dump.
//!
//! A coupling scheme pairs two registered meshes with a contact mode,
//! case, method, model, enforcement, and binning policy; configuration is
//! validated against an allow-list at `init()`, with benign mismatches
//! auto-corrected (and logged) and real conflicts rejected as a list of
//! [`tactus_types::error::ConfigError`] diagnostics.

pub mod context;
pub mod coupling;
pub mod output;
pub mod params;

pub use context::{Communicator, Context};
pub use coupling::{CouplingScheme, PairReportingData};
pub use params::{EnforcementOptions, LagrangeMultiplierOptions, Parameters, PenaltyOptions};
