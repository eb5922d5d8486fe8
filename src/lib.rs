#![doc = "Walkshed public API: population within walking distance of transit"]
mod buffer;
mod cache;
mod clip;
mod config;
mod crs;
mod error;
mod feature;
mod geom;
mod io;
mod progress;
mod result;
mod selection;
mod session;
mod units;

#[doc(inline)]
pub use session::{Baseline, Session};

#[doc(inline)]
pub use config::{EmptySelectionPolicy, WalkshedConfig, DEFAULT_POPULATION_FIELD, DEFAULT_RADIUS_FT};

#[doc(inline)]
pub use crs::CoordinateSystem;

#[doc(inline)]
pub use error::{Result, WalkshedError};

#[doc(inline)]
pub use feature::{Feature, FeatureCollection, Properties};

#[doc(inline)]
pub use buffer::{unified_buffer, BufferOutcome, BufferReport, BufferSkip, UnionOutcome};

#[doc(inline)]
pub use clip::{apportion, clip_tracts, density, ClipOutcome, ClipSkip};

#[doc(inline)]
pub use result::{ClippedTract, Diagnostics, WalkshedResult, WalkshedSummary, CLIPPED_AREA_SQMI, CLIPPED_POPULATION, DENSITY};

#[doc(inline)]
pub use selection::{CacheKey, Categories, Selection, TransitCategory, MAX_CATEGORIES};

#[doc(inline)]
pub use cache::WalkshedCache;

#[doc(inline)]
pub use progress::{NoProgress, Progress, Stage};

#[doc(inline)]
pub use units::{feet_to_meters, round_to, sq_meters_to_sq_miles, METERS_PER_FOOT, SQ_METERS_PER_SQ_MILE};
