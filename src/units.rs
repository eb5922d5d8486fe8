/// Square meters in one square mile.
pub const SQ_METERS_PER_SQ_MILE: f64 = 2_589_988.11;

/// Meters in one international foot.
pub const METERS_PER_FOOT: f64 = 0.3048;

/// Convert a distance in feet to meters.
#[inline] pub fn feet_to_meters(feet: f64) -> f64 { feet * METERS_PER_FOOT }

/// Convert an area in square meters to square miles.
#[inline] pub fn sq_meters_to_sq_miles(area_m2: f64) -> f64 { area_m2 / SQ_METERS_PER_SQ_MILE }

/// Round `value` to `places` decimal places (half away from zero).
#[inline]
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}
