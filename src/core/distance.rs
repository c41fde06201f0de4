use geo::{point, HaversineDistance};

use crate::models::PartnerProfile;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let from = point!(x: lon1, y: lat1);
    let to = point!(x: lon2, y: lat2);

    from.haversine_distance(&to) / 1000.0
}

/// Approximate distance between two players, rounded to 0.1 km
///
/// Free-form location strings are never geocoded, so this is only known when both
/// profiles carry coordinates.
pub fn approximate_distance_km(a: &PartnerProfile, b: &PartnerProfile) -> Option<f64> {
    let (lat1, lon1) = a.coordinates()?;
    let (lat2, lon2) = b.coordinates()?;

    let km = haversine_distance(lat1, lon1, lat2, lon2);
    km.is_finite().then(|| (km * 10.0).round() / 10.0)
}
