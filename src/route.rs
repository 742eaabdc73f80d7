//! Walking-route geometry from the directions provider.
//!
//! The platform performs the HTTP call; this module turns the response
//! body into a usable path. The provider is tried once; any failure
//! (malformed payload, no routes, a degenerate geometry) falls back to
//! the straight line between the two endpoints instead of surfacing a
//! hard error to the user.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::geo::{self, GeoPoint};
use crate::i18n::{self, Language};

/// Where a path's geometry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteSource {
    Provider,
    StraightLine,
}

/// An ordered walking path from the user toward the destination.
#[derive(Debug, Clone, Serialize)]
pub struct RoutePath {
    pub points: Vec<GeoPoint>,
    pub source: RouteSource,
    pub length_km: f64,
}

impl RoutePath {
    /// True when the provider failed and the path is the straight-line
    /// substitute; the UI shows a soft warning for this case.
    pub fn is_fallback(&self) -> bool {
        self.source == RouteSource::StraightLine
    }
}

/// Path plus the soft warning shown when the provider failed.
#[derive(Debug, Clone, Serialize)]
pub struct RouteOutcome {
    #[serde(flatten)]
    pub path: RoutePath,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<&'static str>,
}

/// Full walking-route outcome for the UI: the path, and a localized
/// warning when it is the straight-line substitute.
pub fn walking_route(
    body: &str,
    from: &GeoPoint,
    to: &GeoPoint,
    language: Language,
) -> RouteOutcome {
    let path = from_provider_response(body, from, to);
    let warning = path
        .is_fallback()
        .then(|| i18n::route_fallback_message(language));
    RouteOutcome { path, warning }
}

// Directions payload, GeoJSON-style: coordinates are [lng, lat] pairs
// and the first route is the preferred one.

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<ProviderRoute>,
}

#[derive(Debug, Deserialize)]
struct ProviderRoute {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    coordinates: Vec<[f64; 2]>,
}

/// Straight two-point path from `from` to `to`.
pub fn straight_line(from: &GeoPoint, to: &GeoPoint) -> RoutePath {
    let points = vec![*from, *to];
    let length_km = path_length_km(&points);
    RoutePath {
        points,
        source: RouteSource::StraightLine,
        length_km,
    }
}

/// Build a path from a directions response, falling back to the
/// straight line when the body is unusable.
pub fn from_provider_response(body: &str, from: &GeoPoint, to: &GeoPoint) -> RoutePath {
    match parse_route(body) {
        Ok(points) => {
            let length_km = path_length_km(&points);
            RoutePath {
                points,
                source: RouteSource::Provider,
                length_km,
            }
        }
        Err(reason) => {
            warn!("unusable directions response ({reason}), using straight-line path");
            straight_line(from, to)
        }
    }
}

fn parse_route(body: &str) -> Result<Vec<GeoPoint>, String> {
    let response: DirectionsResponse =
        serde_json::from_str(body).map_err(|e| format!("JSON parse error: {e}"))?;

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| "no routes in response".to_string())?;

    let points: Vec<GeoPoint> = route
        .geometry
        .coordinates
        .iter()
        .map(|c| GeoPoint::new(c[1], c[0]))
        .collect();

    if points.len() < 2 {
        return Err(format!("route has only {} point(s)", points.len()));
    }
    Ok(points)
}

/// Total length of a path in kilometers.
pub fn path_length_km(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| geo::distance_km(&w[0], &w[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng)
    }

    const WALKING_RESPONSE: &str = r#"{
        "routes": [{
            "geometry": {
                "coordinates": [
                    [127.1060, 37.5170],
                    [127.1122, 37.5190],
                    [127.1203, 37.5227]
                ],
                "type": "LineString"
            },
            "distance": 1520.3,
            "duration": 1180.0
        }],
        "code": "Ok"
    }"#;

    #[test]
    fn provider_response_is_parsed() {
        let from = pt(37.5170, 127.1060);
        let to = pt(37.5227, 127.1203);
        let path = from_provider_response(WALKING_RESPONSE, &from, &to);

        assert_eq!(path.source, RouteSource::Provider);
        assert!(!path.is_fallback());
        assert_eq!(path.points.len(), 3);
        // Coordinates arrive as [lng, lat] and come out as lat/lng
        assert!((path.points[0].lat - 37.5170).abs() < 1e-9);
        assert!((path.points[0].lng - 127.1060).abs() < 1e-9);
        assert!(path.length_km > 1.0 && path.length_km < 2.0);
    }

    #[test]
    fn malformed_body_falls_back() {
        let from = pt(37.5170, 127.1060);
        let to = pt(37.5227, 127.1203);
        let path = from_provider_response("<html>502 Bad Gateway</html>", &from, &to);

        assert!(path.is_fallback());
        assert_eq!(path.points, vec![from, to]);
    }

    #[test]
    fn empty_routes_falls_back() {
        let from = pt(37.5170, 127.1060);
        let to = pt(37.5227, 127.1203);
        let path = from_provider_response(r#"{"routes": [], "code": "NoRoute"}"#, &from, &to);
        assert!(path.is_fallback());
    }

    #[test]
    fn degenerate_geometry_falls_back() {
        let from = pt(37.5170, 127.1060);
        let to = pt(37.5227, 127.1203);
        let body = r#"{"routes": [{"geometry": {"coordinates": [[127.1, 37.5]]}}]}"#;
        let path = from_provider_response(body, &from, &to);
        assert!(path.is_fallback());
        assert_eq!(path.points.len(), 2);
    }

    #[test]
    fn missing_routes_key_falls_back() {
        let from = pt(37.5170, 127.1060);
        let to = pt(37.5227, 127.1203);
        let path = from_provider_response(r#"{"message": "Forbidden"}"#, &from, &to);
        assert!(path.is_fallback());
    }

    #[test]
    fn fallback_outcome_carries_warning() {
        let from = pt(37.5170, 127.1060);
        let to = pt(37.5227, 127.1203);

        let ok = walking_route(WALKING_RESPONSE, &from, &to, Language::En);
        assert!(ok.warning.is_none());

        let bad = walking_route("not json", &from, &to, Language::En);
        assert_eq!(bad.warning, Some("Could not find a route."));

        let json = serde_json::to_string(&bad).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["source"], "straight_line");
        assert!(value["warning"].is_string());
    }

    #[test]
    fn straight_line_length_matches_distance() {
        let from = pt(37.5170, 127.1060);
        let to = pt(37.5227, 127.1203);
        let path = straight_line(&from, &to);
        assert_eq!(path.points.len(), 2);
        assert!((path.length_km - geo::distance_km(&from, &to)).abs() < 1e-9);
    }

    #[test]
    fn path_length_sums_segments() {
        // Two equal hops due north
        let path = [pt(37.50, 127.10), pt(37.51, 127.10), pt(37.52, 127.10)];
        let total = path_length_km(&path);
        let direct = geo::distance_km(&path[0], &path[2]);
        assert!((total - direct).abs() < 1e-6, "{total} vs {direct}");
    }
}
