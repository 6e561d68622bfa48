// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module contains the traits through which the `NetworkGraph` talks to
//! its collaborators: the geodesic distance primitive, and the layers that
//! need to hear about topology changes.

use crate::cache::LayerId;
use crate::element::Point;

/**
This trait needs to be implemented by the type that measures distances
between geographic points.

The graph uses it to measure cable lengths, and to decide whether two points
are the same point when inferring connections from geometry.

<details>
<summary>Example implementation for a planar projection:</summary>

```ignore
struct Planar;

impl event_power_grid::Geodesic for Planar {
    fn distance_m(&self, a: &Point, b: &Point) -> f64 {
        ((a.lon - b.lon).powi(2) + (a.lat - b.lat).powi(2)).sqrt()
    }
}
```

</details>
*/
pub trait Geodesic {
    /// Returns the distance between two points, in meters.
    fn distance_m(&self, a: &Point, b: &Point) -> f64;

    /// Returns the total length of a polyline, in meters.
    fn polyline_length_m(&self, points: &[Point]) -> f64 {
        points
            .windows(2)
            .map(|w| self.distance_m(&w[0], &w[1]))
            .filter(|d| d.is_finite())
            .sum()
    }
}

/// Great-circle distance on a spherical earth.
#[derive(Clone, Copy, Debug, Default)]
pub struct Haversine;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

impl Geodesic for Haversine {
    fn distance_m(&self, a: &Point, b: &Point) -> f64 {
        let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
        let d_lat = lat2 - lat1;
        let d_lon = (b.lon - a.lon).to_radians();
        let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
    }
}

/// This trait needs to be implemented by whatever routes change
/// notifications to the layers depending on the grid.
///
/// The graph calls it with [`LayerId::PowerGrid`] after every topology or
/// geometry change.
pub trait DependencyNotifier {
    fn notify_dependents(&mut self, layer: LayerId);
}
