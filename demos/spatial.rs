//! Adapted from the `spatial` walkthrough in tidwall/bgen's own examples:
//! load a handful of Arizona/Sonora cities into a spatial index, then run
//! a rectangle-intersection query and a k-nearest-neighbor query against
//! the same underlying tree.

use bgen_rs::{Rect, SpatialTree, Uncounted};

#[derive(Clone, Debug)]
struct City {
    name: &'static str,
    lon: f64,
    lat: f64,
}

#[derive(Debug, Clone, Copy)]
struct CityRect;

impl bgen_rs::Rectangle<City, f64, 2> for CityRect {
    fn rect(&self, item: &City) -> Rect<f64, 2> {
        Rect {
            min: [item.lon, item.lat],
            max: [item.lon, item.lat],
        }
    }
}

struct PointDistance;

impl bgen_rs::Distance<f64, 2, (f64, f64)> for PointDistance {
    type Dist = f64;

    fn distance(&self, rect: &Rect<f64, 2>, target: &(f64, f64)) -> f64 {
        let (lon, lat) = *target;
        let dx = (rect.min[0] - lon).max(0.0).max(lon - rect.max[0]);
        let dy = (rect.min[1] - lat).max(0.0).max(lat - rect.max[1]);
        (dx * dx + dy * dy).sqrt()
    }
}

const CITIES: &[(&str, f64, f64)] = &[
    ("Phoenix", -112.07, 33.45),
    ("Glendale", -112.19, 33.54),
    ("Chandler", -111.84, 33.31),
    ("Scottsdale", -111.93, 33.49),
    ("Mesa", -111.83, 33.42),
    ("Tucson", -110.97, 32.22),
    ("San Luis Rio Colorado", -114.78, 32.49),
    ("Mexicali", -115.45, 32.62),
    ("Heroica Nogales", -110.94, 31.32),
    ("Ensenada", -116.62, 31.86),
    ("Flagstaff", -111.65, 35.20),
];

fn main() {
    let mut tree: SpatialTree<City, _, f64, 2, CityRect> = SpatialTree::new(
        |a: &City, b: &City| a.name.cmp(b.name),
        Uncounted,
        bgen_rs::Spatial(CityRect),
    );

    for (name, lon, lat) in CITIES {
        tree.insert(City { name, lon: *lon, lat: *lat });
    }

    let query = Rect { min: [-113.0, 33.0], max: [-111.0, 34.0] };
    println!("Cities inside rectangle ((-113 33) (-111 34)):");
    tree.intersects(&query, |city| {
        println!("- {}", city.name);
        true
    });

    println!();
    println!("Top 5 cities nearby point (-113 33):");
    let mut found = 0;
    tree.nearby(&(-113.0, 33.0), 5, &PointDistance, |city, _dist| {
        println!("- {}", city.name);
        found += 1;
        found < 5
    });
}
