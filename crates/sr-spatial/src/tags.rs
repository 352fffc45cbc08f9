//! OSM tag interpretation for the Overpass loader.

/// `highway=*` values selected by the Overpass query.  Kept in sync with
/// [`is_drivable`].
pub const DRIVABLE_HIGHWAY_REGEX: &str = "^(motorway|motorway_link|trunk|trunk_link|primary|primary_link|secondary|secondary_link|tertiary|tertiary_link|residential|living_street|unclassified|service|road)$";

/// `true` if a `highway` value is open to cars.
///
/// Unknown values are treated as drivable rather than silently dropping a
/// road the model may need to score.
pub fn is_drivable(highway: &str) -> bool {
    !matches!(
        highway,
        "footway" | "path" | "cycleway" | "pedestrian" | "steps" | "track"
            | "bridleway" | "corridor" | "proposed" | "construction" | "platform"
    )
}

/// Determine whether a way should be treated as one-way for car traffic.
///
/// Motorways and motorway links are implicitly one-way in OSM convention.
/// Roundabouts too.
pub fn is_oneway(highway: &str, tags: &[(&str, &str)]) -> bool {
    let explicit = tags.iter().any(|(k, v)| {
        *k == "oneway" && matches!(*v, "yes" | "1" | "true")
    });
    let roundabout = tags
        .iter()
        .any(|(k, v)| *k == "junction" && *v == "roundabout");
    let implicit = matches!(highway, "motorway" | "motorway_link");
    explicit || roundabout || implicit
}
