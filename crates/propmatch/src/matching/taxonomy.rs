//! Static UK location reference data: main regions, their cities, and the
//! local authorities within each city. Lookups are case-insensitive and
//! return empty/`None` for unknown keys rather than failing.

struct RegionEntry {
    name: &'static str,
    cities: &'static [&'static str],
}

struct CityEntry {
    city: &'static str,
    authorities: &'static [&'static str],
}

const REGIONS: &[RegionEntry] = &[
    RegionEntry {
        name: "London",
        cities: &["London"],
    },
    RegionEntry {
        name: "South East",
        cities: &[
            "Brighton",
            "Canterbury",
            "Milton Keynes",
            "Oxford",
            "Portsmouth",
            "Reading",
            "Southampton",
        ],
    },
    RegionEntry {
        name: "North West",
        cities: &["Blackpool", "Chester", "Liverpool", "Manchester", "Preston"],
    },
    RegionEntry {
        name: "Yorkshire and the Humber",
        cities: &["Bradford", "Hull", "Leeds", "Sheffield", "York"],
    },
    RegionEntry {
        name: "West Midlands",
        cities: &["Birmingham", "Coventry", "Stoke-on-Trent", "Wolverhampton"],
    },
    RegionEntry {
        name: "East Midlands",
        cities: &["Derby", "Leicester", "Northampton", "Nottingham"],
    },
    RegionEntry {
        name: "East of England",
        cities: &["Cambridge", "Ipswich", "Luton", "Norwich", "Peterborough"],
    },
    RegionEntry {
        name: "South West",
        cities: &["Bath", "Bournemouth", "Bristol", "Exeter", "Plymouth"],
    },
    RegionEntry {
        name: "North East",
        cities: &["Durham", "Middlesbrough", "Newcastle", "Sunderland"],
    },
    RegionEntry {
        name: "Scotland",
        cities: &["Aberdeen", "Dundee", "Edinburgh", "Glasgow"],
    },
    RegionEntry {
        name: "Wales",
        cities: &["Cardiff", "Newport", "Swansea"],
    },
];

const LOCAL_AUTHORITIES: &[CityEntry] = &[
    CityEntry {
        city: "London",
        authorities: &[
            "Camden",
            "City of London",
            "Croydon",
            "Ealing",
            "Greenwich",
            "Hackney",
            "Islington",
            "Lambeth",
            "Southwark",
            "Tower Hamlets",
            "Westminster",
        ],
    },
    CityEntry {
        city: "Manchester",
        authorities: &[
            "Bolton",
            "Bury",
            "Manchester City",
            "Salford",
            "Stockport",
            "Trafford",
        ],
    },
    CityEntry {
        city: "Liverpool",
        authorities: &["Knowsley", "Liverpool City", "Sefton", "Wirral"],
    },
    CityEntry {
        city: "Birmingham",
        authorities: &["Birmingham City", "Sandwell", "Solihull"],
    },
    CityEntry {
        city: "Leeds",
        authorities: &["Leeds City", "Wakefield"],
    },
    CityEntry {
        city: "Canterbury",
        authorities: &["Canterbury City", "Herne Bay", "Whitstable"],
    },
    CityEntry {
        city: "Brighton",
        authorities: &["Brighton & Hove"],
    },
    CityEntry {
        city: "Glasgow",
        authorities: &["Glasgow City", "Renfrewshire"],
    },
    CityEntry {
        city: "Cardiff",
        authorities: &["Cardiff Council", "Vale of Glamorgan"],
    },
];

/// Cities/sub-regions listed under a main region, or empty when unknown.
pub fn cities_for_region(region: &str) -> &'static [&'static str] {
    REGIONS
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(region.trim()))
        .map(|entry| entry.cities)
        .unwrap_or(&[])
}

/// Local authorities within a city. Empty means "no finer granularity", not
/// an error.
pub fn local_authorities_for_city(city: &str) -> &'static [&'static str] {
    LOCAL_AUTHORITIES
        .iter()
        .find(|entry| entry.city.eq_ignore_ascii_case(city.trim()))
        .map(|entry| entry.authorities)
        .unwrap_or(&[])
}

/// Reverse lookup over every region's city list. `None` means the caller
/// should treat the region as unknown, not abort.
pub fn region_for_city(city: &str) -> Option<&'static str> {
    let needle = city.trim();
    REGIONS.iter().find_map(|entry| {
        entry
            .cities
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(needle))
            .then_some(entry.name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canterbury_sits_in_the_south_east() {
        assert_eq!(region_for_city("Canterbury"), Some("South East"));
    }

    #[test]
    fn reverse_lookup_is_case_insensitive() {
        assert_eq!(region_for_city("manchester"), Some("North West"));
        assert_eq!(region_for_city("  LONDON "), Some("London"));
    }

    #[test]
    fn unknown_city_returns_none() {
        assert_eq!(region_for_city("Nowheresville"), None);
    }

    #[test]
    fn unknown_region_yields_empty_city_list() {
        assert!(cities_for_region("Atlantis").is_empty());
        assert!(!cities_for_region("south east").is_empty());
    }

    #[test]
    fn city_without_authority_breakdown_yields_empty_list() {
        assert!(local_authorities_for_city("Exeter").is_empty());
        assert!(local_authorities_for_city("manchester").contains(&"Salford"));
    }
}
