//! Cache-Type Classification
//!
//! Maps endpoint identifiers to coarse cache categories used for stats
//! partitioning and differentiated TTL defaults.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Cache Type
// =============================================================================

/// Coarse cache category for a stored entry
///
/// Classification from an endpoint name only ever produces the first four
/// variants; `Feed`, `Flights`, and `Search` are set explicitly by call
/// sites whose category is not derivable from the endpoint string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheType {
    /// Geocoding and reverse-geocoding responses
    Geo,
    /// Affiliate/partner offer listings
    Affiliate,
    /// Map tile and static map payloads
    Map,
    /// Generic API responses (default)
    #[default]
    Api,
    /// Aggregated content feeds
    Feed,
    /// Flight search responses
    Flights,
    /// Composite search results
    Search,
}

impl CacheType {
    /// Classify an endpoint identifier into a cache type
    ///
    /// Case-sensitive substring containment, first match wins, checked in
    /// fixed order: geolocation, affiliate, maps. Anything else is `Api`.
    pub fn classify(endpoint: &str) -> Self {
        if endpoint.contains("geolocation") {
            CacheType::Geo
        } else if endpoint.contains("affiliate") {
            CacheType::Affiliate
        } else if endpoint.contains("maps") {
            CacheType::Map
        } else {
            CacheType::Api
        }
    }

    /// Wire identifier used by the remote store
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheType::Geo => "geo",
            CacheType::Affiliate => "affiliate",
            CacheType::Map => "map",
            CacheType::Api => "api",
            CacheType::Feed => "feed",
            CacheType::Flights => "flights",
            CacheType::Search => "search",
        }
    }
}

impl fmt::Display for CacheType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_endpoints() {
        assert_eq!(CacheType::classify("geolocation_search"), CacheType::Geo);
        assert_eq!(CacheType::classify("affiliate_search"), CacheType::Affiliate);
        assert_eq!(CacheType::classify("maps_tiles"), CacheType::Map);
        assert_eq!(CacheType::classify("anything_else"), CacheType::Api);
    }

    #[test]
    fn test_classify_precedence() {
        // geolocation wins over affiliate wins over maps
        assert_eq!(
            CacheType::classify("geolocation_affiliate_maps"),
            CacheType::Geo
        );
        assert_eq!(CacheType::classify("affiliate_maps"), CacheType::Affiliate);
    }

    #[test]
    fn test_classify_is_case_sensitive() {
        assert_eq!(CacheType::classify("Geolocation_search"), CacheType::Api);
    }

    #[test]
    fn test_wire_identifiers() {
        assert_eq!(CacheType::Geo.as_str(), "geo");
        assert_eq!(CacheType::Flights.to_string(), "flights");
        assert_eq!(
            serde_json::to_string(&CacheType::Affiliate).unwrap(),
            "\"affiliate\""
        );
    }
}
