//! Coordinates for weather lookups

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

const fn at(lat: f64, lon: f64) -> Coordinates {
    Coordinates { lat, lon }
}

/// Major agricultural districts
const DISTRICTS: &[(&str, Coordinates)] = &[
    // Andhra Pradesh
    ("guntur", at(16.3067, 80.4365)),
    ("krishna", at(16.6100, 80.7214)),
    ("east godavari", at(17.0, 82.0)),
    ("west godavari", at(16.9174, 81.3399)),
    ("kurnool", at(15.8281, 78.0373)),
    ("anantapur", at(14.6819, 77.6006)),
    // Telangana
    ("karimnagar", at(18.4386, 79.1288)),
    ("warangal", at(17.9784, 79.5941)),
    ("nizamabad", at(18.6725, 78.0941)),
    ("khammam", at(17.2473, 80.1514)),
    // Punjab
    ("ludhiana", at(30.9010, 75.8573)),
    ("amritsar", at(31.6340, 74.8723)),
    ("jalandhar", at(31.3260, 75.5762)),
    ("patiala", at(30.3398, 76.3869)),
    // Uttar Pradesh
    ("meerut", at(28.9845, 77.7064)),
    ("lucknow", at(26.8467, 80.9462)),
    ("agra", at(27.1767, 78.0081)),
    ("varanasi", at(25.3176, 82.9739)),
    ("gorakhpur", at(26.7606, 83.3732)),
    // Maharashtra
    ("nagpur", at(21.1458, 79.0882)),
    ("pune", at(18.5204, 73.8567)),
    ("nashik", at(19.9975, 73.7898)),
    ("kolhapur", at(16.7050, 74.2433)),
    // Gujarat
    ("ahmedabad", at(23.0225, 72.5714)),
    ("rajkot", at(22.3039, 70.8022)),
    ("surat", at(21.1702, 72.8311)),
    // Rajasthan
    ("jaipur", at(26.9124, 75.7873)),
    ("jodhpur", at(26.2389, 73.0243)),
    ("bikaner", at(28.0229, 73.3119)),
    // Karnataka
    ("belgaum", at(15.8497, 74.4977)),
    ("mysore", at(12.2958, 76.6394)),
    ("dharwad", at(15.4589, 75.0078)),
    // Tamil Nadu
    ("chennai", at(13.0827, 80.2707)),
    ("coimbatore", at(11.0168, 76.9558)),
    ("madurai", at(9.9252, 78.1198)),
    ("thanjavur", at(10.7870, 79.1378)),
];

/// State capitals (or the main agricultural city)
const STATES: &[(&str, Coordinates)] = &[
    ("andhra pradesh", at(16.5062, 80.6480)),
    ("telangana", at(17.3850, 78.4867)),
    ("punjab", at(30.7333, 76.7794)),
    ("haryana", at(30.7333, 76.7794)),
    ("uttar pradesh", at(26.8467, 80.9462)),
    ("maharashtra", at(19.0760, 72.8777)),
    ("madhya pradesh", at(23.2599, 77.4126)),
    ("gujarat", at(23.0225, 72.5714)),
    ("rajasthan", at(26.9124, 75.7873)),
    ("karnataka", at(12.9716, 77.5946)),
    ("tamil nadu", at(13.0827, 80.2707)),
    ("west bengal", at(22.5726, 88.3639)),
    ("bihar", at(25.5941, 85.1376)),
    ("odisha", at(20.2961, 85.8245)),
    ("kerala", at(8.5241, 76.9366)),
    ("assam", at(26.1445, 91.7362)),
    ("jharkhand", at(23.3441, 85.3096)),
    ("chhattisgarh", at(21.2514, 81.6296)),
    ("uttarakhand", at(30.3165, 78.0322)),
    ("himachal pradesh", at(31.1048, 77.1734)),
];

/// Districts are checked before states; both match as substrings
pub fn coordinates(location: &str) -> Option<Coordinates> {
    let location = location.trim().to_lowercase();
    DISTRICTS
        .iter()
        .chain(STATES.iter())
        .find(|(name, _)| location.contains(name))
        .map(|(_, coords)| *coords)
}
