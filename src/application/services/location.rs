//! Location resolution

use crate::infrastructure::knowledge::KnowledgeBase;

/// Well-known agricultural districts and the state they belong to.
/// Order matters: the first district contained in a location wins.
const DISTRICT_STATES: &[(&str, &str)] = &[
    ("guntur", "andhra pradesh"),
    ("krishna", "andhra pradesh"),
    ("nellore", "andhra pradesh"),
    ("karimnagar", "telangana"),
    ("warangal", "telangana"),
    ("nizamabad", "telangana"),
    ("ludhiana", "punjab"),
    ("amritsar", "punjab"),
    ("jalandhar", "punjab"),
    ("meerut", "uttar pradesh"),
    ("lucknow", "uttar pradesh"),
    ("agra", "uttar pradesh"),
    ("nagpur", "maharashtra"),
    ("pune", "maharashtra"),
    ("nashik", "maharashtra"),
    ("indore", "madhya pradesh"),
    ("bhopal", "madhya pradesh"),
    ("ujjain", "madhya pradesh"),
    ("ahmedabad", "gujarat"),
    ("rajkot", "gujarat"),
    ("surat", "gujarat"),
    ("jaipur", "rajasthan"),
    ("jodhpur", "rajasthan"),
    ("bikaner", "rajasthan"),
    ("bengaluru", "karnataka"),
    ("mysore", "karnataka"),
    ("belgaum", "karnataka"),
    ("chennai", "tamil nadu"),
    ("coimbatore", "tamil nadu"),
    ("madurai", "tamil nadu"),
    ("kolkata", "west bengal"),
    ("patna", "bihar"),
    ("ranchi", "jharkhand"),
];

/// Resolve a free-text location (district, state or "district, state") to a
/// lowercase state name.
///
/// Falls back to the lowercased input when nothing matches.
pub fn state_from_location(location: &str, knowledge: &KnowledgeBase) -> String {
    let location = location.to_lowercase();

    if let Some((_, state)) = DISTRICT_STATES
        .iter()
        .find(|(district, _)| location.contains(district))
    {
        return state.to_string();
    }

    if let Some((state, _)) = knowledge.states().find(|(state, _)| location.contains(state)) {
        return state.to_string();
    }

    location
}
