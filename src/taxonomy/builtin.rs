//! The default tag vocabulary for agricultural grant programs.

use super::{TagDefinition, TaxonomyDefinition};

/// Canonical tags, in the order they are reported by the listing endpoint.
const TAGS: &[&str] = &[
    "agriculture",
    "aquaculture",
    "capacity-building",
    "capital",
    "climate",
    "community-benefit",
    "conservation",
    "cost-share",
    "dairy",
    "distribution",
    "drought",
    "education",
    "equipment",
    "equine",
    "equine-owners",
    "food-safety",
    "farmer",
    "farm-to-school",
    "grant",
    "infrastructure",
    "irrigation",
    "local-food",
    "local-government",
    "logistics",
    "marketing",
    "mixed-operations",
    "nonprofit",
    "nutrient-management",
    "operational",
    "organic-certification",
    "organic-transition",
    "outreach",
    "planning",
    "pilot",
    "producer-group",
    "procurement",
    "processing",
    "research",
    "resilience",
    "reimbursement",
    "rolling",
    "rural",
    "safety-net",
    "school",
    "seafood",
    "seafood-harvester",
    "soil",
    "supply-chain",
    "technical-assistance",
    "training",
    "value-added",
    "water",
    "water-storage",
    "working-capital",
    "row-crops",
    "vegetables",
    "fruit",
    "livestock",
    "competitive",
    "match-required",
    "public-entity-eligible",
    "individual-eligible",
    "rfa-open",
    "wi",
    "va",
    "ri",
    "nh",
    "mn",
    "me",
    "ky",
    "co",
    "cooperative",
    "for-profit",
    "university",
    "extension",
    "tribal",
    "veteran",
    "beginning-farmer",
    "underserved",
    "youth",
    "food-access",
    "nutrition",
    "workforce",
    "energy",
    "renewable-energy",
    "water-quality",
    "soil-health",
    "wildlife-habitat",
    "pasture",
    "grazing",
    "manure-management",
    "disaster-relief",
    "flood",
];

/// Declared synonym lists. Every entry names other canonical tags; the
/// symmetric view is derived when the taxonomy is built. Groups must be
/// closed, so the three-way disaster group declares all of its edges.
const SYNONYMS: &[(&str, &[&str])] = &[
    ("water", &["irrigation"]),
    ("education", &["training"]),
    ("technical-assistance", &["capacity-building"]),
    ("aquaculture", &["seafood"]),
    ("pasture", &["grazing"]),
    ("disaster-relief", &["flood", "drought"]),
    ("flood", &["drought"]),
    ("nutrient-management", &["manure-management"]),
    ("energy", &["renewable-energy"]),
    ("local-food", &["farm-to-school"]),
    ("organic-transition", &["organic-certification"]),
    ("livestock", &["dairy"]),
    ("equine", &["equine-owners"]),
    ("food-access", &["nutrition"]),
];

/// The builtin taxonomy definition.
pub(super) fn definition() -> TaxonomyDefinition {
    TaxonomyDefinition {
        tags: TAGS
            .iter()
            .map(|name| TagDefinition {
                name: name.to_string(),
                synonyms: SYNONYMS
                    .iter()
                    .find(|(tag, _)| tag == name)
                    .map(|(_, synonyms)| synonyms.iter().map(|s| s.to_string()).collect())
                    .unwrap_or_default(),
            })
            .collect(),
    }
}
