//! Static reference tables: recognized flower names, spelling variants,
//! and scientific names.
//!
//! Tables are written in display form (with accents) and indexed on first
//! use by their folded or normalized keys. They are never mutated after
//! initialization, so request handlers share them without locking.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};

use crate::normalize::{depluralize, fold, normalize};

/// Recognized flower names in Spanish and English.
const FLOWER_KEYWORD_LIST: &[&str] = &[
    "rosa", "rosas", "rose", "roses",
    "tulipán", "tulipanes", "tulip", "tulips",
    "girasol", "girasoles", "sunflower", "sunflowers",
    "orquídea", "orquídeas", "orchid", "orchids",
    "margarita", "margaritas", "daisy", "daisies",
    "lirio", "lirios", "lily", "lilies",
    "clavel", "claveles", "carnation", "carnations",
    "hortensia", "hortensias", "hydrangea", "hydrangeas",
    "jazmín", "jazmines", "jasmine",
    "lavanda", "lavandas", "lavender",
    "amapola", "amapolas", "poppy", "poppies",
    "peonía", "peonías", "peony", "peonies",
    "dalia", "dalias", "dahlia", "dahlias",
    "crisantemo", "crisantemos", "chrysanthemum", "chrysanthemums",
    "narciso", "narcisos", "daffodil", "daffodils",
    "buganvilla", "buganvillas", "bougainvillea",
    "hibisco", "hibiscos", "hibiscus",
    "pensamiento", "pensamientos", "pansy",
    "geranio", "geranios", "geranium",
    "azucena", "azucenas",
    "petunia", "petunias",
    "gladiolo", "gladiolos", "gladiolus",
    "nardo", "nardos",
    "alhelí", "alhelíes",
    "violeta", "violetas", "violet",
    "caléndula", "caléndulas", "marigold",
    "dedalera", "dedaleras", "foxglove",
    "lupino", "lupinos", "lupine",
    "malva", "malvas", "mallow",
    "nomeolvides", "forget-me-not",
    "primavera", "primrose",
    "rododendro", "rododendros", "rhododendron",
    "verbena", "verbenas",
    "zinnia", "zinnias",
    "anémona", "anémonas", "anemone",
    "campanilla", "campanillas", "bluebell",
    "diente de león", "dandelion",
    "jazmín estrella", "star jasmine",
    "flor de nochebuena", "poinsettia",
    "flor de cempasúchil",
    "flor de loto", "lotus flower",
    "alcatraz", "cala",
];

/// Spelling variant → canonical name.
const SYNONYM_LIST: &[(&str, &str)] = &[
    ("jazmines", "jazmín"),
    ("jazmin", "jazmín"),
    ("jasmines", "jasmine"),
    ("rosas", "rosa"),
    ("tulipanes", "tulipán"),
    ("orquideas", "orquídea"),
    ("margaritas", "margarita"),
    ("lirios", "lirio"),
    ("claveles", "clavel"),
    ("hortensias", "hortensia"),
    ("lavandas", "lavanda"),
    ("amapolas", "amapola"),
    ("peonias", "peonía"),
    ("dalias", "dalia"),
    ("crisantemos", "crisantemo"),
    ("narcisos", "narciso"),
    ("buganvillas", "buganvilla"),
    ("hibiscos", "hibisco"),
    ("pensamientos", "pensamiento"),
    ("geranios", "geranio"),
    ("azucenas", "azucena"),
    ("petunias", "petunia"),
    ("gladiolos", "gladiolo"),
    ("nardos", "nardo"),
    ("alhelies", "alhelí"),
    ("violetas", "violeta"),
    ("calendulas", "caléndula"),
    ("dedaleras", "dedalera"),
    ("lupinos", "lupino"),
    ("malvas", "malva"),
    ("nomeolvides", "nomeolvides"),
    ("primulas", "primavera"),
    ("rododendros", "rododendro"),
    ("verbenas", "verbena"),
    ("zinnias", "zinnia"),
    ("anemonas", "anémona"),
    ("campanillas", "campanilla"),
    ("dientes de leon", "diente de león"),
    ("cala", "alcatraz"),
    ("roses", "rose"),
    ("tulips", "tulip"),
    ("sunflowers", "sunflower"),
    ("orchids", "orchid"),
    ("daisies", "daisy"),
    ("lilies", "lily"),
    ("poppies", "poppy"),
    ("peonies", "peony"),
    ("dahlias", "dahlia"),
    ("daffodils", "daffodil"),
];

/// Common name → scientific (Latin) name.
const SCIENTIFIC_NAME_LIST: &[(&str, &str)] = &[
    ("jazmín", "Jasminum officinale"),
    ("jasmine", "Jasminum officinale"),
    ("jazmín estrella", "Trachelospermum jasminoides"),
    ("rosa", "Rosa"),
    ("rose", "Rosa"),
    ("tulipán", "Tulipa"),
    ("tulip", "Tulipa"),
    ("girasol", "Helianthus annuus"),
    ("sunflower", "Helianthus annuus"),
    ("orquídea", "Orchidaceae"),
    ("orchid", "Orchidaceae"),
    ("margarita", "Bellis perennis"),
    ("daisy", "Bellis perennis"),
    ("lirio", "Lilium"),
    ("lily", "Lilium"),
    ("clavel", "Dianthus caryophyllus"),
    ("hortensia", "Hydrangea"),
    ("lavanda", "Lavandula"),
    ("amapola", "Papaver"),
    ("poppy", "Papaver"),
    ("peonía", "Paeonia"),
    ("peony", "Paeonia"),
    ("dalia", "Dahlia"),
    ("crisantemo", "Chrysanthemum"),
    ("narciso", "Narcissus"),
    ("daffodil", "Narcissus"),
    ("buganvilla", "Bougainvillea"),
    ("hibisco", "Hibiscus"),
    ("pensamiento", "Viola tricolor"),
    ("geranio", "Pelargonium"),
    ("azucena", "Lilium candidum"),
    ("petunia", "Petunia"),
    ("gladiolo", "Gladiolus"),
    ("nardo", "Polianthes tuberosa"),
    ("alhelí", "Matthiola incana"),
    ("violeta", "Viola"),
    ("caléndula", "Calendula officinalis"),
    ("dedalera", "Digitalis purpurea"),
    ("lupino", "Lupinus"),
    ("malva", "Malva sylvestris"),
    ("nomeolvides", "Myosotis"),
    ("primavera", "Primula vulgaris"),
    ("rododendro", "Rhododendron"),
    ("verbena", "Verbena officinalis"),
    ("zinnia", "Zinnia elegans"),
    ("anémona", "Anemone"),
    ("campanilla", "Campanula"),
    ("diente de león", "Taraxacum officinale"),
    ("flor de nochebuena", "Euphorbia pulcherrima"),
    ("flor de cempasúchil", "Tagetes erecta"),
    ("flor de loto", "Nelumbo nucifera"),
    ("alcatraz", "Zantedeschia aethiopica"),
    ("cala", "Zantedeschia aethiopica"),
];

/// Seed list for suggestions when a query matches almost nothing.
pub const DEFAULT_SUGGESTIONS: [&str; 5] = ["rosa", "tulipán", "girasol", "orquídea", "jazmín"];

/// Flower-name roots and generic words ("flower", "bloom", "blossom") in
/// both languages, matched against folded text.
const RELEVANCE_PATTERNS: &[&str] = &[
    r"jazm[ií]n",
    r"jasmine",
    r"rose",
    r"rosa",
    r"orqu[ií]dea",
    r"orchid",
    r"tulip",
    r"tulip[aá]n",
    r"flor",
    r"flower",
    r"blossom",
    r"bloom",
    r"girasol",
    r"sunflower",
    r"dalia",
    r"hibisco",
    r"peon[ií]a",
    r"azucena",
    r"alcatraz",
    r"cala",
];

/// A recognized flower name with its folded matching key.
#[derive(Debug, Clone)]
pub struct Keyword {
    pub name: &'static str,
    pub folded: String,
}

/// FlowerKeywordSet, deduplicated, in table order.
pub static FLOWER_KEYWORDS: Lazy<Vec<Keyword>> = Lazy::new(|| {
    let mut seen = BTreeSet::new();
    FLOWER_KEYWORD_LIST
        .iter()
        .filter(|name| seen.insert(**name))
        .map(|&name| Keyword {
            name,
            folded: fold(name),
        })
        .collect()
});

/// SynonymMap keyed by folded spelling.
///
/// Each variant is indexed both as written and in its depluralized form,
/// since the normalizer strips plural suffixes before the lookup. Every
/// canonical name is also indexed under its own folded and depluralized
/// spelling so that normalizing a canonical name yields itself. Explicit
/// variants take precedence over derived keys.
pub static SYNONYMS: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    let mut map: HashMap<String, &'static str> = HashMap::new();

    for &(variant, canonical) in SYNONYM_LIST {
        map.insert(fold(variant), canonical);
    }
    for &(variant, canonical) in SYNONYM_LIST {
        map.entry(depluralize(&fold(variant)).to_string())
            .or_insert(canonical);
    }
    for &(_, canonical) in SYNONYM_LIST {
        let folded = fold(canonical);
        let stripped = depluralize(&folded).to_string();
        if folded != canonical {
            map.entry(folded).or_insert(canonical);
        }
        map.entry(stripped).or_insert(canonical);
    }

    map
});

/// ScientificNameMap keyed by normalized common name.
pub static SCIENTIFIC_NAMES: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    SCIENTIFIC_NAME_LIST
        .iter()
        .filter_map(|(common, scientific)| normalize(common).map(|key| (key, *scientific)))
        .collect()
});

pub static RELEVANCE_REGEXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    RELEVANCE_PATTERNS
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
});
