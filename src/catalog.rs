// 📚 Catalog - the fixed canonical roster
// Immutable for the life of the process; defined once at startup.
//
// Also carries the later-generation reference lists used when a user adds
// an extra entry "from the dex" instead of typing it manually.

use serde::{Deserialize, Serialize};

// ============================================================================
// CATALOG ITEM
// ============================================================================

/// One canonical roster entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Sequential id, also the sort id
    pub id: u32,
    pub name: String,
    /// Generation / group tag
    pub generation: u8,
    pub is_trainer: bool,
    pub is_base: bool,
}

impl CatalogItem {
    /// Canonical keys are the decimal id ("1", "2", ...)
    pub fn key(&self) -> String {
        self.id.to_string()
    }

    pub fn display_id(&self) -> String {
        display_id(self.id)
    }
}

/// Zero-padded three digit display id: 7 → "007", 1000 → "1000"
pub fn display_id(id: u32) -> String {
    format!("{:03}", id)
}

// ============================================================================
// CATALOG
// ============================================================================

/// Ordered canonical roster (the CatalogProvider)
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    /// The first-generation base roster (ids 1..=151)
    pub fn gen1() -> Self {
        Self::from_names(1, GEN_1)
    }

    /// Build a base roster from consecutive names starting at `first_id`
    pub fn from_names(first_id: u32, names: &[&str]) -> Self {
        let items = names
            .iter()
            .enumerate()
            .map(|(i, name)| CatalogItem {
                id: first_id + i as u32,
                name: name.to_string(),
                generation: generation_of(first_id + i as u32),
                is_trainer: false,
                is_base: true,
            })
            .collect();

        Catalog { items }
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up a canonical item by key
    pub fn get(&self, key: &str) -> Option<&CatalogItem> {
        let id: u32 = key.parse().ok()?;
        // Reject "007" style keys so the key namespace stays exact
        if id.to_string() != key {
            return None;
        }
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::gen1()
    }
}

// ============================================================================
// REFERENCE LISTS (add from dex)
// ============================================================================

/// A named entry from a later generation's reference list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceEntry {
    pub id: u32,
    pub name: &'static str,
    pub generation: u8,
}

/// Generation lists a user can pick extras from
pub fn reference_list(generation: u8) -> Vec<ReferenceEntry> {
    let (first_id, names) = match generation {
        2 => (152, GEN_2),
        3 => (252, GEN_3),
        _ => return Vec::new(),
    };

    names
        .iter()
        .enumerate()
        .map(|(i, name)| ReferenceEntry {
            id: first_id + i as u32,
            name,
            generation,
        })
        .collect()
}

/// Find a reference entry by dex id across every reference list
pub fn find_reference(id: u32) -> Option<ReferenceEntry> {
    [2, 3]
        .into_iter()
        .flat_map(reference_list)
        .find(|entry| entry.id == id)
}

fn generation_of(id: u32) -> u8 {
    match id {
        0..=151 => 1,
        152..=251 => 2,
        252..=386 => 3,
        _ => 0,
    }
}

const GEN_1: &[&str] = &[
    "Bulbasaur", "Ivysaur", "Venusaur", "Charmander", "Charmeleon", "Charizard",
    "Squirtle", "Wartortle", "Blastoise", "Caterpie", "Metapod", "Butterfree",
    "Weedle", "Kakuna", "Beedrill", "Pidgey", "Pidgeotto", "Pidgeot", "Rattata",
    "Raticate", "Spearow", "Fearow", "Ekans", "Arbok", "Pikachu", "Raichu",
    "Sandshrew", "Sandslash", "Nidoran♀", "Nidorina", "Nidoqueen", "Nidoran♂",
    "Nidorino", "Nidoking", "Clefairy", "Clefable", "Vulpix", "Ninetales",
    "Jigglypuff", "Wigglytuff", "Zubat", "Golbat", "Oddish", "Gloom", "Vileplume",
    "Paras", "Parasect", "Venonat", "Venomoth", "Diglett", "Dugtrio", "Meowth",
    "Persian", "Psyduck", "Golduck", "Mankey", "Primeape", "Growlithe", "Arcanine",
    "Poliwag", "Poliwhirl", "Poliwrath", "Abra", "Kadabra", "Alakazam", "Machop",
    "Machoke", "Machamp", "Bellsprout", "Weepinbell", "Victreebel", "Tentacool",
    "Tentacruel", "Geodude", "Graveler", "Golem", "Ponyta", "Rapidash", "Slowpoke",
    "Slowbro", "Magnemite", "Magneton", "Farfetch'd", "Doduo", "Dodrio", "Seel",
    "Dewgong", "Grimer", "Muk", "Shellder", "Cloyster", "Gastly", "Haunter",
    "Gengar", "Onix", "Drowzee", "Hypno", "Krabby", "Kingler", "Voltorb",
    "Electrode", "Exeggcute", "Exeggutor", "Cubone", "Marowak", "Hitmonlee",
    "Hitmonchan", "Lickitung", "Koffing", "Weezing", "Rhyhorn", "Rhydon", "Chansey",
    "Tangela", "Kangaskhan", "Horsea", "Seadra", "Goldeen", "Seaking", "Staryu",
    "Starmie", "Mr. Mime", "Scyther", "Jynx", "Electabuzz", "Magmar", "Pinsir",
    "Tauros", "Magikarp", "Gyarados", "Lapras", "Ditto", "Eevee", "Vaporeon",
    "Jolteon", "Flareon", "Porygon", "Omanyte", "Omastar", "Kabuto", "Kabutops",
    "Aerodactyl", "Snorlax", "Articuno", "Zapdos", "Moltres", "Dratini", "Dragonair",
    "Dragonite", "Mewtwo", "Mew",
];

const GEN_2: &[&str] = &[
    "Chikorita", "Bayleef", "Meganium", "Cyndaquil", "Quilava", "Typhlosion",
    "Totodile", "Croconaw", "Feraligatr", "Sentret", "Furret", "Hoothoot", "Noctowl",
    "Ledyba", "Ledian", "Spinarak", "Ariados", "Crobat", "Chinchou", "Lanturn",
    "Pichu", "Cleffa", "Igglybuff", "Togepi", "Togetic", "Natu", "Xatu", "Mareep",
    "Flaaffy", "Ampharos", "Bellossom", "Marill", "Azumarill", "Sudowoodo",
    "Politoed", "Hoppip", "Skiploom", "Jumpluff", "Aipom", "Sunkern", "Sunflora",
    "Yanma", "Wooper", "Quagsire", "Espeon", "Umbreon", "Murkrow", "Slowking",
    "Misdreavus", "Unown", "Wobbuffet", "Girafarig", "Pineco", "Forretress",
    "Dunsparce", "Gligar", "Steelix", "Snubbull", "Granbull", "Qwilfish", "Scizor",
    "Shuckle", "Heracross", "Sneasel", "Teddiursa", "Ursaring", "Slugma",
    "Magcargo", "Swinub", "Piloswine", "Corsola", "Remoraid", "Octillery",
    "Delibird", "Mantine", "Skarmory", "Houndour", "Houndoom", "Kingdra", "Phanpy",
    "Donphan", "Porygon2", "Stantler", "Smeargle", "Tyrogue", "Hitmontop",
    "Smoochum", "Elekid", "Magby", "Miltank", "Blissey", "Raikou", "Entei",
    "Suicune", "Larvitar", "Pupitar", "Tyranitar", "Lugia", "Ho-Oh", "Celebi",
];

const GEN_3: &[&str] = &[
    "Treecko", "Grovyle", "Sceptile", "Torchic", "Combusken", "Blaziken", "Mudkip",
    "Marshtomp", "Swampert", "Poochyena", "Mightyena", "Zigzagoon", "Linoone",
    "Wurmple", "Silcoon", "Beautifly", "Cascoon", "Dustox", "Lotad", "Lombre",
    "Ludicolo", "Seedot", "Nuzleaf", "Shiftry", "Taillow", "Swellow", "Wingull",
    "Pelipper", "Ralts", "Kirlia", "Gardevoir", "Surskit", "Masquerain", "Shroomish",
    "Breloom", "Slakoth", "Vigoroth", "Slaking", "Nincada", "Ninjask", "Shedinja",
    "Whismur", "Loudred", "Exploud", "Makuhita", "Hariyama", "Azurill", "Nosepass",
    "Skitty", "Delcatty", "Sableye", "Mawile", "Aron", "Lairon", "Aggron",
    "Meditite", "Medicham", "Electrike", "Manectric", "Plusle", "Minun", "Volbeat",
    "Illumise", "Roselia", "Gulpin", "Swalot", "Carvanha", "Sharpedo", "Wailmer",
    "Wailord", "Numel", "Camerupt", "Torkoal", "Spoink", "Grumpig", "Spinda",
    "Trapinch", "Vibrava", "Flygon", "Cacnea", "Cacturne", "Swablu", "Altaria",
    "Zangoose", "Seviper", "Lunatone", "Solrock", "Barboach", "Whiscash",
    "Corphish", "Crawdaunt", "Baltoy", "Claydol", "Lileep", "Cradily", "Anorith",
    "Armaldo", "Feebas", "Milotic", "Castform", "Kecleon", "Shuppet", "Banette",
    "Duskull", "Dusclops", "Tropius", "Chimecho", "Absol", "Wynaut", "Snorunt",
    "Glalie", "Spheal", "Sealeo", "Walrein", "Clamperl", "Huntail", "Gorebyss",
    "Relicanth", "Luvdisc", "Bagon", "Shelgon", "Salamence", "Beldum", "Metang",
    "Metagross", "Regirock", "Regice", "Registeel", "Latias", "Latios", "Kyogre",
    "Groudon", "Rayquaza", "Jirachi", "Deoxys",
];
