//! Deterministic agent and manager names for synthetic rosters.

use crate::rng::RosterRng;

pub struct NameGenerator;

impl NameGenerator {
    /// First + last name. Not guaranteed unique; see `unique_full_name`.
    pub fn full_name(rng: &mut RosterRng) -> String {
        format!("{} {}", rng.pick(Self::first_names()), rng.pick(Self::last_names()))
    }

    /// A full name not already in `taken`. Falls back to a numeric suffix
    /// once the draw keeps colliding.
    pub fn unique_full_name(rng: &mut RosterRng, taken: &[String]) -> String {
        for _ in 0..16 {
            let name = Self::full_name(rng);
            if !taken.contains(&name) {
                return name;
            }
        }
        let base = Self::full_name(rng);
        let mut suffix = 2;
        loop {
            let candidate = format!("{base} {suffix}");
            if !taken.contains(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Managers are identified by surname.
    pub fn manager_name(rng: &mut RosterRng) -> String {
        rng.pick(Self::last_names()).to_string()
    }

    fn first_names() -> &'static [&'static str] {
        &[
            "Avery", "Blake", "Camila", "Darius", "Elena", "Farah", "Gideon", "Hana",
            "Imani", "Jonah", "Keisha", "Luca", "Marisol", "Nadia", "Omar", "Priya",
            "Quentin", "Rosa", "Soren", "Tamika", "Uriel", "Vanessa", "Wesley", "Ximena",
            "Yusuf", "Zoe", "Andre", "Bianca", "Colin", "Delia", "Emeka", "Fiona",
            "Grant", "Helena", "Isaac", "Juniper", "Kenji", "Leah", "Mateo", "Noelle",
        ]
    }

    fn last_names() -> &'static [&'static str] {
        &[
            "Abernathy", "Bustamante", "Castellanos", "Dunleavy", "Eriksen", "Fairbanks",
            "Galloway", "Hargrove", "Iwasaki", "Jablonski", "Kowalczyk", "Lindqvist",
            "Mwangi", "Nakamura", "Okonkwo", "Pendergast", "Quintero", "Rasmussen",
            "Sandoval", "Thibodeaux", "Underhill", "Villanueva", "Whitfield", "Yamamoto",
            "Zamora", "Ashworth", "Beaumont", "Calloway", "Delacroix", "Ellsworth",
        ]
    }
}
