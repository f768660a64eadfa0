use std::collections::HashMap;

use anyhow::{Result, anyhow};
use once_cell::sync::OnceCell;

/// Champion roster in artifact column order. The order is load-bearing:
/// score columns, checkpoint matrices and top-K extraction all index into it.
const DEFAULT_CHAMPIONS: &[&str] = &[
    "Aatrox", "Ahri", "Akali", "Akshan", "Alistar", "Ambessa", "Amumu", "Anivia", "Annie",
    "Aphelios", "Ashe", "Aurelion Sol", "Aurora", "Azir", "Bard", "Bel'Veth", "Blitzcrank",
    "Brand", "Braum", "Briar", "Caitlyn", "Camille", "Cassiopeia", "Cho'Gath", "Corki", "Darius",
    "Diana", "Dr. Mundo", "Draven", "Ekko", "Elise", "Evelynn", "Ezreal", "Fiddlesticks", "Fiora",
    "Fizz", "Galio", "Gangplank", "Garen", "Gnar", "Gragas", "Graves", "Gwen", "Hecarim",
    "Heimerdinger", "Hwei", "Illaoi", "Irelia", "Ivern", "Janna", "Jarvan IV", "Jax", "Jayce",
    "Jhin", "Jinx", "K'Sante", "Kai'Sa", "Kalista", "Karma", "Karthus", "Kassadin", "Katarina",
    "Kayle", "Kayn", "Kennen", "Kha'Zix", "Kindred", "Kled", "Kog'Maw", "LeBlanc", "Lee Sin",
    "Leona", "Lillia", "Lissandra", "Lucian", "Lulu", "Lux", "Malphite", "Malzahar", "Maokai",
    "Master Yi", "Milio", "Miss Fortune", "Mordekaiser", "Morgana", "Naafiri", "Nami", "Nasus",
    "Nautilus", "Neeko", "Nidalee", "Nilah", "Nocturne", "Nunu & Willump", "Olaf", "Orianna",
    "Ornn", "Pantheon", "Poppy", "Pyke", "Qiyana", "Quinn", "Rakan", "Rammus", "Rek'Sai", "Rell",
    "Renata Glasc", "Renekton", "Rengar", "Riven", "Rumble", "Ryze", "Samira", "Sejuani", "Senna",
    "Seraphine", "Sett", "Shaco", "Shen", "Shyvana", "Singed", "Sion", "Sivir", "Skarner",
    "Smolder", "Sona", "Soraka", "Swain", "Sylas", "Syndra", "Tahm Kench", "Taliyah", "Talon",
    "Taric", "Teemo", "Thresh", "Tristana", "Trundle", "Tryndamere", "Twisted Fate", "Twitch",
    "Udyr", "Urgot", "Varus", "Vayne", "Veigar", "Vel'Koz", "Vex", "Vi", "Viego", "Viktor",
    "Vladimir", "Volibear", "Warwick", "Wukong", "Xayah", "Xerath", "Xin Zhao", "Yasuo", "Yone",
    "Yorick", "Yuumi", "Zac", "Zed", "Zeri", "Ziggs", "Zilean", "Zoe", "Zyra",
];

/// Closed, ordered registry of selectable champions. Ids are 1-based and
/// stable for the lifetime of the value; lookups in both directions are O(1).
#[derive(Debug, Clone)]
pub struct Catalog {
    names: Vec<String>,
    ids: HashMap<String, u16>,
}

impl Catalog {
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names.into_iter().map(Into::into).collect::<Vec<_>>();
        if names.is_empty() {
            return Err(anyhow!("catalog must contain at least one champion"));
        }
        let mut ids = HashMap::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            let id = u16::try_from(idx + 1).map_err(|_| anyhow!("catalog too large"))?;
            if ids.insert(name.clone(), id).is_some() {
                return Err(anyhow!("duplicate champion name in catalog: {name}"));
            }
        }
        Ok(Self { names, ids })
    }

    /// Shared default roster. Building it cannot fail: the list is non-empty
    /// and duplicate-free by construction.
    pub fn default_roster() -> &'static Catalog {
        static DEFAULT: OnceCell<Catalog> = OnceCell::new();
        DEFAULT.get_or_init(|| {
            Catalog::new(DEFAULT_CHAMPIONS.iter().copied()).expect("default roster is valid")
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// 1-based stable id, or `None` for names outside the closed roster.
    pub fn id_of(&self, name: &str) -> Option<u16> {
        self.ids.get(name).copied()
    }

    pub fn name_of(&self, id: u16) -> Option<&str> {
        if id == 0 {
            return None;
        }
        self.names.get(usize::from(id) - 1).map(String::as_str)
    }

    /// 0-based column index into score rows, in roster order.
    pub fn column_of(&self, name: &str) -> Option<usize> {
        self.id_of(name).map(|id| usize::from(id) - 1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(name)
    }
}
