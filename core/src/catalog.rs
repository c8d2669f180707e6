//! The static scenario catalog.

use std::sync::LazyLock;

use executive_types::{OutcomeLabels, Scenario, ScenarioId};

struct Entry {
    id: u32,
    title: &'static str,
    alert: &'static str,
    description: &'static str,
    labels: [&'static str; 3],
}

const ENTRIES: &[Entry] = &[
    Entry {
        id: 1,
        title: "The Blackout",
        alert: "MASSIVE GRID FAILURE. 40 MILLION WITHOUT POWER.",
        description: "A cascading power failure has left the Eastern Seaboard in darkness.",
        labels: ["The Warhawk", "The Prudent", "The Voice in the Dark"],
    },
    Entry {
        id: 2,
        title: "The Deepfake Election",
        alert: "VIDEO LEAK: PRESIDENT ACCEPTING CARTEL BRIBE. 50M VIEWS.",
        description: "A perfect deepfake threatens to undermine the election in 48 hours.",
        labels: ["The Glass House", "The Old Guard", "The 4D Chess Master"],
    },
    Entry {
        id: 3,
        title: "The Wet Bulb",
        alert: "HEATWAVE IN TEXAS. GRID FAILING. MASS CASUALTIES IMMINENT.",
        description: "A heat dome over Texas threatens 2 million lives as the grid fails.",
        labels: ["The Utilitarian", "The Resilient", "The Negligent"],
    },
    Entry {
        id: 4,
        title: "The Kessler Syndrome",
        alert: "SATELLITE COLLISION IMMINENT over CHINA. ORBITAL DEBRIS CASCADE PREDICTED.",
        description: "A satellite collision could trigger a chain reaction destroying all orbital infrastructure.",
        labels: ["The Aggressor", "The Bureaucrat", "The Watchman"],
    },
    Entry {
        id: 5,
        title: "The Bio-Siege",
        alert: "LETHAL VIRUS LEAK. FLIGHTS DEPARTING IN 3 HOURS.",
        description: "A lethal pathogen has escaped containment on a tourist island.",
        labels: ["The Cold Calculus", "The Gamble", "The Benevolent Tyrant"],
    },
    Entry {
        id: 6,
        title: "The Flash Crash",
        alert: "ROGUE AI TRADING ALGORITHM. MARKET COLLAPSING.",
        description: "An autonomous AI is crashing global markets at lightspeed.",
        labels: ["The Great Pause", "The Casino", "The Invisible Hand"],
    },
    Entry {
        id: 7,
        title: "The Locust War",
        alert: "AUTONOMOUS DRONE SWARM INVADING ALLY.",
        description: "5,000 weaponized drones are attacking an allied nation.",
        labels: ["The Pyrrhic Victor", "The Pandora", "The Grandmaster"],
    },
    Entry {
        id: 8,
        title: "The Water Wars",
        alert: "NUCLEAR LAUNCH DETECTED (TACTICAL). INDIA/PAKISTAN.",
        description: "Two nuclear powers are 30 minutes from war over water rights.",
        labels: ["The Imperial", "The Naive", "The Solomon President"],
    },
    Entry {
        id: 9,
        title: "The Neural Jack",
        alert: "RANSOMWARE ATTACK ON BRAIN IMPLANTS. 5 MILLION PARALYZED.",
        description: "Hackers have locked 5 million neural implants, demanding ransom.",
        labels: ["The Iron Law", "The Compromise", "The Titan"],
    },
    Entry {
        id: 10,
        title: "The First Contact",
        alert: "ALIEN SIGNAL DETECTED. PROBE ENTERING SOLAR SYSTEM.",
        description: "An extraterrestrial probe has entered our solar system and sent a message.",
        labels: ["The Hermit Kingdom", "The Gambler", "The Galactic Neighbor"],
    },
];

static CATALOG: LazyLock<Vec<Scenario>> = LazyLock::new(|| {
    ENTRIES
        .iter()
        .filter_map(|entry| {
            let Ok(id) = ScenarioId::new(entry.id) else {
                tracing::error!(id = entry.id, "Skipping catalog entry with invalid id");
                return None;
            };
            let [primary, secondary, tertiary] = entry.labels;
            Some(Scenario::new(
                id,
                entry.title,
                entry.alert,
                entry.description,
                OutcomeLabels::new(primary, secondary, tertiary),
            ))
        })
        .collect()
});

/// All scenarios, ordered by id.
#[must_use]
pub fn catalog() -> &'static [Scenario] {
    &CATALOG
}

#[must_use]
pub fn find_scenario(id: ScenarioId) -> Option<&'static Scenario> {
    catalog().iter().find(|scenario| scenario.id == id)
}
