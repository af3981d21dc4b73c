use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use super::stage::Stage;

macro_rules! factor_ids {
    ($($variant:ident => $key:literal),+ $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum FactorId {
            $($variant),+
        }

        impl FactorId {
            pub const ALL: &'static [FactorId] = &[$(FactorId::$variant),+];

            /// Key used by scene authoring and the command language.
            pub const fn key(self) -> &'static str {
                match self {
                    $(FactorId::$variant => $key),+
                }
            }

            pub fn from_key(key: &str) -> Option<Self> {
                match key {
                    $($key => Some(FactorId::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

factor_ids! {
    Acceleration => "acceleration",
    Gravity => "gravity",
    Sun => "sun",
    Heating => "heating",
    Freezing => "freezing",
    Void => "void",
    Infinity => "infinity",
    Symbiosis => "symbiosis",
    Tides => "tides",
    Moonlight => "moonlight",
    Ocean => "ocean",
    Tectonics => "tectonics",
    Photosynthesis => "photosynthesis",
    Wildlife => "wildlife",
    Migration => "migration",
    Atmosphere => "atmosphere",
    Aurora => "aurora",
    DayNight => "dayNight",
    SunEnergy => "sunEnergy",
    MoonPhase => "moonPhase",
    StarField => "starField",
    Interference => "interference",
    War => "war",
    Progress => "progress",
    Ecology => "ecology",
    Urbanization => "urbanization",
    Trade => "trade",
    Culture => "culture",
    Energy => "energy",
    InterferenceNeuro => "interferenceNeuro",
    Dominanta => "dominanta",
    Abstraction => "abstraction",
    Mutation => "mutation",
}

impl Serialize for FactorId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl std::fmt::Display for FactorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorEntry {
    pub id: FactorId,
    /// Stage whose scene carries the factor.
    pub stage: Stage,
    pub name: &'static str,
    pub reverse_name: &'static str,
    pub description: &'static str,
    pub reverse_description: &'static str,
    pub influence: &'static str,
}

impl FactorEntry {
    pub fn displayed_name(&self, reversed: bool) -> &'static str {
        if reversed {
            self.reverse_name
        } else {
            self.name
        }
    }

    pub fn displayed_description(&self, reversed: bool) -> &'static str {
        if reversed {
            self.reverse_description
        } else {
            self.description
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("factor '{0}' has more than one registry entry")]
    DuplicateEntry(FactorId),
}

#[derive(Debug, Clone)]
pub struct FactorRegistry {
    entries: HashMap<FactorId, FactorEntry>,
}

impl FactorRegistry {
    pub fn from_entries(
        entries: impl IntoIterator<Item = FactorEntry>,
    ) -> Result<Self, RegistryError> {
        let mut by_id = HashMap::new();
        for entry in entries {
            let id = entry.id;
            if by_id.insert(id, entry).is_some() {
                return Err(RegistryError::DuplicateEntry(id));
            }
        }
        Ok(Self { entries: by_id })
    }

    pub fn builtin() -> Self {
        let mut entries = HashMap::with_capacity(BUILTIN_ENTRIES.len());
        for entry in BUILTIN_ENTRIES {
            entries.insert(entry.id, entry.clone());
        }
        Self { entries }
    }

    pub fn lookup(&self, id: FactorId) -> Option<&FactorEntry> {
        self.entries.get(&id)
    }

    pub fn lookup_key(&self, key: &str) -> Option<&FactorEntry> {
        FactorId::from_key(key).and_then(|id| self.lookup(id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn missing_ids(&self) -> Vec<FactorId> {
        FactorId::ALL
            .iter()
            .copied()
            .filter(|id| !self.entries.contains_key(id))
            .collect()
    }

    pub fn ids_for_stage(&self, stage: Stage) -> Vec<FactorId> {
        let mut ids = self
            .entries
            .values()
            .filter(|entry| entry.stage == stage)
            .map(|entry| entry.id)
            .collect::<Vec<_>>();
        ids.sort();
        ids
    }
}

impl Default for FactorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

const fn entry(
    id: FactorId,
    stage: Stage,
    name: &'static str,
    reverse_name: &'static str,
    description: &'static str,
    reverse_description: &'static str,
    influence: &'static str,
) -> FactorEntry {
    FactorEntry {
        id,
        stage,
        name,
        reverse_name,
        description,
        reverse_description,
        influence,
    }
}

static BUILTIN_ENTRIES: &[FactorEntry] = &[
    entry(
        FactorId::Acceleration,
        Stage::Cosmos,
        "Acceleration",
        "Deceleration",
        "Rapid expansion of space, pushing matter apart along every axis.",
        "A gradual halt: space cools down into an entropic collapse.",
        "Dark energy drives the acceleration while mass and gravity resist it.",
    ),
    entry(
        FactorId::Gravity,
        Stage::Cosmos,
        "Gravity",
        "Decay / Repulsion",
        "Matter is pulled together into complex structures: stars, planets, galaxies.",
        "No centers of attraction, only endless chaotic drifting of gas and dust.",
        "The effect comes from mass bending the fabric of spacetime itself.",
    ),
    entry(
        FactorId::Sun,
        Stage::Cosmos,
        "Sun / Radiation",
        "Fading",
        "A fusion reactor feeding the whole solar system with light and heat.",
        "The red giant collapses into a white dwarf. The light fades, orbits freeze.",
        "Hydrogen fuses into helium, releasing the energy that sustains life on 8 planets.",
    ),
    entry(
        FactorId::Heating,
        Stage::Cosmos,
        "Heating",
        "Cooling",
        "Mercury is closest to the Sun. Its surface reaches 430C and a photon storm burns everything away.",
        "The night side of Mercury drops to -180C. An extreme swing within one rotation.",
        "Distance from the star is the main regulator of a planet's heat balance.",
    ),
    entry(
        FactorId::Freezing,
        Stage::Cosmos,
        "Freezing",
        "Thaw",
        "Mars is a red desert on the edge of the habitable zone. Average -63C, CO2 freezes in the polar caps.",
        "Terraforming: melt the CO2 caps and start a greenhouse effect.",
        "The thin Martian atmosphere cannot hold heat, a barrier to colonization.",
    ),
    entry(
        FactorId::Void,
        Stage::Cosmos,
        "Void",
        "Excess",
        "Interstellar void is 99.9% of the Universe. The vacuum boils with virtual particles.",
        "Clusters of matter: star clusters and nebulae, dense cradles of new worlds.",
        "Void and excess of matter are the two poles of cosmic structure.",
    ),
    entry(
        FactorId::Infinity,
        Stage::Cosmos,
        "Infinity",
        "Finiteness",
        "The Universe expands faster than light. The event horizon hides the rest from us.",
        "A closed Universe: a finite volume of space curved back onto itself.",
        "The topology of space decides whether the Universe is finite.",
    ),
    entry(
        FactorId::Symbiosis,
        Stage::Cosmos,
        "Symbiosis",
        "Parasitism",
        "Networked cooperation creating mutual benefit and more complex forms of life.",
        "One-sided draining of resources, exhausting the donor and leading to stagnation.",
        "Evolutionary pressure rewards those who join forces.",
    ),
    entry(
        FactorId::Tides,
        Stage::Cosmos,
        "Tides",
        "Ebb",
        "The Moon's gravity deforms the Earth's shell. Tidal waves sweep the oceans.",
        "Lunar gravity weakens and the waters retreat, exposing the sea floor.",
        "The Moon drifts 3.8 cm further from Earth every year. Tides slow the Earth's rotation.",
    ),
    entry(
        FactorId::Moonlight,
        Stage::Cosmos,
        "Reflection",
        "Absorption",
        "The Moon reflects 12% of sunlight back onto the Earth.",
        "The dark side of the Moon swallows the light completely. Absolute darkness.",
        "The lunar cycle is synchronized with biological rhythms.",
    ),
    entry(
        FactorId::Ocean,
        Stage::Nature,
        "Ocean",
        "Drought",
        "The world ocean covers 71% of the Earth. Cradle of life, climate regulator, oxygen store.",
        "Evaporation without renewal. Seas grow shallow, the floor cracks, life retreats to the poles.",
        "Water is the ideal solvent. Without a liquid phase the chemistry of life is impossible.",
    ),
    entry(
        FactorId::Tectonics,
        Stage::Nature,
        "Continental drift",
        "Earthquakes",
        "Lithospheric plates slide over the hot mantle, colliding and raising mountain ranges.",
        "A sudden release of stress: cracks tear the land apart and reshape it in seconds.",
        "Plate motion renews the surface and regulates the carbon cycle over millions of years.",
    ),
    entry(
        FactorId::Photosynthesis,
        Stage::Nature,
        "Photosynthesis",
        "Withering",
        "Chlorophyll captures photons and turns CO2 and water into sugars and oxygen.",
        "Without light chlorophyll decays: forests turn brown, the oxygen atmosphere thins.",
        "The foundation of the food chain and the main source of Earth's oxygen.",
    ),
    entry(
        FactorId::Wildlife,
        Stage::Nature,
        "Biosphere",
        "Extinction",
        "An ecosystem from microorganisms to large predators. Food chains hold the balance.",
        "Food chains break. Species vanish faster than they appear. Silence where life used to be.",
        "Biodiversity buffers an ecosystem against external shocks.",
    ),
    entry(
        FactorId::Migration,
        Stage::Nature,
        "Migration",
        "Dispersion",
        "Thousands of species follow ancient routes, carrying seeds and balancing ecosystems.",
        "Flocks fall apart. The navigation instinct is lost. Aimless wandering.",
        "Mass migrations formed over millions of years under climate and magnetic pressure.",
    ),
    entry(
        FactorId::Atmosphere,
        Stage::Nature,
        "Atmosphere",
        "Desertification",
        "The gas envelope shields from radiation, keeps the heat and carries clouds across continents.",
        "The atmosphere loses moisture. Winds carry dust. Green belts become deserts.",
        "The composition of the atmosphere changed three times, each time restarting evolution.",
    ),
    entry(
        FactorId::Aurora,
        Stage::Nature,
        "Aurora",
        "Fading",
        "Solar wind meets the magnetic field and lights up the ions of the polar sky.",
        "The magnetic field weakens. Solar wind strips away the upper atmosphere.",
        "The magnetic field is an invisible shield; without it Earth would become Mars.",
    ),
    entry(
        FactorId::DayNight,
        Stage::Nature,
        "Day",
        "Night",
        "Daily rotation creates a rhythm of light and dark that every living thing obeys.",
        "Darkness wakes nocturnal predators, slows metabolism and starts recovery.",
        "Circadian rhythms have been encoded in complex genomes for 700 million years.",
    ),
    entry(
        FactorId::SunEnergy,
        Stage::Nature,
        "Solar energy",
        "Dying Sun",
        "The reactor at the center of the system burns 600 million tons of hydrogen every second.",
        "The red giant swells and swallows the inner planets. Then a white dwarf and silence.",
        "In 5 billion years the Sun runs out of hydrogen. Until then, life has time.",
    ),
    entry(
        FactorId::MoonPhase,
        Stage::Nature,
        "Moon",
        "Darkness",
        "The nearest satellite stabilizes Earth's axis, raises tides and lights the night.",
        "New moon. The dark side absorbs the light. Marine life loses its bearings.",
        "Without the Moon the Earth's axis would wobble chaotically and climate would be unpredictable.",
    ),
    entry(
        FactorId::StarField,
        Stage::Nature,
        "Starry sky",
        "Light haze",
        "The night sky maps 400 billion stars of our galaxy, a guide for sailors and migrations.",
        "City lights drown the stars. 80% of humanity has never seen the Milky Way.",
        "Watching the stars gave birth to astronomy, navigation and philosophy everywhere.",
    ),
    entry(
        FactorId::Interference,
        Stage::Nature,
        "Interference",
        "Isolation",
        "Wave fields interact: reinforcement at nodes, cancellation at antinodes.",
        "Every field exists alone. Without interaction there is no structure, only noise.",
        "Quantum interference underlies chemical bonds and the work of enzymes.",
    ),
    entry(
        FactorId::War,
        Stage::Civilization,
        "War",
        "Peace / Integration",
        "A radical, destructive tool for redistributing scarce resources between groups.",
        "A long process of building shared values and exchanging resources safely.",
        "Triggered by critical scarcity or existential fear in a population.",
    ),
    entry(
        FactorId::Progress,
        Stage::Civilization,
        "Technological progress",
        "Stagnation / Regress",
        "Exponential growth of tools: from the stone axe to quantum computers.",
        "Ruins of past eras overgrow. Knowledge is lost. Civilization rolls back.",
        "Each generation builds on the last, the main engine of human exceptionalism.",
    ),
    entry(
        FactorId::Ecology,
        Stage::Civilization,
        "Industrialization",
        "Ecological balance",
        "Energy of coal, oil and the atom feeds megacities and factories at any cost.",
        "Cities blend into the landscape. Renewables replace fossil fuel.",
        "Industrial CO2 changes the climate of the whole planet, a geological human footprint.",
    ),
    entry(
        FactorId::Urbanization,
        Stage::Civilization,
        "Urbanization",
        "Urban decline",
        "Megacities pull in the population. 56% of people live in cities, 68% by 2050.",
        "Cities empty out. Nature reclaims the streets. Civilization splits into isolated communities.",
        "Concentrated people exchange ideas faster; cities produce outsized innovation.",
    ),
    entry(
        FactorId::Trade,
        Stage::Civilization,
        "Trade",
        "Isolationism",
        "Goods, ideas and cultures flow along trade routes, joining civilizations into one network.",
        "Closed borders. Technology and culture develop alone, slower and more uniform.",
        "The Silk Road, spices, gunpowder and paper all spread through trade networks.",
    ),
    entry(
        FactorId::Culture,
        Stage::Civilization,
        "Culture",
        "Barbarism",
        "The accumulated memory of civilization: art, language, rituals passed on without genes.",
        "Cultural continuity breaks. Without memory every generation starts from zero.",
        "Cultural evolution is thousands of times faster than biological adaptation.",
    ),
    entry(
        FactorId::Energy,
        Stage::Civilization,
        "Energy",
        "Energy depletion",
        "Cheap energy underlies every civilization. Each leap in energy opens a new era.",
        "Resources run dry. Factories, cities and networks stop. Back to manual labor.",
        "Moving from biomass to coal raised productivity tenfold. Each transition gives more.",
    ),
    entry(
        FactorId::InterferenceNeuro,
        Stage::Micro,
        "Neuro-interference",
        "Neuro-isolation",
        "Neural waves overlap into complex patterns of consciousness: thoughts, images, feelings.",
        "Neurons stop talking. Consciousness fragments and loses coherence.",
        "The basis of transitions in synapses and of complex cognitive structures.",
    ),
    entry(
        FactorId::Dominanta,
        Stage::Micro,
        "Dominant focus",
        "Distraction",
        "A persistent focus of excitation in the neural network that subordinates other impulses.",
        "Equal noise from every signal, never letting energy focus.",
        "Formed under strong biological or psychological needs.",
    ),
    entry(
        FactorId::Abstraction,
        Stage::Micro,
        "Abstraction",
        "Literalness",
        "The ability of intellect to detach properties of objects from their literal form.",
        "Thought is tied strictly to the present sensory reality, here and now.",
        "Arose with the cortex to solve complex multi-step problems.",
    ),
    entry(
        FactorId::Mutation,
        Stage::Micro,
        "Mutation",
        "Stagnation (bio)",
        "A random change of the genetic code, giving rise to new forms and traits.",
        "Genetic immutability: the population loses the ability to adapt.",
        "DNA copying errors are the engine of evolution.",
    ),
];
