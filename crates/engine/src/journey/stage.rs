use serde::Serialize;

use super::factors::FactorId;

pub const STAGE_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Singularity,
    Cosmos,
    Nature,
    Civilization,
    Micro,
}

impl Stage {
    pub const ALL: [Stage; STAGE_COUNT] = [
        Stage::Singularity,
        Stage::Cosmos,
        Stage::Nature,
        Stage::Civilization,
        Stage::Micro,
    ];

    pub const DEEPEST: Stage = Stage::Micro;

    /// Out-of-range requests clamp to the nearest valid stage.
    pub fn from_index_clamped(index: i64) -> Self {
        let clamped = index.clamp(0, (STAGE_COUNT - 1) as i64) as usize;
        Self::ALL[clamped]
    }

    pub const fn index(self) -> usize {
        match self {
            Stage::Singularity => 0,
            Stage::Cosmos => 1,
            Stage::Nature => 2,
            Stage::Civilization => 3,
            Stage::Micro => 4,
        }
    }

    pub fn next(self) -> Self {
        Self::from_index_clamped(self.index() as i64 + 1)
    }

    pub fn prev(self) -> Self {
        Self::from_index_clamped(self.index() as i64 - 1)
    }

    pub fn title(self) -> &'static str {
        match self {
            Stage::Singularity => "Singularity",
            Stage::Cosmos => "Macrocosm",
            Stage::Nature => "Meso level 1: Nature and Elements",
            Stage::Civilization => "Meso level 2: Society and Civilization",
            Stage::Micro => "Micro level: Birth of Consciousness",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            Stage::Singularity => "Scroll down to start",
            Stage::Cosmos => "Orbit the camera, click objects. Keep scrolling.",
            Stage::Nature => "Oceans and continents. Turn the planet and study its factors.",
            Stage::Civilization => "Eras of the megacity. Progress, ecology and conflict.",
            Stage::Micro => "Inside cells and synapses. Scroll up to return, Enter to restart.",
        }
    }
}

/// Record of one state-changing call on the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Stage,
    pub to: Stage,
    /// The exploded flag went false -> true during this call.
    pub ignited: bool,
    /// The exploded flag went true -> false during this call.
    pub rearmed: bool,
    pub generation: u64,
}

impl Transition {
    pub fn stage_changed(&self) -> bool {
        self.from != self.to
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageMachine {
    stage: Stage,
    exploded: bool,
    active_factor: Option<FactorId>,
    generation: u64,
}

impl StageMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_exploded(&self) -> bool {
        self.exploded
    }

    pub fn active_factor(&self) -> Option<FactorId> {
        self.active_factor
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_active_factor(&mut self, factor: FactorId) {
        self.active_factor = Some(factor);
    }

    pub fn clear_active_factor(&mut self) {
        self.active_factor = None;
    }

    /// Returns `Some` only on the false -> true edge; repeated calls leave state untouched.
    pub fn trigger_explosion(&mut self) -> Option<Transition> {
        if self.exploded {
            return None;
        }
        self.exploded = true;
        Some(self.commit(self.stage, true, false))
    }

    pub fn advance(&mut self) -> Option<Transition> {
        if self.stage == Stage::Singularity && !self.exploded {
            return self.trigger_explosion();
        }

        let from = self.stage;
        self.stage = from.next();
        self.exploded = true;
        self.active_factor = None;
        if from == self.stage {
            return None;
        }
        Some(self.commit(from, false, false))
    }

    pub fn retreat(&mut self) -> Option<Transition> {
        let from = self.stage;
        self.stage = from.prev();
        self.active_factor = None;
        if from == self.stage {
            return None;
        }

        let rearmed = self.stage == Stage::Singularity && self.exploded;
        if rearmed {
            self.exploded = false;
        }
        Some(self.commit(from, false, rearmed))
    }

    pub fn set_stage(&mut self, index: i64) -> Option<Transition> {
        let from = self.stage;
        let to = Stage::from_index_clamped(index);
        if from == to {
            return None;
        }

        let ignited = to != Stage::Singularity && !self.exploded;
        self.stage = to;
        if ignited {
            self.exploded = true;
        }
        self.active_factor = None;
        Some(self.commit(from, ignited, false))
    }

    fn commit(&mut self, from: Stage, ignited: bool, rearmed: bool) -> Transition {
        self.generation = self.generation.wrapping_add(1);
        Transition {
            from,
            to: self.stage,
            ignited,
            rearmed,
            generation: self.generation,
        }
    }
}
