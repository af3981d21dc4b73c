use tracing::debug;

use super::stage::{Stage, StageMachine, Transition};

/// A stage commit scheduled for later. It only applies when the machine is
/// still at `expected_stage` and no transition happened since it was scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferredCommit {
    pub expected_stage: Stage,
    pub generation: u64,
    pub target: Stage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Applied(Transition),
    Superseded,
    Nothing,
}

#[derive(Debug, Clone, Default)]
pub struct DeferredCommits {
    pending: Option<DeferredCommit>,
}

impl DeferredCommits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<DeferredCommit> {
        self.pending
    }

    /// Captures the machine's current stage and generation. Replaces any older commit.
    pub fn schedule(&mut self, machine: &StageMachine, target: Stage) {
        self.pending = Some(DeferredCommit {
            expected_stage: machine.stage(),
            generation: machine.generation(),
            target,
        });
    }

    pub fn fire(&mut self, machine: &mut StageMachine) -> CommitOutcome {
        let Some(commit) = self.pending.take() else {
            return CommitOutcome::Nothing;
        };

        if machine.stage() != commit.expected_stage || machine.generation() != commit.generation {
            debug!(
                expected_stage = ?commit.expected_stage,
                actual_stage = ?machine.stage(),
                scheduled_generation = commit.generation,
                current_generation = machine.generation(),
                "deferred_commit_dropped"
            );
            return CommitOutcome::Superseded;
        }

        match machine.set_stage(commit.target.index() as i64) {
            Some(transition) => CommitOutcome::Applied(transition),
            None => CommitOutcome::Nothing,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Drops a commit captured before `generation`; such a commit can never fire.
    pub fn discard_stale(&mut self, generation: u64) -> bool {
        match self.pending {
            Some(commit) if commit.generation != generation => {
                debug!(
                    scheduled_generation = commit.generation,
                    current_generation = generation,
                    "deferred_commit_discarded"
                );
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_applies_when_nothing_intervened() {
        let mut machine = StageMachine::new();
        let mut commits = DeferredCommits::new();
        machine.trigger_explosion();
        commits.schedule(&machine, Stage::Cosmos);

        let outcome = commits.fire(&mut machine);

        assert!(matches!(outcome, CommitOutcome::Applied(t) if t.to == Stage::Cosmos));
        assert_eq!(machine.stage(), Stage::Cosmos);
        assert!(commits.pending().is_none());
    }

    #[test]
    fn commit_is_dropped_after_user_advanced() {
        let mut machine = StageMachine::new();
        let mut commits = DeferredCommits::new();
        machine.trigger_explosion();
        commits.schedule(&machine, Stage::Cosmos);
        machine.advance();
        machine.advance();

        assert_eq!(commits.fire(&mut machine), CommitOutcome::Superseded);
        assert_eq!(machine.stage(), Stage::Nature);
    }

    #[test]
    fn commit_is_dropped_when_stage_returned_to_origin_in_between() {
        let mut machine = StageMachine::new();
        let mut commits = DeferredCommits::new();
        machine.trigger_explosion();
        commits.schedule(&machine, Stage::Cosmos);
        machine.advance();
        machine.retreat();
        assert_eq!(machine.stage(), Stage::Singularity);

        assert_eq!(commits.fire(&mut machine), CommitOutcome::Superseded);
        assert_eq!(machine.stage(), Stage::Singularity);
        assert!(!machine.is_exploded());
    }

    #[test]
    fn fire_without_schedule_is_a_no_op() {
        let mut machine = StageMachine::new();
        let mut commits = DeferredCommits::new();
        assert_eq!(commits.fire(&mut machine), CommitOutcome::Nothing);
        assert_eq!(machine, StageMachine::new());
    }

    #[test]
    fn cancelled_commit_never_fires() {
        let mut machine = StageMachine::new();
        let mut commits = DeferredCommits::new();
        machine.trigger_explosion();
        commits.schedule(&machine, Stage::Cosmos);
        commits.cancel();

        assert_eq!(commits.fire(&mut machine), CommitOutcome::Nothing);
        assert_eq!(machine.stage(), Stage::Singularity);
    }

    #[test]
    fn stale_commit_is_discarded_and_current_one_kept() {
        let mut machine = StageMachine::new();
        let mut commits = DeferredCommits::new();
        machine.trigger_explosion();
        commits.schedule(&machine, Stage::Cosmos);

        assert!(!commits.discard_stale(machine.generation()));
        assert!(commits.pending().is_some());

        machine.advance();
        assert!(commits.discard_stale(machine.generation()));
        assert_eq!(commits.pending(), None);
    }
}
