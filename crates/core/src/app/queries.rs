use crate::domain::{Event, ProcessingState, ProgressRecord, Repository};
use crate::error::{CoreError, Result};

/// Read-only projection of run progress for UI consumption.
///
/// Records are indexed by the repository's position in the discovered list,
/// never by the order completions arrive in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressProjection {
    /// Discovered repositories, in discovery order
    pub repositories: Vec<Repository>,

    /// One record per repository, same index as `repositories`
    pub records: Vec<ProgressRecord>,

    /// Whether discovery has delivered the repository list
    pub loaded: bool,

    /// Error that ended the run, if any
    pub fatal: Option<String>,
}

impl ProgressProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an event to update the projection.
    ///
    /// Events that would break the state machine are rejected and leave the
    /// projection untouched.
    pub fn apply(&mut self, event: &Event) -> Result<()> {
        match event {
            Event::Discovered { repos } => {
                if self.loaded {
                    return Err(CoreError::AlreadyLoaded);
                }
                self.repositories = repos.clone();
                self.records = vec![ProgressRecord::default(); repos.len()];
                self.loaded = true;
            }

            Event::Started { index, .. } => {
                self.transition(*index, ProcessingState::InProgress)?;
            }

            Event::Completed {
                index,
                branches,
                errors,
            } => {
                let next = if errors.is_empty() {
                    ProcessingState::Completed
                } else {
                    ProcessingState::Failed
                };
                let record = self.transition(*index, next)?;
                record.deleted_branches = branches.clone();
                record.errors = errors.clone();
            }

            Event::Fatal { error } => {
                self.fatal = Some(error.to_string());
            }
        }
        Ok(())
    }

    fn transition(&mut self, index: usize, next: ProcessingState) -> Result<&mut ProgressRecord> {
        let record = self
            .records
            .get_mut(index)
            .ok_or(CoreError::RepositoryNotFound { index })?;
        if !record.state.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                index,
                from: record.state,
                to: next,
            });
        }
        record.state = next;
        Ok(record)
    }

    pub fn total(&self) -> usize {
        self.repositories.len()
    }

    pub fn count(&self, state: ProcessingState) -> usize {
        self.records.iter().filter(|r| r.state == state).count()
    }

    /// Repositories that reached a terminal state
    pub fn processed_count(&self) -> usize {
        self.records.iter().filter(|r| r.state.is_terminal()).count()
    }

    pub fn total_deleted_branches(&self) -> usize {
        self.records.iter().map(|r| r.deleted_branches.len()).sum()
    }

    /// True once every discovered repository is completed or failed
    pub fn is_finished(&self) -> bool {
        self.loaded && self.records.iter().all(|r| r.state.is_terminal())
    }

    /// Repositories paired with their progress, in discovery order
    pub fn entries(&self) -> impl Iterator<Item = (&Repository, &ProgressRecord)> {
        self.repositories.iter().zip(self.records.iter())
    }
}
