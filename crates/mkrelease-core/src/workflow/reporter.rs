//! Release progress reporting

use std::sync::{Arc, Mutex};

use crate::types::{ReleaseSummary, TagOutcome};

use super::ReleaseStep;

/// Events emitted while the pipeline runs
#[derive(Debug, Clone)]
pub enum ReleaseEvent {
    /// A step is starting
    StepStarted { step: ReleaseStep },
    /// An archive was hashed
    Checksum { file_name: String, checksum: String },
    /// The formula update was committed and pushed
    Committed { commit: String },
    /// The release tag was pushed
    Tagged { tag: String, outcome: TagOutcome },
    /// The GitHub release was created
    ReleaseCreated { tag: String, id: u64 },
    /// An archive was uploaded
    AssetUploaded { file_name: String, bytes: u64 },
    /// The deploy command finished
    Deployed { command: String },
    /// A step failed and the pipeline stopped
    Failed { step: ReleaseStep, error: String },
    /// Every step succeeded
    Completed { summary: ReleaseSummary },
}

/// Trait for reporting release progress
pub trait ReleaseReporter: Send + Sync {
    /// Handle a release event
    fn report(&self, event: &ReleaseEvent);
}

/// Reporter that logs to tracing
#[derive(Debug, Default)]
pub struct TracingReporter;

impl ReleaseReporter for TracingReporter {
    fn report(&self, event: &ReleaseEvent) {
        match event {
            ReleaseEvent::StepStarted { step } => {
                tracing::info!(step = ?step, "{}", step.label());
            }
            ReleaseEvent::Checksum {
                file_name,
                checksum,
            } => {
                tracing::info!("SHA256 ({}) = {}", file_name, checksum);
            }
            ReleaseEvent::Committed { commit } => {
                tracing::info!("Committed formula update with SHA: {}", commit);
            }
            ReleaseEvent::Tagged { tag, outcome } => match outcome {
                TagOutcome::Created => tracing::info!("Created and pushed tag {}", tag),
                TagOutcome::AlreadyExists => {
                    tracing::info!("Tag {} already exists, pushed existing tag", tag)
                }
            },
            ReleaseEvent::ReleaseCreated { tag, id } => {
                tracing::info!("Created release {} (id {})", tag, id);
            }
            ReleaseEvent::AssetUploaded { file_name, bytes } => {
                tracing::info!("Uploaded {} ({} bytes)", file_name, bytes);
            }
            ReleaseEvent::Deployed { command } => {
                tracing::info!("Deploy command `{}` succeeded", command);
            }
            ReleaseEvent::Failed { step, error } => {
                tracing::error!(step = ?step, "{}", error);
            }
            ReleaseEvent::Completed { summary } => {
                tracing::info!(
                    "Successfully created release {} with all assets",
                    summary.tag
                );
            }
        }
    }
}

/// Reporter that collects events for later inspection (useful for testing)
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<ReleaseEvent>>,
}

impl CollectingReporter {
    /// Get all collected events
    pub fn events(&self) -> Vec<ReleaseEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Steps that were started, in order
    pub fn started_steps(&self) -> Vec<ReleaseStep> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ReleaseEvent::StepStarted { step } => Some(step),
                _ => None,
            })
            .collect()
    }
}

impl ReleaseReporter for CollectingReporter {
    fn report(&self, event: &ReleaseEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

impl<R: ReleaseReporter + ?Sized> ReleaseReporter for Arc<R> {
    fn report(&self, event: &ReleaseEvent) {
        (**self).report(event);
    }
}

/// Fan-out to several reporters
pub struct ReporterRegistry {
    reporters: Vec<Arc<dyn ReleaseReporter>>,
}

impl ReporterRegistry {
    /// Registry that logs every event through [`TracingReporter`]
    pub fn new() -> Self {
        Self {
            reporters: vec![Arc::new(TracingReporter)],
        }
    }

    /// Add a reporter; events reach reporters in registration order
    pub fn register<R: ReleaseReporter + 'static>(&mut self, reporter: R) {
        self.reporters.push(Arc::new(reporter));
    }
}

impl Default for ReporterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ReleaseReporter for ReporterRegistry {
    fn report(&self, event: &ReleaseEvent) {
        for reporter in &self.reporters {
            reporter.report(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_reporter() {
        let reporter = CollectingReporter::default();
        reporter.report(&ReleaseEvent::StepStarted {
            step: ReleaseStep::Download,
        });
        reporter.report(&ReleaseEvent::Committed {
            commit: "abc123".to_string(),
        });
        reporter.report(&ReleaseEvent::StepStarted {
            step: ReleaseStep::Tag,
        });

        assert_eq!(reporter.events().len(), 3);
        assert_eq!(
            reporter.started_steps(),
            vec![ReleaseStep::Download, ReleaseStep::Tag]
        );
    }

    #[test]
    fn test_registry_broadcasts() {
        let first = Arc::new(CollectingReporter::default());
        let second = Arc::new(CollectingReporter::default());
        let mut registry = ReporterRegistry::new();
        registry.register(first.clone());
        registry.register(second.clone());

        registry.report(&ReleaseEvent::Deployed {
            command: "true".to_string(),
        });

        assert_eq!(first.events().len(), 1);
        assert_eq!(second.events().len(), 1);
    }

    #[test]
    fn test_tracing_reporter() {
        let reporter = TracingReporter;
        reporter.report(&ReleaseEvent::Tagged {
            tag: "v1.2.3".to_string(),
            outcome: TagOutcome::AlreadyExists,
        });
    }
}
