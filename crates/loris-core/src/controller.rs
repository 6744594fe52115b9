//! Run sequencing: authenticate, discover, process, notify, summarize.
//!
//! ```text
//! Idle -> Authenticating -> Discovering -> ProcessingProjects -> Summarizing -> Done
//!                                      \-> Summarizing (nothing discovered)
//! any state -> Fatal (authentication failure)
//! ```

use std::fmt;

use loris_ingest::{DiscoveryFilter, discover_projects};
use loris_model::{CollectionConfig, IngestStats, NotificationKind, Project, ServiceError};
use thiserror::Error;
use tracing::{debug, error, info, info_span, warn};

use crate::journal::ProjectJournal;
use crate::notify::{DispatchSummary, decide_notification, dispatch_notification};
use crate::processor::{ProcessOptions, process_instrument};
use crate::service::{IngestService, Notifier};

/// Lifecycle of one ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Authenticating,
    Discovering,
    ProcessingProjects,
    Summarizing,
    Done,
    Fatal,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Authenticating => "authenticating",
            Self::Discovering => "discovering",
            Self::ProcessingProjects => "processing_projects",
            Self::Summarizing => "summarizing",
            Self::Done => "done",
            Self::Fatal => "fatal",
        };
        f.write_str(name)
    }
}

/// Faults that abort the remaining run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("authentication failed: {0}")]
    Authentication(#[source] ServiceError),
}

/// Scope and mode of a run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub filter: DiscoveryFilter,
    /// Restrict every project to this instrument.
    pub instrument: Option<String>,
    pub dry_run: bool,
    pub verbose: bool,
}

impl RunOptions {
    fn process_options(&self) -> ProcessOptions {
        ProcessOptions {
            dry_run: self.dry_run,
            verbose: self.verbose,
        }
    }
}

/// Notification outcome for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationReport {
    pub kind: NotificationKind,
    pub subject: String,
    /// Nothing is sent in dry-run mode.
    pub dispatched: bool,
    pub delivery: DispatchSummary,
}

/// Everything recorded for one processed project.
#[derive(Debug, Clone)]
pub struct ProjectReport {
    pub collection: String,
    pub project: String,
    pub stats: IngestStats,
    pub notification: NotificationReport,
}

/// Final result of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub projects: Vec<ProjectReport>,
    pub totals: IngestStats,
    pub dry_run: bool,
}

impl RunReport {
    /// 0 when no instrument failed, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.totals.has_failures() { 1 } else { 0 }
    }
}

/// Drives one run against the injected service and notifier.
pub struct RunController<'a, S: ?Sized, N: ?Sized> {
    service: &'a S,
    notifier: &'a N,
    collections: &'a [CollectionConfig],
    options: RunOptions,
    state: RunState,
}

impl<'a, S, N> RunController<'a, S, N>
where
    S: IngestService + ?Sized,
    N: Notifier + ?Sized,
{
    pub fn new(
        service: &'a S,
        notifier: &'a N,
        collections: &'a [CollectionConfig],
        options: RunOptions,
    ) -> Self {
        Self {
            service,
            notifier,
            collections,
            options,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        debug!(from = %self.state, to = %next, "run state change");
        self.state = next;
    }

    /// Execute the run to completion.
    ///
    /// Only authentication failure aborts; every per-instrument problem is
    /// recorded in the returned report.
    pub fn run(&mut self) -> Result<RunReport, RunError> {
        let span = info_span!("run", dry_run = self.options.dry_run);
        let _guard = span.enter();

        self.transition(RunState::Authenticating);
        if let Err(err) = self.service.authenticate() {
            self.transition(RunState::Fatal);
            error!(error = %err, "authentication failed, aborting run");
            return Err(RunError::Authentication(err));
        }
        info!("authenticated with ingestion service");

        self.transition(RunState::Discovering);
        let projects = discover_projects(self.collections, &self.options.filter);
        let mut totals = IngestStats::default();
        let mut reports = Vec::with_capacity(projects.len());

        if projects.is_empty() {
            warn!(
                collection = ?self.options.filter.collection,
                project = ?self.options.filter.project,
                "no projects matched, nothing to ingest"
            );
        } else {
            info!(project_count = projects.len(), "projects discovered");
            self.transition(RunState::ProcessingProjects);
            for project in &projects {
                let report = self.process_project(project);
                totals.absorb(&report.stats);
                reports.push(report);
            }
        }

        self.transition(RunState::Summarizing);
        info!(
            total = totals.total,
            success = totals.success,
            failed = totals.failed,
            skipped = totals.skipped,
            rows_uploaded = totals.rows_uploaded,
            rows_skipped = totals.rows_skipped,
            candidates_created = totals.candidates_created,
            "run complete"
        );
        self.transition(RunState::Done);
        Ok(RunReport {
            projects: reports,
            totals,
            dry_run: self.options.dry_run,
        })
    }

    fn selected_instruments<'p>(&self, project: &'p Project) -> Vec<&'p str> {
        project
            .instruments()
            .iter()
            .map(String::as_str)
            .filter(|name| {
                self.options
                    .instrument
                    .as_deref()
                    .is_none_or(|wanted| wanted == *name)
            })
            .collect()
    }

    fn process_project(&self, project: &Project) -> ProjectReport {
        let span = info_span!(
            "project",
            collection = %project.collection,
            project = %project.name(),
        );
        let _guard = span.enter();

        let mut journal = project.log_path().and_then(|dir| match ProjectJournal::open(dir) {
            Ok(journal) => Some(journal),
            Err(err) => {
                warn!(log_path = %dir.display(), error = %err, "cannot open project journal");
                None
            }
        });
        if let Some(journal) = journal.as_mut() {
            log_journal_error(journal.start(project.name(), self.options.dry_run));
        }

        let instruments = self.selected_instruments(project);
        let mut stats = IngestStats::default();
        if instruments.is_empty() {
            warn!("project has no instruments to process");
        } else {
            info!(instrument_count = instruments.len(), "processing project");
        }

        let process_options = self.options.process_options();
        for instrument in instruments {
            let outcome =
                process_instrument(self.service, project, instrument, process_options, &mut stats);
            stats.record(outcome);
            if let Some(journal) = journal.as_mut() {
                log_journal_error(journal.record_outcome(instrument, outcome));
            }
        }

        info!(
            total = stats.total,
            success = stats.success,
            failed = stats.failed,
            skipped = stats.skipped,
            "project complete"
        );
        if let Some(journal) = journal.as_mut() {
            log_journal_error(journal.finish(&stats));
        }

        let notification = self.notify(project, &stats);
        ProjectReport {
            collection: project.collection.clone(),
            project: project.name().to_string(),
            stats,
            notification,
        }
    }

    fn notify(&self, project: &Project, stats: &IngestStats) -> NotificationReport {
        let decision = decide_notification(project, stats);
        if self.options.dry_run {
            info!(
                subject = %decision.subject,
                recipients = ?decision.recipients,
                "dry run: notification not sent"
            );
            return NotificationReport {
                kind: decision.kind,
                subject: decision.subject,
                dispatched: false,
                delivery: DispatchSummary::default(),
            };
        }
        let delivery = dispatch_notification(self.notifier, &decision);
        NotificationReport {
            kind: decision.kind,
            subject: decision.subject,
            dispatched: true,
            delivery,
        }
    }
}

fn log_journal_error(result: std::io::Result<()>) {
    if let Err(err) = result {
        warn!(error = %err, "failed to write project journal");
    }
}
