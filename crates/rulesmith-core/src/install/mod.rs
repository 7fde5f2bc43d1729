//! Installer
//!
//! Copies compiled artifacts into a scope and keeps the ledger in step:
//!
//! - per-rule modes write one file per rule
//! - aggregate modes record the rule first, then regenerate the shared file
//!   from every record that points at it
//!
//! Ledger and file writes are not transactional. A crash between them can
//! leave either side behind; the next [`Installer::sync`] rewrites missing
//! files and [`Installer::check`] lists records whose file is gone.

mod options;
mod report;

pub use options::{InstallOptions, InstallRoots};
pub use report::{ChangeKind, CheckReport, InstallOutcome, InstallReport, SharedOutcome};

use crate::backup::create_backup;
use crate::compile::CompiledSources;
use crate::ledger::{InstallRecord, Ledger, Scope};
use crate::merged::MergedArtifactManager;
use crate::warning::Warning;
use crate::{Error, Result};
use chrono::Utc;
use rulesmith_fs::io::{read_text_if_exists, remove_file_if_exists, write_text};
use rulesmith_fs::{Error as FsError, NormalizedPath, compute_content_checksum, compute_file_checksum};
use rulesmith_targets::{ModeOutput, ModeSpec, Target, TargetRegistry};
use std::collections::BTreeMap;

/// One (rule, target, mode) to install.
struct Planned<'t> {
    target: &'t Target,
    mode: &'t ModeSpec,
    rule_id: String,
}

type SharedOutputs<'t> = BTreeMap<(String, String), (&'t Target, &'t ModeSpec)>;

pub struct Installer<'a> {
    registry: &'a TargetRegistry,
    /// Slugs install and sync may touch; empty means every registered target
    enabled: Vec<String>,
    sources: CompiledSources,
    ledger_path: NormalizedPath,
    roots: InstallRoots,
}

impl<'a> Installer<'a> {
    pub fn new(
        registry: &'a TargetRegistry,
        sources: CompiledSources,
        ledger_path: impl Into<NormalizedPath>,
        roots: InstallRoots,
    ) -> Self {
        Self {
            registry,
            enabled: Vec::new(),
            sources,
            ledger_path: ledger_path.into(),
            roots,
        }
    }

    /// Restrict install and sync to `slugs`, normally the project's
    /// configured targets. Per-call filters narrow this further.
    pub fn with_enabled_targets<I, S>(mut self, slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enabled = slugs.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_enabled(&self, slug: &str) -> bool {
        self.enabled.is_empty() || self.enabled.iter().any(|s| s == slug)
    }

    /// Targets an install acts on: the options' filter intersected with
    /// the enabled targets.
    fn install_targets(&self, options: &InstallOptions) -> Result<Vec<&'a Target>> {
        let registry: &'a TargetRegistry = self.registry;
        let selected = registry.select(&options.targets)?;
        Ok(selected
            .into_iter()
            .filter(|target| self.is_enabled(&target.slug))
            .collect())
    }

    pub fn ledger_path(&self) -> &NormalizedPath {
        &self.ledger_path
    }

    /// Installed file of `rule_id` in `mode` for the options' scope.
    ///
    /// Aggregate modes ignore `rule_id`: every rule shares one file.
    pub fn output_path(
        &self,
        mode: &ModeSpec,
        rule_id: &str,
        options: &InstallOptions,
    ) -> Result<NormalizedPath> {
        let root = match options.scope {
            Scope::Global => self.roots.global.clone(),
            Scope::Project => options
                .project_path
                .clone()
                .ok_or_else(|| Error::InvalidOptions {
                    message: "project scope requires a project path".to_string(),
                })?,
        };
        Ok(match &mode.output {
            ModeOutput::PerRule { dir, extension } => {
                root.join(dir).join(&format!("{}{}", rule_id, extension))
            }
            ModeOutput::Aggregate {
                project_file,
                global_file,
            } => match options.scope {
                Scope::Project => root.join(project_file),
                Scope::Global => root.join(global_file),
            },
        })
    }

    /// Records matching both filters, across every scope.
    pub fn installed(&self, target: Option<&str>, rule_id: Option<&str>) -> Result<Vec<InstallRecord>> {
        let ledger = Ledger::load(&self.ledger_path)?;
        Ok(ledger.query(target, rule_id).into_iter().cloned().collect())
    }

    /// Install compiled rules into the options' scope.
    pub fn install(&self, rule_ids: &[String], options: &InstallOptions) -> Result<InstallReport> {
        options.validate()?;
        let targets = self.install_targets(options)?;
        let mut report = InstallReport::new(options.dry_run);

        let mut plan = Vec::new();
        for rule_id in rule_ids {
            for &target in &targets {
                let modes: Vec<&ModeSpec> = target
                    .modes()
                    .into_iter()
                    .filter(|mode| self.sources.exists(target, mode, rule_id))
                    .collect();
                if modes.is_empty() {
                    report.warnings.push(Warning::Inconsistency {
                        message: format!(
                            "{} has no compiled artifact for {}; compile it first",
                            rule_id, target.slug
                        ),
                    });
                    continue;
                }
                plan.extend(modes.into_iter().map(|mode| Planned {
                    target,
                    mode,
                    rule_id: rule_id.clone(),
                }));
            }
        }

        self.with_ledger(options.dry_run, |ledger| {
            self.apply_plan(ledger, plan, options, &mut report)
        })?;

        tracing::info!("{}", report.summary());
        Ok(report)
    }

    /// Re-install every record of the options' scope.
    ///
    /// Idempotent: content identical to what is installed is neither
    /// rewritten nor re-recorded.
    pub fn sync(&self, options: &InstallOptions) -> Result<InstallReport> {
        options.validate()?;
        self.registry.select(&options.targets)?;
        let mut report = InstallReport::new(options.dry_run);
        let project_key = options.project_key();

        self.with_ledger(options.dry_run, |ledger| {
            let mut plan = Vec::new();
            for record in ledger.in_scope(options.scope, project_key.as_deref()) {
                if !options.includes_target(&record.target) {
                    continue;
                }
                if !self.is_enabled(&record.target) {
                    tracing::debug!(rule = %record.rule_id, slug = %record.target, "Target not enabled, skipping");
                    continue;
                }
                let Some(target) = self.registry.get(&record.target) else {
                    report.warnings.push(Warning::Inconsistency {
                        message: format!(
                            "{} is recorded for unknown target {}",
                            record.rule_id, record.target
                        ),
                    });
                    continue;
                };
                let Some(mode) = target.mode(&record.mode) else {
                    report.warnings.push(Warning::Inconsistency {
                        message: format!(
                            "{} is recorded for unknown mode {} of {}",
                            record.rule_id, record.mode, record.target
                        ),
                    });
                    continue;
                };
                plan.push(Planned {
                    target,
                    mode,
                    rule_id: record.rule_id.clone(),
                });
            }
            self.apply_plan(ledger, plan, options, &mut report)
        })?;

        tracing::info!("{}", report.summary());
        Ok(report)
    }

    /// Remove rules from the options' scope.
    ///
    /// Per-rule files are deleted; shared files are regenerated from the
    /// remaining records, or deleted when none remain. Records of targets
    /// that are no longer enabled are removed too.
    pub fn uninstall(&self, rule_ids: &[String], options: &InstallOptions) -> Result<InstallReport> {
        options.validate()?;
        self.registry.select(&options.targets)?;
        let mut report = InstallReport::new(options.dry_run);
        let project_key = options.project_key();

        self.with_ledger(options.dry_run, |ledger| {
            let doomed: Vec<InstallRecord> = ledger
                .in_scope(options.scope, project_key.as_deref())
                .into_iter()
                .filter(|r| rule_ids.contains(&r.rule_id) && options.includes_target(&r.target))
                .cloned()
                .collect();
            if doomed.is_empty() {
                tracing::debug!(rules = ?rule_ids, "Nothing recorded to uninstall");
            }

            let mut shared: SharedOutputs<'_> = BTreeMap::new();
            for record in doomed {
                ledger.remove(&record.key());
                let spec = self
                    .registry
                    .get(&record.target)
                    .and_then(|t| t.mode(&record.mode).map(|m| (t, m)));
                match spec {
                    Some((target, mode)) if mode.is_aggregate() => {
                        shared.insert((target.slug.clone(), mode.name.clone()), (target, mode));
                    }
                    _ if options.dry_run => {}
                    _ => {
                        let path = NormalizedPath::new(&record.output_path);
                        if let Err(e) = remove_file_if_exists(&path) {
                            report.warnings.push(Warning::Write {
                                path: record.output_path.clone(),
                                message: e.to_string(),
                            });
                        }
                    }
                }
                report.outcomes.push(InstallOutcome {
                    rule_id: record.rule_id,
                    target: record.target,
                    mode: record.mode,
                    path: record.output_path,
                    change: ChangeKind::Removed,
                });
            }

            for (target, mode) in shared.into_values() {
                self.regenerate(ledger, target, mode, options, &mut report)?;
            }
            Ok(())
        })?;

        tracing::info!("{}", report.summary());
        Ok(report)
    }

    /// Compare the options' scope against the filesystem.
    pub fn check(&self, options: &InstallOptions) -> Result<CheckReport> {
        options.validate()?;
        let ledger = Ledger::load(&self.ledger_path)?;
        let project_key = options.project_key();
        let mut report = CheckReport::default();

        for record in ledger.in_scope(options.scope, project_key.as_deref()) {
            if !options.includes_target(&record.target) {
                continue;
            }
            let aggregate = self
                .registry
                .get(&record.target)
                .and_then(|t| t.mode(&record.mode))
                .is_some_and(ModeSpec::is_aggregate);
            let path = NormalizedPath::new(&record.output_path);
            if !path.is_file() {
                report.missing.push(record.clone());
                continue;
            }
            if !aggregate {
                let checksum = compute_file_checksum(&path.to_native())
                    .map_err(|e| FsError::io(path.to_native(), e))?;
                if checksum != record.checksum {
                    report.modified.push(record.clone());
                    continue;
                }
            }
            report.healthy += 1;
        }

        tracing::info!("{}", report.summary());
        Ok(report)
    }

    /// Run `mutate` under [`Ledger::update`], or against a throwaway copy
    /// when `dry_run` is set.
    fn with_ledger<T, F>(&self, dry_run: bool, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut Ledger) -> Result<T>,
    {
        if dry_run {
            let mut scratch = Ledger::load(&self.ledger_path)?;
            mutate(&mut scratch)
        } else {
            Ledger::update(&self.ledger_path, mutate)
        }
    }

    fn apply_plan<'t>(
        &self,
        ledger: &mut Ledger,
        plan: Vec<Planned<'t>>,
        options: &InstallOptions,
        report: &mut InstallReport,
    ) -> Result<()> {
        let now = Utc::now();
        let project_key = options.project_key();
        let mut shared: SharedOutputs<'t> = BTreeMap::new();

        for item in plan {
            if item.mode.is_aggregate() {
                // Regenerate even when this source is gone so the file drops it
                shared.insert(
                    (item.target.slug.clone(), item.mode.name.clone()),
                    (item.target, item.mode),
                );
            }

            let content = match self.sources.read(item.target, item.mode, &item.rule_id) {
                Ok(Some(content)) => content,
                Ok(None) => {
                    report.warnings.push(Warning::Inconsistency {
                        message: format!(
                            "compiled source of {} for {} {} is missing",
                            item.rule_id, item.target.slug, item.mode.name
                        ),
                    });
                    continue;
                }
                Err(e) => {
                    report.warnings.push(Warning::Inconsistency {
                        message: format!(
                            "compiled source of {} for {} {} is unreadable: {}",
                            item.rule_id, item.target.slug, item.mode.name, e
                        ),
                    });
                    continue;
                }
            };

            let output = self.output_path(item.mode, &item.rule_id, options)?;
            let record = InstallRecord {
                target: item.target.slug.clone(),
                rule_id: item.rule_id.clone(),
                mode: item.mode.name.clone(),
                scope: options.scope,
                project_path: project_key.clone(),
                output_path: output.to_string(),
                checksum: compute_content_checksum(&content),
                installed_at: now,
            };

            let change = if item.mode.is_aggregate() {
                let change = match ledger.get(&record.key()) {
                    None => ChangeKind::NewlyInstalled,
                    Some(existing) if existing.checksum == record.checksum => ChangeKind::Unchanged,
                    Some(_) => ChangeKind::Updated,
                };
                if change.is_change() {
                    ledger.add_or_replace(record);
                }
                change
            } else {
                match self.install_file(ledger, record, &content, options, report) {
                    Some(change) => change,
                    None => continue,
                }
            };

            report.outcomes.push(InstallOutcome {
                rule_id: item.rule_id,
                target: item.target.slug.clone(),
                mode: item.mode.name.clone(),
                path: output.to_string(),
                change,
            });
        }

        for (target, mode) in shared.into_values() {
            self.regenerate(ledger, target, mode, options, report)?;
        }
        Ok(())
    }

    /// Install one per-rule file. `None` when the write failed.
    fn install_file(
        &self,
        ledger: &mut Ledger,
        record: InstallRecord,
        content: &str,
        options: &InstallOptions,
        report: &mut InstallReport,
    ) -> Option<ChangeKind> {
        let path = NormalizedPath::new(&record.output_path);
        let write_warning = |message: String| Warning::Write {
            path: record.output_path.clone(),
            message,
        };

        let installed = match read_text_if_exists(&path) {
            Ok(installed) => installed,
            Err(e) => {
                report.warnings.push(write_warning(e.to_string()));
                return None;
            }
        };

        let change = ChangeKind::classify(installed.as_deref(), content);
        if change.is_change() {
            if !options.dry_run {
                if let Err(e) = self.write_output(&path, content, change, options, report) {
                    report.warnings.push(write_warning(e.to_string()));
                    return None;
                }
            }
            ledger.add_or_replace(record);
        } else if ledger.get(&record.key()).is_none() {
            // Identical file already in place: adopt it
            ledger.add_or_replace(record);
        }
        Some(change)
    }

    /// Rebuild the shared file of `mode` from the ledger.
    fn regenerate(
        &self,
        ledger: &Ledger,
        target: &Target,
        mode: &ModeSpec,
        options: &InstallOptions,
        report: &mut InstallReport,
    ) -> Result<()> {
        let project_key = options.project_key();
        let path = self.output_path(mode, "", options)?;
        let records = ledger.shared_output(&target.slug, &mode.name, options.scope, project_key.as_deref());
        let merged = MergedArtifactManager::new(&self.sources).resolve_merged_file(target, mode, &records);
        report.warnings.extend(merged.warnings);

        let write_warning = |message: String| Warning::Write {
            path: path.to_string(),
            message,
        };
        let installed = match read_text_if_exists(&path) {
            Ok(installed) => installed,
            Err(e) => {
                report.warnings.push(write_warning(e.to_string()));
                return Ok(());
            }
        };

        let change = match &merged.content {
            Some(content) => ChangeKind::classify(installed.as_deref(), content),
            None if installed.is_some() => ChangeKind::Removed,
            None => return Ok(()),
        };

        if change.is_change() && !options.dry_run {
            let result = match &merged.content {
                Some(content) => self.write_output(&path, content, change, options, report),
                None => remove_file_if_exists(&path).map(|_| ()).map_err(Error::from),
            };
            if let Err(e) = result {
                report.warnings.push(write_warning(e.to_string()));
                return Ok(());
            }
        }

        tracing::debug!(path = %path, change = ?change, sections = merged.sections.len(), "Shared file regenerated");
        report.shared.push(SharedOutcome {
            target: target.slug.clone(),
            mode: mode.name.clone(),
            path: path.to_string(),
            change,
            sections: merged.sections,
        });
        Ok(())
    }

    /// Write `content`, backing up a differing file first unless forced.
    fn write_output(
        &self,
        path: &NormalizedPath,
        content: &str,
        change: ChangeKind,
        options: &InstallOptions,
        report: &mut InstallReport,
    ) -> Result<()> {
        if change == ChangeKind::Updated && !options.force {
            let backup = create_backup(path)?;
            report.backups.push(backup.to_string());
        }
        write_text(path, content)?;
        Ok(())
    }
}
