//! Project facade: wires configuration, targets and paths together

use crate::compile::{CompileReport, CompiledSources, compile};
use crate::install::{InstallRoots, Installer};
use crate::resolver::{OriginRoot, Resolution, SourceResolver};
use crate::Result;
use rulesmith_fs::NormalizedPath;
use rulesmith_meta::ProjectConfig;
use rulesmith_targets::{Target, TargetRegistry};

/// A rulesmith project rooted at one directory.
#[derive(Debug, Clone)]
pub struct Project {
    root: NormalizedPath,
    config: ProjectConfig,
    registry: TargetRegistry,
}

impl Project {
    pub fn new(root: impl Into<NormalizedPath>, config: ProjectConfig) -> Self {
        Self {
            root: root.into(),
            config,
            registry: TargetRegistry::with_builtins(),
        }
    }

    /// Load the project config from `config_path`; a missing file yields
    /// the defaults.
    pub fn load(root: impl Into<NormalizedPath>, config_path: &NormalizedPath) -> Result<Self> {
        let config = ProjectConfig::load(config_path)?;
        Ok(Self::new(root, config))
    }

    pub fn with_registry(mut self, registry: TargetRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    pub fn sources(&self) -> CompiledSources {
        CompiledSources::new(self.config.out_dir(&self.root))
    }

    /// Targets enabled by the config.
    pub fn targets(&self) -> Result<Vec<&Target>> {
        Ok(self.registry.select(&self.config.targets)?)
    }

    /// Resolve sources from `local_root` and the vendor roots the config
    /// includes.
    pub fn resolve(
        &self,
        local_root: impl Into<NormalizedPath>,
        vendors: impl IntoIterator<Item = OriginRoot>,
    ) -> Result<Resolution> {
        let roots = std::iter::once(OriginRoot::local(local_root)).chain(vendors);
        SourceResolver::from_roots(roots)
            .include(&self.config.vendors.include)
            .resolve()
    }

    /// Compile the rules named by `rule_ids` (all when empty) for every
    /// enabled target.
    pub fn compile(&self, resolution: &Resolution, rule_ids: &[String]) -> Result<CompileReport> {
        let rules = resolution.select(rule_ids)?;
        let targets = self.targets()?;
        Ok(compile(resolution, &rules, &targets, &self.sources()))
    }

    pub fn installer(&self, roots: InstallRoots) -> Installer<'_> {
        Installer::new(
            &self.registry,
            self.sources(),
            self.config.ledger_path(&self.root),
            roots,
        )
        .with_enabled_targets(self.config.targets.iter().cloned())
    }
}
