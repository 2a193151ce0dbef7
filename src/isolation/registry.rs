//! In-process module loader
//!
//! Artifacts export named symbols into a [`RegistryLoader`]. A context built
//! from a classpath sees only the symbols exported by the artifacts on that
//! classpath; when two entries export the same name the earlier entry wins.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use super::BOOTSTRAP_SYMBOL;
use super::context::{IsolationContext, ModuleLoader, Symbol, describe};
use super::launcher::IsolatedLauncher;
use super::scheme;
use crate::archive;
use crate::domain::{ArtifactRef, Classpath};
use crate::error::{Result, symbol_not_found};

/// Symbols exported per artifact
#[derive(Default)]
pub struct RegistryLoader {
    exports: RwLock<HashMap<String, Vec<(String, Symbol)>>>,
}

impl RegistryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Export `symbol` from `artifact`
    pub fn export(&self, artifact: &ArtifactRef, name: impl Into<String>, symbol: Symbol) {
        let name = name.into();
        trace!(artifact = %artifact, symbol = %name, kind = symbol.kind(), "exporting symbol");
        self.exports
            .write()
            .entry(artifact.as_str().to_string())
            .or_default()
            .push((name, symbol));
    }

    /// Export the standard bootstrap from the runner's own artifact
    pub fn export_launcher(&self, runner: &ArtifactRef) {
        self.export(
            runner,
            BOOTSTRAP_SYMBOL,
            Symbol::Bootstrap(IsolatedLauncher::factory()),
        );
    }
}

impl ModuleLoader for RegistryLoader {
    fn create_context(&self, classpath: &Classpath) -> Result<Arc<dyn IsolationContext>> {
        let exports = self.exports.read();
        let mut symbols: HashMap<String, Symbol> = HashMap::new();

        for artifact in classpath {
            scheme::check(artifact)?;
            let Some(exported) = exports.get(artifact.as_str()) else {
                continue;
            };
            for (name, symbol) in exported {
                symbols
                    .entry(name.clone())
                    .or_insert_with(|| symbol.clone());
            }
        }

        debug!(entries = classpath.len(), symbols = symbols.len(), "created isolation context");
        Ok(Arc::new(RegistryContext {
            classpath: classpath.clone(),
            symbols,
        }))
    }
}

struct RegistryContext {
    classpath: Classpath,
    symbols: HashMap<String, Symbol>,
}

impl IsolationContext for RegistryContext {
    fn classpath(&self) -> &Classpath {
        &self.classpath
    }

    fn resolve(&self, symbol: &str) -> Result<Symbol> {
        self.symbols
            .get(symbol)
            .cloned()
            .ok_or_else(|| symbol_not_found(symbol, describe(&self.classpath)))
    }

    fn resource(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let path = path.trim_start_matches('/');
        for entry in &self.classpath {
            let found = if entry.is_directory() && !entry.is_nested() {
                entry
                    .to_path()
                    .map(|dir| dir.join(path))
                    .filter(|file| file.is_file())
                    .map(std::fs::read)
                    .transpose()?
            } else if !entry.is_nested() {
                // Plain archive on disk, readable without the nested handler
                archive::read_bytes(&entry.nested(path)).ok()
            } else {
                let target = match entry.split_nested() {
                    Some((outer, prefix)) if entry.is_directory() => {
                        outer.nested(&format!("{prefix}{path}"))
                    }
                    _ => entry.nested(path),
                };
                scheme::check(&target)?;
                scheme::open(&target).ok()
            };
            if found.is_some() {
                trace!(resource = path, entry = %entry, "resource found");
                return Ok(found);
            }
        }
        Ok(None)
    }
}
