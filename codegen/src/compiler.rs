use std::fs;
use std::io::Write;
use std::path::Path;

use scenario::registry::{Registry, registry};
use scenario::{Scenario, ScenarioInput};

use crate::config::{CompilerConfig, TestTitle};
use crate::emitter::Emitter;
use crate::error::{CompileError, Unresolved};

const REFERENCE_TYPES: &str = "/// <reference types=\"cypress\" />";

/// A compiled test script plus the warnings raised while producing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileReport {
    pub script: String,
    pub warnings: Vec<Unresolved>,
}

/// Compiles scenarios into test scripts. Holds no per-compilation state, so one
/// compiler can serve any number of independent (or concurrent) compilations.
#[derive(Debug, Clone)]
pub struct Compiler<'r> {
    registry: &'r Registry,
    config: CompilerConfig,
}

impl Compiler<'static> {
    /// A compiler over the process-wide placeholder registry.
    pub fn new(config: CompilerConfig) -> Self {
        Compiler {
            registry: registry(),
            config,
        }
    }
}

impl Default for Compiler<'static> {
    fn default() -> Self {
        Compiler::new(CompilerConfig::default())
    }
}

impl<'r> Compiler<'r> {
    pub fn with_registry(registry: &'r Registry, config: CompilerConfig) -> Self {
        Compiler { registry, config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Check the scenario's structure, then compile it.
    pub fn compile_input(&self, input: ScenarioInput) -> Result<CompileReport, CompileError> {
        let scenario = Scenario::try_from(input)?;
        self.compile(&scenario)
    }

    /// Validate every statement, build the when/then forests and assemble the script.
    pub fn compile(&self, scenario: &Scenario) -> Result<CompileReport, CompileError> {
        scenario.validate(self.registry)?;
        let tree = scenario.build_tree();

        tracing::debug!(
            scenario = tree.name.as_str(),
            when_roots = tree.when.len(),
            then_roots = tree.then.len(),
            "compiling scenario"
        );

        let title = match self.config.test_title {
            TestTitle::Given => tree.given.as_str(),
            TestTitle::Name => tree.name.as_str(),
        };

        let mut emitter = Emitter::new(self.registry, self.config.indent);
        if self.config.reference_types {
            emitter.line(0, REFERENCE_TYPES);
        }
        emitter.line(0, &format!("describe({}, () => {{", js_string(&tree.name)));
        emitter.line(1, &format!("it({}, () => {{", js_string(title)));
        emitter.statement(2, &tree.given);
        emitter.blank_line();
        emitter.forest(2, &tree.when);
        emitter.blank_line();
        emitter.forest(2, &tree.then);
        emitter.line(1, "});");
        emitter.line(0, "});");

        let emitted = emitter.finish();
        Ok(CompileReport {
            script: emitted.text,
            warnings: emitted.unresolved,
        })
    }

    /// Compile and hand the script to `out`. Nothing is written if compilation fails.
    pub fn compile_to<W: Write>(
        &self,
        scenario: &Scenario,
        out: &mut W,
        target: &str,
    ) -> Result<CompileReport, CompileError> {
        let report = self.compile(scenario)?;
        out.write_all(report.script.as_bytes())
            .and_then(|_| out.flush())
            .map_err(|source| CompileError::Io {
                target: target.to_string(),
                source,
            })?;
        Ok(report)
    }

    /// Compile and write the script to `path`, creating parent directories.
    /// Write failures are logged and returned, never raised as a panic.
    pub fn write_spec_file(
        &self,
        scenario: &Scenario,
        path: &Path,
    ) -> Result<CompileReport, CompileError> {
        let report = self.compile(scenario)?;
        let target = path.display().to_string();

        let written = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
            _ => Ok(()),
        }
        .and_then(|_| fs::write(path, report.script.as_bytes()));

        match written {
            Ok(()) => {
                tracing::info!(path = target.as_str(), "spec file written");
                Ok(report)
            }
            Err(source) => {
                tracing::debug!(path = target.as_str(), error = %source, "failed to write spec file");
                Err(CompileError::Io { target, source })
            }
        }
    }
}

/// Compile with the default configuration.
pub fn compile(scenario: &Scenario) -> Result<CompileReport, CompileError> {
    Compiler::default().compile(scenario)
}

/// Quote `text` as a single-quoted JavaScript string literal.
fn js_string(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for c in text.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}
