//! Minimal CLI: requests → (applicable kinds | resolved mappings)
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use serde::Deserialize;
use tracing::{info, warn};

use structmap::report::{render_text, MapperReport};
use structmap::{
    applicable_kinds, path_de, resolve_mapper, MapperKind, MapperSignature, MemberAccess,
    ResolveConfig, TypeName, World,
};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// infer the bodies of empty mapper methods from a JSON-described type system
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// list which kinds of mapper each request could generate (cheap)
    Check(CheckOut),
    /// resolve each request into a field / member mapping
    Resolve(ResolveOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON description of the type system
    #[arg(long)]
    world: PathBuf,

    /// One or more request files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct OutputSettings {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    output_settings: OutputSettings,
}

#[derive(clap::Parser, Debug)]
struct ResolveOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    output_settings: OutputSettings,

    /// maximum member hops below each parameter (overrides request config)
    #[arg(long)]
    depth: Option<usize>,

    /// which nested members count as reachable (overrides request config)
    #[arg(long, value_enum)]
    member_access: Option<MemberAccess>,

    /// force one mapper kind instead of the first applicable one
    #[arg(long, value_enum)]
    kind: Option<MapperKind>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

/// One mapper in a request file: the signature plus optional overrides.
#[derive(Debug, Deserialize)]
struct MapperRequest {
    #[serde(flatten)]
    signature: MapperSignature<TypeName>,
    #[serde(default)]
    kind: Option<MapperKind>,
    #[serde(default)]
    config: Option<ResolveConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RequestFile {
    Many(Vec<MapperRequest>),
    One(MapperRequest),
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_world(&self) -> Result<World> {
        let world = World::load(&self.world)
            .with_context(|| format!("failed to load world {}", self.world.display()))?;
        info!(types = world.type_count(), path = %self.world.display(), "world loaded");
        Ok(world)
    }

    fn load_requests(&self) -> Result<Vec<(String, MapperRequest)>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut out = Vec::new();
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read request file {source_path_str}"))?;
            let file: RequestFile = path_de::from_str_with_path(&source)
                .with_context(|| format!("failed to parse request file {source_path_str}"))?;
            match file {
                RequestFile::One(request) => out.push((source_path_str, request)),
                RequestFile::Many(requests) => {
                    out.extend(requests.into_iter().map(|r| (source_path_str.clone(), r)))
                }
            }
        }
        info!(requests = out.len(), "requests loaded");
        Ok(out)
    }
}

impl OutputSettings {
    fn emit(&self, reports: &[MapperReport<TypeName>]) -> Result<()> {
        let rendered = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(reports)?,
            OutputFormat::Text => render_text(reports),
        };
        if let Some(out) = self.out.as_ref() {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, &rendered)
                .with_context(|| format!("failed to write {}", out.display()))?;
        } else {
            println!("{rendered}");
        }
        Ok(())
    }
}

impl ResolveOut {
    fn effective_config(&self, request: &MapperRequest) -> ResolveConfig {
        let mut config = request.config.unwrap_or_default();
        if let Some(depth) = self.depth {
            config = config.with_depth(depth);
        }
        if let Some(member_access) = self.member_access {
            config.member_access = member_access;
        }
        config
    }

    fn resolve_one(&self, world: &World, file: &str, request: &MapperRequest) -> MapperReport<TypeName> {
        let sig = &request.signature;
        let mut report = check_one(world, file, request);
        if report.error.is_some() {
            return report;
        }

        let Some(kind) = self.kind.or(request.kind).or_else(|| report.applicable.first().copied())
        else {
            warn!(mapper = %sig.name, file, "not a mapper candidate; skipped");
            return report;
        };

        match resolve_mapper(world, sig, kind, &self.effective_config(request)) {
            Ok(resolution) => report.resolution = Some(resolution),
            Err(error) => report.error = Some(error.to_string()),
        }
        report
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Check(target) => {
                let world = target.input_settings.load_world()?;
                let requests = target.input_settings.load_requests()?;

                let reports: Vec<_> = requests
                    .iter()
                    .map(|(file, request)| check_one(&world, file, request))
                    .collect();

                target.output_settings.emit(&reports)?;
                bail_on_failures(&reports, "check")
            }
            Command::Resolve(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                let world = target.input_settings.load_world()?;
                let requests = target.input_settings.load_requests()?;

                // each request is an independent resolution
                let reports: Vec<_> = requests
                    .par_iter()
                    .map(|(file, request)| target.resolve_one(&world, file, request))
                    .collect();

                target.output_settings.emit(&reports)?;

                let unresolved: usize = reports.iter().map(MapperReport::unresolved_count).sum();
                info!(mappers = reports.len(), unresolved, "resolution finished");
                bail_on_failures(&reports, "resolve")
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Applicability of one request. A type-system fault lands on the report
/// instead of aborting the run.
fn check_one(world: &World, file: &str, request: &MapperRequest) -> MapperReport<TypeName> {
    let sig = &request.signature;
    let mut report = MapperReport {
        file: file.to_string(),
        mapper: sig.name.clone(),
        applicable: Vec::new(),
        resolution: None,
        error: None,
    };
    match applicable_kinds(world, sig) {
        Ok(kinds) => report.applicable = kinds,
        Err(error) => {
            warn!(mapper = %sig.name, file, %error, "type system fault");
            report.error = Some(error.to_string());
        }
    }
    report
}

fn bail_on_failures(reports: &[MapperReport<TypeName>], verb: &str) -> Result<()> {
    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    if failed > 0 {
        bail!("{failed} mapper(s) failed to {verb}");
    }
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched = glob::glob(pattern)?
                .collect::<Result<Vec<_>, _>>()?;
            if matched.is_empty() {
                // an explicit glob that matched nothing is a mistake, not an empty run
                bail!("glob pattern matched no files: {pattern}");
            }
            matched.sort();
            out.extend(matched);
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
