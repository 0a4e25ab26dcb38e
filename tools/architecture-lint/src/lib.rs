//! Layer-boundary checks for the client crate.
//!
//! Every file under `client/src/{domain,inbound,outbound}` belongs to the
//! layer named by its first directory. Each layer has a [`Rule`] listing
//! the sibling layers and third-party crates it may not name. The lint
//! parses each file with `syn`, collects every path it mentions (imports
//! and inline paths alike) and reports each forbidden dependency once per
//! file.
//!
//! Run it with `cargo run -p architecture-lint`.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use syn::visit::Visit;
use thiserror::Error;

/// Name the client crate uses for itself in integration-style paths.
const CLIENT_CRATE: &str = "client";

/// A forbidden dependency found in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File path relative to `client/src`.
    pub file: PathBuf,
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}

/// Why a lint run did not pass.
#[derive(Debug, Error)]
pub enum ArchitectureLintError {
    #[error("could not read client sources: {0}")]
    Io(#[from] io::Error),
    #[error("could not lint {}: {message}", file.display())]
    Parse { file: PathBuf, message: String },
    #[error("layer boundaries crossed:\n{}", render_violations(.0))]
    Violations(Vec<Violation>),
}

fn render_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|violation| format!("- {violation}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One in-memory source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    /// Path relative to `client/src`.
    pub file: PathBuf,
    pub contents: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Layer {
    Domain,
    Inbound,
    Outbound,
}

impl Layer {
    const ALL: [Self; 3] = [Self::Domain, Self::Inbound, Self::Outbound];

    const fn dir(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }

    fn named(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|layer| layer.dir() == segment)
    }

    fn of_file(file: &Path) -> Option<Self> {
        let first = file.components().next()?;
        Self::named(first.as_os_str().to_str()?)
    }

    fn rule(self) -> &'static Rule {
        match self {
            Self::Domain => &DOMAIN_RULE,
            Self::Inbound => &INBOUND_RULE,
            Self::Outbound => &OUTBOUND_RULE,
        }
    }
}

/// What a layer may not depend on.
struct Rule {
    layers: &'static [Layer],
    crates: &'static [&'static str],
}

const DOMAIN_RULE: Rule = Rule {
    layers: &[Layer::Inbound, Layer::Outbound],
    crates: &[
        "actix_web",
        "cap_std",
        "clap",
        "color_eyre",
        "ortho_config",
        "reqwest",
        "tracing_subscriber",
    ],
};

const INBOUND_RULE: Rule = Rule {
    layers: &[Layer::Outbound],
    crates: &["actix_web", "cap_std", "reqwest", "tracing_subscriber"],
};

const OUTBOUND_RULE: Rule = Rule {
    layers: &[Layer::Inbound],
    crates: &["clap", "color_eyre", "ortho_config"],
};

/// The thing a path points at, as far as the lint cares.
#[derive(Debug, PartialEq, Eq)]
enum Target<'a> {
    Layer(Layer),
    Crate(&'a str),
}

impl<'a> Target<'a> {
    fn of(segments: &'a [String]) -> Option<Self> {
        let (first, rest) = segments.split_first()?;
        match first.as_str() {
            "crate" | "self" | "super" => rest
                .iter()
                .find(|segment| !matches!(segment.as_str(), "self" | "super"))
                .and_then(|segment| Layer::named(segment))
                .map(Self::Layer),
            CLIENT_CRATE => rest
                .first()
                .and_then(|segment| Layer::named(segment))
                .map(Self::Layer),
            other => Some(Layer::named(other).map_or(Self::Crate(other), Self::Layer)),
        }
    }

    fn forbidden_by(&self, rule: &Rule) -> bool {
        match self {
            Self::Layer(layer) => rule.layers.contains(layer),
            Self::Crate(name) => rule.crates.contains(name),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Layer(layer) => format!("crate::{}", layer.dir()),
            Self::Crate(name) => format!("external crate `{name}`"),
        }
    }
}

/// Lint every layer directory under `client_dir/src`.
pub fn lint_client_sources(client_dir: &Path) -> Result<(), ArchitectureLintError> {
    let src = client_dir.join("src");
    let mut sources = Vec::new();
    for layer in Layer::ALL {
        let root = src.join(layer.dir());
        if root.is_dir() {
            read_tree(&src, &root, &mut sources)?;
        }
    }
    lint_sources(&sources)
}

/// Lint sources that are already in memory.
pub fn lint_sources(sources: &[LintSource]) -> Result<(), ArchitectureLintError> {
    let mut violations = Vec::new();
    for source in sources {
        violations.extend(lint_one(source)?);
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ArchitectureLintError::Violations(violations))
    }
}

fn lint_one(source: &LintSource) -> Result<Vec<Violation>, ArchitectureLintError> {
    let parse_error = |message: String| ArchitectureLintError::Parse {
        file: source.file.clone(),
        message,
    };
    let layer = Layer::of_file(&source.file)
        .ok_or_else(|| parse_error("file is not inside a layer directory".to_owned()))?;
    let ast = syn::parse_file(&source.contents).map_err(|err| parse_error(err.to_string()))?;

    let mut paths = PathCollector::default();
    paths.visit_file(&ast);

    let rule = layer.rule();
    let messages: BTreeSet<String> = paths
        .seen
        .iter()
        .filter_map(|segments| Target::of(segments))
        .filter(|target| target.forbidden_by(rule))
        .map(|target| format!("{} must not depend on {}", layer.dir(), target.describe()))
        .collect();

    Ok(messages
        .into_iter()
        .map(|message| Violation {
            file: source.file.clone(),
            message,
        })
        .collect())
}

/// Every path mentioned in a file, with `use` trees flattened.
#[derive(Default)]
struct PathCollector {
    seen: BTreeSet<Vec<String>>,
}

impl<'ast> Visit<'ast> for PathCollector {
    fn visit_path(&mut self, node: &'ast syn::Path) {
        let segments: Vec<String> = node
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect();
        if !segments.is_empty() {
            self.seen.insert(segments);
        }
        syn::visit::visit_path(self, node);
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        let mut pending = vec![(Vec::new(), &node.tree)];
        while let Some((mut prefix, tree)) = pending.pop() {
            match tree {
                syn::UseTree::Path(path) => {
                    prefix.push(path.ident.to_string());
                    pending.push((prefix, &path.tree));
                }
                syn::UseTree::Name(name) => {
                    prefix.push(name.ident.to_string());
                    self.seen.insert(prefix);
                }
                syn::UseTree::Rename(rename) => {
                    prefix.push(rename.ident.to_string());
                    self.seen.insert(prefix);
                }
                syn::UseTree::Glob(_) => {
                    self.seen.insert(prefix);
                }
                syn::UseTree::Group(group) => {
                    pending.extend(group.items.iter().map(|item| (prefix.clone(), item)));
                }
            }
        }
    }
}

fn read_tree(
    src: &Path,
    dir: &Path,
    sources: &mut Vec<LintSource>,
) -> Result<(), ArchitectureLintError> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            read_tree(src, &path, sources)?;
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            let file = path
                .strip_prefix(src)
                .map_err(|err| ArchitectureLintError::Parse {
                    file: path.clone(),
                    message: err.to_string(),
                })?
                .to_path_buf();
            sources.push(LintSource {
                contents: fs::read_to_string(&path)?,
                file,
            });
        }
    }
    Ok(())
}
