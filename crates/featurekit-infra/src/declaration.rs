//! Hierarchy declaration loading.
//!
//! Reads a TOML or YAML declaration file, registers a [`DeclaredModule`] for
//! each declared module, and links the declared classes parents-first into
//! [`HostClass`] descriptors. Classes may appear in any order in the file;
//! petgraph orders them and detects inheritance cycles.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use thiserror::Error;

use featurekit_core::class::Provision;
use featurekit_core::{HostClass, ModuleCatalog};
use featurekit_types::declaration::{ClassDecl, HierarchyFile};

use crate::module::DeclaredModule;

/// Errors raised while loading a declaration file.
#[derive(Debug, Error)]
pub enum DeclarationError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {origin}: {source}")]
    Toml {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid YAML in {origin}: {source}")]
    Yaml {
        origin: String,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("unsupported declaration file extension: {0} (expected .toml, .yaml or .yml)")]
    UnsupportedFormat(PathBuf),

    #[error("class '{0}' is declared more than once")]
    DuplicateClass(String),

    #[error("class '{class}' extends unknown class '{parent}'")]
    UnknownParent { class: String, parent: String },

    #[error("inheritance cycle detected involving class '{0}'")]
    Cycle(String),

    #[error("class '{class}' provides '{feature}' with unknown module '{module}'")]
    UnknownModule {
        class: String,
        feature: String,
        module: String,
    },
}

/// Declaration file syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationFormat {
    Toml,
    Yaml,
}

impl DeclarationFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, DeclarationError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            _ => Err(DeclarationError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Classes linked from one declaration file, parents before children.
#[derive(Debug)]
pub struct LoadedHierarchy {
    classes: Vec<Arc<HostClass>>,
    index: HashMap<String, usize>,
    catalog: ModuleCatalog,
}

impl LoadedHierarchy {
    pub fn class(&self, name: &str) -> Option<&Arc<HostClass>> {
        self.index.get(name).map(|&i| &self.classes[i])
    }

    /// All classes, every parent ahead of its children.
    pub fn classes(&self) -> &[Arc<HostClass>] {
        &self.classes
    }

    pub fn names(&self) -> Vec<&str> {
        self.classes.iter().map(|c| c.name()).collect()
    }

    pub fn catalog(&self) -> &ModuleCatalog {
        &self.catalog
    }
}

/// Parse declaration text.
pub fn parse_hierarchy(
    content: &str,
    format: DeclarationFormat,
    origin: &str,
) -> Result<HierarchyFile, DeclarationError> {
    match format {
        DeclarationFormat::Toml => toml::from_str(content).map_err(|source| DeclarationError::Toml {
            origin: origin.to_string(),
            source,
        }),
        DeclarationFormat::Yaml => {
            serde_yaml_ng::from_str(content).map_err(|source| DeclarationError::Yaml {
                origin: origin.to_string(),
                source,
            })
        }
    }
}

/// Read, parse, and link a declaration file.
///
/// Modules already in `catalog` take precedence over declared modules of the
/// same name, so compiled modules can back names a file also declares.
pub async fn load_hierarchy(
    path: &Path,
    catalog: ModuleCatalog,
) -> Result<LoadedHierarchy, DeclarationError> {
    let format = DeclarationFormat::from_path(path)?;
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DeclarationError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let file = parse_hierarchy(&content, format, &path.display().to_string())?;
    tracing::debug!(
        path = %path.display(),
        modules = file.modules.len(),
        classes = file.classes.len(),
        "Declaration file parsed"
    );

    build_hierarchy(file, catalog)
}

/// Link a parsed declaration file into class descriptors.
pub fn build_hierarchy(
    file: HierarchyFile,
    mut catalog: ModuleCatalog,
) -> Result<LoadedHierarchy, DeclarationError> {
    for (name, decl) in file.modules {
        if catalog.contains(&name) {
            tracing::debug!(module = %name, "Compiled module shadows declared module");
            continue;
        }
        catalog.register(Arc::new(DeclaredModule::new(name, decl)));
    }

    let order = class_order(&file.classes)?;

    let mut built: HashMap<String, Arc<HostClass>> = HashMap::new();
    let mut classes = Vec::with_capacity(order.len());
    let mut index = HashMap::new();

    for i in order {
        let decl = &file.classes[i];
        let class = build_class(decl, &built, &catalog)?;
        index.insert(decl.name.clone(), classes.len());
        built.insert(decl.name.clone(), Arc::clone(&class));
        classes.push(class);
    }

    Ok(LoadedHierarchy {
        classes,
        index,
        catalog,
    })
}

/// Indices into `classes`, parents before children.
fn class_order(classes: &[ClassDecl]) -> Result<Vec<usize>, DeclarationError> {
    let mut graph = DiGraph::<usize, ()>::new();
    let mut node_indices = HashMap::new();

    for (i, decl) in classes.iter().enumerate() {
        if node_indices.contains_key(decl.name.as_str()) {
            return Err(DeclarationError::DuplicateClass(decl.name.clone()));
        }
        node_indices.insert(decl.name.as_str(), graph.add_node(i));
    }

    for decl in classes {
        let Some(parent) = &decl.extends else {
            continue;
        };
        let parent_idx = node_indices.get(parent.as_str()).ok_or_else(|| {
            DeclarationError::UnknownParent {
                class: decl.name.clone(),
                parent: parent.clone(),
            }
        })?;
        // Edge from parent -> child (child needs parent built first)
        graph.add_edge(*parent_idx, node_indices[decl.name.as_str()], ());
    }

    match toposort(&graph, None) {
        Ok(sorted) => Ok(sorted.into_iter().map(|idx| graph[idx]).collect()),
        Err(cycle) => {
            let class = &classes[graph[cycle.node_id()]];
            Err(DeclarationError::Cycle(class.name.clone()))
        }
    }
}

fn build_class(
    decl: &ClassDecl,
    built: &HashMap<String, Arc<HostClass>>,
    catalog: &ModuleCatalog,
) -> Result<Arc<HostClass>, DeclarationError> {
    let mut builder = HostClass::builder(decl.name.clone());

    if let Some(parent) = &decl.extends {
        // Parents are always built first.
        let parent = built
            .get(parent)
            .ok_or_else(|| DeclarationError::UnknownParent {
                class: decl.name.clone(),
                parent: parent.clone(),
            })?;
        builder = builder.extends(parent);
    }

    for (name, descriptor) in &decl.properties {
        builder = builder.property(name.clone(), descriptor.clone());
    }

    for (feature, provision) in decl.provides.iter() {
        let factory = catalog
            .get(&provision.module)
            .ok_or_else(|| DeclarationError::UnknownModule {
                class: decl.name.clone(),
                feature: feature.clone(),
                module: provision.module.clone(),
            })?;
        builder = builder.provide(
            feature.clone(),
            Provision::new(Arc::clone(factory))
                .with_config(provision.default_config.clone())
                .enabled_by_default(provision.enabled_by_default),
        );
    }

    for (feature, entry) in decl.overrides.iter() {
        builder = builder.override_feature(feature.clone(), entry.clone());
    }

    Ok(builder.build())
}
