//! Effective-model construction
//!
//! The inheritance engine behind the `ModelBuilder` boundary: parses a root
//! descriptor, resolves its parent chain through a directory-scoped
//! resolver, merges ancestor-first, and interpolates `${property}`
//! references with a bounded pass count.

use crate::descriptor::{EffectiveModel, PluginDecl, PluginKey, RawDescriptor};
use crate::error::{DescantError, DescantResult};
use crate::resolver::DescriptorResolver;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Maximum parent-chain length before the build is aborted
pub const MAX_PARENT_DEPTH: usize = 32;

/// Maximum `${...}` substitution passes before giving up on nested values
const MAX_INTERPOLATION_PASSES: usize = 10;

/// Validation strictness applied while building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationLevel {
    /// Tolerate unresolved property references, leaving them literal
    #[default]
    Minimal,

    /// Error on property references that cannot be resolved
    Strict,
}

/// One effective-model build request
pub struct ModelBuildRequest<'a> {
    /// The root descriptor file to build
    pub descriptor_path: &'a Path,

    /// Resolver scoped to the root descriptor's own directory
    pub resolver: DescriptorResolver,

    /// System-wide property values; take precedence over descriptor
    /// properties during interpolation
    pub system_properties: &'a BTreeMap<String, String>,

    /// Validation strictness
    pub validation: ValidationLevel,

    /// Whether to extract plugin declarations into the model
    pub process_plugins: bool,
}

/// The boundary to the inheritance engine.
///
/// Every call is potentially slow (remote parent resolution) and
/// potentially failing; callers treat each invocation accordingly.
pub trait ModelBuilder: Send + Sync {
    /// Build the effective model for one descriptor file
    fn build(&self, request: ModelBuildRequest<'_>) -> DescantResult<EffectiveModel>;
}

/// Default inheritance engine
#[derive(Debug, Default)]
pub struct DescriptorModelBuilder;

impl ModelBuilder for DescriptorModelBuilder {
    fn build(&self, request: ModelBuildRequest<'_>) -> DescantResult<EffectiveModel> {
        let root = RawDescriptor::from_file(request.descriptor_path)?;
        let chain = collect_parent_chain(root, &request)?;
        debug!(
            "Merging {} descriptor(s) for {}",
            chain.len(),
            request.descriptor_path.display()
        );
        merge_and_interpolate(&chain, &request)
    }
}

/// Walk the parent chain through the resolver, root first.
///
/// Every resolved source is parseable by construction (unresolvable parents
/// arrive as synthetic placeholders without parents of their own), so the
/// chain always terminates unless it exceeds the depth cap.
fn collect_parent_chain(
    root: RawDescriptor,
    request: &ModelBuildRequest<'_>,
) -> DescantResult<Vec<RawDescriptor>> {
    let mut next_parent = root.project.parent.clone();
    let mut chain = vec![root];

    while let Some(parent_ref) = next_parent {
        if chain.len() >= MAX_PARENT_DEPTH {
            return Err(DescantError::ParentChainTooDeep {
                coordinate: parent_ref.coordinate().to_string(),
                max: MAX_PARENT_DEPTH,
            });
        }

        let source = request.resolver.resolve(&parent_ref.coordinate())?;
        let content = source.read()?;
        let parent = RawDescriptor::parse(&content, &source.location())?;

        next_parent = parent.project.parent.clone();
        chain.push(parent);
    }

    Ok(chain)
}

/// Merge the chain ancestor-first and interpolate the result.
///
/// `chain[0]` is the requesting descriptor; later entries are progressively
/// more ancestral. Child values win; plugins merge keyed by
/// `group:artifact`.
fn merge_and_interpolate(
    chain: &[RawDescriptor],
    request: &ModelBuildRequest<'_>,
) -> DescantResult<EffectiveModel> {
    let mut properties: BTreeMap<String, String> = BTreeMap::new();
    let mut plugins: BTreeMap<PluginKey, PluginDecl> = BTreeMap::new();
    let mut plugin_management: BTreeMap<PluginKey, PluginDecl> = BTreeMap::new();
    let mut group: Option<String> = None;
    let mut version: Option<String> = None;

    for descriptor in chain.iter().rev() {
        if let Some(g) = &descriptor.project.group {
            group = Some(g.clone());
        }
        if let Some(v) = &descriptor.project.version {
            version = Some(v.clone());
        }
        properties.extend(
            descriptor
                .properties
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        for plugin in &descriptor.build.plugins {
            plugins.insert(plugin.key(), plugin.clone());
        }
        for plugin in &descriptor.build.plugin_management {
            plugin_management.insert(plugin.key(), plugin.clone());
        }
    }

    let child = &chain[0];
    let path = request.descriptor_path;
    let group = group.ok_or_else(|| DescantError::ModelBuild {
        path: path.to_path_buf(),
        reason: "no group declared or inherited".to_string(),
    })?;
    let version = version.ok_or_else(|| DescantError::ModelBuild {
        path: path.to_path_buf(),
        reason: "no version declared or inherited".to_string(),
    })?;
    // Packaging is not inherited; each component declares its own kind
    let packaging = child
        .project
        .packaging
        .clone()
        .unwrap_or_else(|| "lib".to_string());

    // System properties override descriptor properties
    properties.extend(
        request
            .system_properties
            .iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );

    let group = interpolate(&group, &properties);
    let version = interpolate(&version, &properties);
    let packaging = interpolate(&packaging, &properties);

    // Coordinate built-ins become available to plugin fields
    properties.insert("project.group".to_string(), group.clone());
    properties.insert("project.artifact".to_string(), child.project.artifact.clone());
    properties.insert("project.version".to_string(), version.clone());

    let model = EffectiveModel {
        group,
        artifact: child.project.artifact.clone(),
        version,
        packaging,
        plugins: interpolate_plugins(plugins.into_values(), &properties),
        plugin_management: interpolate_plugins(plugin_management.into_values(), &properties),
    };

    if request.validation == ValidationLevel::Strict {
        check_fully_interpolated(&model, path)?;
    }

    if request.process_plugins {
        Ok(model)
    } else {
        Ok(EffectiveModel {
            plugins: Vec::new(),
            plugin_management: Vec::new(),
            ..model
        })
    }
}

fn interpolate_plugins(
    declarations: impl Iterator<Item = PluginDecl>,
    properties: &BTreeMap<String, String>,
) -> Vec<PluginKey> {
    let mut keys: Vec<PluginKey> = declarations
        .map(|decl| {
            PluginKey::new(
                interpolate(&decl.group, properties),
                interpolate(&decl.artifact, properties),
            )
        })
        .collect();
    // Interpolation may collapse declarations onto the same key
    keys.sort();
    keys.dedup();
    keys
}

fn check_fully_interpolated(model: &EffectiveModel, path: &Path) -> DescantResult<()> {
    let unresolved = |value: &str| value.contains("${");
    let leftover = unresolved(&model.group)
        || unresolved(&model.version)
        || unresolved(&model.packaging)
        || model
            .plugins
            .iter()
            .chain(model.plugin_management.iter())
            .any(|key| unresolved(&key.group) || unresolved(&key.artifact));
    if leftover {
        return Err(DescantError::ModelBuild {
            path: path.to_path_buf(),
            reason: "unresolved property references remain".to_string(),
        });
    }
    Ok(())
}

/// Substitute `${key}` references until the value stabilizes or the pass
/// bound is reached. Unknown keys are left literal.
pub fn interpolate(value: &str, properties: &BTreeMap<String, String>) -> String {
    let mut current = value.to_string();
    for _ in 0..MAX_INTERPOLATION_PASSES {
        let next = substitute_once(&current, properties);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn substitute_once(value: &str, properties: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match properties.get(key) {
                    Some(replacement) => out.push_str(replacement),
                    None => {
                        out.push_str("${");
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                // Unterminated reference; keep the tail as-is
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}
