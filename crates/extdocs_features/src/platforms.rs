//! Platform inference for API features.
//!
//! An API feature is available on the union of the platforms of the features
//! it depends on. A feature without dependencies is available everywhere. A
//! feature with a dependency that does not exist is left untouched, since it
//! is not reachable on any platform.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::{DependencyRef, FamilyKind, FeatureFamily, FeaturesError, Platform};

/// Supplies the families that dependencies are resolved against.
pub(crate) trait FamilySource {
    fn family(&self, kind: FamilyKind) -> Result<FeatureFamily, FeaturesError>;
}

/// Assigns `platforms` to every feature of `api`.
///
/// API dependencies resolve against `api` itself; a referenced API feature is
/// annotated before it is read. Dependency cycles are broken by reading the
/// feature in the state it had when the cycle was entered.
pub(crate) fn annotate_platforms<S>(
    api: &mut FeatureFamily,
    source: &S,
) -> Result<(), FeaturesError>
where
    S: FamilySource + ?Sized,
{
    let names: Vec<String> = api.keys().cloned().collect();
    let mut pass = AnnotationPass::new(source);
    for name in &names {
        pass.annotate(api, name)?;
    }
    Ok(())
}

struct AnnotationPass<'a, S: ?Sized> {
    source: &'a S,
    manifest: Option<FeatureFamily>,
    permission: Option<FeatureFamily>,
    started: HashSet<String>,
}

/// An API feature whose dependencies are being walked.
struct Pending {
    name: String,
    dependencies: Vec<String>,
    next: usize,
    platforms: BTreeSet<Platform>,
}

impl<'a, S> AnnotationPass<'a, S>
where
    S: FamilySource + ?Sized,
{
    fn new(source: &'a S) -> Self {
        Self {
            source,
            manifest: None,
            permission: None,
            started: HashSet::new(),
        }
    }

    /// Annotates `name` and, first, every API feature it depends on.
    ///
    /// The walk is post-order over an explicit stack, so the depth of an
    /// API dependency chain is bounded by memory rather than the call stack.
    fn annotate(&mut self, api: &mut FeatureFamily, name: &str) -> Result<(), FeaturesError> {
        let mut stack: Vec<Pending> = self.start(api, name).into_iter().collect();

        while let Some(pending) = stack.last_mut() {
            let Some(raw) = pending.dependencies.get(pending.next) else {
                if let Some(done) = stack.pop()
                    && let Some(feature) = api.get_mut(&done.name)
                {
                    feature.platforms = Some(done.platforms);
                }
                continue;
            };
            let dependency: DependencyRef = raw.parse()?;

            if dependency.family == FamilyKind::Api
                && api.contains_key(&dependency.name)
                && !self.started.contains(&dependency.name)
            {
                if let Some(child) = self.start(api, &dependency.name) {
                    stack.push(child);
                }
                continue;
            }

            match self.resolve(api, &dependency)? {
                Some(resolved) => {
                    pending.platforms.extend(resolved);
                    pending.next += 1;
                }
                None => {
                    debug!("Dependency {} of {} does not resolve", dependency, pending.name);
                    stack.pop();
                }
            }
        }

        Ok(())
    }

    /// Marks `name` as started. Returns the walk state if its platforms
    /// depend on other features.
    fn start(&mut self, api: &mut FeatureFamily, name: &str) -> Option<Pending> {
        if !self.started.insert(name.to_string()) {
            return None;
        }

        let feature = api.get_mut(name)?;
        match feature.dependencies.clone() {
            None => {
                feature.platforms = Some(Platform::all());
                None
            }
            Some(dependencies) => Some(Pending {
                name: name.to_string(),
                dependencies,
                next: 0,
                platforms: BTreeSet::new(),
            }),
        }
    }

    /// Returns the platforms of the referenced feature, or `None` if it does
    /// not exist. A started API feature is read in its current state.
    fn resolve(
        &mut self,
        api: &FeatureFamily,
        dependency: &DependencyRef,
    ) -> Result<Option<BTreeSet<Platform>>, FeaturesError> {
        let family = match dependency.family {
            FamilyKind::Api => api,
            FamilyKind::Manifest => self.loaded(FamilyKind::Manifest)?,
            FamilyKind::Permission => self.loaded(FamilyKind::Permission)?,
        };

        Ok(family
            .get(&dependency.name)
            .map(|feature| feature.platforms.clone().unwrap_or_default()))
    }

    fn loaded(&mut self, kind: FamilyKind) -> Result<&FeatureFamily, FeaturesError> {
        let slot = match kind {
            FamilyKind::Manifest => &mut self.manifest,
            _ => &mut self.permission,
        };
        if slot.is_none() {
            *slot = Some(self.source.family(kind)?);
        }
        Ok(slot.get_or_insert_with(FeatureFamily::new))
    }
}
