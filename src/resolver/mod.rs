//! Dependent-concept resolution
//!
//! Adding a concept to a dictionary is only useful if every concept it depends on
//! comes along: the answers of a question, the members of a set. Those dependencies
//! are expressed as mappings from the concept to other concepts of the same source,
//! and they chain. [`DependentConceptResolver`] computes the transitive closure of
//! internal mappings starting from a set of seed identifiers.
//!
//! # Algorithm
//!
//! Breadth-first traversal with an explicit worklist and a visited set:
//!
//! 1. Seeds are normalised and marked visited, so they never appear in the result
//! 2. For each concept popped from the worklist every page of its outbound mappings
//!    is fetched
//! 3. Each mapping passing the dependency filter whose target has not been visited
//!    yet adds the target to the result and to the worklist
//!
//! Cycles (`A -> B -> A`), diamonds (`A -> C`, `B -> C`) and self-loops all terminate
//! because a concept is expanded at most once.
//!
//! # Failures
//!
//! A failed mapping fetch does not abort resolution. It is logged, reported through
//! the progress callback and recorded in [`ResolvedReferences::failures`]; only the
//! failing concept's own subtree is skipped.

mod concept_ids;

use std::collections::{HashSet, VecDeque};
use tracing::{debug, warn};

use crate::api::{ApiMapping, ResourceApi, concept_url, types::ensure_trailing_slash};
use crate::config::GlobalConfig;
use crate::core::OclError;

pub use concept_ids::{concept_id_from_url, normalize_ids, parse_concept_ids};

/// Which mappings count as dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Source whose concepts are being resolved; mappings into other sources are ignored
    pub source_url: String,
    /// Map types that make a target a dependency; empty accepts every map type
    pub map_types: Vec<String>,
    pub include_retired: bool,
}

impl ResolverOptions {
    #[must_use]
    pub fn new(source_url: impl AsRef<str>) -> Self {
        Self {
            source_url: ensure_trailing_slash(source_url.as_ref()),
            map_types: Vec::new(),
            include_retired: false,
        }
    }

    #[must_use]
    pub fn from_config(config: &GlobalConfig) -> Self {
        Self {
            map_types: config.dependency_map_types.clone(),
            include_retired: config.include_retired_mappings,
            ..Self::new(&config.concepts_source_url)
        }
    }

    #[must_use]
    pub fn with_map_types(mut self, map_types: Vec<String>) -> Self {
        self.map_types = map_types;
        self
    }

    #[must_use]
    pub const fn with_retired(mut self, include_retired: bool) -> Self {
        self.include_retired = include_retired;
        self
    }

    /// Target identifier when `mapping`, taken from `from_url`, is a dependency.
    fn dependency_of(&self, from_url: &str, mapping: &ApiMapping) -> Option<(String, String)> {
        if let Some(from) = &mapping.from_concept_url {
            if ensure_trailing_slash(from) != from_url {
                return None;
            }
        }
        if mapping.retired && !self.include_retired {
            return None;
        }
        let to_source = mapping.to_source_url.as_deref().map(ensure_trailing_slash);
        if to_source.as_deref() != Some(self.source_url.as_str()) {
            return None;
        }
        if !self.map_types.is_empty() && !self.map_types.iter().any(|t| *t == mapping.map_type) {
            return None;
        }

        let to_url = ensure_trailing_slash(mapping.to_concept_url.as_deref()?);
        let id = match mapping.to_concept_code.as_deref().filter(|code| !code.is_empty()) {
            Some(code) => code.to_string(),
            None => concept_id_from_url(&to_url)?.to_string(),
        };
        Some((id, to_url))
    }
}

/// A concept whose mappings could not be fetched.
#[derive(Debug, Clone)]
pub struct ResolutionFailure {
    pub concept_id: String,
    pub error: OclError,
}

/// Outcome of a resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolvedReferences {
    /// Reference URLs of every dependent concept, seeds excluded, in discovery order
    pub references: Vec<String>,
    pub failures: Vec<ResolutionFailure>,
}

impl ResolvedReferences {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.references.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

/// Computes the closure of internal dependencies of a set of concepts.
pub struct DependentConceptResolver<'a> {
    api: &'a dyn ResourceApi,
    options: ResolverOptions,
}

impl<'a> DependentConceptResolver<'a> {
    #[must_use]
    pub fn new(api: &'a dyn ResourceApi, options: ResolverOptions) -> Self {
        Self {
            api,
            options,
        }
    }

    #[must_use]
    pub const fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Resolve every dependent concept of `seed_ids`.
    ///
    /// `on_progress` is called after each mapping fetch with a message stating how many
    /// concepts that fetch added and the running total.
    pub async fn resolve_references<I, S, F>(
        &self,
        seed_ids: I,
        mut on_progress: F,
    ) -> ResolvedReferences
    where
        I: IntoIterator<Item = S> + Send,
        S: AsRef<str> + Send,
        F: FnMut(&str) + Send,
    {
        let seeds = normalize_ids(seed_ids);
        let mut visited: HashSet<String> = seeds.iter().cloned().collect();
        let mut queue: VecDeque<String> = seeds.into_iter().collect();
        let mut resolved = ResolvedReferences::default();

        while let Some(concept_id) = queue.pop_front() {
            let from_url = concept_url(&self.options.source_url, &concept_id);
            debug!("Fetching mappings of {}", from_url);

            let mappings = match self.api.all_mappings_from(&from_url).await {
                Ok(mappings) => mappings,
                Err(error) => {
                    warn!("Skipping dependents of {}: {}", concept_id, error);
                    on_progress(&format!(
                        "Could not fetch dependents of {concept_id}; continuing without them"
                    ));
                    resolved.failures.push(ResolutionFailure {
                        concept_id,
                        error,
                    });
                    continue;
                }
            };

            let mut discovered = 0;
            for mapping in &mappings {
                let Some((id, url)) = self.options.dependency_of(&from_url, mapping) else {
                    continue;
                };
                if visited.insert(id.clone()) {
                    debug!("{} depends on {} via {}", concept_id, id, mapping.map_type);
                    resolved.references.push(url);
                    queue.push_back(id);
                    discovered += 1;
                }
            }

            on_progress(&format!(
                "Found {} dependent concept(s) of {}, {} so far",
                discovered,
                concept_id,
                resolved.references.len()
            ));
        }

        debug!(
            "Resolved {} dependent concept(s) with {} failure(s)",
            resolved.references.len(),
            resolved.failures.len()
        );
        resolved
    }
}
