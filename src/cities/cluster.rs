//! Grouping city-name spelling variants into clusters.

use std::collections::BTreeMap;

use serde::Serialize;

use super::metaphone::DoubleMetaphone;
use super::similarity::ratio;
use crate::config::ResolverConfig;

/// A group of city spellings that sound alike.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityCluster {
    /// Phonetic code of the record that opened the cluster.
    pub representative_code: String,
    /// Indices of member records, ascending.
    pub members: Vec<usize>,
    /// Most frequent member spelling.
    pub canonical_name: String,
}

/// Cluster under construction.
struct Draft {
    representative_code: String,
    members: Vec<usize>,
}

/// Clusters built over one dataset of city names.
#[derive(Debug, Clone)]
pub struct CityClusters {
    clusters: Vec<CityCluster>,
    /// Cluster position for each record, by record index.
    assignments: Vec<usize>,
    encoder: DoubleMetaphone,
    threshold: f64,
}

impl CityClusters {
    /// Clusters city names in a single left-to-right pass.
    ///
    /// Each name is lower-cased and encoded; it joins the first existing
    /// cluster (in creation order) whose representative code scores at least
    /// the configured threshold, or opens a new cluster. Membership is never
    /// revisited, so the result depends on input order.
    pub fn build<I, S>(cities: I, config: &ResolverConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let encoder = match config.max_code_length {
            Some(max) => DoubleMetaphone::new().with_max_length(max),
            None => DoubleMetaphone::new(),
        };
        let threshold = config.similarity_threshold;

        let names: Vec<String> = cities
            .into_iter()
            .map(|city| city.as_ref().to_lowercase())
            .collect();

        let (drafts, assignments) = names.iter().enumerate().fold(
            (Vec::<Draft>::new(), Vec::with_capacity(names.len())),
            |(mut drafts, mut assignments), (index, name)| {
                let code = encoder.primary(name);
                let slot = match drafts
                    .iter()
                    .position(|draft| ratio(&code, &draft.representative_code) >= threshold)
                {
                    Some(slot) => slot,
                    None => {
                        tracing::debug!(city = %name, code = %code, "Opening city cluster");
                        drafts.push(Draft {
                            representative_code: code,
                            members: Vec::new(),
                        });
                        drafts.len() - 1
                    }
                };
                drafts[slot].members.push(index);
                assignments.push(slot);
                (drafts, assignments)
            },
        );

        let clusters: Vec<CityCluster> = drafts
            .into_iter()
            .map(|draft| {
                let canonical_name = most_frequent(draft.members.iter().map(|&i| names[i].as_str()));
                CityCluster {
                    representative_code: draft.representative_code,
                    members: draft.members,
                    canonical_name,
                }
            })
            .collect();

        tracing::debug!(records = names.len(), clusters = clusters.len(), "City clustering complete");

        Self {
            clusters,
            assignments,
            encoder,
            threshold,
        }
    }

    pub fn clusters(&self) -> &[CityCluster] {
        &self.clusters
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// The cluster a record was assigned to.
    pub fn cluster_of(&self, record_index: usize) -> Option<&CityCluster> {
        self.assignments
            .get(record_index)
            .map(|&slot| &self.clusters[slot])
    }

    /// Canonical city name for a record.
    pub fn canonical_for(&self, record_index: usize) -> Option<&str> {
        self.cluster_of(record_index)
            .map(|cluster| cluster.canonical_name.as_str())
    }

    /// Maps an arbitrary city name to the canonical name of its best cluster.
    ///
    /// The highest-scoring cluster at or above the threshold wins; on equal
    /// scores the earlier cluster is kept. With no qualifying cluster the
    /// lower-cased query is returned as-is.
    pub fn resolve(&self, city: &str) -> String {
        let query = city.to_lowercase();
        let code = self.encoder.primary(&query);

        let mut best: Option<(f64, &CityCluster)> = None;
        for cluster in &self.clusters {
            let score = ratio(&code, &cluster.representative_code);
            if score >= self.threshold && best.is_none_or(|(top, _)| score > top) {
                best = Some((score, cluster));
            }
        }

        match best {
            Some((score, cluster)) => {
                tracing::debug!(query = %query, canonical = %cluster.canonical_name, score, "Resolved city");
                cluster.canonical_name.clone()
            }
            None => {
                tracing::debug!(query = %query, "No city cluster matched; passing through");
                query
            }
        }
    }
}

/// Statistical mode; equal counts go to the lexicographically smallest name.
fn most_frequent<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for name in names {
        *counts.entry(name).or_insert(0) += 1;
    }

    let mut winner: Option<(&str, usize)> = None;
    for (name, count) in counts {
        if winner.is_none_or(|(_, top)| count > top) {
            winner = Some((name, count));
        }
    }
    winner.map(|(name, _)| name.to_string()).unwrap_or_default()
}
