//! Level-wise (Apriori) search for frequent itemsets and class association rules
//!
//! Level `k` holds candidate antecedents of size `k`. One pass over the
//! dataset counts every candidate, both overall and per class. Candidates
//! that reach the support threshold become the frequent itemsets of the
//! level; level `k + 1` is generated by extending each of them with one
//! larger frequent item, keeping only candidates whose size-`k` subsets are
//! all frequent.
//!
//! Rules come out in discovery order: by level, then in the lexicographic
//! order candidates were generated, then by ascending class code. Classifiers
//! rely on this order being reproducible.

use crate::core::{ClassCode, Dataset, ItemCode, Rule};
use crate::itemset;
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// What a support fraction is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SupportBasis {
    /// `count(I and c) / count(c)`: support within the consequent's class
    #[default]
    Class,
    /// `count(I) / dataset size`
    Dataset,
}

/// Thresholds and limits for a mining run
#[derive(Debug, Clone, PartialEq)]
pub struct MinerConfig {
    /// Minimum support fraction in [0, 1]
    pub min_support: f64,
    /// Minimum confidence in [0, 1]
    pub min_confidence: f64,
    /// Denominator used for support fractions
    pub support_basis: SupportBasis,
    /// Stop the search after antecedents of this size (unbounded if `None`)
    pub max_antecedent_size: Option<usize>,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            min_support: 0.1,
            min_confidence: 0.5,
            support_basis: SupportBasis::Class,
            max_antecedent_size: None,
        }
    }
}

/// A frequent itemset with the counts measured for it
#[derive(Debug, Clone, PartialEq)]
pub struct FrequentItemset {
    /// Item codes, ascending
    pub items: Vec<ItemCode>,
    /// Instances covering the itemset
    pub support: usize,
    /// Covering instances per class code
    pub class_support: BTreeMap<ClassCode, usize>,
}

/// Candidate and frequent counts of one level of the search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelStats {
    pub level: usize,
    pub candidates: usize,
    pub frequent: usize,
}

/// Rules together with per-level search statistics
#[derive(Debug, Clone)]
pub struct MiningOutcome {
    pub rules: Vec<Rule>,
    pub levels: Vec<LevelStats>,
}

/// Class codes of a dataset with their instance counts, ascending by code
struct ClassTable {
    codes: Vec<ClassCode>,
    counts: Vec<usize>,
}

impl ClassTable {
    fn from_dataset<D: Dataset + ?Sized>(dataset: &D) -> Self {
        let (codes, counts) = dataset.frequency_by_class().into_iter().unzip();
        Self { codes, counts }
    }

    fn position(&self, class: ClassCode) -> Option<usize> {
        self.codes.binary_search(&class).ok()
    }

    fn contains(&self, code: ItemCode) -> bool {
        self.position(code).is_some()
    }

    fn len(&self) -> usize {
        self.codes.len()
    }
}

/// Candidate itemset being counted
struct Counted {
    items: Vec<ItemCode>,
    support: usize,
    class_support: Vec<usize>,
}

/// Apriori-style class association rule miner
#[derive(Debug, Clone, Default)]
pub struct AprioriMiner {
    config: MinerConfig,
}

impl AprioriMiner {
    /// Create a miner with the given configuration.
    ///
    /// Thresholds outside [0, 1] are not checked here; validate them at the
    /// boundary (see [`crate::utils::validation`]).
    pub fn new(config: MinerConfig) -> Self {
        Self { config }
    }

    /// Get the miner configuration
    pub fn config(&self) -> &MinerConfig {
        &self.config
    }

    /// Mine class association rules in discovery order
    pub fn mine<D: Dataset + ?Sized>(&self, dataset: &D) -> Vec<Rule> {
        self.mine_detailed(dataset).rules
    }

    /// Mine rules and report how many candidates each level counted
    pub fn mine_detailed<D: Dataset + ?Sized>(&self, dataset: &D) -> MiningOutcome {
        let classes = ClassTable::from_dataset(dataset);
        let (frequent, levels) = self.search(dataset, &classes);

        let rules: Vec<Rule> = frequent
            .iter()
            .flatten()
            .flat_map(|itemset| self.rules_for(itemset, &classes))
            .collect();

        debug!(
            "Mined {} rules from {} instances over {} levels",
            rules.len(),
            dataset.len(),
            levels.len()
        );

        MiningOutcome { rules, levels }
    }

    /// Frequent itemsets grouped by level (index 0 holds size-1 itemsets)
    pub fn frequent_itemsets<D: Dataset + ?Sized>(&self, dataset: &D) -> Vec<Vec<FrequentItemset>> {
        let classes = ClassTable::from_dataset(dataset);
        let (frequent, _) = self.search(dataset, &classes);

        frequent
            .into_iter()
            .map(|level| {
                level
                    .into_iter()
                    .map(|c| FrequentItemset {
                        class_support: classes.codes.iter().copied().zip(c.class_support).collect(),
                        items: c.items,
                        support: c.support,
                    })
                    .collect()
            })
            .collect()
    }

    fn search<D: Dataset + ?Sized>(
        &self,
        dataset: &D,
        classes: &ClassTable,
    ) -> (Vec<Vec<Counted>>, Vec<LevelStats>) {
        let observed: BTreeSet<ItemCode> = dataset
            .instances()
            .flat_map(|instance| instance.items().iter().copied())
            .filter(|&code| !classes.contains(code))
            .collect();

        let mut candidates: Vec<Vec<ItemCode>> = observed.into_iter().map(|code| vec![code]).collect();
        let mut frequent_items: Vec<ItemCode> = Vec::new();
        let mut levels = Vec::new();
        let mut stats = Vec::new();
        let mut level = 1;

        while !candidates.is_empty() {
            let n_candidates = candidates.len();
            let counted = count_candidates(dataset, candidates, classes);
            let survivors: Vec<Counted> = counted
                .into_iter()
                .filter(|c| self.is_frequent(c, dataset.len(), classes))
                .collect();

            debug!(
                "Level {level}: {n_candidates} candidates, {} frequent",
                survivors.len()
            );
            stats.push(LevelStats {
                level,
                candidates: n_candidates,
                frequent: survivors.len(),
            });

            if survivors.is_empty() {
                break;
            }
            if level == 1 {
                frequent_items = survivors.iter().map(|c| c.items[0]).collect();
            }

            let at_limit = self.config.max_antecedent_size.is_some_and(|max| level >= max);
            candidates = if at_limit {
                Vec::new()
            } else {
                generate_candidates(&survivors, &frequent_items)
            };
            levels.push(survivors);
            level += 1;
        }

        (levels, stats)
    }

    fn is_frequent(&self, candidate: &Counted, n_instances: usize, classes: &ClassTable) -> bool {
        if candidate.support == 0 {
            return false;
        }

        let min_support = self.config.min_support;
        match self.config.support_basis {
            SupportBasis::Dataset => candidate.support as f64 / n_instances as f64 >= min_support,
            SupportBasis::Class => classes
                .counts
                .iter()
                .zip(&candidate.class_support)
                .any(|(&total, &hit)| total > 0 && hit as f64 / total as f64 >= min_support),
        }
    }

    fn rules_for(&self, itemset: &Counted, classes: &ClassTable) -> Vec<Rule> {
        assert!(
            itemset.support > 0,
            "frequent itemset {:?} covers no instance",
            itemset.items
        );

        let mut rules = Vec::new();
        for k in 0..classes.len() {
            let support_rule = itemset.class_support[k];
            let support_klass = classes.counts[k];
            if support_rule == 0 {
                continue;
            }

            if self.config.support_basis == SupportBasis::Class
                && (support_rule as f64 / support_klass as f64) < self.config.min_support
            {
                continue;
            }

            let confidence = support_rule as f64 / itemset.support as f64;
            if confidence >= self.config.min_confidence {
                rules.push(Rule::new(
                    itemset.items.clone(),
                    classes.codes[k],
                    itemset.support,
                    support_rule,
                    support_klass,
                ));
            }
        }
        rules
    }
}

/// Mine rules with the default support basis
pub fn mine<D: Dataset + ?Sized>(dataset: &D, min_support: f64, min_confidence: f64) -> Vec<Rule> {
    AprioriMiner::new(MinerConfig {
        min_support,
        min_confidence,
        ..MinerConfig::default()
    })
    .mine(dataset)
}

/// One pass over the dataset counting every candidate overall and per class
fn count_candidates<D: Dataset + ?Sized>(
    dataset: &D,
    candidates: Vec<Vec<ItemCode>>,
    classes: &ClassTable,
) -> Vec<Counted> {
    let mut counted: Vec<Counted> = candidates
        .into_iter()
        .map(|items| Counted {
            items,
            support: 0,
            class_support: vec![0; classes.len()],
        })
        .collect();

    for instance in dataset.instances() {
        let class = classes.position(instance.class());
        for candidate in counted.iter_mut() {
            if instance.covers(&candidate.items) {
                candidate.support += 1;
                if let Some(k) = class {
                    candidate.class_support[k] += 1;
                }
            }
        }
    }
    counted
}

/// Extend each frequent itemset with every larger frequent item, keeping only
/// candidates whose one-smaller subsets are all frequent
fn generate_candidates(frequent: &[Counted], items: &[ItemCode]) -> Vec<Vec<ItemCode>> {
    let known: HashSet<&[ItemCode]> = frequent.iter().map(|c| c.items.as_slice()).collect();

    let mut candidates = Vec::new();
    for itemset in frequent {
        let Some(&last) = itemset.items.last() else {
            continue;
        };
        for &item in items.iter().filter(|&&item| item > last) {
            let candidate = itemset::concatenate(&itemset.items, &[item]);
            let closed = itemset::subsets_without_one(&candidate)
                .all(|subset| known.contains(subset.as_slice()));
            if closed {
                candidates.push(candidate);
            }
        }
    }
    candidates
}
