//! Rule-based and baseline classifiers
//!
//! [`RuleClassifier`] predicts with the best firing rule. When several rules
//! fire, the winner is picked by [`Rule::precedence`]: higher confidence,
//! then higher rule support, then the shorter antecedent, then the
//! lexicographically smaller antecedent. A remaining tie goes to the rule
//! that comes first in the classifier.

use crate::core::{ClassCode, Classifier, Dataset, Instance, Rule, NO_PREDICTION};
use std::cmp::Ordering;

/// Ordered collection of class association rules
#[derive(Debug, Clone, Default)]
pub struct RuleClassifier {
    rules: Vec<Rule>,
}

impl RuleClassifier {
    /// Create a classifier from rules in precedence-neutral order
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Rules in the order they were supplied
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if the classifier holds no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules whose antecedent is a subset of the instance's items
    pub fn firing_rules<'a>(&'a self, instance: &'a Instance) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules.iter().filter(move |rule| rule.fires(instance))
    }

    /// The rule that decides the prediction for `instance`, if any fires
    pub fn winning_rule(&self, instance: &Instance) -> Option<&Rule> {
        self.rules
            .iter()
            .filter(|rule| rule.fires(instance))
            .fold(None, |best: Option<&Rule>, rule| match best {
                Some(current) if rule.precedence(current) != Ordering::Greater => Some(current),
                _ => Some(rule),
            })
    }
}

impl Classifier for RuleClassifier {
    fn predict(&self, instance: &Instance) -> ClassCode {
        self.winning_rule(instance)
            .map_or(NO_PREDICTION, Rule::consequent)
    }
}

/// Which class a [`BaselineClassifier`] always predicts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselinePolicy {
    /// Most frequent training class
    Majority,
    /// Least frequent training class
    Minority,
}

/// Predicts a single fixed class chosen from the training class frequencies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaselineClassifier {
    policy: BaselinePolicy,
    class: ClassCode,
}

impl BaselineClassifier {
    /// Fit on a dataset's class frequencies; ties go to the smaller class code.
    ///
    /// An empty dataset gives a classifier that always answers [`NO_PREDICTION`].
    pub fn fit<D: Dataset + ?Sized>(dataset: &D, policy: BaselinePolicy) -> Self {
        let frequency = dataset.frequency_by_class();
        let chosen = match policy {
            // max_by_key keeps the last maximum, so walk codes in reverse
            BaselinePolicy::Majority => frequency.iter().rev().max_by_key(|&(_, &n)| n),
            BaselinePolicy::Minority => frequency.iter().min_by_key(|&(_, &n)| n),
        };

        Self {
            policy,
            class: chosen.map_or(NO_PREDICTION, |(&code, _)| code),
        }
    }

    /// The class every prediction returns
    pub fn class(&self) -> ClassCode {
        self.class
    }

    /// Policy the class was chosen with
    pub fn policy(&self) -> BaselinePolicy {
        self.policy
    }
}

impl Classifier for BaselineClassifier {
    fn predict(&self, _instance: &Instance) -> ClassCode {
        self.class
    }
}
