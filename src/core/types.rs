//! Core type definitions for class association rules

use crate::itemset;
use std::cmp::Ordering;
use std::fmt;

/// Code of one (attribute, value) pair, assigned by the dataset loader
pub type ItemCode = u32;

/// Code of one class value; shares the code space with [`ItemCode`]
pub type ClassCode = u32;

/// Returned by a classifier when no rule fires.
///
/// Loaders never hand out this code, so it cannot collide with a real class.
pub const NO_PREDICTION: ClassCode = ClassCode::MAX;

/// A labelled instance: its item codes (sorted, unique) and its class code
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instance {
    items: Vec<ItemCode>,
    class: ClassCode,
}

impl Instance {
    /// Create a new instance, sorting and de-duplicating the item codes
    pub fn new(mut items: Vec<ItemCode>, class: ClassCode) -> Self {
        items.sort_unstable();
        items.dedup();
        Self { items, class }
    }

    /// Item codes of this instance, ascending
    pub fn items(&self) -> &[ItemCode] {
        &self.items
    }

    /// Class code of this instance
    pub fn class(&self) -> ClassCode {
        self.class
    }

    /// True if every code of `itemset` appears in this instance
    pub fn covers(&self, itemset: &[ItemCode]) -> bool {
        itemset::is_subset(itemset, &self.items)
    }
}

/// A class association rule `antecedent -> consequent` with its mining counters
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    antecedent: Vec<ItemCode>,
    consequent: ClassCode,
    support_antecedent: usize,
    support_rule: usize,
    support_klass: usize,
}

impl Rule {
    /// Create a rule from its antecedent, consequent and support counts.
    ///
    /// # Panics
    /// Panics if the antecedent is not sorted ascending without duplicates,
    /// if `support_antecedent` is zero, or if `support_rule` exceeds either
    /// of the other two counters.
    pub fn new(
        antecedent: Vec<ItemCode>,
        consequent: ClassCode,
        support_antecedent: usize,
        support_rule: usize,
        support_klass: usize,
    ) -> Self {
        assert!(
            itemset::is_canonical(&antecedent),
            "Antecedent must be sorted ascending without duplicates: {antecedent:?}"
        );
        assert!(support_antecedent > 0, "Antecedent support must be positive");
        assert!(
            support_rule <= support_antecedent && support_rule <= support_klass,
            "Rule support cannot exceed antecedent or class support"
        );

        Self {
            antecedent,
            consequent,
            support_antecedent,
            support_rule,
            support_klass,
        }
    }

    /// Condition itemset
    pub fn antecedent(&self) -> &[ItemCode] {
        &self.antecedent
    }

    /// Predicted class
    pub fn consequent(&self) -> ClassCode {
        self.consequent
    }

    /// Instances matching the antecedent
    pub fn support_antecedent(&self) -> usize {
        self.support_antecedent
    }

    /// Instances matching antecedent and consequent
    pub fn support_rule(&self) -> usize {
        self.support_rule
    }

    /// Instances of the consequent class
    pub fn support_klass(&self) -> usize {
        self.support_klass
    }

    /// `support_rule / support_antecedent`
    pub fn confidence(&self) -> f64 {
        self.support_rule as f64 / self.support_antecedent as f64
    }

    /// Number of items in the antecedent
    pub fn len(&self) -> usize {
        self.antecedent.len()
    }

    /// True for the unconditional rule `{} -> c`
    pub fn is_empty(&self) -> bool {
        self.antecedent.is_empty()
    }

    /// True if the antecedent is a subset of the instance's items
    pub fn fires(&self, instance: &Instance) -> bool {
        instance.covers(&self.antecedent)
    }

    /// Rank this rule against `other`; `Greater` means this rule wins.
    ///
    /// Keys, in order: higher confidence, higher rule support, fewer items,
    /// lexicographically smaller antecedent. Confidence is compared on the
    /// cross-multiplied counts so no rounding is involved.
    pub fn precedence(&self, other: &Rule) -> Ordering {
        let lhs = self.support_rule as u128 * other.support_antecedent as u128;
        let rhs = other.support_rule as u128 * self.support_antecedent as u128;

        lhs.cmp(&rhs)
            .then(self.support_rule.cmp(&other.support_rule))
            .then(other.antecedent.len().cmp(&self.antecedent.len()))
            .then_with(|| other.antecedent.cmp(&self.antecedent))
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} -> {} (conf {:.3}, sup {}/{}/{})",
            self.antecedent,
            self.consequent,
            self.confidence(),
            self.support_rule,
            self.support_antecedent,
            self.support_klass
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_canonicalises_items() {
        let instance = Instance::new(vec![7, 2, 4, 2], 9);
        assert_eq!(instance.items(), &[2, 4, 7]);
        assert_eq!(instance.class(), 9);
    }

    #[test]
    fn test_instance_covers() {
        let instance = Instance::new(vec![1, 3, 5], 0);
        assert!(instance.covers(&[]));
        assert!(instance.covers(&[1, 5]));
        assert!(!instance.covers(&[1, 2]));
    }

    #[test]
    fn test_rule_accessors() {
        let rule = Rule::new(vec![1, 3], 5, 4, 3, 6);
        assert_eq!(rule.antecedent(), &[1, 3]);
        assert_eq!(rule.consequent(), 5);
        assert_eq!(rule.support_antecedent(), 4);
        assert_eq!(rule.support_rule(), 3);
        assert_eq!(rule.support_klass(), 6);
        assert_eq!(rule.confidence(), 0.75);
        assert_eq!(rule.len(), 2);
        assert!(!rule.is_empty());
    }

    #[test]
    fn test_rule_fires() {
        let rule = Rule::new(vec![1, 3], 5, 2, 2, 2);
        assert!(rule.fires(&Instance::new(vec![0, 1, 3], 4)));
        assert!(!rule.fires(&Instance::new(vec![0, 1], 4)));

        let unconditional = Rule::new(vec![], 4, 10, 6, 6);
        assert!(unconditional.fires(&Instance::new(vec![], 4)));
    }

    #[test]
    fn test_precedence_confidence_first() {
        let strong = Rule::new(vec![1, 2, 3], 0, 2, 2, 5);
        let weak = Rule::new(vec![1], 0, 10, 9, 10);
        assert_eq!(strong.precedence(&weak), Ordering::Greater);
        assert_eq!(weak.precedence(&strong), Ordering::Less);
    }

    #[test]
    fn test_precedence_exact_confidence_ties() {
        // 1/3 and 2/6 tie exactly, so rule support decides
        let a = Rule::new(vec![1], 0, 3, 1, 5);
        let b = Rule::new(vec![2], 0, 6, 2, 5);
        assert_eq!(b.precedence(&a), Ordering::Greater);
    }

    #[test]
    fn test_precedence_size_then_lexicographic() {
        let short = Rule::new(vec![4], 0, 4, 2, 5);
        let long = Rule::new(vec![1, 2], 1, 4, 2, 5);
        assert_eq!(short.precedence(&long), Ordering::Greater);

        let lower = Rule::new(vec![1, 5], 0, 4, 2, 5);
        let higher = Rule::new(vec![1, 6], 1, 4, 2, 5);
        assert_eq!(lower.precedence(&higher), Ordering::Greater);
        assert_eq!(lower.precedence(&lower.clone()), Ordering::Equal);
    }

    #[test]
    #[should_panic(expected = "Antecedent must be sorted")]
    fn test_rule_rejects_unsorted_antecedent() {
        Rule::new(vec![3, 1], 0, 1, 1, 1);
    }

    #[test]
    #[should_panic(expected = "Antecedent support must be positive")]
    fn test_rule_rejects_zero_antecedent_support() {
        Rule::new(vec![1], 0, 0, 0, 1);
    }

    #[test]
    fn test_no_prediction_sentinel() {
        assert_eq!(NO_PREDICTION, u32::MAX);
    }
}
