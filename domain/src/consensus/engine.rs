//! Consensus computation over a run's verdicts

use super::result::{CATEGORY_NO_DATA, CATEGORY_TIE, ConsensusResult};
use crate::verdict::{Classification, Verdict};
use std::collections::BTreeMap;

/// Compute the consensus of a set of verdicts.
///
/// Only [`Outcome::Ok`](crate::Outcome::Ok) verdicts vote. The majority is
/// the classification with the strictly highest count; a tie at the top
/// yields no majority and is reported with the `"tie"` category, with no
/// dissenters because no provider is preferred over another. An empty
/// voting set is reported with the `"no-data"` category.
///
/// The function is pure and independent of input order.
///
/// # Example
///
/// ```
/// use chorus_domain::{Classification, ProviderId, Verdict, consensus};
/// use std::time::Duration;
///
/// let verdicts = vec![
///     Verdict::ok(ProviderId::Claude, Classification::Safe, "", Duration::ZERO),
///     Verdict::ok(ProviderId::Gpt, Classification::Safe, "", Duration::ZERO),
///     Verdict::ok(ProviderId::Llama, Classification::Unsafe, "", Duration::ZERO),
/// ];
///
/// let result = consensus::compute(&verdicts);
/// assert!(!result.agreement);
/// assert_eq!(result.majority, Some(Classification::Safe));
/// assert_eq!(result.dissenters, vec![ProviderId::Llama]);
/// ```
pub fn compute(verdicts: &[Verdict]) -> ConsensusResult {
    let voting: Vec<(_, Classification)> = verdicts
        .iter()
        .filter(|v| v.is_voting())
        .filter_map(|v| v.classification().map(|c| (v.provider(), c)))
        .collect();

    if voting.is_empty() {
        return ConsensusResult {
            agreement: false,
            majority: None,
            dissenters: Vec::new(),
            category: Some(CATEGORY_NO_DATA.to_string()),
            voters: 0,
        };
    }

    let mut tally: BTreeMap<Classification, usize> = BTreeMap::new();
    for (_, classification) in &voting {
        *tally.entry(*classification).or_default() += 1;
    }

    let top = tally.values().copied().max().unwrap_or_default();
    let leaders: Vec<Classification> = tally
        .iter()
        .filter(|(_, count)| **count == top)
        .map(|(c, _)| *c)
        .collect();

    let majority = match leaders.as_slice() {
        [single] => Some(*single),
        _ => None,
    };

    let Some(majority_class) = majority else {
        return ConsensusResult {
            agreement: false,
            majority: None,
            dissenters: Vec::new(),
            category: Some(CATEGORY_TIE.to_string()),
            voters: voting.len(),
        };
    };

    let mut dissenters: Vec<_> = voting
        .iter()
        .filter(|(_, c)| *c != majority_class)
        .map(|(p, _)| *p)
        .collect();
    dissenters.sort();
    dissenters.dedup();

    ConsensusResult {
        agreement: dissenters.is_empty(),
        majority,
        dissenters,
        category: None,
        voters: voting.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::provider::ProviderId;
    use std::time::Duration;

    fn ok(provider: ProviderId, classification: Classification) -> Verdict {
        Verdict::ok(provider, classification, "", Duration::from_millis(100))
    }

    fn failed(provider: ProviderId) -> Verdict {
        Verdict::provider_error(provider, "boom", Duration::from_millis(5))
    }

    #[test]
    fn test_unanimous_unsafe() {
        let verdicts = vec![
            ok(ProviderId::Claude, Classification::Unsafe),
            ok(ProviderId::Gpt, Classification::Unsafe),
            ok(ProviderId::Llama, Classification::Unsafe),
        ];
        let result = compute(&verdicts);

        assert!(result.agreement);
        assert_eq!(result.majority, Some(Classification::Unsafe));
        assert!(result.dissenters.is_empty());
        assert!(result.category.is_none());
        assert_eq!(result.voters, 3);
    }

    #[test]
    fn test_two_to_one_flags_dissenter() {
        let verdicts = vec![
            ok(ProviderId::Claude, Classification::Safe),
            ok(ProviderId::Gpt, Classification::Safe),
            ok(ProviderId::Llama, Classification::Unsafe),
        ];
        let result = compute(&verdicts);

        assert!(!result.agreement);
        assert_eq!(result.majority, Some(Classification::Safe));
        assert_eq!(result.dissenters, vec![ProviderId::Llama]);
    }

    #[test]
    fn test_timeout_excluded_from_voting_set() {
        let verdicts = vec![
            ok(ProviderId::Claude, Classification::Safe),
            Verdict::timeout(ProviderId::Gpt, Duration::from_secs(30)),
            ok(ProviderId::Llama, Classification::Safe),
        ];
        let result = compute(&verdicts);

        assert!(result.agreement);
        assert_eq!(result.majority, Some(Classification::Safe));
        assert_eq!(result.voters, 2);
    }

    #[test]
    fn test_no_ok_verdicts_is_no_data() {
        let verdicts = vec![
            failed(ProviderId::Claude),
            failed(ProviderId::Gpt),
            Verdict::timeout(ProviderId::Llama, Duration::from_secs(30)),
        ];
        let result = compute(&verdicts);

        assert!(!result.agreement);
        assert!(result.majority.is_none());
        assert!(result.dissenters.is_empty());
        assert_eq!(result.category.as_deref(), Some(CATEGORY_NO_DATA));
    }

    #[test]
    fn test_empty_input_is_no_data() {
        let result = compute(&[]);
        assert!(!result.agreement);
        assert_eq!(result.category.as_deref(), Some(CATEGORY_NO_DATA));
    }

    #[test]
    fn test_two_way_tie_has_no_majority() {
        let verdicts = vec![
            ok(ProviderId::Claude, Classification::Safe),
            failed(ProviderId::Gpt),
            ok(ProviderId::Llama, Classification::Unsafe),
        ];
        let result = compute(&verdicts);

        assert!(!result.agreement);
        assert!(result.majority.is_none());
        assert!(result.dissenters.is_empty());
        assert_eq!(result.category.as_deref(), Some(CATEGORY_TIE));
        assert!(result.is_tie());
    }

    #[test]
    fn test_three_way_split_has_no_majority() {
        let verdicts = vec![
            ok(ProviderId::Claude, Classification::Safe),
            ok(ProviderId::Gpt, Classification::Unsafe),
            ok(ProviderId::Llama, Classification::Uncertain),
        ];
        let result = compute(&verdicts);

        assert!(!result.agreement);
        assert!(result.majority.is_none());
    }

    #[test]
    fn test_single_voter_agrees_with_itself() {
        let verdicts = vec![
            ok(ProviderId::Gpt, Classification::Uncertain),
            failed(ProviderId::Claude),
        ];
        let result = compute(&verdicts);

        assert!(result.agreement);
        assert_eq!(result.majority, Some(Classification::Uncertain));
        assert_eq!(result.voters, 1);
    }

    #[test]
    fn test_idempotent_and_order_independent() {
        let verdicts = vec![
            ok(ProviderId::Llama, Classification::Unsafe),
            ok(ProviderId::Claude, Classification::Safe),
            ok(ProviderId::Gpt, Classification::Safe),
        ];
        let first = compute(&verdicts);
        let second = compute(&verdicts);
        assert_eq!(first, second);

        let mut reversed = verdicts.clone();
        reversed.reverse();
        assert_eq!(compute(&reversed), first);
    }

    #[test]
    fn test_dissenters_sorted_by_provider() {
        let verdicts = vec![
            ok(ProviderId::Llama, Classification::Unsafe),
            ok(ProviderId::Claude, Classification::Unsafe),
            ok(ProviderId::Gpt, Classification::Safe),
        ];
        let result = compute(&verdicts);
        assert_eq!(result.majority, Some(Classification::Unsafe));
        assert_eq!(result.dissenters, vec![ProviderId::Gpt]);
    }
}
