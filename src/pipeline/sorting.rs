use serde::Serialize;

use super::convert::JetRecord;

/// Indices of `items` ordered by descending key. The sort is stable: equal
/// keys keep their original relative order.
pub fn descending_permutation<T, F>(items: &[T], key: F) -> Vec<usize>
where
    F: Fn(&T) -> f64,
{
    let keys: Vec<f64> = items.iter().map(key).collect();
    let mut indices: Vec<usize> = (0..items.len()).collect();
    indices.sort_by(|&a, &b| keys[b].total_cmp(&keys[a]));
    indices
}

/// The three jet rank orders written alongside each event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JetSortPermutations {
    pub by_pt: Vec<usize>,
    pub by_csv: Vec<usize>,
    pub by_cmva: Vec<usize>,
}

impl JetSortPermutations {
    pub fn build(jets: &[JetRecord]) -> Self {
        Self {
            by_pt: descending_permutation(jets, |j| j.pt),
            by_csv: descending_permutation(jets, |j| j.csv),
            by_cmva: descending_permutation(jets, |j| j.cmva),
        }
    }
}

/// True when `perm` holds every index in `0..len` exactly once
pub fn is_permutation(perm: &[usize], len: usize) -> bool {
    if perm.len() != len {
        return false;
    }
    let mut seen = vec![false; len];
    for &i in perm {
        if i >= len || seen[i] {
            return false;
        }
        seen[i] = true;
    }
    true
}
