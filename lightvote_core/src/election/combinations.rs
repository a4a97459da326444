//! Lexicographic k-of-m index combinations.

/// Iterates over all size-`k` subsets of `0..m` as ascending index lists,
/// in lexicographic order: `[0,1], [0,2], ..., [m-2,m-1]` for `k = 2`.
///
/// `k == 0` yields the empty subset once; `k > m` yields nothing.
#[derive(Debug, Clone)]
pub struct Combinations {
    m: usize,
    current: Option<Vec<usize>>,
}

impl Combinations {
    pub fn new(m: usize, k: usize) -> Self {
        let current = (k <= m).then(|| (0..k).collect());
        Self { m, current }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let current = self.current.take()?;
        let k = current.len();

        // Advance: rightmost position that can still move right
        let mut next = current.clone();
        let mut i = k;
        while i > 0 {
            i -= 1;
            if next[i] < self.m - k + i {
                next[i] += 1;
                for j in i + 1..k {
                    next[j] = next[j - 1] + 1;
                }
                self.current = Some(next);
                break;
            }
        }

        Some(current)
    }
}

/// Binomial coefficient `C(n, k)`, saturating at `u64::MAX`.
pub fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k) as u64;
    let n = n as u64;
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc * u128::from(n - i) / u128::from(i + 1);
        if acc > u128::from(u64::MAX) {
            return u64::MAX;
        }
    }
    acc as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_choose_two_in_order() {
        let all: Vec<_> = Combinations::new(4, 2).collect();
        assert_eq!(
            all,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3],
            ]
        );
    }

    #[test]
    fn test_edge_sizes() {
        assert_eq!(Combinations::new(3, 0).collect::<Vec<_>>(), vec![Vec::<usize>::new()]);
        assert_eq!(Combinations::new(3, 3).collect::<Vec<_>>(), vec![vec![0, 1, 2]]);
        assert_eq!(Combinations::new(2, 3).count(), 0);
        assert_eq!(Combinations::new(0, 0).count(), 1);
    }

    #[test]
    fn test_count_matches_binomial() {
        for m in 0..10 {
            for k in 0..=m {
                assert_eq!(Combinations::new(m, k).count() as u64, binomial(m, k), "C({}, {})", m, k);
            }
        }
    }

    #[test]
    fn test_binomial_values() {
        assert_eq!(binomial(4, 2), 6);
        assert_eq!(binomial(52, 5), 2_598_960);
        assert_eq!(binomial(3, 5), 0);
        assert_eq!(binomial(200, 100), u64::MAX);
    }
}
