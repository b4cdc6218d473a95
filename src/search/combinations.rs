//! r-length combinations in lexicographic order
//!
//! Combinations are emitted in lexicographic order of positions in the pool, and
//! every emitted combination is an independent `Vec`.

/// Iterator over the r-length combinations of a pool.
#[derive(Debug, Clone)]
pub struct Combinations<'a, T> {
    pool: &'a [T],
    indices: Vec<usize>,
    started: bool,
    done: bool,
}

/// All `r`-length combinations of `pool`, lexicographically ordered by position.
///
/// `r > pool.len()` yields nothing; `r == 0` yields a single empty combination.
pub fn combinations<T: Clone>(pool: &[T], r: usize) -> Combinations<'_, T> {
    Combinations {
        pool,
        indices: (0..r).collect(),
        started: false,
        done: r > pool.len(),
    }
}

/// Binomial coefficient `C(n, r)`, the number of combinations [`combinations`] yields.
///
/// `None` if the count does not fit in a `usize`.
pub fn count(n: usize, r: usize) -> Option<usize> {
    if r > n {
        return Some(0);
    }
    let r = r.min(n - r);
    let c = (0..r).try_fold(1u128, |acc, i| Some(acc.checked_mul((n - i) as u128)? / (i + 1) as u128))?;
    usize::try_from(c).ok()
}

impl<'a, T: Clone> Combinations<'a, T> {
    fn current(&self) -> Vec<T> {
        self.indices.iter().map(|&i| self.pool[i].clone()).collect()
    }
}

impl<'a, T: Clone> Iterator for Combinations<'a, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.current());
        }

        let n = self.pool.len();
        let r = self.indices.len();
        // rightmost index that has not reached its final value
        let Some(i) = (0..r).rev().find(|&i| self.indices[i] != i + n - r) else {
            self.done = true;
            return None;
        };

        self.indices[i] += 1;
        for j in i + 1..r {
            self.indices[j] = self.indices[j - 1] + 1;
        }
        Some(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combinations_of_four_choose_two() {
        let got: Vec<Vec<usize>> = combinations(&[0, 1, 2, 3], 2).collect();
        assert_eq!(
            got,
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
    fn test_counts_match_binomial() {
        let pool: Vec<usize> = (0..7).collect();
        for r in 0..=8 {
            assert_eq!(Some(combinations(&pool, r).count()), count(7, r), "r = {}", r);
        }
        assert_eq!(count(10, 3), Some(120));
        assert_eq!(count(3, 5), Some(0));
    }

    #[test]
    fn test_count_overflow() {
        assert_eq!(count(usize::MAX, 1), Some(usize::MAX));
        assert_eq!(count(usize::MAX, usize::MAX - 1), Some(usize::MAX));
        assert_eq!(count(200, 100), None);
        assert_eq!(count(66, 33), Some(7_219_428_434_016_265_740));
    }

    #[test]
    fn test_edge_sizes() {
        let pool = [4, 5, 6];
        assert_eq!(combinations(&pool, 4).count(), 0);
        assert_eq!(combinations(&pool, 0).collect::<Vec<_>>(), vec![Vec::<i32>::new()]);
        assert_eq!(combinations(&pool, 3).collect::<Vec<_>>(), vec![vec![4, 5, 6]]);
        assert_eq!(combinations::<i32>(&[], 1).count(), 0);
    }

    #[test]
    fn test_emitted_combinations_are_independent() {
        let mut emitted: Vec<Vec<usize>> = combinations(&[0, 1, 2], 2).collect();
        emitted[0][0] = 99;
        assert_eq!(emitted[1], vec![0, 2]);
        assert_eq!(emitted[2], vec![1, 2]);
    }

    #[test]
    fn test_values_not_positions() {
        let got: Vec<Vec<usize>> = combinations(&[2, 4, 6], 2).collect();
        assert_eq!(got, vec![vec![2, 4], vec![2, 6], vec![4, 6]]);
    }
}
