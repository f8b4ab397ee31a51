//! Minimum cost assignment (Kuhn-Munkres with potentials), O(n^2 * m).

/// Assigns every row of `costs` to a distinct column so the total cost is minimal.
///
/// All rows must have the same length. Returns the total and the column chosen for each row,
/// or `None` when there are more rows than columns.
pub(crate) fn min_cost_assignment(costs: &[Vec<i64>]) -> Option<(i64, Vec<usize>)> {
    let n = costs.len();
    if n == 0 {
        return Some((0, Vec::new()));
    }
    let m = costs[0].len();
    if n > m {
        return None;
    }

    // 1-based, index 0 is a sentinel column/row
    let mut u = vec![0i64; n + 1];
    let mut v = vec![0i64; m + 1];
    let mut matched_row = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        matched_row[0] = i;
        let mut j0 = 0;
        let mut min_v = vec![i64::max_value(); m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = matched_row[j0];
            let mut delta = i64::max_value();
            let mut j1 = 0;
            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let cur = costs[i0 - 1][j - 1] - u[i0] - v[j];
                if cur < min_v[j] {
                    min_v[j] = cur;
                    way[j] = j0;
                }
                if min_v[j] < delta {
                    delta = min_v[j];
                    j1 = j;
                }
            }
            for j in 0..=m {
                if used[j] {
                    u[matched_row[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_v[j] -= delta;
                }
            }
            j0 = j1;
            if matched_row[j0] == 0 {
                break;
            }
        }

        // flip the augmenting path
        loop {
            let j1 = way[j0];
            matched_row[j0] = matched_row[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0; n];
    for j in 1..=m {
        if matched_row[j] != 0 {
            assignment[matched_row[j] - 1] = j - 1;
        }
    }
    let total = assignment
        .iter()
        .enumerate()
        .map(|(i, &j)| costs[i][j])
        .sum();
    Some((total, assignment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty() {
        assert_eq!(min_cost_assignment(&[]), Some((0, vec![])));
    }

    #[test]
    fn single() {
        assert_eq!(min_cost_assignment(&[vec![7]]), Some((7, vec![0])));
    }

    #[test]
    fn greedy_is_wrong() {
        // greedy picks 1 for the first row and is then forced to take 100
        let costs = vec![vec![1, 2], vec![3, 100]];
        assert_eq!(min_cost_assignment(&costs), Some((5, vec![1, 0])));
    }

    #[test]
    fn three_by_three() {
        let costs = vec![vec![4, 1, 3], vec![2, 0, 5], vec![3, 2, 2]];
        let (total, assignment) = min_cost_assignment(&costs).unwrap();
        assert_eq!(total, 5);
        assert_eq!(assignment, vec![1, 0, 2]);
    }

    #[test]
    fn more_columns() {
        let costs = vec![vec![5, 9, 1], vec![10, 3, 2]];
        assert_eq!(min_cost_assignment(&costs), Some((4, vec![2, 1])));
    }

    #[test]
    fn more_rows() {
        let costs = vec![vec![1], vec![2]];
        assert_eq!(min_cost_assignment(&costs), None);
    }

    #[test]
    fn matches_brute_force() {
        let costs = vec![
            vec![7, 3, 9, 4],
            vec![2, 8, 6, 5],
            vec![6, 4, 1, 8],
            vec![3, 7, 5, 2],
        ];
        let mut best = i64::max_value();
        let mut perm = vec![0, 1, 2, 3];
        permutations(&mut perm, 0, &mut |p| {
            let total = p.iter().enumerate().map(|(i, &j)| costs[i][j]).sum();
            best = best.min(total);
        });
        let (total, assignment) = min_cost_assignment(&costs).unwrap();
        assert_eq!(total, best);
        let mut cols = assignment.clone();
        cols.sort();
        assert_eq!(cols, vec![0, 1, 2, 3]);
    }

    fn permutations(perm: &mut Vec<usize>, k: usize, f: &mut dyn FnMut(&[usize])) {
        if k == perm.len() {
            f(perm);
            return;
        }
        for i in k..perm.len() {
            perm.swap(k, i);
            permutations(perm, k + 1, f);
            perm.swap(k, i);
        }
    }
}
