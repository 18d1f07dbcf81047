use crate::domain::{normalize_phone, NormalizedRow};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub user: String,
    pub contacts: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    pub users: Vec<ResultRow>,
    pub total_users: usize,
    pub total_contacts_all: usize,
    pub skipped_rows: usize,
}

/// Counts unique `(number, user)` pairs per user.
///
/// Rows with an empty trimmed user or a number without digits are skipped and
/// contribute to no total. The global total counts distinct numbers regardless
/// of user. Results are ordered by count descending, then user ascending.
pub fn aggregate(rows: &[NormalizedRow]) -> Aggregation {
    let mut seen: HashSet<(String, &str)> = HashSet::new();
    let mut tally: HashMap<&str, usize> = HashMap::new();
    let mut numbers: HashSet<String> = HashSet::new();
    let mut skipped_rows = 0;

    for row in rows {
        let user = row.user.trim();
        let number = normalize_phone(&row.contact_number);
        if user.is_empty() || number.is_empty() {
            skipped_rows += 1;
            continue;
        }

        numbers.insert(number.clone());
        if seen.insert((number, user)) {
            *tally.entry(user).or_default() += 1;
        }
    }

    let mut users: Vec<ResultRow> = tally
        .into_iter()
        .map(|(user, contacts)| ResultRow {
            user: user.to_string(),
            contacts,
        })
        .collect();
    users.sort_by(compare_results);

    Aggregation {
        total_users: users.len(),
        total_contacts_all: numbers.len(),
        users,
        skipped_rows,
    }
}

fn compare_results(a: &ResultRow, b: &ResultRow) -> Ordering {
    b.contacts
        .cmp(&a.contacts)
        .then_with(|| a.user.cmp(&b.user))
}

#[cfg(test)]
mod tests {
    use super::{aggregate, ResultRow};
    use crate::domain::NormalizedRow;

    fn row(number: &str, user: &str) -> NormalizedRow {
        NormalizedRow {
            contact_name: String::new(),
            contact_number: number.to_string(),
            user: user.to_string(),
        }
    }

    fn result(user: &str, contacts: usize) -> ResultRow {
        ResultRow {
            user: user.to_string(),
            contacts,
        }
    }

    #[test]
    fn duplicate_pairs_count_once() {
        let out = aggregate(&[row("111", "ana"), row("111", "ana"), row("222", "ana")]);
        assert_eq!(out.users, vec![result("ana", 2)]);
        assert_eq!(out.total_users, 1);
        assert_eq!(out.total_contacts_all, 2);
    }

    #[test]
    fn shared_number_counts_per_user_but_once_globally() {
        let out = aggregate(&[row("1-1-1", "bob"), row("111", "ana")]);
        assert_eq!(out.users, vec![result("ana", 1), result("bob", 1)]);
        assert_eq!(out.total_contacts_all, 1);
    }

    #[test]
    fn rows_without_user_or_digits_are_discarded() {
        let out = aggregate(&[
            row("999", ""),
            row("888", "   "),
            row("n/a", "ana"),
            row("", "ana"),
            row("111", "ana"),
        ]);
        assert_eq!(out.users, vec![result("ana", 1)]);
        assert_eq!(out.total_contacts_all, 1);
        assert_eq!(out.skipped_rows, 4);
    }

    #[test]
    fn users_are_trimmed_and_case_sensitive() {
        let out = aggregate(&[row("111", " ana "), row("111", "ana"), row("111", "Ana")]);
        assert_eq!(out.users, vec![result("Ana", 1), result("ana", 1)]);
    }

    #[test]
    fn formatting_variants_collapse_to_one_contact() {
        let out = aggregate(&[
            row("+54 9 11-2345-6789", "ana"),
            row("5491123456789", "ana"),
            row("(54) 9 1123456789", "ana"),
        ]);
        assert_eq!(out.users, vec![result("ana", 1)]);
        assert_eq!(out.total_contacts_all, 1);
    }

    #[test]
    fn results_sort_by_count_then_user() {
        let out = aggregate(&[
            row("1", "carol"),
            row("2", "bob"),
            row("3", "bob"),
            row("4", "alice"),
            row("5", "dave"),
            row("6", "dave"),
        ]);
        assert_eq!(
            out.users,
            vec![
                result("bob", 2),
                result("dave", 2),
                result("alice", 1),
                result("carol", 1),
            ]
        );
        for pair in out.users.windows(2) {
            assert!(pair[0].contacts >= pair[1].contacts);
            if pair[0].contacts == pair[1].contacts {
                assert!(pair[0].user <= pair[1].user);
            }
        }
    }

    #[test]
    fn aggregation_is_idempotent() {
        let rows = vec![
            row("111", "ana"),
            row("222", "bob"),
            row("111", "bob"),
            row("333", "ana"),
            row("111", "ana"),
        ];
        assert_eq!(aggregate(&rows), aggregate(&rows));
    }

    #[test]
    fn empty_input_yields_empty_aggregation() {
        let out = aggregate(&[]);
        assert!(out.users.is_empty());
        assert_eq!(out.total_users, 0);
        assert_eq!(out.total_contacts_all, 0);
    }
}
