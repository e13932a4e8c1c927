use chrono::NaiveDate;

use crate::employee::Employee;

const SEED: [(i64, &str, &str, (i32, u32, u32), &str); 5] = [
    (1, "Ivan", "Horvat", (1985, 4, 12), "Developer"),
    (2, "Ana", "Kovačević", (1990, 9, 23), "Designer"),
    (3, "Marko", "Babić", (1978, 1, 30), "Manager"),
    (4, "Petra", "Marić", (1995, 6, 8), "Developer"),
    (5, "Luka", "Novak", (1988, 11, 17), "QA Engineer"),
];

/// Records served whenever the remote list cannot be read.
pub fn fallback_employees() -> Vec<Employee> {
    SEED.iter()
        .filter_map(|&(id, first, last, (y, m, d), title)| {
            Some(Employee {
                id,
                first_name: first.to_string(),
                last_name: last.to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(y, m, d)?,
                job_title: title.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_has_five_sequential_ids() {
        let ids: Vec<i64> = fallback_employees().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }
}
