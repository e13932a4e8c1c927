use std::{cmp::Ordering, collections::BTreeSet, str::FromStr};

use thiserror::Error;

use crate::employee::Employee;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortField {
    #[default]
    Id,
    FirstName,
    LastName,
    DateOfBirth,
    JobTitle,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown sort field `{0}` (expected id, first-name, last-name, date-of-birth or job-title)")]
pub struct UnknownSortField(pub String);

impl FromStr for SortField {
    type Err = UnknownSortField;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key: String = value
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "id" => Ok(SortField::Id),
            "firstname" => Ok(SortField::FirstName),
            "lastname" => Ok(SortField::LastName),
            "dateofbirth" | "dob" => Ok(SortField::DateOfBirth),
            "jobtitle" => Ok(SortField::JobTitle),
            _ => Err(UnknownSortField(value.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Sort {
    fn compare(&self, a: &Employee, b: &Employee) -> Ordering {
        let ordering = match self.field {
            SortField::Id => a.id.cmp(&b.id),
            SortField::FirstName => compare_text(&a.first_name, &b.first_name),
            SortField::LastName => compare_text(&a.last_name, &b.last_name),
            SortField::DateOfBirth => a.date_of_birth.cmp(&b.date_of_birth),
            SortField::JobTitle => compare_text(&a.job_title, &b.job_title),
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Table view over a list of employees: name filter, job title filter,
/// ordering and a page window.
#[derive(Clone, Debug)]
pub struct EmployeeQuery {
    pub search: Option<String>,
    pub job_title: Option<String>,
    pub sort: Option<Sort>,
    /// Zero-based.
    pub page: usize,
    pub page_size: usize,
}

impl Default for EmployeeQuery {
    fn default() -> Self {
        Self {
            search: None,
            job_title: None,
            sort: None,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmployeePage {
    pub items: Vec<Employee>,
    /// Rows matching the filters, across all pages.
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl EmployeePage {
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size.max(1))
    }
}

impl EmployeeQuery {
    pub fn apply(&self, records: &[Employee]) -> EmployeePage {
        let search = normalized_filter(self.search.as_deref());
        let job_title = normalized_filter(self.job_title.as_deref());

        let mut matched: Vec<&Employee> = records
            .iter()
            .filter(|e| search.as_deref().is_none_or(|term| matches_search(e, term)))
            .filter(|e| {
                job_title
                    .as_deref()
                    .is_none_or(|title| e.job_title.to_lowercase() == title)
            })
            .collect();

        if let Some(sort) = self.sort {
            matched.sort_by(|a, b| sort.compare(a, b));
        }

        let page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        let total = matched.len();
        let items = matched
            .into_iter()
            .skip(self.page.saturating_mul(page_size))
            .take(page_size)
            .cloned()
            .collect();

        EmployeePage {
            items,
            total,
            page: self.page,
            page_size,
        }
    }
}

/// `term` must already be trimmed and lower-cased.
pub fn matches_search(employee: &Employee, term: &str) -> bool {
    let first = employee.first_name.to_lowercase();
    let last = employee.last_name.to_lowercase();
    first.contains(term) || last.contains(term) || format!("{first} {last}").contains(term)
}

/// Distinct job titles, sorted, for the title filter selector.
pub fn job_titles(records: &[Employee]) -> Vec<String> {
    records
        .iter()
        .map(|e| e.job_title.trim().to_string())
        .filter(|title| !title.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn normalized_filter(value: Option<&str>) -> Option<String> {
    value.and_then(|input| {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_lowercase())
        }
    })
}
