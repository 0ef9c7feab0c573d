//! Job search: turns the public query string into a typed filter and binds it
//! into `sqlx::QueryBuilder` clauses shared by the page query and the count query.

use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};

use crate::errors::AppError;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;
/// Pages past this are clamped; it keeps `OFFSET` far from `i64` overflow.
pub const MAX_PAGE: i64 = 1_000_000;

/// Raw query string. Everything arrives as text so empty values can be ignored
/// and bad numbers reported with a readable message.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSearchQuery {
    pub job_type: Option<String>,
    pub employment_type: Option<String>,
    pub seniority_level: Option<String>,
    pub location: Option<String>,
    pub is_remote: Option<String>,
    pub min_salary: Option<String>,
    pub max_salary: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct JobFilter {
    pub job_type: Option<String>,
    pub employment_type: Option<String>,
    pub seniority_level: Option<String>,
    pub location: Option<String>,
    pub is_remote: Option<bool>,
    pub min_salary: Option<i32>,
    pub max_salary: Option<i32>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page (1-based).
    pub current: i64,
    /// Number of pages.
    pub total: i64,
    pub total_jobs: i64,
}

impl Pagination {
    pub fn new(page: PageRequest, total_jobs: i64) -> Self {
        let total = (total_jobs + page.limit - 1) / page.limit;
        Self {
            current: page.page,
            total,
            total_jobs,
        }
    }
}

impl JobSearchQuery {
    pub fn into_parts(self) -> Result<(JobFilter, PageRequest), AppError> {
        let filter = JobFilter {
            job_type: non_empty(self.job_type),
            employment_type: non_empty(self.employment_type),
            seniority_level: non_empty(self.seniority_level),
            location: non_empty(self.location),
            is_remote: non_empty(self.is_remote).map(|v| v.eq_ignore_ascii_case("true")),
            min_salary: parse_number("minSalary", self.min_salary)?,
            max_salary: parse_number("maxSalary", self.max_salary)?,
            search: non_empty(self.search),
        };

        let page = parse_number::<i64>("page", self.page)?
            .unwrap_or(1)
            .clamp(1, MAX_PAGE);
        let limit = parse_number::<i64>("limit", self.limit)?
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        Ok((filter, PageRequest { page, limit }))
    }
}

impl JobFilter {
    /// Appends ` AND ...` clauses for every active filter. The builder must already
    /// contain a `WHERE` clause.
    pub fn push_conditions<'a>(&'a self, qb: &mut QueryBuilder<'a, Postgres>) {
        if let Some(job_type) = &self.job_type {
            qb.push(" AND job_type = ").push_bind(job_type);
        }
        if let Some(employment_type) = &self.employment_type {
            qb.push(" AND employment_type = ").push_bind(employment_type);
        }
        if let Some(seniority_level) = &self.seniority_level {
            qb.push(" AND seniority_level = ").push_bind(seniority_level);
        }
        if let Some(location) = &self.location {
            qb.push(" AND location ILIKE ").push_bind(like_pattern(location));
        }
        if let Some(is_remote) = self.is_remote {
            qb.push(" AND is_remote = ").push_bind(is_remote);
        }
        if let Some(min_salary) = self.min_salary {
            qb.push(" AND salary >= ").push_bind(min_salary);
        }
        if let Some(max_salary) = self.max_salary {
            qb.push(" AND salary <= ").push_bind(max_salary);
        }
        if let Some(search) = &self.search {
            let pattern = like_pattern(search);
            qb.push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR company ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }

    /// Page of active jobs, newest first.
    pub fn select_query(&self, page: PageRequest) -> QueryBuilder<'_, Postgres> {
        let mut qb = QueryBuilder::new("SELECT * FROM jobs WHERE is_active = TRUE");
        self.push_conditions(&mut qb);
        qb.push(" ORDER BY posted_at DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        qb
    }

    /// Total number of active jobs matching the filter.
    pub fn count_query(&self) -> QueryBuilder<'_, Postgres> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM jobs WHERE is_active = TRUE");
        self.push_conditions(&mut qb);
        qb
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_number<T: std::str::FromStr>(field: &str, value: Option<String>) -> Result<Option<T>, AppError> {
    non_empty(value)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| AppError::Validation(format!("\"{field}\" must be a number")))
        })
        .transpose()
}

/// Wraps the term in `%` after escaping LIKE wildcards so user input matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> JobSearchQuery {
        let mut q = JobSearchQuery::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "jobType" => q.job_type = value,
                "employmentType" => q.employment_type = value,
                "seniorityLevel" => q.seniority_level = value,
                "location" => q.location = value,
                "isRemote" => q.is_remote = value,
                "minSalary" => q.min_salary = value,
                "maxSalary" => q.max_salary = value,
                "search" => q.search = value,
                "page" => q.page = value,
                "limit" => q.limit = value,
                other => panic!("unknown key {other}"),
            }
        }
        q
    }

    #[test]
    fn test_defaults() {
        let (filter, page) = JobSearchQuery::default().into_parts().unwrap();
        assert_eq!(filter, JobFilter::default());
        assert_eq!(page, PageRequest { page: 1, limit: 20 });
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_empty_values_ignored() {
        let (filter, _) = query(&[("jobType", ""), ("location", "  "), ("minSalary", "")])
            .into_parts()
            .unwrap();
        assert_eq!(filter, JobFilter::default());
    }

    #[test]
    fn test_is_remote_only_true_means_remote() {
        let (filter, _) = query(&[("isRemote", "true")]).into_parts().unwrap();
        assert_eq!(filter.is_remote, Some(true));
        let (filter, _) = query(&[("isRemote", "false")]).into_parts().unwrap();
        assert_eq!(filter.is_remote, Some(false));
        let (filter, _) = query(&[("isRemote", "yes")]).into_parts().unwrap();
        assert_eq!(filter.is_remote, Some(false));
    }

    #[test]
    fn test_bad_salary_rejected() {
        let err = query(&[("minSalary", "lots")]).into_parts().unwrap_err();
        assert!(err.to_string().contains("minSalary"));
    }

    #[test]
    fn test_page_and_limit_clamped() {
        let (_, page) = query(&[("page", "0"), ("limit", "1000")]).into_parts().unwrap();
        assert_eq!(page, PageRequest { page: 1, limit: MAX_PAGE_SIZE });
        let (_, page) = query(&[("page", "3"), ("limit", "0")]).into_parts().unwrap();
        assert_eq!(page, PageRequest { page: 3, limit: 1 });
        assert_eq!(page.offset(), 2);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let (_, page) = query(&[("page", "9223372036854775807"), ("limit", "100")])
            .into_parts()
            .unwrap();
        assert_eq!(page.page, MAX_PAGE);
        assert_eq!(page.offset(), (MAX_PAGE - 1) * 100);

        let (_, page) = query(&[("page", "-9223372036854775808")]).into_parts().unwrap();
        assert_eq!(page.offset(), 0);

        let raw = PageRequest { page: i64::MAX, limit: MAX_PAGE_SIZE };
        assert_eq!(raw.offset(), i64::MAX);
    }

    #[test]
    fn test_select_without_filters() {
        let filter = JobFilter::default();
        let page = PageRequest { page: 2, limit: 10 };
        let qb = filter.select_query(page);
        assert_eq!(
            qb.sql(),
            "SELECT * FROM jobs WHERE is_active = TRUE ORDER BY posted_at DESC LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn test_select_binds_every_filter() {
        let (filter, page) = query(&[
            ("jobType", "Developer"),
            ("employmentType", "Full-time"),
            ("seniorityLevel", "Senior"),
            ("location", "Berlin"),
            ("isRemote", "true"),
            ("minSalary", "50000"),
            ("maxSalary", "90000"),
            ("search", "rust"),
        ])
        .into_parts()
        .unwrap();

        let qb = filter.select_query(page);
        assert_eq!(
            qb.sql(),
            "SELECT * FROM jobs WHERE is_active = TRUE \
             AND job_type = $1 AND employment_type = $2 AND seniority_level = $3 \
             AND location ILIKE $4 AND is_remote = $5 AND salary >= $6 AND salary <= $7 \
             AND (title ILIKE $8 OR company ILIKE $9 OR description ILIKE $10) \
             ORDER BY posted_at DESC LIMIT $11 OFFSET $12"
        );
    }

    #[test]
    fn test_count_shares_conditions() {
        let (filter, _) = query(&[("location", "Remote"), ("maxSalary", "70000")])
            .into_parts()
            .unwrap();
        let qb = filter.count_query();
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM jobs WHERE is_active = TRUE AND location ILIKE $1 AND salary <= $2"
        );
    }

    #[test]
    fn test_user_input_never_in_sql() {
        let (filter, page) = query(&[("search", "'; DROP TABLE jobs; --")])
            .into_parts()
            .unwrap();
        assert!(!filter.select_query(page).sql().contains("DROP"));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("dev"), "%dev%");
    }

    #[test]
    fn test_pagination_page_count() {
        let page = PageRequest { page: 1, limit: 20 };
        assert_eq!(Pagination::new(page, 0).total, 0);
        assert_eq!(Pagination::new(page, 20).total, 1);
        assert_eq!(Pagination::new(page, 21).total, 2);
        assert_eq!(Pagination::new(page, 45).total_jobs, 45);
    }
}
