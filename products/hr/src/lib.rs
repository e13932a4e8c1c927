//! HR module: the employee directory.
//!
//! [`EmployeeDirectory`] keeps the published employee list in sync with the
//! remote endpoint and falls back to seed data or locally kept records when
//! the endpoint is unavailable. [`EmployeeQuery`] and [`EmployeeForm`] are the
//! headless list view and creation form used by front-ends.

pub mod api;
pub mod directory;
pub mod employee;
pub mod envelope;
pub mod form;
pub mod query;
pub mod seed;

pub use api::{EmployeeApi, RestEmployeeApi};
pub use directory::{EmployeeDirectory, EmployeeSubscription};
pub use employee::{Employee, EmployeeDraft, UNASSIGNED_ID};
pub use envelope::{Envelope, normalize};
pub use form::{EmployeeForm, FieldError, FormErrors};
pub use query::{EmployeePage, EmployeeQuery, Sort, SortDirection, SortField, job_titles};
pub use seed::fallback_employees;
