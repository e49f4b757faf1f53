pub mod catalog;
pub mod enrollment;

pub use catalog::{CatalogPage, CatalogService, CourseFilter};
pub use enrollment::{CourseDetail, EnrollmentService};
