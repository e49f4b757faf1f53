pub mod course;
pub mod enrollment;

pub use course::{Course, NewCourse};
pub use enrollment::{EnrolledCourse, Enrollment, EnrollmentStatus};
