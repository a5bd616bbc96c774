pub mod deployment;
pub mod resume;
pub mod template;
pub mod upload;

pub use deployment::{DeployReceipt, DeployRequest, DeploymentRecord};
pub use resume::{Education, Experience, Project, ResumeData, Socials};
pub use template::Template;
pub use upload::{DocumentFormat, UploadConstraints, UploadRejection, UploadedFile};
