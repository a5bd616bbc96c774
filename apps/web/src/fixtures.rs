//! Shared test fixtures.

use crate::models::{Education, Experience, Project, ResumeData, Socials};

/// A resume with every field populated.
pub fn full_resume() -> ResumeData {
    ResumeData {
        name: Some("Jane Doe".into()),
        email: Some("jane@x.com".into()),
        phone: Some("+1-555-0100".into()),
        location: Some("Lisbon, PT".into()),
        socials: [
            ("github", Some("https://github.com/jane")),
            ("linkedin", None),
            ("website", Some("https://jane.dev")),
        ]
        .into_iter()
        .collect::<Socials>(),
        skills: vec!["Go".into(), "Rust".into(), "SQL".into()],
        experience: vec![
            Experience {
                title: "Staff Engineer".into(),
                company: "Acme".into(),
                duration: "2021 - Present".into(),
                description: "Led the storage team".into(),
            },
            Experience {
                title: "Engineer".into(),
                company: "Initech".into(),
                duration: "2017 - 2021".into(),
                description: "Built billing".into(),
            },
        ],
        projects: vec![Project {
            name: "Ledger".into(),
            description: "Double-entry bookkeeping".into(),
            technologies: Some("Rust, Postgres".into()),
            link: Some("https://github.com/jane/ledger".into()),
        }],
        education: vec![Education {
            degree: "BSc Computer Science".into(),
            institution: "MIT".into(),
            year: "2017".into(),
            details: None,
        }],
    }
}

/// `{name:"Jane Doe", email:"jane@x.com", skills:["Go","Rust"]}` with empty lists.
pub fn jane_doe() -> ResumeData {
    ResumeData {
        name: Some("Jane Doe".into()),
        email: Some("jane@x.com".into()),
        skills: vec!["Go".into(), "Rust".into()],
        ..ResumeData::default()
    }
}
