#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    pub id: &'static str,
    pub name: &'static str,
    pub date_of_birth: &'static str,
    pub age: u8,
    pub treatment_start_date: &'static str,
    pub new_scan_date: Option<&'static str>,
}

pub const PATIENTS: &[Patient] = &[
    Patient {
        id: "alice",
        name: "Alice",
        date_of_birth: "1947-03-15",
        age: 78,
        treatment_start_date: "2024-01-15",
        new_scan_date: Some("2025-04-18"),
    },
    Patient {
        id: "bob",
        name: "Bob",
        date_of_birth: "1968-08-22",
        age: 56,
        treatment_start_date: "2023-11-08",
        new_scan_date: None,
    },
];

pub fn find_patient(id: &str) -> Option<&'static Patient> {
    PATIENTS.iter().find(|patient| patient.id == id)
}

impl Patient {
    pub fn mri_slug(&self) -> String {
        self.name.to_lowercase().replace(' ', "-")
    }
}
