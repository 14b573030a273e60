//! Project-to-defend model.
//!
//! A project arrives with its jury and supervision already decided.
//! Roles matter for display and notification; for conflict checking a
//! project is reduced to the deduplicated set of people who must attend.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Defense jury.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Jury {
    /// Jury president (person id).
    pub president: String,
    /// Examiner (person id).
    pub examiner: String,
}

impl Jury {
    /// Creates a jury.
    pub fn new(president: impl Into<String>, examiner: impl Into<String>) -> Self {
        Self {
            president: president.into(),
            examiner: examiner.into(),
        }
    }
}

/// Academic supervision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Supervision {
    /// Supervisor (person id).
    pub supervisor: String,
    /// Optional co-supervisor (person id).
    pub co_supervisor: Option<String>,
}

impl Supervision {
    /// Creates a supervision with no co-supervisor.
    pub fn new(supervisor: impl Into<String>) -> Self {
        Self {
            supervisor: supervisor.into(),
            co_supervisor: None,
        }
    }

    /// Sets the co-supervisor.
    pub fn with_co_supervisor(mut self, co_supervisor: impl Into<String>) -> Self {
        self.co_supervisor = Some(co_supervisor.into());
        self
    }
}

/// Role a person plays in a defense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JuryRole {
    President,
    Examiner,
    Supervisor,
    CoSupervisor,
}

impl fmt::Display for JuryRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JuryRole::President => "president",
            JuryRole::Examiner => "examiner",
            JuryRole::Supervisor => "supervisor",
            JuryRole::CoSupervisor => "co-supervisor",
        };
        f.write_str(label)
    }
}

/// An approved project awaiting its defense.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    /// Unique project identifier.
    pub id: String,
    /// Project title.
    pub title: String,
    /// Study track, informational (callers often order projects by it).
    pub option: Option<String>,
    /// Jury.
    pub jury: Jury,
    /// Supervision.
    pub supervision: Supervision,
    /// Student ids (1-2). Not a scheduling constraint.
    pub students: Vec<String>,
}

impl Project {
    /// Creates a project.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        jury: Jury,
        supervision: Supervision,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            option: None,
            jury,
            supervision,
            students: Vec::new(),
        }
    }

    /// Sets the study track.
    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.option = Some(option.into());
        self
    }

    /// Adds a student.
    pub fn with_student(mut self, student: impl Into<String>) -> Self {
        self.students.push(student.into());
        self
    }

    /// Every (role, person) pair, in role order.
    pub fn participants(&self) -> Vec<(JuryRole, &str)> {
        let mut out = vec![
            (JuryRole::President, self.jury.president.as_str()),
            (JuryRole::Examiner, self.jury.examiner.as_str()),
            (JuryRole::Supervisor, self.supervision.supervisor.as_str()),
        ];
        if let Some(co) = &self.supervision.co_supervisor {
            out.push((JuryRole::CoSupervisor, co.as_str()));
        }
        out
    }

    /// People who must be free for this defense.
    ///
    /// Deduplicated; order follows role order with the first occurrence kept.
    pub fn constrained_persons(&self) -> Vec<String> {
        let mut persons: Vec<String> = Vec::with_capacity(4);
        for (_, person) in self.participants() {
            if !persons.iter().any(|p| p == person) {
                persons.push(person.to_string());
            }
        }
        persons
    }

    /// Roles a given person holds in this project.
    pub fn roles_of(&self, person_id: &str) -> Vec<JuryRole> {
        self.participants()
            .into_iter()
            .filter(|(_, p)| *p == person_id)
            .map(|(role, _)| role)
            .collect()
    }
}
