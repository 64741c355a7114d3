use chrono::{DateTime, Utc};
use mongodb::bson::{self, doc, oid::ObjectId, Document};
use serde::{Deserialize, Serialize};

/// Stored student record, collection `students`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    pub course: String,
    pub grade: f64,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a student. All business fields are required.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub course: String,
    pub grade: f64,
}

/// Input for updating a student. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub course: Option<String>,
    pub grade: Option<f64>,
}

impl Student {
    /// Build a fresh record; id and both timestamps are assigned here, once.
    pub fn create(new: NewStudent) -> Self {
        // BSON datetimes carry millisecond precision; truncate up front so the
        // returned record matches what a later read yields.
        let now = bson::DateTime::now().to_chrono();
        Self {
            id: ObjectId::new(),
            name: new.name,
            email: new.email,
            course: new.course,
            grade: new.grade,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a patch in place and refresh `updated_at`.
    pub fn apply(&mut self, patch: StudentPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(course) = patch.course {
            self.course = course;
        }
        if let Some(grade) = patch.grade {
            self.grade = grade;
        }
        self.updated_at = now;
    }
}

impl StudentPatch {
    /// `$set` document for the patched fields plus `updatedAt`.
    pub fn to_update(&self, now: DateTime<Utc>) -> Document {
        let mut set = doc! { "updatedAt": bson::DateTime::from_chrono(now) };
        if let Some(name) = &self.name {
            set.insert("name", name.as_str());
        }
        if let Some(email) = &self.email {
            set.insert("email", email.as_str());
        }
        if let Some(course) = &self.course {
            set.insert("course", course.as_str());
        }
        if let Some(grade) = self.grade {
            set.insert("grade", grade);
        }
        doc! { "$set": set }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Student {
        Student::create(NewStudent {
            name: "Jane Doe".to_string(),
            email: "jane.doe@example.com".to_string(),
            course: "Mathematics".to_string(),
            grade: 90.0,
        })
    }

    #[test]
    fn create_sets_equal_timestamps() {
        let student = sample();
        assert_eq!(student.created_at, student.updated_at);
        assert_eq!(student.created_at.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn apply_only_touches_patched_fields() {
        let mut student = sample();
        let before = student.clone();
        let later = before.updated_at + chrono::Duration::seconds(5);

        student.apply(
            StudentPatch {
                grade: Some(95.0),
                ..Default::default()
            },
            later,
        );

        assert_eq!(student.grade, 95.0);
        assert_eq!(student.name, before.name);
        assert_eq!(student.email, before.email);
        assert_eq!(student.course, before.course);
        assert_eq!(student.id, before.id);
        assert_eq!(student.created_at, before.created_at);
        assert_eq!(student.updated_at, later);
    }

    #[test]
    fn update_document_sets_only_present_fields() {
        let patch = StudentPatch {
            course: Some("Physics".to_string()),
            ..Default::default()
        };
        let update = patch.to_update(Utc::now());
        let set = update.get_document("$set").unwrap();

        assert_eq!(set.get_str("course").unwrap(), "Physics");
        assert!(set.contains_key("updatedAt"));
        assert!(!set.contains_key("name"));
        assert!(!set.contains_key("grade"));
    }

    #[test]
    fn bson_round_trip_uses_wire_field_names() {
        let student = sample();
        let document = bson::to_document(&student).unwrap();

        assert!(document.get_object_id("_id").is_ok());
        assert!(document.get_datetime("createdAt").is_ok());
        assert!(document.get_datetime("updatedAt").is_ok());

        let back: Student = bson::from_document(document).unwrap();
        assert_eq!(back, student);
    }
}
