//! Demo data set for local development and tests.
//!
//! `alan12@gmail.com` deliberately stores a numeric password.

use chrono::Utc;
use serde_json::{json, Value};

use super::errors::StoreResult;
use super::memory::MemoryStore;

/// Demo collections as a JSON value
pub fn demo_data() -> Value {
    let now = Utc::now().to_rfc3339();

    json!({
        "admin": [
            {
                "_id": "admin_001",
                "email": "admin@school.com",
                "password": "admin123",
                "name": "School Administrator",
                "created_at": now,
            },
            {
                "_id": "admin_002",
                "email": "parve123@gmail.com",
                "password": "12345678",
                "name": "Parve Admin",
                "created_at": now,
            }
        ],
        "teacher": [
            {
                "_id": "teacher_001",
                "email": "teacher1@school.com",
                "password": "teacher123",
                "name": "John Smith",
                "subject": "Mathematics",
                "phone": "+1234567890",
                "created_at": now,
            },
            {
                "_id": "teacher_002",
                "email": "teacher2@school.com",
                "password": "teacher456",
                "name": "Sarah Johnson",
                "subject": "English",
                "phone": "+1234567891",
                "created_at": now,
            }
        ],
        "student": [
            {
                "_id": "student_001",
                "email": "student1@school.com",
                "password": "student123",
                "name": "Alice Brown",
                "class": "10th",
                "parent_email": "parent1@email.com",
                "created_at": now,
            },
            {
                "_id": "student_002",
                "email": "alan12@gmail.com",
                "password": 12345678,
                "name": "Alan Wilson",
                "class": "11th",
                "parent_email": "parent2@email.com",
                "created_at": now,
            }
        ],
        "staff": [
            {
                "_id": "staff_001",
                "email": "staff1@school.com",
                "password": "staff123",
                "name": "Mike Davis",
                "department": "IT",
                "phone": "+1234567892",
                "created_at": now,
            }
        ],
        "grade": [
            {"id": 1, "name": "9th Grade", "description": "Ninth Grade", "created_at": now},
            {"id": 2, "name": "10th Grade", "description": "Tenth Grade", "created_at": now},
            {"id": 3, "name": "11th Grade", "description": "Eleventh Grade", "created_at": now},
            {"id": 4, "name": "12th Grade", "description": "Twelfth Grade", "created_at": now}
        ]
    })
}

/// Store pre-populated with the demo data set
pub fn demo_store() -> StoreResult<MemoryStore> {
    MemoryStore::from_value(demo_data())
}
