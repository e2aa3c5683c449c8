//! Default accounts for a fresh installation.

use crate::auth::hash_password;
use crate::db::{AttendanceMark, GradeMark, Repository};
use crate::errors::AppError;
use crate::models::{NewUser, Role, RoleProfile};

const DEMO_CLASS: &str = "3rd Year - ECE A";

struct TeacherSeed {
    username: &'static str,
    password: &'static str,
    name: &'static str,
    email: &'static str,
    subjects: [&'static str; 2],
    classes: [&'static str; 2],
}

const DEMO_TEACHER: TeacherSeed = TeacherSeed {
    username: "teacher1",
    password: "teacher123",
    name: "John Smith",
    email: "john.smith@college.edu",
    subjects: ["Mathematics", "Physics"],
    classes: [DEMO_CLASS, "2nd Year - ECE B"],
};

const EXTRA_TEACHERS: [TeacherSeed; 2] = [
    TeacherSeed {
        username: "teacher2",
        password: "teacher2123",
        name: "Jane Smith",
        email: "jane.smith@college.edu",
        subjects: ["Chemistry", "Electronics"],
        classes: ["CSE Year 2", "EEE Year 1"],
    },
    TeacherSeed {
        username: "teacher3",
        password: "teacher3123",
        name: "Robert Brown",
        email: "robert.brown@college.edu",
        subjects: ["Mechanics", "Civil Drawing"],
        classes: ["ME Year 1", "CE Year 1"],
    },
];

/// Seed the demo admin, teacher and students when no `admin` account
/// exists, then add the extra teachers that are missing. Accounts whose
/// username is already taken are left alone.
pub async fn seed_defaults(repo: &Repository) -> Result<(), AppError> {
    if !repo.username_exists("admin").await? {
        seed_demo_campus(repo).await?;
    }

    for seed in &EXTRA_TEACHERS {
        if repo.username_exists(seed.username).await? {
            continue;
        }
        repo.create_user(&teacher(seed).await?).await?;
    }

    Ok(())
}

async fn seed_demo_campus(repo: &Repository) -> Result<(), AppError> {
    tracing::info!("Seeding default campus accounts");

    repo.create_user(&NewUser {
        username: "admin".to_string(),
        password_hash: hash_password("admin123").await?,
        name: "Admin User".to_string(),
        email: Some("admin@college.edu".to_string()),
        profile: RoleProfile::Admin,
    })
    .await?;

    let teacher_id = match repo.find_login(DEMO_TEACHER.username, Role::Teacher).await? {
        Some((existing, _)) => Some(existing.id),
        None => {
            if repo.username_exists(DEMO_TEACHER.username).await? {
                None
            } else {
                Some(repo.create_user(&teacher(&DEMO_TEACHER).await?).await?.id)
            }
        }
    };

    for i in 1..=5 {
        let username = format!("student{}", i);
        if repo.username_exists(&username).await? {
            tracing::debug!("Default account {} already exists", username);
            continue;
        }

        let student = repo
            .create_user(&NewUser {
                password_hash: hash_password(&username).await?,
                name: format!("Student {}", i),
                email: Some(format!("{}@college.edu", username)),
                profile: RoleProfile::Student {
                    class: DEMO_CLASS.to_string(),
                    roll_number: Some(format!("ECE/2023/{:03}", i)),
                },
                username,
            })
            .await?;

        let Some(teacher_id) = teacher_id.as_deref() else {
            continue;
        };

        repo.upsert_attendance(
            DEMO_CLASS,
            "2023-10-15",
            "Mathematics",
            teacher_id,
            &[AttendanceMark {
                student_id: &student.id,
                status: true,
            }],
        )
        .await?;

        repo.upsert_grades(
            DEMO_CLASS,
            "Mathematics",
            "Mid Term",
            teacher_id,
            &[GradeMark {
                student_id: &student.id,
                marks: 85.0,
            }],
        )
        .await?;
    }

    Ok(())
}

async fn teacher(seed: &TeacherSeed) -> Result<NewUser, AppError> {
    Ok(NewUser {
        username: seed.username.to_string(),
        password_hash: hash_password(seed.password).await?,
        name: seed.name.to_string(),
        email: Some(seed.email.to_string()),
        profile: RoleProfile::Teacher {
            subjects: seed.subjects.iter().map(|s| s.to_string()).collect(),
            classes: seed.classes.iter().map(|s| s.to_string()).collect(),
        },
    })
}
