use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{Assignment, Event, EventType, Submission};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ImportKind {
    Assignments,
    Events,
}

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

async fn upsert_assignment(
    pool: &PgPool,
    source_key: &str,
    title: &str,
    description: Option<&str>,
    due_date: Option<DateTime<Utc>>,
) -> anyhow::Result<i64> {
    let id: i64 = sqlx::query(
        r#"
        INSERT INTO student_deadlines.assignments (title, description, due_date, source_key)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (source_key) DO UPDATE
        SET title = EXCLUDED.title, description = EXCLUDED.description, due_date = EXCLUDED.due_date
        RETURNING id
        "#,
    )
    .bind(title)
    .bind(description)
    .bind(due_date)
    .bind(source_key)
    .fetch_one(pool)
    .await?
    .get("id");

    Ok(id)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let student_id = Uuid::parse_str("3d7f5d6f-24f7-4e8e-8b4b-3e7e44b4a7b2")?;
    sqlx::query(
        r#"
        INSERT INTO student_deadlines.students (id, full_name, email)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE SET full_name = EXCLUDED.full_name
        "#,
    )
    .bind(student_id)
    .bind("Avery Lee")
    .bind("avery.lee@groupscholar.com")
    .execute(pool)
    .await?;

    let now = Utc::now();
    let assignments = vec![
        (
            "seed-a-001",
            "Statistics problem set 4",
            "Exercises 4.1 through 4.12",
            Some(now + Duration::hours(10)),
        ),
        (
            "seed-a-002",
            "Scholarship essay draft",
            "First full draft, 800 words",
            Some(now + Duration::days(2)),
        ),
        (
            "seed-a-003",
            "Capstone proposal",
            "One-page outline reviewed with your mentor",
            Some(now + Duration::days(21)),
        ),
        (
            "seed-a-004",
            "Reading reflection",
            "Reflection on week 5 readings",
            Some(now - Duration::days(3)),
        ),
        (
            "seed-a-005",
            "Financial aid checklist",
            "Upload the remaining verification documents",
            None,
        ),
    ];

    let mut assignment_ids = Vec::new();
    for (source_key, title, description, due_date) in assignments {
        let id = upsert_assignment(pool, source_key, title, Some(description), due_date).await?;
        assignment_ids.push((source_key, id));
    }

    let events = vec![
        (
            "seed-e-001",
            "Calculus workshop",
            "Limits and continuity review",
            now + Duration::days(1),
            EventType::Class,
            false,
            Some("Room 204"),
        ),
        (
            "seed-e-002",
            "Internship search webinar",
            "Career services walkthrough",
            now + Duration::days(4),
            EventType::Webinar,
            true,
            None,
        ),
        (
            "seed-e-003",
            "Weekly quiz 6",
            "Covers units 5 and 6",
            now - Duration::days(2),
            EventType::WeeklyTest,
            true,
            None,
        ),
    ];

    for (source_key, title, description, start, event_type, is_online, location) in events {
        sqlx::query(
            r#"
            INSERT INTO student_deadlines.events
            (title, description, start_datetime, event_type, is_online, location, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (source_key) DO UPDATE
            SET start_datetime = EXCLUDED.start_datetime
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(start)
        .bind(event_type.as_str())
        .bind(is_online)
        .bind(location)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    let submissions = vec![
        ("5b0c6a8e-0d6f-4b9e-9a57-8d3a1f0e2c11", "seed-a-004", true),
        ("a1f2e3d4-5c6b-4a79-8e1d-2c3b4a5f6e70", "seed-a-002", false),
    ];

    for (id, source_key, is_graded) in submissions {
        let assignment_id = assignment_ids
            .iter()
            .find(|(key, _)| *key == source_key)
            .map(|(_, id)| *id)
            .context("seed submission references unknown assignment")?;

        sqlx::query(
            r#"
            INSERT INTO student_deadlines.submissions (id, assignment_id, student_id, is_graded)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET is_graded = EXCLUDED.is_graded
            "#,
        )
        .bind(Uuid::parse_str(id)?)
        .bind(assignment_id)
        .bind(student_id)
        .bind(is_graded)
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn find_student_id(pool: &PgPool, email: &str) -> anyhow::Result<Uuid> {
    let row = sqlx::query("SELECT id FROM student_deadlines.students WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?
        .with_context(|| format!("no student registered with email {email}"))?;

    Ok(row.get("id"))
}

pub async fn fetch_active_assignments(pool: &PgPool) -> anyhow::Result<Vec<Assignment>> {
    let rows = sqlx::query(
        "SELECT id, title, description, due_date, created_at \
         FROM student_deadlines.assignments \
         WHERE is_active \
         ORDER BY due_date NULLS LAST, id",
    )
    .fetch_all(pool)
    .await?;

    let mut assignments = Vec::with_capacity(rows.len());
    for row in rows {
        let description: Option<String> = row.get("description");
        assignments.push(Assignment {
            id: row.get("id"),
            title: row.get("title"),
            description: description.unwrap_or_default(),
            due_date: row.get("due_date"),
            created_at: row.get("created_at"),
        });
    }

    Ok(assignments)
}

const EVENT_COLUMNS: &str =
    "id, title, description, start_datetime, event_type, is_online, location";

fn event_from_row(row: &PgRow) -> Event {
    let description: Option<String> = row.get("description");
    let event_type: String = row.get("event_type");
    Event {
        id: row.get("id"),
        title: row.get("title"),
        description: description.unwrap_or_default(),
        start_datetime: row.get("start_datetime"),
        event_type: EventType::parse(&event_type),
        is_online: row.get("is_online"),
        location: row.get("location"),
    }
}

/// Events starting in `[from, until]`, soonest first.
pub async fn fetch_upcoming_events(
    pool: &PgPool,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
    limit: i64,
) -> anyhow::Result<Vec<Event>> {
    let query = format!(
        "SELECT {EVENT_COLUMNS} \
         FROM student_deadlines.events \
         WHERE start_datetime >= $1 AND start_datetime <= $2 \
         ORDER BY start_datetime, id \
         LIMIT $3"
    );
    let rows = sqlx::query(&query)
        .bind(from)
        .bind(until)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(event_from_row).collect())
}

/// Events starting in `[since, until)`, most recent first.
pub async fn fetch_past_events(
    pool: &PgPool,
    since: DateTime<Utc>,
    until: DateTime<Utc>,
    limit: i64,
) -> anyhow::Result<Vec<Event>> {
    let query = format!(
        "SELECT {EVENT_COLUMNS} \
         FROM student_deadlines.events \
         WHERE start_datetime >= $1 AND start_datetime < $2 \
         ORDER BY start_datetime DESC, id \
         LIMIT $3"
    );
    let rows = sqlx::query(&query)
        .bind(since)
        .bind(until)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(event_from_row).collect())
}

pub async fn fetch_my_submissions(
    pool: &PgPool,
    student_id: Uuid,
) -> anyhow::Result<Vec<Submission>> {
    let rows = sqlx::query(
        "SELECT assignment_id, is_graded \
         FROM student_deadlines.submissions \
         WHERE student_id = $1 \
         ORDER BY submitted_at",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Submission {
            assignment_id: row.get("assignment_id"),
            is_graded: row.get("is_graded"),
        })
        .collect())
}

pub async fn import_csv(
    pool: &PgPool,
    kind: ImportKind,
    csv_path: &std::path::Path,
) -> anyhow::Result<usize> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;

    match kind {
        ImportKind::Assignments => import_assignments(pool, &mut reader).await,
        ImportKind::Events => import_events(pool, &mut reader).await,
    }
}

async fn import_assignments(
    pool: &PgPool,
    reader: &mut csv::Reader<std::fs::File>,
) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        title: String,
        description: Option<String>,
        due_date: Option<DateTime<Utc>>,
        source_key: Option<String>,
    }

    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let result = sqlx::query(
            r#"
            INSERT INTO student_deadlines.assignments (title, description, due_date, source_key)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(&row.title)
        .bind(&row.description)
        .bind(row.due_date)
        .bind(source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}

async fn import_events(
    pool: &PgPool,
    reader: &mut csv::Reader<std::fs::File>,
) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        title: String,
        description: Option<String>,
        start_datetime: DateTime<Utc>,
        event_type: String,
        is_online: bool,
        location: Option<String>,
        source_key: Option<String>,
    }

    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let result = sqlx::query(
            r#"
            INSERT INTO student_deadlines.events
            (title, description, start_datetime, event_type, is_online, location, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(&row.title)
        .bind(&row.description)
        .bind(row.start_datetime)
        .bind(EventType::parse(&row.event_type).as_str())
        .bind(row.is_online)
        .bind(&row.location)
        .bind(source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}
