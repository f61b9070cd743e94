//! Built-in sample data for `EDUADMIN_OFFLINE=1`.

use eduadmin_core::{Record, StaticListSource};
use serde_json::json;

/// Owner id the offline session pretends to be.
pub(crate) const OFFLINE_USER_ID: u64 = 1;

const SUBJECTS: [(u64, &str); 3] = [(1, "Mathematics"), (2, "Physics"), (3, "History")];

const TOPICS: [(u64, u64, &str); 8] = [
    (1, 1, "Fractions"),
    (2, 1, "Geometry"),
    (3, 1, "Algebra"),
    (4, 2, "Kinematics"),
    (5, 2, "Optics"),
    (6, 3, "Ancient Rome"),
    (7, 3, "Industrial Revolution"),
    (8, 1, "Probability"),
];

/// Every question title, as `(topic id, title)`.
const QUESTIONS: [(u64, &str); 18] = [
    (1, "Which fraction equals one half?"),
    (1, "Simplify 6/8"),
    (1, "Add 1/3 and 1/6"),
    (2, "Sum of angles in a triangle"),
    (2, "Area of a circle with radius 2"),
    (2, "How many faces does a cube have?"),
    (3, "Solve 2x + 3 = 11"),
    (3, "Factor x^2 - 9"),
    (4, "Units of acceleration"),
    (4, "Distance after 3 s at 4 m/s"),
    (5, "Which lens converges light?"),
    (5, "Speed of light in vacuum"),
    (6, "First emperor of Rome"),
    (6, "Year of the founding of Rome (legend)"),
    (7, "Where did the Industrial Revolution begin?"),
    (7, "Who improved the steam engine?"),
    (8, "Probability of heads on a fair coin"),
    (8, "Outcomes when rolling two dice"),
];

pub(crate) fn offline_source() -> StaticListSource {
    let subjects = SUBJECTS
        .iter()
        .map(|(id, name)| {
            Record::new(*id)
                .with_document_id(format!("subject-{id}"))
                .with_field("name", *name)
        })
        .collect();
    let topics = TOPICS
        .iter()
        .map(|(id, subject, name)| {
            Record::new(*id)
                .with_document_id(format!("topic-{id}"))
                .with_field("name", *name)
                .with_field("subject", json!({ "id": subject }))
        })
        .collect();
    let questions = QUESTIONS
        .iter()
        .enumerate()
        .map(|(index, (topic, title))| {
            let id = index as u64 + 1;
            let subject = TOPICS
                .iter()
                .find(|(topic_id, _, _)| topic_id == topic)
                .map(|(_, subject, _)| *subject)
                .unwrap_or_default();
            Record::new(id)
                .with_field("title", *title)
                .with_field("topic", *topic)
                .with_field("subject", subject)
                .with_field("author", if id % 3 == 0 { OFFLINE_USER_ID } else { 2 })
        })
        .collect();

    StaticListSource::new()
        .with_table("subjects", subjects)
        .with_table("topics", topics)
        .with_table("questions", questions)
}
