//! Renders a [`Predicate`] into SQL over the `events e` alias.

use sqlx::{Postgres, QueryBuilder};

use crate::domain::predicate::Predicate;

pub fn push_predicate<'q>(qb: &mut QueryBuilder<'q, Postgres>, predicate: &Predicate) {
    match predicate {
        Predicate::Always => {
            qb.push("TRUE");
        }
        Predicate::StartOnOrAfter(date) => {
            qb.push("e.start_date >= ");
            qb.push_bind(*date);
        }
        Predicate::StartOnOrBefore(date) => {
            qb.push("e.start_date <= ");
            qb.push_bind(*date);
        }
        Predicate::StartInMonth { year, month } => {
            qb.push("(EXTRACT(YEAR FROM e.start_date) = ");
            qb.push_bind(*year);
            qb.push(" AND EXTRACT(MONTH FROM e.start_date) = ");
            qb.push_bind(i32::from(u8::from(*month)));
            qb.push(")");
        }
        Predicate::CountryIn(codes) if codes.is_empty() => {
            qb.push("FALSE");
        }
        Predicate::CountryIn(codes) => {
            qb.push("e.country = ANY(");
            qb.push_bind(
                codes
                    .iter()
                    .map(|code| code.as_str().to_string())
                    .collect::<Vec<_>>(),
            );
            qb.push(")");
        }
        Predicate::TopicIn(slugs) if slugs.is_empty() => {
            qb.push("FALSE");
        }
        Predicate::TopicIn(slugs) => {
            qb.push(
                "EXISTS (SELECT 1 FROM event_topics et INNER JOIN topics t ON t.id = et.topic_id WHERE et.event_id = e.id AND t.slug = ANY(",
            );
            qb.push_bind(slugs.clone());
            qb.push("))");
        }
        Predicate::All(clauses) => push_joined(qb, clauses, " AND ", "TRUE"),
        Predicate::Any(clauses) => push_joined(qb, clauses, " OR ", "FALSE"),
    }
}

fn push_joined<'q>(
    qb: &mut QueryBuilder<'q, Postgres>,
    clauses: &[Predicate],
    separator: &str,
    empty: &str,
) {
    if clauses.is_empty() {
        qb.push(empty);
        return;
    }

    qb.push("(");
    for (index, clause) in clauses.iter().enumerate() {
        if index > 0 {
            qb.push(separator);
        }
        push_predicate(qb, clause);
    }
    qb.push(")");
}
