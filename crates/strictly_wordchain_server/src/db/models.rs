//! Database models.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;

use crate::db::schema;

/// A player's persistent score.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Getters)]
#[diesel(table_name = schema::scores)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Score {
    player_id: String,
    points: i64,
    updated_at: NaiveDateTime,
}

/// Insertable score row.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::scores)]
pub struct NewScore {
    player_id: String,
    points: i64,
    updated_at: NaiveDateTime,
}
