use rusqlite::Connection;

use crate::error::Result;

/// Initialise the job-queue schema in `conn`.
///
/// A single table backs every named FIFO queue (`profile`, `topic`, `event`,
/// `dispatcher`, ...); `id` is an autoincrementing surrogate that gives us
/// FIFO ordering for free (`ORDER BY id LIMIT 1` is the head of the queue).
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS job_queue (
            id          INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
            queue_name  TEXT    NOT NULL,
            task_id     TEXT    NOT NULL,
            session_id  TEXT    NOT NULL,
            timestamp   INTEGER NOT NULL,
            retry       INTEGER NOT NULL DEFAULT 0,
            payload     TEXT    NOT NULL
        ) STRICT;

        CREATE INDEX IF NOT EXISTS idx_job_queue_name ON job_queue (queue_name, id);
        CREATE INDEX IF NOT EXISTS idx_job_queue_session ON job_queue (queue_name, session_id);
        ",
    )?;
    Ok(())
}
