use rusqlite::Connection;

use crate::error::Result;

/// Initialise every artifact table (safe to call on every startup).
pub fn init_db(conn: &Connection) -> Result<()> {
    create_session_messages(conn)?;
    create_user_portrait(conn)?;
    create_topic_summary(conn)?;
    create_topic_info(conn)?;
    create_chat_event(conn)?;
    Ok(())
}

fn create_session_messages(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS session_messages (
            id                 TEXT PRIMARY KEY,
            session_id         TEXT NOT NULL,
            user_content       TEXT NOT NULL DEFAULT '',
            assistant_content  TEXT NOT NULL DEFAULT '',
            created_at         TEXT NOT NULL,
            messages_id        TEXT NOT NULL,
            task1_id           TEXT NOT NULL DEFAULT '',
            task2_id           TEXT NOT NULL DEFAULT '',
            task3_id           TEXT NOT NULL DEFAULT '',
            task4_id           TEXT NOT NULL DEFAULT '',
            status             TEXT NOT NULL DEFAULT 'active'
        );
        CREATE INDEX IF NOT EXISTS idx_session_messages_session
            ON session_messages(session_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_session_messages_task1
            ON session_messages(session_id, task1_id);
        CREATE INDEX IF NOT EXISTS idx_session_messages_task2
            ON session_messages(session_id, task2_id);
        CREATE INDEX IF NOT EXISTS idx_session_messages_task3
            ON session_messages(session_id, task3_id);
        CREATE INDEX IF NOT EXISTS idx_session_messages_task4
            ON session_messages(session_id, task4_id);",
    )?;
    Ok(())
}

fn create_user_portrait(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS user_portrait (
            id          TEXT PRIMARY KEY,
            session_id  TEXT NOT NULL UNIQUE,
            portrait    TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );",
    )?;
    Ok(())
}

fn create_topic_summary(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS topic_summary (
            row_id      INTEGER PRIMARY KEY AUTOINCREMENT,
            id          TEXT NOT NULL UNIQUE,
            session_id  TEXT NOT NULL,
            topic       TEXT NOT NULL,
            content     TEXT NOT NULL,
            keywords    TEXT NOT NULL DEFAULT '[]',
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_topic_summary_session
            ON topic_summary(session_id, topic);

        CREATE VIRTUAL TABLE IF NOT EXISTS topic_summary_fts
            USING fts5(topic, keywords, content, content='topic_summary', content_rowid='row_id');

        CREATE TRIGGER IF NOT EXISTS topic_summary_ai AFTER INSERT ON topic_summary BEGIN
            INSERT INTO topic_summary_fts(rowid, topic, keywords, content)
            VALUES (new.row_id, new.topic, new.keywords, new.content);
        END;
        CREATE TRIGGER IF NOT EXISTS topic_summary_ad AFTER DELETE ON topic_summary BEGIN
            INSERT INTO topic_summary_fts(topic_summary_fts, rowid, topic, keywords, content)
            VALUES ('delete', old.row_id, old.topic, old.keywords, old.content);
        END;
        CREATE TRIGGER IF NOT EXISTS topic_summary_au AFTER UPDATE ON topic_summary BEGIN
            INSERT INTO topic_summary_fts(topic_summary_fts, rowid, topic, keywords, content)
            VALUES ('delete', old.row_id, old.topic, old.keywords, old.content);
            INSERT INTO topic_summary_fts(rowid, topic, keywords, content)
            VALUES (new.row_id, new.topic, new.keywords, new.content);
        END;",
    )?;
    Ok(())
}

fn create_topic_info(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS topic_info (
            session_id    TEXT PRIMARY KEY,
            topic_count   INTEGER NOT NULL DEFAULT 0,
            active_topics TEXT NOT NULL DEFAULT '[]',
            updated_at    TEXT NOT NULL
        );",
    )?;
    Ok(())
}

fn create_chat_event(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS chat_event (
            id              TEXT PRIMARY KEY,
            session_id      TEXT NOT NULL,
            created_at      TEXT NOT NULL,
            event           TEXT NOT NULL,
            execution_time  TEXT NOT NULL,
            event_type      INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_chat_event_session
            ON chat_event(session_id, event_type, execution_time DESC);",
    )?;
    Ok(())
}
