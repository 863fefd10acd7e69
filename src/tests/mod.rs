mod question_sync;
mod question_sync_db;
