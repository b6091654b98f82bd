/// Database connection pool type
pub type DbPool = sqlx::PgPool;

/// Database connection type - supports both pool connections and transactions
pub type DbConn = sqlx::PgConnection;
