/// 테이블 생성 쿼리
pub const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS request_logs (
        id BIGSERIAL PRIMARY KEY,
        url TEXT NOT NULL,
        timestamp TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )";

/// 기본 인덱스 생성 쿼리
pub const CREATE_INDICES: [&str; 1] = [
    "CREATE INDEX IF NOT EXISTS request_logs_timestamp_idx ON request_logs(timestamp)",
];

/// 요청 기록
pub const INSERT_LOG: &str = "
    INSERT INTO request_logs (url)
    VALUES ($1)
";

/// 최근 요청 조회
pub const SELECT_RECENT: &str = "
    SELECT url, timestamp
    FROM request_logs
    ORDER BY timestamp DESC, id DESC
    LIMIT $1
";

/// 일별 요청 수
pub const SELECT_DAILY_COUNTS: &str = "
    SELECT DATE(timestamp) AS request_date, COUNT(*) AS request_count
    FROM request_logs
    WHERE timestamp > NOW() - make_interval(days => $1)
    GROUP BY request_date
    ORDER BY request_date DESC
";
