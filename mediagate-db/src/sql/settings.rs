/// 테이블 생성 쿼리
pub const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        value BOOLEAN NOT NULL
    )
";

/// 기본값 시드 (이미 있으면 유지)
pub const SEED_DEFAULT: &str = "
    INSERT INTO settings (key, value)
    VALUES ($1, $2)
    ON CONFLICT (key) DO NOTHING
";

/// 설정값 조회
pub const SELECT_VALUE: &str = "
    SELECT value
    FROM settings
    WHERE key = $1
";

/// 설정값 저장
pub const UPSERT_VALUE: &str = "
    INSERT INTO settings (key, value)
    VALUES ($1, $2)
    ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value
";
