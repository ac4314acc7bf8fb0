/// 테이블 생성 쿼리
pub const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS blocked_domains (
        id BIGSERIAL PRIMARY KEY,
        domain TEXT NOT NULL UNIQUE,
        timestamp TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
";

/// 도메인 목록 조회 쿼리
pub const SELECT_DOMAINS: &str = "
    SELECT domain
    FROM blocked_domains
    ORDER BY domain
";

/// 도메인 추가 (중복시 무시)
pub const INSERT_DOMAIN: &str = "
    INSERT INTO blocked_domains (domain)
    VALUES ($1)
    ON CONFLICT (domain) DO NOTHING
";

/// 도메인 삭제 (정확히 일치)
pub const DELETE_DOMAIN: &str = "
    DELETE FROM blocked_domains
    WHERE domain = $1
";
