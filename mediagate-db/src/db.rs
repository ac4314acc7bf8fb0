use log::{debug, error, info};

use mediagate_error::Result;

use crate::models::REDIRECT_MODE_KEY;
use crate::pool::DatabasePool;
use crate::sql::{blocked_domains, request_logs, settings};

/// 데이터베이스 초기화
///
/// 테이블 생성 실패는 로그만 남기고 계속 진행한다.
/// 커넥션을 얻지 못한 경우에만 에러를 돌려준다.
pub async fn initialize_db(pool: &DatabasePool) -> Result<()> {
    debug!("데이터베이스 스키마 확인");
    ensure_schema(pool).await
}

/// 스키마 상태 확인
async fn ensure_schema(pool: &DatabasePool) -> Result<()> {
    // 커넥션 풀에서 로드
    let conn = pool.get_connection().await?;

    // 테이블생성 확인
    if let Err(e) = create_tables(&conn).await {
        error!("테이블 생성중 오류발생: {}", e);
    } else {
        info!("테이블 확인 완료");
    }

    // 기본 설정값
    match conn
        .execute(settings::SEED_DEFAULT, &[&REDIRECT_MODE_KEY, &false])
        .await
    {
        Ok(inserted) if inserted > 0 => info!("{REDIRECT_MODE_KEY} 기본값(false) 생성"),
        Ok(_) => debug!("{REDIRECT_MODE_KEY} 기존값 유지"),
        Err(e) => error!("기본 설정값 생성 실패: {}", e),
    }

    Ok(())
}

/// 테이블 생성, 인덱싱
async fn create_tables(conn: &deadpool_postgres::Object) -> Result<()> {
    // request_logs 테이블
    match conn.execute(request_logs::CREATE_TABLE, &[]).await {
        Ok(_) => {
            info!("request_logs 테이블 확인 완료");

            // 인덱싱
            for index_query in request_logs::CREATE_INDICES {
                if let Err(e) = conn.execute(index_query, &[]).await {
                    error!("request_logs 인덱스 생성 실패: {}", e);
                }
            }
        }
        Err(e) => {
            error!("request_logs 테이블 생성중 오류 발생: {}", e);
        }
    }

    // blocked_domains
    match conn.execute(blocked_domains::CREATE_TABLE, &[]).await {
        Ok(_) => info!("blocked_domains 테이블 확인 완료"),
        Err(e) => {
            error!("blocked_domains 테이블 생성중 오류 발생: {}", e);
        }
    }

    // settings
    match conn.execute(settings::CREATE_TABLE, &[]).await {
        Ok(_) => info!("settings 테이블 확인 완료"),
        Err(e) => {
            error!("settings 테이블 생성중 오류 발생: {}", e);
        }
    }

    Ok(())
}
