use super::map_tx_error;
use async_trait::async_trait;
use nexa_contracts::catalog::SettingsRepository;
use nexa_contracts::error::CoreResult;
use nexa_model::settings::ServerSettingRow;
use sqlx::PgPool;

pub struct PgSettingsRepository {
    pool: PgPool,
}

impl PgSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for PgSettingsRepository {
    async fn get_raw(&self, key: &str) -> CoreResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("select value from server_settings where key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_tx_error)?;
        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: &str) -> CoreResult<()> {
        sqlx::query(
            "insert into server_settings (key, value) values ($1, $2) \
             on conflict (key) do update set value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(map_tx_error)?;
        Ok(())
    }

    async fn all_raw(&self) -> CoreResult<Vec<ServerSettingRow>> {
        let rows: Vec<(String, String)> = sqlx::query_as("select key, value from server_settings order by key")
            .fetch_all(&self.pool)
            .await
            .map_err(map_tx_error)?;
        Ok(rows
            .into_iter()
            .map(|(key, value)| ServerSettingRow { key, value })
            .collect())
    }
}
