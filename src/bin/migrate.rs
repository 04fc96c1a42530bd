use storefront_gateway::{
    config::AppConfig,
    db::{create_pool, ensure_table},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is not set"))?;
    let pool = create_pool(database_url).await?;
    ensure_table(&pool, &config.table_name).await?;
    println!("Table {} is ready", config.table_name);
    Ok(())
}
