use storefront_gateway::{config::AppConfig, services::seed_service::seed_all, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let state = AppState::from_config(&config).await?;

    let outcomes = seed_all(&state).await?;
    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(()) => println!("ok      {}/{}", outcome.context, outcome.id),
            Err(err) => {
                failed += 1;
                println!("failed  {}/{}: {err}", outcome.context, outcome.id);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} seed writes failed", outcomes.len());
    }
    println!("Seed completed ({} records)", outcomes.len());
    Ok(())
}
