use std::process::ExitCode;

use pushkind_jobs::crawlers::sites::build_collectors;
use pushkind_jobs::db::establish_connection_pool;
use pushkind_jobs::inference::ModelHandles;
use pushkind_jobs::models::config::PipelineConfig;
use pushkind_jobs::processing::pipeline::{Pipeline, PipelineSettings};
use pushkind_jobs::repository::DieselRepository;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = match PipelineConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let pool = match establish_connection_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            return ExitCode::FAILURE;
        }
    };
    let repo = DieselRepository::new(pool);

    let collectors = match build_collectors(&config) {
        Ok(collectors) => collectors,
        Err(e) => {
            log::error!("Failed to build collectors: {e}");
            return ExitCode::FAILURE;
        }
    };

    let models = match ModelHandles::load(&config) {
        Ok(models) => models,
        Err(e) => {
            log::error!("Failed to load models: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("Starting pipeline...");
    let mut pipeline = Pipeline::new(
        repo,
        collectors,
        models,
        PipelineSettings::from(&config),
        std::io::stdout(),
    );

    match pipeline.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Pipeline run failed: {e}");
            ExitCode::FAILURE
        }
    }
}
