use actix_web::{middleware, web, App, HttpServer};
use std::env;
use std::sync::Arc;
use tally::repository::interface::RepositoryProvider;
use tally::repository::sql::{DatabaseStorage, Warehouse};
use tally::server::{self, ServerActor};
use tally::settings;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().collect();
    let setup = match args.len() {
        0 | 1 => settings::Setup::default(),
        _ => settings::Setup::from_file(&args[1])?,
    }
    .with_process_env();

    let repo = Warehouse::new(DatabaseStorage::Path(setup.get_db_path().to_path_buf())).await?;
    repo.migrate().await?;
    let repo = Arc::new(repo);

    let service = ServerActor::new(repo.clone(), &setup);

    tracing::info!(
        addr = %setup.get_addr(),
        db = %setup.get_db_path().display(),
        backups = %setup.get_backup_dir().display(),
        "starting tally server"
    );

    let served = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(service.clone()))
            .configure(server::routes)
    })
    .bind((setup.get_ip(), setup.get_port()))?
    .run()
    .await;

    if let Err(e) = &served {
        tracing::error!(error = %e, "cannot run tally server");
    }

    tracing::info!("stopping the tally server");
    repo.close().await;
    tracing::info!("all connections closed");

    served
}
