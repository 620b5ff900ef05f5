use actix_web::{App, HttpServer, web};
use clap::Parser;
use tracing::info;

use redirectory::services::admin::admin_routes;
use redirectory::services::redirect::redirect_routes;
use redirectory::services::LinkService;
use redirectory::storages::StorageFactory;
use redirectory::{cli, config, system};

#[derive(Parser, Debug)]
#[command(name = "redirectory", version, about = "Link registry and redirect service")]
struct Cli {
    #[command(subcommand)]
    command: Option<cli::Command>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let args = Cli::parse();
    let config = config::init_config();

    // CLI Mode
    if let Some(command) = args.command {
        if let Err(e) = cli::run(command).await {
            eprintln!("{}", e.format_simple());
            std::process::exit(1);
        }
        return Ok(());
    }

    // Server Mode
    let _log_guard = system::init_logging(&config.logging);

    let storage = StorageFactory::create().await.map_err(|e| {
        eprintln!("{}", e.format_colored());
        std::io::Error::other(e.to_string())
    })?;
    info!("Using storage backend: {}", storage.backend_name().await);

    let service = LinkService::new(storage.clone());

    let admin_prefix = config.server.admin_prefix.clone();
    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting server at http://{}", bind_address);
    info!("Admin API available at: {}", admin_prefix);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(service.clone()))
            .service(web::scope(&admin_prefix).configure(admin_routes))
            .configure(redirect_routes)
    })
    .bind(bind_address)?
    .run()
    .await
}
