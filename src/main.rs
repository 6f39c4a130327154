use log::{error, info};
use rocket::fairing::AdHoc;
use std::env;

use multiagent_search::bot::Bot;
use multiagent_search::config::Config;
use multiagent_search::debug_logger::DebugLogger;
use multiagent_search::handler;

#[rocket::launch]
async fn rocket() -> _ {
    // Lots of web hosting services expect you to bind to the port specified by the `PORT`
    // environment variable. However, Rocket looks at the `ROCKET_PORT` environment variable.
    // If we find a value for `PORT`, we set `ROCKET_PORT` to that value.
    if let Ok(port) = env::var("PORT") {
        env::set_var("ROCKET_PORT", &port);
    }

    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    info!("Starting multi-agent search server...");

    // Load configuration once at startup
    let config = Config::load_or_default();
    let logger = DebugLogger::new(config.debug.enabled, &config.debug.log_file_path).await;

    let bot = match Bot::new(config, logger) {
        Ok(bot) => bot,
        Err(e) => {
            error!("Invalid agent configuration: {}", e);
            std::process::exit(1);
        }
    };

    handler::mount(bot).attach(AdHoc::on_response("Server ID Middleware", |_, res| {
        Box::pin(async move {
            res.set_raw_header("Server", "multiagent-search");
        })
    }))
}
