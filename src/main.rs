use log::{error, info, LevelFilter};
use rocket::Error as RocketError;

async fn run() -> Result<(), RocketError> {
    let rocket = itawards_backend::build().ignite().await?;
    info!("Server ignited");
    // The logger fairing covers launch reporting; mute rocket's own.
    log4rs_dynamic_filters::DynamicLevelFilter::set("rocket", LevelFilter::Off);
    let _ = rocket.launch().await?;
    Ok(())
}

#[rocket::main]
async fn main() {
    log4rs::init_file("log4rs.yaml", log4rs_dynamic_filters::default_deserializers())
        .expect("Failed to initialise logging");

    if let Err(err) = run().await {
        error!("Launch failed: {err}");
        std::process::exit(1)
    }
}
