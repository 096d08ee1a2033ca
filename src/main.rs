use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Do as little as possible in main.rs as it can't contain any tests
    azure_vpn_site2site::logging::init();
    dotenv::dotenv().ok();
    log::info!("#Start main()");

    match azure_vpn_site2site::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
