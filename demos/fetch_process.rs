use pje_scraper::{ProcessRequest, ProcessService, ScraperConfig, Strategy};
use tower::Service;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let case_key = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "5002739-49.2023.8.13.0604".to_string());

    // Visible browser for debugging; use Strategy::SessionReplay for plain HTTP
    let config = ScraperConfig::from_env()
        .with_strategy(Strategy::Browser)
        .with_headless(false);
    let mut service = ProcessService::new(config);

    println!("=== PJe lookup: {case_key} ===");

    match service.call(ProcessRequest::new(&case_key)).await {
        Ok(Some(details)) => {
            println!("Process: {}", details.process_number);
            println!("Class: {}", details.judicial_class);
            println!("Court: {}", details.judging_body);
            println!("Movements: {}", details.movements.len());
            for m in details.movements.iter().take(10) {
                println!("  - {m}");
            }
        }
        Ok(None) => println!("Not found"),
        Err(e) => eprintln!("Error: {e}"),
    }
}
