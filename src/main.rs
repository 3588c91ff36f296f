//! Artistic Nav Backend - binary entry point
//! Delegates to the library for all app logic.

#[tokio::main]
async fn main() {
    if let Err(e) = artistic_nav_backend::run().await {
        eprintln!("artistic-nav-backend: {}", e);
        std::process::exit(1);
    }
}
