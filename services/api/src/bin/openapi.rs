//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI document for the function, auth and row-store routes.
//! The output path defaults to `openapi.json` and can be given as the first
//! argument.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "openapi.json".to_string());

    let spec_json = ApiDoc::openapi().to_pretty_json()?;
    std::fs::write(&path, spec_json)?;
    println!("OpenAPI document written to {}", path);
    Ok(())
}
