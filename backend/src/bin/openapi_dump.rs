//! Print the OpenAPI document as JSON.

use rental_backend::ApiDoc;
use utoipa::OpenApi;

#[expect(clippy::print_stdout, reason = "CLI output")]
fn main() -> Result<(), serde_json::Error> {
    println!("{}", ApiDoc::openapi().to_pretty_json()?);
    Ok(())
}
