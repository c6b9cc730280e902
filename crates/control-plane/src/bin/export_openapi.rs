// Export the OpenAPI document as JSON
//
// Usage: cargo run --bin export-openapi > docs/api/openapi.json
//
// Builds the document without starting the server or touching a database.

use eventdesk_control_plane::openapi::ApiDoc;

fn main() -> anyhow::Result<()> {
    println!("{}", ApiDoc::to_json()?);
    Ok(())
}
