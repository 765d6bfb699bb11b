// Export the OpenAPI specification as JSON
//
// Usage: cargo run --bin export-openapi > openapi.json

use agentry_api::ApiDoc;

fn main() {
    println!("{}", ApiDoc::to_json());
}
